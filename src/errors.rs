/*!
 * Error types for the ncmlyrics application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors raised while building a lyric document from raw track text
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LyricsError {
    /// A bracketed row carried a metadata key outside the recognized set
    #[error("Unrecognized metadata field: {field}")]
    UnrecognizedMetadataField {
        /// The offending key as it appeared in the row
        field: String,
    },

    /// The upstream payload is flagged instrumental and carries no lyrics
    #[error("Track is pure music, nothing to ingest")]
    PureMusicTrack,
}

/// Errors that can occur when talking to the NCM API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Error when making an HTTP request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when decoding an API response body fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error code returned inside the API response envelope
    #[error("API responded with code {code}")]
    ApiCode {
        /// The `code` field of the JSON envelope
        code: i64,
    },

    /// Error when a response is missing a field the client depends on
    #[error("API response missing expected field: {0}")]
    MissingField(&'static str),

    /// All retry attempts were exhausted
    #[error("Retry limit exceeded after {attempts} attempts: {last_error}")]
    RetryLimitExceeded {
        /// How many attempts were made
        attempts: u32,
        /// Description of the final failure
        last_error: String,
    },

    /// Error loading or saving the cookie store
    #[error("Cookie store error: {0}")]
    CookieStore(String),
}

/// Errors that can occur while resolving a share link
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LinkError {
    /// The host or scheme is not something this tool understands
    #[error("Unsupported link: {0}")]
    UnsupportedLink(String),

    /// The host looked right but the resource or id could not be extracted
    #[error("Could not parse link: {0}")]
    ParseLink(String),

    /// A short link answered without a redirect target
    #[error("Short link {0} returned no redirect location")]
    NoRedirectLocation(String),

    /// The HTTP request expanding a short link failed
    #[error("Short link request failed: {0}")]
    ShortLinkRequest(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the lyric merge engine
    #[error("Lyrics error: {0}")]
    Lyrics(#[from] LyricsError),

    /// Error from the NCM API client
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Error from share-link resolution
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
