/*!
 * Tests for error types and conversions
 */

use ncmlyrics::errors::{ApiError, AppError, LinkError, LyricsError};

/// Test the display forms of the lyric engine errors
#[test]
fn test_lyrics_error_display_shouldNameTheProblem() {
    let unknown = LyricsError::UnrecognizedMetadataField {
        field: "xx".to_string(),
    };
    assert_eq!(unknown.to_string(), "Unrecognized metadata field: xx");

    assert_eq!(
        LyricsError::PureMusicTrack.to_string(),
        "Track is pure music, nothing to ingest"
    );
}

/// Test the display forms of the API client errors
#[test]
fn test_api_error_display_shouldNameTheProblem() {
    assert_eq!(
        ApiError::ApiCode { code: 404 }.to_string(),
        "API responded with code 404"
    );

    let exhausted = ApiError::RetryLimitExceeded {
        attempts: 5,
        last_error: "connection refused".to_string(),
    };
    assert_eq!(
        exhausted.to_string(),
        "Retry limit exceeded after 5 attempts: connection refused"
    );
}

/// Test the display forms of the link resolver errors
#[test]
fn test_link_error_display_shouldNameTheProblem() {
    let unsupported = LinkError::UnsupportedLink("https://example.com".to_string());
    assert_eq!(unsupported.to_string(), "Unsupported link: https://example.com");

    let no_location = LinkError::NoRedirectLocation("http://163cn.tv/x".to_string());
    assert_eq!(
        no_location.to_string(),
        "Short link http://163cn.tv/x returned no redirect location"
    );
}

/// Test wrapping the domain errors into the application error
#[test]
fn test_app_error_from_domainErrors_shouldWrap() {
    let app: AppError = LyricsError::PureMusicTrack.into();
    assert!(matches!(app, AppError::Lyrics(LyricsError::PureMusicTrack)));

    let app: AppError = ApiError::ApiCode { code: 502 }.into();
    assert!(matches!(app, AppError::Api(ApiError::ApiCode { code: 502 })));

    let app: AppError = LinkError::ParseLink("x".to_string()).into();
    assert!(matches!(app, AppError::Link(_)));
}

/// Test converting foreign errors into the application error
#[test]
fn test_app_error_from_foreignErrors_shouldWrap() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let app: AppError = io.into();
    assert!(matches!(app, AppError::File(_)));

    let any = anyhow::anyhow!("something odd");
    let app: AppError = any.into();
    assert!(matches!(app, AppError::Unknown(_)));
}

/// Test that the lyric errors compare by value
#[test]
fn test_lyrics_error_equality_shouldCompareByValue() {
    let a = LyricsError::UnrecognizedMetadataField {
        field: "xx".to_string(),
    };
    let b = LyricsError::UnrecognizedMetadataField {
        field: "xx".to_string(),
    };
    assert_eq!(a, b);
    assert_ne!(a, LyricsError::PureMusicTrack);
}
