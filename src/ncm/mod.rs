/*!
 * NetEase Cloud Music (NCM) API integration.
 *
 * This module contains:
 * - Response models for the track, album, playlist and lyric endpoints
 * - An async client with retry, batching and cookie persistence
 */

pub mod client;
pub mod models;

// Re-export main types
pub use client::NcmApi;
pub use models::{NcmAlbum, NcmLyrics, NcmPlaylist, NcmTrack};
