/*!
 * Async client for the NCM API.
 *
 * Wraps a reqwest client with the request headers the service expects,
 * retry with exponential backoff for transient failures, batched track
 * detail requests, and a cookie store snapshotted to disk between runs.
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cookie_store::serde::json as cookie_json;
use cookie_store::{CookieStore, RawCookie};
use futures::future::join_all;
use log::{debug, warn};
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::errors::ApiError;

use super::models::{
    AlbumDetailResponse, LyricResponse, NcmAlbum, NcmLyrics, NcmPlaylist, NcmTrack,
    PlaylistDetailResponse, TrackDetailResponse,
};

/// Base URL for every API request
const API_BASE_URL: &str = "https://interface.music.163.com/api";

/// How many track details one batched request may ask for
const TRACKS_PER_DETAIL_REQUEST: usize = 10;

/// Desktop browser identity the service expects
const REQUEST_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

// @struct: Cookie store shared between the reqwest client and the on-disk snapshot
#[derive(Debug, Default)]
struct SharedCookieStore {
    store: Mutex<CookieStore>,
}

impl reqwest::cookie::CookieStore for SharedCookieStore {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let mut store = self.store.lock();

        let cookies = cookie_headers.filter_map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|s| RawCookie::parse(s.to_owned()).ok())
        });
        store.store_response_cookies(cookies, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let cookie_string = self
            .store
            .lock()
            .get_request_values(url)
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");

        if cookie_string.is_empty() {
            None
        } else {
            HeaderValue::from_str(&cookie_string).ok()
        }
    }
}

// @struct: NCM API client
pub struct NcmApi {
    /// HTTP client for making requests
    client: Client,
    /// Cookie store shared with the client
    cookies: Arc<SharedCookieStore>,
    /// Where the cookie snapshot lives on disk
    cookie_path: PathBuf,
    /// Endpoint root every request path is appended to
    base_url: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl NcmApi {
    /// Create a client, loading any cookie snapshot left by an earlier run.
    ///
    /// A missing or unreadable snapshot is not fatal; the client starts with
    /// an empty store.
    pub fn new(
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        cookie_path: PathBuf,
    ) -> Result<Self, ApiError> {
        let cookies = Arc::new(SharedCookieStore::default());

        if let Some(store) = Self::load_cookie_snapshot(&cookie_path) {
            *cookies.store.lock() = store;
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(REQUEST_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .cookie_provider(Arc::clone(&cookies))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::RequestFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(NcmApi {
            client,
            cookies,
            cookie_path,
            base_url: API_BASE_URL.to_string(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Point the client at a different endpoint root, used by tests to
    /// exercise it against a local server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read a cookie snapshot from disk, degrading to none on any failure
    fn load_cookie_snapshot(path: &PathBuf) -> Option<CookieStore> {
        if !path.is_file() {
            return None;
        }

        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Could not read cookie snapshot {}: {}", path.display(), e);
                return None;
            }
        };

        match cookie_json::load_all(data.as_slice()) {
            Ok(store) => {
                debug!("Loaded cookie snapshot from {}", path.display());
                Some(store)
            }
            Err(e) => {
                warn!("Could not parse cookie snapshot {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Snapshot the cookie store to disk for the next run
    pub fn save_cookies(&self) -> Result<(), ApiError> {
        let mut buffer = Vec::new();
        {
            let store = self.cookies.store.lock();
            cookie_json::save_incl_expired_and_nonpersistent(&store, &mut buffer)
                .map_err(|e| ApiError::CookieStore(e.to_string()))?;
        }

        if let Some(parent) = self.cookie_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ApiError::CookieStore(e.to_string()))?;
        }

        std::fs::write(&self.cookie_path, buffer)
            .map_err(|e| ApiError::CookieStore(e.to_string()))?;

        debug!("Saved cookie snapshot to {}", self.cookie_path.display());
        Ok(())
    }

    /// Details for a single track
    pub async fn get_details_for_track(&self, track_id: u64) -> Result<NcmTrack, ApiError> {
        self.get_details_for_tracks(&[track_id])
            .await?
            .pop()
            .ok_or(ApiError::MissingField("songs"))
    }

    /// Details for a batch of tracks, chunked the way the endpoint expects;
    /// chunk responses come back in input order
    pub async fn get_details_for_tracks(&self, track_ids: &[u64]) -> Result<Vec<NcmTrack>, ApiError> {
        let requests = track_ids
            .chunks(TRACKS_PER_DETAIL_REQUEST)
            .map(|chunk| self.fetch_track_chunk(chunk));

        let mut tracks = Vec::with_capacity(track_ids.len());
        for chunk in join_all(requests).await {
            tracks.extend(chunk?);
        }

        Ok(tracks)
    }

    async fn fetch_track_chunk(&self, track_ids: &[u64]) -> Result<Vec<NcmTrack>, ApiError> {
        let selector: Vec<Value> = track_ids.iter().map(|&id| json!({ "id": id })).collect();
        let params = [("c", Value::Array(selector).to_string())];

        let response: TrackDetailResponse = self.fetch("/v3/song/detail", &params).await?;
        response.into_tracks()
    }

    /// Details for an album, tracks included
    pub async fn get_details_for_album(&self, album_id: u64) -> Result<NcmAlbum, ApiError> {
        let path = format!("/v1/album/{}", album_id);
        let response: AlbumDetailResponse = self.fetch(&path, &[]).await?;
        response.into_album()
    }

    /// Details for a playlist; the tail of a long playlist arrives as bare
    /// ids, fill those with `fill_playlist_details`
    pub async fn get_details_for_playlist(&self, playlist_id: u64) -> Result<NcmPlaylist, ApiError> {
        let params = [("id", playlist_id.to_string())];
        let response: PlaylistDetailResponse = self.fetch("/v6/playlist/detail", &params).await?;
        response.into_playlist()
    }

    /// Fetch details for every track the playlist response skipped
    pub async fn fill_playlist_details(&self, playlist: &mut NcmPlaylist) -> Result<(), ApiError> {
        if playlist.missing_track_ids.is_empty() {
            return Ok(());
        }

        let tracks = self
            .get_details_for_tracks(&playlist.missing_track_ids)
            .await?;
        playlist.tracks.extend(tracks);
        playlist.missing_track_ids.clear();

        Ok(())
    }

    /// Lyrics for one track
    pub async fn get_lyrics_by_track(&self, track_id: u64) -> Result<NcmLyrics, ApiError> {
        let params = [
            ("id", track_id.to_string()),
            ("cp", "false".to_string()),
            ("lv", "0".to_string()),
            ("tv", "0".to_string()),
            ("rv", "0".to_string()),
            ("kv", "0".to_string()),
            ("yv", "0".to_string()),
            ("ytv", "0".to_string()),
            ("yrv", "0".to_string()),
        ];

        let response: LyricResponse = self.fetch("/song/lyric/v1", &params).await?;
        response.into_lyrics(track_id)
    }

    /// GET a path with query parameters and decode the JSON body, retrying
    /// transient failures with exponential backoff
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut attempt = 0;
        let mut last_error: Option<ApiError> = None;

        while attempt <= self.max_retries {
            let response_result = self.client.get(&url).query(params).send().await;

            match response_result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        // A malformed body will not improve on retry
                        return response
                            .json::<T>()
                            .await
                            .map_err(|e| ApiError::ParseError(e.to_string()));
                    } else if status.is_server_error() {
                        // Server error - can retry
                        last_error = Some(ApiError::RequestFailed(format!(
                            "{} returned {}",
                            path, status
                        )));
                        warn!(
                            "NCM API error ({}) on {} - attempt {}/{}",
                            status,
                            path,
                            attempt + 1,
                            self.max_retries + 1
                        );
                    } else {
                        // Client error - don't retry
                        return Err(ApiError::RequestFailed(format!(
                            "{} returned {}",
                            path, status
                        )));
                    }
                }
                Err(e) => {
                    // Network error - can retry
                    warn!(
                        "NCM API network error on {}: {} - attempt {}/{}",
                        path,
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ApiError::RequestFailed(e.to_string()));
                }
            }

            attempt += 1;

            // If we have more retries left, wait with exponential backoff
            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(ApiError::RetryLimitExceeded {
            attempts: self.max_retries + 1,
            last_error: last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string()),
        })
    }
}
