/*!
 * Data models for NCM API responses.
 *
 * Every endpoint answers with a JSON envelope carrying a `code` field;
 * the raw envelope structs here convert into the public domain types,
 * rejecting envelopes whose code is not 200 or whose expected structures
 * are missing.
 */

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

use crate::errors::ApiError;
use crate::lyric_document::LyricsPayload;

/// A single track as known to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NcmTrack {
    /// Numeric track id
    pub id: u64,
    /// Track title
    pub name: String,
    /// Performing artist names
    pub artists: Vec<String>,
}

impl NcmTrack {
    /// Canonical share link for this track
    pub fn link(&self) -> String {
        format!("https://music.163.com/song?id={}", self.id)
    }
}

impl fmt::Display for NcmTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.artists.join(","), self.name)
    }
}

/// An album and the tracks it carries
#[derive(Debug, Clone)]
pub struct NcmAlbum {
    /// Numeric album id
    pub id: u64,
    /// Album title
    pub name: String,
    /// Member tracks
    pub tracks: Vec<NcmTrack>,
}

impl NcmAlbum {
    /// Canonical share link for this album
    pub fn link(&self) -> String {
        format!("https://music.163.com/album?id={}", self.id)
    }
}

/// A playlist; the detail endpoint delivers only the first page of track
/// objects plus the full id list, so the tail may need a follow-up fetch
#[derive(Debug, Clone)]
pub struct NcmPlaylist {
    /// Numeric playlist id
    pub id: u64,
    /// Playlist title
    pub name: String,
    /// Tracks with details already delivered
    pub tracks: Vec<NcmTrack>,
    /// Ids of member tracks whose details were not in the response
    pub missing_track_ids: Vec<u64>,
}

impl NcmPlaylist {
    /// Canonical share link for this playlist
    pub fn link(&self) -> String {
        format!("https://music.163.com/playlist?id={}", self.id)
    }
}

/// Lyrics delivered for one track: the instrumental flag plus the raw text
/// of every track kind the service has
#[derive(Debug, Clone)]
pub struct NcmLyrics {
    /// Track id the lyrics belong to
    pub id: u64,
    /// Raw per-track texts and the pure-music flag
    pub payload: LyricsPayload,
}

fn ensure_code(code: i64) -> Result<(), ApiError> {
    if code != 200 {
        return Err(ApiError::ApiCode { code });
    }
    Ok(())
}

/// Raw track object as the API ships it
#[derive(Debug, Deserialize)]
pub(crate) struct TrackData {
    pub id: u64,
    pub name: String,
    #[serde(rename = "ar")]
    pub artists: Vec<ArtistData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistData {
    pub name: String,
}

impl From<TrackData> for NcmTrack {
    fn from(data: TrackData) -> Self {
        NcmTrack {
            id: data.id,
            name: data.name,
            artists: data.artists.into_iter().map(|artist| artist.name).collect(),
        }
    }
}

/// Envelope of `/v3/song/detail`
#[derive(Debug, Deserialize)]
pub(crate) struct TrackDetailResponse {
    pub code: i64,
    pub songs: Option<Vec<TrackData>>,
}

impl TrackDetailResponse {
    pub(crate) fn into_tracks(self) -> Result<Vec<NcmTrack>, ApiError> {
        ensure_code(self.code)?;
        let songs = self.songs.ok_or(ApiError::MissingField("songs"))?;
        Ok(songs.into_iter().map(NcmTrack::from).collect())
    }
}

/// Envelope of `/v1/album/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct AlbumDetailResponse {
    pub code: i64,
    pub album: Option<AlbumData>,
    pub songs: Option<Vec<TrackData>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumData {
    pub id: u64,
    pub name: String,
}

impl AlbumDetailResponse {
    pub(crate) fn into_album(self) -> Result<NcmAlbum, ApiError> {
        ensure_code(self.code)?;
        let album = self.album.ok_or(ApiError::MissingField("album"))?;
        let songs = self.songs.ok_or(ApiError::MissingField("songs"))?;
        Ok(NcmAlbum {
            id: album.id,
            name: album.name,
            tracks: songs.into_iter().map(NcmTrack::from).collect(),
        })
    }
}

/// Envelope of `/v6/playlist/detail`
#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistDetailResponse {
    pub code: i64,
    pub playlist: Option<PlaylistData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistData {
    pub id: u64,
    pub name: String,
    pub tracks: Vec<TrackData>,
    #[serde(rename = "trackIds")]
    pub track_ids: Vec<TrackIdData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackIdData {
    pub id: u64,
}

impl PlaylistDetailResponse {
    pub(crate) fn into_playlist(self) -> Result<NcmPlaylist, ApiError> {
        ensure_code(self.code)?;
        let playlist = self.playlist.ok_or(ApiError::MissingField("playlist"))?;

        let tracks: Vec<NcmTrack> = playlist.tracks.into_iter().map(NcmTrack::from).collect();

        let delivered: HashSet<u64> = tracks.iter().map(|track| track.id).collect();
        let missing_track_ids = playlist
            .track_ids
            .into_iter()
            .map(|entry| entry.id)
            .filter(|id| !delivered.contains(id))
            .collect();

        Ok(NcmPlaylist {
            id: playlist.id,
            name: playlist.name,
            tracks,
            missing_track_ids,
        })
    }
}

/// Envelope of `/song/lyric/v1`
#[derive(Debug, Deserialize)]
pub(crate) struct LyricResponse {
    pub code: i64,
    #[serde(rename = "pureMusic", default)]
    pub pure_music: bool,
    pub lrc: Option<LyricBlock>,
    pub tlyric: Option<LyricBlock>,
    pub romalrc: Option<LyricBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LyricBlock {
    pub lyric: Option<String>,
}

impl LyricResponse {
    pub(crate) fn into_lyrics(self, id: u64) -> Result<NcmLyrics, ApiError> {
        ensure_code(self.code)?;

        let mut payload = LyricsPayload {
            pure_music: self.pure_music,
            ..Default::default()
        };

        if !self.pure_music {
            payload.original = self.lrc.and_then(|block| block.lyric);
            payload.translation = self.tlyric.and_then(|block| block.lyric);
            payload.romanization = self.romalrc.and_then(|block| block.lyric);
        }

        Ok(NcmLyrics { id, payload })
    }
}
