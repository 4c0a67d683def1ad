use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Result, Context};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::LyricsError;

// @module: Multi-track LRC document assembly and serialization

// @const: Comment row, '#' as the first non-blank character
static COMMENT_ROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#").unwrap()
});

// @const: Brace-delimited blob the upstream service embeds for itself
static EMBEDDED_BLOB_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\{.*\}\s*$").unwrap()
});

// @const: Bracketed metadata row; the key is validated against MetaKind after the match
static METADATA_ROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[(?P<key>[A-Za-z]+):\s*(?P<value>.+?)\s*\]\s*$").unwrap()
});

// @const: Lyric row, one or more leading time labels followed by the content
static LYRIC_ROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<labels>(?:\s*\[\d{1,2}:\d{1,2}(?:\.\d{1,3})?\])+)\s*(?P<text>.+?)\s*$").unwrap()
});

// @const: Single [mm:ss] or [mm:ss.fff] time label
static TIME_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?P<minutes>\d{1,2}):(?P<seconds>\d{1,2}(?:\.\d{1,3})?)\]").unwrap()
});

// @struct: Which language/role a lyric source represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// The song's own language
    Original,
    /// Translated lyrics
    Translation,
    /// Romanized transliteration
    Romanization,
}

impl TrackKind {
    /// Every variant in declaration order; this order drives ingestion,
    /// tie-breaks and serialized output
    pub const ALL: [TrackKind; 3] = [
        TrackKind::Original,
        TrackKind::Translation,
        TrackKind::Romanization,
    ];

    /// Stable human-readable label used in serialized metadata rows
    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Original => "Original",
            TrackKind::Translation => "Translation",
            TrackKind::Romanization => "Romaji",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// @struct: Recognized file-level LRC tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    /// `ti` - title of the song
    Title,
    /// `ar` - performing artist
    Artist,
    /// `al` - album the song appears on
    Album,
    /// `au` - author of the lyrics
    Author,
    /// `length` - track duration
    Length,
    /// `by` - contributor of this LRC file
    By,
    /// `offset` - global timing adjustment
    Offset,
}

impl MetaKind {
    /// Every variant in declaration order; this order drives serialized output
    pub const ALL: [MetaKind; 7] = [
        MetaKind::Title,
        MetaKind::Artist,
        MetaKind::Album,
        MetaKind::Author,
        MetaKind::Length,
        MetaKind::By,
        MetaKind::Offset,
    ];

    /// The tag as it appears inside brackets
    pub fn tag(self) -> &'static str {
        match self {
            MetaKind::Title => "ti",
            MetaKind::Artist => "ar",
            MetaKind::Album => "al",
            MetaKind::Author => "au",
            MetaKind::Length => "length",
            MetaKind::By => "by",
            MetaKind::Offset => "offset",
        }
    }

    /// Look a bracketed key up against the recognized tags
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for MetaKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Decode a time label's components to integer milliseconds.
///
/// Sub-millisecond fractions round half away from zero (`f64::round`), so a
/// label carrying exactly half a millisecond rounds up.
pub fn time_label_to_ms(minutes: u64, seconds: f64) -> u64 {
    ((minutes as f64 * 60.0 + seconds) * 1000.0).round() as u64
}

/// Encode integer milliseconds as an `[MM:SS.fff]` time label
pub fn ms_to_time_label(timestamp_ms: u64) -> String {
    let minutes = timestamp_ms / 60_000;
    let rest = timestamp_ms % 60_000;
    format!("[{:02}:{:02}.{:03}]", minutes, rest / 1_000, rest % 1_000)
}

// @struct: Tolerance window controlling cross-track timestamp snapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    // @field: Whether snapping onto nearby recorded timestamps is active
    pub enabled: bool,

    // @field: Maximum distance in milliseconds for a snap
    pub window_ms: u64,
}

impl MergeOptions {
    /// Default tolerance window in milliseconds
    pub const DEFAULT_WINDOW_MS: u64 = 20;

    /// Merging disabled, every timestamp inserted as-is
    pub fn disabled() -> Self {
        MergeOptions {
            enabled: false,
            window_ms: 0,
        }
    }

    /// Merging enabled with the given window
    pub fn with_window(window_ms: u64) -> Self {
        MergeOptions {
            enabled: true,
            window_ms,
        }
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            enabled: true,
            window_ms: Self::DEFAULT_WINDOW_MS,
        }
    }
}

// @struct: Raw per-track lyric text delivered by the upstream service
#[derive(Debug, Clone, Default)]
pub struct LyricsPayload {
    // @field: The whole song is instrumental, no lyrics of any kind
    pub pure_music: bool,

    // @field: Raw LRC text of the original-language track
    pub original: Option<String>,

    // @field: Raw LRC text of the translation track
    pub translation: Option<String>,

    // @field: Raw LRC text of the romanization track
    pub romanization: Option<String>,
}

impl LyricsPayload {
    /// Payload flagged instrumental
    pub fn pure_music() -> Self {
        LyricsPayload {
            pure_music: true,
            ..Default::default()
        }
    }

    /// Attach raw text for one track kind
    pub fn with_track(mut self, kind: TrackKind, text: impl Into<String>) -> Self {
        let text = text.into();
        match kind {
            TrackKind::Original => self.original = Some(text),
            TrackKind::Translation => self.translation = Some(text),
            TrackKind::Romanization => self.romanization = Some(text),
        }
        self
    }

    /// Raw text for one track kind, if the service delivered any
    pub fn text(&self, kind: TrackKind) -> Option<&str> {
        match kind {
            TrackKind::Original => self.original.as_deref(),
            TrackKind::Translation => self.translation.as_deref(),
            TrackKind::Romanization => self.romanization.as_deref(),
        }
    }

    /// Whether no track carries usable text
    pub fn is_empty(&self) -> bool {
        TrackKind::ALL
            .into_iter()
            .all(|kind| self.text(kind).is_none_or(str::is_empty))
    }
}

// @struct: Multi-track lyric document keyed by millisecond timestamps
#[derive(Debug, Default)]
pub struct LyricDocument {
    // @field: metadata[field][track] text values
    metadata: HashMap<MetaKind, HashMap<TrackKind, String>>,

    // @field: lines[timestamp][track] lyric contents
    lines: HashMap<u64, HashMap<TrackKind, String>>,

    // @field: Timestamp keys in first-insertion order, the order the snap resolver scans
    insertion_order: Vec<u64>,
}

impl LyricDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    // @creates: Document assembled from every track the payload carries,
    //           ingested in TrackKind declaration order
    pub fn from_payload(payload: &LyricsPayload, options: MergeOptions) -> Result<Self, LyricsError> {
        if payload.pure_music {
            return Err(LyricsError::PureMusicTrack);
        }

        let mut document = Self::new();

        for kind in TrackKind::ALL {
            match payload.text(kind) {
                Some(text) if !text.is_empty() => document.ingest_track(kind, text, options)?,
                _ => {}
            }
        }

        Ok(document)
    }

    /// Ingest one track's raw text, line by line.
    ///
    /// Stops at the first unrecognized metadata key; rows already processed
    /// stay in the document.
    pub fn ingest_track(
        &mut self,
        kind: TrackKind,
        text: &str,
        options: MergeOptions,
    ) -> Result<(), LyricsError> {
        for row in text.lines() {
            self.ingest_row(kind, row, options)?;
        }
        Ok(())
    }

    /// Classify and record one row of raw text.
    ///
    /// Precedence: comment, embedded blob, metadata row, lyric row. Rows
    /// matching none of these shapes are dropped without error.
    pub fn ingest_row(
        &mut self,
        kind: TrackKind,
        row: &str,
        options: MergeOptions,
    ) -> Result<(), LyricsError> {
        if COMMENT_ROW_REGEX.is_match(row) {
            return Ok(());
        }

        if EMBEDDED_BLOB_REGEX.is_match(row) {
            return Ok(());
        }

        if let Some(caps) = METADATA_ROW_REGEX.captures(row) {
            let key = caps.name("key").map_or("", |m| m.as_str());
            let value = caps.name("value").map_or("", |m| m.as_str());

            let field = MetaKind::from_tag(key).ok_or_else(|| {
                LyricsError::UnrecognizedMetadataField {
                    field: key.to_string(),
                }
            })?;

            self.metadata
                .entry(field)
                .or_default()
                .insert(kind, value.to_string());
            return Ok(());
        }

        if let Some(caps) = LYRIC_ROW_REGEX.captures(row) {
            let labels = caps.name("labels").map_or("", |m| m.as_str());
            let text = caps.name("text").map_or("", |m| m.as_str());

            let mut timestamps = Vec::new();
            for label in TIME_LABEL_REGEX.captures_iter(labels) {
                let minutes: u64 = label
                    .name("minutes")
                    .map_or(0, |m| m.as_str().parse().unwrap_or(0));
                let seconds: f64 = label
                    .name("seconds")
                    .map_or(0.0, |m| m.as_str().parse().unwrap_or(0.0));
                timestamps.push(time_label_to_ms(minutes, seconds));
            }

            // Every label of the row is resolved against the document state
            // as it was before the row; labels on the same row never snap
            // onto each other.
            if options.enabled {
                timestamps = timestamps
                    .iter()
                    .map(|&timestamp| self.resolve_timestamp(timestamp, options.window_ms))
                    .collect();
            }

            self.record_lyric(kind, &timestamps, text);
            return Ok(());
        }

        // Anything else is dropped, lenient by contract
        Ok(())
    }

    /// Decide which timestamp key a freshly decoded timestamp lands on.
    ///
    /// An exact key wins. Otherwise the recorded keys are scanned in
    /// first-insertion order, not numeric order, and the first one within
    /// the window is reused.
    fn resolve_timestamp(&self, timestamp: u64, window_ms: u64) -> u64 {
        if self.lines.contains_key(&timestamp) {
            return timestamp;
        }

        let lower = timestamp.saturating_sub(window_ms);
        let upper = timestamp.saturating_add(window_ms);

        for &existing in &self.insertion_order {
            if lower <= existing && existing <= upper {
                debug!("Snapping timestamp {} onto existing key {}", timestamp, existing);
                return existing;
            }
        }

        timestamp
    }

    /// Write one content string under every resolved timestamp, overwriting
    /// any earlier content for the same (timestamp, track) pair
    fn record_lyric(&mut self, kind: TrackKind, timestamps: &[u64], text: &str) {
        for &timestamp in timestamps {
            if !self.lines.contains_key(&timestamp) {
                self.insertion_order.push(timestamp);
            }
            self.lines
                .entry(timestamp)
                .or_default()
                .insert(kind, text.to_string());
        }
    }

    /// Metadata value recorded for a (field, track) pair
    pub fn metadata_value(&self, field: MetaKind, kind: TrackKind) -> Option<&str> {
        self.metadata
            .get(&field)
            .and_then(|values| values.get(&kind))
            .map(String::as_str)
    }

    /// Lyric content recorded for a (timestamp, track) pair
    pub fn line(&self, timestamp: u64, kind: TrackKind) -> Option<&str> {
        self.lines
            .get(&timestamp)
            .and_then(|contents| contents.get(&kind))
            .map(String::as_str)
    }

    /// All recorded timestamp keys in ascending numeric order
    pub fn timestamps(&self) -> Vec<u64> {
        let mut timestamps: Vec<u64> = self.lines.keys().copied().collect();
        timestamps.sort_unstable();
        timestamps
    }

    /// Number of distinct timestamp keys
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document holds neither metadata nor lyric lines
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.lines.is_empty()
    }

    /// Render every output row: metadata rows in MetaKind declaration order
    /// with tracks in TrackKind declaration order, then lyric rows in
    /// ascending timestamp order with tracks in TrackKind declaration order
    fn rows(&self) -> Vec<String> {
        let mut rows = Vec::new();

        for field in MetaKind::ALL {
            if let Some(values) = self.metadata.get(&field) {
                for track in TrackKind::ALL {
                    if let Some(value) = values.get(&track) {
                        rows.push(format!("[{}: {}/{}]", field.tag(), track.label(), value));
                    }
                }
            }
        }

        for timestamp in self.timestamps() {
            if let Some(contents) = self.lines.get(&timestamp) {
                let label = ms_to_time_label(timestamp);
                for track in TrackKind::ALL {
                    if let Some(content) = contents.get(&track) {
                        rows.push(format!("{}{}", label, content));
                    }
                }
            }
        }

        rows
    }

    /// Serialize the whole document, rows joined by single newlines.
    ///
    /// Reads the document without mutating it; repeated calls yield
    /// byte-identical output.
    pub fn serialize(&self) -> String {
        self.rows().join("\n")
    }

    /// Write the serialized document to a file, one row per line with a
    /// trailing newline, creating parent directories as needed
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create lyric file: {}", path.display()))?;

        for row in self.rows() {
            writeln!(file, "{}", row)?;
        }

        Ok(())
    }
}

impl fmt::Display for LyricDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Lyric Document")?;
        writeln!(f, "Metadata fields: {}", self.metadata.len())?;
        writeln!(f, "Lyric lines: {}", self.lines.len())?;
        Ok(())
    }
}
