use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ncm::NcmTrack;

// @module: File and output-path utilities

// @const: Runs of wildcards collapse to a single one
static COLLAPSE_WILDCARDS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*{2,}").unwrap()
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Probe pattern matching local audio files for a track: up to three
    /// artists joined by wildcards, the title with any trailing dot
    /// stripped, and a wildcard extension. Characters the filesystem may
    /// have rejected at download time also become wildcards.
    fn track_source_pattern(track: &NcmTrack) -> String {
        let artists: Vec<&str> = track
            .artists
            .iter()
            .take(3)
            .map(String::as_str)
            .collect();

        let raw = format!(
            "{} - {}.*",
            artists.join("?"),
            track.name.trim_end_matches('.')
        );

        let translated: String = raw
            .chars()
            .map(|c| match c {
                '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' => '*',
                other => other,
            })
            .collect();

        COLLAPSE_WILDCARDS_REGEX
            .replace_all(&translated, "*")
            .into_owned()
    }

    /// Compile a `*`-wildcard pattern into an anchored case-insensitive regex
    fn glob_regex(pattern: &str) -> Option<Regex> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        Regex::new(&format!("(?i)^{}$", body)).ok()
    }

    /// Find a local audio file belonging to a track in one directory
    pub fn find_track_source<P: AsRef<Path>>(track: &NcmTrack, dir: P) -> Option<PathBuf> {
        let regex = Self::glob_regex(&Self::track_source_pattern(track))?;

        for entry in WalkDir::new(dir.as_ref())
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .flatten()
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if regex.is_match(&entry.file_name().to_string_lossy()) {
                return Some(entry.into_path());
            }
        }

        None
    }

    /// Lyric file name used when no local audio file was found
    fn fallback_file_name(track: &NcmTrack) -> String {
        format!("{} - {}.lrc", track.artists.join(","), track.name)
    }

    /// Pick where a track's lyric file should be written.
    ///
    /// Each candidate directory is probed for a matching audio file; a hit
    /// means the lyric file sits next to it under the same stem. Without a
    /// hit the fallback name goes to the only (or last) candidate, or
    /// nowhere at all when `source_must_exist` is set.
    pub fn pick_output(
        track: &NcmTrack,
        outputs: &[PathBuf],
        source_must_exist: bool,
    ) -> Option<PathBuf> {
        match outputs {
            [] => match Self::find_track_source(track, Path::new(".")) {
                Some(source) => Some(source.with_extension("lrc")),
                None if source_must_exist => None,
                None => Some(PathBuf::from(Self::fallback_file_name(track))),
            },
            [single] => match Self::find_track_source(track, single) {
                Some(source) => Some(source.with_extension("lrc")),
                None if source_must_exist => None,
                None => Some(single.join(Self::fallback_file_name(track))),
            },
            many => {
                for output in many {
                    if let Some(source) = Self::find_track_source(track, output) {
                        return Some(source.with_extension("lrc"));
                    }
                }
                if source_must_exist {
                    None
                } else {
                    many.last().map(|last| last.join(Self::fallback_file_name(track)))
                }
            }
        }
    }
}
