/*!
 * Common test utilities for the ncmlyrics test suite
 */

use std::fs;
use std::path::PathBuf;
use anyhow::Result;
use tempfile::TempDir;

use ncmlyrics::ncm::NcmTrack;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates an empty stand-in audio file for output selection tests
pub fn create_audio_file(dir: &PathBuf, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, "")
}

/// Builds a track with the given name and artists, id zero
pub fn make_track(name: &str, artists: &[&str]) -> NcmTrack {
    NcmTrack {
        id: 0,
        name: name.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
    }
}
