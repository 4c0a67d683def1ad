/*!
 * Tests for file utilities and output selection
 */

use std::path::PathBuf;
use anyhow::Result;

use ncmlyrics::file_utils::FileManager;
use crate::common;

/// Test file existence checks
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file_path = common::create_test_file(&temp_dir.path().to_path_buf(), "test.txt", "data")?;

    assert!(FileManager::file_exists(&file_path));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.txt")));
    // A directory is not a file
    assert!(!FileManager::file_exists(temp_dir.path()));

    Ok(())
}

/// Test reading and writing files through the manager
#[test]
fn test_read_write_withRoundTrip_shouldPreserveContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file_path = temp_dir.path().join("nested").join("file.txt");

    FileManager::write_to_file(&file_path, "hello\nworld")?;
    let content = FileManager::read_to_string(&file_path)?;

    assert_eq!(content, "hello\nworld");
    Ok(())
}

/// Test finding a local audio file by artist and title
#[test]
fn test_find_track_source_withMatchingFile_shouldFind() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let audio = common::create_audio_file(&dir, "Artist - Song.flac")?;
    common::create_audio_file(&dir, "Other - Different.mp3")?;

    let track = common::make_track("Song", &["Artist"]);
    assert_eq!(FileManager::find_track_source(&track, &dir), Some(audio));

    Ok(())
}

/// Test that the audio probe matches case-insensitively
#[test]
fn test_find_track_source_withDifferentCase_shouldFind() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let audio = common::create_audio_file(&dir, "artist - SONG.Mp3")?;

    let track = common::make_track("Song", &["Artist"]);
    assert_eq!(FileManager::find_track_source(&track, &dir), Some(audio));

    Ok(())
}

/// Test that characters a filesystem may have rejected act as wildcards
#[test]
fn test_find_track_source_withSanitizedCharacters_shouldFind() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    // The downloader replaced '?' in the title when it saved the file
    let audio = common::create_audio_file(&dir, "Artist - What Now!.mp3")?;

    let track = common::make_track("What Now?", &["Artist"]);
    assert_eq!(FileManager::find_track_source(&track, &dir), Some(audio));

    Ok(())
}

/// Test that only the first three artists take part in the probe
#[test]
fn test_find_track_source_withManyArtists_shouldUseFirstThree() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let audio = common::create_audio_file(&dir, "A, B, C - Song.flac")?;

    let track = common::make_track("Song", &["A", "B", "C", "D"]);
    assert_eq!(FileManager::find_track_source(&track, &dir), Some(audio));

    Ok(())
}

/// Test that a title's trailing dot is ignored by the probe
#[test]
fn test_find_track_source_withTrailingDot_shouldFind() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let audio = common::create_audio_file(&dir, "Artist - Song.mp3")?;

    let track = common::make_track("Song.", &["Artist"]);
    assert_eq!(FileManager::find_track_source(&track, &dir), Some(audio));

    Ok(())
}

/// Test that subdirectories are not searched
#[test]
fn test_find_track_source_withFileInSubdir_shouldNotFind() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let sub = temp_dir.path().join("sub");
    std::fs::create_dir(&sub)?;
    common::create_audio_file(&sub, "Artist - Song.mp3")?;

    let track = common::make_track("Song", &["Artist"]);
    assert_eq!(
        FileManager::find_track_source(&track, temp_dir.path()),
        None
    );

    Ok(())
}

/// Test output selection next to an existing audio file
#[test]
fn test_pick_output_withAudioPresent_shouldSitNextToAudio() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    common::create_audio_file(&dir, "Artist - Song.flac")?;

    let track = common::make_track("Song", &["Artist"]);
    let output = FileManager::pick_output(&track, &[dir.clone()], false);

    assert_eq!(output, Some(dir.join("Artist - Song.lrc")));
    Ok(())
}

/// Test the fallback name when no audio file matched
#[test]
fn test_pick_output_withNoAudio_shouldFallBackToTrackName() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let track = common::make_track("Song", &["A", "B"]);
    let output = FileManager::pick_output(&track, &[dir.clone()], false);

    assert_eq!(output, Some(dir.join("A,B - Song.lrc")));
    Ok(())
}

/// Test that exist-only mode skips tracks without a local audio file
#[test]
fn test_pick_output_withExistOnlyAndNoAudio_shouldSkip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let track = common::make_track("Song", &["Artist"]);
    assert_eq!(FileManager::pick_output(&track, &[dir], true), None);

    Ok(())
}

/// Test that several candidate directories are probed in order
#[test]
fn test_pick_output_withSeveralDirs_shouldProbeInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let first = temp_dir.path().join("first");
    let second = temp_dir.path().join("second");
    std::fs::create_dir(&first)?;
    std::fs::create_dir(&second)?;
    common::create_audio_file(&second, "Artist - Song.ogg")?;

    let track = common::make_track("Song", &["Artist"]);
    let dirs: Vec<PathBuf> = vec![first, second.clone()];

    assert_eq!(
        FileManager::pick_output(&track, &dirs, false),
        Some(second.join("Artist - Song.lrc"))
    );
    Ok(())
}

/// Test that the fallback lands in the last of several directories
#[test]
fn test_pick_output_withSeveralDirsAndNoAudio_shouldFallBackToLast() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let first = temp_dir.path().join("first");
    let second = temp_dir.path().join("second");
    std::fs::create_dir(&first)?;
    std::fs::create_dir(&second)?;

    let track = common::make_track("Song", &["Artist"]);
    let dirs: Vec<PathBuf> = vec![first, second.clone()];

    assert_eq!(
        FileManager::pick_output(&track, &dirs, false),
        Some(second.join("Artist - Song.lrc"))
    );
    Ok(())
}
