use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use crate::app_config::Config;
use crate::errors::LyricsError;
use crate::file_utils::FileManager;
use crate::link_utils::{self, ResourceKind, ResourceLink};
use crate::lyric_document::LyricDocument;
use crate::ncm::{NcmApi, NcmTrack};
use indicatif::{ProgressBar, ProgressStyle};

// @module: Application controller for lyric downloads

/// Per-run counters reported at the end
#[derive(Debug, Default)]
struct RunSummary {
    saved: usize,
    skipped: usize,
    errors: usize,
}

/// Main application controller for lyric fetching
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: NCM API client shared across all requests of the run
    api: NcmApi,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let cookie_path = config
            .api
            .get_cookie_path()
            .ok_or_else(|| anyhow!("Could not determine a cookie snapshot location"))?;

        let api = NcmApi::new(
            config.api.timeout_secs,
            config.api.retry_count,
            config.api.retry_backoff_ms,
            cookie_path,
        )?;

        Ok(Self { config, api })
    }

    /// Run the main workflow for a set of share links
    pub async fn run(&self, links: &[String]) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        let mut summary = RunSummary::default();

        for link in links {
            // Resolve the link first; a dead link should not stop the rest
            let resource = match link_utils::resolve_link(link).await {
                Ok(resource) => resource,
                Err(e) => {
                    error!("Could not resolve link {}: {}", link, e);
                    summary.errors += 1;
                    continue;
                }
            };

            if let Err(e) = self.process_resource(&resource, &mut summary).await {
                error!("Error processing {}: {}", resource, e);
                summary.errors += 1;
            }
        }

        // Persist whatever cookies the service handed back for the next run
        if let Err(e) = self.api.save_cookies() {
            warn!("Failed to save cookies: {}", e);
        }

        info!(
            "Done: {} saved, {} skipped, {} errors in {}",
            summary.saved,
            summary.skipped,
            summary.errors,
            Self::format_duration(start_time.elapsed())
        );

        if summary.saved == 0 && summary.errors > 0 {
            return Err(anyhow!("No lyrics could be saved"));
        }

        Ok(())
    }

    /// Process one resolved resource, fetching lyrics for each of its tracks
    async fn process_resource(&self, resource: &ResourceLink, summary: &mut RunSummary) -> Result<()> {
        let tracks = self.collect_tracks(resource).await?;

        if tracks.is_empty() {
            warn!("No tracks found for {}", resource);
            return Ok(());
        }

        info!("Fetching lyrics for {} track(s) from {}", tracks.len(), resource);

        // Create a progress bar for track processing
        let progress_bar = ProgressBar::new(tracks.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tracks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        for track in &tracks {
            progress_bar.set_message(track.name.clone());

            match self.process_track(track).await {
                Ok(Some(path)) => {
                    summary.saved += 1;
                    debug!("Saved {} to {}", track, path.display());
                }
                Ok(None) => {
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Error processing track {}: {}", track, e);
                    summary.errors += 1;
                }
            }

            progress_bar.inc(1);
        }

        // Clear instead of leaving a finished bar behind, the summary line says it all
        progress_bar.finish_and_clear();

        Ok(())
    }

    // @returns: Every track the resource refers to, details filled
    async fn collect_tracks(&self, resource: &ResourceLink) -> Result<Vec<NcmTrack>> {
        let tracks = match resource.kind {
            ResourceKind::Song => {
                vec![self.api.get_details_for_track(resource.id).await?]
            }
            ResourceKind::Album => {
                let album = self.api.get_details_for_album(resource.id).await?;
                info!("Album: {}", album.name);
                album.tracks
            }
            ResourceKind::Playlist => {
                let mut playlist = self.api.get_details_for_playlist(resource.id).await?;
                if !playlist.missing_track_ids.is_empty() {
                    debug!(
                        "Fetching details for {} more playlist track(s)",
                        playlist.missing_track_ids.len()
                    );
                    self.api.fill_playlist_details(&mut playlist).await?;
                }
                info!("Playlist: {}", playlist.name);
                playlist.tracks
            }
        };

        Ok(tracks)
    }

    /// Fetch, assemble and write the lyric file for one track.
    ///
    /// Returns the output path on success, or `None` when the track was
    /// skipped on purpose.
    async fn process_track(&self, track: &NcmTrack) -> Result<Option<PathBuf>> {
        // Decide the output location before spending an API call on the track
        let Some(output) =
            FileManager::pick_output(track, &self.config.outputs, self.config.exist_only)
        else {
            debug!("No audio source found for {}, skipping", track);
            return Ok(None);
        };

        if FileManager::file_exists(&output) && !self.config.overwrite {
            warn!(
                "Skipping {}, lyric file already exists (use -f to force overwrite)",
                track
            );
            return Ok(None);
        }

        let lyrics = self.api.get_lyrics_by_track(track.id).await?;

        if lyrics.payload.is_empty() && !lyrics.payload.pure_music {
            info!("No lyrics published for {}", track);
            return Ok(None);
        }

        let document = match LyricDocument::from_payload(&lyrics.payload, self.config.merge_options()) {
            Ok(document) => document,
            Err(LyricsError::PureMusicTrack) => {
                info!("Skipping pure music track {}", track);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        document
            .write_to_file(&output)
            .context(format!("Failed to write lyric file: {}", output.display()))?;

        info!("Success: {}", output.display());

        Ok(Some(output))
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
