// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Result, anyhow, Context};
use log::{debug, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::{Config, LogLevel};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod link_utils;
mod lyric_document;
mod ncm;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download lyrics for NetEase Cloud Music share links (default command)
    Get(GetArgs),

    /// Generate shell completions for ncmlyrics
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GetArgs {
    /// Share links to download lyrics for
    #[arg(value_name = "LINK", required = true)]
    links: Vec<String>,

    /// Candidate output directory, may be given several times
    #[arg(short, long = "output", value_name = "DIR")]
    outputs: Vec<PathBuf>,

    /// Only save lyrics next to an already downloaded audio file
    #[arg(short, long)]
    exist_only: bool,

    /// Overwrite lyric files that already exist
    #[arg(short = 'f', long)]
    overwrite: bool,

    /// Configuration file path
    #[arg(short, long = "config", value_name = "FILE")]
    config_path: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,
}

/// NCMLyrics - Download lyrics from NetEase Cloud Music
///
/// Fetches original, translated and romanized lyric tracks for songs,
/// albums and playlists, merges them and writes standard LRC files.
#[derive(Parser, Debug)]
#[command(name = "ncmlyrics")]
#[command(version = "0.1.0")]
#[command(about = "Download LRC lyrics from NetEase Cloud Music share links")]
#[command(long_about = "NCMLyrics downloads lyrics from NetEase Cloud Music and saves them as LRC files.

EXAMPLES:
    ncmlyrics https://music.163.com/song?id=1991012              # Download one song's lyrics
    ncmlyrics https://music.163.com/#/playlist?id=123123123      # Download a whole playlist
    ncmlyrics http://163cn.tv/abc123                             # Short links are expanded first
    ncmlyrics -o ~/Music -o ~/Downloads <LINK>                   # Try several output directories
    ncmlyrics -e -o ~/Music <LINK>                               # Only save next to existing audio files
    ncmlyrics -f <LINK>                                          # Overwrite lyric files that already exist
    ncmlyrics completions bash > ncmlyrics.bash                  # Generate bash completions

CONFIGURATION:
    Configuration is read from config.json in the platform config directory
    by default. You can specify a different file with --config. If no
    config file exists, built-in defaults are used.

OUTPUT SELECTION:
    Each output directory is searched for an audio file matching the track;
    on a hit the LRC file is written next to it under the same name. Without
    a hit the file goes to the last directory given, unless --exist-only is
    set, in which case the track is skipped.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Share links to download lyrics for
    #[arg(value_name = "LINK")]
    links: Vec<String>,

    /// Candidate output directory, may be given several times
    #[arg(short, long = "output", value_name = "DIR")]
    outputs: Vec<PathBuf>,

    /// Only save lyrics next to an already downloaded audio file
    #[arg(short, long)]
    exist_only: bool,

    /// Overwrite lyric files that already exist
    #[arg(short = 'f', long)]
    overwrite: bool,

    /// Configuration file path
    #[arg(short, long = "config", value_name = "FILE")]
    config_path: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");

            let mut stderr = std::io::stderr();
            let _ = match record.level() {
                Level::Error => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;31m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
                Level::Warn => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;33m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
                Level::Info => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;32m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
                Level::Debug => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;36m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
                Level::Trace => {
                    let emoji = Self::get_emoji_for_level(record.level());
                    writeln!(
                        stderr,
                        "\x1B[1;35m{} {} {}\x1B[0m",
                        now, emoji, record.args()
                    )
                },
            };
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "ncmlyrics", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Get(args)) => {
            // Use the explicit get subcommand args
            run_get(args).await
        }
        None => {
            // Default behavior - use top-level args for backwards compatibility
            if cli.links.is_empty() {
                return Err(anyhow!("At least one LINK is required when no subcommand is specified"));
            }

            let get_args = GetArgs {
                links: cli.links,
                outputs: cli.outputs,
                exist_only: cli.exist_only,
                overwrite: cli.overwrite,
                config_path: cli.config_path,
                quiet: cli.quiet,
                verbose: cli.verbose,
            };
            run_get(get_args).await
        }
    }
}

async fn run_get(options: GetArgs) -> Result<()> {
    // If a verbosity flag is set via command line, apply it immediately
    if options.quiet {
        log::set_max_level(LevelFilter::Warn);
    } else if options.verbose {
        log::set_max_level(LevelFilter::Debug);
    }

    // Load the configuration, falling back to defaults when no file exists
    let config_path = options.config_path.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) if path.exists() => {
            let file = File::open(path)
                .context(format!("Failed to open config file: {}", path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .context(format!("Failed to parse config file: {}", path.display()))?;

            config
        }
        Some(path) => {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        }
        None => Config::default(),
    };

    // Override config with CLI options if provided
    if !options.outputs.is_empty() {
        config.outputs = options.outputs.clone();
    }

    if options.exist_only {
        config.exist_only = true;
    }

    if options.overwrite {
        config.overwrite = true;
    }

    if options.quiet {
        config.log_level = LogLevel::Warn;
    } else if options.verbose {
        config.log_level = LogLevel::Debug;
    }

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    // If no verbosity flag was set via command line, update the level from config now
    if !options.quiet && !options.verbose {
        let log_level = match config.log_level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        };

        // Just update the max level without reinitializing the logger
        log::set_max_level(log_level);
    }

    // Create controller and fetch lyrics for every link
    let controller = Controller::with_config(config)?;

    controller.run(&options.links).await
}
