// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lyrilex::app_config::{self, Config};
use lyrilex::app_controller::{describe_word, ConsolePresenter, Controller, PlaybackOptions};
use lyrilex::language_utils;
use lyrilex::timeline::format_clock;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a lyric file against a simulated track
    Play {
        /// WebVTT, SRT or LRC file
        #[arg(value_name = "LYRICS_FILE")]
        lyrics_path: PathBuf,

        /// Sleep between ticks as a real player would
        #[arg(short, long)]
        realtime: bool,

        /// Start position in milliseconds
        #[arg(long, default_value_t = 0)]
        start_ms: u64,

        /// Print the words of every cue
        #[arg(short, long)]
        words: bool,
    },

    /// Tokenize one line of text
    Tokenize {
        /// Text to tokenize
        #[arg(value_name = "TEXT")]
        text: String,

        /// Print the words as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a lyric file is parsed
    Inspect {
        /// WebVTT, SRT or LRC file
        #[arg(value_name = "LYRICS_FILE")]
        lyrics_path: PathBuf,
    },

    /// Generate shell completions for lyrilex
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// lyrilex - synchronized lyrics with word-level annotations
#[derive(Parser, Debug)]
#[command(name = "lyrilex")]
#[command(version)]
#[command(about = "Synchronized lyrics display with dictionary-annotated words")]
#[command(long_about = "lyrilex follows a playback position through time-coded lyrics and splits each
active line into dictionary-annotated words.

EXAMPLES:
    lyrilex play song.vtt                      # Play with the configured language
    lyrilex -L pt play --words song.lrc        # Portuguese lyrics, show every word
    lyrilex tokenize \"夢を見る yume\"            # Tokenize a single line
    lyrilex inspect song.srt                   # Show the parsed cues
    lyrilex completions bash > lyrilex.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Language of the lyrics (e.g., 'ja', 'en', 'pt')
    #[arg(short = 'L', long, global = true)]
    language: Option<String>,

    /// Show romanized duplicates instead of filtering them
    #[arg(long, global = true)]
    keep_romanizations: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
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
            Level::Info => "🎵 ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with trace so the max level alone decides what is shown
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "lyrilex", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;

    // If log level was not set via command line, update it from config now
    let log_level = cli.log_level.clone().map(Into::into).unwrap_or(config.log_level);
    log::set_max_level(level_filter(log_level));

    let controller = Controller::with_config(config)?;
    let dictionaries = controller.load_dictionaries().await?;
    if !dictionaries.is_empty() {
        info!("Registered {} dictionaries", dictionaries.len());
    }

    match cli.command {
        Commands::Play {
            lyrics_path,
            realtime,
            start_ms,
            words,
        } => {
            let options = PlaybackOptions {
                language: cli.language.clone(),
                realtime,
                start_ms,
            };
            let presenter = Arc::new(ConsolePresenter::new(words));
            let summary = controller.run_playback(lyrics_path, options, presenter).await?;
            info!(
                "Played {} cues with {} updates over {}",
                summary.cue_count,
                summary.published,
                format_clock(summary.duration_ms)
            );
            for name in &summary.failed_dictionaries {
                warn!("Dictionary '{}' was not available", name);
            }
        }
        Commands::Tokenize { text, json } => {
            let words = controller.tokenize_line(&text, cli.language.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&words).context("Failed to serialize words")?);
            } else {
                for word in &words {
                    println!("{}", describe_word(word));
                }
            }
        }
        Commands::Inspect { lyrics_path } => inspect(&controller, &lyrics_path)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let config_path = Path::new(&cli.config_path);
    if !config_path.exists() {
        warn!("Config file not found at '{}', creating default config.", cli.config_path);
    }
    let mut config = Config::load_or_create(config_path)?;

    // Override config with CLI options if provided
    if let Some(language) = &cli.language {
        config.language = language.clone();
    }
    if cli.keep_romanizations {
        config.filter_romanizations = false;
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn inspect(controller: &Controller, lyrics_path: &Path) -> Result<()> {
    let parsed = controller.inspect(lyrics_path)?;

    println!("Format:  {}", parsed.format);
    println!("Cues:    {}", parsed.timeline.len());
    println!("Skipped: {}", parsed.skipped);
    let mut tags: Vec<_> = parsed.metadata.iter().collect();
    tags.sort();
    for (key, value) in tags {
        println!("Tag:     {} = {}", key, value);
    }

    if !parsed.is_synchronized() {
        warn!("No synchronized lyrics found in {}", lyrics_path.display());
        return Ok(());
    }

    let language = language_utils::language_display_name(&controller.config().language)?;
    println!("Language: {}", language);
    for (index, cue) in parsed.timeline.cues().iter().enumerate() {
        let end = parsed
            .timeline
            .effective_end_ms(index)
            .map_or_else(|| "end".to_string(), format_clock);
        println!("{:>4}  {} - {}  {}", index, format_clock(cue.start_time_ms), end, cue.text.replace('\n', " / "));
    }
    Ok(())
}
