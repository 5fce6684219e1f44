use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::app_config::Config;
use crate::dictionary::{DictionaryLoadReport, DictionaryRegistry};
use crate::errors::{AppError, SessionError};
use crate::language_utils;
use crate::session::{
    spawn_position_feed, AudioTransport, CuePresenter, CueUpdate, DictionarySource, LyricsSource,
    PlaybackSession, PlayerControls, SessionLoader,
};
use crate::subtitle_processor::{self, ParsedLyrics};
use crate::timeline::format_clock;
use crate::tokenizer::{Tokenizer, Word};

// @module: Application controller for lyric playback

/// Silence appended after the last cue when simulating a track
const TRACK_TAIL_MS: u64 = 5000;

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Languages and dictionaries shared by every session
    registry: Arc<DictionaryRegistry>,
}

/// Options for one simulated playback
#[derive(Debug, Clone, Default)]
pub struct PlaybackOptions {
    /// Language tag overriding the configured one
    pub language: Option<String>,
    /// Sleep one tick interval between positions
    pub realtime: bool,
    /// Position to start from
    pub start_ms: u64,
}

/// What a simulated playback did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub cue_count: usize,
    pub published: usize,
    pub duration_ms: u64,
    pub failed_dictionaries: Vec<String>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: Arc::new(DictionaryRegistry::with_builtin_languages()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<DictionaryRegistry> {
        &self.registry
    }

    fn language_for(&self, language: Option<&str>) -> String {
        language.unwrap_or(&self.config.language).to_string()
    }

    /// Register every configured dictionary file
    ///
    /// A dictionary that cannot be read is skipped with a warning.
    pub async fn load_dictionaries(&self) -> Result<Vec<DictionaryLoadReport>> {
        let mut reports = Vec::new();
        for dictionary in &self.config.dictionaries {
            let raw = match tokio::fs::read_to_string(&dictionary.path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping dictionary '{}' ({}): {}", dictionary.name, dictionary.path.display(), e);
                    continue;
                }
            };
            let report = self
                .registry
                .register_dictionary(&dictionary.language, &dictionary.name, &raw)
                .with_context(|| format!("Failed to register dictionary '{}'", dictionary.name))?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Tokenize a single line with the registered dictionaries
    pub fn tokenize_line(&self, line: &str, language: Option<&str>) -> Result<Vec<Word>, AppError> {
        let language = self.registry.language(&self.language_for(language))?;
        let tokenizer = Tokenizer::new(language);
        Ok(tokenizer.tokenize(line, self.config.filter_romanizations))
    }

    /// Parse a lyric file without playing it
    pub fn inspect(&self, lyrics_path: &Path) -> Result<ParsedLyrics, AppError> {
        let content = std::fs::read_to_string(lyrics_path).map_err(|e| {
            AppError::File(format!("Failed to read lyrics file {}: {}", lyrics_path.display(), e))
        })?;
        Ok(subtitle_processor::parse_payload(&content))
    }

    /// Play a lyric file against a simulated track
    ///
    /// Lyrics and configured dictionaries go through the session loader,
    /// then positions are fed through a channel until the end of the track.
    pub async fn run_playback(
        &self,
        lyrics_path: PathBuf,
        options: PlaybackOptions,
        presenter: Arc<dyn CuePresenter>,
    ) -> Result<PlaybackSummary> {
        if !lyrics_path.exists() {
            return Err(anyhow!("Lyrics file does not exist: {:?}", lyrics_path));
        }

        let language = self.language_for(options.language.as_deref());
        let language_name = language_utils::language_display_name(&language)?;
        info!("Playing {} in {}", lyrics_path.display(), language_name);

        let dictionaries = self.config.dictionaries_for(&language);
        let dictionary_source = FileDictionarySource::new(
            dictionaries.iter().map(|d| (d.name.clone(), d.path.clone())),
        );
        let loader = SessionLoader::new(Arc::new(FileLyricsSource), Arc::new(dictionary_source))
            .with_dictionaries(dictionaries.iter().map(|d| d.name.clone()));

        let session = Arc::new(PlaybackSession::new(Arc::clone(&self.registry), presenter));
        session.set_filter_romanizations(self.config.filter_romanizations);

        let song_id = lyrics_path.to_string_lossy().to_string();
        let report = loader.load(&session, &song_id, &language).await?;

        let timeline = session.timeline().unwrap_or_default();
        let duration_ms = timeline
            .cues()
            .last()
            .map_or(0, |cue| cue.end_time_ms.unwrap_or(cue.start_time_ms) + TRACK_TAIL_MS);

        let mut summary = PlaybackSummary {
            cue_count: report.session.cue_count,
            published: 0,
            duration_ms,
            failed_dictionaries: report.failed_dictionaries,
        };

        if !report.session.is_synchronized() {
            warn!("No synchronized lyrics in {}, nothing to play", lyrics_path.display());
            session.dispose();
            return Ok(summary);
        }

        let controls = PlayerControls::new(SimulatedTransport::new(duration_ms), self.config.playback.skip_step_ms);
        controls.seek_to(options.start_ms);
        if !self.config.playback.autoplay {
            info!("Autoplay disabled, lyrics loaded at {}", format_clock(controls.transport().position_ms()));
            session.dispose();
            return Ok(summary);
        }
        controls.toggle_play();

        let tick_ms = self.config.playback.tick_interval_ms;
        let (sender, receiver) = mpsc::channel(64);
        let feed = spawn_position_feed(Arc::clone(&session), receiver);

        loop {
            let position = controls.transport().position_ms();
            if sender.send(position).await.is_err() {
                break;
            }
            if position >= duration_ms {
                break;
            }
            if options.realtime {
                tokio::time::sleep(Duration::from_millis(tick_ms)).await;
            }
            controls.transport().advance(tick_ms);
        }
        drop(sender);

        summary.published = feed.await.context("Position feed task panicked")?;
        session.dispose();

        debug!("Playback finished: {} updates over {}", summary.published, format_clock(duration_ms));
        Ok(summary)
    }
}

/// Reads lyric payloads from files; the song id is the path
pub struct FileLyricsSource;

#[async_trait]
impl LyricsSource for FileLyricsSource {
    async fn fetch_lyrics(&self, song_id: &str, _language_tag: &str) -> Result<String> {
        tokio::fs::read_to_string(song_id)
            .await
            .with_context(|| format!("Failed to read lyrics file: {}", song_id))
    }
}

/// Reads dictionary sources from configured files
pub struct FileDictionarySource {
    paths: HashMap<String, PathBuf>,
}

impl FileDictionarySource {
    pub fn new(paths: impl IntoIterator<Item = (String, PathBuf)>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }
}

#[async_trait]
impl DictionarySource for FileDictionarySource {
    async fn fetch_dictionary(&self, _language_tag: &str, dictionary_name: &str) -> Result<String> {
        let path = self
            .paths
            .get(dictionary_name)
            .ok_or_else(|| anyhow!("No file configured for dictionary '{}'", dictionary_name))?;
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read dictionary file: {}", path.display()))
    }
}

/// Track clock that only moves when told to
pub struct SimulatedTransport {
    playing: AtomicBool,
    position_ms: AtomicU64,
    duration_ms: u64,
}

impl SimulatedTransport {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            playing: AtomicBool::new(false),
            position_ms: AtomicU64::new(0),
            duration_ms,
        }
    }

    /// Move the clock forward while playing, stopping at the end
    pub fn advance(&self, elapsed_ms: u64) {
        if !self.is_playing() {
            return;
        }
        let next = self.position_ms().saturating_add(elapsed_ms).min(self.duration_ms);
        self.position_ms.store(next, Ordering::SeqCst);
        if next == self.duration_ms {
            self.pause();
        }
    }
}

impl AudioTransport for SimulatedTransport {
    fn play(&self) {
        self.playing.store(true, Ordering::SeqCst);
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn seek_to(&self, position_ms: u64) {
        self.position_ms.store(position_ms.min(self.duration_ms), Ordering::SeqCst);
    }

    fn position_ms(&self) -> u64 {
        self.position_ms.load(Ordering::SeqCst)
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// Prints cue changes to stdout
pub struct ConsolePresenter {
    show_words: bool,
}

impl ConsolePresenter {
    pub fn new(show_words: bool) -> Self {
        Self { show_words }
    }
}

impl CuePresenter for ConsolePresenter {
    fn on_cue_changed(&self, update: &CueUpdate) {
        let Some(cue) = &update.cue else {
            println!("[{}] ...", format_clock(update.position_ms));
            return;
        };

        println!("[{}] {}", format_clock(cue.start_time_ms), cue.text.replace('\n', " / "));
        if self.show_words {
            for word in &update.words {
                println!("        {}", describe_word(word));
            }
        }
    }

    fn on_session_failed(&self, error: &SessionError) {
        eprintln!("Lyrics unavailable: {}", error);
    }
}

/// One-line description of a word for console output
pub fn describe_word(word: &Word) -> String {
    let mut line = word.surface.clone();
    if word.parent != word.surface {
        line.push_str(&format!(" -> {}", word.parent));
    }
    if let Some(word_type) = &word.word_type {
        line.push_str(&format!(" [{}]", word_type));
    }
    if let Some(time) = &word.time {
        line.push_str(&format!(" ({})", time));
    }
    if word.representable {
        line.push_str(" *");
    }
    line
}
