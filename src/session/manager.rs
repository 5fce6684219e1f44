/*!
 * Playback session: turns position ticks into published cue changes.
 *
 * This module handles:
 * - Building the timeline and language on a blocking worker
 * - Resolving the active cue for each position tick
 * - Tokenizing and publishing a cue once when it becomes active
 * - Disposal, after which every tick is a no-op
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::dictionary::DictionaryRegistry;
use crate::errors::SessionError;
use crate::language::LanguageDefinition;
use crate::subtitle_processor::{self, ParsedLyrics, PayloadFormat};
use crate::timeline::{Cue, CueResolver, CueTimeline};
use crate::tokenizer::Tokenizer;

use super::collaborators::{CuePresenter, CueUpdate};
use super::state::SessionState;

/// Summary of a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Cues in the built timeline
    pub cue_count: usize,
    /// Entries dropped while parsing
    pub skipped: usize,
    /// Detected payload shape
    pub format: PayloadFormat,
    /// Normalized language tag
    pub language: String,
    /// LRC header tags, empty for other formats
    pub metadata: HashMap<String, String>,
}

impl LoadReport {
    /// Whether cues will ever be published for this payload
    pub fn is_synchronized(&self) -> bool {
        self.cue_count > 0
    }
}

/// Everything that only exists while a song is loaded
struct ActiveSong {
    resolver: CueResolver,
    tokenizer: Tokenizer,
    last_index: Option<usize>,
}

/// Read-only handles of the loaded song, readable while a cue is published
#[derive(Clone)]
struct SongView {
    timeline: Arc<CueTimeline>,
    language: Arc<LanguageDefinition>,
}

/// Orchestrates one song's synchronized lyrics display
pub struct PlaybackSession {
    id: String,
    registry: Arc<DictionaryRegistry>,
    presenter: Arc<dyn CuePresenter>,
    // serializes song installation and removal; never taken by ticks
    lifecycle: Mutex<()>,
    state: RwLock<SessionState>,
    song: Mutex<Option<ActiveSong>>,
    view: RwLock<Option<SongView>>,
    current: RwLock<Option<CueUpdate>>,
    filter_romanizations: AtomicBool,
}

impl PlaybackSession {
    /// Create an uninitialized session
    pub fn new(registry: Arc<DictionaryRegistry>, presenter: Arc<dyn CuePresenter>) -> Self {
        let id = Uuid::new_v4().to_string();
        debug!("Created playback session {}", &id[..8]);
        Self {
            id,
            registry,
            presenter,
            lifecycle: Mutex::new(()),
            state: RwLock::new(SessionState::Uninitialized),
            song: Mutex::new(None),
            view: RwLock::new(None),
            current: RwLock::new(None),
            filter_romanizations: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn short_id(&self) -> &str {
        &self.id[..8]
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn registry(&self) -> &Arc<DictionaryRegistry> {
        &self.registry
    }

    pub fn is_disposed(&self) -> bool {
        self.state() == SessionState::Disposed
    }

    /// Last published cue, `None` while no cue is active
    pub fn current_cue(&self) -> Option<Cue> {
        self.current.read().as_ref().and_then(|update| update.cue.clone())
    }

    /// Last published update, including its words
    pub fn current_update(&self) -> Option<CueUpdate> {
        self.current.read().clone()
    }

    /// Timeline of the loaded song
    pub fn timeline(&self) -> Option<Arc<CueTimeline>> {
        self.view.read().as_ref().map(|view| Arc::clone(&view.timeline))
    }

    /// Language of the loaded song
    pub fn language(&self) -> Option<Arc<LanguageDefinition>> {
        self.view.read().as_ref().map(|view| Arc::clone(&view.language))
    }

    pub fn filter_romanizations(&self) -> bool {
        self.filter_romanizations.load(Ordering::Relaxed)
    }

    /// Change the romanization preference; applies from the next published cue
    pub fn set_filter_romanizations(&self, enabled: bool) {
        self.filter_romanizations.store(enabled, Ordering::Relaxed);
        debug!("Session {} romanization filter set to {}", self.short_id(), enabled);
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Parse a payload and prepare the tokenizer for `language_tag`
    ///
    /// Parsing and language resolution run on a blocking worker. Any error
    /// moves the session to `Failed` and is reported to the presenter.
    pub async fn load(&self, payload: String, language_tag: &str) -> Result<LoadReport, SessionError> {
        self.begin_loading()?;
        self.complete_loading(payload, language_tag).await
    }

    /// Move `Uninitialized -> Loading` before the payload is available
    pub fn begin_loading(&self) -> Result<(), SessionError> {
        self.transition(SessionState::Loading)?;
        info!("Session {} loading", self.short_id());
        Ok(())
    }

    /// Build the song from a payload once the session is `Loading`
    pub async fn complete_loading(&self, payload: String, language_tag: &str) -> Result<LoadReport, SessionError> {
        let current = self.state();
        if current != SessionState::Loading {
            return Err(invalid_transition(current, SessionState::Ready));
        }

        let registry = Arc::clone(&self.registry);
        let tag = language_tag.to_string();

        let built = tokio::task::spawn_blocking(move || {
            let language = registry.language(&tag)?;
            let parsed = subtitle_processor::parse_payload(&payload);
            Ok::<_, SessionError>((parsed, language))
        })
        .await;

        match built {
            Ok(Ok((parsed, language))) => self.finish_loading(parsed, language),
            Ok(Err(error)) => Err(self.abort_loading(error)),
            Err(join_error) => Err(self.abort_loading(SessionError::Loading(join_error.to_string()))),
        }
    }

    fn finish_loading(&self, parsed: ParsedLyrics, language: Arc<LanguageDefinition>) -> Result<LoadReport, SessionError> {
        let _lifecycle = self.lifecycle.lock();
        let mut state = self.state.write();
        if *state != SessionState::Loading {
            debug!("Session {} left loading before the song was ready", self.short_id());
            return Err(SessionError::Disposed);
        }

        let report = LoadReport {
            cue_count: parsed.timeline.len(),
            skipped: parsed.skipped,
            format: parsed.format,
            language: language.tag().to_string(),
            metadata: parsed.metadata,
        };

        let timeline = Arc::new(parsed.timeline);
        *self.view.write() = Some(SongView {
            timeline: Arc::clone(&timeline),
            language: Arc::clone(&language),
        });
        *self.song.lock() = Some(ActiveSong {
            resolver: CueResolver::new(timeline),
            tokenizer: Tokenizer::new(language),
            last_index: None,
        });
        *self.current.write() = None;
        *state = SessionState::Ready;

        if report.is_synchronized() {
            info!(
                "Session {} ready: {} cues ({}), language '{}'",
                self.short_id(),
                report.cue_count,
                report.format,
                report.language
            );
        } else {
            warn!("Session {} ready without synchronized lyrics", self.short_id());
        }

        Ok(report)
    }

    /// Fail a session that is still loading and notify the presenter
    ///
    /// Returns the error so callers can propagate it.
    pub fn abort_loading(&self, error: SessionError) -> SessionError {
        {
            let mut state = self.state.write();
            if *state != SessionState::Loading {
                return error;
            }
            *state = SessionState::Failed;
        }

        warn!("Session {} failed: {}", self.short_id(), error);
        self.presenter.on_session_failed(&error);
        error
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Handle one position tick
    ///
    /// Returns `true` when the active cue changed and an update was published.
    pub fn on_position(&self, position_ms: u64) -> bool {
        if self.state() != SessionState::Ready {
            return false;
        }

        // held through publication so that dispose() cannot interleave
        let mut song = self.song.lock();
        let Some(song) = song.as_mut() else {
            return false;
        };

        let index = song.resolver.resolve_index(position_ms);
        if index == song.last_index {
            return false;
        }
        song.last_index = index;

        let cue = index.and_then(|i| song.resolver.timeline().get(i)).cloned();
        let words = match &cue {
            Some(cue) => song.tokenizer.tokenize(&cue.text, self.filter_romanizations()),
            None => Vec::new(),
        };

        match (index, &cue) {
            (Some(i), Some(cue)) => debug!(
                "Session {} cue {} at {}ms: {} words",
                self.short_id(),
                i,
                cue.start_time_ms,
                words.len()
            ),
            _ => debug!("Session {} no cue at {}ms", self.short_id(), position_ms),
        }

        let update = CueUpdate {
            index,
            cue,
            words,
            position_ms,
        };
        *self.current.write() = Some(update.clone());
        self.presenter.on_cue_changed(&update);
        true
    }

    /// Drop the loaded song so another one can be loaded
    ///
    /// A load racing with the reset installs its song only after the old
    /// one is gone.
    pub fn reset(&self) -> Result<(), SessionError> {
        let _lifecycle = self.lifecycle.lock();
        self.transition(SessionState::Uninitialized)?;
        self.clear_song();
        info!("Session {} reset", self.short_id());
        Ok(())
    }

    /// Tear the session down; safe to call more than once
    pub fn dispose(&self) {
        let _lifecycle = self.lifecycle.lock();
        {
            let mut state = self.state.write();
            if *state == SessionState::Disposed {
                return;
            }
            *state = SessionState::Disposed;
        }

        self.clear_song();
        info!("Session {} disposed", self.short_id());
    }

    fn clear_song(&self) {
        *self.song.lock() = None;
        *self.view.write() = None;
        *self.current.write() = None;
    }

    fn transition(&self, next: SessionState) -> Result<(), SessionError> {
        let mut state = self.state.write();
        if *state == SessionState::Disposed {
            return Err(SessionError::Disposed);
        }
        if !state.can_transition_to(next) {
            return Err(invalid_transition(*state, next));
        }
        debug!("Session {} {} -> {}", self.short_id(), *state, next);
        *state = next;
        Ok(())
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if *self.state.get_mut() != SessionState::Disposed {
            debug!("Session {} dropped without dispose", self.short_id());
        }
    }
}

fn invalid_transition(from: SessionState, to: SessionState) -> SessionError {
    SessionError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Feed positions from a channel into a session
///
/// The task ends when the sender side closes or the session is disposed and
/// yields the number of published updates.
pub fn spawn_position_feed(session: Arc<PlaybackSession>, mut positions: mpsc::Receiver<u64>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut published = 0;
        while let Some(position_ms) = positions.recv().await {
            if session.is_disposed() {
                debug!("Position feed for session {} stopped: disposed", session.short_id());
                break;
            }
            if session.on_position(position_ms) {
                published += 1;
            }
        }
        published
    })
}
