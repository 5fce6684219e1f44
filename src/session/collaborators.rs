/*!
 * Interfaces of the collaborators around the engine.
 *
 * The engine never fetches, decodes or draws anything itself. Payloads come
 * in through the fetch traits, positions through the audio transport, and
 * results go out through the presenter.
 */

use anyhow::Result;
use async_trait::async_trait;

use crate::errors::SessionError;
use crate::timeline::Cue;
use crate::tokenizer::Word;

/// What the presentation layer receives when the active cue changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueUpdate {
    /// Index of the active cue in the timeline, `None` for no cue
    pub index: Option<usize>,
    /// The active cue
    pub cue: Option<Cue>,
    /// Annotated words of the cue text
    pub words: Vec<Word>,
    /// Position that triggered the change
    pub position_ms: u64,
}

/// Receives cue changes and failures
///
/// Callbacks run on the thread that delivered the position tick. From inside
/// a callback only the read accessors of the same session (`state`,
/// `current_cue`, `current_update`, `timeline`, `language`) may be called.
pub trait CuePresenter: Send + Sync {
    fn on_cue_changed(&self, update: &CueUpdate);

    /// Setup failed; show the fallback view
    fn on_session_failed(&self, _error: &SessionError) {}
}

/// Coarse control over the external audio player
pub trait AudioTransport: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn is_playing(&self) -> bool;
    fn seek_to(&self, position_ms: u64);
    fn position_ms(&self) -> u64;
    fn duration_ms(&self) -> u64;
}

/// Fetches raw lyric payloads
#[async_trait]
pub trait LyricsSource: Send + Sync {
    async fn fetch_lyrics(&self, song_id: &str, language_tag: &str) -> Result<String>;
}

/// Fetches raw dictionary sources
#[async_trait]
pub trait DictionarySource: Send + Sync {
    async fn fetch_dictionary(&self, language_tag: &str, dictionary_name: &str) -> Result<String>;
}
