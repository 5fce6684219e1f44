/*!
 * Playback session orchestration.
 *
 * - `state`: session lifecycle
 * - `manager`: the session itself and the position feed
 * - `collaborators`: presenter, transport and fetcher interfaces
 * - `controls`: play/pause and skip on top of a transport
 * - `loader`: fetch lyrics and dictionaries, then load
 */

pub mod collaborators;
pub mod controls;
pub mod loader;
pub mod manager;
pub mod state;

pub use collaborators::{AudioTransport, CuePresenter, CueUpdate, DictionarySource, LyricsSource};
pub use controls::{PlayerControls, PlayerStatus};
pub use loader::{SessionLoader, SongLoadReport};
pub use manager::{spawn_position_feed, LoadReport, PlaybackSession};
pub use state::SessionState;
