/*!
 * Cue timeline and position resolution.
 *
 * - `cue`: the `Cue` and the immutable, sorted `CueTimeline`
 * - `resolver`: maps playback positions to the active cue
 * - `clock`: position formatting for the seek bar
 */

pub mod clock;
pub mod cue;
pub mod resolver;

pub use clock::{format_clock, progress_percent};
pub use cue::{Cue, CueTimeline};
pub use resolver::CueResolver;
