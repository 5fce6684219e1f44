/*!
 * Playback position to cue resolution.
 *
 * Called at audio-callback cadence. Forward playback stays on the O(1) fast
 * path or advances the cursor a few steps; seeks backwards fall back to a
 * binary search over the whole timeline.
 */

use std::sync::Arc;

use super::cue::{Cue, CueTimeline};

/// Cues stepped over linearly before a forward jump is treated as a seek
const FORWARD_SCAN_LIMIT: usize = 4;

/// Resolves playback positions against one timeline
///
/// Holds a cursor that always points at a cue starting at or before the last
/// queried position, or at 0 after a query before the first cue.
#[derive(Debug, Clone)]
pub struct CueResolver {
    timeline: Arc<CueTimeline>,
    cursor: usize,
}

impl CueResolver {
    pub fn new(timeline: Arc<CueTimeline>) -> Self {
        Self { timeline, cursor: 0 }
    }

    pub fn timeline(&self) -> &Arc<CueTimeline> {
        &self.timeline
    }

    /// Current cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Forget traversal history
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Active cue at `position_ms`, `None` before the first cue or on an empty timeline
    pub fn resolve(&mut self, position_ms: u64) -> Option<&Cue> {
        let index = self.resolve_index(position_ms)?;
        self.timeline.get(index)
    }

    /// Index of the active cue at `position_ms`
    pub fn resolve_index(&mut self, position_ms: u64) -> Option<usize> {
        let cues = self.timeline.cues();
        let first = cues.first()?;

        if position_ms < first.start_time_ms {
            self.cursor = 0;
            return None;
        }

        let i = self.cursor;
        if position_ms < cues[i].start_time_ms {
            // seek backwards
            let index = self.timeline.index_at(position_ms)?;
            self.cursor = index;
            return Some(index);
        }

        let mut i = i;
        for _ in 0..FORWARD_SCAN_LIMIT {
            if i + 1 < cues.len() && cues[i + 1].start_time_ms <= position_ms {
                i += 1;
            } else {
                // stops at the last cue when playback runs past it
                self.cursor = i;
                return Some(i);
            }
        }

        // seek forwards
        let index = self.timeline.index_at(position_ms)?;
        self.cursor = index;
        Some(index)
    }
}
