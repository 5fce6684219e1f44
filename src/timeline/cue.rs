use std::fmt;

use log::{debug, warn};

// @module: Time-coded lyric lines

/// A time-coded line of lyric text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Start of the active window in ms
    pub start_time_ms: u64,

    /// Explicit end of the window in ms; `None` means "until the next cue"
    pub end_time_ms: Option<u64>,

    /// Lyric text, multi-line cues joined with '\n'
    pub text: String,
}

impl Cue {
    pub fn new(start_time_ms: u64, end_time_ms: Option<u64>, text: impl Into<String>) -> Self {
        Self {
            start_time_ms,
            end_time_ms,
            text: text.into(),
        }
    }

    /// End of this cue's window given the cue that follows it
    ///
    /// Returns `None` only for an open-ended last cue.
    pub fn effective_end_ms(&self, next: Option<&Cue>) -> Option<u64> {
        match (self.end_time_ms, next) {
            (Some(end), Some(next)) => Some(end.min(next.start_time_ms)),
            (None, Some(next)) => Some(next.start_time_ms),
            (end, None) => end,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let start = crate::subtitle_processor::format_timestamp(self.start_time_ms);
        match self.end_time_ms {
            Some(end) => write!(
                f,
                "{} --> {} {}",
                start,
                crate::subtitle_processor::format_timestamp(end),
                self.text
            ),
            None => write!(f, "{} --> {}", start, self.text),
        }
    }
}

/// Sorted, non-overlapping sequence of cues for one song
///
/// Immutable once built. Shared between the session and the resolver
/// through an `Arc`; the lookup cursor lives in the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueTimeline {
    cues: Vec<Cue>,
}

impl CueTimeline {
    /// Timeline with zero cues; resolution always yields no cue
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a timeline from cues in any order
    ///
    /// Cues are sorted by start time. When several cues share a start time
    /// only the first is kept. Explicit end times are clamped to the next
    /// cue's start so windows never overlap. Returns the timeline and the
    /// number of cues dropped.
    pub fn build(mut cues: Vec<Cue>) -> (Self, usize) {
        // stable: among equal starts the first parsed wins
        cues.sort_by_key(|cue| cue.start_time_ms);

        let before = cues.len();
        cues.dedup_by(|later, kept| {
            if later.start_time_ms == kept.start_time_ms {
                warn!(
                    "Dropping cue '{}' sharing start time {} ms with '{}'",
                    later.text, later.start_time_ms, kept.text
                );
                true
            } else {
                false
            }
        });
        let dropped = before - cues.len();

        let mut clamped = 0;
        for i in 0..cues.len().saturating_sub(1) {
            let next_start = cues[i + 1].start_time_ms;
            if let Some(end) = cues[i].end_time_ms {
                if end > next_start {
                    cues[i].end_time_ms = Some(next_start);
                    clamped += 1;
                }
            }
        }
        if clamped > 0 {
            debug!("Clamped {} overlapping cue end times", clamped);
        }

        (Self { cues }, dropped)
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Effective end of the cue at `index`
    pub fn effective_end_ms(&self, index: usize) -> Option<u64> {
        let cue = self.cues.get(index)?;
        cue.effective_end_ms(self.cues.get(index + 1))
    }

    /// Index of the cue whose window contains `position_ms`, by binary search
    pub fn index_at(&self, position_ms: u64) -> Option<usize> {
        // number of cues starting at or before the position
        let count = self.cues.partition_point(|cue| cue.start_time_ms <= position_ms);
        count.checked_sub(1)
    }

    /// All lyric text joined line by line, for the unsynchronized view
    pub fn full_text(&self) -> String {
        self.cues
            .iter()
            .filter(|cue| !cue.is_blank())
            .map(|cue| cue.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
