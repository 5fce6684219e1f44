use std::fmt;

/// Lifecycle of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded yet, or reset after a song
    Uninitialized,
    /// Timeline and language are being built
    Loading,
    /// Position ticks drive cue resolution
    Ready,
    /// Setup failed; terminal
    Failed,
    /// Torn down; terminal
    Disposed,
}

impl SessionState {
    /// Whether no further transition can leave this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Failed | SessionState::Disposed)
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Disposed, _) => false,
            (_, Disposed) => true,
            (Uninitialized, Loading) => true,
            (Loading, Ready) | (Loading, Failed) => true,
            (Ready, Uninitialized) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Loading => write!(f, "loading"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Failed => write!(f, "failed"),
            SessionState::Disposed => write!(f, "disposed"),
        }
    }
}
