use std::fmt;

use log::debug;

use super::collaborators::AudioTransport;

/// Whether the transport is producing sound after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Playing,
    Paused,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerStatus::Playing => write!(f, "playing"),
            PlayerStatus::Paused => write!(f, "paused"),
        }
    }
}

/// Play/pause and skip controls on top of an audio transport
pub struct PlayerControls<T: AudioTransport> {
    transport: T,
    skip_step_ms: u64,
}

impl<T: AudioTransport> PlayerControls<T> {
    pub fn new(transport: T, skip_step_ms: u64) -> Self {
        Self { transport, skip_step_ms }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn skip_step_ms(&self) -> u64 {
        self.skip_step_ms
    }

    pub fn status(&self) -> PlayerStatus {
        if self.transport.is_playing() {
            PlayerStatus::Playing
        } else {
            PlayerStatus::Paused
        }
    }

    /// Pause when playing, play otherwise; returns the new status
    pub fn toggle_play(&self) -> PlayerStatus {
        if self.transport.is_playing() {
            self.transport.pause();
        } else {
            self.transport.play();
        }
        let status = self.status();
        debug!("Player {}", status);
        status
    }

    /// Jump ahead by one step, stopping at the end of the track
    pub fn skip_forward(&self) -> u64 {
        let target = self.transport.position_ms().saturating_add(self.skip_step_ms);
        self.seek_to(target)
    }

    /// Jump back by one step, stopping at the start of the track
    pub fn skip_backward(&self) -> u64 {
        let target = self.transport.position_ms().saturating_sub(self.skip_step_ms);
        self.seek_to(target)
    }

    /// Seek to a position clamped to the track; returns the position used
    pub fn seek_to(&self, position_ms: u64) -> u64 {
        let target = position_ms.min(self.transport.duration_ms());
        self.transport.seek_to(target);
        target
    }
}
