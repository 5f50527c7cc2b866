//! Playback state machine value.
//!
//! One value instead of independent `ended`/`playing`/`waiting` booleans, so
//! the four legal combinations are the only representable ones.

use serde::{Deserialize, Serialize};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlaybackState {
    /// Initial state and the result of every pause/stop.
    #[default]
    Stopped,
    /// The clock loop is live. `waiting` is set while a stall retry is pending.
    Playing { waiting: bool },
    /// The last playback pass ran out of content.
    Ended,
}

impl PlaybackState {
    /// `true` in both playing sub-states, waiting included.
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing { .. })
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, PlaybackState::Playing { waiting: true })
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, PlaybackState::Ended)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackState::Stopped)
    }
}
