//! Stall detection and retry.
//!
//! Each tick samples the sinks and the stream into a [`ReadinessSnapshot`]
//! and classifies it:
//!
//! - both sinks presenting: advance the clock
//! - data still arriving, or either sink still decoding: stall
//! - neither: the pass has ended
//!
//! A stall arms one single-shot retry (3 s for live sources, 1 s otherwise).
//! There is no backoff and no attempt cap; retries continue until playback
//! resumes or the session is stopped, which cancels the pending one.

use bridge_traits::TaskHandle;
use core_runtime::events::{DiagnosticEvent, PlaybackEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::session::PlaybackSession;
use crate::state::PlaybackState;

/// What the sinks and the stream reported at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessSnapshot {
    pub current_time: f64,
    pub streaming: bool,
    pub video_playing: bool,
    pub audio_playing: bool,
    pub video_decoding: bool,
    pub audio_decoding: bool,
}

/// Classification of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advance,
    Stall,
    End,
}

impl ReadinessSnapshot {
    pub fn both_playing(&self) -> bool {
        self.video_playing && self.audio_playing
    }

    /// More data is still on its way to the sinks.
    pub fn in_flight(&self) -> bool {
        self.streaming || self.video_decoding || self.audio_decoding
    }

    pub fn outcome(&self) -> TickOutcome {
        if self.both_playing() {
            TickOutcome::Advance
        } else if self.in_flight() {
            TickOutcome::Stall
        } else {
            TickOutcome::End
        }
    }
}

impl PlaybackSession {
    pub(crate) fn sample_readiness(&self) -> ReadinessSnapshot {
        ReadinessSnapshot {
            current_time: self.current_time,
            streaming: self.stream.is_streaming(),
            video_playing: self.video.is_playing(),
            audio_playing: self.audio.is_playing(),
            video_decoding: self.video.is_decoding(),
            audio_decoding: self.audio.is_decoding(),
        }
    }

    /// Mark the session waiting and arm the retry. The frame tick is not
    /// re-armed; the retry takes over.
    pub(crate) fn enter_stall(&mut self, snapshot: ReadinessSnapshot) {
        self.state = PlaybackState::Playing { waiting: true };
        self.emit(PlaybackEvent::Waiting {
            current_time: self.current_time,
        });

        if let Some(previous) = self.retry_task.take() {
            self.scheduler.cancel(previous);
        }
        let delay = self.config.retry_delay();
        warn!(
            current_time = self.current_time,
            delay_ms = delay.as_millis() as u64,
            streaming = snapshot.streaming,
            video_decoding = snapshot.video_decoding,
            audio_decoding = snapshot.audio_decoding,
            "playback stalled, scheduling retry"
        );
        self.retry_task = Some(self.scheduler.schedule_once(delay));
    }

    /// Deliver a fired retry.
    ///
    /// Handles that are not the currently armed retry are ignored; a retry
    /// cancelled by pause, seek or destroy can never restart playback.
    pub fn on_retry(&mut self, handle: TaskHandle) {
        if self.retry_task != Some(handle) {
            trace!(handle = handle.0, "ignoring stale retry");
            return;
        }
        self.retry_task = None;

        let snapshot = self.sample_readiness();
        let delay_ms = self.config.retry_delay().as_millis() as u64;
        debug!(
            current_time = snapshot.current_time,
            streaming = snapshot.streaming,
            video_playing = snapshot.video_playing,
            audio_playing = snapshot.audio_playing,
            video_decoding = snapshot.video_decoding,
            audio_decoding = snapshot.audio_decoding,
            delay_ms,
            "play-retry"
        );
        self.emit(DiagnosticEvent::PlayRetry {
            current_time: snapshot.current_time,
            streaming: snapshot.streaming,
            video_playing: snapshot.video_playing,
            audio_playing: snapshot.audio_playing,
            video_decoding: snapshot.video_decoding,
            audio_decoding: snapshot.audio_decoding,
            delay_ms,
        });
        self.last_stall = Some(snapshot);

        self.start();
    }
}
