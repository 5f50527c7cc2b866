//! The clock loop.
//!
//! Playback time advances by measured wall-clock delta, and only on ticks
//! where both sinks report themselves presenting. The loop re-arms itself
//! one frame at a time through the [`FrameScheduler`](bridge_traits::FrameScheduler);
//! at most one frame request and one retry are ever armed.

use bridge_traits::time::seconds_between;
use bridge_traits::TaskHandle;
use core_runtime::events::PlaybackEvent;
use tracing::{debug, trace};

use crate::session::PlaybackSession;
use crate::stall::TickOutcome;
use crate::state::PlaybackState;

impl PlaybackSession {
    /// Command both sinks from `current_time` and arm the first tick.
    pub(crate) fn start(&mut self) {
        self.cancel_pending();

        self.last_tick = self.clock.now();
        self.video.play(self.current_time);
        self.audio.play(self.current_time);
        self.state = PlaybackState::Playing { waiting: false };
        self.frame_task = Some(self.scheduler.request_frame());

        debug!(current_time = self.current_time, "playback started");
        self.emit(PlaybackEvent::Play);
    }

    /// Cancel the armed tick and retry, stop both sinks.
    pub(crate) fn halt(&mut self) {
        self.cancel_pending();
        self.video.stop();
        self.audio.stop();
        self.state = PlaybackState::Stopped;
    }

    pub(crate) fn cancel_pending(&mut self) {
        if let Some(handle) = self.frame_task.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.retry_task.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Deliver a fired frame callback.
    ///
    /// Only the currently armed frame request runs a tick; anything else was
    /// cancelled or superseded and is dropped.
    pub fn on_frame(&mut self, handle: TaskHandle) {
        if self.frame_task != Some(handle) {
            trace!(handle = handle.0, "ignoring stale frame");
            return;
        }
        self.frame_task = None;
        self.tick();
    }

    fn tick(&mut self) {
        let snapshot = self.sample_readiness();
        match snapshot.outcome() {
            TickOutcome::Advance => self.advance(),
            TickOutcome::Stall => self.enter_stall(snapshot),
            TickOutcome::End => self.finish_pass(),
        }
    }

    fn advance(&mut self) {
        let now = self.clock.now();
        // Clamp so a clock stepping backwards never rewinds playback.
        let dt = seconds_between(self.last_tick, now).max(0.0);
        self.current_time += dt;
        self.last_tick = now;
        self.state = PlaybackState::Playing { waiting: false };

        trace!(current_time = self.current_time, dt, "tick");
        self.emit(PlaybackEvent::TimeUpdate {
            current_time: self.current_time,
        });

        if self.reached_duration(self.current_time) {
            debug!(current_time = self.current_time, "clock reached duration");
            self.finish_pass();
            return;
        }

        if self.frame_task.is_none() {
            self.frame_task = Some(self.scheduler.request_frame());
        }
    }

    fn finish_pass(&mut self) {
        let ended_at = self.current_time;
        self.halt();
        self.emit(PlaybackEvent::Pause);

        self.state = PlaybackState::Ended;
        debug!(current_time = ended_at, "playback ended");
        self.emit(PlaybackEvent::Ended {
            current_time: ended_at,
        });

        if self.config.loops() {
            debug!("looping from start");
            self.current_time = 0.0;
            self.start();
            self.emit(PlaybackEvent::Loop);
        }
    }
}
