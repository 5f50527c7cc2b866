//! # Playback Session
//!
//! The owning object of the synchronizer and its public controller surface.
//!
//! ## Overview
//!
//! A [`PlaybackSession`] holds the sink handles, the playback clock and the
//! two cancelable scheduler handles (frame tick, stall retry). Everything it
//! does is reachable from a handful of entry points:
//!
//! | Entry point                 | Caller                          |
//! |-----------------------------|---------------------------------|
//! | `play` / `pause` / `seek`   | Player controls                 |
//! | `on_stream_ready`           | Demuxer, once metadata is known |
//! | `on_time_reported`          | Anything reporting stream time  |
//! | `on_visibility_change`      | Page/window lifecycle           |
//! | `destroy`                   | Player teardown                 |
//! | `on_frame` / `on_retry`     | The [`FrameScheduler`] delivery |
//!
//! None of them fail. Requests that make no sense for the stream (seeking a
//! live source, anything after `destroy`) are ignored.
//!
//! ## Example
//!
//! ```ignore
//! use core_playback::{PlaybackConfig, PlaybackSession};
//! use bridge_traits::ManualScheduler;
//! use std::sync::Arc;
//!
//! let scheduler = Arc::new(ManualScheduler::new());
//! let mut session = PlaybackSession::builder(PlaybackConfig::cached_vod())
//!     .video_sink(video)
//!     .audio_sink(audio)
//!     .scheduler(scheduler.clone())
//!     .build()?;
//!
//! session.play();
//! while let Some(frame) = scheduler.take_frame() {
//!     session.on_frame(frame);
//! }
//! ```

use std::sync::Arc;

use bridge_traits::{
    Clock, FrameScheduler, MediaSink, PageVisibility, SilentAudioSink, StreamContext,
    StreamStatus, SystemClock, TaskHandle, VideoSink,
};
use chrono::{DateTime, Utc};
use core_runtime::events::{CoreEvent, EventBus, EventStream, PlaybackEvent};
use tracing::{debug, warn};

use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::stall::ReadinessSnapshot;
use crate::state::PlaybackState;

/// The synchronizer: shared clock, sink handles and lifecycle state.
pub struct PlaybackSession {
    pub(crate) config: PlaybackConfig,
    pub(crate) video: Arc<dyn VideoSink>,
    pub(crate) audio: Arc<dyn MediaSink>,
    pub(crate) stream: Arc<dyn StreamContext>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) scheduler: Arc<dyn FrameScheduler>,
    pub(crate) events: EventBus,

    pub(crate) state: PlaybackState,
    /// Seconds on the session timeline.
    pub(crate) current_time: f64,
    pub(crate) last_tick: DateTime<Utc>,
    pub(crate) frame_task: Option<TaskHandle>,
    pub(crate) retry_task: Option<TaskHandle>,
    pub(crate) last_stall: Option<ReadinessSnapshot>,

    /// Set when the page was hidden mid-playback.
    resume_on_visible: bool,
    destroyed: bool,
}

impl PlaybackSession {
    /// Start assembling a session for a stream configured by `config`.
    pub fn builder(config: PlaybackConfig) -> PlaybackSessionBuilder {
        PlaybackSessionBuilder::new(config)
    }

    // ------------------------------------------------------------------------
    // Controls
    // ------------------------------------------------------------------------

    /// Start (or restart) playback from the current time.
    pub fn play(&mut self) {
        if self.destroyed {
            debug!("play ignored: session destroyed");
            return;
        }
        self.start();
    }

    /// Stop the clock loop and both sinks.
    pub fn pause(&mut self) {
        if self.destroyed {
            return;
        }
        self.halt();
        self.emit(PlaybackEvent::Pause);
    }

    /// Jump to `target_time` seconds.
    ///
    /// Only cached, non-live streams can seek; anything else, and any
    /// negative or non-finite target, is ignored. The video sink draws the
    /// target frame immediately; playback resumes from the new time only if
    /// it was running before.
    pub fn seek(&mut self, target_time: f64) {
        if self.destroyed {
            return;
        }
        if !self.config.can_seek() {
            debug!(
                live = self.config.live,
                cache = self.config.cache,
                "seek ignored: stream is not seekable"
            );
            return;
        }
        if !target_time.is_finite() || target_time < 0.0 {
            debug!(target_time, "seek ignored: invalid target");
            return;
        }

        let was_playing = self.state.is_playing();
        self.cancel_pending();

        self.current_time = target_time;
        let frame = (target_time * self.config.frame_rate).floor() as u64;
        debug!(target_time, frame, was_playing, "seeking");
        self.video.draw(frame);

        if was_playing {
            self.start();
        } else if self.state.is_ended() {
            self.state = PlaybackState::Stopped;
        }
        self.emit(PlaybackEvent::Seeked { target_time });
    }

    // ------------------------------------------------------------------------
    // Upstream signals
    // ------------------------------------------------------------------------

    /// The stream has enough data to present.
    ///
    /// Autoplay sessions start; others show frame 0 as a poster.
    pub fn on_stream_ready(&mut self) {
        if self.destroyed {
            return;
        }
        if self.config.autoplay {
            self.play();
        } else {
            debug!("stream ready, drawing poster frame");
            self.video.draw(0);
        }
    }

    /// The host reported a stream time.
    ///
    /// A playing non-live session pauses once the reported time reaches the
    /// duration. The clock loop's own advance ends the pass instead.
    pub fn on_time_reported(&mut self, time: f64) {
        if self.destroyed || !self.state.is_playing() {
            return;
        }
        if self.reached_duration(time) {
            debug!(time, "reported time reached duration");
            self.pause();
        }
    }

    pub(crate) fn reached_duration(&self, time: f64) -> bool {
        if self.config.live {
            return false;
        }
        self.stream
            .duration()
            .map_or(false, |duration| time >= duration)
    }

    /// Pause while hidden, resume on return if playback was running.
    pub fn on_visibility_change(&mut self, visibility: PageVisibility) {
        if self.destroyed {
            return;
        }
        match visibility {
            PageVisibility::Hidden => {
                self.resume_on_visible = self.state.is_playing();
                debug!(resume = self.resume_on_visible, "page hidden");
                self.pause();
            }
            PageVisibility::Visible => {
                if std::mem::take(&mut self.resume_on_visible) {
                    debug!(current_time = self.current_time, "page visible, resuming");
                    self.play();
                }
            }
        }
    }

    /// Tear the session down. Every later call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.pause();
        self.resume_on_visible = false;
        self.destroyed = true;
        debug!("session destroyed");
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn is_waiting(&self) -> bool {
        self.state.is_waiting()
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Bus the session publishes on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Convenience subscription to the session's events.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// Sink/stream snapshot taken when the most recent stall retry fired.
    pub fn last_stall(&self) -> Option<&ReadinessSnapshot> {
        self.last_stall.as_ref()
    }

    pub(crate) fn emit(&self, event: impl Into<CoreEvent>) {
        // No subscribers is fine.
        self.events.emit(event).ok();
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("state", &self.state)
            .field("current_time", &self.current_time)
            .field("frame_task", &self.frame_task)
            .field("retry_task", &self.retry_task)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`PlaybackSession`].
///
/// The video sink and the scheduler are required. Everything else has a
/// default: [`SystemClock`], a not-streaming [`StreamStatus`], a fresh
/// [`EventBus`], and [`SilentAudioSink`] when the config says the stream has
/// no audio.
pub struct PlaybackSessionBuilder {
    config: PlaybackConfig,
    video: Option<Arc<dyn VideoSink>>,
    audio: Option<Arc<dyn MediaSink>>,
    stream: Option<Arc<dyn StreamContext>>,
    clock: Option<Arc<dyn Clock>>,
    scheduler: Option<Arc<dyn FrameScheduler>>,
    events: Option<EventBus>,
}

impl PlaybackSessionBuilder {
    fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            video: None,
            audio: None,
            stream: None,
            clock: None,
            scheduler: None,
            events: None,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn video_sink(mut self, video: Arc<dyn VideoSink>) -> Self {
        self.video = Some(video);
        self
    }

    pub fn audio_sink(mut self, audio: Arc<dyn MediaSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn stream(mut self, stream: Arc<dyn StreamContext>) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn FrameScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Validate the configuration and assemble the session.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::InvalidConfig`] if the config fails validation
    /// - [`PlaybackError::CapabilityMissing`] if the video sink, the
    ///   scheduler, or (for streams with audio) the audio sink is missing
    pub fn build(self) -> Result<PlaybackSession> {
        self.config.validate()?;

        let video = self.video.ok_or_else(|| PlaybackError::CapabilityMissing {
            capability: "VideoSink".to_string(),
            message: "A video sink is required. Use .video_sink() to provide one.".to_string(),
        })?;

        let scheduler = self
            .scheduler
            .ok_or_else(|| PlaybackError::CapabilityMissing {
                capability: "FrameScheduler".to_string(),
                message: "A frame scheduler is required. Use .scheduler(), or run the \
                          session through PlaybackDriver which provides one."
                    .to_string(),
            })?;

        let audio: Arc<dyn MediaSink> = match (self.config.has_audio, self.audio) {
            (true, Some(audio)) => audio,
            (true, None) => {
                return Err(PlaybackError::CapabilityMissing {
                    capability: "AudioSink".to_string(),
                    message: "Stream has an audio track but no audio sink was provided. \
                              Use .audio_sink(), or set has_audio = false."
                        .to_string(),
                })
            }
            (false, provided) => {
                if provided.is_some() {
                    warn!("audio sink ignored: stream configured without audio");
                }
                Arc::new(SilentAudioSink)
            }
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let last_tick = clock.now();

        Ok(PlaybackSession {
            config: self.config,
            video,
            audio,
            stream: self
                .stream
                .unwrap_or_else(|| Arc::new(StreamStatus::new())),
            clock,
            scheduler,
            events: self.events.unwrap_or_default(),
            state: PlaybackState::Stopped,
            current_time: 0.0,
            last_tick,
            frame_task: None,
            retry_task: None,
            last_stall: None,
            resume_on_visible: false,
            destroyed: false,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::ManualScheduler;
    use mockall::mock;
    use mockall::predicate::*;

    mock! {
        pub Video {}

        impl MediaSink for Video {
            fn play(&self, from_time: f64);
            fn stop(&self);
            fn is_playing(&self) -> bool;
            fn is_decoding(&self) -> bool;
        }

        impl VideoSink for Video {
            fn draw(&self, frame_index: u64);
        }
    }

    fn session_with(config: PlaybackConfig, video: MockVideo) -> PlaybackSession {
        PlaybackSession::builder(config.with_audio(false))
            .video_sink(Arc::new(video))
            .scheduler(Arc::new(ManualScheduler::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_video_sink() {
        let result = PlaybackSession::builder(PlaybackConfig::default())
            .scheduler(Arc::new(ManualScheduler::new()))
            .build();
        assert!(matches!(
            result,
            Err(PlaybackError::CapabilityMissing { ref capability, .. }) if capability == "VideoSink"
        ));
    }

    #[test]
    fn test_build_requires_audio_sink_when_stream_has_audio() {
        let result = PlaybackSession::builder(PlaybackConfig::default())
            .video_sink(Arc::new(MockVideo::new()))
            .scheduler(Arc::new(ManualScheduler::new()))
            .build();
        assert!(matches!(
            result,
            Err(PlaybackError::CapabilityMissing { ref capability, .. }) if capability == "AudioSink"
        ));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = PlaybackSession::builder(PlaybackConfig::default().with_frame_rate(0.0))
            .video_sink(Arc::new(MockVideo::new()))
            .scheduler(Arc::new(ManualScheduler::new()))
            .build();
        assert!(matches!(result, Err(PlaybackError::InvalidConfig(_))));
    }

    #[test]
    fn test_seek_draws_floor_of_time_times_frame_rate() {
        let mut video = MockVideo::new();
        video.expect_draw().with(eq(74u64)).times(1).return_const(());

        let mut session = session_with(PlaybackConfig::cached_vod().with_frame_rate(30.0), video);
        session.seek(2.49);

        assert_eq!(session.current_time(), 2.49);
        assert!(session.state().is_stopped());
    }

    #[test]
    fn test_seek_on_live_stream_never_touches_sink() {
        let mut video = MockVideo::new();
        video.expect_draw().never();

        let config = PlaybackConfig {
            cache: true,
            ..PlaybackConfig::live()
        };
        let mut session = session_with(config, video);
        session.seek(10.0);

        assert_eq!(session.current_time(), 0.0);
    }

    #[test]
    fn test_ready_without_autoplay_draws_poster_frame() {
        let mut video = MockVideo::new();
        video.expect_draw().with(eq(0u64)).times(1).return_const(());
        video.expect_play().never();

        let mut session = session_with(PlaybackConfig::default(), video);
        session.on_stream_ready();

        assert!(session.state().is_stopped());
    }

    #[test]
    fn test_destroyed_session_ignores_commands() {
        let mut video = MockVideo::new();
        video.expect_stop().times(1).return_const(());
        video.expect_play().never();
        video.expect_draw().never();

        let mut session = session_with(PlaybackConfig::cached_vod(), video);
        session.destroy();
        assert!(session.is_destroyed());

        session.play();
        session.seek(1.0);
        session.on_stream_ready();
        session.on_visibility_change(PageVisibility::Visible);
        session.destroy();

        assert!(session.state().is_stopped());
    }
}
