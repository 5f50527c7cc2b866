//! Shared fakes for the playback integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bridge_traits::{
    FrameScheduler, ManualClock, ManualScheduler, MediaSink, StreamStatus, TaskHandle, VideoSink,
};
use core_playback::{PlaybackConfig, PlaybackSession};
use core_runtime::events::{CoreEvent, DiagnosticEvent, EventStream, PlaybackEvent};
use parking_lot::Mutex;

/// Sink whose status flags are set by the test and whose commands are recorded.
#[derive(Default)]
pub struct FakeSink {
    playing: AtomicBool,
    decoding: AtomicBool,
    plays: Mutex<Vec<f64>>,
    stops: AtomicUsize,
    draws: Mutex<Vec<u64>>,
}

impl FakeSink {
    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }

    pub fn set_decoding(&self, decoding: bool) {
        self.decoding.store(decoding, Ordering::SeqCst);
    }

    pub fn plays(&self) -> Vec<f64> {
        self.plays.lock().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn draws(&self) -> Vec<u64> {
        self.draws.lock().clone()
    }
}

impl MediaSink for FakeSink {
    fn play(&self, from_time: f64) {
        self.plays.lock().push(from_time);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn is_decoding(&self) -> bool {
        self.decoding.load(Ordering::SeqCst)
    }
}

impl VideoSink for FakeSink {
    fn draw(&self, frame_index: u64) {
        self.draws.lock().push(frame_index);
    }
}

/// A session wired to deterministic fakes.
pub struct Harness {
    pub session: PlaybackSession,
    pub video: Arc<FakeSink>,
    pub audio: Arc<FakeSink>,
    pub stream: Arc<StreamStatus>,
    pub clock: Arc<ManualClock>,
    pub scheduler: Arc<ManualScheduler>,
    pub events: EventStream,
}

impl Harness {
    pub fn new(config: PlaybackConfig) -> Self {
        let video = Arc::new(FakeSink::default());
        let audio = Arc::new(FakeSink::default());
        let stream = Arc::new(StreamStatus::new());
        let clock = Arc::new(ManualClock::default());
        let scheduler = Arc::new(ManualScheduler::new());

        let session = PlaybackSession::builder(config.with_audio(true))
            .video_sink(video.clone())
            .audio_sink(audio.clone())
            .stream(stream.clone())
            .clock(clock.clone())
            .scheduler(scheduler.clone())
            .build()
            .expect("session builds");
        let events = session.subscribe();

        Self {
            session,
            video,
            audio,
            stream,
            clock,
            scheduler,
            events,
        }
    }

    /// Both sinks presenting, nothing in flight.
    pub fn sinks_playing(&self) {
        self.video.set_playing(true);
        self.audio.set_playing(true);
    }

    /// Both sinks idle, nothing in flight.
    pub fn sinks_idle(&self) {
        self.video.set_playing(false);
        self.audio.set_playing(false);
        self.video.set_decoding(false);
        self.audio.set_decoding(false);
        self.stream.set_streaming(false);
    }

    /// Advance the wall clock and deliver the pending frame callback.
    ///
    /// Returns `false` when no frame was armed.
    pub fn step(&mut self, millis: u64) -> bool {
        self.clock.advance_millis(millis);
        match self.scheduler.take_frame() {
            Some(handle) => {
                self.session.on_frame(handle);
                true
            }
            None => false,
        }
    }

    /// Deliver the pending retry, if any.
    pub fn fire_retry(&mut self) -> Option<TaskHandle> {
        let (handle, _) = self.scheduler.take_timer()?;
        self.session.on_retry(handle);
        Some(handle)
    }

    /// Arm a frame outside the session, to check it is treated as stale.
    pub fn foreign_handle(&self) -> TaskHandle {
        let handle = self.scheduler.request_frame();
        self.scheduler.cancel(handle);
        handle
    }

    /// Playback events published since the last call.
    pub fn playback_events(&mut self) -> Vec<PlaybackEvent> {
        self.events
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                CoreEvent::Playback(p) => Some(p),
                CoreEvent::Diagnostic(_) => None,
            })
            .collect()
    }

    /// All events published since the last call.
    pub fn all_events(&mut self) -> Vec<CoreEvent> {
        self.events.drain()
    }

    pub fn retries(events: &[CoreEvent]) -> Vec<DiagnosticEvent> {
        events
            .iter()
            .filter_map(|e| match e {
                CoreEvent::Diagnostic(d) => Some(*d),
                CoreEvent::Playback(_) => None,
            })
            .collect()
    }
}

pub fn names(events: &[PlaybackEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.name()).collect()
}
