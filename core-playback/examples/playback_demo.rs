//! # Headless Playback Example
//!
//! Drives a three-second cached stream through [`PlaybackDriver`] with two
//! simulated sinks. The video sink spends its first 1.5 seconds decoding, so
//! the session stalls, retries once and then plays to the end.
//!
//! Run with: `cargo run --example playback_demo --package core-playback`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::time::LogLevel;
use bridge_traits::{MediaSink, StreamStatus, VideoSink};
use core_playback::{PlaybackConfig, PlaybackDriver, PlaybackSession};
use core_runtime::events::{CoreEvent, PlaybackEvent};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use tracing::info;

// ============================================================================
// Simulated Sinks
// ============================================================================

struct SimulatedSink {
    name: &'static str,
    playing: AtomicBool,
    decoding: AtomicBool,
}

impl SimulatedSink {
    fn new(name: &'static str, decoding: bool) -> Self {
        Self {
            name,
            playing: AtomicBool::new(false),
            decoding: AtomicBool::new(decoding),
        }
    }

    fn finish_decoding(&self) {
        self.decoding.store(false, Ordering::SeqCst);
    }
}

impl MediaSink for SimulatedSink {
    fn play(&self, from_time: f64) {
        info!(sink = self.name, from_time, "sink play");
        if !self.decoding.load(Ordering::SeqCst) {
            self.playing.store(true, Ordering::SeqCst);
        }
    }

    fn stop(&self) {
        info!(sink = self.name, "sink stop");
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn is_decoding(&self) -> bool {
        self.decoding.load(Ordering::SeqCst)
    }
}

impl VideoSink for SimulatedSink {
    fn draw(&self, frame_index: u64) {
        info!(sink = self.name, frame_index, "draw");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let video = Arc::new(SimulatedSink::new("video", true));
    let audio = Arc::new(SimulatedSink::new("audio", false));
    let stream = Arc::new(StreamStatus::new());
    stream.set_duration(Some(3.0));

    let builder = PlaybackSession::builder(PlaybackConfig::cached_vod().with_autoplay(true))
        .video_sink(video.clone())
        .audio_sink(audio.clone())
        .stream(stream.clone());
    let (handle, task) = PlaybackDriver::spawn(builder)?;
    let mut events = handle
        .subscribe()
        .filter(|event| !matches!(event, CoreEvent::Playback(PlaybackEvent::TimeUpdate { .. })));

    let decoder = Arc::clone(&video);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        decoder.finish_decoding();
    });

    handle.stream_ready()?;

    while let Ok(event) = events.recv().await {
        println!("event: {}", serde_json::to_string(&event)?);
        if let CoreEvent::Playback(PlaybackEvent::Pause) = event {
            break;
        }
    }

    let status = handle.status().await?;
    println!("stopped at {:.2}s ({:?})", status.current_time, status.state);

    handle.shutdown()?;
    task.await?;
    Ok(())
}
