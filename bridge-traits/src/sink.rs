//! Media Sink Capabilities
//!
//! A sink decodes and presents one media track. The synchronizer never looks
//! inside a sink's buffers; it only commands `play`/`stop`/`draw` and reads
//! two status flags once per tick:
//!
//! - `is_playing`: the sink is actively presenting content right now
//! - `is_decoding`: the sink is still filling its decode buffer
//!
//! Sinks usually decode on their own thread or worker, so every method takes
//! `&self` and implementations keep their state behind atomics or locks.

use crate::platform::PlatformSendSync;

/// Capability set shared by the audio and video sinks.
pub trait MediaSink: PlatformSendSync {
    /// Start presenting from `from_time` (seconds into the stream).
    fn play(&self, from_time: f64);

    /// Stop presenting. Buffers stay with the sink.
    fn stop(&self);

    /// `true` while the sink is actively presenting.
    fn is_playing(&self) -> bool;

    /// `true` while the sink is still decoding ahead of presentation.
    fn is_decoding(&self) -> bool;
}

/// Video sink: a [`MediaSink`] that can also present a single frame
/// without starting playback (poster frames, seek previews).
pub trait VideoSink: MediaSink {
    /// Render the frame at `frame_index` and hold it.
    fn draw(&self, frame_index: u64);
}

/// Stand-in audio sink for streams without an audio track.
///
/// Always reports itself playing and never decoding, so the clock is gated
/// by the video sink alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudioSink;

impl MediaSink for SilentAudioSink {
    fn play(&self, _from_time: f64) {}

    fn stop(&self) {}

    fn is_playing(&self) -> bool {
        true
    }

    fn is_decoding(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_audio_sink_never_gates_playback() {
        let sink = SilentAudioSink;
        assert!(sink.is_playing());
        assert!(!sink.is_decoding());

        sink.stop();
        sink.play(12.5);
        assert!(sink.is_playing());
        assert!(!sink.is_decoding());
    }
}
