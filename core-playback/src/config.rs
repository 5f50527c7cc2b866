//! # Playback Configuration
//!
//! Stream-level options the synchronizer reads: whether the source is live,
//! cached, looping, has audio, and the timing constants of the clock loop
//! and the stall retry.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PlaybackError, Result};

/// Playback session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Start playing as soon as the stream reports ready.
    ///
    /// When `false`, the ready signal only draws frame 0 as a poster.
    ///
    /// Default: false.
    #[serde(default)]
    pub autoplay: bool,

    /// Source has no fixed end. Disables seek and loop and uses the longer
    /// stall retry delay.
    ///
    /// Default: false.
    #[serde(default)]
    pub live: bool,

    /// Restart from zero when a cached, non-live stream ends.
    ///
    /// Default: false.
    #[serde(default, rename = "loop")]
    pub looping: bool,

    /// The full stream is kept in memory. Required for seek and loop.
    ///
    /// Default: false.
    #[serde(default)]
    pub cache: bool,

    /// Stream carries an audio track. Without one the audio side is a
    /// permanently-playing stub.
    ///
    /// Default: true.
    #[serde(default = "default_has_audio")]
    pub has_audio: bool,

    /// Video frame rate, used to turn a seek time into a frame index.
    ///
    /// Default: 30.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Cadence of the frame callback on hosts without a display-synchronised
    /// one (the tokio driver).
    ///
    /// Default: 1/60 s.
    #[serde(default = "default_frame_interval")]
    pub frame_interval: Duration,

    /// Stall retry delay for live streams.
    ///
    /// Default: 3 seconds.
    #[serde(default = "default_live_retry_delay")]
    pub live_retry_delay: Duration,

    /// Stall retry delay for non-live streams.
    ///
    /// Default: 1 second.
    #[serde(default = "default_vod_retry_delay")]
    pub vod_retry_delay: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            autoplay: false,
            live: false,
            looping: false,
            cache: false,
            has_audio: default_has_audio(),
            frame_rate: default_frame_rate(),
            frame_interval: default_frame_interval(),
            live_retry_delay: default_live_retry_delay(),
            vod_retry_delay: default_vod_retry_delay(),
        }
    }
}

impl PlaybackConfig {
    /// Live stream that starts playing as soon as it is ready.
    pub fn live() -> Self {
        Self {
            autoplay: true,
            live: true,
            ..Default::default()
        }
    }

    /// Fully cached on-demand stream: seekable and loopable.
    pub fn cached_vod() -> Self {
        Self {
            cache: true,
            ..Default::default()
        }
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Seeking needs the whole stream cached and a fixed timeline.
    pub fn can_seek(&self) -> bool {
        self.cache && !self.live
    }

    /// Whether an ended pass restarts from zero.
    pub fn loops(&self) -> bool {
        self.looping && self.can_seek()
    }

    /// Delay before re-evaluating a stalled session.
    pub fn retry_delay(&self) -> Duration {
        if self.live {
            self.live_retry_delay
        } else {
            self.vod_retry_delay
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(PlaybackError::InvalidConfig(format!(
                "frame_rate must be a positive number, got {}",
                self.frame_rate
            )));
        }

        if self.frame_interval.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "frame_interval must be > 0".to_string(),
            ));
        }

        if self.live_retry_delay.is_zero() || self.vod_retry_delay.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "retry delays must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_has_audio() -> bool {
    true
}

fn default_frame_rate() -> f64 {
    30.0
}

fn default_frame_interval() -> Duration {
    Duration::from_micros(16_667) // ~60 Hz
}

fn default_live_retry_delay() -> Duration {
    Duration::from_millis(3000)
}

fn default_vod_retry_delay() -> Duration {
    Duration::from_millis(1000)
}
