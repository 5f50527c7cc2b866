//! # Playback Synchronization Core
//!
//! Keeps an independently decoded video track and audio track in lockstep
//! against one shared playback clock.
//!
//! ## Overview
//!
//! This crate handles:
//! - Advancing playback time by measured wall-clock delta while both sinks
//!   present (the clock loop)
//! - Detecting buffering stalls and retrying on a fixed delay
//! - The play/pause/seek controller, including visibility changes, stream
//!   readiness, end of stream and looping
//! - A tokio driver for hosts without their own render loop
//!
//! Decoding, rendering, fetching and demuxing stay with the host behind the
//! traits in `bridge-traits`.
//!
//! ## Events
//!
//! Lifecycle signals are published on a [`core_runtime::events::EventBus`]:
//! `play`, `pause`, `waiting`, `timeupdate`, `ended`, `loop` and `seeked`,
//! plus a `play-retry` diagnostic each time a stall retry fires.

pub mod config;
pub mod driver;
pub mod error;
pub mod session;
pub mod stall;
pub mod state;
mod ticker;

pub use config::PlaybackConfig;
pub use driver::{PlaybackDriver, PlaybackHandle, SessionStatus, TokioClock, TokioFrameScheduler};
pub use error::{PlaybackError, Result};
pub use session::{PlaybackSession, PlaybackSessionBuilder};
pub use stall::{ReadinessSnapshot, TickOutcome};
pub use state::PlaybackState;
