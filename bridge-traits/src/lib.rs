//! # Host Bridge Traits
//!
//! Capability traits the host player must provide to the synchronizer.
//!
//! ## Overview
//!
//! The synchronizer drives a shared playback clock but owns none of the
//! surrounding plumbing. Decoding, presentation, network fetching and frame
//! scheduling all live in the host; this crate is the contract between the
//! two sides.
//!
//! ## Traits
//!
//! ### Media
//! - [`MediaSink`](sink::MediaSink) / [`VideoSink`](sink::VideoSink) - Track decoders/presenters
//! - [`StreamContext`](stream::StreamContext) - Network-streaming flag and duration
//!
//! ### Scheduling
//! - [`FrameScheduler`](scheduler::FrameScheduler) - Frame callbacks and single-shot timers
//! - [`PageVisibility`](lifecycle::PageVisibility) - Visibility transitions reported by the host
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Wall-clock source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Ready-made implementations
//!
//! | Capability       | Implementation        | Use                                |
//! |------------------|-----------------------|------------------------------------|
//! | `Clock`          | `SystemClock`         | Production                         |
//! | `Clock`          | `ManualClock`         | Tests, frame-stepping tools        |
//! | `MediaSink`      | `SilentAudioSink`     | Streams without an audio track     |
//! | `StreamContext`  | `StreamStatus`        | Flags updated by the fetcher       |
//! | `FrameScheduler` | `ManualScheduler`     | Host-owned render loops, tests     |
//! | `LoggerSink`     | `ConsoleLogger`       | Development                        |
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` on native targets (see
//! [`PlatformSendSync`](platform::PlatformSendSync)); sinks are typically
//! fed by decoder threads while the synchronizer reads their flags.

pub mod error;
pub mod lifecycle;
pub mod platform;
pub mod scheduler;
pub mod sink;
pub mod stream;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use lifecycle::PageVisibility;
pub use scheduler::{FrameScheduler, ManualScheduler, TaskHandle};
pub use sink::{MediaSink, SilentAudioSink, VideoSink};
pub use stream::{StreamContext, StreamStatus};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
