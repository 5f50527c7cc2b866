//! # Core Runtime Module
//!
//! Ambient runtime infrastructure shared by the synchronizer crates:
//! - Logging and tracing infrastructure
//! - Event bus carrying lifecycle and diagnostic events to the host
//!
//! ## Overview
//!
//! The playback core never throws outward; everything the host learns about
//! playback arrives as an event on the [`EventBus`](events::EventBus) or as a
//! structured log line.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
pub use events::{CoreEvent, DiagnosticEvent, EventBus, EventStream, PlaybackEvent};
