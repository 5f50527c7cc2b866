//! # Event Bus System
//!
//! Carries everything the synchronizer reports outward, using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`PlaybackEvent`] for the lifecycle signals a player UI
//!   binds to, [`DiagnosticEvent`] for observability records
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐  emit   ┌───────────┐  subscribe  ┌─────────────┐
//! │ PlaybackSession  ├────────>│ EventBus  ├────────────>│ Player UI   │
//! └──────────────────┘         │ (broadcast│             └─────────────┘
//!                              │  channel) │  subscribe  ┌─────────────┐
//!                              │           ├────────────>│ Debug panel │
//!                              └───────────┘             └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(64);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::Play)).ok();
//! assert_eq!(rx.recv().await.unwrap(), CoreEvent::Playback(PlaybackEvent::Play));
//! # }
//! ```
//!
//! ## Ordering
//!
//! A single broadcast channel preserves emission order for every subscriber,
//! so `timeupdate` events arrive in the order the clock produced them and a
//! `seeked` always follows the draw it belongs to.
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   Non-fatal; `timeupdate` at frame rate is the usual culprit.
//! - **`RecvError::Closed`**: All senders have been dropped (session gone).

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Sized for several seconds of per-frame `timeupdate` events at 60 Hz.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback lifecycle signals
    Playback(PlaybackEvent),
    /// Observability records
    Diagnostic(DiagnosticEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Diagnostic(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Waiting { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::Ended { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Seeked { .. }) => EventSeverity::Info,
            CoreEvent::Diagnostic(DiagnosticEvent::PlayRetry { .. }) => EventSeverity::Warning,
            _ => EventSeverity::Debug,
        }
    }

    /// The playback event, if this is one.
    pub fn as_playback(&self) -> Option<&PlaybackEvent> {
        match self {
            CoreEvent::Playback(e) => Some(e),
            CoreEvent::Diagnostic(_) => None,
        }
    }
}

impl From<PlaybackEvent> for CoreEvent {
    fn from(event: PlaybackEvent) -> Self {
        CoreEvent::Playback(event)
    }
}

impl From<DiagnosticEvent> for CoreEvent {
    fn from(event: DiagnosticEvent) -> Self {
        CoreEvent::Diagnostic(event)
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Lifecycle signals emitted by the playback session.
///
/// Times are seconds on the session timeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum PlaybackEvent {
    /// Sinks were commanded to play and the clock loop was armed.
    Play,
    /// The loop was cancelled and both sinks stopped.
    Pause,
    /// Sinks are not both presenting but data is still arriving or decoding.
    Waiting { current_time: f64 },
    /// The clock advanced.
    #[serde(rename = "timeupdate")]
    TimeUpdate { current_time: f64 },
    /// Nothing is presenting and nothing is in flight.
    Ended { current_time: f64 },
    /// Playback wrapped back to the start of a cached stream.
    Loop,
    /// A seek finished; the target frame has been drawn.
    Seeked { target_time: f64 },
}

impl PlaybackEvent {
    /// Wire name of the event, as player UIs subscribe to it.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackEvent::Play => "play",
            PlaybackEvent::Pause => "pause",
            PlaybackEvent::Waiting { .. } => "waiting",
            PlaybackEvent::TimeUpdate { .. } => "timeupdate",
            PlaybackEvent::Ended { .. } => "ended",
            PlaybackEvent::Loop => "loop",
            PlaybackEvent::Seeked { .. } => "seeked",
        }
    }

    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Play => "Playback started",
            PlaybackEvent::Pause => "Playback paused",
            PlaybackEvent::Waiting { .. } => "Waiting for data",
            PlaybackEvent::TimeUpdate { .. } => "Playback time advanced",
            PlaybackEvent::Ended { .. } => "Playback ended",
            PlaybackEvent::Loop => "Playback looped",
            PlaybackEvent::Seeked { .. } => "Seek completed",
        }
    }
}

// ============================================================================
// Diagnostic Events
// ============================================================================

/// Records surfaced for observability tooling, never as errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum DiagnosticEvent {
    /// A stall retry fired. Snapshot of what the sinks and stream reported.
    PlayRetry {
        current_time: f64,
        streaming: bool,
        video_playing: bool,
        audio_playing: bool,
        video_decoding: bool,
        audio_decoding: bool,
        delay_ms: u64,
    },
}

impl DiagnosticEvent {
    fn description(&self) -> &str {
        match self {
            DiagnosticEvent::PlayRetry { .. } => "Retrying playback after stall",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus clones the sender; every clone publishes into the same
/// channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers that fall more than `capacity` events behind receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when nobody is listening.
    pub fn emit(&self, event: impl Into<CoreEvent>) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event.into())
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::default();
/// // Drop the per-frame clock ticks, keep everything else.
/// let stream = EventStream::new(bus.subscribe()).filter(|event| {
///     event.as_playback().map(|e| e.name() != "timeupdate").unwrap_or(true)
/// });
/// # let _ = stream;
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every event currently buffered, skipping lag markers.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
