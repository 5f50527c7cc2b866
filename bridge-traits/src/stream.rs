//! Stream Context
//!
//! Read-only view of the upstream stream that the synchronizer consults on
//! each tick: whether container data is still arriving over the network and
//! how long the stream is (when known).

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::platform::PlatformSendSync;

/// Live status of the stream feeding the sinks.
pub trait StreamContext: PlatformSendSync {
    /// `true` while more container data is still arriving over the network.
    fn is_streaming(&self) -> bool;

    /// Total duration in seconds, once the container header reported one.
    ///
    /// Live streams have no duration.
    fn duration(&self) -> Option<f64>;
}

/// Shared, host-updated stream status.
///
/// The demuxer/fetcher side flips the flags; the synchronizer only reads.
#[derive(Debug, Default)]
pub struct StreamStatus {
    streaming: AtomicBool,
    duration: RwLock<Option<f64>>,
}

impl StreamStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_streaming(&self, streaming: bool) {
        self.streaming.store(streaming, Ordering::Release);
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        *self.duration.write() = duration;
    }
}

impl StreamContext for StreamStatus {
    fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Acquire)
    }

    fn duration(&self) -> Option<f64> {
        *self.duration.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_status_updates() {
        let status = StreamStatus::new();
        assert!(!status.is_streaming());
        assert_eq!(status.duration(), None);

        status.set_streaming(true);
        status.set_duration(Some(42.0));
        assert!(status.is_streaming());
        assert_eq!(status.duration(), Some(42.0));

        status.set_streaming(false);
        assert!(!status.is_streaming());
    }
}
