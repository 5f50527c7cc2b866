//! Frame Scheduling
//!
//! Abstracts the two deferred-execution primitives the playback loop needs:
//!
//! - a rendering-rate frame callback (`requestAnimationFrame`, a vsync
//!   callback, or a fixed-cadence timer on headless hosts)
//! - a single-shot delayed task (`setTimeout`) used for stall retries
//!
//! The scheduler never calls back into the session directly. It hands out a
//! [`TaskHandle`] and the host later delivers that handle to the session
//! (`on_frame` / `on_retry`). A handle that was cancelled, or that has been
//! superseded, is ignored by the receiver.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

use crate::platform::PlatformSendSync;

/// Identifier of a scheduled frame callback or delayed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub u64);

/// Host-provided frame and timer scheduling.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::scheduler::FrameScheduler;
/// use std::time::Duration;
///
/// fn arm(scheduler: &dyn FrameScheduler) {
///     let frame = scheduler.request_frame();
///     let retry = scheduler.schedule_once(Duration::from_millis(1000));
///     scheduler.cancel(retry);
///     let _ = frame;
/// }
/// ```
pub trait FrameScheduler: PlatformSendSync {
    /// Request a callback on the next rendering frame.
    fn request_frame(&self) -> TaskHandle;

    /// Request a single callback after `delay`.
    fn schedule_once(&self, delay: Duration) -> TaskHandle;

    /// Cancel a pending frame or delayed task. Unknown handles are ignored.
    fn cancel(&self, handle: TaskHandle);
}

/// Cancelled handles [`ManualScheduler`] remembers; older ones are dropped.
pub const CANCEL_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    frames: Vec<TaskHandle>,
    timers: Vec<(TaskHandle, Duration)>,
    cancelled: VecDeque<TaskHandle>,
}

impl ManualState {
    fn next_handle(&mut self) -> TaskHandle {
        self.next_id += 1;
        TaskHandle(self.next_id)
    }
}

/// Scheduler whose callbacks are fired by the host itself.
///
/// Suits hosts that already own a render loop (an immediate-mode UI calling
/// the session once per repaint) and deterministic tests. Requests queue up
/// until the host takes them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest pending frame request.
    pub fn take_frame(&self) -> Option<TaskHandle> {
        let mut state = self.state.lock();
        if state.frames.is_empty() {
            None
        } else {
            Some(state.frames.remove(0))
        }
    }

    /// Pop the oldest pending delayed task together with its delay.
    pub fn take_timer(&self) -> Option<(TaskHandle, Duration)> {
        let mut state = self.state.lock();
        if state.timers.is_empty() {
            None
        } else {
            Some(state.timers.remove(0))
        }
    }

    pub fn pending_frames(&self) -> Vec<TaskHandle> {
        self.state.lock().frames.clone()
    }

    pub fn pending_timers(&self) -> Vec<(TaskHandle, Duration)> {
        self.state.lock().timers.clone()
    }

    /// The most recent handles passed to [`FrameScheduler::cancel`], oldest
    /// first, at most [`CANCEL_HISTORY_LIMIT`].
    pub fn cancelled(&self) -> Vec<TaskHandle> {
        self.state.lock().cancelled.iter().copied().collect()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self) -> TaskHandle {
        let mut state = self.state.lock();
        let handle = state.next_handle();
        state.frames.push(handle);
        handle
    }

    fn schedule_once(&self, delay: Duration) -> TaskHandle {
        let mut state = self.state.lock();
        let handle = state.next_handle();
        state.timers.push((handle, delay));
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        let mut state = self.state.lock();
        state.frames.retain(|h| *h != handle);
        state.timers.retain(|(h, _)| *h != handle);
        if state.cancelled.len() == CANCEL_HISTORY_LIMIT {
            state.cancelled.pop_front();
        }
        state.cancelled.push_back(handle);
    }
}
