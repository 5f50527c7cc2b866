//! # Tokio Playback Driver
//!
//! Runs a [`PlaybackSession`] on a single tokio task for hosts without their
//! own render loop.
//!
//! ## Overview
//!
//! The session takes `&mut self` everywhere and is owned by one task that
//! serialises two inputs through `tokio::select!`:
//!
//! - host commands sent through a cloneable [`PlaybackHandle`]
//! - wake-ups posted by [`TokioFrameScheduler`] when a frame interval or a
//!   retry delay elapses
//!
//! ```text
//! PlaybackHandle ──commands──┐
//!                            ├──> PlaybackDriver::run ──> PlaybackSession
//! TokioFrameScheduler ─wakes─┘                               │
//!        ^                                                   │
//!        └──────────── request_frame / schedule_once ────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let builder = PlaybackSession::builder(PlaybackConfig::cached_vod())
//!     .video_sink(video)
//!     .audio_sink(audio);
//! let (handle, task) = PlaybackDriver::spawn(builder)?;
//!
//! let mut events = handle.subscribe();
//! handle.play()?;
//! while let Ok(event) = events.recv().await {
//!     println!("{}", event.description());
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{Clock, FrameScheduler, PageVisibility, TaskHandle};
use chrono::{DateTime, Utc};
use core_runtime::events::{EventBus, EventStream};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::error::{PlaybackError, Result};
use crate::session::{PlaybackSession, PlaybackSessionBuilder};
use crate::state::PlaybackState;

// ============================================================================
// Scheduler
// ============================================================================

/// A scheduler callback that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    Frame(TaskHandle),
    Retry(TaskHandle),
}

/// [`FrameScheduler`] backed by tokio timers.
///
/// Frame requests fire after the configured frame interval; delayed tasks
/// after their own delay. Fired handles are posted to the driver's wake-up
/// channel. Cancelling aborts the timer task.
pub struct TokioFrameScheduler {
    runtime: Handle,
    frame_interval: Duration,
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<TaskHandle, JoinHandle<()>>>>,
    wakeups: mpsc::UnboundedSender<Wakeup>,
}

impl TokioFrameScheduler {
    /// Create a scheduler on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Runtime`] when called outside a runtime.
    pub fn new(
        frame_interval: Duration,
        wakeups: mpsc::UnboundedSender<Wakeup>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            core_runtime::Error::Internal(format!("no tokio runtime for frame scheduler: {e}"))
        })?;

        Ok(Self {
            runtime,
            frame_interval,
            next_id: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
            wakeups,
        })
    }

    /// Number of timers still armed.
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Abort every armed timer.
    pub fn cancel_all(&self) {
        for (_, task) in self.tasks.lock().drain() {
            task.abort();
        }
    }

    fn arm(&self, delay: Duration, wakeup: impl FnOnce(TaskHandle) -> Wakeup) -> TaskHandle {
        let handle = TaskHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let wakeup = wakeup(handle);
        let tasks = Arc::clone(&self.tasks);
        let sender = self.wakeups.clone();

        // Hold the lock across spawn so the timer cannot remove its entry
        // before it is inserted.
        let mut armed = self.tasks.lock();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            tasks.lock().remove(&handle);
            // Driver gone means nothing left to wake.
            sender.send(wakeup).ok();
        });
        armed.insert(handle, task);
        handle
    }
}

impl FrameScheduler for TokioFrameScheduler {
    fn request_frame(&self) -> TaskHandle {
        self.arm(self.frame_interval, Wakeup::Frame)
    }

    fn schedule_once(&self, delay: Duration) -> TaskHandle {
        self.arm(delay, Wakeup::Retry)
    }

    fn cancel(&self, handle: TaskHandle) {
        if let Some(task) = self.tasks.lock().remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioFrameScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Wall clock that follows tokio's time source.
///
/// Identical to the system clock under a normal runtime; under a paused test
/// runtime it advances with `tokio::time::advance` and auto-advance.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: DateTime<Utc>,
    started: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Utc::now(),
            started: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin + elapsed
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Point-in-time view of a driven session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: PlaybackState,
    pub current_time: f64,
    pub destroyed: bool,
}

#[derive(Debug)]
enum Command {
    Play,
    Pause,
    Seek(f64),
    StreamReady,
    Destroy,
    Visibility(PageVisibility),
    ReportTime(f64),
    Status(oneshot::Sender<SessionStatus>),
    Shutdown,
}

/// Owns a session and feeds it commands and scheduler wake-ups.
pub struct PlaybackDriver {
    session: PlaybackSession,
    scheduler: Arc<TokioFrameScheduler>,
    commands: mpsc::UnboundedReceiver<Command>,
    wakeups: mpsc::UnboundedReceiver<Wakeup>,
}

impl PlaybackDriver {
    /// Build the session with a [`TokioFrameScheduler`] and return the driver
    /// together with its handle, without starting it.
    pub fn new(builder: PlaybackSessionBuilder) -> Result<(Self, PlaybackHandle)> {
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let scheduler = Arc::new(TokioFrameScheduler::new(
            builder.config().frame_interval,
            wake_tx,
        )?);
        let session = builder
            .scheduler(Arc::clone(&scheduler) as Arc<dyn FrameScheduler>)
            .build()?;

        let handle = PlaybackHandle {
            commands: cmd_tx,
            events: session.events().clone(),
        };

        Ok((
            Self {
                session,
                scheduler,
                commands: cmd_rx,
                wakeups: wake_rx,
            },
            handle,
        ))
    }

    /// Build the session and run it on a new tokio task.
    pub fn spawn(builder: PlaybackSessionBuilder) -> Result<(PlaybackHandle, JoinHandle<()>)> {
        let (driver, handle) = Self::new(builder)?;
        let task = tokio::spawn(driver.run());
        Ok((handle, task))
    }

    /// Process commands and wake-ups until shutdown or until every handle is
    /// dropped. The session is destroyed on the way out.
    pub async fn run(mut self) {
        info!(
            live = self.session.config().live,
            cache = self.session.config().cache,
            "playback driver started"
        );

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },

                Some(wakeup) = self.wakeups.recv() => {
                    trace!(?wakeup, "scheduler wake-up");
                    match wakeup {
                        Wakeup::Frame(handle) => self.session.on_frame(handle),
                        Wakeup::Retry(handle) => self.session.on_retry(handle),
                    }
                }
            }
        }

        self.session.destroy();
        self.scheduler.cancel_all();
        info!("playback driver stopped");
    }

    fn apply(&mut self, command: Command) {
        debug!(?command, "driver command");
        match command {
            Command::Play => self.session.play(),
            Command::Pause => self.session.pause(),
            Command::Seek(target) => self.session.seek(target),
            Command::StreamReady => self.session.on_stream_ready(),
            Command::Destroy => self.session.destroy(),
            Command::Visibility(visibility) => self.session.on_visibility_change(visibility),
            Command::ReportTime(time) => self.session.on_time_reported(time),
            Command::Status(reply) => {
                reply
                    .send(SessionStatus {
                        state: self.session.state(),
                        current_time: self.session.current_time(),
                        destroyed: self.session.is_destroyed(),
                    })
                    .ok();
            }
            Command::Shutdown => {}
        }
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable remote control for a running [`PlaybackDriver`].
///
/// Every method fails with [`PlaybackError::DriverClosed`] once the driver
/// has stopped; otherwise commands are queued and applied in order.
#[derive(Clone)]
pub struct PlaybackHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: EventBus,
}

impl PlaybackHandle {
    pub fn play(&self) -> Result<()> {
        self.send(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn seek(&self, target_time: f64) -> Result<()> {
        self.send(Command::Seek(target_time))
    }

    pub fn stream_ready(&self) -> Result<()> {
        self.send(Command::StreamReady)
    }

    pub fn destroy(&self) -> Result<()> {
        self.send(Command::Destroy)
    }

    pub fn set_visibility(&self, visibility: PageVisibility) -> Result<()> {
        self.send(Command::Visibility(visibility))
    }

    pub fn report_time(&self, time: f64) -> Result<()> {
        self.send(Command::ReportTime(time))
    }

    /// Stop the driver. The session is destroyed before the task exits.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// Current state and time, as seen after every earlier command.
    pub async fn status(&self) -> Result<SessionStatus> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Status(tx))?;
        rx.await.map_err(|_| PlaybackError::DriverClosed)
    }

    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::DriverClosed)
    }
}

impl std::fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackHandle")
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}
