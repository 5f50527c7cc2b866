//! Workspace facade crate.
//!
//! Re-exports the host bridge traits and the runtime so a host can depend on
//! `avsync-workspace` alone. The synchronizer itself is behind the default
//! `playback` feature; hosts that only implement sinks against the bridge
//! traits can turn it off.

pub use bridge_traits;
pub use core_runtime;

#[cfg(feature = "playback")]
pub use core_playback;

#[cfg(feature = "playback")]
pub use core_playback::{
    PlaybackConfig, PlaybackDriver, PlaybackHandle, PlaybackSession, PlaybackState,
};
