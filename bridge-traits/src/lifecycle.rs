//! Page / Window Visibility
//!
//! Hosts report visibility transitions so playback can pause while hidden:
//! - **Web**: Page Visibility API (`visibilitychange`)
//! - **Desktop**: window minimize/restore
//! - **Mobile**: activity or scene moving to the background

use serde::{Deserialize, Serialize};

/// Visibility of the surface the video is presented on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageVisibility {
    Visible,
    Hidden,
}

impl PageVisibility {
    pub fn is_hidden(&self) -> bool {
        matches!(self, PageVisibility::Hidden)
    }
}
