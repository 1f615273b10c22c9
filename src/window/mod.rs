//! Window module for TSPlayer
//!
//! Everything the core needs from the host window system sits behind the
//! `Platform` trait: screen metrics, container placement for full screen
//! and tiny window, system chrome, orientation requests, brightness and
//! the overlay stack. Raw touch and sensor input arrive as plain values.

pub mod cutout;
mod gesture;
mod orientation;

pub use cutout::{has_cutout, CutoutMode, DeviceInfo};
pub use gesture::{Gesture, GestureDetector, DOUBLE_TAP_TIMEOUT_MS};
pub use orientation::{OrientationHelper, ORIENTATION_UNKNOWN};

/// Host window system trait
pub trait Platform: Send + Sync {
    /// Physical screen size in pixels
    fn screen_size(&self) -> (u32, u32);

    /// Pixels per density-independent pixel
    fn density(&self) -> f32;

    /// Height of the status bar in portrait, in pixels
    fn status_bar_height(&self) -> u32;

    fn network_type(&self) -> NetworkType;

    /// Move the player container
    ///
    /// # Returns
    ///
    /// false if the target does not exist and nothing was moved
    fn attach_player_container(&self, target: ContainerTarget) -> bool;

    fn set_system_bars_visible(&self, visible: bool);

    fn set_keep_screen_on(&self, keep_on: bool);

    fn requested_orientation(&self) -> ScreenOrientation;

    fn set_requested_orientation(&self, orientation: ScreenOrientation);

    /// The hosting screen is going away
    fn is_finishing(&self) -> bool;

    /// Window brightness override, None when following the system
    fn window_brightness(&self) -> Option<f32>;

    fn set_window_brightness(&self, brightness: f32);

    fn set_cutout_mode(&self, mode: CutoutMode);

    fn device_info(&self) -> DeviceInfo;

    /// Push a control view on top of the overlay stack
    fn add_overlay_view(&self, view: ViewHandle);

    fn remove_overlay_view(&self, view: ViewHandle);

    /// Convert density-independent pixels to pixels
    fn dp_to_px(&self, dp: f32) -> f32 {
        dp * self.density()
    }
}

/// Active network transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    None,
    Closed,
    Ethernet,
    Wifi,
    Mobile,
    Unknown,
}

/// Where the player container lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerTarget {
    /// Inside the view itself
    Embedded,
    /// Top-level window decoration, covering the screen
    Decor,
    /// Floating in the content root with an explicit size
    Content { width: u32, height: u32 },
}

/// Requested screen orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOrientation {
    Unspecified,
    Portrait,
    Landscape,
    ReverseLandscape,
}

/// Opaque identity of a control view in the overlay stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Phase of a touch sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// One raw touch sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    /// Position relative to the controller
    pub x: f32,
    pub y: f32,
    /// Position relative to the screen
    pub raw_x: f32,
    pub raw_y: f32,
    /// Event time in clock milliseconds
    pub time_ms: u64,
}

impl TouchEvent {
    /// Sample whose view and screen coordinates coincide
    pub fn new(action: TouchAction, x: f32, y: f32, time_ms: u64) -> Self {
        Self {
            action,
            x,
            y,
            raw_x: x,
            raw_y: y,
            time_ms,
        }
    }
}

/// Margin around the screen border reserved for system gestures, in dp
pub const EDGE_MARGIN_DP: f32 = 40.0;

/// Whether a touch starts in the system gesture margin of the screen
pub fn is_edge(platform: &dyn Platform, event: &TouchEvent) -> bool {
    let edge = platform.dp_to_px(EDGE_MARGIN_DP);
    let (width, height) = platform.screen_size();
    event.raw_x < edge
        || event.raw_x > width as f32 - edge
        || event.raw_y < edge
        || event.raw_y > height as f32 - edge
}
