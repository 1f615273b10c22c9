//! Full-screen title bar

use super::adapt_padding;
use crate::controller::{ControlComponent, ControlWrapper, VideoControl, VisibilityAnimation};
use crate::player::{MediaPlayerControl, PlayState, PlayerState};
use crate::window::{ScreenOrientation, ViewHandle};

/// Title bar shown over the video in full screen only
pub struct TitleView {
    view: ViewHandle,
    wrapper: Option<ControlWrapper>,
    title: String,
    visible: bool,
    /// Marquee scrolling of the title
    title_selected: bool,
    battery_percent: Option<u32>,
    padding: (u32, u32),
}

impl TitleView {
    pub fn new(view: ViewHandle) -> Self {
        Self {
            view,
            wrapper: None,
            title: String::new(),
            visible: false,
            title_selected: false,
            battery_percent: None,
            padding: (0, 0),
        }
    }

    pub fn set_title<S: Into<String>>(&mut self, title: S) {
        self.title = title.into();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Battery charge reported by the host, as level over scale
    pub fn set_battery(&mut self, level: u32, scale: u32) {
        if scale > 0 {
            self.battery_percent = Some(level.min(scale) * 100 / scale);
        }
    }

    pub fn battery_percent(&self) -> Option<u32> {
        self.battery_percent
    }

    /// Back arrow: leave full screen and return to portrait
    pub fn back(&mut self) {
        let Some(wrapper) = self.wrapper.as_mut() else { return };
        if wrapper.is_full_screen() {
            wrapper.set_requested_orientation(ScreenOrientation::Portrait);
            wrapper.stop_full_screen();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_title_selected(&self) -> bool {
        self.title_selected
    }

    pub fn padding(&self) -> (u32, u32) {
        self.padding
    }
}

impl ControlComponent for TitleView {
    fn attach(&mut self, wrapper: ControlWrapper) {
        self.wrapper = Some(wrapper);
    }

    fn view(&self) -> Option<ViewHandle> {
        Some(self.view)
    }

    fn on_play_state_changed(&mut self, state: PlayState) {
        if matches!(
            state,
            PlayState::Idle
                | PlayState::StartAbort
                | PlayState::Preparing
                | PlayState::Prepared
                | PlayState::Error
                | PlayState::PlaybackCompleted
        ) {
            self.visible = false;
        }
    }

    fn on_player_state_changed(&mut self, state: PlayerState) {
        let Some(wrapper) = self.wrapper.as_ref() else { return };
        if state == PlayerState::FullScreen {
            if wrapper.is_showing() && !wrapper.is_locked() {
                self.visible = true;
            }
            self.title_selected = true;
        } else {
            self.visible = false;
            self.title_selected = false;
        }
        adapt_padding(wrapper, &mut self.padding);
    }

    fn on_visibility_changed(&mut self, visible: bool, _animation: Option<VisibilityAnimation>) {
        if self.wrapper.as_ref().is_some_and(|w| w.is_full_screen()) {
            self.visible = visible;
        }
    }

    fn on_lock_state_changed(&mut self, locked: bool) {
        self.visible = !locked;
    }
}
