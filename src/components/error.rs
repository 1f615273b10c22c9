//! Playback error overlay with a retry action

use crate::controller::{ControlComponent, ControlWrapper};
use crate::player::{MediaPlayerControl, PlayState, PlayerState};
use crate::window::ViewHandle;

pub struct ErrorView {
    view: ViewHandle,
    wrapper: Option<ControlWrapper>,
    visible: bool,
}

impl ErrorView {
    pub fn new(view: ViewHandle) -> Self {
        Self {
            view,
            wrapper: None,
            visible: false,
        }
    }

    /// Hide the overlay and prepare the source again, keeping the position
    pub fn retry(&mut self) {
        self.visible = false;
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.replay(false);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl ControlComponent for ErrorView {
    fn attach(&mut self, wrapper: ControlWrapper) {
        self.wrapper = Some(wrapper);
    }

    fn view(&self) -> Option<ViewHandle> {
        Some(self.view)
    }

    fn on_play_state_changed(&mut self, state: PlayState) {
        match state {
            PlayState::Error => self.visible = true,
            PlayState::Idle => self.visible = false,
            _ => {}
        }
    }

    fn on_player_state_changed(&mut self, _state: PlayerState) {}
}
