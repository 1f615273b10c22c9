//! End-of-playback overlay with replay and a full-screen back button

use crate::controller::{ControlComponent, ControlWrapper, VideoControl};
use crate::player::{MediaPlayerControl, PlayState, PlayerState};
use crate::window::{ScreenOrientation, ViewHandle};

pub struct CompleteView {
    view: ViewHandle,
    wrapper: Option<ControlWrapper>,
    visible: bool,
    back_visible: bool,
    /// Left margin of the back button
    back_margin: u32,
}

impl CompleteView {
    pub fn new(view: ViewHandle) -> Self {
        Self {
            view,
            wrapper: None,
            visible: false,
            back_visible: false,
            back_margin: 0,
        }
    }

    /// Play again from the start
    pub fn replay(&mut self) {
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.replay(true);
        }
    }

    /// Leave full screen and return to portrait
    pub fn back(&mut self) {
        let Some(wrapper) = self.wrapper.as_mut() else { return };
        if wrapper.is_full_screen() && !wrapper.is_finishing() {
            wrapper.set_requested_orientation(ScreenOrientation::Portrait);
            wrapper.stop_full_screen();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_back_visible(&self) -> bool {
        self.back_visible
    }

    pub fn back_margin(&self) -> u32 {
        self.back_margin
    }
}

impl ControlComponent for CompleteView {
    fn attach(&mut self, wrapper: ControlWrapper) {
        self.wrapper = Some(wrapper);
    }

    fn view(&self) -> Option<ViewHandle> {
        Some(self.view)
    }

    fn on_play_state_changed(&mut self, state: PlayState) {
        if state == PlayState::PlaybackCompleted {
            self.visible = true;
            self.back_visible = self.wrapper.as_ref().is_some_and(|w| w.is_full_screen());
        } else {
            self.visible = false;
        }
    }

    fn on_player_state_changed(&mut self, state: PlayerState) {
        match state {
            PlayerState::FullScreen => self.back_visible = true,
            PlayerState::Normal => self.back_visible = false,
            PlayerState::TinyScreen => {}
        }

        let Some(wrapper) = self.wrapper.as_ref() else { return };
        if wrapper.is_finishing() {
            return;
        }
        match wrapper.requested_orientation() {
            ScreenOrientation::Landscape => self.back_margin = wrapper.cutout_height(),
            ScreenOrientation::Portrait | ScreenOrientation::ReverseLandscape => self.back_margin = 0,
            ScreenOrientation::Unspecified => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{PlayerCommand, ViewMessage};
    use crate::testing::WrapperProbe;
    use crate::window::Platform;

    #[test]
    fn test_shown_only_on_completion() {
        let probe = WrapperProbe::new();
        let mut view = CompleteView::new(ViewHandle(1));
        view.attach(probe.wrapper.clone());

        probe.player.write().full_screen = true;
        view.on_play_state_changed(PlayState::PlaybackCompleted);
        assert!(view.is_visible());
        assert!(view.is_back_visible());

        view.on_play_state_changed(PlayState::Preparing);
        assert!(!view.is_visible());
    }

    #[test]
    fn test_back_leaves_full_screen() {
        let probe = WrapperProbe::new();
        let mut view = CompleteView::new(ViewHandle(1));
        view.attach(probe.wrapper.clone());

        view.back();
        assert!(probe.drain().is_empty());

        probe.player.write().full_screen = true;
        view.back();
        assert_eq!(probe.platform.requested_orientation(), ScreenOrientation::Portrait);
        assert_eq!(probe.drain(), vec![ViewMessage::Player(PlayerCommand::StopFullScreen)]);

        view.replay();
        assert_eq!(
            probe.drain(),
            vec![ViewMessage::Player(PlayerCommand::Replay { reset_position: true })]
        );
    }

    #[test]
    fn test_back_margin_follows_cutout() {
        let probe = WrapperProbe::new();
        let mut view = CompleteView::new(ViewHandle(1));
        view.attach(probe.wrapper.clone());
        probe.controller.write().cutout_height = 90;

        probe.platform.set_requested_orientation(ScreenOrientation::Landscape);
        view.on_player_state_changed(PlayerState::FullScreen);
        assert_eq!(view.back_margin(), 90);

        probe.platform.set_requested_orientation(ScreenOrientation::Portrait);
        view.on_player_state_changed(PlayerState::Normal);
        assert_eq!(view.back_margin(), 0);
        assert!(!view.is_back_visible());
    }
}
