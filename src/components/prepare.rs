//! Pre-playback overlay: thumbnail, start button, loading spinner and the
//! mobile-network warning

use crate::controller::{ControlComponent, ControlWrapper};
use crate::player::{MediaPlayerControl, PlayState, PlayerState};
use crate::utils::config::PlaybackPolicy;
use crate::window::ViewHandle;
use log::info;

pub struct PrepareView {
    view: ViewHandle,
    wrapper: Option<ControlWrapper>,
    policy: PlaybackPolicy,
    click_start: bool,

    visible: bool,
    thumb_visible: bool,
    start_button_visible: bool,
    loading_visible: bool,
    net_warning_visible: bool,
}

impl PrepareView {
    pub fn new(view: ViewHandle, policy: PlaybackPolicy) -> Self {
        Self {
            view,
            wrapper: None,
            policy,
            click_start: false,
            visible: true,
            thumb_visible: true,
            start_button_visible: true,
            loading_visible: false,
            net_warning_visible: false,
        }
    }

    /// Make a click anywhere on the overlay start playback
    pub fn set_click_start(&mut self) {
        self.click_start = true;
    }

    /// # Returns
    ///
    /// true if the click started playback
    pub fn click(&mut self) -> bool {
        if !self.click_start {
            return false;
        }
        match self.wrapper.as_mut() {
            Some(wrapper) => {
                wrapper.start();
                true
            }
            None => false,
        }
    }

    /// The user accepted playback over the mobile network
    pub fn confirm_mobile_playback(&mut self) {
        info!("Mobile network playback allowed by the user");
        self.net_warning_visible = false;
        self.policy.set_play_on_mobile_network(true);
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.start();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_thumb_visible(&self) -> bool {
        self.thumb_visible
    }

    pub fn is_start_button_visible(&self) -> bool {
        self.start_button_visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading_visible
    }

    pub fn is_net_warning_visible(&self) -> bool {
        self.net_warning_visible
    }
}

impl ControlComponent for PrepareView {
    fn attach(&mut self, wrapper: ControlWrapper) {
        self.wrapper = Some(wrapper);
    }

    fn view(&self) -> Option<ViewHandle> {
        Some(self.view)
    }

    fn on_play_state_changed(&mut self, state: PlayState) {
        match state {
            PlayState::Preparing => {
                self.visible = true;
                self.start_button_visible = false;
                self.net_warning_visible = false;
                self.loading_visible = true;
            }
            PlayState::Playing
            | PlayState::Paused
            | PlayState::Error
            | PlayState::Buffering
            | PlayState::Buffered
            | PlayState::PlaybackCompleted => self.visible = false,
            PlayState::Idle => {
                self.visible = true;
                self.loading_visible = false;
                self.net_warning_visible = false;
                self.start_button_visible = true;
                self.thumb_visible = true;
            }
            PlayState::StartAbort => {
                self.visible = true;
                self.net_warning_visible = true;
            }
            PlayState::Prepared => {}
        }
    }

    fn on_player_state_changed(&mut self, _state: PlayerState) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{PlayerCommand, ViewMessage};
    use crate::testing::WrapperProbe;

    fn attached(probe: &WrapperProbe, policy: &PlaybackPolicy) -> PrepareView {
        let mut view = PrepareView::new(ViewHandle(1), policy.clone());
        view.attach(probe.wrapper.clone());
        view
    }

    #[test]
    fn test_loading_while_preparing() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe, &PlaybackPolicy::new(false));
        view.on_play_state_changed(PlayState::Preparing);
        assert!(view.is_visible());
        assert!(view.is_loading());
        assert!(!view.is_start_button_visible());

        view.on_play_state_changed(PlayState::Prepared);
        assert!(view.is_visible());

        view.on_play_state_changed(PlayState::Playing);
        assert!(!view.is_visible());

        view.on_play_state_changed(PlayState::Idle);
        assert!(view.is_visible());
        assert!(view.is_start_button_visible());
        assert!(!view.is_loading());
    }

    #[test]
    fn test_click_start_needs_opt_in() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe, &PlaybackPolicy::new(false));
        assert!(!view.click());
        assert!(probe.drain().is_empty());

        view.set_click_start();
        assert!(view.click());
        assert_eq!(probe.drain(), vec![ViewMessage::Player(PlayerCommand::Start)]);
    }

    #[test]
    fn test_confirm_mobile_playback() {
        let probe = WrapperProbe::new();
        let policy = PlaybackPolicy::new(false);
        let mut view = attached(&probe, &policy);

        view.on_play_state_changed(PlayState::StartAbort);
        assert!(view.is_net_warning_visible());

        view.confirm_mobile_playback();
        assert!(!view.is_net_warning_visible());
        assert!(policy.play_on_mobile_network());
        assert_eq!(probe.drain(), vec![ViewMessage::Player(PlayerCommand::Start)]);
    }
}
