//! Lock button and loading spinner of the stock controller

use crate::controller::{ControlComponent, ControlWrapper, VideoControl, VisibilityAnimation};
use crate::player::{MediaPlayerControl, PlayState, PlayerState};
use crate::window::{ScreenOrientation, ViewHandle};
use log::info;

/// Lock button inset from the screen edges, in dp
const LOCK_MARGIN_DP: f32 = 24.0;

/// Chrome owned by the controller itself rather than by a bar
///
/// The lock button only exists in full screen and follows the controller's
/// visibility even while locked, so a tap can bring it back to unlock.
pub struct StandardControlView {
    view: ViewHandle,
    wrapper: Option<ControlWrapper>,
    lock_visible: bool,
    lock_selected: bool,
    loading_visible: bool,
    /// Set by Buffering and cleared by Buffered, so the spinner survives
    /// the Playing or Paused reports in between
    buffering: bool,
    lock_margins: (u32, u32),
}

impl StandardControlView {
    pub fn new(view: ViewHandle) -> Self {
        Self {
            view,
            wrapper: None,
            lock_visible: false,
            lock_selected: false,
            loading_visible: false,
            buffering: false,
            lock_margins: (0, 0),
        }
    }

    /// Lock button click
    pub fn toggle_lock(&mut self) {
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.toggle_lock_state();
        }
    }

    pub fn is_lock_visible(&self) -> bool {
        self.lock_visible
    }

    pub fn is_lock_selected(&self) -> bool {
        self.lock_selected
    }

    pub fn is_loading_visible(&self) -> bool {
        self.loading_visible
    }

    /// `(left, right)` margins of the lock button in pixels
    pub fn lock_margins(&self) -> (u32, u32) {
        self.lock_margins
    }

    fn adapt_lock_margins(&mut self) {
        let Some(wrapper) = self.wrapper.as_ref() else { return };
        if !wrapper.has_cutout() {
            return;
        }
        let edge = (LOCK_MARGIN_DP * wrapper.density()).round() as u32;
        let cutout = wrapper.cutout_height();
        self.lock_margins = match wrapper.requested_orientation() {
            ScreenOrientation::Portrait | ScreenOrientation::ReverseLandscape => (edge, edge),
            ScreenOrientation::Landscape => (edge + cutout, edge + cutout),
            ScreenOrientation::Unspecified => return,
        };
    }
}

impl ControlComponent for StandardControlView {
    fn attach(&mut self, wrapper: ControlWrapper) {
        self.wrapper = Some(wrapper);
    }

    fn view(&self) -> Option<ViewHandle> {
        Some(self.view)
    }

    fn on_play_state_changed(&mut self, state: PlayState) {
        match state {
            PlayState::Idle => {
                self.lock_selected = false;
                self.loading_visible = false;
                self.buffering = false;
            }
            PlayState::Preparing => self.loading_visible = true,
            PlayState::Buffering => {
                self.loading_visible = true;
                self.buffering = true;
            }
            PlayState::Prepared
            | PlayState::Playing
            | PlayState::Paused
            | PlayState::Error
            | PlayState::Buffered => {
                if state == PlayState::Buffered {
                    self.buffering = false;
                }
                if !self.buffering {
                    self.loading_visible = false;
                }
            }
            PlayState::PlaybackCompleted => {
                self.loading_visible = false;
                self.lock_visible = false;
                self.lock_selected = false;
            }
            PlayState::StartAbort => {}
        }
    }

    fn on_player_state_changed(&mut self, state: PlayerState) {
        match state {
            PlayerState::Normal => self.lock_visible = false,
            PlayerState::FullScreen => {
                self.lock_visible = self.wrapper.as_ref().is_some_and(|w| w.is_showing());
            }
            PlayerState::TinyScreen => {}
        }
        self.adapt_lock_margins();
    }

    fn on_visibility_changed(&mut self, visible: bool, _animation: Option<VisibilityAnimation>) {
        if self.wrapper.as_ref().is_some_and(|w| w.is_full_screen()) {
            self.lock_visible = visible;
        }
    }

    fn on_lock_state_changed(&mut self, locked: bool) {
        self.lock_selected = locked;
        info!("Controls {}", if locked { "locked" } else { "unlocked" });
    }

    fn shown_while_locked(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerCommand;
    use crate::player::ViewMessage;
    use crate::testing::WrapperProbe;
    use crate::window::Platform;

    fn attached(probe: &WrapperProbe) -> StandardControlView {
        let mut view = StandardControlView::new(ViewHandle(0));
        view.attach(probe.wrapper.clone());
        view
    }

    #[test]
    fn test_lock_button_posts_toggle() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);

        view.toggle_lock();
        probe.controller.write().locked = true;
        view.toggle_lock();
        assert_eq!(
            probe.drain(),
            vec![
                ViewMessage::Controller(ControllerCommand::SetLocked(true)),
                ViewMessage::Controller(ControllerCommand::SetLocked(false)),
            ]
        );

        view.on_lock_state_changed(true);
        assert!(view.is_lock_selected());
        view.on_lock_state_changed(false);
        assert!(!view.is_lock_selected());
    }

    #[test]
    fn test_lock_button_only_in_full_screen() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);

        view.on_visibility_changed(true, None);
        assert!(!view.is_lock_visible());

        probe.player.write().full_screen = true;
        probe.controller.write().showing = true;
        view.on_player_state_changed(PlayerState::FullScreen);
        assert!(view.is_lock_visible());

        view.on_visibility_changed(false, Some(VisibilityAnimation::fade_out()));
        assert!(!view.is_lock_visible());
        view.on_visibility_changed(true, Some(VisibilityAnimation::fade_in()));
        assert!(view.is_lock_visible());

        probe.player.write().full_screen = false;
        view.on_player_state_changed(PlayerState::Normal);
        assert!(!view.is_lock_visible());
    }

    #[test]
    fn test_full_screen_while_hidden_keeps_lock_hidden() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);
        probe.player.write().full_screen = true;

        view.on_player_state_changed(PlayerState::FullScreen);
        assert!(!view.is_lock_visible());
    }

    #[test]
    fn test_completion_clears_lock() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);
        probe.player.write().full_screen = true;
        probe.controller.write().showing = true;
        view.on_player_state_changed(PlayerState::FullScreen);
        view.on_lock_state_changed(true);

        view.on_play_state_changed(PlayState::PlaybackCompleted);
        assert!(!view.is_lock_visible());
        assert!(!view.is_lock_selected());
    }

    #[test]
    fn test_spinner_sticks_until_buffered() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);

        view.on_play_state_changed(PlayState::Preparing);
        assert!(view.is_loading_visible());
        view.on_play_state_changed(PlayState::Prepared);
        assert!(!view.is_loading_visible());

        view.on_play_state_changed(PlayState::Buffering);
        assert!(view.is_loading_visible());
        view.on_play_state_changed(PlayState::Paused);
        assert!(view.is_loading_visible());
        view.on_play_state_changed(PlayState::Buffered);
        assert!(!view.is_loading_visible());
    }

    #[test]
    fn test_idle_forgets_buffering() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);
        view.on_play_state_changed(PlayState::Buffering);
        view.on_play_state_changed(PlayState::Idle);
        assert!(!view.is_loading_visible());

        view.on_play_state_changed(PlayState::Preparing);
        view.on_play_state_changed(PlayState::Prepared);
        assert!(!view.is_loading_visible());
    }

    #[test]
    fn test_lock_margins_clear_cutout() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);
        probe.platform.set_density(2.0);
        probe.controller.write().has_cutout = true;
        probe.controller.write().cutout_height = 80;

        probe.platform.set_requested_orientation(ScreenOrientation::Landscape);
        view.on_player_state_changed(PlayerState::FullScreen);
        assert_eq!(view.lock_margins(), (128, 128));

        probe.platform.set_requested_orientation(ScreenOrientation::ReverseLandscape);
        view.on_player_state_changed(PlayerState::FullScreen);
        assert_eq!(view.lock_margins(), (48, 48));

        probe.platform.set_requested_orientation(ScreenOrientation::Portrait);
        view.on_player_state_changed(PlayerState::Normal);
        assert_eq!(view.lock_margins(), (48, 48));
    }

    #[test]
    fn test_no_cutout_keeps_margins() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);
        probe.platform.set_requested_orientation(ScreenOrientation::Landscape);
        view.on_player_state_changed(PlayerState::FullScreen);
        assert_eq!(view.lock_margins(), (0, 0));
    }

    #[test]
    fn test_visible_while_locked() {
        assert!(StandardControlView::new(ViewHandle(0)).shown_while_locked());
    }
}
