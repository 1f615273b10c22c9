//! Live-stream control bar: play, refresh and full-screen only

use super::adapt_padding;
use crate::controller::{ControlComponent, ControlWrapper, VisibilityAnimation};
use crate::player::{MediaPlayerControl, PlayState, PlayerState};
use crate::window::ViewHandle;

pub struct LiveControlView {
    view: ViewHandle,
    wrapper: Option<ControlWrapper>,
    visible: bool,
    play_selected: bool,
    full_screen_selected: bool,
    padding: (u32, u32),
}

impl LiveControlView {
    pub fn new(view: ViewHandle) -> Self {
        Self {
            view,
            wrapper: None,
            visible: false,
            play_selected: false,
            full_screen_selected: false,
            padding: (0, 0),
        }
    }

    pub fn toggle_play(&mut self) {
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.toggle_play();
        }
    }

    pub fn toggle_full_screen(&mut self) {
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.toggle_full_screen_with_rotation();
        }
    }

    /// Reconnect to the stream
    pub fn refresh(&mut self) {
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.replay(true);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_play_selected(&self) -> bool {
        self.play_selected
    }

    pub fn is_full_screen_selected(&self) -> bool {
        self.full_screen_selected
    }

    pub fn padding(&self) -> (u32, u32) {
        self.padding
    }
}

impl ControlComponent for LiveControlView {
    fn attach(&mut self, wrapper: ControlWrapper) {
        self.wrapper = Some(wrapper);
    }

    fn view(&self) -> Option<ViewHandle> {
        Some(self.view)
    }

    fn on_play_state_changed(&mut self, state: PlayState) {
        match state {
            PlayState::Idle
            | PlayState::StartAbort
            | PlayState::Preparing
            | PlayState::Prepared
            | PlayState::Error
            | PlayState::PlaybackCompleted => self.visible = false,
            PlayState::Playing => self.play_selected = true,
            PlayState::Paused => self.play_selected = false,
            PlayState::Buffering | PlayState::Buffered => {
                self.play_selected = self.wrapper.as_ref().is_some_and(|w| w.is_playing());
            }
        }
    }

    fn on_player_state_changed(&mut self, state: PlayerState) {
        match state {
            PlayerState::Normal => self.full_screen_selected = false,
            PlayerState::FullScreen => self.full_screen_selected = true,
            PlayerState::TinyScreen => {}
        }
        if let Some(wrapper) = self.wrapper.as_ref() {
            adapt_padding(wrapper, &mut self.padding);
        }
    }

    fn on_visibility_changed(&mut self, visible: bool, _animation: Option<VisibilityAnimation>) {
        self.visible = visible;
    }

    fn on_lock_state_changed(&mut self, locked: bool) {
        self.on_visibility_changed(!locked, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{PlayerCommand, ViewMessage};
    use crate::testing::WrapperProbe;

    #[test]
    fn test_live_bar() {
        let probe = WrapperProbe::new();
        let mut view = LiveControlView::new(ViewHandle(5));
        view.attach(probe.wrapper.clone());

        view.on_visibility_changed(true, None);
        view.on_play_state_changed(PlayState::Playing);
        assert!(view.is_visible());
        assert!(view.is_play_selected());

        view.on_play_state_changed(PlayState::Buffering);
        assert!(!view.is_play_selected());

        view.refresh();
        view.toggle_play();
        assert_eq!(
            probe.drain(),
            vec![
                ViewMessage::Player(PlayerCommand::Replay { reset_position: true }),
                ViewMessage::Player(PlayerCommand::Start),
            ]
        );

        view.on_lock_state_changed(true);
        assert!(!view.is_visible());
    }
}
