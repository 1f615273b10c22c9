//! Centered feedback for seek, volume and brightness gestures

use crate::controller::{ControlComponent, ControlWrapper, GestureComponent, VideoControl};
use crate::player::{PlayState, PlayerState};
use crate::utils::format_position;
use crate::window::ViewHandle;

/// Icon shown in the gesture popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureIcon {
    FastForward,
    FastRewind,
    Brightness,
    VolumeOff,
    VolumeUp,
}

pub struct GestureView {
    view: ViewHandle,
    wrapper: Option<ControlWrapper>,
    visible: bool,
    center_visible: bool,
    percent_bar_visible: bool,
    icon: Option<GestureIcon>,
    text: String,
    percent: u32,
}

impl GestureView {
    pub fn new(view: ViewHandle) -> Self {
        Self {
            view,
            wrapper: None,
            visible: false,
            center_visible: false,
            percent_bar_visible: false,
            icon: None,
            text: String::new(),
            percent: 0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_center_visible(&self) -> bool {
        self.center_visible
    }

    pub fn is_percent_bar_visible(&self) -> bool {
        self.percent_bar_visible
    }

    pub fn icon(&self) -> Option<GestureIcon> {
        self.icon
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    fn show_percent(&mut self, icon: GestureIcon, percent: u32) {
        self.percent_bar_visible = true;
        self.icon = Some(icon);
        self.text = format!("{}%", percent);
        self.percent = percent;
    }
}

impl ControlComponent for GestureView {
    fn attach(&mut self, wrapper: ControlWrapper) {
        self.wrapper = Some(wrapper);
    }

    fn view(&self) -> Option<ViewHandle> {
        Some(self.view)
    }

    fn on_play_state_changed(&mut self, state: PlayState) {
        self.visible = !matches!(
            state,
            PlayState::Idle
                | PlayState::StartAbort
                | PlayState::Preparing
                | PlayState::Prepared
                | PlayState::Error
                | PlayState::PlaybackCompleted
        );
    }

    fn on_player_state_changed(&mut self, _state: PlayerState) {}

    fn as_gesture_mut(&mut self) -> Option<&mut dyn GestureComponent> {
        Some(self)
    }
}

impl GestureComponent for GestureView {
    fn on_start_slide(&mut self) {
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.hide();
        }
        self.center_visible = true;
    }

    fn on_stop_slide(&mut self) {
        self.center_visible = false;
        // backends without a buffered callback never restart the progress loop
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.start_progress();
        }
    }

    fn on_position_change(&mut self, slide_position: u64, current_position: u64, duration: u64) {
        self.percent_bar_visible = false;
        self.icon = Some(if slide_position > current_position {
            GestureIcon::FastForward
        } else {
            GestureIcon::FastRewind
        });
        self.text = format!(
            "{}/{}",
            format_position(slide_position),
            format_position(duration)
        );
    }

    fn on_brightness_change(&mut self, percent: u32) {
        self.show_percent(GestureIcon::Brightness, percent);
    }

    fn on_volume_change(&mut self, percent: u32) {
        let icon = if percent == 0 {
            GestureIcon::VolumeOff
        } else {
            GestureIcon::VolumeUp
        };
        self.show_percent(icon, percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerCommand;
    use crate::player::ViewMessage;
    use crate::testing::WrapperProbe;

    #[test]
    fn test_slide_feedback() {
        let probe = WrapperProbe::new();
        let mut view = GestureView::new(ViewHandle(6));
        view.attach(probe.wrapper.clone());

        view.on_start_slide();
        assert!(view.is_center_visible());

        view.on_position_change(72_000, 90_000, 120_000);
        assert_eq!(view.icon(), Some(GestureIcon::FastRewind));
        assert_eq!(view.text(), "01:12/02:00");
        assert!(!view.is_percent_bar_visible());

        view.on_volume_change(0);
        assert_eq!(view.icon(), Some(GestureIcon::VolumeOff));
        assert_eq!(view.text(), "0%");

        view.on_brightness_change(80);
        assert_eq!(view.icon(), Some(GestureIcon::Brightness));
        assert_eq!(view.percent(), 80);

        view.on_stop_slide();
        assert!(!view.is_center_visible());
        assert_eq!(
            probe.drain(),
            vec![
                ViewMessage::Controller(ControllerCommand::Hide),
                ViewMessage::Controller(ControllerCommand::StartProgress),
            ]
        );
    }

    #[test]
    fn test_hidden_outside_playback() {
        let mut view = GestureView::new(ViewHandle(6));
        view.on_play_state_changed(PlayState::Buffering);
        assert!(view.is_visible());
        view.on_play_state_changed(PlayState::Prepared);
        assert!(!view.is_visible());
    }
}
