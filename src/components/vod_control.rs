//! On-demand control bar: play button, seek bar, times and full-screen toggle

use super::adapt_padding;
use crate::controller::{ControlComponent, ControlWrapper, VideoControl, VisibilityAnimation};
use crate::player::{MediaPlayerControl, PlayState, PlayerState};
use crate::utils::format_position;
use crate::window::ViewHandle;
use log::debug;

/// Resolution of the seek bar
pub const PROGRESS_MAX: u32 = 1000;

/// Buffered percentage treated as fully buffered
const FULL_BUFFER_PERCENT: u32 = 95;

pub struct VodControlView {
    view: ViewHandle,
    wrapper: Option<ControlWrapper>,
    show_bottom_progress: bool,
    dragging: bool,

    visible: bool,
    bottom_container_visible: bool,
    bottom_progress_visible: bool,
    seek_enabled: bool,
    progress: u32,
    secondary_progress: u32,
    current_time: String,
    total_time: String,
    play_selected: bool,
    full_screen_selected: bool,
    padding: (u32, u32),
}

impl VodControlView {
    pub fn new(view: ViewHandle) -> Self {
        Self {
            view,
            wrapper: None,
            show_bottom_progress: true,
            dragging: false,
            visible: false,
            bottom_container_visible: false,
            bottom_progress_visible: false,
            seek_enabled: false,
            progress: 0,
            secondary_progress: 0,
            current_time: format_position(0),
            total_time: format_position(0),
            play_selected: false,
            full_screen_selected: false,
            padding: (0, 0),
        }
    }

    /// Show a thin progress line while the bar is hidden, on by default
    pub fn show_bottom_progress(&mut self, show: bool) {
        self.show_bottom_progress = show;
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

    /// The user grabbed the seek bar
    pub fn start_tracking(&mut self) {
        self.dragging = true;
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.stop_progress();
            wrapper.stop_fade_out();
        }
    }

    /// Preview the time under the thumb while dragging
    pub fn track(&mut self, progress: u32) {
        let Some(wrapper) = self.wrapper.as_ref() else { return };
        let position = Self::position_for(wrapper.duration(), progress);
        self.current_time = format_position(position);
    }

    /// The user released the seek bar at `progress`
    pub fn stop_tracking(&mut self, progress: u32) {
        let Some(wrapper) = self.wrapper.as_mut() else { return };
        let position = Self::position_for(wrapper.duration(), progress);
        debug!("Seek bar released at {}/{} -> {}ms", progress, PROGRESS_MAX, position);
        wrapper.seek_to(position);
        self.dragging = false;
        wrapper.start_progress();
        wrapper.start_fade_out();
    }

    fn position_for(duration: u64, progress: u32) -> u64 {
        duration * u64::from(progress.min(PROGRESS_MAX)) / u64::from(PROGRESS_MAX)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_bottom_container_visible(&self) -> bool {
        self.bottom_container_visible
    }

    pub fn is_bottom_progress_visible(&self) -> bool {
        self.bottom_progress_visible
    }

    pub fn is_seek_enabled(&self) -> bool {
        self.seek_enabled
    }

    /// Seek bar value in `0..=PROGRESS_MAX`
    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn secondary_progress(&self) -> u32 {
        self.secondary_progress
    }

    pub fn current_time(&self) -> &str {
        &self.current_time
    }

    pub fn total_time(&self) -> &str {
        &self.total_time
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

impl ControlComponent for VodControlView {
    fn attach(&mut self, wrapper: ControlWrapper) {
        self.wrapper = Some(wrapper);
    }

    fn view(&self) -> Option<ViewHandle> {
        Some(self.view)
    }

    fn on_play_state_changed(&mut self, state: PlayState) {
        let Some(wrapper) = self.wrapper.as_mut() else { return };
        match state {
            PlayState::Idle | PlayState::PlaybackCompleted => {
                self.visible = false;
                self.progress = 0;
                self.secondary_progress = 0;
            }
            PlayState::StartAbort | PlayState::Preparing | PlayState::Prepared | PlayState::Error => {
                self.visible = false;
            }
            PlayState::Playing => {
                self.play_selected = true;
                if self.show_bottom_progress {
                    let showing = wrapper.is_showing();
                    self.bottom_container_visible = showing;
                    self.bottom_progress_visible = !showing;
                } else {
                    self.bottom_container_visible = false;
                }
                self.visible = true;
                wrapper.start_progress();
            }
            PlayState::Paused => self.play_selected = false,
            PlayState::Buffering => {
                self.play_selected = wrapper.is_playing();
                wrapper.stop_progress();
            }
            PlayState::Buffered => {
                self.play_selected = wrapper.is_playing();
                wrapper.start_progress();
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
        self.bottom_container_visible = visible;
        if self.show_bottom_progress {
            self.bottom_progress_visible = !visible;
        }
    }

    fn on_lock_state_changed(&mut self, locked: bool) {
        self.on_visibility_changed(!locked, None);
    }

    fn set_progress(&mut self, position: u64, duration: u64) {
        if self.dragging {
            return;
        }

        if duration > 0 {
            self.seek_enabled = true;
            let ratio = position.min(duration) * u64::from(PROGRESS_MAX) / duration;
            self.progress = ratio as u32;
        } else {
            self.seek_enabled = false;
        }

        let buffered = self
            .wrapper
            .as_ref()
            .map(|w| w.buffered_percentage())
            .unwrap_or(0);
        self.secondary_progress = if buffered >= FULL_BUFFER_PERCENT {
            PROGRESS_MAX
        } else {
            buffered * 10
        };

        self.total_time = format_position(duration);
        self.current_time = format_position(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerCommand;
    use crate::player::{PlayerCommand, ViewMessage};
    use crate::testing::WrapperProbe;

    fn attached(probe: &WrapperProbe) -> VodControlView {
        let mut view = VodControlView::new(ViewHandle(4));
        view.attach(probe.wrapper.clone());
        view
    }

    #[test]
    fn test_playing_starts_progress() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);

        view.on_play_state_changed(PlayState::Playing);
        assert!(view.is_visible());
        assert!(view.is_play_selected());
        assert!(view.is_bottom_progress_visible());
        assert!(!view.is_bottom_container_visible());
        assert_eq!(
            probe.drain(),
            vec![ViewMessage::Controller(ControllerCommand::StartProgress)]
        );

        view.on_play_state_changed(PlayState::Buffering);
        assert_eq!(
            probe.drain(),
            vec![ViewMessage::Controller(ControllerCommand::StopProgress)]
        );
    }

    #[test]
    fn test_progress_and_buffer() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);
        probe.player.write().buffered_percentage = 40;

        view.set_progress(50_000, 200_000);
        assert!(view.is_seek_enabled());
        assert_eq!(view.progress(), 250);
        assert_eq!(view.secondary_progress(), 400);
        assert_eq!(view.current_time(), "00:50");
        assert_eq!(view.total_time(), "03:20");

        probe.player.write().buffered_percentage = 96;
        view.set_progress(60_000, 200_000);
        assert_eq!(view.secondary_progress(), PROGRESS_MAX);

        view.set_progress(0, 0);
        assert!(!view.is_seek_enabled());
    }

    #[test]
    fn test_drag_seeks_on_release() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);
        probe.player.write().duration = 120_000;

        view.start_tracking();
        view.set_progress(1_000, 120_000);
        assert_eq!(view.progress(), 0);

        view.track(500);
        assert_eq!(view.current_time(), "01:00");

        view.stop_tracking(750);
        assert_eq!(
            probe.drain(),
            vec![
                ViewMessage::Controller(ControllerCommand::StopProgress),
                ViewMessage::Controller(ControllerCommand::StopFadeOut),
                ViewMessage::Player(PlayerCommand::SeekTo(90_000)),
                ViewMessage::Controller(ControllerCommand::StartProgress),
                ViewMessage::Controller(ControllerCommand::StartFadeOut),
            ]
        );

        view.set_progress(90_000, 120_000);
        assert_eq!(view.progress(), 750);
    }

    #[test]
    fn test_idle_resets_bar() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);
        view.set_progress(5_000, 10_000);
        view.on_play_state_changed(PlayState::Idle);
        assert!(!view.is_visible());
        assert_eq!(view.progress(), 0);
    }

    #[test]
    fn test_lock_hides_bar() {
        let probe = WrapperProbe::new();
        let mut view = attached(&probe);
        view.on_visibility_changed(true, Some(VisibilityAnimation::fade_in()));
        assert!(view.is_bottom_container_visible());

        view.on_lock_state_changed(true);
        assert!(!view.is_bottom_container_visible());
        assert!(view.is_bottom_progress_visible());
    }
}
