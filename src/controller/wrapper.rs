//! Single façade over a view and its controller

use super::{ControllerCommand, ControllerHandle, VideoControl};
use crate::player::{MediaPlayerControl, PlayerCommand, PlayerHandle};
use crate::renderer::ScaleMode;
use crate::window::{Platform, ScreenOrientation};
use std::sync::Arc;

/// What control components hold to drive playback
///
/// Mutating calls are queued on the view and applied when it next drains
/// its queue. Queries read the last published snapshots. A wrapper is
/// created once per controller attach and stays valid across sessions.
#[derive(Clone)]
pub struct ControlWrapper {
    player: PlayerHandle,
    controller: ControllerHandle,
    platform: Arc<dyn Platform>,
}

impl ControlWrapper {
    pub fn new(player: PlayerHandle, controller: ControllerHandle, platform: Arc<dyn Platform>) -> Self {
        Self {
            player,
            controller,
            platform,
        }
    }

    pub fn player(&self) -> &PlayerHandle {
        &self.player
    }

    pub fn controller(&self) -> &ControllerHandle {
        &self.controller
    }

    /// Orientation last requested from the host window
    pub fn requested_orientation(&self) -> ScreenOrientation {
        self.platform.requested_orientation()
    }

    pub fn set_requested_orientation(&self, orientation: ScreenOrientation) {
        self.platform.set_requested_orientation(orientation);
    }

    /// Pixels per dp of the host screen
    pub fn density(&self) -> f32 {
        self.platform.density()
    }

    pub fn is_finishing(&self) -> bool {
        self.platform.is_finishing()
    }

    pub fn toggle_show_state(&mut self) {
        if self.is_showing() {
            self.hide();
        } else {
            self.show();
        }
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn toggle_lock_state(&mut self) {
        let locked = self.is_locked();
        self.set_locked(!locked);
    }

    /// Switch display mode without touching the screen orientation
    pub fn toggle_full_screen(&mut self) {
        if self.is_full_screen() {
            self.stop_full_screen();
        } else {
            self.start_full_screen();
        }
    }

    /// Switch display mode and rotate the screen with it
    pub fn toggle_full_screen_with_rotation(&mut self) {
        if self.platform.is_finishing() {
            return;
        }
        if self.is_full_screen() {
            self.platform.set_requested_orientation(ScreenOrientation::Portrait);
            self.stop_full_screen();
        } else {
            self.platform.set_requested_orientation(ScreenOrientation::Landscape);
            self.start_full_screen();
        }
    }

    /// Switch display mode, rotating only for landscape video
    pub fn toggle_full_screen_by_video_size(&mut self) {
        if self.platform.is_finishing() {
            return;
        }
        let (width, height) = self.video_size();
        if self.is_full_screen() {
            self.stop_full_screen();
            if width > height {
                self.platform.set_requested_orientation(ScreenOrientation::Portrait);
            }
        } else {
            self.start_full_screen();
            if width > height {
                self.platform.set_requested_orientation(ScreenOrientation::Landscape);
            }
        }
    }
}

impl MediaPlayerControl for ControlWrapper {
    fn start(&mut self) {
        self.player.post(PlayerCommand::Start);
    }

    fn pause(&mut self) {
        self.player.post(PlayerCommand::Pause);
    }

    fn duration(&self) -> u64 {
        self.player.read(|s| s.duration)
    }

    fn current_position(&self) -> u64 {
        self.player.read(|s| s.position)
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.player.post(PlayerCommand::SeekTo(position_ms));
    }

    fn is_playing(&self) -> bool {
        self.player.read(|s| s.playing)
    }

    fn buffered_percentage(&self) -> u32 {
        self.player.read(|s| s.buffered_percentage)
    }

    fn start_full_screen(&mut self) {
        self.player.post(PlayerCommand::StartFullScreen);
    }

    fn stop_full_screen(&mut self) {
        self.player.post(PlayerCommand::StopFullScreen);
    }

    fn is_full_screen(&self) -> bool {
        self.player.read(|s| s.full_screen)
    }

    fn set_mute(&mut self, mute: bool) {
        self.player.post(PlayerCommand::SetMute(mute));
    }

    fn is_mute(&self) -> bool {
        self.player.read(|s| s.mute)
    }

    fn set_screen_scale(&mut self, mode: ScaleMode) {
        self.player.post(PlayerCommand::SetScreenScale(mode));
    }

    fn set_speed(&mut self, speed: f32) {
        self.player.post(PlayerCommand::SetSpeed(speed));
    }

    fn speed(&self) -> f32 {
        self.player.read(|s| s.speed)
    }

    fn tcp_speed(&self) -> u64 {
        self.player.read(|s| s.tcp_speed)
    }

    fn replay(&mut self, reset_position: bool) {
        self.player.post(PlayerCommand::Replay { reset_position });
    }

    fn set_mirror_rotation(&mut self, enable: bool) {
        self.player.post(PlayerCommand::SetMirrorRotation(enable));
    }

    fn video_size(&self) -> (u32, u32) {
        self.player.read(|s| s.video_size)
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.player.post(PlayerCommand::SetRotation(degrees));
    }

    fn start_tiny_screen(&mut self) {
        self.player.post(PlayerCommand::StartTinyScreen);
    }

    fn stop_tiny_screen(&mut self) {
        self.player.post(PlayerCommand::StopTinyScreen);
    }

    fn is_tiny_screen(&self) -> bool {
        self.player.read(|s| s.tiny_screen)
    }
}

impl VideoControl for ControlWrapper {
    fn start_fade_out(&mut self) {
        self.controller.post(ControllerCommand::StartFadeOut);
    }

    fn stop_fade_out(&mut self) {
        self.controller.post(ControllerCommand::StopFadeOut);
    }

    fn dismiss_timeout(&self) -> u64 {
        self.controller.read(|s| s.dismiss_timeout_ms)
    }

    fn set_dismiss_timeout(&mut self, timeout_ms: u64) {
        self.controller.post(ControllerCommand::SetDismissTimeout(timeout_ms));
    }

    fn is_showing(&self) -> bool {
        self.controller.read(|s| s.showing)
    }

    fn show(&mut self) {
        self.controller.post(ControllerCommand::Show);
    }

    fn hide(&mut self) {
        self.controller.post(ControllerCommand::Hide);
    }

    fn is_locked(&self) -> bool {
        self.controller.read(|s| s.locked)
    }

    fn set_locked(&mut self, locked: bool) {
        self.controller.post(ControllerCommand::SetLocked(locked));
    }

    fn start_progress(&mut self) {
        self.controller.post(ControllerCommand::StartProgress);
    }

    fn stop_progress(&mut self) {
        self.controller.post(ControllerCommand::StopProgress);
    }

    fn has_cutout(&self) -> bool {
        self.controller.read(|s| s.has_cutout)
    }

    fn cutout_height(&self) -> u32 {
        self.controller.read(|s| s.cutout_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::ViewMessage;
    use crate::testing::WrapperProbe;

    #[test]
    fn test_toggle_play_reads_snapshot() {
        let mut probe = WrapperProbe::new();
        probe.wrapper.toggle_play();
        probe.player.write().playing = true;
        probe.wrapper.toggle_play();

        assert_eq!(
            probe.drain(),
            vec![
                ViewMessage::Player(PlayerCommand::Start),
                ViewMessage::Player(PlayerCommand::Pause)
            ]
        );
    }

    #[test]
    fn test_toggle_show_and_lock() {
        let mut probe = WrapperProbe::new();
        probe.controller.write().showing = true;
        probe.controller.write().locked = true;
        probe.wrapper.toggle_show_state();
        probe.wrapper.toggle_lock_state();

        assert_eq!(
            probe.drain(),
            vec![
                ViewMessage::Controller(ControllerCommand::Hide),
                ViewMessage::Controller(ControllerCommand::SetLocked(false))
            ]
        );
    }

    #[test]
    fn test_full_screen_by_video_size_rotates_landscape_video() {
        let mut probe = WrapperProbe::new();
        probe.player.write().video_size = (1920, 1080);
        probe.wrapper.toggle_full_screen_by_video_size();

        assert_eq!(probe.wrapper.requested_orientation(), ScreenOrientation::Landscape);
        assert_eq!(
            probe.drain(),
            vec![ViewMessage::Player(PlayerCommand::StartFullScreen)]
        );

        probe.player.write().full_screen = true;
        probe.player.write().video_size = (720, 1280);
        probe.wrapper.toggle_full_screen_by_video_size();
        assert_eq!(probe.wrapper.requested_orientation(), ScreenOrientation::Landscape);
        assert_eq!(
            probe.drain(),
            vec![ViewMessage::Player(PlayerCommand::StopFullScreen)]
        );
    }

    #[test]
    fn test_rotation_toggle_skipped_while_finishing() {
        let mut probe = WrapperProbe::new();
        probe.platform.set_finishing(true);
        probe.wrapper.toggle_full_screen_with_rotation();
        assert!(probe.drain().is_empty());

        probe.platform.set_finishing(false);
        probe.wrapper.toggle_full_screen_with_rotation();
        assert_eq!(probe.platform.requested_orientation(), ScreenOrientation::Landscape);
    }
}
