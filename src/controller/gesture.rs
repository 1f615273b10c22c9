//! Touch gestures on top of the base controller
//!
//! Horizontal drags preview a seek and commit it on release. Vertical
//! drags change volume on the right half of the view and window brightness
//! on the left half, both applied live. The axis and side are fixed by the
//! first movement of a touch sequence.

use super::{
    AttachContext, BaseVideoController, ComponentId, ControlComponent, ControlWrapper, Controller,
    ControllerCommand, VideoControl,
};
use crate::player::{MediaPlayerControl, PlayState, PlayerState};
use crate::utils::config::ControllerConfig;
use crate::utils::timer::earliest;
use crate::window::{is_edge, Gesture, GestureDetector, TouchEvent};
use log::debug;

/// Touch slop in dp
const TOUCH_SLOP_DP: f32 = 8.0;

/// Max distance between the presses of a double tap, in dp
const DOUBLE_TAP_SLOP_DP: f32 = 100.0;

/// Content covered by dragging across the full view width
const SEEK_WINDOW_MS: f32 = 120_000.0;

/// Brightness used when the window follows the system setting
const DEFAULT_BRIGHTNESS: f32 = 0.5;

/// Controller translating touch sequences into seek, volume and brightness
pub struct GestureVideoController {
    base: BaseVideoController,
    detector: Option<GestureDetector>,
    view_size: (u32, u32),

    gesture_enabled: bool,
    can_change_position: bool,
    enable_in_normal: bool,
    double_tap_toggle_play: bool,
    can_slide: bool,
    play_state: PlayState,
    player_state: PlayerState,

    /// Snapshots taken on press
    stream_volume: u32,
    brightness: f32,

    first_touch: bool,
    change_position: bool,
    change_brightness: bool,
    change_volume: bool,
    sliding: bool,
    seek_position: Option<u64>,
}

impl GestureVideoController {
    pub fn new(config: ControllerConfig) -> Self {
        Self::wrap(BaseVideoController::new(config))
    }

    pub fn wrap(base: BaseVideoController) -> Self {
        Self {
            base,
            detector: None,
            view_size: (0, 0),
            gesture_enabled: true,
            can_change_position: true,
            enable_in_normal: true,
            double_tap_toggle_play: true,
            can_slide: true,
            play_state: PlayState::Idle,
            player_state: PlayerState::Normal,
            stream_volume: 0,
            brightness: DEFAULT_BRIGHTNESS,
            first_touch: false,
            change_position: false,
            change_brightness: false,
            change_volume: false,
            sliding: false,
            seek_position: None,
        }
    }

    pub fn base(&self) -> &BaseVideoController {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseVideoController {
        &mut self.base
    }

    /// Turn volume, brightness and seek dragging on or off
    pub fn set_gesture_enabled(&mut self, enabled: bool) {
        self.gesture_enabled = enabled;
    }

    /// Allow horizontal drags to seek
    pub fn set_can_change_position(&mut self, enabled: bool) {
        self.can_change_position = enabled;
    }

    /// Allow dragging outside full screen
    pub fn set_enable_in_normal(&mut self, enabled: bool) {
        self.enable_in_normal = enabled;
        if self.player_state == PlayerState::Normal {
            self.can_slide = enabled;
        }
    }

    pub fn set_double_tap_toggle_play_enabled(&mut self, enabled: bool) {
        self.double_tap_toggle_play = enabled;
    }

    fn in_playback(&self) -> bool {
        self.base.context().is_some() && self.play_state.accepts_gestures()
    }

    fn on_edge(&self, event: &TouchEvent) -> bool {
        self.base
            .context()
            .is_some_and(|ctx| is_edge(ctx.platform.as_ref(), event))
    }

    fn handle_gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::Down(event) => self.on_down(event),
            Gesture::Scroll {
                down,
                current,
                distance_x,
                distance_y,
            } => self.on_scroll(down, current, distance_x, distance_y),
            Gesture::SingleTapConfirmed(_) => {
                if self.in_playback() {
                    if self.base.is_showing() {
                        self.base.hide();
                    } else {
                        self.base.show();
                    }
                }
            }
            Gesture::DoubleTap(_) => {
                if self.double_tap_toggle_play && !self.base.is_locked() && self.in_playback() {
                    if let Some(mut wrapper) = self.base.wrapper() {
                        wrapper.toggle_play();
                    }
                }
            }
            Gesture::Up(_) => {
                self.stop_slide();
                if let Some(position) = self.seek_position.take() {
                    debug!("Committing gesture seek to {}", position);
                    if let Some(mut wrapper) = self.base.wrapper() {
                        wrapper.seek_to(position);
                    }
                }
            }
            Gesture::Cancel(_) => {
                self.stop_slide();
                self.seek_position = None;
            }
        }
    }

    fn on_down(&mut self, event: TouchEvent) {
        self.first_touch = false;
        self.change_position = false;
        self.change_brightness = false;
        self.change_volume = false;

        if !self.in_playback() || !self.gesture_enabled || self.on_edge(&event) {
            return;
        }
        let Some(ctx) = self.base.context() else { return };

        self.stream_volume = ctx.audio.stream_volume();
        self.brightness = ctx
            .platform
            .window_brightness()
            .unwrap_or(DEFAULT_BRIGHTNESS);
        self.first_touch = true;
    }

    fn on_scroll(&mut self, down: TouchEvent, current: TouchEvent, distance_x: f32, distance_y: f32) {
        if !self.in_playback()
            || !self.gesture_enabled
            || !self.can_slide
            || self.base.is_locked()
            || self.on_edge(&down)
        {
            return;
        }

        let delta_x = down.x - current.x;
        let delta_y = down.y - current.y;

        if self.first_touch {
            self.change_position = distance_x.abs() >= distance_y.abs();
            if current.x > self.view_size.0 as f32 / 2.0 {
                self.change_volume = true;
            } else {
                self.change_brightness = true;
            }
            if self.change_position {
                self.change_position = self.can_change_position;
            }

            if self.change_position || self.change_brightness || self.change_volume {
                self.sliding = true;
                self.base
                    .registry_mut()
                    .for_each_gesture(|g| g.on_start_slide());
            }
            self.first_touch = false;
        }

        if self.change_position {
            self.slide_to_change_position(delta_x);
        } else if self.change_brightness {
            self.slide_to_change_brightness(delta_y);
        } else if self.change_volume {
            self.slide_to_change_volume(delta_y);
        }
    }

    fn slide_to_change_position(&mut self, delta_x: f32) {
        let Some(wrapper) = self.base.wrapper() else { return };
        let width = self.view_size.0.max(1) as f32;

        let duration = wrapper.duration();
        let current = wrapper.current_position();
        let target = -delta_x * SEEK_WINDOW_MS / width + current as f32;
        let position = (target.max(0.0) as u64).min(duration);

        self.base
            .registry_mut()
            .for_each_gesture(|g| g.on_position_change(position, current, duration));
        self.seek_position = Some(position);
    }

    fn slide_to_change_brightness(&mut self, delta_y: f32) {
        let Some(ctx) = self.base.context() else { return };
        let height = self.view_size.1.max(1) as f32;

        let brightness = (delta_y * 2.0 / height + self.brightness).clamp(0.0, 1.0);
        ctx.platform.set_window_brightness(brightness);

        let percent = (brightness * 100.0) as u32;
        self.base
            .registry_mut()
            .for_each_gesture(|g| g.on_brightness_change(percent));
    }

    fn slide_to_change_volume(&mut self, delta_y: f32) {
        let Some(ctx) = self.base.context() else { return };
        let height = self.view_size.1.max(1) as f32;

        let max = ctx.audio.max_stream_volume();
        if max == 0 {
            return;
        }
        let max_f = max as f32;
        let index = (self.stream_volume as f32 + delta_y * 2.0 * max_f / height).clamp(0.0, max_f);
        ctx.audio.set_stream_volume(index as u32);

        let percent = (index / max_f * 100.0) as u32;
        self.base
            .registry_mut()
            .for_each_gesture(|g| g.on_volume_change(percent));
    }

    fn stop_slide(&mut self) {
        if !self.sliding {
            return;
        }
        self.sliding = false;
        self.base.registry_mut().for_each_gesture(|g| g.on_stop_slide());
    }
}

impl Controller for GestureVideoController {
    fn attach(&mut self, ctx: AttachContext) {
        let platform = ctx.platform.clone();
        self.detector = Some(GestureDetector::new(
            platform.dp_to_px(TOUCH_SLOP_DP),
            platform.dp_to_px(DOUBLE_TAP_SLOP_DP),
        ));
        if self.view_size == (0, 0) {
            self.view_size = platform.screen_size();
        }
        self.base.attach(ctx);
    }

    fn detach(&mut self) {
        self.detector = None;
        self.sliding = false;
        self.seek_position = None;
        self.base.detach();
    }

    fn set_play_state(&mut self, state: PlayState) {
        self.base.set_play_state(state);
        self.play_state = state;
    }

    fn set_player_state(&mut self, state: PlayerState) {
        self.base.set_player_state(state);
        self.player_state = state;
        self.can_slide = match state {
            PlayerState::Normal => self.enable_in_normal,
            PlayerState::FullScreen => true,
            PlayerState::TinyScreen => false,
        };
    }

    fn show_net_warning(&self) -> bool {
        self.base.show_net_warning()
    }

    fn on_back_pressed(&mut self) -> bool {
        self.base.on_back_pressed()
    }

    fn handle_command(&mut self, command: ControllerCommand) {
        self.base.handle_command(command);
    }

    fn on_touch(&mut self, event: TouchEvent) -> bool {
        let Some(detector) = self.detector.as_mut() else {
            return false;
        };
        for gesture in detector.on_touch(event) {
            self.handle_gesture(gesture);
        }
        true
    }

    fn on_size_changed(&mut self, width: u32, height: u32) {
        self.view_size = (width, height);
        self.base.on_size_changed(width, height);
    }

    fn on_orientation_changed(&mut self, degrees: i32) {
        self.base.on_orientation_changed(degrees);
    }

    fn on_attached_to_window(&mut self) {
        self.base.on_attached_to_window();
    }

    fn add_control_component(
        &mut self,
        component: Box<dyn ControlComponent>,
        dissociated: bool,
    ) -> ComponentId {
        self.base.add_control_component(component, dissociated)
    }

    fn remove_control_component(&mut self, id: ComponentId) -> Option<Box<dyn ControlComponent>> {
        self.base.remove_control_component(id)
    }

    fn remove_all_control_components(&mut self) {
        self.base.remove_all_control_components();
    }

    fn component(&self, id: ComponentId) -> Option<&dyn ControlComponent> {
        self.base.component(id)
    }

    fn component_mut(&mut self, id: ComponentId) -> Option<&mut (dyn ControlComponent + 'static)> {
        self.base.component_mut(id)
    }

    fn tick(&mut self, now: u64) {
        self.base.tick(now);
        let confirmed = self.detector.as_mut().and_then(|d| d.poll(now));
        if let Some(gesture) = confirmed {
            self.handle_gesture(gesture);
        }
    }

    fn next_deadline(&self) -> Option<u64> {
        earliest(&[
            self.base.next_deadline(),
            self.detector.as_ref().and_then(|d| d.next_deadline()),
        ])
    }

    fn wrapper(&self) -> Option<ControlWrapper> {
        self.base.wrapper()
    }
}
