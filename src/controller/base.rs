//! Overlay host with event fan-out, auto-hide and progress polling

use super::{
    AttachContext, ComponentId, ComponentRegistry, ControlComponent, ControlWrapper, Controller,
    ControllerCommand, ControllerHandle, ControllerStatus, VideoControl, VisibilityAnimation,
};
use crate::player::{MediaPlayerControl, PlayState, PlayerState};
use crate::utils::config::ControllerConfig;
use crate::utils::timer::{earliest, TimerSlot};
use crate::window::{
    cutout, NetworkType, OrientationHelper, ScreenOrientation, ORIENTATION_UNKNOWN,
};
use log::debug;
use parking_lot::RwLock;
use std::sync::Arc;

/// Rotation bucket last acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Unknown,
    Portrait,
    ReverseLandscape,
    Landscape,
}

/// Controller hosting control components
///
/// Broadcasts play state, player state, lock, visibility and progress to
/// every registered component in registration order. Holds the single
/// auto-hide timer and the progress polling loop, follows the rotation
/// sensor and adapts the layout to display cutouts.
pub struct BaseVideoController {
    config: ControllerConfig,
    registry: ComponentRegistry,
    ctx: Option<AttachContext>,
    wrapper: Option<ControlWrapper>,
    status: Arc<RwLock<ControllerStatus>>,

    showing: bool,
    locked: bool,
    dismiss_timeout_ms: u64,
    fade_out: TimerSlot,

    progress_running: bool,
    progress_timer: TimerSlot,

    orientation_helper: OrientationHelper,
    zone: Zone,

    has_cutout: bool,
    cutout_height: u32,
}

impl BaseVideoController {
    pub fn new(config: ControllerConfig) -> Self {
        let status = ControllerStatus {
            dismiss_timeout_ms: config.default_timeout_ms,
            ..ControllerStatus::default()
        };
        Self {
            dismiss_timeout_ms: config.default_timeout_ms,
            config,
            registry: ComponentRegistry::new(),
            ctx: None,
            wrapper: None,
            status: Arc::new(RwLock::new(status)),
            showing: false,
            locked: false,
            fade_out: TimerSlot::new(),
            progress_running: false,
            progress_timer: TimerSlot::new(),
            orientation_helper: OrientationHelper::new(),
            zone: Zone::Portrait,
            has_cutout: false,
            cutout_height: 0,
        }
    }

    pub fn set_enable_orientation(&mut self, enable: bool) {
        self.config.enable_orientation = enable;
    }

    pub fn set_adapt_cutout(&mut self, adapt: bool) {
        self.config.adapt_cutout = adapt;
    }

    pub fn is_progress_running(&self) -> bool {
        self.progress_running
    }

    /// Deadline of the pending auto-hide
    pub fn fade_out_deadline(&self) -> Option<u64> {
        self.fade_out.deadline()
    }

    pub fn orientation_enabled(&self) -> bool {
        self.orientation_helper.is_enabled()
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub(crate) fn context(&self) -> Option<&AttachContext> {
        self.ctx.as_ref()
    }

    fn now(&self) -> u64 {
        self.ctx.as_ref().map(|c| c.clock.now_ms()).unwrap_or(0)
    }

    fn publish(&self) {
        let mut status = self.status.write();
        status.showing = self.showing;
        status.locked = self.locked;
        status.dismiss_timeout_ms = self.dismiss_timeout_ms;
        status.has_cutout = self.has_cutout;
        status.cutout_height = self.cutout_height;
    }

    fn handle_visibility_changed(&mut self, visible: bool, animation: VisibilityAnimation) {
        let locked = self.locked;
        self.registry.for_each(|c| {
            if !locked || c.shown_while_locked() {
                c.on_visibility_changed(visible, Some(animation));
            }
        });
    }

    fn handle_player_state_changed(&mut self, state: PlayerState) {
        self.registry.for_each(|c| c.on_player_state_changed(state));

        match state {
            PlayerState::Normal => {
                if self.config.enable_orientation {
                    self.orientation_helper.enable();
                } else {
                    self.orientation_helper.disable();
                }
                if self.has_cutout {
                    if let Some(ctx) = &self.ctx {
                        ctx.platform.set_cutout_mode(cutout::cutout_mode(false));
                    }
                }
            }
            PlayerState::FullScreen => {
                self.orientation_helper.enable();
                if self.has_cutout {
                    if let Some(ctx) = &self.ctx {
                        ctx.platform.set_cutout_mode(cutout::cutout_mode(true));
                    }
                }
            }
            PlayerState::TinyScreen => self.orientation_helper.disable(),
        }
    }

    fn run_progress(&mut self, now: u64) {
        let Some(wrapper) = self.wrapper.clone() else {
            self.progress_running = false;
            return;
        };

        let position = wrapper.current_position();
        let duration = wrapper.duration();
        self.registry.for_each(|c| c.set_progress(position, duration));

        if wrapper.is_playing() {
            let speed = wrapper.speed();
            let speed = if speed > 0.0 { speed } else { 1.0 };
            let delay = ((1000 - position % 1000) as f32 / speed) as u64;
            self.progress_timer.arm(now, delay);
        } else {
            self.progress_running = false;
        }
    }

    /// Leave full screen and turn the screen back to portrait
    pub fn stop_full_screen(&mut self) -> bool {
        let Some(ctx) = &self.ctx else { return false };
        if ctx.platform.is_finishing() {
            return false;
        }
        ctx.platform.set_requested_orientation(ScreenOrientation::Portrait);
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.stop_full_screen();
        }
        true
    }

    fn on_orientation_portrait(&mut self) {
        let Some(ctx) = &self.ctx else { return };
        ctx.platform.set_requested_orientation(ScreenOrientation::Portrait);
        if let Some(wrapper) = self.wrapper.as_mut() {
            wrapper.stop_full_screen();
        }
    }

    fn on_orientation_landscape(&mut self, orientation: ScreenOrientation) {
        let Some(ctx) = &self.ctx else { return };
        ctx.platform.set_requested_orientation(orientation);

        let Some(mut wrapper) = self.wrapper.clone() else { return };
        if wrapper.is_full_screen() {
            self.handle_player_state_changed(PlayerState::FullScreen);
        } else {
            wrapper.start_full_screen();
        }
    }

    fn check_cutout(&mut self) {
        if !self.config.adapt_cutout || self.has_cutout {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        self.has_cutout = cutout::has_cutout(&ctx.platform.device_info());
        if self.has_cutout {
            // Portrait status bar height is taken as the cutout height
            self.cutout_height = ctx.platform.status_bar_height();
            ctx.platform.set_cutout_mode(cutout::cutout_mode(true));
        }
        debug!(
            "Cutout check: present={} height={}",
            self.has_cutout, self.cutout_height
        );
        self.publish();
    }
}

impl VideoControl for BaseVideoController {
    fn start_fade_out(&mut self) {
        let now = self.now();
        self.fade_out.arm(now, self.dismiss_timeout_ms);
    }

    fn stop_fade_out(&mut self) {
        self.fade_out.cancel();
    }

    fn dismiss_timeout(&self) -> u64 {
        self.dismiss_timeout_ms
    }

    fn set_dismiss_timeout(&mut self, timeout_ms: u64) {
        self.dismiss_timeout_ms = timeout_ms;
        self.publish();
    }

    fn is_showing(&self) -> bool {
        self.showing
    }

    fn show(&mut self) {
        self.start_fade_out();
        if !self.showing {
            self.handle_visibility_changed(true, VisibilityAnimation::fade_in());
            self.showing = true;
            self.publish();
        }
    }

    fn hide(&mut self) {
        if self.showing {
            self.stop_fade_out();
            self.handle_visibility_changed(false, VisibilityAnimation::fade_out());
            self.showing = false;
            self.publish();
        }
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        self.registry.for_each(|c| c.on_lock_state_changed(locked));
        self.publish();
    }

    fn start_progress(&mut self) {
        if self.progress_running {
            return;
        }
        self.progress_running = true;
        let now = self.now();
        self.run_progress(now);
    }

    fn stop_progress(&mut self) {
        if !self.progress_running {
            return;
        }
        self.progress_timer.cancel();
        self.progress_running = false;
    }

    fn has_cutout(&self) -> bool {
        self.has_cutout
    }

    fn cutout_height(&self) -> u32 {
        self.cutout_height
    }
}

impl Controller for BaseVideoController {
    fn attach(&mut self, ctx: AttachContext) {
        let handle = ControllerHandle::new(self.status.clone(), ctx.events.clone());
        let wrapper = ControlWrapper::new(ctx.player.clone(), handle, ctx.platform.clone());

        self.registry.for_each(|c| c.attach(wrapper.clone()));
        for view in self.registry.overlay_views() {
            ctx.platform.add_overlay_view(view);
        }

        if self.config.enable_orientation {
            self.orientation_helper.enable();
        }
        self.wrapper = Some(wrapper);
        self.ctx = Some(ctx);
        self.publish();
    }

    fn detach(&mut self) {
        self.fade_out.cancel();
        self.progress_timer.cancel();
        self.progress_running = false;
        self.orientation_helper.disable();
        if let Some(ctx) = self.ctx.take() {
            for view in self.registry.overlay_views() {
                ctx.platform.remove_overlay_view(view);
            }
        }
        self.wrapper = None;
    }

    fn set_play_state(&mut self, state: PlayState) {
        self.registry.for_each(|c| c.on_play_state_changed(state));

        match state {
            PlayState::Idle => {
                self.orientation_helper.disable();
                self.zone = Zone::Portrait;
                self.locked = false;
                self.showing = false;
                self.fade_out.cancel();
                let purged = self.registry.remove_all_dissociated();
                if purged > 0 {
                    debug!("Dropped {} dissociated components", purged);
                }
            }
            PlayState::PlaybackCompleted => {
                self.locked = false;
                self.showing = false;
            }
            PlayState::Error => self.showing = false,
            _ => {}
        }
        self.publish();
    }

    fn set_player_state(&mut self, state: PlayerState) {
        self.handle_player_state_changed(state);
    }

    fn show_net_warning(&self) -> bool {
        self.ctx.as_ref().is_some_and(|ctx| {
            ctx.platform.network_type() == NetworkType::Mobile
                && !ctx.policy.play_on_mobile_network()
        })
    }

    fn on_back_pressed(&mut self) -> bool {
        if self.locked {
            self.show();
            return true;
        }
        let full_screen = self.wrapper.as_ref().is_some_and(|w| w.is_full_screen());
        if full_screen {
            return self.stop_full_screen();
        }
        false
    }

    fn handle_command(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Show => self.show(),
            ControllerCommand::Hide => self.hide(),
            ControllerCommand::StartFadeOut => self.start_fade_out(),
            ControllerCommand::StopFadeOut => self.stop_fade_out(),
            ControllerCommand::SetLocked(locked) => self.set_locked(locked),
            ControllerCommand::StartProgress => self.start_progress(),
            ControllerCommand::StopProgress => self.stop_progress(),
            ControllerCommand::SetDismissTimeout(ms) => self.set_dismiss_timeout(ms),
        }
    }

    fn on_orientation_changed(&mut self, degrees: i32) {
        let Some(ctx) = &self.ctx else { return };
        if ctx.platform.is_finishing() {
            return;
        }
        let now = ctx.clock.now_ms();
        let requested = ctx.platform.requested_orientation();
        let Some(degrees) = self.orientation_helper.filter(degrees, now) else {
            return;
        };
        if self.locked || !self.config.enable_orientation {
            return;
        }

        let last = self.zone;
        if degrees == ORIENTATION_UNKNOWN {
            self.zone = Zone::Unknown;
            return;
        }

        if !(10..=350).contains(&degrees) {
            if requested == ScreenOrientation::Landscape && last == Zone::Portrait {
                return;
            }
            if self.zone == Zone::Portrait {
                return;
            }
            self.zone = Zone::Portrait;
            debug!("Rotation -> portrait ({})", degrees);
            self.on_orientation_portrait();
        } else if (81..=99).contains(&degrees) {
            if self.zone == Zone::ReverseLandscape {
                return;
            }
            self.zone = Zone::ReverseLandscape;
            debug!("Rotation -> reverse landscape ({})", degrees);
            self.on_orientation_landscape(ScreenOrientation::ReverseLandscape);
        } else if (261..=279).contains(&degrees) {
            if self.zone == Zone::Landscape {
                return;
            }
            self.zone = Zone::Landscape;
            debug!("Rotation -> landscape ({})", degrees);
            self.on_orientation_landscape(ScreenOrientation::Landscape);
        }
    }

    fn on_attached_to_window(&mut self) {
        self.check_cutout();
    }

    fn add_control_component(
        &mut self,
        mut component: Box<dyn ControlComponent>,
        dissociated: bool,
    ) -> ComponentId {
        if let Some(wrapper) = &self.wrapper {
            component.attach(wrapper.clone());
        }
        if !dissociated {
            if let (Some(ctx), Some(view)) = (&self.ctx, component.view()) {
                ctx.platform.add_overlay_view(view);
            }
        }
        self.registry.add(component, dissociated)
    }

    fn remove_control_component(&mut self, id: ComponentId) -> Option<Box<dyn ControlComponent>> {
        let (component, dissociated) = self.registry.remove(id)?;
        if !dissociated {
            if let (Some(ctx), Some(view)) = (&self.ctx, component.view()) {
                ctx.platform.remove_overlay_view(view);
            }
        }
        Some(component)
    }

    fn remove_all_control_components(&mut self) {
        let removed = self.registry.remove_all();
        if let Some(ctx) = &self.ctx {
            for view in removed.iter().filter_map(|c| c.view()) {
                ctx.platform.remove_overlay_view(view);
            }
        }
    }

    fn component(&self, id: ComponentId) -> Option<&dyn ControlComponent> {
        self.registry.get(id)
    }

    fn component_mut(&mut self, id: ComponentId) -> Option<&mut (dyn ControlComponent + 'static)> {
        self.registry.get_mut(id)
    }

    fn tick(&mut self, now: u64) {
        if self.fade_out.take_due(now) {
            debug!("Auto-hide fired at {}", now);
            self.hide();
        }
        if self.progress_timer.take_due(now) {
            self.run_progress(now);
        }
    }

    fn next_deadline(&self) -> Option<u64> {
        earliest(&[self.fade_out.deadline(), self.progress_timer.deadline()])
    }

    fn wrapper(&self) -> Option<ControlWrapper> {
        self.wrapper.clone()
    }
}
