//! Controller module for TSPlayer
//!
//! A controller hosts the overlay control components of one view. The view
//! pushes state changes into it through `Controller`; components talk back
//! through a `ControlWrapper`, which posts requests on the view's queue and
//! reads the last published status of the view and the controller.

mod base;
mod component;
mod gesture;
mod wrapper;

pub use base::BaseVideoController;
pub use component::{AsAny, ComponentId, ComponentRegistry, ControlComponent, GestureComponent};
pub use gesture::GestureVideoController;
pub use wrapper::ControlWrapper;

use crate::audio::AudioManager;
use crate::player::{PlayState, PlayerHandle, PlayerState, ViewMessage};
use crate::utils::config::PlaybackPolicy;
use crate::utils::timer::Clock;
use crate::window::{Platform, TouchEvent};
use crossbeam_channel::Sender;
use log::warn;
use parking_lot::RwLock;
use std::sync::Arc;

/// Duration of the show and hide fades
pub const FADE_DURATION_MS: u64 = 300;

/// Overlay operations a controller offers to its components
pub trait VideoControl {
    /// Arm the auto-hide timer, replacing a pending one
    fn start_fade_out(&mut self);

    fn stop_fade_out(&mut self);

    /// Auto-hide delay in milliseconds
    fn dismiss_timeout(&self) -> u64;

    fn set_dismiss_timeout(&mut self, timeout_ms: u64);

    fn is_showing(&self) -> bool;

    fn show(&mut self);

    fn hide(&mut self);

    fn is_locked(&self) -> bool;

    fn set_locked(&mut self, locked: bool);

    /// Start the progress polling loop
    fn start_progress(&mut self);

    fn stop_progress(&mut self);

    fn has_cutout(&self) -> bool;

    /// Cutout height in pixels, 0 without a cutout
    fn cutout_height(&self) -> u32;
}

/// Everything a controller receives when it is bound to a view
#[derive(Clone)]
pub struct AttachContext {
    pub player: PlayerHandle,
    pub events: Sender<ViewMessage>,
    pub platform: Arc<dyn Platform>,
    pub audio: Arc<dyn AudioManager>,
    pub clock: Arc<dyn Clock>,
    pub policy: PlaybackPolicy,
}

/// View-facing side of a controller
///
/// All calls happen on the view's thread, in the order the view observes
/// the underlying events.
pub trait Controller: Send + AsAny {
    /// Bind to a view; components registered earlier are attached now
    fn attach(&mut self, ctx: AttachContext);

    /// Unbind from the view and take the overlays off screen
    fn detach(&mut self);

    fn set_play_state(&mut self, state: PlayState);

    fn set_player_state(&mut self, state: PlayerState);

    /// Whether starting now would use a metered connection without consent
    fn show_net_warning(&self) -> bool;

    /// # Returns
    ///
    /// true if the press was consumed
    fn on_back_pressed(&mut self) -> bool;

    /// Apply a request posted through a `ControllerHandle`
    fn handle_command(&mut self, command: ControllerCommand);

    /// # Returns
    ///
    /// true if the touch was consumed
    fn on_touch(&mut self, _event: TouchEvent) -> bool {
        false
    }

    fn on_size_changed(&mut self, _width: u32, _height: u32) {}

    /// Raw device rotation in degrees, or `ORIENTATION_UNKNOWN`
    fn on_orientation_changed(&mut self, degrees: i32);

    fn on_attached_to_window(&mut self);

    fn add_control_component(
        &mut self,
        component: Box<dyn ControlComponent>,
        dissociated: bool,
    ) -> ComponentId;

    fn remove_control_component(&mut self, id: ComponentId) -> Option<Box<dyn ControlComponent>>;

    fn remove_all_control_components(&mut self);

    fn component(&self, id: ComponentId) -> Option<&dyn ControlComponent>;

    fn component_mut(&mut self, id: ComponentId) -> Option<&mut (dyn ControlComponent + 'static)>;

    /// Run timers that are due at `now`
    fn tick(&mut self, now: u64);

    /// Earliest pending timer deadline
    fn next_deadline(&self) -> Option<u64>;

    /// Wrapper handed to components, None before attach
    fn wrapper(&self) -> Option<ControlWrapper>;
}

/// Requests for the attached controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCommand {
    Show,
    Hide,
    StartFadeOut,
    StopFadeOut,
    SetLocked(bool),
    StartProgress,
    StopProgress,
    SetDismissTimeout(u64),
}

/// Last published state of a controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerStatus {
    pub showing: bool,
    pub locked: bool,
    pub dismiss_timeout_ms: u64,
    pub has_cutout: bool,
    pub cutout_height: u32,
}

impl Default for ControllerStatus {
    fn default() -> Self {
        Self {
            showing: false,
            locked: false,
            dismiss_timeout_ms: 4000,
            has_cutout: false,
            cutout_height: 0,
        }
    }
}

/// Reads a controller's status and posts requests to it
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    status: Arc<RwLock<ControllerStatus>>,
    tx: Sender<ViewMessage>,
}

impl ControllerHandle {
    pub(crate) fn new(status: Arc<RwLock<ControllerStatus>>, tx: Sender<ViewMessage>) -> Self {
        Self { status, tx }
    }

    pub fn status(&self) -> ControllerStatus {
        self.status.read().clone()
    }

    pub fn read<T>(&self, f: impl FnOnce(&ControllerStatus) -> T) -> T {
        f(&self.status.read())
    }

    pub fn post(&self, command: ControllerCommand) {
        if self.tx.send(ViewMessage::Controller(command)).is_err() {
            warn!("View is gone, dropping {:?}", command);
        }
    }
}

/// Alpha fade passed along with visibility changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityAnimation {
    pub from_alpha: f32,
    pub to_alpha: f32,
    pub duration_ms: u64,
}

impl VisibilityAnimation {
    pub fn fade_in() -> Self {
        Self {
            from_alpha: 0.0,
            to_alpha: 1.0,
            duration_ms: FADE_DURATION_MS,
        }
    }

    pub fn fade_out() -> Self {
        Self {
            from_alpha: 1.0,
            to_alpha: 0.0,
            duration_ms: FADE_DURATION_MS,
        }
    }

    /// Alpha `elapsed_ms` into the animation
    pub fn alpha_at(&self, elapsed_ms: u64) -> f32 {
        if self.duration_ms == 0 || elapsed_ms >= self.duration_ms {
            return self.to_alpha;
        }
        let t = elapsed_ms as f32 / self.duration_ms as f32;
        self.from_alpha + (self.to_alpha - self.from_alpha) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_progression() {
        let fade = VisibilityAnimation::fade_in();
        assert_eq!(fade.alpha_at(0), 0.0);
        assert!((fade.alpha_at(150) - 0.5).abs() < 1e-6);
        assert_eq!(fade.alpha_at(1_000), 1.0);

        assert_eq!(VisibilityAnimation::fade_out().alpha_at(300), 0.0);
    }

    #[test]
    fn test_handle_posts_on_view_queue() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = ControllerHandle::new(Arc::new(RwLock::new(ControllerStatus::default())), tx);

        handle.post(ControllerCommand::SetLocked(true));
        assert_eq!(
            rx.try_recv().unwrap(),
            ViewMessage::Controller(ControllerCommand::SetLocked(true))
        );
        assert_eq!(handle.read(|s| s.dismiss_timeout_ms), 4000);
    }
}
