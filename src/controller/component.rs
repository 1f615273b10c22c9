//! Control components and their registry

use super::{ControlWrapper, VisibilityAnimation};
use crate::player::{PlayState, PlayerState};
use crate::window::ViewHandle;
use std::any::Any;

/// Upcast to `Any` so hosts can hand out concrete component types
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Passive overlay unit reacting to broadcast events
///
/// Components never mutate the view directly; they issue requests through
/// the wrapper received in `attach`.
pub trait ControlComponent: AsAny + Send {
    fn attach(&mut self, wrapper: ControlWrapper);

    /// View to push on the overlay stack, None for components without one
    fn view(&self) -> Option<ViewHandle>;

    fn on_play_state_changed(&mut self, state: PlayState);

    fn on_player_state_changed(&mut self, state: PlayerState);

    fn on_visibility_changed(&mut self, _visible: bool, _animation: Option<VisibilityAnimation>) {}

    fn on_lock_state_changed(&mut self, _locked: bool) {}

    /// Keep receiving visibility changes while the controller is locked
    fn shown_while_locked(&self) -> bool {
        false
    }

    /// Progress tick, both values in milliseconds
    fn set_progress(&mut self, _position: u64, _duration: u64) {}

    /// Gesture callbacks, for components that want them
    fn as_gesture_mut(&mut self) -> Option<&mut dyn GestureComponent> {
        None
    }
}

/// Callbacks of the gesture layer
pub trait GestureComponent {
    fn on_start_slide(&mut self);

    fn on_stop_slide(&mut self);

    /// Seek preview
    ///
    /// # Arguments
    ///
    /// * `slide_position` - Position the drag would seek to
    /// * `current_position` - Position when the preview was computed
    /// * `duration` - Media duration
    fn on_position_change(&mut self, slide_position: u64, current_position: u64, duration: u64);

    fn on_brightness_change(&mut self, percent: u32);

    fn on_volume_change(&mut self, percent: u32);
}

/// Identifies a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

struct Entry {
    id: ComponentId,
    component: Box<dyn ControlComponent>,
}

/// Registered components in registration order
///
/// Attached components sit on the overlay stack; dissociated ones only
/// receive events and are dropped when a session ends. Both lists share one
/// sequence so broadcasts follow registration order across them.
#[derive(Default)]
pub struct ComponentRegistry {
    attached: Vec<Entry>,
    detached: Vec<Entry>,
    next_id: u64,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, component: Box<dyn ControlComponent>, dissociated: bool) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;

        let entry = Entry { id, component };
        if dissociated {
            self.detached.push(entry);
        } else {
            self.attached.push(entry);
        }
        id
    }

    /// Remove one component, returning it and whether it was dissociated
    pub fn remove(&mut self, id: ComponentId) -> Option<(Box<dyn ControlComponent>, bool)> {
        if let Some(index) = self.attached.iter().position(|e| e.id == id) {
            return Some((self.attached.remove(index).component, false));
        }
        self.detached
            .iter()
            .position(|e| e.id == id)
            .map(|index| (self.detached.remove(index).component, true))
    }

    /// Remove everything, returning the attached components
    pub fn remove_all(&mut self) -> Vec<Box<dyn ControlComponent>> {
        self.detached.clear();
        self.attached.drain(..).map(|e| e.component).collect()
    }

    /// Drop dissociated components, returning how many went away
    pub fn remove_all_dissociated(&mut self) -> usize {
        let count = self.detached.len();
        self.detached.clear();
        count
    }

    pub fn get(&self, id: ComponentId) -> Option<&dyn ControlComponent> {
        self.attached
            .iter()
            .chain(self.detached.iter())
            .find(|e| e.id == id)
            .map(|e| e.component.as_ref())
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut (dyn ControlComponent + 'static)> {
        self.attached
            .iter_mut()
            .chain(self.detached.iter_mut())
            .find(|e| e.id == id)
            .map(|e| e.component.as_mut())
    }

    pub fn len(&self) -> usize {
        self.attached.len() + self.detached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dissociated(&self, id: ComponentId) -> Option<bool> {
        if self.attached.iter().any(|e| e.id == id) {
            Some(false)
        } else if self.detached.iter().any(|e| e.id == id) {
            Some(true)
        } else {
            None
        }
    }

    /// Views of the attached components, bottom first
    pub fn overlay_views(&self) -> Vec<ViewHandle> {
        self.attached
            .iter()
            .filter_map(|e| e.component.view())
            .collect()
    }

    /// Visit every component in registration order
    pub fn for_each(&mut self, mut f: impl FnMut(&mut dyn ControlComponent)) {
        let (mut a, mut d) = (0, 0);
        while a < self.attached.len() || d < self.detached.len() {
            let take_attached = match (self.attached.get(a), self.detached.get(d)) {
                (Some(x), Some(y)) => x.id < y.id,
                (Some(_), None) => true,
                _ => false,
            };
            if take_attached {
                f(self.attached[a].component.as_mut());
                a += 1;
            } else {
                f(self.detached[d].component.as_mut());
                d += 1;
            }
        }
    }

    /// Visit every gesture-aware component in registration order
    pub fn for_each_gesture(&mut self, mut f: impl FnMut(&mut dyn GestureComponent)) {
        self.for_each(|component| {
            if let Some(gesture) = component.as_gesture_mut() {
                f(gesture);
            }
        });
    }
}
