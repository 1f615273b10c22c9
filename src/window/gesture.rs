//! Tap and scroll recognition
//!
//! Turns raw touch samples into taps, double taps and scrolls. A single
//! tap is only confirmed once the double-tap window has passed without a
//! second press, so confirmation is driven by `poll`.

use super::{TouchAction, TouchEvent};
use crate::utils::timer::TimerSlot;

/// Window for a second press to count as a double tap
pub const DOUBLE_TAP_TIMEOUT_MS: u64 = 300;

/// Recognized gestures
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// A new touch sequence started
    Down(TouchEvent),
    /// Finger moved; distances are from the previous sample, previous minus current
    Scroll {
        down: TouchEvent,
        current: TouchEvent,
        distance_x: f32,
        distance_y: f32,
    },
    SingleTapConfirmed(TouchEvent),
    DoubleTap(TouchEvent),
    /// Sequence ended normally
    Up(TouchEvent),
    /// Sequence was taken away
    Cancel(TouchEvent),
}

/// Handler for touch sequences
#[derive(Debug, Clone)]
pub struct GestureDetector {
    touch_slop: f32,
    double_tap_slop: f32,

    /// Press that started the current sequence
    down: Option<TouchEvent>,
    last_x: f32,
    last_y: f32,
    in_tap_region: bool,
    double_tapping: bool,

    /// First tap of a possible double tap
    previous_down: Option<TouchEvent>,
    previous_up: Option<TouchEvent>,
    previous_was_tap: bool,

    tap_timer: TimerSlot,
    defer_confirm: bool,
}

impl GestureDetector {
    /// Create a detector
    ///
    /// # Arguments
    ///
    /// * `touch_slop` - Movement in pixels before a press becomes a scroll
    /// * `double_tap_slop` - Max distance in pixels between the two presses of a double tap
    pub fn new(touch_slop: f32, double_tap_slop: f32) -> Self {
        Self {
            touch_slop,
            double_tap_slop,
            down: None,
            last_x: 0.0,
            last_y: 0.0,
            in_tap_region: false,
            double_tapping: false,
            previous_down: None,
            previous_up: None,
            previous_was_tap: false,
            tap_timer: TimerSlot::new(),
            defer_confirm: false,
        }
    }

    /// Deadline of the pending single-tap confirmation
    pub fn next_deadline(&self) -> Option<u64> {
        self.tap_timer.deadline()
    }

    pub fn on_touch(&mut self, event: TouchEvent) -> Vec<Gesture> {
        match event.action {
            TouchAction::Down => self.on_down(event),
            TouchAction::Move => self.on_move(event),
            TouchAction::Up => self.on_up(event),
            TouchAction::Cancel => self.on_cancel(event),
        }
    }

    /// Confirm a single tap once the double-tap window has closed
    pub fn poll(&mut self, now: u64) -> Option<Gesture> {
        if !self.tap_timer.take_due(now) {
            return None;
        }
        if self.down.is_some() {
            // Finger still down, confirm on release
            self.defer_confirm = true;
            return None;
        }
        self.previous_down.map(Gesture::SingleTapConfirmed)
    }

    fn on_down(&mut self, event: TouchEvent) -> Vec<Gesture> {
        let mut gestures = Vec::new();

        let had_pending_tap = self.tap_timer.is_armed();
        self.tap_timer.cancel();

        if had_pending_tap && self.is_double_tap(&event) {
            self.double_tapping = true;
            if let Some(first) = self.previous_down {
                gestures.push(Gesture::DoubleTap(first));
            }
        } else {
            self.tap_timer.arm(event.time_ms, DOUBLE_TAP_TIMEOUT_MS);
        }

        self.down = Some(event);
        self.previous_down = if self.double_tapping { self.previous_down } else { Some(event) };
        self.last_x = event.x;
        self.last_y = event.y;
        self.in_tap_region = true;
        self.defer_confirm = false;

        gestures.push(Gesture::Down(event));
        gestures
    }

    fn on_move(&mut self, event: TouchEvent) -> Vec<Gesture> {
        let Some(down) = self.down else {
            return Vec::new();
        };
        if self.double_tapping {
            return Vec::new();
        }

        let distance_x = self.last_x - event.x;
        let distance_y = self.last_y - event.y;

        if self.in_tap_region {
            let dx = event.x - down.x;
            let dy = event.y - down.y;
            if dx * dx + dy * dy <= self.touch_slop * self.touch_slop {
                return Vec::new();
            }
            self.in_tap_region = false;
            self.tap_timer.cancel();
        } else if distance_x.abs() < 1.0 && distance_y.abs() < 1.0 {
            return Vec::new();
        }

        self.last_x = event.x;
        self.last_y = event.y;
        vec![Gesture::Scroll {
            down,
            current: event,
            distance_x,
            distance_y,
        }]
    }

    fn on_up(&mut self, event: TouchEvent) -> Vec<Gesture> {
        let mut gestures = Vec::new();
        let was_tap = self.in_tap_region && !self.double_tapping;

        if self.defer_confirm && was_tap {
            if let Some(down) = self.down {
                gestures.push(Gesture::SingleTapConfirmed(down));
            }
        }

        self.previous_up = Some(event);
        self.previous_was_tap = was_tap;
        self.reset_sequence();

        gestures.push(Gesture::Up(event));
        gestures
    }

    fn on_cancel(&mut self, event: TouchEvent) -> Vec<Gesture> {
        self.tap_timer.cancel();
        self.previous_down = None;
        self.previous_up = None;
        self.previous_was_tap = false;
        self.reset_sequence();
        vec![Gesture::Cancel(event)]
    }

    fn reset_sequence(&mut self) {
        self.down = None;
        self.in_tap_region = false;
        self.double_tapping = false;
        self.defer_confirm = false;
    }

    fn is_double_tap(&self, second: &TouchEvent) -> bool {
        let (Some(first), Some(up)) = (self.previous_down, self.previous_up) else {
            return false;
        };
        if !self.previous_was_tap {
            return false;
        }
        if second.time_ms.saturating_sub(up.time_ms) > DOUBLE_TAP_TIMEOUT_MS {
            return false;
        }
        let dx = first.x - second.x;
        let dy = first.y - second.y;
        dx * dx + dy * dy < self.double_tap_slop * self.double_tap_slop
    }
}
