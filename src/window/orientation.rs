//! Debounced device-rotation sensor

/// Sensor could not determine an angle
pub const ORIENTATION_UNKNOWN: i32 = -1;

/// Minimum spacing between delivered readings
const DEBOUNCE_MS: u64 = 300;

/// Filters raw rotation readings before the controller sees them
#[derive(Debug, Clone, Default)]
pub struct OrientationHelper {
    enabled: bool,
    last_delivery: Option<u64>,
}

impl OrientationHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pass a reading through if listening and outside the debounce window
    pub fn filter(&mut self, degrees: i32, now: u64) -> Option<i32> {
        if !self.enabled {
            return None;
        }
        if let Some(last) = self.last_delivery {
            if now.saturating_sub(last) < DEBOUNCE_MS {
                return None;
            }
        }
        self.last_delivery = Some(now);
        Some(degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_helper_drops_everything() {
        let mut helper = OrientationHelper::new();
        assert_eq!(helper.filter(90, 0), None);
    }

    #[test]
    fn test_readings_debounced() {
        let mut helper = OrientationHelper::new();
        helper.enable();
        assert_eq!(helper.filter(90, 1000), Some(90));
        assert_eq!(helper.filter(270, 1299), None);
        assert_eq!(helper.filter(270, 1300), Some(270));
    }
}
