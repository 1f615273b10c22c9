//! Container measurement for the supported scale modes

use super::ScaleMode;

/// Computes the on-screen size of the video for a container
#[derive(Debug, Clone, Default)]
pub struct MeasureHelper {
    video_width: u32,
    video_height: u32,
    scale_mode: ScaleMode,
    rotation: u32,
}

impl MeasureHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_video_size(&mut self, width: u32, height: u32) {
        self.video_width = width;
        self.video_height = height;
    }

    pub fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.scale_mode = mode;
    }

    pub fn set_rotation(&mut self, degrees: u32) {
        self.rotation = degrees % 360;
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    /// Size of the video box for a container of `width` x `height`
    ///
    /// A quarter-turn swaps the container axes before measuring.
    pub fn measure(&self, width: u32, height: u32) -> (u32, u32) {
        let (mut width, mut height) = if self.rotation == 90 || self.rotation == 270 {
            (height, width)
        } else {
            (width, height)
        };

        let (vw, vh) = (self.video_width as u64, self.video_height as u64);
        if vw == 0 || vh == 0 {
            return (width, height);
        }

        let (w, h) = (width as u64, height as u64);
        match self.scale_mode {
            ScaleMode::Default => {
                if vw * h < w * vh {
                    width = (h * vw / vh) as u32;
                } else if vw * h > w * vh {
                    height = (w * vh / vw) as u32;
                }
            }
            ScaleMode::Original => {
                width = self.video_width;
                height = self.video_height;
            }
            ScaleMode::Ratio16x9 => {
                if h * 16 > w * 9 {
                    height = (w * 9 / 16) as u32;
                } else {
                    width = (h * 16 / 9) as u32;
                }
            }
            ScaleMode::Ratio4x3 => {
                if h * 4 > w * 3 {
                    height = (w * 3 / 4) as u32;
                } else {
                    width = (h * 4 / 3) as u32;
                }
            }
            ScaleMode::MatchParent => {}
            ScaleMode::CenterCrop => {
                if vw * h > w * vh {
                    width = (h * vw / vh) as u32;
                } else {
                    height = (w * vh / vw) as u32;
                }
            }
        }

        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(mode: ScaleMode, vw: u32, vh: u32) -> MeasureHelper {
        let mut helper = MeasureHelper::new();
        helper.set_scale_mode(mode);
        helper.set_video_size(vw, vh);
        helper
    }

    #[test]
    fn test_unknown_video_size_fills_container() {
        let helper = measured(ScaleMode::CenterCrop, 0, 0);
        assert_eq!(helper.measure(1080, 607), (1080, 607));
    }

    #[test]
    fn test_default_letterboxes() {
        // 4:3 video in a 16:9 box is pillarboxed
        assert_eq!(measured(ScaleMode::Default, 640, 480).measure(1600, 900), (1200, 900));
        // 21:9 video in a 16:9 box is letterboxed
        assert_eq!(measured(ScaleMode::Default, 2100, 900).measure(1600, 900), (1600, 685));
    }

    #[test]
    fn test_center_crop_overflows() {
        assert_eq!(measured(ScaleMode::CenterCrop, 640, 480).measure(1600, 900), (1600, 1200));
        assert_eq!(measured(ScaleMode::CenterCrop, 2100, 900).measure(1600, 900), (2100, 900));
    }

    #[test]
    fn test_fixed_ratios() {
        assert_eq!(measured(ScaleMode::Ratio16x9, 640, 480).measure(1600, 1600), (1600, 900));
        assert_eq!(measured(ScaleMode::Ratio4x3, 640, 480).measure(1600, 900), (1200, 900));
    }

    #[test]
    fn test_original_and_match_parent() {
        assert_eq!(measured(ScaleMode::Original, 640, 480).measure(1600, 900), (640, 480));
        assert_eq!(measured(ScaleMode::MatchParent, 640, 480).measure(1600, 900), (1600, 900));
    }

    #[test]
    fn test_rotation_swaps_container() {
        let mut helper = measured(ScaleMode::MatchParent, 1920, 1080);
        helper.set_rotation(90);
        assert_eq!(helper.measure(1600, 900), (900, 1600));
        helper.set_rotation(180);
        assert_eq!(helper.measure(1600, 900), (1600, 900));
    }
}
