//! Headless render sink
//!
//! Keeps the layout bookkeeping of a real sink (measured size, rotation,
//! mirroring) without drawing. Default sink for views built without one.

use super::{MeasureHelper, RenderSink, RenderSinkFactory, ScaleMode, Snapshot};
use crate::decoder::{Decoder, SurfaceHandle};
use crate::utils::error::{IntoPlayerError, Result};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SURFACE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct NullRenderSink {
    surface: SurfaceHandle,
    measure: MeasureHelper,
    container: (u32, u32),
    video_size: (u32, u32),
    rotation: u32,
    mirrored: bool,
    released: bool,
}

impl NullRenderSink {
    pub fn new(container_width: u32, container_height: u32) -> Self {
        Self {
            surface: SurfaceHandle(NEXT_SURFACE.fetch_add(1, Ordering::Relaxed)),
            measure: MeasureHelper::new(),
            container: (container_width, container_height),
            video_size: (0, 0),
            rotation: 0,
            mirrored: false,
            released: false,
        }
    }

    pub fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    pub fn set_container_size(&mut self, width: u32, height: u32) {
        self.container = (width, height);
    }

    /// Size the video would occupy on screen
    pub fn measured_size(&self) -> (u32, u32) {
        self.measure.measure(self.container.0, self.container.1)
    }

    pub fn rotation(&self) -> u32 {
        self.rotation
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl RenderSink for NullRenderSink {
    fn attach_to_decoder(&mut self, decoder: &mut dyn Decoder) -> Result<()> {
        decoder
            .set_surface(Some(self.surface))
            .renderer_err("binding surface")
    }

    fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.measure.set_scale_mode(mode);
    }

    fn set_video_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.video_size = (width, height);
            self.measure.set_video_size(width, height);
            debug!("Surface {:?} measured {:?}", self.surface, self.measured_size());
        }
    }

    fn set_video_rotation(&mut self, degrees: u32) {
        self.rotation = degrees;
        self.measure.set_rotation(degrees);
    }

    fn set_mirror(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    fn screenshot(&self) -> Option<Snapshot> {
        if self.released || self.video_size.0 == 0 {
            return None;
        }
        Some(Snapshot::black(self.video_size.0, self.video_size.1))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Builds headless sinks for a fixed container size
#[derive(Debug, Clone)]
pub struct NullRenderSinkFactory {
    container: (u32, u32),
}

impl NullRenderSinkFactory {
    pub fn new(container_width: u32, container_height: u32) -> Self {
        Self {
            container: (container_width, container_height),
        }
    }
}

impl Default for NullRenderSinkFactory {
    fn default() -> Self {
        Self::new(1080, 607)
    }
}

impl RenderSinkFactory for NullRenderSinkFactory {
    fn create_render_sink(&self) -> Result<Box<dyn RenderSink>> {
        Ok(Box::new(NullRenderSink::new(self.container.0, self.container.1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_sink_has_its_own_surface() {
        let a = NullRenderSink::new(100, 100);
        let b = NullRenderSink::new(100, 100);
        assert_ne!(a.surface(), b.surface());
    }

    #[test]
    fn test_zero_video_size_ignored() {
        let mut sink = NullRenderSink::new(1600, 900);
        sink.set_video_size(640, 480);
        sink.set_video_size(0, 0);
        assert_eq!(sink.measured_size(), (1200, 900));
    }

    #[test]
    fn test_screenshot_requires_video() {
        let mut sink = NullRenderSink::new(1600, 900);
        assert!(sink.screenshot().is_none());

        sink.set_video_size(4, 2);
        let shot = sink.screenshot().unwrap();
        assert_eq!((shot.width, shot.height), (4, 2));

        sink.release();
        assert!(sink.screenshot().is_none());
    }
}
