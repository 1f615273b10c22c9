//! Renderer module for TSPlayer
//!
//! A render sink owns the drawable surface a decoder writes into. The view
//! creates one sink per attach, hands it the decoder to bind its surface
//! to, and forwards size, rotation and scale changes. Pixel work is the
//! sink's business.

mod measure;
mod null_sink;

pub use measure::MeasureHelper;
pub use null_sink::{NullRenderSink, NullRenderSinkFactory};

use crate::decoder::Decoder;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

/// Render sink trait defining the interface for video output
pub trait RenderSink: Send {
    /// Bind this sink's surface to a decoder
    ///
    /// The sink must not keep the decoder; it only passes its surface over.
    fn attach_to_decoder(&mut self, decoder: &mut dyn Decoder) -> Result<()>;

    /// Set how the video fits the container
    fn set_scale_mode(&mut self, mode: ScaleMode);

    /// Set the intrinsic video size, zero sizes are ignored
    fn set_video_size(&mut self, width: u32, height: u32);

    /// Set the rotation reported by the stream, in degrees
    fn set_video_rotation(&mut self, degrees: u32);

    /// Flip horizontally
    fn set_mirror(&mut self, mirrored: bool);

    /// Capture the frame currently on screen
    fn screenshot(&self) -> Option<Snapshot>;

    /// Free the surface
    fn release(&mut self);
}

/// Creates a render sink per attach
pub trait RenderSinkFactory: Send + Sync {
    fn create_render_sink(&self) -> Result<Box<dyn RenderSink>>;
}

/// How video is scaled inside its container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Fit inside the container keeping the video's aspect ratio
    #[default]
    Default,
    /// Force a 16:9 box
    Ratio16x9,
    /// Force a 4:3 box
    Ratio4x3,
    /// Stretch to the container
    MatchParent,
    /// Use the video's own pixel size
    Original,
    /// Fill the container, cropping the overflow
    CenterCrop,
}

/// Still frame captured from a sink, RGBA8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Snapshot {
    /// Opaque black frame of the given size
    pub fn black(width: u32, height: u32) -> Self {
        let mut data = vec![0u8; (width as usize) * (height as usize) * 4];
        for pixel in data.chunks_exact_mut(4) {
            pixel[3] = 0xff;
        }
        Self { width, height, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_snapshot() {
        let snapshot = Snapshot::black(2, 3);
        assert_eq!(snapshot.data.len(), 24);
        assert!(snapshot.data.chunks(4).all(|p| p == [0, 0, 0, 0xff]));
    }

    #[test]
    fn test_scale_mode_serde_names() {
        let toml = toml::to_string(&std::collections::BTreeMap::from([("scale", ScaleMode::CenterCrop)])).unwrap();
        assert_eq!(toml.trim(), "scale = \"center_crop\"");
    }
}
