//! TSPlayer - embeddable video playback core
//!
//! A `VideoView` drives one decoder session at a time through the playback
//! state machine, hosts a controller with its overlay components, and
//! translates touch gestures into seek, volume and brightness changes.
//! Everything platform specific (windowing, audio service, decoding,
//! drawing) is reached through traits supplied at build time.

pub mod audio;
pub mod components;
pub mod controller;
pub mod decoder;
pub mod player;
pub mod renderer;
pub mod utils;
pub mod window;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use controller::{BaseVideoController, ControlWrapper, Controller, GestureVideoController};
pub use decoder::{DataSource, Decoder, DecoderFactory};
pub use player::{
    MediaPlayerControl, OnStateChangeListener, PlayState, PlayerState, VideoView, VideoViewBuilder,
};
pub use renderer::{RenderSink, RenderSinkFactory, ScaleMode};
pub use utils::{Config, PlaybackPolicy, PlayerError, Result};
pub use window::Platform;
