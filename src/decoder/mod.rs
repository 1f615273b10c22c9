//! Decoder module for TSPlayer
//!
//! The view treats the decoding backend as an opaque capability: it drives
//! the transport through `Decoder` and learns about progress only through
//! `DecoderEvent`s posted on its message queue. Backends are created per
//! playback session by a `DecoderFactory`.

mod simulated;

pub use simulated::{SimulatedDecoder, SimulatedDecoderFactory};

use crate::player::ViewMessage;
use crate::utils::error::Result;
use crossbeam_channel::Sender;
use std::collections::HashMap;

/// First video frame reached the surface
pub const MEDIA_INFO_RENDERING_START: i32 = 3;
/// Backend ran out of data and stalled
pub const MEDIA_INFO_BUFFERING_START: i32 = 701;
/// Backend has enough data again
pub const MEDIA_INFO_BUFFERING_END: i32 = 702;
/// Stream reported a rotation, `extra` carries the degrees
pub const MEDIA_INFO_VIDEO_ROTATION_CHANGED: i32 = 10001;

/// Decoder trait defining the capability the view drives
///
/// Fallible operations return `Err` for invalid-state calls; the view logs
/// them and moves to the error state, the cause is not kept.
pub trait Decoder: Send {
    /// Bind the decoder to the event queue of its session
    fn init(&mut self, events: DecoderEventSender) -> Result<()>;

    /// Set the media to play
    ///
    /// # Arguments
    ///
    /// * `source` - URL with headers or an opaque asset handle
    fn set_data_source(&mut self, source: &DataSource) -> Result<()>;

    /// Begin asynchronous preparation; completion arrives as `DecoderEvent::Prepared`
    fn prepare_async(&mut self) -> Result<()>;

    fn start(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Return to the uninitialized state so the session can be prepared again
    fn reset(&mut self) -> Result<()>;

    /// Free native resources; may block and is run off the UI thread
    fn release(&mut self);

    /// Seek to a position in milliseconds
    fn seek_to(&mut self, position_ms: u64) -> Result<()>;

    fn is_playing(&self) -> bool;

    /// Duration in milliseconds, 0 when unknown
    fn duration(&self) -> u64;

    /// Position in milliseconds
    fn current_position(&self) -> u64;

    /// Buffered share of the stream, 0..=100
    fn buffered_percentage(&self) -> u32;

    fn set_speed(&mut self, speed: f32) -> Result<()>;

    fn speed(&self) -> f32;

    /// Network throughput in bytes per second
    fn tcp_speed(&self) -> u64;

    fn set_volume(&mut self, left: f32, right: f32) -> Result<()>;

    fn set_looping(&mut self, looping: bool);

    /// Attach or detach the output surface
    fn set_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()>;

    /// Apply backend-specific options after init or reset
    fn set_options(&mut self) {}

    /// Give backends without their own thread a chance to post events
    fn poll(&mut self) {}
}

/// Creates one decoder per playback session
pub trait DecoderFactory: Send + Sync {
    fn create_decoder(&self) -> Result<Box<dyn Decoder>>;
}

/// Where the media comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Remote or local URL plus request headers
    Url {
        url: String,
        headers: HashMap<String, String>,
    },

    /// Opaque handle to packaged media
    Asset(AssetHandle),
}

/// Handle to a packaged media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    /// Raw descriptor owned by the platform
    pub descriptor: i64,

    /// Start offset within the descriptor
    pub offset: u64,

    /// Length in bytes
    pub length: u64,
}

/// URL schemes that never touch the network
const LOCAL_SCHEMES: &[&str] = &["file", "asset", "rawresource", "android.resource"];

impl DataSource {
    pub fn url<S: Into<String>>(url: S) -> Self {
        DataSource::Url {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    /// Whether playing this source can use metered data
    ///
    /// Asset handles and scheme-less paths are local.
    pub fn is_local(&self) -> bool {
        match self {
            DataSource::Asset(_) => true,
            DataSource::Url { url, .. } => match url.split_once("://") {
                Some((scheme, _)) => LOCAL_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()),
                None => !url.contains(':'),
            },
        }
    }

    /// Key used by the progress store, assets have none
    pub fn progress_key(&self) -> Option<&str> {
        match self {
            DataSource::Url { url, .. } => Some(url.as_str()),
            DataSource::Asset(_) => None,
        }
    }
}

/// Opaque identifier of a render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Events a backend reports back to the view
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderEvent {
    Prepared,
    Completion,
    Error { what: i32, extra: i32 },
    Info { what: i32, extra: i32 },
    VideoSizeChanged { width: u32, height: u32 },
    BufferingUpdate { percent: u32 },
}

/// Posts decoder events onto the owning view's queue
///
/// Every sender is stamped with the session it was created for; the view
/// drops events from sessions that are no longer current.
#[derive(Debug, Clone)]
pub struct DecoderEventSender {
    session: u64,
    tx: Sender<ViewMessage>,
}

impl DecoderEventSender {
    pub(crate) fn new(session: u64, tx: Sender<ViewMessage>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Returns false once the view is gone
    pub fn send(&self, event: DecoderEvent) -> bool {
        self.tx
            .send(ViewMessage::Decoder {
                session: self.session,
                event,
            })
            .is_ok()
    }
}
