//! Audio module for TSPlayer
//!
//! The platform's audio service is reached through `AudioManager`: stream
//! volume for the volume gesture and focus arbitration with other players.
//! Focus changes may be reported from any thread; they are queued on the
//! view and handled by `AudioFocusHelper` in arrival order.

mod focus;

pub use focus::{AudioFocusHelper, FocusAction};

use crate::player::ViewMessage;
use crossbeam_channel::Sender;

/// Audio service trait
pub trait AudioManager: Send + Sync {
    /// Current media stream volume index
    fn stream_volume(&self) -> u32;

    /// Highest media stream volume index
    fn max_stream_volume(&self) -> u32;

    /// Set the media stream volume index
    fn set_stream_volume(&self, index: u32);

    /// Ask for playback focus
    ///
    /// # Arguments
    ///
    /// * `listener` - Where later focus changes are reported
    fn request_audio_focus(&self, listener: FocusChangeSender) -> FocusRequestResult;

    /// Give focus back
    fn abandon_audio_focus(&self);
}

/// Focus transitions reported by the audio service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    Gain,
    GainTransient,
    Loss,
    LossTransient,
    LossTransientCanDuck,
}

/// Outcome of a focus request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequestResult {
    Granted,
    /// Focus will arrive later as a `FocusChange::Gain`
    Delayed,
    Failed,
}

/// Thread-safe handle the audio service uses to report focus changes
#[derive(Debug, Clone)]
pub struct FocusChangeSender {
    tx: Sender<ViewMessage>,
}

impl FocusChangeSender {
    pub(crate) fn new(tx: Sender<ViewMessage>) -> Self {
        Self { tx }
    }

    /// Queue a focus change; returns false once the view is gone
    pub fn notify(&self, change: FocusChange) -> bool {
        self.tx.send(ViewMessage::AudioFocus(change)).is_ok()
    }
}
