//! Messages processed on a view's queue

use crate::audio::FocusChange;
use crate::controller::ControllerCommand;
use crate::decoder::DecoderEvent;
use crate::renderer::ScaleMode;

/// Everything a view reacts to outside direct calls
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMessage {
    /// Callback from the decoder of `session`
    Decoder { session: u64, event: DecoderEvent },
    /// Transport or display request from a control component
    Player(PlayerCommand),
    /// Request for the attached controller
    Controller(ControllerCommand),
    /// Focus change from the audio service
    AudioFocus(FocusChange),
}

/// Player requests posted through a `PlayerHandle`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    Start,
    Pause,
    SeekTo(u64),
    StartFullScreen,
    StopFullScreen,
    StartTinyScreen,
    StopTinyScreen,
    SetMute(bool),
    SetScreenScale(ScaleMode),
    SetSpeed(f32),
    Replay { reset_position: bool },
    SetMirrorRotation(bool),
    SetRotation(f32),
}
