//! Player module for TSPlayer
//!
//! `VideoView` is the playback state machine: it owns the decoder and the
//! render sink of the current session, the data source and the two state
//! axes (`PlayState` for transport, `PlayerState` for display mode). All
//! decoder callbacks, control commands and focus changes reach it as
//! `ViewMessage`s on one queue and are handled in arrival order.

mod builder;
mod message;
mod progress;
mod release;
mod status;
mod video_view;

pub use builder::VideoViewBuilder;
pub use message::{PlayerCommand, ViewMessage};
pub use progress::{JsonProgressManager, MemoryProgressManager, ProgressManager};
pub use release::ReleaseHandle;
pub use status::{PlayerHandle, PlayerStatus};
pub use video_view::VideoView;

use crate::renderer::ScaleMode;

/// Transport state of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayState {
    Error,
    Idle,
    Preparing,
    Prepared,
    Playing,
    Paused,
    PlaybackCompleted,
    Buffering,
    Buffered,
    /// Start refused until the user allows playback on a mobile network
    StartAbort,
}

impl PlayState {
    /// States in which the decoder accepts transport calls
    pub fn is_in_playback(self) -> bool {
        !matches!(
            self,
            PlayState::Error
                | PlayState::Idle
                | PlayState::Preparing
                | PlayState::StartAbort
                | PlayState::PlaybackCompleted
        )
    }

    /// Playback states in which touch gestures are accepted
    pub fn accepts_gestures(self) -> bool {
        self.is_in_playback() && self != PlayState::Prepared
    }
}

/// Display mode of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Normal,
    FullScreen,
    TinyScreen,
}

/// Observer of a view's state changes
pub trait OnStateChangeListener: Send {
    fn on_play_state_changed(&mut self, _state: PlayState) {}
    fn on_player_state_changed(&mut self, _state: PlayerState) {}
}

/// Identifies a registered state listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Transport and display operations shared by the view and its control wrapper
pub trait MediaPlayerControl {
    fn start(&mut self);

    fn pause(&mut self);

    /// Duration in milliseconds, 0 outside playback
    fn duration(&self) -> u64;

    /// Position in milliseconds, 0 outside playback
    fn current_position(&self) -> u64;

    /// Seek in milliseconds; ignored outside playback
    fn seek_to(&mut self, position_ms: u64);

    fn is_playing(&self) -> bool;

    fn buffered_percentage(&self) -> u32;

    fn start_full_screen(&mut self);

    fn stop_full_screen(&mut self);

    fn is_full_screen(&self) -> bool;

    fn set_mute(&mut self, mute: bool);

    fn is_mute(&self) -> bool;

    fn set_screen_scale(&mut self, mode: ScaleMode);

    fn set_speed(&mut self, speed: f32);

    fn speed(&self) -> f32;

    /// Network throughput in bytes per second
    fn tcp_speed(&self) -> u64;

    /// Prepare the current source again, optionally from the start
    fn replay(&mut self, reset_position: bool);

    fn set_mirror_rotation(&mut self, enable: bool);

    fn video_size(&self) -> (u32, u32);

    fn set_rotation(&mut self, degrees: f32);

    fn start_tiny_screen(&mut self);

    fn stop_tiny_screen(&mut self);

    fn is_tiny_screen(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_states() {
        let playback = [
            PlayState::Prepared,
            PlayState::Playing,
            PlayState::Paused,
            PlayState::Buffering,
            PlayState::Buffered,
        ];
        for state in playback {
            assert!(state.is_in_playback(), "{:?}", state);
        }

        let idle = [
            PlayState::Error,
            PlayState::Idle,
            PlayState::Preparing,
            PlayState::PlaybackCompleted,
            PlayState::StartAbort,
        ];
        for state in idle {
            assert!(!state.is_in_playback(), "{:?}", state);
        }
    }

    #[test]
    fn test_prepared_rejects_gestures() {
        assert!(!PlayState::Prepared.accepts_gestures());
        assert!(PlayState::Playing.accepts_gestures());
        assert!(!PlayState::Idle.accepts_gestures());
    }
}
