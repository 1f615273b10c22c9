//! Read-mostly snapshot of a view, shared with control components

use super::message::{PlayerCommand, ViewMessage};
use super::{PlayState, PlayerState};
use crossbeam_channel::Sender;
use log::warn;
use parking_lot::RwLock;
use std::sync::Arc;

/// Last published state of a view
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub play_state: PlayState,
    pub player_state: PlayerState,
    pub playing: bool,
    /// Position in milliseconds, 0 outside playback
    pub position: u64,
    /// Duration in milliseconds, 0 outside playback
    pub duration: u64,
    pub buffered_percentage: u32,
    pub speed: f32,
    pub tcp_speed: u64,
    pub mute: bool,
    pub full_screen: bool,
    pub tiny_screen: bool,
    pub video_size: (u32, u32),
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self {
            play_state: PlayState::Idle,
            player_state: PlayerState::Normal,
            playing: false,
            position: 0,
            duration: 0,
            buffered_percentage: 0,
            speed: 1.0,
            tcp_speed: 0,
            mute: false,
            full_screen: false,
            tiny_screen: false,
            video_size: (0, 0),
        }
    }
}

/// Reads a view's status and posts requests to it
///
/// Requests are applied when the view next drains its queue, which every
/// view entry point does before returning.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    status: Arc<RwLock<PlayerStatus>>,
    tx: Sender<ViewMessage>,
}

impl PlayerHandle {
    pub(crate) fn new(status: Arc<RwLock<PlayerStatus>>, tx: Sender<ViewMessage>) -> Self {
        Self { status, tx }
    }

    /// Copy of the latest snapshot
    pub fn status(&self) -> PlayerStatus {
        self.status.read().clone()
    }

    /// Read one field without cloning the snapshot
    pub fn read<T>(&self, f: impl FnOnce(&PlayerStatus) -> T) -> T {
        f(&self.status.read())
    }

    pub fn post(&self, command: PlayerCommand) {
        if self.tx.send(ViewMessage::Player(command)).is_err() {
            warn!("View is gone, dropping {:?}", command);
        }
    }
}
