//! Audio focus arbitration

use super::{AudioManager, FocusChange, FocusChangeSender, FocusRequestResult};
use log::debug;
use std::sync::Arc;

/// Volume applied while another app ducks us
const DUCK_VOLUME: f32 = 0.1;

/// What the view should do in response to a focus change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusAction {
    Start,
    Pause,
    SetVolume(f32, f32),
}

/// Tracks the last known focus state of one view
pub struct AudioFocusHelper {
    audio: Arc<dyn AudioManager>,
    listener: FocusChangeSender,
    current: Option<FocusChange>,
    start_requested: bool,
    paused_for_loss: bool,
}

impl AudioFocusHelper {
    pub fn new(audio: Arc<dyn AudioManager>, listener: FocusChangeSender) -> Self {
        Self {
            audio,
            listener,
            current: None,
            start_requested: false,
            paused_for_loss: false,
        }
    }

    pub fn current_focus(&self) -> Option<FocusChange> {
        self.current
    }

    /// Request focus unless we already hold it
    ///
    /// A refused or delayed request remembers that playback wanted to start,
    /// so a later gain resumes it.
    pub fn request_focus(&mut self) {
        if self.current == Some(FocusChange::Gain) {
            return;
        }

        match self.audio.request_audio_focus(self.listener.clone()) {
            FocusRequestResult::Granted => self.current = Some(FocusChange::Gain),
            FocusRequestResult::Delayed | FocusRequestResult::Failed => {
                self.start_requested = true;
            }
        }
    }

    pub fn abandon_focus(&mut self) {
        self.start_requested = false;
        self.current = None;
        self.audio.abandon_audio_focus();
    }

    /// React to a focus change reported by the audio service
    ///
    /// Repeated reports of the current state are ignored.
    pub fn handle_focus_change(
        &mut self,
        change: FocusChange,
        playing: bool,
        muted: bool,
    ) -> Vec<FocusAction> {
        if self.current == Some(change) {
            return Vec::new();
        }
        self.current = Some(change);
        debug!("Audio focus -> {:?}", change);

        let mut actions = Vec::new();
        match change {
            FocusChange::Gain | FocusChange::GainTransient => {
                if self.start_requested || self.paused_for_loss {
                    actions.push(FocusAction::Start);
                    self.start_requested = false;
                    self.paused_for_loss = false;
                }
                if !muted {
                    actions.push(FocusAction::SetVolume(1.0, 1.0));
                }
            }
            FocusChange::Loss | FocusChange::LossTransient => {
                if playing {
                    actions.push(FocusAction::Pause);
                    self.paused_for_loss = true;
                }
            }
            FocusChange::LossTransientCanDuck => {
                if playing && !muted {
                    actions.push(FocusAction::SetVolume(DUCK_VOLUME, DUCK_VOLUME));
                }
            }
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingAudioManager;

    fn make_helper(result: FocusRequestResult) -> (AudioFocusHelper, Arc<RecordingAudioManager>) {
        let audio = Arc::new(RecordingAudioManager::new(15));
        audio.set_focus_result(result);
        let (tx, _rx) = crossbeam_channel::unbounded();
        let helper = AudioFocusHelper::new(audio.clone(), FocusChangeSender::new(tx));
        (helper, audio)
    }

    #[test]
    fn test_granted_request_is_not_repeated() {
        let (mut helper, audio) = make_helper(FocusRequestResult::Granted);
        helper.request_focus();
        helper.request_focus();
        assert_eq!(audio.focus_requests(), 1);
        assert_eq!(helper.current_focus(), Some(FocusChange::Gain));
    }

    #[test]
    fn test_delayed_gain_starts_playback() {
        let (mut helper, _audio) = make_helper(FocusRequestResult::Delayed);
        helper.request_focus();

        let actions = helper.handle_focus_change(FocusChange::Gain, false, false);
        assert_eq!(actions, vec![FocusAction::Start, FocusAction::SetVolume(1.0, 1.0)]);
    }

    #[test]
    fn test_loss_then_gain_resumes() {
        let (mut helper, _audio) = make_helper(FocusRequestResult::Granted);
        helper.request_focus();

        assert_eq!(
            helper.handle_focus_change(FocusChange::LossTransient, true, false),
            vec![FocusAction::Pause]
        );
        assert_eq!(
            helper.handle_focus_change(FocusChange::Gain, false, true),
            vec![FocusAction::Start]
        );
    }

    #[test]
    fn test_duplicate_changes_ignored() {
        let (mut helper, _audio) = make_helper(FocusRequestResult::Granted);
        assert_eq!(
            helper.handle_focus_change(FocusChange::Loss, true, false),
            vec![FocusAction::Pause]
        );
        assert!(helper.handle_focus_change(FocusChange::Loss, true, false).is_empty());
    }

    #[test]
    fn test_duck_lowers_volume_unless_muted() {
        let (mut helper, _audio) = make_helper(FocusRequestResult::Granted);
        assert_eq!(
            helper.handle_focus_change(FocusChange::LossTransientCanDuck, true, false),
            vec![FocusAction::SetVolume(0.1, 0.1)]
        );

        let (mut muted, _audio) = make_helper(FocusRequestResult::Granted);
        assert!(muted
            .handle_focus_change(FocusChange::LossTransientCanDuck, true, true)
            .is_empty());
    }

    #[test]
    fn test_abandon_clears_pending_start() {
        let (mut helper, audio) = make_helper(FocusRequestResult::Failed);
        helper.request_focus();
        helper.abandon_focus();
        assert_eq!(audio.focus_abandons(), 1);

        let actions = helper.handle_focus_change(FocusChange::Gain, false, false);
        assert_eq!(actions, vec![FocusAction::SetVolume(1.0, 1.0)]);
    }
}
