//! Integration tests for the TSPlayer playback core
//!
//! These tests drive whole sessions through the public API:
//! - Prepare, playback, completion and replay with the stock overlays
//! - The mobile network gate and its confirmation
//! - Gesture seeking
//! - Resume points through the progress store

use anyhow::{anyhow, Result};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use tsplayer::components::{
    CompleteView, ErrorView, GestureIcon, GestureView, PrepareView, StandardControlView, TitleView,
    VodControlView,
};
use tsplayer::decoder::{
    DecoderEvent, SimulatedDecoderFactory, MEDIA_INFO_BUFFERING_END, MEDIA_INFO_BUFFERING_START,
    MEDIA_INFO_RENDERING_START,
};
use tsplayer::player::{JsonProgressManager, ProgressManager};
use tsplayer::testing::{DecoderCall, RecordingAudioManager, RecordingPlatform};
use tsplayer::utils::{Clock, SystemClock};
use tsplayer::window::TouchAction;
use tsplayer::{MediaPlayerControl, PlayState, PlayerState, VideoViewBuilder};
use tsplayer_integration_tests::{Session, CLIP_URL};

mock! {
    pub Progress {}

    impl ProgressManager for Progress {
        fn saved_progress<'a>(&self, key: Option<&'a str>) -> u64;
        fn save_progress<'a>(&self, key: Option<&'a str>, position_ms: u64);
    }
}

#[test]
fn test_full_session_with_stock_overlays() -> Result<()> {
    let mut s = Session::new()?;
    let ids = s.ids;

    s.view.set_url(CLIP_URL);
    s.view.start();
    assert_eq!(s.view.play_state(), PlayState::Preparing);
    let prepare = s.view.component::<PrepareView>(ids.prepare).ok_or_else(|| anyhow!("no prepare view"))?;
    assert!(prepare.is_loading());
    assert!(!prepare.is_start_button_visible());

    s.emit(DecoderEvent::Prepared);
    s.emit(DecoderEvent::Info {
        what: MEDIA_INFO_RENDERING_START,
        extra: 0,
    });
    assert_eq!(s.view.play_state(), PlayState::Playing);
    assert!(s.view.is_keep_screen_on());
    assert!(s.view.component::<PrepareView>(ids.prepare).is_some_and(|p| !p.is_visible()));

    // Progress polling lands on the next whole second
    s.decoders.set_position(30_000);
    s.decoders.set_buffered(50);
    s.advance(1_000);
    let bar = s.view.component::<VodControlView>(ids.control).ok_or_else(|| anyhow!("no control bar"))?;
    assert!(bar.is_visible());
    assert!(bar.is_play_selected());
    assert_eq!(bar.current_time(), "00:30");
    assert_eq!(bar.total_time(), "10:00");
    assert_eq!(bar.progress(), 50);
    assert_eq!(bar.secondary_progress(), 500);

    s.view.pause();
    assert_eq!(s.view.play_state(), PlayState::Paused);
    assert!(s.view.component::<VodControlView>(ids.control).is_some_and(|b| !b.is_play_selected()));
    s.view.resume();
    assert_eq!(s.view.play_state(), PlayState::Playing);

    s.emit(DecoderEvent::Completion);
    assert_eq!(s.view.play_state(), PlayState::PlaybackCompleted);
    assert!(!s.view.is_keep_screen_on());
    assert!(s.view.component::<CompleteView>(ids.complete).is_some_and(|c| c.is_visible()));
    assert!(s.view.component::<VodControlView>(ids.control).is_some_and(|b| b.progress() == 0));

    s.view
        .component_mut::<CompleteView>(ids.complete)
        .ok_or_else(|| anyhow!("no complete view"))?
        .replay();
    s.view.dispatch_pending();
    assert_eq!(s.view.play_state(), PlayState::Preparing);
    assert_eq!(s.decoders.created(), 1);
    let calls = s.decoders.calls_of(0);
    assert!(calls.contains(&DecoderCall::Reset));
    assert_eq!(calls.iter().filter(|c| **c == DecoderCall::PrepareAsync).count(), 2);

    s.view.release();
    assert_eq!(s.view.play_state(), PlayState::Idle);
    assert!(s.view.wait_for_releases(Duration::from_secs(2)));
    assert!(s.decoders.calls_of(0).contains(&DecoderCall::Release));
    assert!(s.sinks.last().is_some_and(|sink| sink.released));
    Ok(())
}

#[test]
fn test_mobile_network_needs_confirmation() -> Result<()> {
    let mut s = Session::on_mobile_network()?;
    let ids = s.ids;

    s.view.set_url(CLIP_URL);
    s.view.start();
    assert_eq!(s.view.play_state(), PlayState::StartAbort);
    assert_eq!(s.decoders.created(), 0);
    assert!(s.view.component::<PrepareView>(ids.prepare).is_some_and(|p| p.is_net_warning_visible()));

    s.view
        .component_mut::<PrepareView>(ids.prepare)
        .ok_or_else(|| anyhow!("no prepare view"))?
        .confirm_mobile_playback();
    s.view.dispatch_pending();

    assert!(s.view.policy().play_on_mobile_network());
    assert_eq!(s.view.play_state(), PlayState::Preparing);
    assert_eq!(s.decoders.created(), 1);
    assert!(s.view.component::<PrepareView>(ids.prepare).is_some_and(|p| !p.is_net_warning_visible()));

    // Later sessions on the same policy start right away
    s.view.release();
    s.view.start();
    assert_eq!(s.view.play_state(), PlayState::Preparing);
    Ok(())
}

#[test]
fn test_horizontal_drag_previews_then_seeks() -> Result<()> {
    let mut s = Session::new()?;
    let ids = s.ids;
    s.play_clip()?;
    s.decoders.set_position(60_000);
    s.advance(16);

    s.touch(TouchAction::Down, 500.0, 1000.0);
    s.clock.advance(16);
    s.touch(TouchAction::Move, 400.0, 1000.0);

    let gesture = s.view.component::<GestureView>(ids.gesture).ok_or_else(|| anyhow!("no gesture view"))?;
    assert!(gesture.is_center_visible());
    assert_eq!(gesture.icon(), Some(GestureIcon::FastRewind));
    assert_eq!(gesture.text(), "00:48/10:00");
    assert!(s.decoders.seeks().is_empty());

    s.clock.advance(16);
    s.touch(TouchAction::Up, 400.0, 1000.0);
    assert_eq!(s.decoders.seeks(), vec![48_000]);
    assert!(s.view.component::<GestureView>(ids.gesture).is_some_and(|g| !g.is_center_visible()));
    Ok(())
}

#[test]
fn test_vertical_drag_on_right_raises_volume() -> Result<()> {
    let mut s = Session::new()?;
    s.play_clip()?;

    s.drag((800.0, 1500.0), &[(800.0, 1400.0), (800.0, 1000.0)]);

    let gesture = s.view.component::<GestureView>(s.ids.gesture).ok_or_else(|| anyhow!("no gesture view"))?;
    assert_eq!(gesture.icon(), Some(GestureIcon::VolumeUp));
    assert_eq!(gesture.percent(), 50);
    assert!(s.decoders.seeks().is_empty());
    Ok(())
}

#[test]
fn test_error_then_retry_prepares_again() -> Result<()> {
    let mut s = Session::new()?;
    let ids = s.ids;
    s.play_clip()?;

    s.emit(DecoderEvent::Error { what: 1, extra: -1004 });
    assert_eq!(s.view.play_state(), PlayState::Error);
    assert!(s.view.component::<ErrorView>(ids.error).is_some_and(|e| e.is_visible()));

    s.view
        .component_mut::<ErrorView>(ids.error)
        .ok_or_else(|| anyhow!("no error view"))?
        .retry();
    s.view.dispatch_pending();
    assert_eq!(s.view.play_state(), PlayState::Preparing);
    Ok(())
}

#[test]
fn test_buffering_round_trip() -> Result<()> {
    let mut s = Session::new()?;
    s.play_clip()?;

    s.emit(DecoderEvent::Info { what: MEDIA_INFO_BUFFERING_START, extra: 0 });
    assert_eq!(s.view.play_state(), PlayState::Buffering);
    s.emit(DecoderEvent::Info { what: MEDIA_INFO_BUFFERING_END, extra: 0 });
    assert_eq!(s.view.play_state(), PlayState::Playing);
    assert!(s.view.is_keep_screen_on());
    Ok(())
}

#[test]
fn test_full_screen_round_trip_through_overlays() -> Result<()> {
    let mut s = Session::new()?;
    let ids = s.ids;
    s.play_clip()?;

    s.view.start_full_screen();
    assert_eq!(s.view.player_state(), PlayerState::FullScreen);
    assert!(!s.platform.system_bars_visible());
    assert!(s.view.component::<VodControlView>(ids.control).is_some_and(|b| b.is_full_screen_selected()));

    assert!(s.view.on_back_pressed());
    assert_eq!(s.view.player_state(), PlayerState::Normal);
    assert!(s.platform.system_bars_visible());
    Ok(())
}

#[test]
fn test_lock_button_holds_full_screen() -> Result<()> {
    let mut s = Session::new()?;
    let ids = s.ids;
    s.play_clip()?;
    s.view.start_full_screen();

    s.view
        .component_mut::<StandardControlView>(ids.standard)
        .ok_or_else(|| anyhow!("no lock button"))?
        .toggle_lock();
    s.view.dispatch_pending();
    assert!(s.view.component::<StandardControlView>(ids.standard).is_some_and(|c| c.is_lock_selected()));

    // Locked: back only brings the controls up, and only the lock button shows
    assert!(s.view.on_back_pressed());
    assert_eq!(s.view.player_state(), PlayerState::FullScreen);
    assert!(s.view.component::<StandardControlView>(ids.standard).is_some_and(|c| c.is_lock_visible()));
    assert!(s.view.component::<TitleView>(ids.title).is_some_and(|t| !t.is_visible()));

    s.view
        .component_mut::<StandardControlView>(ids.standard)
        .ok_or_else(|| anyhow!("no lock button"))?
        .toggle_lock();
    s.view.dispatch_pending();
    assert!(s.view.component::<StandardControlView>(ids.standard).is_some_and(|c| !c.is_lock_selected()));

    assert!(s.view.on_back_pressed());
    assert_eq!(s.view.player_state(), PlayerState::Normal);
    assert!(s.view.component::<StandardControlView>(ids.standard).is_some_and(|c| !c.is_lock_visible()));
    Ok(())
}

#[test]
fn test_spinner_follows_buffering() -> Result<()> {
    let mut s = Session::new()?;
    let ids = s.ids;
    s.view.set_url(CLIP_URL);
    s.view.start();
    assert!(s.view.component::<StandardControlView>(ids.standard).is_some_and(|c| c.is_loading_visible()));

    s.emit(DecoderEvent::Prepared);
    s.emit(DecoderEvent::Info { what: MEDIA_INFO_RENDERING_START, extra: 0 });
    assert!(s.view.component::<StandardControlView>(ids.standard).is_some_and(|c| !c.is_loading_visible()));

    s.emit(DecoderEvent::Info { what: MEDIA_INFO_BUFFERING_START, extra: 0 });
    assert!(s.view.component::<StandardControlView>(ids.standard).is_some_and(|c| c.is_loading_visible()));
    s.emit(DecoderEvent::Info { what: MEDIA_INFO_BUFFERING_END, extra: 0 });
    assert!(s.view.component::<StandardControlView>(ids.standard).is_some_and(|c| !c.is_loading_visible()));
    Ok(())
}

#[test]
fn test_resume_point_from_mock_store() -> Result<()> {
    let mut progress = MockProgress::new();
    progress
        .expect_saved_progress()
        .withf(|key| *key == Some(CLIP_URL))
        .times(1)
        .returning(|_| 30_000);
    progress
        .expect_save_progress()
        .withf(|key, position| *key == Some(CLIP_URL) && *position == 45_000)
        .times(1)
        .return_const(());

    let mut s = Session::with_progress(Arc::new(progress))?;
    s.play_clip()?;
    assert_eq!(s.decoders.seeks(), vec![30_000]);

    s.decoders.set_position(45_000);
    s.view.release();
    assert_eq!(s.view.play_state(), PlayState::Idle);
    Ok(())
}

#[test]
fn test_json_store_survives_views() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("progress.json");

    let mut first = Session::with_progress(Arc::new(JsonProgressManager::open(&path)?))?;
    first.play_clip()?;
    first.decoders.set_position(42_000);
    first.view.release();
    assert!(path.exists());

    let mut second = Session::with_progress(Arc::new(JsonProgressManager::open(&path)?))?;
    second.play_clip()?;
    assert_eq!(second.decoders.seeks(), vec![42_000]);

    second.emit(DecoderEvent::Completion);
    let reopened = JsonProgressManager::open(&path)?;
    assert_eq!(reopened.saved_progress(Some(CLIP_URL)), 0);
    Ok(())
}

#[tokio::test]
async fn test_simulated_session_runs_to_completion() -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let decoders = SimulatedDecoderFactory::new(clock.clone(), 300).with_video_size(640, 360);
    let mut view = VideoViewBuilder::new(
        Arc::new(RecordingPlatform::new(1080, 1920)),
        Arc::new(RecordingAudioManager::new(15)),
    )
    .with_decoder_factory(Arc::new(decoders))
    .with_clock(clock)
    .build()?;

    view.set_url("file:///media/short.mp4");
    view.start();

    let finished = tokio::time::timeout(Duration::from_secs(5), async {
        let mut ticker = tokio::time::interval(Duration::from_millis(10));
        loop {
            ticker.tick().await;
            view.tick_now();
            if view.play_state() == PlayState::PlaybackCompleted {
                break;
            }
        }
    })
    .await;
    assert!(finished.is_ok(), "session stuck in {:?}", view.play_state());
    assert_eq!(view.video_size(), (640, 360));

    view.release();
    assert!(view.wait_for_releases(Duration::from_secs(2)));
    Ok(())
}
