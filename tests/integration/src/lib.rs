//! Integration test utilities for TSPlayer
//!
//! `Session` wires a `VideoView` to the recording doubles from
//! `tsplayer::testing` and the stock overlay set, on a manual clock, so
//! scenarios can drive a whole playback session through the public API.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tsplayer::components::{standard_controller, StandardComponents};
use tsplayer::decoder::{DecoderEvent, MEDIA_INFO_RENDERING_START};
use tsplayer::player::{MemoryProgressManager, ProgressManager};
use tsplayer::testing::{RecordingAudioManager, RecordingPlatform, RecordingSinkFactory, ScriptedDecoderFactory};
use tsplayer::utils::{Clock, Config, ManualClock};
use tsplayer::window::{NetworkType, TouchAction, TouchEvent};
use tsplayer::{MediaPlayerControl, PlayState, VideoView, VideoViewBuilder};

/// Remote clip used by most scenarios
pub const CLIP_URL: &str = "https://cdn.example.com/vod/clip.m3u8";

/// Ten minutes
pub const CLIP_DURATION_MS: u64 = 600_000;

/// Screen of the recording platform, portrait
pub const SCREEN: (u32, u32) = (1000, 2000);

/// One view with the stock controller and recording collaborators
pub struct Session {
    pub view: VideoView,
    pub ids: StandardComponents,
    pub decoders: ScriptedDecoderFactory,
    pub sinks: RecordingSinkFactory,
    pub platform: Arc<RecordingPlatform>,
    pub audio: Arc<RecordingAudioManager>,
    pub clock: Arc<ManualClock>,
}

impl Session {
    /// Session with an in-memory progress store
    pub fn new() -> Result<Self> {
        Self::with_progress(Arc::new(MemoryProgressManager::new()))
    }

    pub fn with_progress(progress: Arc<dyn ProgressManager>) -> Result<Self> {
        Self::build(progress, NetworkType::Wifi)
    }

    /// Session whose platform reports a metered connection
    pub fn on_mobile_network() -> Result<Self> {
        Self::build(Arc::new(MemoryProgressManager::new()), NetworkType::Mobile)
    }

    fn build(progress: Arc<dyn ProgressManager>, network: NetworkType) -> Result<Self> {
        let platform = Arc::new(RecordingPlatform::new(SCREEN.0, SCREEN.1));
        platform.set_network(network);
        let audio = Arc::new(RecordingAudioManager::new(15));
        let clock = Arc::new(ManualClock::new(1_000));
        let decoders = ScriptedDecoderFactory::new();
        decoders.set_duration(CLIP_DURATION_MS);
        let sinks = RecordingSinkFactory::new();

        let config = Config::default();
        let mut view = VideoViewBuilder::new(platform.clone(), audio.clone())
            .with_config(config.clone())
            .with_decoder_factory(Arc::new(decoders.clone()))
            .with_render_sink_factory(Arc::new(sinks.clone()))
            .with_progress_manager(progress)
            .with_clock(clock.clone())
            .build()?;

        let (controller, ids) =
            standard_controller(config.controller, view.policy().clone(), "Clip", false, 1);
        if view.set_video_controller(Some(Box::new(controller))).is_some() {
            return Err(anyhow!("fresh view already had a controller"));
        }

        Ok(Self {
            view,
            ids,
            decoders,
            sinks,
            platform,
            audio,
            clock,
        })
    }

    /// Post a decoder event and let the view handle it
    pub fn emit(&mut self, event: DecoderEvent) {
        self.decoders.emit(event);
        self.view.dispatch_pending();
    }

    /// Start `CLIP_URL` and walk the decoder up to the first rendered frame
    pub fn play_clip(&mut self) -> Result<()> {
        self.view.set_url(CLIP_URL);
        self.view.start();
        if self.view.play_state() != PlayState::Preparing {
            return Err(anyhow!("start left the view in {:?}", self.view.play_state()));
        }
        self.emit(DecoderEvent::Prepared);
        self.emit(DecoderEvent::Info {
            what: MEDIA_INFO_RENDERING_START,
            extra: 0,
        });
        match self.view.play_state() {
            PlayState::Playing => Ok(()),
            state => Err(anyhow!("clip did not reach Playing, got {:?}", state)),
        }
    }

    /// Move the clock forward and run the view's timers
    pub fn advance(&mut self, ms: u64) {
        self.clock.advance(ms);
        self.view.tick_now();
    }

    /// Feed one touch sample stamped with the current clock
    pub fn touch(&mut self, action: TouchAction, x: f32, y: f32) -> bool {
        let event = TouchEvent::new(action, x, y, self.clock.now_ms());
        self.view.on_touch(event)
    }

    /// A touch sequence: press, move through `path`, release at its end
    pub fn drag(&mut self, from: (f32, f32), path: &[(f32, f32)]) {
        self.touch(TouchAction::Down, from.0, from.1);
        for &(x, y) in path {
            self.clock.advance(16);
            self.touch(TouchAction::Move, x, y);
        }
        let end = path.last().copied().unwrap_or(from);
        self.clock.advance(16);
        self.touch(TouchAction::Up, end.0, end.1);
    }
}
