//! Builder for `VideoView`

use super::progress::ProgressManager;
use super::video_view::VideoView;
use crate::audio::AudioManager;
use crate::decoder::DecoderFactory;
use crate::renderer::{NullRenderSinkFactory, RenderSinkFactory};
use crate::utils::config::{Config, PlaybackPolicy};
use crate::utils::error::{PlayerError, Result};
use crate::utils::timer::{Clock, SystemClock};
use crate::window::Platform;
use std::sync::Arc;

/// Collaborators a view is built from
pub(super) struct ViewParts {
    pub config: Config,
    pub policy: Option<PlaybackPolicy>,
    pub platform: Arc<dyn Platform>,
    pub audio: Arc<dyn AudioManager>,
    pub clock: Arc<dyn Clock>,
    pub decoder_factory: Arc<dyn DecoderFactory>,
    pub sink_factory: Arc<dyn RenderSinkFactory>,
    pub progress_manager: Option<Arc<dyn ProgressManager>>,
}

/// Builder for creating a video view
pub struct VideoViewBuilder {
    config: Config,
    policy: Option<PlaybackPolicy>,
    platform: Arc<dyn Platform>,
    audio: Arc<dyn AudioManager>,
    clock: Option<Arc<dyn Clock>>,
    decoder_factory: Option<Arc<dyn DecoderFactory>>,
    sink_factory: Option<Arc<dyn RenderSinkFactory>>,
    progress_manager: Option<Arc<dyn ProgressManager>>,
}

impl VideoViewBuilder {
    /// Create a builder for a view hosted by `platform`
    pub fn new(platform: Arc<dyn Platform>, audio: Arc<dyn AudioManager>) -> Self {
        Self {
            config: Config::default(),
            policy: None,
            platform,
            audio,
            clock: None,
            decoder_factory: None,
            sink_factory: None,
            progress_manager: None,
        }
    }

    /// Set player configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Share a mobile-network policy with other views
    ///
    /// Without one, the view gets its own policy seeded from the config.
    pub fn with_policy(mut self, policy: PlaybackPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Set the backend that creates one decoder per session
    pub fn with_decoder_factory(mut self, factory: Arc<dyn DecoderFactory>) -> Self {
        self.decoder_factory = Some(factory);
        self
    }

    /// Set the render sink backend, headless by default
    pub fn with_render_sink_factory(mut self, factory: Arc<dyn RenderSinkFactory>) -> Self {
        self.sink_factory = Some(factory);
        self
    }

    /// Remember and restore playback positions
    pub fn with_progress_manager(mut self, manager: Arc<dyn ProgressManager>) -> Self {
        self.progress_manager = Some(manager);
        self
    }

    /// Time source for controller timers, the system clock by default
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the view
    ///
    /// # Returns
    ///
    /// A `Config` error if no decoder factory was set or the config is invalid
    pub fn build(self) -> Result<VideoView> {
        VideoView::from_builder(self)
    }

    pub(super) fn into_parts(self) -> Result<ViewParts> {
        self.config.validate()?;
        let decoder_factory = self
            .decoder_factory
            .ok_or_else(|| PlayerError::config("a decoder factory is required"))?;

        Ok(ViewParts {
            config: self.config,
            policy: self.policy,
            platform: self.platform,
            audio: self.audio,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
            decoder_factory,
            sink_factory: self
                .sink_factory
                .unwrap_or_else(|| Arc::new(NullRenderSinkFactory::default())),
            progress_manager: self.progress_manager,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayState;
    use crate::testing::{RecordingAudioManager, RecordingPlatform, ScriptedDecoderFactory};

    fn builder() -> VideoViewBuilder {
        VideoViewBuilder::new(
            Arc::new(RecordingPlatform::new(1080, 1920)),
            Arc::new(RecordingAudioManager::new(15)),
        )
    }

    #[test]
    fn test_decoder_factory_required() {
        let result = builder().build();
        assert!(matches!(result, Err(PlayerError::Config(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.controller.default_timeout_ms = 0;
        let result = builder()
            .with_config(config)
            .with_decoder_factory(Arc::new(ScriptedDecoderFactory::new()))
            .build();
        assert!(matches!(result, Err(PlayerError::Config(_))));
    }

    #[test]
    fn test_policy_seeded_from_config() {
        let mut config = Config::default();
        config.playback.play_on_mobile_network = true;
        let view = builder()
            .with_config(config)
            .with_decoder_factory(Arc::new(ScriptedDecoderFactory::new()))
            .build()
            .unwrap();
        assert!(view.policy().play_on_mobile_network());
        assert_eq!(view.play_state(), PlayState::Idle);
    }

    #[test]
    fn test_shared_policy() {
        let policy = PlaybackPolicy::new(false);
        let view = builder()
            .with_policy(policy.clone())
            .with_decoder_factory(Arc::new(ScriptedDecoderFactory::new()))
            .build()
            .unwrap();
        policy.set_play_on_mobile_network(true);
        assert!(view.policy().play_on_mobile_network());
    }
}
