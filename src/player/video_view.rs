//! Playback state machine
//!
//! One `VideoView` plays one data source at a time. `start()` creates a
//! decoder and a render sink for a new session, decoder callbacks move the
//! play state forward, and `release()` tears the session down and returns
//! to `Idle`. Control components never call the view directly; their
//! requests are queued and applied by `dispatch_pending`.

use super::builder::VideoViewBuilder;
use super::message::{PlayerCommand, ViewMessage};
use super::progress::ProgressManager;
use super::release::{release_in_background, ReleaseHandle};
use super::status::{PlayerHandle, PlayerStatus};
use super::{ListenerId, MediaPlayerControl, OnStateChangeListener, PlayState, PlayerState};
use crate::audio::{AudioFocusHelper, AudioManager, FocusAction, FocusChange, FocusChangeSender};
use crate::controller::{AttachContext, ComponentId, ControlComponent, Controller};
use crate::decoder::{
    AssetHandle, DataSource, Decoder, DecoderEvent, DecoderEventSender, DecoderFactory,
    MEDIA_INFO_BUFFERING_END, MEDIA_INFO_BUFFERING_START, MEDIA_INFO_RENDERING_START,
    MEDIA_INFO_VIDEO_ROTATION_CHANGED,
};
use crate::renderer::{RenderSink, RenderSinkFactory, ScaleMode, Snapshot};
use crate::utils::config::{Config, PlaybackPolicy};
use crate::utils::error::Result;
use crate::utils::timer::Clock;
use crate::window::{ContainerTarget, Platform, TouchEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Embeddable video player
pub struct VideoView {
    config: Config,
    policy: PlaybackPolicy,
    platform: Arc<dyn Platform>,
    audio: Arc<dyn AudioManager>,
    clock: Arc<dyn Clock>,
    decoder_factory: Arc<dyn DecoderFactory>,
    sink_factory: Arc<dyn RenderSinkFactory>,
    progress_manager: Option<Arc<dyn ProgressManager>>,

    /// Decoder of the current session
    decoder: Option<Box<dyn Decoder>>,
    sink: Option<Box<dyn RenderSink>>,
    source: Option<DataSource>,
    session: u64,
    /// Last known position, also the resume point staged for the next prepare
    current_position: u64,

    play_state: PlayState,
    player_state: PlayerState,
    full_screen: bool,
    tiny_screen: bool,
    tiny_screen_size: (u32, u32),

    mute: bool,
    looping: bool,
    enable_audio_focus: bool,
    screen_scale: ScaleMode,
    mirrored: bool,
    rotation: u32,
    video_size: (u32, u32),
    keep_screen_on: bool,

    focus: Option<AudioFocusHelper>,
    controller: Option<Box<dyn Controller>>,
    listeners: Vec<(ListenerId, Box<dyn OnStateChangeListener>)>,
    next_listener_id: u64,

    tx: Sender<ViewMessage>,
    rx: Receiver<ViewMessage>,
    status: Arc<RwLock<PlayerStatus>>,
    releases: Vec<ReleaseHandle>,
    dispatching: bool,
}

impl VideoView {
    pub(super) fn from_builder(builder: VideoViewBuilder) -> Result<Self> {
        let (tx, rx) = unbounded();
        let parts = builder.into_parts()?;
        let playback = parts.config.playback.clone();

        info!(
            "Creating video view (audio focus: {}, scale: {:?})",
            playback.enable_audio_focus, playback.screen_scale
        );

        Ok(Self {
            policy: parts
                .policy
                .unwrap_or_else(|| PlaybackPolicy::from_config(&playback)),
            config: parts.config,
            platform: parts.platform,
            audio: parts.audio,
            clock: parts.clock,
            decoder_factory: parts.decoder_factory,
            sink_factory: parts.sink_factory,
            progress_manager: parts.progress_manager,
            decoder: None,
            sink: None,
            source: None,
            session: 0,
            current_position: 0,
            play_state: PlayState::Idle,
            player_state: PlayerState::Normal,
            full_screen: false,
            tiny_screen: false,
            tiny_screen_size: (0, 0),
            mute: false,
            looping: false,
            enable_audio_focus: playback.enable_audio_focus,
            screen_scale: playback.screen_scale,
            mirrored: false,
            rotation: 0,
            video_size: (0, 0),
            keep_screen_on: false,
            focus: None,
            controller: None,
            listeners: Vec::new(),
            next_listener_id: 0,
            tx,
            rx,
            status: Arc::new(RwLock::new(PlayerStatus::default())),
            releases: Vec::new(),
            dispatching: false,
        })
    }

    // Data source and options

    pub fn set_url<S: Into<String>>(&mut self, url: S) {
        self.set_url_with_headers(url, HashMap::new());
    }

    /// Play a URL with request headers, replacing any asset
    pub fn set_url_with_headers<S: Into<String>>(&mut self, url: S, headers: HashMap<String, String>) {
        self.source = Some(DataSource::Url {
            url: url.into(),
            headers,
        });
    }

    /// Play packaged media, replacing any URL
    pub fn set_asset(&mut self, asset: AssetHandle) {
        self.source = Some(DataSource::Asset(asset));
    }

    pub fn data_source(&self) -> Option<&DataSource> {
        self.source.as_ref()
    }

    /// Seek here once the next session is prepared
    pub fn skip_position_when_play(&mut self, position_ms: u64) {
        self.current_position = position_ms;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.set_looping(looping);
        }
    }

    pub fn set_enable_audio_focus(&mut self, enable: bool) {
        self.enable_audio_focus = enable;
    }

    /// Channel volumes in 0.0..=1.0
    pub fn set_volume(&mut self, left: f32, right: f32) {
        if let Some(decoder) = self.decoder.as_mut() {
            if let Err(e) = decoder.set_volume(left, right) {
                warn!("Failed to set volume: {}", e);
            }
        }
    }

    pub fn set_progress_manager(&mut self, manager: Option<Arc<dyn ProgressManager>>) {
        self.progress_manager = manager;
    }

    /// Backend for sessions started from now on
    pub fn set_decoder_factory(&mut self, factory: Arc<dyn DecoderFactory>) {
        self.decoder_factory = factory;
    }

    /// Sink factory for the next attach
    pub fn set_render_sink_factory(&mut self, factory: Arc<dyn RenderSinkFactory>) {
        self.sink_factory = factory;
    }

    /// Size of the tiny window; zero fields fall back to half the screen width at 16:9
    pub fn set_tiny_screen_size(&mut self, width: u32, height: u32) {
        self.tiny_screen_size = (width, height);
    }

    // Controller and listeners

    /// Attach a controller, returning the detached previous one
    pub fn set_video_controller(
        &mut self,
        controller: Option<Box<dyn Controller>>,
    ) -> Option<Box<dyn Controller>> {
        let mut previous = self.controller.take();
        if let Some(old) = previous.as_mut() {
            old.detach();
        }

        if let Some(mut controller) = controller {
            self.refresh_status();
            controller.attach(AttachContext {
                player: self.handle(),
                events: self.tx.clone(),
                platform: self.platform.clone(),
                audio: self.audio.clone(),
                clock: self.clock.clone(),
                policy: self.policy.clone(),
            });
            if self.play_state != PlayState::Idle {
                controller.set_player_state(self.player_state);
                controller.set_play_state(self.play_state);
            }
            self.controller = Some(controller);
        }

        self.dispatch_pending();
        previous
    }

    pub fn controller(&self) -> Option<&dyn Controller> {
        self.controller.as_deref()
    }

    pub fn controller_mut(&mut self) -> Option<&mut (dyn Controller + 'static)> {
        self.controller.as_deref_mut()
    }

    /// The attached controller as its concrete type
    pub fn controller_as<T: Controller>(&self) -> Option<&T> {
        self.controller.as_deref()?.as_any().downcast_ref::<T>()
    }

    pub fn controller_as_mut<T: Controller>(&mut self) -> Option<&mut T> {
        self.controller.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// A registered control component as its concrete type
    pub fn component<T: ControlComponent>(&self, id: ComponentId) -> Option<&T> {
        self.controller
            .as_ref()?
            .component(id)?
            .as_any()
            .downcast_ref::<T>()
    }

    /// Mutable access to a component, for host-driven clicks
    ///
    /// Requests the component posts are applied on the next dispatch.
    pub fn component_mut<T: ControlComponent>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.controller
            .as_deref_mut()?
            .component_mut(id)?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    pub fn add_on_state_change_listener(&mut self, listener: Box<dyn OnStateChangeListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn remove_on_state_change_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Replace all listeners with one
    pub fn set_on_state_change_listener(&mut self, listener: Box<dyn OnStateChangeListener>) -> ListenerId {
        self.listeners.clear();
        self.add_on_state_change_listener(listener)
    }

    pub fn clear_on_state_change_listeners(&mut self) {
        self.listeners.clear();
    }

    // State

    pub fn play_state(&self) -> PlayState {
        self.play_state
    }

    pub fn player_state(&self) -> PlayerState {
        self.player_state
    }

    /// Handle that control code uses to read status and post commands
    pub fn handle(&self) -> PlayerHandle {
        PlayerHandle::new(self.status.clone(), self.tx.clone())
    }

    pub fn status(&self) -> PlayerStatus {
        self.status.read().clone()
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    /// Id of the latest decoder session
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn policy(&self) -> &PlaybackPolicy {
        &self.policy
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_keep_screen_on(&self) -> bool {
        self.keep_screen_on
    }

    /// Background decoder releases that have not finished yet
    pub fn pending_releases(&mut self) -> usize {
        self.releases.retain_mut(|h| !h.is_finished());
        self.releases.len()
    }

    /// Block until every background release finished or `timeout` passed
    pub fn wait_for_releases(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        for handle in self.releases.iter_mut() {
            let left = deadline.saturating_duration_since(Instant::now());
            if !handle.wait(left) {
                return false;
            }
        }
        self.releases.clear();
        true
    }

    pub fn screenshot(&self) -> Option<Snapshot> {
        self.sink.as_ref()?.screenshot()
    }

    // Transport

    /// Resume from `Paused`
    pub fn resume(&mut self) {
        if self.in_playback() && !self.decoder_playing() {
            if let Some(decoder) = self.decoder.as_mut() {
                if let Err(e) = decoder.start() {
                    error!("Failed to resume: {}", e);
                    self.on_error();
                    self.dispatch_pending();
                    return;
                }
            }
            self.set_play_state(PlayState::Playing);
            if !self.mute {
                if let Some(focus) = self.focus.as_mut() {
                    focus.request_focus();
                }
            }
            self.set_keep_screen_on(true);
        }
        self.dispatch_pending();
    }

    /// Tear down the session and return to `Idle`
    ///
    /// Works from any state. The decoder is released on a background
    /// thread; see `pending_releases`.
    pub fn release(&mut self) {
        if self.play_state == PlayState::Idle && self.decoder.is_none() && self.sink.is_none() {
            return;
        }
        info!("Releasing session {}", self.session);

        if self.in_playback() {
            self.update_position();
        }
        if let Some(decoder) = self.decoder.take() {
            self.releases.push(release_in_background(self.session, decoder));
        }
        if let Some(mut sink) = self.sink.take() {
            sink.release();
        }
        if let Some(mut focus) = self.focus.take() {
            focus.abandon_focus();
        }
        self.set_keep_screen_on(false);
        self.save_progress();
        self.current_position = 0;
        self.set_play_state(PlayState::Idle);
        self.dispatch_pending();
    }

    // Host events

    /// # Returns
    ///
    /// true if the controller consumed the press
    pub fn on_back_pressed(&mut self) -> bool {
        let consumed = self
            .controller
            .as_mut()
            .is_some_and(|c| c.on_back_pressed());
        self.dispatch_pending();
        consumed
    }

    /// Re-hide system bars when a full-screen window gets focus back
    pub fn on_window_focus_changed(&mut self, has_focus: bool) {
        if has_focus && self.full_screen {
            self.platform.set_system_bars_visible(false);
        }
    }

    /// The host may be killed; persist the resume point now
    pub fn on_save_instance_state(&mut self) {
        if self.in_playback() {
            self.update_position();
        }
        debug!("Saving instance state at {}", self.current_position);
        self.save_progress();
    }

    pub fn on_touch(&mut self, event: TouchEvent) -> bool {
        let consumed = self.controller.as_mut().is_some_and(|c| c.on_touch(event));
        self.dispatch_pending();
        consumed
    }

    pub fn on_size_changed(&mut self, width: u32, height: u32) {
        if let Some(controller) = self.controller.as_mut() {
            controller.on_size_changed(width, height);
        }
    }

    /// Raw rotation sensor reading in degrees
    pub fn on_orientation_changed(&mut self, degrees: i32) {
        if let Some(controller) = self.controller.as_mut() {
            controller.on_orientation_changed(degrees);
        }
        self.dispatch_pending();
    }

    pub fn on_attached_to_window(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.on_attached_to_window();
        }
        self.dispatch_pending();
    }

    // Event loop

    /// Advance timers and decoder polling to `now`
    pub fn tick(&mut self, now: u64) {
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.poll();
        }
        self.dispatch_pending();

        if let Some(controller) = self.controller.as_mut() {
            controller.tick(now);
        }
        self.dispatch_pending();
        self.releases.retain_mut(|h| !h.is_finished());
    }

    /// `tick` at the view's own clock
    pub fn tick_now(&mut self) {
        let now = self.clock.now_ms();
        self.tick(now);
    }

    /// Earliest timer the view needs a `tick` for
    pub fn next_deadline(&self) -> Option<u64> {
        self.controller.as_ref()?.next_deadline()
    }

    /// Handle every queued message in arrival order
    ///
    /// Messages queued while handling are handled in the same call. Nested
    /// calls return immediately.
    pub fn dispatch_pending(&mut self) {
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
        }
        self.dispatching = false;
        self.refresh_status();
    }

    fn handle_message(&mut self, message: ViewMessage) {
        match message {
            ViewMessage::Decoder { session, event } => self.handle_decoder_event(session, event),
            ViewMessage::Player(command) => self.handle_command(command),
            ViewMessage::Controller(command) => {
                self.refresh_status();
                if let Some(controller) = self.controller.as_mut() {
                    controller.handle_command(command);
                }
            }
            ViewMessage::AudioFocus(change) => self.handle_focus_change(change),
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        debug!("Player command {:?}", command);
        match command {
            PlayerCommand::Start => self.start(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::SeekTo(position) => self.seek_to(position),
            PlayerCommand::StartFullScreen => self.start_full_screen(),
            PlayerCommand::StopFullScreen => self.stop_full_screen(),
            PlayerCommand::StartTinyScreen => self.start_tiny_screen(),
            PlayerCommand::StopTinyScreen => self.stop_tiny_screen(),
            PlayerCommand::SetMute(mute) => self.set_mute(mute),
            PlayerCommand::SetScreenScale(mode) => self.set_screen_scale(mode),
            PlayerCommand::SetSpeed(speed) => self.set_speed(speed),
            PlayerCommand::Replay { reset_position } => self.replay(reset_position),
            PlayerCommand::SetMirrorRotation(enable) => self.set_mirror_rotation(enable),
            PlayerCommand::SetRotation(degrees) => self.set_rotation(degrees),
        }
    }

    fn handle_decoder_event(&mut self, session: u64, event: DecoderEvent) {
        if self.decoder.is_none() || session != self.session {
            debug!("Dropping {:?} from stale session {}", event, session);
            return;
        }

        match event {
            DecoderEvent::Prepared if self.play_state == PlayState::Preparing => self.on_prepared(),
            DecoderEvent::Completion if self.play_state.is_in_playback() => self.on_completion(),
            DecoderEvent::Prepared | DecoderEvent::Completion => {
                debug!("Ignoring {:?} in {:?}", event, self.play_state)
            }
            DecoderEvent::Error { what, extra } => {
                error!("Decoder error what={} extra={}", what, extra);
                self.on_error();
            }
            DecoderEvent::Info { what, extra } => self.on_info(what, extra),
            DecoderEvent::VideoSizeChanged { width, height } => {
                self.on_video_size_changed(width, height)
            }
            DecoderEvent::BufferingUpdate { percent } => debug!("Buffered {}%", percent),
        }
    }

    fn handle_focus_change(&mut self, change: FocusChange) {
        let playing = self.is_playing();
        let Some(focus) = self.focus.as_mut() else {
            debug!("Ignoring focus change {:?} without a helper", change);
            return;
        };

        for action in focus.handle_focus_change(change, playing, self.mute) {
            match action {
                FocusAction::Start => self.start(),
                FocusAction::Pause => self.pause(),
                FocusAction::SetVolume(left, right) => self.set_volume(left, right),
            }
        }
    }

    // Session internals

    fn in_playback(&self) -> bool {
        self.decoder.is_some() && self.play_state.is_in_playback()
    }

    fn decoder_playing(&self) -> bool {
        self.decoder.as_ref().is_some_and(|d| d.is_playing())
    }

    fn start_play(&mut self) -> bool {
        let Some(source) = self.source.clone() else {
            warn!("start() without a data source");
            return false;
        };

        if self.show_net_warning(&source) {
            info!("Mobile network playback not allowed, aborting start");
            self.set_play_state(PlayState::StartAbort);
            return false;
        }

        if self.enable_audio_focus {
            self.focus = Some(AudioFocusHelper::new(
                self.audio.clone(),
                FocusChangeSender::new(self.tx.clone()),
            ));
        }

        if let Some(manager) = &self.progress_manager {
            let saved = manager.saved_progress(source.progress_key());
            if saved > 0 {
                debug!("Restoring saved position {}", saved);
                self.current_position = saved;
            }
        }

        if let Err(e) = self.init_decoder() {
            error!("Failed to create decoder: {}", e);
            self.on_error();
            return false;
        }
        if !self.add_display() {
            return false;
        }
        self.start_prepare(false);
        true
    }

    fn show_net_warning(&self, source: &DataSource) -> bool {
        if source.is_local() {
            return false;
        }
        self.controller.as_ref().is_some_and(|c| c.show_net_warning())
    }

    fn init_decoder(&mut self) -> Result<()> {
        if let Some(old) = self.decoder.take() {
            self.releases.push(release_in_background(self.session, old));
        }

        let mut decoder = self.decoder_factory.create_decoder()?;
        self.session += 1;
        let events = DecoderEventSender::new(self.session, self.tx.clone());
        if let Err(e) = decoder.init(events) {
            self.releases.push(release_in_background(self.session, decoder));
            return Err(e);
        }
        decoder.set_options();
        self.apply_options(decoder.as_mut());
        debug!("Decoder ready for session {}", self.session);

        self.decoder = Some(decoder);
        Ok(())
    }

    fn apply_options(&self, decoder: &mut dyn Decoder) {
        decoder.set_looping(self.looping);
        let volume = if self.mute { 0.0 } else { 1.0 };
        if let Err(e) = decoder.set_volume(volume, volume) {
            warn!("Failed to set volume: {}", e);
        }
    }

    /// Replace the render sink and bind it to the decoder
    fn add_display(&mut self) -> bool {
        if let Some(mut old) = self.sink.take() {
            old.release();
        }

        let mut sink = match self.sink_factory.create_render_sink() {
            Ok(sink) => sink,
            Err(e) => {
                error!("Failed to create render sink: {}", e);
                self.on_error();
                return false;
            }
        };
        sink.set_scale_mode(self.screen_scale);
        sink.set_mirror(self.mirrored);
        if self.rotation != 0 {
            sink.set_video_rotation(self.rotation);
        }
        sink.set_video_size(self.video_size.0, self.video_size.1);

        let attached = match self.decoder.as_mut() {
            Some(decoder) => sink.attach_to_decoder(decoder.as_mut()),
            None => Ok(()),
        };
        self.sink = Some(sink);

        if let Err(e) = attached {
            error!("Failed to attach render sink: {}", e);
            self.on_error();
            return false;
        }
        true
    }

    fn start_prepare(&mut self, reset: bool) {
        if reset {
            let Some(decoder) = self.decoder.as_mut() else { return };
            if let Err(e) = decoder.reset() {
                error!("Failed to reset decoder: {}", e);
                self.on_error();
                return;
            }
            self.apply_options_to_current();
        }

        let (Some(decoder), Some(source)) = (self.decoder.as_mut(), self.source.as_ref()) else {
            warn!("Nothing to prepare");
            return;
        };
        let prepared = decoder
            .set_data_source(source)
            .and_then(|_| decoder.prepare_async());
        if let Err(e) = prepared {
            error!("Failed to prepare {:?}: {}", source, e);
            self.on_error();
            return;
        }

        self.set_play_state(PlayState::Preparing);
        let player_state = if self.full_screen {
            PlayerState::FullScreen
        } else if self.tiny_screen {
            PlayerState::TinyScreen
        } else {
            PlayerState::Normal
        };
        self.set_player_state(player_state);
    }

    fn apply_options_to_current(&mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            self.apply_options(decoder.as_mut());
            self.decoder = Some(decoder);
        }
    }

    fn start_in_playback_state(&mut self) {
        if let Some(decoder) = self.decoder.as_mut() {
            if let Err(e) = decoder.start() {
                error!("Failed to start: {}", e);
                self.on_error();
                return;
            }
        }
        self.set_play_state(PlayState::Playing);
        if !self.mute {
            if let Some(focus) = self.focus.as_mut() {
                focus.request_focus();
            }
        }
        self.set_keep_screen_on(true);
    }

    fn save_progress(&self) {
        let Some(manager) = &self.progress_manager else { return };
        if self.current_position > 0 {
            debug!("Saving progress {}", self.current_position);
            let key = self.source.as_ref().and_then(|s| s.progress_key());
            manager.save_progress(key, self.current_position);
        }
    }

    fn update_position(&mut self) {
        if let Some(decoder) = &self.decoder {
            self.current_position = decoder.current_position();
        }
    }

    fn set_keep_screen_on(&mut self, keep_on: bool) {
        self.keep_screen_on = keep_on;
        self.platform.set_keep_screen_on(keep_on);
    }

    // Decoder callbacks

    fn on_prepared(&mut self) {
        let resume_at = self.current_position;
        self.set_play_state(PlayState::Prepared);
        if !self.mute {
            if let Some(focus) = self.focus.as_mut() {
                focus.request_focus();
            }
        }
        if resume_at > 0 {
            debug!("Resuming at {}", resume_at);
            self.seek_to(resume_at);
        }
    }

    fn on_info(&mut self, what: i32, extra: i32) {
        match what {
            MEDIA_INFO_RENDERING_START => {
                if self.play_state.is_in_playback() {
                    self.set_play_state(PlayState::Playing);
                    self.set_keep_screen_on(true);
                }
            }
            MEDIA_INFO_BUFFERING_START => {
                if self.accepts_buffering() {
                    self.set_play_state(PlayState::Buffering);
                }
            }
            MEDIA_INFO_BUFFERING_END => {
                if self.accepts_buffering() {
                    self.set_play_state(PlayState::Buffered);
                    // Buffered is transient: settle on the transport state
                    let settled = if self.decoder_playing() {
                        PlayState::Playing
                    } else {
                        PlayState::Paused
                    };
                    self.set_play_state(settled);
                }
            }
            MEDIA_INFO_VIDEO_ROTATION_CHANGED => {
                self.rotation = extra.max(0) as u32;
                if let Some(sink) = self.sink.as_mut() {
                    sink.set_video_rotation(self.rotation);
                }
            }
            _ => debug!("Unhandled info what={} extra={}", what, extra),
        }
    }

    fn accepts_buffering(&self) -> bool {
        matches!(
            self.play_state,
            PlayState::Playing | PlayState::Paused | PlayState::Buffering | PlayState::Buffered
        )
    }

    fn on_completion(&mut self) {
        self.set_keep_screen_on(false);
        self.current_position = 0;
        if let Some(manager) = &self.progress_manager {
            let key = self.source.as_ref().and_then(|s| s.progress_key());
            manager.save_progress(key, 0);
        }
        self.set_play_state(PlayState::PlaybackCompleted);
    }

    fn on_error(&mut self) {
        self.set_keep_screen_on(false);
        self.set_play_state(PlayState::Error);
    }

    fn on_video_size_changed(&mut self, width: u32, height: u32) {
        self.video_size = (width, height);
        if let Some(sink) = self.sink.as_mut() {
            sink.set_scale_mode(self.screen_scale);
            sink.set_video_size(width, height);
        }
    }

    // Fan-out

    fn set_play_state(&mut self, state: PlayState) {
        if self.play_state != state {
            info!("Play state {:?} -> {:?}", self.play_state, state);
        }
        self.play_state = state;
        self.refresh_status();

        if let Some(controller) = self.controller.as_mut() {
            controller.set_play_state(state);
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_play_state_changed(state);
        }
    }

    fn set_player_state(&mut self, state: PlayerState) {
        if self.player_state != state {
            info!("Player state {:?} -> {:?}", self.player_state, state);
        }
        self.player_state = state;
        self.refresh_status();

        if let Some(controller) = self.controller.as_mut() {
            controller.set_player_state(state);
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_player_state_changed(state);
        }
    }

    /// Publish the snapshot read by control components
    fn refresh_status(&mut self) {
        if self.in_playback() {
            self.update_position();
        }
        let snapshot = PlayerStatus {
            play_state: self.play_state,
            player_state: self.player_state,
            playing: self.is_playing(),
            position: self.current_position(),
            duration: self.duration(),
            buffered_percentage: self.buffered_percentage(),
            speed: self.speed(),
            tcp_speed: self.tcp_speed(),
            mute: self.mute,
            full_screen: self.full_screen,
            tiny_screen: self.tiny_screen,
            video_size: self.video_size,
        };
        *self.status.write() = snapshot;
    }
}

impl MediaPlayerControl for VideoView {
    /// Start a new session from `Idle` or `StartAbort`, otherwise resume
    fn start(&mut self) {
        match self.play_state {
            PlayState::Idle | PlayState::StartAbort => {
                self.start_play();
            }
            _ if self.in_playback() => self.start_in_playback_state(),
            state => debug!("start() ignored in {:?}", state),
        }
        self.dispatch_pending();
    }

    fn pause(&mut self) {
        if self.in_playback() && self.decoder_playing() {
            if let Some(decoder) = self.decoder.as_mut() {
                if let Err(e) = decoder.pause() {
                    error!("Failed to pause: {}", e);
                    self.on_error();
                    self.dispatch_pending();
                    return;
                }
            }
            self.set_play_state(PlayState::Paused);
            if !self.mute {
                if let Some(focus) = self.focus.as_mut() {
                    focus.abandon_focus();
                }
            }
            self.set_keep_screen_on(false);
        }
        self.dispatch_pending();
    }

    fn duration(&self) -> u64 {
        match &self.decoder {
            Some(decoder) if self.in_playback() => decoder.duration(),
            _ => 0,
        }
    }

    fn current_position(&self) -> u64 {
        match &self.decoder {
            Some(decoder) if self.in_playback() => decoder.current_position(),
            _ => 0,
        }
    }

    fn seek_to(&mut self, position_ms: u64) {
        if !self.in_playback() {
            debug!("seek_to({}) ignored in {:?}", position_ms, self.play_state);
            return;
        }
        if let Some(decoder) = self.decoder.as_mut() {
            if let Err(e) = decoder.seek_to(position_ms) {
                error!("Failed to seek: {}", e);
                self.on_error();
            }
        }
        self.dispatch_pending();
    }

    fn is_playing(&self) -> bool {
        self.in_playback() && self.decoder_playing()
    }

    fn buffered_percentage(&self) -> u32 {
        self.decoder
            .as_ref()
            .map(|d| d.buffered_percentage())
            .unwrap_or(0)
    }

    fn start_full_screen(&mut self) {
        if self.full_screen {
            return;
        }
        if !self.platform.attach_player_container(ContainerTarget::Decor) {
            warn!("No window decoration to go full screen in");
            return;
        }
        self.full_screen = true;
        self.platform.set_system_bars_visible(false);
        self.set_player_state(PlayerState::FullScreen);
        self.dispatch_pending();
    }

    fn stop_full_screen(&mut self) {
        if !self.full_screen {
            return;
        }
        if !self.platform.attach_player_container(ContainerTarget::Embedded) {
            warn!("Could not move the player back into the view");
            return;
        }
        self.full_screen = false;
        self.platform.set_system_bars_visible(true);
        self.set_player_state(PlayerState::Normal);
        self.dispatch_pending();
    }

    fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
        let volume = if mute { 0.0 } else { 1.0 };
        self.set_volume(volume, volume);
        self.refresh_status();
    }

    fn is_mute(&self) -> bool {
        self.mute
    }

    fn set_screen_scale(&mut self, mode: ScaleMode) {
        self.screen_scale = mode;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_scale_mode(mode);
        }
    }

    fn set_speed(&mut self, speed: f32) {
        if !self.in_playback() {
            return;
        }
        if let Some(decoder) = self.decoder.as_mut() {
            if let Err(e) = decoder.set_speed(speed) {
                warn!("Failed to set speed {}: {}", speed, e);
            }
        }
        self.refresh_status();
    }

    fn speed(&self) -> f32 {
        match &self.decoder {
            Some(decoder) if self.in_playback() => decoder.speed(),
            _ => 1.0,
        }
    }

    fn tcp_speed(&self) -> u64 {
        match &self.decoder {
            Some(decoder) if self.in_playback() => decoder.tcp_speed(),
            _ => 0,
        }
    }

    /// Prepare the current source again on a fresh render sink
    fn replay(&mut self, reset_position: bool) {
        if self.decoder.is_none() {
            warn!("replay() without a decoder, call start() first");
            return;
        }
        if reset_position {
            self.current_position = 0;
        }
        if self.add_display() {
            self.start_prepare(true);
        }
        self.dispatch_pending();
    }

    fn set_mirror_rotation(&mut self, enable: bool) {
        self.mirrored = enable;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_mirror(enable);
        }
    }

    fn video_size(&self) -> (u32, u32) {
        self.video_size
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees.max(0.0) as u32;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_video_rotation(self.rotation);
        }
    }

    fn start_tiny_screen(&mut self) {
        if self.tiny_screen {
            return;
        }
        let (mut width, mut height) = self.tiny_screen_size;
        if width == 0 {
            width = self.platform.screen_size().0 / 2;
        }
        if height == 0 {
            height = width * 9 / 16;
        }
        if !self
            .platform
            .attach_player_container(ContainerTarget::Content { width, height })
        {
            warn!("No content root for the tiny window");
            return;
        }
        self.tiny_screen = true;
        self.set_player_state(PlayerState::TinyScreen);
        self.dispatch_pending();
    }

    fn stop_tiny_screen(&mut self) {
        if !self.tiny_screen {
            return;
        }
        if !self.platform.attach_player_container(ContainerTarget::Embedded) {
            warn!("Could not move the player back into the view");
            return;
        }
        self.tiny_screen = false;
        self.set_player_state(PlayerState::Normal);
        self.dispatch_pending();
    }

    fn is_tiny_screen(&self) -> bool {
        self.tiny_screen
    }
}

impl Drop for VideoView {
    fn drop(&mut self) {
        if let Some(decoder) = self.decoder.take() {
            self.releases.push(release_in_background(self.session, decoder));
        }
        if let Some(mut sink) = self.sink.take() {
            sink.release();
        }
    }
}
