//! Recording doubles for the platform, audio service, decoder, render sink
//! and control components
//!
//! Available to unit tests and, with the `test-util` feature, to the
//! integration test crate.

use crate::audio::{AudioManager, FocusChange, FocusChangeSender, FocusRequestResult};
use crate::controller::{
    ControlComponent, ControlWrapper, ControllerHandle, ControllerStatus, GestureComponent,
    VisibilityAnimation,
};
use crate::decoder::{DataSource, Decoder, DecoderEvent, DecoderEventSender, DecoderFactory, SurfaceHandle};
use crate::player::{
    OnStateChangeListener, PlayState, PlayerHandle, PlayerState, PlayerStatus, ViewMessage,
};
use crate::renderer::{RenderSink, RenderSinkFactory, ScaleMode, Snapshot};
use crate::utils::error::{PlayerError, Result};
use crate::window::{
    ContainerTarget, CutoutMode, DeviceInfo, NetworkType, Platform, ScreenOrientation, ViewHandle,
};
use crossbeam_channel::Receiver;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

// Platform

#[derive(Debug)]
struct PlatformState {
    screen: (u32, u32),
    density: f32,
    status_bar_height: u32,
    network: NetworkType,
    finishing: bool,
    device_info: DeviceInfo,
    container_available: bool,
    container: ContainerTarget,
    system_bars_visible: bool,
    keep_screen_on: bool,
    orientation: ScreenOrientation,
    brightness: Option<f32>,
    cutout_mode: Option<CutoutMode>,
    overlays: Vec<ViewHandle>,
}

/// Platform that records every window change
#[derive(Debug)]
pub struct RecordingPlatform {
    state: Mutex<PlatformState>,
}

impl RecordingPlatform {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Mutex::new(PlatformState {
                screen: (width, height),
                density: 1.0,
                status_bar_height: 0,
                network: NetworkType::Wifi,
                finishing: false,
                device_info: DeviceInfo::default(),
                container_available: true,
                container: ContainerTarget::Embedded,
                system_bars_visible: true,
                keep_screen_on: false,
                orientation: ScreenOrientation::Unspecified,
                brightness: None,
                cutout_mode: None,
                overlays: Vec::new(),
            }),
        }
    }

    pub fn set_density(&self, density: f32) {
        self.state.lock().density = density;
    }

    pub fn set_network(&self, network: NetworkType) {
        self.state.lock().network = network;
    }

    pub fn set_finishing(&self, finishing: bool) {
        self.state.lock().finishing = finishing;
    }

    pub fn set_device_info(&self, info: DeviceInfo) {
        self.state.lock().device_info = info;
    }

    pub fn set_status_bar_height(&self, height: u32) {
        self.state.lock().status_bar_height = height;
    }

    /// Make full-screen and tiny containers unavailable
    pub fn set_container_available(&self, available: bool) {
        self.state.lock().container_available = available;
    }

    pub fn keep_screen_on(&self) -> bool {
        self.state.lock().keep_screen_on
    }

    pub fn system_bars_visible(&self) -> bool {
        self.state.lock().system_bars_visible
    }

    pub fn container(&self) -> ContainerTarget {
        self.state.lock().container
    }

    pub fn cutout_mode(&self) -> Option<CutoutMode> {
        self.state.lock().cutout_mode
    }

    pub fn overlays(&self) -> Vec<ViewHandle> {
        self.state.lock().overlays.clone()
    }
}

impl Platform for RecordingPlatform {
    fn screen_size(&self) -> (u32, u32) {
        self.state.lock().screen
    }

    fn density(&self) -> f32 {
        self.state.lock().density
    }

    fn status_bar_height(&self) -> u32 {
        self.state.lock().status_bar_height
    }

    fn network_type(&self) -> NetworkType {
        self.state.lock().network
    }

    fn attach_player_container(&self, target: ContainerTarget) -> bool {
        let mut state = self.state.lock();
        if target != ContainerTarget::Embedded && !state.container_available {
            return false;
        }
        state.container = target;
        true
    }

    fn set_system_bars_visible(&self, visible: bool) {
        self.state.lock().system_bars_visible = visible;
    }

    fn set_keep_screen_on(&self, keep_on: bool) {
        self.state.lock().keep_screen_on = keep_on;
    }

    fn requested_orientation(&self) -> ScreenOrientation {
        self.state.lock().orientation
    }

    fn set_requested_orientation(&self, orientation: ScreenOrientation) {
        self.state.lock().orientation = orientation;
    }

    fn is_finishing(&self) -> bool {
        self.state.lock().finishing
    }

    fn window_brightness(&self) -> Option<f32> {
        self.state.lock().brightness
    }

    fn set_window_brightness(&self, brightness: f32) {
        self.state.lock().brightness = Some(brightness);
    }

    fn set_cutout_mode(&self, mode: CutoutMode) {
        self.state.lock().cutout_mode = Some(mode);
    }

    fn device_info(&self) -> DeviceInfo {
        self.state.lock().device_info.clone()
    }

    fn add_overlay_view(&self, view: ViewHandle) {
        self.state.lock().overlays.push(view);
    }

    fn remove_overlay_view(&self, view: ViewHandle) {
        self.state.lock().overlays.retain(|v| *v != view);
    }
}

// Audio

#[derive(Debug)]
struct AudioState {
    volume: u32,
    focus_result: FocusRequestResult,
    focus_requests: usize,
    focus_abandons: usize,
    listener: Option<FocusChangeSender>,
}

/// Audio service that grants focus on demand and counts requests
#[derive(Debug)]
pub struct RecordingAudioManager {
    max_volume: u32,
    state: Mutex<AudioState>,
}

impl RecordingAudioManager {
    pub fn new(max_volume: u32) -> Self {
        Self {
            max_volume,
            state: Mutex::new(AudioState {
                volume: 0,
                focus_result: FocusRequestResult::Granted,
                focus_requests: 0,
                focus_abandons: 0,
                listener: None,
            }),
        }
    }

    pub fn set_focus_result(&self, result: FocusRequestResult) {
        self.state.lock().focus_result = result;
    }

    pub fn focus_requests(&self) -> usize {
        self.state.lock().focus_requests
    }

    pub fn focus_abandons(&self) -> usize {
        self.state.lock().focus_abandons
    }

    /// Report a focus change to the last requester
    pub fn notify(&self, change: FocusChange) -> bool {
        let listener = self.state.lock().listener.clone();
        listener.is_some_and(|l| l.notify(change))
    }
}

impl AudioManager for RecordingAudioManager {
    fn stream_volume(&self) -> u32 {
        self.state.lock().volume
    }

    fn max_stream_volume(&self) -> u32 {
        self.max_volume
    }

    fn set_stream_volume(&self, index: u32) {
        self.state.lock().volume = index.min(self.max_volume);
    }

    fn request_audio_focus(&self, listener: FocusChangeSender) -> FocusRequestResult {
        let mut state = self.state.lock();
        state.focus_requests += 1;
        state.listener = Some(listener);
        state.focus_result
    }

    fn abandon_audio_focus(&self) {
        self.state.lock().focus_abandons += 1;
    }
}

// Decoder

/// One call received by a scripted decoder
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderCall {
    Init,
    SetDataSource(DataSource),
    PrepareAsync,
    Start,
    Pause,
    Stop,
    Reset,
    Release,
    SeekTo(u64),
    SetSpeed(f32),
    SetVolume(f32, f32),
    SetLooping(bool),
    SetSurface(Option<SurfaceHandle>),
}

#[derive(Debug, Default)]
struct Script {
    calls: Vec<(usize, DecoderCall)>,
    senders: Vec<Option<DecoderEventSender>>,
    playing: Vec<bool>,
    preparing: Vec<bool>,
    duration: u64,
    position: u64,
    buffered: u32,
    fail_create: bool,
    fail_prepare: bool,
}

/// Factory of decoders that record calls and emit events on request
///
/// Decoders never produce events by themselves; tests push them with
/// `emit`, which targets the most recently created decoder. Like real
/// backends, a decoder with a pending prepare starts itself when its
/// `Prepared` event is emitted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecoderFactory {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDecoderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls as (decoder index, call), in order
    pub fn calls(&self) -> Vec<(usize, DecoderCall)> {
        self.script.lock().calls.clone()
    }

    /// Calls received by one decoder
    pub fn calls_of(&self, index: usize) -> Vec<DecoderCall> {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, c)| c.clone())
            .collect()
    }

    /// Number of decoders created so far
    pub fn created(&self) -> usize {
        self.script.lock().senders.len()
    }

    pub fn seeks(&self) -> Vec<u64> {
        self.script
            .lock()
            .calls
            .iter()
            .filter_map(|(_, c)| match c {
                DecoderCall::SeekTo(position) => Some(*position),
                _ => None,
            })
            .collect()
    }

    /// Post an event from the latest decoder
    pub fn emit(&self, event: DecoderEvent) -> bool {
        let index = self.created().saturating_sub(1);
        self.emit_to(index, event)
    }

    /// Post an event from decoder `index`, even if it was replaced
    pub fn emit_to(&self, index: usize, event: DecoderEvent) -> bool {
        let sender = {
            let mut script = self.script.lock();
            let preparing = script.preparing.get(index).copied().unwrap_or(false);
            let playing = match event {
                DecoderEvent::Prepared if preparing => Some(true),
                DecoderEvent::Completion | DecoderEvent::Error { .. } => Some(false),
                _ => None,
            };
            if let Some(slot) = script.preparing.get_mut(index) {
                *slot = preparing && event != DecoderEvent::Prepared;
            }
            if let (Some(playing), Some(slot)) = (playing, script.playing.get_mut(index)) {
                *slot = playing;
            }
            script.senders.get(index).cloned().flatten()
        };
        sender.is_some_and(|s| s.send(event))
    }

    pub fn set_duration(&self, duration_ms: u64) {
        self.script.lock().duration = duration_ms;
    }

    pub fn set_position(&self, position_ms: u64) {
        self.script.lock().position = position_ms;
    }

    pub fn set_buffered(&self, percent: u32) {
        self.script.lock().buffered = percent;
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.script.lock().fail_create = fail;
    }

    pub fn set_fail_prepare(&self, fail: bool) {
        self.script.lock().fail_prepare = fail;
    }
}

impl DecoderFactory for ScriptedDecoderFactory {
    fn create_decoder(&self) -> Result<Box<dyn Decoder>> {
        let mut script = self.script.lock();
        if script.fail_create {
            return Err(PlayerError::decoder("scripted create failure"));
        }
        let index = script.senders.len();
        script.senders.push(None);
        script.playing.push(false);
        script.preparing.push(false);
        Ok(Box::new(ScriptedDecoder {
            index,
            script: self.script.clone(),
            speed: 1.0,
        }))
    }
}

/// Decoder created by `ScriptedDecoderFactory`
#[derive(Debug)]
pub struct ScriptedDecoder {
    index: usize,
    script: Arc<Mutex<Script>>,
    speed: f32,
}

impl ScriptedDecoder {
    fn record(&self, call: DecoderCall) {
        self.script.lock().calls.push((self.index, call));
    }

    fn set_playing(&self, playing: bool) {
        if let Some(slot) = self.script.lock().playing.get_mut(self.index) {
            *slot = playing;
        }
    }
}

impl Decoder for ScriptedDecoder {
    fn init(&mut self, events: DecoderEventSender) -> Result<()> {
        self.record(DecoderCall::Init);
        if let Some(slot) = self.script.lock().senders.get_mut(self.index) {
            *slot = Some(events);
        }
        Ok(())
    }

    fn set_data_source(&mut self, source: &DataSource) -> Result<()> {
        self.record(DecoderCall::SetDataSource(source.clone()));
        Ok(())
    }

    fn prepare_async(&mut self) -> Result<()> {
        self.record(DecoderCall::PrepareAsync);
        let mut script = self.script.lock();
        if script.fail_prepare {
            return Err(PlayerError::decoder("scripted prepare failure"));
        }
        if let Some(slot) = script.preparing.get_mut(self.index) {
            *slot = true;
        }
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.record(DecoderCall::Start);
        self.set_playing(true);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.record(DecoderCall::Pause);
        self.set_playing(false);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.record(DecoderCall::Stop);
        self.set_playing(false);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.record(DecoderCall::Reset);
        self.set_playing(false);
        Ok(())
    }

    fn release(&mut self) {
        self.record(DecoderCall::Release);
        self.set_playing(false);
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.record(DecoderCall::SeekTo(position_ms));
        self.script.lock().position = position_ms;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.script.lock().playing.get(self.index).copied().unwrap_or(false)
    }

    fn duration(&self) -> u64 {
        self.script.lock().duration
    }

    fn current_position(&self) -> u64 {
        self.script.lock().position
    }

    fn buffered_percentage(&self) -> u32 {
        self.script.lock().buffered
    }

    fn set_speed(&mut self, speed: f32) -> Result<()> {
        self.record(DecoderCall::SetSpeed(speed));
        self.speed = speed;
        Ok(())
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn tcp_speed(&self) -> u64 {
        0
    }

    fn set_volume(&mut self, left: f32, right: f32) -> Result<()> {
        self.record(DecoderCall::SetVolume(left, right));
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) {
        self.record(DecoderCall::SetLooping(looping));
    }

    fn set_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()> {
        self.record(DecoderCall::SetSurface(surface));
        Ok(())
    }
}

// Render sink

/// Settings last applied to a recording sink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinkRecord {
    pub scale: Option<ScaleMode>,
    pub video_size: (u32, u32),
    pub rotation: u32,
    pub mirrored: bool,
    pub released: bool,
}

/// Factory of sinks that keep their settings inspectable
#[derive(Debug, Clone, Default)]
pub struct RecordingSinkFactory {
    sinks: Arc<Mutex<Vec<SinkRecord>>>,
}

impl RecordingSinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.sinks.lock().len()
    }

    pub fn sink(&self, index: usize) -> Option<SinkRecord> {
        self.sinks.lock().get(index).cloned()
    }

    pub fn last(&self) -> Option<SinkRecord> {
        self.sinks.lock().last().cloned()
    }
}

impl RenderSinkFactory for RecordingSinkFactory {
    fn create_render_sink(&self) -> Result<Box<dyn RenderSink>> {
        let mut sinks = self.sinks.lock();
        sinks.push(SinkRecord::default());
        Ok(Box::new(RecordingSink {
            index: sinks.len() - 1,
            surface: SurfaceHandle(sinks.len() as u64),
            sinks: self.sinks.clone(),
        }))
    }
}

struct RecordingSink {
    index: usize,
    surface: SurfaceHandle,
    sinks: Arc<Mutex<Vec<SinkRecord>>>,
}

impl RecordingSink {
    fn update(&self, f: impl FnOnce(&mut SinkRecord)) {
        if let Some(record) = self.sinks.lock().get_mut(self.index) {
            f(record);
        }
    }
}

impl RenderSink for RecordingSink {
    fn attach_to_decoder(&mut self, decoder: &mut dyn Decoder) -> Result<()> {
        decoder.set_surface(Some(self.surface))
    }

    fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.update(|r| r.scale = Some(mode));
    }

    fn set_video_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.update(|r| r.video_size = (width, height));
        }
    }

    fn set_video_rotation(&mut self, degrees: u32) {
        self.update(|r| r.rotation = degrees);
    }

    fn set_mirror(&mut self, mirrored: bool) {
        self.update(|r| r.mirrored = mirrored);
    }

    fn screenshot(&self) -> Option<Snapshot> {
        let record = self.sinks.lock().get(self.index).cloned()?;
        if record.released || record.video_size.0 == 0 {
            return None;
        }
        Some(Snapshot::black(record.video_size.0, record.video_size.1))
    }

    fn release(&mut self) {
        self.update(|r| r.released = true);
    }
}

// Components

/// Event observed by a recording component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentEvent {
    Attached,
    PlayState(PlayState),
    PlayerState(PlayerState),
    Lock(bool),
    Visibility(bool),
    Progress { position: u64, duration: u64 },
    StartSlide,
    StopSlide,
    Position { slide: u64, current: u64, duration: u64 },
    Brightness(u32),
    Volume(u32),
}

/// Shared, ordered log of component events
#[derive(Debug, Clone, Default)]
pub struct ComponentLog {
    events: Arc<Mutex<Vec<(String, ComponentEvent)>>>,
}

impl ComponentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, ComponentEvent)> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn push(&self, name: &str, event: ComponentEvent) {
        self.events.lock().push((name.to_string(), event));
    }
}

/// Component that logs everything it is told
pub struct RecordingComponent {
    name: String,
    view: Option<ViewHandle>,
    log: ComponentLog,
    wrapper: Option<ControlWrapper>,
    visible_while_locked: bool,
}

impl RecordingComponent {
    pub fn new(name: &str, view: Option<ViewHandle>, log: &ComponentLog) -> Self {
        Self {
            name: name.to_string(),
            view,
            log: log.clone(),
            wrapper: None,
            visible_while_locked: false,
        }
    }

    /// Ask for visibility changes even while the controller is locked
    pub fn visible_while_locked(mut self) -> Self {
        self.visible_while_locked = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wrapper(&self) -> Option<&ControlWrapper> {
        self.wrapper.as_ref()
    }

    fn record(&self, event: ComponentEvent) {
        self.log.push(&self.name, event);
    }
}

impl ControlComponent for RecordingComponent {
    fn attach(&mut self, wrapper: ControlWrapper) {
        self.wrapper = Some(wrapper);
        self.record(ComponentEvent::Attached);
    }

    fn view(&self) -> Option<ViewHandle> {
        self.view
    }

    fn on_play_state_changed(&mut self, state: PlayState) {
        self.record(ComponentEvent::PlayState(state));
    }

    fn on_player_state_changed(&mut self, state: PlayerState) {
        self.record(ComponentEvent::PlayerState(state));
    }

    fn on_visibility_changed(&mut self, visible: bool, _animation: Option<VisibilityAnimation>) {
        self.record(ComponentEvent::Visibility(visible));
    }

    fn on_lock_state_changed(&mut self, locked: bool) {
        self.record(ComponentEvent::Lock(locked));
    }

    fn shown_while_locked(&self) -> bool {
        self.visible_while_locked
    }

    fn set_progress(&mut self, position: u64, duration: u64) {
        self.record(ComponentEvent::Progress { position, duration });
    }

    fn as_gesture_mut(&mut self) -> Option<&mut dyn GestureComponent> {
        Some(self)
    }
}

impl GestureComponent for RecordingComponent {
    fn on_start_slide(&mut self) {
        self.record(ComponentEvent::StartSlide);
    }

    fn on_stop_slide(&mut self) {
        self.record(ComponentEvent::StopSlide);
    }

    fn on_position_change(&mut self, slide_position: u64, current_position: u64, duration: u64) {
        self.record(ComponentEvent::Position {
            slide: slide_position,
            current: current_position,
            duration,
        });
    }

    fn on_brightness_change(&mut self, percent: u32) {
        self.record(ComponentEvent::Brightness(percent));
    }

    fn on_volume_change(&mut self, percent: u32) {
        self.record(ComponentEvent::Volume(percent));
    }
}

// Wrapper probe

/// A control wrapper over bare status cells, with no view behind it
///
/// Tests write the status a component should observe and drain the
/// requests it posts.
pub struct WrapperProbe {
    pub wrapper: ControlWrapper,
    pub player: Arc<RwLock<PlayerStatus>>,
    pub controller: Arc<RwLock<ControllerStatus>>,
    pub platform: Arc<RecordingPlatform>,
    rx: Receiver<ViewMessage>,
}

impl WrapperProbe {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let player = Arc::new(RwLock::new(PlayerStatus::default()));
        let controller = Arc::new(RwLock::new(ControllerStatus::default()));
        let platform = Arc::new(RecordingPlatform::new(1080, 1920));
        let wrapper = ControlWrapper::new(
            PlayerHandle::new(player.clone(), tx.clone()),
            ControllerHandle::new(controller.clone(), tx),
            platform.clone(),
        );
        Self {
            wrapper,
            player,
            controller,
            platform,
            rx,
        }
    }

    /// Requests posted since the last drain
    pub fn drain(&self) -> Vec<ViewMessage> {
        self.rx.try_iter().collect()
    }
}

impl Default for WrapperProbe {
    fn default() -> Self {
        Self::new()
    }
}

// State listener

/// One notification seen by a `RecordingListener`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Play(PlayState),
    Player(PlayerState),
}

/// State listener with a shared log; clone it before registering
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    changes: Arc<Mutex<Vec<StateChange>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<StateChange> {
        self.changes.lock().clone()
    }

    pub fn play_states(&self) -> Vec<PlayState> {
        self.changes
            .lock()
            .iter()
            .filter_map(|c| match c {
                StateChange::Play(state) => Some(*state),
                StateChange::Player(_) => None,
            })
            .collect()
    }

    pub fn player_states(&self) -> Vec<PlayerState> {
        self.changes
            .lock()
            .iter()
            .filter_map(|c| match c {
                StateChange::Player(state) => Some(*state),
                StateChange::Play(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.changes.lock().clear();
    }
}

impl OnStateChangeListener for RecordingListener {
    fn on_play_state_changed(&mut self, state: PlayState) {
        self.changes.lock().push(StateChange::Play(state));
    }

    fn on_player_state_changed(&mut self, state: PlayerState) {
        self.changes.lock().push(StateChange::Player(state));
    }
}
