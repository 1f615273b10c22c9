use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use tsplayer::audio::{AudioManager, FocusChangeSender, FocusRequestResult};
use tsplayer::components::standard_controller;
use tsplayer::decoder::SimulatedDecoderFactory;
use tsplayer::player::{JsonProgressManager, MemoryProgressManager, ProgressManager};
use tsplayer::utils::{self, format_position, Clock, GeneralConfig, SystemClock};
use tsplayer::window::{
    ContainerTarget, CutoutMode, DeviceInfo, NetworkType, ScreenOrientation, ViewHandle,
};
use tsplayer::{
    MediaPlayerControl, OnStateChangeListener, PlayState, PlayerState, Platform, VideoViewBuilder,
};

/// TSPlayer - drive one simulated playback session headlessly
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source to play
    #[arg(value_name = "URL", default_value = "https://example.com/media/demo.mp4")]
    url: String,

    /// Length of the simulated media in seconds
    #[arg(short = 'l', long, default_value = "20")]
    duration: u64,

    /// Title shown by the title bar
    #[arg(long, default_value = "TSPlayer demo")]
    title: String,

    /// Treat the source as a live stream
    #[arg(long)]
    live: bool,

    /// Start in full screen
    #[arg(short, long)]
    fullscreen: bool,

    /// Loop at the end instead of completing
    #[arg(long = "loop")]
    looping: bool,

    /// Playback speed
    #[arg(short, long, default_value = "1.0")]
    speed: f32,

    /// Pretend the device is on a metered mobile network
    #[arg(long)]
    mobile: bool,

    /// Accept playback on a mobile network when asked
    #[arg(long)]
    allow_mobile: bool,

    /// Keep resume points in the JSON progress store
    #[arg(long)]
    persist: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = utils::load_config().context("Failed to load configuration")?;
    apply_debug_flag(&mut config.general, args.debug);
    utils::init_logging(&config.general);

    info!("Starting TSPlayer v{}", env!("CARGO_PKG_VERSION"));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let network = if args.mobile { NetworkType::Mobile } else { NetworkType::Wifi };
    let platform = Arc::new(HeadlessPlatform::new(1080, 1920, network));
    let audio = Arc::new(HeadlessAudio::new(15));

    let progress: Arc<dyn ProgressManager> = if args.persist {
        Arc::new(JsonProgressManager::open_default()?)
    } else {
        Arc::new(MemoryProgressManager::new())
    };

    let decoders = SimulatedDecoderFactory::new(clock.clone(), args.duration * 1000)
        .with_video_size(1920, 1080);

    let mut view = VideoViewBuilder::new(platform.clone(), audio)
        .with_config(config.clone())
        .with_decoder_factory(Arc::new(decoders))
        .with_progress_manager(progress)
        .with_clock(clock)
        .build()?;

    let (controller, _ids) = standard_controller(
        config.controller.clone(),
        view.policy().clone(),
        &args.title,
        args.live,
        100,
    );
    view.set_video_controller(Some(Box::new(controller)));
    view.add_on_state_change_listener(Box::new(LoggingListener));

    view.set_url(args.url.as_str());
    view.set_looping(args.looping);
    view.start();

    if view.play_state() == PlayState::StartAbort {
        if !args.allow_mobile {
            warn!("Playback on a mobile network needs --allow-mobile");
            return Ok(());
        }
        info!("Allowing playback on the mobile network");
        view.policy().set_play_on_mobile_network(true);
        view.start();
    }

    if args.fullscreen {
        view.start_full_screen();
    }
    view.set_speed(args.speed);

    let mut ticker = tokio::time::interval(Duration::from_millis(50));
    let mut last_report = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                view.tick_now();
                match view.play_state() {
                    PlayState::PlaybackCompleted | PlayState::Error => break,
                    _ => {}
                }
                let status = view.status();
                if status.position / 1000 != last_report / 1000 {
                    last_report = status.position;
                    debug!(
                        "{} / {} ({}%)",
                        format_position(status.position),
                        format_position(status.duration),
                        status.buffered_percentage
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                view.pause();
                break;
            }
        }
    }

    view.release();
    if !view.wait_for_releases(Duration::from_secs(2)) {
        warn!("Decoder release still pending on exit");
    }
    info!("Overlays left on screen: {}", platform.overlay_count());
    Ok(())
}

/// `--debug` turns logging on at debug level; otherwise the configured
/// toggle and level stand
fn apply_debug_flag(general: &mut GeneralConfig, debug: bool) {
    if debug {
        general.enable_log = true;
        general.log_level = "debug".to_string();
    }
}

/// Logs every state transition
struct LoggingListener;

impl OnStateChangeListener for LoggingListener {
    fn on_play_state_changed(&mut self, state: PlayState) {
        info!("Play state: {:?}", state);
    }

    fn on_player_state_changed(&mut self, state: PlayerState) {
        info!("Player state: {:?}", state);
    }
}

#[derive(Debug)]
struct WindowState {
    orientation: ScreenOrientation,
    brightness: Option<f32>,
    overlays: Vec<ViewHandle>,
}

/// Platform without a window: answers queries and logs window changes
#[derive(Debug)]
struct HeadlessPlatform {
    screen: (u32, u32),
    network: NetworkType,
    state: Mutex<WindowState>,
}

impl HeadlessPlatform {
    fn new(width: u32, height: u32, network: NetworkType) -> Self {
        Self {
            screen: (width, height),
            network,
            state: Mutex::new(WindowState {
                orientation: ScreenOrientation::Portrait,
                brightness: None,
                overlays: Vec::new(),
            }),
        }
    }

    fn overlay_count(&self) -> usize {
        self.state.lock().overlays.len()
    }
}

impl Platform for HeadlessPlatform {
    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn density(&self) -> f32 {
        1.0
    }

    fn status_bar_height(&self) -> u32 {
        0
    }

    fn network_type(&self) -> NetworkType {
        self.network
    }

    fn attach_player_container(&self, target: ContainerTarget) -> bool {
        debug!("Player container: {:?}", target);
        true
    }

    fn set_system_bars_visible(&self, visible: bool) {
        debug!("System bars visible: {}", visible);
    }

    fn set_keep_screen_on(&self, keep_on: bool) {
        debug!("Keep screen on: {}", keep_on);
    }

    fn requested_orientation(&self) -> ScreenOrientation {
        self.state.lock().orientation
    }

    fn set_requested_orientation(&self, orientation: ScreenOrientation) {
        info!("Orientation: {:?}", orientation);
        self.state.lock().orientation = orientation;
    }

    fn is_finishing(&self) -> bool {
        false
    }

    fn window_brightness(&self) -> Option<f32> {
        self.state.lock().brightness
    }

    fn set_window_brightness(&self, brightness: f32) {
        self.state.lock().brightness = Some(brightness);
    }

    fn set_cutout_mode(&self, mode: CutoutMode) {
        debug!("Cutout mode: {:?}", mode);
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo::default()
    }

    fn add_overlay_view(&self, view: ViewHandle) {
        self.state.lock().overlays.push(view);
    }

    fn remove_overlay_view(&self, view: ViewHandle) {
        self.state.lock().overlays.retain(|v| *v != view);
    }
}

/// Audio service that always grants focus
#[derive(Debug)]
struct HeadlessAudio {
    max_volume: u32,
    volume: Mutex<u32>,
}

impl HeadlessAudio {
    fn new(max_volume: u32) -> Self {
        Self {
            max_volume,
            volume: Mutex::new(max_volume / 2),
        }
    }
}

impl AudioManager for HeadlessAudio {
    fn stream_volume(&self) -> u32 {
        *self.volume.lock()
    }

    fn max_stream_volume(&self) -> u32 {
        self.max_volume
    }

    fn set_stream_volume(&self, index: u32) {
        *self.volume.lock() = index.min(self.max_volume);
    }

    fn request_audio_focus(&self, _listener: FocusChangeSender) -> FocusRequestResult {
        FocusRequestResult::Granted
    }

    fn abandon_audio_focus(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general(enable_log: bool, level: &str) -> GeneralConfig {
        GeneralConfig {
            enable_log,
            log_level: level.to_string(),
        }
    }

    #[test]
    fn test_configured_log_toggle_is_kept() {
        let mut off = general(false, "info");
        apply_debug_flag(&mut off, false);
        assert!(!off.enable_log);
        assert_eq!(off.log_level, "info");

        let mut on = general(true, "warn");
        apply_debug_flag(&mut on, false);
        assert!(on.enable_log);
        assert_eq!(on.log_level, "warn");
    }

    #[test]
    fn test_debug_flag_forces_logging() {
        let mut config = general(false, "info");
        apply_debug_flag(&mut config, true);
        assert!(config.enable_log);
        assert_eq!(config.log_level, "debug");
    }
}
