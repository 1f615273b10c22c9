//! Clock-driven stand-in backend
//!
//! Plays a virtual clip of fixed length without decoding anything. Used by
//! the demo binary and for soak-testing the view's state machine.

use super::{
    DataSource, Decoder, DecoderEvent, DecoderEventSender, DecoderFactory, SurfaceHandle,
    MEDIA_INFO_RENDERING_START,
};
use crate::utils::error::{PlayerError, Result};
use crate::utils::timer::Clock;
use log::debug;
use std::sync::Arc;

/// Nominal stream bitrate reported as tcp speed while playing
const SIMULATED_BYTES_PER_SEC: u64 = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Idle,
    Initialized,
    Prepared,
    Started,
    Paused,
    Completed,
    Stopped,
    Released,
}

pub struct SimulatedDecoder {
    clock: Arc<dyn Clock>,
    events: Option<DecoderEventSender>,
    transport: Transport,
    duration_ms: u64,
    video_size: (u32, u32),

    /// Position at `anchor_time`
    anchor_position: u64,
    anchor_time: u64,

    speed: f32,
    looping: bool,
    volume: (f32, f32),
    surface: Option<SurfaceHandle>,
    rendering_started: bool,
}

impl SimulatedDecoder {
    pub fn new(clock: Arc<dyn Clock>, duration_ms: u64, video_size: (u32, u32)) -> Self {
        Self {
            clock,
            events: None,
            transport: Transport::Idle,
            duration_ms,
            video_size,
            anchor_position: 0,
            anchor_time: 0,
            speed: 1.0,
            looping: false,
            volume: (1.0, 1.0),
            surface: None,
            rendering_started: false,
        }
    }

    fn emit(&self, event: DecoderEvent) {
        if let Some(events) = &self.events {
            events.send(event);
        }
    }

    fn require(&self, allowed: &[Transport], op: &str) -> Result<()> {
        if allowed.contains(&self.transport) {
            Ok(())
        } else {
            Err(PlayerError::decoder(format!(
                "{} called in {:?}",
                op, self.transport
            )))
        }
    }

    fn elapsed_position(&self) -> u64 {
        let now = self.clock.now_ms();
        let advanced = (now.saturating_sub(self.anchor_time) as f32 * self.speed) as u64;
        self.anchor_position.saturating_add(advanced)
    }

    fn reanchor(&mut self) {
        let position = self.current_position();
        self.anchor_position = position;
        self.anchor_time = self.clock.now_ms();
    }
}

impl Decoder for SimulatedDecoder {
    fn init(&mut self, events: DecoderEventSender) -> Result<()> {
        self.events = Some(events);
        Ok(())
    }

    fn set_data_source(&mut self, source: &DataSource) -> Result<()> {
        self.require(&[Transport::Idle], "set_data_source")?;
        debug!("Simulated source {:?}", source);
        self.transport = Transport::Initialized;
        Ok(())
    }

    fn prepare_async(&mut self) -> Result<()> {
        self.require(&[Transport::Initialized, Transport::Stopped], "prepare_async")?;
        if self.events.is_none() {
            return Err(crate::internal_error!("prepare_async before init"));
        }
        self.transport = Transport::Prepared;
        self.emit(DecoderEvent::VideoSizeChanged {
            width: self.video_size.0,
            height: self.video_size.1,
        });
        self.emit(DecoderEvent::Prepared);

        // The backend starts itself once prepared
        self.start()
    }

    fn start(&mut self) -> Result<()> {
        self.require(
            &[Transport::Prepared, Transport::Started, Transport::Paused, Transport::Completed],
            "start",
        )?;
        if self.transport == Transport::Completed && self.anchor_position >= self.duration_ms {
            self.anchor_position = 0;
        }
        self.anchor_time = self.clock.now_ms();
        self.transport = Transport::Started;
        if !self.rendering_started {
            self.rendering_started = true;
            self.emit(DecoderEvent::Info {
                what: MEDIA_INFO_RENDERING_START,
                extra: 0,
            });
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.require(&[Transport::Started, Transport::Paused], "pause")?;
        self.reanchor();
        self.transport = Transport::Paused;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.reanchor();
        self.transport = Transport::Stopped;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.transport = Transport::Idle;
        self.anchor_position = 0;
        self.rendering_started = false;
        Ok(())
    }

    fn release(&mut self) {
        self.events = None;
        self.surface = None;
        self.transport = Transport::Released;
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.require(
            &[Transport::Prepared, Transport::Started, Transport::Paused, Transport::Completed],
            "seek_to",
        )?;
        self.anchor_position = position_ms.min(self.duration_ms);
        self.anchor_time = self.clock.now_ms();
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.transport == Transport::Started
    }

    fn duration(&self) -> u64 {
        self.duration_ms
    }

    fn current_position(&self) -> u64 {
        match self.transport {
            Transport::Started => self.elapsed_position().min(self.duration_ms),
            Transport::Completed => self.duration_ms,
            _ => self.anchor_position,
        }
    }

    fn buffered_percentage(&self) -> u32 {
        match self.transport {
            Transport::Idle | Transport::Initialized | Transport::Released => 0,
            _ => 100,
        }
    }

    fn set_speed(&mut self, speed: f32) -> Result<()> {
        if speed <= 0.0 {
            return Err(PlayerError::InvalidInput(format!("speed {}", speed)));
        }
        self.reanchor();
        self.speed = speed;
        Ok(())
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn tcp_speed(&self) -> u64 {
        if self.is_playing() {
            SIMULATED_BYTES_PER_SEC
        } else {
            0
        }
    }

    fn set_volume(&mut self, left: f32, right: f32) -> Result<()> {
        self.volume = (left, right);
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()> {
        self.surface = surface;
        Ok(())
    }

    fn poll(&mut self) {
        if self.transport != Transport::Started || self.elapsed_position() < self.duration_ms {
            return;
        }
        if self.looping {
            self.anchor_position = 0;
            self.anchor_time = self.clock.now_ms();
        } else {
            self.transport = Transport::Completed;
            self.anchor_position = self.duration_ms;
            self.emit(DecoderEvent::Completion);
        }
    }
}

/// Builds `SimulatedDecoder`s sharing one clock
pub struct SimulatedDecoderFactory {
    clock: Arc<dyn Clock>,
    duration_ms: u64,
    video_size: (u32, u32),
}

impl SimulatedDecoderFactory {
    pub fn new(clock: Arc<dyn Clock>, duration_ms: u64) -> Self {
        Self {
            clock,
            duration_ms,
            video_size: (1920, 1080),
        }
    }

    pub fn with_video_size(mut self, width: u32, height: u32) -> Self {
        self.video_size = (width, height);
        self
    }
}

impl DecoderFactory for SimulatedDecoderFactory {
    fn create_decoder(&self) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(SimulatedDecoder::new(
            self.clock.clone(),
            self.duration_ms,
            self.video_size,
        )))
    }
}
