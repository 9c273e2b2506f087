//! Audio output: the engine seam, a cpal-backed engine rendering the
//! software synth, and the click-to-voice adapter experiences talk to.

use cpal::{
    SampleFormat, Stream, StreamConfig, SupportedStreamConfig,
    SupportedStreamConfigRange, traits::*,
};
use std::error::Error;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use super::synth::{Synth, Voice};
use crate::core::logging::{debug, error, info, warn};
use crate::core::util::db_to_gain;
use crate::runtime::settings::Mode;

pub trait AudioEngine {
    /// Open the output device. Must only be called in response to a user
    /// gesture; calling it again once started is a no-op.
    fn ensure_started(&mut self) -> Result<(), Box<dyn Error>>;

    fn is_started(&self) -> bool;

    /// Current time on the engine's clock in seconds
    fn now(&self) -> f64;

    fn trigger(&mut self, voice: Voice, at: f64);

    fn set_master_gain(&mut self, gain: f32);

    fn stop(&mut self) {}
}

pub type AudioFactory = Rc<dyn Fn() -> Box<dyn AudioEngine>>;

pub fn cpal_audio_factory() -> AudioFactory {
    Rc::new(|| Box::new(CpalEngine::new()))
}

pub fn null_audio_factory() -> AudioFactory {
    Rc::new(|| Box::new(NullEngine::default()))
}

#[derive(Default)]
pub struct CpalEngine {
    synth: Arc<Mutex<Option<Synth>>>,
    stream: Option<Stream>,
}

impl CpalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_synth<R>(&self, f: impl FnOnce(&mut Synth) -> R) -> Option<R> {
        let mut synth = self.synth.lock().unwrap_or_else(|e| e.into_inner());
        synth.as_mut().map(f)
    }

    fn build_stream(
        &mut self,
        device: &cpal::Device,
        config: &StreamConfig,
    ) -> Result<Stream, Box<dyn Error>> {
        let channels = config.channels as usize;
        if channels < 1 {
            return Err("Device must have at least one channel".into());
        }

        {
            let mut synth =
                self.synth.lock().unwrap_or_else(|e| e.into_inner());
            *synth = Some(Synth::new(config.sample_rate.0 as f32));
        }

        let shared_synth = self.synth.clone();
        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                match shared_synth.lock().as_deref_mut() {
                    Ok(Some(synth)) => synth.render(data, channels),
                    _ => data.fill(0.0),
                }
            },
            move |err| error!("Error in audio stream: {}", err),
            None,
        )?;
        stream.play()?;

        Ok(stream)
    }
}

/// Output configs to try in order: the device default first, then the
/// highest rate of every range that natively takes f32 samples.
fn candidate_configs(
    default: Option<SupportedStreamConfig>,
    supported: impl IntoIterator<Item = SupportedStreamConfigRange>,
) -> Vec<StreamConfig> {
    let mut configs: Vec<StreamConfig> =
        default.into_iter().map(StreamConfig::from).collect();

    for range in supported {
        if range.sample_format() != SampleFormat::F32 {
            continue;
        }
        let config = StreamConfig::from(range.with_max_sample_rate());
        if !configs.contains(&config) {
            configs.push(config);
        }
    }

    configs
}

impl AudioEngine for CpalEngine {
    fn ensure_started(&mut self) -> Result<(), Box<dyn Error>> {
        if self.stream.is_some() {
            return Ok(());
        }

        let device = cpal::default_host()
            .default_output_device()
            .ok_or("No default audio output device")?;
        let supported: Vec<SupportedStreamConfigRange> = device
            .supported_output_configs()
            .map(|configs| configs.collect())
            .unwrap_or_default();
        let configs =
            candidate_configs(device.default_output_config().ok(), supported);

        let mut last_error: Box<dyn Error> =
            "No usable audio output config".into();
        for config in configs {
            match self.build_stream(&device, &config) {
                Ok(stream) => {
                    self.stream = Some(stream);
                    info!(
                        "Audio started: {} Hz, {} channel(s)",
                        config.sample_rate.0, config.channels
                    );
                    return Ok(());
                }
                Err(e) => {
                    debug!("Output config {:?} rejected: {}", config, e);
                    last_error = e;
                }
            }
        }

        self.stop();
        Err(last_error)
    }

    fn is_started(&self) -> bool {
        self.stream.is_some()
    }

    fn now(&self) -> f64 {
        self.with_synth(|s| s.now()).unwrap_or(0.0)
    }

    fn trigger(&mut self, voice: Voice, at: f64) {
        self.with_synth(|s| s.trigger(voice, at));
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.with_synth(|s| s.set_master_gain(gain));
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!("Audio stream closed");
        }
        let mut synth = self.synth.lock().unwrap_or_else(|e| e.into_inner());
        *synth = None;
    }
}

/// Accepts everything and produces no sound
#[derive(Debug, Default)]
pub struct NullEngine {
    started: bool,
}

impl AudioEngine for NullEngine {
    fn ensure_started(&mut self) -> Result<(), Box<dyn Error>> {
        self.started = true;
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.started
    }

    fn now(&self) -> f64 {
        0.0
    }

    fn trigger(&mut self, _voice: Voice, _at: f64) {}

    fn set_master_gain(&mut self, _gain: f32) {}
}

/// Maps clicks onto voice triggers. The engine is only started from
/// [`SoundEngine::play`], i.e. from a click, and a failed start is reported
/// once after which audio is skipped for the rest of the mount.
pub struct SoundEngine {
    engine: Box<dyn AudioEngine>,
    muted: bool,
    unavailable: bool,
}

impl SoundEngine {
    pub fn new(engine: Box<dyn AudioEngine>, muted: bool) -> Self {
        Self {
            engine,
            muted,
            unavailable: false,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_available(&self) -> bool {
        !self.unavailable
    }

    pub fn is_started(&self) -> bool {
        self.engine.is_started()
    }

    /// Returns true when the voices were handed to the engine
    pub fn play(&mut self, voices: &[Voice], mode: Mode) -> bool {
        if self.muted || self.unavailable {
            return false;
        }

        if let Err(e) = self.engine.ensure_started() {
            warn!("Audio unavailable, continuing without sound: {}", e);
            self.unavailable = true;
            return false;
        }

        self.engine.set_master_gain(db_to_gain(mode.master_gain_db()));
        let now = self.engine.now();
        for voice in voices {
            self.engine.trigger(*voice, now);
        }

        true
    }

    pub fn shutdown(&mut self) {
        self.engine.stop();
    }
}

impl Drop for SoundEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
