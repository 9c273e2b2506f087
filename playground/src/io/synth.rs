//! A tiny polyphonic software synth rendered on the audio thread.

use nannou::rand::rngs::StdRng;
use nannou::rand::{Rng, SeedableRng};

use crate::core::util::TWO_PI;

const ATTACK: f32 = 0.005;
const MAX_VOICES: usize = 32;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VoiceKind {
    /// Sine with a soft second harmonic and a plucked decay
    Piano,
    /// Two-operator FM (harmonicity 3, index 3)
    Fm,
    /// Pitch-swept sine drum
    Membrane,
    /// White noise burst
    Noise,
}

impl VoiceKind {
    fn release(&self) -> f32 {
        match self {
            VoiceKind::Piano => 0.3,
            VoiceKind::Fm => 0.15,
            VoiceKind::Membrane | VoiceKind::Noise => 0.05,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voice {
    pub kind: VoiceKind,
    pub frequency: f32,
    /// Seconds the note is held before release
    pub duration: f32,
    /// Linear gain applied to this voice only
    pub gain: f32,
}

#[derive(Debug)]
struct ActiveVoice {
    voice: Voice,
    start: f64,
    phase: f32,
    mod_phase: f32,
}

impl ActiveVoice {
    fn envelope(&self, t: f32) -> f32 {
        let held = self.voice.duration;
        let release = self.voice.kind.release();
        if t < ATTACK {
            t / ATTACK
        } else if t < held {
            1.0
        } else if t < held + release {
            1.0 - (t - held) / release
        } else {
            0.0
        }
    }

    fn is_finished(&self, t: f32) -> bool {
        t >= self.voice.duration + self.voice.kind.release()
    }
}

pub struct Synth {
    sample_rate: f32,
    sample_clock: u64,
    master_gain: f32,
    voices: Vec<ActiveVoice>,
    noise: StdRng,
}

impl Synth {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, 0x5eed)
    }

    pub fn with_seed(sample_rate: f32, seed: u64) -> Self {
        Self {
            sample_rate: sample_rate.max(1.0),
            sample_clock: 0,
            master_gain: 1.0,
            voices: vec![],
            noise: StdRng::seed_from_u64(seed),
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Seconds of audio rendered so far
    pub fn now(&self) -> f64 {
        self.sample_clock as f64 / self.sample_rate as f64
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain.max(0.0);
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// Schedule `voice` to start at `at` seconds on the synth clock
    pub fn trigger(&mut self, voice: Voice, at: f64) {
        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0);
        }
        self.voices.push(ActiveVoice {
            voice,
            start: at.max(self.now()),
            phase: 0.0,
            mod_phase: 0.0,
        });
    }

    /// Fill an interleaved buffer, writing the same sample to every channel
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            let sample = self.next_sample();
            frame.fill(sample);
        }
    }

    fn next_sample(&mut self) -> f32 {
        let now = self.now();
        let dt = 1.0 / self.sample_rate;
        let mut mix = 0.0;

        for active in self.voices.iter_mut() {
            if now < active.start {
                continue;
            }
            let t = (now - active.start) as f32;
            let envelope = active.envelope(t);
            let f = active.voice.frequency;

            let raw = match active.voice.kind {
                VoiceKind::Piano => {
                    let s = (TWO_PI * active.phase).sin()
                        + 0.3 * (2.0 * TWO_PI * active.phase).sin();
                    active.phase = (active.phase + f * dt).fract();
                    s * (-3.0 * t).exp() * 0.6
                }
                VoiceKind::Fm => {
                    let modulator = (TWO_PI * active.mod_phase).sin();
                    let s = (TWO_PI * active.phase + 3.0 * modulator).sin();
                    active.phase = (active.phase + f * dt).fract();
                    active.mod_phase = (active.mod_phase + 3.0 * f * dt).fract();
                    s * 0.5
                }
                VoiceKind::Membrane => {
                    let swept = f * (1.0 + 4.0 * (-t / 0.05).exp());
                    let s = (TWO_PI * active.phase).sin();
                    active.phase = (active.phase + swept * dt).fract();
                    s
                }
                VoiceKind::Noise => self.noise.gen_range(-1.0..1.0),
            };

            mix += raw * envelope * active.voice.gain;
        }

        let elapsed = |v: &ActiveVoice| (now - v.start).max(0.0) as f32;
        self.voices.retain(|v| now < v.start || !v.is_finished(elapsed(v)));
        self.sample_clock += 1;

        (mix * self.master_gain).tanh()
    }
}

/// Frequency in Hz for scientific pitch notation such as `"C5"` or `"F#3"`
pub fn note_to_hz(note: &str) -> Option<f32> {
    let mut chars = note.chars();
    let semitone = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (accidental, octave) = match rest.chars().next()? {
        '#' => (1, &rest[1..]),
        'b' => (-1, &rest[1..]),
        _ => (0, rest),
    };
    let octave: i32 = octave.parse().ok()?;

    let midi = 12 * (octave + 1) + semitone + accidental;
    Some(440.0 * 2f32.powf((midi - 69) as f32 / 12.0))
}
