use nannou::prelude::{App, Draw, Key};
use std::time::Duration;

use playground::prelude::*;

pub const EXPERIENCE_CONFIG: ExperienceConfig = ExperienceConfig {
    tab: Tab::Sound,
    display_name: "Sound Pad",
};

pub const PULSE_LIFETIME: Duration = Duration::from_millis(800);
pub const PULSE_RADIUS: f32 = 6.0;

pub const PULSE_COLORS: [&str; 5] =
    ["#fbcfe8", "#e9d5ff", "#a7f3d0", "#fef9c3", "#c7d2fe"];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SoundSet {
    #[default]
    Piano,
    Synth,
    Percussion,
    Ambient,
}

impl SoundSet {
    pub const ALL: [SoundSet; 4] = [
        SoundSet::Piano,
        SoundSet::Synth,
        SoundSet::Percussion,
        SoundSet::Ambient,
    ];

    fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    fn notes(&self) -> &'static [&'static str] {
        match self {
            SoundSet::Piano => &["C5", "E5", "G5"],
            SoundSet::Synth => &["A4", "B4", "D5", "E5"],
            SoundSet::Percussion => &["C2"],
            SoundSet::Ambient => &[],
        }
    }

    /// Build the single voice one click plays
    pub fn voice(&self, rng: &mut dyn RandomSource) -> Voice {
        let frequency = pick(rng, self.notes())
            .and_then(|note| note_to_hz(note))
            .unwrap_or(0.0);

        match self {
            SoundSet::Piano => Voice {
                kind: VoiceKind::Piano,
                frequency,
                duration: 0.2,
                gain: 1.0,
            },
            SoundSet::Synth => Voice {
                kind: VoiceKind::Fm,
                frequency,
                duration: 0.2,
                gain: 1.0,
            },
            SoundSet::Percussion => Voice {
                kind: VoiceKind::Membrane,
                frequency,
                duration: 0.1,
                gain: 1.0,
            },
            SoundSet::Ambient => Voice {
                kind: VoiceKind::Noise,
                frequency,
                duration: 0.15,
                gain: db_to_gain(-20.0),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClickPulse {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub created_at: Duration,
    pub color: HexColor,
}

impl ClickPulse {
    /// Linear fade from 1 at creation to 0 at [`PULSE_LIFETIME`]
    pub fn alpha(&self, now: Duration) -> f32 {
        let age = now.saturating_sub(self.created_at).as_secs_f32();
        (1.0 - age / PULSE_LIFETIME.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.created_at) >= PULSE_LIFETIME
    }
}

pub struct SoundPad {
    engine: SoundEngine,
    set: SoundSet,
    pulses: Vec<ClickPulse>,
    colors: Vec<HexColor>,
    next_id: u64,
    rng: Box<dyn RandomSource>,
}

pub fn init(ctx: &MountContext) -> SoundPad {
    SoundPad::new(
        SoundEngine::new((ctx.audio)(), ctx.muted),
        Box::new(ThreadRandom),
    )
}

impl SoundPad {
    pub fn new(engine: SoundEngine, rng: Box<dyn RandomSource>) -> Self {
        Self {
            engine,
            set: SoundSet::default(),
            pulses: vec![],
            colors: palette(&PULSE_COLORS),
            next_id: 0,
            rng,
        }
    }

    pub fn pulses(&self) -> &[ClickPulse] {
        &self.pulses
    }

    pub fn sound_set(&self) -> SoundSet {
        self.set
    }

    pub fn set_sound_set(&mut self, set: SoundSet) {
        self.set = set;
    }

    pub fn is_muted(&self) -> bool {
        self.engine.is_muted()
    }

    /// Show a pulse at `at` and play one voice. The pulse appears whether or
    /// not any audio could be played.
    pub fn click(&mut self, at: Point, ctx: &Context) {
        let color = pick(self.rng.as_mut(), &self.colors)
            .copied()
            .unwrap_or_default();
        self.next_id += 1;
        self.pulses.push(ClickPulse {
            id: self.next_id,
            x: at.x,
            y: at.y,
            created_at: ctx.elapsed,
            color,
        });

        let voice = self.set.voice(self.rng.as_mut());
        if self.engine.play(&[voice], ctx.settings.mode) {
            trace!("Played {:?} at {:.1} Hz", voice.kind, voice.frequency);
        }
    }
}

impl Experience for SoundPad {
    fn update(&mut self, ctx: &Context) {
        self.pulses.retain(|p| !p.is_expired(ctx.elapsed));
    }

    fn view(&self, _app: &App, draw: &Draw, ctx: &Context) {
        for pulse in &self.pulses {
            let alpha = pulse.alpha(ctx.elapsed);
            let xy = ctx.surface.to_draw(Point::new(pulse.x, pulse.y));
            let spread = 1.0 - alpha;

            draw.ellipse()
                .xy(xy)
                .radius(PULSE_RADIUS + spread * PULSE_RADIUS * 6.0)
                .no_fill()
                .stroke_weight(2.0)
                .stroke(pulse.color.fade(alpha * 0.6).to_srgba());
            draw.ellipse()
                .xy(xy)
                .radius(PULSE_RADIUS)
                .color(pulse.color.fade(alpha).to_srgba());
        }
    }

    fn pointer(&mut self, event: PointerEvent, ctx: &Context) {
        if let PointerEvent::Click(p) = event {
            self.click(p, ctx);
        }
    }

    fn key_pressed(&mut self, key: Key, ctx: &Context) {
        match key {
            Key::N => self.set = self.set.next(),
            Key::M => {
                let muted = !self.engine.is_muted();
                self.engine.set_muted(muted);
                ctx.alert(ternary!(muted, "Sound muted", "Sound on"));
            }
            _ => {}
        }
    }

    fn teardown(&mut self) {
        self.engine.shutdown();
        self.pulses.clear();
    }

    fn status(&self, _ctx: &Context) -> String {
        let audio = if self.engine.is_muted() {
            "muted"
        } else if !self.engine.is_available() {
            "no audio device"
        } else if self.engine.is_started() {
            "on"
        } else {
            "click to start"
        };
        format!("{:?} | {} | N sound set  M mute", self.set, audio)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::error::Error;
    use std::rc::Rc;

    use super::*;
    use crate::experiences::test_support::{ctx, mount_ctx};

    #[derive(Default)]
    struct Recording {
        starts: u32,
        gains: Vec<f32>,
        voices: Vec<Voice>,
        stopped: bool,
    }

    struct RecordingEngine(Rc<RefCell<Recording>>);

    impl AudioEngine for RecordingEngine {
        fn ensure_started(&mut self) -> Result<(), Box<dyn Error>> {
            self.0.borrow_mut().starts += 1;
            Ok(())
        }

        fn is_started(&self) -> bool {
            self.0.borrow().starts > 0
        }

        fn now(&self) -> f64 {
            0.0
        }

        fn trigger(&mut self, voice: Voice, _at: f64) {
            self.0.borrow_mut().voices.push(voice);
        }

        fn set_master_gain(&mut self, gain: f32) {
            self.0.borrow_mut().gains.push(gain);
        }

        fn stop(&mut self) {
            self.0.borrow_mut().stopped = true;
        }
    }

    fn pad(muted: bool, sample: f32) -> (SoundPad, Rc<RefCell<Recording>>) {
        let recording = Rc::new(RefCell::new(Recording::default()));
        let engine = RecordingEngine(recording.clone());
        let pad = SoundPad::new(
            SoundEngine::new(Box::new(engine), muted),
            Box::new(SequenceRandom::constant(sample)),
        );
        (pad, recording)
    }

    fn at(ms: u64, mode: Mode) -> Context {
        ctx(mode).with_elapsed(Duration::from_millis(ms))
    }

    #[test]
    fn each_click_plays_one_voice_and_one_pulse() {
        let (mut pad, recording) = pad(false, 0.0);
        assert_eq!(recording.borrow().starts, 0);

        let ctx = at(0, Mode::Calm);
        pad.pointer(PointerEvent::Click(Point::new(20.0, 20.0)), &ctx);
        pad.pointer(PointerEvent::Hover(Point::new(30.0, 30.0)), &ctx);
        pad.pointer(PointerEvent::Drag(Point::new(30.0, 30.0)), &ctx);

        let recording = recording.borrow();
        assert_eq!(recording.voices.len(), 1);
        assert_eq!(recording.voices[0].kind, VoiceKind::Piano);
        assert!((recording.voices[0].frequency - 523.25).abs() < 0.01);
        assert!((recording.gains[0] - db_to_gain(-10.0)).abs() < 1e-6);
        assert_eq!(pad.pulses().len(), 1);
    }

    #[test]
    fn gain_follows_mode_per_click() {
        let (mut pad, recording) = pad(false, 0.0);
        for mode in Mode::ALL {
            pad.click(Point::new(1.0, 1.0), &at(0, mode));
        }
        let gains = recording.borrow().gains.clone();
        let expected: Vec<f32> =
            Mode::ALL.iter().map(|m| db_to_gain(m.master_gain_db())).collect();
        assert_eq!(gains, expected);
    }

    #[test]
    fn muted_still_pulses() {
        let (mut pad, recording) = pad(true, 0.5);
        pad.click(Point::new(50.0, 60.0), &at(100, Mode::Playful));

        assert_eq!(pad.pulses().len(), 1);
        assert_eq!(recording.borrow().starts, 0);
        assert!(recording.borrow().voices.is_empty());

        pad.key_pressed(Key::M, &at(200, Mode::Playful));
        assert!(!pad.is_muted());
        pad.click(Point::new(50.0, 60.0), &at(300, Mode::Playful));
        assert_eq!(recording.borrow().voices.len(), 1);
    }

    #[test]
    fn pulses_fade_and_expire() {
        let (mut pad, _) = pad(true, 0.0);
        pad.click(Point::new(5.0, 5.0), &at(1000, Mode::Calm));

        let pulse = pad.pulses()[0].clone();
        assert_eq!(pulse.alpha(Duration::from_millis(1000)), 1.0);
        assert!((pulse.alpha(Duration::from_millis(1400)) - 0.5).abs() < 1e-4);

        pad.update(&at(1799, Mode::Calm));
        assert_eq!(pad.pulses().len(), 1);
        pad.update(&at(1800, Mode::Calm));
        assert!(pad.pulses().is_empty());
    }

    #[test]
    fn sound_sets_map_to_voices() {
        let mut rng = SequenceRandom::constant(0.0);
        let voices: Vec<Voice> =
            SoundSet::ALL.iter().map(|s| s.voice(&mut rng)).collect();

        assert_eq!(voices[0].kind, VoiceKind::Piano);
        assert_eq!(voices[1].kind, VoiceKind::Fm);
        assert!((voices[1].frequency - 440.0).abs() < 0.01);
        assert_eq!(voices[2].kind, VoiceKind::Membrane);
        assert_eq!(voices[2].duration, 0.1);
        assert_eq!(voices[3].kind, VoiceKind::Noise);
        assert!((voices[3].gain - 0.1).abs() < 1e-4);
    }

    #[test]
    fn set_key_cycles_and_teardown_stops_engine() {
        let (mut pad, recording) = pad(false, 0.0);
        let ctx = at(0, Mode::Calm);
        for _ in 0..3 {
            pad.key_pressed(Key::N, &ctx);
        }
        assert_eq!(pad.sound_set(), SoundSet::Ambient);
        pad.key_pressed(Key::N, &ctx);
        assert_eq!(pad.sound_set(), SoundSet::Piano);

        pad.teardown();
        assert!(recording.borrow().stopped);
    }

    #[test]
    fn mount_honors_initial_mute() {
        let mut mount = mount_ctx(MemoryStore::shared());
        mount.muted = true;
        let pad = init(&mount);
        assert!(pad.is_muted());
    }
}
