use nannou::prelude::{App, Draw, Key};

use playground::prelude::*;

pub const EXPERIENCE_CONFIG: ExperienceConfig = ExperienceConfig {
    tab: Tab::Particles,
    display_name: "Particles",
};

pub const PARTICLE_RADIUS: f32 = 6.0;
const WALL_MARGIN: f32 = 8.0;

const PASTEL: [HexColor; 5] = [
    HexColor::rgb(0xfb, 0xcf, 0xe8),
    HexColor::rgb(0xe9, 0xd5, 0xff),
    HexColor::rgb(0xa7, 0xf3, 0xd0),
    HexColor::rgb(0xfe, 0xf9, 0xc3),
    HexColor::rgb(0xc7, 0xd2, 0xfe),
];

const NEON: [HexColor; 5] = [
    HexColor::rgb(0xff, 0x61, 0xf6),
    HexColor::rgb(0x7a, 0xfc, 0xff),
    HexColor::rgb(0xff, 0xd1, 0x66),
    HexColor::rgb(0xca, 0xff, 0xbf),
    HexColor::rgb(0x9b, 0xf6, 0xff),
];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ParticleStyle {
    #[default]
    Floating,
    Bouncing,
    Exploding,
}

impl ParticleStyle {
    fn next(&self) -> Self {
        match self {
            ParticleStyle::Floating => ParticleStyle::Bouncing,
            ParticleStyle::Bouncing => ParticleStyle::Exploding,
            ParticleStyle::Exploding => ParticleStyle::Floating,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ParticleStyle::Floating => "Floating",
            ParticleStyle::Bouncing => "Bouncing",
            ParticleStyle::Exploding => "Exploding",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ParticlePalette {
    #[default]
    Pastel,
    Neon,
}

impl ParticlePalette {
    fn colors(&self) -> &'static [HexColor] {
        match self {
            ParticlePalette::Pastel => &PASTEL,
            ParticlePalette::Neon => &NEON,
        }
    }

    /// Halo radius multiplier
    fn glow(&self) -> f32 {
        match self {
            ParticlePalette::Pastel => 1.6,
            ParticlePalette::Neon => 2.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub max_life: f32,
    pub color: HexColor,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    pub fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }
}

pub struct Particles {
    particles: Vec<Particle>,
    style: ParticleStyle,
    palette: ParticlePalette,
    next_id: u64,
    rng: Box<dyn RandomSource>,
}

pub fn init(_ctx: &MountContext) -> Particles {
    Particles::new(Box::new(ThreadRandom))
}

impl Particles {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            particles: vec![],
            style: ParticleStyle::default(),
            palette: ParticlePalette::default(),
            next_id: 0,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn set_style(&mut self, style: ParticleStyle) {
        self.style = style;
    }

    pub fn set_palette(&mut self, palette: ParticlePalette) {
        self.palette = palette;
    }

    /// Emit one burst at `at`, sized and sped up by `mode`
    pub fn spawn(&mut self, at: Point, mode: Mode) {
        let rng = self.rng.as_mut();
        for _ in 0..mode.burst_count() {
            let angle = rng.range(0.0, TWO_PI);
            let base_speed = match self.style {
                ParticleStyle::Exploding => rng.range(1.0, 5.0),
                _ => rng.range(0.2, 1.7),
            };
            let speed = base_speed * mode.speed_multiplier();
            let max_life = 1.0 + rng.range(0.0, 1.5);
            let color = pick(&mut *rng, self.palette.colors())
                .copied()
                .unwrap_or_default();

            self.next_id += 1;
            self.particles.push(Particle {
                id: self.next_id,
                x: at.x,
                y: at.y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life: max_life,
                max_life,
                color,
            });
        }
    }

    /// Advance physics one frame and cull dead particles
    pub fn step(&mut self, surface: &Surface, mode: Mode) {
        let decay = mode.life_decay();
        let floor = surface.height() - WALL_MARGIN;
        let right_wall = surface.width() - WALL_MARGIN;

        for p in self.particles.iter_mut() {
            match self.style {
                ParticleStyle::Floating => p.vy -= 0.003,
                ParticleStyle::Bouncing => p.vy += 0.05,
                ParticleStyle::Exploding => {}
            }

            p.x += p.vx;
            p.y += p.vy;
            p.life -= decay;

            if self.style == ParticleStyle::Bouncing {
                if p.y > floor {
                    p.y = floor;
                    p.vy *= -0.7;
                }
                if p.x < WALL_MARGIN || p.x > right_wall {
                    p.vx *= -1.0;
                }
            }
        }

        self.particles.retain(|p| p.life > 0.0);
    }
}

impl Experience for Particles {
    fn update(&mut self, ctx: &Context) {
        self.step(&ctx.surface, ctx.settings.mode);
    }

    fn view(&self, _app: &App, draw: &Draw, ctx: &Context) {
        let glow = self.palette.glow();
        for p in &self.particles {
            let alpha = p.alpha();
            let xy = ctx.surface.to_draw(Point::new(p.x, p.y));
            draw.ellipse()
                .xy(xy)
                .radius(PARTICLE_RADIUS * glow)
                .color(p.color.fade(alpha * 0.25).to_srgba());
            draw.ellipse()
                .xy(xy)
                .radius(PARTICLE_RADIUS)
                .color(p.color.fade(alpha).to_srgba());
        }
    }

    fn pointer(&mut self, event: PointerEvent, ctx: &Context) {
        match event {
            PointerEvent::Click(p)
            | PointerEvent::Hover(p)
            | PointerEvent::Drag(p) => self.spawn(p, ctx.settings.mode),
            PointerEvent::Press(_) | PointerEvent::Release(_) => {}
        }
    }

    fn key_pressed(&mut self, key: Key, _ctx: &Context) {
        match key {
            Key::S => self.style = self.style.next(),
            Key::P => {
                self.palette = ternary!(
                    self.palette == ParticlePalette::Pastel,
                    ParticlePalette::Neon,
                    ParticlePalette::Pastel
                )
            }
            _ => {}
        }
    }

    fn teardown(&mut self) {
        self.particles.clear();
    }

    fn status(&self, _ctx: &Context) -> String {
        format!(
            "{} | {:?} | {} particles | S style  P palette",
            self.style.name(),
            self.palette,
            self.particles.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiences::test_support::{ctx, surface};

    fn particles(sample: f32) -> Particles {
        Particles::new(Box::new(SequenceRandom::constant(sample)))
    }

    #[test]
    fn burst_size_follows_mode() {
        let mut counts = vec![];
        for mode in Mode::ALL {
            let mut system = particles(0.5);
            let click = PointerEvent::Click(Point::new(50.0, 50.0));
            system.pointer(click, &ctx(mode));
            counts.push(system.particles().len());
        }
        assert_eq!(counts, vec![14, 24, 34]);
    }

    #[test]
    fn chaotic_exploding_burst_is_scaled() {
        let mut system = particles(0.5);
        system.set_style(ParticleStyle::Exploding);
        system.pointer(
            PointerEvent::Click(Point::new(200.0, 150.0)),
            &ctx(Mode::Chaotic),
        );

        assert_eq!(system.particles().len(), 34);
        for p in system.particles() {
            // (1 + 4 * 0.5) * 1.6
            assert!((p.speed() - 4.8).abs() < 1e-4);
            assert_eq!(p.life, p.max_life);
            assert_eq!((p.x, p.y), (200.0, 150.0));
        }
    }

    #[test]
    fn particle_ids_are_unique() {
        let mut system = particles(0.1);
        system.spawn(Point::new(1.0, 1.0), Mode::Calm);
        system.spawn(Point::new(2.0, 2.0), Mode::Calm);
        let mut ids: Vec<u64> =
            system.particles().iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 28);
    }

    #[test]
    fn floating_drifts_up_and_bouncing_hits_floor() {
        let s = surface();

        let mut floating = particles(0.0);
        floating.spawn(Point::new(100.0, 100.0), Mode::Calm);
        let vy = floating.particles()[0].vy;
        floating.step(&s, Mode::Calm);
        assert!(floating.particles()[0].vy < vy);

        let mut bouncing = particles(0.0);
        bouncing.set_style(ParticleStyle::Bouncing);
        bouncing.spawn(Point::new(100.0, s.height() - 7.5), Mode::Calm);
        bouncing.step(&s, Mode::Calm);
        let p = &bouncing.particles()[0];
        assert_eq!(p.y, s.height() - 8.0);
        assert!(p.vy < 0.0);
    }

    #[test]
    fn expired_particles_are_culled() {
        let s = surface();
        let mut system = particles(0.0);
        system.spawn(Point::new(100.0, 100.0), Mode::Chaotic);

        for _ in 0..10 {
            system.step(&s, Mode::Chaotic);
        }
        assert_eq!(system.particles().len(), 34);
        assert!(system.particles()[0].alpha() < 1.0);

        for _ in 0..60 {
            system.step(&s, Mode::Chaotic);
        }
        assert!(system.particles().is_empty());
    }

    #[test]
    fn outside_pointer_never_spawns() {
        let s = surface();
        let mut router = InputRouter::new();
        let mut system = particles(0.5);

        for input in [
            PointerInput::Moved(Point::new(-5.0, 20.0)),
            PointerInput::Pressed(Point::new(500.0, 20.0)),
            PointerInput::Released(Point::new(500.0, 20.0)),
        ] {
            if let Some(event) = router.route(input, &s) {
                system.pointer(event, &ctx(Mode::Chaotic));
            }
        }
        assert!(system.particles().is_empty());
    }
}
