use nannou::prelude::{App, Draw, Key};

use playground::prelude::*;

pub const EXPERIENCE_CONFIG: ExperienceConfig = ExperienceConfig {
    tab: Tab::Customization,
    display_name: "Customize",
};

const MARGIN: f32 = 24.0;
const CONTENT_TOP: f32 = 52.0;
const GAP: f32 = 12.0;
const MAX_GRID_WIDTH: f32 = 420.0;
const SWATCH_HEIGHT: f32 = 72.0;
const BUTTON_HEIGHT: f32 = 36.0;
const SWATCH_BANDS: usize = 12;

/// Hit regions for the theme swatches (2x2) and the mode button row
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub swatches: [(Theme, Bounds); 4],
    pub modes: [(Mode, Bounds); 3],
}

impl Layout {
    pub fn new(surface: &Surface) -> Self {
        let grid_w =
            (surface.width() - MARGIN * 2.0).clamp(0.0, MAX_GRID_WIDTH);
        let swatch_w = ((grid_w - GAP) / 2.0).max(0.0);
        let button_w = ((grid_w - GAP * 2.0) / 3.0).max(0.0);

        let swatches = Theme::ALL.map(|theme| {
            let i = theme_index(theme);
            let col = (i % 2) as f32;
            let row = (i / 2) as f32;
            let bounds = Bounds::new(
                MARGIN + col * (swatch_w + GAP),
                CONTENT_TOP + row * (SWATCH_HEIGHT + GAP),
                swatch_w,
                SWATCH_HEIGHT,
            );
            (theme, bounds)
        });

        let buttons_top = CONTENT_TOP + (SWATCH_HEIGHT + GAP) * 2.0 + GAP * 2.0;
        let modes = Mode::ALL.map(|mode| {
            let i = Mode::ALL.iter().position(|m| *m == mode).unwrap_or(0);
            let bounds = Bounds::new(
                MARGIN + i as f32 * (button_w + GAP),
                buttons_top,
                button_w,
                BUTTON_HEIGHT,
            );
            (mode, bounds)
        });

        Self { swatches, modes }
    }

    pub fn theme_at(&self, p: Point) -> Option<Theme> {
        self.swatches
            .iter()
            .find(|(_, bounds)| bounds.contains(p))
            .map(|(theme, _)| *theme)
    }

    pub fn mode_at(&self, p: Point) -> Option<Mode> {
        self.modes
            .iter()
            .find(|(_, bounds)| bounds.contains(p))
            .map(|(mode, _)| *mode)
    }
}

fn theme_index(theme: Theme) -> usize {
    Theme::ALL.iter().position(|t| *t == theme).unwrap_or(0)
}

pub struct Customization {
    settings: SettingsStore,
    layout: Layout,
}

pub fn init(ctx: &MountContext) -> Customization {
    Customization {
        settings: ctx.settings.clone(),
        layout: Layout::new(&ctx.surface),
    }
}

impl Customization {
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn draw_swatch(&self, draw: &Draw, surface: &Surface, theme: Theme) {
        let Some((_, bounds)) =
            self.layout.swatches.iter().find(|(t, _)| *t == theme)
        else {
            return;
        };

        let band_h = bounds.h / SWATCH_BANDS as f32;
        for i in 0..SWATCH_BANDS {
            let t = (i as f32 + 0.5) / SWATCH_BANDS as f32;
            let band = Point::new(
                bounds.x + bounds.w / 2.0,
                bounds.y + band_h * (i as f32 + 0.5),
            );
            draw.rect()
                .xy(surface.to_draw(band))
                .w_h(bounds.w, band_h + 0.5)
                .color(theme::gradient_at(theme, t).to_srgba());
        }

        draw.text(theme.name())
            .xy(surface.to_draw(bounds.center()))
            .w_h(bounds.w, bounds.h)
            .font_size(14)
            .center_justify()
            .color(theme::text_color(theme).to_srgba());
    }
}

impl Experience for Customization {
    fn view(&self, _app: &App, draw: &Draw, ctx: &Context) {
        let surface = &ctx.surface;
        let current = ctx.settings;
        let accent = theme::accent_color(current.theme);
        let text = theme::text_color(current.theme);

        for (theme, bounds) in &self.layout.swatches {
            self.draw_swatch(draw, surface, *theme);
            if *theme == current.theme {
                draw.rect()
                    .xy(surface.to_draw(bounds.center()))
                    .w_h(bounds.w + 6.0, bounds.h + 6.0)
                    .no_fill()
                    .stroke_weight(3.0)
                    .stroke(accent.to_srgba());
            }
        }

        for (mode, bounds) in &self.layout.modes {
            let selected = *mode == current.mode;
            let fill =
                ternary!(selected, accent, HexColor::rgba(255, 255, 255, 110));
            draw.rect()
                .xy(surface.to_draw(bounds.center()))
                .w_h(bounds.w, bounds.h)
                .color(fill.to_srgba());
            draw.text(mode.name())
                .xy(surface.to_draw(bounds.center()))
                .w_h(bounds.w, bounds.h)
                .font_size(13)
                .center_justify()
                .color(text.to_srgba());
        }
    }

    fn pointer(&mut self, event: PointerEvent, _ctx: &Context) {
        let PointerEvent::Click(p) = event else {
            return;
        };
        if let Some(theme) = self.layout.theme_at(p) {
            self.settings.set_theme(theme);
        } else if let Some(mode) = self.layout.mode_at(p) {
            self.settings.set_mode(mode);
        }
    }

    fn key_pressed(&mut self, key: Key, _ctx: &Context) {
        match key {
            Key::T => {
                let next = (theme_index(self.settings.theme()) + 1)
                    % Theme::ALL.len();
                self.settings.set_theme(Theme::ALL[next]);
            }
            Key::M => {
                let mode = self.settings.mode();
                let index =
                    Mode::ALL.iter().position(|m| *m == mode).unwrap_or(0);
                let next = Mode::ALL[(index + 1) % Mode::ALL.len()];
                self.settings.set_mode(next);
            }
            _ => {}
        }
    }

    fn resize(&mut self, ctx: &Context) {
        self.layout = Layout::new(&ctx.surface);
    }

    fn status(&self, ctx: &Context) -> String {
        format!(
            "{} theme | {} mode | click a swatch or mode  T theme  M mode",
            ctx.settings.theme,
            ctx.settings.mode.name()
        )
    }
}
