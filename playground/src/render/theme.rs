use nannou::image::{Rgba, RgbaImage};
use nannou::prelude::Draw;

use super::color::HexColor;
use super::surface::{Point, Surface};
use crate::runtime::settings::Theme;

const GRADIENT_BANDS: usize = 48;
const WASH: HexColor = HexColor::rgba(255, 255, 255, 40);

/// Top, middle and bottom stops of the vertical background gradient
pub fn background_stops(theme: Theme) -> [HexColor; 3] {
    match theme {
        Theme::Pastel => [
            HexColor::rgb(0xfc, 0xe7, 0xf3),
            HexColor::rgb(0xe9, 0xd5, 0xff),
            HexColor::rgb(0xa7, 0xf3, 0xd0),
        ],
        Theme::Dark => [
            HexColor::rgb(0x1f, 0x29, 0x37),
            HexColor::rgb(0x0f, 0x17, 0x2a),
            HexColor::rgb(0x11, 0x18, 0x27),
        ],
        Theme::Neon => [
            HexColor::rgb(0x0b, 0x10, 0x20),
            HexColor::rgb(0x19, 0x20, 0x3a),
            HexColor::rgb(0x0b, 0x10, 0x20),
        ],
        Theme::Magical => [
            HexColor::rgb(0xf0, 0xab, 0xfc),
            HexColor::rgb(0xa7, 0x8b, 0xfa),
            HexColor::rgb(0x60, 0xa5, 0xfa),
        ],
    }
}

/// Sample the gradient at `t` where 0 is the top edge and 1 the bottom
pub fn gradient_at(theme: Theme, t: f32) -> HexColor {
    let [top, mid, bottom] = background_stops(theme);
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        top.lerp(&mid, t * 2.0)
    } else {
        mid.lerp(&bottom, (t - 0.5) * 2.0)
    }
}

pub fn is_dark(theme: Theme) -> bool {
    matches!(theme, Theme::Dark | Theme::Neon)
}

pub fn text_color(theme: Theme) -> HexColor {
    if is_dark(theme) {
        HexColor::rgb(0xe5, 0xe7, 0xeb)
    } else {
        HexColor::rgb(0x37, 0x41, 0x51)
    }
}

pub fn accent_color(theme: Theme) -> HexColor {
    match theme {
        Theme::Pastel => HexColor::rgb(0xf4, 0x72, 0xb6),
        Theme::Dark => HexColor::rgb(0x60, 0xa5, 0xfa),
        Theme::Neon => HexColor::rgb(0x7a, 0xfc, 0xff),
        Theme::Magical => HexColor::rgb(0xfa, 0xcc, 0x15),
    }
}

pub fn draw_background(draw: &Draw, surface: &Surface, theme: Theme) {
    if surface.is_empty() {
        return;
    }

    let band_height = surface.height() / GRADIENT_BANDS as f32;
    for band in 0..GRADIENT_BANDS {
        let top = band as f32 * band_height;
        let t = (band as f32 + 0.5) / GRADIENT_BANDS as f32;
        let center = Point::new(surface.width() / 2.0, top + band_height / 2.0);
        draw.rect()
            .xy(surface.to_draw(center))
            // Overlap by a pixel so bands never leave seams
            .w_h(surface.width(), band_height + 1.0)
            .color(gradient_at(theme, t).to_srgba());
    }

    draw.rect()
        .xy(surface.to_draw(surface.bounds().center()))
        .w_h(surface.width(), surface.height())
        .color(WASH.to_srgba());
}

/// Rasterize the themed background (gradient plus wash) on the CPU, used as
/// the base for saved images
pub fn background_image(theme: Theme, width: u32, height: u32) -> RgbaImage {
    let rows: Vec<[u8; 4]> = (0..height)
        .map(|y| {
            let t = (y as f32 + 0.5) / height.max(1) as f32;
            let base = gradient_at(theme, t);
            base.lerp(&WASH.with_alpha(255), WASH.a as f32 / 255.0)
                .with_alpha(255)
                .to_array()
        })
        .collect();

    RgbaImage::from_fn(width, height, |_, y| Rgba(rows[y as usize]))
}
