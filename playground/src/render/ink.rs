//! An accumulating offscreen RGBA layer for freehand ink. Segments are
//! rasterized as anti-aliased capsules (round caps) directly into a CPU image
//! so the layer can be replayed pixel-exactly and uploaded as a texture.

use nannou::image::RgbaImage;

use super::color::HexColor;
use super::surface::{MAX_SURFACE_EDGE, Point, SurfaceError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    /// Normal source-over painting
    Color(HexColor),
    /// Destination-out compositing: removes existing ink under the brush
    Erase,
}

#[derive(Clone, Debug)]
pub struct InkLayer {
    image: RgbaImage,
}

impl InkLayer {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::Empty {
                w: width,
                h: height,
            });
        }
        if width > MAX_SURFACE_EDGE || height > MAX_SURFACE_EDGE {
            return Err(SurfaceError::TooLarge {
                w: width,
                h: height,
            });
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width() && y < self.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            pixel.0 = [0, 0, 0, 0];
        }
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    /// Composite this layer over `base` (source-over), aligned at the
    /// top-left corner. Pixels outside `base` are ignored.
    pub fn composite_onto(&self, base: &mut RgbaImage) {
        let width = self.width().min(base.width());
        let height = self.height().min(base.height());
        for y in 0..height {
            for x in 0..width {
                let [r, g, b, a] = self.image.get_pixel(x, y).0;
                if a == 0 {
                    continue;
                }
                let dst = base.get_pixel_mut(x, y);
                dst.0 = source_over(dst.0, HexColor::rgba(r, g, b, a), 1.0);
            }
        }
    }

    pub fn stroke_segment(
        &mut self,
        from: Point,
        to: Point,
        thickness: f32,
        paint: Paint,
    ) {
        let radius = (thickness / 2.0).max(0.5);
        let pad = radius + 1.0;

        let min_x = (from.x.min(to.x) - pad).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - pad).floor().max(0.0) as u32;
        let max_x =
            ((from.x.max(to.x) + pad).ceil().max(0.0) as u32).min(self.width());
        let max_y = ((from.y.max(to.y) + pad).ceil().max(0.0) as u32)
            .min(self.height());

        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = distance_to_segment(center, from, to);
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }

                let pixel = self.image.get_pixel_mut(x, y);
                pixel.0 = match paint {
                    Paint::Color(color) => source_over(pixel.0, color, coverage),
                    Paint::Erase => destination_out(pixel.0, coverage),
                };
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

// Straight (non-premultiplied) alpha "over" operator
fn source_over(dst: [u8; 4], src: HexColor, coverage: f32) -> [u8; 4] {
    let sa = coverage * src.a as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let channel = |s: u8, d: u8| {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    [
        channel(src.r, dst[0]),
        channel(src.g, dst[1]),
        channel(src.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ]
}

fn destination_out(dst: [u8; 4], coverage: f32) -> [u8; 4] {
    let alpha = (dst[3] as f32 * (1.0 - coverage)).round() as u8;
    if alpha == 0 {
        [0, 0, 0, 0]
    } else {
        [dst[0], dst[1], dst[2], alpha]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PINK: HexColor = HexColor::rgb(0xf4, 0x72, 0xb6);

    #[test]
    fn rejects_empty_and_oversized_layers() {
        assert!(matches!(
            InkLayer::new(0, 10),
            Err(SurfaceError::Empty { .. })
        ));
        assert!(matches!(
            InkLayer::new(MAX_SURFACE_EDGE + 1, 10),
            Err(SurfaceError::TooLarge { .. })
        ));
    }

    #[test]
    fn segment_paints_opaque_core() {
        let mut layer = InkLayer::new(64, 64).unwrap();
        layer.stroke_segment(
            Point::new(10.0, 10.0),
            Point::new(50.0, 50.0),
            8.0,
            Paint::Color(PINK),
        );

        assert_eq!(layer.pixel(30, 30), Some([0xf4, 0x72, 0xb6, 255]));
        assert_eq!(layer.pixel(60, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn round_caps_cover_endpoints() {
        let mut layer = InkLayer::new(32, 32).unwrap();
        layer.stroke_segment(
            Point::new(16.0, 16.0),
            Point::new(16.0, 16.0),
            10.0,
            Paint::Color(PINK),
        );

        assert_eq!(layer.pixel(16, 16).map(|p| p[3]), Some(255));
        assert_eq!(layer.pixel(16, 12).map(|p| p[3]), Some(255));
        assert_eq!(layer.pixel(0, 0).map(|p| p[3]), Some(0));
    }

    #[test]
    fn erase_removes_existing_ink() {
        let mut layer = InkLayer::new(64, 64).unwrap();
        let (a, b) = (Point::new(5.0, 32.0), Point::new(60.0, 32.0));
        layer.stroke_segment(a, b, 8.0, Paint::Color(PINK));
        layer.stroke_segment(a, b, 14.0, Paint::Erase);

        assert!(layer.is_blank());
    }

    #[test]
    fn compositing_order_matters() {
        let (a, b) = (Point::new(5.0, 32.0), Point::new(60.0, 32.0));

        let mut paint_then_erase = InkLayer::new(64, 64).unwrap();
        paint_then_erase.stroke_segment(a, b, 8.0, Paint::Color(PINK));
        paint_then_erase.stroke_segment(a, b, 8.0, Paint::Erase);

        let mut erase_then_paint = InkLayer::new(64, 64).unwrap();
        erase_then_paint.stroke_segment(a, b, 8.0, Paint::Erase);
        erase_then_paint.stroke_segment(a, b, 8.0, Paint::Color(PINK));

        assert_eq!(paint_then_erase.pixel(30, 32).map(|p| p[3]), Some(0));
        assert_eq!(erase_then_paint.pixel(30, 32).map(|p| p[3]), Some(255));
    }

    #[test]
    fn replay_on_larger_layer_is_pixel_exact() {
        let segments = [
            (Point::new(10.0, 10.0), Point::new(50.0, 50.0), Paint::Color(PINK)),
            (Point::new(50.0, 10.0), Point::new(10.0, 50.0), Paint::Erase),
            (
                Point::new(5.0, 30.0),
                Point::new(55.0, 30.0),
                Paint::Color(HexColor::rgb(0x34, 0xd3, 0x99)),
            ),
        ];

        let mut small = InkLayer::new(64, 64).unwrap();
        let mut large = InkLayer::new(128, 96).unwrap();
        for (from, to, paint) in segments {
            small.stroke_segment(from, to, 8.0, paint);
            large.stroke_segment(from, to, 8.0, paint);
        }

        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(small.pixel(x, y), large.pixel(x, y), "({x},{y})");
            }
        }
    }

    #[test]
    fn composites_over_opaque_base() {
        let mut layer = InkLayer::new(8, 8).unwrap();
        layer.stroke_segment(
            Point::new(0.0, 4.0),
            Point::new(8.0, 4.0),
            4.0,
            Paint::Color(PINK),
        );

        let mut base =
            RgbaImage::from_pixel(8, 8, nannou::image::Rgba([0, 0, 0, 255]));
        layer.composite_onto(&mut base);

        assert_eq!(base.get_pixel(4, 4).0, [0xf4, 0x72, 0xb6, 255]);
        assert_eq!(base.get_pixel(4, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn clear_blanks_layer() {
        let mut layer = InkLayer::new(16, 16).unwrap();
        layer.stroke_segment(
            Point::new(0.0, 0.0),
            Point::new(16.0, 16.0),
            4.0,
            Paint::Color(PINK),
        );
        assert!(!layer.is_blank());
        layer.clear();
        assert!(layer.is_blank());
    }
}
