use nannou::prelude::{App, Draw, Key};
use nannou::wgpu;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::path::PathBuf;

use playground::prelude::*;

pub const EXPERIENCE_CONFIG: ExperienceConfig = ExperienceConfig {
    tab: Tab::Drawing,
    display_name: "Drawing",
};

pub const STROKES_KEY: &str = "playground_drawing_strokes_v1";

pub const BRUSH_COLORS: [&str; 5] =
    ["#f472b6", "#a78bfa", "#34d399", "#facc15", "#60a5fa"];

/// One persisted line segment. Replaying every stroke in order rebuilds the
/// canvas exactly.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Stroke {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub color: String,
    #[serde(rename = "size")]
    pub thickness: f32,
    #[serde(rename = "erase", default)]
    pub is_erase: bool,
}

impl Stroke {
    fn paint(&self) -> Paint {
        if self.is_erase {
            Paint::Erase
        } else {
            Paint::Color(HexColor::parse_or_black(&self.color))
        }
    }

    fn apply(&self, ink: &mut InkLayer) {
        ink.stroke_segment(
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y2),
            self.thickness,
            self.paint(),
        );
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BrushSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BrushSize {
    pub fn px(&self) -> f32 {
        match self {
            BrushSize::Small => 4.0,
            BrushSize::Medium => 8.0,
            BrushSize::Large => 14.0,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BrushSize::Small => "S",
            BrushSize::Medium => "M",
            BrushSize::Large => "L",
        }
    }

    fn smaller(&self) -> Self {
        match self {
            BrushSize::Large => BrushSize::Medium,
            _ => BrushSize::Small,
        }
    }

    fn larger(&self) -> Self {
        match self {
            BrushSize::Small => BrushSize::Medium,
            _ => BrushSize::Large,
        }
    }
}

pub struct Drawing {
    strokes: PersistentCanvasState<Stroke>,
    ink: Option<InkLayer>,
    texture: RefCell<Option<wgpu::Texture>>,
    texture_stale: Cell<bool>,
    anchor: Option<Point>,
    color_index: usize,
    size: BrushSize,
    erasing: bool,
    images_dir: PathBuf,
}

pub fn init(ctx: &MountContext) -> Drawing {
    let mut drawing = Drawing {
        strokes: PersistentCanvasState::load(ctx.storage.clone(), STROKES_KEY),
        ink: None,
        texture: RefCell::new(None),
        texture_stale: Cell::new(true),
        anchor: None,
        color_index: 0,
        size: BrushSize::default(),
        erasing: false,
        images_dir: ctx.images_dir.clone(),
    };
    drawing.rebuild_ink(&ctx.surface);
    drawing
}

impl Drawing {
    pub fn strokes(&self) -> &[Stroke] {
        self.strokes.entries()
    }

    pub fn ink(&self) -> Option<&InkLayer> {
        self.ink.as_ref()
    }

    pub fn brush_color(&self) -> &'static str {
        BRUSH_COLORS[self.color_index % BRUSH_COLORS.len()]
    }

    pub fn is_erasing(&self) -> bool {
        self.erasing
    }

    pub fn select_color(&mut self, index: usize) {
        self.color_index = index % BRUSH_COLORS.len();
        self.erasing = false;
    }

    pub fn set_size(&mut self, size: BrushSize) {
        self.size = size;
    }

    pub fn toggle_eraser(&mut self) {
        self.erasing = !self.erasing;
    }

    /// Recreate the ink layer for `surface` and replay every stroke into it
    fn rebuild_ink(&mut self, surface: &Surface) {
        let (w, h) = surface.pixel_size();
        self.ink = match InkLayer::new(w, h) {
            Ok(mut ink) => {
                for stroke in self.strokes.entries() {
                    stroke.apply(&mut ink);
                }
                Some(ink)
            }
            Err(e) => {
                warn!("Drawing surface unavailable: {}", e);
                None
            }
        };
        self.texture_stale.set(true);
    }

    fn add_segment(&mut self, to: Point, smoothing: f32) {
        let Some(anchor) = self.anchor else {
            return;
        };

        let stroke = Stroke {
            x1: anchor.x,
            y1: anchor.y,
            x2: to.x,
            y2: to.y,
            color: self.brush_color().to_string(),
            thickness: self.size.px(),
            is_erase: self.erasing,
        };
        let Some(ink) = self.ink.as_mut() else {
            return;
        };
        stroke.apply(ink);
        self.strokes.append(stroke);
        self.texture_stale.set(true);

        self.anchor = Some(anchor.lerp(to, smoothing));
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        if let Some(ink) = self.ink.as_mut() {
            ink.clear();
        }
        self.anchor = None;
        self.texture_stale.set(true);
    }

    /// Flatten the canvas over the themed background and write a PNG
    pub fn save(&self, theme: Theme) -> Result<PathBuf, Box<dyn Error>> {
        let ink = self.ink.as_ref().ok_or("Nothing to save")?;
        let mut image =
            theme::background_image(theme, ink.width(), ink.height());
        ink.composite_onto(&mut image);
        save_image(&image, &self.images_dir, "playground-drawing")
    }

    /// Sync the GPU copy of the ink layer. The texture is only reallocated
    /// when the layer size changes.
    fn upload_texture(&self, app: &App) {
        let Some(ink) = &self.ink else {
            return;
        };
        let ink_size = [ink.width(), ink.height()];
        let current = self.texture.borrow().as_ref().map(|t| t.size());
        let sync = texture_sync(current, ink_size, self.texture_stale.get());
        if sync == TextureSync::Current {
            return;
        }

        let window = app.main_window();
        let device = window.device();
        if sync == TextureSync::Allocate {
            let texture = wgpu::TextureBuilder::new()
                .size(ink_size)
                .format(wgpu::TextureFormat::Rgba8UnormSrgb)
                .usage(
                    wgpu::TextureUsages::COPY_DST
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                )
                .build(device);
            *self.texture.borrow_mut() = Some(texture);
        }

        if let Some(texture) = self.texture.borrow().as_ref() {
            let mut encoder = device.create_command_encoder(
                &wgpu::CommandEncoderDescriptor {
                    label: Some("drawing_ink_upload"),
                },
            );
            texture.upload_data(device, &mut encoder, ink.image().as_raw());
            window.queue().submit(std::iter::once(encoder.finish()));
        }
        self.texture_stale.set(false);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TextureSync {
    Current,
    Upload,
    Allocate,
}

fn texture_sync(
    texture_size: Option<[u32; 2]>,
    ink_size: [u32; 2],
    stale: bool,
) -> TextureSync {
    match texture_size {
        Some(size) if size == ink_size => {
            ternary!(stale, TextureSync::Upload, TextureSync::Current)
        }
        _ => TextureSync::Allocate,
    }
}

impl Experience for Drawing {
    fn view(&self, app: &App, draw: &Draw, ctx: &Context) {
        self.upload_texture(app);
        if let Some(texture) = self.texture.borrow().as_ref() {
            draw.texture(texture)
                .xy(ctx.surface.to_draw(ctx.surface.bounds().center()))
                .w_h(ctx.surface.width(), ctx.surface.height());
        }
    }

    fn pointer(&mut self, event: PointerEvent, ctx: &Context) {
        if self.ink.is_none() {
            return;
        }
        match event {
            PointerEvent::Press(p) => self.anchor = Some(p),
            PointerEvent::Drag(p) => {
                self.add_segment(p, ctx.settings.mode.stroke_smoothing())
            }
            PointerEvent::Release(_) | PointerEvent::Click(_) => {
                self.anchor = None
            }
            PointerEvent::Hover(_) => {}
        }
    }

    fn key_pressed(&mut self, key: Key, ctx: &Context) {
        match key {
            Key::C => self.select_color(self.color_index + 1),
            Key::E => self.toggle_eraser(),
            Key::LBracket => self.size = self.size.smaller(),
            Key::RBracket => self.size = self.size.larger(),
            Key::X => {
                self.clear();
                ctx.alert("Canvas cleared");
            }
            Key::P => match self.save(ctx.settings.theme) {
                Ok(path) => {
                    info!("Saved drawing to {}", path.display());
                    ctx.alert(format!("Saved {}", path.display()));
                }
                Err(e) => {
                    error!("Unable to save drawing: {}", e);
                    ctx.alert("Unable to save drawing");
                }
            },
            _ => {}
        }
    }

    fn resize(&mut self, ctx: &Context) {
        self.anchor = None;
        self.rebuild_ink(&ctx.surface);
    }

    fn teardown(&mut self) {
        self.ink = None;
        self.texture.borrow_mut().take();
    }

    fn status(&self, _ctx: &Context) -> String {
        let brush = ternary!(self.erasing, "eraser", self.brush_color());
        format!(
            "{} {} | {} strokes | C color  E eraser  [ ] size  X clear  P save",
            brush,
            self.size.label(),
            self.strokes.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiences::test_support::{ctx, mount_ctx};

    fn drag(drawing: &mut Drawing, from: Point, to: &[Point], mode: Mode) {
        let ctx = ctx(mode);
        drawing.pointer(PointerEvent::Press(from), &ctx);
        for p in to {
            drawing.pointer(PointerEvent::Drag(*p), &ctx);
        }
        drawing.pointer(PointerEvent::Release(*to.last().unwrap()), &ctx);
    }

    #[test]
    fn texture_is_reused_until_the_layer_resizes() {
        assert_eq!(
            texture_sync(None, [400, 300], false),
            TextureSync::Allocate
        );
        assert_eq!(
            texture_sync(Some([400, 300]), [400, 300], false),
            TextureSync::Current
        );
        assert_eq!(
            texture_sync(Some([400, 300]), [400, 300], true),
            TextureSync::Upload
        );
        assert_eq!(
            texture_sync(Some([400, 300]), [640, 480], true),
            TextureSync::Allocate
        );
    }

    #[test]
    fn single_drag_persists_one_stroke() {
        let storage = MemoryStore::shared();
        let mut drawing = init(&mount_ctx(storage.clone()));

        drag(
            &mut drawing,
            Point::new(10.0, 10.0),
            &[Point::new(50.0, 50.0)],
            Mode::Calm,
        );

        let json = storage.get(STROKES_KEY).unwrap().unwrap();
        let persisted: Vec<Stroke> = serde_json::from_str(&json).unwrap();
        assert_eq!(
            persisted,
            vec![Stroke {
                x1: 10.0,
                y1: 10.0,
                x2: 50.0,
                y2: 50.0,
                color: "#f472b6".into(),
                thickness: 8.0,
                is_erase: false,
            }]
        );

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["size"], 8.0);
        assert_eq!(value[0]["erase"], false);
    }

    #[test]
    fn anchor_trails_pointer_by_mode() {
        let storage = MemoryStore::shared();
        let mut drawing = init(&mount_ctx(storage));
        let points = [Point::new(50.0, 10.0), Point::new(60.0, 10.0)];

        drag(&mut drawing, Point::new(10.0, 10.0), &points, Mode::Calm);
        // 10 + 0.3 * (50 - 10)
        assert!((drawing.strokes()[1].x1 - 22.0).abs() < 1e-4);

        drawing.clear();
        drag(&mut drawing, Point::new(10.0, 10.0), &points, Mode::Chaotic);
        assert!((drawing.strokes()[1].x1 - 42.0).abs() < 1e-4);
    }

    #[test]
    fn strokes_reload_on_mount() {
        let storage = MemoryStore::shared();
        let mut drawing = init(&mount_ctx(storage.clone()));
        drag(
            &mut drawing,
            Point::new(20.0, 20.0),
            &[Point::new(80.0, 40.0), Point::new(120.0, 90.0)],
            Mode::Playful,
        );
        drawing.teardown();

        let reloaded = init(&mount_ctx(storage));
        assert_eq!(reloaded.strokes(), drawing.strokes());
        assert!(!reloaded.ink().unwrap().is_blank());
    }

    #[test]
    fn resize_replays_pixel_exact() {
        let storage = MemoryStore::shared();
        let mut drawing = init(&mount_ctx(storage));
        drag(
            &mut drawing,
            Point::new(30.0, 30.0),
            &[Point::new(200.0, 150.0), Point::new(380.0, 40.0)],
            Mode::Playful,
        );
        drawing.toggle_eraser();
        drawing.set_size(BrushSize::Large);
        drag(
            &mut drawing,
            Point::new(30.0, 150.0),
            &[Point::new(390.0, 30.0)],
            Mode::Playful,
        );

        let before = drawing.ink().unwrap().clone();
        let grown = Context::new(
            Settings::default(),
            Surface::new(640.0, 480.0).unwrap(),
        );
        drawing.resize(&grown);

        let after = drawing.ink().unwrap();
        assert_eq!((after.width(), after.height()), (640, 480));
        for y in 0..before.height() {
            for x in 0..before.width() {
                assert_eq!(before.pixel(x, y), after.pixel(x, y));
            }
        }
    }

    #[test]
    fn eraser_strokes_and_color_pick() {
        let storage = MemoryStore::shared();
        let mut drawing = init(&mount_ctx(storage));
        let ctx = ctx(Mode::Calm);

        drawing.key_pressed(Key::E, &ctx);
        assert!(drawing.is_erasing());
        drag(
            &mut drawing,
            Point::new(5.0, 5.0),
            &[Point::new(25.0, 5.0)],
            Mode::Calm,
        );
        assert!(drawing.strokes()[0].is_erase);

        drawing.key_pressed(Key::C, &ctx);
        assert!(!drawing.is_erasing());
        assert_eq!(drawing.brush_color(), "#a78bfa");
    }

    #[test]
    fn clear_empties_memory_and_storage() {
        let storage = MemoryStore::shared();
        let mut drawing = init(&mount_ctx(storage.clone()));
        drag(
            &mut drawing,
            Point::new(10.0, 10.0),
            &[Point::new(90.0, 90.0)],
            Mode::Calm,
        );
        drawing.key_pressed(Key::X, &ctx(Mode::Calm));

        assert!(drawing.strokes().is_empty());
        assert!(drawing.ink().unwrap().is_blank());
        assert_eq!(storage.get(STROKES_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn erase_flag_defaults_when_missing() {
        let stroke: Stroke = serde_json::from_str(
            r##"{"x1":1,"y1":2,"x2":3,"y2":4,"color":"#34d399","size":4}"##,
        )
        .unwrap();
        assert!(!stroke.is_erase);
        assert_eq!(stroke.thickness, 4.0);
    }

    #[test]
    fn empty_surface_is_inert() {
        let storage = MemoryStore::shared();
        let mut mount = mount_ctx(storage.clone());
        mount.surface = Surface::EMPTY;
        let mut drawing = init(&mount);
        assert!(drawing.ink().is_none());

        drag(
            &mut drawing,
            Point::new(0.0, 0.0),
            &[Point::new(1.0, 1.0)],
            Mode::Calm,
        );
        assert!(drawing.strokes().is_empty());
        assert_eq!(storage.get(STROKES_KEY).unwrap(), None);
    }
}
