use nannou::prelude::{App, Draw, Key, Vec2};
use serde::{Deserialize, Serialize};

use playground::prelude::*;

pub const EXPERIENCE_CONFIG: ExperienceConfig = ExperienceConfig {
    tab: Tab::Garden,
    display_name: "Shape Garden",
};

pub const GARDEN_KEY: &str = "playground_shape_garden_v1";

pub const GARDEN_COLORS: [&str; 6] =
    ["#fbcfe8", "#e9d5ff", "#a7f3d0", "#fef9c3", "#c7d2fe", "#ffd6e7"];

const MIN_RADIUS: f32 = 12.0;
const MAX_RADIUS: f32 = 40.0;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Leaf,
    Flower,
    #[serde(alias = "cloud")]
    Stem,
    Grass,
    Circle,
    Triangle,
    Square,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GardenMode {
    #[default]
    Nature,
    Abstract,
}

impl GardenMode {
    pub fn kinds(&self) -> &'static [ShapeKind] {
        match self {
            GardenMode::Nature => &[
                ShapeKind::Leaf,
                ShapeKind::Flower,
                ShapeKind::Stem,
                ShapeKind::Grass,
            ],
            GardenMode::Abstract => &[
                ShapeKind::Circle,
                ShapeKind::Triangle,
                ShapeKind::Square,
            ],
        }
    }

    fn toggled(&self) -> Self {
        ternary!(
            *self == GardenMode::Nature,
            GardenMode::Abstract,
            GardenMode::Nature
        )
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ShapePlacement {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "r")]
    pub radius: f32,
    #[serde(rename = "rot")]
    pub rotation: f32,
    pub color: String,
    pub kind: ShapeKind,
}

pub struct Garden {
    shapes: PersistentCanvasState<ShapePlacement>,
    mode: GardenMode,
    rng: Box<dyn RandomSource>,
}

pub fn init(ctx: &MountContext) -> Garden {
    Garden::new(ctx.storage.clone(), Box::new(ThreadRandom))
}

impl Garden {
    pub fn new(storage: SharedStore, rng: Box<dyn RandomSource>) -> Self {
        Self {
            shapes: PersistentCanvasState::load(storage, GARDEN_KEY),
            mode: GardenMode::default(),
            rng,
        }
    }

    pub fn shapes(&self) -> &[ShapePlacement] {
        self.shapes.entries()
    }

    pub fn mode(&self) -> GardenMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GardenMode) {
        self.mode = mode;
    }

    /// Append one shape at `at`. Ids continue from the largest stored id;
    /// returns false when no id is left.
    pub fn plant(&mut self, at: Point) -> bool {
        let last_id = self.shapes.entries().iter().map(|s| s.id).max();
        let Some(id) = last_id.unwrap_or(0).checked_add(1) else {
            warn!("Garden ids exhausted, reset the garden to keep planting");
            return false;
        };

        let rng = self.rng.as_mut();
        let Some(kind) = pick(&mut *rng, self.mode.kinds()).copied() else {
            return false;
        };
        let color = pick(&mut *rng, &GARDEN_COLORS)
            .copied()
            .unwrap_or(GARDEN_COLORS[0]);
        let radius = rng.range(MIN_RADIUS, MAX_RADIUS);
        let rotation = rng.range(0.0, TWO_PI);
        self.shapes.append(ShapePlacement {
            id,
            x: at.x,
            y: at.y,
            radius,
            rotation,
            color: color.to_string(),
            kind,
        });
        true
    }

    pub fn reset(&mut self) {
        self.shapes.clear();
    }

    fn draw_shape(
        &self,
        draw: &Draw,
        surface: &Surface,
        shape: &ShapePlacement,
    ) {
        let center = surface.to_draw(Point::new(shape.x, shape.y));
        let color = HexColor::parse(&shape.color).unwrap_or(FALLBACK);
        let fill = color.to_srgba();
        let r = shape.radius;
        // Surface y points down, so rotations flip sign in draw space
        let rot = -shape.rotation;
        let draw = draw.translate(center.extend(0.0)).rotate(rot);

        match shape.kind {
            ShapeKind::Circle => {
                draw.ellipse().radius(r).color(fill);
            }
            ShapeKind::Square => {
                draw.rect().w_h(r * 1.6, r * 1.6).color(fill);
            }
            ShapeKind::Triangle => {
                let points = (0..3).map(|i| {
                    let a = TWO_PI * i as f32 / 3.0 + TWO_PI / 4.0;
                    Vec2::new(a.cos() * r, a.sin() * r)
                });
                draw.polygon().points(points).color(fill);
            }
            ShapeKind::Leaf => {
                draw.ellipse().w_h(r * 1.8, r * 0.8).color(fill);
                draw.line()
                    .start(Vec2::new(-r * 0.9, 0.0))
                    .end(Vec2::new(r * 0.9, 0.0))
                    .weight(1.5)
                    .color(color.lerp(&OUTLINE, 0.4).to_srgba());
            }
            ShapeKind::Flower => {
                for i in 0..5 {
                    let a = TWO_PI * i as f32 / 5.0;
                    draw.ellipse()
                        .xy(Vec2::new(a.cos(), a.sin()) * r * 0.55)
                        .radius(r * 0.45)
                        .color(fill);
                }
                draw.ellipse()
                    .radius(r * 0.3)
                    .color(FLOWER_CENTER.to_srgba());
            }
            ShapeKind::Stem => {
                let stroke = color.lerp(&OUTLINE, 0.3).to_srgba();
                draw.line()
                    .start(Vec2::new(0.0, -r))
                    .end(Vec2::new(0.0, r))
                    .weight(3.0)
                    .color(stroke);
                draw.ellipse()
                    .xy(Vec2::new(r * 0.35, r * 0.2))
                    .w_h(r * 0.7, r * 0.3)
                    .color(fill);
            }
            ShapeKind::Grass => {
                let stroke = color.lerp(&OUTLINE, 0.3).to_srgba();
                for lean in [-0.5, 0.0, 0.5] {
                    draw.line()
                        .start(Vec2::new(lean * r * 0.4, -r * 0.6))
                        .end(Vec2::new(lean * r, r))
                        .weight(2.0)
                        .color(stroke);
                }
            }
        }
    }
}

const OUTLINE: HexColor = HexColor::rgb(0x4b, 0x55, 0x63);
const FLOWER_CENTER: HexColor = HexColor::rgb(0xfa, 0xcc, 0x15);
const FALLBACK: HexColor = HexColor::rgb(0xfb, 0xcf, 0xe8);

impl Experience for Garden {
    fn view(&self, _app: &App, draw: &Draw, ctx: &Context) {
        for shape in self.shapes.entries() {
            self.draw_shape(draw, &ctx.surface, shape);
        }
    }

    fn pointer(&mut self, event: PointerEvent, _ctx: &Context) {
        if let PointerEvent::Click(p) = event {
            self.plant(p);
        }
    }

    fn key_pressed(&mut self, key: Key, ctx: &Context) {
        match key {
            Key::M => self.mode = self.mode.toggled(),
            Key::R => {
                self.reset();
                ctx.alert("Garden reset");
            }
            _ => {}
        }
    }

    fn status(&self, _ctx: &Context) -> String {
        format!(
            "{:?} | {} shapes | M mode  R reset",
            self.mode,
            self.shapes.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiences::test_support::{ctx, surface};

    fn garden(storage: SharedStore, sample: f32) -> Garden {
        Garden::new(storage, Box::new(SequenceRandom::constant(sample)))
    }

    #[test]
    fn three_abstract_clicks_persist_three_shapes() {
        let storage = MemoryStore::shared();
        let mut garden = garden(storage.clone(), 0.5);
        garden.set_mode(GardenMode::Abstract);
        let ctx = ctx(Mode::Calm);

        for x in [40.0, 120.0, 200.0] {
            garden.pointer(PointerEvent::Click(Point::new(x, 80.0)), &ctx);
        }

        let json = storage.get(GARDEN_KEY).unwrap().unwrap();
        let persisted: Vec<ShapePlacement> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(persisted.len(), 3);
        assert!(
            persisted
                .iter()
                .all(|s| GardenMode::Abstract.kinds().contains(&s.kind))
        );
        assert_eq!(
            persisted.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "triangle");
        assert!(value[0]["r"].is_number());
        assert!(value[0]["rot"].is_number());
    }

    #[test]
    fn placement_ranges() {
        let storage = MemoryStore::shared();
        let mut garden = garden(storage, 0.99);
        garden.plant(Point::new(10.0, 10.0));

        let shape = &garden.shapes()[0];
        assert!(shape.radius >= MIN_RADIUS && shape.radius < MAX_RADIUS);
        assert!(shape.rotation >= 0.0 && shape.rotation < TWO_PI);
        assert_eq!(shape.kind, ShapeKind::Grass);
        assert_eq!(shape.color, "#ffd6e7");
    }

    #[test]
    fn drags_and_hovers_do_not_plant() {
        let mut garden = garden(MemoryStore::shared(), 0.2);
        let ctx = ctx(Mode::Chaotic);
        garden.pointer(PointerEvent::Hover(Point::new(5.0, 5.0)), &ctx);
        garden.pointer(PointerEvent::Drag(Point::new(5.0, 5.0)), &ctx);
        garden.pointer(PointerEvent::Release(Point::new(5.0, 5.0)), &ctx);
        assert!(garden.shapes().is_empty());
    }

    #[test]
    fn outside_click_never_plants() {
        let s = surface();
        let mut router = InputRouter::new();
        let mut garden = garden(MemoryStore::shared(), 0.2);

        for input in [
            PointerInput::Pressed(Point::new(10.0, 400.0)),
            PointerInput::Released(Point::new(10.0, 400.0)),
        ] {
            if let Some(event) = router.route(input, &s) {
                garden.pointer(event, &ctx(Mode::Calm));
            }
        }
        assert!(garden.shapes().is_empty());
    }

    #[test]
    fn reset_clears_storage_and_reload_restores() {
        let storage = MemoryStore::shared();
        let mut first = garden(storage.clone(), 0.3);
        first.plant(Point::new(10.0, 10.0));
        first.plant(Point::new(20.0, 20.0));

        let mut second = garden(storage.clone(), 0.3);
        assert_eq!(second.shapes(), first.shapes());
        second.plant(Point::new(30.0, 30.0));
        assert_eq!(second.shapes()[2].id, 3);

        second.key_pressed(Key::R, &ctx(Mode::Calm));
        assert!(second.shapes().is_empty());
        assert_eq!(storage.get(GARDEN_KEY).unwrap().unwrap(), "[]");
    }

    #[test]
    fn cloud_reads_as_stem() {
        let json = r##"[{"id":7,"x":1,"y":2,"r":20,"rot":0.5,
            "color":"#fbcfe8","kind":"cloud"}]"##;
        let storage = MemoryStore::shared();
        storage.set(GARDEN_KEY, json).unwrap();

        let garden = garden(storage, 0.0);
        assert_eq!(garden.shapes()[0].kind, ShapeKind::Stem);
    }

    #[test]
    fn exhausted_ids_skip_planting() {
        let json = r##"[{"id":18446744073709551615,"x":1,"y":2,"r":20,
            "rot":0.5,"color":"#fbcfe8","kind":"leaf"}]"##;
        let storage = MemoryStore::shared();
        storage.set(GARDEN_KEY, json).unwrap();

        let mut garden = garden(storage.clone(), 0.4);
        assert_eq!(garden.shapes().len(), 1);

        let click = PointerEvent::Click(Point::new(5.0, 5.0));
        garden.pointer(click, &ctx(Mode::Calm));
        assert!(!garden.plant(Point::new(6.0, 6.0)));
        assert_eq!(garden.shapes().len(), 1);
        assert_eq!(garden.shapes()[0].id, u64::MAX);

        garden.reset();
        assert!(garden.plant(Point::new(6.0, 6.0)));
        assert_eq!(garden.shapes()[0].id, 1);
    }

    #[test]
    fn mode_key_toggles_kind_set() {
        let mut garden = garden(MemoryStore::shared(), 0.0);
        let ctx = ctx(Mode::Calm);
        assert_eq!(garden.mode(), GardenMode::Nature);
        garden.key_pressed(Key::M, &ctx);
        garden.plant(Point::new(1.0, 1.0));
        assert_eq!(garden.shapes()[0].kind, ShapeKind::Circle);
    }
}
