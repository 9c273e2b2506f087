use nannou::glam::Vec2;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use crate::core::util::lerp;

/// Largest edge a drawing surface or ink layer may have
pub const MAX_SURFACE_EDGE: u32 = 8192;

/// A position in surface space: origin at the top-left corner, y grows
/// downward, units are pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(&self, other: Point, t: f32) -> Point {
        Point::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle in surface space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x
            && p.x <= self.x + self.w
            && p.y >= self.y
            && p.y <= self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceError {
    Invalid { w: f32, h: f32 },
    Empty { w: u32, h: u32 },
    TooLarge { w: u32, h: u32 },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::Invalid { w, h } => {
                write!(f, "invalid surface dimensions {}x{}", w, h)
            }
            SurfaceError::Empty { w, h } => {
                write!(f, "surface has no area ({}x{})", w, h)
            }
            SurfaceError::TooLarge { w, h } => write!(
                f,
                "surface {}x{} exceeds the {} px edge limit",
                w, h, MAX_SURFACE_EDGE
            ),
        }
    }
}

impl Error for SurfaceError {}

/// The drawable area an experience is mounted into. A zero-sized surface is
/// legal (e.g. a minimized window) and simply contains no points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Surface {
    width: f32,
    height: f32,
}

impl Surface {
    pub const EMPTY: Surface = Surface {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Result<Self, SurfaceError> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0
        {
            return Err(SurfaceError::Invalid {
                w: width,
                h: height,
            });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width.round() as u32, self.height.round() as u32)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Inclusive on all edges. An empty surface contains nothing.
    pub fn contains(&self, p: Point) -> bool {
        !self.is_empty() && self.bounds().contains(p)
    }

    /// Convert nannou window coordinates (origin at center, y up) into
    /// surface space
    pub fn from_window(&self, v: Vec2) -> Point {
        Point::new(v.x + self.width / 2.0, self.height / 2.0 - v.y)
    }

    /// Convert a surface point into nannou draw coordinates
    pub fn to_draw(&self, p: Point) -> Vec2 {
        Vec2::new(p.x - self.width / 2.0, self.height / 2.0 - p.y)
    }
}
