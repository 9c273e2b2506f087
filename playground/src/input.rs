//! Translate raw pointer input into gesture-level events. Coordinates are
//! surface pixels (origin top-left, y down).

use crate::render::surface::{Point, Surface};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Pressed(Point),
    Moved(Point),
    Released(Point),
    /// The pointer left the window
    Exited,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// A gesture started inside the surface
    Press(Point),
    /// Pointer moved inside the surface while a gesture is active
    Drag(Point),
    /// A gesture with at least one drag ended inside the surface
    Release(Point),
    /// A gesture with no drags ended inside the surface
    Click(Point),
    /// Pointer moved inside the surface with no gesture active
    Hover(Point),
}

impl PointerEvent {
    pub fn point(&self) -> Point {
        match *self {
            PointerEvent::Press(p)
            | PointerEvent::Drag(p)
            | PointerEvent::Release(p)
            | PointerEvent::Click(p)
            | PointerEvent::Hover(p) => p,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Gesture {
    dragged: bool,
}

#[derive(Debug, Default)]
pub struct InputRouter {
    gesture: Option<Gesture>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn reset(&mut self) {
        self.gesture = None;
    }

    pub fn route(
        &mut self,
        input: PointerInput,
        surface: &Surface,
    ) -> Option<PointerEvent> {
        match input {
            PointerInput::Pressed(p) => {
                if !surface.contains(p) {
                    self.gesture = None;
                    return None;
                }
                self.gesture = Some(Gesture { dragged: false });
                Some(PointerEvent::Press(p))
            }
            PointerInput::Moved(p) => {
                // Leaving the surface ends any gesture without an event
                if !surface.contains(p) {
                    self.gesture = None;
                    return None;
                }
                match self.gesture.as_mut() {
                    Some(gesture) => {
                        gesture.dragged = true;
                        Some(PointerEvent::Drag(p))
                    }
                    None => Some(PointerEvent::Hover(p)),
                }
            }
            PointerInput::Released(p) => {
                let gesture = self.gesture.take()?;
                if !surface.contains(p) {
                    return None;
                }
                Some(if gesture.dragged {
                    PointerEvent::Release(p)
                } else {
                    PointerEvent::Click(p)
                })
            }
            PointerInput::Exited => {
                self.gesture = None;
                None
            }
        }
    }
}
