//! Window chrome drawn over the mounted experience: the tab bar, a status
//! line and transient alerts.

use std::time::{Duration, Instant};

use nannou::prelude::Draw;

use super::tabs::TabContainer;
use crate::input::PointerInput;
use crate::render::color::HexColor;
use crate::render::surface::{Bounds, Point, Surface};
use crate::render::theme;
use crate::ternary;

pub const TAB_BAR_HEIGHT: f32 = 32.0;
const ALERT_DURATION: Duration = Duration::from_secs(3);
const STATUS_HEIGHT: f32 = 22.0;

/// Bounds of each tab button, left to right
pub fn tab_bounds(surface: &Surface, count: usize) -> Vec<Bounds> {
    if count == 0 {
        return vec![];
    }
    let w = surface.width() / count as f32;
    (0..count)
        .map(|i| Bounds::new(i as f32 * w, 0.0, w, TAB_BAR_HEIGHT))
        .collect()
}

/// Index of the tab button under `p`, if any
pub fn tab_at(surface: &Surface, count: usize, p: Point) -> Option<usize> {
    if !surface.contains(p) {
        return None;
    }
    tab_bounds(surface, count)
        .iter()
        .position(|bounds| bounds.contains(p))
}

#[derive(Debug, Default)]
pub struct Hud {
    visible: bool,
    alert: Option<(String, Instant)>,
}

impl Hud {
    pub fn new() -> Self {
        Self {
            visible: true,
            alert: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// True when `p` lands on the tab bar while it is shown
    pub fn covers(&self, surface: &Surface, p: Point) -> bool {
        self.visible && surface.contains(p) && p.y <= TAB_BAR_HEIGHT
    }

    /// Pointer moves over the tab bar read as leaving the canvas
    pub fn pointer_move(&self, surface: &Surface, p: Point) -> PointerInput {
        ternary!(
            self.covers(surface, p),
            PointerInput::Exited,
            PointerInput::Moved(p)
        )
    }

    pub fn alert(&mut self, message: impl Into<String>, now: Instant) {
        self.alert = Some((message.into(), now));
    }

    pub fn current_alert(&self, now: Instant) -> Option<&str> {
        self.alert
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < ALERT_DURATION)
            .map(|(message, _)| message.as_str())
    }

    pub fn draw(&self, draw: &Draw, container: &TabContainer, now: Instant) {
        let surface = container.surface();
        if !self.visible || surface.is_empty() {
            return;
        }

        let tabs = container.registry().tabs();
        let active = container.active_tab();
        let theme = container.settings().theme;

        let text = theme::text_color(theme);
        let accent = theme::accent_color(theme);
        let panel = ternary!(
            theme::is_dark(theme),
            HexColor::rgba(0, 0, 0, 110),
            HexColor::rgba(255, 255, 255, 140)
        );

        let bounds = tab_bounds(&surface, tabs.len());
        for (tab, bounds) in tabs.iter().zip(bounds) {
            let is_active = active == Some(*tab);
            let center = surface.to_draw(bounds.center());
            draw.rect()
                .xy(center)
                .w_h(bounds.w - 4.0, bounds.h - 6.0)
                .color(ternary!(is_active, accent.fade(0.85), panel).to_srgba());
            draw.text(&format!("{} {}", tab.index() + 1, tab.label()))
                .xy(center)
                .w_h(bounds.w, bounds.h)
                .font_size(13)
                .center_justify()
                .align_text_middle_y()
                .color(
                    ternary!(is_active, HexColor::rgb(255, 255, 255), text)
                        .to_srgba(),
                );
        }

        let line = match self.current_alert(now) {
            Some(alert) => alert.to_string(),
            None => container.status(now),
        };
        if line.is_empty() {
            return;
        }

        let status_center = Point::new(
            surface.width() / 2.0,
            surface.height() - STATUS_HEIGHT / 2.0,
        );
        draw.rect()
            .xy(surface.to_draw(status_center))
            .w_h(surface.width(), STATUS_HEIGHT)
            .color(panel.to_srgba());
        draw.text(&line)
            .xy(surface.to_draw(status_center))
            .w_h(surface.width() - 16.0, STATUS_HEIGHT)
            .font_size(12)
            .left_justify()
            .align_text_middle_y()
            .color(text.to_srgba());
    }
}
