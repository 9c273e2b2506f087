use std::path::PathBuf;
use std::time::Duration;

use nannou::prelude::{App, Draw, Key};

use crate::input::PointerEvent;
use crate::io::audio::AudioFactory;
use crate::render::surface::Surface;
use crate::runtime::events::{AppEvent, AppEventSender};
use crate::runtime::settings::{Settings, SettingsStore};
use crate::runtime::storage::SharedStore;
use crate::runtime::tabs::Tab;

pub struct ExperienceConfig {
    pub tab: Tab,
    pub display_name: &'static str,
}

/// Everything an experience may hold on to while it is mounted. Cloned from
/// the tab container for every mount.
#[derive(Clone)]
pub struct MountContext {
    pub storage: SharedStore,
    pub settings: SettingsStore,
    pub surface: Surface,
    pub audio: AudioFactory,
    pub muted: bool,
    pub images_dir: PathBuf,
}

/// Per-frame view of the world handed to every experience callback. The
/// settings are a snapshot polled once per frame.
#[derive(Clone, Debug)]
pub struct Context {
    pub settings: Settings,
    pub surface: Surface,
    pub frame_count: u64,
    pub elapsed: Duration,
    app_tx: Option<AppEventSender>,
}

impl Context {
    pub fn new(settings: Settings, surface: Surface) -> Self {
        Self {
            settings,
            surface,
            frame_count: 0,
            elapsed: Duration::ZERO,
            app_tx: None,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_frame_count(mut self, frame_count: u64) -> Self {
        self.frame_count = frame_count;
        self
    }

    pub fn with_sender(mut self, app_tx: Option<AppEventSender>) -> Self {
        self.app_tx = app_tx;
        self
    }

    /// No-op when detached from a running app (e.g. in tests)
    pub fn emit(&self, event: AppEvent) {
        if let Some(tx) = &self.app_tx {
            tx.emit(event);
        }
    }

    pub fn alert(&self, message: impl Into<String>) {
        self.emit(AppEvent::Alert(message.into()));
    }
}

pub trait Experience {
    /// Advance simulation state by one frame
    fn update(&mut self, _ctx: &Context) {}

    /// Draw one frame. The themed background has already been drawn.
    fn view(&self, _app: &App, _draw: &Draw, _ctx: &Context) {}

    fn pointer(&mut self, _event: PointerEvent, _ctx: &Context) {}

    fn key_pressed(&mut self, _key: Key, _ctx: &Context) {}

    /// Called after the drawing surface changed size
    fn resize(&mut self, _ctx: &Context) {}

    /// Release surfaces and audio before the next experience mounts
    fn teardown(&mut self) {}

    /// Short status line for the HUD
    fn status(&self, _ctx: &Context) -> String {
        String::new()
    }
}
