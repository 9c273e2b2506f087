use nannou::prelude::*;
use std::collections::HashSet;
use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Instant;

use super::events::{AppEvent, AppEventReceiver, AppEventSender};
use super::hud::{self, Hud};
use super::registry::ExperienceRegistry;
use super::settings::SettingsStore;
use super::storage::{self, FileStore, SharedStore};
use super::tabs::{Tab, TabContainer};
use crate::core::logging::{debug, error, info, warn};
use crate::experience::MountContext;
use crate::input::PointerInput;
use crate::io::audio::{self, AudioFactory};
use crate::render::surface::Surface;
use crate::render::theme;

#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Overrides the persisted tab
    pub initial_tab: Option<Tab>,
    pub storage_dir: PathBuf,
    pub images_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub muted: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            initial_tab: None,
            storage_dir: storage::default_storage_dir(),
            images_dir: storage::default_images_dir(),
            width: 960,
            height: 500,
            muted: false,
        }
    }
}

#[derive(Default)]
struct Launch {
    registry: ExperienceRegistry,
    options: RunOptions,
}

/// Handed from [`run`] to nannou's model function, which cannot capture
static LAUNCH: Mutex<Option<Launch>> = Mutex::new(None);

pub fn run(
    registry: ExperienceRegistry,
    options: RunOptions,
) -> Result<(), Box<dyn Error>> {
    if registry.tabs().is_empty() {
        return Err("No experiences registered".into());
    }

    {
        let mut launch = LAUNCH.lock().map_err(|e| e.to_string())?;
        *launch = Some(Launch { registry, options });
    }

    nannou::app(model).update(update).exit(exit).run();
    Ok(())
}

struct AppModel {
    app_rx: AppEventReceiver,
    app_tx: AppEventSender,
    hud: Hud,
    keys_held: HashSet<Key>,
    main_window_id: window::Id,
    tabs: TabContainer,
}

impl AppModel {
    fn on_app_event(&mut self, app: &App, event: AppEvent) {
        let now = Instant::now();
        match event {
            AppEvent::Alert(text) | AppEvent::AlertAndLog(text, _) => {
                self.hud.alert(text, now);
            }
            AppEvent::NextTab => {
                self.tabs.select_next(now);
            }
            AppEvent::Quit => {
                self.tabs.unmount();
                app.quit();
            }
            AppEvent::SelectTab(tab) => {
                self.tabs.select(tab, now);
            }
            AppEvent::ToggleHud => {
                self.hud.toggle();
            }
        }
    }

    fn window_point(&self, position: Vec2) -> crate::render::surface::Point {
        self.tabs.surface().from_window(position)
    }

    /// Clicks on the tab bar select tabs instead of reaching the experience
    fn tab_bar_press(&self, position: Vec2) -> Option<Tab> {
        if !self.hud.is_visible() {
            return None;
        }
        let surface = self.tabs.surface();
        let tabs = self.tabs.registry().tabs();
        hud::tab_at(&surface, tabs.len(), self.window_point(position))
            .and_then(|index| tabs.get(index).copied())
    }
}

fn audio_factory() -> AudioFactory {
    if cfg!(feature = "silent") {
        audio::null_audio_factory()
    } else {
        audio::cpal_audio_factory()
    }
}

fn model(app: &App) -> AppModel {
    let Launch { registry, options } = LAUNCH
        .lock()
        .ok()
        .and_then(|mut launch| launch.take())
        .unwrap_or_default();

    app.set_exit_on_escape(false);

    let main_window_id = app
        .new_window()
        .title("Playground")
        .size(options.width, options.height)
        .view(view)
        .event(window_event)
        .build()
        .unwrap_or_else(|e| {
            error!("Unable to create window: {}", e);
            std::process::exit(1);
        });

    let window_rect = app
        .window(main_window_id)
        .map(|window| window.rect())
        .unwrap_or_else(|| {
            Rect::from_w_h(options.width as f32, options.height as f32)
        });

    let surface = Surface::new(window_rect.w(), window_rect.h())
        .unwrap_or_else(|e| {
            warn!("{}", e);
            Surface::EMPTY
        });

    info!("Storage directory: {}", options.storage_dir.display());
    let storage: SharedStore = Rc::new(FileStore::new(&options.storage_dir));
    let settings = SettingsStore::load(storage.clone());

    let mount_ctx = MountContext {
        storage,
        settings,
        surface,
        audio: audio_factory(),
        muted: options.muted,
        images_dir: options.images_dir.clone(),
    };

    let (app_tx, app_rx) = super::events::app_event_channel();
    let mut tabs =
        TabContainer::new(registry, mount_ctx).with_sender(app_tx.clone());
    tabs.mount_initial(options.initial_tab, Instant::now());

    AppModel {
        app_rx,
        app_tx,
        hud: Hud::new(),
        keys_held: HashSet::default(),
        main_window_id,
        tabs,
    }
}

fn update(app: &App, model: &mut AppModel, _update: Update) {
    while let Ok(event) = model.app_rx.try_recv() {
        model.on_app_event(app, event);
    }

    model.tabs.frame(Instant::now());
}

fn window_event(app: &App, model: &mut AppModel, event: WindowEvent) {
    let now = Instant::now();

    match event {
        KeyPressed(key) => {
            if !model.keys_held.insert(key) {
                return;
            }

            let digit = match key {
                Key::Key1 => Some(0),
                Key::Key2 => Some(1),
                Key::Key3 => Some(2),
                Key::Key4 => Some(3),
                Key::Key5 => Some(4),
                _ => None,
            };

            if let Some(index) = digit {
                if let Some(tab) = model.tabs.registry().tabs().get(index) {
                    model.app_tx.emit(AppEvent::SelectTab(*tab));
                }
                return;
            }

            match key {
                Key::Tab => model.app_tx.emit(AppEvent::NextTab),
                Key::H => model.app_tx.emit(AppEvent::ToggleHud),
                Key::Q if app.keys.mods.logo() || app.keys.mods.ctrl() => {
                    model.app_tx.emit(AppEvent::Quit)
                }
                _ => model.tabs.key_pressed(key, now),
            }
        }
        KeyReleased(key) => {
            model.keys_held.remove(&key);
        }
        MousePressed(MouseButton::Left) => {
            let position = app.mouse.position();
            if let Some(tab) = model.tab_bar_press(position) {
                model.app_tx.emit(AppEvent::SelectTab(tab));
                return;
            }
            let p = model.window_point(position);
            model.tabs.pointer(PointerInput::Pressed(p), now);
        }
        MouseMoved(position) => {
            let p = model.window_point(position);
            let input = model.hud.pointer_move(&model.tabs.surface(), p);
            model.tabs.pointer(input, now);
        }
        MouseReleased(MouseButton::Left) => {
            let p = model.window_point(app.mouse.position());
            model.tabs.pointer(PointerInput::Released(p), now);
        }
        MouseExited => {
            model.tabs.pointer(PointerInput::Exited, now);
        }
        Resized(size) => {
            debug!("Resized to {}x{}", size.x, size.y);
            model.tabs.resize(size.x, size.y, now);
        }
        _ => {}
    }
}

fn view(app: &App, model: &AppModel, frame: Frame) {
    let now = Instant::now();
    let draw = app.draw();
    let surface = model.tabs.surface();
    let theme = model.tabs.settings().theme;

    theme::draw_background(&draw, &surface, theme);
    model.tabs.view(app, &draw, now);

    let cover = model.tabs.transition_alpha(now);
    if cover > 0.0 {
        draw.rect()
            .xy(surface.to_draw(surface.bounds().center()))
            .w_h(surface.width(), surface.height())
            .color(theme::gradient_at(theme, 0.5).fade(cover).to_srgba());
    }

    model.hud.draw(&draw, &model.tabs, now);

    if let Err(e) = draw.to_frame(app, &frame) {
        error!("Error drawing frame: {:?}", e);
    }

    if model.tabs.frame_count() % 600 == 1 {
        debug!(
            "{} fps on window {:?}",
            model.tabs.average_fps().round(),
            model.main_window_id
        );
    }
}

fn exit(_app: &App, mut model: AppModel) {
    model.tabs.unmount();
    debug!("Exited");
}
