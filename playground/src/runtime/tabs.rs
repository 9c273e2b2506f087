use std::fmt;
use std::time::{Duration, Instant};

use nannou::prelude::{App, Draw, Key};
use serde::{Deserialize, Serialize};

use super::events::AppEventSender;
use super::frame_loop::{FrameScheduler, FrameToken, RenderLoop};
use super::registry::ExperienceRegistry;
use super::settings::Settings;
use super::storage::{KeyValueStore, load_json, save_json};
use crate::core::logging::{debug, error, info, warn};
use crate::experience::{Context, Experience, MountContext};
use crate::input::{InputRouter, PointerInput};
use crate::render::surface::Surface;

pub const ACTIVE_TAB_KEY: &str = "playground_active_tab_v1";

const TRANSITION: Duration = Duration::from_millis(250);

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Drawing,
    Sound,
    Particles,
    Garden,
    #[serde(rename = "custom")]
    Customization,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Drawing,
        Tab::Sound,
        Tab::Particles,
        Tab::Garden,
        Tab::Customization,
    ];

    /// Stable identifier used in storage and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Tab::Drawing => "drawing",
            Tab::Sound => "sound",
            Tab::Particles => "particles",
            Tab::Garden => "garden",
            Tab::Customization => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Drawing => "Drawing",
            Tab::Sound => "Sound",
            Tab::Particles => "Particles",
            Tab::Garden => "Garden",
            Tab::Customization => "Customize",
        }
    }

    pub fn from_key(key: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.key() == key)
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Tab> {
        Tab::ALL.get(index).copied()
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Last persisted tab, or the default when missing or unrecognized
pub fn restore_active_tab(storage: &dyn KeyValueStore) -> Tab {
    load_json::<Tab>(storage, ACTIVE_TAB_KEY).unwrap_or_default()
}

struct Mounted {
    tab: Tab,
    experience: Box<dyn Experience>,
    frame_loop: RenderLoop,
    router: InputRouter,
}

/// Owns the single mounted experience. Switching tabs always tears the
/// outgoing experience down (and cancels its frame token) before the
/// incoming one is constructed.
pub struct TabContainer {
    registry: ExperienceRegistry,
    mount_ctx: MountContext,
    scheduler: FrameScheduler,
    active: Option<Mounted>,
    settings: Settings,
    switched_at: Option<Instant>,
    app_tx: Option<AppEventSender>,
}

impl TabContainer {
    pub fn new(registry: ExperienceRegistry, mount_ctx: MountContext) -> Self {
        let settings = mount_ctx.settings.snapshot();
        Self {
            registry,
            mount_ctx,
            scheduler: FrameScheduler::new(),
            active: None,
            settings,
            switched_at: None,
            app_tx: None,
        }
    }

    pub fn with_sender(mut self, app_tx: AppEventSender) -> Self {
        self.app_tx = Some(app_tx);
        self
    }

    pub fn registry(&self) -> &ExperienceRegistry {
        &self.registry
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.active.as_ref().map(|m| m.tab)
    }

    pub fn active_token(&self) -> Option<FrameToken> {
        self.active.as_ref().map(|m| m.frame_loop.token())
    }

    pub fn live_loops(&self) -> usize {
        self.scheduler.live_count()
    }

    pub fn surface(&self) -> Surface {
        self.mount_ctx.surface
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn frame_count(&self) -> u64 {
        self.active.as_ref().map_or(0, |m| m.frame_loop.frame_count())
    }

    pub fn average_fps(&self) -> f32 {
        self.active
            .as_ref()
            .map_or(0.0, |m| m.frame_loop.average_fps())
    }

    /// Mount the persisted tab (or `requested` when given), falling back to
    /// the first registered tab if that one is unavailable.
    pub fn mount_initial(&mut self, requested: Option<Tab>, now: Instant) {
        let preferred = requested.unwrap_or_else(|| {
            restore_active_tab(self.mount_ctx.storage.as_ref())
        });

        let tab = if self.registry.get(preferred).is_some() {
            Some(preferred)
        } else {
            warn!("No experience registered for tab {}", preferred);
            self.registry.first_tab()
        };

        if let Some(tab) = tab {
            self.select(tab, now);
        } else {
            error!("No experiences registered");
        }
    }

    /// Returns false when `tab` is already active or unknown
    pub fn select(&mut self, tab: Tab, now: Instant) -> bool {
        if self.active_tab() == Some(tab) {
            return false;
        }

        let Some(entry) = self.registry.get(tab) else {
            warn!("No experience registered for tab {}", tab);
            return false;
        };

        if let Some(mut outgoing) = self.active.take() {
            self.scheduler.cancel(outgoing.frame_loop.token());
            outgoing.experience.teardown();
            debug!("Tore down {}", outgoing.tab);
        }

        self.settings = self.mount_ctx.settings.snapshot();
        let token = self.scheduler.schedule();
        let experience = (entry.factory)(&self.mount_ctx);
        info!("Mounted {}", entry.config.display_name);

        self.active = Some(Mounted {
            tab,
            experience,
            frame_loop: RenderLoop::new(token, now),
            router: InputRouter::new(),
        });
        self.switched_at = Some(now);

        if let Err(e) =
            save_json(self.mount_ctx.storage.as_ref(), ACTIVE_TAB_KEY, &tab)
        {
            error!("Unable to persist active tab: {}", e);
        }

        true
    }

    pub fn select_next(&mut self, now: Instant) -> bool {
        let next = self
            .active_tab()
            .and_then(|tab| self.registry.next_tab(tab))
            .or_else(|| self.registry.first_tab());

        match next {
            Some(tab) => self.select(tab, now),
            None => false,
        }
    }

    /// Run one frame of the active experience
    pub fn frame(&mut self, now: Instant) -> bool {
        match self.active_token() {
            Some(token) => self.run_frame(token, now),
            None => false,
        }
    }

    /// Stale tokens (from experiences already torn down) do nothing
    pub fn run_frame(&mut self, token: FrameToken, now: Instant) -> bool {
        if !self.scheduler.is_live(token) {
            return false;
        }

        self.settings = self.mount_ctx.settings.snapshot();

        let Some(mounted) = self.active.as_mut() else {
            return false;
        };
        if mounted.frame_loop.token() != token {
            return false;
        }

        mounted.frame_loop.tick(now);
        let ctx = Context::new(self.settings, self.mount_ctx.surface)
            .with_frame_count(mounted.frame_loop.frame_count())
            .with_elapsed(mounted.frame_loop.elapsed(now))
            .with_sender(self.app_tx.clone());
        mounted.experience.update(&ctx);

        true
    }

    pub fn view(&self, app: &App, draw: &Draw, now: Instant) {
        if let Some(mounted) = &self.active {
            let ctx = self.context(mounted, now);
            mounted.experience.view(app, draw, &ctx);
        }
    }

    pub fn status(&self, now: Instant) -> String {
        self.active.as_ref().map_or_else(String::new, |mounted| {
            mounted.experience.status(&self.context(mounted, now))
        })
    }

    pub fn pointer(&mut self, input: PointerInput, now: Instant) {
        let surface = self.mount_ctx.surface;
        let Some(mounted) = self.active.as_mut() else {
            return;
        };
        let Some(event) = mounted.router.route(input, &surface) else {
            return;
        };

        let ctx = Context::new(self.settings, surface)
            .with_frame_count(mounted.frame_loop.frame_count())
            .with_elapsed(mounted.frame_loop.elapsed(now))
            .with_sender(self.app_tx.clone());
        mounted.experience.pointer(event, &ctx);
    }

    pub fn key_pressed(&mut self, key: Key, now: Instant) {
        if let Some(mounted) = self.active.as_mut() {
            let ctx = Context::new(self.settings, self.mount_ctx.surface)
                .with_frame_count(mounted.frame_loop.frame_count())
                .with_elapsed(mounted.frame_loop.elapsed(now))
                .with_sender(self.app_tx.clone());
            mounted.experience.key_pressed(key, &ctx);
        }
    }

    pub fn resize(&mut self, width: f32, height: f32, now: Instant) {
        let surface = match Surface::new(width, height) {
            Ok(surface) => surface,
            Err(e) => {
                warn!("Ignoring resize: {}", e);
                return;
            }
        };
        if surface == self.mount_ctx.surface {
            return;
        }

        self.mount_ctx.surface = surface;
        if let Some(mounted) = self.active.as_mut() {
            mounted.router.reset();
            let ctx = Context::new(self.settings, surface)
                .with_frame_count(mounted.frame_loop.frame_count())
                .with_elapsed(mounted.frame_loop.elapsed(now))
                .with_sender(self.app_tx.clone());
            mounted.experience.resize(&ctx);
        }
    }

    /// Opacity of the cosmetic cover drawn right after a switch (1 → 0)
    pub fn transition_alpha(&self, now: Instant) -> f32 {
        self.switched_at.map_or(0.0, |at| {
            let t = now.saturating_duration_since(at).as_secs_f32()
                / TRANSITION.as_secs_f32();
            (1.0 - t).clamp(0.0, 1.0)
        })
    }

    /// Tear down the mounted experience, e.g. on exit
    pub fn unmount(&mut self) {
        if let Some(mut mounted) = self.active.take() {
            self.scheduler.cancel(mounted.frame_loop.token());
            mounted.experience.teardown();
        }
    }

    fn context(&self, mounted: &Mounted, now: Instant) -> Context {
        Context::new(self.settings, self.mount_ctx.surface)
            .with_frame_count(mounted.frame_loop.frame_count())
            .with_elapsed(mounted.frame_loop.elapsed(now))
            .with_sender(self.app_tx.clone())
    }
}
