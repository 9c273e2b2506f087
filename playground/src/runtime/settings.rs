use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::storage::{SharedStore, load_json, save_json};
use crate::core::logging::{debug, error};

pub const SETTINGS_KEY: &str = "playground_settings_v1";

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub enum Theme {
    #[default]
    Pastel,
    Dark,
    Neon,
    Magical,
}

impl Theme {
    pub const ALL: [Theme; 4] =
        [Theme::Pastel, Theme::Dark, Theme::Neon, Theme::Magical];

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Pastel => "Pastel",
            Theme::Dark => "Dark",
            Theme::Neon => "Neon",
            Theme::Magical => "Magical",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How intense interactions feel. Each experience maps the mode onto its own
/// physics and audio parameters.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub enum Mode {
    #[default]
    Calm,
    Playful,
    Chaotic,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Calm, Mode::Playful, Mode::Chaotic];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Calm => "Calm",
            Mode::Playful => "Playful",
            Mode::Chaotic => "Chaotic",
        }
    }

    /// Fraction of the remaining distance the drawing anchor moves toward
    /// the pointer per sample
    pub fn stroke_smoothing(&self) -> f32 {
        match self {
            Mode::Calm => 0.3,
            Mode::Playful => 0.5,
            Mode::Chaotic => 0.8,
        }
    }

    pub fn burst_count(&self) -> usize {
        match self {
            Mode::Calm => 14,
            Mode::Playful => 24,
            Mode::Chaotic => 34,
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        match self {
            Mode::Calm => 0.6,
            Mode::Playful => 1.0,
            Mode::Chaotic => 1.6,
        }
    }

    /// Particle life lost per frame
    pub fn life_decay(&self) -> f32 {
        match self {
            Mode::Calm => 0.007,
            Mode::Playful => 0.01,
            Mode::Chaotic => 0.016,
        }
    }

    pub fn master_gain_db(&self) -> f32 {
        match self {
            Mode::Calm => -10.0,
            Mode::Playful => -4.0,
            Mode::Chaotic => 0.0,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "or_default")]
    pub theme: Theme,
    #[serde(deserialize_with = "or_default")]
    pub mode: Mode,
}

/// Fall back to the field's default instead of rejecting the whole record
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Cheap-clone handle to the session's shared settings. Every clone observes
/// the same state; writes are persisted immediately.
#[derive(Clone)]
pub struct SettingsStore {
    state: Rc<Cell<Settings>>,
    storage: SharedStore,
}

impl SettingsStore {
    pub fn load(storage: SharedStore) -> Self {
        let settings =
            load_json::<Settings>(storage.as_ref(), SETTINGS_KEY)
                .unwrap_or_default();
        debug!("Loaded settings: {:?}", settings);
        Self {
            state: Rc::new(Cell::new(settings)),
            storage,
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.state.get()
    }

    pub fn theme(&self) -> Theme {
        self.state.get().theme
    }

    pub fn set_theme(&self, theme: Theme) {
        self.update(|s| s.theme = theme);
    }

    pub fn mode(&self) -> Mode {
        self.state.get().mode
    }

    pub fn set_mode(&self, mode: Mode) {
        self.update(|s| s.mode = mode);
    }

    fn update(&self, f: impl FnOnce(&mut Settings)) {
        let mut settings = self.state.get();
        f(&mut settings);
        if settings == self.state.get() {
            return;
        }
        self.state.set(settings);
        if let Err(e) = save_json(self.storage.as_ref(), SETTINGS_KEY, &settings)
        {
            error!("Unable to persist settings: {}", e);
        }
    }
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SettingsStore").field(&self.state.get()).finish()
    }
}
