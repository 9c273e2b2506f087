pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::core::util::*;
pub use crate::experience::*;
pub use crate::input::{InputRouter, PointerEvent, PointerInput};
pub use crate::io::audio::{
    AudioEngine, AudioFactory, NullEngine, SoundEngine, null_audio_factory,
};
pub use crate::io::synth::{Voice, VoiceKind, note_to_hz};
pub use crate::random::{RandomSource, SequenceRandom, ThreadRandom, pick};
pub use crate::register_experiences;
pub use crate::render::color::{HexColor, palette};
pub use crate::render::ink::{InkLayer, Paint};
pub use crate::render::surface::{Bounds, Point, Surface};
pub use crate::render::theme;
pub use crate::run;
pub use crate::runtime::app::RunOptions;
pub use crate::runtime::events::AppEvent;
pub use crate::runtime::persisted::PersistentCanvasState;
pub use crate::runtime::settings::{Mode, Settings, SettingsStore, Theme};
pub use crate::runtime::storage::{
    KeyValueStore, MemoryStore, SharedStore, save_image,
};
pub use crate::runtime::tabs::Tab;
pub use crate::ternary;
