#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use playground::prelude::*;

/// Fresh, empty directory under the system temp dir
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("playground_it").join(name);
    let _ = fs::remove_dir_all(&dir);
    dir
}

pub fn surface() -> Surface {
    Surface::new(320.0, 240.0).unwrap()
}

pub fn mount_ctx(storage: SharedStore) -> MountContext {
    MountContext {
        settings: SettingsStore::load(storage.clone()),
        storage,
        surface: surface(),
        audio: null_audio_factory(),
        muted: true,
        images_dir: temp_dir("images"),
    }
}
