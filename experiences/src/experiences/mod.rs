pub mod customization;
pub mod drawing;
pub mod garden;
pub mod particles;
pub mod sound;

#[cfg(test)]
pub mod test_support {
    use playground::prelude::*;

    pub fn surface() -> Surface {
        Surface::new(400.0, 300.0).unwrap()
    }

    pub fn mount_ctx(storage: SharedStore) -> MountContext {
        MountContext {
            settings: SettingsStore::load(storage.clone()),
            storage,
            surface: surface(),
            audio: null_audio_factory(),
            muted: false,
            images_dir: std::env::temp_dir().join("experiences_test_images"),
        }
    }

    pub fn ctx(mode: Mode) -> Context {
        Context::new(
            Settings {
                mode,
                ..Settings::default()
            },
            surface(),
        )
    }
}
