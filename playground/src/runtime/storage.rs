use std::cell::RefCell;
use std::error::Error;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::Local;
use directories_next::{BaseDirs, UserDirs};
use nannou::image::RgbaImage;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::logging::warn;
use crate::core::util::HashMap;

/// Durable string storage keyed by short, fixed record names.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error>>;
    fn set(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>>;
    fn remove(&self, key: &str) -> Result<(), Box<dyn Error>>;
}

pub type SharedStore = Rc<dyn KeyValueStore>;

pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join("Playground"))
}

pub fn default_storage_dir() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".playground"))
}

pub fn default_images_dir() -> PathBuf {
    let primary_path = UserDirs::new().and_then(|ud| {
        ud.picture_dir().map(|p| p.to_path_buf().join("Playground"))
    });

    let fallback_path = BaseDirs::new().map(|bd| {
        bd.home_dir().to_path_buf().join("Playground").join("Images")
    });

    primary_path
        .or(fallback_path)
        .unwrap_or_else(|| PathBuf::from("images"))
}

/// One JSON file per key under a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, Box<dyn Error>> {
        if key.is_empty()
            || key.contains(['/', '\\'])
            || key.starts_with('.')
        {
            return Err(format!("Invalid storage key: {:?}", key).into());
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        match fs::read_to_string(self.path(key)?) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let path = self.path(key)?;
        if let Some(parent_dir) = path.parent() {
            fs::create_dir_all(parent_dir)?;
        }
        fs::write(&path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Box<dyn Error>> {
        match fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Rc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        Ok(self.records.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Box<dyn Error>> {
        self.records.borrow_mut().remove(key);
        Ok(())
    }
}

/// Read and decode a record. Missing, unreadable, and structurally
/// incompatible records all come back as `None`; the latter two are logged.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Option<T> {
    let json = match store.get(key) {
        Ok(json) => json?,
        Err(e) => {
            warn!("Unable to read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str::<T>(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt record {}: {}", key, e);
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Write `image` as `<dir>/<prefix>-<timestamp>.png`, creating `dir`
pub fn save_image(
    image: &RgbaImage,
    dir: &Path,
    prefix: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let filename =
        format!("{}-{}.png", prefix, Local::now().format("%Y%m%d-%H%M%S%3f"));
    let path = dir.join(filename);
    image.save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join("playground_storage_tests");
        let _ = fs::remove_dir_all(&dir);
        FileStore::new(dir)
    }

    #[test]
    #[serial]
    fn file_store_round_trip() {
        let store = temp_store();
        assert_eq!(store.get("alpha").unwrap(), None);

        store.set("alpha", "[1,2,3]").unwrap();
        assert_eq!(store.get("alpha").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(store.dir().join("alpha.json").exists());

        store.remove("alpha").unwrap();
        assert_eq!(store.get("alpha").unwrap(), None);
        store.remove("alpha").unwrap();
    }

    #[test]
    #[serial]
    fn file_store_rejects_path_like_keys() {
        let store = temp_store();
        assert!(store.set("../escape", "{}").is_err());
        assert!(store.get("a/b").is_err());
        assert!(store.set("", "{}").is_err());
    }

    #[test]
    #[serial]
    fn save_image_writes_png() {
        let dir = std::env::temp_dir().join("playground_image_tests");
        let _ = fs::remove_dir_all(&dir);
        let image = RgbaImage::new(3, 2);

        let path = save_image(&image, &dir, "drawing").unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_json_treats_corruption_as_absent() {
        let store = MemoryStore::new();
        store.set("numbers", "{not json").unwrap();
        assert_eq!(load_json::<Vec<u32>>(&store, "numbers"), None);

        store.set("numbers", "{\"a\":1}").unwrap();
        assert_eq!(load_json::<Vec<u32>>(&store, "numbers"), None);

        save_json(&store, "numbers", &vec![4u32, 5]).unwrap();
        assert_eq!(load_json::<Vec<u32>>(&store, "numbers"), Some(vec![4, 5]));
    }
}
