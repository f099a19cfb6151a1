//! The persisted "current document" pointer
//!
//! The pointer is the only long-lived mutable state of the tool. It is stored as four
//! independent plain-text records behind the [`PointerStore`] port so workflows can be
//! exercised against an in-memory store.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// One of the independently persisted pointer fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerField {
    Series,
    Key,
    Now,
    Name,
}

impl PointerField {
    /// All fields, in the order they are displayed
    pub const ALL: [PointerField; 4] = [
        PointerField::Series,
        PointerField::Key,
        PointerField::Now,
        PointerField::Name,
    ];

    /// Record name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            PointerField::Series => "series",
            PointerField::Key => "key",
            PointerField::Now => "now",
            PointerField::Name => "name",
        }
    }
}

impl fmt::Display for PointerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage port for the pointer records
pub trait PointerStore: Send + Sync {
    /// Read a field, `None` if it was never written
    fn get(&self, field: PointerField) -> Result<Option<String>>;

    /// Overwrite a field in place
    fn set(&self, field: PointerField, value: &str) -> Result<()>;

    /// Overwrite several fields; a store that can fail midway should leave the old records
    fn set_all(&self, records: &[(PointerField, &str)]) -> Result<()> {
        for (field, value) in records {
            self.set(*field, value)?;
        }
        Ok(())
    }
}

/// Pointer records kept as `current_{field}` files in a scratch directory
#[derive(Debug, Clone)]
pub struct FilePointerStore {
    dir: PathBuf,
}

impl FilePointerStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the record for `field`
    pub fn record_path(&self, field: PointerField) -> PathBuf {
        self.dir.join(format!("current_{}", field))
    }

    /// Directory holding the records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn staging_path(&self, field: PointerField) -> PathBuf {
        self.dir.join(format!("current_{}.tmp", field))
    }

    fn discard_staged(&self, records: &[(PointerField, &str)]) {
        for (field, _) in records {
            let _ = std::fs::remove_file(self.staging_path(*field));
        }
    }
}

impl PointerStore for FilePointerStore {
    fn get(&self, field: PointerField) -> Result<Option<String>> {
        let path = self.record_path(field);
        if !path.is_file() {
            return Ok(None);
        }
        let value = std::fs::read_to_string(&path)?;
        Ok(Some(value.trim().to_string()))
    }

    fn set(&self, field: PointerField, value: &str) -> Result<()> {
        self.set_all(&[(field, value)])
    }

    /// Stage every record next to its final path, then rename them all in place
    fn set_all(&self, records: &[(PointerField, &str)]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        for (field, value) in records {
            let staged = self.staging_path(*field);
            debug!(path = %staged.display(), value, "Staging pointer record");
            if let Err(e) = std::fs::write(&staged, value) {
                self.discard_staged(records);
                return Err(e.into());
            }
        }

        for (field, _) in records {
            if let Err(e) = std::fs::rename(self.staging_path(*field), self.record_path(*field)) {
                self.discard_staged(records);
                return Err(e.into());
            }
        }
        Ok(())
    }
}

/// In-memory pointer store
#[derive(Debug, Default)]
pub struct MemoryPointerStore {
    records: Mutex<HashMap<PointerField, String>>,
}

impl MemoryPointerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `pointer`
    pub fn with_pointer(pointer: &CurrentPointer) -> Self {
        let store = Self::new();
        if let Ok(mut records) = store.records.lock() {
            for field in PointerField::ALL {
                records.insert(field, pointer.field(field).to_string());
            }
        }
        store
    }
}

impl PointerStore for MemoryPointerStore {
    fn get(&self, field: PointerField) -> Result<Option<String>> {
        let records = self
            .records
            .lock()
            .map_err(|_| Error::Other("pointer store lock poisoned".to_string()))?;
        Ok(records.get(&field).cloned())
    }

    fn set(&self, field: PointerField, value: &str) -> Result<()> {
        self.set_all(&[(field, value)])
    }

    fn set_all(&self, updates: &[(PointerField, &str)]) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::Other("pointer store lock poisoned".to_string()))?;
        for (field, value) in updates {
            records.insert(*field, value.to_string());
        }
        Ok(())
    }
}

/// The document currently being worked on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPointer {
    /// Grouping folder of the document
    pub series: String,
    /// `{now}_{name}`, also the branch name
    pub key: String,
    /// Compact date token
    pub now: String,
    /// Slug of the document
    pub name: String,
}

impl CurrentPointer {
    /// Build a pointer from its parts, deriving the key
    pub fn new(
        series: impl Into<String>,
        now: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = now.into();
        let name = name.into();
        Self {
            series: series.into(),
            key: join_key(&now, &name),
            now,
            name,
        }
    }

    /// Build a pointer from an existing key and its resolved series
    pub fn from_key(key: &str, series: impl Into<String>) -> Result<Self> {
        let (now, name) = split_key(key)?;
        Ok(Self {
            series: series.into(),
            key: key.to_string(),
            now: now.to_string(),
            name: name.to_string(),
        })
    }

    /// Read all four records from `store`
    pub fn load(store: &dyn PointerStore) -> Result<Self> {
        let read = |field: PointerField| -> Result<String> {
            store.get(field)?.ok_or_else(|| {
                Error::Config(format!(
                    "current {} is not set. Start a document with `mirrorpub new` or `mirrorpub checkout`.",
                    field
                ))
            })
        };

        Ok(Self {
            series: read(PointerField::Series)?,
            key: read(PointerField::Key)?,
            now: read(PointerField::Now)?,
            name: read(PointerField::Name)?,
        })
    }

    /// Overwrite all four records in `store`
    pub fn save(&self, store: &dyn PointerStore) -> Result<()> {
        let records = PointerField::ALL.map(|field| (field, self.field(field)));
        store.set_all(&records)
    }

    /// Value of a single field
    pub fn field(&self, field: PointerField) -> &str {
        match field {
            PointerField::Series => &self.series,
            PointerField::Key => &self.key,
            PointerField::Now => &self.now,
            PointerField::Name => &self.name,
        }
    }
}

impl fmt::Display for CurrentPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in PointerField::ALL {
            writeln!(f, "{}: {}", field, self.field(field))?;
        }
        Ok(())
    }
}

/// Join a date token and a slug into a key
pub fn join_key(now: &str, name: &str) -> String {
    format!("{}_{}", now, name)
}

/// Split a key on its first `_` into `(now, name)`
pub fn split_key(key: &str) -> Result<(&str, &str)> {
    key.split_once('_')
        .filter(|(now, name)| !now.is_empty() && !name.is_empty())
        .ok_or_else(|| {
            Error::Resolution(format!(
                "'{}' is not a document key. Expected '{{date}}_{{name}}'.",
                key
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_round_trip() {
        for key in ["70525_publish_zenn_qiita", "70101_a", "123_x_y_z_"] {
            let (now, name) = split_key(key).unwrap();
            assert_eq!(join_key(now, name), key);
        }

        let (now, name) = split_key("70525_publish_zenn_qiita").unwrap();
        assert_eq!(now, "70525");
        assert_eq!(name, "publish_zenn_qiita");
    }

    #[test]
    fn test_split_key_rejects_malformed() {
        assert!(split_key("nounderscore").is_err());
        assert!(split_key("_name").is_err());
        assert!(split_key("70525_").is_err());
    }

    #[test]
    fn test_new_derives_key() {
        let pointer = CurrentPointer::new("a", "70527", "recycler_view");
        assert_eq!(pointer.key, "70527_recycler_view");
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryPointerStore::new();
        assert!(CurrentPointer::load(&store).is_err());

        let pointer = CurrentPointer::from_key("70525_publish", "b").unwrap();
        pointer.save(&store).unwrap();
        assert_eq!(CurrentPointer::load(&store).unwrap(), pointer);
    }

    #[test]
    fn test_file_store_writes_plain_records() {
        let dir = TempDir::new().unwrap();
        let store = FilePointerStore::new(dir.path().join("tmp"));
        assert_eq!(store.get(PointerField::Key).unwrap(), None);

        CurrentPointer::new("a", "70601", "checkout").save(&store).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("tmp").join("current_key")).unwrap();
        assert_eq!(raw, "70601_checkout");
        assert_eq!(store.get(PointerField::Series).unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn test_failed_save_keeps_previous_pointer() {
        let dir = TempDir::new().unwrap();
        let store = FilePointerStore::new(dir.path());
        let previous = CurrentPointer::new("a", "70525", "publish");
        previous.save(&store).unwrap();

        // a directory in the way of the staged name record
        std::fs::create_dir(dir.path().join("current_name.tmp")).unwrap();
        assert!(CurrentPointer::new("b", "70601", "checkout").save(&store).is_err());

        assert_eq!(CurrentPointer::load(&store).unwrap(), previous);
        assert!(!dir.path().join("current_series.tmp").exists());
        assert!(!dir.path().join("current_key.tmp").exists());
    }

    #[test]
    fn test_file_store_trims_trailing_newline() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("current_name"), "hand_edited\n").unwrap();
        let store = FilePointerStore::new(dir.path());
        assert_eq!(
            store.get(PointerField::Name).unwrap().as_deref(),
            Some("hand_edited")
        );
    }
}
