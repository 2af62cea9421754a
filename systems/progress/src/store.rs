//! Key-value storage for the highest level reached.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use trap_labs_core::Level;

/// Key under which the highest level is persisted.
pub const HIGHEST_LEVEL_KEY: &str = "trap-labs.highest-level";

/// Failures raised while reading or writing persisted progress.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("failed to access progress store {path}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The backing file does not contain a JSON object.
    #[error("progress store {path} is not a JSON object")]
    Format {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying parse failure, if the text was not JSON at all.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// The stored value is not a level number.
    #[error("value {value} stored under {key} is not a level")]
    InvalidValue {
        /// Key holding the value.
        key: String,
        /// Offending value.
        value: Value,
    },
}

/// Persistence seam for the highest level reached.
pub trait HighestLevelStore {
    /// Reads the stored level, or `None` when nothing was saved yet.
    fn load(&mut self) -> Result<Option<Level>, StoreError>;

    /// Replaces the stored level.
    fn save(&mut self, level: Level) -> Result<(), StoreError>;
}

/// Store that keeps the value in memory for the lifetime of the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    value: Option<Level>,
}

impl MemoryStore {
    /// Creates a store pre-populated with `value`.
    #[must_use]
    pub const fn with_value(value: Level) -> Self {
        Self { value: Some(value) }
    }

    /// Value currently held by the store.
    #[must_use]
    pub const fn value(&self) -> Option<Level> {
        self.value
    }
}

impl HighestLevelStore for MemoryStore {
    fn load(&mut self) -> Result<Option<Level>, StoreError> {
        Ok(self.value)
    }

    fn save(&mut self, level: Level) -> Result<(), StoreError> {
        self.value = Some(level);
        Ok(())
    }
}

/// Store backed by a JSON object file mapping keys to values.
///
/// Unrelated keys already present in the file are preserved when saving.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store reading and writing `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }

        let value: Value = serde_json::from_str(&text).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source: Some(source),
        })?;
        match value {
            Value::Object(entries) => Ok(entries),
            _ => Err(StoreError::Format {
                path: self.path.clone(),
                source: None,
            }),
        }
    }
}

impl HighestLevelStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<Level>, StoreError> {
        let entries = self.read_entries()?;
        let Some(value) = entries.get(HIGHEST_LEVEL_KEY) else {
            return Ok(None);
        };
        value
            .as_u64()
            .and_then(|level| u32::try_from(level).ok())
            .map(|level| Some(Level::new(level)))
            .ok_or_else(|| StoreError::InvalidValue {
                key: HIGHEST_LEVEL_KEY.to_owned(),
                value: value.clone(),
            })
    }

    fn save(&mut self, level: Level) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        let _ = entries.insert(HIGHEST_LEVEL_KEY.to_owned(), Value::from(level.get()));
        let text = serde_json::to_string_pretty(&Value::Object(entries)).map_err(|source| {
            StoreError::Format {
                path: self.path.clone(),
                source: Some(source),
            }
        })?;
        fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
