//! Whole-file JSON cache of weather results keyed by lowercase city name.
//!
//! The snapshot is a JSON object:
//!
//! ```json
//! {
//!   "london": {
//!     "data": { "city": "London", "temperature": 15.0, "humidity": 70, "description": "clear sky" },
//!     "timestamp": 1760000000.0,
//!     "units": "metric"
//!   }
//! }
//! ```
//!
//! Every write replaces the whole file. Entries for other cities are carried
//! over as raw JSON, so entries this version can't interpret survive a write.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fmt::Debug,
    fs, io,
    path::PathBuf,
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tracing::{debug, warn};

use crate::{
    error::CacheError,
    model::{Units, WeatherResult},
};

pub const DEFAULT_CACHE_FILE: &str = "cache.json";
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Raw snapshot as stored on disk.
pub type CacheSnapshot = Map<String, Value>;

/// Backing storage for the cache snapshot.
pub trait CacheStorage: Send + Sync + Debug {
    /// `Ok(None)` means nothing has been stored yet.
    fn read(&self) -> io::Result<Option<String>>;

    fn write(&self, contents: &str) -> io::Result<()>;
}

/// Cache snapshot kept in a single file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStorage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, contents)
    }
}

/// In-process storage, handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contents: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self { contents: Mutex::new(Some(contents.into())) }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CacheStorage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_string());
        Ok(())
    }
}

/// One cached lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Lowercase lookup key. Lives in the snapshot as the object key.
    #[serde(skip)]
    pub city: String,

    #[serde(rename = "data")]
    pub weather: WeatherResult,

    /// Seconds since the Unix epoch. Missing in old files, which makes the entry stale.
    #[serde(rename = "timestamp", default)]
    pub captured_at: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: f64, ttl: Duration) -> bool {
        now - self.captured_at < ttl.as_secs_f64()
    }

    /// Entries without recorded units are accepted for any request.
    pub fn matches_units(&self, units: Units) -> bool {
        self.units.is_none_or(|u| u == units)
    }
}

/// Read-modify-write store over a [`CacheStorage`] backend.
#[derive(Debug)]
pub struct CacheStore<S: CacheStorage = FileStorage> {
    storage: S,
}

impl CacheStore<FileStorage> {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(FileStorage::new(path))
    }
}

impl<S: CacheStorage> CacheStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the snapshot, distinguishing "nothing stored" from unusable contents.
    pub fn try_load(&self) -> Result<CacheSnapshot, CacheError> {
        let Some(raw) = self.storage.read()? else {
            return Ok(CacheSnapshot::new());
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(CacheError::Corrupt(format!(
                "expected an object at the top level, found {}",
                json_kind(&other)
            ))),
            Err(err) => Err(CacheError::Corrupt(err.to_string())),
        }
    }

    /// Load the snapshot; anything unreadable counts as an empty cache.
    pub fn load(&self) -> CacheSnapshot {
        self.try_load().unwrap_or_else(|err| {
            warn!(error = %err, "Ignoring unreadable weather cache");
            CacheSnapshot::new()
        })
    }

    pub fn get(&self, city: &str) -> Option<CacheEntry> {
        let key = cache_key(city);
        let raw = self.load().remove(&key)?;

        match serde_json::from_value::<CacheEntry>(raw) {
            Ok(mut entry) => {
                entry.city = key;
                Some(entry)
            }
            Err(err) => {
                warn!(city = %key, error = %err, "Ignoring malformed cache entry");
                None
            }
        }
    }

    /// Insert or replace the entry for `city`, keeping every other entry as-is.
    pub fn put(
        &self,
        city: &str,
        weather: &WeatherResult,
        captured_at: f64,
        units: Units,
    ) -> Result<(), CacheError> {
        let key = cache_key(city);
        let entry = CacheEntry {
            city: key.clone(),
            weather: weather.clone(),
            captured_at,
            units: Some(units),
        };

        let mut snapshot = self.load();
        snapshot.insert(key.clone(), serde_json::to_value(&entry)?);

        let contents = serde_json::to_string_pretty(&Value::Object(snapshot))?;
        self.storage.write(&contents)?;

        debug!(city = %key, "Saved weather to cache");
        Ok(())
    }
}

/// Cache keys are lowercase so lookups are case-insensitive.
pub fn cache_key(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Current time as fractional seconds since the Unix epoch.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
