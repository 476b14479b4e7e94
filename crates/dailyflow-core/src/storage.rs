use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub const ONBOARDING_COMPLETE_KEY: &str = "dailyflow_onboarding_complete";
pub const ONBOARDING_ANSWERS_KEY: &str = "dailyflow_onboarding_answers";
pub const THEME_KEY: &str = "dailyflow_theme";
pub const WELCOME_SHOWN_KEY: &str = "dailyflow_welcome_shown";
pub const SETTINGS_KEY: &str = "dailyflow_settings";
pub const NOTIFICATION_IDS_KEY: &str = "dailyflow_notification_ids";
pub const CALENDAR_CONNECTED_KEY: &str = "dailyflow_calendar_connected";

/// Raw key → string persistence, the terminal stand-in for browser local
/// storage.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    map: BTreeMap<String, String>,
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.map.remove(key);
        Ok(())
    }
}

/// Whole map kept in memory and rewritten atomically on every change.
#[derive(Debug)]
pub struct FileBackend {
    pub path: PathBuf,
    map: BTreeMap<String, String>,
}

impl FileBackend {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let path = data_dir.join("local_storage.json");
        let map = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed reading {}", path.display()))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                    Ok(map) => map,
                    Err(err) => {
                        warn!(
                            file = %path.display(),
                            error = %err,
                            "local storage is malformed; starting empty"
                        );
                        BTreeMap::new()
                    }
                }
            }
        } else {
            BTreeMap::new()
        };

        info!(file = %path.display(), keys = map.len(), "opened local storage");
        Ok(Self { path, map })
    }

    fn flush(&self) -> anyhow::Result<()> {
        let serialized = serde_json::to_string_pretty(&self.map)?;
        write_atomic(&self.path, serialized.as_bytes())
            .with_context(|| format!("failed to save {}", self.path.display()))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        self.map.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        if self.map.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Typed, JSON-encoded access on top of a [`StorageBackend`].
pub struct LocalStorage {
    backend: Box<dyn StorageBackend>,
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage").finish_non_exhaustive()
    }
}

impl LocalStorage {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::default()))
    }

    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(Box::new(FileBackend::open(data_dir)?)))
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.backend.get(key)
    }

    /// `None` when the key is missing or its value does not parse.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "ignoring malformed stored value");
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> anyhow::Result<()> {
        let encoded = serde_json::to_string(value)
            .with_context(|| format!("failed to encode value for {key}"))?;
        debug!(key, "writing local storage");
        self.backend.set(key, encoded)
    }

    pub fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.backend.remove(key)
    }
}

/// Loads a JSON-lines file, skipping lines that do not parse.
#[tracing::instrument(skip(path))]
pub fn load_jsonl<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str(trimmed) {
            Ok(item) => out.push(item),
            Err(err) => {
                warn!(
                    file = %path.display(),
                    line = idx + 1,
                    error = %err,
                    "skipping malformed line"
                );
            }
        }
    }

    debug!(count = out.len(), "loaded jsonl entries");
    Ok(out)
}

#[tracing::instrument(skip(path, item))]
pub fn append_jsonl<T: Serialize>(path: &Path, item: &T) -> anyhow::Result<()> {
    let serialized = serde_json::to_string(item)?;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writeln!(file, "{serialized}")?;
    Ok(())
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;
    Ok(())
}
