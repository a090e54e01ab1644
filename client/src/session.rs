//! Local session cache. The last server-confirmed user and stamp count are kept under a fixed key
//! so the card can be shown again after a restart, or while the server cannot be reached.

use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::MAX_STAMPS;

/// Storage key of the cached session. Bump the suffix when the payload format changes.
pub const SESSION_KEY: &str = "digistamp_session_v1";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage failed: {0}")]
    Io(#[from] io::Error),
    #[error("session could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value storage, the equivalent of a browser's local storage.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Keeps values in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Keeps each key in its own `<key>.json` file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir)?;
        // write then rename, so a crash never leaves half a session behind
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(tmp, self.path(key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// A session as restored from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSession {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub stamps: u32,
}

/// On-disk shape, shared with the browser front end.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
    #[serde(default, alias = "userId")]
    current_user_id: Option<i64>,
    #[serde(default, alias = "name")]
    current_name: Option<String>,
    #[serde(default, alias = "email")]
    current_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_stamps")]
    stamps: u32,
}

/// Anything that is not a finite number counts as zero stamps.
fn lenient_stamps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| value.as_f64())
        .filter(|stamps| stamps.is_finite())
        .map(|stamps| stamps.clamp(0.0, f64::from(MAX_STAMPS)) as u32)
        .unwrap_or(0))
}

pub struct SessionCache<S> {
    store: S,
}

impl<S: SessionStore> SessionCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save(&self, session: &CachedSession) -> Result<(), SessionError> {
        let payload = Payload {
            current_user_id: Some(session.user_id),
            current_name: Some(session.name.clone()),
            current_email: Some(session.email.clone()),
            stamps: session.stamps,
        };
        self.store.set(SESSION_KEY, &serde_json::to_string(&payload)?)
    }

    /// Restores the cached session. A missing, unreadable, or id-less entry is no session.
    pub fn load(&self) -> Option<CachedSession> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("could not read cached session: {}", e);
                return None;
            }
        };
        let payload: Payload = match serde_json::from_str(&raw) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("ignoring malformed cached session: {}", e);
                return None;
            }
        };
        let user_id = payload.current_user_id.filter(|id| *id != 0)?;
        Some(CachedSession {
            user_id,
            name: payload.current_name.unwrap_or_default(),
            email: payload.current_email.unwrap_or_default(),
            stamps: payload.stamps,
        })
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.store.remove(SESSION_KEY)
    }
}
