//! On-disk JSON store for cached templates and form drafts
//!
//! Entries live as one JSON file per key under the store root. Cached
//! templates carry a TTL envelope and are removed lazily on the first
//! read past expiry; drafts persist until explicitly cleared.

use crate::error::StoreError;
use crate::form::FormData;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope<T> {
    data: T,
    /// Unix epoch milliseconds at write time
    timestamp: i64,
    /// Lifetime in milliseconds
    expiration: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct DraftEnvelope {
    form_data: FormData,
    timestamp: i64,
}

/// Key-value JSON store rooted at a directory
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open a store rooted at `path`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = path.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Open the store at the platform data directory
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when no data directory is available
    /// or it cannot be created.
    pub fn open_default() -> Result<Self, StoreError> {
        let base = dirs::data_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no platform data directory")
        })?;
        Self::open(base.join("sitesmith"))
    }

    /// Directory all entries are stored under
    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Write `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when serialization or the write fails.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.entry_path(key), json)?;
        Ok(())
    }

    /// Read the entry under `key`, or `None` when absent
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the entry exists but cannot be read
    /// or deserialized.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Remove the entry under `key`, if present
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the removal fails.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Cache a fetched template under its id with a TTL
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the entry cannot be written.
    pub fn cache_template<T: Serialize>(
        &self,
        id: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let envelope = CacheEnvelope {
            data: value,
            timestamp: Utc::now().timestamp_millis(),
            expiration: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        };
        self.set(&template_key(id), &envelope)
    }

    /// Read a cached template, removing it when past its TTL
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a present entry cannot be read or
    /// the expired entry cannot be removed.
    pub fn cached_template<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let key = template_key(id);
        let Some(envelope) = self.get::<CacheEnvelope<T>>(&key)? else {
            return Ok(None);
        };

        let age = Utc::now().timestamp_millis() - envelope.timestamp;
        if age > envelope.expiration {
            debug!(id, age_ms = age, "cached template expired, removing");
            self.remove(&key)?;
            return Ok(None);
        }
        Ok(Some(envelope.data))
    }

    /// Persist the in-progress form data for a template
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the entry cannot be written.
    pub fn save_draft(&self, id: &str, data: &FormData) -> Result<(), StoreError> {
        let envelope = DraftEnvelope {
            form_data: data.clone(),
            timestamp: Utc::now().timestamp_millis(),
        };
        self.set(&draft_key(id), &envelope)
    }

    /// Read the saved draft for a template, or `None` when absent
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a present entry cannot be read.
    pub fn draft(&self, id: &str) -> Result<Option<FormData>, StoreError> {
        Ok(self
            .get::<DraftEnvelope>(&draft_key(id))?
            .map(|envelope| envelope.form_data))
    }

    /// Remove the saved draft for a template
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the removal fails.
    pub fn clear_draft(&self, id: &str) -> Result<(), StoreError> {
        self.remove(&draft_key(id))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

fn template_key(id: &str) -> String {
    format!("template_{id}")
}

fn draft_key(id: &str) -> String {
    format!("draft_{id}")
}

/// Keys become filenames; anything outside `[A-Za-z0-9._-]` maps to `_`
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldValue;
    use tempfile::TempDir;

    fn open_temp_store() -> (Store, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("store")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_set_get_remove_round_trip() {
        let (store, _dir) = open_temp_store();

        store.set("greeting", &"hello".to_string()).unwrap();
        assert_eq!(
            store.get::<String>("greeting").unwrap(),
            Some("hello".to_string())
        );

        store.remove("greeting").unwrap();
        assert_eq!(store.get::<String>("greeting").unwrap(), None);
    }

    #[test]
    fn test_get_absent_is_none() {
        let (store, _dir) = open_temp_store();
        assert_eq!(store.get::<String>("nope").unwrap(), None);
    }

    #[test]
    fn test_keys_are_sanitized_to_filenames() {
        let (store, _dir) = open_temp_store();

        store
            .set("octocat/Hello-World", &"entry".to_string())
            .unwrap();

        assert!(store.root().join("octocat_Hello-World.json").exists());
        assert_eq!(
            store.get::<String>("octocat/Hello-World").unwrap(),
            Some("entry".to_string())
        );
    }

    #[test]
    fn test_cached_template_round_trip() {
        let (store, _dir) = open_temp_store();

        store
            .cache_template("tpl", &"payload".to_string(), Duration::from_secs(3600))
            .unwrap();

        assert_eq!(
            store.cached_template::<String>("tpl").unwrap(),
            Some("payload".to_string())
        );
    }

    #[test]
    fn test_expired_template_is_removed_on_read() {
        let (store, _dir) = open_temp_store();

        // write an envelope that was already stale at the epoch
        let stale = CacheEnvelope {
            data: "payload".to_string(),
            timestamp: 0,
            expiration: 1,
        };
        store.set(&template_key("tpl"), &stale).unwrap();

        assert_eq!(store.cached_template::<String>("tpl").unwrap(), None);
        assert!(!store.root().join("template_tpl.json").exists());
    }

    #[test]
    fn test_draft_round_trip_and_clear() {
        let (store, _dir) = open_temp_store();

        let mut data = FormData::new();
        data.insert("name".to_string(), "Ada".into());
        data.insert("subscribed".to_string(), FieldValue::Flag(true));

        store.save_draft("tpl", &data).unwrap();
        assert_eq!(store.draft("tpl").unwrap(), Some(data));

        store.clear_draft("tpl").unwrap();
        assert_eq!(store.draft("tpl").unwrap(), None);
    }

    #[test]
    fn test_draft_and_template_keys_do_not_collide() {
        let (store, _dir) = open_temp_store();

        store
            .cache_template("x", &"tpl".to_string(), Duration::from_secs(60))
            .unwrap();
        store.save_draft("x", &FormData::new()).unwrap();

        assert_eq!(
            store.cached_template::<String>("x").unwrap(),
            Some("tpl".to_string())
        );
        assert_eq!(store.draft("x").unwrap(), Some(FormData::new()));
    }
}
