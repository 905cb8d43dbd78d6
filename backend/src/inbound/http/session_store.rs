//! Server-side session storage.
//!
//! The cookie only carries an opaque 64-character key; session state lives
//! in a map shared by every worker. Entries expire after their TTL; an
//! expired entry is dropped when its key is loaded, and every new session
//! sweeps out all expired entries so abandoned sessions do not accumulate.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::{Duration, OffsetDateTime};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use tracing::debug;

type SessionState = HashMap<String, String>;

const SESSION_KEY_LEN: usize = 64;

#[derive(Debug, Clone)]
struct Entry {
    state: SessionState,
    expires_at: OffsetDateTime,
}

impl Entry {
    fn new(state: SessionState, ttl: &Duration) -> Self {
        Self {
            state,
            expires_at: OffsetDateTime::now_utc() + *ttl,
        }
    }

    fn is_live(&self) -> bool {
        self.expires_at > OffsetDateTime::now_utc()
    }
}

/// In-process `SessionStore` shared across actix workers.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when no sessions are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn generate_key() -> Result<SessionKey, anyhow::Error> {
        let raw: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_KEY_LEN)
            .map(char::from)
            .collect();
        SessionKey::try_from(raw).map_err(anyhow::Error::from)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        let mut entries = self.write();
        let key = session_key.as_ref();
        match entries.get(key) {
            Some(entry) if entry.is_live() => Ok(Some(entry.state.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        let key = Self::generate_key().map_err(SaveError::Other)?;
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live());
        let swept = before - entries.len();
        if swept > 0 {
            debug!(swept, "expired sessions removed");
        }
        entries.insert(key.as_ref().to_owned(), Entry::new(session_state, ttl));
        Ok(key)
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        let mut entries = self.write();
        if let Some(entry) = entries.get_mut(session_key.as_ref()) {
            *entry = Entry::new(session_state, ttl);
            return Ok(session_key);
        }
        drop(entries);
        self.save(session_state, ttl).await.map_err(|err| match err {
            SaveError::Serialization(err) => UpdateError::Serialization(err),
            SaveError::Other(err) => UpdateError::Other(err),
        })
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> Result<(), anyhow::Error> {
        if let Some(entry) = self.write().get_mut(session_key.as_ref()) {
            entry.expires_at = OffsetDateTime::now_utc() + *ttl;
        }
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> Result<(), anyhow::Error> {
        self.write().remove(session_key.as_ref());
        Ok(())
    }
}
