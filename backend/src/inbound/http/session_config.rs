//! Session cookie configuration.
//!
//! The cookie signing key is read from a file when one is configured.
//! Production deployments must provide one; elsewhere a random key is
//! generated, which invalidates sessions on restart.

use std::path::{Path, PathBuf};

use actix_session::SessionMiddleware;
use actix_session::config::PersistentSession;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use zeroize::Zeroize;

use super::session_store::MemorySessionStore;

const SESSION_KEY_MIN_LEN: usize = 64;
const SESSION_COOKIE_NAME: &str = "session";

/// Session settings derived from configuration.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing key for the session cookie.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Session lifetime.
    pub ttl: Duration,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Production requires a persistent key.
    #[error("a session key file is required in production")]
    EphemeralNotAllowed,
}

/// Build session settings.
///
/// # Errors
/// Fails when the key file cannot be read or is shorter than 64 bytes, or
/// when `in_production` is set without a key file.
pub fn session_settings(
    key_file: Option<&Path>,
    in_production: bool,
    ttl_hours: i64,
) -> Result<SessionSettings, SessionConfigError> {
    Ok(SessionSettings {
        key: session_key(key_file, in_production)?,
        cookie_secure: in_production,
        ttl: Duration::hours(ttl_hours.max(1)),
    })
}

fn session_key(key_file: Option<&Path>, in_production: bool) -> Result<Key, SessionConfigError> {
    let Some(path) = key_file else {
        if in_production {
            return Err(SessionConfigError::EphemeralNotAllowed);
        }
        warn!("no session key file configured; using an ephemeral key");
        return Ok(Key::generate());
    };

    let mut bytes = std::fs::read(path).map_err(|source| SessionConfigError::KeyRead {
        path: path.to_path_buf(),
        source,
    })?;
    let length = bytes.len();
    if length < SESSION_KEY_MIN_LEN {
        bytes.zeroize();
        return Err(SessionConfigError::KeyTooShort {
            path: path.to_path_buf(),
            length,
            min_len: SESSION_KEY_MIN_LEN,
        });
    }
    let key = Key::from(&bytes);
    bytes.zeroize();
    Ok(key)
}

/// Session middleware backed by `store`.
///
/// The cookie is `HttpOnly` and `SameSite=Lax`; it carries only the opaque
/// session key.
pub fn session_middleware(
    store: MemorySessionStore,
    settings: SessionSettings,
) -> SessionMiddleware<MemorySessionStore> {
    SessionMiddleware::builder(store, settings.key)
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(settings.ttl))
        .build()
}
