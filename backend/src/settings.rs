//! Application settings loaded via OrthoConfig.
//!
//! Every key can be supplied as a `BOOKINGS_*` environment variable, a CLI
//! flag or a configuration file entry. Unset keys fall back to the defaults
//! below.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::AdministratorSeed;
use crate::outbound::mail::SmtpSettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_OWNER_EMAIL: &str = "owner@bookings.local";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAIL_QUEUE_CAPACITY: usize = 100;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// Only one of `admin_email` and `admin_password` was given.
    #[error("admin_email and admin_password must be set together")]
    PartialAdministrator,
}

/// Configuration values for the booking server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKINGS")]
pub struct AppSettings {
    /// Listen address.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Time budget for each repository operation, in milliseconds.
    pub db_timeout_ms: Option<u64>,
    /// Connection pool size.
    pub db_max_connections: Option<u32>,
    /// Marks session cookies `Secure` and requires a session key file.
    #[ortho_config(default = false)]
    pub in_production: bool,
    /// Session lifetime in hours.
    pub session_ttl_hours: Option<i64>,
    /// File holding at least 64 bytes of cookie signing key.
    pub session_key_file: Option<PathBuf>,
    /// Owner notification address and sender of guest mail.
    pub owner_email: Option<String>,
    /// Administrator login to provision at start-up.
    pub admin_email: Option<String>,
    /// Password for `admin_email`.
    pub admin_password: Option<String>,
    /// SMTP relay; mail is logged instead when absent.
    pub smtp_host: Option<String>,
    /// SMTP submission port.
    pub smtp_port: Option<u16>,
    /// SMTP login; used only together with `smtp_password`.
    pub smtp_username: Option<String>,
    /// SMTP password.
    pub smtp_password: Option<String>,
    /// Capacity of the outbound mail queue.
    pub mail_queue_capacity: Option<usize>,
}

impl AppSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.trim().parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Per-operation repository timeout.
    #[must_use]
    pub fn db_timeout(&self) -> Duration {
        Duration::from_millis(self.db_timeout_ms.unwrap_or(DEFAULT_DB_TIMEOUT_MS))
    }

    /// Connection pool size, at least one.
    #[must_use]
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    /// Session lifetime in hours.
    #[must_use]
    pub fn session_ttl_hours(&self) -> i64 {
        self.session_ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS)
    }

    /// Owner address.
    #[must_use]
    pub fn owner_email(&self) -> &str {
        self.owner_email.as_deref().unwrap_or(DEFAULT_OWNER_EMAIL)
    }

    /// Outbound mail queue capacity.
    #[must_use]
    pub fn mail_queue_capacity(&self) -> usize {
        self.mail_queue_capacity
            .unwrap_or(DEFAULT_MAIL_QUEUE_CAPACITY)
    }

    /// Administrator to provision, if configured.
    ///
    /// # Errors
    /// Returns [`SettingsError::PartialAdministrator`] when only one of the
    /// two keys is set.
    pub fn administrator(&self) -> Result<Option<AdministratorSeed>, SettingsError> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Ok(Some(AdministratorSeed {
                email: email.trim().to_owned(),
                password: Zeroizing::new(password.clone()),
                cost: bcrypt::DEFAULT_COST,
            })),
            (None, None) => Ok(None),
            _ => Err(SettingsError::PartialAdministrator),
        }
    }

    /// SMTP relay settings, if a host is configured.
    #[must_use]
    pub fn smtp(&self) -> Option<SmtpSettings> {
        let host = self.smtp_host.as_deref()?.trim();
        if host.is_empty() {
            return None;
        }
        let credentials = self
            .smtp_username
            .clone()
            .zip(self.smtp_password.clone());
        Some(SmtpSettings {
            host: host.to_owned(),
            port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            credentials,
        })
    }
}
