//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use bookings::domain::AdministratorSeed;
use bookings::inbound::http::session_config::SessionSettings;
use bookings::outbound::mail::SmtpSettings;
use bookings::outbound::persistence::DbPool;

const DEFAULT_MAIL_QUEUE_CAPACITY: usize = 100;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) owner_email: String,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) smtp: Option<SmtpSettings>,
    pub(crate) administrator: Option<AdministratorSeed>,
    pub(crate) mail_queue_capacity: usize,
}

impl ServerConfig {
    /// Construct a server configuration that stores data in memory and logs
    /// outbound mail.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, owner_email: String) -> Self {
        Self {
            session,
            bind_addr,
            owner_email,
            db_pool: None,
            smtp: None,
            administrator: None,
            mail_queue_capacity: DEFAULT_MAIL_QUEUE_CAPACITY,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses the Diesel repositories instead of
    /// the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Relay confirmation mail through SMTP instead of logging it.
    #[must_use]
    pub fn with_smtp(mut self, smtp: Option<SmtpSettings>) -> Self {
        self.smtp = smtp;
        self
    }

    /// Provision this administrator before accepting requests.
    #[must_use]
    pub fn with_administrator(mut self, administrator: Option<AdministratorSeed>) -> Self {
        self.administrator = administrator;
        self
    }

    /// Bound the number of queued outbound messages.
    #[must_use]
    pub fn with_mail_queue_capacity(mut self, capacity: usize) -> Self {
        self.mail_queue_capacity = capacity;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "exercised by bootstrap tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
