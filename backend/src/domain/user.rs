//! Back-office users and their access levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary key of a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw database identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric access level stored with each user.
///
/// Level 3 and above may use the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(i32);

impl AccessLevel {
    /// Access level granted to administrators.
    pub const ADMINISTRATOR: Self = Self(3);

    /// Wrap a stored access level.
    #[must_use]
    pub const fn new(level: i32) -> Self {
        Self(level)
    }

    /// Raw stored value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// True when this level grants access to `/admin`.
    #[must_use]
    pub fn is_administrator(self) -> bool {
        self >= Self::ADMINISTRATOR
    }
}

/// Identity established by a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Authenticated user.
    pub id: UserId,
    /// Access level at login time.
    pub access_level: AccessLevel,
}

/// Stored credentials looked up by email during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    /// User primary key.
    pub id: UserId,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Access level.
    pub access_level: AccessLevel,
}

/// Administrator account created at start-up when configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Access level.
    pub access_level: AccessLevel,
}
