//! Port for back-office user accounts.
use async_trait::async_trait;

use crate::domain::{NewUser, UserCredentials, UserId};

use super::PersistenceError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stored credentials for `email`, if such a user exists.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, PersistenceError>;

    /// Create the user unless one with the same email exists; return its id.
    async fn ensure_user(&self, user: &NewUser) -> Result<UserId, PersistenceError>;
}
