//! Password authentication against stored bcrypt hashes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::auth::{hash_password, verify_password};
use super::ports::{LoginService, UserRepository};
use super::{AccessLevel, AuthenticatedUser, Error, LoginCredentials, NewUser, UserId};

/// Message shown for any failed login.
pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// `LoginService` backed by the user repository.
#[derive(Clone)]
pub struct PasswordLoginService {
    users: Arc<dyn UserRepository>,
}

impl PasswordLoginService {
    /// Create a service reading users from `users`.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl LoginService for PasswordLoginService {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let Some(stored) = self.users.find_credentials(credentials.email()).await? else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let password = Zeroizing::new(credentials.password().to_owned());
        if !verify_password(password, stored.password_hash).await? {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        Ok(AuthenticatedUser {
            id: stored.id,
            access_level: stored.access_level,
        })
    }
}

/// Administrator account requested by configuration.
#[derive(Debug, Clone)]
pub struct AdministratorSeed {
    /// Login email.
    pub email: String,
    /// Plain-text password; hashed before storage.
    pub password: Zeroizing<String>,
    /// bcrypt cost factor.
    pub cost: u32,
}

/// Create the configured administrator unless a user with that email exists.
pub async fn ensure_administrator(
    users: &dyn UserRepository,
    seed: AdministratorSeed,
) -> Result<UserId, Error> {
    let AdministratorSeed {
        email,
        password,
        cost,
    } = seed;

    if let Some(existing) = users.find_credentials(&email).await? {
        if !existing.access_level.is_administrator() {
            warn!(%email, "configured administrator exists without admin access");
        }
        return Ok(existing.id);
    }

    let password_hash = hash_password(password, cost).await?;
    let id = users
        .ensure_user(&NewUser {
            first_name: "Admin".to_owned(),
            last_name: "User".to_owned(),
            email: email.clone(),
            password_hash,
            access_level: AccessLevel::ADMINISTRATOR,
        })
        .await?;
    info!(%email, user_id = %id, "administrator account provisioned");
    Ok(id)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for login and administrator provisioning.
    use super::*;
    use crate::domain::ports::{MockUserRepository, PersistenceError};
    use crate::domain::{ErrorCode, UserCredentials};
    use rstest::rstest;

    fn hash(password: &str) -> String {
        bcrypt::hash(password, 4).expect("hash fixture password")
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("valid credentials")
    }

    fn repository_with_admin() -> MockUserRepository {
        let stored = UserCredentials {
            id: UserId::new(1),
            password_hash: hash("password"),
            access_level: AccessLevel::ADMINISTRATOR,
        };
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().returning(move |email| {
            Ok((email == "admin@admin.com").then(|| stored.clone()))
        });
        users
    }

    #[rstest]
    #[tokio::test]
    async fn authenticates_matching_password() {
        let service = PasswordLoginService::new(Arc::new(repository_with_admin()));
        let user = service
            .authenticate(&credentials("admin@admin.com", "password"))
            .await
            .expect("login succeeds");
        assert_eq!(user.id, UserId::new(1));
        assert!(user.access_level.is_administrator());
    }

    #[rstest]
    #[case("admin@admin.com", "wrong")]
    #[case("nobody@admin.com", "password")]
    #[tokio::test]
    async fn rejects_bad_credentials_with_one_message(#[case] email: &str, #[case] password: &str) {
        let service = PasswordLoginService::new(Arc::new(repository_with_admin()));
        let error = service
            .authenticate(&credentials(email, password))
            .await
            .expect_err("login fails");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    #[tokio::test]
    async fn repository_failures_are_not_reported_as_bad_credentials() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials()
            .returning(|_| Err(PersistenceError::connection("refused")));
        let service = PasswordLoginService::new(Arc::new(users));
        let error = service
            .authenticate(&credentials("admin@admin.com", "password"))
            .await
            .expect_err("login fails");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_administrator_creates_missing_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().returning(|_| Ok(None));
        users
            .expect_ensure_user()
            .withf(|user| {
                user.email == "owner@example.com"
                    && user.access_level.is_administrator()
                    && bcrypt::verify("s3cret", &user.password_hash).unwrap_or(false)
            })
            .times(1)
            .returning(|_| Ok(UserId::new(7)));

        let id = ensure_administrator(
            &users,
            AdministratorSeed {
                email: "owner@example.com".to_owned(),
                password: Zeroizing::new("s3cret".to_owned()),
                cost: 4,
            },
        )
        .await
        .expect("provisioning succeeds");
        assert_eq!(id, UserId::new(7));
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_administrator_keeps_existing_user() {
        let mut users = repository_with_admin();
        users.expect_ensure_user().never();

        let id = ensure_administrator(
            &users,
            AdministratorSeed {
                email: "admin@admin.com".to_owned(),
                password: Zeroizing::new("ignored".to_owned()),
                cost: 4,
            },
        )
        .await
        .expect("provisioning succeeds");
        assert_eq!(id, UserId::new(1));
    }
}
