//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{PersistenceError, UserRepository};
use crate::domain::{NewUser, UserCredentials, UserId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_helpers::bounded;
use super::models::{NewUserRow, UserCredentialsRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        bounded(self.pool.operation_timeout(), "find user", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row: Option<UserCredentialsRow> = users::table
                .filter(users::email.eq(email))
                .select(UserCredentialsRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            Ok(row.map(UserCredentials::from))
        })
        .await
    }

    async fn ensure_user(&self, user: &NewUser) -> Result<UserId, PersistenceError> {
        let row = NewUserRow {
            first_name: &user.first_name,
            last_name: &user.last_name,
            email: &user.email,
            password: &user.password_hash,
            access_level: user.access_level.get(),
        };
        bounded(self.pool.operation_timeout(), "ensure user", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let inserted: Option<i32> = diesel::insert_into(users::table)
                .values(&row)
                .on_conflict(users::email)
                .do_nothing()
                .returning(users::id)
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            if let Some(id) = inserted {
                debug!(user_id = id, "user created");
                return Ok(UserId::new(id));
            }
            let existing: i32 = users::table
                .filter(users::email.eq(row.email))
                .select(users::id)
                .first(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(UserId::new(existing))
        })
        .await
    }
}
