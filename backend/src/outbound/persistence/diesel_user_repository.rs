//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoredCredentials, UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, User, UserId};

use super::diesel_helpers::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_row(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRow>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }
}

fn to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    User::try_from(row).map_err(|err| err.into_port())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User, password_hash: &str) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(UserRow::new(user, password_hash))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, EMAIL_CONSTRAINT) {
                    UserRepositoryError::duplicate_email()
                } else {
                    map_diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_user)
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.find_row(email).await?.map(to_user).transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let Some(row) = self.find_row(email).await? else {
            return Ok(None);
        };
        let password_hash = row.password_hash.clone();
        Ok(Some(StoredCredentials {
            user: to_user(row)?,
            password_hash,
        }))
    }
}
