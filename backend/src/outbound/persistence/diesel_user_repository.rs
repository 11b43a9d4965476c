//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserAccount, UserRepository, UserRepositoryError};
use crate::domain::{User, UserId, UserSummary, Username};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error, unique_violation};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

diesel::define_sql_function!(fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text);

const USERNAME_CONSTRAINT: &str = "users_username_lower_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

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

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error, username: &Username) -> UserRepositoryError {
    match unique_violation(&error) {
        Some(USERNAME_CONSTRAINT) => UserRepositoryError::duplicate_username(username.as_ref()),
        Some(EMAIL_CONSTRAINT) => UserRepositoryError::duplicate_email(),
        _ => map_diesel_error(error),
    }
}

/// Escape `LIKE` metacharacters so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn into_account(row: UserRow) -> Result<UserAccount, UserRepositoryError> {
    row.into_account().map_err(UserRepositoryError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &account.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            email: user.email().as_ref(),
            password_hash: account.password_hash.as_str(),
            is_admin: user.is_admin(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, user.username()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let lowered = username.as_ref().to_lowercase();

        let row: Option<UserRow> = users::table
            .filter(lower(users::username).eq(lowered))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(into_account).transpose()
    }

    async fn find_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(into_account).transpose()?.map(|account| account.user))
    }

    async fn search(
        &self,
        needle: &str,
        exclude: &UserId,
        limit: usize,
    ) -> Result<Vec<UserSummary>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<UserRow> = users::table
            .filter(users::username.ilike(like_pattern(needle)))
            .filter(users::id.ne(exclude.as_uuid()))
            .order(users::username.asc())
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| into_account(row).map(|account| account.user.summary()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bo", "%bo%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("back\\slash", "%back\\\\slash%")]
    fn like_pattern_escapes_metacharacters(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(needle), expected);
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error = map_pool_error(PoolError::checkout("connection refused"));
        assert_eq!(error, UserRepositoryError::connection("connection refused"));
    }

    #[rstest]
    fn unrelated_errors_are_not_duplicates() {
        let username = Username::new("alice").expect("valid username");
        let error = map_insert_error(diesel::result::Error::NotFound, &username);
        assert!(matches!(error, UserRepositoryError::Query { .. }));
    }
}
