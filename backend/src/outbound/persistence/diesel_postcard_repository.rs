//! PostgreSQL-backed postcard and contact repositories.
//!
//! Sending a postcard writes the postcard row and both directed contact rows
//! in one transaction. Contact rows are upserted with a single statement so
//! concurrent sends between the same pair append rather than overwrite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{
    ContactRepository, ContactRepositoryError, PostcardRepository, PostcardRepositoryError,
};
use crate::domain::{Contact, ContactEdge, Postcard, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error, row_count};
use super::models::{ContactRow, PostcardRow};
use super::pool::{DbPool, PoolError};
use super::schema::{contacts, postcards};

const UPSERT_CONTACT: &str = "\
INSERT INTO contacts (owner_id, counterpart_id, last_postcard_at, postcard_ids) \
VALUES ($1, $2, $3, ARRAY[$4]::uuid[]) \
ON CONFLICT (owner_id, counterpart_id) DO UPDATE SET \
last_postcard_at = EXCLUDED.last_postcard_at, \
postcard_ids = CASE \
WHEN $4 = ANY(contacts.postcard_ids) THEN contacts.postcard_ids \
ELSE contacts.postcard_ids || EXCLUDED.postcard_ids END";

/// Diesel-backed implementation of the `PostcardRepository` port.
#[derive(Clone)]
pub struct DieselPostcardRepository {
    pool: DbPool,
}

impl DieselPostcardRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostcardRepositoryError {
    map_basic_pool_error(error, PostcardRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PostcardRepositoryError {
    map_basic_diesel_error(
        error,
        PostcardRepositoryError::query,
        PostcardRepositoryError::connection,
    )
}

async fn upsert_contact(
    conn: &mut AsyncPgConnection,
    edge: &ContactEdge,
) -> Result<usize, diesel::result::Error> {
    diesel::sql_query(UPSERT_CONTACT)
        .bind::<sql_types::Uuid, _>(*edge.owner.as_uuid())
        .bind::<sql_types::Uuid, _>(*edge.counterpart.as_uuid())
        .bind::<sql_types::Timestamptz, _>(edge.sent_at)
        .bind::<sql_types::Uuid, _>(*edge.postcard_id.as_uuid())
        .execute(conn)
        .await
}

#[async_trait]
impl PostcardRepository for DieselPostcardRepository {
    async fn insert_with_contacts(
        &self,
        postcard: &Postcard,
        edges: &[ContactEdge; 2],
    ) -> Result<(), PostcardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = PostcardRow::from(postcard);

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(postcards::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                for edge in edges {
                    upsert_contact(conn, edge).await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_delivered_to(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Postcard>, PostcardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostcardRow> = postcards::table
            .filter(postcards::recipient_id.eq(recipient.as_uuid()))
            .filter(postcards::delivered.eq(true))
            .order((postcards::delivery_date.desc(), postcards::created_at.desc()))
            .select(PostcardRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| Postcard::try_from(row).map_err(PostcardRepositoryError::query))
            .collect()
    }

    async fn deliver_due(&self, now: DateTime<Utc>) -> Result<u64, PostcardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            postcards::table
                .filter(postcards::delivered.eq(false))
                .filter(postcards::delivery_date.le(now)),
        )
        .set((
            postcards::delivered.eq(true),
            postcards::delivered_at.eq(Some(now)),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        debug!(updated, %now, "postcards delivered");
        Ok(row_count(updated))
    }
}

/// Diesel-backed implementation of the `ContactRepository` port.
#[derive(Clone)]
pub struct DieselContactRepository {
    pool: DbPool,
}

impl DieselContactRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for DieselContactRepository {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Contact>, ContactRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, ContactRepositoryError::connection))?;

        let rows: Vec<ContactRow> = contacts::table
            .filter(contacts::owner_id.eq(owner.as_uuid()))
            .order(contacts::last_postcard_at.desc())
            .select(ContactRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_basic_diesel_error(
                    err,
                    ContactRepositoryError::query,
                    ContactRepositoryError::connection,
                )
            })?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error = map_pool_error(PoolError::checkout("connection refused"));
        assert_eq!(
            error,
            PostcardRepositoryError::connection("connection refused")
        );
    }

    #[rstest]
    fn contact_upsert_keeps_postcard_ids_a_set() {
        assert!(UPSERT_CONTACT.contains("ON CONFLICT (owner_id, counterpart_id)"));
        assert!(UPSERT_CONTACT.contains("= ANY(contacts.postcard_ids)"));
    }
}
