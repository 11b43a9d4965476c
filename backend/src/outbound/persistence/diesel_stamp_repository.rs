//! PostgreSQL-backed stamp catalogue, request queue, and collection ledger.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    CollectOutcome, StampCollectionRepository, StampCollectionRepositoryError, StampRepository,
    StampRepositoryError, StampRequestRepository, StampRequestRepositoryError,
};
use crate::domain::{
    CollectedStamp, CollectionEntry, Stamp, StampRequest, StampRequestId, StampRequestStatus,
    UserId,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewCollectionRow, NewStampRequestRow, StampRequestRow, StampRow};
use super::pool::DbPool;
use super::schema::{stamp_collections, stamp_requests, stamps};

fn stamp_diesel_error(error: diesel::result::Error) -> StampRepositoryError {
    map_basic_diesel_error(
        error,
        StampRepositoryError::query,
        StampRepositoryError::connection,
    )
}

fn request_diesel_error(error: diesel::result::Error) -> StampRequestRepositoryError {
    map_basic_diesel_error(
        error,
        StampRequestRepositoryError::query,
        StampRequestRepositoryError::connection,
    )
}

fn collection_diesel_error(error: diesel::result::Error) -> StampCollectionRepositoryError {
    map_basic_diesel_error(
        error,
        StampCollectionRepositoryError::query,
        StampCollectionRepositoryError::connection,
    )
}

fn stamps_from_rows(rows: Vec<StampRow>) -> Result<Vec<Stamp>, StampRepositoryError> {
    rows.into_iter()
        .map(|row| Stamp::try_from(row).map_err(StampRepositoryError::query))
        .collect()
}

fn request_from_row(row: StampRequestRow) -> Result<StampRequest, StampRequestRepositoryError> {
    StampRequest::try_from(row).map_err(StampRequestRepositoryError::query)
}

/// Failure inside the promotion transaction.
enum PromotionError {
    NotPending,
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for PromotionError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

/// Diesel-backed implementation of the `StampRepository` port.
#[derive(Clone)]
pub struct DieselStampRepository {
    pool: DbPool,
}

impl DieselStampRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(&self, approved_only: bool) -> Result<Vec<Stamp>, StampRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, StampRepositoryError::connection))?;

        let mut query = stamps::table
            .order((stamps::created_at.desc(), stamps::id.asc()))
            .select(StampRow::as_select())
            .into_boxed();
        if approved_only {
            query = query.filter(stamps::approved.eq(true));
        }
        let rows = query
            .load(&mut conn)
            .await
            .map_err(stamp_diesel_error)?;
        stamps_from_rows(rows)
    }
}

#[async_trait]
impl StampRepository for DieselStampRepository {
    async fn insert(&self, stamp: &Stamp) -> Result<(), StampRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, StampRepositoryError::connection))?;

        diesel::insert_into(stamps::table)
            .values(StampRow::from(stamp))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(stamp_diesel_error)
    }

    async fn insert_promoted(
        &self,
        stamp: &Stamp,
        request_id: &StampRequestId,
    ) -> Result<(), StampRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, StampRepositoryError::connection))?;
        let row = StampRow::from(stamp);
        let request_uuid = *request_id.as_uuid();
        let stamp_uuid = *stamp.id.as_uuid();

        let outcome = conn
            .transaction::<_, PromotionError, _>(|conn| {
                async move {
                    let flipped = diesel::update(
                        stamp_requests::table
                            .filter(stamp_requests::id.eq(request_uuid))
                            .filter(stamp_requests::status.eq(StampRequestStatus::Pending.as_str())),
                    )
                    .set((
                        stamp_requests::status.eq(StampRequestStatus::Approved.as_str()),
                        stamp_requests::stamp_id.eq(Some(stamp_uuid)),
                    ))
                    .execute(conn)
                    .await?;
                    if flipped == 0 {
                        return Err(PromotionError::NotPending);
                    }
                    diesel::insert_into(stamps::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(PromotionError::NotPending) => Err(StampRepositoryError::request_not_pending(
                request_id.to_string(),
            )),
            Err(PromotionError::Diesel(error)) => Err(stamp_diesel_error(error)),
        }
    }

    async fn list_all(&self) -> Result<Vec<Stamp>, StampRepositoryError> {
        self.load(false).await
    }

    async fn list_approved(&self) -> Result<Vec<Stamp>, StampRepositoryError> {
        self.load(true).await
    }
}

/// Diesel-backed implementation of the `StampRequestRepository` port.
#[derive(Clone)]
pub struct DieselStampRequestRepository {
    pool: DbPool,
}

impl DieselStampRequestRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StampRequestRepository for DieselStampRequestRepository {
    async fn insert(&self, request: &StampRequest) -> Result<(), StampRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, StampRequestRepositoryError::connection))?;
        let row = NewStampRequestRow {
            id: *request.id.as_uuid(),
            prompt: request.prompt.as_ref(),
            submitted_by: *request.submitted_by.as_uuid(),
            status: request.status.as_str(),
            created_at: request.created_at,
            stamp_id: request.stamp_id.map(|id| *id.as_uuid()),
        };

        diesel::insert_into(stamp_requests::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(request_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &StampRequestId,
    ) -> Result<Option<StampRequest>, StampRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, StampRequestRepositoryError::connection))?;

        let row: Option<StampRequestRow> = stamp_requests::table
            .find(id.as_uuid())
            .select(StampRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(request_diesel_error)?;

        row.map(request_from_row).transpose()
    }

    async fn list_pending(&self) -> Result<Vec<StampRequest>, StampRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, StampRequestRepositoryError::connection))?;

        let rows: Vec<StampRequestRow> = stamp_requests::table
            .filter(stamp_requests::status.eq(StampRequestStatus::Pending.as_str()))
            .order((stamp_requests::created_at.desc(), stamp_requests::id.desc()))
            .select(StampRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(request_diesel_error)?;

        rows.into_iter().map(request_from_row).collect()
    }

    async fn decide(
        &self,
        id: &StampRequestId,
        status: StampRequestStatus,
    ) -> Result<Option<StampRequest>, StampRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, StampRequestRepositoryError::connection))?;

        let row: Option<StampRequestRow> = diesel::update(
            stamp_requests::table
                .filter(stamp_requests::id.eq(id.as_uuid()))
                .filter(stamp_requests::status.eq(StampRequestStatus::Pending.as_str())),
        )
        .set(stamp_requests::status.eq(status.as_str()))
        .returning(StampRequestRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(request_diesel_error)?;

        row.map(request_from_row).transpose()
    }
}

/// Diesel-backed implementation of the `StampCollectionRepository` port.
#[derive(Clone)]
pub struct DieselStampCollectionRepository {
    pool: DbPool,
}

impl DieselStampCollectionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StampCollectionRepository for DieselStampCollectionRepository {
    async fn insert_if_absent(
        &self,
        entry: &CollectionEntry,
    ) -> Result<CollectOutcome, StampCollectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            map_basic_pool_error(err, StampCollectionRepositoryError::connection)
        })?;
        let row = NewCollectionRow {
            user_id: *entry.user_id.as_uuid(),
            stamp_id: *entry.stamp_id.as_uuid(),
            collected_at: entry.collected_at,
        };

        let inserted = diesel::insert_into(stamp_collections::table)
            .values(&row)
            .on_conflict((stamp_collections::user_id, stamp_collections::stamp_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(collection_diesel_error)?;

        Ok(if inserted == 0 {
            CollectOutcome::AlreadyCollected
        } else {
            CollectOutcome::Inserted
        })
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CollectedStamp>, StampCollectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            map_basic_pool_error(err, StampCollectionRepositoryError::connection)
        })?;

        let rows: Vec<(StampRow, chrono::DateTime<chrono::Utc>)> = stamp_collections::table
            .inner_join(stamps::table.on(stamps::id.eq(stamp_collections::stamp_id)))
            .filter(stamp_collections::user_id.eq(user_id.as_uuid()))
            .order(stamp_collections::collected_at.desc())
            .select((StampRow::as_select(), stamp_collections::collected_at))
            .load(&mut conn)
            .await
            .map_err(collection_diesel_error)?;

        rows.into_iter()
            .map(|(row, collected_at)| {
                Stamp::try_from(row)
                    .map(|stamp| CollectedStamp {
                        stamp,
                        collected_at,
                    })
                    .map_err(StampCollectionRepositoryError::query)
            })
            .collect()
    }
}
