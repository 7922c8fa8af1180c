//! PostgreSQL-backed `JoinRequestRepository` implementation using Diesel ORM.
//!
//! Approval locks the request, the barber and the shop rows in that order
//! before re-checking the seat rules, so two owners racing for the last seat
//! (or one barber approved by two shops) resolve to exactly one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{JoinRequestRepository, JoinRequestRepositoryError};
use crate::domain::{
    JoinApproval, JoinRequest, JoinRequestAction, JoinRequestId, RuleViolation, ShopId,
};

use super::diesel_error_mapping::{self, TxError};
use super::diesel_shop_repository::{load_shop, lock_barber, lock_existing_shop, seat_barber};
use super::models::JoinRequestRow;
use super::pool::{DbPool, PoolError};
use super::row_conversions::{join_request_to_row, row_to_join_request};
use super::schema::join_requests;

/// Diesel-backed implementation of the `JoinRequestRepository` port.
#[derive(Clone)]
pub struct DieselJoinRequestRepository {
    pool: DbPool,
}

impl DieselJoinRequestRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> JoinRequestRepositoryError {
    diesel_error_mapping::map_pool_error(error)
}

fn map_diesel_error(error: diesel::result::Error) -> JoinRequestRepositoryError {
    diesel_error_mapping::map_diesel_error(error)
}

fn map_tx_error(error: TxError) -> JoinRequestRepositoryError {
    diesel_error_mapping::map_tx_error(error)
}

/// Lock a pending request and move it to its terminal state.
async fn resolve_locked(
    conn: &mut AsyncPgConnection,
    id: Uuid,
    action: JoinRequestAction,
    at: DateTime<Utc>,
) -> Result<JoinRequest, TxError> {
    let row: Option<JoinRequestRow> = join_requests::table
        .find(id)
        .select(JoinRequestRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let row = row.ok_or(TxError::Rejected(RuleViolation::Missing {
        entity: "join request",
    }))?;
    let mut request = row_to_join_request(row).map_err(TxError::Corrupt)?;
    request.resolve(action, at)?;
    Ok(request)
}

async fn store_resolution(
    conn: &mut AsyncPgConnection,
    request: &JoinRequest,
) -> Result<(), TxError> {
    diesel::update(join_requests::table.find(request.id.as_uuid()))
        .set((
            join_requests::status.eq(request.status.as_str()),
            join_requests::responded_at.eq(request.responded_at),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl JoinRequestRepository for DieselJoinRequestRepository {
    async fn submit(&self, request: &JoinRequest) -> Result<(), JoinRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = join_request_to_row(request);
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let barber = lock_barber(conn, row.barber_id).await?;
                if !barber.is_solo() {
                    return Err(RuleViolation::AlreadyAffiliated.into());
                }
                let shop = load_shop(conn, row.shop_id, false)
                    .await?
                    .ok_or(TxError::Rejected(RuleViolation::Missing { entity: "shop" }))?;
                if shop.is_full() {
                    return Err(RuleViolation::ShopFull.into());
                }
                diesel::insert_into(join_requests::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn find_by_id(
        &self,
        id: &JoinRequestId,
    ) -> Result<Option<JoinRequest>, JoinRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<JoinRequestRow> = join_requests::table
            .find(id.as_uuid())
            .select(JoinRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_join_request)
            .transpose()
            .map_err(JoinRequestRepositoryError::query)
    }

    async fn list_for_shop(
        &self,
        shop_id: &ShopId,
    ) -> Result<Vec<JoinRequest>, JoinRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<JoinRequestRow> = join_requests::table
            .filter(join_requests::shop_id.eq(shop_id.as_uuid()))
            .select(JoinRequestRow::as_select())
            .order_by(join_requests::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(row_to_join_request)
            .collect::<Result<Vec<_>, _>>()
            .map_err(JoinRequestRepositoryError::query)
    }

    async fn approve(
        &self,
        id: &JoinRequestId,
        seat_number: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<JoinApproval, JoinRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let request_id = *id.as_uuid();
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let request =
                    resolve_locked(conn, request_id, JoinRequestAction::Approve, at).await?;
                let barber = lock_barber(conn, *request.barber_id.as_uuid()).await?;
                if !barber.is_solo() {
                    return Err(RuleViolation::AlreadyAffiliated.into());
                }
                let mut shop = lock_existing_shop(conn, *request.shop_id.as_uuid()).await?;
                let assigned_seat = shop.assign_seat(request.barber_id, seat_number)?;
                seat_barber(
                    conn,
                    *request.barber_id.as_uuid(),
                    *shop.id.as_uuid(),
                    assigned_seat,
                )
                .await?;
                store_resolution(conn, &request).await?;
                Ok(JoinApproval {
                    request,
                    assigned_seat,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn reject(
        &self,
        id: &JoinRequestId,
        at: DateTime<Utc>,
    ) -> Result<JoinRequest, JoinRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let request_id = *id.as_uuid();
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let request =
                    resolve_locked(conn, request_id, JoinRequestAction::Reject, at).await?;
                store_resolution(conn, &request).await?;
                Ok(request)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}
