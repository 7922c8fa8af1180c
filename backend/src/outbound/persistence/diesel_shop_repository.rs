//! PostgreSQL-backed `ShopRepository` implementation using Diesel ORM.
//!
//! A shop's seat map is not stored separately: it is rebuilt from the
//! barber profiles whose `(shop_id, seat_number)` point at the shop. Writes
//! that depend on the seat map lock the shop row first, so seat assignment
//! and capacity changes serialise per shop.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ShopRepository, ShopRepositoryError};
use crate::domain::{BarberId, BarberProfile, ContactInfo, OpeningHours, RuleViolation, Shop, ShopId};

use super::diesel_error_mapping::{self, TxError};
use super::models::{BarberProfileRow, ShopRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{row_to_barber, row_to_shop, shop_to_row, to_db_int};
use super::schema::{barber_profiles, shops};

/// Diesel-backed implementation of the `ShopRepository` port.
#[derive(Clone)]
pub struct DieselShopRepository {
    pool: DbPool,
}

impl DieselShopRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ShopRepositoryError {
    diesel_error_mapping::map_pool_error(error)
}

fn map_tx_error(error: TxError) -> ShopRepositoryError {
    diesel_error_mapping::map_tx_error(error)
}

/// Load a shop and its seat map, optionally locking the shop row.
pub(super) async fn load_shop(
    conn: &mut AsyncPgConnection,
    id: Uuid,
    lock: bool,
) -> Result<Option<Shop>, TxError> {
    let query = shops::table.find(id).select(ShopRow::as_select());
    let row: Option<ShopRow> = if lock {
        query.for_update().first(conn).await.optional()?
    } else {
        query.first(conn).await.optional()?
    };
    let Some(row) = row else {
        return Ok(None);
    };
    let seated: Vec<(Uuid, Option<i32>)> = barber_profiles::table
        .filter(barber_profiles::shop_id.eq(id))
        .select((barber_profiles::id, barber_profiles::seat_number))
        .load(conn)
        .await?;
    row_to_shop(row, &seated).map(Some).map_err(TxError::Corrupt)
}

/// Load a shop under lock, rejecting when it does not exist.
pub(super) async fn lock_existing_shop(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Shop, TxError> {
    load_shop(conn, id, true)
        .await?
        .ok_or(TxError::Rejected(RuleViolation::Missing { entity: "shop" }))
}

/// Lock a barber profile row, rejecting when it does not exist.
pub(super) async fn lock_barber(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<BarberProfile, TxError> {
    let row: Option<BarberProfileRow> = barber_profiles::table
        .find(id)
        .select(BarberProfileRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let row = row.ok_or(TxError::Rejected(RuleViolation::Missing { entity: "barber" }))?;
    row_to_barber(row).map_err(TxError::Corrupt)
}

/// Record `barber_id` as seated at `seat_number` in `shop_id`.
pub(super) async fn seat_barber(
    conn: &mut AsyncPgConnection,
    barber_id: Uuid,
    shop_id: Uuid,
    seat_number: u32,
) -> Result<(), TxError> {
    diesel::update(barber_profiles::table.find(barber_id))
        .set((
            barber_profiles::shop_id.eq(Some(shop_id)),
            barber_profiles::seat_number.eq(Some(to_db_int(seat_number))),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

impl DieselShopRepository {
    async fn update_locked<F>(&self, id: &ShopId, change: F) -> Result<Shop, ShopRepositoryError>
    where
        F: FnOnce(&mut Shop) -> Result<(), RuleViolation> + Send,
    {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let shop_id = *id.as_uuid();
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let mut shop = lock_existing_shop(conn, shop_id).await?;
                change(&mut shop)?;
                let row = shop_to_row(&shop).map_err(TxError::Corrupt)?;
                diesel::update(shops::table.find(shop_id))
                    .set((
                        shops::total_seats.eq(row.total_seats),
                        shops::address.eq(row.address),
                        shops::phone.eq(row.phone),
                        shops::email.eq(row.email),
                        shops::opening_hours.eq(row.opening_hours),
                    ))
                    .execute(conn)
                    .await?;
                Ok(shop)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}

#[async_trait]
impl ShopRepository for DieselShopRepository {
    async fn create(&self, shop: &Shop) -> Result<(), ShopRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = shop_to_row(shop).map_err(ShopRepositoryError::query)?;
        let owner_seat = shop
            .seat_of(&shop.owner_id)
            .ok_or_else(|| ShopRepositoryError::query("new shop has no seat for its owner"))?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let owner = lock_barber(conn, row.owner_id).await?;
                let owned: i64 = shops::table
                    .filter(shops::owner_id.eq(row.owner_id))
                    .count()
                    .get_result(conn)
                    .await?;
                if owned > 0 {
                    return Err(RuleViolation::AlreadyOwnsShop.into());
                }
                if !owner.is_solo() {
                    return Err(RuleViolation::AlreadyAffiliated.into());
                }
                diesel::insert_into(shops::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                seat_barber(conn, row.owner_id, row.id, owner_seat).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn find_by_id(&self, id: &ShopId) -> Result<Option<Shop>, ShopRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_shop(&mut conn, *id.as_uuid(), false)
            .await
            .map_err(map_tx_error)
    }

    async fn find_by_owner(&self, owner_id: &BarberId) -> Result<Option<Shop>, ShopRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let shop_id: Option<Uuid> = shops::table
            .filter(shops::owner_id.eq(owner_id.as_uuid()))
            .select(shops::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_tx_error(err.into()))?;
        match shop_id {
            Some(id) => load_shop(&mut conn, id, false).await.map_err(map_tx_error),
            None => Ok(None),
        }
    }

    async fn resize(&self, id: &ShopId, total_seats: u32) -> Result<Shop, ShopRepositoryError> {
        self.update_locked(id, |shop| shop.resize(total_seats)).await
    }

    async fn update_hours(
        &self,
        id: &ShopId,
        hours: Vec<OpeningHours>,
    ) -> Result<Shop, ShopRepositoryError> {
        self.update_locked(id, |shop| {
            shop.hours = hours;
            Ok(())
        })
        .await
    }

    async fn update_contact(
        &self,
        id: &ShopId,
        contact: ContactInfo,
    ) -> Result<Shop, ShopRepositoryError> {
        self.update_locked(id, |shop| {
            shop.contact = contact;
            Ok(())
        })
        .await
    }
}
