//! PostgreSQL-backed `IdentityStore` implementation using Diesel ORM.
//!
//! Accounts are issued by the external authentication utility; this adapter
//! only reads them, plus the barber availability columns it owns.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{IdentityStore, IdentityStoreError};
use crate::domain::{
    BarberId, BarberProfile, BarberStatus, CustomerId, CustomerProfile, Profile, User, UserId,
};

use super::diesel_error_mapping;
use super::models::{BarberProfileRow, CustomerProfileRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{ROLE_BARBER, ROLE_CUSTOMER, row_to_barber, row_to_customer, row_to_user};
use super::schema::{barber_profiles, customer_profiles, users};

/// Diesel-backed implementation of the `IdentityStore` port.
#[derive(Clone)]
pub struct DieselIdentityStore {
    pool: DbPool,
}

impl DieselIdentityStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IdentityStoreError {
    diesel_error_mapping::map_pool_error(error)
}

fn map_diesel_error(error: diesel::result::Error) -> IdentityStoreError {
    diesel_error_mapping::map_diesel_error(error)
}

fn barber_from_row(row: BarberProfileRow) -> Result<BarberProfile, IdentityStoreError> {
    row_to_barber(row).map_err(IdentityStoreError::query)
}

async fn load_profile(
    conn: &mut AsyncPgConnection,
    user: &UserRow,
) -> Result<Option<Profile>, IdentityStoreError> {
    match user.role.as_str() {
        ROLE_BARBER => barber_profiles::table
            .filter(barber_profiles::user_id.eq(user.id))
            .select(BarberProfileRow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(barber_from_row)
            .transpose()
            .map(|profile| profile.map(Profile::Barber)),
        ROLE_CUSTOMER => Ok(customer_profiles::table
            .filter(customer_profiles::user_id.eq(user.id))
            .select(CustomerProfileRow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| Profile::Customer(row_to_customer(row)))),
        other => Err(IdentityStoreError::query(format!(
            "user {} has unknown role {other:?}",
            user.id
        ))),
    }
}

#[async_trait]
impl IdentityStore for DieselIdentityStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let Some(profile) = load_profile(&mut conn, &row).await? else {
            return Ok(None);
        };
        Ok(Some(row_to_user(row, profile)))
    }

    async fn get_barber_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<BarberProfile>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        barber_profiles::table
            .filter(barber_profiles::user_id.eq(user_id.as_uuid()))
            .select(BarberProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(barber_from_row)
            .transpose()
    }

    async fn get_customer_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CustomerProfile>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CustomerProfileRow> = customer_profiles::table
            .filter(customer_profiles::user_id.eq(user_id.as_uuid()))
            .select(CustomerProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_customer))
    }

    async fn find_barber(&self, id: &BarberId) -> Result<Option<BarberProfile>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        barber_profiles::table
            .find(id.as_uuid())
            .select(BarberProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(barber_from_row)
            .transpose()
    }

    async fn find_customer(
        &self,
        id: &CustomerId,
    ) -> Result<Option<CustomerProfile>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CustomerProfileRow> = customer_profiles::table
            .find(id.as_uuid())
            .select(CustomerProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_customer))
    }

    async fn update_barber_availability(
        &self,
        id: &BarberId,
        is_available: bool,
        status: BarberStatus,
    ) -> Result<Option<BarberProfile>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(barber_profiles::table.find(id.as_uuid()))
            .set((
                barber_profiles::is_available.eq(is_available),
                barber_profiles::status.eq(status.as_str()),
            ))
            .returning(BarberProfileRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(barber_from_row)
            .transpose()
    }
}
