//! Shop registry service.
//!
//! Implements [`ShopRegistry`]: opening shops and owner-only changes to
//! capacity, hours, and contact details.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{CreateShopRequest, IdentityStore, ShopRegistry, ShopRepository};
use crate::domain::service_support::{
    map_shop_error, map_shop_validation, not_authorized, not_found, require_barber,
};
use crate::domain::shop::{validate_contact, validate_hours};
use crate::domain::{
    BarberProfile, ContactInfo, Error, OpeningHours, RuleViolation, Shop, ShopDraft, ShopId,
    ShopOpenError, UserId,
};

/// Shop registry service implementing the driving port.
#[derive(Clone)]
pub struct ShopService<S, I> {
    shops: Arc<S>,
    identity: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<S, I> ShopService<S, I> {
    /// Create a new service over the shop repository and identity store.
    pub fn new(shops: Arc<S>, identity: Arc<I>, clock: Arc<dyn Clock>) -> Self {
        Self {
            shops,
            identity,
            clock,
        }
    }
}

impl<S, I> ShopService<S, I>
where
    S: ShopRepository,
    I: IdentityStore,
{
    async fn load_shop(&self, shop_id: &ShopId) -> Result<Shop, Error> {
        self.shops
            .find_by_id(shop_id)
            .await
            .map_err(map_shop_error)?
            .ok_or_else(|| not_found("shop not found", "shop_not_found"))
    }

    /// Load the shop and the acting barber, failing unless the barber owns it.
    async fn owned_shop(
        &self,
        actor: &UserId,
        shop_id: &ShopId,
    ) -> Result<(Shop, BarberProfile), Error> {
        let owner = require_barber(self.identity.as_ref(), actor).await?;
        let shop = self.load_shop(shop_id).await?;
        if !shop.is_owned_by(&owner.id) {
            return Err(not_authorized("only the shop owner may manage this shop"));
        }
        Ok((shop, owner))
    }
}

#[async_trait]
impl<S, I> ShopRegistry for ShopService<S, I>
where
    S: ShopRepository,
    I: IdentityStore,
{
    async fn create_shop(&self, actor: &UserId, request: CreateShopRequest) -> Result<Shop, Error> {
        let owner = require_barber(self.identity.as_ref(), actor).await?;
        if self
            .shops
            .find_by_owner(&owner.id)
            .await
            .map_err(map_shop_error)?
            .is_some()
        {
            return Err(RuleViolation::AlreadyOwnsShop.into());
        }
        if !owner.is_solo() {
            return Err(RuleViolation::AlreadyAffiliated.into());
        }

        let shop = Shop::open(ShopDraft {
            id: ShopId::random(),
            owner_id: owner.id,
            name: request.name,
            total_seats: request.total_seats,
            contact: request.contact,
            hours: request.hours,
            created_at: self.clock.utc(),
        })
        .map_err(|err| match err {
            ShopOpenError::Validation(validation) => map_shop_validation(&validation),
            ShopOpenError::Rule(violation) => violation.into(),
        })?;

        self.shops.create(&shop).await.map_err(map_shop_error)?;
        info!(shop_id = %shop.id, owner_id = %owner.id, seats = shop.total_seats, "shop opened");
        Ok(shop)
    }

    async fn get_shop(&self, shop_id: &ShopId) -> Result<Shop, Error> {
        self.load_shop(shop_id).await
    }

    async fn update_capacity(
        &self,
        actor: &UserId,
        shop_id: &ShopId,
        total_seats: u32,
    ) -> Result<Shop, Error> {
        let (mut shop, _) = self.owned_shop(actor, shop_id).await?;
        shop.resize(total_seats)?;
        let updated = self
            .shops
            .resize(shop_id, total_seats)
            .await
            .map_err(map_shop_error)?;
        info!(shop_id = %shop_id, seats = total_seats, "shop capacity changed");
        Ok(updated)
    }

    async fn update_hours(
        &self,
        actor: &UserId,
        shop_id: &ShopId,
        hours: Vec<OpeningHours>,
    ) -> Result<Shop, Error> {
        self.owned_shop(actor, shop_id).await?;
        validate_hours(&hours).map_err(|err| map_shop_validation(&err))?;
        self.shops
            .update_hours(shop_id, hours)
            .await
            .map_err(map_shop_error)
    }

    async fn update_contact(
        &self,
        actor: &UserId,
        shop_id: &ShopId,
        contact: ContactInfo,
    ) -> Result<Shop, Error> {
        self.owned_shop(actor, shop_id).await?;
        validate_contact(&contact).map_err(|err| map_shop_validation(&err))?;
        self.shops
            .update_contact(shop_id, contact)
            .await
            .map_err(map_shop_error)
    }
}

#[cfg(test)]
#[path = "shop_service_tests.rs"]
mod tests;
