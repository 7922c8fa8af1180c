//! Driving port for shop creation and owner-only shop management.

use async_trait::async_trait;

use crate::domain::{ContactInfo, Error, OpeningHours, Shop, ShopId, UserId};

/// Input for opening a shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateShopRequest {
    pub name: String,
    pub total_seats: u32,
    pub contact: ContactInfo,
    pub hours: Vec<OpeningHours>,
}

/// Use-case port for the shop and seat registry.
///
/// Every mutation takes the acting user explicitly; only the owning barber may
/// change a shop.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShopRegistry: Send + Sync {
    /// Open a shop owned by the acting barber, who takes seat 1.
    async fn create_shop(&self, actor: &UserId, request: CreateShopRequest) -> Result<Shop, Error>;

    /// Fetch a shop and its seat map.
    async fn get_shop(&self, shop_id: &ShopId) -> Result<Shop, Error>;

    /// Change seat capacity.
    async fn update_capacity(
        &self,
        actor: &UserId,
        shop_id: &ShopId,
        total_seats: u32,
    ) -> Result<Shop, Error>;

    /// Replace opening hours.
    async fn update_hours(
        &self,
        actor: &UserId,
        shop_id: &ShopId,
        hours: Vec<OpeningHours>,
    ) -> Result<Shop, Error>;

    /// Replace contact details.
    async fn update_contact(
        &self,
        actor: &UserId,
        shop_id: &ShopId,
        contact: ContactInfo,
    ) -> Result<Shop, Error>;
}
