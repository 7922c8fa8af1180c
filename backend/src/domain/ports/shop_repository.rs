//! Port for shop and seat-map persistence.
//!
//! Methods that change occupancy or capacity are atomic units: adapters lock
//! the affected rows, re-run the aggregate rule, and write in one transaction.
//! A rule failure inside that boundary is reported as `Rejected`.

use async_trait::async_trait;

use crate::domain::{BarberId, ContactInfo, OpeningHours, RuleViolation, Shop, ShopId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by shop repository adapters.
    pub enum ShopRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "shop repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "shop repository query failed: {message}",
        /// A business rule or storage constraint rejected the write.
        Rejected { violation: RuleViolation } => "shop write rejected: {violation}",
    }
}

/// Persistence port for shops and their seats.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShopRepository: Send + Sync {
    /// Insert a freshly opened shop and affiliate its owner with seat 1.
    ///
    /// Rejects with `AlreadyOwnsShop` when the owner already owns a shop and
    /// `AlreadyAffiliated` when the owner is seated elsewhere.
    async fn create(&self, shop: &Shop) -> Result<(), ShopRepositoryError>;

    /// Fetch a shop with its seat map.
    async fn find_by_id(&self, id: &ShopId) -> Result<Option<Shop>, ShopRepositoryError>;

    /// Shop owned by `owner_id`, if any.
    async fn find_by_owner(&self, owner_id: &BarberId) -> Result<Option<Shop>, ShopRepositoryError>;

    /// Change capacity under lock and return the updated shop.
    async fn resize(&self, id: &ShopId, total_seats: u32) -> Result<Shop, ShopRepositoryError>;

    /// Replace the weekly opening hours.
    async fn update_hours(
        &self,
        id: &ShopId,
        hours: Vec<OpeningHours>,
    ) -> Result<Shop, ShopRepositoryError>;

    /// Replace the contact details.
    async fn update_contact(
        &self,
        id: &ShopId,
        contact: ContactInfo,
    ) -> Result<Shop, ShopRepositoryError>;
}
