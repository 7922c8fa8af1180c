//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the repository ports backed by PostgreSQL
//! through `diesel-async` and a `bb8` pool.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between rows and aggregates
//!   and re-check the business rules under row locks. The rules themselves
//!   live on the aggregates.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Constraint backstops**: unique and exclusion constraints in the
//!   migrations map back to the same `RuleViolation` a locked check would
//!   have produced.
//!
//! # Example
//!
//! ```ignore
//! use barberzon::outbound::persistence::{DbPool, DieselShopRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/barberzon")).await?;
//! let shops = DieselShopRepository::new(pool);
//! ```

mod diesel_booking_repository;
mod diesel_error_mapping;
mod diesel_identity_store;
mod diesel_join_request_repository;
mod diesel_notification_dispatcher;
mod diesel_shop_repository;
mod diesel_wallet_repository;
mod migrations;
mod models;
mod pool;
mod row_conversions;
mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_identity_store::DieselIdentityStore;
pub use diesel_join_request_repository::DieselJoinRequestRepository;
pub use diesel_notification_dispatcher::DieselNotificationDispatcher;
pub use diesel_shop_repository::DieselShopRepository;
pub use diesel_wallet_repository::DieselWalletRepository;
pub use migrations::run_pending_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
