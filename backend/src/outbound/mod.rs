//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: a single in-process store implementing every storage port,
//!   used when no database is configured and by the integration tests
//! - **paystack**: the payment gateway over HTTPS plus an offline fixture
//!
//! Adapters translate between domain types and infrastructure
//! representations. Storage adapters re-check business rules under their own
//! locks so concurrent writers cannot both win.

pub mod memory;
pub mod paystack;
pub mod persistence;
