//! Barberzon marketplace backend.
//!
//! Shops rent seats to barbers, customers book appointments and pay from a
//! wallet topped up through Paystack. The crate follows a hexagonal layout:
//!
//! - [`domain`]: aggregates, business rules, services and ports
//! - [`inbound`]: the Actix Web adapter exposing the REST API
//! - [`outbound`]: PostgreSQL, in-memory and Paystack adapters
//! - [`settings`]: OrthoConfig-backed runtime configuration

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
