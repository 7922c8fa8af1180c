//! Paystack outbound adapters.
//!
//! `PaystackHttpGateway` talks to the live API; `FixturePaymentGateway`
//! stands in when no secret key is configured. Both decode webhooks the same
//! way.

mod dto;
mod fixture;
mod http_gateway;
mod signature;

pub use fixture::FixturePaymentGateway;
pub use http_gateway::{DEFAULT_PAYSTACK_BASE_URL, PaystackConfig, PaystackHttpGateway};
