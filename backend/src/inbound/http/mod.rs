//! HTTP inbound adapter exposing REST endpoints.
//!
//! Session-scoped handlers are registered by [`configure_api`]; the payment
//! webhook and health probes are mounted outside the session scope by the
//! server.

use actix_web::web;

pub mod barbers;
pub mod bookings;
pub mod error;
pub mod health;
pub mod join_requests;
pub mod session;
pub mod session_config;
pub mod shops;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod wallet;
pub mod webhooks;

pub use error::ApiResult;

/// Register every session-authenticated handler on a `/api/v1` scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(shops::create_shop)
        .service(shops::get_shop)
        .service(shops::update_capacity)
        .service(shops::update_hours)
        .service(shops::update_contact)
        .service(join_requests::submit_join_request)
        .service(join_requests::list_join_requests)
        .service(join_requests::respond_to_join_request)
        .service(barbers::update_availability)
        .service(bookings::create_booking)
        .service(bookings::list_bookings)
        .service(bookings::get_booking)
        .service(bookings::confirm_booking)
        .service(bookings::complete_booking)
        .service(bookings::cancel_booking)
        .service(bookings::rate_booking)
        .service(bookings::pay_for_booking)
        .service(wallet::get_wallet)
        .service(wallet::list_transactions)
        .service(wallet::fund_wallet)
        .service(wallet::withdraw)
        .service(wallet::verify_payment);
}
