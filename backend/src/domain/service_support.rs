//! Internal helpers shared by the marketplace services.

use serde_json::json;
use tracing::warn;

use crate::domain::ports::{
    BookingRepositoryError, IdentityStore, IdentityStoreError, JoinRequestRepositoryError,
    NotificationDispatcher, PaymentGatewayError, ShopRepositoryError, WalletRepositoryError,
};
use crate::domain::{
    BarberId, BarberProfile, BookingValidationError, CustomerId, CustomerProfile, Error,
    InvalidRating, MoneyError, Notification, ShopValidationError, User, UserId,
};

pub(crate) fn map_identity_error(error: IdentityStoreError) -> Error {
    match error {
        IdentityStoreError::Connection { message } => {
            Error::service_unavailable(format!("identity store unavailable: {message}"))
        }
        IdentityStoreError::Query { message } => {
            Error::internal(format!("identity store error: {message}"))
        }
    }
}

pub(crate) fn map_shop_error(error: ShopRepositoryError) -> Error {
    match error {
        ShopRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("shop repository unavailable: {message}"))
        }
        ShopRepositoryError::Query { message } => {
            Error::internal(format!("shop repository error: {message}"))
        }
        ShopRepositoryError::Rejected { violation } => violation.into(),
    }
}

pub(crate) fn map_join_request_error(error: JoinRequestRepositoryError) -> Error {
    match error {
        JoinRequestRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("join request repository unavailable: {message}"))
        }
        JoinRequestRepositoryError::Query { message } => {
            Error::internal(format!("join request repository error: {message}"))
        }
        JoinRequestRepositoryError::Rejected { violation } => violation.into(),
    }
}

pub(crate) fn map_booking_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("booking repository unavailable: {message}"))
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking repository error: {message}"))
        }
        BookingRepositoryError::Rejected { violation } => violation.into(),
    }
}

pub(crate) fn map_wallet_error(error: WalletRepositoryError) -> Error {
    match error {
        WalletRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("wallet repository unavailable: {message}"))
        }
        WalletRepositoryError::Query { message } => {
            Error::internal(format!("wallet repository error: {message}"))
        }
        WalletRepositoryError::Rejected { violation } => violation.into(),
    }
}

pub(crate) fn map_gateway_error(error: PaymentGatewayError) -> Error {
    let reason = match &error {
        PaymentGatewayError::Timeout { .. } => "gateway_timeout",
        PaymentGatewayError::Transport { .. } => "gateway_unreachable",
        PaymentGatewayError::Status { .. } => "gateway_status",
        PaymentGatewayError::Declined { .. } => "gateway_declined",
        PaymentGatewayError::InvalidResponse { .. } => "gateway_invalid_response",
    };
    Error::external_service(error.to_string()).with_details(json!({ "code": reason }))
}

pub(crate) fn map_shop_validation(error: &ShopValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "code": "invalid_shop" }))
}

pub(crate) fn map_booking_validation(error: &BookingValidationError) -> Error {
    let reason = match error {
        BookingValidationError::PastDateTime => "past_date_time",
        BookingValidationError::NoServices
        | BookingValidationError::UnnamedService { .. }
        | BookingValidationError::ZeroDuration { .. } => "invalid_services",
        BookingValidationError::Amount(_) | BookingValidationError::DurationOverflow => {
            "invalid_booking"
        }
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "code": reason }))
}

pub(crate) fn map_invalid_rating(error: &InvalidRating) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "code": "invalid_rating" }))
}

pub(crate) fn map_money_error(error: &MoneyError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "code": "invalid_amount" }))
}

/// Error for an entity that does not exist, tagged with a reason code.
pub(crate) fn not_found(message: &str, reason: &str) -> Error {
    Error::not_found(message).with_details(json!({ "code": reason }))
}

/// Error for an actor acting outside their permissions.
pub(crate) fn not_authorized(message: &str) -> Error {
    Error::forbidden(message).with_details(json!({ "code": "not_authorized" }))
}

pub(crate) async fn require_user<I>(identity: &I, actor: &UserId) -> Result<User, Error>
where
    I: IdentityStore + ?Sized,
{
    identity
        .get_user(actor)
        .await
        .map_err(map_identity_error)?
        .ok_or_else(|| Error::unauthorized("unknown user"))
}

pub(crate) async fn require_barber<I>(identity: &I, actor: &UserId) -> Result<BarberProfile, Error>
where
    I: IdentityStore + ?Sized,
{
    identity
        .get_barber_profile(actor)
        .await
        .map_err(map_identity_error)?
        .ok_or_else(|| not_authorized("a barber profile is required"))
}

pub(crate) async fn require_customer<I>(
    identity: &I,
    actor: &UserId,
) -> Result<CustomerProfile, Error>
where
    I: IdentityStore + ?Sized,
{
    identity
        .get_customer_profile(actor)
        .await
        .map_err(map_identity_error)?
        .ok_or_else(|| not_authorized("a customer profile is required"))
}

/// Account behind a barber profile, used to address notifications.
///
/// Lookup failures are logged and yield `None`; a missing recipient never
/// fails a committed change.
pub(crate) async fn barber_account<I>(identity: &I, barber_id: &BarberId) -> Option<UserId>
where
    I: IdentityStore + ?Sized,
{
    match identity.find_barber(barber_id).await {
        Ok(profile) => profile.map(|profile| profile.user_id),
        Err(error) => {
            warn!(barber_id = %barber_id, error = %error, "barber lookup for notification failed");
            None
        }
    }
}

/// Account behind a customer profile, used to address notifications.
pub(crate) async fn customer_account<I>(identity: &I, customer_id: &CustomerId) -> Option<UserId>
where
    I: IdentityStore + ?Sized,
{
    match identity.find_customer(customer_id).await {
        Ok(profile) => profile.map(|profile| profile.user_id),
        Err(error) => {
            warn!(customer_id = %customer_id, error = %error, "customer lookup for notification failed");
            None
        }
    }
}

/// Dispatch a notification after a committed change. Failures are logged only.
pub(crate) async fn dispatch<N>(notifier: &N, notification: Notification)
where
    N: NotificationDispatcher + ?Sized,
{
    if let Err(error) = notifier.notify(&notification).await {
        warn!(
            recipient = %notification.recipient,
            kind = notification.kind.as_str(),
            error = %error,
            "notification dispatch failed"
        );
    }
}
