//! Domain primitives, aggregates, and services.
//!
//! Purpose: model the marketplace slice (shops and seats, join requests,
//! bookings, reviews, wallets) as strongly typed aggregates whose methods
//! enforce the business rules. Services orchestrate those aggregates through
//! the ports declared in [`ports`]; adapters live outside this module.
//!
//! Public surface:
//! - Error (alias to `error::Error`) and ErrorCode: transport-agnostic
//!   failures.
//! - RuleViolation: typed business-rule rejections shared with adapters.
//! - Shop, JoinRequest, Booking, Review, Wallet, Transaction: aggregates.
//! - *Service types: driving-port implementations.

pub mod booking;
pub mod error;
pub mod ids;
pub mod join_request;
pub mod money;
pub mod notification;
pub mod ports;
pub mod review;
pub mod rules;
pub mod shop;
pub mod trace_id;
pub mod user;
pub mod wallet;

mod availability_service;
mod booking_service;
mod join_request_service;
mod service_support;
#[cfg(test)]
mod service_test_support;
mod shop_service;
mod wallet_service;

pub use self::availability_service::BarberAvailabilityService;
pub use self::booking::{
    Booking, BookingDraft, BookingParty, BookingStatus, BookingValidationError,
    DEFAULT_SERVICE_MINUTES, PaymentStatus, ServiceLine,
};
pub use self::booking_service::BookingService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::{
    BarberId, BookingId, CustomerId, IdValidationError, JoinRequestId, NotificationId, ReviewId,
    ShopId, TransactionId, UserId,
};
pub use self::join_request::{JoinApproval, JoinRequest, JoinRequestAction, JoinRequestStatus};
pub use self::join_request_service::JoinRequestService;
pub use self::money::{DEFAULT_CURRENCY, MinorUnits, Money, MoneyError};
pub use self::notification::{Notification, NotificationRecord, NotificationType};
pub use self::review::{InvalidRating, Rating, RatingSummary, Review};
pub use self::rules::RuleViolation;
pub use self::shop::{
    ContactInfo, OpeningHours, SeatAssignment, Shop, ShopDraft, ShopOpenError,
    ShopValidationError,
};
pub use self::shop_service::ShopService;
pub use self::trace_id::TraceId;
pub use self::user::{BarberProfile, BarberStatus, CustomerProfile, Profile, User};
pub use self::wallet::{
    ExternalStatus, PaymentReference, ReconciliationPlan, Transaction, TransactionStatus,
    TransactionType, Wallet, plan_reconciliation,
};
pub use self::wallet_service::WalletService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use barberzon::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
