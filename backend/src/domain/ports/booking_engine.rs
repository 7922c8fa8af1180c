//! Driving port for the booking lifecycle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    BarberId, Booking, BookingId, Error, Money, RatingSummary, Review, ServiceLine, ShopId, UserId,
};

/// A customer's booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookingRequest {
    pub barber_id: BarberId,
    pub shop_id: ShopId,
    pub services: Vec<ServiceLine>,
    pub start_time: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A cancelled booking and the informational fee owed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancellationOutcome {
    pub booking: Booking,
    pub cancellation_fee: Money,
}

/// A stored review and the barber's refreshed rating.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub review: Review,
    pub barber_rating: RatingSummary,
}

/// Use-case port for creating and transitioning bookings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingEngine: Send + Sync {
    /// Create a pending booking for the acting customer.
    async fn create(&self, actor: &UserId, request: CreateBookingRequest) -> Result<Booking, Error>;

    /// Fetch a booking the actor is party to.
    async fn get(&self, actor: &UserId, booking_id: &BookingId) -> Result<Booking, Error>;

    /// Bookings the actor is party to, ordered by start time.
    async fn list(&self, actor: &UserId) -> Result<Vec<Booking>, Error>;

    /// Assigned barber accepts a pending booking.
    async fn confirm(&self, actor: &UserId, booking_id: &BookingId) -> Result<Booking, Error>;

    /// Assigned barber completes a confirmed booking.
    async fn complete(
        &self,
        actor: &UserId,
        booking_id: &BookingId,
        notes: Option<String>,
    ) -> Result<Booking, Error>;

    /// Either party cancels a pending or confirmed booking.
    ///
    /// Only the other party is notified; the canceller learns the outcome
    /// and any fee from the returned [`CancellationOutcome`].
    async fn cancel(
        &self,
        actor: &UserId,
        booking_id: &BookingId,
        reason: Option<String>,
    ) -> Result<CancellationOutcome, Error>;

    /// Booking's customer rates a completed booking.
    async fn rate(
        &self,
        actor: &UserId,
        booking_id: &BookingId,
        rating: i64,
        comment: Option<String>,
    ) -> Result<ReviewOutcome, Error>;
}
