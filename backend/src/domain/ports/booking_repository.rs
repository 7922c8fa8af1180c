//! Port for booking and review persistence.

use async_trait::async_trait;

use crate::domain::{
    BarberId, Booking, BookingId, BookingStatus, CustomerId, RatingSummary, Review, RuleViolation,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "booking repository query failed: {message}",
        /// A business rule or storage constraint rejected the write.
        Rejected { violation: RuleViolation } => "booking write rejected: {violation}",
    }
}

/// Persistence port for bookings and their reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a pending booking.
    ///
    /// Rejects with `SlotConflict` when the barber already holds a pending or
    /// confirmed booking whose interval overlaps the new one.
    async fn create(&self, booking: &Booking) -> Result<(), BookingRepositoryError>;

    /// Fetch a booking by id.
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Bookings made by a customer, ordered by start time.
    async fn list_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Bookings assigned to a barber, ordered by start time.
    async fn list_for_barber(
        &self,
        barber_id: &BarberId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Write a status transition if the stored status still equals
    /// `expected`.
    ///
    /// Rejects with `InvalidTransition` when another writer moved the booking
    /// first.
    async fn save_transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<(), BookingRepositoryError>;

    /// Insert or replace the review for its booking and recompute the
    /// barber's rating aggregate.
    async fn save_review(&self, review: &Review) -> Result<RatingSummary, BookingRepositoryError>;
}
