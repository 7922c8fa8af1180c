//! Bookings and their lifecycle.
//!
//! ```text
//! pending ──confirm──▶ confirmed ──complete──▶ completed
//!    │                     │
//!    └──────cancel─────────┴──────────────────▶ cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. A booking occupies the half-open
//! interval `[start_time, end_time)` on its barber's calendar while it is
//! pending or confirmed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BarberId, BookingId, CustomerId, Money, MoneyError, RuleViolation, ShopId};

/// Minutes assumed for a service line that does not state its duration.
pub const DEFAULT_SERVICE_MINUTES: u32 = 30;

/// Customer cancellations closer than this to the start incur a fee.
pub const LATE_CANCELLATION_WINDOW_HOURS: i64 = 2;

/// Fee charged on late customer cancellations, as a percentage of the total.
pub const LATE_CANCELLATION_FEE_PERCENT: i64 = 20;

/// Booking lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the booking still holds its slot on the barber's calendar.
    #[must_use]
    pub const fn blocks_slot(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Completed)
                | (Self::Pending | Self::Confirmed, Self::Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing unknown status strings from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised booking value: {0}")]
pub struct ParseBookingError(pub String);

impl FromStr for BookingStatus {
    type Err = ParseBookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseBookingError(other.to_owned())),
        }
    }
}

/// Whether the booking has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseBookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(ParseBookingError(other.to_owned())),
        }
    }
}

/// Which side of a booking is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingParty {
    Customer,
    Barber,
}

/// One purchased service within a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    pub name: String,
    pub price: Money,
    pub duration_minutes: Option<u32>,
}

impl ServiceLine {
    /// Effective duration, falling back to the default slot length.
    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.duration_minutes.unwrap_or(DEFAULT_SERVICE_MINUTES)
    }
}

/// Validation failures when scheduling a booking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingValidationError {
    #[error("at least one service is required")]
    NoServices,
    #[error("service {index} must have a name")]
    UnnamedService { index: usize },
    #[error("service {index} must last at least one minute")]
    ZeroDuration { index: usize },
    #[error("booking time is in the past")]
    PastDateTime,
    #[error("booking total is out of range: {0}")]
    Amount(#[from] MoneyError),
    #[error("booking duration is out of range")]
    DurationOverflow,
}

/// Input for scheduling a new booking.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub customer_id: CustomerId,
    pub barber_id: BarberId,
    pub shop_id: ShopId,
    pub services: Vec<ServiceLine>,
    pub start_time: DateTime<Utc>,
    pub notes: Option<String>,
}

/// An appointment between a customer and a barber at a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[schema(value_type = String, format = "uuid")]
    pub id: BookingId,
    #[schema(value_type = String, format = "uuid")]
    pub customer_id: CustomerId,
    #[schema(value_type = String, format = "uuid")]
    pub barber_id: BarberId,
    #[schema(value_type = String, format = "uuid")]
    pub shop_id: ShopId,
    pub services: Vec<ServiceLine>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Schedule a new pending booking.
    ///
    /// The total is the sum of service prices and the end time adds each
    /// service's duration to the start.
    pub fn schedule(draft: BookingDraft, now: DateTime<Utc>) -> Result<Self, BookingValidationError> {
        if draft.services.is_empty() {
            return Err(BookingValidationError::NoServices);
        }
        for (index, service) in draft.services.iter().enumerate() {
            if service.name.trim().is_empty() {
                return Err(BookingValidationError::UnnamedService { index });
            }
            if service.minutes() == 0 {
                return Err(BookingValidationError::ZeroDuration { index });
            }
        }
        if draft.start_time < now {
            return Err(BookingValidationError::PastDateTime);
        }

        let total_amount = Money::sum(draft.services.iter().map(|service| service.price))?;
        let minutes: i64 = draft
            .services
            .iter()
            .map(|service| i64::from(service.minutes()))
            .sum();
        let end_time = TimeDelta::try_minutes(minutes)
            .and_then(|span| draft.start_time.checked_add_signed(span))
            .ok_or(BookingValidationError::DurationOverflow)?;

        Ok(Self {
            id: BookingId::random(),
            customer_id: draft.customer_id,
            barber_id: draft.barber_id,
            shop_id: draft.shop_id,
            services: draft.services,
            start_time: draft.start_time,
            end_time,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            total_amount,
            notes: draft.notes,
            cancellation_reason: None,
            created_at: now,
        })
    }

    /// Whether `[start, end)` intersects this booking's slot.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// Whether this booking holds a slot that conflicts with `other`.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.barber_id == other.barber_id
            && self.status.blocks_slot()
            && self.overlaps(other.start_time, other.end_time)
    }

    fn transition(&mut self, next: BookingStatus) -> Result<(), RuleViolation> {
        if !self.status.can_transition_to(next) {
            return Err(RuleViolation::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Barber accepts the booking.
    pub fn confirm(&mut self) -> Result<(), RuleViolation> {
        self.transition(BookingStatus::Confirmed)
    }

    /// Barber marks the service delivered; the booking counts as paid.
    pub fn complete(&mut self, notes: Option<String>) -> Result<(), RuleViolation> {
        self.transition(BookingStatus::Completed)?;
        self.payment_status = PaymentStatus::Paid;
        if let Some(extra) = notes.filter(|text| !text.trim().is_empty()) {
            self.notes = Some(match self.notes.take() {
                Some(existing) => format!("{existing}\n{extra}"),
                None => extra,
            });
        }
        Ok(())
    }

    /// Either party cancels the booking.
    pub fn cancel(&mut self, reason: Option<String>) -> Result<(), RuleViolation> {
        self.transition(BookingStatus::Cancelled)?;
        self.cancellation_reason = reason;
        Ok(())
    }

    /// Fee owed for a cancellation by `actor` at `now`.
    ///
    /// Only customers cancelling less than two hours before the start pay a
    /// fee. The fee is informational: it is returned, never debited.
    pub fn cancellation_fee(&self, actor: BookingParty, now: DateTime<Utc>) -> Result<Money, MoneyError> {
        let window = TimeDelta::hours(LATE_CANCELLATION_WINDOW_HOURS);
        if actor == BookingParty::Customer && self.start_time.signed_duration_since(now) < window {
            return self.total_amount.percent_half_up(LATE_CANCELLATION_FEE_PERCENT);
        }
        Ok(Money::ZERO)
    }

    /// Whether the booking has already been settled.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Check the booking can still be paid from a wallet.
    pub fn ensure_payable(&self) -> Result<(), RuleViolation> {
        if self.is_paid() {
            return Err(RuleViolation::AlreadyPaid);
        }
        if self.status == BookingStatus::Cancelled {
            return Err(RuleViolation::NotPayable {
                status: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "booking_tests.rs"]
mod tests;
