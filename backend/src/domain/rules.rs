//! Business-rule violations shared by aggregates, services, and adapters.
//!
//! Aggregates return a [`RuleViolation`] when a transition would break an
//! invariant. Storage adapters return the same value when a constraint or a
//! locked re-check rejects a write, so a concurrent loser surfaces as the same
//! typed conflict as a sequential one.

use serde_json::json;

use super::{BookingStatus, Error, JoinRequestStatus, Money};

/// A rejected state change, carrying enough context for a client-facing error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("shop has no free seats")]
    ShopFull,
    #[error("seat {seat} is already occupied")]
    SeatTaken { seat: u32 },
    #[error("seat {seat} is outside the shop's {total_seats} seats")]
    SeatOutOfRange { seat: u32, total_seats: u32 },
    #[error("cannot shrink to {requested} seats while seat {occupied_seat} is occupied")]
    SeatsOccupied { requested: u32, occupied_seat: u32 },
    #[error("shop must have at least one seat")]
    InvalidCapacity,
    #[error("barber already owns a shop")]
    AlreadyOwnsShop,
    #[error("barber is already affiliated with a shop")]
    AlreadyAffiliated,
    #[error("a join request for this shop already exists")]
    DuplicateRequest,
    #[error("join request has already been {status}")]
    AlreadyProcessed { status: JoinRequestStatus },
    #[error("booking cannot move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("barber already has a booking in this time slot")]
    SlotConflict,
    #[error("booking has already been paid")]
    AlreadyPaid,
    #[error("a {status} booking cannot be paid")]
    NotPayable { status: BookingStatus },
    #[error("wallet balance {balance} is below the required {required}")]
    InsufficientBalance { balance: Money, required: Money },
    #[error("{entity} not found")]
    Missing { entity: &'static str },
}

impl RuleViolation {
    /// Stable snake_case reason carried in error details.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::ShopFull => "shop_full",
            Self::SeatTaken { .. } => "seat_taken",
            Self::SeatOutOfRange { .. } => "seat_out_of_range",
            Self::SeatsOccupied { .. } => "seats_occupied",
            Self::InvalidCapacity => "invalid_capacity",
            Self::AlreadyOwnsShop => "already_owns_shop",
            Self::AlreadyAffiliated => "already_affiliated",
            Self::DuplicateRequest => "duplicate_request",
            Self::AlreadyProcessed { .. } => "already_processed",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::SlotConflict => "slot_conflict",
            Self::AlreadyPaid => "already_paid",
            Self::NotPayable { .. } => "booking_not_payable",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::Missing { .. } => "not_found",
        }
    }
}

impl From<RuleViolation> for Error {
    fn from(violation: RuleViolation) -> Self {
        let message = violation.to_string();
        let details = match &violation {
            RuleViolation::SeatTaken { seat } => json!({ "code": violation.reason(), "seat": seat }),
            RuleViolation::SeatOutOfRange { seat, total_seats } => json!({
                "code": violation.reason(),
                "seat": seat,
                "totalSeats": total_seats,
            }),
            RuleViolation::SeatsOccupied {
                requested,
                occupied_seat,
            } => json!({
                "code": violation.reason(),
                "requested": requested,
                "occupiedSeat": occupied_seat,
            }),
            RuleViolation::InvalidTransition { from, to } => json!({
                "code": violation.reason(),
                "from": from.as_str(),
                "to": to.as_str(),
            }),
            RuleViolation::AlreadyProcessed { status } => json!({
                "code": violation.reason(),
                "status": status.as_str(),
            }),
            RuleViolation::NotPayable { status } => json!({
                "code": violation.reason(),
                "status": status.as_str(),
            }),
            RuleViolation::InsufficientBalance { balance, required } => json!({
                "code": violation.reason(),
                "balance": balance.amount(),
                "required": required.amount(),
            }),
            _ => json!({ "code": violation.reason() }),
        };

        let error = match violation {
            RuleViolation::InvalidCapacity | RuleViolation::SeatOutOfRange { .. } => {
                Error::invalid_request(message)
            }
            RuleViolation::AlreadyProcessed { .. }
            | RuleViolation::InvalidTransition { .. }
            | RuleViolation::NotPayable { .. } => Error::invalid_transition(message),
            RuleViolation::InsufficientBalance { .. } => Error::insufficient_balance(message),
            RuleViolation::Missing { .. } => Error::not_found(message),
            _ => Error::conflict(message),
        };
        error.with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case::full(RuleViolation::ShopFull, ErrorCode::Conflict, "shop_full")]
    #[case::seat(RuleViolation::SeatTaken { seat: 2 }, ErrorCode::Conflict, "seat_taken")]
    #[case::slot(RuleViolation::SlotConflict, ErrorCode::Conflict, "slot_conflict")]
    #[case::paid(RuleViolation::AlreadyPaid, ErrorCode::Conflict, "already_paid")]
    #[case::unpayable(
        RuleViolation::NotPayable { status: BookingStatus::Cancelled },
        ErrorCode::InvalidTransition,
        "booking_not_payable"
    )]
    #[case::processed(
        RuleViolation::AlreadyProcessed { status: JoinRequestStatus::Approved },
        ErrorCode::InvalidTransition,
        "already_processed"
    )]
    #[case::transition(
        RuleViolation::InvalidTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Cancelled,
        },
        ErrorCode::InvalidTransition,
        "invalid_transition"
    )]
    #[case::balance(
        RuleViolation::InsufficientBalance { balance: Money::ZERO, required: Money::ZERO },
        ErrorCode::InsufficientBalance,
        "insufficient_balance"
    )]
    #[case::capacity(RuleViolation::InvalidCapacity, ErrorCode::InvalidRequest, "invalid_capacity")]
    fn maps_to_error_code_and_reason(
        #[case] violation: RuleViolation,
        #[case] code: ErrorCode,
        #[case] reason: &str,
    ) {
        let error = Error::from(violation);
        assert_eq!(error.code(), code);
        assert_eq!(error.reason(), Some(reason));
    }

    #[rstest]
    fn transition_details_name_both_states() {
        let error = Error::from(RuleViolation::InvalidTransition {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Confirmed,
        });
        let details = error.details().expect("details present");
        assert_eq!(details["from"], "cancelled");
        assert_eq!(details["to"], "confirmed");
    }
}
