//! Notification messages produced after committed state changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::{Booking, JoinRequest, Money, NotificationId, Transaction, UserId};

/// Event that triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    BookingCreated,
    BookingConfirmed,
    BookingCompleted,
    BookingCancelled,
    JoinRequestReceived,
    JoinRequestApproved,
    JoinRequestRejected,
    PaymentSettled,
}

impl NotificationType {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BookingCreated => "booking_created",
            Self::BookingConfirmed => "booking_confirmed",
            Self::BookingCompleted => "booking_completed",
            Self::BookingCancelled => "booking_cancelled",
            Self::JoinRequestReceived => "join_request_received",
            Self::JoinRequestApproved => "join_request_approved",
            Self::JoinRequestRejected => "join_request_rejected",
            Self::PaymentSettled => "payment_settled",
        }
    }
}

/// Error returned when parsing an unknown notification type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification type: {0}")]
pub struct ParseNotificationTypeError(pub String);

impl std::str::FromStr for NotificationType {
    type Err = ParseNotificationTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::BookingCreated,
            Self::BookingConfirmed,
            Self::BookingCompleted,
            Self::BookingCancelled,
            Self::JoinRequestReceived,
            Self::JoinRequestApproved,
            Self::JoinRequestRejected,
            Self::PaymentSettled,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == s)
        .ok_or_else(|| ParseNotificationTypeError(s.to_owned()))
    }
}

/// A message ready to hand to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[schema(value_type = String, format = "uuid")]
    pub recipient: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[schema(value_type = Object)]
    pub payload: Value,
}

/// A persisted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    #[schema(value_type = String, format = "uuid")]
    pub id: NotificationId,
    #[serde(flatten)]
    pub notification: Notification,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(
        recipient: UserId,
        kind: NotificationType,
        title: &str,
        message: String,
        payload: Value,
    ) -> Self {
        Self {
            recipient,
            kind,
            title: title.to_owned(),
            message,
            payload,
        }
    }

    /// Tell a barber a customer booked them.
    #[must_use]
    pub fn booking_created(recipient: UserId, booking: &Booking, customer_name: &str) -> Self {
        Self::new(
            recipient,
            NotificationType::BookingCreated,
            "New booking",
            format!(
                "{customer_name} booked you for {}",
                booking.start_time.format("%Y-%m-%d %H:%M")
            ),
            json!({ "bookingId": booking.id }),
        )
    }

    /// Tell a customer their booking was confirmed.
    #[must_use]
    pub fn booking_confirmed(recipient: UserId, booking: &Booking) -> Self {
        Self::new(
            recipient,
            NotificationType::BookingConfirmed,
            "Booking confirmed",
            format!(
                "Your booking for {} has been confirmed",
                booking.start_time.format("%Y-%m-%d %H:%M")
            ),
            json!({ "bookingId": booking.id }),
        )
    }

    /// Tell a customer their booking was completed.
    #[must_use]
    pub fn booking_completed(recipient: UserId, booking: &Booking) -> Self {
        Self::new(
            recipient,
            NotificationType::BookingCompleted,
            "Booking completed",
            "Your appointment is complete. Leave a review!".to_owned(),
            json!({ "bookingId": booking.id }),
        )
    }

    /// Tell one party the other cancelled.
    #[must_use]
    pub fn booking_cancelled(recipient: UserId, booking: &Booking, fee: Money) -> Self {
        let reason = booking
            .cancellation_reason
            .as_deref()
            .map_or_else(String::new, |text| format!(": {text}"));
        Self::new(
            recipient,
            NotificationType::BookingCancelled,
            "Booking cancelled",
            format!(
                "The booking for {} was cancelled{reason}",
                booking.start_time.format("%Y-%m-%d %H:%M")
            ),
            json!({ "bookingId": booking.id, "cancellationFee": fee.amount() }),
        )
    }

    /// Tell a shop owner a barber wants a seat.
    #[must_use]
    pub fn join_request_received(recipient: UserId, request: &JoinRequest, barber_name: &str) -> Self {
        Self::new(
            recipient,
            NotificationType::JoinRequestReceived,
            "New join request",
            format!("{barber_name} asked to join your shop"),
            json!({ "requestId": request.id, "shopId": request.shop_id }),
        )
    }

    /// Tell a barber the owner approved their request.
    #[must_use]
    pub fn join_request_approved(recipient: UserId, request: &JoinRequest, seat: u32) -> Self {
        Self::new(
            recipient,
            NotificationType::JoinRequestApproved,
            "Join request approved",
            format!("You have been assigned seat {seat}"),
            json!({ "requestId": request.id, "shopId": request.shop_id, "seatNumber": seat }),
        )
    }

    /// Tell a barber the owner rejected their request.
    #[must_use]
    pub fn join_request_rejected(recipient: UserId, request: &JoinRequest) -> Self {
        Self::new(
            recipient,
            NotificationType::JoinRequestRejected,
            "Join request rejected",
            "Your request to join the shop was declined".to_owned(),
            json!({ "requestId": request.id, "shopId": request.shop_id }),
        )
    }

    /// Tell a customer a deposit or booking payment settled.
    #[must_use]
    pub fn payment_settled(recipient: UserId, transaction: &Transaction) -> Self {
        Self::new(
            recipient,
            NotificationType::PaymentSettled,
            "Payment successful",
            format!(
                "Your {} of {} {} was successful",
                transaction.kind.as_str(),
                transaction.amount,
                super::DEFAULT_CURRENCY
            ),
            json!({
                "reference": transaction.reference,
                "transactionId": transaction.id,
                "bookingId": transaction.booking_id,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BarberId, CustomerId, ShopId, TransactionType,
        booking::{BookingDraft, ServiceLine},
    };
    use chrono::TimeZone;
    use rstest::rstest;

    fn booking() -> Booking {
        let start = Utc
            .with_ymd_and_hms(2025, 1, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp");
        Booking::schedule(
            BookingDraft {
                customer_id: CustomerId::random(),
                barber_id: BarberId::random(),
                shop_id: ShopId::random(),
                services: vec![ServiceLine {
                    name: "Haircut".to_owned(),
                    price: Money::new(3000).expect("valid"),
                    duration_minutes: None,
                }],
                start_time: start,
                notes: None,
            },
            start,
        )
        .expect("valid booking")
    }

    #[rstest]
    fn booking_created_names_customer_and_time() {
        let note = Notification::booking_created(UserId::random(), &booking(), "Tola");
        insta::assert_snapshot!(note.message, @"Tola booked you for 2025-01-01 10:00");
        assert_eq!(note.kind, NotificationType::BookingCreated);
    }

    #[rstest]
    fn cancellation_carries_reason_and_fee() {
        let mut cancelled = booking();
        cancelled
            .cancel(Some("running late".to_owned()))
            .expect("pending cancels");
        let note = Notification::booking_cancelled(
            UserId::random(),
            &cancelled,
            Money::new(600).expect("valid"),
        );
        insta::assert_snapshot!(
            note.message,
            @"The booking for 2025-01-01 10:00 was cancelled: running late"
        );
        assert_eq!(note.payload["cancellationFee"], 600);
    }

    #[rstest]
    fn payment_settled_mentions_amount() {
        let tx = Transaction::pending(
            UserId::random(),
            TransactionType::Deposit,
            Money::new(5000).expect("valid"),
            "wallet funding",
            Utc::now(),
        );
        let note = Notification::payment_settled(tx.user_id, &tx);
        insta::assert_snapshot!(note.message, @"Your deposit of 5000 NGN was successful");
    }

    #[rstest]
    fn types_round_trip_through_strings() {
        assert_eq!(
            "join_request_approved".parse::<NotificationType>(),
            Ok(NotificationType::JoinRequestApproved)
        );
        assert!("unknown".parse::<NotificationType>().is_err());
    }
}
