//! Conversions between Diesel rows and domain values.
//!
//! Reading a row fails with a message when a stored value no longer parses;
//! callers wrap the message in their port's query error.

use std::str::FromStr;

use uuid::Uuid;

use crate::domain::{
    BarberId, BarberProfile, Booking, BookingId, CustomerId, CustomerProfile, JoinRequest,
    JoinRequestId, Money, Notification, NotificationId, NotificationRecord, OpeningHours,
    PaymentReference, Profile, SeatAssignment, ServiceLine, Shop, ShopId, ContactInfo, Transaction,
    TransactionId, User, UserId, Wallet,
};

use super::models::{
    BarberProfileRow, BookingRow, CustomerProfileRow, JoinRequestRow, NotificationRow, ShopRow,
    TransactionRow, UserRow, WalletRow,
};

pub(crate) const ROLE_CUSTOMER: &str = "customer";
pub(crate) const ROLE_BARBER: &str = "barber";

fn parse_column<T>(raw: &str, column: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|err| format!("invalid {column} value {raw:?}: {err}"))
}

/// Read a non-negative integer column into `u32`.
pub(crate) fn to_u32(raw: i32, column: &str) -> Result<u32, String> {
    u32::try_from(raw).map_err(|_| format!("negative {column} value {raw}"))
}

/// Write a `u32` into an integer column, saturating at `i32::MAX`.
pub(crate) fn to_db_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn to_money(raw: i64, column: &str) -> Result<Money, String> {
    Money::new(raw).map_err(|err| format!("invalid {column} value {raw}: {err}"))
}

pub(crate) fn row_to_barber(row: BarberProfileRow) -> Result<BarberProfile, String> {
    Ok(BarberProfile {
        id: BarberId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        shop_id: row.shop_id.map(ShopId::from_uuid),
        seat_number: row
            .seat_number
            .map(|seat| to_u32(seat, "seat_number"))
            .transpose()?,
        is_available: row.is_available,
        status: parse_column(&row.status, "barber status")?,
        rating: row.rating,
        total_reviews: to_u32(row.total_reviews, "total_reviews")?,
    })
}

pub(crate) fn barber_to_row(profile: &BarberProfile) -> BarberProfileRow {
    BarberProfileRow {
        id: *profile.id.as_uuid(),
        user_id: *profile.user_id.as_uuid(),
        shop_id: profile.shop_id.map(|id| *id.as_uuid()),
        seat_number: profile.seat_number.map(to_db_int),
        is_available: profile.is_available,
        status: profile.status.as_str().to_owned(),
        rating: profile.rating,
        total_reviews: to_db_int(profile.total_reviews),
    }
}

pub(crate) fn row_to_customer(row: CustomerProfileRow) -> CustomerProfile {
    CustomerProfile {
        id: CustomerId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
    }
}

pub(crate) fn row_to_user(row: UserRow, profile: Profile) -> User {
    User {
        id: UserId::from_uuid(row.id),
        full_name: row.full_name,
        email: row.email,
        profile,
    }
}

/// Rebuild a shop from its row and the `(barber, seat)` pairs seated in it.
pub(crate) fn row_to_shop(row: ShopRow, seated: &[(Uuid, Option<i32>)]) -> Result<Shop, String> {
    let total_seats = to_u32(row.total_seats, "total_seats")?;
    let hours: Vec<OpeningHours> = serde_json::from_value(row.opening_hours)
        .map_err(|err| format!("invalid opening_hours: {err}"))?;
    let seats = (1..=total_seats)
        .map(|seat_number| SeatAssignment {
            seat_number,
            barber_id: seated
                .iter()
                .find(|(_, seat)| *seat == Some(to_db_int(seat_number)))
                .map(|(barber, _)| BarberId::from_uuid(*barber)),
        })
        .collect();
    Ok(Shop {
        id: ShopId::from_uuid(row.id),
        owner_id: BarberId::from_uuid(row.owner_id),
        name: row.name,
        total_seats,
        contact: ContactInfo {
            address: row.address,
            phone: row.phone,
            email: row.email,
        },
        hours,
        seats,
        created_at: row.created_at,
    })
}

pub(crate) fn shop_to_row(shop: &Shop) -> Result<ShopRow, String> {
    Ok(ShopRow {
        id: *shop.id.as_uuid(),
        owner_id: *shop.owner_id.as_uuid(),
        name: shop.name.clone(),
        total_seats: to_db_int(shop.total_seats),
        address: shop.contact.address.clone(),
        phone: shop.contact.phone.clone(),
        email: shop.contact.email.clone(),
        opening_hours: hours_to_json(&shop.hours)?,
        created_at: shop.created_at,
    })
}

pub(crate) fn hours_to_json(hours: &[OpeningHours]) -> Result<serde_json::Value, String> {
    serde_json::to_value(hours).map_err(|err| format!("encode opening_hours: {err}"))
}

pub(crate) fn row_to_join_request(row: JoinRequestRow) -> Result<JoinRequest, String> {
    Ok(JoinRequest {
        id: JoinRequestId::from_uuid(row.id),
        barber_id: BarberId::from_uuid(row.barber_id),
        shop_id: ShopId::from_uuid(row.shop_id),
        status: parse_column(&row.status, "join request status")?,
        seat_number: row
            .seat_number
            .map(|seat| to_u32(seat, "seat_number"))
            .transpose()?,
        message: row.message,
        created_at: row.created_at,
        responded_at: row.responded_at,
    })
}

pub(crate) fn join_request_to_row(request: &JoinRequest) -> JoinRequestRow {
    JoinRequestRow {
        id: *request.id.as_uuid(),
        barber_id: *request.barber_id.as_uuid(),
        shop_id: *request.shop_id.as_uuid(),
        status: request.status.as_str().to_owned(),
        seat_number: request.seat_number.map(to_db_int),
        message: request.message.clone(),
        created_at: request.created_at,
        responded_at: request.responded_at,
    }
}

pub(crate) fn row_to_booking(row: BookingRow) -> Result<Booking, String> {
    let services: Vec<ServiceLine> = serde_json::from_value(row.services)
        .map_err(|err| format!("invalid booking services: {err}"))?;
    Ok(Booking {
        id: BookingId::from_uuid(row.id),
        customer_id: CustomerId::from_uuid(row.customer_id),
        barber_id: BarberId::from_uuid(row.barber_id),
        shop_id: ShopId::from_uuid(row.shop_id),
        services,
        start_time: row.start_time,
        end_time: row.end_time,
        status: parse_column(&row.status, "booking status")?,
        payment_status: parse_column(&row.payment_status, "payment status")?,
        total_amount: to_money(row.total_amount, "total_amount")?,
        notes: row.notes,
        cancellation_reason: row.cancellation_reason,
        created_at: row.created_at,
    })
}

pub(crate) fn booking_to_row(booking: &Booking) -> Result<BookingRow, String> {
    Ok(BookingRow {
        id: *booking.id.as_uuid(),
        customer_id: *booking.customer_id.as_uuid(),
        barber_id: *booking.barber_id.as_uuid(),
        shop_id: *booking.shop_id.as_uuid(),
        services: serde_json::to_value(&booking.services)
            .map_err(|err| format!("encode booking services: {err}"))?,
        start_time: booking.start_time,
        end_time: booking.end_time,
        status: booking.status.as_str().to_owned(),
        payment_status: booking.payment_status.as_str().to_owned(),
        total_amount: booking.total_amount.amount(),
        notes: booking.notes.clone(),
        cancellation_reason: booking.cancellation_reason.clone(),
        created_at: booking.created_at,
    })
}

pub(crate) fn row_to_wallet(row: WalletRow) -> Result<Wallet, String> {
    Ok(Wallet {
        user_id: UserId::from_uuid(row.user_id),
        balance: to_money(row.balance, "balance")?,
        currency: row.currency,
        updated_at: row.updated_at,
    })
}

pub(crate) fn row_to_transaction(row: TransactionRow) -> Result<Transaction, String> {
    Ok(Transaction {
        id: TransactionId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        kind: parse_column(&row.kind, "transaction kind")?,
        amount: to_money(row.amount, "amount")?,
        reference: PaymentReference::new(row.reference)
            .map_err(|err| format!("invalid transaction reference: {err}"))?,
        status: parse_column(&row.status, "transaction status")?,
        booking_id: row.booking_id.map(BookingId::from_uuid),
        description: row.description,
        created_at: row.created_at,
        settled_at: row.settled_at,
    })
}

pub(crate) fn transaction_to_row(transaction: &Transaction) -> TransactionRow {
    TransactionRow {
        id: *transaction.id.as_uuid(),
        user_id: *transaction.user_id.as_uuid(),
        kind: transaction.kind.as_str().to_owned(),
        amount: transaction.amount.amount(),
        reference: transaction.reference.as_str().to_owned(),
        status: transaction.status.as_str().to_owned(),
        booking_id: transaction.booking_id.map(|id| *id.as_uuid()),
        description: transaction.description.clone(),
        created_at: transaction.created_at,
        settled_at: transaction.settled_at,
    }
}

pub(crate) fn row_to_notification(row: NotificationRow) -> Result<NotificationRecord, String> {
    Ok(NotificationRecord {
        id: NotificationId::from_uuid(row.id),
        notification: Notification {
            recipient: UserId::from_uuid(row.recipient_id),
            kind: parse_column(&row.kind, "notification kind")?,
            title: row.title,
            message: row.message,
            payload: row.payload,
        },
        read: row.read,
        created_at: row.created_at,
    })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{BarberStatus, BookingStatus};
    use chrono::Utc;
    use rstest::rstest;

    fn shop_row(total_seats: i32) -> ShopRow {
        ShopRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Fade Factory".to_owned(),
            total_seats,
            address: "12 Allen Avenue".to_owned(),
            phone: None,
            email: None,
            opening_hours: serde_json::json!([]),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn shops_rebuild_their_seat_map_from_seated_barbers() {
        let row = shop_row(3);
        let owner = row.owner_id;
        let guest = Uuid::new_v4();

        let shop = row_to_shop(row, &[(owner, Some(1)), (guest, Some(3))]).expect("valid row");

        assert_eq!(shop.total_seats, 3);
        assert_eq!(shop.seat_of(&BarberId::from_uuid(guest)), Some(3));
        assert_eq!(shop.lowest_free_seat(), Some(2));
    }

    #[rstest]
    fn unknown_statuses_are_reported() {
        let row = BarberProfileRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            shop_id: None,
            seat_number: None,
            is_available: true,
            status: "napping".to_owned(),
            rating: 0.0,
            total_reviews: 0,
        };

        let err = row_to_barber(row).expect_err("unknown status");
        assert!(err.contains("napping"));
    }

    #[rstest]
    fn barber_rows_round_trip_status() {
        let mut profile = BarberProfile::onboarded(BarberId::random(), UserId::random());
        profile.set_availability(true, BarberStatus::Break);

        let restored = row_to_barber(barber_to_row(&profile)).expect("valid row");

        assert_eq!(restored, profile);
    }

    #[rstest]
    fn negative_amounts_are_rejected() {
        let row = BookingRow {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            barber_id: Uuid::new_v4(),
            shop_id: Uuid::new_v4(),
            services: serde_json::json!([]),
            start_time: Utc::now(),
            end_time: Utc::now(),
            status: BookingStatus::Pending.as_str().to_owned(),
            payment_status: "pending".to_owned(),
            total_amount: -5,
            notes: None,
            cancellation_reason: None,
            created_at: Utc::now(),
        };

        assert!(row_to_booking(row).is_err());
    }
}
