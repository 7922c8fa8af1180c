//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Status columns are stored as their stable
//! `as_str` text and parsed back through `FromStr`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    barber_profiles, bookings, customer_profiles, join_requests, notifications, reviews, shops,
    transactions, users, wallets,
};

// ---------------------------------------------------------------------------
// Identity models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub full_name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = customer_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomerProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = barber_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BarberProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shop_id: Option<Uuid>,
    pub seat_number: Option<i32>,
    pub is_available: bool,
    pub status: String,
    pub rating: f64,
    pub total_reviews: i32,
}

// ---------------------------------------------------------------------------
// Shop models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = shops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ShopRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub total_seats: i32,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub opening_hours: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = join_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct JoinRequestRow {
    pub id: Uuid,
    pub barber_id: Uuid,
    pub shop_id: Uuid,
    pub status: String,
    pub seat_number: Option<i32>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Booking models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub barber_id: Uuid,
    pub shop_id: Uuid,
    pub services: serde_json::Value,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub payment_status: String,
    pub total_amount: i64,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mutable booking columns written by a status transition.
/// Columns a status transition may touch; `None` leaves a column as stored.
#[derive(Debug, Clone, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = bookings)]
pub(crate) struct BookingTransition<'a> {
    pub status: &'a str,
    pub payment_status: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub cancellation_reason: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub barber_id: Uuid,
    pub customer_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Wallet models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WalletRow {
    pub user_id: Uuid,
    pub balance: i64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub amount: i64,
    pub reference: String,
    pub status: String,
    pub booking_id: Option<Uuid>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Notification models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
