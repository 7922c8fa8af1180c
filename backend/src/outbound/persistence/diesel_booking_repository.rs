//! PostgreSQL-backed `BookingRepository` implementation using Diesel ORM.
//!
//! Slot conflicts are checked under a lock on the barber row and backed by
//! the `bookings_barber_slot_excl` exclusion constraint. Status changes are
//! compare-and-set on the stored status, so a stale transition loses.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{
    BarberId, Booking, BookingId, BookingStatus, CustomerId, PaymentStatus, Rating, RatingSummary,
    Review, RuleViolation,
};

use super::diesel_error_mapping::{self, TxError};
use super::diesel_shop_repository::lock_barber;
use super::models::{BookingRow, BookingTransition, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{booking_to_row, row_to_booking, to_db_int};
use super::schema::{barber_profiles, bookings, reviews};

/// Statuses whose bookings hold their slot.
const LIVE_STATUSES: [&str; 2] = [
    BookingStatus::Pending.as_str(),
    BookingStatus::Confirmed.as_str(),
];

/// Columns written by a transition to `booking.status`.
///
/// Payment state is owned by the wallet ledger; a transition only marks a
/// booking paid on completion and never resets it.
fn transition_changes(booking: &Booking) -> BookingTransition<'_> {
    BookingTransition {
        status: booking.status.as_str(),
        payment_status: (booking.status == BookingStatus::Completed)
            .then_some(PaymentStatus::Paid.as_str()),
        notes: booking.notes.as_deref(),
        cancellation_reason: booking.cancellation_reason.as_deref(),
    }
}

/// Diesel-backed implementation of the `BookingRepository` port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingRepositoryError {
    diesel_error_mapping::map_pool_error(error)
}

fn map_diesel_error(error: diesel::result::Error) -> BookingRepositoryError {
    diesel_error_mapping::map_diesel_error(error)
}

fn map_tx_error(error: TxError) -> BookingRepositoryError {
    diesel_error_mapping::map_tx_error(error)
}

fn rows_to_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, BookingRepositoryError> {
    rows.into_iter()
        .map(row_to_booking)
        .collect::<Result<Vec<_>, _>>()
        .map_err(BookingRepositoryError::query)
}

/// Read the stored status of a booking after a compare-and-set missed.
async fn stored_status(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<BookingStatus>, BookingRepositoryError> {
    let status: Option<String> = bookings::table
        .find(id)
        .select(bookings::status)
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    status
        .map(|raw| {
            raw.parse::<BookingStatus>()
                .map_err(|err| BookingRepositoryError::query(err.to_string()))
        })
        .transpose()
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = booking_to_row(booking).map_err(BookingRepositoryError::query)?;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                lock_barber(conn, row.barber_id).await?;
                let overlapping: i64 = bookings::table
                    .filter(bookings::barber_id.eq(row.barber_id))
                    .filter(bookings::status.eq_any(LIVE_STATUSES))
                    .filter(bookings::start_time.lt(row.end_time))
                    .filter(bookings::end_time.gt(row.start_time))
                    .count()
                    .get_result(conn)
                    .await?;
                if overlapping > 0 {
                    return Err(RuleViolation::SlotConflict.into());
                }
                diesel::insert_into(bookings::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BookingRow> = bookings::table
            .find(id.as_uuid())
            .select(BookingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_booking)
            .transpose()
            .map_err(BookingRepositoryError::query)
    }

    async fn list_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::customer_id.eq(customer_id.as_uuid()))
            .select(BookingRow::as_select())
            .order_by(bookings::start_time.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_bookings(rows)
    }

    async fn list_for_barber(
        &self,
        barber_id: &BarberId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::barber_id.eq(barber_id.as_uuid()))
            .select(BookingRow::as_select())
            .order_by(bookings::start_time.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_bookings(rows)
    }

    async fn save_transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<(), BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = transition_changes(booking);
        let updated = diesel::update(
            bookings::table
                .filter(bookings::id.eq(booking.id.as_uuid()))
                .filter(bookings::status.eq(expected.as_str())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let violation = match stored_status(&mut conn, *booking.id.as_uuid()).await? {
            Some(from) => RuleViolation::InvalidTransition {
                from,
                to: booking.status,
            },
            None => RuleViolation::Missing { entity: "booking" },
        };
        Err(BookingRepositoryError::rejected(violation))
    }

    async fn save_review(&self, review: &Review) -> Result<RatingSummary, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ReviewRow {
            id: *review.id.as_uuid(),
            booking_id: *review.booking_id.as_uuid(),
            barber_id: *review.barber_id.as_uuid(),
            customer_id: *review.customer_id.as_uuid(),
            rating: i16::from(review.rating.value()),
            comment: review.comment.clone(),
            created_at: review.created_at,
        };
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                lock_barber(conn, row.barber_id).await?;
                diesel::insert_into(reviews::table)
                    .values(&row)
                    .on_conflict(reviews::booking_id)
                    .do_update()
                    .set((
                        reviews::rating.eq(row.rating),
                        reviews::comment.eq(row.comment.as_deref()),
                    ))
                    .execute(conn)
                    .await?;

                let stored: Vec<i16> = reviews::table
                    .filter(reviews::barber_id.eq(row.barber_id))
                    .select(reviews::rating)
                    .load(conn)
                    .await?;
                let ratings = stored
                    .into_iter()
                    .map(|raw| Rating::new(i64::from(raw)))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|err| TxError::Corrupt(err.to_string()))?;
                let summary = RatingSummary::from_ratings(ratings);

                diesel::update(barber_profiles::table.find(row.barber_id))
                    .set((
                        barber_profiles::rating.eq(summary.rating),
                        barber_profiles::total_reviews.eq(to_db_int(summary.total_reviews)),
                    ))
                    .execute(conn)
                    .await?;
                Ok(summary)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn only_live_statuses_hold_slots() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(
                LIVE_STATUSES.contains(&status.as_str()),
                status.blocks_slot(),
                "{status}"
            );
        }
    }

    fn booking() -> Booking {
        let now = chrono::Utc::now();
        Booking::schedule(
            crate::domain::BookingDraft {
                customer_id: CustomerId::random(),
                barber_id: BarberId::random(),
                shop_id: crate::domain::ShopId::random(),
                services: vec![crate::domain::ServiceLine {
                    name: "Haircut".to_owned(),
                    price: crate::domain::Money::new(4500).expect("price"),
                    duration_minutes: None,
                }],
                start_time: now + chrono::TimeDelta::hours(3),
                notes: None,
            },
            now,
        )
        .expect("valid booking")
    }

    #[rstest]
    fn confirming_and_cancelling_leave_payment_state_alone() {
        let mut confirmed = booking();
        confirmed.confirm().expect("confirm");
        assert_eq!(transition_changes(&confirmed).payment_status, None);

        let mut cancelled = booking();
        cancelled
            .cancel(Some("running late".to_owned()))
            .expect("cancel");
        let changes = transition_changes(&cancelled);
        assert_eq!(changes.payment_status, None);
        assert_eq!(changes.status, "cancelled");
        assert_eq!(changes.cancellation_reason, Some("running late"));
    }

    #[rstest]
    fn completing_marks_the_booking_paid() {
        let mut completed = booking();
        completed.confirm().expect("confirm");
        completed.complete(None).expect("complete");

        assert_eq!(
            transition_changes(&completed).payment_status,
            Some(PaymentStatus::Paid.as_str())
        );
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, BookingRepositoryError::Connection { .. }));
    }
}
