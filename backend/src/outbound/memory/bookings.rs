//! Booking repository over the in-memory store.

use async_trait::async_trait;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{
    BarberId, Booking, BookingId, BookingStatus, CustomerId, PaymentStatus, RatingSummary, Review,
    RuleViolation,
};

use super::InMemoryStore;

fn sorted_by_start(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by_key(|booking| booking.start_time);
    bookings
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn create(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut state = self.lock();
        if state
            .bookings
            .values()
            .any(|existing| existing.conflicts_with(booking))
        {
            return Err(BookingRepositoryError::rejected(RuleViolation::SlotConflict));
        }
        state.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(self.lock().bookings.get(id).cloned())
    }

    async fn list_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let state = self.lock();
        Ok(sorted_by_start(
            state
                .bookings
                .values()
                .filter(|booking| &booking.customer_id == customer_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_barber(
        &self,
        barber_id: &BarberId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let state = self.lock();
        Ok(sorted_by_start(
            state
                .bookings
                .values()
                .filter(|booking| &booking.barber_id == barber_id)
                .cloned()
                .collect(),
        ))
    }

    async fn save_transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<(), BookingRepositoryError> {
        let mut state = self.lock();
        let stored = state.bookings.get_mut(&booking.id).ok_or_else(|| {
            BookingRepositoryError::rejected(RuleViolation::Missing { entity: "booking" })
        })?;
        if stored.status != expected {
            return Err(BookingRepositoryError::rejected(
                RuleViolation::InvalidTransition {
                    from: stored.status,
                    to: booking.status,
                },
            ));
        }
        stored.status = booking.status;
        stored.notes.clone_from(&booking.notes);
        stored.cancellation_reason.clone_from(&booking.cancellation_reason);
        if booking.status == BookingStatus::Completed {
            stored.payment_status = PaymentStatus::Paid;
        }
        Ok(())
    }

    async fn save_review(&self, review: &Review) -> Result<RatingSummary, BookingRepositoryError> {
        let mut state = self.lock();
        if !state.bookings.contains_key(&review.booking_id) {
            return Err(BookingRepositoryError::rejected(RuleViolation::Missing {
                entity: "booking",
            }));
        }
        state.reviews.insert(review.booking_id, review.clone());
        let summary = RatingSummary::from_ratings(
            state
                .reviews
                .values()
                .filter(|stored| stored.barber_id == review.barber_id)
                .map(|stored| stored.rating),
        );
        let barber = state.barber_mut(&review.barber_id).ok_or_else(|| {
            BookingRepositoryError::rejected(RuleViolation::Missing { entity: "barber" })
        })?;
        barber.rating = summary.rating;
        barber.total_reviews = summary.total_reviews;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{BookingDraft, Money, Rating, ReviewId, ServiceLine, ShopId, User};

    struct World {
        store: InMemoryStore,
        customer: User,
        barber: User,
    }

    #[fixture]
    fn world() -> World {
        let store = InMemoryStore::new(Arc::new(DefaultClock));
        let customer = store.register_customer("Chidi", "chidi@example.com");
        let barber = store.register_barber("Bola", "bola@example.com");
        World {
            store,
            customer,
            barber,
        }
    }

    fn start(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, hour, minute, 0)
            .single()
            .expect("valid time")
    }

    fn book(world: &World, hour: u32, minute: u32) -> Booking {
        Booking::schedule(
            BookingDraft {
                customer_id: world.customer.customer().expect("customer").id,
                barber_id: world.barber.barber().expect("barber").id,
                shop_id: ShopId::random(),
                services: vec![ServiceLine {
                    name: "Haircut".to_owned(),
                    price: Money::new(3000).expect("price"),
                    duration_minutes: Some(60),
                }],
                start_time: start(hour, minute),
                notes: None,
            },
            start(0, 0),
        )
        .expect("valid booking")
    }

    #[rstest]
    #[case(10, 30, true)]
    #[case(9, 30, true)]
    #[case(9, 0, false)]
    #[case(11, 0, false)]
    #[tokio::test]
    async fn overlapping_live_bookings_conflict(
        world: World,
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] conflicts: bool,
    ) {
        world
            .store
            .create(&book(&world, 10, 0))
            .await
            .expect("first booking");

        let result = world.store.create(&book(&world, hour, minute)).await;

        if conflicts {
            assert_eq!(
                result,
                Err(BookingRepositoryError::rejected(RuleViolation::SlotConflict))
            );
        } else {
            assert!(result.is_ok());
        }
    }

    #[rstest]
    #[tokio::test]
    async fn cancelled_bookings_release_their_slot(world: World) {
        let mut first = book(&world, 10, 0);
        world.store.create(&first).await.expect("first booking");
        first.cancel(None).expect("cancel");
        world
            .store
            .save_transition(&first, BookingStatus::Pending)
            .await
            .expect("cancelled");

        world
            .store
            .create(&book(&world, 10, 0))
            .await
            .expect("slot is free again");
    }

    #[rstest]
    #[tokio::test]
    async fn stale_transitions_are_rejected(world: World) {
        let booking = book(&world, 10, 0);
        world.store.create(&booking).await.expect("stored");
        let mut confirmed = booking.clone();
        confirmed.confirm().expect("confirm");
        world
            .store
            .save_transition(&confirmed, BookingStatus::Pending)
            .await
            .expect("first writer wins");

        let mut cancelled = booking;
        cancelled.cancel(None).expect("cancel");
        let err = world
            .store
            .save_transition(&cancelled, BookingStatus::Pending)
            .await
            .expect_err("stale writer loses");
        assert_eq!(
            err,
            BookingRepositoryError::rejected(RuleViolation::InvalidTransition {
                from: BookingStatus::Confirmed,
                to: BookingStatus::Cancelled,
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn reviews_update_the_barber_average(world: World) {
        let barber_id = world.barber.barber().expect("barber").id;
        let customer_id = world.customer.customer().expect("customer").id;
        let mut summary = None;
        for (hour, rating) in [(9, 5), (11, 4)] {
            let booking = book(&world, hour, 0);
            world.store.create(&booking).await.expect("stored");
            let review = Review {
                id: ReviewId::random(),
                booking_id: booking.id,
                barber_id,
                customer_id,
                rating: Rating::new(rating).expect("rating"),
                comment: None,
                created_at: start(12, 0),
            };
            summary = Some(world.store.save_review(&review).await.expect("saved"));
        }

        let summary = summary.expect("summary");
        assert_eq!(summary.total_reviews, 2);
        assert!((summary.rating - 4.5).abs() < f64::EPSILON);
        let state = world.store.lock();
        let stored = state.barber(&barber_id).expect("barber");
        assert_eq!(stored.total_reviews, 2);
    }
}
