//! Booking engine service.
//!
//! Drives the booking state machine: customers create and cancel, the
//! assigned barber confirms and completes, and customers review completed
//! bookings. Slot conflicts are enforced by the repository so two concurrent
//! creations cannot both hold the same interval.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    BookingEngine, BookingRepository, CancellationOutcome, CreateBookingRequest, IdentityStore,
    NotificationDispatcher, ReviewOutcome, ShopRepository,
};
use crate::domain::service_support::{
    barber_account, customer_account, dispatch, map_booking_error, map_booking_validation,
    map_identity_error, map_invalid_rating, map_money_error, map_shop_error, not_authorized,
    not_found, require_barber, require_customer, require_user,
};
use crate::domain::{
    Booking, BookingDraft, BookingId, BookingParty, BookingStatus, Error, Notification, Profile,
    Rating, Review, ReviewId, UserId,
};

/// Booking engine implementing the driving port.
#[derive(Clone)]
pub struct BookingService<B, S, I, N> {
    bookings: Arc<B>,
    shops: Arc<S>,
    identity: Arc<I>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<B, S, I, N> BookingService<B, S, I, N> {
    /// Create a new booking engine.
    pub fn new(
        bookings: Arc<B>,
        shops: Arc<S>,
        identity: Arc<I>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            shops,
            identity,
            notifier,
            clock,
        }
    }
}

impl<B, S, I, N> BookingService<B, S, I, N>
where
    B: BookingRepository,
    S: ShopRepository,
    I: IdentityStore,
    N: NotificationDispatcher,
{
    async fn load(&self, booking_id: &BookingId) -> Result<Booking, Error> {
        self.bookings
            .find_by_id(booking_id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| not_found("booking not found", "booking_not_found"))
    }

    /// Which side of the booking the actor is on.
    async fn party_of(&self, actor: &UserId, booking: &Booking) -> Result<BookingParty, Error> {
        let user = require_user(self.identity.as_ref(), actor).await?;
        match &user.profile {
            Profile::Customer(customer) if customer.id == booking.customer_id => {
                Ok(BookingParty::Customer)
            }
            Profile::Barber(barber) if barber.id == booking.barber_id => Ok(BookingParty::Barber),
            _ => Err(not_authorized("only the booking's customer or barber may do this")),
        }
    }

    /// Load a booking the acting barber is assigned to.
    async fn assigned_booking(
        &self,
        actor: &UserId,
        booking_id: &BookingId,
    ) -> Result<Booking, Error> {
        let barber = require_barber(self.identity.as_ref(), actor).await?;
        let booking = self.load(booking_id).await?;
        if booking.barber_id != barber.id {
            return Err(not_authorized("only the assigned barber may do this"));
        }
        Ok(booking)
    }

    async fn notify_customer(&self, booking: &Booking, build: fn(UserId, &Booking) -> Notification) {
        if let Some(recipient) = customer_account(self.identity.as_ref(), &booking.customer_id).await
        {
            dispatch(self.notifier.as_ref(), build(recipient, booking)).await;
        }
    }
}

#[async_trait]
impl<B, S, I, N> BookingEngine for BookingService<B, S, I, N>
where
    B: BookingRepository,
    S: ShopRepository,
    I: IdentityStore,
    N: NotificationDispatcher,
{
    async fn create(&self, actor: &UserId, request: CreateBookingRequest) -> Result<Booking, Error> {
        let user = require_user(self.identity.as_ref(), actor).await?;
        let customer = user
            .customer()
            .cloned()
            .ok_or_else(|| not_authorized("a customer profile is required"))?;
        let barber = self
            .identity
            .find_barber(&request.barber_id)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| not_found("barber not found", "barber_not_found"))?;
        let shop = self
            .shops
            .find_by_id(&request.shop_id)
            .await
            .map_err(map_shop_error)?
            .ok_or_else(|| not_found("shop not found", "shop_not_found"))?;
        if barber.shop_id != Some(shop.id) {
            return Err(Error::invalid_request("barber does not work at this shop")
                .with_details(json!({ "code": "barber_shop_mismatch" })));
        }
        if !barber.is_available {
            return Err(Error::conflict("barber is not available")
                .with_details(json!({ "code": "barber_unavailable" })));
        }

        let booking = Booking::schedule(
            BookingDraft {
                customer_id: customer.id,
                barber_id: barber.id,
                shop_id: shop.id,
                services: request.services,
                start_time: request.start_time,
                notes: request.notes,
            },
            self.clock.utc(),
        )
        .map_err(|err| map_booking_validation(&err))?;

        self.bookings
            .create(&booking)
            .await
            .map_err(map_booking_error)?;
        info!(
            booking_id = %booking.id,
            barber_id = %barber.id,
            start = %booking.start_time,
            total = %booking.total_amount,
            "booking created"
        );

        dispatch(
            self.notifier.as_ref(),
            Notification::booking_created(barber.user_id, &booking, &user.full_name),
        )
        .await;
        Ok(booking)
    }

    async fn get(&self, actor: &UserId, booking_id: &BookingId) -> Result<Booking, Error> {
        let booking = self.load(booking_id).await?;
        self.party_of(actor, &booking).await?;
        Ok(booking)
    }

    async fn list(&self, actor: &UserId) -> Result<Vec<Booking>, Error> {
        let user = require_user(self.identity.as_ref(), actor).await?;
        let mut bookings = match &user.profile {
            Profile::Customer(customer) => self.bookings.list_for_customer(&customer.id).await,
            Profile::Barber(barber) => self.bookings.list_for_barber(&barber.id).await,
        }
        .map_err(map_booking_error)?;
        bookings.sort_by_key(|booking| booking.start_time);
        Ok(bookings)
    }

    async fn confirm(&self, actor: &UserId, booking_id: &BookingId) -> Result<Booking, Error> {
        let mut booking = self.assigned_booking(actor, booking_id).await?;
        let expected = booking.status;
        booking.confirm()?;
        self.bookings
            .save_transition(&booking, expected)
            .await
            .map_err(map_booking_error)?;
        info!(booking_id = %booking.id, "booking confirmed");

        self.notify_customer(&booking, Notification::booking_confirmed)
            .await;
        Ok(booking)
    }

    async fn complete(
        &self,
        actor: &UserId,
        booking_id: &BookingId,
        notes: Option<String>,
    ) -> Result<Booking, Error> {
        let mut booking = self.assigned_booking(actor, booking_id).await?;
        let expected = booking.status;
        booking.complete(notes)?;
        self.bookings
            .save_transition(&booking, expected)
            .await
            .map_err(map_booking_error)?;
        info!(booking_id = %booking.id, "booking completed");

        self.notify_customer(&booking, Notification::booking_completed)
            .await;
        Ok(booking)
    }

    async fn cancel(
        &self,
        actor: &UserId,
        booking_id: &BookingId,
        reason: Option<String>,
    ) -> Result<CancellationOutcome, Error> {
        let mut booking = self.load(booking_id).await?;
        let party = self.party_of(actor, &booking).await?;
        let expected = booking.status;
        booking.cancel(reason)?;
        let cancellation_fee = booking
            .cancellation_fee(party, self.clock.utc())
            .map_err(|err| map_money_error(&err))?;
        self.bookings
            .save_transition(&booking, expected)
            .await
            .map_err(map_booking_error)?;
        info!(
            booking_id = %booking.id,
            cancelled_by = ?party,
            fee = %cancellation_fee,
            "booking cancelled"
        );

        let counterpart = match party {
            BookingParty::Customer => {
                barber_account(self.identity.as_ref(), &booking.barber_id).await
            }
            BookingParty::Barber => {
                customer_account(self.identity.as_ref(), &booking.customer_id).await
            }
        };
        if let Some(recipient) = counterpart.filter(|recipient| recipient != actor) {
            dispatch(
                self.notifier.as_ref(),
                Notification::booking_cancelled(recipient, &booking, cancellation_fee),
            )
            .await;
        }
        Ok(CancellationOutcome {
            booking,
            cancellation_fee,
        })
    }

    async fn rate(
        &self,
        actor: &UserId,
        booking_id: &BookingId,
        rating: i64,
        comment: Option<String>,
    ) -> Result<ReviewOutcome, Error> {
        let customer = require_customer(self.identity.as_ref(), actor).await?;
        let booking = self.load(booking_id).await?;
        if booking.customer_id != customer.id {
            return Err(not_authorized("only the booking's customer may review it"));
        }
        if booking.status != BookingStatus::Completed {
            return Err(Error::invalid_transition("only completed bookings can be reviewed")
                .with_details(json!({
                    "code": "booking_not_completed",
                    "status": booking.status.as_str(),
                })));
        }
        let rating = Rating::new(rating).map_err(|err| map_invalid_rating(&err))?;

        let review = Review {
            id: ReviewId::random(),
            booking_id: booking.id,
            barber_id: booking.barber_id,
            customer_id: customer.id,
            rating,
            comment,
            created_at: self.clock.utc(),
        };
        let barber_rating = self
            .bookings
            .save_review(&review)
            .await
            .map_err(map_booking_error)?;
        info!(
            booking_id = %booking.id,
            barber_id = %booking.barber_id,
            rating = barber_rating.rating,
            reviews = barber_rating.total_reviews,
            "booking reviewed"
        );
        Ok(ReviewOutcome {
            review,
            barber_rating,
        })
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
