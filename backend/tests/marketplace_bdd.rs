//! Behavioural tests for the marketplace services over the in-memory store.

use std::cell::RefCell;

use barberzon::domain::ports::{
    CreateBookingRequest, IdentityStore, RespondToJoinRequest, SubmitJoinRequest,
};
use barberzon::domain::{
    BarberId, Booking, Error, ExternalStatus, JoinRequest, JoinRequestAction, JoinRequestStatus,
    Money, PaymentReference, ServiceLine, Shop, User,
};
use barberzon::test_support::marketplace::{Marketplace, opening_morning};
use chrono::{DateTime, TimeDelta, Utc};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

struct MarketWorld {
    runtime: Runtime,
    market: Marketplace,
    owner: User,
    customer: User,
    shop: RefCell<Option<Shop>>,
    join_request: RefCell<Option<JoinRequest>>,
    booking: RefCell<Option<Booking>>,
    deposit: RefCell<Option<PaymentReference>>,
    fee: RefCell<Option<Money>>,
    last_error: RefCell<Option<Error>>,
}

impl MarketWorld {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn owner_barber_id(&self) -> BarberId {
        self.owner.barber().expect("owner is a barber").id
    }

    fn shop(&self) -> Shop {
        self.shop.borrow().clone().expect("shop opened")
    }

    fn booking(&self) -> Booking {
        self.booking.borrow().clone().expect("booking created")
    }

    fn record<T>(&self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.last_error.replace(Some(err));
                None
            }
        }
    }

    fn open(&self, seats: u32) {
        let shop = self.block_on(self.market.open_shop(&self.owner, seats));
        self.shop.replace(Some(shop));
    }

    fn book_owner_at_ten(&self, customer: &User) -> Result<Booking, Error> {
        let request = CreateBookingRequest {
            barber_id: self.owner_barber_id(),
            shop_id: self.shop().id,
            services: vec![line("Cut", 3000), line("Shave", 1500)],
            start_time: at(10, 0),
            notes: None,
        };
        self.block_on(self.market.state.bookings.create(&customer.id, request))
    }

    fn balance(&self) -> i64 {
        self.block_on(self.market.state.wallet.get_wallet(&self.customer.id))
            .expect("wallet")
            .balance
            .amount()
    }
}

fn line(name: &str, price: i64) -> ServiceLine {
    ServiceLine {
        name: name.to_owned(),
        price: Money::new(price).expect("price"),
        duration_minutes: None,
    }
}

fn at(hour: i64, minute: i64) -> DateTime<Utc> {
    opening_morning() + TimeDelta::hours(hour - 8) + TimeDelta::minutes(minute)
}

#[fixture]
fn world() -> MarketWorld {
    let market = Marketplace::new();
    let owner = market.barber("Kunle");
    let customer = market.customer("Tola");
    MarketWorld {
        runtime: Runtime::new().expect("tokio runtime"),
        market,
        owner,
        customer,
        shop: RefCell::new(None),
        join_request: RefCell::new(None),
        booking: RefCell::new(None),
        deposit: RefCell::new(None),
        fee: RefCell::new(None),
        last_error: RefCell::new(None),
    }
}

#[given("a two-seat shop occupied by its owner")]
fn a_two_seat_shop(world: &MarketWorld) {
    world.open(2);
}

#[given("a second barber has asked to join the shop")]
fn a_second_barber_has_asked_to_join(world: &MarketWorld) {
    let applicant = world.market.barber("Segun");
    let request = SubmitJoinRequest {
        shop_id: world.shop().id,
        message: "Looking for a chair".to_owned(),
        seat_number: None,
    };
    let submitted = world
        .block_on(world.market.state.join_requests.submit(&applicant.id, request))
        .expect("submission accepted");
    assert_eq!(submitted.status, JoinRequestStatus::Pending);
    world.join_request.replace(Some(submitted));
}

#[given("a third barber has taken the last free seat")]
fn a_third_barber_has_taken_the_last_seat(world: &MarketWorld) {
    let workflow = &world.market.state.join_requests;
    let rival = world.market.barber("Femi");
    let request = SubmitJoinRequest {
        shop_id: world.shop().id,
        message: "Free from Monday".to_owned(),
        seat_number: None,
    };
    let submitted = world
        .block_on(workflow.submit(&rival.id, request))
        .expect("submission accepted");
    world
        .block_on(workflow.respond(
            &world.owner.id,
            RespondToJoinRequest {
                request_id: submitted.id,
                action: JoinRequestAction::Approve,
                seat_number: None,
            },
        ))
        .expect("approval accepted");
}

#[given("a customer has booked the owner at 10:00 for a 3000 cut and a 1500 shave")]
fn a_customer_has_booked_the_owner(world: &MarketWorld) {
    let booking = world
        .book_owner_at_ten(&world.customer)
        .expect("first booking accepted");
    world.booking.replace(Some(booking));
}

#[given("the customer's wallet holds 1000")]
fn the_customers_wallet_holds_1000(world: &MarketWorld) {
    let session = world
        .block_on(
            world
                .market
                .state
                .wallet
                .fund(&world.customer.id, Money::new(1000).expect("amount")),
        )
        .expect("funding started");
    world
        .block_on(
            world
                .market
                .state
                .wallet
                .reconcile(&session.transaction.reference, ExternalStatus::Success),
        )
        .expect("deposit settled");
}

#[given("a customer without funds")]
fn a_customer_without_funds(world: &MarketWorld) {
    assert_eq!(world.balance(), 0);
}

#[given("the owner has confirmed the booking")]
fn the_owner_has_confirmed_the_booking(world: &MarketWorld) {
    let confirmed = world
        .block_on(
            world
                .market
                .state
                .bookings
                .confirm(&world.owner.id, &world.booking().id),
        )
        .expect("confirmation accepted");
    world.booking.replace(Some(confirmed));
}

#[given("the time is 09:00")]
fn the_time_is_nine(world: &MarketWorld) {
    world.market.clock.set(at(9, 0));
}

#[when("the owner approves the join request")]
fn the_owner_approves(world: &MarketWorld) {
    let request_id = world
        .join_request
        .borrow()
        .as_ref()
        .expect("join request submitted")
        .id;
    let result = world.block_on(world.market.state.join_requests.respond(
        &world.owner.id,
        RespondToJoinRequest {
            request_id,
            action: JoinRequestAction::Approve,
            seat_number: None,
        },
    ));
    world.record(result);
}

#[when("another customer books the owner at 10:00 for a 3000 cut and a 1500 shave")]
fn another_customer_books_the_owner(world: &MarketWorld) {
    let other = world.market.customer("Bisi");
    let result = world.book_owner_at_ten(&other);
    world.record(result);
}

#[when("the customer pays for the booking")]
fn the_customer_pays(world: &MarketWorld) {
    let result = world.block_on(
        world
            .market
            .state
            .wallet
            .pay_for_booking(&world.customer.id, &world.booking().id),
    );
    world.record(result);
}

#[when("the customer funds their wallet with 5000")]
fn the_customer_funds_5000(world: &MarketWorld) {
    let session = world
        .block_on(
            world
                .market
                .state
                .wallet
                .fund(&world.customer.id, Money::new(5000).expect("amount")),
        )
        .expect("funding started");
    world.deposit.replace(Some(session.transaction.reference));
}

#[when("the deposit is reconciled as successful twice")]
fn the_deposit_is_reconciled_twice(world: &MarketWorld) {
    let reference = world.deposit.borrow().clone().expect("deposit started");
    let ledger = &world.market.state.wallet;

    let first = world
        .block_on(ledger.reconcile(&reference, ExternalStatus::Success))
        .expect("first reconciliation");
    let second = world
        .block_on(ledger.reconcile(&reference, ExternalStatus::Success))
        .expect("second reconciliation");

    assert!(first.applied);
    assert!(!second.applied);
}

#[when("the owner cancels the booking")]
fn the_owner_cancels(world: &MarketWorld) {
    let result = world.block_on(world.market.state.bookings.cancel(
        &world.owner.id,
        &world.booking().id,
        Some("called away".to_owned()),
    ));
    if let Some(outcome) = world.record(result) {
        world.fee.replace(Some(outcome.cancellation_fee));
    }
}

#[when("the customer cancels the booking")]
fn the_customer_cancels(world: &MarketWorld) {
    let result = world.block_on(world.market.state.bookings.cancel(
        &world.customer.id,
        &world.booking().id,
        None,
    ));
    if let Some(outcome) = world.record(result) {
        world.fee.replace(Some(outcome.cancellation_fee));
    }
}

#[when("the owner completes the booking")]
fn the_owner_completes(world: &MarketWorld) {
    let completed = world
        .block_on(world.market.state.bookings.complete(
            &world.owner.id,
            &world.booking().id,
            None,
        ))
        .expect("completion accepted");
    world.booking.replace(Some(completed));
}

#[when("the customer rates the booking 4")]
fn the_customer_rates_4(world: &MarketWorld) {
    world
        .block_on(world.market.state.bookings.rate(
            &world.customer.id,
            &world.booking().id,
            4,
            Some("Sharp fade".to_owned()),
        ))
        .expect("review accepted");
}

#[then("the call fails with reason {reason}")]
fn the_call_fails_with_reason(world: &MarketWorld, reason: String) {
    let error = world.last_error.borrow().clone().expect("an error");
    assert_eq!(error.reason(), Some(reason.trim_matches('"')));
}

#[then("the join request is still pending")]
fn the_join_request_is_still_pending(world: &MarketWorld) {
    let requests = world
        .block_on(
            world
                .market
                .state
                .join_requests
                .list_for_shop(&world.owner.id, &world.shop().id),
        )
        .expect("owner can list");
    let submitted = world
        .join_request
        .borrow()
        .as_ref()
        .expect("join request submitted")
        .id;
    let request = requests
        .iter()
        .find(|request| request.id == submitted)
        .expect("request listed");
    assert_eq!(request.status, JoinRequestStatus::Pending);
}

#[then("the first booking totals 4500 and ends at 11:00")]
fn the_first_booking_totals_4500(world: &MarketWorld) {
    let booking = world.booking();
    assert_eq!(booking.total_amount.amount(), 4500);
    assert_eq!(booking.end_time, at(11, 0));
}

#[then("the customer's balance is {amount}")]
fn the_customers_balance_is(world: &MarketWorld, amount: i64) {
    assert_eq!(world.balance(), amount);
}

#[then("the cancellation fee is {amount}")]
fn the_cancellation_fee_is(world: &MarketWorld, amount: i64) {
    let fee = world.fee.borrow().expect("cancellation succeeded");
    assert_eq!(fee.amount(), amount);
}

#[then("the owner's rating is 4 over 1 review")]
fn the_owners_rating_is_4(world: &MarketWorld) {
    let profile = world
        .block_on(world.market.store.get_barber_profile(&world.owner.id))
        .expect("identity lookup")
        .expect("owner profile");
    assert_eq!(profile.total_reviews, 1);
    assert!((profile.rating - 4.0).abs() < f64::EPSILON);
}

#[scenario(
    path = "tests/features/marketplace.feature",
    name = "A full shop cannot approve another barber"
)]
fn full_shop_rejects_approval(world: MarketWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/marketplace.feature",
    name = "Bookings for the same barber and time conflict"
)]
fn same_slot_bookings_conflict(world: MarketWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/marketplace.feature",
    name = "A short balance cannot pay for a booking"
)]
fn short_balance_cannot_pay(world: MarketWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/marketplace.feature",
    name = "Deposits are credited once after reconciliation"
)]
fn deposits_credit_once(world: MarketWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/marketplace.feature",
    name = "Barbers cancelling late owe no fee"
)]
fn barber_cancellations_are_free(world: MarketWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/marketplace.feature",
    name = "Customers cancelling late owe a fifth of the total"
)]
fn late_customer_cancellations_carry_a_fee(world: MarketWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/marketplace.feature",
    name = "Completed bookings can be reviewed once finished"
)]
fn completed_bookings_are_reviewed(world: MarketWorld) {
    drop(world);
}
