//! Tests for the booking handlers.

use actix_web::http::StatusCode;
use actix_web::App;
use actix_web::test as actix_test;
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::{BookingStatus, Money, UserId};
use crate::inbound::http::test_utils::{
    MockPorts, booking_fixture, login_cookie, test_routes, test_session_middleware,
};

macro_rules! app {
    ($ports:expr) => {
        actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new($ports.into_state()))
                .configure(test_routes),
        )
        .await
    };
}

fn create_body(barber_id: &str) -> CreateBookingBody {
    CreateBookingBody {
        barber_id: barber_id.to_owned(),
        shop_id: ShopId::random().to_string(),
        services: vec![
            ServiceBody {
                name: "Haircut".to_owned(),
                price: 4500,
                duration_minutes: None,
            },
            ServiceBody {
                name: "Beard trim".to_owned(),
                price: 2000,
                duration_minutes: Some(15),
            },
        ],
        booking_date: "2026-11-02".to_owned(),
        booking_time: "14:30".to_owned(),
        notes: Some("Low fade".to_owned()),
    }
}

#[rstest]
fn create_body_becomes_a_utc_request() {
    let barber_id = BarberId::random();

    let request = parse_create_booking(create_body(&barber_id.to_string())).expect("valid body");

    assert_eq!(request.barber_id, barber_id);
    assert_eq!(
        request.start_time,
        Utc.with_ymd_and_hms(2026, 11, 2, 14, 30, 0)
            .single()
            .expect("valid instant")
    );
    assert_eq!(request.services.len(), 2);
    assert_eq!(request.services[1].duration_minutes, Some(15));
    assert_eq!(request.services[0].price, Money::new(4500).expect("price"));
}

#[rstest]
fn negative_prices_are_rejected() {
    let mut body = create_body(&BarberId::random().to_string());
    body.services[0].price = -1;

    let err = parse_create_booking(body).expect_err("negative price");

    assert_eq!(err.reason(), Some("invalid_amount"));
}

#[rstest]
fn malformed_barber_ids_name_the_field() {
    let err = parse_create_booking(create_body("barber-7")).expect_err("bad id");

    assert_eq!(err.details().expect("details")["field"], "barberId");
}

#[actix_web::test]
async fn create_returns_201_with_the_booking() {
    let booking = booking_fixture();
    let expected_barber = booking.barber_id;
    let mut ports = MockPorts::default();
    ports
        .bookings
        .expect_create()
        .withf(move |_, request| {
            request.barber_id == expected_barber && request.notes.as_deref() == Some("Low fade")
        })
        .times(1)
        .return_once(move |_, _| Ok(booking));
    let app = app!(ports);
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/bookings")
            .cookie(cookie)
            .set_json(json!({
                "barberId": expected_barber.to_string(),
                "shopId": ShopId::random().to_string(),
                "services": [{"name": "Haircut", "price": 4500}],
                "bookingDate": "2026-11-02",
                "bookingTime": "14:30",
                "notes": "Low fade"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["paymentStatus"], "pending");
    assert_eq!(body["totalAmount"], 4500);
}

#[actix_web::test]
async fn slot_conflicts_are_409() {
    let mut ports = MockPorts::default();
    ports.bookings.expect_create().return_once(|_, _| {
        Err(Error::conflict("barber already booked at that time")
            .with_details(json!({"code": "slot_conflict"})))
    });
    let app = app!(ports);
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/bookings")
            .cookie(cookie)
            .set_json(json!({
                "barberId": BarberId::random().to_string(),
                "shopId": ShopId::random().to_string(),
                "services": [{"name": "Haircut", "price": 4500}],
                "bookingDate": "2026-11-02",
                "bookingTime": "14:30"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "slot_conflict");
}

#[actix_web::test]
async fn complete_accepts_a_missing_body() {
    let mut booking = booking_fixture();
    booking.status = BookingStatus::Completed;
    let booking_id = booking.id;
    let mut ports = MockPorts::default();
    ports
        .bookings
        .expect_complete()
        .withf(move |_, id, notes| *id == booking_id && notes.is_none())
        .times(1)
        .return_once(move |_, _, _| Ok(booking));
    let app = app!(ports);
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/bookings/{booking_id}/complete"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["status"], "completed");
}

#[actix_web::test]
async fn cancel_reports_the_fee() {
    let mut booking = booking_fixture();
    booking.status = BookingStatus::Cancelled;
    booking.cancellation_reason = Some("running late".to_owned());
    let booking_id = booking.id;
    let mut ports = MockPorts::default();
    ports
        .bookings
        .expect_cancel()
        .withf(move |_, id, reason| *id == booking_id && reason.as_deref() == Some("running late"))
        .return_once(move |_, _, _| {
            Ok(CancellationOutcome {
                booking,
                cancellation_fee: Money::new(900).expect("fee"),
            })
        });
    let app = app!(ports);
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/bookings/{booking_id}/cancel"))
            .cookie(cookie)
            .set_json(json!({"reason": "running late"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["cancellationFee"], 900);
    assert_eq!(body["booking"]["status"], "cancelled");
}

#[actix_web::test]
async fn paying_without_funds_is_402() {
    let mut ports = MockPorts::default();
    ports.wallet.expect_pay_for_booking().return_once(|_, _| {
        Err(Error::insufficient_balance("wallet balance is too low")
            .with_details(json!({"code": "insufficient_balance"})))
    });
    let app = app!(ports);
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/bookings/{}/pay", BookingId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);
}

#[actix_web::test]
async fn ratings_are_passed_through_unvalidated() {
    let mut ports = MockPorts::default();
    ports
        .bookings
        .expect_rate()
        .withf(|_, _, rating, comment| *rating == 6 && comment.is_none())
        .return_once(|_, _, _, _| {
            Err(Error::invalid_request("rating must be between 1 and 5")
                .with_details(json!({"code": "invalid_rating"})))
        });
    let app = app!(ports);
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/bookings/{}/review", BookingId::random()))
            .cookie(cookie)
            .set_json(json!({"rating": 6}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_rating");
}

#[actix_web::test]
async fn listing_returns_the_engine_order() {
    let (first, second) = (booking_fixture(), booking_fixture());
    let ids = [first.id.to_string(), second.id.to_string()];
    let mut ports = MockPorts::default();
    ports
        .bookings
        .expect_list()
        .return_once(move |_| Ok(vec![first, second]));
    let app = app!(ports);
    let cookie = login_cookie(&app, &UserId::random()).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/bookings")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body[0]["id"], ids[0]);
    assert_eq!(body[1]["id"], ids[1]);
}
