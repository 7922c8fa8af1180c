//! Booking HTTP handlers.
//!
//! ```text
//! POST /api/v1/bookings
//! GET  /api/v1/bookings
//! GET  /api/v1/bookings/{bookingId}
//! POST /api/v1/bookings/{bookingId}/confirm
//! POST /api/v1/bookings/{bookingId}/complete
//! POST /api/v1/bookings/{bookingId}/cancel
//! POST /api/v1/bookings/{bookingId}/review
//! POST /api/v1/bookings/{bookingId}/pay
//! ```
//!
//! `bookingDate` and `bookingTime` are wall-clock values interpreted as UTC.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::ports::{
    BookingPayment, CancellationOutcome, CreateBookingRequest, ReviewOutcome,
};
use crate::domain::{BarberId, Booking, BookingId, Error, ServiceLine, ShopId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_amount, parse_booking_start, parse_id};

const BOOKING_ID: FieldName = FieldName::new("bookingId");

/// One requested service.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceBody {
    pub name: String,
    /// Price in whole currency units.
    pub price: i64,
    /// Defaults to 30 minutes when omitted.
    pub duration_minutes: Option<u32>,
}

/// Request payload for booking a barber.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBookingBody {
    pub barber_id: String,
    pub shop_id: String,
    pub services: Vec<ServiceBody>,
    #[schema(example = "2026-11-02")]
    pub booking_date: String,
    #[schema(example = "14:30")]
    pub booking_time: String,
    pub notes: Option<String>,
}

/// Optional payload when completing a booking.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompleteBody {
    pub notes: Option<String>,
}

/// Optional payload when cancelling a booking.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelBody {
    pub reason: Option<String>,
}

/// Request payload for reviewing a completed booking.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewBody {
    /// Whole number between 1 and 5.
    pub rating: i64,
    pub comment: Option<String>,
}

fn parse_create_booking(body: CreateBookingBody) -> Result<CreateBookingRequest, Error> {
    let barber_id: BarberId = parse_id(&body.barber_id, FieldName::new("barberId"))?;
    let shop_id: ShopId = parse_id(&body.shop_id, FieldName::new("shopId"))?;
    let start_time = parse_booking_start(
        &body.booking_date,
        &body.booking_time,
        FieldName::new("bookingDate"),
        FieldName::new("bookingTime"),
    )?;
    let services = body
        .services
        .into_iter()
        .map(|service| {
            Ok(ServiceLine {
                name: service.name,
                price: parse_amount(service.price, FieldName::new("services.price"))?,
                duration_minutes: service.duration_minutes,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(CreateBookingRequest {
        barber_id,
        shop_id,
        services,
        start_time,
        notes: body.notes,
    })
}

fn booking_id(raw: &str) -> Result<BookingId, Error> {
    parse_id(raw, BOOKING_ID)
}

/// Book a barber as the acting customer.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingBody,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 400, description = "Invalid services or date", body = Error),
        (status = 403, description = "Only customers book", body = Error),
        (status = 404, description = "Unknown barber or shop", body = Error),
        (status = 409, description = "Slot conflict or barber unavailable", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "createBooking"
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateBookingBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = parse_create_booking(payload.into_inner())?;
    let booking = state.bookings.create(&actor, request).await?;
    Ok(HttpResponse::Created().json(booking))
}

/// List bookings where the actor is the customer or the barber.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    responses(
        (status = 200, description = "Bookings ordered by start time", body = [Booking]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "listBookings"
)]
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Booking>>> {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.bookings.list(&actor).await?))
}

/// Fetch one booking; parties only.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{bookingId}",
    params(("bookingId" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 403, description = "Not a party to the booking", body = Error),
        (status = 404, description = "Unknown booking", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "getBooking"
)]
#[get("/bookings/{booking_id}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Booking>> {
    let actor = session.require_user_id()?;
    let booking_id = booking_id(&path)?;
    Ok(web::Json(state.bookings.get(&actor, &booking_id).await?))
}

/// Confirm a pending booking as its barber.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{bookingId}/confirm",
    params(("bookingId" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Confirmed booking", body = Booking),
        (status = 403, description = "Not the barber", body = Error),
        (status = 409, description = "Booking is not pending", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "confirmBooking"
)]
#[post("/bookings/{booking_id}/confirm")]
pub async fn confirm_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Booking>> {
    let actor = session.require_user_id()?;
    let booking_id = booking_id(&path)?;
    Ok(web::Json(state.bookings.confirm(&actor, &booking_id).await?))
}

/// Complete a confirmed booking as its barber.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{bookingId}/complete",
    params(("bookingId" = String, Path, description = "Booking identifier")),
    request_body(content = CompleteBody, description = "Optional completion notes"),
    responses(
        (status = 200, description = "Completed booking", body = Booking),
        (status = 403, description = "Not the barber", body = Error),
        (status = 409, description = "Booking is not confirmed", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "completeBooking"
)]
#[post("/bookings/{booking_id}/complete")]
pub async fn complete_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: Option<web::Json<CompleteBody>>,
) -> ApiResult<web::Json<Booking>> {
    let actor = session.require_user_id()?;
    let booking_id = booking_id(&path)?;
    let notes = payload.map(web::Json::into_inner).unwrap_or_default().notes;
    let booking = state.bookings.complete(&actor, &booking_id, notes).await?;
    Ok(web::Json(booking))
}

/// Cancel a pending or confirmed booking.
///
/// The response reports the informational cancellation fee; nothing is
/// charged or refunded.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{bookingId}/cancel",
    params(("bookingId" = String, Path, description = "Booking identifier")),
    request_body(content = CancelBody, description = "Optional cancellation reason"),
    responses(
        (status = 200, description = "Cancelled booking and fee", body = CancellationOutcome),
        (status = 403, description = "Not a party to the booking", body = Error),
        (status = 409, description = "Booking already finished", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "cancelBooking"
)]
#[post("/bookings/{booking_id}/cancel")]
pub async fn cancel_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: Option<web::Json<CancelBody>>,
) -> ApiResult<web::Json<CancellationOutcome>> {
    let actor = session.require_user_id()?;
    let booking_id = booking_id(&path)?;
    let reason = payload.map(web::Json::into_inner).unwrap_or_default().reason;
    let outcome = state.bookings.cancel(&actor, &booking_id, reason).await?;
    Ok(web::Json(outcome))
}

/// Review a completed booking as its customer.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{bookingId}/review",
    params(("bookingId" = String, Path, description = "Booking identifier")),
    request_body = ReviewBody,
    responses(
        (status = 201, description = "Review stored", body = ReviewOutcome),
        (status = 400, description = "Rating out of range", body = Error),
        (status = 403, description = "Not the customer", body = Error),
        (status = 409, description = "Not completed or already reviewed", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "rateBooking"
)]
#[post("/bookings/{booking_id}/review")]
pub async fn rate_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReviewBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let booking_id = booking_id(&path)?;
    let ReviewBody { rating, comment } = payload.into_inner();
    let outcome = state
        .bookings
        .rate(&actor, &booking_id, rating, comment)
        .await?;
    Ok(HttpResponse::Created().json(outcome))
}

/// Pay for a booking from the customer's wallet.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{bookingId}/pay",
    params(("bookingId" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Wallet debited", body = BookingPayment),
        (status = 402, description = "Insufficient balance", body = Error),
        (status = 403, description = "Not the customer", body = Error),
        (status = 409, description = "Already paid or cancelled", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "payForBooking"
)]
#[post("/bookings/{booking_id}/pay")]
pub async fn pay_for_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookingPayment>> {
    let actor = session.require_user_id()?;
    let booking_id = booking_id(&path)?;
    let payment = state.wallet.pay_for_booking(&actor, &booking_id).await?;
    Ok(web::Json(payment))
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;
