//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{
    MockBarberAvailability, MockBookingEngine, MockJoinRequestWorkflow, MockShopRegistry,
    MockWalletLedger,
};
use crate::domain::{
    BarberId, Booking, BookingDraft, ContactInfo, CustomerId, Error, Money, ServiceLine, Shop,
    ShopDraft, ShopId, UserId,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, configure_api};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mocks for every driving port, to be configured per test.
#[derive(Default)]
pub struct MockPorts {
    pub shops: MockShopRegistry,
    pub join_requests: MockJoinRequestWorkflow,
    pub availability: MockBarberAvailability,
    pub bookings: MockBookingEngine,
    pub wallet: MockWalletLedger,
}

impl MockPorts {
    /// Freeze the configured mocks into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState {
            shops: Arc::new(self.shops),
            join_requests: Arc::new(self.join_requests),
            availability: Arc::new(self.availability),
            bookings: Arc::new(self.bookings),
            wallet: Arc::new(self.wallet),
        }
    }
}

async fn test_login(path: web::Path<String>, session: SessionContext) -> ApiResult<HttpResponse> {
    let user_id =
        UserId::new(path.into_inner()).map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mount the API under `/api/v1` next to a `/test-login/{user_id}` route
/// that plays the external authentication service.
pub fn test_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/test-login/{user_id}", web::post().to(test_login))
        .service(web::scope("/api/v1").configure(configure_api));
}

/// Sign `user_id` in and return the session cookie.
pub async fn login_cookie<S, B>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri(&format!("/test-login/{user_id}"))
            .to_request(),
    )
    .await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// 2026-03-02T10:00:00Z.
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Two-seat shop owned by `owner_id`.
pub fn shop_fixture(owner_id: BarberId) -> Shop {
    Shop::open(ShopDraft {
        id: ShopId::random(),
        owner_id,
        name: "Fade Factory".to_owned(),
        total_seats: 2,
        contact: ContactInfo {
            address: "12 Allen Avenue, Ikeja".to_owned(),
            phone: None,
            email: None,
        },
        hours: Vec::new(),
        created_at: fixture_time(),
    })
    .expect("valid fixture shop")
}

/// Pending booking for one 30 minute haircut at 4500.
pub fn booking_fixture() -> Booking {
    Booking::schedule(
        BookingDraft {
            customer_id: CustomerId::random(),
            barber_id: BarberId::random(),
            shop_id: ShopId::random(),
            services: vec![ServiceLine {
                name: "Haircut".to_owned(),
                price: Money::new(4500).expect("valid price"),
                duration_minutes: None,
            }],
            start_time: fixture_time(),
            notes: None,
        },
        fixture_time(),
    )
    .expect("valid fixture booking")
}
