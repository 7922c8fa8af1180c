//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST path from the inbound layer, the domain
//! schemas they return, and the session cookie security scheme. Swagger UI
//! serves it in debug builds; `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    CancellationOutcome, ChargeSession, FundingSession, JoinRequestDecision, ReviewOutcome,
    WithdrawalOutcome,
};
use crate::domain::{
    BarberProfile, Booking, ContactInfo, Error, ErrorCode, JoinRequest, OpeningHours, Review,
    Shop, Transaction, Wallet,
};
use crate::inbound::http::webhooks::WebhookAck;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the identity service.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Barberzon backend API",
        description = "Shops and seats, barber join requests, bookings, reviews and wallets.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::shops::create_shop,
        crate::inbound::http::shops::get_shop,
        crate::inbound::http::shops::update_capacity,
        crate::inbound::http::shops::update_hours,
        crate::inbound::http::shops::update_contact,
        crate::inbound::http::join_requests::submit_join_request,
        crate::inbound::http::join_requests::list_join_requests,
        crate::inbound::http::join_requests::respond_to_join_request,
        crate::inbound::http::barbers::update_availability,
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::get_booking,
        crate::inbound::http::bookings::confirm_booking,
        crate::inbound::http::bookings::complete_booking,
        crate::inbound::http::bookings::cancel_booking,
        crate::inbound::http::bookings::rate_booking,
        crate::inbound::http::bookings::pay_for_booking,
        crate::inbound::http::wallet::get_wallet,
        crate::inbound::http::wallet::list_transactions,
        crate::inbound::http::wallet::fund_wallet,
        crate::inbound::http::wallet::withdraw,
        crate::inbound::http::wallet::verify_payment,
        crate::inbound::http::webhooks::paystack_webhook,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Shop,
        ContactInfo,
        OpeningHours,
        JoinRequest,
        JoinRequestDecision,
        BarberProfile,
        Booking,
        CancellationOutcome,
        Review,
        ReviewOutcome,
        Wallet,
        Transaction,
        FundingSession,
        ChargeSession,
        WithdrawalOutcome,
        WebhookAck,
    )),
    tags(
        (name = "shops", description = "Shop registration and seat capacity"),
        (name = "join-requests", description = "Barbers asking to work at a shop"),
        (name = "barbers", description = "Barber availability"),
        (name = "bookings", description = "Appointments, cancellations and reviews"),
        (name = "wallet", description = "Customer wallets and gateway payments"),
        (name = "webhooks", description = "Signed payment gateway callbacks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", &["code", "message", "traceId", "details"])]
    #[case("Booking", &["id", "status", "paymentStatus", "totalAmount", "services"])]
    #[case("Transaction", &["reference", "type", "status", "amount"])]
    #[case("Shop", &["id", "totalSeats", "seats", "contact"])]
    #[case("Review", &["id", "bookingId", "rating", "comment"])]
    fn schemas_expose_wire_field_names(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");

        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    fn paths_outside_the_api_scope_are_documented() {
        let doc = ApiDoc::openapi();

        assert!(
            doc.paths
                .paths
                .get("/webhooks/paystack")
                .and_then(|item| item.post.as_ref())
                .is_some()
        );
        assert!(doc.paths.paths.contains_key("/api/v1/bookings/{bookingId}/cancel"));
        assert!(doc.paths.paths.contains_key("/health/ready"));
    }

    #[rstest]
    fn document_declares_the_session_cookie() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
