//! Payment gateway webhook receiver.
//!
//! ```text
//! POST /webhooks/paystack
//! ```
//!
//! Sits outside the session scope. The raw body is handed to the ledger
//! untouched because the signature covers the exact bytes sent.

use actix_web::{HttpRequest, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::WebhookOutcome;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Header carrying the hex HMAC-SHA512 of the body.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Acknowledgement returned to the gateway.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookAck {
    /// The referenced transaction was reconciled; `applied` is false for replays.
    #[serde(rename_all = "camelCase")]
    Processed { reference: String, applied: bool },
    /// The event type is not one the ledger acts on.
    Ignored { event: String },
}

impl From<WebhookOutcome> for WebhookAck {
    fn from(outcome: WebhookOutcome) -> Self {
        match outcome {
            WebhookOutcome::Reconciled(reconciliation) => Self::Processed {
                reference: reconciliation.transaction.reference.to_string(),
                applied: reconciliation.applied,
            },
            WebhookOutcome::Ignored { event } => Self::Ignored { event },
        }
    }
}

/// Receive a signed gateway event.
#[utoipa::path(
    post,
    path = "/webhooks/paystack",
    params((
        "x-paystack-signature" = String,
        Header,
        description = "Hex HMAC-SHA512 of the raw body"
    )),
    request_body(content = String, description = "Raw gateway event JSON"),
    responses(
        (status = 200, description = "Event handled", body = WebhookAck),
        (status = 400, description = "Undecodable event", body = Error),
        (status = 404, description = "Unknown reference", body = Error),
        (status = 502, description = "Signature rejected", body = Error)
    ),
    tags = ["webhooks"],
    security([]),
    operation_id = "handlePaystackWebhook"
)]
#[post("/webhooks/paystack")]
pub async fn paystack_webhook(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<WebhookAck>> {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let outcome = state.wallet.handle_webhook(signature, &body).await?;
    Ok(web::Json(outcome.into()))
}
