//! Wire shapes for the Paystack REST API and webhook bodies.
//!
//! Every Paystack response wraps its payload in `{ status, message, data }`.
//! The adapter decodes into these DTOs first and maps into port types in one
//! place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::{
    ChargeSession, ChargeVerification, GatewayChargeStatus, TransferReceipt, WebhookEvent,
    WebhookEventKind,
};
use crate::domain::{MinorUnits, PaymentReference};

#[derive(Debug, Serialize)]
pub(super) struct InitializeBody<'a> {
    pub(super) email: &'a str,
    pub(super) amount: i64,
    pub(super) reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) callback_url: Option<&'a str>,
    pub(super) metadata: &'a Value,
}

#[derive(Debug, Serialize)]
pub(super) struct TransferBody<'a> {
    pub(super) source: &'static str,
    pub(super) amount: i64,
    pub(super) recipient: &'a str,
    pub(super) reason: &'a str,
    pub(super) reference: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub(super) status: bool,
    #[serde(default)]
    pub(super) message: String,
    pub(super) data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InitializeData {
    pub(super) authorization_url: String,
    pub(super) access_code: String,
    pub(super) reference: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct VerifyData {
    pub(super) status: String,
    pub(super) amount: i64,
    pub(super) reference: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TransferData {
    pub(super) transfer_code: String,
    pub(super) status: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct WebhookBody {
    pub(super) event: String,
    #[serde(default)]
    pub(super) data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct WebhookData {
    pub(super) reference: Option<String>,
    pub(super) amount: Option<i64>,
}

impl InitializeData {
    pub(super) fn into_session(self) -> Result<ChargeSession, String> {
        let reference = PaymentReference::new(self.reference).map_err(|err| err.to_string())?;
        Ok(ChargeSession {
            authorization_url: self.authorization_url,
            access_code: self.access_code,
            reference,
        })
    }
}

impl VerifyData {
    pub(super) fn into_verification(self) -> Result<ChargeVerification, String> {
        let reference = PaymentReference::new(self.reference).map_err(|err| err.to_string())?;
        Ok(ChargeVerification {
            reference,
            status: charge_status(&self.status),
            amount: MinorUnits::new(self.amount),
        })
    }
}

impl From<TransferData> for TransferReceipt {
    fn from(value: TransferData) -> Self {
        Self {
            transfer_code: value.transfer_code,
            status: value.status,
        }
    }
}

/// Paystack charge states. Anything unrecognised is still in flight.
fn charge_status(raw: &str) -> GatewayChargeStatus {
    match raw {
        "success" => GatewayChargeStatus::Success,
        "failed" | "reversed" => GatewayChargeStatus::Failed,
        "abandoned" => GatewayChargeStatus::Abandoned,
        _ => GatewayChargeStatus::Pending,
    }
}

/// Decode a webhook body into the port's event type.
pub(super) fn decode_webhook(body: &[u8]) -> Result<WebhookEvent, String> {
    let decoded: WebhookBody =
        serde_json::from_slice(body).map_err(|err| format!("invalid webhook JSON: {err}"))?;
    let reference = decoded
        .data
        .reference
        .map(PaymentReference::new)
        .transpose()
        .map_err(|err| err.to_string())?;
    Ok(WebhookEvent {
        kind: WebhookEventKind::from_name(&decoded.event),
        reference,
        amount: decoded.data.amount.map(MinorUnits::new),
    })
}
