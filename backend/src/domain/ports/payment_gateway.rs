//! Port for the external payment gateway.
//!
//! Amounts cross this boundary in minor units only. Callers convert with
//! [`Money::to_minor_units`](crate::domain::Money::to_minor_units) before a
//! call and back with
//! [`MinorUnits::to_money`](crate::domain::MinorUnits::to_money) after one.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{ExternalStatus, MinorUnits, PaymentReference};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment gateway adapters.
    pub enum PaymentGatewayError {
        /// The gateway did not answer within the configured timeout.
        Timeout { message: String } => "payment gateway timed out: {message}",
        /// The request could not be sent or the connection failed.
        Transport { message: String } => "payment gateway transport failed: {message}",
        /// The gateway answered with a non-success HTTP status.
        Status { status: u16, message: String } =>
            "payment gateway returned status {status}: {message}",
        /// The gateway answered but declined the operation.
        Declined { message: String } => "payment gateway declined the request: {message}",
        /// The gateway response or webhook body could not be decoded.
        InvalidResponse { message: String } =>
            "payment gateway response was invalid: {message}",
    }
}

/// Charge initialisation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    pub reference: PaymentReference,
    pub amount: MinorUnits,
    pub email: String,
    pub callback_url: Option<String>,
    pub metadata: Value,
}

/// Where to send the payer to complete a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeSession {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: PaymentReference,
}

/// Gateway-side state of a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayChargeStatus {
    Success,
    Failed,
    Abandoned,
    Pending,
}

impl GatewayChargeStatus {
    /// Ledger outcome for terminal states; `None` while still in flight.
    #[must_use]
    pub const fn outcome(self) -> Option<ExternalStatus> {
        match self {
            Self::Success => Some(ExternalStatus::Success),
            Self::Failed | Self::Abandoned => Some(ExternalStatus::Failed),
            Self::Pending => None,
        }
    }
}

/// Result of polling a charge by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeVerification {
    pub reference: PaymentReference,
    pub status: GatewayChargeStatus,
    pub amount: MinorUnits,
}

/// Payout request to a saved recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub reference: PaymentReference,
    pub amount: MinorUnits,
    pub recipient_code: String,
    pub reason: String,
}

/// Acknowledgement of a queued transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transfer_code: String,
    pub status: String,
}

/// Webhook events the ledger understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    ChargeSuccess,
    TransferSuccess,
    TransferFailed,
    /// Any other event name; acknowledged and ignored.
    Other(String),
}

impl WebhookEventKind {
    /// Parse a gateway event name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "charge.success" => Self::ChargeSuccess,
            "transfer.success" => Self::TransferSuccess,
            "transfer.failed" => Self::TransferFailed,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Ledger outcome carried by the event, if it settles anything.
    #[must_use]
    pub const fn outcome(&self) -> Option<ExternalStatus> {
        match self {
            Self::ChargeSuccess | Self::TransferSuccess => Some(ExternalStatus::Success),
            Self::TransferFailed => Some(ExternalStatus::Failed),
            Self::Other(_) => None,
        }
    }
}

/// A decoded webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub kind: WebhookEventKind,
    pub reference: Option<PaymentReference>,
    pub amount: Option<MinorUnits>,
}

/// Gateway port for charges, verification, transfers, and webhooks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start a charge and return the payer redirect.
    async fn initialize(&self, request: &ChargeRequest)
    -> Result<ChargeSession, PaymentGatewayError>;

    /// Poll the state of a charge.
    async fn verify(
        &self,
        reference: &PaymentReference,
    ) -> Result<ChargeVerification, PaymentGatewayError>;

    /// Queue a payout.
    async fn initiate_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, PaymentGatewayError>;

    /// Check a webhook signature against the raw body. Must return `false`
    /// whenever verification is impossible.
    fn verify_webhook_signature(&self, signature: &str, body: &[u8]) -> bool;

    /// Decode a verified webhook body.
    fn decode_webhook_event(&self, body: &[u8]) -> Result<WebhookEvent, PaymentGatewayError>;
}
