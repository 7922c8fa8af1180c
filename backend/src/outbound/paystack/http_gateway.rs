//! Reqwest-backed Paystack adapter.
//!
//! This adapter owns transport details only: request serialisation, bearer
//! authentication, timeout and HTTP error mapping, and decoding Paystack's
//! `{ status, message, data }` envelope into port types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::warn;
use zeroize::Zeroizing;

use super::dto::{
    decode_webhook, Envelope, InitializeBody, InitializeData, TransferBody, TransferData,
    VerifyData,
};
use super::signature::verify_hmac_sha512;
use crate::domain::PaymentReference;
use crate::domain::ports::{
    ChargeRequest, ChargeSession, ChargeVerification, PaymentGateway, PaymentGatewayError,
    TransferReceipt, TransferRequest, WebhookEvent,
};

/// Public Paystack API root.
pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";

/// Connection settings for [`PaystackHttpGateway`].
pub struct PaystackConfig {
    /// API root; requests are resolved relative to it.
    pub base_url: Url,
    /// Secret key used for bearer auth and webhook signatures.
    pub secret_key: Zeroizing<String>,
    /// Upper bound on every gateway call.
    pub timeout: Duration,
}

/// Paystack adapter over HTTPS.
pub struct PaystackHttpGateway {
    client: Client,
    base_url: Url,
    secret_key: Zeroizing<String>,
}

impl PaystackHttpGateway {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: PaystackConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(config.base_url),
            secret_key: config.secret_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentGatewayError> {
        self.base_url
            .join(path)
            .map_err(|err| PaymentGatewayError::transport(format!("invalid endpoint {path}: {err}")))
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.secret_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, PaymentGatewayError> {
        let response = self
            .authorised(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let error = map_status_error(status, body.as_ref());
            warn!(status = status.as_u16(), error = %error, "paystack request failed");
            return Err(error);
        }
        unwrap_envelope(body.as_ref())
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn unwrap_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, PaymentGatewayError> {
    let envelope: Envelope<T> = serde_json::from_slice(body).map_err(|err| {
        PaymentGatewayError::invalid_response(format!("invalid Paystack JSON payload: {err}"))
    })?;
    if !envelope.status {
        return Err(PaymentGatewayError::declined(envelope.message));
    }
    envelope
        .data
        .ok_or_else(|| PaymentGatewayError::invalid_response("Paystack response has no data"))
}

#[async_trait]
impl PaymentGateway for PaystackHttpGateway {
    async fn initialize(
        &self,
        request: &ChargeRequest,
    ) -> Result<ChargeSession, PaymentGatewayError> {
        let body = InitializeBody {
            email: &request.email,
            amount: request.amount.amount(),
            reference: request.reference.as_str(),
            callback_url: request.callback_url.as_deref(),
            metadata: &request.metadata,
        };
        let url = self.endpoint("transaction/initialize")?;
        let data: InitializeData = self.send(self.client.post(url).json(&body)).await?;
        data.into_session()
            .map_err(PaymentGatewayError::invalid_response)
    }

    async fn verify(
        &self,
        reference: &PaymentReference,
    ) -> Result<ChargeVerification, PaymentGatewayError> {
        let mut url = self.endpoint("transaction/verify/")?;
        url.path_segments_mut()
            .map_err(|()| PaymentGatewayError::transport("base URL cannot carry a path"))?
            .pop_if_empty()
            .push(reference.as_str());
        let data: VerifyData = self.send(self.client.get(url)).await?;
        data.into_verification()
            .map_err(PaymentGatewayError::invalid_response)
    }

    async fn initiate_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, PaymentGatewayError> {
        let body = TransferBody {
            source: "balance",
            amount: request.amount.amount(),
            recipient: &request.recipient_code,
            reason: &request.reason,
            reference: request.reference.as_str(),
        };
        let url = self.endpoint("transfer")?;
        let data: TransferData = self.send(self.client.post(url).json(&body)).await?;
        Ok(data.into())
    }

    fn verify_webhook_signature(&self, signature: &str, body: &[u8]) -> bool {
        verify_hmac_sha512(self.secret_key.as_bytes(), signature, body)
    }

    fn decode_webhook_event(&self, body: &[u8]) -> Result<WebhookEvent, PaymentGatewayError> {
        decode_webhook(body).map_err(PaymentGatewayError::invalid_response)
    }
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    if error.is_timeout() {
        PaymentGatewayError::timeout(error.to_string())
    } else {
        PaymentGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let message = serde_json::from_slice::<Envelope<serde_json::Value>>(body)
        .map(|envelope| envelope.message)
        .unwrap_or_else(|_| body_preview(body));
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PaymentGatewayError::timeout(message)
        }
        _ => PaymentGatewayError::status(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    compact.chars().take(PREVIEW_CHAR_LIMIT).collect()
}
