//! Offline stand-in for the Paystack adapter.
//!
//! Used when no secret key is configured. Charges initialised here verify as
//! successful for the initialised amount; unknown references stay pending.
//! Webhook signatures never verify, so no unauthenticated body can move money.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::dto::decode_webhook;
use crate::domain::ports::{
    ChargeRequest, ChargeSession, ChargeVerification, GatewayChargeStatus, PaymentGateway,
    PaymentGatewayError, TransferReceipt, TransferRequest, WebhookEvent,
};
use crate::domain::{MinorUnits, PaymentReference};

/// Deterministic gateway for local runs and tests.
#[derive(Default)]
pub struct FixturePaymentGateway {
    charges: Mutex<HashMap<PaymentReference, MinorUnits>>,
}

impl FixturePaymentGateway {
    /// Create an empty fixture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn initialize(
        &self,
        request: &ChargeRequest,
    ) -> Result<ChargeSession, PaymentGatewayError> {
        self.charges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request.reference.clone(), request.amount);
        Ok(ChargeSession {
            authorization_url: format!("https://checkout.fixture.invalid/{}", request.reference),
            access_code: Uuid::new_v4().simple().to_string(),
            reference: request.reference.clone(),
        })
    }

    async fn verify(
        &self,
        reference: &PaymentReference,
    ) -> Result<ChargeVerification, PaymentGatewayError> {
        let charged = self
            .charges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(reference)
            .copied();
        Ok(match charged {
            Some(amount) => ChargeVerification {
                reference: reference.clone(),
                status: GatewayChargeStatus::Success,
                amount,
            },
            None => ChargeVerification {
                reference: reference.clone(),
                status: GatewayChargeStatus::Pending,
                amount: MinorUnits::new(0),
            },
        })
    }

    async fn initiate_transfer(
        &self,
        _request: &TransferRequest,
    ) -> Result<TransferReceipt, PaymentGatewayError> {
        Ok(TransferReceipt {
            transfer_code: format!("TRF_fixture_{}", Uuid::new_v4().simple()),
            status: "pending".to_owned(),
        })
    }

    fn verify_webhook_signature(&self, _signature: &str, _body: &[u8]) -> bool {
        false
    }

    fn decode_webhook_event(&self, body: &[u8]) -> Result<WebhookEvent, PaymentGatewayError> {
        decode_webhook(body).map_err(PaymentGatewayError::invalid_response)
    }
}
