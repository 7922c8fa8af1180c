//! Builders for the HTTP state from configured adapters.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tracing::info;

use barberzon::domain::PaymentReference;
use barberzon::domain::ports::{
    ChargeRequest, ChargeSession, ChargeVerification, PaymentGateway, PaymentGatewayError,
    TransferReceipt, TransferRequest, WebhookEvent,
};
use barberzon::inbound::http::state::{HttpState, MarketplaceAdapters};
use barberzon::outbound::memory::InMemoryStore;
use barberzon::outbound::paystack::{FixturePaymentGateway, PaystackHttpGateway};
use barberzon::outbound::persistence::{
    DbPool, DieselBookingRepository, DieselIdentityStore, DieselJoinRequestRepository,
    DieselNotificationDispatcher, DieselShopRepository, DieselWalletRepository,
};

use super::ServerConfig;

/// Payment gateway chosen at startup.
pub enum Gateway {
    /// Live Paystack API.
    Paystack(PaystackHttpGateway),
    /// Offline stand-in.
    Fixture(FixturePaymentGateway),
}

impl Gateway {
    /// The offline fixture gateway.
    #[must_use]
    pub fn fixture() -> Self {
        Self::Fixture(FixturePaymentGateway::new())
    }

    fn inner(&self) -> &dyn PaymentGateway {
        match self {
            Self::Paystack(gateway) => gateway,
            Self::Fixture(gateway) => gateway,
        }
    }
}

#[async_trait]
impl PaymentGateway for Gateway {
    async fn initialize(
        &self,
        request: &ChargeRequest,
    ) -> Result<ChargeSession, PaymentGatewayError> {
        self.inner().initialize(request).await
    }

    async fn verify(
        &self,
        reference: &PaymentReference,
    ) -> Result<ChargeVerification, PaymentGatewayError> {
        self.inner().verify(reference).await
    }

    async fn initiate_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, PaymentGatewayError> {
        self.inner().initiate_transfer(request).await
    }

    fn verify_webhook_signature(&self, signature: &str, body: &[u8]) -> bool {
        self.inner().verify_webhook_signature(signature, body)
    }

    fn decode_webhook_event(&self, body: &[u8]) -> Result<WebhookEvent, PaymentGatewayError> {
        self.inner().decode_webhook_event(body)
    }
}

fn diesel_state(
    pool: &DbPool,
    gateway: Arc<Gateway>,
    clock: Arc<dyn Clock>,
    callback_url: Option<String>,
) -> HttpState {
    HttpState::from_adapters(
        MarketplaceAdapters {
            shops: Arc::new(DieselShopRepository::new(pool.clone())),
            join_requests: Arc::new(DieselJoinRequestRepository::new(pool.clone())),
            bookings: Arc::new(DieselBookingRepository::new(pool.clone())),
            wallets: Arc::new(DieselWalletRepository::new(pool.clone())),
            identity: Arc::new(DieselIdentityStore::new(pool.clone())),
            notifier: Arc::new(DieselNotificationDispatcher::new(pool.clone(), clock.clone())),
            gateway,
        },
        clock,
        callback_url,
    )
}

fn memory_state(
    gateway: Arc<Gateway>,
    clock: Arc<dyn Clock>,
    callback_url: Option<String>,
) -> HttpState {
    let store = Arc::new(InMemoryStore::new(clock.clone()));
    HttpState::from_adapters(
        MarketplaceAdapters {
            shops: store.clone(),
            join_requests: store.clone(),
            bookings: store.clone(),
            wallets: store.clone(),
            identity: store.clone(),
            notifier: store,
            gateway,
        },
        clock,
        callback_url,
    )
}

/// Build the HTTP state, consuming the gateway and callback settings.
///
/// Uses the Diesel adapters when a pool is configured, otherwise one shared
/// in-memory store.
pub(super) fn build_http_state(config: &mut ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let gateway = Arc::new(std::mem::replace(&mut config.gateway, Gateway::fixture()));
    let callback_url = config.callback_url.take();

    let state = match &config.db_pool {
        Some(pool) => diesel_state(pool, gateway, clock, callback_url),
        None => {
            info!("no database configured; using the in-memory store");
            memory_state(gateway, clock, callback_url)
        }
    };
    web::Data::new(state)
}
