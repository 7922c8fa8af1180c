//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    BarberAvailability, BookingEngine, BookingRepository, IdentityStore, JoinRequestRepository,
    JoinRequestWorkflow, NotificationDispatcher, PaymentGateway, ShopRegistry, ShopRepository,
    WalletLedger, WalletRepository,
};
use crate::domain::{
    BarberAvailabilityService, BookingService, JoinRequestService, ShopService, WalletService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub shops: Arc<dyn ShopRegistry>,
    pub join_requests: Arc<dyn JoinRequestWorkflow>,
    pub availability: Arc<dyn BarberAvailability>,
    pub bookings: Arc<dyn BookingEngine>,
    pub wallet: Arc<dyn WalletLedger>,
}

/// Driven adapters from which the HTTP state's services are built.
pub struct MarketplaceAdapters<S, J, B, W, I, N, G> {
    pub shops: Arc<S>,
    pub join_requests: Arc<J>,
    pub bookings: Arc<B>,
    pub wallets: Arc<W>,
    pub identity: Arc<I>,
    pub notifier: Arc<N>,
    pub gateway: Arc<G>,
}

impl HttpState {
    /// Build every driving port from one set of driven adapters.
    ///
    /// `callback_url` is where the gateway sends payers after checkout.
    pub fn from_adapters<S, J, B, W, I, N, G>(
        adapters: MarketplaceAdapters<S, J, B, W, I, N, G>,
        clock: Arc<dyn Clock>,
        callback_url: Option<String>,
    ) -> Self
    where
        S: ShopRepository + 'static,
        J: JoinRequestRepository + 'static,
        B: BookingRepository + 'static,
        W: WalletRepository + 'static,
        I: IdentityStore + 'static,
        N: NotificationDispatcher + 'static,
        G: PaymentGateway + 'static,
    {
        let MarketplaceAdapters {
            shops,
            join_requests,
            bookings,
            wallets,
            identity,
            notifier,
            gateway,
        } = adapters;

        Self {
            shops: Arc::new(ShopService::new(
                shops.clone(),
                identity.clone(),
                clock.clone(),
            )),
            join_requests: Arc::new(JoinRequestService::new(
                join_requests,
                shops.clone(),
                identity.clone(),
                notifier.clone(),
                clock.clone(),
            )),
            availability: Arc::new(BarberAvailabilityService::new(identity.clone())),
            bookings: Arc::new(BookingService::new(
                bookings.clone(),
                shops,
                identity.clone(),
                notifier.clone(),
                clock.clone(),
            )),
            wallet: Arc::new(
                WalletService::new(wallets, bookings, identity, gateway, notifier, clock)
                    .with_callback_url(callback_url),
            ),
        }
    }
}
