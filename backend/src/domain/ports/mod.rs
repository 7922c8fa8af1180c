//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the identity store, the notification
//! dispatcher, the payment gateway) are implemented by outbound adapters.
//! Driving ports (registry, workflow, engine, ledger, availability) are
//! implemented by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod barber_availability;
mod booking_engine;
mod booking_repository;
mod identity_store;
mod join_request_repository;
mod join_request_workflow;
mod notification_dispatcher;
mod payment_gateway;
mod shop_registry;
mod shop_repository;
mod wallet_ledger;
mod wallet_repository;

#[cfg(test)]
pub use barber_availability::MockBarberAvailability;
pub use barber_availability::BarberAvailability;
#[cfg(test)]
pub use booking_engine::MockBookingEngine;
pub use booking_engine::{BookingEngine, CancellationOutcome, CreateBookingRequest, ReviewOutcome};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingRepository, BookingRepositoryError};
#[cfg(test)]
pub use identity_store::MockIdentityStore;
pub use identity_store::{IdentityStore, IdentityStoreError};
#[cfg(test)]
pub use join_request_repository::MockJoinRequestRepository;
pub use join_request_repository::{JoinRequestRepository, JoinRequestRepositoryError};
#[cfg(test)]
pub use join_request_workflow::MockJoinRequestWorkflow;
pub use join_request_workflow::{
    JoinRequestDecision, JoinRequestWorkflow, RespondToJoinRequest, SubmitJoinRequest,
};
#[cfg(test)]
pub use notification_dispatcher::MockNotificationDispatcher;
pub use notification_dispatcher::{NotificationDispatchError, NotificationDispatcher};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{
    ChargeRequest, ChargeSession, ChargeVerification, GatewayChargeStatus, PaymentGateway,
    PaymentGatewayError, TransferReceipt, TransferRequest, WebhookEvent, WebhookEventKind,
};
#[cfg(test)]
pub use shop_registry::MockShopRegistry;
pub use shop_registry::{CreateShopRequest, ShopRegistry};
#[cfg(test)]
pub use shop_repository::MockShopRepository;
pub use shop_repository::{ShopRepository, ShopRepositoryError};
#[cfg(test)]
pub use wallet_ledger::MockWalletLedger;
pub use wallet_ledger::{FundingSession, WalletLedger, WebhookOutcome, WithdrawalOutcome};
#[cfg(test)]
pub use wallet_repository::MockWalletRepository;
pub use wallet_repository::{BookingPayment, Reconciliation, WalletRepository, WalletRepositoryError};
