//! Driving port for wallet funding, payments, withdrawals, and settlement.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    BookingId, Error, ExternalStatus, Money, PaymentReference, Transaction, UserId, Wallet,
};

use super::{BookingPayment, ChargeSession, Reconciliation};

/// A pending deposit and where to complete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundingSession {
    pub transaction: Transaction,
    pub checkout: ChargeSession,
}

/// Wallet and ledger entry after a withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalOutcome {
    pub wallet: Wallet,
    pub transaction: Transaction,
}

/// What a webhook delivery did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The event settled (or re-confirmed) a transaction.
    Reconciled(Reconciliation),
    /// The event is not one the ledger acts on.
    Ignored { event: String },
}

/// Use-case port for the wallet and transaction ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletLedger: Send + Sync {
    /// The actor's wallet, created empty on first access.
    async fn get_wallet(&self, actor: &UserId) -> Result<Wallet, Error>;

    /// The actor's ledger, newest first.
    async fn list_transactions(&self, actor: &UserId) -> Result<Vec<Transaction>, Error>;

    /// Start a deposit. The balance changes only on reconciliation.
    async fn fund(&self, actor: &UserId, amount: Money) -> Result<FundingSession, Error>;

    /// Pay a booking from the wallet balance.
    async fn pay_for_booking(
        &self,
        actor: &UserId,
        booking_id: &BookingId,
    ) -> Result<BookingPayment, Error>;

    /// Reserve funds and ask the gateway to pay them out.
    async fn withdraw(
        &self,
        actor: &UserId,
        amount: Money,
        recipient_code: String,
    ) -> Result<WithdrawalOutcome, Error>;

    /// Poll the gateway for a charge the actor started and reconcile it.
    async fn verify_payment(
        &self,
        actor: &UserId,
        reference: &PaymentReference,
    ) -> Result<Transaction, Error>;

    /// Apply an external outcome to a reference; repeats are no-ops.
    async fn reconcile(
        &self,
        reference: &PaymentReference,
        outcome: ExternalStatus,
    ) -> Result<Reconciliation, Error>;

    /// Verify, decode, and apply a gateway webhook.
    async fn handle_webhook(&self, signature: &str, body: &[u8]) -> Result<WebhookOutcome, Error>;
}
