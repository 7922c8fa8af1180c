//! Port for wallet balances and the transaction ledger.
//!
//! Balance mutations only happen inside the atomic methods below; there is no
//! way to write a balance directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    BookingId, ExternalStatus, PaymentReference, RuleViolation, Transaction, UserId, Wallet,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by wallet repository adapters.
    pub enum WalletRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "wallet repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "wallet repository query failed: {message}",
        /// A business rule or storage constraint rejected the write.
        Rejected { violation: RuleViolation } => "wallet write rejected: {violation}",
    }
}

/// Result of paying for a booking from the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayment {
    /// Wallet after the debit.
    pub wallet: Wallet,
    /// The successful payment entry.
    pub transaction: Transaction,
}

/// Result of reconciling a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Transaction as stored after the call.
    pub transaction: Transaction,
    /// Whether this call changed anything; `false` for repeats.
    pub applied: bool,
}

/// Persistence port for wallets and transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Wallet for `user_id`, created empty on first access.
    async fn get_or_create(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Wallet, WalletRepositoryError>;

    /// Record a pending transaction without touching any balance.
    async fn record_pending(&self, transaction: &Transaction) -> Result<(), WalletRepositoryError>;

    /// Transaction with the given reference.
    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Transaction>, WalletRepositoryError>;

    /// Ledger for a user, newest first.
    async fn list_transactions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transaction>, WalletRepositoryError>;

    /// Debit the wallet, record a successful payment, and mark the booking
    /// paid, all or nothing.
    ///
    /// Rejects with `Missing`, `AlreadyPaid`, `NotPayable` for a cancelled
    /// booking, or `InsufficientBalance`.
    async fn pay_for_booking(
        &self,
        user_id: &UserId,
        booking_id: &BookingId,
        at: DateTime<Utc>,
    ) -> Result<BookingPayment, WalletRepositoryError>;

    /// Reserve funds for a withdrawal: debit the wallet and record the
    /// pending withdrawal together.
    async fn begin_withdrawal(
        &self,
        transaction: &Transaction,
    ) -> Result<Wallet, WalletRepositoryError>;

    /// Apply an external outcome to the transaction for `reference` exactly
    /// once.
    async fn reconcile(
        &self,
        reference: &PaymentReference,
        outcome: ExternalStatus,
        at: DateTime<Utc>,
    ) -> Result<Reconciliation, WalletRepositoryError>;
}
