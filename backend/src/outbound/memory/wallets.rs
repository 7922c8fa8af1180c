//! Wallet ledger over the in-memory store.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{BookingPayment, Reconciliation, WalletRepository, WalletRepositoryError};
use crate::domain::{
    plan_reconciliation, BookingId, ExternalStatus, Money, PaymentReference, PaymentStatus,
    RuleViolation, Transaction, TransactionStatus, TransactionType, UserId, Wallet,
};

use super::{InMemoryStore, MarketState};

const BOOKING_PAYMENT_DESCRIPTION: &str = "Booking payment";

fn wallet_entry<'a>(state: &'a mut MarketState, user_id: &UserId, at: DateTime<Utc>) -> &'a mut Wallet {
    state
        .wallets
        .entry(*user_id)
        .or_insert_with(|| Wallet::empty(*user_id, at))
}

fn debit(wallet: &mut Wallet, amount: Money, at: DateTime<Utc>) -> Result<(), WalletRepositoryError> {
    let remaining = wallet.balance.checked_sub(amount).ok_or_else(|| {
        WalletRepositoryError::rejected(RuleViolation::InsufficientBalance {
            balance: wallet.balance,
            required: amount,
        })
    })?;
    wallet.balance = remaining;
    wallet.updated_at = at;
    Ok(())
}

#[async_trait]
impl WalletRepository for InMemoryStore {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Wallet, WalletRepositoryError> {
        Ok(wallet_entry(&mut self.lock(), user_id, at).clone())
    }

    async fn record_pending(&self, transaction: &Transaction) -> Result<(), WalletRepositoryError> {
        let mut state = self.lock();
        if state
            .transactions
            .iter()
            .any(|existing| existing.reference == transaction.reference)
        {
            return Err(WalletRepositoryError::query(format!(
                "duplicate transaction reference {}",
                transaction.reference
            )));
        }
        state.transactions.push(transaction.clone());
        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Transaction>, WalletRepositoryError> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .find(|transaction| &transaction.reference == reference)
            .cloned())
    }

    async fn list_transactions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transaction>, WalletRepositoryError> {
        let state = self.lock();
        let mut transactions: Vec<Transaction> = state
            .transactions
            .iter()
            .rev()
            .filter(|transaction| &transaction.user_id == user_id)
            .cloned()
            .collect();
        transactions.sort_by_key(|transaction| Reverse(transaction.created_at));
        Ok(transactions)
    }

    async fn pay_for_booking(
        &self,
        user_id: &UserId,
        booking_id: &BookingId,
        at: DateTime<Utc>,
    ) -> Result<BookingPayment, WalletRepositoryError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let booking = state.bookings.get_mut(booking_id).ok_or_else(|| {
            WalletRepositoryError::rejected(RuleViolation::Missing { entity: "booking" })
        })?;
        booking
            .ensure_payable()
            .map_err(WalletRepositoryError::rejected)?;

        let amount = booking.total_amount;
        let wallet = state
            .wallets
            .entry(*user_id)
            .or_insert_with(|| Wallet::empty(*user_id, at));
        debit(wallet, amount, at)?;
        booking.payment_status = PaymentStatus::Paid;

        let mut transaction = Transaction::pending(
            *user_id,
            TransactionType::Payment,
            amount,
            BOOKING_PAYMENT_DESCRIPTION,
            at,
        )
        .for_booking(*booking_id);
        transaction.settle(TransactionStatus::Successful, at);
        let wallet = wallet.clone();
        state.transactions.push(transaction.clone());
        Ok(BookingPayment {
            wallet,
            transaction,
        })
    }

    async fn begin_withdrawal(
        &self,
        transaction: &Transaction,
    ) -> Result<Wallet, WalletRepositoryError> {
        let mut state = self.lock();
        let wallet = wallet_entry(&mut state, &transaction.user_id, transaction.created_at);
        debit(wallet, transaction.amount, transaction.created_at)?;
        let wallet = wallet.clone();
        state.transactions.push(transaction.clone());
        Ok(wallet)
    }

    async fn reconcile(
        &self,
        reference: &PaymentReference,
        outcome: ExternalStatus,
        at: DateTime<Utc>,
    ) -> Result<Reconciliation, WalletRepositoryError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let transaction = state
            .transactions
            .iter_mut()
            .find(|transaction| &transaction.reference == reference)
            .ok_or_else(|| {
                WalletRepositoryError::rejected(RuleViolation::Missing {
                    entity: "transaction",
                })
            })?;

        let plan = plan_reconciliation(transaction, outcome);
        let Some(status) = plan.settle_as else {
            return Ok(Reconciliation {
                transaction: transaction.clone(),
                applied: false,
            });
        };

        if let Some(credit) = plan.credit {
            let wallet = state
                .wallets
                .entry(transaction.user_id)
                .or_insert_with(|| Wallet::empty(transaction.user_id, at));
            wallet.balance = wallet
                .balance
                .checked_add(credit)
                .map_err(|err| WalletRepositoryError::query(err.to_string()))?;
            wallet.updated_at = at;
        }
        if let Some(booking) = plan
            .mark_paid
            .and_then(|booking_id| state.bookings.get_mut(&booking_id))
        {
            booking.payment_status = PaymentStatus::Paid;
        }
        transaction.settle(status, at);
        Ok(Reconciliation {
            transaction: transaction.clone(),
            applied: true,
        })
    }
}
