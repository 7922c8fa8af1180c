//! Wallet and transaction ledger service.
//!
//! Deposits start as pending ledger entries and only credit the balance when
//! the gateway confirms them, either through a signed webhook or a manual
//! verification poll. Every balance change goes through an atomic repository
//! method; this service never computes a new balance itself.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    BookingPayment, BookingRepository, ChargeRequest, FundingSession, IdentityStore,
    NotificationDispatcher, PaymentGateway, Reconciliation, TransferRequest, WalletLedger,
    WalletRepository, WebhookEventKind, WebhookOutcome, WithdrawalOutcome,
};
use crate::domain::service_support::{
    dispatch, map_booking_error, map_gateway_error, map_money_error, map_wallet_error,
    not_authorized, not_found, require_customer, require_user,
};
use crate::domain::{
    BookingId, Error, ExternalStatus, MinorUnits, Money, MoneyError, Notification,
    PaymentReference, Transaction, TransactionStatus, TransactionType, UserId, Wallet,
};

/// Description recorded on deposit ledger entries.
const DEPOSIT_DESCRIPTION: &str = "Wallet funding";
/// Description recorded on withdrawal ledger entries.
const WITHDRAWAL_DESCRIPTION: &str = "Wallet withdrawal";

/// Wallet ledger implementing the driving port.
#[derive(Clone)]
pub struct WalletService<W, B, I, G, N> {
    wallets: Arc<W>,
    bookings: Arc<B>,
    identity: Arc<I>,
    gateway: Arc<G>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    callback_url: Option<String>,
}

impl<W, B, I, G, N> WalletService<W, B, I, G, N> {
    /// Create a new ledger service.
    pub fn new(
        wallets: Arc<W>,
        bookings: Arc<B>,
        identity: Arc<I>,
        gateway: Arc<G>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            wallets,
            bookings,
            identity,
            gateway,
            notifier,
            clock,
            callback_url: None,
        }
    }

    /// URL the gateway redirects payers to after checkout.
    #[must_use]
    pub fn with_callback_url(mut self, callback_url: Option<String>) -> Self {
        self.callback_url = callback_url;
        self
    }
}

/// Reject zero amounts before any ledger entry exists.
fn require_positive(amount: Money) -> Result<MinorUnits, Error> {
    if amount.is_zero() {
        return Err(map_money_error(&MoneyError::NotPositive));
    }
    amount.to_minor_units().map_err(|err| map_money_error(&err))
}

/// Downgrade a success whose reported amount differs from the ledger entry.
fn checked_outcome(
    transaction: &Transaction,
    outcome: ExternalStatus,
    reported: Option<MinorUnits>,
) -> ExternalStatus {
    let Some(reported) = reported else {
        return outcome;
    };
    if outcome == ExternalStatus::Success && reported.to_money().ok() != Some(transaction.amount) {
        warn!(
            reference = %transaction.reference,
            expected = %transaction.amount,
            reported_minor = reported.amount(),
            "settled amount does not match ledger entry"
        );
        return ExternalStatus::Failed;
    }
    outcome
}

impl<W, B, I, G, N> WalletService<W, B, I, G, N>
where
    W: WalletRepository,
    B: BookingRepository,
    I: IdentityStore,
    G: PaymentGateway,
    N: NotificationDispatcher,
{
    async fn find_transaction(&self, reference: &PaymentReference) -> Result<Transaction, Error> {
        self.wallets
            .find_by_reference(reference)
            .await
            .map_err(map_wallet_error)?
            .ok_or_else(|| not_found("transaction not found", "transaction_not_found"))
    }

    /// Fail a pending entry after the gateway refused it.
    async fn abandon(&self, reference: &PaymentReference) {
        if let Err(error) = self
            .wallets
            .reconcile(reference, ExternalStatus::Failed, self.clock.utc())
            .await
        {
            warn!(reference = %reference, error = %error, "failed to settle abandoned transaction");
        }
    }
}

#[async_trait]
impl<W, B, I, G, N> WalletLedger for WalletService<W, B, I, G, N>
where
    W: WalletRepository,
    B: BookingRepository,
    I: IdentityStore,
    G: PaymentGateway,
    N: NotificationDispatcher,
{
    async fn get_wallet(&self, actor: &UserId) -> Result<Wallet, Error> {
        require_customer(self.identity.as_ref(), actor).await?;
        self.wallets
            .get_or_create(actor, self.clock.utc())
            .await
            .map_err(map_wallet_error)
    }

    async fn list_transactions(&self, actor: &UserId) -> Result<Vec<Transaction>, Error> {
        require_customer(self.identity.as_ref(), actor).await?;
        self.wallets
            .list_transactions(actor)
            .await
            .map_err(map_wallet_error)
    }

    async fn fund(&self, actor: &UserId, amount: Money) -> Result<FundingSession, Error> {
        let minor = require_positive(amount)?;
        let user = require_user(self.identity.as_ref(), actor).await?;
        if user.customer().is_none() {
            return Err(not_authorized("a customer profile is required"));
        }

        let now = self.clock.utc();
        self.wallets
            .get_or_create(actor, now)
            .await
            .map_err(map_wallet_error)?;
        let transaction = Transaction::pending(
            *actor,
            TransactionType::Deposit,
            amount,
            DEPOSIT_DESCRIPTION,
            now,
        );
        self.wallets
            .record_pending(&transaction)
            .await
            .map_err(map_wallet_error)?;

        let request = ChargeRequest {
            reference: transaction.reference.clone(),
            amount: minor,
            email: user.email,
            callback_url: self.callback_url.clone(),
            metadata: json!({
                "transactionId": transaction.id,
                "userId": actor,
                "type": TransactionType::Deposit.as_str(),
            }),
        };
        let checkout = match self.gateway.initialize(&request).await {
            Ok(checkout) => checkout,
            Err(error) => {
                warn!(reference = %transaction.reference, error = %error, "charge initialisation failed");
                self.abandon(&transaction.reference).await;
                return Err(map_gateway_error(error));
            }
        };
        info!(reference = %transaction.reference, amount = %amount, "wallet funding started");
        Ok(FundingSession {
            transaction,
            checkout,
        })
    }

    async fn pay_for_booking(
        &self,
        actor: &UserId,
        booking_id: &BookingId,
    ) -> Result<BookingPayment, Error> {
        let customer = require_customer(self.identity.as_ref(), actor).await?;
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| not_found("booking not found", "booking_not_found"))?;
        if booking.customer_id != customer.id {
            return Err(not_authorized("only the booking's customer may pay for it"));
        }

        let payment = self
            .wallets
            .pay_for_booking(actor, booking_id, self.clock.utc())
            .await
            .map_err(map_wallet_error)?;
        info!(
            booking_id = %booking_id,
            reference = %payment.transaction.reference,
            balance = %payment.wallet.balance,
            "booking paid from wallet"
        );
        dispatch(
            self.notifier.as_ref(),
            Notification::payment_settled(*actor, &payment.transaction),
        )
        .await;
        Ok(payment)
    }

    async fn withdraw(
        &self,
        actor: &UserId,
        amount: Money,
        recipient_code: String,
    ) -> Result<WithdrawalOutcome, Error> {
        let minor = require_positive(amount)?;
        if recipient_code.trim().is_empty() {
            return Err(Error::invalid_request("a transfer recipient is required")
                .with_details(json!({ "code": "invalid_recipient" })));
        }
        require_customer(self.identity.as_ref(), actor).await?;

        let transaction = Transaction::pending(
            *actor,
            TransactionType::Withdrawal,
            amount,
            WITHDRAWAL_DESCRIPTION,
            self.clock.utc(),
        );
        let wallet = self
            .wallets
            .begin_withdrawal(&transaction)
            .await
            .map_err(map_wallet_error)?;

        let request = TransferRequest {
            reference: transaction.reference.clone(),
            amount: minor,
            recipient_code,
            reason: WITHDRAWAL_DESCRIPTION.to_owned(),
        };
        match self.gateway.initiate_transfer(&request).await {
            Ok(receipt) => {
                info!(
                    reference = %transaction.reference,
                    transfer_code = %receipt.transfer_code,
                    status = %receipt.status,
                    "withdrawal transfer initiated"
                );
                Ok(WithdrawalOutcome {
                    wallet,
                    transaction,
                })
            }
            Err(error) => {
                warn!(reference = %transaction.reference, error = %error, "transfer initiation failed");
                self.abandon(&transaction.reference).await;
                Err(map_gateway_error(error))
            }
        }
    }

    async fn verify_payment(
        &self,
        actor: &UserId,
        reference: &PaymentReference,
    ) -> Result<Transaction, Error> {
        let transaction = self.find_transaction(reference).await?;
        if &transaction.user_id != actor {
            return Err(not_authorized("only the payer may verify this transaction"));
        }
        if transaction.is_settled() {
            return Ok(transaction);
        }

        let verification = self
            .gateway
            .verify(reference)
            .await
            .map_err(map_gateway_error)?;
        let Some(outcome) = verification.status.outcome() else {
            return Ok(transaction);
        };
        let outcome = checked_outcome(&transaction, outcome, Some(verification.amount));
        Ok(self.reconcile(reference, outcome).await?.transaction)
    }

    async fn reconcile(
        &self,
        reference: &PaymentReference,
        outcome: ExternalStatus,
    ) -> Result<Reconciliation, Error> {
        let reconciliation = self
            .wallets
            .reconcile(reference, outcome, self.clock.utc())
            .await
            .map_err(map_wallet_error)?;
        let transaction = &reconciliation.transaction;
        if !reconciliation.applied {
            info!(reference = %reference, status = transaction.status.as_str(), "reconciliation repeated");
            return Ok(reconciliation);
        }

        info!(
            reference = %reference,
            kind = transaction.kind.as_str(),
            status = transaction.status.as_str(),
            "transaction reconciled"
        );
        if transaction.status == TransactionStatus::Successful
            && matches!(
                transaction.kind,
                TransactionType::Deposit | TransactionType::Payment
            )
        {
            dispatch(
                self.notifier.as_ref(),
                Notification::payment_settled(transaction.user_id, transaction),
            )
            .await;
        }
        Ok(reconciliation)
    }

    async fn handle_webhook(&self, signature: &str, body: &[u8]) -> Result<WebhookOutcome, Error> {
        if !self.gateway.verify_webhook_signature(signature, body) {
            warn!(body_len = body.len(), "webhook rejected: invalid signature");
            return Err(Error::external_service("webhook signature is invalid")
                .with_details(json!({ "code": "invalid_signature" })));
        }
        let event = self.gateway.decode_webhook_event(body).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "code": "invalid_webhook" }))
        })?;

        let outcome = match &event.kind {
            WebhookEventKind::Other(name) => {
                info!(event = %name, "webhook event ignored");
                return Ok(WebhookOutcome::Ignored {
                    event: name.clone(),
                });
            }
            kind => kind.outcome().unwrap_or(ExternalStatus::Failed),
        };
        let reference = event.reference.ok_or_else(|| {
            Error::invalid_request("webhook event has no reference")
                .with_details(json!({ "code": "invalid_webhook" }))
        })?;

        let outcome = if event.kind == WebhookEventKind::ChargeSuccess {
            let transaction = self.find_transaction(&reference).await?;
            checked_outcome(&transaction, outcome, event.amount)
        } else {
            outcome
        };
        self.reconcile(&reference, outcome)
            .await
            .map(WebhookOutcome::Reconciled)
    }
}

#[cfg(test)]
#[path = "wallet_service_tests.rs"]
mod tests;
