//! PostgreSQL-backed `WalletRepository` implementation using Diesel ORM.
//!
//! Every balance change locks the wallet row, re-checks the balance, and
//! writes the ledger entry in the same transaction. Reconciliation locks the
//! transaction row first, so concurrent webhooks and manual verification of
//! one reference apply its effects exactly once.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{BookingPayment, Reconciliation, WalletRepository, WalletRepositoryError};
use crate::domain::{
    plan_reconciliation, BookingId, ExternalStatus, Money, PaymentReference, PaymentStatus,
    RuleViolation, Transaction, TransactionStatus, TransactionType, UserId, Wallet,
    DEFAULT_CURRENCY,
};

use super::diesel_error_mapping::{self, TxError};
use super::models::{BookingRow, TransactionRow, WalletRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{row_to_booking, row_to_transaction, row_to_wallet, transaction_to_row};
use super::schema::{bookings, transactions, wallets};

const BOOKING_PAYMENT_DESCRIPTION: &str = "Booking payment";

/// Diesel-backed implementation of the `WalletRepository` port.
#[derive(Clone)]
pub struct DieselWalletRepository {
    pool: DbPool,
}

impl DieselWalletRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WalletRepositoryError {
    diesel_error_mapping::map_pool_error(error)
}

fn map_diesel_error(error: diesel::result::Error) -> WalletRepositoryError {
    diesel_error_mapping::map_diesel_error(error)
}

fn map_tx_error(error: TxError) -> WalletRepositoryError {
    diesel_error_mapping::map_tx_error(error)
}

/// Create the wallet when missing, then lock and return it.
async fn lock_wallet(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    at: DateTime<Utc>,
) -> Result<Wallet, TxError> {
    diesel::insert_into(wallets::table)
        .values(&WalletRow {
            user_id,
            balance: 0,
            currency: DEFAULT_CURRENCY.to_owned(),
            updated_at: at,
        })
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;
    let row: WalletRow = wallets::table
        .find(user_id)
        .select(WalletRow::as_select())
        .for_update()
        .first(conn)
        .await?;
    row_to_wallet(row).map_err(TxError::Corrupt)
}

async fn store_balance(
    conn: &mut AsyncPgConnection,
    wallet: &Wallet,
) -> Result<(), TxError> {
    diesel::update(wallets::table.find(wallet.user_id.as_uuid()))
        .set((
            wallets::balance.eq(wallet.balance.amount()),
            wallets::updated_at.eq(wallet.updated_at),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

fn debit(wallet: &mut Wallet, amount: Money, at: DateTime<Utc>) -> Result<(), TxError> {
    let remaining = wallet.balance.checked_sub(amount).ok_or(TxError::Rejected(
        RuleViolation::InsufficientBalance {
            balance: wallet.balance,
            required: amount,
        },
    ))?;
    wallet.balance = remaining;
    wallet.updated_at = at;
    Ok(())
}

async fn mark_booking_paid(conn: &mut AsyncPgConnection, booking_id: Uuid) -> Result<(), TxError> {
    diesel::update(bookings::table.find(booking_id))
        .set(bookings::payment_status.eq(PaymentStatus::Paid.as_str()))
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl WalletRepository for DieselWalletRepository {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Wallet, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *user_id.as_uuid();
        conn.transaction::<_, TxError, _>(|conn| {
            async move { lock_wallet(conn, user_id, at).await }.scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn record_pending(&self, transaction: &Transaction) -> Result<(), WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(transactions::table)
            .values(&transaction_to_row(transaction))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Transaction>, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TransactionRow> = transactions::table
            .filter(transactions::reference.eq(reference.as_str()))
            .select(TransactionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_transaction)
            .transpose()
            .map_err(WalletRepositoryError::query)
    }

    async fn list_transactions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transaction>, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TransactionRow> = transactions::table
            .filter(transactions::user_id.eq(user_id.as_uuid()))
            .select(TransactionRow::as_select())
            .order_by(transactions::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(row_to_transaction)
            .collect::<Result<Vec<_>, _>>()
            .map_err(WalletRepositoryError::query)
    }

    async fn pay_for_booking(
        &self,
        user_id: &UserId,
        booking_id: &BookingId,
        at: DateTime<Utc>,
    ) -> Result<BookingPayment, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *user_id;
        let booking_id = *booking_id;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let row: Option<BookingRow> = bookings::table
                    .find(booking_id.as_uuid())
                    .select(BookingRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let row = row.ok_or(TxError::Rejected(RuleViolation::Missing {
                    entity: "booking",
                }))?;
                let booking = row_to_booking(row).map_err(TxError::Corrupt)?;
                booking.ensure_payable()?;

                let mut wallet = lock_wallet(conn, *owner.as_uuid(), at).await?;
                debit(&mut wallet, booking.total_amount, at)?;
                store_balance(conn, &wallet).await?;
                mark_booking_paid(conn, *booking_id.as_uuid()).await?;

                let mut transaction = Transaction::pending(
                    owner,
                    TransactionType::Payment,
                    booking.total_amount,
                    BOOKING_PAYMENT_DESCRIPTION,
                    at,
                )
                .for_booking(booking_id);
                transaction.settle(TransactionStatus::Successful, at);
                diesel::insert_into(transactions::table)
                    .values(&transaction_to_row(&transaction))
                    .execute(conn)
                    .await?;
                Ok(BookingPayment {
                    wallet,
                    transaction,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn begin_withdrawal(
        &self,
        transaction: &Transaction,
    ) -> Result<Wallet, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = transaction_to_row(transaction);
        let amount = transaction.amount;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let mut wallet = lock_wallet(conn, row.user_id, row.created_at).await?;
                debit(&mut wallet, amount, row.created_at)?;
                store_balance(conn, &wallet).await?;
                diesel::insert_into(transactions::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok(wallet)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn reconcile(
        &self,
        reference: &PaymentReference,
        outcome: ExternalStatus,
        at: DateTime<Utc>,
    ) -> Result<Reconciliation, WalletRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let reference = reference.as_str().to_owned();
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let row: Option<TransactionRow> = transactions::table
                    .filter(transactions::reference.eq(&reference))
                    .select(TransactionRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let row = row.ok_or(TxError::Rejected(RuleViolation::Missing {
                    entity: "transaction",
                }))?;
                let mut transaction = row_to_transaction(row).map_err(TxError::Corrupt)?;

                let plan = plan_reconciliation(&transaction, outcome);
                let Some(status) = plan.settle_as else {
                    return Ok(Reconciliation {
                        transaction,
                        applied: false,
                    });
                };

                if let Some(credit) = plan.credit {
                    let mut wallet = lock_wallet(conn, *transaction.user_id.as_uuid(), at).await?;
                    wallet.balance = wallet
                        .balance
                        .checked_add(credit)
                        .map_err(|err| TxError::Corrupt(err.to_string()))?;
                    wallet.updated_at = at;
                    store_balance(conn, &wallet).await?;
                }
                if let Some(booking_id) = plan.mark_paid {
                    mark_booking_paid(conn, *booking_id.as_uuid()).await?;
                }

                transaction.settle(status, at);
                diesel::update(transactions::table.find(transaction.id.as_uuid()))
                    .set((
                        transactions::status.eq(transaction.status.as_str()),
                        transactions::settled_at.eq(transaction.settled_at),
                    ))
                    .execute(conn)
                    .await?;
                Ok(Reconciliation {
                    transaction,
                    applied: true,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn wallet(balance: i64) -> Wallet {
        let mut wallet = Wallet::empty(UserId::random(), Utc::now());
        wallet.balance = Money::new(balance).expect("balance");
        wallet
    }

    #[rstest]
    fn debits_never_overdraw() {
        let mut short = wallet(1000);
        let required = Money::new(4500).expect("amount");

        let err = debit(&mut short, required, Utc::now()).expect_err("insufficient");

        assert!(matches!(
            err,
            TxError::Rejected(RuleViolation::InsufficientBalance { .. })
        ));
        assert_eq!(short.balance, Money::new(1000).expect("balance"));
    }

    #[rstest]
    fn debits_reduce_the_balance() {
        let mut funded = wallet(5000);

        debit(&mut funded, Money::new(4500).expect("amount"), Utc::now()).expect("debited");

        assert_eq!(funded.balance, Money::new(500).expect("balance"));
    }
}
