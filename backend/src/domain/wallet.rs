//! Wallets, ledger transactions, and reconciliation of external outcomes.
//!
//! Transactions start `pending` and move to `successful` or `failed` exactly
//! once. Reconciliation is planned here as a pure function so every storage
//! adapter applies the same effects inside its own atomic boundary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{BookingId, DEFAULT_CURRENCY, Money, TransactionId, UserId};

/// Prefix carried by every reference this service generates.
pub const REFERENCE_PREFIX: &str = "BZN-";

/// Kind of balance-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Payment,
    Refund,
}

/// Settlement state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Successful,
    Failed,
}

/// Error returned when parsing unknown ledger values from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised ledger value: {0}")]
pub struct ParseLedgerError(pub String);

impl TransactionType {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Payment => "payment",
            Self::Refund => "refund",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ParseLedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "payment" => Ok(Self::Payment),
            "refund" => Ok(Self::Refund),
            other => Err(ParseLedgerError(other.to_owned())),
        }
    }
}

impl TransactionStatus {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ParseLedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "successful" => Ok(Self::Successful),
            "failed" => Ok(Self::Failed),
            other => Err(ParseLedgerError(other.to_owned())),
        }
    }
}

/// Validation failures for payment references.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceValidationError {
    #[error("payment reference must not be empty")]
    Empty,
    #[error("payment reference must not contain whitespace")]
    Whitespace,
}

/// Unique reference shared with the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "BZN-0f8fad5bd9cb469fa16570867728950e")]
pub struct PaymentReference(String);

impl PaymentReference {
    /// Generate a fresh `BZN-<uuid>` reference.
    ///
    /// # Examples
    /// ```
    /// use barberzon::domain::PaymentReference;
    ///
    /// let reference = PaymentReference::generate();
    /// assert!(reference.as_str().starts_with("BZN-"));
    /// assert_ne!(reference, PaymentReference::generate());
    /// ```
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{REFERENCE_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Validate a reference received from a client or the gateway.
    pub fn new(raw: impl Into<String>) -> Result<Self, ReferenceValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ReferenceValidationError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(ReferenceValidationError::Whitespace);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PaymentReference {
    type Error = ReferenceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PaymentReference> for String {
    fn from(value: PaymentReference) -> Self {
        value.0
    }
}

/// Stored-value balance for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub balance: Money,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Empty wallet in the default currency.
    #[must_use]
    pub fn empty(user_id: UserId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            balance: Money::ZERO,
            currency: DEFAULT_CURRENCY.to_owned(),
            updated_at: at,
        }
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[schema(value_type = String, format = "uuid")]
    pub id: TransactionId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Money,
    pub reference: PaymentReference,
    pub status: TransactionStatus,
    /// Booking paid by this transaction, when it is a booking payment.
    #[schema(value_type = Option<String>, format = "uuid")]
    pub booking_id: Option<BookingId>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// New pending transaction with a generated reference.
    #[must_use]
    pub fn pending(
        user_id: UserId,
        kind: TransactionType,
        amount: Money,
        description: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::random(),
            user_id,
            kind,
            amount,
            reference: PaymentReference::generate(),
            status: TransactionStatus::Pending,
            booking_id: None,
            description: description.into(),
            created_at: at,
            settled_at: None,
        }
    }

    /// Attach the booking this transaction pays for.
    #[must_use]
    pub fn for_booking(mut self, booking_id: BookingId) -> Self {
        self.booking_id = Some(booking_id);
        self
    }

    /// Mark settled with `status` at `at`.
    pub fn settle(&mut self, status: TransactionStatus, at: DateTime<Utc>) {
        self.status = status;
        self.settled_at = Some(at);
    }

    /// Whether the transaction has reached a terminal state.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status != TransactionStatus::Pending
    }
}

/// Outcome reported by the payment gateway for a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExternalStatus {
    Success,
    Failed,
}

/// Effects a reconciliation must apply atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// New transaction status, or `None` when the call is a no-op.
    pub settle_as: Option<TransactionStatus>,
    /// Amount to add to the owner's wallet.
    pub credit: Option<Money>,
    /// Booking whose payment status becomes `paid`.
    pub mark_paid: Option<BookingId>,
}

impl ReconciliationPlan {
    /// Plan that changes nothing.
    pub const NOOP: Self = Self {
        settle_as: None,
        credit: None,
        mark_paid: None,
    };

    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.settle_as.is_none()
    }
}

/// Decide what reconciling `transaction` with `outcome` does.
///
/// Settled transactions are never touched again, which makes repeated
/// reconciliation of the same reference idempotent. A failed withdrawal
/// returns the reserved funds to the wallet.
///
/// # Examples
/// ```
/// use barberzon::domain::{
///     plan_reconciliation, ExternalStatus, Money, Transaction, TransactionStatus,
///     TransactionType, UserId,
/// };
///
/// let mut deposit = Transaction::pending(
///     UserId::random(),
///     TransactionType::Deposit,
///     Money::new(5000).unwrap(),
///     "wallet funding",
///     chrono::Utc::now(),
/// );
/// let plan = plan_reconciliation(&deposit, ExternalStatus::Success);
/// assert_eq!(plan.credit, Money::new(5000).ok());
///
/// deposit.settle(TransactionStatus::Successful, chrono::Utc::now());
/// assert!(plan_reconciliation(&deposit, ExternalStatus::Success).is_noop());
/// ```
#[must_use]
pub fn plan_reconciliation(transaction: &Transaction, outcome: ExternalStatus) -> ReconciliationPlan {
    if transaction.is_settled() {
        return ReconciliationPlan::NOOP;
    }
    match outcome {
        ExternalStatus::Success => ReconciliationPlan {
            settle_as: Some(TransactionStatus::Successful),
            credit: matches!(
                transaction.kind,
                TransactionType::Deposit | TransactionType::Refund
            )
            .then_some(transaction.amount),
            mark_paid: match transaction.kind {
                TransactionType::Payment => transaction.booking_id,
                _ => None,
            },
        },
        ExternalStatus::Failed => ReconciliationPlan {
            settle_as: Some(TransactionStatus::Failed),
            credit: (transaction.kind == TransactionType::Withdrawal)
                .then_some(transaction.amount),
            mark_paid: None,
        },
    }
}
