//! Shared Diesel error mapping for the marketplace repositories.
//!
//! Repositories run their writes inside a transaction that can fail three
//! ways: Diesel itself fails, a re-checked business rule rejects the write,
//! or a stored row cannot be read back into a domain value. [`TxError`]
//! carries all three out of the transaction closure; [`map_tx_error`] turns
//! it into the port's own error type.

use diesel::result::Error as DieselError;
use tracing::debug;

use crate::domain::RuleViolation;
use crate::domain::ports::{
    BookingRepositoryError, IdentityStoreError, JoinRequestRepositoryError,
    NotificationDispatchError, ShopRepositoryError, WalletRepositoryError,
};

use super::pool::PoolError;

/// Failure raised inside a repository transaction.
#[derive(Debug)]
pub(crate) enum TxError {
    Diesel(DieselError),
    Rejected(RuleViolation),
    Corrupt(String),
}

impl From<DieselError> for TxError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<RuleViolation> for TxError {
    fn from(violation: RuleViolation) -> Self {
        Self::Rejected(violation)
    }
}

/// Port error constructors shared by every Diesel adapter.
pub(crate) trait StorageError: Sized {
    fn connection_failed(message: String) -> Self;
    fn query_failed(message: String) -> Self;
    fn rejected_by(violation: RuleViolation) -> Self;
}

macro_rules! storage_error {
    ($($name:ty),* $(,)?) => {
        $(
            impl StorageError for $name {
                fn connection_failed(message: String) -> Self {
                    Self::connection(message)
                }

                fn query_failed(message: String) -> Self {
                    Self::query(message)
                }

                fn rejected_by(violation: RuleViolation) -> Self {
                    Self::rejected(violation)
                }
            }
        )*
    };
}

storage_error!(
    ShopRepositoryError,
    JoinRequestRepositoryError,
    BookingRepositoryError,
    WalletRepositoryError,
);

impl StorageError for IdentityStoreError {
    fn connection_failed(message: String) -> Self {
        Self::connection(message)
    }

    fn query_failed(message: String) -> Self {
        Self::query(message)
    }

    fn rejected_by(violation: RuleViolation) -> Self {
        Self::query(violation.to_string())
    }
}

impl StorageError for NotificationDispatchError {
    fn connection_failed(message: String) -> Self {
        Self::delivery(message)
    }

    fn query_failed(message: String) -> Self {
        Self::delivery(message)
    }

    fn rejected_by(violation: RuleViolation) -> Self {
        Self::delivery(violation.to_string())
    }
}

/// Business rule guarded by a named database constraint.
fn constraint_violation(constraint: &str) -> Option<RuleViolation> {
    match constraint {
        "shops_owner_id_key" => Some(RuleViolation::AlreadyOwnsShop),
        "join_requests_barber_shop_key" => Some(RuleViolation::DuplicateRequest),
        "bookings_barber_slot_excl" => Some(RuleViolation::SlotConflict),
        "barber_profiles_seat_key" => Some(RuleViolation::ShopFull),
        _ => None,
    }
}

/// Map pool errors into the port's connection error.
pub(crate) fn map_pool_error<E: StorageError>(error: PoolError) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            E::connection_failed(message)
        }
    }
}

/// Map Diesel errors, surfacing guarded constraint violations as rejections.
pub(crate) fn map_diesel_error<E: StorageError>(error: DieselError) -> E {
    use diesel::result::DatabaseErrorKind;

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => E::query_failed("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query_failed("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection_failed("database connection error".to_owned())
        }
        DieselError::DatabaseError(_, info) => info
            .constraint_name()
            .and_then(constraint_violation)
            .map_or_else(|| E::query_failed("database error".to_owned()), E::rejected_by),
        _ => E::query_failed("database error".to_owned()),
    }
}

/// Map a transaction failure into the port error.
pub(crate) fn map_tx_error<E: StorageError>(error: TxError) -> E {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Rejected(violation) => E::rejected_by(violation),
        TxError::Corrupt(message) => E::query_failed(message),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error: ShopRepositoryError = map_pool_error(PoolError::checkout("connection refused"));
        assert_eq!(error, ShopRepositoryError::connection("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let error: BookingRepositoryError = map_diesel_error(DieselError::NotFound);
        assert_eq!(error, BookingRepositoryError::query("record not found"));
    }

    #[rstest]
    #[case("shops_owner_id_key", Some(RuleViolation::AlreadyOwnsShop))]
    #[case("join_requests_barber_shop_key", Some(RuleViolation::DuplicateRequest))]
    #[case("bookings_barber_slot_excl", Some(RuleViolation::SlotConflict))]
    #[case("transactions_reference_key", None)]
    fn constraints_map_to_rules(#[case] name: &str, #[case] expected: Option<RuleViolation>) {
        assert_eq!(constraint_violation(name), expected);
    }

    #[rstest]
    fn rejections_keep_their_violation() {
        let error: WalletRepositoryError =
            map_tx_error(TxError::Rejected(RuleViolation::AlreadyPaid));
        assert_eq!(error, WalletRepositoryError::rejected(RuleViolation::AlreadyPaid));
    }

    #[rstest]
    fn corrupt_rows_surface_as_query_errors() {
        let error: IdentityStoreError = map_tx_error(TxError::Corrupt("bad status".to_owned()));
        assert_eq!(error, IdentityStoreError::query("bad status"));
    }
}
