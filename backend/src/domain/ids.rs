//! Strongly typed identifiers for marketplace aggregates.
//!
//! Every aggregate is keyed by a UUID. Wrapping each in its own newtype keeps
//! a `BarberId` from being passed where a `UserId` is expected; a barber
//! profile id and the id of the user who owns it are different values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised when parsing identifiers from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    #[error("{label} must not be empty")]
    Empty { label: &'static str },
    #[error("{label} must be a valid UUID")]
    Invalid { label: &'static str },
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct the identifier from textual input.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = raw.as_ref();
                if raw.trim().is_empty() {
                    return Err(IdValidationError::Empty { label: $label });
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::Invalid { label: $label });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid { label: $label })
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_id!(
    /// Identifier of a user account (the identity root).
    UserId,
    "user id"
);
define_id!(
    /// Identifier of a barber profile, distinct from the owning user's id.
    BarberId,
    "barber id"
);
define_id!(
    /// Identifier of a customer profile.
    CustomerId,
    "customer id"
);
define_id!(
    /// Identifier of a shop.
    ShopId,
    "shop id"
);
define_id!(
    /// Identifier of a join request.
    JoinRequestId,
    "join request id"
);
define_id!(
    /// Identifier of a booking.
    BookingId,
    "booking id"
);
define_id!(
    /// Identifier of a ledger transaction.
    TransactionId,
    "transaction id"
);
define_id!(
    /// Identifier of a review.
    ReviewId,
    "review id"
);
define_id!(
    /// Identifier of a persisted notification.
    NotificationId,
    "notification id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_valid_uuid() {
        let id = ShopId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    #[case::empty("", IdValidationError::Empty { label: "booking id" })]
    #[case::padded(
        " 3fa85f64-5717-4562-b3fc-2c963f66afa6",
        IdValidationError::Invalid { label: "booking id" }
    )]
    #[case::garbage("not-a-uuid", IdValidationError::Invalid { label: "booking id" })]
    fn rejects_malformed_input(#[case] raw: &str, #[case] expected: IdValidationError) {
        assert_eq!(BookingId::new(raw), Err(expected));
    }

    #[rstest]
    fn serialises_as_plain_string() {
        let id = BarberId::from_uuid(Uuid::nil());
        let value = serde_json::to_value(id).expect("id serialises");
        assert_eq!(value, serde_json::json!("00000000-0000-0000-0000-000000000000"));
    }
}
