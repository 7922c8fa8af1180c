//! User accounts and their role-specific profiles.
//!
//! A [`User`] is the single identity root. Role data hangs off it as a tagged
//! [`Profile`], so a customer and a barber are never two competing records for
//! the same person.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BarberId, CustomerId, ShopId, UserId};

/// Working status a barber advertises to customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BarberStatus {
    Available,
    Busy,
    Break,
    Offline,
}

impl BarberStatus {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Break => "break",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for BarberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown barber status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown barber status: {0}")]
pub struct ParseBarberStatusError(pub String);

impl FromStr for BarberStatus {
    type Err = ParseBarberStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "busy" => Ok(Self::Busy),
            "break" => Ok(Self::Break),
            "offline" => Ok(Self::Offline),
            other => Err(ParseBarberStatusError(other.to_owned())),
        }
    }
}

/// Barber-specific extension of a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BarberProfile {
    #[schema(value_type = String, format = "uuid")]
    pub id: BarberId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub shop_id: Option<ShopId>,
    pub seat_number: Option<u32>,
    pub is_available: bool,
    pub status: BarberStatus,
    /// Arithmetic mean of all review ratings; zero until the first review.
    pub rating: f64,
    pub total_reviews: u32,
}

impl BarberProfile {
    /// Profile as created during onboarding: unaffiliated and available.
    #[must_use]
    pub fn onboarded(id: BarberId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            shop_id: None,
            seat_number: None,
            is_available: true,
            status: BarberStatus::Available,
            rating: 0.0,
            total_reviews: 0,
        }
    }

    /// Solo barbers have no shop affiliation.
    #[must_use]
    pub const fn is_solo(&self) -> bool {
        self.shop_id.is_none()
    }

    /// Record a seat in `shop_id`.
    pub fn seat_in(&mut self, shop_id: ShopId, seat_number: u32) {
        self.shop_id = Some(shop_id);
        self.seat_number = Some(seat_number);
    }

    /// Apply an availability change. Going offline always clears availability.
    pub fn set_availability(&mut self, is_available: bool, status: BarberStatus) {
        self.status = status;
        self.is_available = is_available && status != BarberStatus::Offline;
    }
}

/// Customer-specific extension of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    #[schema(value_type = String, format = "uuid")]
    pub id: CustomerId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
}

/// Role-specific profile attached to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Profile {
    Customer(CustomerProfile),
    Barber(BarberProfile),
}

/// Identity root for every marketplace participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub profile: Profile,
}

impl User {
    /// Barber profile, when the user is a barber.
    #[must_use]
    pub const fn barber(&self) -> Option<&BarberProfile> {
        match &self.profile {
            Profile::Barber(profile) => Some(profile),
            Profile::Customer(_) => None,
        }
    }

    /// Customer profile, when the user is a customer.
    #[must_use]
    pub const fn customer(&self) -> Option<&CustomerProfile> {
        match &self.profile {
            Profile::Customer(profile) => Some(profile),
            Profile::Barber(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn onboarded_barber_is_solo_and_available() {
        let profile = BarberProfile::onboarded(BarberId::random(), UserId::random());
        assert!(profile.is_solo());
        assert!(profile.is_available);
        assert_eq!(profile.status, BarberStatus::Available);
    }

    #[rstest]
    fn seating_clears_solo_flag() {
        let mut profile = BarberProfile::onboarded(BarberId::random(), UserId::random());
        profile.seat_in(ShopId::random(), 2);
        assert!(!profile.is_solo());
        assert_eq!(profile.seat_number, Some(2));
    }

    #[rstest]
    #[case(true, BarberStatus::Busy, true)]
    #[case(true, BarberStatus::Offline, false)]
    #[case(false, BarberStatus::Available, false)]
    fn availability_follows_status(
        #[case] requested: bool,
        #[case] status: BarberStatus,
        #[case] expected: bool,
    ) {
        let mut profile = BarberProfile::onboarded(BarberId::random(), UserId::random());
        profile.set_availability(requested, status);
        assert_eq!(profile.is_available, expected);
        assert_eq!(profile.status, status);
    }

    #[rstest]
    fn status_round_trips_through_strings() {
        for status in [
            BarberStatus::Available,
            BarberStatus::Busy,
            BarberStatus::Break,
            BarberStatus::Offline,
        ] {
            assert_eq!(status.as_str().parse::<BarberStatus>(), Ok(status));
        }
        assert!("napping".parse::<BarberStatus>().is_err());
    }

    #[rstest]
    fn profile_accessors_match_variant() {
        let user = User {
            id: UserId::random(),
            full_name: "Ada Cuts".to_owned(),
            email: "ada@example.com".to_owned(),
            profile: Profile::Customer(CustomerProfile {
                id: CustomerId::random(),
                user_id: UserId::random(),
            }),
        };
        assert!(user.customer().is_some());
        assert!(user.barber().is_none());
    }
}
