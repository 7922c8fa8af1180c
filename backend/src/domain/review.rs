//! Reviews left by customers on completed bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BarberId, BookingId, CustomerId, ReviewId};

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// Rating outside `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5 (got {0})")]
pub struct InvalidRating(pub i64);

/// Star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate a raw rating.
    ///
    /// # Examples
    /// ```
    /// use barberzon::domain::Rating;
    ///
    /// assert_eq!(Rating::new(4).map(Rating::value), Ok(4));
    /// assert!(Rating::new(0).is_err());
    /// assert!(Rating::new(6).is_err());
    /// ```
    pub fn new(raw: i64) -> Result<Self, InvalidRating> {
        u8::try_from(raw)
            .ok()
            .filter(|value| (MIN_RATING..=MAX_RATING).contains(value))
            .map(Self)
            .ok_or(InvalidRating(raw))
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = InvalidRating;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// A customer's review of one completed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[schema(value_type = String, format = "uuid")]
    pub id: ReviewId,
    #[schema(value_type = String, format = "uuid")]
    pub booking_id: BookingId,
    #[schema(value_type = String, format = "uuid")]
    pub barber_id: BarberId,
    #[schema(value_type = String, format = "uuid")]
    pub customer_id: CustomerId,
    #[schema(value_type = u8, minimum = 1, maximum = 5)]
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Rolling rating aggregate stored on a barber profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub rating: f64,
    pub total_reviews: u32,
}

impl RatingSummary {
    /// Arithmetic mean and count over every rating given.
    ///
    /// # Examples
    /// ```
    /// use barberzon::domain::{Rating, RatingSummary};
    ///
    /// let ratings = [5, 4, 3].map(|r| Rating::new(r).unwrap());
    /// let summary = RatingSummary::from_ratings(ratings);
    /// assert_eq!(summary.total_reviews, 3);
    /// assert!((summary.rating - 4.0).abs() < f64::EPSILON);
    /// ```
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0.0_f64, 0_u32), |(sum, count), rating| {
                (sum + f64::from(rating.value()), count.saturating_add(1))
            });
        let rating = if count == 0 {
            0.0
        } else {
            sum / f64::from(count)
        };
        Self {
            rating,
            total_reviews: count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-1)]
    #[case(256)]
    fn out_of_range_ratings_are_rejected(#[case] raw: i64) {
        assert_eq!(Rating::new(raw), Err(InvalidRating(raw)));
    }

    #[rstest]
    fn summary_of_nothing_is_zero() {
        let summary = RatingSummary::from_ratings([]);
        assert_eq!(summary.total_reviews, 0);
        assert!(summary.rating.abs() < f64::EPSILON);
    }

    #[rstest]
    fn summary_is_the_arithmetic_mean() {
        let ratings = [5, 4, 4, 2].map(|raw| Rating::new(raw).expect("valid rating"));
        let summary = RatingSummary::from_ratings(ratings);
        assert_eq!(summary.total_reviews, 4);
        assert!((summary.rating - 3.75).abs() < f64::EPSILON);
    }

    #[rstest]
    fn rating_deserialises_with_validation() {
        let ok: Rating = serde_json::from_str("5").expect("valid");
        assert_eq!(ok.value(), 5);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}
