//! Shops and their seat map.
//!
//! A shop owns exactly `total_seats` seat rows numbered `1..=total_seats`.
//! Capacity is therefore enforced structurally: a barber can only be placed by
//! filling an empty seat row, so occupancy can never exceed capacity.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BarberId, RuleViolation, ShopId};

/// One seat slot within a shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeatAssignment {
    pub seat_number: u32,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub barber_id: Option<BarberId>,
}

/// Opening window for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    #[schema(value_type = String, example = "Mon")]
    pub day: Weekday,
    #[schema(value_type = String, example = "09:00:00")]
    pub opens: NaiveTime,
    #[schema(value_type = String, example = "18:00:00")]
    pub closes: NaiveTime,
}

/// Public contact details for a shop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Validation failures for shop details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShopValidationError {
    #[error("shop name must not be empty")]
    EmptyName,
    #[error("shop address must not be empty")]
    EmptyAddress,
    #[error("opening hours for {day} must close after they open")]
    InvertedHours { day: Weekday },
    #[error("opening hours list {day} more than once")]
    DuplicateDay { day: Weekday },
}

/// Input for creating a shop.
#[derive(Debug, Clone)]
pub struct ShopDraft {
    pub id: ShopId,
    pub owner_id: BarberId,
    pub name: String,
    pub total_seats: u32,
    pub contact: ContactInfo,
    pub hours: Vec<OpeningHours>,
    pub created_at: DateTime<Utc>,
}

/// A physical barbershop with a fixed seat capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[schema(value_type = String, format = "uuid")]
    pub id: ShopId,
    /// Barber profile that owns the shop.
    #[schema(value_type = String, format = "uuid")]
    pub owner_id: BarberId,
    pub name: String,
    pub total_seats: u32,
    pub contact: ContactInfo,
    pub hours: Vec<OpeningHours>,
    pub seats: Vec<SeatAssignment>,
    pub created_at: DateTime<Utc>,
}

/// Validate a set of opening hours.
pub fn validate_hours(hours: &[OpeningHours]) -> Result<(), ShopValidationError> {
    let mut seen = Vec::with_capacity(hours.len());
    for entry in hours {
        if entry.closes <= entry.opens {
            return Err(ShopValidationError::InvertedHours { day: entry.day });
        }
        if seen.contains(&entry.day) {
            return Err(ShopValidationError::DuplicateDay { day: entry.day });
        }
        seen.push(entry.day);
    }
    Ok(())
}

/// Validate contact details.
pub fn validate_contact(contact: &ContactInfo) -> Result<(), ShopValidationError> {
    if contact.address.trim().is_empty() {
        return Err(ShopValidationError::EmptyAddress);
    }
    Ok(())
}

impl Shop {
    /// Create a shop with every seat empty, then seat the owner in seat 1.
    ///
    /// # Examples
    /// ```
    /// use barberzon::domain::{BarberId, ContactInfo, Shop, ShopDraft, ShopId};
    ///
    /// let owner = BarberId::random();
    /// let shop = Shop::open(ShopDraft {
    ///     id: ShopId::random(),
    ///     owner_id: owner,
    ///     name: "Fade Factory".into(),
    ///     total_seats: 3,
    ///     contact: ContactInfo { address: "12 Allen Ave".into(), ..ContactInfo::default() },
    ///     hours: vec![],
    ///     created_at: chrono::Utc::now(),
    /// })
    /// .unwrap();
    /// assert_eq!(shop.seat_of(&owner), Some(1));
    /// assert_eq!(shop.occupied_count(), 1);
    /// ```
    pub fn open(draft: ShopDraft) -> Result<Self, ShopOpenError> {
        if draft.name.trim().is_empty() {
            return Err(ShopValidationError::EmptyName.into());
        }
        validate_contact(&draft.contact)?;
        validate_hours(&draft.hours)?;
        if draft.total_seats == 0 {
            return Err(RuleViolation::InvalidCapacity.into());
        }

        let mut shop = Self {
            id: draft.id,
            owner_id: draft.owner_id,
            name: draft.name,
            total_seats: draft.total_seats,
            contact: draft.contact,
            hours: draft.hours,
            seats: (1..=draft.total_seats)
                .map(|seat_number| SeatAssignment {
                    seat_number,
                    barber_id: None,
                })
                .collect(),
            created_at: draft.created_at,
        };
        shop.assign_seat(draft.owner_id, Some(1))?;
        Ok(shop)
    }

    /// Number of seats currently held by a barber.
    #[must_use]
    pub fn occupied_count(&self) -> u32 {
        let occupied = self.seats.iter().filter(|seat| seat.barber_id.is_some()).count();
        u32::try_from(occupied).unwrap_or(u32::MAX)
    }

    /// Whether every seat is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupied_count() >= self.total_seats
    }

    /// Lowest-numbered free seat, if any.
    #[must_use]
    pub fn lowest_free_seat(&self) -> Option<u32> {
        self.seats
            .iter()
            .filter(|seat| seat.barber_id.is_none())
            .map(|seat| seat.seat_number)
            .min()
    }

    /// Seat held by `barber_id`, if any.
    #[must_use]
    pub fn seat_of(&self, barber_id: &BarberId) -> Option<u32> {
        self.seats
            .iter()
            .find(|seat| seat.barber_id.as_ref() == Some(barber_id))
            .map(|seat| seat.seat_number)
    }

    /// Choose the seat a new barber would take without mutating the shop.
    ///
    /// With no explicit seat the lowest free number wins.
    pub fn choose_seat(&self, requested: Option<u32>) -> Result<u32, RuleViolation> {
        if self.is_full() {
            return Err(RuleViolation::ShopFull);
        }
        let Some(seat) = requested else {
            return self.lowest_free_seat().ok_or(RuleViolation::ShopFull);
        };
        match self.seats.iter().find(|slot| slot.seat_number == seat) {
            None => Err(RuleViolation::SeatOutOfRange {
                seat,
                total_seats: self.total_seats,
            }),
            Some(slot) if slot.barber_id.is_some() => Err(RuleViolation::SeatTaken { seat }),
            Some(_) => Ok(seat),
        }
    }

    /// Place `barber_id` in a seat, returning the seat number taken.
    pub fn assign_seat(
        &mut self,
        barber_id: BarberId,
        requested: Option<u32>,
    ) -> Result<u32, RuleViolation> {
        if self.seat_of(&barber_id).is_some() {
            return Err(RuleViolation::AlreadyAffiliated);
        }
        let seat = self.choose_seat(requested)?;
        if let Some(slot) = self.seats.iter_mut().find(|slot| slot.seat_number == seat) {
            slot.barber_id = Some(barber_id);
        }
        Ok(seat)
    }

    /// Change capacity. Shrinking may only drop empty, highest-numbered seats.
    pub fn resize(&mut self, total_seats: u32) -> Result<(), RuleViolation> {
        if total_seats == 0 {
            return Err(RuleViolation::InvalidCapacity);
        }
        if let Some(occupied) = self
            .seats
            .iter()
            .filter(|seat| seat.seat_number > total_seats && seat.barber_id.is_some())
            .map(|seat| seat.seat_number)
            .max()
        {
            return Err(RuleViolation::SeatsOccupied {
                requested: total_seats,
                occupied_seat: occupied,
            });
        }

        self.seats.retain(|seat| seat.seat_number <= total_seats);
        let current = self.total_seats;
        self.seats.extend(
            (current.saturating_add(1)..=total_seats).map(|seat_number| SeatAssignment {
                seat_number,
                barber_id: None,
            }),
        );
        self.total_seats = total_seats;
        Ok(())
    }

    /// Whether `barber_id` owns this shop.
    #[must_use]
    pub fn is_owned_by(&self, barber_id: &BarberId) -> bool {
        &self.owner_id == barber_id
    }
}

/// Failure modes when opening a shop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShopOpenError {
    #[error(transparent)]
    Validation(#[from] ShopValidationError),
    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

#[cfg(test)]
#[path = "shop_tests.rs"]
mod tests;
