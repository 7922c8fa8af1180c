//! Shared fixtures for service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::NotificationDispatchError;
use crate::domain::{
    BarberId, BarberProfile, ContactInfo, CustomerId, CustomerProfile, Notification,
    NotificationId, NotificationRecord, Profile, Shop, ShopDraft, ShopId, User, UserId,
};

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    pub(crate) const fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// 2025-01-01T08:00:00Z.
pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, hour, minute, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock::at(fixture_now()))
}

pub(crate) fn barber(user_id: UserId) -> BarberProfile {
    BarberProfile::onboarded(BarberId::random(), user_id)
}

pub(crate) fn customer(user_id: UserId) -> CustomerProfile {
    CustomerProfile {
        id: CustomerId::random(),
        user_id,
    }
}

pub(crate) fn user_with(profile: Profile) -> User {
    let id = match &profile {
        Profile::Customer(customer) => customer.user_id,
        Profile::Barber(barber) => barber.user_id,
    };
    User {
        id,
        full_name: "Test User".to_owned(),
        email: "test@example.com".to_owned(),
        profile,
    }
}

pub(crate) fn shop_owned_by(owner: BarberId, total_seats: u32) -> Shop {
    Shop::open(ShopDraft {
        id: ShopId::random(),
        owner_id: owner,
        name: "Fade Factory".to_owned(),
        total_seats,
        contact: ContactInfo {
            address: "12 Allen Avenue".to_owned(),
            ..ContactInfo::default()
        },
        hours: Vec::new(),
        created_at: fixture_now(),
    })
    .expect("valid shop")
}

pub(crate) fn stored(
    notification: &Notification,
) -> Result<NotificationRecord, NotificationDispatchError> {
    Ok(NotificationRecord {
        id: NotificationId::random(),
        notification: notification.clone(),
        read: false,
        created_at: fixture_now(),
    })
}
