//! Test utilities for the backend crate.
//!
//! Shared by unit tests and, through the `test-support` feature, by the
//! integration suites under `tests/`.

pub mod clock {
    //! Controllable clock for time-dependent rules.

    use std::sync::{Mutex, MutexGuard};

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Clock whose current instant only moves when a test advances it.
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        /// Create a clock frozen at `now`.
        #[must_use]
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Move the clock forward by `minutes`.
        pub fn advance_minutes(&self, minutes: i64) {
            *self.lock_clock() += TimeDelta::minutes(minutes);
        }

        /// Jump to an absolute instant.
        pub fn set(&self, now: DateTime<Utc>) {
            *self.lock_clock() = now;
        }

        fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod marketplace {
    //! A fully wired in-memory marketplace.

    use std::sync::Arc;

    use chrono::{DateTime, NaiveTime, TimeZone, Utc, Weekday};
    use mockable::Clock;

    use super::clock::MutableClock;
    use crate::domain::ports::CreateShopRequest;
    use crate::domain::{ContactInfo, OpeningHours, Shop, User};
    use crate::inbound::http::state::{HttpState, MarketplaceAdapters};
    use crate::outbound::memory::InMemoryStore;
    use crate::outbound::paystack::FixturePaymentGateway;

    /// Monday 2026-03-02 at 08:00 UTC.
    #[must_use]
    pub fn opening_morning() -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).single() {
            Some(instant) => instant,
            None => panic!("valid fixture instant"),
        }
    }

    /// Services over one in-memory store and the fixture gateway.
    pub struct Marketplace {
        pub store: Arc<InMemoryStore>,
        pub gateway: Arc<FixturePaymentGateway>,
        pub clock: Arc<MutableClock>,
        pub state: HttpState,
    }

    impl Default for Marketplace {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Marketplace {
        /// Wire a fresh marketplace with the clock at [`opening_morning`].
        #[must_use]
        pub fn new() -> Self {
            let clock = Arc::new(MutableClock::new(opening_morning()));
            let dyn_clock: Arc<dyn Clock> = clock.clone();
            let store = Arc::new(InMemoryStore::new(dyn_clock.clone()));
            let gateway = Arc::new(FixturePaymentGateway::new());
            let state = HttpState::from_adapters(
                MarketplaceAdapters {
                    shops: store.clone(),
                    join_requests: store.clone(),
                    bookings: store.clone(),
                    wallets: store.clone(),
                    identity: store.clone(),
                    notifier: store.clone(),
                    gateway: gateway.clone(),
                },
                dyn_clock,
                None,
            );
            Self {
                store,
                gateway,
                clock,
                state,
            }
        }

        /// Register a customer account.
        #[must_use]
        pub fn customer(&self, name: &str) -> User {
            self.store
                .register_customer(name, &format!("{}@example.com", name.to_lowercase()))
        }

        /// Register an onboarded barber account.
        #[must_use]
        pub fn barber(&self, name: &str) -> User {
            self.store
                .register_barber(name, &format!("{}@example.com", name.to_lowercase()))
        }

        /// Open a shop owned by `owner`, trading 09:00 to 18:00 on weekdays.
        ///
        /// # Panics
        ///
        /// Panics when the registry rejects the shop.
        pub async fn open_shop(&self, owner: &User, total_seats: u32) -> Shop {
            let hours = [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]
            .into_iter()
            .map(|day| OpeningHours {
                day,
                opens: hour(9),
                closes: hour(18),
            })
            .collect();
            let request = CreateShopRequest {
                name: format!("{}'s chairs", owner.full_name),
                total_seats,
                contact: ContactInfo {
                    address: "12 Allen Avenue, Ikeja".to_owned(),
                    phone: Some("+2348000000000".to_owned()),
                    email: None,
                },
                hours,
            };
            match self.state.shops.create_shop(&owner.id, request).await {
                Ok(shop) => shop,
                Err(err) => panic!("shop should open: {err:?}"),
            }
        }
    }

    fn hour(h: u32) -> NaiveTime {
        match NaiveTime::from_hms_opt(h, 0, 0) {
            Some(time) => time,
            None => panic!("valid hour"),
        }
    }
}
