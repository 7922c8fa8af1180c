//! In-memory adapters for every storage port.
//!
//! One mutex guards the whole marketplace state. Each port method takes the
//! lock once, re-runs the domain rule against the current state and writes,
//! so concurrent callers observe the same all-or-nothing behaviour as the
//! transactional PostgreSQL adapters. The server wires this store when no
//! database is configured, and the behavioural suites drive it directly.

mod bookings;
mod identity;
mod notifications;
mod shops;
mod wallets;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;

use crate::domain::{
    BarberId, BarberProfile, Booking, BookingId, CustomerId, CustomerProfile, JoinRequest,
    NotificationRecord, Profile, Review, Shop, ShopId, Transaction, User, UserId, Wallet,
};

/// Shared in-memory marketplace store.
pub struct InMemoryStore {
    state: Mutex<MarketState>,
    clock: Arc<dyn Clock>,
}

#[derive(Default)]
struct MarketState {
    users: HashMap<UserId, User>,
    shops: HashMap<ShopId, Shop>,
    join_requests: Vec<JoinRequest>,
    bookings: HashMap<BookingId, Booking>,
    reviews: HashMap<BookingId, Review>,
    wallets: HashMap<UserId, Wallet>,
    transactions: Vec<Transaction>,
    notifications: Vec<NotificationRecord>,
}

impl MarketState {
    fn barber(&self, id: &BarberId) -> Option<&BarberProfile> {
        self.users.values().find_map(|user| user.barber().filter(|b| &b.id == id))
    }

    fn barber_mut(&mut self, id: &BarberId) -> Option<&mut BarberProfile> {
        self.users.values_mut().find_map(|user| match &mut user.profile {
            Profile::Barber(barber) if &barber.id == id => Some(barber),
            _ => None,
        })
    }

    fn customer(&self, id: &CustomerId) -> Option<&CustomerProfile> {
        self.users
            .values()
            .find_map(|user| user.customer().filter(|c| &c.id == id))
    }
}

impl InMemoryStore {
    /// Create an empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(MarketState::default()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MarketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a user account with its profile, replacing any previous copy.
    pub fn insert_user(&self, user: User) {
        self.lock().users.insert(user.id, user);
    }

    /// Register a customer account.
    pub fn register_customer(&self, full_name: &str, email: &str) -> User {
        let id = UserId::random();
        let user = User {
            id,
            full_name: full_name.to_owned(),
            email: email.to_owned(),
            profile: Profile::Customer(CustomerProfile {
                id: CustomerId::random(),
                user_id: id,
            }),
        };
        self.insert_user(user.clone());
        user
    }

    /// Register an onboarded, unaffiliated barber account.
    pub fn register_barber(&self, full_name: &str, email: &str) -> User {
        let id = UserId::random();
        let user = User {
            id,
            full_name: full_name.to_owned(),
            email: email.to_owned(),
            profile: Profile::Barber(BarberProfile::onboarded(BarberId::random(), id)),
        };
        self.insert_user(user.clone());
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::DefaultClock;
    use rstest::rstest;

    #[rstest]
    fn registered_barbers_resolve_by_profile_id() {
        let store = InMemoryStore::new(Arc::new(DefaultClock));
        let user = store.register_barber("Ada Cuts", "ada@example.com");
        let barber = user.barber().expect("barber profile").clone();

        let state = store.lock();
        assert_eq!(state.barber(&barber.id), Some(&barber));
        assert!(state.customer(&CustomerId::random()).is_none());
    }
}
