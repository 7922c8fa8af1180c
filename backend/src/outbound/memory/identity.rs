//! Identity store over the in-memory user table.

use async_trait::async_trait;

use crate::domain::ports::{IdentityStore, IdentityStoreError};
use crate::domain::{
    BarberId, BarberProfile, BarberStatus, CustomerId, CustomerProfile, User, UserId,
};

use super::InMemoryStore;

#[async_trait]
impl IdentityStore for InMemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, IdentityStoreError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn get_barber_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<BarberProfile>, IdentityStoreError> {
        Ok(self
            .lock()
            .users
            .get(user_id)
            .and_then(User::barber)
            .cloned())
    }

    async fn get_customer_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CustomerProfile>, IdentityStoreError> {
        Ok(self
            .lock()
            .users
            .get(user_id)
            .and_then(User::customer)
            .cloned())
    }

    async fn find_barber(&self, id: &BarberId) -> Result<Option<BarberProfile>, IdentityStoreError> {
        Ok(self.lock().barber(id).cloned())
    }

    async fn find_customer(
        &self,
        id: &CustomerId,
    ) -> Result<Option<CustomerProfile>, IdentityStoreError> {
        Ok(self.lock().customer(id).cloned())
    }

    async fn update_barber_availability(
        &self,
        id: &BarberId,
        is_available: bool,
        status: BarberStatus,
    ) -> Result<Option<BarberProfile>, IdentityStoreError> {
        let mut state = self.lock();
        Ok(state.barber_mut(id).map(|barber| {
            barber.is_available = is_available;
            barber.status = status;
            barber.clone()
        }))
    }
}
