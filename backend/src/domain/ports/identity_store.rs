//! Port for reading users and their role profiles.
//!
//! Account registration and authentication live outside this service; the
//! store only answers lookups and applies barber availability changes.

use async_trait::async_trait;

use crate::domain::{
    BarberId, BarberProfile, BarberStatus, CustomerId, CustomerProfile, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity store adapters.
    pub enum IdentityStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "identity store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "identity store query failed: {message}",
    }
}

/// Lookup port over users, customer profiles, and barber profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fetch a user with their profile.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, IdentityStoreError>;

    /// Barber profile owned by `user_id`, if the user is a barber.
    async fn get_barber_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<BarberProfile>, IdentityStoreError>;

    /// Customer profile owned by `user_id`, if the user is a customer.
    async fn get_customer_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CustomerProfile>, IdentityStoreError>;

    /// Barber profile by profile id.
    async fn find_barber(&self, id: &BarberId) -> Result<Option<BarberProfile>, IdentityStoreError>;

    /// Customer profile by profile id.
    async fn find_customer(
        &self,
        id: &CustomerId,
    ) -> Result<Option<CustomerProfile>, IdentityStoreError>;

    /// Persist a barber's availability toggle and status.
    async fn update_barber_availability(
        &self,
        id: &BarberId,
        is_available: bool,
        status: BarberStatus,
    ) -> Result<Option<BarberProfile>, IdentityStoreError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn errors_render_their_message() {
        let err = IdentityStoreError::connection("pool exhausted");
        assert_eq!(err.to_string(), "identity store connection failed: pool exhausted");
    }
}
