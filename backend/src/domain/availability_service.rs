//! Barber availability service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{BarberAvailability, IdentityStore};
use crate::domain::service_support::{map_identity_error, not_found, require_barber};
use crate::domain::{BarberProfile, BarberStatus, Error, UserId};

/// Availability toggle implementing the driving port.
#[derive(Clone)]
pub struct BarberAvailabilityService<I> {
    identity: Arc<I>,
}

impl<I> BarberAvailabilityService<I> {
    /// Create a new service over the identity store.
    pub fn new(identity: Arc<I>) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl<I> BarberAvailability for BarberAvailabilityService<I>
where
    I: IdentityStore,
{
    async fn update_availability(
        &self,
        actor: &UserId,
        is_available: bool,
        status: BarberStatus,
    ) -> Result<BarberProfile, Error> {
        let mut profile = require_barber(self.identity.as_ref(), actor).await?;
        profile.set_availability(is_available, status);
        let updated = self
            .identity
            .update_barber_availability(&profile.id, profile.is_available, profile.status)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| not_found("barber not found", "barber_not_found"))?;
        info!(
            barber_id = %updated.id,
            available = updated.is_available,
            status = updated.status.as_str(),
            "barber availability updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockIdentityStore;
    use crate::domain::service_test_support::barber;
    use rstest::rstest;

    #[rstest]
    #[case(true, BarberStatus::Offline, false)]
    #[case(true, BarberStatus::Busy, true)]
    #[case(false, BarberStatus::Available, false)]
    #[tokio::test]
    async fn offline_always_clears_availability(
        #[case] requested: bool,
        #[case] status: BarberStatus,
        #[case] stored: bool,
    ) {
        let actor = UserId::random();
        let profile = barber(actor);
        let mut identity = MockIdentityStore::new();
        identity
            .expect_get_barber_profile()
            .return_once(move |_| Ok(Some(profile)));
        identity
            .expect_update_barber_availability()
            .withf(move |_, available, saved| *available == stored && *saved == status)
            .times(1)
            .returning(move |id, available, saved| {
                let mut updated = barber(actor);
                updated.id = *id;
                updated.is_available = available;
                updated.status = saved;
                Ok(Some(updated))
            });

        let service = BarberAvailabilityService::new(Arc::new(identity));
        let updated = service
            .update_availability(&actor, requested, status)
            .await
            .expect("availability saved");

        assert_eq!(updated.is_available, stored);
        assert_eq!(updated.status, status);
    }

    #[tokio::test]
    async fn customers_cannot_toggle_availability() {
        let mut identity = MockIdentityStore::new();
        identity
            .expect_get_barber_profile()
            .return_once(|_| Ok(None));
        identity.expect_update_barber_availability().never();

        let service = BarberAvailabilityService::new(Arc::new(identity));
        let error = service
            .update_availability(&UserId::random(), true, BarberStatus::Available)
            .await
            .expect_err("customer rejected");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}
