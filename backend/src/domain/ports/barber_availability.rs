//! Driving port for a barber's own availability toggle.

use async_trait::async_trait;

use crate::domain::{BarberProfile, BarberStatus, Error, UserId};

/// Use-case port for barber availability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BarberAvailability: Send + Sync {
    /// Update the acting barber's availability. `offline` always clears it.
    async fn update_availability(
        &self,
        actor: &UserId,
        is_available: bool,
        status: BarberStatus,
    ) -> Result<BarberProfile, Error>;
}
