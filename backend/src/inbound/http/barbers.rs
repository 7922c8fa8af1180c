//! Barber self-service HTTP handlers.
//!
//! ```text
//! PUT /api/v1/barbers/me/availability
//! ```

use actix_web::{put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{BarberProfile, BarberStatus, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request payload for the availability toggle.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AvailabilityBody {
    pub is_available: bool,
    pub status: BarberStatus,
}

/// Update the acting barber's availability; `offline` forces unavailable.
#[utoipa::path(
    put,
    path = "/api/v1/barbers/me/availability",
    request_body = AvailabilityBody,
    responses(
        (status = 200, description = "Updated profile", body = BarberProfile),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a barber", body = Error)
    ),
    tags = ["barbers"],
    operation_id = "updateAvailability"
)]
#[put("/barbers/me/availability")]
pub async fn update_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvailabilityBody>,
) -> ApiResult<web::Json<BarberProfile>> {
    let actor = session.require_user_id()?;
    let profile = state
        .availability
        .update_availability(&actor, payload.is_available, payload.status)
        .await?;
    Ok(web::Json(profile))
}
