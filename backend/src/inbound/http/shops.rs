//! Shop HTTP handlers.
//!
//! ```text
//! POST /api/v1/shops
//! GET  /api/v1/shops/{shopId}
//! PUT  /api/v1/shops/{shopId}/capacity
//! PUT  /api/v1/shops/{shopId}/hours
//! PUT  /api/v1/shops/{shopId}/contact
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::ports::CreateShopRequest;
use crate::domain::{ContactInfo, Error, OpeningHours, Shop, ShopId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

const SHOP_ID: FieldName = FieldName::new("shopId");

/// Request payload for opening a shop.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateShopBody {
    pub name: String,
    pub total_seats: u32,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub opening_hours: Vec<OpeningHours>,
}

impl From<CreateShopBody> for CreateShopRequest {
    fn from(body: CreateShopBody) -> Self {
        Self {
            name: body.name,
            total_seats: body.total_seats,
            contact: ContactInfo {
                address: body.address,
                phone: body.phone,
                email: body.email,
            },
            hours: body.opening_hours,
        }
    }
}

/// Request payload for resizing a shop.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CapacityBody {
    pub total_seats: u32,
}

/// Request payload replacing a shop's weekly hours.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HoursBody {
    pub opening_hours: Vec<OpeningHours>,
}

/// Request payload replacing a shop's contact details.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactBody {
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<ContactBody> for ContactInfo {
    fn from(body: ContactBody) -> Self {
        Self {
            address: body.address,
            phone: body.phone,
            email: body.email,
        }
    }
}

fn shop_id(raw: &str) -> Result<ShopId, Error> {
    parse_id(raw, SHOP_ID)
}

/// Open a shop owned by the acting barber, who takes seat 1.
#[utoipa::path(
    post,
    path = "/api/v1/shops",
    request_body = CreateShopBody,
    responses(
        (status = 201, description = "Shop created", body = Shop),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Only barbers open shops", body = Error),
        (status = 409, description = "Barber already affiliated", body = Error)
    ),
    tags = ["shops"],
    operation_id = "createShop"
)]
#[post("/shops")]
pub async fn create_shop(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateShopBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let shop = state
        .shops
        .create_shop(&actor, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(shop))
}

/// Fetch a shop with its seat map.
#[utoipa::path(
    get,
    path = "/api/v1/shops/{shopId}",
    params(("shopId" = String, Path, description = "Shop identifier")),
    responses(
        (status = 200, description = "Shop", body = Shop),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown shop", body = Error)
    ),
    tags = ["shops"],
    operation_id = "getShop"
)]
#[get("/shops/{shop_id}")]
pub async fn get_shop(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Shop>> {
    session.require_user_id()?;
    let shop_id = shop_id(&path)?;
    Ok(web::Json(state.shops.get_shop(&shop_id).await?))
}

/// Change the number of seats; occupied seats are never dropped.
#[utoipa::path(
    put,
    path = "/api/v1/shops/{shopId}/capacity",
    params(("shopId" = String, Path, description = "Shop identifier")),
    request_body = CapacityBody,
    responses(
        (status = 200, description = "Updated shop", body = Shop),
        (status = 400, description = "Invalid capacity", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 409, description = "Seats still occupied", body = Error)
    ),
    tags = ["shops"],
    operation_id = "updateCapacity"
)]
#[put("/shops/{shop_id}/capacity")]
pub async fn update_capacity(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CapacityBody>,
) -> ApiResult<web::Json<Shop>> {
    let actor = session.require_user_id()?;
    let shop_id = shop_id(&path)?;
    let shop = state
        .shops
        .update_capacity(&actor, &shop_id, payload.total_seats)
        .await?;
    Ok(web::Json(shop))
}

/// Replace the weekly opening hours.
#[utoipa::path(
    put,
    path = "/api/v1/shops/{shopId}/hours",
    params(("shopId" = String, Path, description = "Shop identifier")),
    request_body = HoursBody,
    responses(
        (status = 200, description = "Updated shop", body = Shop),
        (status = 400, description = "Invalid hours", body = Error),
        (status = 403, description = "Not the owner", body = Error)
    ),
    tags = ["shops"],
    operation_id = "updateHours"
)]
#[put("/shops/{shop_id}/hours")]
pub async fn update_hours(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<HoursBody>,
) -> ApiResult<web::Json<Shop>> {
    let actor = session.require_user_id()?;
    let shop_id = shop_id(&path)?;
    let shop = state
        .shops
        .update_hours(&actor, &shop_id, payload.into_inner().opening_hours)
        .await?;
    Ok(web::Json(shop))
}

/// Replace the public contact details.
#[utoipa::path(
    put,
    path = "/api/v1/shops/{shopId}/contact",
    params(("shopId" = String, Path, description = "Shop identifier")),
    request_body = ContactBody,
    responses(
        (status = 200, description = "Updated shop", body = Shop),
        (status = 400, description = "Invalid contact details", body = Error),
        (status = 403, description = "Not the owner", body = Error)
    ),
    tags = ["shops"],
    operation_id = "updateContactInfo"
)]
#[put("/shops/{shop_id}/contact")]
pub async fn update_contact(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ContactBody>,
) -> ApiResult<web::Json<Shop>> {
    let actor = session.require_user_id()?;
    let shop_id = shop_id(&path)?;
    let shop = state
        .shops
        .update_contact(&actor, &shop_id, payload.into_inner().into())
        .await?;
    Ok(web::Json(shop))
}
