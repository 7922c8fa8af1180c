//! Join request HTTP handlers.
//!
//! ```text
//! POST /api/v1/shops/{shopId}/join-requests
//! GET  /api/v1/shops/{shopId}/join-requests
//! POST /api/v1/join-requests/{requestId}/respond
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::ports::{JoinRequestDecision, RespondToJoinRequest, SubmitJoinRequest};
use crate::domain::{Error, JoinRequest, JoinRequestAction, JoinRequestId, ShopId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Request payload for asking to join a shop.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitJoinRequestBody {
    #[serde(default)]
    pub message: String,
    pub seat_number: Option<u32>,
}

/// Owner's answer to a pending request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RespondBody {
    pub action: JoinRequestAction,
    pub seat_number: Option<u32>,
}

/// Ask to join a shop as the acting barber.
#[utoipa::path(
    post,
    path = "/api/v1/shops/{shopId}/join-requests",
    params(("shopId" = String, Path, description = "Shop identifier")),
    request_body = SubmitJoinRequestBody,
    responses(
        (status = 201, description = "Request recorded", body = JoinRequest),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Only barbers may ask to join", body = Error),
        (status = 404, description = "Unknown shop", body = Error),
        (status = 409, description = "Duplicate, affiliated, or shop full", body = Error)
    ),
    tags = ["join-requests"],
    operation_id = "submitJoinRequest"
)]
#[post("/shops/{shop_id}/join-requests")]
pub async fn submit_join_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SubmitJoinRequestBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let shop_id: ShopId = parse_id(&path, FieldName::new("shopId"))?;
    let body = payload.into_inner();
    let request = state
        .join_requests
        .submit(
            &actor,
            SubmitJoinRequest {
                shop_id,
                message: body.message,
                seat_number: body.seat_number,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(request))
}

/// List a shop's join requests, newest first. Owner only.
#[utoipa::path(
    get,
    path = "/api/v1/shops/{shopId}/join-requests",
    params(("shopId" = String, Path, description = "Shop identifier")),
    responses(
        (status = 200, description = "Join requests", body = [JoinRequest]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown shop", body = Error)
    ),
    tags = ["join-requests"],
    operation_id = "listJoinRequests"
)]
#[get("/shops/{shop_id}/join-requests")]
pub async fn list_join_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<JoinRequest>>> {
    let actor = session.require_user_id()?;
    let shop_id: ShopId = parse_id(&path, FieldName::new("shopId"))?;
    let requests = state.join_requests.list_for_shop(&actor, &shop_id).await?;
    Ok(web::Json(requests))
}

/// Approve or reject a pending request.
#[utoipa::path(
    post,
    path = "/api/v1/join-requests/{requestId}/respond",
    params(("requestId" = String, Path, description = "Join request identifier")),
    request_body = RespondBody,
    responses(
        (status = 200, description = "Request resolved", body = JoinRequestDecision),
        (status = 403, description = "Not the shop owner", body = Error),
        (status = 404, description = "Unknown request", body = Error),
        (status = 409, description = "Already resolved, seat taken, or shop full", body = Error)
    ),
    tags = ["join-requests"],
    operation_id = "respondToJoinRequest"
)]
#[post("/join-requests/{request_id}/respond")]
pub async fn respond_to_join_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RespondBody>,
) -> ApiResult<web::Json<JoinRequestDecision>> {
    let actor = session.require_user_id()?;
    let request_id: JoinRequestId = parse_id(&path, FieldName::new("requestId"))?;
    let decision = state
        .join_requests
        .respond(
            &actor,
            RespondToJoinRequest {
                request_id,
                action: payload.action,
                seat_number: payload.seat_number,
            },
        )
        .await?;
    Ok(web::Json(decision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use crate::domain::{BarberId, JoinRequestStatus, UserId};
    use crate::inbound::http::test_utils::{
        MockPorts, fixture_time, login_cookie, test_routes, test_session_middleware,
    };

    macro_rules! app {
        ($ports:expr) => {
            test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .app_data(web::Data::new($ports.into_state()))
                    .configure(test_routes),
            )
            .await
        };
    }

    fn pending_request(shop_id: ShopId) -> JoinRequest {
        JoinRequest::pending(
            BarberId::random(),
            shop_id,
            "I can do fades".to_owned(),
            Some(2),
            fixture_time(),
        )
    }

    #[actix_web::test]
    async fn submit_forwards_the_requested_seat() {
        let shop_id = ShopId::random();
        let stored = pending_request(shop_id);
        let mut ports = MockPorts::default();
        ports
            .join_requests
            .expect_submit()
            .withf(move |_, request| {
                request.shop_id == shop_id
                    && request.seat_number == Some(2)
                    && request.message == "I can do fades"
            })
            .times(1)
            .return_once(move |_, _| Ok(stored));
        let app = app!(ports);
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/shops/{shop_id}/join-requests"))
                .cookie(cookie)
                .set_json(json!({"message": "I can do fades", "seatNumber": 2}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "pending");
    }

    #[actix_web::test]
    async fn duplicate_requests_are_conflicts() {
        let mut ports = MockPorts::default();
        ports.join_requests.expect_submit().return_once(|_, _| {
            Err(Error::conflict("a request already exists")
                .with_details(json!({"code": "duplicate_request"})))
        });
        let app = app!(ports);
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/shops/{}/join-requests", ShopId::random()))
                .cookie(cookie)
                .set_json(json!({"message": "again"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "duplicate_request");
    }

    #[actix_web::test]
    async fn approval_returns_the_assigned_seat() {
        let mut request = pending_request(ShopId::random());
        request.status = JoinRequestStatus::Approved;
        request.responded_at = Some(fixture_time());
        let request_id = request.id;
        let mut ports = MockPorts::default();
        ports
            .join_requests
            .expect_respond()
            .withf(move |_, response| {
                response.request_id == request_id
                    && response.action == JoinRequestAction::Approve
                    && response.seat_number.is_none()
            })
            .return_once(move |_, _| {
                Ok(JoinRequestDecision {
                    request,
                    assigned_seat: Some(3),
                })
            });
        let app = app!(ports);
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/join-requests/{request_id}/respond"))
                .cookie(cookie)
                .set_json(json!({"action": "approve"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["assignedSeat"], 3);
        assert_eq!(body["request"]["status"], "approved");
    }

    #[actix_web::test]
    async fn unknown_actions_are_rejected() {
        let app = app!(MockPorts::default());
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/join-requests/{}/respond", JoinRequestId::random()))
                .cookie(cookie)
                .set_json(json!({"action": "maybe"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn listing_is_forbidden_for_non_owners() {
        let mut ports = MockPorts::default();
        ports
            .join_requests
            .expect_list_for_shop()
            .return_once(|_, _| Err(Error::forbidden("only the owner may list requests")));
        let app = app!(ports);
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/shops/{}/join-requests", ShopId::random()))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
