//! Driving port for the join request workflow.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, JoinRequest, JoinRequestAction, JoinRequestId, ShopId, UserId};

/// A barber's request to join a shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitJoinRequest {
    pub shop_id: ShopId,
    pub message: String,
    pub seat_number: Option<u32>,
}

/// An owner's decision on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespondToJoinRequest {
    pub request_id: JoinRequestId,
    pub action: JoinRequestAction,
    /// Seat to assign on approval; the lowest free seat when omitted.
    pub seat_number: Option<u32>,
}

/// The request after the owner's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestDecision {
    pub request: JoinRequest,
    /// Seat actually assigned; only present for approvals.
    pub assigned_seat: Option<u32>,
}

/// Use-case port mediating barbers joining shops.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JoinRequestWorkflow: Send + Sync {
    /// Submit a pending request and notify the shop owner.
    async fn submit(&self, actor: &UserId, request: SubmitJoinRequest)
    -> Result<JoinRequest, Error>;

    /// Approve or reject a pending request and notify the barber.
    async fn respond(
        &self,
        actor: &UserId,
        response: RespondToJoinRequest,
    ) -> Result<JoinRequestDecision, Error>;

    /// Requests addressed to a shop the actor owns, newest first.
    async fn list_for_shop(&self, actor: &UserId, shop_id: &ShopId)
    -> Result<Vec<JoinRequest>, Error>;
}
