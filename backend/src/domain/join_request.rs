//! Join requests: a barber asking a shop owner for a seat.
//!
//! `pending` is the only non-terminal state. Once approved or rejected a
//! request never changes again and is never deleted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BarberId, JoinRequestId, RuleViolation, ShopId};

/// Lifecycle state of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl JoinRequestStatus {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown join request status or action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised value: {0}")]
pub struct ParseJoinRequestError(pub String);

impl FromStr for JoinRequestStatus {
    type Err = ParseJoinRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ParseJoinRequestError(other.to_owned())),
        }
    }
}

/// Owner decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestAction {
    Approve,
    Reject,
}

impl FromStr for JoinRequestAction {
    type Err = ParseJoinRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(ParseJoinRequestError(other.to_owned())),
        }
    }
}

/// A barber's request to occupy a seat in a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    #[schema(value_type = String, format = "uuid")]
    pub id: JoinRequestId,
    #[schema(value_type = String, format = "uuid")]
    pub barber_id: BarberId,
    #[schema(value_type = String, format = "uuid")]
    pub shop_id: ShopId,
    pub status: JoinRequestStatus,
    /// Seat the barber asked for; the owner may assign a different one.
    pub seat_number: Option<u32>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl JoinRequest {
    /// Build a new pending request.
    #[must_use]
    pub fn pending(
        barber_id: BarberId,
        shop_id: ShopId,
        message: String,
        seat_number: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: JoinRequestId::random(),
            barber_id,
            shop_id,
            status: JoinRequestStatus::Pending,
            seat_number,
            message,
            created_at,
            responded_at: None,
        }
    }

    /// Move a pending request to its terminal state.
    pub fn resolve(
        &mut self,
        action: JoinRequestAction,
        at: DateTime<Utc>,
    ) -> Result<(), RuleViolation> {
        if self.status != JoinRequestStatus::Pending {
            return Err(RuleViolation::AlreadyProcessed {
                status: self.status,
            });
        }
        self.status = match action {
            JoinRequestAction::Approve => JoinRequestStatus::Approved,
            JoinRequestAction::Reject => JoinRequestStatus::Rejected,
        };
        self.responded_at = Some(at);
        Ok(())
    }
}

/// Outcome of an approval: the updated request and the seat actually assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinApproval {
    pub request: JoinRequest,
    pub assigned_seat: u32,
}
