//! Port for join request persistence.
//!
//! `submit` and `approve` are atomic units that read shop occupancy and the
//! barber's affiliation under lock. Concurrent approvals into a full shop are
//! serialised there, so at most one of them can take the last seat.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{JoinApproval, JoinRequest, JoinRequestId, RuleViolation, ShopId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by join request repository adapters.
    pub enum JoinRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "join request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "join request repository query failed: {message}",
        /// A business rule or storage constraint rejected the write.
        Rejected { violation: RuleViolation } => "join request write rejected: {violation}",
    }
}

/// Persistence port for join requests and the seat assignment they drive.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JoinRequestRepository: Send + Sync {
    /// Store a new pending request.
    ///
    /// Rejects with `AlreadyAffiliated`, `ShopFull`, `DuplicateRequest`, or
    /// `Missing` when the shop does not exist.
    async fn submit(&self, request: &JoinRequest) -> Result<(), JoinRequestRepositoryError>;

    /// Fetch a request by id.
    async fn find_by_id(
        &self,
        id: &JoinRequestId,
    ) -> Result<Option<JoinRequest>, JoinRequestRepositoryError>;

    /// Requests addressed to a shop, newest first.
    async fn list_for_shop(
        &self,
        shop_id: &ShopId,
    ) -> Result<Vec<JoinRequest>, JoinRequestRepositoryError>;

    /// Approve a pending request, seat the barber, and update their profile.
    async fn approve(
        &self,
        id: &JoinRequestId,
        seat_number: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<JoinApproval, JoinRequestRepositoryError>;

    /// Reject a pending request.
    async fn reject(
        &self,
        id: &JoinRequestId,
        at: DateTime<Utc>,
    ) -> Result<JoinRequest, JoinRequestRepositoryError>;
}
