//! Join request workflow service.
//!
//! A solo barber asks to occupy a seat in a shop; the owner approves (seating
//! the barber atomically in the repository) or rejects. Both sides are
//! notified after each committed change.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    IdentityStore, JoinRequestDecision, JoinRequestRepository, JoinRequestWorkflow,
    NotificationDispatcher, RespondToJoinRequest, ShopRepository, SubmitJoinRequest,
};
use crate::domain::service_support::{
    barber_account, dispatch, map_join_request_error, map_shop_error, not_authorized, not_found,
    require_barber, require_user,
};
use crate::domain::{
    Error, JoinRequest, JoinRequestAction, JoinRequestStatus, Notification, RuleViolation, Shop,
    ShopId, UserId,
};

/// Join request workflow implementing the driving port.
#[derive(Clone)]
pub struct JoinRequestService<J, S, I, N> {
    requests: Arc<J>,
    shops: Arc<S>,
    identity: Arc<I>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<J, S, I, N> JoinRequestService<J, S, I, N> {
    /// Create a new workflow service.
    pub fn new(
        requests: Arc<J>,
        shops: Arc<S>,
        identity: Arc<I>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            shops,
            identity,
            notifier,
            clock,
        }
    }
}

impl<J, S, I, N> JoinRequestService<J, S, I, N>
where
    J: JoinRequestRepository,
    S: ShopRepository,
    I: IdentityStore,
    N: NotificationDispatcher,
{
    async fn load_shop(&self, shop_id: &ShopId) -> Result<Shop, Error> {
        self.shops
            .find_by_id(shop_id)
            .await
            .map_err(map_shop_error)?
            .ok_or_else(|| not_found("shop not found", "shop_not_found"))
    }

    async fn owned_shop(&self, actor: &UserId, shop_id: &ShopId) -> Result<Shop, Error> {
        let owner = require_barber(self.identity.as_ref(), actor).await?;
        let shop = self.load_shop(shop_id).await?;
        if !shop.is_owned_by(&owner.id) {
            return Err(not_authorized("only the shop owner may manage join requests"));
        }
        Ok(shop)
    }

    async fn notify_barber(&self, request: &JoinRequest, assigned_seat: Option<u32>) {
        let Some(recipient) = barber_account(self.identity.as_ref(), &request.barber_id).await
        else {
            return;
        };
        let notification = match assigned_seat {
            Some(seat) => Notification::join_request_approved(recipient, request, seat),
            None => Notification::join_request_rejected(recipient, request),
        };
        dispatch(self.notifier.as_ref(), notification).await;
    }
}

#[async_trait]
impl<J, S, I, N> JoinRequestWorkflow for JoinRequestService<J, S, I, N>
where
    J: JoinRequestRepository,
    S: ShopRepository,
    I: IdentityStore,
    N: NotificationDispatcher,
{
    async fn submit(
        &self,
        actor: &UserId,
        request: SubmitJoinRequest,
    ) -> Result<JoinRequest, Error> {
        let user = require_user(self.identity.as_ref(), actor).await?;
        let barber = require_barber(self.identity.as_ref(), actor).await?;
        if !barber.is_solo() {
            return Err(RuleViolation::AlreadyAffiliated.into());
        }
        let shop = self.load_shop(&request.shop_id).await?;
        if shop.is_full() {
            return Err(RuleViolation::ShopFull.into());
        }

        let pending = JoinRequest::pending(
            barber.id,
            shop.id,
            request.message,
            request.seat_number,
            self.clock.utc(),
        );
        self.requests
            .submit(&pending)
            .await
            .map_err(map_join_request_error)?;
        info!(request_id = %pending.id, shop_id = %shop.id, barber_id = %barber.id, "join request submitted");

        if let Some(owner) = barber_account(self.identity.as_ref(), &shop.owner_id).await {
            dispatch(
                self.notifier.as_ref(),
                Notification::join_request_received(owner, &pending, &user.full_name),
            )
            .await;
        }
        Ok(pending)
    }

    async fn respond(
        &self,
        actor: &UserId,
        response: RespondToJoinRequest,
    ) -> Result<JoinRequestDecision, Error> {
        let request = self
            .requests
            .find_by_id(&response.request_id)
            .await
            .map_err(map_join_request_error)?
            .ok_or_else(|| not_found("join request not found", "join_request_not_found"))?;
        self.owned_shop(actor, &request.shop_id).await?;
        if request.status != JoinRequestStatus::Pending {
            return Err(RuleViolation::AlreadyProcessed {
                status: request.status,
            }
            .into());
        }

        let now = self.clock.utc();
        let decision = match response.action {
            JoinRequestAction::Approve => {
                let approval = self
                    .requests
                    .approve(&request.id, response.seat_number, now)
                    .await
                    .map_err(map_join_request_error)?;
                info!(
                    request_id = %approval.request.id,
                    seat = approval.assigned_seat,
                    "join request approved"
                );
                JoinRequestDecision {
                    request: approval.request,
                    assigned_seat: Some(approval.assigned_seat),
                }
            }
            JoinRequestAction::Reject => {
                let rejected = self
                    .requests
                    .reject(&request.id, now)
                    .await
                    .map_err(map_join_request_error)?;
                info!(request_id = %rejected.id, "join request rejected");
                JoinRequestDecision {
                    request: rejected,
                    assigned_seat: None,
                }
            }
        };

        self.notify_barber(&decision.request, decision.assigned_seat)
            .await;
        Ok(decision)
    }

    async fn list_for_shop(
        &self,
        actor: &UserId,
        shop_id: &ShopId,
    ) -> Result<Vec<JoinRequest>, Error> {
        self.owned_shop(actor, shop_id).await?;
        self.requests
            .list_for_shop(shop_id)
            .await
            .map_err(map_join_request_error)
    }
}

#[cfg(test)]
#[path = "join_request_service_tests.rs"]
mod tests;
