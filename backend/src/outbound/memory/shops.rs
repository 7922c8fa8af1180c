//! Shop and join request repositories over the in-memory store.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    JoinRequestRepository, JoinRequestRepositoryError, ShopRepository, ShopRepositoryError,
};
use crate::domain::{
    BarberId, ContactInfo, JoinApproval, JoinRequest, JoinRequestAction, JoinRequestId,
    OpeningHours, RuleViolation, Shop, ShopId,
};

use super::{InMemoryStore, MarketState};

const SHOP: RuleViolation = RuleViolation::Missing { entity: "shop" };
const BARBER: RuleViolation = RuleViolation::Missing { entity: "barber" };
const JOIN_REQUEST: RuleViolation = RuleViolation::Missing {
    entity: "join request",
};

fn update_shop<F>(state: &mut MarketState, id: &ShopId, change: F) -> Result<Shop, RuleViolation>
where
    F: FnOnce(&mut Shop) -> Result<(), RuleViolation>,
{
    let shop = state.shops.get_mut(id).ok_or(SHOP)?;
    change(shop)?;
    Ok(shop.clone())
}

#[async_trait]
impl ShopRepository for InMemoryStore {
    async fn create(&self, shop: &Shop) -> Result<(), ShopRepositoryError> {
        let mut state = self.lock();
        if state.shops.values().any(|s| s.owner_id == shop.owner_id) {
            return Err(ShopRepositoryError::rejected(RuleViolation::AlreadyOwnsShop));
        }
        let owner = state
            .barber(&shop.owner_id)
            .ok_or_else(|| ShopRepositoryError::rejected(BARBER))?;
        if !owner.is_solo() {
            return Err(ShopRepositoryError::rejected(
                RuleViolation::AlreadyAffiliated,
            ));
        }
        let seat = shop
            .seat_of(&shop.owner_id)
            .ok_or_else(|| ShopRepositoryError::query("new shop has no seat for its owner"))?;

        state.shops.insert(shop.id, shop.clone());
        if let Some(owner) = state.barber_mut(&shop.owner_id) {
            owner.seat_in(shop.id, seat);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ShopId) -> Result<Option<Shop>, ShopRepositoryError> {
        Ok(self.lock().shops.get(id).cloned())
    }

    async fn find_by_owner(&self, owner_id: &BarberId) -> Result<Option<Shop>, ShopRepositoryError> {
        Ok(self
            .lock()
            .shops
            .values()
            .find(|shop| &shop.owner_id == owner_id)
            .cloned())
    }

    async fn resize(&self, id: &ShopId, total_seats: u32) -> Result<Shop, ShopRepositoryError> {
        update_shop(&mut self.lock(), id, |shop| shop.resize(total_seats))
            .map_err(ShopRepositoryError::rejected)
    }

    async fn update_hours(
        &self,
        id: &ShopId,
        hours: Vec<OpeningHours>,
    ) -> Result<Shop, ShopRepositoryError> {
        update_shop(&mut self.lock(), id, |shop| {
            shop.hours = hours;
            Ok(())
        })
        .map_err(ShopRepositoryError::rejected)
    }

    async fn update_contact(
        &self,
        id: &ShopId,
        contact: ContactInfo,
    ) -> Result<Shop, ShopRepositoryError> {
        update_shop(&mut self.lock(), id, |shop| {
            shop.contact = contact;
            Ok(())
        })
        .map_err(ShopRepositoryError::rejected)
    }
}

fn find_request<'a>(
    state: &'a MarketState,
    id: &JoinRequestId,
) -> Result<&'a JoinRequest, JoinRequestRepositoryError> {
    state
        .join_requests
        .iter()
        .find(|request| &request.id == id)
        .ok_or_else(|| JoinRequestRepositoryError::rejected(JOIN_REQUEST))
}

fn store_request(state: &mut MarketState, updated: &JoinRequest) {
    if let Some(slot) = state
        .join_requests
        .iter_mut()
        .find(|request| request.id == updated.id)
    {
        *slot = updated.clone();
    }
}

#[async_trait]
impl JoinRequestRepository for InMemoryStore {
    async fn submit(&self, request: &JoinRequest) -> Result<(), JoinRequestRepositoryError> {
        let mut state = self.lock();
        let barber = state
            .barber(&request.barber_id)
            .ok_or_else(|| JoinRequestRepositoryError::rejected(BARBER))?;
        if !barber.is_solo() {
            return Err(JoinRequestRepositoryError::rejected(
                RuleViolation::AlreadyAffiliated,
            ));
        }
        let shop = state
            .shops
            .get(&request.shop_id)
            .ok_or_else(|| JoinRequestRepositoryError::rejected(SHOP))?;
        if shop.is_full() {
            return Err(JoinRequestRepositoryError::rejected(RuleViolation::ShopFull));
        }
        if state
            .join_requests
            .iter()
            .any(|r| r.barber_id == request.barber_id && r.shop_id == request.shop_id)
        {
            return Err(JoinRequestRepositoryError::rejected(
                RuleViolation::DuplicateRequest,
            ));
        }
        state.join_requests.push(request.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &JoinRequestId,
    ) -> Result<Option<JoinRequest>, JoinRequestRepositoryError> {
        Ok(self
            .lock()
            .join_requests
            .iter()
            .find(|request| &request.id == id)
            .cloned())
    }

    async fn list_for_shop(
        &self,
        shop_id: &ShopId,
    ) -> Result<Vec<JoinRequest>, JoinRequestRepositoryError> {
        let state = self.lock();
        let mut requests: Vec<JoinRequest> = state
            .join_requests
            .iter()
            .rev()
            .filter(|request| &request.shop_id == shop_id)
            .cloned()
            .collect();
        requests.sort_by_key(|request| Reverse(request.created_at));
        Ok(requests)
    }

    async fn approve(
        &self,
        id: &JoinRequestId,
        seat_number: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<JoinApproval, JoinRequestRepositoryError> {
        let mut state = self.lock();
        let mut request = find_request(&state, id)?.clone();
        request
            .resolve(JoinRequestAction::Approve, at)
            .map_err(JoinRequestRepositoryError::rejected)?;
        let barber = state
            .barber(&request.barber_id)
            .ok_or_else(|| JoinRequestRepositoryError::rejected(BARBER))?;
        if !barber.is_solo() {
            return Err(JoinRequestRepositoryError::rejected(
                RuleViolation::AlreadyAffiliated,
            ));
        }

        let shop = state
            .shops
            .get_mut(&request.shop_id)
            .ok_or_else(|| JoinRequestRepositoryError::rejected(SHOP))?;
        let assigned_seat = shop
            .assign_seat(request.barber_id, seat_number)
            .map_err(JoinRequestRepositoryError::rejected)?;
        let shop_id = shop.id;

        if let Some(barber) = state.barber_mut(&request.barber_id) {
            barber.seat_in(shop_id, assigned_seat);
        }
        store_request(&mut state, &request);
        Ok(JoinApproval {
            request,
            assigned_seat,
        })
    }

    async fn reject(
        &self,
        id: &JoinRequestId,
        at: DateTime<Utc>,
    ) -> Result<JoinRequest, JoinRequestRepositoryError> {
        let mut state = self.lock();
        let mut request = find_request(&state, id)?.clone();
        request
            .resolve(JoinRequestAction::Reject, at)
            .map_err(JoinRequestRepositoryError::rejected)?;
        store_request(&mut state, &request);
        Ok(request)
    }
}
