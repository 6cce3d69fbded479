//! Plain owner-scoped records: condominiums, bills, visitors, marketplace
//! items, polls, support tickets and documents. They share one CRUD shape
//! and enforce no cross-record invariants.

use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use uuid::Uuid;

use super::{
    auth::{Permissions, UserAuthData},
    AppState,
};
use crate::{
    db::{Collection, Entity, OwnerFilter, Page, Store},
    errors::AppError,
    models::{
        Bill, CondoDocument, Condominium, MarketplaceItem, Poll, SupportTicket, Visitor,
    },
};

pub trait Record: Entity {
    /// Needed to create a record.
    const CREATE: Permissions;
    /// Needed to change or delete a record somebody else created.
    const MANAGE: Permissions;
    /// Whether `userId` is filled in with the caller when omitted.
    const OWNED: bool = true;

    fn collection(store: &Store) -> &Collection<Self>;
}

impl Record for Condominium {
    const CREATE: Permissions = Permissions::MANAGE_CONDOS;
    const MANAGE: Permissions = Permissions::MANAGE_CONDOS;
    const OWNED: bool = false;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.condominiums
    }
}

impl Record for Bill {
    const CREATE: Permissions = Permissions::MANAGE_RECORDS;
    const MANAGE: Permissions = Permissions::MANAGE_RECORDS;
    const OWNED: bool = false;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.bills
    }
}

impl Record for Visitor {
    const CREATE: Permissions = Permissions::BOOK;
    const MANAGE: Permissions = Permissions::MANAGE_RECORDS;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.visitors
    }
}

impl Record for MarketplaceItem {
    const CREATE: Permissions = Permissions::BOOK;
    const MANAGE: Permissions = Permissions::MANAGE_RECORDS;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.marketplace
    }
}

impl Record for Poll {
    const CREATE: Permissions = Permissions::MANAGE_RECORDS;
    const MANAGE: Permissions = Permissions::MANAGE_RECORDS;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.polls
    }
}

impl Record for SupportTicket {
    const CREATE: Permissions = Permissions::BOOK;
    const MANAGE: Permissions = Permissions::MANAGE_RECORDS;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.tickets
    }
}

impl Record for CondoDocument {
    const CREATE: Permissions = Permissions::MANAGE_RECORDS;
    const MANAGE: Permissions = Permissions::MANAGE_RECORDS;

    fn collection(store: &Store) -> &Collection<Self> {
        &store.documents
    }
}

pub async fn list<T: Record>(
    state: &AppState,
    filter: &OwnerFilter,
    page: usize,
    limit: usize,
) -> Page<T> {
    state.delay().await;
    T::collection(&state.store).list(filter, page, limit).await
}

pub async fn get_by_id<T: Record>(state: &AppState, id: Uuid) -> Result<T, AppError> {
    state.delay().await;
    T::collection(&state.store).get(id).await
}

pub async fn create<T: Record>(
    state: &AppState,
    caller: &UserAuthData,
    mut payload: Value,
) -> Result<T, AppError> {
    state.delay().await;
    caller.require(T::CREATE)?;
    if T::OWNED {
        if let Value::Object(fields) = &mut payload {
            fields
                .entry("userId")
                .or_insert_with(|| Value::String(caller.user_id.to_string()));
        }
    }
    let record = T::collection(&state.store).create(payload).await?;
    info!("{} {} created by {}", T::COLLECTION, record.id(), caller.username);
    Ok(record)
}

/// Owners may change their own records; anybody else needs `T::MANAGE`.
async fn authorize_change<T: Record>(
    state: &AppState,
    caller: &UserAuthData,
    id: Uuid,
) -> Result<(), AppError> {
    let current = T::collection(&state.store).get(id).await?;
    if current.user_id() != Some(caller.user_id) {
        caller.require(T::MANAGE)?;
    }
    Ok(())
}

pub async fn update<T: Record>(
    state: &AppState,
    caller: &UserAuthData,
    id: Uuid,
    patch: Value,
) -> Result<T, AppError> {
    state.delay().await;
    authorize_change::<T>(state, caller, id).await?;
    let record = T::collection(&state.store).update(id, patch).await?;
    info!("{} {} updated by {}", T::COLLECTION, id, caller.username);
    Ok(record)
}

pub async fn delete<T: Record>(
    state: &AppState,
    caller: &UserAuthData,
    id: Uuid,
) -> Result<(), AppError> {
    state.delay().await;
    authorize_change::<T>(state, caller, id).await?;
    T::collection(&state.store).delete(id).await?;
    info!("{} {} deleted by {}", T::COLLECTION, id, caller.username);
    Ok(())
}

/// One vote per user per poll, until the poll closes.
pub async fn vote(
    state: &AppState,
    caller: &UserAuthData,
    poll_id: Uuid,
    option_index: usize,
) -> Result<Poll, AppError> {
    state.delay().await;
    let today = Utc::now().date_naive();
    let res = state
        .store
        .polls
        .modify(poll_id, |poll, _| {
            if poll.closes_on.is_some_and(|closes_on| today > closes_on) {
                return Err(AppError::validation("poll is closed"));
            }
            if poll.voters.contains(&caller.user_id) {
                return Err(AppError::validation("you have already voted in this poll"));
            }
            let option = poll
                .options
                .get_mut(option_index)
                .ok_or_else(|| AppError::validation("no such poll option"))?;
            option.votes += 1;
            poll.voters.push(caller.user_id);
            Ok(())
        })
        .await;
    if let Err(err) = &res {
        warn!("vote on poll {} rejected: {}", poll_id, err);
    }
    res
}
