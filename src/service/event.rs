use log::{info, warn};
use uuid::Uuid;

use super::{
    auth::{Permissions, UserAuthData},
    booking, AppState,
};
use crate::{
    db::{self, event::EventFilter, Page},
    dto::NewEventDto,
    errors::AppError,
    models::{CalendarEvent, ClockTime, EventStatus, EventType},
};

pub async fn list(
    state: &AppState,
    filter: &EventFilter,
    page: usize,
    limit: usize,
) -> Page<CalendarEvent> {
    state.delay().await;
    db::event::list(&state.store.events, filter, page, limit).await
}

pub async fn get_by_id(state: &AppState, id: Uuid) -> Result<CalendarEvent, AppError> {
    state.delay().await;
    state.store.events.get(id).await
}

fn parse_time(raw: &str) -> Result<ClockTime, AppError> {
    raw.parse::<ClockTime>()
        .map_err(|err| AppError::validation(err.to_string()))
}

/// Booking workflow: build the event, validate the request, then check for
/// conflicts and append in one step. A rejected booking changes nothing.
pub async fn create(
    state: &AppState,
    user_auth_data: &UserAuthData,
    dto: NewEventDto,
) -> Result<CalendarEvent, AppError> {
    state.delay().await;
    user_auth_data.require(Permissions::BOOK)?;

    let condominium = state.store.condominiums.get(dto.condominium_id).await.ok();
    let resource = match dto.kind {
        EventType::Booking => dto.resource.map(|r| {
            let r = r.trim().to_string();
            condominium
                .as_ref()
                .and_then(|c| c.resource_named(&r))
                .cloned()
                .unwrap_or(r)
        }),
        _ => None,
    };
    let event = CalendarEvent {
        id: Uuid::new_v4(),
        condominium_id: dto.condominium_id,
        user_id: user_auth_data.user_id,
        user_name: user_auth_data.username.clone(),
        title: dto.title,
        description: dto.description,
        date: dto.date,
        start_time: parse_time(&dto.start_time)?,
        end_time: parse_time(&dto.end_time)?,
        kind: dto.kind,
        resource,
        status: dto.status.unwrap_or(EventStatus::Confirmed),
    };
    booking::check_booking_request(&event, condominium.as_ref())?;

    let candidate = event.clone();
    let res = state
        .store
        .events
        .insert_checked(event, |existing| {
            booking::validate_booking(existing, &candidate).map_err(AppError::from)
        })
        .await;
    match &res {
        Ok(event) => info!(
            "event {} created by {} on {} {}-{}",
            event.id, event.user_name, event.date, event.start_time, event.end_time
        ),
        Err(err) => warn!("event rejected for {}: {}", user_auth_data.username, err),
    }
    res
}

/// The only in-place change an event gets. Reviving a cancelled booking
/// goes through the conflict check again.
pub async fn set_status(
    state: &AppState,
    user_auth_data: &UserAuthData,
    id: Uuid,
    status: EventStatus,
) -> Result<CalendarEvent, AppError> {
    state.delay().await;
    let current = state.store.events.get(id).await?;
    if current.user_id != user_auth_data.user_id {
        user_auth_data.require(Permissions::MANAGE_EVENTS)?;
    }
    let res = state
        .store
        .events
        .modify(id, |event, existing| {
            event.status = status;
            booking::validate_booking(existing, event).map_err(AppError::from)
        })
        .await;
    match &res {
        Ok(event) => info!("event {} is now {:?}", event.id, event.status),
        Err(err) => warn!("status change of event {} rejected: {}", id, err),
    }
    res
}

pub async fn delete(
    state: &AppState,
    user_auth_data: &UserAuthData,
    id: Uuid,
) -> Result<(), AppError> {
    state.delay().await;
    user_auth_data.require(Permissions::MANAGE_EVENTS)?;
    let removed = state.store.events.delete(id).await?;
    info!("event {} deleted by {}", removed.id, user_auth_data.username);
    Ok(())
}
