#![allow(dead_code)]

use std::collections::HashMap;

use chrono::NaiveDate;
use condo_hub::{
    config::Config,
    db::Store,
    dto::NewEventDto,
    models::{EventType, Role},
    service::{auth::UserAuthData, AppState},
};
use uuid::Uuid;

pub const SECRET: &str = "test-secret";

pub fn config() -> Config {
    let vars = HashMap::from([("JWT_ACCESS_TOKEN".to_string(), SECRET.to_string())]);
    Config::from_vars(&vars).unwrap()
}

pub async fn state() -> AppState {
    AppState::new(Store::in_memory().await.unwrap(), &config())
}

pub fn caller(role: Role) -> UserAuthData {
    UserAuthData {
        user_id: Uuid::new_v4(),
        username: format!("{role:?}").to_lowercase(),
        role,
    }
}

pub fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn booking(condominium_id: Uuid, resource: &str, start: &str, end: &str) -> NewEventDto {
    NewEventDto {
        condominium_id,
        title: format!("{resource} {start}"),
        description: String::new(),
        date: june_first(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        kind: EventType::Booking,
        resource: Some(resource.to_string()),
        status: None,
    }
}
