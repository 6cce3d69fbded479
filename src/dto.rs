use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{event::EventFilter, OwnerFilter},
    models::{EventStatus, EventType, PublicUser, Role},
};

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewUserDto {
    pub name: String,
    pub email: String,
    pub pwd: String,
    pub pwd_confirm: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub condominium_id: Option<Uuid>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoginUserRequest {
    pub email: String,
    pub pwd: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserResponse {
    pub access_token: String,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: &Uuid, username: &str, role: Role, exp: usize) -> Self {
        Self {
            user_id: *user_id,
            username: username.to_string(),
            role,
            exp,
        }
    }
}

/// Payload of a new calendar event. Times arrive as `HH:MM` strings and are
/// parsed by the booking workflow so that bad input surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewEventDto {
    pub condominium_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct UpdateEventStatusDto {
    pub status: EventStatus,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct VoteDto {
    pub option_index: usize,
}

/// `?page=&limit=` plus the owner filters every list endpoint accepts.
#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub condominium_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl ListQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(crate::db::collection::DEFAULT_PAGE_LIMIT)
    }

    pub fn owner(&self) -> OwnerFilter {
        OwnerFilter {
            condominium_id: self.condominium_id,
            user_id: self.user_id,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub condominium_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub resource: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<EventType>,
}

impl EventListQuery {
    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            limit: self.limit,
            condominium_id: self.condominium_id,
            user_id: self.user_id,
        }
    }

    pub fn filter(&self) -> EventFilter {
        EventFilter {
            owner: self.list_query().owner(),
            date: self.date,
            resource: self.resource.clone(),
            kind: self.kind,
        }
    }
}
