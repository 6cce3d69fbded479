use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use derive_more::{Display, Error};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::db::Entity;

/// Minute of the day, `0..=1440`, carried on the wire as `HH:MM`.
///
/// Comparing minutes rather than strings keeps `9:30` and `09:30` equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn minutes(self) -> u16 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display(fmt = "invalid time '{}', expected HH:MM", _0)]
pub struct ParseClockTimeError(#[error(not(source))] String);

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseClockTimeError(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if h.is_empty() || h.len() > 2 || m.len() != 2 || !digits(h) || !digits(m) {
            return Err(err());
        }
        let hours: u16 = h.parse().map_err(|_| err())?;
        let minutes: u16 = m.parse().map_err(|_| err())?;
        if minutes >= 60 || hours > 24 || (hours == 24 && minutes != 0) {
            return Err(err());
        }
        Ok(ClockTime(hours * 60 + minutes))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<ClockTime>().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Booking,
    Meeting,
    Maintenance,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Confirmed,
    Pending,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub status: EventStatus,
}

impl CalendarEvent {
    pub fn is_active_booking(&self) -> bool {
        self.kind == EventType::Booking && self.status != EventStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Syndic,
    Resident,
    Support,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub condominium_id: Option<Uuid>,
    #[serde(default)]
    pub unit: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A [`User`] without credentials, the only shape sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub condominium_id: Option<Uuid>,
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            condominium_id: user.condominium_id,
            unit: user.unit,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condominium {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub syndic_id: Option<Uuid>,
}

impl Condominium {
    /// The listed resource matching `name` regardless of case.
    pub fn resource_named(&self, name: &str) -> Option<&String> {
        let wanted = name.trim().to_lowercase();
        self.resources
            .iter()
            .find(|r| r.trim().to_lowercase() == wanted)
    }

    pub fn has_resource(&self, name: &str) -> bool {
        self.resource_named(name).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub amount_cents: i64,
    pub due_date: NaiveDate,
    pub status: BillStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitorStatus {
    Expected,
    Arrived,
    Left,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub document: Option<String>,
    pub visit_date: NaiveDate,
    pub status: VisitorStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Available,
    Sold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceItem {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub category: String,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub label: String,
    #[serde(default)]
    pub votes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub user_id: Uuid,
    pub question: String,
    pub options: Vec<PollOption>,
    #[serde(default)]
    pub voters: Vec<Uuid>,
    #[serde(default)]
    pub closes_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CondoDocument {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub url: String,
}

impl Entity for CalendarEvent {
    const COLLECTION: &'static str = "events";
    fn id(&self) -> Uuid {
        self.id
    }
    fn condominium_id(&self) -> Option<Uuid> {
        Some(self.condominium_id)
    }
    fn user_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    fn id(&self) -> Uuid {
        self.id
    }
    fn condominium_id(&self) -> Option<Uuid> {
        self.condominium_id
    }
}

impl Entity for Condominium {
    const COLLECTION: &'static str = "condominiums";
    fn id(&self) -> Uuid {
        self.id
    }
    fn condominium_id(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

/// Records that always belong to a condominium and a user.
macro_rules! owned_entity {
    ($($ty:ty => $collection:literal),+ $(,)?) => {
        $(
            impl Entity for $ty {
                const COLLECTION: &'static str = $collection;
                fn id(&self) -> Uuid {
                    self.id
                }
                fn condominium_id(&self) -> Option<Uuid> {
                    Some(self.condominium_id)
                }
                fn user_id(&self) -> Option<Uuid> {
                    Some(self.user_id)
                }
            }
        )+
    };
}

owned_entity! {
    Bill => "bills",
    Visitor => "visitors",
    MarketplaceItem => "marketplace",
    Poll => "polls",
    SupportTicket => "tickets",
    CondoDocument => "documents",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_parses_padded_and_unpadded() {
        let padded: ClockTime = "09:30".parse().unwrap();
        let unpadded: ClockTime = "9:30".parse().unwrap();
        assert_eq!(padded, unpadded);
        assert_eq!(padded.minutes(), 570);
        assert_eq!(padded.to_string(), "09:30");
    }

    #[test]
    fn clock_time_rejects_out_of_range() {
        for raw in ["24:30", "12:60", "1230", "", "ab:cd", "123:00", "12:5", "+1:00"] {
            assert!(raw.parse::<ClockTime>().is_err(), "{raw} should be rejected");
        }
        assert_eq!("24:00".parse::<ClockTime>().unwrap().minutes(), 1440);
        assert_eq!(
            "7h".parse::<ClockTime>().unwrap_err().to_string(),
            "invalid time '7h', expected HH:MM"
        );
    }

    #[test]
    fn resource_lookup_folds_non_ascii_case() {
        let condo = Condominium {
            id: Uuid::new_v4(),
            name: "A".into(),
            address: String::new(),
            resources: vec!["Salão de Festas".into()],
            syndic_id: None,
        };
        assert_eq!(
            condo.resource_named(" SALÃO DE FESTAS ").map(String::as_str),
            Some("Salão de Festas")
        );
        assert!(!condo.has_resource("Salao de Festas"));
    }

    #[test]
    fn calendar_event_uses_camel_case_wire_names() {
        let raw = serde_json::json!({
            "id": Uuid::nil(),
            "condominiumId": Uuid::nil(),
            "userId": Uuid::nil(),
            "userName": "Ana",
            "title": "Aniversário",
            "date": "2024-06-01",
            "startTime": "14:00",
            "endTime": "16:00",
            "type": "BOOKING",
            "resource": "Churrasqueira",
            "status": "CONFIRMED"
        });
        let event: CalendarEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.kind, EventType::Booking);
        assert_eq!(event.start_time.minutes(), 14 * 60);
        assert!(event.is_active_booking());
        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["endTime"], "16:00");
        assert_eq!(back["type"], "BOOKING");
    }
}
