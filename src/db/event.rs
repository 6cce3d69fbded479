use chrono::NaiveDate;
use uuid::Uuid;

use super::{Collection, OwnerFilter, Page};
use crate::models::{CalendarEvent, EventType};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub owner: OwnerFilter,
    pub date: Option<NaiveDate>,
    pub resource: Option<String>,
    pub kind: Option<EventType>,
}

impl EventFilter {
    pub fn for_condominium(condominium_id: Uuid) -> Self {
        EventFilter {
            owner: OwnerFilter {
                condominium_id: Some(condominium_id),
                user_id: None,
            },
            ..Default::default()
        }
    }

    pub fn matches(&self, event: &CalendarEvent) -> bool {
        self.owner.matches(event)
            && self.date.map_or(true, |date| event.date == date)
            && self.kind.map_or(true, |kind| event.kind == kind)
            && self
                .resource
                .as_deref()
                .map_or(true, |resource| event.resource.as_deref() == Some(resource))
    }
}

/// Events matching `filter`, ordered by date then start time.
pub async fn list(
    events: &Collection<CalendarEvent>,
    filter: &EventFilter,
    page: usize,
    limit: usize,
) -> Page<CalendarEvent> {
    let mut matching = events.filter(|event| filter.matches(event)).await;
    matching.sort_by_key(|event| (event.date, event.start_time));
    Page::slice(matching, page, limit)
}
