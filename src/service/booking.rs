//! Admission check for bookings of shared resources.
//!
//! Two active bookings of the same resource, in the same condominium, on the
//! same day, may not overlap. Intervals are half-open, so a booking ending at
//! 16:00 and one starting at 16:00 can coexist.

use crate::{
    errors::AppError,
    models::{CalendarEvent, Condominium, EventStatus, EventType},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConflict {
    pub resource: String,
}

impl From<BookingConflict> for AppError {
    fn from(conflict: BookingConflict) -> Self {
        AppError::Conflict {
            resource: conflict.resource,
        }
    }
}

fn overlaps(existing: &CalendarEvent, candidate: &CalendarEvent) -> bool {
    existing.start_time < candidate.end_time && existing.end_time > candidate.start_time
}

/// Pure check of `candidate` against a snapshot of `existing` events.
pub fn validate_booking(
    existing: &[CalendarEvent],
    candidate: &CalendarEvent,
) -> Result<(), BookingConflict> {
    if candidate.kind != EventType::Booking || candidate.status == EventStatus::Cancelled {
        return Ok(());
    }
    let Some(resource) = candidate.resource.as_deref() else {
        return Ok(());
    };
    let clash = existing.iter().any(|event| {
        event.id != candidate.id
            && event.is_active_booking()
            && event.condominium_id == candidate.condominium_id
            && event.date == candidate.date
            && event.resource.as_deref() == Some(resource)
            && overlaps(event, candidate)
    });
    if clash {
        Err(BookingConflict {
            resource: resource.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Input checks run before the conflict scan.
///
/// `condominium` is the owning condominium when it is known; its resource
/// list, if not empty, restricts what can be booked.
pub fn check_booking_request(
    candidate: &CalendarEvent,
    condominium: Option<&Condominium>,
) -> Result<(), AppError> {
    if candidate.start_time >= candidate.end_time {
        return Err(AppError::validation("start time must be before end time"));
    }
    if candidate.kind != EventType::Booking {
        return Ok(());
    }
    let resource = candidate
        .resource
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::validation("a booking must name a resource"))?;
    match condominium {
        Some(condo) if !condo.resources.is_empty() && !condo.has_resource(resource) => Err(
            AppError::validation(format!("{} has no resource named {}", condo.name, resource)),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use uuid::Uuid;

    fn condo_id() -> Uuid {
        Uuid::from_u128(7)
    }

    fn booking(resource: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent {
            id: Uuid::new_v4(),
            condominium_id: condo_id(),
            user_id: Uuid::new_v4(),
            user_name: "Ana".into(),
            title: "Churrasco".into(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            kind: EventType::Booking,
            resource: Some(resource.to_string()),
            status: EventStatus::Confirmed,
        }
    }

    #[rstest]
    #[case("15:00", "17:00", false)]
    #[case("13:00", "15:00", false)]
    #[case("14:30", "15:30", false)]
    #[case("13:00", "17:00", false)]
    #[case("16:00", "18:00", true)]
    #[case("12:00", "14:00", true)]
    #[case("08:00", "09:00", true)]
    fn overlap_against_a_two_hour_booking(
        #[case] start: &str,
        #[case] end: &str,
        #[case] accepted: bool,
    ) {
        let existing = vec![booking("Churrasqueira", "14:00", "16:00")];
        let candidate = booking("Churrasqueira", start, end);
        assert_eq!(validate_booking(&existing, &candidate).is_ok(), accepted);
    }

    #[test]
    fn conflict_carries_the_resource_name() {
        let existing = vec![booking("Churrasqueira", "14:00", "16:00")];
        let err = validate_booking(&existing, &booking("Churrasqueira", "15:00", "17:00"))
            .unwrap_err();
        assert_eq!(err.resource, "Churrasqueira");
        assert_eq!(
            AppError::from(err).to_string(),
            "Churrasqueira is already booked for this time slot"
        );
    }

    #[test]
    fn cancelled_bookings_never_block() {
        let mut first = booking("Churrasqueira", "14:00", "16:00");
        first.status = EventStatus::Cancelled;
        assert!(validate_booking(&[first], &booking("Churrasqueira", "15:00", "17:00")).is_ok());
    }

    #[test]
    fn pending_bookings_still_block() {
        let mut first = booking("Churrasqueira", "14:00", "16:00");
        first.status = EventStatus::Pending;
        assert!(validate_booking(&[first], &booking("Churrasqueira", "15:00", "17:00")).is_err());
    }

    #[test]
    fn non_booking_candidates_are_not_checked() {
        let existing = vec![booking("Churrasqueira", "14:00", "16:00")];
        let mut meeting = booking("Churrasqueira", "15:00", "17:00");
        meeting.kind = EventType::Meeting;
        assert!(validate_booking(&existing, &meeting).is_ok());
    }

    #[test]
    fn non_booking_events_do_not_block() {
        let mut maintenance = booking("Churrasqueira", "14:00", "16:00");
        maintenance.kind = EventType::Maintenance;
        assert!(
            validate_booking(&[maintenance], &booking("Churrasqueira", "15:00", "17:00")).is_ok()
        );
    }

    #[test]
    fn other_resources_days_and_condominiums_do_not_block() {
        let candidate = booking("Churrasqueira", "15:00", "17:00");

        let pool = booking("Piscina", "14:00", "16:00");
        let mut next_day = booking("Churrasqueira", "14:00", "16:00");
        next_day.date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let mut elsewhere = booking("Churrasqueira", "14:00", "16:00");
        elsewhere.condominium_id = Uuid::from_u128(8);

        assert!(validate_booking(&[pool, next_day, elsewhere], &candidate).is_ok());
    }

    #[test]
    fn an_event_does_not_conflict_with_itself() {
        let first = booking("Churrasqueira", "14:00", "16:00");
        assert!(validate_booking(&[first.clone()], &first).is_ok());
    }

    #[test]
    fn request_needs_an_ordered_interval() {
        let err = check_booking_request(&booking("Piscina", "16:00", "14:00"), None).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(check_booking_request(&booking("Piscina", "16:00", "16:00"), None).is_err());
        assert!(check_booking_request(&booking("Piscina", "23:00", "24:00"), None).is_ok());
    }

    #[test]
    fn request_needs_a_resource() {
        let mut blank = booking("  ", "10:00", "11:00");
        assert!(check_booking_request(&blank, None).is_err());
        blank.resource = None;
        assert!(check_booking_request(&blank, None).is_err());
        blank.kind = EventType::Other;
        assert!(check_booking_request(&blank, None).is_ok());
    }

    #[test]
    fn request_must_match_the_condominium_resources() {
        let condo = Condominium {
            id: condo_id(),
            name: "Residencial Aurora".into(),
            address: String::new(),
            resources: vec!["Churrasqueira".into(), "Piscina".into()],
            syndic_id: None,
        };
        assert!(check_booking_request(&booking("churrasqueira", "10:00", "11:00"), Some(&condo)).is_ok());
        assert!(check_booking_request(&booking("Quadra", "10:00", "11:00"), Some(&condo)).is_err());

        let open = Condominium {
            resources: vec![],
            ..condo
        };
        assert!(check_booking_request(&booking("Quadra", "10:00", "11:00"), Some(&open)).is_ok());
    }
}
