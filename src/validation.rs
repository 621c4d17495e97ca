//! Input validation for meeting scheduling problems.
//!
//! Checks structural integrity of the loaded tables before placeholder
//! synthesis and model construction. Detects:
//! - Negative capacities, durations and travel times
//! - Dangling references (room → location, person → room/calendar,
//!   task → person/location/room, distance → location)
//! - Empty or repeated participant lists
//! - Fixed rooms that are not at the fixed location
//!
//! Duplicate ids are caught earlier, when records are inserted.

use std::collections::HashSet;

use crate::error::Error;
use crate::models::{ProblemTables, TaskKind};

/// Validation result: every problem found, in table order.
pub type ValidationResult = Result<(), Vec<Error>>;

fn record(id: impl std::fmt::Display) -> String {
    format!("id {id}")
}

/// Validates the tables.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_tables(tables: &ProblemTables) -> ValidationResult {
    let mut errors = Vec::new();

    for room in tables.rooms.values() {
        if room.capacity < 0 {
            errors.push(Error::validation(
                "rooms",
                record(room.id),
                "capacity",
                format!("must be >= 0, got {}", room.capacity),
            ));
        }
        if !tables.locations.contains_key(&room.location) {
            errors.push(Error::validation(
                "rooms",
                record(room.id),
                "locationId",
                format!("references unknown location {}", room.location),
            ));
        }
    }

    for calendar in tables.calendars.values() {
        for off in &calendar.offs {
            if off.duration < 0 {
                errors.push(Error::validation(
                    "calendars",
                    record(calendar.id),
                    "offs",
                    format!("off-interval at {} has negative duration", off.start),
                ));
            }
        }
    }

    for person in tables.people.values() {
        if !tables.rooms.contains_key(&person.workplace) {
            errors.push(Error::validation(
                "people",
                record(person.id),
                "workplaceId",
                format!("references unknown room {}", person.workplace),
            ));
        }
        for cal in &person.calendars {
            if !tables.calendars.contains_key(cal) {
                errors.push(Error::validation(
                    "people",
                    record(person.id),
                    "calendars",
                    format!("references unknown calendar {cal}"),
                ));
            }
        }
    }

    for task in tables.tasks.values() {
        if task.duration < 0 {
            errors.push(Error::validation(
                "tasks",
                record(task.id),
                "duration",
                format!("must be >= 0, got {}", task.duration),
            ));
        }

        if task.members.is_empty() {
            errors.push(Error::validation(
                "tasks",
                record(task.id),
                "members",
                "must not be empty",
            ));
        }
        let mut seen = HashSet::new();
        for member in &task.members {
            if !seen.insert(*member) {
                errors.push(Error::validation(
                    "tasks",
                    record(task.id),
                    "members",
                    format!("lists person {member} twice"),
                ));
            }
            if !tables.people.contains_key(member) {
                errors.push(Error::validation(
                    "tasks",
                    record(task.id),
                    "members",
                    format!("references unknown person {member}"),
                ));
            }
        }

        if let TaskKind::Fixed { location, room, .. } = task.kind {
            if !tables.locations.contains_key(&location) {
                errors.push(Error::validation(
                    "tasks",
                    record(task.id),
                    "location",
                    format!("references unknown location {location}"),
                ));
            }
            match tables.rooms.get(&room) {
                None => errors.push(Error::validation(
                    "tasks",
                    record(task.id),
                    "room",
                    format!("references unknown room {room}"),
                )),
                Some(r) if r.location != location => errors.push(Error::validation(
                    "tasks",
                    record(task.id),
                    "room",
                    format!("room {room} is at location {}, not {location}", r.location),
                )),
                Some(_) => {}
            }
        }
    }

    for (from, to, time) in tables.travel.iter() {
        let pair = format!("({from}, {to})");
        if time < 0 {
            errors.push(Error::validation(
                "distances",
                pair.clone(),
                "time",
                format!("must be >= 0, got {time}"),
            ));
        }
        if !tables.locations.contains_key(&from) {
            errors.push(Error::validation(
                "distances",
                pair.clone(),
                "id1",
                format!("references unknown location {from}"),
            ));
        }
        if !tables.locations.contains_key(&to) {
            errors.push(Error::validation(
                "distances",
                pair,
                "id2",
                format!("references unknown location {to}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
