//! People taking part in meetings.

use serde::{Deserialize, Serialize};

use super::{CalendarId, PersonId, RoomId};

/// A person who can attend meetings.
///
/// The workplace is a room; the person's home location is the location of
/// that room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Dedicated room of this person.
    pub workplace: RoomId,
    /// Calendars whose off-intervals apply to this person.
    pub calendars: Vec<CalendarId>,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>, workplace: RoomId) -> Self {
        Self {
            id,
            name: name.into(),
            workplace,
            calendars: Vec::new(),
        }
    }

    /// Adds a calendar.
    pub fn with_calendar(mut self, calendar: CalendarId) -> Self {
        self.calendars.push(calendar);
        self
    }
}
