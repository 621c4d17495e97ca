//! Strongly typed identifiers.
//!
//! Locations, rooms, people, calendars and tasks each get their own id type,
//! so a room id can never be used where a location id is expected even when
//! the input document reuses the same integer for both.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw identifier as it appears in the input document.
            pub const fn raw(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a site.
    LocationId
);
id_type!(
    /// Identifier of a meeting room.
    RoomId
);
id_type!(
    /// Identifier of a person.
    PersonId
);
id_type!(
    /// Identifier of a calendar.
    CalendarId
);
id_type!(
    /// Identifier of a task (meeting or placeholder).
    TaskId
);

/// Hands out task ids for synthesized placeholder tasks.
///
/// Every id it returns is strictly greater than the largest id it was seeded
/// with, so placeholders never collide with tasks from the input document.
/// Once the id space above that maximum is used up, allocation yields `None`.
#[derive(Debug, Clone)]
pub struct TaskIdAllocator {
    next: Option<i64>,
}

impl TaskIdAllocator {
    /// Creates an allocator starting right above the largest of `existing`.
    ///
    /// With no existing ids, allocation starts at 0.
    pub fn above<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = TaskId>,
    {
        let next = existing
            .into_iter()
            .map(TaskId::raw)
            .max()
            .map_or(Some(0), |max| max.checked_add(1));
        Self { next }
    }

    /// Returns a fresh id, or `None` when no id above the seed remains.
    pub fn allocate(&mut self) -> Option<TaskId> {
        let raw = self.next?;
        self.next = raw.checked_add(1);
        Some(TaskId::new(raw))
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> Option<TaskId> {
        self.next.map(TaskId::new)
    }
}
