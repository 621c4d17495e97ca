//! Task (meeting) model.
//!
//! A task is either *optimizable*, where the solver picks the start, the
//! location of each participant and the rooms, or *fixed*, where start,
//! location and room are given by the input.

use serde::{Deserialize, Serialize};

use super::{CalendarId, LocationId, PersonId, RoomId, TaskId};

/// How a task is placed in time and space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// The solver chooses start, locations and rooms.
    Optimizable {
        /// Earliest allowed start. `None` = anywhere in the horizon.
        earliest_start: Option<i64>,
    },
    /// Start, location and room are predetermined.
    Fixed {
        start: i64,
        location: LocationId,
        room: RoomId,
    },
}

/// Where a task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskOrigin {
    /// Read from the input document.
    Input,
    /// Synthesized for an off-interval of one of the person's calendars.
    Placeholder {
        person: PersonId,
        calendar: CalendarId,
    },
}

/// A meeting to be scheduled (or already scheduled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Human-readable name.
    pub name: String,
    /// Participants. Never empty.
    pub members: Vec<PersonId>,
    /// Length of the meeting.
    pub duration: i64,
    /// Placement mode.
    pub kind: TaskKind,
    /// Provenance.
    pub origin: TaskOrigin,
}

impl Task {
    /// Creates an optimizable task with no earliest-start bound.
    pub fn optimizable(
        id: TaskId,
        name: impl Into<String>,
        members: Vec<PersonId>,
        duration: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            members,
            duration,
            kind: TaskKind::Optimizable {
                earliest_start: None,
            },
            origin: TaskOrigin::Input,
        }
    }

    /// Creates a fixed task.
    pub fn fixed(
        id: TaskId,
        name: impl Into<String>,
        members: Vec<PersonId>,
        duration: i64,
        start: i64,
        location: LocationId,
        room: RoomId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            members,
            duration,
            kind: TaskKind::Fixed {
                start,
                location,
                room,
            },
            origin: TaskOrigin::Input,
        }
    }

    /// Sets the earliest start of an optimizable task.
    ///
    /// Has no effect on fixed tasks.
    pub fn with_earliest_start(mut self, bound: i64) -> Self {
        if let TaskKind::Optimizable { earliest_start } = &mut self.kind {
            *earliest_start = Some(bound);
        }
        self
    }

    /// Marks this task as a placeholder.
    pub fn with_origin(mut self, origin: TaskOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Whether start, location and room are predetermined.
    pub fn is_fixed(&self) -> bool {
        matches!(self.kind, TaskKind::Fixed { .. })
    }

    /// Whether this task was synthesized from an off-interval.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.origin, TaskOrigin::Placeholder { .. })
    }

    /// Whether the task has exactly one participant.
    pub fn is_solo(&self) -> bool {
        self.members.len() == 1
    }

    pub fn fixed_start(&self) -> Option<i64> {
        match self.kind {
            TaskKind::Fixed { start, .. } => Some(start),
            TaskKind::Optimizable { .. } => None,
        }
    }

    pub fn fixed_location(&self) -> Option<LocationId> {
        match self.kind {
            TaskKind::Fixed { location, .. } => Some(location),
            TaskKind::Optimizable { .. } => None,
        }
    }

    pub fn fixed_room(&self) -> Option<RoomId> {
        match self.kind {
            TaskKind::Fixed { room, .. } => Some(room),
            TaskKind::Optimizable { .. } => None,
        }
    }

    pub fn earliest_start(&self) -> Option<i64> {
        match self.kind {
            TaskKind::Optimizable { earliest_start } => earliest_start,
            TaskKind::Fixed { .. } => None,
        }
    }

    /// Whether `person` takes part in this task.
    pub fn has_member(&self, person: PersonId) -> bool {
        self.members.contains(&person)
    }
}
