//! Schedule (solution) model.
//!
//! A schedule lists, for every task, when it happens, which rooms hold it,
//! and where each participant sits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{LocationId, PersonId, RoomId, TaskId};

/// Placement of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingAssignment {
    pub task_id: TaskId,
    /// Start time.
    pub start: i64,
    /// End time (start + duration).
    pub end: i64,
    /// Rooms assigned to the task, at most one per location.
    pub rooms: Vec<RoomId>,
    /// Location of each participant.
    pub locations: BTreeMap<PersonId, LocationId>,
    /// Whether participants are spread over more than one site.
    pub multisite: bool,
}

impl MeetingAssignment {
    /// Duration (end - start).
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether the two assignments share a time instant.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A complete schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Assignments in task id order.
    pub assignments: Vec<MeetingAssignment>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_assignment(&mut self, assignment: MeetingAssignment) {
        self.assignments.push(assignment);
    }

    pub fn assignment_for_task(&self, task_id: TaskId) -> Option<&MeetingAssignment> {
        self.assignments.iter().find(|a| a.task_id == task_id)
    }

    /// Assignments that use `room`.
    pub fn assignments_for_room(&self, room: RoomId) -> Vec<&MeetingAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.rooms.contains(&room))
            .collect()
    }

    /// Assignments `person` takes part in, sorted by start.
    pub fn assignments_for_person(&self, person: PersonId) -> Vec<&MeetingAssignment> {
        let mut result: Vec<_> = self
            .assignments
            .iter()
            .filter(|a| a.locations.contains_key(&person))
            .collect();
        result.sort_by_key(|a| (a.start, a.task_id));
        result
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Latest end time, 0 when empty.
    pub fn makespan(&self) -> i64 {
        self.assignments.iter().map(|a| a.end).max().unwrap_or(0)
    }
}
