//! Handles to the decision variables of a meeting model.

use std::collections::BTreeMap;

use crate::engine::{BoolVar, IntVar, IntervalVar};
use crate::models::{LocationId, PersonId, RoomId, TaskId};

/// Key of a headcount variable `e[task, location]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskLocation {
    pub task: TaskId,
    pub location: LocationId,
}

/// Key of a location-choice variable `l[person, task]`.
///
/// Ordered task first, so one task's keys form a contiguous range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonTask {
    pub task: TaskId,
    pub person: PersonId,
}

/// Key of a room-assignment boolean `a[room, task]`, ordered task first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomTask {
    pub task: TaskId,
    pub room: RoomId,
}

/// Lowest and highest participant location of a task, and whether they differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteBounds {
    pub lowest: IntVar,
    pub highest: IntVar,
    pub multisite: BoolVar,
}

/// Chronological ordering of one person's meetings.
///
/// `order[q]` is the position in `meetings` of the meeting that comes
/// `q`-th, and `sorted_starts[q]` is its start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelChain {
    pub person: PersonId,
    pub meetings: Vec<TaskId>,
    pub sorted_starts: Vec<IntVar>,
    pub order: Vec<IntVar>,
}

impl TravelChain {
    pub fn len(&self) -> usize {
        self.meetings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty()
    }
}

/// Every variable the builder created, keyed by domain ids.
#[derive(Debug, Clone, Default)]
pub struct MeetingVars {
    pub(crate) intervals: BTreeMap<TaskId, IntervalVar>,
    pub(crate) starts: BTreeMap<TaskId, IntVar>,
    pub(crate) headcounts: BTreeMap<TaskLocation, IntVar>,
    pub(crate) locations: BTreeMap<PersonTask, IntVar>,
    pub(crate) rooms: BTreeMap<RoomTask, BoolVar>,
    pub(crate) sites: BTreeMap<TaskId, SiteBounds>,
    pub(crate) chains: Vec<TravelChain>,
}

impl MeetingVars {
    pub fn interval(&self, task: TaskId) -> Option<IntervalVar> {
        self.intervals.get(&task).copied()
    }

    /// Start variable; `None` for fixed tasks, whose start is a constant.
    pub fn start(&self, task: TaskId) -> Option<IntVar> {
        self.starts.get(&task).copied()
    }

    pub fn headcount(&self, task: TaskId, location: LocationId) -> Option<IntVar> {
        self.headcounts
            .get(&TaskLocation { task, location })
            .copied()
    }

    pub fn location(&self, person: PersonId, task: TaskId) -> Option<IntVar> {
        self.locations.get(&PersonTask { person, task }).copied()
    }

    pub fn room(&self, room: RoomId, task: TaskId) -> Option<BoolVar> {
        self.rooms.get(&RoomTask { room, task }).copied()
    }

    pub fn site(&self, task: TaskId) -> Option<SiteBounds> {
        self.sites.get(&task).copied()
    }

    pub fn chains(&self) -> &[TravelChain] {
        &self.chains
    }

    pub fn chain(&self, person: PersonId) -> Option<&TravelChain> {
        self.chains.iter().find(|c| c.person == person)
    }

    /// `l[·, task]` in person id order.
    pub fn locations_of_task(&self, task: TaskId) -> Vec<(PersonId, IntVar)> {
        let first = PersonTask { task, person: PersonId::new(i64::MIN) };
        let last = PersonTask { task, person: PersonId::new(i64::MAX) };
        self.locations
            .range(first..=last)
            .map(|(k, v)| (k.person, *v))
            .collect()
    }

    /// Room booleans of `task`, in room id order.
    pub fn rooms_of_task(&self, task: TaskId) -> Vec<(RoomId, BoolVar)> {
        let first = RoomTask { task, room: RoomId::new(i64::MIN) };
        let last = RoomTask { task, room: RoomId::new(i64::MAX) };
        self.rooms
            .range(first..=last)
            .map(|(k, v)| (k.room, *v))
            .collect()
    }

    /// Number of intervals, one per task.
    pub fn task_count(&self) -> usize {
        self.intervals.len()
    }
}
