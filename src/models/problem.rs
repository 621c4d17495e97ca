//! Normalized problem tables.
//!
//! [`ProblemTables`] is the mutable staging area the loader fills;
//! [`ProblemData`] is the immutable, validated and indexed result that the
//! model builder reads.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::travel::TravelTimeOracle;

use super::{
    Calendar, CalendarId, Location, LocationId, Person, PersonId, Room, RoomId, Task, TaskId,
};

/// Raw entity tables, keyed by id.
///
/// The `add_*` methods reject a second entity with an id already present.
#[derive(Debug, Clone, Default)]
pub struct ProblemTables {
    pub locations: BTreeMap<LocationId, Location>,
    pub rooms: BTreeMap<RoomId, Room>,
    pub calendars: BTreeMap<CalendarId, Calendar>,
    pub people: BTreeMap<PersonId, Person>,
    pub tasks: BTreeMap<TaskId, Task>,
    pub travel: TravelTimeOracle,
}

impl ProblemTables {
    /// Creates empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_location(&mut self, location: Location) -> Result<()> {
        if self.locations.contains_key(&location.id) {
            return Err(Error::duplicate("locations", location.id));
        }
        self.locations.insert(location.id, location);
        Ok(())
    }

    pub fn add_room(&mut self, room: Room) -> Result<()> {
        if self.rooms.contains_key(&room.id) {
            return Err(Error::duplicate("rooms", room.id));
        }
        self.rooms.insert(room.id, room);
        Ok(())
    }

    pub fn add_calendar(&mut self, calendar: Calendar) -> Result<()> {
        if self.calendars.contains_key(&calendar.id) {
            return Err(Error::duplicate("calendars", calendar.id));
        }
        self.calendars.insert(calendar.id, calendar);
        Ok(())
    }

    pub fn add_person(&mut self, person: Person) -> Result<()> {
        if self.people.contains_key(&person.id) {
            return Err(Error::duplicate("people", person.id));
        }
        self.people.insert(person.id, person);
        Ok(())
    }

    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.tasks.contains_key(&task.id) {
            return Err(Error::duplicate("tasks", task.id));
        }
        self.tasks.insert(task.id, task);
        Ok(())
    }

    /// Declares a travel time, rejecting a repeated ordered pair.
    pub fn add_distance(&mut self, from: LocationId, to: LocationId, time: i64) -> Result<()> {
        if from != to && self.travel.insert(from, to, time).is_some() {
            return Err(Error::duplicate("distances", format!("({from}, {to})")));
        }
        Ok(())
    }
}

/// Validated, indexed scheduling problem.
///
/// Immutable once built. Every id referenced by an entity resolves to an
/// entity of the right kind.
#[derive(Debug, Clone)]
pub struct ProblemData {
    locations: BTreeMap<LocationId, Location>,
    rooms: BTreeMap<RoomId, Room>,
    calendars: BTreeMap<CalendarId, Calendar>,
    people: BTreeMap<PersonId, Person>,
    tasks: BTreeMap<TaskId, Task>,
    travel: TravelTimeOracle,

    meetings: BTreeMap<PersonId, Vec<TaskId>>,
    solo: BTreeMap<PersonId, Vec<TaskId>>,
    non_video_rooms: Vec<RoomId>,
}

impl ProblemData {
    /// Validates the tables, synthesizes placeholder tasks and builds the
    /// derived indices.
    pub fn from_tables(tables: ProblemTables) -> Result<Self> {
        crate::loader::finish(tables).map(|(data, _)| data)
    }

    /// Builds derived indices over already validated tables.
    pub(crate) fn assemble(tables: ProblemTables) -> Self {
        let ProblemTables {
            mut locations,
            rooms,
            calendars,
            people,
            tasks,
            travel,
        } = tables;

        for location in locations.values_mut() {
            location.rooms.clear();
        }
        for room in rooms.values() {
            if let Some(location) = locations.get_mut(&room.location) {
                location.rooms.push(room.id);
            }
        }

        let non_video_rooms = rooms
            .values()
            .filter(|r| !r.video)
            .map(|r| r.id)
            .collect();

        let mut meetings: BTreeMap<PersonId, Vec<TaskId>> =
            people.keys().map(|&id| (id, Vec::new())).collect();
        let mut solo: BTreeMap<PersonId, Vec<TaskId>> =
            people.keys().map(|&id| (id, Vec::new())).collect();

        for task in tasks.values() {
            for member in &task.members {
                meetings.entry(*member).or_default().push(task.id);
            }
            if let [only] = task.members.as_slice() {
                solo.entry(*only).or_default().push(task.id);
            }
        }

        Self {
            locations,
            rooms,
            calendars,
            people,
            tasks,
            travel,
            meetings,
            solo,
            non_video_rooms,
        }
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// All location ids in ascending order.
    pub fn location_ids(&self) -> Vec<LocationId> {
        self.locations.keys().copied().collect()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn calendars(&self) -> impl Iterator<Item = &Calendar> {
        self.calendars.values()
    }

    pub fn calendar(&self, id: CalendarId) -> Option<&Calendar> {
        self.calendars.get(&id)
    }

    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.people.get(&id)
    }

    /// All tasks, including placeholders, in id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn travel(&self) -> &TravelTimeOracle {
        &self.travel
    }

    /// Tasks `person` takes part in, in task id order.
    pub fn meetings_of(&self, person: PersonId) -> &[TaskId] {
        self.meetings.get(&person).map_or(&[], Vec::as_slice)
    }

    /// Tasks whose only participant is `person`.
    pub fn solo_tasks_of(&self, person: PersonId) -> &[TaskId] {
        self.solo.get(&person).map_or(&[], Vec::as_slice)
    }

    /// Rooms located at `location`.
    pub fn rooms_at(&self, location: LocationId) -> &[RoomId] {
        self.locations
            .get(&location)
            .map_or(&[], |l| l.rooms.as_slice())
    }

    /// Rooms without video equipment.
    pub fn non_video_rooms(&self) -> &[RoomId] {
        &self.non_video_rooms
    }

    /// Site of the person's workplace room.
    pub fn home_location(&self, person: PersonId) -> Option<LocationId> {
        let workplace = self.people.get(&person)?.workplace;
        self.rooms.get(&workplace).map(|r| r.location)
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    /// Number of tasks, placeholders included.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn placeholder_count(&self) -> usize {
        self.tasks.values().filter(|t| t.is_placeholder()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tables() -> ProblemTables {
        let mut t = ProblemTables::new();
        t.add_location(Location::new(LocationId::new(0), "Paris")).unwrap();
        t.add_location(Location::new(LocationId::new(1), "Lyon")).unwrap();
        t.add_room(Room::new(RoomId::new(0), LocationId::new(0), 8).with_video(true))
            .unwrap();
        t.add_room(Room::new(RoomId::new(1), LocationId::new(1), 4)).unwrap();
        t.add_person(Person::new(PersonId::new(0), "Ada", RoomId::new(0)))
            .unwrap();
        t.add_person(Person::new(PersonId::new(1), "Bob", RoomId::new(1)))
            .unwrap();
        t.add_task(Task::optimizable(
            TaskId::new(0),
            "Weekly",
            vec![PersonId::new(0), PersonId::new(1)],
            30,
        ))
        .unwrap();
        t.add_task(Task::optimizable(
            TaskId::new(1),
            "Focus",
            vec![PersonId::new(1)],
            60,
        ))
        .unwrap();
        t
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut t = sample_tables();
        let err = t
            .add_room(Room::new(RoomId::new(0), LocationId::new(1), 2))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateId { collection: "rooms", .. }));

        let err = t
            .add_location(Location::new(LocationId::new(1), "again"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateId { collection: "locations", .. }));
    }

    #[test]
    fn test_duplicate_distance_rejected() {
        let mut t = ProblemTables::new();
        t.add_distance(LocationId::new(0), LocationId::new(1), 10).unwrap();
        t.add_distance(LocationId::new(1), LocationId::new(0), 10).unwrap();
        let err = t
            .add_distance(LocationId::new(0), LocationId::new(1), 12)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateId { collection: "distances", .. }));
    }

    #[test]
    fn test_assemble_indices() {
        let data = ProblemData::assemble(sample_tables());

        assert_eq!(data.rooms_at(LocationId::new(0)), &[RoomId::new(0)]);
        assert_eq!(data.rooms_at(LocationId::new(1)), &[RoomId::new(1)]);
        assert_eq!(data.non_video_rooms(), &[RoomId::new(1)]);
        assert_eq!(data.meetings_of(PersonId::new(0)), &[TaskId::new(0)]);
        assert_eq!(
            data.meetings_of(PersonId::new(1)),
            &[TaskId::new(0), TaskId::new(1)]
        );
        assert_eq!(data.solo_tasks_of(PersonId::new(1)), &[TaskId::new(1)]);
        assert!(data.solo_tasks_of(PersonId::new(0)).is_empty());
        assert_eq!(data.home_location(PersonId::new(1)), Some(LocationId::new(1)));
        assert_eq!(data.location_ids(), vec![LocationId::new(0), LocationId::new(1)]);
    }

    #[test]
    fn test_unknown_ids_yield_empty() {
        let data = ProblemData::assemble(sample_tables());
        assert!(data.meetings_of(PersonId::new(99)).is_empty());
        assert!(data.rooms_at(LocationId::new(99)).is_empty());
        assert_eq!(data.home_location(PersonId::new(99)), None);
    }
}
