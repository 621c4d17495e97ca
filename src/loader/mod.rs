//! Domain loader.
//!
//! Reads the six record collections of an input document (`locations`,
//! `rooms`, `calendars`, `people`, `tasks`, `distances`) into
//! [`ProblemTables`], validates them, synthesizes placeholder tasks for
//! off-time and returns the indexed [`ProblemData`].
//!
//! A collection missing from the document is not an error: it counts as
//! zero records and is reported in [`LoadSummary::absent`].
//!
//! # Example
//! ```
//! let doc = r#"{
//!     "locations": [{"id": 0, "name": "HQ"}],
//!     "rooms": [{"id": 0, "name": "Crise", "locationId": 0, "capacity": 12, "visio": true}],
//!     "people": [{"id": 0, "name": "Ada", "workplaceId": 0, "calendars": []}],
//!     "tasks": [{"id": 0, "name": "Sync", "members": [0], "duration": 30, "after": 0}]
//! }"#;
//! let (problem, summary) = u_meeting::loader::load_str(doc).unwrap();
//! assert_eq!(problem.task_count(), 1);
//! assert_eq!(summary.absent, vec!["calendars", "distances"]);
//! ```

mod placeholder;
mod record;

use serde_json::{Map, Value};
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{
    Calendar, CalendarId, Location, LocationId, OffInterval, Person, PersonId, ProblemData,
    ProblemTables, Room, RoomId, Task, TaskId,
};
use crate::validation::validate_tables;

pub(crate) use placeholder::synthesize_placeholders;
use record::Record;

/// Per-collection record counts of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub locations: usize,
    pub rooms: usize,
    pub calendars: usize,
    pub people: usize,
    pub tasks: usize,
    /// Tasks synthesized from calendar off-intervals.
    pub placeholder_tasks: usize,
    pub distances: usize,
    /// Collections that were not present in the document.
    pub absent: Vec<&'static str>,
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} location(s)", self.locations)?;
        writeln!(f, "{} room(s)", self.rooms)?;
        writeln!(f, "{} calendar(s)", self.calendars)?;
        writeln!(f, "{} people", self.people)?;
        writeln!(f, "{} task(s)", self.tasks)?;
        writeln!(f, "{} placeholder task(s)", self.placeholder_tasks)?;
        write!(f, "{} distance(s)", self.distances)
    }
}

/// Loads a problem from a JSON string.
pub fn load_str(json: &str) -> Result<(ProblemData, LoadSummary)> {
    let value: Value = serde_json::from_str(json)?;
    load_value(&value)
}

/// Loads a problem from a JSON reader.
pub fn load_reader(reader: impl Read) -> Result<(ProblemData, LoadSummary)> {
    let value: Value = serde_json::from_reader(reader)?;
    load_value(&value)
}

/// Loads a problem from a JSON file.
pub fn load_path(path: impl AsRef<Path>) -> Result<(ProblemData, LoadSummary)> {
    let contents = std::fs::read_to_string(path)?;
    load_str(&contents)
}

/// Loads a problem from an already parsed JSON document.
pub fn load_value(document: &Value) -> Result<(ProblemData, LoadSummary)> {
    let root = document.as_object().ok_or_else(|| {
        Error::validation("document", "<root>", "<root>", "must be an object")
    })?;

    let mut tables = ProblemTables::new();
    let mut summary = LoadSummary::default();

    summary.locations = parse_collection(root, "locations", &mut summary.absent, |rec| {
        parse_location(rec, &mut tables)
    })?;
    summary.rooms = parse_collection(root, "rooms", &mut summary.absent, |rec| {
        parse_room(rec, &mut tables)
    })?;
    summary.calendars = parse_collection(root, "calendars", &mut summary.absent, |rec| {
        parse_calendar(rec, &mut tables)
    })?;
    summary.people = parse_collection(root, "people", &mut summary.absent, |rec| {
        parse_person(rec, &mut tables)
    })?;
    summary.tasks = parse_collection(root, "tasks", &mut summary.absent, |rec| {
        parse_task(rec, &mut tables)
    })?;
    summary.distances = parse_collection(root, "distances", &mut summary.absent, |rec| {
        parse_distance(rec, &mut tables)
    })?;

    let (problem, placeholders) = finish(tables)?;
    summary.placeholder_tasks = placeholders;

    info!(
        event = "load_end",
        locations = summary.locations,
        rooms = summary.rooms,
        calendars = summary.calendars,
        people = summary.people,
        tasks = summary.tasks,
        placeholder_tasks = summary.placeholder_tasks,
        distances = summary.distances,
    );
    Ok((problem, summary))
}

/// Validates the tables, adds placeholder tasks and indexes the result.
///
/// Returns the problem and the number of placeholders synthesized.
pub(crate) fn finish(mut tables: ProblemTables) -> Result<(ProblemData, usize)> {
    if let Err(errors) = validate_tables(&tables) {
        for e in &errors {
            warn!(event = "invalid_record", error = %e);
        }
        // validate_tables never returns an empty error list
        return Err(errors
            .into_iter()
            .next()
            .unwrap_or_else(|| Error::Configuration("validation failed".into())));
    }
    let placeholders = synthesize_placeholders(&mut tables)?;
    Ok((ProblemData::assemble(tables), placeholders))
}

fn parse_collection<F>(
    root: &Map<String, Value>,
    key: &'static str,
    absent: &mut Vec<&'static str>,
    mut parse: F,
) -> Result<usize>
where
    F: FnMut(Record<'_>) -> Result<()>,
{
    let Some(value) = root.get(key) else {
        warn!(event = "collection_absent", collection = key);
        absent.push(key);
        return Ok(0);
    };
    let items = value.as_array().ok_or_else(|| {
        Error::validation(key, "<collection>", key, "must be an array")
    })?;
    for (position, item) in items.iter().enumerate() {
        parse(Record::new(key, position, item)?)?;
    }
    Ok(items.len())
}

fn parse_location(mut rec: Record<'_>, tables: &mut ProblemTables) -> Result<()> {
    let id = LocationId::new(rec.identify()?);
    let name = rec.string("name")?;
    debug!(event = "location", id = %id, name = %name);
    tables.add_location(Location::new(id, name))
}

fn parse_room(mut rec: Record<'_>, tables: &mut ProblemTables) -> Result<()> {
    let id = RoomId::new(rec.identify()?);
    let room = Room::new(
        id,
        LocationId::new(rec.int("locationId")?),
        rec.int("capacity")?,
    )
    .with_name(rec.string("name")?)
    .with_video(rec.boolean("visio")?);
    debug!(
        event = "room",
        id = %id,
        location = %room.location,
        capacity = room.capacity,
        video = room.video,
    );
    tables.add_room(room)
}

fn parse_calendar(mut rec: Record<'_>, tables: &mut ProblemTables) -> Result<()> {
    let id = CalendarId::new(rec.identify()?);
    let mut calendar = Calendar::new(id, rec.string("name")?);
    calendar.fixed = rec.opt_int_list("fixed")?;
    let pauses = rec.opt_array("pauses")?.len();

    for (position, off) in rec.array("offs")?.iter().enumerate() {
        let off = off
            .as_object()
            .ok_or_else(|| rec.error("offs", format!("entry {position} must be an object")))?;
        let field = |name: &str| {
            off.get(name).and_then(Value::as_i64).ok_or_else(|| {
                rec.error("offs", format!("entry {position} needs integer `{name}`"))
            })
        };
        calendar
            .offs
            .push(OffInterval::new(field("start")?, field("duration")?));
    }

    debug!(
        event = "calendar",
        id = %id,
        fixed = calendar.fixed.len(),
        pauses,
        offs = calendar.offs.len(),
    );
    tables.add_calendar(calendar)
}

fn parse_person(mut rec: Record<'_>, tables: &mut ProblemTables) -> Result<()> {
    let id = PersonId::new(rec.identify()?);
    let mut person = Person::new(id, rec.string("name")?, RoomId::new(rec.int("workplaceId")?));
    person.calendars = rec
        .int_list("calendars")?
        .into_iter()
        .map(CalendarId::new)
        .collect();
    debug!(
        event = "person",
        id = %id,
        workplace = %person.workplace,
        calendars = person.calendars.len(),
    );
    tables.add_person(person)
}

fn parse_task(mut rec: Record<'_>, tables: &mut ProblemTables) -> Result<()> {
    let id = TaskId::new(rec.identify()?);
    let name = rec.string("name")?;
    let members: Vec<PersonId> = rec
        .int_list("members")?
        .into_iter()
        .map(PersonId::new)
        .collect();
    let duration = rec.int("duration")?;

    let task = if rec.has("start") {
        if rec.has("after") {
            return Err(rec.error("after", "is not allowed on a task with a fixed start"));
        }
        Task::fixed(
            id,
            name,
            members,
            duration,
            rec.int("start")?,
            LocationId::new(rec.int("location")?),
            RoomId::new(rec.int("room")?),
        )
    } else {
        let task = Task::optimizable(id, name, members, duration);
        match rec.opt_int("after")? {
            Some(bound) => task.with_earliest_start(bound),
            None => task,
        }
    };

    debug!(
        event = "task",
        id = %id,
        fixed = task.is_fixed(),
        duration = task.duration,
        members = task.members.len(),
    );
    tables.add_task(task)
}

fn parse_distance(rec: Record<'_>, tables: &mut ProblemTables) -> Result<()> {
    let from = LocationId::new(rec.int("id1")?);
    let to = LocationId::new(rec.int("id2")?);
    let time = rec.int("time")?;
    if from == to {
        warn!(event = "self_distance_ignored", location = %from, time);
        return Ok(());
    }
    tables.add_distance(from, to, time)
}
