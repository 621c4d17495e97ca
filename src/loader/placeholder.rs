//! Placeholder tasks for personal off-time.
//!
//! Each off-interval of each calendar a person holds becomes a fixed,
//! zero-duration, single-participant task at the person's workplace room.
//! Later phases then treat off-time like any other fixed meeting.

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ProblemTables, Task, TaskIdAllocator, TaskOrigin};

/// Appends one placeholder task per (person, calendar, off-interval).
///
/// Calendar `fixed` blocks produce no tasks. Must run after validation:
/// workplace rooms and calendars are assumed to resolve. Returns the number
/// of tasks added, or a `Validation` error on the highest task id when no
/// id above it is left for a placeholder.
pub(crate) fn synthesize_placeholders(tables: &mut ProblemTables) -> Result<usize> {
    let mut ids = TaskIdAllocator::above(tables.tasks.keys().copied());
    let mut created = Vec::new();

    for person in tables.people.values() {
        let Some(room) = tables.rooms.get(&person.workplace) else {
            continue;
        };
        for calendar_id in &person.calendars {
            let Some(calendar) = tables.calendars.get(calendar_id) else {
                continue;
            };
            for off in &calendar.offs {
                let Some(id) = ids.allocate() else {
                    let record = tables
                        .tasks
                        .keys()
                        .next_back()
                        .map_or_else(String::new, |id| format!("id {id}"));
                    return Err(Error::validation(
                        "tasks",
                        record,
                        "id",
                        "leaves no room above it for placeholder task ids",
                    ));
                };
                let task = Task::fixed(
                    id,
                    format!("{} off ({})", person.name, calendar.name),
                    vec![person.id],
                    0,
                    off.start,
                    room.location,
                    room.id,
                )
                .with_origin(TaskOrigin::Placeholder {
                    person: person.id,
                    calendar: calendar.id,
                });
                debug!(
                    event = "placeholder",
                    task = %id,
                    person = %person.id,
                    start = off.start,
                );
                created.push(task);
            }
        }
    }

    let count = created.len();
    for task in created {
        tables.tasks.insert(task.id, task);
    }
    Ok(count)
}
