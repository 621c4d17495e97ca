//! Meeting scheduling domain models.
//!
//! Provides the entities read from the input document and the schedule
//! produced from a solver answer.
//!
//! | Entity | Role |
//! |--------|------|
//! | `Location` | Site; owns rooms |
//! | `Room` | Seats + optional video equipment |
//! | `Person` | Participant with a workplace room and calendars |
//! | `Calendar` | Off-intervals shared by people |
//! | `Task` | Meeting: optimizable or fixed |
//! | `Schedule` | Decoded solver answer |

mod calendar;
mod ids;
mod location;
mod person;
mod problem;
mod schedule;
mod task;

pub use calendar::{Calendar, OffInterval};
pub use ids::{CalendarId, LocationId, PersonId, RoomId, TaskId, TaskIdAllocator};
pub use location::{Location, Room};
pub use person::Person;
pub use problem::{ProblemData, ProblemTables};
pub use schedule::{MeetingAssignment, Schedule};
pub use task::{Task, TaskKind, TaskOrigin};
