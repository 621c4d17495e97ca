//! Meeting scheduling as a constraint model.
//!
//! Reads sites, rooms, people, calendars, meetings and inter-site travel
//! times, validates them, and builds a constraint programming model whose
//! solutions are valid meeting schedules. Solving is delegated to any
//! [`engine::CpSolver`] implementation.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Location`, `Room`, `Person`, `Calendar`,
//!   `Task`, `ProblemData`, `Schedule`
//! - **`loader`**: JSON input document to `ProblemData`, with placeholder
//!   tasks for personal off-time
//! - **`validation`**: Input integrity checks (dangling references, bad values)
//! - **`travel`**: Travel-time oracle between sites
//! - **`engine`**: CP modeling layer and assignment checker
//! - **`cp`**: Meeting model builder and schedule decoding
//! - **`config`**: Horizon and solver settings, loadable from TOML
//!
//! # Example
//!
//! ```no_run
//! use u_meeting::config::MeetingConfig;
//! use u_meeting::cp::MeetingCpBuilder;
//!
//! let config = MeetingConfig::load("meetings.toml")?;
//! let (problem, summary) = u_meeting::loader::load_path("meetings.json")?;
//! println!("{summary}");
//!
//! let built = MeetingCpBuilder::from_config(&problem, &config)?.build()?;
//! println!("{} constraints", built.model().constraint_count());
//! # Ok::<(), u_meeting::Error>(())
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

pub mod config;
pub mod cp;
pub mod engine;
pub mod error;
pub mod loader;
pub mod models;
pub mod travel;
pub mod validation;

pub use error::{Error, Result};
