//! CP-based meeting formulation.
//!
//! Translates a validated [`ProblemData`] into a [`CpModel`]: one interval
//! per task, a location choice per participant, room booleans, and per-person
//! travel chains. Nothing is solved here; the model is handed to any
//! [`CpSolver`].
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

mod vars;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{Horizon, MeetingConfig};
use crate::engine::{
    CpModel, CpSolution, CpSolver, Domain, IntExpr, IntVar, PairTable, SolverConfig,
    SolverStatus,
};
use crate::error::{Error, Result};
use crate::models::{LocationId, MeetingAssignment, ProblemData, Schedule, Task, TaskId};

pub use vars::{MeetingVars, PersonTask, RoomTask, SiteBounds, TaskLocation, TravelChain};

/// Builds a CP model from a meeting problem.
///
/// # Example
/// ```
/// use serde_json::json;
/// use u_meeting::config::Horizon;
/// use u_meeting::cp::MeetingCpBuilder;
///
/// let (problem, _) = u_meeting::loader::load_value(&json!({
///     "locations": [{"id": 0, "name": "HQ"}],
///     "rooms": [{"id": 0, "name": "Main", "locationId": 0, "capacity": 4, "visio": true}],
///     "people": [
///         {"id": 1, "name": "Ada", "workplaceId": 0, "calendars": []},
///         {"id": 2, "name": "Bob", "workplaceId": 0, "calendars": []}
///     ],
///     "tasks": [{"id": 7, "name": "Sync", "members": [1, 2], "duration": 30, "after": 0}]
/// })).unwrap();
///
/// let built = MeetingCpBuilder::new(&problem, Horizon::new(0, 100))
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(built.model().interval_count(), 1);
/// assert!(built.model().validate().is_ok());
/// ```
pub struct MeetingCpBuilder<'a> {
    problem: &'a ProblemData,
    horizon: Horizon,
    name: String,
}

impl<'a> MeetingCpBuilder<'a> {
    /// Creates a builder over `problem`. Fails on an invalid horizon.
    pub fn new(problem: &'a ProblemData, horizon: Horizon) -> Result<Self> {
        horizon.validate()?;
        Ok(Self {
            problem,
            horizon,
            name: "meetings".to_string(),
        })
    }

    /// Creates a builder using the horizon and model name of `config`.
    pub fn from_config(problem: &'a ProblemData, config: &MeetingConfig) -> Result<Self> {
        Ok(Self::new(problem, config.horizon)?.with_name(config.model_name.clone()))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Builds the model.
    ///
    /// Every travel time the chains may need is resolved before any
    /// variable is created, so a missing pair fails with
    /// [`Error::MissingTravelTime`] and no partial model.
    pub fn build(&self) -> Result<MeetingModel> {
        if self.problem.task_count() > 0 && self.problem.location_count() == 0 {
            return Err(Error::Configuration(
                "tasks are defined but no location exists".to_string(),
            ));
        }
        let travel = Arc::new(self.travel_table()?);

        let mut state = BuildState {
            problem: self.problem,
            horizon: self.horizon,
            model: CpModel::new(self.name.clone()),
            vars: MeetingVars::default(),
            travel,
        };

        state.post_task_intervals();
        state.post_earliest_starts();
        state.post_headcounts();
        state.post_location_choices();
        state.post_counting();
        state.post_room_booleans();
        state.post_room_capacity();
        state.post_room_exclusivity();
        state.post_multisite();
        state.post_video_requirement();
        state.post_travel_chains();
        // Not modelled: non-working calendar windows, keeping meetings out of
        // a non-participant's dedicated room, and single-participant task
        // handling.

        let BuildState { model, vars, .. } = state;
        info!(
            event = "build_end",
            model = model.name(),
            variables = model.int_var_count(),
            intervals = model.interval_count(),
            constraints = model.constraint_count(),
            chains = vars.chains.len(),
        );
        Ok(MeetingModel { model, vars })
    }

    /// Travel times for every ordered location pair two distinct meetings of
    /// one person can occupy, plus zero on the diagonal.
    fn travel_table(&self) -> Result<PairTable> {
        let problem = self.problem;
        let all: Vec<LocationId> = problem.location_ids();

        let mut pairs = BTreeSet::new();
        for person in problem.people() {
            let meetings = problem.meetings_of(person.id);
            if meetings.len() < 2 {
                continue;
            }
            for &t1 in meetings {
                for &t2 in meetings {
                    if t1 == t2 {
                        continue;
                    }
                    let (Some(a), Some(b)) = (problem.task(t1), problem.task(t2)) else {
                        continue;
                    };
                    for from in candidate_locations(a, &all) {
                        for to in candidate_locations(b, &all) {
                            if from != to {
                                pairs.insert((from, to));
                            }
                        }
                    }
                }
            }
        }

        let mut table = PairTable::new("travel");
        for location in &all {
            table.insert(location.raw(), location.raw(), 0);
        }
        for (from, to) in pairs {
            let time = problem.travel().lookup(from, to)?;
            table.insert(from.raw(), to.raw(), time);
        }
        debug!(event = "travel_table", entries = table.len());
        Ok(table)
    }
}

/// Locations a participant of `task` may attend from.
fn candidate_locations(task: &Task, all: &[LocationId]) -> Vec<LocationId> {
    match task.fixed_location() {
        Some(location) => vec![location],
        None => all.to_vec(),
    }
}

/// Model under construction.
struct BuildState<'a> {
    problem: &'a ProblemData,
    horizon: Horizon,
    model: CpModel,
    vars: MeetingVars,
    travel: Arc<PairTable>,
}

impl BuildState<'_> {
    fn phase_done(&self, phase: &'static str) {
        debug!(
            event = "phase",
            phase,
            variables = self.model.int_var_count(),
            constraints = self.model.constraint_count(),
        );
    }

    fn location_values(&self) -> Vec<i64> {
        self.problem.locations().map(|l| l.id.raw()).collect()
    }

    fn task_start(&self, task: TaskId) -> IntExpr {
        self.vars
            .interval(task)
            .and_then(|iv| self.model.interval(iv))
            .map_or(IntExpr::Constant(0), |def| def.start_expr())
    }

    fn post_task_intervals(&mut self) {
        let Horizon { min, max } = self.horizon;
        for task in self.problem.tasks() {
            let interval = match task.fixed_start() {
                Some(start) => {
                    self.model
                        .new_fixed_interval(start, task.duration, format!("task[{}]", task.id))
                }
                None => {
                    let start = self.model.new_int_var(min, max, format!("start[{}]", task.id));
                    self.model.add_less_or_equal(
                        IntExpr::sum([IntExpr::from(start), IntExpr::Constant(task.duration)]),
                        max,
                    );
                    self.vars.starts.insert(task.id, start);
                    self.model.new_fixed_duration_interval(
                        start,
                        task.duration,
                        format!("task[{}]", task.id),
                    )
                }
            };
            self.vars.intervals.insert(task.id, interval);
        }
        self.phase_done("task_intervals");
    }

    fn post_earliest_starts(&mut self) {
        for task in self.problem.tasks() {
            let (Some(bound), Some(start)) = (task.earliest_start(), self.vars.start(task.id))
            else {
                continue;
            };
            self.model
                .add_less_or_equal(IntExpr::difference(bound, start), 0i64);
        }
        self.phase_done("earliest_starts");
    }

    fn post_headcounts(&mut self) {
        let people = self.problem.person_count() as i64;
        for task in self.problem.tasks() {
            for location in self.problem.location_ids() {
                let var = self
                    .model
                    .new_int_var(0, people, format!("e[{},{}]", task.id, location));
                self.vars.headcounts.insert(
                    TaskLocation {
                        task: task.id,
                        location,
                    },
                    var,
                );
            }
        }
        self.phase_done("headcounts");
    }

    fn post_location_choices(&mut self) {
        let all = self.location_values();
        for task in self.problem.tasks() {
            let domain = match task.fixed_location() {
                Some(location) => Domain::singleton(location.raw()),
                None => Domain::values(all.iter().copied()),
            };
            for &person in &task.members {
                let var = self
                    .model
                    .new_int_var_in(domain.clone(), format!("l[{},{}]", person, task.id));
                self.vars
                    .locations
                    .insert(PersonTask { person, task: task.id }, var);
            }
        }
        self.phase_done("location_choices");
    }

    fn post_counting(&mut self) {
        for task in self.problem.tasks() {
            let choices: Vec<IntVar> = self
                .vars
                .locations_of_task(task.id)
                .into_iter()
                .map(|(_, v)| v)
                .collect();
            for location in self.problem.location_ids() {
                if let Some(count) = self.vars.headcount(task.id, location) {
                    self.model.add_count(choices.clone(), location.raw(), count);
                }
            }
        }
        self.phase_done("counting");
    }

    fn post_room_booleans(&mut self) {
        for task in self.problem.tasks() {
            for room in self.problem.rooms() {
                let var = self
                    .model
                    .new_bool_var(format!("a[{},{}]", room.id, task.id));
                self.vars.rooms.insert(
                    RoomTask {
                        room: room.id,
                        task: task.id,
                    },
                    var,
                );
            }
        }
        self.phase_done("room_booleans");
    }

    /// At most one room per location, large enough for everyone there.
    fn post_room_capacity(&mut self) {
        for task in self.problem.tasks() {
            for location in self.problem.location_ids() {
                let Some(headcount) = self.vars.headcount(task.id, location) else {
                    continue;
                };
                let mut booleans = Vec::new();
                let mut capacities = Vec::new();
                for &room in self.problem.rooms_at(location) {
                    let (Some(var), Some(r)) =
                        (self.vars.room(room, task.id), self.problem.room(room))
                    else {
                        continue;
                    };
                    booleans.push(var.as_int());
                    capacities.push(r.capacity);
                }
                self.model.add_sum_less_or_equal(booleans.clone(), 1);

                booleans.push(headcount);
                capacities.push(-1);
                self.model
                    .add_scal_prod_greater_or_equal(booleans, capacities, 0);
            }
        }
        self.phase_done("room_capacity");
    }

    fn post_room_exclusivity(&mut self) {
        for room in self.problem.rooms() {
            let mut intervals = Vec::new();
            let mut demands = Vec::new();
            for task in self.problem.tasks() {
                if let (Some(iv), Some(a)) =
                    (self.vars.interval(task.id), self.vars.room(room.id, task.id))
                {
                    intervals.push(iv);
                    demands.push(a.as_int());
                }
            }
            self.model
                .add_cumulative(intervals, demands, 1, format!("room[{}]", room.id));
        }
        self.phase_done("room_exclusivity");
    }

    fn post_multisite(&mut self) {
        let all = self.location_values();
        for task in self.problem.tasks() {
            let choices: Vec<IntVar> = self
                .vars
                .locations_of_task(task.id)
                .into_iter()
                .map(|(_, v)| v)
                .collect();
            if choices.is_empty() {
                continue;
            }
            let lowest = self
                .model
                .new_int_var_in(Domain::values(all.iter().copied()), format!("lowest[{}]", task.id));
            let highest = self.model.new_int_var_in(
                Domain::values(all.iter().copied()),
                format!("highest[{}]", task.id),
            );
            let multisite = self.model.new_bool_var(format!("multisite[{}]", task.id));
            self.model.add_min_equality(choices.clone(), lowest);
            self.model.add_max_equality(choices, highest);
            self.model.add_is_different(lowest, highest, multisite);
            self.vars.sites.insert(
                task.id,
                SiteBounds {
                    lowest,
                    highest,
                    multisite,
                },
            );
        }
        self.phase_done("multisite");
    }

    /// A multisite meeting may only use video rooms.
    fn post_video_requirement(&mut self) {
        let non_video = self.problem.non_video_rooms();
        if non_video.is_empty() {
            return;
        }
        for task in self.problem.tasks() {
            let Some(site) = self.vars.site(task.id) else {
                continue;
            };
            let used = IntExpr::sum(
                non_video
                    .iter()
                    .filter_map(|&room| self.vars.room(room, task.id))
                    .map(IntExpr::from),
            );
            self.model
                .add_equality(IntExpr::product(site.multisite, used), 0i64);
        }
        self.phase_done("video_requirement");
    }

    /// Orders each person's meetings by start and leaves room for travel
    /// between consecutive ones.
    fn post_travel_chains(&mut self) {
        let people: Vec<_> = self.problem.people().map(|p| p.id).collect();
        for person in people {
            let meetings = self.problem.meetings_of(person).to_vec();
            let n = meetings.len();
            if n < 2 {
                continue;
            }

            let mut starts = Vec::with_capacity(n);
            let mut durations = Vec::with_capacity(n);
            let mut sites = Vec::with_capacity(n);
            let (mut lo, mut hi) = (self.horizon.min, self.horizon.max);
            for &id in &meetings {
                let Some(task) = self.problem.task(id) else {
                    continue;
                };
                if let Some(start) = task.fixed_start() {
                    lo = lo.min(start);
                    hi = hi.max(start);
                }
                starts.push(self.task_start(id));
                durations.push(IntExpr::Constant(task.duration));
                sites.push(
                    self.vars
                        .location(person, id)
                        .map_or(IntExpr::Constant(0), IntExpr::from),
                );
            }

            let sorted: Vec<IntVar> = (0..n)
                .map(|q| {
                    self.model
                        .new_int_var(lo, hi, format!("sorted[{person}][{q}]"))
                })
                .collect();
            let order: Vec<IntVar> = (0..n)
                .map(|q| {
                    self.model
                        .new_int_var(0, n as i64 - 1, format!("order[{person}][{q}]"))
                })
                .collect();

            self.model.add_sorting(starts.clone(), sorted.clone());
            self.model.add_all_different(order.clone());
            for q in 0..n {
                self.model
                    .add_equality(IntExpr::element(starts.clone(), order[q]), sorted[q]);
            }
            for q in 0..n - 1 {
                let finish = IntExpr::sum([
                    sorted[q].into(),
                    IntExpr::element(durations.clone(), order[q]),
                ]);
                let travel = IntExpr::lookup(
                    Arc::clone(&self.travel),
                    IntExpr::element(sites.clone(), order[q]),
                    IntExpr::element(sites.clone(), order[q + 1]),
                );
                self.model
                    .add_less_or_equal(IntExpr::sum([finish, travel]), sorted[q + 1]);
            }

            self.vars.chains.push(TravelChain {
                person,
                meetings,
                sorted_starts: sorted,
                order,
            });
        }
        self.phase_done("travel_chains");
    }
}

/// A built model together with the handles of its variables.
#[derive(Debug, Clone)]
pub struct MeetingModel {
    model: CpModel,
    vars: MeetingVars,
}

impl MeetingModel {
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    pub fn vars(&self) -> &MeetingVars {
        &self.vars
    }

    pub fn into_parts(self) -> (CpModel, MeetingVars) {
        (self.model, self.vars)
    }

    /// Solves the model and decodes the result.
    ///
    /// An invalid model is not handed to the solver and yields an empty
    /// schedule with [`SolverStatus::ModelInvalid`].
    pub fn solve<S: CpSolver>(
        &self,
        problem: &ProblemData,
        solver: &S,
        config: &SolverConfig,
    ) -> (Schedule, CpSolution) {
        if let Err(reason) = self.model.validate() {
            debug!(event = "model_invalid", reason = %reason);
            return (Schedule::new(), CpSolution::empty(SolverStatus::ModelInvalid));
        }
        let solution = solver.solve(&self.model, config);
        info!(
            event = "solve_end",
            status = ?solution.status,
            solve_time_ms = solution.solve_time_ms,
        );
        let schedule = self.decode(problem, &solution);
        (schedule, solution)
    }

    /// Decodes a CP solution into a Schedule.
    ///
    /// Tasks whose start has no value are left out.
    pub fn decode(&self, problem: &ProblemData, solution: &CpSolution) -> Schedule {
        let mut schedule = Schedule::new();

        if !solution.is_solution_found() {
            return schedule;
        }

        for task in problem.tasks() {
            let Some(iv) = self.vars.interval(task.id) else {
                continue;
            };
            let Ok((start, end)) = self.model.interval_bounds(iv, solution) else {
                continue;
            };

            let rooms = self
                .vars
                .rooms_of_task(task.id)
                .into_iter()
                .filter(|(_, a)| solution.bool_value(*a) == Some(true))
                .map(|(room, _)| room)
                .collect();
            let locations: BTreeMap<_, _> = self
                .vars
                .locations_of_task(task.id)
                .into_iter()
                .filter_map(|(person, l)| Some((person, LocationId::new(solution.value(l)?))))
                .collect();
            let multisite = self
                .vars
                .site(task.id)
                .and_then(|s| solution.bool_value(s.multisite))
                .unwrap_or(false);

            schedule.add_assignment(MeetingAssignment {
                task_id: task.id,
                start,
                end,
                rooms,
                locations,
                multisite,
            });
        }

        schedule
    }
}
