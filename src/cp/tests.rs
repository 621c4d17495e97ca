use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use super::*;
use crate::engine::{IntervalStart, ViolationSource};
use crate::loader::load_value;
use crate::models::{PersonId, RoomId};

fn load(doc: Value) -> ProblemData {
    load_value(&doc).unwrap().0
}

fn build(problem: &ProblemData, min: i64, max: i64) -> MeetingModel {
    let built = MeetingCpBuilder::new(problem, Horizon::new(min, max))
        .unwrap()
        .build()
        .unwrap();
    assert!(built.model().validate().is_ok());
    built
}

/// Primary decisions of a candidate schedule. Anything left out gets a
/// default: horizon start, the person's home site, the first room at each
/// occupied site.
#[derive(Default)]
struct Plan {
    starts: BTreeMap<TaskId, i64>,
    locations: BTreeMap<(PersonId, TaskId), LocationId>,
    rooms: BTreeMap<TaskId, Vec<RoomId>>,
}

impl Plan {
    fn start(mut self, task: i64, at: i64) -> Self {
        self.starts.insert(TaskId::new(task), at);
        self
    }

    fn at(mut self, person: i64, task: i64, location: i64) -> Self {
        self.locations
            .insert((PersonId::new(person), TaskId::new(task)), LocationId::new(location));
        self
    }

    fn rooms(mut self, task: i64, rooms: &[i64]) -> Self {
        self.rooms
            .insert(TaskId::new(task), rooms.iter().map(|&r| RoomId::new(r)).collect());
        self
    }
}

/// Derives every auxiliary variable from the plan.
fn complete(problem: &ProblemData, built: &MeetingModel, plan: &Plan) -> CpSolution {
    let vars = built.vars();
    let model = built.model();
    let mut s = CpSolution::empty(SolverStatus::Feasible);
    let mut start_of = BTreeMap::new();

    for task in problem.tasks() {
        let start = match (task.fixed_start(), vars.start(task.id)) {
            (Some(start), _) => start,
            (None, Some(var)) => {
                let start = plan.starts.get(&task.id).copied().unwrap_or_else(|| {
                    model.int_var(var).unwrap().domain.min().unwrap()
                });
                s.set(var, start);
                start
            }
            (None, None) => panic!("task {} has no start", task.id),
        };
        start_of.insert(task.id, start);

        let mut chosen = BTreeMap::new();
        for &person in &task.members {
            let location = task
                .fixed_location()
                .or_else(|| plan.locations.get(&(person, task.id)).copied())
                .or_else(|| problem.home_location(person))
                .unwrap();
            s.set(vars.location(person, task.id).unwrap(), location.raw());
            chosen.insert(person, location);
        }
        for location in problem.location_ids() {
            let n = chosen.values().filter(|l| **l == location).count() as i64;
            s.set(vars.headcount(task.id, location).unwrap(), n);
        }

        let rooms = match (plan.rooms.get(&task.id), task.fixed_room()) {
            (Some(rooms), _) => rooms.clone(),
            (None, Some(room)) => vec![room],
            (None, None) => chosen
                .values()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .filter_map(|l| problem.rooms_at(*l).first().copied())
                .collect(),
        };
        for (room, a) in vars.rooms_of_task(task.id) {
            s.set_bool(a, rooms.contains(&room));
        }

        if let Some(site) = vars.site(task.id) {
            let lowest = chosen.values().min().unwrap().raw();
            let highest = chosen.values().max().unwrap().raw();
            s.set(site.lowest, lowest);
            s.set(site.highest, highest);
            s.set_bool(site.multisite, lowest != highest);
        }
    }

    for chain in vars.chains() {
        let starts: Vec<i64> = chain.meetings.iter().map(|t| start_of[t]).collect();
        let mut order: Vec<usize> = (0..chain.len()).collect();
        order.sort_by_key(|&i| (starts[i], i));
        for (q, &i) in order.iter().enumerate() {
            s.set(chain.order[q], i as i64);
            s.set(chain.sorted_starts[q], starts[i]);
        }
    }
    s
}

fn violated(built: &MeetingModel, solution: &CpSolution) -> Vec<&'static str> {
    match built.model().check(solution) {
        Ok(()) => Vec::new(),
        Err(violations) => violations.iter().map(|v| v.kind).collect(),
    }
}

fn single_site() -> Value {
    json!({
        "locations": [{"id": 0, "name": "HQ"}],
        "rooms": [{"id": 0, "name": "Main", "locationId": 0, "capacity": 4, "visio": true}],
        "people": [
            {"id": 1, "name": "Ada", "workplaceId": 0, "calendars": []},
            {"id": 2, "name": "Bob", "workplaceId": 0, "calendars": []}
        ],
        "tasks": [{"id": 7, "name": "Sync", "members": [1, 2], "duration": 30, "after": 0}]
    })
}

fn two_sites(b_start: i64, distances: Value) -> Value {
    json!({
        "locations": [{"id": 1, "name": "North"}, {"id": 2, "name": "South"}],
        "rooms": [
            {"id": 10, "name": "N1", "locationId": 1, "capacity": 2, "visio": false},
            {"id": 20, "name": "S1", "locationId": 2, "capacity": 2, "visio": false}
        ],
        "people": [{"id": 1, "name": "Ada", "workplaceId": 10, "calendars": []}],
        "tasks": [
            {"id": 1, "name": "A", "members": [1], "duration": 30,
             "start": 70, "location": 1, "room": 10},
            {"id": 2, "name": "B", "members": [1], "duration": 30,
             "start": b_start, "location": 2, "room": 20}
        ],
        "distances": distances
    })
}

fn both_ways(time: i64) -> Value {
    json!([{"id1": 1, "id2": 2, "time": time}, {"id1": 2, "id2": 1, "time": time}])
}

#[test]
fn test_single_site_meeting_window() {
    let problem = load(single_site());
    let built = build(&problem, 0, 100);
    let task = TaskId::new(7);

    assert_eq!(built.model().interval_count(), 1);
    assert!(built.vars().start(task).is_some());
    assert!(built.vars().chains().is_empty());

    for start in [0, 35, 70] {
        let s = complete(&problem, &built, &Plan::default().start(7, start));
        assert!(violated(&built, &s).is_empty(), "start {start} rejected");
    }
    let s = complete(&problem, &built, &Plan::default().start(7, 71));
    assert_eq!(violated(&built, &s), vec!["less_or_equal"]);
}

#[test]
fn test_headcount_matches_participants() {
    let problem = load(single_site());
    let built = build(&problem, 0, 100);
    let task = TaskId::new(7);
    let headcount = built.vars().headcount(task, LocationId::new(0)).unwrap();
    let site = built.vars().site(task).unwrap();

    let mut s = complete(&problem, &built, &Plan::default());
    assert_eq!(s.value(headcount), Some(2));
    assert_eq!(s.bool_value(site.multisite), Some(false));

    s.set(headcount, 1);
    assert!(violated(&built, &s).contains(&"count"));
}

#[test]
fn test_meeting_needs_a_room() {
    let problem = load(single_site());
    let built = build(&problem, 0, 100);

    let s = complete(&problem, &built, &Plan::default().rooms(7, &[]));
    assert_eq!(violated(&built, &s), vec!["scal_prod_greater_or_equal"]);
}

#[test]
fn test_room_too_small() {
    let mut doc = single_site();
    doc["rooms"][0]["capacity"] = json!(1);
    let problem = load(doc);
    let built = build(&problem, 0, 100);

    let s = complete(&problem, &built, &Plan::default());
    assert_eq!(violated(&built, &s), vec!["scal_prod_greater_or_equal"]);
}

#[test]
fn test_earliest_start() {
    let mut doc = single_site();
    doc["tasks"][0]["after"] = json!(40);
    let problem = load(doc);
    let built = build(&problem, 0, 100);

    let s = complete(&problem, &built, &Plan::default().start(7, 39));
    assert_eq!(violated(&built, &s), vec!["less_or_equal"]);
    let s = complete(&problem, &built, &Plan::default().start(7, 40));
    assert!(violated(&built, &s).is_empty());
}

#[test]
fn test_travel_between_sites() {
    let problem = load(two_sites(120, both_ways(60)));
    let built = build(&problem, 0, 1000);
    let chain = built.vars().chain(PersonId::new(1)).unwrap();
    assert_eq!(chain.meetings, vec![TaskId::new(1), TaskId::new(2)]);

    // 70 + 30 + 60 = 160 > 120
    let s = complete(&problem, &built, &Plan::default());
    assert_eq!(violated(&built, &s), vec!["less_or_equal"]);

    let problem = load(two_sites(160, both_ways(60)));
    let built = build(&problem, 0, 1000);
    let s = complete(&problem, &built, &Plan::default());
    assert!(violated(&built, &s).is_empty());
}

#[test]
fn test_travel_follows_chosen_sites() {
    let mut doc = two_sites(0, both_ways(60));
    doc["tasks"] = json!([
        {"id": 1, "name": "A", "members": [1], "duration": 30},
        {"id": 2, "name": "B", "members": [1], "duration": 30}
    ]);
    let problem = load(doc);
    let built = build(&problem, 0, 1000);
    assert_eq!(built.vars().chains().len(), 1);

    // B at North from 0 to 30, then 60 minutes to reach A at South.
    let plan = |a: i64| Plan::default().start(2, 0).at(1, 2, 1).start(1, a).at(1, 1, 2);
    let s = complete(&problem, &built, &plan(80));
    assert_eq!(violated(&built, &s), vec!["less_or_equal"]);
    let s = complete(&problem, &built, &plan(90));
    assert!(violated(&built, &s).is_empty());

    // Same order, sites swapped.
    let swapped = |a: i64| Plan::default().start(2, 0).at(1, 2, 2).start(1, a).at(1, 1, 1);
    let s = complete(&problem, &built, &swapped(80));
    assert_eq!(violated(&built, &s), vec!["less_or_equal"]);
    let s = complete(&problem, &built, &swapped(90));
    assert!(violated(&built, &s).is_empty());

    // Both at North: no travel needed.
    let s = complete(&problem, &built, &Plan::default().start(2, 0).start(1, 30));
    assert!(violated(&built, &s).is_empty());
}

#[test]
fn test_huge_start_is_reported() {
    let problem = load(single_site());
    let built = build(&problem, 0, 100);
    let start = built.vars().start(TaskId::new(7)).unwrap();

    let mut s = complete(&problem, &built, &Plan::default());
    s.set(start, i64::MAX);
    let violations = built.model().check(&s).unwrap_err();
    assert_eq!(violations[0].source, ViolationSource::Domain(start));
    assert!(violations.iter().any(|v| v.message.contains("overflow")));
}

#[test]
fn test_missing_travel_pair() {
    let problem = load(two_sites(
        160,
        json!([{"id1": 2, "id2": 1, "time": 60}]),
    ));
    let err = MeetingCpBuilder::new(&problem, Horizon::new(0, 1000))
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingTravelTime { from, to }
            if from == LocationId::new(1) && to == LocationId::new(2)
    ));
}

#[test]
fn test_same_site_needs_no_distances() {
    let doc = json!({
        "locations": [{"id": 0, "name": "HQ"}],
        "rooms": [
            {"id": 0, "name": "Main", "locationId": 0, "capacity": 4, "visio": true},
            {"id": 1, "name": "Side", "locationId": 0, "capacity": 4, "visio": true}
        ],
        "people": [{"id": 1, "name": "Ada", "workplaceId": 0, "calendars": []}],
        "tasks": [
            {"id": 1, "name": "First", "members": [1], "duration": 30},
            {"id": 2, "name": "Second", "members": [1], "duration": 30}
        ]
    });
    let problem = load(doc);
    let built = build(&problem, 0, 200);
    assert_eq!(built.vars().chains().len(), 1);

    let plan = Plan::default().start(1, 0).rooms(1, &[0]).rooms(2, &[1]);
    let s = complete(&problem, &built, &plan.start(2, 30));
    assert!(violated(&built, &s).is_empty());

    let plan = Plan::default().start(1, 0).rooms(1, &[0]).rooms(2, &[1]);
    let s = complete(&problem, &built, &plan.start(2, 20));
    assert_eq!(violated(&built, &s), vec!["less_or_equal"]);
}

#[test]
fn test_chain_order_is_a_permutation() {
    let problem = load(two_sites(160, both_ways(60)));
    let built = build(&problem, 0, 1000);
    let chain = built.vars().chain(PersonId::new(1)).unwrap().clone();

    let mut s = complete(&problem, &built, &Plan::default());
    s.set(chain.order[1], 0);
    let kinds = violated(&built, &s);
    assert!(kinds.contains(&"all_different"));
    assert!(kinds.contains(&"equal"));
}

#[test]
fn test_room_exclusivity() {
    let doc = json!({
        "locations": [{"id": 0, "name": "HQ"}],
        "rooms": [
            {"id": 0, "name": "Main", "locationId": 0, "capacity": 4, "visio": true},
            {"id": 1, "name": "Side", "locationId": 0, "capacity": 4, "visio": true}
        ],
        "people": [
            {"id": 1, "name": "Ada", "workplaceId": 0, "calendars": []},
            {"id": 2, "name": "Bob", "workplaceId": 0, "calendars": []},
            {"id": 3, "name": "Cy", "workplaceId": 0, "calendars": []}
        ],
        "tasks": [
            {"id": 1, "name": "Pair", "members": [1, 2], "duration": 30},
            {"id": 2, "name": "Solo", "members": [3], "duration": 30}
        ]
    });
    let problem = load(doc);
    let built = build(&problem, 0, 200);

    let overlap = Plan::default().start(1, 0).start(2, 10);
    let s = complete(&problem, &built, &overlap);
    assert_eq!(violated(&built, &s), vec!["cumulative"]);

    let back_to_back = Plan::default().start(1, 0).start(2, 30);
    let s = complete(&problem, &built, &back_to_back);
    assert!(violated(&built, &s).is_empty());

    let other_room = Plan::default().start(1, 0).start(2, 10).rooms(2, &[1]);
    let s = complete(&problem, &built, &other_room);
    assert!(violated(&built, &s).is_empty());

    let two_rooms_one_site = Plan::default().start(1, 0).start(2, 100).rooms(1, &[0, 1]);
    let s = complete(&problem, &built, &two_rooms_one_site);
    assert_eq!(violated(&built, &s), vec!["sum_less_or_equal"]);
}

#[test]
fn test_multisite_requires_video() {
    let doc = json!({
        "locations": [{"id": 0, "name": "West"}, {"id": 1, "name": "East"}],
        "rooms": [
            {"id": 0, "name": "Plain", "locationId": 0, "capacity": 4, "visio": false},
            {"id": 1, "name": "East Video", "locationId": 1, "capacity": 4, "visio": true},
            {"id": 2, "name": "West Video", "locationId": 0, "capacity": 4, "visio": true}
        ],
        "people": [
            {"id": 1, "name": "Ada", "workplaceId": 0, "calendars": []},
            {"id": 2, "name": "Bob", "workplaceId": 1, "calendars": []}
        ],
        "tasks": [{"id": 5, "name": "Call", "members": [1, 2], "duration": 30}]
    });
    let problem = load(doc);
    let built = build(&problem, 0, 100);
    let site = built.vars().site(TaskId::new(5)).unwrap();

    // Home sites differ; the first room at West has no video.
    let s = complete(&problem, &built, &Plan::default());
    assert_eq!(s.bool_value(site.multisite), Some(true));
    assert_eq!(violated(&built, &s), vec!["equal"]);

    let s = complete(&problem, &built, &Plan::default().rooms(5, &[1, 2]));
    assert!(violated(&built, &s).is_empty());

    let together = Plan::default().at(1, 5, 1).rooms(5, &[1]);
    let s = complete(&problem, &built, &together);
    assert_eq!(s.bool_value(site.multisite), Some(false));
    assert!(violated(&built, &s).is_empty());

    // A single-site meeting may use the plain room.
    let plain = Plan::default().at(2, 5, 0).rooms(5, &[0]);
    let s = complete(&problem, &built, &plain);
    assert!(violated(&built, &s).is_empty());

    let mut s = complete(&problem, &built, &Plan::default().rooms(5, &[1, 2]));
    s.set_bool(site.multisite, false);
    assert_eq!(violated(&built, &s), vec!["is_different"]);
}

#[test]
fn test_random_headcounts() {
    let people: Vec<Value> = (0..5)
        .map(|i| json!({"id": i, "name": format!("P{i}"), "workplaceId": 0, "calendars": []}))
        .collect();
    let doc = json!({
        "locations": [{"id": 0, "name": "A"}, {"id": 1, "name": "B"}, {"id": 2, "name": "C"}],
        "rooms": [
            {"id": 0, "name": "RA", "locationId": 0, "capacity": 10, "visio": true},
            {"id": 1, "name": "RB", "locationId": 1, "capacity": 10, "visio": true},
            {"id": 2, "name": "RC", "locationId": 2, "capacity": 10, "visio": true}
        ],
        "people": people,
        "tasks": [{"id": 1, "name": "All hands", "members": [0, 1, 2, 3, 4], "duration": 60}]
    });
    let problem = load(doc);
    let built = build(&problem, 0, 480);
    let task = TaskId::new(1);
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..50 {
        let mut plan = Plan::default().start(1, rng.random_range(0..=420));
        for person in 0..5 {
            plan = plan.at(person, 1, rng.random_range(0..3));
        }
        let mut s = complete(&problem, &built, &plan);
        assert!(violated(&built, &s).is_empty());

        let total: i64 = problem
            .location_ids()
            .into_iter()
            .filter_map(|l| s.value(built.vars().headcount(task, l).unwrap()))
            .sum();
        assert_eq!(total, 5);

        let location = LocationId::new(rng.random_range(0..3));
        let headcount = built.vars().headcount(task, location).unwrap();
        let wrong = s.value(headcount).unwrap() + 1;
        s.set(headcount, wrong);
        assert!(violated(&built, &s).contains(&"count"));
    }
}

#[test]
fn test_one_interval_per_task() {
    let problem = load(two_sites(160, both_ways(60)));
    let built = build(&problem, 0, 1000);

    assert_eq!(built.model().interval_count(), problem.task_count());
    assert_eq!(built.vars().task_count(), problem.task_count());
    for task in problem.tasks() {
        let iv = built.vars().interval(task.id).unwrap();
        let def = built.model().interval(iv).unwrap();
        assert_eq!(def.duration, task.duration);
        assert_eq!(def.start, IntervalStart::Fixed(task.fixed_start().unwrap()));
        assert!(built.vars().start(task.id).is_none());
    }
}

#[test]
fn test_fixed_task_location_is_pinned() {
    let problem = load(two_sites(160, both_ways(60)));
    let built = build(&problem, 0, 1000);
    let l = built.vars().location(PersonId::new(1), TaskId::new(2)).unwrap();

    let mut s = complete(&problem, &built, &Plan::default());
    s.set(l, 1);
    assert!(violated(&built, &s).contains(&"domain"));
}

#[test]
fn test_off_time_joins_travel_chain() {
    let doc = json!({
        "locations": [{"id": 0, "name": "HQ"}],
        "rooms": [{"id": 0, "name": "Desk", "locationId": 0, "capacity": 2, "visio": true}],
        "calendars": [{"id": 3, "name": "Dentist", "offs": [{"start": 500, "duration": 60}]}],
        "people": [{"id": 1, "name": "Ada", "workplaceId": 0, "calendars": [3]}],
        "tasks": [{"id": 1, "name": "Review", "members": [1], "duration": 30}]
    });
    let problem = load(doc);
    assert_eq!(problem.placeholder_count(), 1);
    let built = build(&problem, 0, 1000);

    let chain = built.vars().chain(PersonId::new(1)).unwrap();
    assert_eq!(chain.len(), 2);
    let placeholder = chain.meetings[1];
    assert!(problem.task(placeholder).unwrap().is_placeholder());

    for ok in [0, 470, 520] {
        let s = complete(&problem, &built, &Plan::default().start(1, ok));
        assert!(violated(&built, &s).is_empty(), "start {ok} rejected");
    }
    let s = complete(&problem, &built, &Plan::default().start(1, 490));
    assert_eq!(violated(&built, &s), vec!["less_or_equal"]);
}

#[test]
fn test_invalid_horizon() {
    let problem = load(single_site());
    let err = MeetingCpBuilder::new(&problem, Horizon::new(10, 10)).err().unwrap();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_from_config() {
    let problem = load(single_site());
    let config = MeetingConfig::new()
        .with_model_name("week 1")
        .with_horizon(Horizon::new(0, 500));
    let built = MeetingCpBuilder::from_config(&problem, &config)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(built.model().name(), "week 1");

    let start = built.vars().start(TaskId::new(7)).unwrap();
    let domain = &built.model().int_var(start).unwrap().domain;
    assert_eq!((domain.min(), domain.max()), (Some(0), Some(500)));
}

struct Replay(CpSolution);

impl CpSolver for Replay {
    fn solve(&self, _model: &CpModel, _config: &SolverConfig) -> CpSolution {
        self.0.clone()
    }
}

#[test]
fn test_solve_and_decode() {
    let problem = load(single_site());
    let built = build(&problem, 0, 100);
    let solution = complete(&problem, &built, &Plan::default().start(7, 15));

    let (schedule, solution) = built.solve(&problem, &Replay(solution), &SolverConfig::default());
    assert!(solution.is_solution_found());
    assert_eq!(schedule.assignment_count(), 1);

    let a = schedule.assignment_for_task(TaskId::new(7)).unwrap();
    assert_eq!((a.start, a.end), (15, 45));
    assert_eq!(a.rooms, vec![RoomId::new(0)]);
    assert_eq!(a.locations.len(), 2);
    assert!(a.locations.values().all(|l| *l == LocationId::new(0)));
    assert!(!a.multisite);
}

#[test]
fn test_decode_without_solution() {
    let problem = load(single_site());
    let built = build(&problem, 0, 100);
    let replay = Replay(CpSolution::empty(SolverStatus::Infeasible));

    let (schedule, solution) = built.solve(&problem, &replay, &SolverConfig::default());
    assert_eq!(solution.status, SolverStatus::Infeasible);
    assert_eq!(schedule.assignment_count(), 0);
}
