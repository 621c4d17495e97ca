//! CP solver interface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::CpModel;
use super::variables::{BoolVar, IntVar};

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Solver exceeded time limit.
    Timeout,
    /// No solution found for unknown reasons.
    Unknown,
}

/// Solution from a CP solver: one value per integer variable.
#[derive(Debug, Clone)]
pub struct CpSolution {
    pub status: SolverStatus,
    pub values: HashMap<IntVar, i64>,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            values: HashMap::new(),
            solve_time_ms: 0,
        }
    }

    pub fn set(&mut self, var: IntVar, value: i64) {
        self.values.insert(var, value);
    }

    pub fn set_bool(&mut self, var: BoolVar, value: bool) {
        self.set(var.as_int(), i64::from(value));
    }

    pub fn value(&self, var: IntVar) -> Option<i64> {
        self.values.get(&var).copied()
    }

    /// `None` when unassigned; any nonzero value reads as `true`.
    pub fn bool_value(&self, var: BoolVar) -> Option<bool> {
        self.value(var.as_int()).map(|v| v != 0)
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds.
    pub time_limit_ms: i64,
    /// Number of parallel workers.
    pub num_workers: usize,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            num_workers: 1,
            stop_after_first: false,
        }
    }
}

/// Trait for CP solver implementations.
///
/// Nothing in this crate searches; implementors wrap an external engine
/// and translate [`CpModel`] into its primitives.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_values() {
        let mut model = CpModel::new("t");
        let x = model.new_int_var(0, 9, "x");
        let b = model.new_bool_var("b");

        let mut s = CpSolution::empty(SolverStatus::Feasible);
        assert_eq!(s.value(x), None);
        s.set(x, 4);
        s.set_bool(b, true);
        assert_eq!(s.value(x), Some(4));
        assert_eq!(s.bool_value(b), Some(true));
        assert!(s.is_solution_found());
        assert!(!CpSolution::empty(SolverStatus::Infeasible).is_solution_found());
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit_ms, 60_000);
        assert_eq!(config.num_workers, 1);
        assert!(!config.stop_after_first);
    }
}
