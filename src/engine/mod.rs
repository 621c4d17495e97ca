//! Constraint programming modeling layer.
//!
//! Variables, intervals, expressions and constraints of a CP model, plus an
//! assignment checker. There is no propagation or search here: the
//! [`CpSolver`] trait is the seam for plugging in an external engine
//! (CP-SAT or similar).
//!
//! # Key Components
//!
//! - [`IntVar`], [`BoolVar`], [`IntervalVar`]: handles into a model
//! - [`IntExpr`]: integer expressions, including `Element` and table lookup
//! - [`Constraint`] and [`CpModel`]
//! - [`CpModel::check`]: verifies a [`CpSolution`]
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod eval;
mod model;
mod solver;
mod variables;

pub use eval::{ConstraintViolation, EvalError, ViolationSource};
pub use model::{Constraint, CpModel};
pub use solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
pub use variables::{
    BoolVar, Domain, IntExpr, IntVar, IntVarDef, IntervalDef, IntervalStart, IntervalVar,
    PairTable,
};
