//! Checking a candidate assignment against a model.
//!
//! The engine has no propagation or search. Instead, [`CpModel::check`]
//! decides whether a full assignment satisfies every domain and every
//! constraint, which is what solvers and tests need to verify results.

use super::model::{Constraint, CpModel};
use super::solver::CpSolution;
use super::variables::{IntExpr, IntVar, IntervalVar};

/// Failure to evaluate an expression under an assignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("variable #{0} has no value")]
    Unassigned(usize),

    #[error("element index {index} outside 0..{len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("table `{table}` has no entry ({row}, {col})")]
    MissingEntry { table: String, row: i64, col: i64 },

    #[error("interval #{0} does not exist")]
    UnknownInterval(usize),

    #[error("arithmetic overflow")]
    Overflow,
}

/// What a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationSource {
    /// A variable value outside its domain, or no value at all.
    Domain(IntVar),
    /// The constraint at this position in [`CpModel::constraints`].
    Constraint(usize),
}

/// One reason an assignment is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub source: ViolationSource,
    /// Constraint kind, or `"domain"`.
    pub kind: &'static str,
    pub message: String,
}

impl CpModel {
    /// Evaluates `expr` under `solution`.
    pub fn evaluate(&self, expr: &IntExpr, solution: &CpSolution) -> Result<i64, EvalError> {
        match expr {
            IntExpr::Constant(c) => Ok(*c),
            IntExpr::Var(v) => value_of(*v, solution),
            IntExpr::Sum(terms) => terms.iter().try_fold(0i64, |acc, t| {
                acc.checked_add(self.evaluate(t, solution)?)
                    .ok_or(EvalError::Overflow)
            }),
            IntExpr::Difference(a, b) => self
                .evaluate(a, solution)?
                .checked_sub(self.evaluate(b, solution)?)
                .ok_or(EvalError::Overflow),
            IntExpr::Product(a, b) => self
                .evaluate(a, solution)?
                .checked_mul(self.evaluate(b, solution)?)
                .ok_or(EvalError::Overflow),
            IntExpr::Element { array, index } => {
                let i = value_of(*index, solution)?;
                let item = usize::try_from(i)
                    .ok()
                    .and_then(|i| array.get(i))
                    .ok_or(EvalError::IndexOutOfRange {
                        index: i,
                        len: array.len(),
                    })?;
                self.evaluate(item, solution)
            }
            IntExpr::Lookup { table, row, col } => {
                let r = self.evaluate(row, solution)?;
                let c = self.evaluate(col, solution)?;
                table.get(r, c).ok_or_else(|| EvalError::MissingEntry {
                    table: table.name().to_string(),
                    row: r,
                    col: c,
                })
            }
        }
    }

    /// `[start, end)` of an interval under `solution`.
    pub fn interval_bounds(
        &self,
        interval: IntervalVar,
        solution: &CpSolution,
    ) -> Result<(i64, i64), EvalError> {
        let def = self
            .interval(interval)
            .ok_or(EvalError::UnknownInterval(interval.0))?;
        let start = self.evaluate(&def.start_expr(), solution)?;
        let end = start
            .checked_add(def.duration)
            .ok_or(EvalError::Overflow)?;
        Ok((start, end))
    }

    /// Checks a full assignment.
    ///
    /// Returns every violation found: unassigned or out-of-domain
    /// variables first, then failing constraints in model order.
    pub fn check(&self, solution: &CpSolution) -> Result<(), Vec<ConstraintViolation>> {
        let mut violations = Vec::new();

        for (var, def) in self.int_vars() {
            match solution.value(var) {
                None => violations.push(ConstraintViolation {
                    source: ViolationSource::Domain(var),
                    kind: "domain",
                    message: format!("{} has no value", def.name),
                }),
                Some(v) if !def.domain.contains(v) => violations.push(ConstraintViolation {
                    source: ViolationSource::Domain(var),
                    kind: "domain",
                    message: format!("{} = {v} outside its domain", def.name),
                }),
                Some(_) => {}
            }
        }

        for (i, constraint) in self.constraints().iter().enumerate() {
            let outcome = self.check_constraint(constraint, solution);
            let message = match outcome {
                Ok(None) => continue,
                Ok(Some(message)) => message,
                Err(e) => e.to_string(),
            };
            violations.push(ConstraintViolation {
                source: ViolationSource::Constraint(i),
                kind: constraint.kind(),
                message,
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// `Ok(Some(reason))` when the constraint does not hold.
    fn check_constraint(
        &self,
        constraint: &Constraint,
        solution: &CpSolution,
    ) -> Result<Option<String>, EvalError> {
        let values = |vars: &[IntVar]| -> Result<Vec<i64>, EvalError> {
            vars.iter().map(|v| value_of(*v, solution)).collect()
        };

        let failed = match constraint {
            Constraint::LessOrEqual { lhs, rhs } => {
                let (l, r) = (self.evaluate(lhs, solution)?, self.evaluate(rhs, solution)?);
                (l > r).then(|| format!("{l} > {r}"))
            }
            Constraint::Equal { lhs, rhs } => {
                let (l, r) = (self.evaluate(lhs, solution)?, self.evaluate(rhs, solution)?);
                (l != r).then(|| format!("{l} != {r}"))
            }
            Constraint::Count { vars, value, count } => {
                let actual = values(vars)?.iter().filter(|v| **v == *value).count() as i64;
                let expected = value_of(*count, solution)?;
                (actual != expected)
                    .then(|| format!("{actual} variable(s) equal {value}, count is {expected}"))
            }
            Constraint::SumLessOrEqual { vars, bound } => {
                let total = checked_sum(values(vars)?)?;
                (total > *bound).then(|| format!("sum {total} > {bound}"))
            }
            Constraint::ScalProdGreaterOrEqual {
                vars,
                coefficients,
                bound,
            } => {
                let terms = values(vars)?
                    .iter()
                    .zip(coefficients)
                    .map(|(v, c)| v.checked_mul(*c).ok_or(EvalError::Overflow))
                    .collect::<Result<Vec<_>, _>>()?;
                let total = checked_sum(terms)?;
                (total < *bound).then(|| format!("weighted sum {total} < {bound}"))
            }
            Constraint::Cumulative {
                intervals,
                demands,
                capacity,
                name,
            } => {
                let mut active = Vec::new();
                for (iv, demand) in intervals.iter().zip(demands) {
                    let (start, end) = self.interval_bounds(*iv, solution)?;
                    let demand = value_of(*demand, solution)?;
                    if end > start && demand > 0 {
                        active.push((start, end, demand));
                    }
                }
                // Peak load is reached at some interval start.
                active.iter().find_map(|&(t, _, _)| {
                    let load = checked_sum(
                        active
                            .iter()
                            .filter(|(s, e, _)| *s <= t && t < *e)
                            .map(|&(_, _, d)| d),
                    );
                    match load {
                        Ok(load) => (load > *capacity)
                            .then(|| format!("{name}: load {load} > {capacity} at {t}")),
                        Err(e) => Some(format!("{name}: {e} at {t}")),
                    }
                })
            }
            Constraint::MinEquality { vars, target } => {
                let min = values(vars)?.into_iter().min();
                let t = value_of(*target, solution)?;
                (min != Some(t)).then(|| format!("min is {min:?}, target is {t}"))
            }
            Constraint::MaxEquality { vars, target } => {
                let max = values(vars)?.into_iter().max();
                let t = value_of(*target, solution)?;
                (max != Some(t)).then(|| format!("max is {max:?}, target is {t}"))
            }
            Constraint::IsDifferent {
                left,
                right,
                target,
            } => {
                let differ = value_of(*left, solution)? != value_of(*right, solution)?;
                let t = value_of(target.as_int(), solution)?;
                (t != i64::from(differ)).then(|| format!("target {t}, operands differ: {differ}"))
            }
            Constraint::Sorted { vars, sorted } => {
                let mut expected = vars
                    .iter()
                    .map(|e| self.evaluate(e, solution))
                    .collect::<Result<Vec<_>, _>>()?;
                expected.sort_unstable();
                let actual = values(sorted)?;
                (actual != expected).then(|| format!("{actual:?} is not {expected:?}"))
            }
            Constraint::AllDifferent { vars } => {
                let mut vs = values(vars)?;
                vs.sort_unstable();
                vs.windows(2)
                    .find(|w| w[0] == w[1])
                    .map(|w| format!("value {} repeated", w[0]))
            }
        };
        Ok(failed)
    }
}

fn value_of(var: IntVar, solution: &CpSolution) -> Result<i64, EvalError> {
    solution.value(var).ok_or(EvalError::Unassigned(var.0))
}

fn checked_sum(values: impl IntoIterator<Item = i64>) -> Result<i64, EvalError> {
    values
        .into_iter()
        .try_fold(0i64, |acc, v| acc.checked_add(v).ok_or(EvalError::Overflow))
}
