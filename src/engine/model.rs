//! CP model definition.

use super::variables::{
    BoolVar, Domain, IntExpr, IntVar, IntVarDef, IntervalDef, IntervalStart, IntervalVar,
};

/// A constraint in the CP model.
///
/// The set mirrors the primitives of common CP engines. Semantics are
/// defined by [`CpModel::check`].
#[derive(Debug, Clone)]
pub enum Constraint {
    /// `lhs <= rhs`.
    LessOrEqual { lhs: IntExpr, rhs: IntExpr },

    /// `lhs == rhs`.
    Equal { lhs: IntExpr, rhs: IntExpr },

    /// `count` equals the number of `vars` whose value is `value`.
    Count {
        vars: Vec<IntVar>,
        value: i64,
        count: IntVar,
    },

    /// `sum(vars) <= bound`.
    SumLessOrEqual { vars: Vec<IntVar>, bound: i64 },

    /// `sum(coefficients[i] * vars[i]) >= bound`.
    ScalProdGreaterOrEqual {
        vars: Vec<IntVar>,
        coefficients: Vec<i64>,
        bound: i64,
    },

    /// Cumulative resource.
    ///
    /// At any time point, the sum of demands of the intervals running at
    /// that point must not exceed the capacity. Zero-length intervals
    /// never run.
    Cumulative {
        intervals: Vec<IntervalVar>,
        /// Demand of each interval (parallel to `intervals`).
        demands: Vec<IntVar>,
        capacity: i64,
        name: String,
    },

    /// `target == min(vars)`.
    MinEquality { vars: Vec<IntVar>, target: IntVar },

    /// `target == max(vars)`.
    MaxEquality { vars: Vec<IntVar>, target: IntVar },

    /// `target == (left != right)`.
    IsDifferent {
        left: IntVar,
        right: IntVar,
        target: BoolVar,
    },

    /// `sorted` is `vars` sorted in non-decreasing order.
    Sorted { vars: Vec<IntExpr>, sorted: Vec<IntVar> },

    /// Pairwise distinct values.
    AllDifferent { vars: Vec<IntVar> },
}

impl Constraint {
    /// Short, stable name of the constraint type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LessOrEqual { .. } => "less_or_equal",
            Self::Equal { .. } => "equal",
            Self::Count { .. } => "count",
            Self::SumLessOrEqual { .. } => "sum_less_or_equal",
            Self::ScalProdGreaterOrEqual { .. } => "scal_prod_greater_or_equal",
            Self::Cumulative { .. } => "cumulative",
            Self::MinEquality { .. } => "min_equality",
            Self::MaxEquality { .. } => "max_equality",
            Self::IsDifferent { .. } => "is_different",
            Self::Sorted { .. } => "sorted",
            Self::AllDifferent { .. } => "all_different",
        }
    }
}

/// A constraint programming model.
///
/// Owns all variables, intervals and constraints. Building a model never
/// solves anything; hand it to a [`CpSolver`](super::CpSolver).
///
/// # Examples
///
/// ```
/// use u_meeting::engine::{CpModel, IntExpr};
///
/// let mut model = CpModel::new("example");
/// let start = model.new_int_var(0, 100, "start");
/// let meeting = model.new_fixed_duration_interval(start, 30, "meeting");
/// model.add_less_or_equal(IntExpr::difference(10i64, start), 0i64);
/// assert_eq!(model.interval_count(), 1);
/// assert!(model.validate().is_ok());
/// # let _ = meeting;
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    name: String,
    int_vars: Vec<IntVarDef>,
    intervals: Vec<IntervalDef>,
    constraints: Vec<Constraint>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            int_vars: Vec::new(),
            intervals: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Integer variable over `[min, max]`.
    pub fn new_int_var(&mut self, min: i64, max: i64, name: impl Into<String>) -> IntVar {
        self.new_int_var_in(Domain::range(min, max), name)
    }

    /// Integer variable over an arbitrary domain.
    pub fn new_int_var_in(&mut self, domain: Domain, name: impl Into<String>) -> IntVar {
        self.int_vars.push(IntVarDef {
            name: name.into(),
            domain,
        });
        IntVar(self.int_vars.len() - 1)
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        BoolVar(self.new_int_var(0, 1, name))
    }

    /// Interval of fixed `duration` whose start is `start`.
    pub fn new_fixed_duration_interval(
        &mut self,
        start: IntVar,
        duration: i64,
        name: impl Into<String>,
    ) -> IntervalVar {
        self.push_interval(IntervalStart::Anchored(start), duration, name.into())
    }

    /// Interval with constant start and duration.
    pub fn new_fixed_interval(
        &mut self,
        start: i64,
        duration: i64,
        name: impl Into<String>,
    ) -> IntervalVar {
        self.push_interval(IntervalStart::Fixed(start), duration, name.into())
    }

    fn push_interval(&mut self, start: IntervalStart, duration: i64, name: String) -> IntervalVar {
        self.intervals.push(IntervalDef {
            name,
            start,
            duration,
        });
        IntervalVar(self.intervals.len() - 1)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn add_less_or_equal(&mut self, lhs: impl Into<IntExpr>, rhs: impl Into<IntExpr>) {
        self.add_constraint(Constraint::LessOrEqual {
            lhs: lhs.into(),
            rhs: rhs.into(),
        });
    }

    pub fn add_equality(&mut self, lhs: impl Into<IntExpr>, rhs: impl Into<IntExpr>) {
        self.add_constraint(Constraint::Equal {
            lhs: lhs.into(),
            rhs: rhs.into(),
        });
    }

    pub fn add_count(&mut self, vars: Vec<IntVar>, value: i64, count: IntVar) {
        self.add_constraint(Constraint::Count { vars, value, count });
    }

    pub fn add_sum_less_or_equal(&mut self, vars: Vec<IntVar>, bound: i64) {
        self.add_constraint(Constraint::SumLessOrEqual { vars, bound });
    }

    pub fn add_scal_prod_greater_or_equal(
        &mut self,
        vars: Vec<IntVar>,
        coefficients: Vec<i64>,
        bound: i64,
    ) {
        self.add_constraint(Constraint::ScalProdGreaterOrEqual {
            vars,
            coefficients,
            bound,
        });
    }

    pub fn add_cumulative(
        &mut self,
        intervals: Vec<IntervalVar>,
        demands: Vec<IntVar>,
        capacity: i64,
        name: impl Into<String>,
    ) {
        self.add_constraint(Constraint::Cumulative {
            intervals,
            demands,
            capacity,
            name: name.into(),
        });
    }

    pub fn add_min_equality(&mut self, vars: Vec<IntVar>, target: IntVar) {
        self.add_constraint(Constraint::MinEquality { vars, target });
    }

    pub fn add_max_equality(&mut self, vars: Vec<IntVar>, target: IntVar) {
        self.add_constraint(Constraint::MaxEquality { vars, target });
    }

    pub fn add_is_different(&mut self, left: IntVar, right: IntVar, target: BoolVar) {
        self.add_constraint(Constraint::IsDifferent {
            left,
            right,
            target,
        });
    }

    pub fn add_sorting(&mut self, vars: Vec<IntExpr>, sorted: Vec<IntVar>) {
        self.add_constraint(Constraint::Sorted { vars, sorted });
    }

    pub fn add_all_different(&mut self, vars: Vec<IntVar>) {
        self.add_constraint(Constraint::AllDifferent { vars });
    }

    pub fn int_var(&self, var: IntVar) -> Option<&IntVarDef> {
        self.int_vars.get(var.0)
    }

    pub fn interval(&self, interval: IntervalVar) -> Option<&IntervalDef> {
        self.intervals.get(interval.0)
    }

    /// All integer variables with their handles.
    pub fn int_vars(&self) -> impl Iterator<Item = (IntVar, &IntVarDef)> {
        self.int_vars.iter().enumerate().map(|(i, d)| (IntVar(i), d))
    }

    pub fn intervals(&self) -> impl Iterator<Item = (IntervalVar, &IntervalDef)> {
        self.intervals
            .iter()
            .enumerate()
            .map(|(i, d)| (IntervalVar(i), d))
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn int_var_count(&self) -> usize {
        self.int_vars.len()
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraints of the given [`kind`](Constraint::kind).
    pub fn count_constraints(&self, kind: &str) -> usize {
        self.constraints.iter().filter(|c| c.kind() == kind).count()
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every handle belongs to this model, that parallel
    /// argument lists have equal length and that no domain is empty.
    pub fn validate(&self) -> Result<(), String> {
        for (var, def) in self.int_vars() {
            if def.domain.is_empty() {
                return Err(format!("empty domain: {} (#{})", def.name, var.0));
            }
        }
        for (_, iv) in self.intervals() {
            if let IntervalStart::Anchored(var) = iv.start {
                self.check_var(var)?;
            }
            if iv.duration < 0 {
                return Err(format!("negative duration: {}", iv.name));
            }
        }

        for (i, constraint) in self.constraints.iter().enumerate() {
            let mut vars = Vec::new();
            match constraint {
                Constraint::LessOrEqual { lhs, rhs } | Constraint::Equal { lhs, rhs } => {
                    lhs.for_each_var(&mut |v| vars.push(v));
                    rhs.for_each_var(&mut |v| vars.push(v));
                }
                Constraint::Count {
                    vars: vs, count, ..
                } => {
                    vars.extend(vs);
                    vars.push(*count);
                }
                Constraint::SumLessOrEqual { vars: vs, .. }
                | Constraint::AllDifferent { vars: vs } => vars.extend(vs),
                Constraint::ScalProdGreaterOrEqual {
                    vars: vs,
                    coefficients,
                    ..
                } => {
                    if vs.len() != coefficients.len() {
                        return Err(format!(
                            "constraint #{i}: variables and coefficients length mismatch"
                        ));
                    }
                    vars.extend(vs);
                }
                Constraint::Cumulative {
                    intervals, demands, ..
                } => {
                    if intervals.len() != demands.len() {
                        return Err(format!(
                            "constraint #{i}: intervals and demands length mismatch"
                        ));
                    }
                    for iv in intervals {
                        if self.intervals.get(iv.0).is_none() {
                            return Err(format!("undefined interval: #{}", iv.0));
                        }
                    }
                    vars.extend(demands);
                }
                Constraint::MinEquality { vars: vs, target }
                | Constraint::MaxEquality { vars: vs, target } => {
                    if vs.is_empty() {
                        return Err(format!("constraint #{i}: min/max over no variables"));
                    }
                    vars.extend(vs);
                    vars.push(*target);
                }
                Constraint::IsDifferent {
                    left,
                    right,
                    target,
                } => vars.extend([*left, *right, target.0]),
                Constraint::Sorted { vars: vs, sorted } => {
                    if vs.len() != sorted.len() {
                        return Err(format!("constraint #{i}: sorted length mismatch"));
                    }
                    for e in vs {
                        e.for_each_var(&mut |v| vars.push(v));
                    }
                    vars.extend(sorted);
                }
            }
            for v in vars {
                self.check_var(v)?;
            }
        }
        Ok(())
    }

    fn check_var(&self, var: IntVar) -> Result<(), String> {
        if self.int_vars.get(var.0).is_none() {
            return Err(format!("undefined variable: #{}", var.0));
        }
        Ok(())
    }
}
