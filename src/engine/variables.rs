//! Engine variable handles, domains and expressions.
//!
//! Variables live inside a [`CpModel`](super::CpModel); callers only hold the
//! `Copy` handles returned at creation.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Handle to an integer variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntVar(pub(crate) usize);

impl IntVar {
    /// Position of the variable in its model.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a 0/1 integer variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoolVar(pub(crate) IntVar);

impl BoolVar {
    /// The underlying 0/1 integer variable.
    pub fn as_int(self) -> IntVar {
        self.0
    }
}

/// Handle to an interval variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntervalVar(pub(crate) usize);

impl IntervalVar {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of an integer variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// All integers in `[min, max]`.
    Range { min: i64, max: i64 },
    /// An explicit, sorted, duplicate-free value set.
    Values(Vec<i64>),
}

impl Domain {
    pub fn range(min: i64, max: i64) -> Self {
        Self::Range { min, max }
    }

    /// Builds a value-set domain; order and duplicates in `values` are
    /// irrelevant.
    pub fn values(values: impl IntoIterator<Item = i64>) -> Self {
        let mut v: Vec<i64> = values.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self::Values(v)
    }

    pub fn singleton(value: i64) -> Self {
        Self::Range {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        match self {
            Self::Range { min, max } => *min <= value && value <= *max,
            Self::Values(v) => v.binary_search(&value).is_ok(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Range { min, max } => min > max,
            Self::Values(v) => v.is_empty(),
        }
    }

    pub fn min(&self) -> Option<i64> {
        match self {
            Self::Range { min, max } => (min <= max).then_some(*min),
            Self::Values(v) => v.first().copied(),
        }
    }

    pub fn max(&self) -> Option<i64> {
        match self {
            Self::Range { min, max } => (min <= max).then_some(*max),
            Self::Values(v) => v.last().copied(),
        }
    }

    /// Number of values in the domain.
    pub fn size(&self) -> u64 {
        match self {
            Self::Range { min, max } if min <= max => max.abs_diff(*min) + 1,
            Self::Range { .. } => 0,
            Self::Values(v) => v.len() as u64,
        }
    }

    /// The single value of a one-element domain.
    pub fn fixed_value(&self) -> Option<i64> {
        (self.size() == 1).then(|| self.min()).flatten()
    }
}

/// An integer variable as stored in the model.
#[derive(Debug, Clone)]
pub struct IntVarDef {
    /// Variable name (for diagnostics; need not be unique).
    pub name: String,
    pub domain: Domain,
}

/// How an interval's start is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalStart {
    /// Start equals the value of a variable.
    Anchored(IntVar),
    /// Start is a constant.
    Fixed(i64),
}

/// A fixed-duration interval: `[start, start + duration)`.
#[derive(Debug, Clone)]
pub struct IntervalDef {
    pub name: String,
    pub start: IntervalStart,
    pub duration: i64,
}

impl IntervalDef {
    pub fn start_expr(&self) -> IntExpr {
        match self.start {
            IntervalStart::Anchored(var) => IntExpr::Var(var),
            IntervalStart::Fixed(value) => IntExpr::Constant(value),
        }
    }

    pub fn end_expr(&self) -> IntExpr {
        IntExpr::sum([self.start_expr(), IntExpr::Constant(self.duration)])
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.start, IntervalStart::Fixed(_))
    }
}

/// A constant table indexed by a pair of integers.
///
/// Used for lookups such as `travel[from][to]`, where both keys are
/// expressions over model variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairTable {
    name: String,
    entries: BTreeMap<(i64, i64), i64>,
}

impl PairTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, row: i64, col: i64, value: i64) {
        self.entries.insert((row, col), value);
    }

    pub fn get(&self, row: i64, col: i64) -> Option<i64> {
        self.entries.get(&(row, col)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Integer expression over model variables.
///
/// Expressions are evaluated exactly over `i64`; there is no floating point
/// anywhere in the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum IntExpr {
    Constant(i64),
    Var(IntVar),
    Sum(Vec<IntExpr>),
    /// `left - right`.
    Difference(Box<IntExpr>, Box<IntExpr>),
    Product(Box<IntExpr>, Box<IntExpr>),
    /// `array[index]`, `index` ranging over positions `0..array.len()`.
    Element { array: Vec<IntExpr>, index: IntVar },
    /// `table[(row, col)]`.
    Lookup {
        table: Arc<PairTable>,
        row: Box<IntExpr>,
        col: Box<IntExpr>,
    },
}

impl IntExpr {
    pub fn sum(terms: impl IntoIterator<Item = IntExpr>) -> Self {
        Self::Sum(terms.into_iter().collect())
    }

    pub fn difference(left: impl Into<IntExpr>, right: impl Into<IntExpr>) -> Self {
        Self::Difference(Box::new(left.into()), Box::new(right.into()))
    }

    pub fn product(left: impl Into<IntExpr>, right: impl Into<IntExpr>) -> Self {
        Self::Product(Box::new(left.into()), Box::new(right.into()))
    }

    pub fn element(array: Vec<IntExpr>, index: IntVar) -> Self {
        Self::Element { array, index }
    }

    pub fn lookup(table: Arc<PairTable>, row: impl Into<IntExpr>, col: impl Into<IntExpr>) -> Self {
        Self::Lookup {
            table,
            row: Box::new(row.into()),
            col: Box::new(col.into()),
        }
    }

    /// Calls `f` on every variable the expression mentions.
    pub fn for_each_var(&self, f: &mut impl FnMut(IntVar)) {
        match self {
            Self::Constant(_) => {}
            Self::Var(v) => f(*v),
            Self::Sum(terms) => terms.iter().for_each(|t| t.for_each_var(f)),
            Self::Difference(a, b) | Self::Product(a, b) => {
                a.for_each_var(f);
                b.for_each_var(f);
            }
            Self::Element { array, index } => {
                f(*index);
                array.iter().for_each(|t| t.for_each_var(f));
            }
            Self::Lookup { row, col, .. } => {
                row.for_each_var(f);
                col.for_each_var(f);
            }
        }
    }
}

impl From<i64> for IntExpr {
    fn from(value: i64) -> Self {
        Self::Constant(value)
    }
}

impl From<IntVar> for IntExpr {
    fn from(var: IntVar) -> Self {
        Self::Var(var)
    }
}

impl From<BoolVar> for IntExpr {
    fn from(var: BoolVar) -> Self {
        Self::Var(var.0)
    }
}
