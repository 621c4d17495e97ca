//! Inter-site travel times.
//!
//! Maps an ordered pair of locations to the travel duration between them.
//! Unlike a setup-time matrix there is no default: a pair that was never
//! declared is an error, except that staying on the same site is free.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::LocationId;

/// Travel-time lookup between sites.
#[derive(Debug, Clone, Default)]
pub struct TravelTimeOracle {
    times: BTreeMap<(LocationId, LocationId), i64>,
}

impl TravelTimeOracle {
    /// Creates an empty oracle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the travel time from `from` to `to`.
    ///
    /// Returns the previous value for that ordered pair, if any.
    /// Same-site pairs are never stored.
    pub fn insert(&mut self, from: LocationId, to: LocationId, time: i64) -> Option<i64> {
        if from == to {
            return None;
        }
        self.times.insert((from, to), time)
    }

    /// Declares the travel time in both directions.
    pub fn with_symmetric(mut self, a: LocationId, b: LocationId, time: i64) -> Self {
        self.insert(a, b, time);
        self.insert(b, a, time);
        self
    }

    /// Travel time from `from` to `to`.
    ///
    /// # Errors
    /// [`Error::MissingTravelTime`] when the locations differ and the pair
    /// was never declared.
    pub fn lookup(&self, from: LocationId, to: LocationId) -> Result<i64> {
        if from == to {
            return Ok(0);
        }
        self.times
            .get(&(from, to))
            .copied()
            .ok_or(Error::MissingTravelTime { from, to })
    }

    /// Whether an ordered pair has a declared (or implicit zero) time.
    pub fn contains(&self, from: LocationId, to: LocationId) -> bool {
        from == to || self.times.contains_key(&(from, to))
    }

    /// Declared pairs with their times, ordered by pair.
    pub fn iter(&self) -> impl Iterator<Item = (LocationId, LocationId, i64)> + '_ {
        self.times.iter().map(|(&(a, b), &t)| (a, b, t))
    }

    /// Number of declared ordered pairs.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
