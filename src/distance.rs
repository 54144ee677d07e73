//! Positions and the distance matrix seam.
//!
//! Distances are externally supplied, read-only input. The provider trait
//! keeps the planner independent of where the numbers come from; the
//! map-backed table is the stock implementation.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::destination::DestinationId;

/// Where a vehicle currently is: the depot, or parked at a destination it
/// served with leftover load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Location {
    Depot,
    At(DestinationId),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Depot => f.write_str("depot"),
            Location::At(id) => write!(f, "{id}"),
        }
    }
}

/// Supplies the distance from a vehicle position to a destination.
///
/// `None` means the pair is unknown to the provider; the traffic calculator
/// turns that into a fatal input-data error.
pub trait DistanceProvider {
    fn distance(&self, from: &Location, to: &DestinationId) -> Option<f64>;
}

/// Distance matrix backed by a (position, destination) map.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    entries: HashMap<(Location, DestinationId), f64>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: Location, to: DestinationId, distance: f64) {
        self.entries.insert((from, to), distance);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DistanceProvider for DistanceTable {
    fn distance(&self, from: &Location, to: &DestinationId) -> Option<f64> {
        self.entries.get(&(from.clone(), to.clone())).copied()
    }
}
