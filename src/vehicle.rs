//! Fleet vehicles: capacity-bounded load and a current position.

use std::fmt;

use serde::Serialize;

use crate::distance::Location;
use crate::error::PlanError;

/// Unique identifier for a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cargo vehicle. Capacity is fixed at construction; load and position are
/// mutated only when a period's assignment is realized.
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: VehicleId,
    capacity: f64,
    load: f64,
    position: Location,
}

impl Vehicle {
    /// Creates a vehicle at the depot carrying `load`.
    ///
    /// Fails if `capacity` is not strictly positive or `load` is outside
    /// `0..=capacity`.
    pub fn new(id: VehicleId, capacity: f64, load: f64) -> Result<Self, PlanError> {
        if capacity <= 0.0 {
            return Err(PlanError::InvalidParameter {
                entity: format!("vehicle {id}"),
                field: "capacity",
                value: capacity,
            });
        }
        if load < 0.0 {
            return Err(PlanError::InvalidParameter {
                entity: format!("vehicle {id}"),
                field: "load",
                value: load,
            });
        }
        if load > capacity {
            return Err(PlanError::CapacityExceeded {
                vehicle: id,
                load,
                capacity,
            });
        }
        Ok(Self {
            id,
            capacity,
            load,
            position: Location::Depot,
        })
    }

    pub fn id(&self) -> &VehicleId {
        &self.id
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn position(&self) -> &Location {
        &self.position
    }

    /// Sets the current load, failing (with state unchanged) if it exceeds
    /// the vehicle's capacity or is negative.
    pub fn set_load(&mut self, load: f64) -> Result<(), PlanError> {
        if load < 0.0 {
            return Err(PlanError::InvalidParameter {
                entity: format!("vehicle {}", self.id),
                field: "load",
                value: load,
            });
        }
        if load > self.capacity {
            return Err(PlanError::CapacityExceeded {
                vehicle: self.id.clone(),
                load,
                capacity: self.capacity,
            });
        }
        self.load = load;
        Ok(())
    }

    pub fn set_position(&mut self, position: Location) {
        self.position = position;
    }
}
