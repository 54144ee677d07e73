//! Error taxonomy for the planning loop.
//!
//! Every failure carries the entity, pair, or parameter that caused it so a
//! caller can correct its input data without inspecting loop state. Nothing
//! here is retried or recovered internally; errors propagate out of the
//! period that raised them.

use std::fmt;
use std::io;

use crate::destination::DestinationId;
use crate::distance::Location;
use crate::traffic::Pair;
use crate::vehicle::VehicleId;

#[derive(Debug)]
pub enum PlanError {
    /// A constructor argument violated its positivity/range requirement.
    InvalidParameter {
        entity: String,
        field: &'static str,
        value: f64,
    },
    /// A negative inventory amount, or an inventory that would go negative.
    NegativeInventory {
        destination: DestinationId,
        amount: f64,
    },
    /// A load above the vehicle's fixed capacity.
    CapacityExceeded {
        vehicle: VehicleId,
        load: f64,
        capacity: f64,
    },
    /// The distance matrix has no entry for a queried (position, destination).
    MissingDistance { from: Location, to: DestinationId },
    /// A distance entry of exactly zero.
    ZeroDistance { from: Location, to: DestinationId },
    /// A (vehicle, destination) pair absent from a coefficient map.
    MissingCargoEntry { pair: Pair },
    /// The assignment step could not produce a feasible optimal matching.
    NoOptimalSolution(String),
    /// Result log I/O failure.
    Io(io::Error),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidParameter {
                entity,
                field,
                value,
            } => {
                write!(f, "invalid {field} = {value} for {entity}")
            }
            PlanError::NegativeInventory {
                destination,
                amount,
            } => {
                write!(
                    f,
                    "negative inventory amount {amount} for destination {destination}"
                )
            }
            PlanError::CapacityExceeded {
                vehicle,
                load,
                capacity,
            } => {
                write!(
                    f,
                    "load {load} exceeds capacity {capacity} of vehicle {vehicle}"
                )
            }
            PlanError::MissingDistance { from, to } => {
                write!(f, "no distance entry from {from} to destination {to}")
            }
            PlanError::ZeroDistance { from, to } => {
                write!(f, "distance from {from} to destination {to} is zero")
            }
            PlanError::MissingCargoEntry { pair } => {
                write!(
                    f,
                    "no cargo entry for vehicle {} and destination {}",
                    pair.vehicle, pair.destination
                )
            }
            PlanError::NoOptimalSolution(detail) => {
                write!(f, "no optimal assignment: {detail}")
            }
            PlanError::Io(err) => write!(f, "result log i/o error: {err}"),
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PlanError {
    fn from(err: io::Error) -> Self {
        PlanError::Io(err)
    }
}
