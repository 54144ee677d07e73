//! Applies a realized matching to vehicle and destination state.

use serde::Serialize;

use crate::destination::{Destination, DestinationId};
use crate::distance::Location;
use crate::error::PlanError;
use crate::matching::Matching;
use crate::traffic::Pair;
use crate::vehicle::{Vehicle, VehicleId};

/// One realized (vehicle, destination, delivered-cargo) triple.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub vehicle: VehicleId,
    pub destination: DestinationId,
    pub delivered: f64,
}

/// Mutates the fleet and the destinations for every served pair of
/// `matching`; everything not part of a served pair is left untouched.
///
/// Per served pair: the delivered amount is `min(load, demand)` recomputed
/// from current state (identical to the coefficient-stage value, since
/// nothing mutates in between), the destination's inventory grows by it, and
/// the vehicle either returns to the depot refueled to full capacity (load
/// depleted to exactly zero) or keeps the remainder parked at the served
/// destination, eligible for reassignment from there next period.
///
/// Deliveries are planned before any mutation, so a bad pair fails the
/// period with no state change.
pub fn apply_matching(
    vehicles: &mut [Vehicle],
    destinations: &mut [Destination],
    matching: &Matching,
) -> Result<Vec<Delivery>, PlanError> {
    let mut served: Vec<&Pair> = matching.served().collect();
    served.sort_by(|a, b| a.vehicle.cmp(&b.vehicle));

    let mut planned: Vec<(usize, usize, f64)> = Vec::with_capacity(served.len());
    for pair in served {
        let Some(vehicle_idx) = vehicles.iter().position(|v| v.id() == &pair.vehicle) else {
            continue;
        };
        let Some(destination_idx) = destinations
            .iter()
            .position(|d| d.id() == &pair.destination)
        else {
            continue;
        };
        let delivered = vehicles[vehicle_idx]
            .load()
            .min(destinations[destination_idx].demand());
        if delivered < 0.0 {
            return Err(PlanError::NegativeInventory {
                destination: pair.destination.clone(),
                amount: delivered,
            });
        }
        planned.push((vehicle_idx, destination_idx, delivered));
    }

    let mut deliveries = Vec::with_capacity(planned.len());
    for (vehicle_idx, destination_idx, delivered) in planned {
        let destination = &mut destinations[destination_idx];
        destination.add_inventory(delivered)?;

        let vehicle = &mut vehicles[vehicle_idx];
        let remaining = vehicle.load() - delivered;
        if remaining == 0.0 {
            let capacity = vehicle.capacity();
            vehicle.set_load(capacity)?;
            vehicle.set_position(Location::Depot);
        } else {
            vehicle.set_load(remaining)?;
            vehicle.set_position(Location::At(destination.id().clone()));
        }

        tracing::debug!(
            vehicle = %vehicle.id(),
            destination = %destination.id(),
            delivered,
            inventory = destination.inventory(),
            load = vehicle.load(),
            position = %vehicle.position(),
            "delivery applied"
        );

        deliveries.push(Delivery {
            vehicle: vehicle.id().clone(),
            destination: destination.id().clone(),
            delivered,
        });
    }

    Ok(deliveries)
}
