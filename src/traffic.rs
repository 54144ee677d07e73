//! Objective coefficients for the per-period assignment: deliverable cargo
//! and the traffic indicator (cargo moved per unit distance).

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::destination::{Destination, DestinationId};
use crate::distance::DistanceProvider;
use crate::error::PlanError;
use crate::vehicle::{Vehicle, VehicleId};

/// Structured (vehicle, destination) key for coefficient and matching maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pair {
    pub vehicle: VehicleId,
    pub destination: DestinationId,
}

impl Pair {
    pub fn new(vehicle: VehicleId, destination: DestinationId) -> Self {
        Self {
            vehicle,
            destination,
        }
    }
}

/// Cargo each vehicle could actually drop at each destination: the vehicle
/// never delivers more than it carries nor more than the outstanding demand.
pub fn deliverable_cargo(
    vehicles: &[Vehicle],
    destinations: &[&Destination],
) -> HashMap<Pair, f64> {
    let mut cargo = HashMap::with_capacity(vehicles.len() * destinations.len());
    for vehicle in vehicles {
        for destination in destinations {
            let amount = vehicle.load().min(destination.demand());
            cargo.insert(
                Pair::new(vehicle.id().clone(), destination.id().clone()),
                amount,
            );
        }
    }
    cargo
}

/// Traffic indicator per (vehicle, destination) pair: deliverable cargo over
/// the distance from the vehicle's position to the destination.
///
/// Pairs are independent and read-only over the shared snapshots, so the
/// cartesian sweep runs on the rayon pool. Any missing cargo entry, missing
/// distance, or zero distance aborts the whole computation.
pub fn traffic_indicators<D>(
    vehicles: &[Vehicle],
    destinations: &[&Destination],
    distances: &D,
    cargo: &HashMap<Pair, f64>,
) -> Result<HashMap<Pair, f64>, PlanError>
where
    D: DistanceProvider + Sync + ?Sized,
{
    vehicles
        .par_iter()
        .flat_map_iter(|vehicle| {
            destinations
                .iter()
                .copied()
                .map(move |destination| pair_indicator(vehicle, destination, distances, cargo))
        })
        .collect()
}

fn pair_indicator<D>(
    vehicle: &Vehicle,
    destination: &Destination,
    distances: &D,
    cargo: &HashMap<Pair, f64>,
) -> Result<(Pair, f64), PlanError>
where
    D: DistanceProvider + ?Sized,
{
    let pair = Pair::new(vehicle.id().clone(), destination.id().clone());
    let moved = *cargo
        .get(&pair)
        .ok_or_else(|| PlanError::MissingCargoEntry { pair: pair.clone() })?;

    let distance = distances
        .distance(vehicle.position(), destination.id())
        .ok_or_else(|| PlanError::MissingDistance {
            from: vehicle.position().clone(),
            to: destination.id().clone(),
        })?;
    if distance == 0.0 {
        return Err(PlanError::ZeroDistance {
            from: vehicle.position().clone(),
            to: destination.id().clone(),
        });
    }

    Ok((pair, moved / distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DistanceTable, Location};

    fn truck(id: &str, load: f64) -> Vehicle {
        Vehicle::new(VehicleId::new(id), 100.0, load).unwrap()
    }

    fn site(id: &str, inventory: f64) -> Destination {
        Destination::new(DestinationId::new(id), 10.0, 5.0, inventory).unwrap()
    }

    fn pair(vehicle: &str, destination: &str) -> Pair {
        Pair::new(VehicleId::new(vehicle), DestinationId::new(destination))
    }

    #[test]
    fn cargo_is_capped_by_demand_and_by_load() {
        let vehicles = vec![truck("t1", 100.0), truck("t2", 20.0)];
        let d = site("d1", 0.0); // demand 50
        let cargo = deliverable_cargo(&vehicles, &[&d]);
        assert_eq!(cargo[&pair("t1", "d1")], 50.0);
        assert_eq!(cargo[&pair("t2", "d1")], 20.0);
    }

    #[test]
    fn indicator_divides_cargo_by_distance() {
        let vehicles = vec![truck("t1", 100.0)];
        let d = site("d1", 0.0);
        let mut table = DistanceTable::new();
        table.insert(Location::Depot, DestinationId::new("d1"), 25.0);

        let cargo = deliverable_cargo(&vehicles, &[&d]);
        let indicators = traffic_indicators(&vehicles, &[&d], &table, &cargo).unwrap();
        assert_eq!(indicators[&pair("t1", "d1")], 50.0 / 25.0);
    }

    #[test]
    fn indicator_uses_vehicle_position_as_origin() {
        let mut vehicle = truck("t1", 60.0);
        vehicle.set_position(Location::At(DestinationId::new("d1")));
        let d2 = site("d2", 0.0);
        let mut table = DistanceTable::new();
        table.insert(Location::Depot, DestinationId::new("d2"), 10.0);
        table.insert(
            Location::At(DestinationId::new("d1")),
            DestinationId::new("d2"),
            5.0,
        );

        let vehicles = vec![vehicle];
        let cargo = deliverable_cargo(&vehicles, &[&d2]);
        let indicators = traffic_indicators(&vehicles, &[&d2], &table, &cargo).unwrap();
        assert_eq!(indicators[&pair("t1", "d2")], 50.0 / 5.0);
    }

    #[test]
    fn missing_distance_entry_is_fatal() {
        let vehicles = vec![truck("t1", 100.0)];
        let d = site("d1", 0.0);
        let table = DistanceTable::new();
        let cargo = deliverable_cargo(&vehicles, &[&d]);
        let err = traffic_indicators(&vehicles, &[&d], &table, &cargo).unwrap_err();
        assert!(matches!(err, PlanError::MissingDistance { .. }));
    }

    #[test]
    fn zero_distance_is_fatal() {
        let vehicles = vec![truck("t1", 100.0)];
        let d = site("d1", 0.0);
        let mut table = DistanceTable::new();
        table.insert(Location::Depot, DestinationId::new("d1"), 0.0);
        let cargo = deliverable_cargo(&vehicles, &[&d]);
        let err = traffic_indicators(&vehicles, &[&d], &table, &cargo).unwrap_err();
        assert!(matches!(err, PlanError::ZeroDistance { .. }));
    }

    #[test]
    fn missing_cargo_entry_is_fatal() {
        let vehicles = vec![truck("t1", 100.0)];
        let d = site("d1", 0.0);
        let mut table = DistanceTable::new();
        table.insert(Location::Depot, DestinationId::new("d1"), 25.0);
        let err = traffic_indicators(&vehicles, &[&d], &table, &HashMap::new()).unwrap_err();
        assert!(matches!(err, PlanError::MissingCargoEntry { .. }));
    }
}
