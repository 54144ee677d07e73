//! One-to-one assignment of vehicles to destinations.
//!
//! The planner only depends on the [`AssignmentSolver`] seam; the shipped
//! [`BranchBoundSolver`] is an exact matcher, but any implementation that
//! returns an optimal perfect matching (ILP, network flow, ...) can be
//! injected instead.

use std::collections::HashMap;

use crate::destination::DestinationId;
use crate::error::PlanError;
use crate::traffic::Pair;
use crate::vehicle::VehicleId;

/// A realized one-to-one matching: binary indicator per submitted pair and
/// the objective value achieved.
#[derive(Debug, Clone)]
pub struct Matching {
    pub indicators: HashMap<Pair, f64>,
    pub objective: f64,
}

impl Matching {
    /// Pairs marked as served.
    pub fn served(&self) -> impl Iterator<Item = &Pair> {
        self.indicators
            .iter()
            .filter(|(_, indicator)| **indicator == 1.0)
            .map(|(pair, _)| pair)
    }
}

/// Solves the bipartite assignment: every vehicle matched to exactly one
/// destination and vice versa, maximizing the coefficient sum.
///
/// Implementations must either return an optimal perfect matching or fail
/// with [`PlanError::NoOptimalSolution`]; partial matchings are not valid.
pub trait AssignmentSolver {
    fn solve(
        &self,
        vehicles: &[VehicleId],
        destinations: &[DestinationId],
        coefficients: &HashMap<Pair, f64>,
    ) -> Result<Matching, PlanError>;
}

/// Exact maximizer: depth-first assignment with an optimistic remaining
/// bound. Deterministic for the caller-supplied orderings; on equal-value
/// optima the first one found wins.
///
/// Intended for the fleet sizes this planner targets; the seam exists so a
/// stronger solver can replace it without touching the loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchBoundSolver;

impl AssignmentSolver for BranchBoundSolver {
    fn solve(
        &self,
        vehicles: &[VehicleId],
        destinations: &[DestinationId],
        coefficients: &HashMap<Pair, f64>,
    ) -> Result<Matching, PlanError> {
        let n = vehicles.len();
        if n == 0 || destinations.len() != n {
            return Err(PlanError::NoOptimalSolution(format!(
                "perfect matching needs equal non-empty sides, got {} vehicles and {} destinations",
                vehicles.len(),
                destinations.len()
            )));
        }

        let mut matrix = vec![vec![0.0_f64; n]; n];
        for (i, vehicle) in vehicles.iter().enumerate() {
            for (j, destination) in destinations.iter().enumerate() {
                let pair = Pair::new(vehicle.clone(), destination.clone());
                matrix[i][j] = *coefficients
                    .get(&pair)
                    .ok_or_else(|| PlanError::MissingCargoEntry { pair: pair.clone() })?;
            }
        }

        // Optimistic bound: suffix sums of per-vehicle maxima.
        let row_max: Vec<f64> = matrix
            .iter()
            .map(|row| row.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect();
        let mut bound = vec![0.0_f64; n + 1];
        for i in (0..n).rev() {
            bound[i] = bound[i + 1] + row_max[i];
        }

        let mut search = Search {
            matrix: &matrix,
            bound: &bound,
            used: vec![false; n],
            current: Vec::with_capacity(n),
            best_value: f64::NEG_INFINITY,
            best: None,
        };
        search.descend(0.0);

        let assignment = search
            .best
            .ok_or_else(|| PlanError::NoOptimalSolution("no feasible assignment".to_string()))?;

        let mut indicators = HashMap::with_capacity(n * n);
        for (i, vehicle) in vehicles.iter().enumerate() {
            for (j, destination) in destinations.iter().enumerate() {
                let indicator = if assignment[i] == j { 1.0 } else { 0.0 };
                indicators.insert(Pair::new(vehicle.clone(), destination.clone()), indicator);
            }
        }

        Ok(Matching {
            indicators,
            objective: search.best_value,
        })
    }
}

struct Search<'a> {
    matrix: &'a [Vec<f64>],
    bound: &'a [f64],
    used: Vec<bool>,
    current: Vec<usize>,
    best_value: f64,
    best: Option<Vec<usize>>,
}

impl Search<'_> {
    fn descend(&mut self, value: f64) {
        let i = self.current.len();
        let n = self.matrix.len();
        if i == n {
            if value > self.best_value {
                self.best_value = value;
                self.best = Some(self.current.clone());
            }
            return;
        }
        // Even the most optimistic completion cannot beat the incumbent.
        if self.best.is_some() && value + self.bound[i] <= self.best_value {
            return;
        }
        for j in 0..n {
            if self.used[j] {
                continue;
            }
            self.used[j] = true;
            self.current.push(j);
            self.descend(value + self.matrix[i][j]);
            self.current.pop();
            self.used[j] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> (Vec<VehicleId>, Vec<DestinationId>) {
        let vehicles = names.iter().map(|n| VehicleId::new(format!("t{n}"))).collect();
        let destinations = names.iter().map(|n| DestinationId::new(format!("d{n}"))).collect();
        (vehicles, destinations)
    }

    fn coefficients(rows: &[&[f64]], vehicles: &[VehicleId], destinations: &[DestinationId]) -> HashMap<Pair, f64> {
        let mut map = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                map.insert(
                    Pair::new(vehicles[i].clone(), destinations[j].clone()),
                    *value,
                );
            }
        }
        map
    }

    #[test]
    fn beats_row_greedy_on_cross_assignment() {
        let (vehicles, destinations) = ids(&["1", "2"]);
        // Greedy row-wise takes 10 + 1 = 11; the optimum crosses for 19.
        let coeffs = coefficients(&[&[10.0, 9.0], &[10.0, 1.0]], &vehicles, &destinations);
        let matching = BranchBoundSolver.solve(&vehicles, &destinations, &coeffs).unwrap();
        assert_eq!(matching.objective, 19.0);
        assert_eq!(
            matching.indicators[&Pair::new(vehicles[0].clone(), destinations[1].clone())],
            1.0
        );
        assert_eq!(
            matching.indicators[&Pair::new(vehicles[1].clone(), destinations[0].clone())],
            1.0
        );
    }

    #[test]
    fn marks_every_pair_with_a_binary_indicator() {
        let (vehicles, destinations) = ids(&["1", "2", "3"]);
        let coeffs = coefficients(
            &[&[4.0, 2.0, 1.0], &[2.0, 5.0, 3.0], &[1.0, 2.0, 6.0]],
            &vehicles,
            &destinations,
        );
        let matching = BranchBoundSolver.solve(&vehicles, &destinations, &coeffs).unwrap();
        assert_eq!(matching.indicators.len(), 9);
        assert_eq!(matching.served().count(), 3);
        assert_eq!(matching.objective, 15.0);
    }

    #[test]
    fn matching_is_perfect_on_both_sides() {
        let (vehicles, destinations) = ids(&["1", "2", "3", "4"]);
        let coeffs = coefficients(
            &[
                &[3.0, 7.0, 5.0, 1.0],
                &[2.0, 9.0, 4.0, 8.0],
                &[6.0, 1.0, 2.0, 7.0],
                &[5.0, 4.0, 8.0, 3.0],
            ],
            &vehicles,
            &destinations,
        );
        let matching = BranchBoundSolver.solve(&vehicles, &destinations, &coeffs).unwrap();

        for vehicle in &vehicles {
            let served = matching
                .served()
                .filter(|pair| &pair.vehicle == vehicle)
                .count();
            assert_eq!(served, 1, "vehicle {vehicle} must serve exactly once");
        }
        for destination in &destinations {
            let served = matching
                .served()
                .filter(|pair| &pair.destination == destination)
                .count();
            assert_eq!(served, 1, "destination {destination} must be served exactly once");
        }
    }

    #[test]
    fn unequal_sides_are_infeasible() {
        let (vehicles, _) = ids(&["1", "2"]);
        let destinations = vec![DestinationId::new("d1")];
        let err = BranchBoundSolver
            .solve(&vehicles, &destinations, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, PlanError::NoOptimalSolution(_)));
    }

    #[test]
    fn missing_coefficient_is_fatal() {
        let (vehicles, destinations) = ids(&["1", "2"]);
        let mut coeffs = coefficients(&[&[1.0, 2.0], &[3.0, 4.0]], &vehicles, &destinations);
        coeffs.remove(&Pair::new(vehicles[1].clone(), destinations[0].clone()));
        let err = BranchBoundSolver
            .solve(&vehicles, &destinations, &coeffs)
            .unwrap_err();
        assert!(matches!(err, PlanError::MissingCargoEntry { .. }));
    }
}
