//! The period loop: filter, compute coefficients, solve, update, repeat.
//!
//! The planner owns the fleet and the destinations exclusively for the
//! duration of a run; periods are strictly sequential because each period's
//! candidate set and coefficients depend on the state committed by the
//! previous one. A period's mutations are applied only after the solver has
//! returned a complete feasible matching, so a failed period leaves state as
//! the previous period committed it.

use std::collections::HashMap;

use serde::Serialize;

use crate::destination::{Destination, DestinationId};
use crate::distance::DistanceProvider;
use crate::error::PlanError;
use crate::filters::{coverage_filter, fleet_size_filter, Flow};
use crate::matching::{AssignmentSolver, Matching};
use crate::report::{NullSink, ResultSink};
use crate::traffic::{deliverable_cargo, traffic_indicators, Pair};
use crate::update::{apply_matching, Delivery};
use crate::vehicle::Vehicle;

/// Knobs for a run.
#[derive(Debug, Clone)]
pub struct PlannerOptions {
    /// Upper bound on periods, for inputs whose demand can never be fully
    /// covered (a vehicle stranded with a partial load is never refueled).
    pub max_periods: usize,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self { max_periods: 1000 }
    }
}

/// One committed period: the realized matching, its objective value, and the
/// deliveries it produced.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodResult {
    pub label: String,
    pub matching: HashMap<Pair, f64>,
    pub objective: f64,
    pub deliveries: Vec<Delivery>,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Every destination reached its planned coverage horizon.
    AllCovered,
    /// `PlannerOptions::max_periods` was hit first.
    PeriodLimit,
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub periods: Vec<PeriodResult>,
    pub stopped: StopReason,
}

/// Multi-period distribution planner over an injected distance provider and
/// assignment solver.
pub struct Planner<D, S> {
    vehicles: Vec<Vehicle>,
    destinations: Vec<Destination>,
    distances: D,
    solver: S,
    options: PlannerOptions,
}

impl<D, S> Planner<D, S>
where
    D: DistanceProvider + Sync,
    S: AssignmentSolver,
{
    pub fn new(
        vehicles: Vec<Vehicle>,
        destinations: Vec<Destination>,
        distances: D,
        solver: S,
    ) -> Self {
        Self::with_options(vehicles, destinations, distances, solver, PlannerOptions::default())
    }

    pub fn with_options(
        vehicles: Vec<Vehicle>,
        destinations: Vec<Destination>,
        distances: D,
        solver: S,
        options: PlannerOptions,
    ) -> Self {
        Self {
            vehicles,
            destinations,
            distances,
            solver,
            options,
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Runs the loop to completion, discarding nothing but sink output.
    pub fn run(&mut self) -> Result<RunOutcome, PlanError> {
        self.run_with_sink(&mut NullSink)
    }

    /// Runs the loop, handing every committed period to `sink` before the
    /// next one starts.
    pub fn run_with_sink<K: ResultSink>(&mut self, sink: &mut K) -> Result<RunOutcome, PlanError> {
        let mut periods = Vec::new();

        for period in 1..=self.options.max_periods {
            let label = format!("period-{period}");

            // Filtering
            let (candidates, flow) = coverage_filter(&self.destinations);
            if flow == Flow::Stop {
                tracing::info!(periods = periods.len(), "all destinations covered");
                return Ok(RunOutcome {
                    periods,
                    stopped: StopReason::AllCovered,
                });
            }
            let candidates = fleet_size_filter(candidates, self.vehicles.len());

            // Computing
            let cargo = deliverable_cargo(&self.vehicles, &candidates);
            let indicators =
                traffic_indicators(&self.vehicles, &candidates, &self.distances, &cargo)?;

            // Solving
            let matching = if let [only] = candidates.as_slice() {
                pick_single_destination(&self.vehicles, only.id(), &indicators)?
            } else {
                let vehicle_ids: Vec<_> =
                    self.vehicles.iter().map(|v| v.id().clone()).collect();
                let destination_ids: Vec<_> =
                    candidates.iter().map(|d| d.id().clone()).collect();
                self.solver
                    .solve(&vehicle_ids, &destination_ids, &indicators)?
            };

            // Updating
            let deliveries =
                apply_matching(&mut self.vehicles, &mut self.destinations, &matching)?;

            tracing::info!(
                period = %label,
                objective = matching.objective,
                served = deliveries.len(),
                "period committed"
            );

            let result = PeriodResult {
                label,
                matching: matching.indicators,
                objective: matching.objective,
                deliveries,
            };
            sink.append(&result)?;
            periods.push(result);
        }

        // The limit may land exactly on the closing period; label honestly.
        let (_, flow) = coverage_filter(&self.destinations);
        let stopped = if flow == Flow::Stop {
            StopReason::AllCovered
        } else {
            tracing::info!(periods = periods.len(), "period limit reached");
            StopReason::PeriodLimit
        };
        Ok(RunOutcome { periods, stopped })
    }
}

/// Degenerate single-destination assignment: no matching problem to solve,
/// just the max-indicator pair across the fleet. Vehicles are visited in id
/// order and only a strictly larger indicator displaces the incumbent, so
/// exact ties go to the smallest vehicle id.
fn pick_single_destination(
    vehicles: &[Vehicle],
    destination: &DestinationId,
    indicators: &HashMap<Pair, f64>,
) -> Result<Matching, PlanError> {
    let mut ordered: Vec<&Vehicle> = vehicles.iter().collect();
    ordered.sort_by(|a, b| a.id().cmp(b.id()));

    let mut best: Option<(Pair, f64)> = None;
    for vehicle in ordered {
        let pair = Pair::new(vehicle.id().clone(), destination.clone());
        let value = *indicators
            .get(&pair)
            .ok_or_else(|| PlanError::MissingCargoEntry { pair: pair.clone() })?;
        if best.as_ref().is_none_or(|(_, incumbent)| value > *incumbent) {
            best = Some((pair, value));
        }
    }

    let (pair, value) = best.ok_or_else(|| {
        PlanError::NoOptimalSolution("no vehicles available for the remaining destination".to_string())
    })?;
    let mut indicators = HashMap::new();
    indicators.insert(pair, 1.0);
    Ok(Matching {
        indicators,
        objective: value,
    })
}
