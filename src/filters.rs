//! Heuristic pre-filters that shrink the candidate destination set before
//! each period's assignment.
//!
//! Both filters are pure: they borrow destinations and never mutate them, so
//! a filtered-out destination stays live and can reappear once state changes
//! in a later period.

use crate::destination::Destination;

/// Whether the planning loop should keep iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Drops every destination already stocked past its planned coverage
/// horizon. Signals `Stop` when nothing is left to serve.
pub fn coverage_filter(destinations: &[Destination]) -> (Vec<&Destination>, Flow) {
    let survivors: Vec<&Destination> = destinations
        .iter()
        .filter(|destination| destination.coverage_time() < destination.planned_coverage_time())
        .collect();

    let flow = if survivors.is_empty() {
        Flow::Stop
    } else {
        Flow::Continue
    };
    (survivors, flow)
}

/// When the fleet is smaller than the candidate set, keeps only the
/// `vehicle_count` destinations closest to depletion.
///
/// Selection is by ascending coverage time, ties broken by destination id;
/// the survivors keep their input order. With enough vehicles the input is
/// returned unchanged.
pub fn fleet_size_filter(destinations: Vec<&Destination>, vehicle_count: usize) -> Vec<&Destination> {
    if vehicle_count >= destinations.len() {
        return destinations;
    }

    let mut by_urgency: Vec<&Destination> = destinations.clone();
    by_urgency.sort_by(|a, b| {
        a.coverage_time()
            .total_cmp(&b.coverage_time())
            .then_with(|| a.id().cmp(b.id()))
    });
    let kept: Vec<_> = by_urgency[..vehicle_count]
        .iter()
        .map(|destination| destination.id().clone())
        .collect();

    destinations
        .into_iter()
        .filter(|destination| kept.contains(destination.id()))
        .collect()
}
