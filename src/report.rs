//! Durable recording of committed periods.
//!
//! The loop itself only produces [`PeriodResult`](crate::planner::PeriodResult)
//! values; sinks decide what survives the run. The csv log mirrors the
//! downstream reporting format: one `period,vehicle,destination,delivered`
//! row per realized delivery, appended across runs.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::PlanError;
use crate::planner::PeriodResult;

/// Receives each committed period before the next one starts.
pub trait ResultSink {
    fn append(&mut self, result: &PeriodResult) -> Result<(), PlanError>;
}

/// Discards everything. Used by `Planner::run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn append(&mut self, _result: &PeriodResult) -> Result<(), PlanError> {
        Ok(())
    }
}

/// Append-only csv log of realized deliveries.
#[derive(Debug)]
pub struct CsvResultLog {
    writer: BufWriter<File>,
}

impl CsvResultLog {
    /// Opens (or creates) the log at `path` for appending, writing the
    /// header only when the file is fresh.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        let fresh = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);
        if fresh {
            writeln!(writer, "period,vehicle,destination,delivered")?;
        }
        Ok(Self { writer })
    }
}

impl ResultSink for CsvResultLog {
    fn append(&mut self, result: &PeriodResult) -> Result<(), PlanError> {
        for delivery in &result.deliveries {
            writeln!(
                self.writer,
                "{},{},{},{}",
                result.label, delivery.vehicle, delivery.destination, delivery.delivered
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::DestinationId;
    use crate::update::Delivery;
    use crate::vehicle::VehicleId;
    use std::collections::HashMap;

    fn period(label: &str, rows: &[(&str, &str, f64)]) -> PeriodResult {
        PeriodResult {
            label: label.to_string(),
            matching: HashMap::new(),
            objective: 0.0,
            deliveries: rows
                .iter()
                .map(|(vehicle, destination, delivered)| Delivery {
                    vehicle: VehicleId::new(*vehicle),
                    destination: DestinationId::new(*destination),
                    delivered: *delivered,
                })
                .collect(),
        }
    }

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("dispatch-planner-{}-{}", name, std::process::id()))
    }

    #[test]
    fn writes_header_once_and_appends_rows() {
        let path = scratch_path("log");
        let _ = std::fs::remove_file(&path);

        {
            let mut log = CsvResultLog::open(&path).unwrap();
            log.append(&period("period-1", &[("t1", "d1", 50.0)])).unwrap();
        }
        {
            let mut log = CsvResultLog::open(&path).unwrap();
            log.append(&period("period-2", &[("t1", "d2", 25.0), ("t2", "d1", 10.0)]))
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "period,vehicle,destination,delivered",
                "period-1,t1,d1,50",
                "period-2,t1,d2,25",
                "period-2,t2,d1,10",
            ]
        );

        let _ = std::fs::remove_file(&path);
    }
}
