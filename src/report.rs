use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::path::Path;

/// One green phase as the controller ran it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub lane: usize,
    pub green_time: u32,
    pub ticks_run: u32,
    pub vehicles_passed: u32,
    /// An emergency cut this phase short.
    pub interrupted: bool,
    /// This phase finishes one that an emergency interrupted.
    pub resumed: bool,
}

impl PhaseRecord {
    pub fn new(lane: usize, green_time: u32, resumed: bool) -> Self {
        Self {
            lane,
            green_time,
            ticks_run: 0,
            vehicles_passed: 0,
            interrupted: false,
            resumed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerReport {
    pub phases: Vec<PhaseRecord>,
}

impl ControllerReport {
    pub fn vehicles_passed(&self) -> u64 {
        self.phases.iter().map(|p| u64::from(p.vehicles_passed)).sum()
    }

    pub fn interruptions(&self) -> usize {
        self.phases.iter().filter(|p| p.interrupted).count()
    }

    /// Writes every phase to `path` as CSV, replacing any previous file.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
        let file = File::create(path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);
        for phase in &self.phases {
            wtr.serialize(phase)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
