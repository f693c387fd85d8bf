//! Wires the scheduler, the controller and the shared state together and
//! runs them to completion.

use crate::clock::{Clock, RealClock};
use crate::config::SimulationConfig;
use crate::controller::{GreenTiming, TrafficController};
use crate::error::SimulationError;
use crate::events::{Event, EventSource};
use crate::report::ControllerReport;
use crate::scheduler::{EventScheduler, ScheduleSummary};
use crate::sink::{LogSink, TrafficLog};
use crate::state::{SharedState, TrafficState};
use std::path::Path;
use std::sync::Arc;

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub schedule: ScheduleSummary,
    pub controller: ControllerReport,
    pub final_state: TrafficState,
}

/// Opens the event file, or reports on the status log that it could not and
/// yields nothing.
pub fn load_events(path: &Path, sink: &dyn LogSink) -> Box<dyn Iterator<Item = Event> + Send> {
    match EventSource::open(path) {
        Ok(source) => Box::new(source),
        Err(e) => {
            log::warn!("Event source {:?} unavailable: {}", path, e);
            sink.line(&format!(
                "Could not open {}. No events loaded.",
                path.display()
            ));
            Box::new(std::iter::empty())
        }
    }
}

pub struct Simulation {
    shared: Arc<SharedState>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LogSink>,
    timing: GreenTiming,
    emergency_clear_seconds: u64,
}

impl Simulation {
    pub fn new(config: &SimulationConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            shared: Arc::new(SharedState::new()),
            clock: Arc::new(RealClock::new(config.tick())),
            sink,
            timing: GreenTiming {
                min_green: config.min_green,
                max_green: config.max_green,
            },
            emergency_clear_seconds: config.emergency_clear_seconds,
        }
    }

    /// Replaces the real-time clock, e.g. with a `VirtualClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn shared(&self) -> Arc<SharedState> {
        Arc::clone(&self.shared)
    }

    /// Runs the scheduler and the controller on blocking worker threads and
    /// waits for both.
    pub async fn run<I>(self, events: I) -> Result<SimulationReport, SimulationError>
    where
        I: IntoIterator<Item = Event> + Send + 'static,
    {
        let scheduler = EventScheduler::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.clock),
            Arc::clone(&self.sink),
            self.emergency_clear_seconds,
        );
        let controller = TrafficController::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.clock),
            Arc::clone(&self.sink),
            self.timing,
        );

        let scheduler_handle = tokio::task::spawn_blocking(move || scheduler.run(events));
        let controller_handle = tokio::task::spawn_blocking(move || controller.run());

        let (schedule, controller) = tokio::join!(scheduler_handle, controller_handle);
        let schedule = schedule.map_err(|e| SimulationError::Worker {
            worker: "scheduler",
            message: e.to_string(),
        })?;
        let controller = controller.map_err(|e| SimulationError::Worker {
            worker: "controller",
            message: e.to_string(),
        })?;

        Ok(SimulationReport {
            schedule,
            controller,
            final_state: self.shared.snapshot(),
        })
    }
}

/// A whole run as the binary performs it: open the status log, replay the
/// event file, write the phase report.
pub async fn run_from_config(
    config: &SimulationConfig,
) -> Result<SimulationReport, SimulationError> {
    let sink: Arc<dyn LogSink> =
        Arc::new(TrafficLog::create(&config.log_file, config.echo_stdout)?);
    sink.line("Traffic simulation started");

    let events = load_events(&config.event_file, sink.as_ref());
    let report = Simulation::new(config, Arc::clone(&sink)).run(events).await?;

    if let Some(path) = &config.phase_report {
        match report.controller.write_csv(path) {
            Ok(()) => log::info!("Wrote {} phases to {:?}", report.controller.phases.len(), path),
            Err(e) => log::error!("Error writing phase report {:?}: {}", path, e),
        }
    }

    sink.line("All threads finished. Exiting.");
    Ok(report)
}
