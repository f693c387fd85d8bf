//! The lane-cycling traffic-light controller.
//!
//! The controller gives one lane at a time a green phase, lets one vehicle
//! through per tick, and moves on to the next lane. An emergency can stop it
//! between phases or in the middle of one; an interrupted phase is resumed on
//! the same lane with the ticks it had left.

use crate::clock::Clock;
use crate::constants::LANE_COUNT;
use crate::report::{ControllerReport, PhaseRecord};
use crate::sink::LogSink;
use crate::state::SharedState;
use std::sync::Arc;

/// Green phase bounds in ticks, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreenTiming {
    pub min_green: u32,
    pub max_green: u32,
}

impl GreenTiming {
    /// Green time for a lane with `waiting` vehicles.
    pub fn green_time(&self, waiting: u32) -> u32 {
        waiting.clamp(self.min_green, self.max_green)
    }
}

impl Default for GreenTiming {
    fn default() -> Self {
        Self {
            min_green: crate::constants::MIN_GREEN,
            max_green: crate::constants::MAX_GREEN,
        }
    }
}

/// Controller-private phase bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GreenPhaseState {
    pub current_lane: usize,
    /// Ticks left in an interrupted phase, 0 otherwise.
    pub green_time_left: u32,
    /// The next phase reuses `green_time_left` instead of recomputing.
    pub resuming: bool,
}

/// Where the top of the control loop goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    EmergencyWait,
    SelectLane,
    AllCleared,
}

/// How a green phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseOutcome {
    Complete,
    Interrupted,
}

pub struct TrafficController {
    shared: Arc<SharedState>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LogSink>,
    timing: GreenTiming,
    phase: GreenPhaseState,
    report: ControllerReport,
}

impl TrafficController {
    pub fn new(
        shared: Arc<SharedState>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn LogSink>,
        timing: GreenTiming,
    ) -> Self {
        Self {
            shared,
            clock,
            sink,
            timing,
            phase: GreenPhaseState::default(),
            report: ControllerReport::default(),
        }
    }

    pub fn phase(&self) -> GreenPhaseState {
        self.phase
    }

    /// Runs until every lane is empty, no emergency is in effect and the
    /// scheduler has nothing left to apply. While events remain, empty lanes
    /// make the controller idle rather than end.
    pub fn run(mut self) -> ControllerReport {
        loop {
            match self.next_step() {
                Step::AllCleared => break,
                Step::EmergencyWait => self.wait_out_emergency(),
                Step::SelectLane => {
                    let (green_time, resumed) = self.select_green_time();
                    match self.run_green(green_time, resumed) {
                        PhaseOutcome::Complete => self.advance_lane(),
                        PhaseOutcome::Interrupted => self.phase.resuming = true,
                    }
                }
            }
        }

        self.sink.line("Simulation complete.");
        log::info!(
            "Controller finished after {} green phases",
            self.report.phases.len()
        );
        self.report
    }

    fn next_step(&self) -> Step {
        let mut state = self.shared.lock();
        loop {
            if state.emergency.paused {
                return Step::EmergencyWait;
            }
            if state.all_cleared() {
                self.sink.line("All vehicles cleared. Ending simulation.");
                return Step::AllCleared;
            }
            if state.lanes_empty() && !state.emergency_in_effect() {
                // More events are coming; nothing to serve until they do.
                log::debug!("No vehicles waiting; idling until the next event");
                state = self.shared.wait_for_activity(state);
                continue;
            }
            return Step::SelectLane;
        }
    }

    fn wait_out_emergency(&self) {
        self.sink.line("Emergency pause detected: all RED, waiting...");
        let state = self.shared.wait_for_resume(self.shared.lock());
        drop(state);
        self.sink.line("Controller resumed after emergency.");
    }

    /// Green time for the current lane, and whether it finishes an
    /// interrupted phase.
    fn select_green_time(&mut self) -> (u32, bool) {
        let resumed = self.phase.resuming;
        let green_time = if resumed {
            self.phase.resuming = false;
            self.phase.green_time_left
        } else {
            let waiting = self.shared.lock().vehicles[self.phase.current_lane];
            self.timing.green_time(waiting)
        };

        self.sink.line(&format!(
            "Lane {} GREEN for {} seconds",
            self.phase.current_lane, green_time
        ));
        (green_time, resumed)
    }

    fn run_green(&mut self, green_time: u32, resumed: bool) -> PhaseOutcome {
        let lane = self.phase.current_lane;
        let mut record = PhaseRecord::new(lane, green_time, resumed);

        for elapsed in 0..green_time {
            let mut state = self.shared.lock();

            if state.emergency.active {
                self.phase.green_time_left = green_time - elapsed;
                self.sink.line(&format!(
                    "Emergency mid-green! Pausing with {} seconds left.",
                    self.phase.green_time_left
                ));
                state.emergency.paused = true;
                let state = self.shared.wait_for_resume(state);
                drop(state);
                self.sink.line("Controller resumed after emergency.");

                record.interrupted = true;
                self.report.phases.push(record);
                return PhaseOutcome::Interrupted;
            }

            if state.vehicles[lane] > 0 {
                state.vehicles[lane] -= 1;
                record.vehicles_passed += 1;
                self.sink.line(&format!(
                    "Lane {}: Vehicle passed. Remaining: {}",
                    lane, state.vehicles[lane]
                ));
            } else {
                self.sink
                    .line(&format!("Lane {}: No vehicles at this tick.", lane));
            }
            record.ticks_run += 1;
            drop(state);

            self.clock.advance(1);
        }

        self.report.phases.push(record);
        PhaseOutcome::Complete
    }

    fn advance_lane(&mut self) {
        self.phase.green_time_left = 0;
        self.phase.resuming = false;
        let old_lane = self.phase.current_lane;
        self.phase.current_lane = (old_lane + 1) % LANE_COUNT;
        self.sink.line(&format!(
            "Lane {} RED. Next lane: {}",
            old_lane, self.phase.current_lane
        ));
    }
}
