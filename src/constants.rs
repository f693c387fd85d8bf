// Number of lanes cycled by the controller.
pub const LANE_COUNT: usize = 4;

// Green phase bounds, in ticks (one tick = one simulated second).
pub const MIN_GREEN: u32 = 10;
pub const MAX_GREEN: u32 = 90;

// Real time that stands in for one simulated second.
pub const TICK_MILLIS: u64 = 100;

// Simulated seconds before an emergency auto-clears.
pub const EMERGENCY_CLEAR_SECONDS: u64 = 5;

// Default file locations
pub const EVENT_FILE: &str = "events.txt";
pub const LOG_FILE: &str = "traffic_log.txt";
pub const PHASE_REPORT_FILE: &str = "phase_summary.csv";
