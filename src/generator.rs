use crate::constants::LANE_COUNT;
use crate::events::Event;
use rand::Rng;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Shape of a randomly generated event stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficPattern {
    pub events: usize,
    /// Largest gap between consecutive events, in simulated seconds.
    pub max_gap: i64,
    /// Largest group of vehicles arriving in one event.
    pub max_vehicles: u32,
    /// Chance that any one event is an emergency instead of an arrival.
    pub emergency_probability: f64,
}

impl Default for TrafficPattern {
    fn default() -> Self {
        Self {
            events: 20,
            max_gap: 8,
            max_vehicles: 30,
            emergency_probability: 0.05,
        }
    }
}

/// Produces a time-ordered event stream starting at time 0.
pub fn generate_events<R: Rng>(rng: &mut R, pattern: &TrafficPattern) -> Vec<Event> {
    let mut time = 0;
    let mut events = Vec::with_capacity(pattern.events);

    for i in 0..pattern.events {
        if i > 0 {
            time += rng.random_range(0..=pattern.max_gap.max(0));
        }
        let emergency = rng.random_bool(pattern.emergency_probability.clamp(0.0, 1.0));
        let event = if emergency {
            Event::EmergencyTrigger { time }
        } else {
            Event::VehicleArrival {
                time,
                lane: rng.random_range(0..LANE_COUNT as i64),
                count: rng.random_range(1..=pattern.max_vehicles.max(1)),
            }
        };
        events.push(event);
    }
    events
}

/// Writes events in the event-file format, with a short header comment.
pub fn write_events(path: impl AsRef<Path>, events: &[Event]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# time type [lane count]")?;
    for event in events {
        writeln!(out, "{}", event)?;
    }
    out.flush()
}
