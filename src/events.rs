//! Event source: decodes the line-oriented event file into [`Event`]s.
//!
//! ```text
//! # time type [lane count]
//! 0 vehicle 1 20
//! 3 emergency
//! ```
//!
//! Blank lines and `#` comments are skipped. Malformed lines are skipped with a
//! warning; they never reach the scheduler.

use crate::error::EventParseError;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    VehicleArrival { time: i64, lane: i64, count: u32 },
    EmergencyTrigger { time: i64 },
    /// Any other type token. Accepted by the source, ignored when applied.
    Unrecognized { time: i64, kind: String },
}

impl Event {
    pub fn time(&self) -> i64 {
        match self {
            Event::VehicleArrival { time, .. }
            | Event::EmergencyTrigger { time }
            | Event::Unrecognized { time, .. } => *time,
        }
    }

    /// Parses one data line. Returns `Ok(None)` for blank and comment lines.
    pub fn parse_line(line: &str) -> Result<Option<Event>, EventParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut fields = line.split_whitespace();
        let time = parse_field::<i64>(fields.next(), "time")?;
        let kind = fields.next().ok_or(EventParseError::Missing("type"))?;

        let event = match kind {
            "vehicle" => Event::VehicleArrival {
                time,
                lane: parse_field(fields.next(), "lane")?,
                count: parse_field(fields.next(), "count")?,
            },
            "emergency" => Event::EmergencyTrigger { time },
            other => Event::Unrecognized {
                time,
                kind: other.to_string(),
            },
        };
        Ok(Some(event))
    }
}

fn parse_field<T: std::str::FromStr>(
    raw: Option<&str>,
    field: &'static str,
) -> Result<T, EventParseError> {
    let raw = raw.ok_or(EventParseError::Missing(field))?;
    raw.parse().map_err(|_| EventParseError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

// Renders the same text format `parse_line` reads.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Event::VehicleArrival { time, lane, count } => {
                write!(f, "{} vehicle {} {}", time, lane, count)
            }
            Event::EmergencyTrigger { time } => write!(f, "{} emergency", time),
            Event::Unrecognized { time, kind } => write!(f, "{} {}", time, kind),
        }
    }
}

/// Lazily yields events from any buffered reader, in file order.
pub struct EventSource<R> {
    reader: R,
    line_number: usize,
    buf: String,
}

impl EventSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_reader(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> EventSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventSource<R> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    log::warn!(
                        "Stopped reading events after line {}: {}",
                        self.line_number,
                        e
                    );
                    return None;
                }
            }
            self.line_number += 1;

            match Event::parse_line(&self.buf) {
                Ok(Some(event)) => return Some(event),
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Skipping event line {}: {}", self.line_number, e);
                }
            }
        }
    }
}
