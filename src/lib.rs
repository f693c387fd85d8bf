//! Single-intersection traffic-light controller.
//!
//! An [`EventScheduler`](scheduler::EventScheduler) replays timed vehicle
//! arrivals and emergencies into a [`SharedState`](state::SharedState) while a
//! [`TrafficController`](controller::TrafficController) cycles the four lanes
//! through green phases. Emergencies hold every lane red until an
//! [`EmergencyClearTask`](emergency::EmergencyClearTask) lifts them.

pub mod clock;
pub mod config;
pub mod constants;
pub mod controller;
pub mod emergency;
pub mod error;
pub mod events;
pub mod generator;
pub mod report;
pub mod scheduler;
pub mod simulation;
pub mod sink;
pub mod state;
