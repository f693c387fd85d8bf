//! Shared traffic state and its lock/condition discipline.
//!
//! One mutex guards everything the workers share. Two condition variables hang
//! off it:
//! - `resume`: the controller waits here while an emergency holds every lane red.
//! - `activity`: the controller waits here when there is nothing to serve yet
//!   but the scheduler still has events to apply.

use crate::constants::LANE_COUNT;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Emergency flags. `active` means an emergency is in effect and a clear task
/// is pending; `paused` means every lane must stay red right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmergencyState {
    pub active: bool,
    pub paused: bool,
    pub resume_signal: bool,
}

/// Data guarded by [`SharedState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficState {
    pub vehicles: [u32; LANE_COUNT],
    pub emergency: EmergencyState,
    /// True until the scheduler has applied its last event.
    pub events_pending: bool,
}

impl TrafficState {
    pub fn lanes_empty(&self) -> bool {
        self.vehicles.iter().all(|&n| n == 0)
    }

    pub fn emergency_in_effect(&self) -> bool {
        self.emergency.active || self.emergency.paused
    }

    /// Nothing waiting, no emergency, and nothing more to come.
    pub fn all_cleared(&self) -> bool {
        self.lanes_empty() && !self.emergency_in_effect() && !self.events_pending
    }
}

impl Default for TrafficState {
    fn default() -> Self {
        Self {
            vehicles: [0; LANE_COUNT],
            emergency: EmergencyState::default(),
            events_pending: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct SharedState {
    state: Mutex<TrafficState>,
    resume: Condvar,
    activity: Condvar,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the given lane counts with no events pending.
    pub fn with_vehicles(vehicles: [u32; LANE_COUNT]) -> Self {
        Self {
            state: Mutex::new(TrafficState {
                vehicles,
                events_pending: false,
                ..TrafficState::default()
            }),
            ..Self::default()
        }
    }

    // Every critical section leaves the state consistent, so a poisoned lock
    // is still safe to use.
    pub fn lock(&self) -> MutexGuard<'_, TrafficState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> TrafficState {
        self.lock().clone()
    }

    /// Blocks until `resume_signal` is set, then consumes it before returning,
    /// all under the lock held by `guard`.
    pub fn wait_for_resume<'a>(
        &self,
        guard: MutexGuard<'a, TrafficState>,
    ) -> MutexGuard<'a, TrafficState> {
        let mut guard = self
            .resume
            .wait_while(guard, |s| !s.emergency.resume_signal)
            .unwrap_or_else(PoisonError::into_inner);
        guard.emergency.resume_signal = false;
        guard
    }

    /// Blocks until the scheduler reports progress (an event applied, an
    /// emergency raised or cleared, or the event stream finished).
    pub fn wait_for_activity<'a>(
        &self,
        guard: MutexGuard<'a, TrafficState>,
    ) -> MutexGuard<'a, TrafficState> {
        self.activity
            .wait_while(guard, |s| {
                s.lanes_empty() && !s.emergency_in_effect() && s.events_pending
            })
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn notify_resume(&self) {
        self.resume.notify_all();
    }

    pub fn notify_activity(&self) {
        self.activity.notify_all();
    }

    /// Marks the event stream as exhausted and wakes an idle controller.
    pub fn finish_events(&self) {
        self.lock().events_pending = false;
        self.notify_activity();
    }
}
