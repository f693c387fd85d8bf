use crate::clock::Clock;
use crate::constants::LANE_COUNT;
use crate::emergency::EmergencyClearTask;
use crate::events::Event;
use crate::sink::LogSink;
use crate::state::SharedState;
use std::sync::Arc;

/// What the scheduler did with its events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub vehicle_events: usize,
    pub vehicles_added: u64,
    pub emergencies: usize,
    /// Triggers that arrived while an emergency was already active; no
    /// second clear task was spawned for them.
    pub duplicate_emergencies: usize,
    pub ignored: usize,
}

// Marks the event stream finished when dropped, so an idle controller is
// released even if the scheduler unwinds.
struct FinishOnDrop(Arc<SharedState>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.finish_events();
    }
}

/// Replays events against the shared state at their simulated time.
pub struct EventScheduler {
    shared: Arc<SharedState>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LogSink>,
    emergency_clear_seconds: u64,
    current_time: i64,
    summary: ScheduleSummary,
}

impl EventScheduler {
    pub fn new(
        shared: Arc<SharedState>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn LogSink>,
        emergency_clear_seconds: u64,
    ) -> Self {
        Self {
            shared,
            clock,
            sink,
            emergency_clear_seconds,
            current_time: 0,
            summary: ScheduleSummary::default(),
        }
    }

    pub fn current_time(&self) -> i64 {
        self.current_time
    }

    /// Drains `events` in order, then marks the event stream finished. The
    /// stream is marked finished on every exit path, including a panic.
    pub fn run<I>(mut self, events: I) -> ScheduleSummary
    where
        I: IntoIterator<Item = Event>,
    {
        let finish = FinishOnDrop(Arc::clone(&self.shared));

        for event in events {
            // Events behind the clock are applied immediately.
            let wait = event.time().saturating_sub(self.current_time);
            if wait > 0 {
                self.clock.advance(wait as u64);
            }
            self.current_time = self.current_time.max(event.time());
            self.apply(&event);
        }

        drop(finish);
        log::info!(
            "Scheduler finished at time {}: {:?}",
            self.current_time,
            self.summary
        );
        self.summary
    }

    /// Applies one event to the shared state right away.
    pub fn apply(&mut self, event: &Event) {
        let spawn_clear = {
            let mut state = self.shared.lock();
            let spawn_clear = match *event {
                Event::VehicleArrival { time, lane, count } => {
                    match usize::try_from(lane).ok().filter(|&l| l < LANE_COUNT) {
                        Some(lane) => {
                            state.vehicles[lane] = state.vehicles[lane].saturating_add(count);
                            self.sink.line(&format!(
                                "Time {}: Added {} vehicles to lane {}, total = {}",
                                time, count, lane, state.vehicles[lane]
                            ));
                            self.summary.vehicle_events += 1;
                            self.summary.vehicles_added += u64::from(count);
                        }
                        None => {
                            log::debug!(
                                "Ignoring vehicle event for lane {} at time {}",
                                lane,
                                time
                            );
                            self.summary.ignored += 1;
                        }
                    }
                    false
                }
                Event::EmergencyTrigger { time } => {
                    // An active emergency already has its clear task pending.
                    let already_pending = state.emergency.active;
                    state.emergency.active = true;
                    state.emergency.paused = true;
                    state.emergency.resume_signal = false;
                    self.sink
                        .line(&format!("Time {}: Emergency triggered!", time));
                    self.summary.emergencies += 1;
                    if already_pending {
                        self.summary.duplicate_emergencies += 1;
                        log::debug!("Emergency at time {} joins the pending clear", time);
                    }
                    !already_pending
                }
                Event::Unrecognized { time, ref kind } => {
                    log::debug!("Ignoring '{}' event at time {}", kind, time);
                    self.summary.ignored += 1;
                    false
                }
            };
            self.shared.notify_activity();
            spawn_clear
        };

        if spawn_clear {
            self.spawn_clear_task();
        }
    }

    fn spawn_clear_task(&self) {
        let task = EmergencyClearTask::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.clock),
            Arc::clone(&self.sink),
            self.emergency_clear_seconds,
        );
        if let Err(e) = task.spawn() {
            // Without a clear the controller would stay paused forever, so
            // clear from this thread instead.
            log::warn!("Could not spawn emergency clear thread ({}); clearing inline", e);
            EmergencyClearTask::new(
                Arc::clone(&self.shared),
                Arc::clone(&self.clock),
                Arc::clone(&self.sink),
                self.emergency_clear_seconds,
            )
            .run();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::sink::MemoryLog;
    use std::time::Duration;

    // Never returns, so a spawned clear task stays pending.
    struct Stalled;

    impl Clock for Stalled {
        fn advance(&self, _seconds: u64) {
            loop {
                std::thread::park();
            }
        }
    }

    fn scheduler() -> (EventScheduler, Arc<SharedState>, Arc<VirtualClock>, Arc<MemoryLog>) {
        let shared = Arc::new(SharedState::new());
        let clock = Arc::new(VirtualClock::new());
        let log = Arc::new(MemoryLog::new());
        let scheduler = EventScheduler::new(shared.clone(), clock.clone(), log.clone(), 5);
        (scheduler, shared, clock, log)
    }

    #[test]
    fn vehicle_events_accumulate_per_lane() {
        let (scheduler, shared, clock, log) = scheduler();
        let summary = scheduler.run(vec![
            Event::VehicleArrival { time: 3, lane: 0, count: 5 },
            Event::VehicleArrival { time: 4, lane: 0, count: 2 },
            Event::VehicleArrival { time: 4, lane: 3, count: 1 },
        ]);

        let state = shared.snapshot();
        assert_eq!(state.vehicles, [7, 0, 0, 1]);
        assert!(!state.events_pending);
        assert_eq!(clock.elapsed(), 4);
        assert_eq!(summary.vehicle_events, 3);
        assert_eq!(summary.vehicles_added, 8);
        assert_eq!(
            log.lines(),
            vec![
                "Time 3: Added 5 vehicles to lane 0, total = 5",
                "Time 4: Added 2 vehicles to lane 0, total = 7",
                "Time 4: Added 1 vehicles to lane 3, total = 1",
            ]
        );
    }

    #[test]
    fn out_of_range_lanes_are_ignored_silently() {
        let (scheduler, shared, _clock, log) = scheduler();
        let summary = scheduler.run(vec![
            Event::VehicleArrival { time: 0, lane: 4, count: 5 },
            Event::VehicleArrival { time: 0, lane: -1, count: 5 },
            Event::Unrecognized { time: 1, kind: "parade".into() },
        ]);

        assert!(shared.snapshot().lanes_empty());
        assert!(log.lines().is_empty());
        assert_eq!(summary.ignored, 3);
    }

    #[test]
    fn out_of_order_times_never_wait_backwards() {
        let (scheduler, _shared, clock, log) = scheduler();
        scheduler.run(vec![
            Event::VehicleArrival { time: 10, lane: 1, count: 1 },
            Event::VehicleArrival { time: 5, lane: 1, count: 1 },
            Event::VehicleArrival { time: 12, lane: 1, count: 1 },
        ]);

        // 10, then no wait, then 2 more: the clock never moves backwards.
        assert_eq!(clock.elapsed(), 12);
        assert_eq!(log.lines()[1], "Time 5: Added 1 vehicles to lane 1, total = 2");
    }

    #[test]
    fn extreme_timestamps_never_overflow_the_wait() {
        let (scheduler, shared, clock, log) = scheduler();
        scheduler.run(vec![
            Event::VehicleArrival { time: 5, lane: 0, count: 1 },
            Event::VehicleArrival { time: i64::MIN, lane: 0, count: 1 },
            Event::VehicleArrival { time: i64::MAX, lane: 0, count: 1 },
        ]);

        assert_eq!(clock.elapsed(), i64::MAX as u64);
        assert_eq!(shared.snapshot().vehicles[0], 3);
        assert!(!shared.snapshot().events_pending);
        assert_eq!(
            log.lines()[1],
            format!("Time {}: Added 1 vehicles to lane 0, total = 2", i64::MIN)
        );
    }

    #[test]
    fn event_stream_is_finished_even_when_the_source_panics() {
        let (scheduler, shared, _clock, _log) = scheduler();
        let events = vec![Event::VehicleArrival { time: 0, lane: 2, count: 4 }]
            .into_iter()
            .chain(std::iter::once_with(|| -> Event { panic!("event source failed") }));

        let outcome = std::thread::spawn(move || scheduler.run(events)).join();

        assert!(outcome.is_err());
        let state = shared.snapshot();
        assert!(!state.events_pending);
        assert_eq!(state.vehicles[2], 4);
    }

    #[test]
    fn emergency_sets_flags_and_schedules_one_clear() {
        let (mut scheduler, shared, _clock, log) = scheduler();
        // Stale signal from an earlier, unobserved clear.
        shared.lock().emergency.resume_signal = true;

        scheduler.apply(&Event::EmergencyTrigger { time: 3 });
        assert!(log.wait_for_line("auto-cleared", Duration::from_secs(5)));

        let state = shared.snapshot();
        assert!(!state.emergency.active);
        assert!(!state.emergency.paused);
        assert!(state.emergency.resume_signal);
        assert_eq!(log.lines()[0], "Time 3: Emergency triggered!");
    }

    #[test]
    fn trigger_discards_a_stale_resume_signal() {
        let shared = Arc::new(SharedState::new());
        shared.lock().emergency.resume_signal = true;
        let mut scheduler =
            EventScheduler::new(shared.clone(), Arc::new(Stalled), Arc::new(MemoryLog::new()), 5);

        scheduler.apply(&Event::EmergencyTrigger { time: 0 });

        let state = shared.snapshot();
        assert!(state.emergency.active);
        assert!(state.emergency.paused);
        assert!(!state.emergency.resume_signal);
    }

    #[test]
    fn overlapping_emergencies_share_one_clear_task() {
        let shared = Arc::new(SharedState::new());
        let log = Arc::new(MemoryLog::new());
        let mut scheduler = EventScheduler::new(shared.clone(), Arc::new(Stalled), log.clone(), 5);

        scheduler.apply(&Event::EmergencyTrigger { time: 1 });
        scheduler.apply(&Event::EmergencyTrigger { time: 2 });

        assert_eq!(scheduler.summary.emergencies, 2);
        assert_eq!(scheduler.summary.duplicate_emergencies, 1);
        assert!(shared.snapshot().emergency.active);
        assert_eq!(
            log.lines(),
            vec!["Time 1: Emergency triggered!", "Time 2: Emergency triggered!"]
        );
    }
}
