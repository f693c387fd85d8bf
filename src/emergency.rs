use crate::clock::Clock;
use crate::sink::LogSink;
use crate::state::SharedState;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Ends an emergency after a fixed simulated delay.
///
/// One task is spawned per emergency; it runs detached from the scheduler
/// that created it.
pub struct EmergencyClearTask {
    shared: Arc<SharedState>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LogSink>,
    delay_seconds: u64,
}

impl EmergencyClearTask {
    pub fn new(
        shared: Arc<SharedState>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn LogSink>,
        delay_seconds: u64,
    ) -> Self {
        Self {
            shared,
            clock,
            sink,
            delay_seconds,
        }
    }

    /// Runs the task on its own named thread.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("emergency-clear".into())
            .spawn(move || self.run())
    }

    /// Waits out the delay, then lifts the pause and wakes every waiter.
    pub fn run(self) {
        self.clock.advance(self.delay_seconds);

        {
            let mut state = self.shared.lock();
            state.emergency.paused = false;
            state.emergency.active = false;
            state.emergency.resume_signal = true;
            self.shared.notify_resume();
            self.shared.notify_activity();
        }

        self.sink.line("Emergency auto-cleared (simulated).");
        log::debug!("Emergency cleared after {}s", self.delay_seconds);
    }
}
