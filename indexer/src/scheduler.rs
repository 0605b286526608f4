//! Ticker deciding which kind of pass runs next.

use std::{sync::Arc, time::Duration};

use crate::{clock::Clock, service::PassMode};

mod defaults {
    use std::time::Duration;

    pub const POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);
}

/// First tick is an immediate full pass; every later tick waits `interval`
/// and asks for an incremental one.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    interval: Duration,
    ticks: u64,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            interval: defaults::POLL_INTERVAL,
            ticks: 0,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn tick(&mut self) -> PassMode {
        let mode = if self.ticks == 0 {
            PassMode::Full
        } else {
            self.clock.sleep(self.interval).await;
            PassMode::Incremental
        };
        self.ticks += 1;
        mode
    }
}

