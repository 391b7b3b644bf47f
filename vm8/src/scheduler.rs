use std::time::{Duration, Instant};

/// A fixed-rate tick source.
///
/// The machine core never consults a clock; the main loop owns wall-clock
/// timing by asking each of its tick sources how many ticks have come due
/// since it last asked. Running the executor and the timers off two
/// independent sources keeps their rates decoupled.
pub struct FixedRate {
    period: Duration,
    last: Instant,
}

impl FixedRate {
    pub fn new(hz: u32) -> Self {
        FixedRate {
            period: Duration::from_secs(1) / hz,
            last: Instant::now(),
        }
    }

    /// The number of whole periods elapsed since the previous call.
    pub fn due(&mut self) -> u32 {
        let mut ticks = 0;
        while self.last.elapsed() >= self.period {
            self.last += self.period;
            ticks += 1;
        }
        ticks
    }

    /// Time remaining until the next tick comes due.
    pub fn until_next(&self) -> Duration {
        self.period.saturating_sub(self.last.elapsed())
    }
}
