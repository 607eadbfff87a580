use std::time::{Duration, Instant};

/// delay and sound timers count down at this rate, whatever the CPU speed
pub const TIMER_HZ: u32 = 60;

/// Turns wall-clock time into whole timer ticks. Leftover time that doesn't
/// make up a full tick is carried into the next call, so nothing drifts.
#[derive(Clone, Debug)]
pub struct TimerClock {
    last: Instant,
    carry: Duration,
    period: Duration,
}

impl TimerClock {
    pub fn new(start: Instant) -> Self {
        Self::with_rate(start, TIMER_HZ)
    }

    pub fn with_rate(start: Instant, hz: u32) -> Self {
        TimerClock {
            last: start,
            carry: Duration::ZERO,
            period: Duration::from_secs(1) / hz.max(1),
        }
    }

    /// how many ticks have elapsed between the previous call and `now`
    pub fn ticks(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last) + self.carry;
        self.last = now.max(self.last);
        let period = self.period.as_nanos();
        let ticks = elapsed.as_nanos() / period;
        self.carry = Duration::from_nanos((elapsed.as_nanos() % period) as u64);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}
