use crate::input::KeyLayout;
use std::time::Duration;

/// a comfortable speed for most COSMAC-era programs
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;

/// the renderer never repaints faster than this
pub const DEFAULT_REFRESH_HZ: u32 = 60;

/// how long a terminal key press counts as held down
pub const DEFAULT_KEY_HOLD: Duration = Duration::from_millis(150);

/// Runtime settings for one machine.
#[derive(Clone, Debug)]
pub struct Config {
    /// 0 runs as fast as the host allows
    pub instructions_per_second: u32,
    pub refresh_hz: u32,
    /// seed for Cxkk; drawn from entropy when absent
    pub seed: Option<u64>,
    pub trace: bool,
    pub key_layout: KeyLayout,
    pub key_hold: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            refresh_hz: DEFAULT_REFRESH_HZ,
            seed: None,
            trace: false,
            key_layout: KeyLayout::Conventional,
            key_hold: DEFAULT_KEY_HOLD,
        }
    }
}

impl Config {
    /// no pacing and a fixed seed; what the tests want
    pub fn unthrottled(seed: u64) -> Self {
        Config {
            instructions_per_second: 0,
            seed: Some(seed),
            ..Config::default()
        }
    }

    /// time per instruction, or `None` when unthrottled
    pub fn cycle_period(&self) -> Option<Duration> {
        match self.instructions_per_second {
            0 => None,
            ips => Some(Duration::from_secs(1) / ips),
        }
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(1) / self.refresh_hz.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.instructions_per_second, 700);
        assert_eq!(c.key_layout, KeyLayout::Conventional);
        assert!(c.cycle_period().is_some());
        assert_eq!(c.refresh_period(), Duration::from_secs(1) / 60);
    }

    #[test]
    fn test_unthrottled() {
        let c = Config::unthrottled(7);
        assert_eq!(c.cycle_period(), None);
        assert_eq!(c.seed, Some(7));
    }
}
