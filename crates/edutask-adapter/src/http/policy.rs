/*
[INPUT]:  Poll interval, backoff shape, optional attempt/deadline bounds
[OUTPUT]: Delay before each follow-up query of a pending task
[POS]:    HTTP layer - poll loop timing
[UPDATE]: When changing poll timing or bounding rules
*/

use rand::Rng;
use std::time::Duration;

/// Interval between polls when nothing else is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How the wait between polls evolves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay after every pending answer
    Fixed,
    /// `interval * multiplier^(attempt - 1)`, capped at `max_delay`.
    /// With `jitter`, each delay is scaled by a random factor in `[0.5, 1.0]`.
    Exponential {
        multiplier: f64,
        max_delay: Duration,
        jitter: bool,
    },
}

/// Timing and bounds of a poll loop.
///
/// The default polls every two seconds with no bound, so a task is observed
/// until the service reports a terminal state or the caller cancels.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff: Backoff,
    /// Give up after this many queries that came back pending
    pub max_attempts: Option<u32>,
    /// Give up once waiting again would pass this much time since the first query
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            backoff: Backoff::Fixed,
            max_attempts: None,
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Unbounded policy with a fixed interval
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Delay to wait after the `attempt`-th query (1-indexed) came back pending
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential {
                multiplier,
                max_delay,
                jitter,
            } => {
                let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs = self.interval.as_secs_f64() * multiplier.max(1.0).powi(exponent);
                let capped = secs.min(max_delay.as_secs_f64());
                let scaled = if jitter {
                    capped * rand::thread_rng().gen_range(0.5..=1.0)
                } else {
                    capped
                };
                Duration::from_secs_f64(scaled)
            }
        }
    }

    /// Whether the attempt budget is spent after `attempts` pending answers
    pub fn attempts_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    /// Whether waiting `next_delay` more would pass the deadline
    pub fn deadline_passed(&self, elapsed: Duration, next_delay: Duration) -> bool {
        self.deadline
            .is_some_and(|deadline| elapsed.saturating_add(next_delay) > deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_two_seconds_unbounded() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.backoff, Backoff::Fixed);
        assert!(!policy.attempts_exhausted(u32::MAX));
        assert!(!policy.deadline_passed(Duration::from_secs(86_400), policy.interval));
    }

    #[test]
    fn test_fixed_delay_never_changes() {
        let policy = PollPolicy::fixed(Duration::from_millis(250));
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(50), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_backoff_grows_and_caps() {
        let policy = PollPolicy::fixed(Duration::from_secs(1)).with_backoff(Backoff::Exponential {
            multiplier: 2.0,
            max_delay: Duration::from_secs(5),
            jitter: false,
        });

        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(4), Duration::from_secs(5));
        assert_eq!(policy.delay_for(40), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_stays_within_half_to_full_delay() {
        let policy = PollPolicy::fixed(Duration::from_secs(4)).with_backoff(Backoff::Exponential {
            multiplier: 1.0,
            max_delay: Duration::from_secs(60),
            jitter: true,
        });

        for attempt in 1..20 {
            let delay = policy.delay_for(attempt);
            assert!(delay >= Duration::from_secs(2), "delay too short: {delay:?}");
            assert!(delay <= Duration::from_secs(4), "delay too long: {delay:?}");
        }
    }

    #[test]
    fn test_bounds() {
        let policy = PollPolicy::fixed(Duration::from_secs(2))
            .with_max_attempts(3)
            .with_deadline(Duration::from_secs(10));

        assert!(!policy.attempts_exhausted(2));
        assert!(policy.attempts_exhausted(3));
        assert!(!policy.deadline_passed(Duration::from_secs(8), Duration::from_secs(2)));
        assert!(policy.deadline_passed(Duration::from_secs(9), Duration::from_secs(2)));
    }
}
