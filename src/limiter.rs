// Upstair - Outbound Rate Limiter
//
// Keeps consecutive Stairs detections from flooding the radio: at most one
// broadcast per cooldown window.

#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    remaining: u32,
}

impl RateLimiter {
    pub const fn new() -> Self {
        Self { remaining: 0 }
    }

    /// Returns `true` when a send is allowed now, and starts a new cooldown of
    /// `cooldown_ticks`.  Returns `false` while a cooldown is running.
    pub fn try_send(&mut self, cooldown_ticks: u32) -> bool {
        if self.remaining > 0 {
            return false;
        }
        self.remaining = cooldown_ticks;
        true
    }

    /// Advance one tick.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SEND_COOLDOWN_TICKS;

    #[test]
    fn one_send_per_cooldown_window() {
        let mut limiter = RateLimiter::new();
        let sends = (0..SEND_COOLDOWN_TICKS)
            .filter(|_| {
                let sent = limiter.try_send(SEND_COOLDOWN_TICKS);
                limiter.tick();
                sent
            })
            .count();
        assert_eq!(sends, 1);

        // The next window opens exactly at tick 160.
        assert!(limiter.try_send(SEND_COOLDOWN_TICKS));
    }

    #[test]
    fn zero_cooldown_never_blocks() {
        let mut limiter = RateLimiter::new();
        assert!(limiter.try_send(0));
        assert!(limiter.try_send(0));
    }

    #[test]
    fn tick_saturates_at_zero() {
        let mut limiter = RateLimiter::new();
        limiter.tick();
        assert_eq!(limiter.remaining(), 0);
        limiter.try_send(2);
        limiter.tick();
        limiter.tick();
        limiter.tick();
        assert_eq!(limiter.remaining(), 0);
    }
}
