// Upstair - Power Management
//
// Idle/sleep countdown and battery level conversion.  The shutdown sequence
// itself belongs to the platform (see `Platform::shutdown`).

use crate::config::*;

// ---------------------------------------------------------------------------
// Idle/Sleep Timer
// ---------------------------------------------------------------------------

/// Counts application ticks down to an automatic shutdown.
///
/// Inert while auto-sleep is disabled.  Auto-sleep is off at boot.
#[derive(Debug, Clone)]
pub struct SleepTimer {
    auto_sleep: bool,
    countdown: u32,
    timeout: u32,
}

impl SleepTimer {
    pub const fn new(timeout: u32) -> Self {
        Self {
            auto_sleep: false,
            countdown: 0,
            timeout,
        }
    }

    /// Re-arm the countdown.  Called on button presses and detected motion.
    pub fn reset(&mut self) {
        if self.auto_sleep {
            self.countdown = self.timeout;
        }
    }

    /// Advance one tick.
    pub fn tick(&mut self) {
        if self.auto_sleep && self.countdown > 0 {
            self.countdown -= 1;
        }
    }

    /// The device should shut down now.
    pub fn expired(&self) -> bool {
        self.auto_sleep && self.countdown == 0
    }

    pub fn set_auto_sleep(&mut self, enabled: bool) {
        self.auto_sleep = enabled;
        self.reset();
    }

    /// Flip the user setting.  Enabling arms a full countdown.
    pub fn toggle_auto_sleep(&mut self) -> bool {
        self.set_auto_sleep(!self.auto_sleep);
        self.auto_sleep
    }

    pub fn auto_sleep(&self) -> bool {
        self.auto_sleep
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }
}

impl Default for SleepTimer {
    fn default() -> Self {
        Self::new(AUTO_SLEEP_TICKS)
    }
}

// ---------------------------------------------------------------------------
// Battery
// ---------------------------------------------------------------------------

/// Map a LiPo cell voltage to a charge percentage: 3.3 V = 0 %, 4.2 V = 100 %.
pub fn battery_percent(millivolts: u32) -> u8 {
    let span = BATTERY_FULL_MV - BATTERY_EMPTY_MV;
    let above_empty = millivolts.saturating_sub(BATTERY_EMPTY_MV).min(span);
    (above_empty * 100 / span) as u8
}
