//! Delays

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use embedded_hal_zero::blocking::delay::{DelayMs, DelayUs};

use crate::rcc::Clocks;

/// Largest SysTick reload value
const MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Reload value for the next SysTick run out of `ticks` cycles, and the cycles that run takes.
///
/// A reload of N wraps after N + 1 cycles and a reload of 0 never wraps, so nothing is left to
/// wait for once fewer than two cycles remain.
fn chunk(ticks: u64) -> Option<(u32, u64)> {
    if ticks < 2 {
        return None;
    }
    let count = ticks.min(u64::from(MAX_RELOAD) + 1);
    Some(((count - 1) as u32, count))
}

/// SysTick running from HCLK as a delay provider
pub struct Delay {
    syst: SYST,
    hclk: u32,
}

impl Delay {
    /// Configures SysTick to count core clock cycles
    pub fn new(mut syst: SYST, clocks: Clocks) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.disable_interrupt();
        Delay {
            syst,
            hclk: clocks.hclk().0,
        }
    }

    /// Releases the SysTick peripheral
    pub fn free(self) -> SYST {
        self.syst
    }

    /// Busy-waits for `ticks` core clock cycles
    pub fn delay_ticks(&mut self, mut ticks: u64) {
        while let Some((reload, count)) = chunk(ticks) {
            self.syst.set_reload(reload);
            self.syst.clear_current();
            self.syst.enable_counter();
            while !self.syst.has_wrapped() {}
            self.syst.disable_counter();
            ticks -= count;
        }
    }

    fn ticks(&self, amount: u32, per_second: u64) -> u64 {
        u64::from(amount) * u64::from(self.hclk) / per_second
    }
}

impl embedded_hal::delay::DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        let ticks = self.ticks(ns, 1_000_000_000);
        self.delay_ticks(ticks);
    }

    fn delay_us(&mut self, us: u32) {
        let ticks = self.ticks(us, 1_000_000);
        self.delay_ticks(ticks);
    }

    fn delay_ms(&mut self, ms: u32) {
        let ticks = self.ticks(ms, 1_000);
        self.delay_ticks(ticks);
    }
}

macro_rules! impl_delay_zero {
    ($($t:ty),+) => {$(
        impl DelayUs<$t> for Delay {
            fn delay_us(&mut self, us: $t) {
                let ticks = self.ticks(u32::from(us), 1_000_000);
                self.delay_ticks(ticks);
            }
        }

        impl DelayMs<$t> for Delay {
            fn delay_ms(&mut self, ms: $t) {
                let ticks = self.ticks(u32::from(ms), 1_000);
                self.delay_ticks(ticks);
            }
        }
    )+};
}

impl_delay_zero!(u8, u16, u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_is_one_less_than_the_wait() {
        // 1 ms at 24 MHz
        assert_eq!(chunk(24_000), Some((23_999, 24_000)));
        assert_eq!(chunk(2), Some((1, 2)));
        assert_eq!(chunk(1), None);
        assert_eq!(chunk(0), None);
    }

    #[test]
    fn long_waits_are_split_at_the_counter_width() {
        assert_eq!(chunk(u64::MAX), Some((MAX_RELOAD, 0x0100_0000)));

        let mut ticks = 3 * 0x0100_0000 + 5;
        let mut runs = Vec::new();
        while let Some((reload, count)) = chunk(ticks) {
            runs.push(reload);
            ticks -= count;
        }
        assert_eq!(runs, [MAX_RELOAD, MAX_RELOAD, MAX_RELOAD, 4]);
        assert_eq!(ticks, 0);
    }
}
