/*!
  # Timer
  TIM10 and TIM11 are 16/32-bit up counters clocked from PCLK through a power of two prescaler.
  In reload mode the counter restarts from `BGLOAD` every time it overflows and raises `UIF`.

  [`Timer::start`] programs a periodic 16-bit count and picks the smallest prescaler that fits the
  requested period.

  ## Example
  ```no_run
    use cx32l003_hal::{pac, rcc::Clocks, timer::Timer};
    use embedded_time::duration::Extensions;

    let dp = pac::Peripherals::take().unwrap();
    let mut timer = Timer::new(dp.TIM10, Clocks::default());
    timer.start_it(10_000_u32.microseconds()).unwrap();
  ```
*/

use core::ops::Deref;

use embedded_time::duration::{Microseconds, Milliseconds};
use embedded_time::rate::Hertz;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac;
use crate::pac::tim::{RegisterBlock, CR, INT};
use crate::rcc::Clocks;

/// Largest prescaler exponent, PCLK / 2^7
const MAX_PRS: u32 = 7;

/// Timer error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The period is zero or longer than 65536 ticks at the slowest prescaler
    InvalidPeriod,
}

impl From<Error> for crate::status::Error {
    fn from(_: Error) -> Self {
        crate::status::Error::Failed
    }
}

fn ticks(pclk: Hertz, period: Microseconds) -> u64 {
    u64::from(pclk.0) * u64::from(period.0) / 1_000_000
}

/// Prescaler exponent and tick count for `period` at `pclk`
pub fn period_to_ticks(pclk: Hertz, period: Microseconds) -> Result<(u32, u32), Error> {
    let ticks = ticks(pclk, period);
    (0..=MAX_PRS)
        .map(|prs| (prs, ticks >> prs))
        .find(|&(_, count)| count <= 0x1_0000)
        .filter(|&(_, count)| count > 0)
        .map(|(prs, count)| (prs, count as u32))
        .ok_or(Error::InvalidPeriod)
}

/// Base timer
pub struct Timer<TIM = pac::TIM10> {
    tim: TIM,
    clock: Hertz,
}

impl<TIM> Timer<TIM>
where
    TIM: Deref<Target = RegisterBlock>,
{
    /// Creates a stopped timer
    pub fn new(tim: TIM, clocks: Clocks) -> Self {
        tim.cr.set(0);
        tim.icr.write(INT::UIF::SET);
        Timer {
            tim,
            clock: clocks.pclk(),
        }
    }

    /// Stops the timer and releases the peripheral
    pub fn free(self) -> TIM {
        self.tim.cr.set(0);
        self.tim
    }

    /// Runs the counter in reload mode, overflowing every `count` ticks of PCLK / 2^`prs`
    pub fn start_count(&mut self, prs: u32, count: u32) {
        let load = 0x1_0000 - count.clamp(1, 0x1_0000);
        self.tim.cr.modify(CR::TR::CLEAR);
        self.tim.load.set(load);
        self.tim.bgload.set(load);
        self.tim.cnt.set(load);
        self.tim.icr.write(INT::UIF::SET);
        self.tim.cr.modify(
            CR::PRS.val(prs.min(MAX_PRS)) + CR::MODE::Reload + CR::TMRSZ::Bits16 + CR::TR::SET,
        );
        trace!("timer prs {} count {}", prs, count);
    }

    /// Starts a periodic count down of `period`
    pub fn start(&mut self, period: impl Into<Microseconds>) -> Result<(), Error> {
        let (prs, count) = period_to_ticks(self.clock, period.into())?;
        self.start_count(prs, count);
        Ok(())
    }

    /// Starts a periodic count down with the update interrupt enabled
    pub fn start_it(&mut self, period: impl Into<Microseconds>) -> Result<(), Error> {
        self.start(period)?;
        self.tim.cr.modify(CR::INTEN::SET);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.tim.cr.modify(CR::TR::CLEAR);
    }

    /// Stops the timer and disables its interrupt
    pub fn stop_it(&mut self) {
        self.tim.cr.modify(CR::TR::CLEAR + CR::INTEN::CLEAR);
        self.tim.icr.write(INT::UIF::SET);
    }

    pub fn is_running(&self) -> bool {
        self.tim.cr.is_set(CR::TR)
    }

    /// Current counter value in raw ticks
    pub fn current_count(&self) -> u32 {
        self.tim.cnt.get()
    }

    /// Frequency of a counter tick
    pub fn tick_rate(&self) -> Hertz {
        Hertz(self.clock.0 >> self.tim.cr.read(CR::PRS))
    }

    /// Time elapsed in the current period
    pub fn elapsed(&self) -> Milliseconds {
        let ticks = u64::from(self.current_count().wrapping_sub(self.tim.bgload.get()) & 0xFFFF);
        Milliseconds((ticks * 1000 / u64::from(self.tick_rate().0.max(1))) as u32)
    }

    /// Clears the update flag and calls `on_update` if it was raised
    pub fn irq_handler(&mut self, on_update: impl FnOnce()) {
        if self.tim.mis.is_set(INT::UIF) {
            self.tim.icr.write(INT::UIF::SET);
            on_update();
        }
    }
}

impl<TIM> embedded_hal_zero::timer::CountDown for Timer<TIM>
where
    TIM: Deref<Target = RegisterBlock>,
{
    type Time = Microseconds;

    /// A period shorter than one PCLK tick, zero included, overflows after a single tick. Longer
    /// periods than the timer supports are clamped to the longest one.
    fn start<T>(&mut self, count: T)
    where
        T: Into<Self::Time>,
    {
        let period = count.into();
        match period_to_ticks(self.clock, period) {
            Ok((prs, count)) => self.start_count(prs, count),
            Err(_) if ticks(self.clock, period) == 0 => self.start_count(0, 1),
            Err(_) => {
                warn!("timer period out of range");
                self.start_count(MAX_PRS, 0x1_0000)
            }
        }
    }

    fn wait(&mut self) -> nb::Result<(), void::Void> {
        if self.tim.ris.is_set(INT::UIF) {
            self.tim.icr.write(INT::UIF::SET);
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl<TIM> embedded_hal_zero::timer::Periodic for Timer<TIM> where
    TIM: Deref<Target = RegisterBlock>
{
}

impl<TIM> embedded_hal_zero::timer::Cancel for Timer<TIM>
where
    TIM: Deref<Target = RegisterBlock>,
{
    type Error = void::Void;

    fn cancel(&mut self) -> Result<(), Self::Error> {
        self.stop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_periods_run_undivided() {
        // 1 ms at 24 MHz is 24 000 ticks
        assert_eq!(
            period_to_ticks(Hertz(24_000_000), Microseconds(1_000)),
            Ok((0, 24_000))
        );
    }

    #[test]
    fn long_periods_pick_a_prescaler() {
        // 10 ms at 24 MHz is 240 000 ticks, 60 000 after dividing by 4
        assert_eq!(
            period_to_ticks(Hertz(24_000_000), Microseconds(10_000)),
            Ok((2, 60_000))
        );
        assert_eq!(
            period_to_ticks(Hertz(24_000_000), Microseconds(1_000_000)),
            Err(Error::InvalidPeriod)
        );
        assert_eq!(period_to_ticks(Hertz(24_000_000), Microseconds(0)), Err(Error::InvalidPeriod));
    }
}
