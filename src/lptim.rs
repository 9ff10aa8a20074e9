//! Low power timer
//!
//! A 16-bit up counter that can run from LXT or LIRC in deep sleep. `LOAD` and `BGLOAD` live in
//! the timer's clock domain: after writing one of them the next write has to wait for
//! `CR.WTFLAG`.

use core::ops::Deref;

use embedded_time::duration::Microseconds;
use embedded_time::rate::Hertz;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac;
use crate::pac::lptim::{RegisterBlock, CR, INT};
use crate::rcc::Clocks;
use crate::status::{poll, DEFAULT_TIMEOUT};
use crate::system::{LIRC_VALUE, LXT_VALUE};

/// LPTIM errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The period is zero or longer than 65536 ticks
    InvalidPeriod,
    /// A reload register write did not settle
    Timeout,
}

impl From<Error> for crate::status::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Timeout => crate::status::Error::Timeout,
            Error::InvalidPeriod => crate::status::Error::Failed,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    Pclk,
    Lxt,
    Lirc,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Wraps from 0xFFFF to 0
    FreeRun,
    /// Restarts from `BGLOAD` on overflow
    Reload,
}

/// Counting only while the gate input (see [`crate::syscon::Syscon::lptim_gate_source`]) is
/// active
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gate {
    Disabled,
    ActiveHigh,
    ActiveLow,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub source: ClockSource,
    pub mode: Mode,
    pub gate: Gate,
    /// Toggle the LPTIM output pin on overflow
    pub toggle_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: ClockSource::Lirc,
            mode: Mode::Reload,
            gate: Gate::Disabled,
            toggle_output: false,
        }
    }
}

impl Config {
    pub fn source(mut self, source: ClockSource) -> Self {
        self.source = source;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn gate(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    pub fn toggle_output(mut self, toggle: bool) -> Self {
        self.toggle_output = toggle;
        self
    }
}

fn ticks(clock: Hertz, period: Microseconds) -> u64 {
    u64::from(clock.0) * u64::from(period.0) / 1_000_000
}

/// Ticks of `clock` in `period`
pub fn period_to_ticks(clock: Hertz, period: Microseconds) -> Result<u32, Error> {
    let ticks = ticks(clock, period);
    if ticks == 0 || ticks > 0x1_0000 {
        return Err(Error::InvalidPeriod);
    }
    Ok(ticks as u32)
}

/// Low power timer
pub struct LpTimer<R = pac::LPTIM> {
    regs: R,
    clock: Hertz,
    timeout: u32,
}

impl<R> LpTimer<R>
where
    R: Deref<Target = RegisterBlock>,
{
    /// Configures a stopped timer. The selected oscillator has to be running.
    pub fn new(regs: R, config: Config, clocks: Clocks) -> Self {
        let (source, clock) = match config.source {
            ClockSource::Pclk => (CR::TCKSEL::Pclk, clocks.pclk()),
            ClockSource::Lxt => (CR::TCKSEL::Lxt, Hertz(LXT_VALUE)),
            ClockSource::Lirc => (CR::TCKSEL::Lirc, Hertz(LIRC_VALUE)),
        };
        let mode = match config.mode {
            Mode::FreeRun => CR::MODE::FreeRun,
            Mode::Reload => CR::MODE::Reload,
        };
        regs.cr.modify(
            CR::TR::CLEAR
                + CR::INTEN::CLEAR
                + CR::CT::CLEAR
                + source
                + mode
                + CR::GATE.val((config.gate != Gate::Disabled) as u32)
                + CR::GATEPOL.val((config.gate == Gate::ActiveLow) as u32)
                + CR::TOGEN.val(config.toggle_output as u32),
        );
        regs.intclr.write(INT::TF::SET);
        LpTimer {
            regs,
            clock,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the poll budget when waiting for `LOAD`/`BGLOAD` writes to settle.
    /// It's not a time unit but the number of status reads.
    pub fn set_timeout(&mut self, timeout: u32) {
        self.timeout = timeout;
    }

    pub fn free(self) -> R {
        self.regs.cr.modify(CR::TR::CLEAR + CR::INTEN::CLEAR);
        self.regs
    }

    /// Counter clock
    pub fn clock(&self) -> Hertz {
        self.clock
    }

    fn settled(&self) -> Result<(), Error> {
        let regs = &self.regs;
        if poll(self.timeout, || regs.cr.is_set(CR::WTFLAG)) {
            Ok(())
        } else {
            warn!("lptim write did not settle");
            Err(Error::Timeout)
        }
    }

    /// Starts counting, overflowing after `count` ticks, clamped to 1..=65536.
    ///
    /// Fails with [`Error::Timeout`] if a reload write doesn't settle; the timer is left stopped.
    pub fn start_count(&mut self, count: u32) -> Result<(), Error> {
        let load = 0x1_0000 - count.clamp(1, 0x1_0000);
        self.regs.cr.modify(CR::TR::CLEAR);
        self.settled()?;
        self.regs.load.set(load);
        self.settled()?;
        self.regs.bgload.set(load);
        self.regs.intclr.write(INT::TF::SET);
        self.regs.cr.modify(CR::TR::SET);
        Ok(())
    }

    /// Starts counting, overflowing every `period`
    pub fn start(&mut self, period: impl Into<Microseconds>) -> Result<(), Error> {
        let ticks = period_to_ticks(self.clock, period.into())?;
        self.start_count(ticks)
    }

    /// Like [`LpTimer::start`] with the overflow interrupt enabled
    pub fn start_it(&mut self, period: impl Into<Microseconds>) -> Result<(), Error> {
        self.start(period)?;
        self.regs.cr.modify(CR::INTEN::SET);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.regs.cr.modify(CR::TR::CLEAR);
    }

    pub fn stop_it(&mut self) {
        self.regs.cr.modify(CR::TR::CLEAR + CR::INTEN::CLEAR);
        self.regs.intclr.write(INT::TF::SET);
    }

    pub fn counter(&self) -> u32 {
        self.regs.cnt.get() & 0xFFFF
    }

    /// Clears the overflow flag and calls `on_overflow` if it was raised
    pub fn irq_handler(&mut self, on_overflow: impl FnOnce()) {
        if self.regs.intsr.is_set(INT::TF) {
            self.regs.intclr.write(INT::TF::SET);
            on_overflow();
        }
    }
}

impl<R> embedded_hal_zero::timer::CountDown for LpTimer<R>
where
    R: Deref<Target = RegisterBlock>,
{
    type Time = Microseconds;

    /// A period shorter than one tick, zero included, overflows after a single tick. Periods
    /// beyond 65536 ticks are clamped to 65536.
    fn start<T>(&mut self, count: T)
    where
        T: Into<Self::Time>,
    {
        let ticks = ticks(self.clock, count.into()).clamp(1, 0x1_0000) as u32;
        if self.start_count(ticks).is_err() {
            warn!("lptim failed to start");
        }
    }

    fn wait(&mut self) -> nb::Result<(), void::Void> {
        if self.regs.intsr.is_set(INT::TF) {
            self.regs.intclr.write(INT::TF::SET);
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl<R> embedded_hal_zero::timer::Periodic for LpTimer<R> where R: Deref<Target = RegisterBlock> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lirc_period() {
        // 100 ms at 38.4 kHz
        assert_eq!(period_to_ticks(Hertz(38_400), Microseconds(100_000)), Ok(3_840));
        assert_eq!(
            period_to_ticks(Hertz(38_400), Microseconds(2_000_000)),
            Err(Error::InvalidPeriod)
        );
        assert_eq!(period_to_ticks(Hertz(38_400), Microseconds(10)), Err(Error::InvalidPeriod));
    }
}
