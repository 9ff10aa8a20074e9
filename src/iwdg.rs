/*!
  # Independent watchdog
  The IWDG runs from LIRC and counts a 20-bit reload value down to zero. On expiry it either
  resets the chip or, in interrupt mode, raises the IWDG interrupt. Once started it cannot be
  stopped.

  `CFGR` and `RLOAD` are write protected: [`UNLOCK_KEY`](crate::pac::iwdg::UNLOCK_KEY) has to be
  written to `UNLOCK` before each write and the register is locked again afterwards.

  ## Example
  ```no_run
  use cx32l003_hal::{iwdg::{Config, Iwdg, Mode}, pac};
  use embedded_time::duration::Extensions;

  let dp = pac::Peripherals::take().unwrap();
  let config = Config::default().mode(Mode::Reset).timeout(500_u32.milliseconds());
  let mut wd = Iwdg::new(dp.IWDG, config);
  wd.start();
  loop {
      // do other things, but feed at least every 500 ms
      wd.feed();
  }
  ```
*/

use core::ops::Deref;

use embedded_time::duration::Milliseconds;
use tock_registers::interfaces::{Readable, Writeable};

use crate::pac;
use crate::pac::iwdg::{RegisterBlock, CFGR, CMD_RELOAD, CMD_START, RLOAD, SR, UNLOCK_KEY};
use crate::system::LIRC_VALUE;

/// Largest reload value
pub const MAX_RELOAD: u32 = 0x000F_FFFF;

/// What happens when the counter runs out
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Reset,
    Interrupt,
}

/// Watchdog configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    mode: Mode,
    reload: u32,
}

impl Default for Config {
    /// Reset mode, about one second
    fn default() -> Self {
        Config {
            mode: Mode::Reset,
            reload: LIRC_VALUE,
        }
    }
}

impl Config {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Raw reload value in LIRC ticks, clamped to 20 bits
    pub fn reload(mut self, ticks: u32) -> Self {
        self.reload = ticks.min(MAX_RELOAD);
        self
    }

    /// Reload value for `period`, assuming the nominal LIRC frequency
    pub fn timeout(self, period: Milliseconds) -> Self {
        self.reload(ticks_for(period))
    }
}

fn ticks_for(period: Milliseconds) -> u32 {
    let ticks = u64::from(period.0) * u64::from(LIRC_VALUE) / 1000;
    ticks.min(u64::from(MAX_RELOAD)) as u32
}

/// Independent watchdog
pub struct Iwdg<R = pac::IWDG> {
    regs: R,
}

impl<R> Iwdg<R>
where
    R: Deref<Target = RegisterBlock>,
{
    /// Programs mode and reload value. The counter is not started.
    pub fn new(regs: R, config: Config) -> Self {
        let wd = Iwdg { regs };
        let mode = match config.mode {
            Mode::Reset => CFGR::MODE::Reset,
            Mode::Interrupt => CFGR::MODE::Interrupt,
        };
        wd.protected(|r| r.cfgr.write(mode + CFGR::INTMASK::CLEAR));
        wd.protected(|r| r.rload.write(RLOAD::VALUE.val(config.reload)));
        debug!("iwdg configured, reload {}", config.reload);
        wd
    }

    /// Writes the access key, runs `f`, then locks again
    fn protected(&self, f: impl FnOnce(&RegisterBlock)) {
        let regs = &*self.regs;
        critical_section::with(|_| {
            regs.unlock.set(UNLOCK_KEY);
            f(regs);
            regs.unlock.set(0);
        });
    }

    pub fn start(&mut self) {
        self.regs.cmdcr.set(CMD_START);
    }

    /// Reloads the counter
    pub fn feed(&mut self) {
        self.regs.cmdcr.set(CMD_RELOAD);
    }

    /// Changes the reload value, taking effect at the next feed
    pub fn set_reload(&mut self, ticks: u32) {
        let ticks = ticks.min(MAX_RELOAD);
        self.protected(|r| r.rload.write(RLOAD::VALUE.val(ticks)));
    }

    /// Current counter value
    pub fn counter(&self) -> u32 {
        self.regs.cntval.read(RLOAD::VALUE)
    }

    /// Interrupt mode only: clears the expiry flag and calls `on_expiry`
    pub fn irq_handler(&mut self, on_expiry: impl FnOnce()) {
        if self.regs.sr.is_set(SR::OV) {
            self.regs.intclr.write(SR::OV::SET);
            on_expiry();
        }
    }

    pub fn free(self) -> R {
        self.regs
    }
}

impl<R> embedded_hal_zero::watchdog::Watchdog for Iwdg<R>
where
    R: Deref<Target = RegisterBlock>,
{
    fn feed(&mut self) {
        Iwdg::feed(self);
    }
}

impl<R> embedded_hal_zero::watchdog::WatchdogEnable for Iwdg<R>
where
    R: Deref<Target = RegisterBlock>,
{
    type Time = Milliseconds;

    fn start<T>(&mut self, period: T)
    where
        T: Into<Self::Time>,
    {
        self.set_reload(ticks_for(period.into()));
        Iwdg::start(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_converts_at_lirc_rate() {
        assert_eq!(ticks_for(Milliseconds(1000)), LIRC_VALUE);
        assert_eq!(ticks_for(Milliseconds(10)), 384);
        assert_eq!(ticks_for(Milliseconds(1_000_000)), MAX_RELOAD);
    }
}
