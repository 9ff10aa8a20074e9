//! Window watchdog
//!
//! An 8-bit down counter clocked from PCLK / (4096 · (prescaler + 1)). The chip resets when the
//! counter runs out, or when it is refreshed while still above the window value. An early wakeup
//! interrupt can be raised just before expiry.

use core::ops::Deref;

use embedded_time::rate::Hertz;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac;
use crate::pac::wwdg::{RegisterBlock, CFGR, CNT, CR, FLAG};
use crate::rcc::Clocks;
use crate::status::{poll, DEFAULT_TIMEOUT};

/// WWDG errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The counter is still above the window; refreshing now would reset the chip
    OutsideWindow,
}

impl From<Error> for crate::status::Error {
    fn from(_: Error) -> Self {
        crate::status::Error::Failed
    }
}

/// Window watchdog configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Counter clock = PCLK / (4096 · (prescaler + 1))
    pub prescaler: u8,
    /// Refreshes are only accepted once the counter is at or below this value
    pub window: u8,
    /// Value loaded into the counter on start and refresh
    pub reload: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prescaler: 0,
            window: 0xFF,
            reload: 0xFF,
        }
    }
}

/// Window watchdog
pub struct Wwdg<R = pac::WWDG> {
    regs: R,
    config: Config,
}

impl<R> Wwdg<R>
where
    R: Deref<Target = RegisterBlock>,
{
    pub fn new(regs: R, config: Config) -> Self {
        Wwdg { regs, config }
    }

    /// Frequency the counter decrements at
    pub fn counter_clock(&self, clocks: &Clocks) -> Hertz {
        Hertz(clocks.pclk().0 / (4096 * (u32::from(self.config.prescaler) + 1)))
    }

    /// Starts the counter. The watchdog can't be stopped until the next reset.
    pub fn start(&mut self) {
        self.regs
            .cfgr
            .write(CFGR::PRSC.val(u32::from(self.config.prescaler)));
        self.regs.cr.write(
            CR::WCNTL.val(u32::from(self.config.reload))
                + CR::WINR.val(u32::from(self.config.window))
                + CR::WWDGEN::SET,
        );
        debug!(
            "wwdg started, reload {} window {}",
            self.config.reload,
            self.config.window
        );
    }

    /// Starts the counter with the early wakeup interrupt enabled
    pub fn start_it(&mut self) {
        self.regs.intclr.write(FLAG::EWI::SET);
        self.regs.inten.write(FLAG::EWI::SET);
        self.start();
    }

    /// Reloads the counter if it has entered the window
    pub fn feed(&mut self) -> Result<(), Error> {
        if self.counter() > self.config.window {
            warn!("wwdg refresh outside window");
            return Err(Error::OutsideWindow);
        }
        self.regs
            .cr
            .modify(CR::WCNTL.val(u32::from(self.config.reload)));
        Ok(())
    }

    pub fn counter(&self) -> u8 {
        self.regs.cnt.read(CNT::CNT) as u8
    }

    /// Clears the early wakeup flag and calls `on_early_wakeup`
    pub fn irq_handler(&mut self, on_early_wakeup: impl FnOnce()) {
        if self.regs.sr.is_set(FLAG::EWI) {
            self.regs.intclr.write(FLAG::EWI::SET);
            on_early_wakeup();
        }
    }

    pub fn free(self) -> R {
        self.regs
    }
}

impl<R> embedded_hal_zero::watchdog::Watchdog for Wwdg<R>
where
    R: Deref<Target = RegisterBlock>,
{
    /// Waits for the counter to enter the window, then refreshes.
    ///
    /// The wait is bounded by [`DEFAULT_TIMEOUT`] counter reads; if the window doesn't open by
    /// then the refresh is skipped and logged.
    fn feed(&mut self) {
        let regs = &self.regs;
        let window = self.config.window;
        poll(DEFAULT_TIMEOUT, || regs.cnt.read(CNT::CNT) as u8 <= window);
        if let Err(e) = Wwdg::feed(self) {
            warn!("wwdg not refreshed: {}", e);
        }
    }
}
