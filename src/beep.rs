//! Buzzer output
//!
//! Drives the BEEP pin with a square wave of `clock / (8 · (div + 1)) · 2^sel / 4`.

use core::ops::Deref;

use embedded_time::rate::Hertz;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac;
use crate::pac::beep::{RegisterBlock, CSR};
use crate::rcc::Clocks;
use crate::system::{HXT_VALUE, LIRC_VALUE};

/// Largest `BEEPDIV`
pub const MAX_DIV: u16 = 0xFFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    Lirc,
    Hxt,
    Pclk,
}

/// Output multiplier applied to the base frequency
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Multiplier {
    /// Base / 4
    Quarter = 0,
    /// Base / 2
    Half = 1,
    /// Base
    One = 2,
    /// Base · 2
    Double = 3,
}

/// Output frequency for a setting
pub fn frequency(clock: Hertz, div: u16, sel: Multiplier) -> Hertz {
    let base = clock.0 / (8 * (u32::from(div.min(MAX_DIV)) + 1));
    Hertz((base << sel as u32) / 4)
}

/// BEEP pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait BeepPin<BEEP> {}

unsafe impl<MODE> BeepPin<pac::BEEP> for crate::gpio::PD4<MODE> {}

/// Buzzer
pub struct Beep<BEEP, PIN> {
    beep: BEEP,
    pin: PIN,
    clocks: Clocks,
}

impl<BEEP, PIN> Beep<BEEP, PIN>
where
    BEEP: Deref<Target = RegisterBlock>,
    PIN: BeepPin<pac::BEEP>,
{
    /// Creates a disabled buzzer
    pub fn new(beep: BEEP, pin: PIN, clocks: Clocks) -> Self {
        beep.csr.set(0);
        Beep { beep, pin, clocks }
    }

    pub fn free(self) -> (BEEP, PIN) {
        self.beep.csr.set(0);
        (self.beep, self.pin)
    }

    /// Selects clock, divider and multiplier; `div` is clamped to 12 bits
    pub fn set_frequency(&mut self, source: ClockSource, div: u16, sel: Multiplier) {
        let clksel = match source {
            ClockSource::Lirc => CSR::BEEPCLKSEL::Lirc,
            ClockSource::Hxt => CSR::BEEPCLKSEL::Hxt,
            ClockSource::Pclk => CSR::BEEPCLKSEL::Pclk,
        };
        self.beep.csr.modify(
            clksel
                + CSR::BEEPDIV.val(u32::from(div.min(MAX_DIV)))
                + CSR::BEEPSEL.val(sel as u32),
        );
    }

    /// Frequency currently programmed
    pub fn frequency(&self) -> Hertz {
        let csr = self.beep.csr.extract();
        let clock = match csr.read_as_enum(CSR::BEEPCLKSEL) {
            Some(CSR::BEEPCLKSEL::Value::Hxt) => Hertz(HXT_VALUE),
            Some(CSR::BEEPCLKSEL::Value::Pclk) => self.clocks.pclk(),
            _ => Hertz(LIRC_VALUE),
        };
        let sel = match csr.read(CSR::BEEPSEL) {
            0 => Multiplier::Quarter,
            1 => Multiplier::Half,
            2 => Multiplier::One,
            _ => Multiplier::Double,
        };
        frequency(clock, csr.read(CSR::BEEPDIV) as u16, sel)
    }

    pub fn enable(&mut self) {
        self.beep.csr.modify(CSR::BEEPEN::SET);
    }

    pub fn disable(&mut self) {
        self.beep.csr.modify(CSR::BEEPEN::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.beep.csr.is_set(CSR::BEEPEN)
    }
}
