/*!
  # Serial Peripheral Interface
  To construct the SPI instance use the `Spi::new` function.
  The pin parameter is a tuple containing `(miso, mosi, sclk)` or `(miso, mosi, ss, sclk)`.
  The controller only runs as a master here; `ss` is driven through [`Spi::set_ssn`].

  SCK is PCLK divided by a power of two between 2 and 256. `new` picks the smallest divider that
  doesn't exceed the requested frequency.

  ## Initialisation example
  ```no_run
    use cx32l003_hal::{gpio::{GpioExt, AF2}, pac, prelude::*, rcc::Clocks, spi::Spi};
    use embedded_hal::spi::MODE_0;

    let dp = pac::Peripherals::take().unwrap();
    let gpioc = dp.GPIOC.split();
    let sclk = gpioc.pc5.into_alternate::<AF2>();
    let mosi = gpioc.pc6.into_alternate::<AF2>();
    let miso = gpioc.pc7.into_alternate::<AF2>();

    let mut spi = Spi::new(dp.SPI, (miso, mosi, sclk), MODE_0, 1_000_000u32.Hz(), Clocks::default())
        .unwrap();
    spi.set_ssn(false);
  ```
*/

use core::ops::Deref;

use embedded_hal::spi::{self as spi_one, ErrorKind, Mode, Phase, Polarity};
use embedded_time::rate::Hertz;
use tock_registers::interfaces::{Readable, Writeable};

use crate::pac;
use crate::pac::spi::{RegisterBlock, CR, DATA, SR, SSN};
use crate::rcc::Clocks;
use crate::status::{poll, DEFAULT_TIMEOUT};

/// SPI error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Mode fault occurred
    ModeFault,
    /// DATA was written while a transfer was running
    WriteCollision,
    /// Slave select error
    SlaveSelect,
    /// The transfer did not complete before the poll budget ran out
    Timeout,
    /// SCK can't be derived from PCLK
    InvalidFrequency,
}

impl spi_one::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::ModeFault => ErrorKind::ModeFault,
            Error::SlaveSelect => ErrorKind::ChipSelectFault,
            _ => ErrorKind::Other,
        }
    }
}

impl From<Error> for crate::status::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Timeout => crate::status::Error::Timeout,
            _ => crate::status::Error::Failed,
        }
    }
}

/// `CR.SPR` for the fastest SCK at or below `freq`
pub fn prescaler(pclk: Hertz, freq: Hertz) -> Result<u32, Error> {
    (0..8)
        .find(|spr| pclk.0 >> (spr + 1) <= freq.0)
        .ok_or(Error::InvalidFrequency)
}

/// MISO pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait MisoPin<SPI> {}

/// MOSI pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait MosiPin<SPI> {}

/// SS pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait SsPin<SPI> {}

/// SCLK pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait SclkPin<SPI> {}

/// Spi pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait Pins<SPI> {}

unsafe impl<MODE> SclkPin<pac::SPI> for crate::gpio::PC5<MODE> {}
unsafe impl<MODE> SclkPin<pac::SPI> for crate::gpio::PD1<MODE> {}
unsafe impl<MODE> MosiPin<pac::SPI> for crate::gpio::PC6<MODE> {}
unsafe impl<MODE> MisoPin<pac::SPI> for crate::gpio::PC7<MODE> {}
unsafe impl<MODE> SsPin<pac::SPI> for crate::gpio::PA3<MODE> {}

unsafe impl<MISO, MOSI, SS, SCLK> Pins<pac::SPI> for (MISO, MOSI, SS, SCLK)
where
    MISO: MisoPin<pac::SPI>,
    MOSI: MosiPin<pac::SPI>,
    SS: SsPin<pac::SPI>,
    SCLK: SclkPin<pac::SPI>,
{
}

unsafe impl<MISO, MOSI, SCLK> Pins<pac::SPI> for (MISO, MOSI, SCLK)
where
    MISO: MisoPin<pac::SPI>,
    MOSI: MosiPin<pac::SPI>,
    SCLK: SclkPin<pac::SPI>,
{
}

pub struct Spi<SPI, PINS> {
    spi: SPI,
    pins: PINS,
    timeout: u32,
}

impl<SPI, PINS> Spi<SPI, PINS>
where
    SPI: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::SPI>,
{
    /// Enables the controller as master with `mode` and SCK at or below `freq`
    pub fn new(
        spi: SPI,
        pins: PINS,
        mode: Mode,
        freq: Hertz,
        clocks: Clocks,
    ) -> Result<Self, Error> {
        let spr = prescaler(clocks.pclk(), freq)?;

        spi.ssn.write(SSN::SSN::SET);
        spi.cr.write(
            CR::SPR.val(spr)
                + CR::CPOL.val((mode.polarity == Polarity::IdleHigh) as u32)
                + CR::CPHA.val((mode.phase == Phase::CaptureOnSecondTransition) as u32)
                + CR::MSTR::SET
                + CR::SPEN::SET,
        );
        debug!("spi master, SPR {}", spr);

        Ok(Spi {
            spi,
            pins,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Disables the controller and releases peripheral and pins
    pub fn free(self) -> (SPI, PINS) {
        self.spi.cr.set(0);
        self.spi.ssn.write(SSN::SSN::SET);
        (self.spi, self.pins)
    }

    /// Drives the slave select output; low selects the device
    pub fn set_ssn(&mut self, high: bool) {
        self.spi.ssn.write(SSN::SSN.val(high as u32));
    }

    /// Set the poll budget when waiting for a transfer.
    /// It's not a time unit but the number of status reads.
    pub fn set_timeout(&mut self, timeout: u32) {
        self.timeout = timeout;
    }

    fn check_errors(&self) -> Result<(), Error> {
        let sr = self.spi.sr.extract();
        if sr.is_set(SR::MDF) {
            Err(Error::ModeFault)
        } else if sr.is_set(SR::SSERR) {
            Err(Error::SlaveSelect)
        } else if sr.is_set(SR::WCOL) {
            Err(Error::WriteCollision)
        } else {
            Ok(())
        }
    }

    /// Shifts `word` out and returns the byte shifted in
    pub fn transfer_byte(&mut self, word: u8) -> Result<u8, Error> {
        self.spi.data.write(DATA::DATA.val(u32::from(word)));
        let spi = &self.spi;
        if !poll(self.timeout, || spi.sr.is_set(SR::SPIF)) {
            warn!("spi transfer timeout");
            return Err(Error::Timeout);
        }
        self.check_errors()?;
        Ok(self.spi.data.read(DATA::DATA) as u8)
    }
}

impl<SPI, PINS> spi_one::ErrorType for Spi<SPI, PINS> {
    type Error = Error;
}

impl<SPI, PINS> spi_one::SpiBus<u8> for Spi<SPI, PINS>
where
    SPI: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::SPI>,
{
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.transfer_byte(0)?;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.transfer_byte(word)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for i in 0..read.len().max(write.len()) {
            let incoming = self.transfer_byte(write.get(i).copied().unwrap_or(0))?;
            if let Some(word) = read.get_mut(i) {
                *word = incoming;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.transfer_byte(*word)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<SPI, PINS> embedded_hal_nb::spi::FullDuplex<u8> for Spi<SPI, PINS>
where
    SPI: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::SPI>,
{
    fn read(&mut self) -> nb::Result<u8, Error> {
        if !self.spi.sr.is_set(SR::SPIF) {
            return Err(nb::Error::WouldBlock);
        }
        self.check_errors()?;
        Ok(self.spi.data.read(DATA::DATA) as u8)
    }

    fn write(&mut self, word: u8) -> nb::Result<(), Error> {
        self.spi.data.write(DATA::DATA.val(u32::from(word)));
        Ok(())
    }
}

impl<SPI, PINS> embedded_hal_zero::spi::FullDuplex<u8> for Spi<SPI, PINS>
where
    SPI: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::SPI>,
{
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Error> {
        embedded_hal_nb::spi::FullDuplex::read(self)
    }

    fn send(&mut self, word: u8) -> nb::Result<(), Error> {
        embedded_hal_nb::spi::FullDuplex::write(self, word)
    }
}

impl<SPI, PINS> embedded_hal_zero::blocking::spi::transfer::Default<u8> for Spi<SPI, PINS>
where
    SPI: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::SPI>,
{
}

impl<SPI, PINS> embedded_hal_zero::blocking::spi::write::Default<u8> for Spi<SPI, PINS>
where
    SPI: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::SPI>,
{
}

impl<SPI, PINS> embedded_hal_zero::blocking::spi::write_iter::Default<u8> for Spi<SPI, PINS>
where
    SPI: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::SPI>,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prescaler_never_exceeds_requested_rate() {
        // 24 MHz / 2 = 12 MHz
        assert_eq!(prescaler(Hertz(24_000_000), Hertz(12_000_000)), Ok(0));
        // 24 MHz / 4 = 6 MHz is the fastest at or below 10 MHz
        assert_eq!(prescaler(Hertz(24_000_000), Hertz(10_000_000)), Ok(1));
        // 24 MHz / 32 = 750 kHz
        assert_eq!(prescaler(Hertz(24_000_000), Hertz(1_000_000)), Ok(4));
        assert_eq!(prescaler(Hertz(24_000_000), Hertz(50_000)), Err(Error::InvalidFrequency));
    }
}
