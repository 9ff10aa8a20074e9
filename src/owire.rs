//! 1-Wire bus master
//!
//! The controller generates reset pulses and read/write time slots in hardware. Slot timing is
//! programmed in controller clock ticks, derived here from microsecond values in [`Config`].
//!
//! # Example
//!
//! ```no_run
//! use cx32l003_hal::{gpio::{GpioExt, AF3}, owire::{Config, OneWire}, pac, rcc::Clocks};
//!
//! let dp = pac::Peripherals::take().unwrap();
//! let gpioa = dp.GPIOA.split();
//! let mut dq = gpioa.pa3.into_alternate::<AF3>();
//! dq.set_open_drain(true);
//!
//! let mut bus = OneWire::new(dp.OWIRE, dq, Config::default(), Clocks::default()).unwrap();
//! let rom = bus.read_rom().unwrap();
//! ```

use core::ops::Deref;

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac;
use crate::pac::owire::{RegisterBlock, CMD, COUNT, CR, FLAGS, NFCR};
use crate::rcc::Clocks;
use crate::status::{poll, DEFAULT_TIMEOUT};

/// Read ROM command
pub const READ_ROM: u8 = 0x33;
/// Skip ROM command
pub const SKIP_ROM: u8 = 0xCC;

/// Largest value of the timing counters
const MAX_COUNT: u32 = 0xFFF;

type Flag = tock_registers::fields::Field<u32, FLAGS::Register>;

/// 1-Wire errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// No device answered the reset pulse
    NoPresence,
    /// The ROM code failed its CRC
    Crc,
    /// The controller did not finish before the poll budget ran out
    Timeout,
    /// A slot time can't be expressed in controller ticks
    InvalidTiming,
}

impl From<Error> for crate::status::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Timeout => crate::status::Error::Timeout,
            _ => crate::status::Error::Failed,
        }
    }
}

/// Slot timing in microseconds
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Length of the reset pulse
    pub reset_us: u32,
    /// Presence sample point, counted from the end of the reset pulse
    pub presence_us: u32,
    /// Length of a time slot
    pub slot_us: u32,
    /// Low time starting a write-1 or read slot
    pub drive_low_us: u32,
}

impl Default for Config {
    /// Standard speed
    fn default() -> Self {
        Config {
            reset_us: 480,
            presence_us: 70,
            slot_us: 65,
            drive_low_us: 6,
        }
    }
}

/// Controller divider and counter values for `config`, picking the finest divider that fits
pub fn timing(pclk: u32, config: &Config) -> Result<(CR::CLKDIV::Value, [u32; 4]), Error> {
    let dividers = [
        (CR::CLKDIV::Value::Div1, 1),
        (CR::CLKDIV::Value::Div2, 2),
        (CR::CLKDIV::Value::Div4, 4),
        (CR::CLKDIV::Value::Div16, 16),
    ];
    let us = [
        config.reset_us,
        config.presence_us,
        config.slot_us,
        config.drive_low_us,
    ];
    for &(div, by) in dividers.iter() {
        let clock = u64::from(pclk / by);
        let mut counts = [0u32; 4];
        let mut fits = true;
        for (count, &t) in counts.iter_mut().zip(us.iter()) {
            let ticks = clock * u64::from(t) / 1_000_000;
            fits &= ticks > 0 && ticks <= u64::from(MAX_COUNT);
            *count = ticks as u32;
        }
        if fits {
            return Ok((div, counts));
        }
    }
    Err(Error::InvalidTiming)
}

/// Dallas/Maxim CRC-8 (reflected polynomial 0x8C, initial value 0)
pub fn crc8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |mut crc, &byte| {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
        crc
    })
}

/// 64-bit ROM code of a device
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rom(pub [u8; 8]);

impl Rom {
    /// Validates the trailing CRC byte
    pub fn from_bytes(bytes: [u8; 8]) -> Result<Self, Error> {
        if crc8(&bytes) == 0 {
            Ok(Rom(bytes))
        } else {
            Err(Error::Crc)
        }
    }

    pub fn family_code(&self) -> u8 {
        self.0[0]
    }

    /// 48-bit serial number, least significant byte first
    pub fn serial(&self) -> [u8; 6] {
        let mut serial = [0; 6];
        serial.copy_from_slice(&self.0[1..7]);
        serial
    }
}

/// What [`OneWire::irq_handler`] observed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Reset finished; `presence` is false if no device answered
    ResetDone { presence: bool },
    TransmitDone,
    /// A byte or bit was received
    ReceiveDone(u8),
}

/// DQ pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait DqPin<OWIRE> {}

unsafe impl<MODE> DqPin<pac::OWIRE> for crate::gpio::PA3<MODE> {}
unsafe impl<MODE> DqPin<pac::OWIRE> for crate::gpio::PB4<MODE> {}

/// 1-Wire master
pub struct OneWire<OWIRE, PIN> {
    owire: OWIRE,
    pin: PIN,
    timeout: u32,
}

impl<OWIRE, PIN> OneWire<OWIRE, PIN>
where
    OWIRE: Deref<Target = RegisterBlock>,
    PIN: DqPin<pac::OWIRE>,
{
    /// Programs the slot timing and enables the controller with its noise filter
    pub fn new(owire: OWIRE, pin: PIN, config: Config, clocks: Clocks) -> Result<Self, Error> {
        let (div, [reset, presence, slot, drive_low]) = timing(clocks.pclk().0, &config)?;

        owire.cr.set(0);
        owire.rstcnt.write(COUNT::VALUE.val(reset));
        owire.prescnt.write(COUNT::VALUE.val(presence));
        owire.bitratecnt.write(COUNT::VALUE.val(slot));
        owire.drcnt.write(COUNT::VALUE.val(drive_low));
        owire.nfcr.write(NFCR::NFEN::SET);
        owire.intclr.write(
            FLAGS::ACKERR::SET + FLAGS::RXDONE::SET + FLAGS::TXDONE::SET + FLAGS::INITDONE::SET,
        );
        owire.cr.write(CR::CLKDIV.val(div as u32) + CR::EN::SET);
        debug!("owire reset {} slot {} ticks", reset, slot);

        Ok(OneWire {
            owire,
            pin,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Disables the controller and releases peripheral and pin
    pub fn release(self) -> (OWIRE, PIN) {
        self.owire.cr.set(0);
        (self.owire, self.pin)
    }

    /// Set the poll budget when waiting for the controller.
    /// It's not a time unit but the number of status reads.
    pub fn set_timeout(&mut self, timeout: u32) {
        self.timeout = timeout;
    }

    fn run(&mut self, command: CMD::CMD::Value, done: Flag, timeout: u32) -> Result<(), Error> {
        let owire = &self.owire;
        owire.intclr.write(done.val(1));
        owire.cmd.write(CMD::CMD.val(command as u32));
        if poll(timeout, || owire.sr.is_set(done)) {
            owire.intclr.write(done.val(1));
            Ok(())
        } else {
            warn!("owire timeout");
            Err(Error::Timeout)
        }
    }

    /// Issues a reset pulse and reports whether any device answered
    pub fn reset(&mut self) -> Result<bool, Error> {
        self.owire.intclr.write(FLAGS::ACKERR::SET);
        self.run(CMD::CMD::Value::Init, FLAGS::INITDONE, self.timeout)?;
        let presence = !self.owire.sr.is_set(FLAGS::ACKERR);
        self.owire.intclr.write(FLAGS::ACKERR::SET);
        Ok(presence)
    }

    fn transmit(&mut self, word: u8, size: CR::SIZE::Value, timeout: u32) -> Result<(), Error> {
        self.owire.cr.modify(CR::SIZE.val(size as u32));
        self.owire.data.set(u32::from(word));
        self.run(CMD::CMD::Value::Tx, FLAGS::TXDONE, timeout)
    }

    fn receive(&mut self, size: CR::SIZE::Value, timeout: u32) -> Result<u8, Error> {
        self.owire.cr.modify(CR::SIZE.val(size as u32));
        self.run(CMD::CMD::Value::Rx, FLAGS::RXDONE, timeout)?;
        Ok(self.owire.data.get() as u8)
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<(), Error> {
        self.transmit(bit as u8, CR::SIZE::Value::Bit, self.timeout)
    }

    pub fn read_bit(&mut self) -> Result<bool, Error> {
        Ok(self.receive(CR::SIZE::Value::Bit, self.timeout)? & 1 != 0)
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.transmit(byte, CR::SIZE::Value::Byte, self.timeout)
    }

    pub fn read_byte(&mut self) -> Result<u8, Error> {
        self.receive(CR::SIZE::Value::Byte, self.timeout)
    }

    /// Sends `bytes`, waiting at most `timeout` polls for each
    pub fn command_tx(&mut self, bytes: &[u8], timeout: u32) -> Result<(), Error> {
        for &byte in bytes {
            self.transmit(byte, CR::SIZE::Value::Byte, timeout)?;
        }
        Ok(())
    }

    /// Fills `buffer`, waiting at most `timeout` polls for each byte
    pub fn command_rx(&mut self, buffer: &mut [u8], timeout: u32) -> Result<(), Error> {
        for byte in buffer.iter_mut() {
            *byte = self.receive(CR::SIZE::Value::Byte, timeout)?;
        }
        Ok(())
    }

    /// Reads the ROM code of the only device on the bus
    pub fn read_rom(&mut self) -> Result<Rom, Error> {
        if !self.reset()? {
            return Err(Error::NoPresence);
        }
        self.write_byte(READ_ROM)?;
        let mut rom = [0u8; 8];
        let timeout = self.timeout;
        self.command_rx(&mut rom, timeout)?;
        Rom::from_bytes(rom)
    }

    /// Resets the bus and addresses every device
    pub fn skip_rom(&mut self) -> Result<(), Error> {
        if !self.reset()? {
            return Err(Error::NoPresence);
        }
        self.write_byte(SKIP_ROM)
    }

    pub fn listen(&mut self) {
        self.owire
            .inten
            .write(FLAGS::RXDONE::SET + FLAGS::TXDONE::SET + FLAGS::INITDONE::SET);
    }

    pub fn unlisten(&mut self) {
        self.owire.inten.set(0);
    }

    /// Clears each completion flag once and reports it to `callback`
    pub fn irq_handler(&mut self, mut callback: impl FnMut(Event)) {
        let sr = self.owire.sr.extract();
        if sr.is_set(FLAGS::INITDONE) {
            self.owire
                .intclr
                .write(FLAGS::INITDONE::SET + FLAGS::ACKERR::SET);
            callback(Event::ResetDone {
                presence: !sr.is_set(FLAGS::ACKERR),
            });
        }
        if sr.is_set(FLAGS::TXDONE) {
            self.owire.intclr.write(FLAGS::TXDONE::SET);
            callback(Event::TransmitDone);
        }
        if sr.is_set(FLAGS::RXDONE) {
            self.owire.intclr.write(FLAGS::RXDONE::SET);
            callback(Event::ReceiveDone(self.owire.data.get() as u8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc8_check_value() {
        assert_eq!(crc8(b"123456789"), 0xA1);
        assert_eq!(crc8(&[]), 0);
    }

    #[test]
    fn rom_with_its_crc_validates() {
        let mut bytes = [0x28, 0xFF, 0x64, 0x1E, 0x0F, 0x00, 0x00, 0x00];
        bytes[7] = crc8(&bytes[..7]);
        let rom = Rom::from_bytes(bytes).unwrap();
        assert_eq!(rom.family_code(), 0x28);
        assert_eq!(rom.serial(), [0xFF, 0x64, 0x1E, 0x0F, 0x00, 0x00]);

        bytes[3] ^= 0x01;
        assert_eq!(Rom::from_bytes(bytes), Err(Error::Crc));
    }

    #[test]
    fn timing_picks_finest_divider() {
        // at 24 MHz the 480 us reset needs 2880 ticks after dividing by 4
        let (div, counts) = timing(24_000_000, &Config::default()).unwrap();
        assert_eq!(div, CR::CLKDIV::Value::Div4);
        assert_eq!(counts, [2880, 420, 390, 36]);
    }
}
