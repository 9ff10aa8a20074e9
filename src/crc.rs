//! CRC16 calculation unit

use core::ops::Deref;

use tock_registers::interfaces::{Readable, Writeable};

use crate::pac;
use crate::pac::crc::{RegisterBlock, RESULT};

/// Seed written to `RESULT` to start a calculation
pub const SEED: u32 = 0xFFFF;

/// CRC-16/CCITT engine abstraction
///
/// # Examples
///
/// ```no_run
/// use cx32l003_hal::crc::Crc;
/// use cx32l003_hal::pac;
///
/// let dp = pac::Peripherals::take().unwrap();
/// let mut crc = Crc::new(dp.CRC);
///
/// crc.feed(b"123456789");
/// assert_eq!(crc.result(), 0x29B1);
/// ```
pub struct Crc<R = pac::CRC> {
    regs: R,
}

impl<R> Crc<R>
where
    R: Deref<Target = RegisterBlock>,
{
    /// Takes ownership of the unit and starts a fresh calculation.
    /// The CRC clock gate has to be enabled.
    pub fn new(regs: R) -> Self {
        let mut crc = Crc { regs };
        crc.reset();
        crc
    }

    /// Starts a new calculation
    pub fn reset(&mut self) {
        self.regs.result.set(SEED);
    }

    /// Feeds `bytes` one at a time
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.regs.data8.set(byte);
        }
    }

    /// Feeds a whole word
    pub fn feed_u32(&mut self, word: u32) {
        self.regs.data.set(word);
    }

    /// The 16-bit result of everything fed since the last reset
    pub fn result(&self) -> u16 {
        self.regs.result.read(RESULT::CRC) as u16
    }

    /// Set by the unit once the data fed so far, followed by its CRC, checks out
    pub fn is_valid(&self) -> bool {
        self.regs.result.is_set(RESULT::FLAG)
    }

    /// Computes the CRC of `bytes` from a fresh start and compares it with `expected`
    pub fn check(&mut self, bytes: &[u8], expected: u16) -> bool {
        self.reset();
        self.feed(bytes);
        self.result() == expected
    }

    /// Releases the CRC peripheral.
    pub fn free(self) -> R {
        self.regs
    }
}
