/*!
  # Serial communication (UART0, UART1)

  8N1 frames use UART mode 1. With parity enabled the UART runs in mode 3 (9-bit frames) and the
  ninth bit carries the parity, computed on transmit and checked on receive.

  The baud rate generator divides PCLK: `baud = (DBAUD + 1) · PCLK / (32 · (BRG + 1))`.

  ## Example
  ```no_run
    use cx32l003_hal::{gpio::{GpioExt, AF5}, pac, prelude::*, rcc::Clocks};
    use cx32l003_hal::serial::{Config, Serial};
    use core::fmt::Write;

    let dp = pac::Peripherals::take().unwrap();
    let gpiod = dp.GPIOD.split();
    let tx = gpiod.pd5.into_alternate::<AF5>();
    let rx = gpiod.pd6.into_alternate::<AF5>();

    let config = Config::default().baudrate(115_200_u32.Bd());
    let mut serial = Serial::new(dp.UART0, (tx, rx), config, Clocks::default()).unwrap();
    writeln!(serial, "hello").unwrap();
  ```
*/

use core::fmt;
use core::ops::Deref;

use embedded_hal_nb::serial::{self as serial_one, ErrorKind};
use embedded_time::rate::Baud;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};

use crate::pac;
use crate::pac::uart::{RegisterBlock, BAUDCR, ISR, SBUF, SCON};
use crate::rcc::Clocks;
use crate::status::poll;

/// Serial error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Framing error
    Framing,
    /// Parity check error
    Parity,
    /// The flag did not change before the poll budget ran out
    Timeout,
    /// The baud rate can't be derived from the UART clock
    InvalidBaudrate,
    /// An interrupt driven transfer is still in progress
    Busy,
}

impl serial_one::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::Framing => ErrorKind::FrameFormat,
            Error::Parity => ErrorKind::Parity,
            _ => ErrorKind::Other,
        }
    }
}

impl From<Error> for crate::status::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Timeout => crate::status::Error::Timeout,
            Error::Busy => crate::status::Error::Busy,
            _ => crate::status::Error::Failed,
        }
    }
}

/// Interrupt event
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// New data has been received
    Rxne,
    /// A frame has been sent
    Tc,
    /// A framing error was detected
    FramingError,
}

/// What [`Serial::irq_handler`] observed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// A byte arrived; a parity failure is reported as `Err`
    Received(Result<u8, Error>),
    TransmitComplete,
    FramingError,
}

/// Parity check
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    ParityNone,
    ParityEven,
    ParityOdd,
}

/// Serial configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub baudrate: Baud,
    pub parity: Parity,
}

impl Config {
    /// Sets the target baudrate
    pub fn baudrate(mut self, baudrate: Baud) -> Self {
        self.baudrate = baudrate;
        self
    }

    /// Sets parity to no parity check
    pub fn parity_none(mut self) -> Self {
        self.parity = Parity::ParityNone;
        self
    }

    /// Sets parity check to even
    pub fn parity_even(mut self) -> Self {
        self.parity = Parity::ParityEven;
        self
    }

    /// Sets parity check to odd
    pub fn parity_odd(mut self) -> Self {
        self.parity = Parity::ParityOdd;
        self
    }
}

impl Default for Config {
    /// 115200 baud, no parity
    fn default() -> Config {
        Config {
            baudrate: Baud(115_200),
            parity: Parity::ParityNone,
        }
    }
}

/// Baud rate generator setting `(DBAUD, BRG)` for `baud`.
///
/// Prefers the doubled rate for its finer resolution and falls back to the single rate when the
/// divider would not fit in 16 bits.
pub fn baud_divider(pclk: u32, baud: u32) -> Result<(bool, u16), Error> {
    if baud == 0 {
        return Err(Error::InvalidBaudrate);
    }
    let baud = u64::from(baud);
    for &double in &[true, false] {
        let clock = u64::from(pclk) * (double as u64 + 1);
        let div = (clock + 16 * baud) / (32 * baud);
        if (1..=0x1_0000).contains(&div) {
            return Ok((double, (div - 1) as u16));
        }
    }
    Err(Error::InvalidBaudrate)
}

/// Ninth bit for `word`, `None` without parity
pub fn parity_bit(parity: Parity, word: u8) -> Option<bool> {
    let odd_ones = word.count_ones() % 2 == 1;
    match parity {
        Parity::ParityNone => None,
        Parity::ParityEven => Some(odd_ones),
        Parity::ParityOdd => Some(!odd_ones),
    }
}

/// TX pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait TxPin<UART> {}

/// RX pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait RxPin<UART> {}

/// UART pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait Pins<UART> {}

unsafe impl<MODE> TxPin<pac::UART0> for crate::gpio::PA1<MODE> {}
unsafe impl<MODE> RxPin<pac::UART0> for crate::gpio::PA2<MODE> {}
unsafe impl<MODE> TxPin<pac::UART0> for crate::gpio::PD5<MODE> {}
unsafe impl<MODE> RxPin<pac::UART0> for crate::gpio::PD6<MODE> {}
unsafe impl<MODE> TxPin<pac::UART1> for crate::gpio::PC5<MODE> {}
unsafe impl<MODE> RxPin<pac::UART1> for crate::gpio::PC6<MODE> {}
unsafe impl<MODE> TxPin<pac::UART1> for crate::gpio::PD2<MODE> {}
unsafe impl<MODE> RxPin<pac::UART1> for crate::gpio::PD3<MODE> {}

unsafe impl<UART, TX, RX> Pins<UART> for (TX, RX)
where
    TX: TxPin<UART>,
    RX: RxPin<UART>,
{
}

/// Registers the word level helpers work on. The LPUART shares them with UART0 and UART1.
pub(crate) trait WordRegisters {
    fn isr(&self) -> &ReadOnly<u32, ISR::Register>;
    fn icr(&self) -> &WriteOnly<u32, ISR::Register>;
    fn sbuf(&self) -> &ReadWrite<u32, SBUF::Register>;
    /// Ninth bit of the next frame sent
    fn set_tb8(&self, bit: bool);
    /// Ninth bit of the last frame received
    fn rb8(&self) -> bool;
}

impl WordRegisters for RegisterBlock {
    fn isr(&self) -> &ReadOnly<u32, ISR::Register> {
        &self.isr
    }

    fn icr(&self) -> &WriteOnly<u32, ISR::Register> {
        &self.icr
    }

    fn sbuf(&self) -> &ReadWrite<u32, SBUF::Register> {
        &self.sbuf
    }

    fn set_tb8(&self, bit: bool) {
        critical_section::with(|_| self.scon.modify(SCON::TB8.val(bit as u32)));
    }

    fn rb8(&self) -> bool {
        self.scon.is_set(SCON::RB8)
    }
}

pub(crate) fn write_word<R: WordRegisters>(
    regs: &R,
    parity: Parity,
    word: u8,
) -> nb::Result<(), Error> {
    if !regs.isr().is_set(ISR::TXE) {
        return Err(nb::Error::WouldBlock);
    }
    if let Some(bit) = parity_bit(parity, word) {
        regs.set_tb8(bit);
    }
    regs.sbuf().write(SBUF::DATA.val(u32::from(word)));
    Ok(())
}

pub(crate) fn read_word<R: WordRegisters>(regs: &R, parity: Parity) -> nb::Result<u8, Error> {
    if regs.isr().is_set(ISR::FE) {
        regs.icr().write(ISR::FE::SET);
        return Err(nb::Error::Other(Error::Framing));
    }
    if !regs.isr().is_set(ISR::RI) {
        return Err(nb::Error::WouldBlock);
    }
    let word = regs.sbuf().read(SBUF::DATA) as u8;
    let ninth = regs.rb8();
    regs.icr().write(ISR::RI::SET);
    match parity_bit(parity, word) {
        Some(expected) if expected != ninth => Err(nb::Error::Other(Error::Parity)),
        _ => Ok(word),
    }
}

pub(crate) fn flush<R: WordRegisters>(regs: &R) -> nb::Result<(), Error> {
    if regs.isr().is_set(ISR::TXE) {
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}

/// Serial abstraction
pub struct Serial<UART, PINS> {
    uart: UART,
    pins: PINS,
    parity: Parity,
}

impl<UART, PINS> Serial<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
    PINS: Pins<UART>,
{
    /// Configures the UART and enables the receiver.
    ///
    /// Fails with [`Error::InvalidBaudrate`] if the baud rate can't be derived from PCLK.
    pub fn new(uart: UART, pins: PINS, config: Config, clocks: Clocks) -> Result<Self, Error> {
        let (double, brg) = baud_divider(clocks.pclk().0, config.baudrate.0)?;
        let mode = match config.parity {
            Parity::ParityNone => SCON::SM::Mode1,
            _ => SCON::SM::Mode3,
        };

        uart.scon.set(0);
        uart.icr
            .write(ISR::RI::SET + ISR::TI::SET + ISR::FE::SET + ISR::TXE::SET);
        uart.baudcr
            .write(BAUDCR::BRG.val(u32::from(brg)) + BAUDCR::SELFBRG::SET);
        uart.scon
            .write(mode + SCON::REN::SET + SCON::DBAUD.val(double as u32));
        debug!("uart at {} baud, BRG {} double {}", config.baudrate.0, brg, double);

        Ok(Serial {
            uart,
            pins,
            parity: config.parity,
        })
    }

    /// Starts listening for an interrupt event
    pub fn listen(&mut self, event: Event) {
        match event {
            Event::Rxne => self.uart.scon.modify(SCON::RIEN::SET),
            Event::Tc => self.uart.scon.modify(SCON::TIEN::SET),
            Event::FramingError => self.uart.scon.modify(SCON::FEIEN::SET),
        }
    }

    /// Stops listening for an interrupt event
    pub fn unlisten(&mut self, event: Event) {
        match event {
            Event::Rxne => self.uart.scon.modify(SCON::RIEN::CLEAR),
            Event::Tc => self.uart.scon.modify(SCON::TIEN::CLEAR),
            Event::FramingError => self.uart.scon.modify(SCON::FEIEN::CLEAR),
        }
    }

    /// Sends `bytes`, polling each flag at most `timeout` times, and waits for the last frame
    pub fn transmit(&mut self, bytes: &[u8], timeout: u32) -> Result<(), Error> {
        let regs = &*self.uart;
        for &byte in bytes {
            if !poll(timeout, || regs.isr.is_set(ISR::TXE)) {
                warn!("uart transmit timeout");
                return Err(Error::Timeout);
            }
            nb::block!(write_word(regs, self.parity, byte))?;
        }
        if !poll(timeout, || regs.isr.is_set(ISR::TI)) {
            warn!("uart transmit timeout");
            return Err(Error::Timeout);
        }
        regs.icr.write(ISR::TI::SET);
        Ok(())
    }

    /// Fills `buffer`, polling for every byte at most `timeout` times
    pub fn receive(&mut self, buffer: &mut [u8], timeout: u32) -> Result<(), Error> {
        let regs = &*self.uart;
        for byte in buffer.iter_mut() {
            if !poll(timeout, || regs.isr.is_set(ISR::RI) || regs.isr.is_set(ISR::FE)) {
                warn!("uart receive timeout");
                return Err(Error::Timeout);
            }
            *byte = nb::block!(read_word(regs, self.parity))?;
        }
        Ok(())
    }

    /// Reads the interrupt status, clears what it saw and reports it to `callback`
    pub fn irq_handler(&mut self, mut callback: impl FnMut(Interrupt)) {
        let regs = &*self.uart;
        if regs.isr.is_set(ISR::FE) {
            regs.icr.write(ISR::FE::SET);
            callback(Interrupt::FramingError);
        } else if regs.isr.is_set(ISR::RI) {
            match read_word(regs, self.parity) {
                Ok(word) => callback(Interrupt::Received(Ok(word))),
                Err(nb::Error::Other(e)) => callback(Interrupt::Received(Err(e))),
                Err(nb::Error::WouldBlock) => {}
            }
        }
        if regs.isr.is_set(ISR::TI) {
            regs.icr.write(ISR::TI::SET);
            callback(Interrupt::TransmitComplete);
        }
    }

    /// Splits into transmit and receive halves sharing the UART
    pub fn split(&mut self) -> (Tx<'_>, Rx<'_>) {
        let regs = &*self.uart;
        (
            Tx {
                regs,
                parity: self.parity,
            },
            Rx {
                regs,
                parity: self.parity,
            },
        )
    }

    /// Disables the UART and releases peripheral and pins
    pub fn release(self) -> (UART, PINS) {
        self.uart.scon.set(0);
        (self.uart, self.pins)
    }
}

/// Transmit half of a [`Serial`]
pub struct Tx<'a> {
    regs: &'a RegisterBlock,
    parity: Parity,
}

/// Receive half of a [`Serial`]
pub struct Rx<'a> {
    regs: &'a RegisterBlock,
    parity: Parity,
}

impl<UART, PINS> serial_one::ErrorType for Serial<UART, PINS> {
    type Error = Error;
}

impl<UART, PINS> serial_one::Write<u8> for Serial<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
{
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        write_word(&*self.uart, self.parity, word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        flush(&*self.uart)
    }
}

impl<UART, PINS> serial_one::Read<u8> for Serial<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
{
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        read_word(&*self.uart, self.parity)
    }
}

impl serial_one::ErrorType for Tx<'_> {
    type Error = Error;
}

impl serial_one::Write<u8> for Tx<'_> {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        write_word(self.regs, self.parity, word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        flush(self.regs)
    }
}

impl serial_one::ErrorType for Rx<'_> {
    type Error = Error;
}

impl serial_one::Read<u8> for Rx<'_> {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        read_word(self.regs, self.parity)
    }
}

impl<UART, PINS> embedded_hal_zero::serial::Write<u8> for Serial<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
{
    type Error = Error;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        write_word(&*self.uart, self.parity, word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        flush(&*self.uart)
    }
}

impl<UART, PINS> embedded_hal_zero::serial::Read<u8> for Serial<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
{
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        read_word(&*self.uart, self.parity)
    }
}

impl<UART, PINS> embedded_hal_zero::blocking::serial::write::Default<u8>
    for Serial<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
{
}

impl<UART, PINS> fmt::Write for Serial<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            nb::block!(write_word(&*self.uart, self.parity, byte)).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

impl fmt::Write for Tx<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            nb::block!(write_word(self.regs, self.parity, byte)).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_divider_prefers_double_rate() {
        // 48 MHz / (32 * 13) = 115 384 baud
        assert_eq!(baud_divider(24_000_000, 115_200), Ok((true, 12)));
        // 48 MHz / (32 * 625) = 2400 baud
        assert_eq!(baud_divider(24_000_000, 2_400), Ok((true, 624)));
    }

    #[test]
    fn baud_divider_rejects_unreachable_rates() {
        assert_eq!(baud_divider(24_000_000, 0), Err(Error::InvalidBaudrate));
        assert_eq!(baud_divider(24_000_000, 10_000_000), Err(Error::InvalidBaudrate));
        // 24 MHz / (32 * 65536) is about 11 baud
        assert_eq!(baud_divider(24_000_000, 5), Err(Error::InvalidBaudrate));
        assert_eq!(baud_divider(24_000_000, 20), Ok((false, 37499)));
    }

    #[test]
    fn ninth_bit_carries_parity() {
        assert_eq!(parity_bit(Parity::ParityNone, 0x41), None);
        assert_eq!(parity_bit(Parity::ParityEven, 0x41), Some(false));
        assert_eq!(parity_bit(Parity::ParityEven, 0x01), Some(true));
        assert_eq!(parity_bit(Parity::ParityOdd, 0x41), Some(true));
        assert_eq!(parity_bit(Parity::ParityOdd, 0x00), Some(true));
    }
}
