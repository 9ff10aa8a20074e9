//! Low power UART
//!
//! Frames and parity work as on [`crate::serial`]. The LPUART can also be clocked from LXT or LIRC
//! so it keeps receiving in deep sleep; with those sources the oversampling prescaler limits the
//! baud rate to 9600, 4800 or 2400.
//!
//! Besides blocking and `nb` access, [`Lpuart::transmit_it`] and [`Lpuart::receive_it`] run a
//! transfer from the interrupt handler. They take `'static` buffers and hand them back through the
//! [`Event`] passed to the callback of [`Lpuart::irq_handler`].

use core::ops::Deref;

use embedded_hal_nb::serial as serial_one;
use embedded_time::rate::Baud;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};

use crate::pac;
use crate::pac::lpuart::{RegisterBlock, BAUDCR, ISR, SBUF, SCON};
use crate::rcc::Clocks;
use crate::serial::{baud_divider, flush, read_word, write_word, Parity, WordRegisters};
use crate::status::{poll, State};

pub use crate::serial::Error;

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

/// LPUART clock
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// PCLK through the baud rate generator
    Pclk,
    /// 32.768 kHz crystal
    Lxt,
    /// Internal low speed oscillator
    Lirc,
}

/// LPUART configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub baudrate: Baud,
    pub parity: Parity,
    pub source: ClockSource,
}

impl Default for Config {
    /// 9600 baud from LXT, no parity
    fn default() -> Self {
        Config {
            baudrate: Baud(9_600),
            parity: Parity::ParityNone,
            source: ClockSource::Lxt,
        }
    }
}

impl Config {
    pub fn baudrate(mut self, baudrate: Baud) -> Self {
        self.baudrate = baudrate;
        self
    }

    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub fn source(mut self, source: ClockSource) -> Self {
        self.source = source;
        self
    }
}

/// `SCON.PRSC` for a low speed clock source
pub fn low_speed_prescaler(baud: u32) -> Result<u32, Error> {
    match baud {
        9_600 => Ok(0),
        4_800 => Ok(1),
        2_400 => Ok(2),
        _ => Err(Error::InvalidBaudrate),
    }
}

/// Completion reported by [`Lpuart::irq_handler`]
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    /// Every byte of the buffer passed to `transmit_it` has been sent
    TransmitComplete(&'static [u8]),
    /// The buffer passed to `receive_it` has been filled
    ReceiveComplete(&'static mut [u8]),
    /// Transmission stopped after `sent` bytes
    TransmitError {
        buffer: &'static [u8],
        sent: usize,
        error: Error,
    },
    /// Reception stopped after `received` bytes
    ReceiveError {
        buffer: &'static mut [u8],
        received: usize,
        error: Error,
    },
}

/// TX pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait TxPin<UART> {}

/// RX pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait RxPin<UART> {}

/// LPUART pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait Pins<UART> {}

unsafe impl<MODE> TxPin<pac::LPUART> for crate::gpio::PC3<MODE> {}
unsafe impl<MODE> RxPin<pac::LPUART> for crate::gpio::PC4<MODE> {}
unsafe impl<MODE> TxPin<pac::LPUART> for crate::gpio::PD4<MODE> {}
unsafe impl<MODE> RxPin<pac::LPUART> for crate::gpio::PB5<MODE> {}

unsafe impl<UART, TX, RX> Pins<UART> for (TX, RX)
where
    TX: TxPin<UART>,
    RX: RxPin<UART>,
{
}

struct TxTransfer {
    buffer: &'static [u8],
    sent: usize,
}

struct RxTransfer {
    buffer: &'static mut [u8],
    received: usize,
}

/// Low power UART
pub struct Lpuart<UART, PINS> {
    uart: UART,
    pins: PINS,
    parity: Parity,
    tx: Option<TxTransfer>,
    rx: Option<RxTransfer>,
}

impl<UART, PINS> Lpuart<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
    PINS: Pins<UART>,
{
    /// Configures clock, framing and baud rate and enables the receiver
    pub fn new(uart: UART, pins: PINS, config: Config, clocks: Clocks) -> Result<Self, Error> {
        let mode = match config.parity {
            Parity::ParityNone => SCON::SM::Mode1,
            _ => SCON::SM::Mode3,
        };

        uart.scon.set(0);
        uart.icr
            .write(ISR::RI::SET + ISR::TI::SET + ISR::FE::SET + ISR::TXE::SET);
        match config.source {
            ClockSource::Pclk => {
                let (double, brg) = baud_divider(clocks.pclk().0, config.baudrate.0)?;
                uart.baudcr
                    .write(BAUDCR::BRG.val(u32::from(brg)) + BAUDCR::SELFBRG::SET);
                uart.scon.write(
                    mode + SCON::SCLKSEL::Pclk + SCON::REN::SET + SCON::DBAUD.val(double as u32),
                );
            }
            ClockSource::Lxt | ClockSource::Lirc => {
                let prsc = low_speed_prescaler(config.baudrate.0)?;
                let source = if config.source == ClockSource::Lxt {
                    SCON::SCLKSEL::Lxt
                } else {
                    SCON::SCLKSEL::Lirc
                };
                uart.scon
                    .write(mode + source + SCON::PRSC.val(prsc) + SCON::REN::SET);
            }
        }
        debug!("lpuart at {} baud", config.baudrate.0);

        Ok(Lpuart {
            uart,
            pins,
            parity: config.parity,
            tx: None,
            rx: None,
        })
    }

    /// Disables the LPUART and releases peripheral and pins
    pub fn release(self) -> (UART, PINS) {
        self.uart.scon.set(0);
        (self.uart, self.pins)
    }

    /// `Busy` while an interrupt driven transfer is running in either direction
    pub fn state(&self) -> State {
        if self.tx.is_some() || self.rx.is_some() {
            State::Busy
        } else {
            State::Ready
        }
    }

    fn write_word(&self, word: u8) -> nb::Result<(), Error> {
        write_word(&*self.uart, self.parity, word)
    }

    fn read_word(&self) -> nb::Result<u8, Error> {
        read_word(&*self.uart, self.parity)
    }

    /// Sends `bytes`, polling each flag at most `timeout` times
    pub fn transmit(&mut self, bytes: &[u8], timeout: u32) -> Result<(), Error> {
        if self.tx.is_some() {
            return Err(Error::Busy);
        }
        for &byte in bytes {
            let regs = &*self.uart;
            if !poll(timeout, || regs.isr.is_set(ISR::TXE)) {
                warn!("lpuart transmit timeout");
                return Err(Error::Timeout);
            }
            nb::block!(self.write_word(byte))?;
        }
        let regs = &*self.uart;
        if !poll(timeout, || regs.isr.is_set(ISR::TI)) {
            warn!("lpuart transmit timeout");
            return Err(Error::Timeout);
        }
        regs.icr.write(ISR::TI::SET);
        Ok(())
    }

    /// Fills `buffer`, polling for every byte at most `timeout` times
    pub fn receive(&mut self, buffer: &mut [u8], timeout: u32) -> Result<(), Error> {
        if self.rx.is_some() {
            return Err(Error::Busy);
        }
        for byte in buffer.iter_mut() {
            let regs = &*self.uart;
            if !poll(timeout, || regs.isr.is_set(ISR::RI) || regs.isr.is_set(ISR::FE)) {
                warn!("lpuart receive timeout");
                return Err(Error::Timeout);
            }
            *byte = nb::block!(self.read_word())?;
        }
        Ok(())
    }

    /// Starts sending `buffer` from the interrupt handler
    pub fn transmit_it(&mut self, buffer: &'static [u8]) -> Result<(), Error> {
        if self.tx.is_some() {
            return Err(Error::Busy);
        }
        let first = match buffer.first() {
            Some(&first) => first,
            None => return Ok(()),
        };
        self.uart.icr.write(ISR::TI::SET);
        self.write_word(first).map_err(|_| Error::Busy)?;
        self.tx = Some(TxTransfer { buffer, sent: 1 });
        self.uart.scon.modify(SCON::TIEN::SET);
        Ok(())
    }

    /// Starts filling `buffer` from the interrupt handler
    pub fn receive_it(&mut self, buffer: &'static mut [u8]) -> Result<(), Error> {
        if self.rx.is_some() {
            return Err(Error::Busy);
        }
        if buffer.is_empty() {
            return Ok(());
        }
        self.rx = Some(RxTransfer {
            buffer,
            received: 0,
        });
        self.uart.scon.modify(SCON::RIEN::SET + SCON::FEIEN::SET);
        Ok(())
    }

    /// Advances the interrupt driven transfers, clearing each flag it handles once, and reports
    /// finished transfers to `callback`
    pub fn irq_handler(&mut self, mut callback: impl FnMut(Event)) {
        let regs = &*self.uart;
        // One snapshot so each flag is handled at most once per call
        let isr = regs.isr.extract();

        if isr.is_set(ISR::FE) {
            regs.icr.write(ISR::FE::SET);
            if let Some(rx) = self.rx.take() {
                regs.scon.modify(SCON::RIEN::CLEAR + SCON::FEIEN::CLEAR);
                callback(Event::ReceiveError {
                    buffer: rx.buffer,
                    received: rx.received,
                    error: Error::Framing,
                });
            }
        } else if isr.is_set(ISR::RI) {
            if let Some(mut rx) = self.rx.take() {
                match self.read_word() {
                    Ok(word) => {
                        rx.buffer[rx.received] = word;
                        rx.received += 1;
                        if rx.received == rx.buffer.len() {
                            regs.scon.modify(SCON::RIEN::CLEAR + SCON::FEIEN::CLEAR);
                            callback(Event::ReceiveComplete(rx.buffer));
                        } else {
                            self.rx = Some(rx);
                        }
                    }
                    Err(nb::Error::Other(error)) => {
                        regs.scon.modify(SCON::RIEN::CLEAR + SCON::FEIEN::CLEAR);
                        callback(Event::ReceiveError {
                            buffer: rx.buffer,
                            received: rx.received,
                            error,
                        });
                    }
                    Err(nb::Error::WouldBlock) => self.rx = Some(rx),
                }
            }
        }

        if isr.is_set(ISR::TI) {
            regs.icr.write(ISR::TI::SET);
            if let Some(mut tx) = self.tx.take() {
                if tx.sent < tx.buffer.len() {
                    let word = tx.buffer[tx.sent];
                    match self.write_word(word) {
                        Ok(()) => {
                            tx.sent += 1;
                            self.tx = Some(tx);
                        }
                        // No further TI follows a byte that wasn't written
                        Err(_) => {
                            warn!("lpuart transmit buffer full after {} bytes", tx.sent);
                            regs.scon.modify(SCON::TIEN::CLEAR);
                            callback(Event::TransmitError {
                                buffer: tx.buffer,
                                sent: tx.sent,
                                error: Error::Busy,
                            });
                        }
                    }
                } else {
                    regs.scon.modify(SCON::TIEN::CLEAR);
                    callback(Event::TransmitComplete(tx.buffer));
                }
            }
        }
    }
}

impl<UART, PINS> serial_one::ErrorType for Lpuart<UART, PINS> {
    type Error = Error;
}

impl<UART, PINS> serial_one::Write<u8> for Lpuart<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
    PINS: Pins<UART>,
{
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.write_word(word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        flush(&*self.uart)
    }
}

impl<UART, PINS> serial_one::Read<u8> for Lpuart<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
    PINS: Pins<UART>,
{
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.read_word()
    }
}

impl<UART, PINS> embedded_hal_zero::serial::Write<u8> for Lpuart<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
    PINS: Pins<UART>,
{
    type Error = Error;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.write_word(word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        serial_one::Write::flush(self)
    }
}

impl<UART, PINS> embedded_hal_zero::serial::Read<u8> for Lpuart<UART, PINS>
where
    UART: Deref<Target = RegisterBlock>,
    PINS: Pins<UART>,
{
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.read_word()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_speed_sources_support_three_rates() {
        assert_eq!(low_speed_prescaler(9_600), Ok(0));
        assert_eq!(low_speed_prescaler(4_800), Ok(1));
        assert_eq!(low_speed_prescaler(2_400), Ok(2));
        assert_eq!(low_speed_prescaler(19_200), Err(Error::InvalidBaudrate));
    }
}
