mod common;

use core::ptr::addr_of_mut;

use cx32l003_hal::pac::uart::{RegisterBlock, BAUDCR, ISR, SBUF, SCON};
use cx32l003_hal::rcc::Clocks;
use cx32l003_hal::serial::{Config, Error, Pins, Serial};
use embedded_time::rate::Baud;
use tock_registers::interfaces::{Readable, Writeable};

use common::{bits, block, block_with, preset, FakePins};

type Uart = &'static RegisterBlock;

unsafe impl Pins<Uart> for FakePins {}

fn uart_with_status(isr: u32) -> Uart {
    block_with(|r: *mut RegisterBlock| unsafe { preset(addr_of_mut!((*r).isr), isr) })
}

fn serial(uart: Uart, config: Config) -> Serial<Uart, FakePins> {
    Serial::new(uart, FakePins, config, Clocks::default()).unwrap()
}

#[test]
fn new_programs_baud_rate_and_receiver() {
    let uart = block::<RegisterBlock>();
    let _serial = serial(uart, Config::default());

    assert_eq!(uart.baudcr.read(BAUDCR::BRG), 12);
    assert!(uart.baudcr.is_set(BAUDCR::SELFBRG));
    assert!(uart.scon.is_set(SCON::DBAUD));
    assert!(uart.scon.is_set(SCON::REN));
    assert_eq!(uart.scon.read(SCON::SM), 1);
}

#[test]
fn parity_selects_nine_bit_mode() {
    let uart = block::<RegisterBlock>();
    let _serial = serial(uart, Config::default().parity_even());
    assert_eq!(uart.scon.read(SCON::SM), 3);
}

#[test]
fn unreachable_baud_rate_is_refused() {
    let uart = block::<RegisterBlock>();
    let config = Config::default().baudrate(Baud(5));
    let result = Serial::new(uart, FakePins, config, Clocks::default());
    assert!(matches!(result, Err(Error::InvalidBaudrate)));
}

#[test]
fn transmit_writes_every_byte() {
    let uart = uart_with_status(bits(&[ISR::TXE, ISR::TI]));
    let mut serial = serial(uart, Config::default());

    serial.transmit(b"ok", 16).unwrap();
    assert_eq!(uart.sbuf.read(SBUF::DATA), u32::from(b'k'));
}

#[test]
fn transmit_times_out_without_space() {
    let uart = block::<RegisterBlock>();
    let mut serial = serial(uart, Config::default());
    assert_eq!(serial.transmit(b"x", 16), Err(Error::Timeout));
}

#[test]
fn receive_checks_parity() {
    let uart = uart_with_status(bits(&[ISR::RI]));
    let mut serial = serial(uart, Config::default().parity_even());

    // Four bits set: even parity expects a clear ninth bit, which is what RB8 holds.
    uart.sbuf.set(0x5A);
    let mut buffer = [0; 2];
    serial.receive(&mut buffer, 16).unwrap();
    assert_eq!(buffer, [0x5A, 0x5A]);

    uart.sbuf.set(0x5B);
    assert_eq!(serial.receive(&mut buffer, 16), Err(Error::Parity));
}

#[test]
fn framing_error_is_reported() {
    let uart = uart_with_status(bits(&[ISR::FE]));
    let mut serial = serial(uart, Config::default());
    let mut buffer = [0; 1];
    assert_eq!(serial.receive(&mut buffer, 16), Err(Error::Framing));
}
