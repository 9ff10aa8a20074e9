mod common;

use core::ops::Deref;
use core::ptr::addr_of_mut;
use std::cell::Cell;

use cx32l003_hal::lpuart::{Config, Error, Event, Lpuart, Pins};
use cx32l003_hal::pac::lpuart::{RegisterBlock, ISR, SBUF, SCON};
use cx32l003_hal::rcc::Clocks;
use cx32l003_hal::State;
use embedded_time::rate::Baud;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use common::{bits, block, block_with, preset, FakePins};

type Uart = &'static RegisterBlock;

unsafe impl Pins<Uart> for FakePins {}

fn uart_with_status(isr: u32) -> Uart {
    block_with(|r: *mut RegisterBlock| unsafe { preset(addr_of_mut!((*r).isr), isr) })
}

fn lpuart(uart: Uart) -> Lpuart<Uart, FakePins> {
    Lpuart::new(uart, FakePins, Config::default(), Clocks::default()).unwrap()
}

#[test]
fn crystal_clock_uses_fixed_prescaler() {
    let uart = block::<RegisterBlock>();
    let _lpuart = Lpuart::new(
        uart,
        FakePins,
        Config::default().baudrate(Baud(2_400)),
        Clocks::default(),
    )
    .unwrap();
    assert_eq!(uart.scon.read(SCON::PRSC), 2);
    assert!(uart.scon.is_set(SCON::REN));
}

#[test]
fn crystal_clock_rejects_fast_rates() {
    let uart = block::<RegisterBlock>();
    let config = Config::default().baudrate(Baud(115_200));
    let result = Lpuart::new(uart, FakePins, config, Clocks::default());
    assert!(matches!(result, Err(Error::InvalidBaudrate)));
}

#[test]
fn interrupt_transmit_runs_to_completion() {
    let uart = uart_with_status(bits(&[ISR::TXE, ISR::TI]));
    let mut lpuart = lpuart(uart);

    lpuart.transmit_it(b"abc").unwrap();
    assert!(uart.scon.is_set(SCON::TIEN));
    assert_eq!(lpuart.state(), State::Busy);
    assert_eq!(lpuart.transmit(b"x", 16), Err(Error::Busy));

    let mut done = None;
    for _ in 0..3 {
        lpuart.irq_handler(|event| {
            if let Event::TransmitComplete(buffer) = event {
                done = Some(buffer);
            }
        });
    }
    assert_eq!(done, Some(&b"abc"[..]));
    assert_eq!(uart.sbuf.read(SBUF::DATA), u32::from(b'c'));
    assert!(!uart.scon.is_set(SCON::TIEN));
    assert_eq!(lpuart.state(), State::Ready);
}

#[test]
fn interrupt_receive_fills_buffer() {
    let uart = uart_with_status(bits(&[ISR::RI]));
    let mut lpuart = lpuart(uart);
    uart.sbuf.set(0x33);

    let buffer: &'static mut [u8] = Box::leak(Box::new([0_u8; 2]));
    lpuart.receive_it(buffer).unwrap();
    assert_eq!(lpuart.state(), State::Busy);

    let mut received = Vec::new();
    for _ in 0..2 {
        lpuart.irq_handler(|event| {
            if let Event::ReceiveComplete(buffer) = event {
                received.extend_from_slice(buffer);
            }
        });
    }
    assert_eq!(received, [0x33, 0x33]);
    assert!(!uart.scon.is_set(SCON::RIEN));
    assert_eq!(lpuart.state(), State::Ready);
}

#[test]
fn framing_error_ends_interrupt_receive() {
    let uart = uart_with_status(bits(&[ISR::FE]));
    let mut lpuart = lpuart(uart);

    let buffer: &'static mut [u8] = Box::leak(Box::new([0_u8; 4]));
    lpuart.receive_it(buffer).unwrap();

    let mut outcome = None;
    lpuart.irq_handler(|event| {
        if let Event::ReceiveError {
            received, error, ..
        } = event
        {
            outcome = Some((received, error));
        }
    });
    assert_eq!(outcome, Some((0, Error::Framing)));
    assert_eq!(lpuart.state(), State::Ready);
}

/// Serves one of two register blocks, so a status flag can drop between calls
struct Swapped {
    blocks: [Uart; 2],
    current: &'static Cell<usize>,
}

impl Deref for Swapped {
    type Target = RegisterBlock;

    fn deref(&self) -> &RegisterBlock {
        self.blocks[self.current.get()]
    }
}

unsafe impl Pins<Swapped> for FakePins {}

#[test]
fn full_transmit_buffer_ends_interrupt_transmit() {
    let ready = uart_with_status(bits(&[ISR::TXE, ISR::TI]));
    let stalled = uart_with_status(bits(&[ISR::TI]));
    let current: &'static Cell<usize> = Box::leak(Box::new(Cell::new(0)));
    let uart = Swapped {
        blocks: [ready, stalled],
        current,
    };
    let mut lpuart = Lpuart::new(uart, FakePins, Config::default(), Clocks::default()).unwrap();

    lpuart.transmit_it(b"abc").unwrap();
    assert_eq!(ready.sbuf.read(SBUF::DATA), u32::from(b'a'));

    current.set(1);
    stalled.scon.modify(SCON::TIEN::SET);
    let mut outcome = None;
    lpuart.irq_handler(|event| {
        if let Event::TransmitError {
            buffer,
            sent,
            error,
        } = event
        {
            outcome = Some((buffer, sent, error));
        }
    });
    assert_eq!(outcome, Some((&b"abc"[..], 1, Error::Busy)));
    assert!(!stalled.scon.is_set(SCON::TIEN));
    assert_eq!(lpuart.state(), State::Ready);

    current.set(0);
    assert_eq!(lpuart.transmit_it(b"x"), Ok(()));
}
