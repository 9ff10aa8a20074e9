mod common;

use core::ptr::addr_of_mut;

use cx32l003_hal::owire::{Config, DqPin, Error, Event, OneWire, READ_ROM, SKIP_ROM};
use cx32l003_hal::pac;
use cx32l003_hal::pac::owire::{RegisterBlock, CMD, CR, FLAGS};
use cx32l003_hal::rcc::Clocks;
use tock_registers::interfaces::{Readable, Writeable};

use common::{bits, block_with, peek, preset, FakePins};

type OwireRegs = &'static RegisterBlock;

unsafe impl DqPin<pac::OWIRE> for FakePins {}

/// A controller that reports `sr` after every command
fn bus(sr: u32) -> (OwireRegs, OneWire<OwireRegs, FakePins>) {
    let regs = block_with(|r: *mut RegisterBlock| unsafe { preset(addr_of_mut!((*r).sr), sr) });
    let mut bus = OneWire::new(regs, FakePins, Config::default(), Clocks::default()).unwrap();
    bus.set_timeout(8);
    (regs, bus)
}

fn all_done() -> u32 {
    bits(&[FLAGS::INITDONE, FLAGS::TXDONE, FLAGS::RXDONE])
}

#[test]
fn new_enables_controller_with_filter() {
    let (regs, _bus) = bus(0);
    assert!(regs.cr.is_set(CR::EN));
    assert_eq!(regs.cr.read(CR::CLKDIV), 2);
    assert_eq!(regs.rstcnt.get(), 2880);
}

#[test]
fn reset_reports_presence() {
    let (regs, mut bus) = bus(bits(&[FLAGS::INITDONE]));
    assert_eq!(bus.reset(), Ok(true));
    assert_eq!(peek(&regs.cmd), CMD::CMD::Value::Init as u32);
}

#[test]
fn missing_presence_pulse() {
    let (_regs, mut bus) = bus(bits(&[FLAGS::INITDONE, FLAGS::ACKERR]));
    assert_eq!(bus.reset(), Ok(false));
    assert_eq!(bus.read_rom(), Err(Error::NoPresence));
    assert_eq!(bus.skip_rom(), Err(Error::NoPresence));
}

#[test]
fn reset_without_completion_times_out() {
    let (_regs, mut bus) = bus(0);
    assert_eq!(bus.reset(), Err(Error::Timeout));
}

#[test]
fn skip_rom_sends_command_byte() {
    let (regs, mut bus) = bus(all_done());
    assert_eq!(bus.skip_rom(), Ok(()));
    assert_eq!(regs.data.get(), u32::from(SKIP_ROM));
    assert_eq!(peek(&regs.cmd), CMD::CMD::Value::Tx as u32);
    assert_eq!(regs.cr.read(CR::SIZE), 0);
}

#[test]
fn read_rom_validates_crc() {
    // Without a device the data register still holds the command byte
    let (regs, mut bus) = bus(all_done());
    assert_eq!(bus.read_rom(), Err(Error::Crc));
    assert_eq!(regs.data.get(), u32::from(READ_ROM));
    assert_eq!(peek(&regs.cmd), CMD::CMD::Value::Rx as u32);
}

#[test]
fn command_rx_fills_buffer() {
    let (regs, mut bus) = bus(all_done());
    regs.data.set(0x42);
    let mut buffer = [0; 3];
    assert_eq!(bus.command_rx(&mut buffer, 8), Ok(()));
    assert_eq!(buffer, [0x42; 3]);
}

#[test]
fn bit_slots_switch_transfer_size() {
    let (regs, mut bus) = bus(all_done());
    bus.write_bit(true).unwrap();
    assert_eq!(regs.cr.read(CR::SIZE), 1);
    assert_eq!(bus.read_bit(), Ok(true));
}

#[test]
fn irq_handler_reports_completions() {
    let (regs, mut bus) = bus(bits(&[FLAGS::INITDONE, FLAGS::RXDONE]));
    regs.data.set(0x5A);

    let mut events = Vec::new();
    bus.irq_handler(|event| events.push(event));
    assert_eq!(
        events,
        [Event::ResetDone { presence: true }, Event::ReceiveDone(0x5A)]
    );
}
