mod common;

use core::ptr::addr_of_mut;

use cx32l003_hal::pac;
use cx32l003_hal::pac::spi::{RegisterBlock, CR, SR, SSN};
use cx32l003_hal::rcc::Clocks;
use cx32l003_hal::spi::{Error, Pins, Spi};
use embedded_hal::spi::{SpiBus, MODE_3};
use embedded_time::rate::Hertz;
use tock_registers::interfaces::Readable;

use common::{bits, block, block_with, preset, FakePins};

type SpiRegs = &'static RegisterBlock;

unsafe impl Pins<pac::SPI> for FakePins {}

fn spi_with_status(sr: u32) -> SpiRegs {
    block_with(|r: *mut RegisterBlock| unsafe { preset(addr_of_mut!((*r).sr), sr) })
}

#[test]
fn new_configures_master_mode() {
    let regs = block::<RegisterBlock>();
    let _spi = Spi::new(regs, FakePins, MODE_3, Hertz(1_000_000), Clocks::default()).unwrap();

    assert_eq!(regs.cr.read(CR::SPR), 4);
    assert!(regs.cr.is_set(CR::MSTR));
    assert!(regs.cr.is_set(CR::SPEN));
    assert!(regs.cr.is_set(CR::CPOL));
    assert!(regs.cr.is_set(CR::CPHA));
    assert!(regs.ssn.is_set(SSN::SSN));
}

#[test]
fn slave_select_follows_request() {
    let regs = block::<RegisterBlock>();
    let mut spi = Spi::new(regs, FakePins, MODE_3, Hertz(1_000_000), Clocks::default()).unwrap();

    spi.set_ssn(false);
    assert!(!regs.ssn.is_set(SSN::SSN));
    spi.set_ssn(true);
    assert!(regs.ssn.is_set(SSN::SSN));
}

#[test]
fn transfer_reads_back_data_register() {
    let regs = spi_with_status(bits(&[SR::SPIF]));
    let mut spi = Spi::new(regs, FakePins, MODE_3, Hertz(1_000_000), Clocks::default()).unwrap();

    // With no device attached the data register holds the last byte sent.
    let mut words = [0x12, 0x34];
    SpiBus::transfer_in_place(&mut spi, &mut words).unwrap();
    assert_eq!(words, [0x12, 0x34]);
    assert_eq!(spi.transfer_byte(0xA5), Ok(0xA5));
}

#[test]
fn mode_fault_aborts_transfer() {
    let regs = spi_with_status(bits(&[SR::SPIF, SR::MDF]));
    let mut spi = Spi::new(regs, FakePins, MODE_3, Hertz(1_000_000), Clocks::default()).unwrap();
    assert_eq!(spi.transfer_byte(0), Err(Error::ModeFault));
}

#[test]
fn missing_completion_times_out() {
    let regs = block::<RegisterBlock>();
    let mut spi = Spi::new(regs, FakePins, MODE_3, Hertz(1_000_000), Clocks::default()).unwrap();
    spi.set_timeout(8);
    assert_eq!(spi.transfer_byte(0), Err(Error::Timeout));
}
