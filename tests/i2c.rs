mod common;

use cx32l003_hal::i2c::{Error, I2c, Pins};
use cx32l003_hal::pac;
use cx32l003_hal::pac::i2c::{RegisterBlock, BAUDCR, CR, TIMRUN};
use cx32l003_hal::rcc::Clocks;
use embedded_time::rate::Hertz;
use tock_registers::interfaces::Readable;

use common::{block, FakePins};

unsafe impl Pins<pac::I2C> for FakePins {}

#[test]
fn new_enables_master_at_requested_rate() {
    let regs = block::<RegisterBlock>();
    let _i2c = I2c::new(regs, FakePins, Hertz(100_000), Clocks::default()).unwrap();

    // 24 MHz / (8 * 30) = 100 kHz
    assert_eq!(regs.baudcr.read(BAUDCR::TM), 29);
    assert!(regs.timrun.is_set(TIMRUN::TME));
    assert!(regs.cr.is_set(CR::ENS));
    assert!(!regs.cr.is_set(CR::H1M));
}

#[test]
fn fast_mode_plus_selects_high_speed() {
    let regs = block::<RegisterBlock>();
    let _i2c = I2c::new(regs, FakePins, Hertz(1_000_000), Clocks::default()).unwrap();
    assert_eq!(regs.baudcr.read(BAUDCR::TM), 2);
    assert!(regs.cr.is_set(CR::H1M));
}

#[test]
fn unreachable_rate_is_refused() {
    let regs = block::<RegisterBlock>();
    let result = I2c::new(regs, FakePins, Hertz(5_000), Clocks::default());
    assert!(matches!(result, Err(Error::InvalidFrequency)));
}

#[test]
fn failed_transfer_still_sends_stop() {
    let regs = block::<RegisterBlock>();
    let mut i2c = I2c::new(regs, FakePins, Hertz(100_000), Clocks::default()).unwrap();
    i2c.set_timeout(8);

    assert_eq!(i2c.master_transmit(0x50, &[1, 2]), Err(Error::Timeout));
    assert!(regs.cr.is_set(CR::STO));
}

#[test]
fn release_disables_controller() {
    let regs = block::<RegisterBlock>();
    let i2c = I2c::new(regs, FakePins, Hertz(100_000), Clocks::default()).unwrap();
    let (_regs, _pins) = i2c.release();
    assert_eq!(regs.cr.get(), 0);
    assert!(!regs.timrun.is_set(TIMRUN::TME));
}
