mod common;

use core::ptr::addr_of_mut;

use cx32l003_hal::pac::tim::{RegisterBlock, CR, INT};
use cx32l003_hal::rcc::Clocks;
use cx32l003_hal::timer::{Error, Timer};
use embedded_hal_zero::timer::CountDown;
use embedded_time::duration::{Extensions, Microseconds};
use embedded_time::rate::Hertz;
use tock_registers::interfaces::Readable;

use common::{bits, block, block_with, preset};

#[test]
fn one_millisecond_reloads_from_pclk() {
    let regs = block::<RegisterBlock>();
    let mut timer = Timer::new(regs, Clocks::default());

    timer.start(1_000_u32.microseconds()).unwrap();
    assert_eq!(regs.load.get(), 0x1_0000 - 24_000);
    assert_eq!(regs.bgload.get(), 0x1_0000 - 24_000);
    assert_eq!(regs.cr.read(CR::PRS), 0);
    assert!(timer.is_running());
    assert_eq!(timer.tick_rate(), Hertz(24_000_000_u32));

    timer.stop();
    assert!(!regs.cr.is_set(CR::TR));
}

#[test]
fn long_periods_use_the_prescaler() {
    let regs = block::<RegisterBlock>();
    let mut timer = Timer::new(regs, Clocks::default());

    timer.start_it(Microseconds(10_000_u32)).unwrap();
    assert_eq!(regs.cr.read(CR::PRS), 2);
    assert_eq!(regs.load.get(), 0x1_0000 - 60_000);
    assert!(regs.cr.is_set(CR::INTEN));

    timer.stop_it();
    assert!(!regs.cr.is_set(CR::INTEN));
}

#[test]
fn period_beyond_the_counter_is_refused() {
    let regs = block::<RegisterBlock>();
    let mut timer = Timer::new(regs, Clocks::default());
    assert_eq!(timer.start(Microseconds(10_000_000_u32)), Err(Error::InvalidPeriod));
    assert!(!timer.is_running());
}

#[test]
fn wait_completes_on_update_flag() {
    let idle = block::<RegisterBlock>();
    let mut timer = Timer::new(idle, Clocks::default());
    CountDown::start(&mut timer, Microseconds(100_u32));
    assert!(timer.wait().is_err());

    let updated = block_with(|r: *mut RegisterBlock| unsafe {
        preset(addr_of_mut!((*r).ris), bits(&[INT::UIF]));
        preset(addr_of_mut!((*r).mis), bits(&[INT::UIF]));
    });
    let mut timer = Timer::new(updated, Clocks::default());
    CountDown::start(&mut timer, Microseconds(100_u32));
    assert!(timer.wait().is_ok());

    let mut fired = false;
    timer.irq_handler(|| fired = true);
    assert!(fired);
}

#[test]
fn zero_count_down_overflows_after_one_tick() {
    let regs = block::<RegisterBlock>();
    let mut timer = Timer::new(regs, Clocks::default());

    CountDown::start(&mut timer, Microseconds(0_u32));
    assert_eq!(regs.load.get(), 0xFFFF);
    assert_eq!(regs.cr.read(CR::PRS), 0);
    assert!(timer.is_running());
}

#[test]
fn overlong_count_down_uses_longest_period() {
    let regs = block::<RegisterBlock>();
    let mut timer = Timer::new(regs, Clocks::default());

    CountDown::start(&mut timer, Microseconds(10_000_000_u32));
    assert_eq!(regs.load.get(), 0);
    assert_eq!(regs.cr.read(CR::PRS), 7);
}
