mod common;

use core::ptr::addr_of_mut;

use cx32l003_hal::lptim::{ClockSource, Config, Error, Gate, LpTimer};
use cx32l003_hal::pac::lptim::{RegisterBlock, CR, INT};
use cx32l003_hal::rcc::Clocks;
use embedded_hal_zero::timer::CountDown;
use embedded_time::duration::Microseconds;
use embedded_time::rate::Hertz;
use tock_registers::interfaces::{ReadWriteable, Readable};

use common::{bits, block, block_with, peek, preset};

type LptimRegs = &'static RegisterBlock;

/// A timer whose reload writes settle at once
fn settled_timer(regs: LptimRegs, config: Config) -> LpTimer<LptimRegs> {
    regs.cr.modify(CR::WTFLAG::SET);
    LpTimer::new(regs, config, Clocks::default())
}

#[test]
fn new_selects_clock_and_gate() {
    let regs = block::<RegisterBlock>();
    let timer = LpTimer::new(
        regs,
        Config::default()
            .source(ClockSource::Lxt)
            .gate(Gate::ActiveLow)
            .toggle_output(true),
        Clocks::default(),
    );

    assert_eq!(regs.cr.read(CR::TCKSEL), 2);
    assert!(regs.cr.is_set(CR::MODE));
    assert!(regs.cr.is_set(CR::GATE));
    assert!(regs.cr.is_set(CR::GATEPOL));
    assert!(regs.cr.is_set(CR::TOGEN));
    assert!(!regs.cr.is_set(CR::TR));
    assert_eq!(timer.clock(), Hertz(32_768_u32));
}

#[test]
fn start_loads_both_reload_registers() {
    let regs = block::<RegisterBlock>();
    let mut timer = settled_timer(regs, Config::default());

    // 100 ms of LIRC
    timer.start_it(Microseconds(100_000_u32)).unwrap();
    assert_eq!(regs.load.get(), 0x1_0000 - 3_840);
    assert_eq!(regs.bgload.get(), 0x1_0000 - 3_840);
    assert!(regs.cr.is_set(CR::TR));
    assert!(regs.cr.is_set(CR::INTEN));

    timer.stop_it();
    assert!(!regs.cr.is_set(CR::TR));
    assert!(!regs.cr.is_set(CR::INTEN));
}

#[test]
fn unsettled_write_times_out() {
    let regs = block::<RegisterBlock>();
    let mut timer = LpTimer::new(regs, Config::default(), Clocks::default());
    timer.set_timeout(8);

    assert_eq!(timer.start_count(100), Err(Error::Timeout));
    assert_eq!(regs.load.get(), 0);
    assert_eq!(regs.bgload.get(), 0);
    assert!(!regs.cr.is_set(CR::TR));
}

#[test]
fn invalid_periods_are_refused() {
    let regs = block::<RegisterBlock>();
    let mut timer = settled_timer(regs, Config::default());

    assert_eq!(timer.start(Microseconds(0_u32)), Err(Error::InvalidPeriod));
    assert_eq!(timer.start(Microseconds(2_000_000_u32)), Err(Error::InvalidPeriod));
    assert!(!regs.cr.is_set(CR::TR));
}

#[test]
fn zero_count_down_overflows_after_one_tick() {
    let regs = block::<RegisterBlock>();
    let mut timer = settled_timer(regs, Config::default());

    CountDown::start(&mut timer, Microseconds(0_u32));
    assert_eq!(regs.load.get(), 0xFFFF);
    assert!(regs.cr.is_set(CR::TR));

    CountDown::start(&mut timer, Microseconds(10_000_000_u32));
    assert_eq!(regs.load.get(), 0);
}

#[test]
fn overflow_flag_is_cleared() {
    let regs = block_with(|r: *mut RegisterBlock| unsafe {
        preset(addr_of_mut!((*r).intsr), bits(&[INT::TF]));
        preset(addr_of_mut!((*r).cr), bits(&[CR::WTFLAG]));
    });
    let mut timer = LpTimer::new(regs, Config::default(), Clocks::default());
    assert!(timer.wait().is_ok());

    assert_eq!(peek(&regs.intclr), bits(&[INT::TF]));

    let mut overflowed = false;
    timer.irq_handler(|| overflowed = true);
    assert!(overflowed);
}
