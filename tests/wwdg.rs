mod common;

use core::ptr::addr_of_mut;

use cx32l003_hal::pac::wwdg::{RegisterBlock, CFGR, CR, FLAG};
use cx32l003_hal::rcc::Clocks;
use cx32l003_hal::wwdg::{Config, Error, Wwdg};
use embedded_hal_zero::watchdog::Watchdog;
use embedded_time::rate::Hertz;
use tock_registers::interfaces::{ReadWriteable, Readable};

use common::{bits, block_with, peek, preset};

type WwdgRegs = &'static RegisterBlock;

const CONFIG: Config = Config {
    prescaler: 1,
    window: 0x40,
    reload: 0x7F,
};

/// A started watchdog whose counter is frozen at `count`
fn started(count: u32) -> (WwdgRegs, Wwdg<WwdgRegs>) {
    let regs = block_with(|r: *mut RegisterBlock| unsafe { preset(addr_of_mut!((*r).cnt), count) });
    let mut wd = Wwdg::new(regs, CONFIG);
    wd.start();
    // Mark the counter so a refresh shows up
    regs.cr.modify(CR::WCNTL.val(0x11));
    (regs, wd)
}

#[test]
fn start_programs_window_and_reload() {
    let (regs, wd) = started(0x7F);
    assert!(regs.cr.is_set(CR::WWDGEN));
    assert_eq!(regs.cr.read(CR::WINR), 0x40);
    assert_eq!(regs.cfgr.read(CFGR::PRSC), 1);
    // 24 MHz / (4096 * 2)
    assert_eq!(wd.counter_clock(&Clocks::default()), Hertz(2929_u32));
}

#[test]
fn feed_above_window_is_refused() {
    let (regs, mut wd) = started(0x41);
    assert_eq!(wd.feed(), Err(Error::OutsideWindow));
    assert_eq!(regs.cr.read(CR::WCNTL), 0x11);
}

#[test]
fn feed_inside_window_reloads() {
    let (regs, mut wd) = started(0x40);
    assert_eq!(wd.feed(), Ok(()));
    assert_eq!(regs.cr.read(CR::WCNTL), 0x7F);
    assert!(regs.cr.is_set(CR::WWDGEN));
}

#[test]
fn blocking_feed_gives_up_when_window_never_opens() {
    let (regs, mut wd) = started(0xF0);
    Watchdog::feed(&mut wd);
    assert_eq!(regs.cr.read(CR::WCNTL), 0x11);
}

#[test]
fn blocking_feed_refreshes_inside_window() {
    let (regs, mut wd) = started(0x20);
    Watchdog::feed(&mut wd);
    assert_eq!(regs.cr.read(CR::WCNTL), 0x7F);
}

#[test]
fn early_wakeup_is_cleared() {
    let regs = block_with(|r: *mut RegisterBlock| unsafe {
        preset(addr_of_mut!((*r).sr), bits(&[FLAG::EWI]))
    });
    let mut wd = Wwdg::new(regs, CONFIG);
    assert_eq!(peek(&regs.intclr), 0);

    let mut woken = false;
    wd.irq_handler(|| woken = true);
    assert!(woken);
    assert_eq!(peek(&regs.intclr), bits(&[FLAG::EWI]));
}
