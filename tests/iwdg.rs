mod common;

use core::ptr::addr_of_mut;

use cx32l003_hal::iwdg::{Config, Iwdg, Mode, MAX_RELOAD};
use cx32l003_hal::pac::iwdg::{RegisterBlock, CFGR, CMD_RELOAD, CMD_START, RLOAD, SR};
use embedded_hal_zero::watchdog::WatchdogEnable;
use embedded_time::duration::Milliseconds;
use tock_registers::interfaces::Readable;

use common::{bits, block, block_with, peek, preset};

#[test]
fn configuration_is_written_then_locked() {
    let regs = block::<RegisterBlock>();
    let _wd = Iwdg::new(regs, Config::default().mode(Mode::Interrupt).reload(1234));

    assert_eq!(regs.cfgr.read(CFGR::MODE), 1);
    assert!(!regs.cfgr.is_set(CFGR::INTMASK));
    assert_eq!(regs.rload.read(RLOAD::VALUE), 1234);
    assert_eq!(regs.unlock.get(), 0);
}

#[test]
fn start_and_feed_use_command_codes() {
    let regs = block::<RegisterBlock>();
    let mut wd = Iwdg::new(regs, Config::default());

    wd.start();
    assert_eq!(peek(&regs.cmdcr), CMD_START);
    wd.feed();
    assert_eq!(peek(&regs.cmdcr), CMD_RELOAD);
}

#[test]
fn reload_changes_are_clamped_and_relocked() {
    let regs = block::<RegisterBlock>();
    let mut wd = Iwdg::new(regs, Config::default());

    wd.set_reload(u32::MAX);
    assert_eq!(regs.rload.read(RLOAD::VALUE), MAX_RELOAD);
    assert_eq!(regs.unlock.get(), 0);

    WatchdogEnable::start(&mut wd, Milliseconds(10_u32));
    assert_eq!(regs.rload.read(RLOAD::VALUE), 384);
    assert_eq!(peek(&regs.cmdcr), CMD_START);
    assert_eq!(regs.unlock.get(), 0);
}

#[test]
fn expiry_interrupt_is_cleared() {
    let regs = block_with(|r: *mut RegisterBlock| unsafe {
        preset(addr_of_mut!((*r).sr), bits(&[SR::OV]))
    });
    let mut wd = Iwdg::new(regs, Config::default().mode(Mode::Interrupt));

    let mut expired = false;
    wd.irq_handler(|| expired = true);
    assert!(expired);
    assert_eq!(peek(&regs.intclr), bits(&[SR::OV]));
}
