mod common;

use cx32l003_hal::pac::syscon::{
    RegisterBlock, CFGR0, PCACR, PORTCR, PORTINTCR, TIMGATECR, UNLOCK, UNLOCK_KEY,
};
use cx32l003_hal::pca::Channel;
use cx32l003_hal::syscon::{BaseTimer, GateSource, PcaCaptureSource, PortInterruptMode, Syscon};
use tock_registers::interfaces::Readable;

use common::block;

type SysconRegs = &'static RegisterBlock;

fn syscon() -> (SysconRegs, Syscon<SysconRegs>) {
    let regs = block::<RegisterBlock>();
    (regs, Syscon::new(regs))
}

/// The window was closed with the right key after the last write
fn assert_locked(regs: SysconRegs) {
    assert!(!regs.unlock.is_set(UNLOCK::UNLOCK));
    assert_eq!(regs.unlock.read(UNLOCK::KEY), UNLOCK_KEY);
}

#[test]
fn debug_and_reset_pins_are_released_inside_window() {
    let (regs, mut syscon) = syscon();

    syscon.swd_as_gpio(true);
    assert!(regs.portcr.is_set(PORTCR::SWDGPIO));
    assert_locked(regs);

    syscon.reset_pin_as_gpio(true);
    assert!(regs.portcr.is_set(PORTCR::RSTGPIO));
    assert!(regs.portcr.is_set(PORTCR::SWDGPIO));
    assert_locked(regs);

    syscon.swd_as_gpio(false);
    assert!(!regs.portcr.is_set(PORTCR::SWDGPIO));
    assert_locked(regs);
}

#[test]
fn pca_capture_routing_per_channel() {
    let (regs, mut syscon) = syscon();

    syscon.pca_capture_source(Channel::C0, PcaCaptureSource::Uart0Rx);
    syscon.pca_capture_source(Channel::C4, PcaCaptureSource::LpuartRx);
    assert_eq!(regs.pcacr.read(PCACR::CH0IN), 1);
    assert_eq!(regs.pcacr.read(PCACR::CH4IN), 3);
    assert_eq!(regs.pcacr.read(PCACR::CH2IN), 0);
    assert_locked(regs);
}

#[test]
fn gate_routing_keeps_other_timers() {
    let (regs, mut syscon) = syscon();

    syscon.timer_gate_source(BaseTimer::Tim11, GateSource::Uart1Rx);
    syscon.lptim_gate_source(GateSource::LpuartRx);
    assert_eq!(regs.timgatecr.read(TIMGATECR::TIM10GATE), 0);
    assert_eq!(regs.timgatecr.read(TIMGATECR::TIM11GATE), 2);
    assert_eq!(regs.timgatecr.read(TIMGATECR::LPTIMGATE), 3);
    assert_locked(regs);
}

#[test]
fn lockup_and_interrupt_mode() {
    let (regs, mut syscon) = syscon();

    syscon.lockup_reset(true);
    syscon.port_interrupt_mode(PortInterruptMode::Shared);
    assert!(regs.cfgr0.is_set(CFGR0::LOCKUPEN));
    assert!(regs.portintcr.is_set(PORTINTCR::SHARED));

    syscon.port_interrupt_mode(PortInterruptMode::PerPort);
    assert!(!regs.portintcr.is_set(PORTINTCR::SHARED));
    assert_locked(regs);
}
