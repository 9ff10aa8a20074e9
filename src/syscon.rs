//! System configuration
//!
//! Routes signals between peripherals (PCA capture inputs, timer gates), releases the debug pins
//! for general use and selects how port interrupts reach the NVIC. Every register is behind the
//! same unlock window as the RCC.

use core::ops::Deref;

use tock_registers::interfaces::{ReadWriteable, Writeable};

use crate::pac;
use crate::pca::Channel;
use crate::pac::syscon::{
    RegisterBlock, CFGR0, PCACR, PORTCR, PORTINTCR, TIMGATECR, UNLOCK, UNLOCK_KEY,
};

/// Signal sampled by a PCA capture channel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PcaCaptureSource {
    /// The channel's own pin
    Pin = 0,
    /// UART0 receive line
    Uart0Rx = 1,
    /// UART1 receive line
    Uart1Rx = 2,
    /// LPUART receive line
    LpuartRx = 3,
}

/// Gate input of a base or low power timer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateSource {
    /// The timer's gate pin
    Pin = 0,
    /// UART0 receive line
    Uart0Rx = 1,
    /// UART1 receive line
    Uart1Rx = 2,
    /// LPUART receive line
    LpuartRx = 3,
}

/// Base timer selection for [`Syscon::timer_gate_source`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaseTimer {
    Tim10,
    Tim11,
}

/// How GPIO port interrupts are delivered
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortInterruptMode {
    /// GPIOA..GPIOD each raise their own interrupt
    PerPort,
    /// All ports raise the GPIOA interrupt
    Shared,
}

pub trait SysconExt {
    fn constrain(self) -> Syscon;
}

impl SysconExt for pac::SYSCON {
    fn constrain(self) -> Syscon {
        Syscon::new(self)
    }
}

/// Constrained SYSCON peripheral
pub struct Syscon<R = pac::SYSCON> {
    regs: R,
}

impl<R> Syscon<R>
where
    R: Deref<Target = RegisterBlock>,
{
    pub fn new(regs: R) -> Self {
        Syscon { regs }
    }

    pub fn free(self) -> R {
        self.regs
    }

    fn unlocked(&mut self, f: impl FnOnce(&RegisterBlock)) {
        let regs = &*self.regs;
        critical_section::with(|_| {
            regs.unlock
                .write(UNLOCK::KEY.val(UNLOCK_KEY) + UNLOCK::UNLOCK::SET);
            f(regs);
            regs.unlock
                .write(UNLOCK::KEY.val(UNLOCK_KEY) + UNLOCK::UNLOCK::CLEAR);
        });
    }

    /// Releases SWDIO/SWCLK for GPIO use. The debugger can't attach afterwards until reset.
    pub fn swd_as_gpio(&mut self, enable: bool) {
        self.unlocked(|r| r.portcr.modify(PORTCR::SWDGPIO.val(enable as u32)));
    }

    /// Releases the reset pin for GPIO use
    pub fn reset_pin_as_gpio(&mut self, enable: bool) {
        self.unlocked(|r| r.portcr.modify(PORTCR::RSTGPIO.val(enable as u32)));
    }

    /// Resets the core when it locks up
    pub fn lockup_reset(&mut self, enable: bool) {
        self.unlocked(|r| r.cfgr0.modify(CFGR0::LOCKUPEN.val(enable as u32)));
    }

    /// Selects the input sampled by PCA capture channel `channel`
    pub fn pca_capture_source(&mut self, channel: Channel, source: PcaCaptureSource) {
        let field = match channel {
            Channel::C0 => PCACR::CH0IN,
            Channel::C1 => PCACR::CH1IN,
            Channel::C2 => PCACR::CH2IN,
            Channel::C3 => PCACR::CH3IN,
            Channel::C4 => PCACR::CH4IN,
        };
        self.unlocked(|r| r.pcacr.modify(field.val(source as u32)));
    }

    pub fn timer_gate_source(&mut self, timer: BaseTimer, source: GateSource) {
        let field = match timer {
            BaseTimer::Tim10 => TIMGATECR::TIM10GATE,
            BaseTimer::Tim11 => TIMGATECR::TIM11GATE,
        };
        self.unlocked(|r| r.timgatecr.modify(field.val(source as u32)));
    }

    pub fn lptim_gate_source(&mut self, source: GateSource) {
        self.unlocked(|r| {
            r.timgatecr
                .modify(TIMGATECR::LPTIMGATE.val(source as u32))
        });
    }

    pub fn port_interrupt_mode(&mut self, mode: PortInterruptMode) {
        let shared = mode == PortInterruptMode::Shared;
        self.unlocked(|r| r.portintcr.modify(PORTINTCR::SHARED.val(shared as u32)));
    }
}
