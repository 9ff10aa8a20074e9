//! System configuration registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

/// Key written to `UNLOCK.KEY` to open or close the register write window.
pub const UNLOCK_KEY: u32 = 0x2AD5_334C;

register_structs! {
    /// System configuration
    pub RegisterBlock {
        /// System configuration 0
        (0x00 => pub cfgr0: ReadWrite<u32, CFGR0::Register>),
        /// Port interrupt mode
        (0x04 => pub portintcr: ReadWrite<u32, PORTINTCR::Register>),
        /// Debug pin usage
        (0x08 => pub portcr: ReadWrite<u32, PORTCR::Register>),
        /// PCA capture input routing
        (0x0C => pub pcacr: ReadWrite<u32, PCACR::Register>),
        /// Timer gate input routing
        (0x10 => pub timgatecr: ReadWrite<u32, TIMGATECR::Register>),
        (0x14 => _reserved0),
        /// Register write protection
        (0x20 => pub unlock: ReadWrite<u32, UNLOCK::Register>),
        (0x24 => @END),
    }
}

register_bitfields![u32,
    pub CFGR0 [
        /// Reset the core on lockup
        LOCKUPEN OFFSET(1) NUMBITS(1) []
    ],
    pub PORTINTCR [
        /// 0: one interrupt line per port, 1: all ports share the GPIOA line
        SHARED OFFSET(0) NUMBITS(1) []
    ],
    pub PORTCR [
        /// Release the SWD pins for use as GPIO
        SWDGPIO OFFSET(0) NUMBITS(1) [],
        /// Release the reset pin for use as GPIO
        RSTGPIO OFFSET(1) NUMBITS(1) []
    ],
    pub PCACR [
        CH0IN OFFSET(0) NUMBITS(2) [],
        CH1IN OFFSET(2) NUMBITS(2) [],
        CH2IN OFFSET(4) NUMBITS(2) [],
        CH3IN OFFSET(6) NUMBITS(2) [],
        CH4IN OFFSET(8) NUMBITS(2) []
    ],
    pub TIMGATECR [
        TIM10GATE OFFSET(0) NUMBITS(2) [],
        TIM11GATE OFFSET(2) NUMBITS(2) [],
        LPTIMGATE OFFSET(4) NUMBITS(2) []
    ],
    pub UNLOCK [
        UNLOCK OFFSET(0) NUMBITS(1) [],
        KEY OFFSET(1) NUMBITS(31) []
    ]
];
