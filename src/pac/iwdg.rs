//! Independent watchdog registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

/// Written to `UNLOCK` to allow writes to `CFGR` and `RLOAD`; any other value locks.
pub const UNLOCK_KEY: u32 = 0x55AA_6699;
/// `CMDCR` command starting the counter
pub const CMD_START: u32 = 0x55;
/// `CMDCR` command reloading the counter
pub const CMD_RELOAD: u32 = 0xAA;

register_structs! {
    /// Independent watchdog
    pub RegisterBlock {
        /// Command
        (0x00 => pub cmdcr: WriteOnly<u32>),
        /// Configuration
        (0x04 => pub cfgr: ReadWrite<u32, CFGR::Register>),
        /// Reload value
        (0x08 => pub rload: ReadWrite<u32, RLOAD::Register>),
        /// Current counter value
        (0x0C => pub cntval: ReadOnly<u32, RLOAD::Register>),
        /// Status
        (0x10 => pub sr: ReadOnly<u32, SR::Register>),
        /// Interrupt clear
        (0x14 => pub intclr: WriteOnly<u32, SR::Register>),
        /// Register write protection
        (0x18 => pub unlock: ReadWrite<u32>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    pub CFGR [
        MODE OFFSET(0) NUMBITS(1) [
            Reset = 0,
            Interrupt = 1
        ],
        /// Mask the overflow interrupt
        INTMASK OFFSET(1) NUMBITS(1) []
    ],
    pub RLOAD [
        VALUE OFFSET(0) NUMBITS(20) []
    ],
    pub SR [
        OV OFFSET(0) NUMBITS(1) []
    ]
];
