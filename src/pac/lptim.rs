//! Low power timer registers
//!
//! Counts up from `LOAD` to overflow like the base timers. Writes to `LOAD` and `BGLOAD` cross into
//! the low speed clock domain; `CR.WTFLAG` reads 1 once the previous write has settled.

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// Low power timer
    pub RegisterBlock {
        /// Counter
        (0x00 => pub cnt: ReadOnly<u32>),
        /// Initial counter value
        (0x04 => pub load: ReadWrite<u32>),
        /// Reload value
        (0x08 => pub bgload: ReadWrite<u32>),
        /// Control
        (0x0C => pub cr: ReadWrite<u32, CR::Register>),
        /// Interrupt status
        (0x10 => pub intsr: ReadOnly<u32, INT::Register>),
        /// Interrupt clear
        (0x14 => pub intclr: WriteOnly<u32, INT::Register>),
        (0x18 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        TR OFFSET(0) NUMBITS(1) [],
        MODE OFFSET(1) NUMBITS(1) [
            FreeRun = 0,
            Reload = 1
        ],
        CT OFFSET(2) NUMBITS(1) [],
        TOGEN OFFSET(3) NUMBITS(1) [],
        TCKSEL OFFSET(4) NUMBITS(2) [
            Pclk = 0,
            Lxt = 2,
            Lirc = 3
        ],
        WTFLAG OFFSET(7) NUMBITS(1) [],
        GATE OFFSET(8) NUMBITS(1) [],
        GATEPOL OFFSET(9) NUMBITS(1) [],
        INTEN OFFSET(10) NUMBITS(1) []
    ],
    pub INT [
        TF OFFSET(0) NUMBITS(1) []
    ]
];
