//! Base timer registers (TIM10, TIM11)
//!
//! The counter counts up from `LOAD` and raises `UIF` when it overflows, reloading from `BGLOAD`
//! in reload mode.

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// Base timer
    pub RegisterBlock {
        /// Control
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        /// Initial counter value
        (0x04 => pub load: ReadWrite<u32>),
        /// Counter
        (0x08 => pub cnt: ReadWrite<u32>),
        /// Reload value
        (0x0C => pub bgload: ReadWrite<u32>),
        /// Raw interrupt status
        (0x10 => pub ris: ReadOnly<u32, INT::Register>),
        /// Masked interrupt status
        (0x14 => pub mis: ReadOnly<u32, INT::Register>),
        /// Interrupt clear
        (0x18 => pub icr: WriteOnly<u32, INT::Register>),
        (0x1C => _reserved0),
        (0x20 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        /// Run
        TR OFFSET(0) NUMBITS(1) [],
        MODE OFFSET(1) NUMBITS(1) [
            FreeRun = 0,
            Reload = 1
        ],
        TOGEN OFFSET(2) NUMBITS(1) [],
        /// Counter clock = PCLK / 2^PRS
        PRS OFFSET(4) NUMBITS(3) [],
        /// Count external pulses instead of PCLK
        CT OFFSET(7) NUMBITS(1) [],
        GATE OFFSET(8) NUMBITS(1) [],
        GATEPOL OFFSET(9) NUMBITS(1) [],
        TMRSZ OFFSET(10) NUMBITS(1) [
            Bits16 = 0,
            Bits32 = 1
        ],
        ONESHOT OFFSET(11) NUMBITS(1) [],
        INTEN OFFSET(12) NUMBITS(1) []
    ],
    pub INT [
        UIF OFFSET(0) NUMBITS(1) []
    ]
];
