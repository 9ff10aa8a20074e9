//! Programmable counter array registers

use tock_registers::registers::{ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

/// Number of capture/compare channels
pub const CHANNELS: usize = 5;

register_structs! {
    /// Programmable counter array
    pub RegisterBlock {
        /// Control and flags
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        /// Mode
        (0x04 => pub mode: ReadWrite<u32, MOD::Register>),
        /// Counter
        (0x08 => pub cnt: ReadWrite<u32>),
        /// Flag clear, write 1 to clear
        (0x0C => pub intclr: WriteOnly<u32, CR::Register>),
        /// Capture/compare mode, one per channel
        (0x10 => pub ccapm: [ReadWrite<u32, CCAPM::Register>; 5]),
        /// Capture/compare value, one per channel
        (0x24 => pub ccap: [ReadWrite<u32, CCAP::Register>; 5]),
        /// Compare output enable
        (0x38 => pub ccapo: ReadWrite<u32>),
        (0x3C => @END),
    }
}

register_bitfields![u32,
    pub CR [
        CCF0 OFFSET(0) NUMBITS(1) [],
        CCF1 OFFSET(1) NUMBITS(1) [],
        CCF2 OFFSET(2) NUMBITS(1) [],
        CCF3 OFFSET(3) NUMBITS(1) [],
        CCF4 OFFSET(4) NUMBITS(1) [],
        /// Counter run
        CR OFFSET(6) NUMBITS(1) [],
        /// Counter overflow
        CF OFFSET(7) NUMBITS(1) []
    ],
    pub MOD [
        /// Overflow interrupt enable
        ECF OFFSET(0) NUMBITS(1) [],
        CPS OFFSET(1) NUMBITS(3) [
            PclkDiv32 = 0,
            PclkDiv16 = 1,
            PclkDiv8 = 2,
            PclkDiv4 = 3,
            PclkDiv2 = 4,
            Tim10Overflow = 5,
            Tim11Overflow = 6,
            External = 7
        ],
        /// Stop counting in sleep mode
        CIDL OFFSET(7) NUMBITS(1) []
    ],
    pub CCAPM [
        CCIE OFFSET(0) NUMBITS(1) [],
        PWM OFFSET(1) NUMBITS(1) [],
        TOG OFFSET(2) NUMBITS(1) [],
        MAT OFFSET(3) NUMBITS(1) [],
        CAPN OFFSET(4) NUMBITS(1) [],
        CAPP OFFSET(5) NUMBITS(1) [],
        ECOM OFFSET(6) NUMBITS(1) []
    ],
    pub CCAP [
        LOW OFFSET(0) NUMBITS(8) [],
        HIGH OFFSET(8) NUMBITS(8) [],
        VALUE OFFSET(0) NUMBITS(16) []
    ]
];
