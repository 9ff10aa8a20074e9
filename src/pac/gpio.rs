//! General purpose I/O port registers
//!
//! Ports are eight pins wide. Unless noted, registers hold one bit per pin at bit `n`.

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// General purpose I/O port
    pub RegisterBlock {
        /// Direction, 1 = output
        (0x00 => pub dircr: ReadWrite<u32>),
        /// Output type, 1 = open drain
        (0x04 => pub otyper: ReadWrite<u32>),
        /// Output data
        (0x08 => pub odr: ReadWrite<u32>),
        /// Input data
        (0x0C => pub idr: ReadOnly<u32>),
        /// Interrupt enable
        (0x10 => pub inten: ReadWrite<u32>),
        /// Raw interrupt status
        (0x14 => pub ris: ReadOnly<u32>),
        /// Masked interrupt status
        (0x18 => pub mis: ReadOnly<u32>),
        /// Interrupt type, 1 = level
        (0x1C => pub inttypcr: ReadWrite<u32>),
        /// Interrupt polarity, 1 = rising edge / high level
        (0x20 => pub intpolcr: ReadWrite<u32>),
        /// Interrupt on both edges
        (0x24 => pub intany: ReadWrite<u32>),
        /// Output set, write 1 to drive high
        (0x28 => pub odset: WriteOnly<u32>),
        /// Output clear, write 1 to drive low
        (0x2C => pub odclr: WriteOnly<u32>),
        /// Interrupt clear, write 1 to clear
        (0x30 => pub iclr: WriteOnly<u32>),
        /// Input debounce enable
        (0x34 => pub indben: ReadWrite<u32>),
        /// Debounce clock
        (0x38 => pub dbclkcr: ReadWrite<u32, DBCLKCR::Register>),
        /// Pull configuration, two bits per pin
        (0x3C => pub pupdr: ReadWrite<u32>),
        /// Slew rate, 1 = slow
        (0x40 => pub slewcr: ReadWrite<u32>),
        /// Drive strength, 1 = high drive
        (0x44 => pub drvcr: ReadWrite<u32>),
        /// Alternate function, four bits per pin
        (0x48 => pub afr: ReadWrite<u32>),
        (0x4C => @END),
    }
}

register_bitfields![u32,
    pub DBCLKCR [
        /// Debounce clock = HCLK / 2^(DBCLKCNT + 1)
        DBCLKCNT OFFSET(0) NUMBITS(4) [],
        DBCLKEN OFFSET(4) NUMBITS(1) []
    ]
];

/// Value of a `PUPDR` pin field
pub mod pupd {
    pub const NONE: u32 = 0b00;
    pub const PULL_UP: u32 = 0b01;
    pub const PULL_DOWN: u32 = 0b10;
}
