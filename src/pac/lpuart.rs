//! Low power UART registers
//!
//! The layout matches the UART apart from the clock selection fields in `SCON`.

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

pub use super::uart::{BAUDCR, ISR, SBUF};

register_structs! {
    /// Low power universal asynchronous receiver transmitter
    pub RegisterBlock {
        /// Transmit and receive buffer
        (0x00 => pub sbuf: ReadWrite<u32, SBUF::Register>),
        /// Serial control
        (0x04 => pub scon: ReadWrite<u32, SCON::Register>),
        /// Slave address
        (0x08 => pub saddr: ReadWrite<u32>),
        /// Slave address mask
        (0x0C => pub saden: ReadWrite<u32>),
        /// Interrupt status
        (0x10 => pub isr: ReadOnly<u32, ISR::Register>),
        /// Interrupt clear
        (0x14 => pub icr: WriteOnly<u32, ISR::Register>),
        /// Baud rate generator, used when clocked from PCLK
        (0x18 => pub baudcr: ReadWrite<u32, BAUDCR::Register>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    pub SCON [
        RIEN OFFSET(0) NUMBITS(1) [],
        TIEN OFFSET(1) NUMBITS(1) [],
        RB8 OFFSET(2) NUMBITS(1) [],
        TB8 OFFSET(3) NUMBITS(1) [],
        REN OFFSET(4) NUMBITS(1) [],
        SM2 OFFSET(5) NUMBITS(1) [],
        SM OFFSET(6) NUMBITS(2) [
            Mode0 = 0,
            Mode1 = 1,
            Mode2 = 2,
            Mode3 = 3
        ],
        FEIEN OFFSET(8) NUMBITS(1) [],
        DBAUD OFFSET(9) NUMBITS(1) [],
        /// Oversampling when clocked from a 32 kHz source: 0 = 9600, 1 = 4800, 2 = 2400 baud
        PRSC OFFSET(11) NUMBITS(3) [],
        SCLKSEL OFFSET(14) NUMBITS(2) [
            Pclk = 0,
            Lxt = 2,
            Lirc = 3
        ]
    ]
];
