//! SPI controller registers

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// Serial peripheral interface
    pub RegisterBlock {
        /// Control
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        /// Slave select output
        (0x04 => pub ssn: ReadWrite<u32, SSN::Register>),
        /// Status
        (0x08 => pub sr: ReadOnly<u32, SR::Register>),
        /// Data
        (0x0C => pub data: ReadWrite<u32, DATA::Register>),
        (0x10 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        /// SCK = PCLK / 2^(SPR + 1)
        SPR OFFSET(0) NUMBITS(3) [],
        CPHA OFFSET(3) NUMBITS(1) [],
        CPOL OFFSET(4) NUMBITS(1) [],
        MSTR OFFSET(5) NUMBITS(1) [],
        SPEN OFFSET(6) NUMBITS(1) []
    ],
    pub SSN [
        SSN OFFSET(0) NUMBITS(1) []
    ],
    pub SR [
        /// Mode fault
        MDF OFFSET(4) NUMBITS(1) [],
        /// Slave select error
        SSERR OFFSET(5) NUMBITS(1) [],
        /// Write collision
        WCOL OFFSET(6) NUMBITS(1) [],
        /// Transfer complete
        SPIF OFFSET(7) NUMBITS(1) []
    ],
    pub DATA [
        DATA OFFSET(0) NUMBITS(8) []
    ]
];
