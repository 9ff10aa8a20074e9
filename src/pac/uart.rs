//! UART registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// Universal asynchronous receiver transmitter
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
        /// Baud rate generator
        (0x18 => pub baudcr: ReadWrite<u32, BAUDCR::Register>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    pub SBUF [
        /// Ninth bit in modes 2 and 3 is carried by `SCON.TB8`/`SCON.RB8`
        DATA OFFSET(0) NUMBITS(8) []
    ],
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
        /// Double the baud rate in modes 1 to 3
        DBAUD OFFSET(9) NUMBITS(1) []
    ],
    pub ISR [
        /// Receive complete
        RI OFFSET(0) NUMBITS(1) [],
        /// Transmit complete
        TI OFFSET(1) NUMBITS(1) [],
        /// Framing error
        FE OFFSET(2) NUMBITS(1) [],
        /// Transmit buffer empty
        TXE OFFSET(3) NUMBITS(1) []
    ],
    pub BAUDCR [
        /// baud = (DBAUD + 1) * PCLK / (32 * (BRG + 1))
        BRG OFFSET(0) NUMBITS(16) [],
        SELFBRG OFFSET(16) NUMBITS(1) []
    ]
];
