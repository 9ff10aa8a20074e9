//! I2C controller registers

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// I2C bus controller
    pub RegisterBlock {
        /// Control
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        /// Data
        (0x04 => pub data: ReadWrite<u32, DATA::Register>),
        /// Own slave address
        (0x08 => pub addr: ReadWrite<u32, ADDR::Register>),
        /// Bus state code, valid while `CR.SI` is set
        (0x0C => pub sr: ReadOnly<u32, SR::Register>),
        /// Baud rate timer enable
        (0x10 => pub timrun: ReadWrite<u32, TIMRUN::Register>),
        /// Baud rate timer period
        (0x14 => pub baudcr: ReadWrite<u32, BAUDCR::Register>),
        (0x18 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        /// Acknowledge received bytes
        AA OFFSET(2) NUMBITS(1) [],
        /// Interrupt flag, the bus is stalled while it is set; clear it to continue
        SI OFFSET(3) NUMBITS(1) [],
        STO OFFSET(4) NUMBITS(1) [],
        STA OFFSET(5) NUMBITS(1) [],
        ENS OFFSET(6) NUMBITS(1) [],
        /// High speed (1 MHz) mode
        H1M OFFSET(7) NUMBITS(1) []
    ],
    pub DATA [
        DATA OFFSET(0) NUMBITS(8) []
    ],
    pub ADDR [
        /// General call recognition
        GC OFFSET(0) NUMBITS(1) [],
        ADDR OFFSET(1) NUMBITS(7) []
    ],
    pub SR [
        STATUS OFFSET(0) NUMBITS(8) []
    ],
    pub TIMRUN [
        TME OFFSET(0) NUMBITS(1) []
    ],
    pub BAUDCR [
        /// SCL = PCLK / (8 * (TM + 1))
        TM OFFSET(0) NUMBITS(8) []
    ]
];
