//! CRC16 unit registers
//!
//! CRC-16/CCITT (polynomial 0x1021). Writing `0xFFFF` to `RESULT` starts a new calculation.

use tock_registers::registers::{ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// CRC16 calculation unit
    pub RegisterBlock {
        /// Running result and check flag
        (0x00 => pub result: ReadWrite<u32, RESULT::Register>),
        (0x04 => _reserved0),
        /// Word input
        (0x80 => pub data: WriteOnly<u32>),
        /// Byte input
        (0x84 => pub data8: WriteOnly<u8>),
        (0x85 => _reserved1),
        (0x88 => @END),
    }
}

register_bitfields![u32,
    pub RESULT [
        CRC OFFSET(0) NUMBITS(16) [],
        /// Set when the data fed so far, including a trailing CRC, checks out
        FLAG OFFSET(16) NUMBITS(1) []
    ]
];
