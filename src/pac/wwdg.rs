//! Window watchdog registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// Window watchdog
    pub RegisterBlock {
        /// Control
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        /// Interrupt enable
        (0x04 => pub inten: ReadWrite<u32, FLAG::Register>),
        /// Counter
        (0x08 => pub cnt: ReadOnly<u32, CNT::Register>),
        /// Status
        (0x0C => pub sr: ReadOnly<u32, FLAG::Register>),
        /// Interrupt clear
        (0x10 => pub intclr: WriteOnly<u32, FLAG::Register>),
        /// Prescaler
        (0x14 => pub cfgr: ReadWrite<u32, CFGR::Register>),
        (0x18 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        /// Counter reload value, writing it refreshes the counter
        WCNTL OFFSET(0) NUMBITS(8) [],
        /// Window: refreshing while the counter is above this value resets the chip
        WINR OFFSET(8) NUMBITS(8) [],
        WWDGEN OFFSET(16) NUMBITS(1) []
    ],
    pub CNT [
        CNT OFFSET(0) NUMBITS(8) []
    ],
    pub FLAG [
        /// Early wakeup, raised when the counter reaches 1
        EWI OFFSET(0) NUMBITS(1) []
    ],
    pub CFGR [
        /// Counter clock = PCLK / (4096 * (PRSC + 1))
        PRSC OFFSET(0) NUMBITS(8) []
    ]
];
