//! 1-Wire controller registers

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// 1-Wire bus master
    pub RegisterBlock {
        /// Control
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        /// Noise filter
        (0x04 => pub nfcr: ReadWrite<u32, NFCR::Register>),
        /// Reset pulse length, in controller clock ticks
        (0x08 => pub rstcnt: ReadWrite<u32, COUNT::Register>),
        /// Presence sample point after the reset pulse
        (0x0C => pub prescnt: ReadWrite<u32, COUNT::Register>),
        /// Time slot length
        (0x10 => pub bitratecnt: ReadWrite<u32, COUNT::Register>),
        /// Low time that starts a write-1 or read slot
        (0x14 => pub drcnt: ReadWrite<u32, COUNT::Register>),
        /// Data
        (0x18 => pub data: ReadWrite<u32>),
        /// Command
        (0x1C => pub cmd: WriteOnly<u32, CMD::Register>),
        /// Interrupt enable
        (0x20 => pub inten: ReadWrite<u32, FLAGS::Register>),
        /// Status
        (0x24 => pub sr: ReadOnly<u32, FLAGS::Register>),
        /// Status clear
        (0x28 => pub intclr: WriteOnly<u32, FLAGS::Register>),
        (0x2C => @END),
    }
}

register_bitfields![u32,
    pub CR [
        EN OFFSET(0) NUMBITS(1) [],
        MSBFIRST OFFSET(2) NUMBITS(1) [],
        SIZE OFFSET(3) NUMBITS(1) [
            Byte = 0,
            Bit = 1
        ],
        /// Controller clock = PCLK / {1, 2, 4, 16}
        CLKDIV OFFSET(4) NUMBITS(2) [
            Div1 = 0,
            Div2 = 1,
            Div4 = 2,
            Div16 = 3
        ]
    ],
    pub NFCR [
        NFEN OFFSET(0) NUMBITS(1) [],
        NFDIV OFFSET(1) NUMBITS(2) []
    ],
    pub COUNT [
        VALUE OFFSET(0) NUMBITS(12) []
    ],
    pub CMD [
        CMD OFFSET(0) NUMBITS(2) [
            Init = 1,
            Tx = 2,
            Rx = 3
        ]
    ],
    pub FLAGS [
        /// No presence pulse after a reset
        ACKERR OFFSET(0) NUMBITS(1) [],
        RXDONE OFFSET(1) NUMBITS(1) [],
        TXDONE OFFSET(2) NUMBITS(1) [],
        INITDONE OFFSET(3) NUMBITS(1) []
    ]
];
