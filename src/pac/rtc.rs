//! Real time clock registers
//!
//! Calendar fields are BCD encoded.

use tock_registers::registers::{ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

/// Key written to `UNLOCK.KEY` to open or close the register write window.
pub const UNLOCK_KEY: u32 = 0x2AD5_334C;

register_structs! {
    /// Real time clock
    pub RegisterBlock {
        /// Control
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        /// Clock selection
        (0x04 => pub clkcr: ReadWrite<u32, CLKCR::Register>),
        /// Time of day and weekday
        (0x08 => pub time: ReadWrite<u32, TIME::Register>),
        /// Calendar date
        (0x0C => pub date: ReadWrite<u32, DATE::Register>),
        /// Alarm
        (0x10 => pub alarm: ReadWrite<u32, ALARM::Register>),
        /// Interrupt status
        (0x14 => pub isr: ReadWrite<u32, ISR::Register>),
        /// Interrupt clear
        (0x18 => pub intclr: WriteOnly<u32, ISR::Register>),
        (0x1C => _reserved0),
        /// Register write protection
        (0x20 => pub unlock: ReadWrite<u32, UNLOCK::Register>),
        (0x24 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        START OFFSET(0) NUMBITS(1) [],
        /// 1: 24 hour clock, 0: 12 hour clock with AM/PM in `TIME.HOUR` bit 5
        HOUR24 OFFSET(1) NUMBITS(1) [],
        /// Periodic interrupt period
        PRDS OFFSET(4) NUMBITS(3) [
            None = 0,
            HalfSecond = 1,
            Second = 2,
            Minute = 3,
            Hour = 4,
            Day = 5,
            Month = 6
        ],
        /// Request to stop calendar updates so the counters can be accessed
        WAIT OFFSET(8) NUMBITS(1) [],
        /// Set by hardware once the counters are frozen
        WAITF OFFSET(9) NUMBITS(1) [],
        ALMEN OFFSET(10) NUMBITS(1) [],
        ALMIE OFFSET(11) NUMBITS(1) [],
        PRDIE OFFSET(12) NUMBITS(1) []
    ],
    pub CLKCR [
        CLKSEL OFFSET(0) NUMBITS(2) [
            Lxt = 0,
            Lirc = 1,
            HxtDiv = 2
        ],
        CKEN OFFSET(2) NUMBITS(1) [],
        /// HXT divider when `CLKSEL` is `HxtDiv`, counts at HXT / (HXTDIV + 1)
        HXTDIV OFFSET(4) NUMBITS(8) []
    ],
    pub TIME [
        SEC OFFSET(0) NUMBITS(7) [],
        MIN OFFSET(8) NUMBITS(7) [],
        HOUR OFFSET(16) NUMBITS(6) [],
        /// 0 = Sunday
        WEEK OFFSET(24) NUMBITS(3) []
    ],
    pub DATE [
        DAY OFFSET(0) NUMBITS(6) [],
        MONTH OFFSET(8) NUMBITS(5) [],
        YEAR OFFSET(16) NUMBITS(8) []
    ],
    pub ALARM [
        SEC OFFSET(0) NUMBITS(7) [],
        MIN OFFSET(8) NUMBITS(7) [],
        HOUR OFFSET(16) NUMBITS(6) [],
        /// One bit per weekday, bit 0 = Sunday
        WEEKMASK OFFSET(24) NUMBITS(7) []
    ],
    pub ISR [
        ALMF OFFSET(0) NUMBITS(1) [],
        PRDF OFFSET(1) NUMBITS(1) []
    ],
    pub UNLOCK [
        UNLOCK OFFSET(0) NUMBITS(1) [],
        KEY OFFSET(1) NUMBITS(31) []
    ]
];
