//! Reset and clock control registers

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

/// Key that must accompany every write to `SYSCLKCR`, `SYSCLKSEL` and the oscillator control
/// registers, in bits [31:16].
pub const REGWRITE_KEY: u32 = 0x5A69;

/// Key written to `UNLOCK.KEY` to open or close the register write window.
pub const UNLOCK_KEY: u32 = 0x2AD5_334C;

register_structs! {
    /// Reset and clock control
    pub RegisterBlock {
        /// AHB clock divider
        (0x00 => pub hclkdiv: ReadWrite<u32, HCLKDIV::Register>),
        /// APB clock divider
        (0x04 => pub pclkdiv: ReadWrite<u32, PCLKDIV::Register>),
        /// AHB peripheral clock enable, one bit per gate
        (0x08 => pub hclken: ReadWrite<u32>),
        /// APB peripheral clock enable, one bit per gate
        (0x0C => pub pclken: ReadWrite<u32>),
        /// Clock output control
        (0x10 => pub mcocr: ReadWrite<u32, MCOCR::Register>),
        (0x14 => _reserved0),
        /// Software reset control
        (0x18 => pub rstcr: ReadWrite<u32, RSTCR::Register>),
        /// Reset source flags
        (0x1C => pub rstsr: ReadWrite<u32, RSTSR::Register>),
        /// Oscillator enable
        (0x20 => pub sysclkcr: ReadWrite<u32, SYSCLKCR::Register>),
        /// System clock switch
        (0x24 => pub sysclksel: ReadWrite<u32, SYSCLKSEL::Register>),
        /// High speed internal oscillator control
        (0x28 => pub hirccr: ReadWrite<u32, HIRCCR::Register>),
        /// High speed crystal oscillator control
        (0x2C => pub hxtcr: ReadWrite<u32, HXTCR::Register>),
        /// Low speed internal oscillator control
        (0x30 => pub lirccr: ReadWrite<u32, LIRCCR::Register>),
        /// Low speed crystal oscillator control
        (0x34 => pub lxtcr: ReadWrite<u32, LXTCR::Register>),
        /// Interrupt latency
        (0x38 => pub irqlatency: ReadWrite<u32>),
        /// SysTick calibration
        (0x3C => pub stickcr: ReadOnly<u32, STICKCR::Register>),
        (0x40 => _reserved1),
        /// APB peripheral reset, same bit layout as `PCLKEN`
        (0x44 => pub perirst: ReadWrite<u32>),
        /// RTC domain reset
        (0x48 => pub rtcrst: ReadWrite<u32, RTCRST::Register>),
        /// AHB peripheral reset, same bit layout as `HCLKEN`
        (0x4C => pub hperirst: ReadWrite<u32>),
        (0x50 => _reserved2),
        /// Register write protection
        (0x60 => pub unlock: ReadWrite<u32, UNLOCK::Register>),
        (0x64 => @END),
    }
}

register_bitfields![u32,
    pub HCLKDIV [
        /// HCLK = SYSCLK / (2 * AHBCKDIV), 0 means undivided
        AHBCKDIV OFFSET(0) NUMBITS(8) []
    ],
    pub PCLKDIV [
        /// PCLK = HCLK / (2 * APBCKDIV), 0 means undivided
        APBCKDIV OFFSET(0) NUMBITS(8) []
    ],
    pub MCOCR [
        MCOSEL OFFSET(0) NUMBITS(3) [
            Hirc = 0,
            Hxt = 1,
            Lirc = 2,
            Lxt = 3,
            Sysclk = 4,
            Hclk = 5
        ],
        MCOEN OFFSET(4) NUMBITS(1) [],
        /// Output divided by 2 * MCODIV, 0 means undivided
        MCODIV OFFSET(8) NUMBITS(8) []
    ],
    pub RSTCR [
        MCURST OFFSET(0) NUMBITS(1) [],
        CPURST OFFSET(1) NUMBITS(1) [],
        LOCKUPRSTEN OFFSET(2) NUMBITS(1) [],
        KEY OFFSET(16) NUMBITS(16) []
    ],
    pub RSTSR [
        MCURST OFFSET(0) NUMBITS(1) [],
        CPURST OFFSET(1) NUMBITS(1) [],
        WWDGRST OFFSET(2) NUMBITS(1) [],
        IWDGRST OFFSET(3) NUMBITS(1) [],
        LVDRST OFFSET(4) NUMBITS(1) [],
        PORRST OFFSET(5) NUMBITS(1) [],
        LOCKUPRST OFFSET(6) NUMBITS(1) [],
        PADRST OFFSET(7) NUMBITS(1) []
    ],
    pub SYSCLKCR [
        HIRCEN OFFSET(0) NUMBITS(1) [],
        HXTEN OFFSET(1) NUMBITS(1) [],
        LIRCEN OFFSET(2) NUMBITS(1) [],
        LXTEN OFFSET(3) NUMBITS(1) [],
        KEY OFFSET(16) NUMBITS(16) []
    ],
    pub SYSCLKSEL [
        CLKSW OFFSET(0) NUMBITS(3) [
            Hirc = 1,
            Hxt = 2,
            Lirc = 3,
            Lxt = 4
        ],
        KEY OFFSET(16) NUMBITS(16) []
    ],
    pub HIRCCR [
        HIRCTRIM OFFSET(0) NUMBITS(12) [],
        HIRCRDY OFFSET(12) NUMBITS(1) [],
        KEY OFFSET(16) NUMBITS(16) []
    ],
    pub HXTCR [
        HXTDRIVER OFFSET(0) NUMBITS(4) [],
        HXTSTARTUP OFFSET(4) NUMBITS(2) [
            Cycles256 = 0,
            Cycles1024 = 1,
            Cycles4096 = 2,
            Cycles16384 = 3
        ],
        HXTRDY OFFSET(6) NUMBITS(1) [],
        HXTBYP OFFSET(7) NUMBITS(1) [],
        KEY OFFSET(16) NUMBITS(16) []
    ],
    pub LIRCCR [
        LIRCTRIM OFFSET(0) NUMBITS(9) [],
        LIRCSTARTUP OFFSET(10) NUMBITS(2) [
            Cycles4 = 0,
            Cycles16 = 1,
            Cycles64 = 2,
            Cycles256 = 3
        ],
        LIRCRDY OFFSET(12) NUMBITS(1) [],
        KEY OFFSET(16) NUMBITS(16) []
    ],
    pub LXTCR [
        LXTDRIVER OFFSET(0) NUMBITS(4) [],
        LXTSTARTUP OFFSET(4) NUMBITS(2) [
            Cycles1024 = 0,
            Cycles2048 = 1,
            Cycles4096 = 2,
            Cycles16384 = 3
        ],
        LXTRDY OFFSET(6) NUMBITS(1) [],
        LXTBYP OFFSET(7) NUMBITS(1) [],
        KEY OFFSET(16) NUMBITS(16) []
    ],
    pub STICKCR [
        STCALIB OFFSET(0) NUMBITS(24) [],
        SKEW OFFSET(24) NUMBITS(1) [],
        NOREF OFFSET(25) NUMBITS(1) []
    ],
    pub RTCRST [
        RTCRST OFFSET(0) NUMBITS(1) []
    ],
    pub UNLOCK [
        UNLOCK OFFSET(0) NUMBITS(1) [],
        KEY OFFSET(1) NUMBITS(31) []
    ]
];
