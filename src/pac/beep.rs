//! Buzzer registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// Buzzer output
    pub RegisterBlock {
        /// Control and status
        (0x00 => pub csr: ReadWrite<u32, CSR::Register>),
        (0x04 => @END),
    }
}

register_bitfields![u32,
    pub CSR [
        /// Base frequency = clock / (8 * (BEEPDIV + 1))
        BEEPDIV OFFSET(0) NUMBITS(12) [],
        /// Output = base frequency * 2^BEEPSEL / 4
        BEEPSEL OFFSET(16) NUMBITS(2) [],
        BEEPEN OFFSET(20) NUMBITS(1) [],
        BEEPCLKSEL OFFSET(22) NUMBITS(2) [
            Lirc = 0,
            Hxt = 1,
            Pclk = 2
        ]
    ]
];
