//! System clock bootstrap
//!
//! Keeps track of the core clock frequency (`SystemCoreClock`) and derives it from the RCC
//! registers. After reset the core runs from HIRC with the 24 MHz factory trim loaded.

use core::sync::atomic::{AtomicU32, Ordering};

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac::info::{HircTrims, LircTrims};
use crate::pac::rcc::{self, HCLKDIV, HIRCCR, LIRCCR, PCLKDIV, REGWRITE_KEY, SYSCLKCR, SYSCLKSEL};
use crate::rcc::{unlocked, HircFreq, LircFreq, SysclkSource};

/// Nominal HIRC frequency used when the trim register matches no factory value
pub const HIRC_VALUE: u32 = 24_000_000;
/// External high speed crystal frequency
pub const HXT_VALUE: u32 = 24_000_000;
/// Nominal LIRC frequency used when the trim register matches no factory value
pub const LIRC_VALUE: u32 = 38_400;
/// External low speed crystal frequency
pub const LXT_VALUE: u32 = 32_768;

static SYSTEM_CORE_CLOCK: AtomicU32 = AtomicU32::new(HIRC_VALUE);

/// Current core (HCLK) frequency in Hz
pub fn system_core_clock() -> u32 {
    SYSTEM_CORE_CLOCK.load(Ordering::Relaxed)
}

pub(crate) fn set_system_core_clock(hz: u32) {
    SYSTEM_CORE_CLOCK.store(hz, Ordering::Relaxed);
}

/// Brings the clock tree to its documented reset state: HIRC at 24 MHz, HCLK and PCLK undivided.
pub fn system_init(rcc: &rcc::RegisterBlock, hirc: &HircTrims) {
    unlocked(rcc, |rcc| {
        rcc.hirccr.modify(
            HIRCCR::KEY.val(REGWRITE_KEY) + HIRCCR::HIRCTRIM.val(u32::from(hirc.mhz24)),
        );
        rcc.sysclkcr
            .modify(SYSCLKCR::KEY.val(REGWRITE_KEY) + SYSCLKCR::HIRCEN::SET);
        rcc.sysclksel
            .modify(SYSCLKSEL::KEY.val(REGWRITE_KEY) + SYSCLKSEL::CLKSW::Hirc);
    });
    rcc.hclkdiv.write(HCLKDIV::AHBCKDIV.val(0));
    rcc.pclkdiv.write(PCLKDIV::APBCKDIV.val(0));
    set_system_core_clock(HIRC_VALUE);
}

/// HIRC frequency selected by a trim value, falling back to [`HIRC_VALUE`]
pub fn hirc_frequency(trim: u16, trims: &HircTrims) -> u32 {
    [
        HircFreq::Mhz24,
        HircFreq::Mhz22_12,
        HircFreq::Mhz16,
        HircFreq::Mhz8,
        HircFreq::Mhz4,
    ]
    .iter()
    .find(|f| f.trim(trims) == trim)
    .map(|f| f.hz())
    .unwrap_or(HIRC_VALUE)
}

/// LIRC frequency selected by a trim value, falling back to [`LIRC_VALUE`]
pub fn lirc_frequency(trim: u16, trims: &LircTrims) -> u32 {
    [LircFreq::Khz32_768, LircFreq::Khz38_4]
        .iter()
        .find(|f| f.trim(trims) == trim)
        .map(|f| f.hz())
        .unwrap_or(LIRC_VALUE)
}

/// Applies an `AHBCKDIV`/`APBCKDIV` style divider: 0 is undivided, otherwise divide by twice the
/// field value.
pub const fn divide(freq: u32, field: u32) -> u32 {
    if field == 0 {
        freq
    } else {
        freq / (2 * field)
    }
}

/// SYSCLK frequency selected by the clock switch
pub fn sysclk_from_registers(
    rcc: &rcc::RegisterBlock,
    hirc: &HircTrims,
    lirc: &LircTrims,
) -> u32 {
    match SysclkSource::from_register(rcc) {
        SysclkSource::Hirc => hirc_frequency(rcc.hirccr.read(HIRCCR::HIRCTRIM) as u16, hirc),
        SysclkSource::Hxt => HXT_VALUE,
        SysclkSource::Lirc => lirc_frequency(rcc.lirccr.read(LIRCCR::LIRCTRIM) as u16, lirc),
        SysclkSource::Lxt => LXT_VALUE,
    }
}

/// Recomputes `SystemCoreClock` from the RCC registers and returns it
pub fn system_core_clock_update(
    rcc: &rcc::RegisterBlock,
    hirc: &HircTrims,
    lirc: &LircTrims,
) -> u32 {
    let sysclk = sysclk_from_registers(rcc, hirc, lirc);
    let hclk = divide(sysclk, rcc.hclkdiv.read(HCLKDIV::AHBCKDIV));
    set_system_core_clock(hclk);
    debug!("SystemCoreClock = {} Hz", hclk);
    hclk
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIRC: HircTrims = HircTrims {
        mhz24: 0x2C0,
        mhz22_12: 0x2A1,
        mhz16: 0x1E4,
        mhz8: 0x0F2,
        mhz4: 0x079,
    };

    const LIRC: LircTrims = LircTrims {
        khz32_768: 0x0D4,
        khz38_4: 0x0F8,
    };

    #[test]
    fn hirc_trims_select_documented_frequencies() {
        assert_eq!(hirc_frequency(0x2C0, &HIRC), 24_000_000);
        assert_eq!(hirc_frequency(0x2A1, &HIRC), 22_120_000);
        assert_eq!(hirc_frequency(0x1E4, &HIRC), 16_000_000);
        assert_eq!(hirc_frequency(0x0F2, &HIRC), 8_000_000);
        assert_eq!(hirc_frequency(0x079, &HIRC), 4_000_000);
    }

    #[test]
    fn unknown_trim_falls_back_to_nominal() {
        assert_eq!(hirc_frequency(0x123, &HIRC), HIRC_VALUE);
        assert_eq!(lirc_frequency(0x001, &LIRC), LIRC_VALUE);
        assert_eq!(lirc_frequency(0x0D4, &LIRC), 32_768);
    }

    #[test]
    fn divider_field_halves_per_step() {
        assert_eq!(divide(24_000_000, 0), 24_000_000);
        assert_eq!(divide(24_000_000, 1), 12_000_000);
        assert_eq!(divide(24_000_000, 3), 4_000_000);
    }
}
