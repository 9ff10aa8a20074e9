//! Reset and clock control
//!
//! The clock tree is small: one of four oscillators (HIRC, HXT, LIRC, LXT) drives SYSCLK, which
//! is divided into HCLK (core, AHB) and then PCLK (APB). All oscillator and clock switch registers
//! are write protected: every write needs `REGWRITE_KEY` in its upper half and has to happen
//! inside an `UNLOCK` window, which [`unlocked`] opens and closes around the write.
//!
//! ```no_run
//! use cx32l003_hal::{pac, prelude::*, rcc::{ClockConfig, HircFreq, SysclkSource}};
//!
//! let dp = pac::Peripherals::take().unwrap();
//! let mut rcc = dp.RCC.constrain();
//! rcc.enable_hirc(HircFreq::Mhz24).unwrap();
//! let clocks = rcc
//!     .clock_config(ClockConfig::new(SysclkSource::Hirc).pclk_div(2))
//!     .unwrap();
//! ```

use core::ops::Deref;

use embedded_time::rate::Hertz;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac;
use crate::pac::info::{HircTrims, LircTrims, TrimRegion};
use crate::pac::rcc::{
    RegisterBlock, HCLKDIV, HIRCCR, HXTCR, LIRCCR, LXTCR, MCOCR, PCLKDIV, REGWRITE_KEY, RSTCR,
    RSTSR, RTCRST, SYSCLKCR, SYSCLKSEL, UNLOCK, UNLOCK_KEY,
};
use crate::status::{self, poll};
use crate::system;

/// Poll budget for oscillator ready flags
pub const OSC_TIMEOUT: u32 = 0x0001_FFFF;

/// RCC errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Oscillator did not report ready in time
    Timeout,
    /// The requested SYSCLK source is not running
    NotReady,
    /// The oscillator drives SYSCLK and cannot be stopped
    InUse,
    /// A divider value the hardware cannot produce
    InvalidDivider,
}

impl From<Error> for status::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Timeout => status::Error::Timeout,
            Error::InUse => status::Error::Busy,
            Error::NotReady | Error::InvalidDivider => status::Error::Failed,
        }
    }
}

/// Runs `f` inside an RCC write window.
///
/// The window is opened by writing the unlock key with `UNLOCK` set and closed by writing it with
/// `UNLOCK` clear. Interrupts are masked in between so a handler can't close the window early.
pub(crate) fn unlocked<T>(rcc: &RegisterBlock, f: impl FnOnce(&RegisterBlock) -> T) -> T {
    critical_section::with(|_| {
        rcc.unlock
            .write(UNLOCK::KEY.val(UNLOCK_KEY) + UNLOCK::UNLOCK::SET);
        let r = f(rcc);
        rcc.unlock
            .write(UNLOCK::KEY.val(UNLOCK_KEY) + UNLOCK::UNLOCK::CLEAR);
        r
    })
}

/// SYSCLK source
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SysclkSource {
    Hirc,
    Hxt,
    Lirc,
    Lxt,
}

impl SysclkSource {
    /// Source selected by `SYSCLKSEL.CLKSW`; reserved encodings read as HIRC
    pub fn from_register(rcc: &RegisterBlock) -> Self {
        match rcc.sysclksel.read_as_enum(SYSCLKSEL::CLKSW) {
            Some(SYSCLKSEL::CLKSW::Value::Hxt) => SysclkSource::Hxt,
            Some(SYSCLKSEL::CLKSW::Value::Lirc) => SysclkSource::Lirc,
            Some(SYSCLKSEL::CLKSW::Value::Lxt) => SysclkSource::Lxt,
            _ => SysclkSource::Hirc,
        }
    }

    fn is_ready(self, rcc: &RegisterBlock) -> bool {
        match self {
            SysclkSource::Hirc => rcc.hirccr.is_set(HIRCCR::HIRCRDY),
            SysclkSource::Hxt => rcc.hxtcr.is_set(HXTCR::HXTRDY),
            SysclkSource::Lirc => rcc.lirccr.is_set(LIRCCR::LIRCRDY),
            SysclkSource::Lxt => rcc.lxtcr.is_set(LXTCR::LXTRDY),
        }
    }
}

/// HIRC output frequencies with a factory trim
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HircFreq {
    Mhz24,
    Mhz22_12,
    Mhz16,
    Mhz8,
    Mhz4,
}

impl HircFreq {
    pub const fn hz(self) -> u32 {
        match self {
            HircFreq::Mhz24 => 24_000_000,
            HircFreq::Mhz22_12 => 22_120_000,
            HircFreq::Mhz16 => 16_000_000,
            HircFreq::Mhz8 => 8_000_000,
            HircFreq::Mhz4 => 4_000_000,
        }
    }

    pub const fn trim(self, trims: &HircTrims) -> u16 {
        match self {
            HircFreq::Mhz24 => trims.mhz24,
            HircFreq::Mhz22_12 => trims.mhz22_12,
            HircFreq::Mhz16 => trims.mhz16,
            HircFreq::Mhz8 => trims.mhz8,
            HircFreq::Mhz4 => trims.mhz4,
        }
    }
}

/// LIRC output frequencies with a factory trim
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LircFreq {
    Khz32_768,
    Khz38_4,
}

impl LircFreq {
    pub const fn hz(self) -> u32 {
        match self {
            LircFreq::Khz32_768 => 32_768,
            LircFreq::Khz38_4 => 38_400,
        }
    }

    pub const fn trim(self, trims: &LircTrims) -> u16 {
        match self {
            LircFreq::Khz32_768 => trims.khz32_768,
            LircFreq::Khz38_4 => trims.khz38_4,
        }
    }
}

/// Crystal oscillator start-up settings
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CrystalConfig {
    /// Drive strength, 0 (weakest) to 15
    pub drive: u8,
    /// Start-up delay selection, 0 (shortest) to 3
    pub startup: u8,
    /// Accept an external clock on the input pin instead of a crystal
    pub bypass: bool,
}

impl Default for CrystalConfig {
    fn default() -> Self {
        CrystalConfig {
            drive: 0x8,
            startup: 3,
            bypass: false,
        }
    }
}

/// Oscillators to switch on or off in one call to [`Rcc::osc_config`]
///
/// `None` leaves an oscillator untouched. The `*_off` flags stop one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OscConfig {
    pub hirc: Option<HircFreq>,
    pub hxt: Option<CrystalConfig>,
    pub lirc: Option<LircFreq>,
    pub lxt: Option<CrystalConfig>,
    pub hirc_off: bool,
    pub hxt_off: bool,
    pub lirc_off: bool,
    pub lxt_off: bool,
}

/// SYSCLK source and bus dividers
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClockConfig {
    source: SysclkSource,
    hclk_div: u16,
    pclk_div: u16,
}

impl ClockConfig {
    /// SYSCLK from `source`, HCLK and PCLK undivided
    pub fn new(source: SysclkSource) -> Self {
        ClockConfig {
            source,
            hclk_div: 1,
            pclk_div: 1,
        }
    }

    /// HCLK = SYSCLK / `div`; `div` must be 1 or an even number up to 510
    pub fn hclk_div(mut self, div: u16) -> Self {
        self.hclk_div = div;
        self
    }

    /// PCLK = HCLK / `div`; `div` must be 1 or an even number up to 510
    pub fn pclk_div(mut self, div: u16) -> Self {
        self.pclk_div = div;
        self
    }
}

/// Encodes a divide-by value into an `AHBCKDIV`/`APBCKDIV` field
fn divider_field(div: u16) -> Result<u32, Error> {
    match div {
        1 => Ok(0),
        d if d >= 2 && d <= 510 && d % 2 == 0 => Ok(u32::from(d / 2)),
        _ => Err(Error::InvalidDivider),
    }
}

/// Frozen clock frequencies
///
/// Obtained from [`Rcc::clock_config`] or [`Rcc::freeze`]; drivers use it to derive baud rates and
/// prescalers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clocks {
    sysclk: u32,
    hclk: u32,
    pclk: u32,
}

impl Clocks {
    /// Clocks with explicit frequencies, for code that configured the tree by other means
    pub const fn from_frequencies(sysclk: u32, hclk: u32, pclk: u32) -> Self {
        Clocks { sysclk, hclk, pclk }
    }

    pub fn sysclk(&self) -> Hertz {
        Hertz(self.sysclk)
    }

    pub fn hclk(&self) -> Hertz {
        Hertz(self.hclk)
    }

    pub fn pclk(&self) -> Hertz {
        Hertz(self.pclk)
    }
}

impl Default for Clocks {
    /// Reset state: HIRC at 24 MHz, nothing divided
    fn default() -> Self {
        Clocks::from_frequencies(system::HIRC_VALUE, system::HIRC_VALUE, system::HIRC_VALUE)
    }
}

/// Peripheral clock gates
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gate {
    Flash,
    Crc,
    GpioA,
    GpioB,
    GpioC,
    GpioD,
    Uart0,
    Uart1,
    I2c,
    Lpuart,
    Spi,
    Lptim,
    BaseTim,
    Syscon,
    Pca,
    Owire,
    Tim1,
    Tim2,
    Wwdg,
    Adc,
    Awk,
    Rtc,
    ClkTrim,
    Iwdg,
    LvdVc,
    Beep,
    Dbg,
}

enum Bus {
    Ahb,
    Apb,
}

impl Gate {
    fn bus_bit(self) -> (Bus, u32) {
        use Gate::*;
        match self {
            Flash => (Bus::Ahb, 0),
            Crc => (Bus::Ahb, 1),
            GpioA => (Bus::Ahb, 4),
            GpioB => (Bus::Ahb, 5),
            GpioC => (Bus::Ahb, 6),
            GpioD => (Bus::Ahb, 7),
            Uart0 => (Bus::Apb, 0),
            Uart1 => (Bus::Apb, 1),
            I2c => (Bus::Apb, 2),
            Lpuart => (Bus::Apb, 3),
            Spi => (Bus::Apb, 4),
            Lptim => (Bus::Apb, 5),
            BaseTim => (Bus::Apb, 6),
            Syscon => (Bus::Apb, 7),
            Pca => (Bus::Apb, 8),
            Owire => (Bus::Apb, 9),
            Tim1 => (Bus::Apb, 10),
            Tim2 => (Bus::Apb, 11),
            Wwdg => (Bus::Apb, 12),
            Adc => (Bus::Apb, 13),
            Awk => (Bus::Apb, 14),
            Rtc => (Bus::Apb, 15),
            ClkTrim => (Bus::Apb, 16),
            Iwdg => (Bus::Apb, 17),
            LvdVc => (Bus::Apb, 18),
            Beep => (Bus::Apb, 19),
            Dbg => (Bus::Apb, 20),
        }
    }
}

/// Clock output sources
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McoSource {
    Hirc,
    Hxt,
    Lirc,
    Lxt,
    Sysclk,
    Hclk,
}

/// Cause of the last reset
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetFlags {
    pub mcu: bool,
    pub cpu: bool,
    pub wwdg: bool,
    pub iwdg: bool,
    pub lvd: bool,
    pub por: bool,
    pub lockup: bool,
    pub pad: bool,
}

/// Extension trait that constrains the `RCC` peripheral
pub trait RccExt {
    /// Takes the RCC, reading the factory trims from the default [`TrimRegion`]
    fn constrain(self) -> Rcc;

    /// Takes the RCC, reading the factory trims from `region`
    fn constrain_with(self, region: TrimRegion) -> Rcc;
}

impl RccExt for pac::RCC {
    fn constrain(self) -> Rcc {
        self.constrain_with(TrimRegion::default())
    }

    fn constrain_with(self, region: TrimRegion) -> Rcc {
        Rcc::new(self, HircTrims::read(region), LircTrims::read(region))
    }
}

/// Constrained RCC peripheral
pub struct Rcc<R = pac::RCC> {
    rcc: R,
    hirc_trims: HircTrims,
    lirc_trims: LircTrims,
}

impl<R> Rcc<R>
where
    R: Deref<Target = RegisterBlock>,
{
    /// Wraps the register block together with the factory trims to use
    pub fn new(rcc: R, hirc_trims: HircTrims, lirc_trims: LircTrims) -> Self {
        Rcc {
            rcc,
            hirc_trims,
            lirc_trims,
        }
    }

    /// Releases the register block
    pub fn free(self) -> R {
        self.rcc
    }

    /// Loads the factory trim for `freq`, starts HIRC and waits for it to settle
    pub fn enable_hirc(&mut self, freq: HircFreq) -> Result<(), Error> {
        let trim = u32::from(freq.trim(&self.hirc_trims));
        unlocked(&self.rcc, |rcc| {
            rcc.hirccr
                .modify(HIRCCR::KEY.val(REGWRITE_KEY) + HIRCCR::HIRCTRIM.val(trim));
            rcc.sysclkcr
                .modify(SYSCLKCR::KEY.val(REGWRITE_KEY) + SYSCLKCR::HIRCEN::SET);
        });
        self.wait_ready(SysclkSource::Hirc)?;
        if SysclkSource::from_register(&self.rcc) == SysclkSource::Hirc {
            self.update_core_clock();
        }
        debug!("HIRC on, trim {=u32:#x}", trim);
        Ok(())
    }

    /// Starts the external high speed crystal and waits for it to settle
    pub fn enable_hxt(&mut self, config: CrystalConfig) -> Result<(), Error> {
        unlocked(&self.rcc, |rcc| {
            rcc.hxtcr.modify(
                HXTCR::KEY.val(REGWRITE_KEY)
                    + HXTCR::HXTDRIVER.val(u32::from(config.drive & 0xF))
                    + HXTCR::HXTSTARTUP.val(u32::from(config.startup & 0x3))
                    + HXTCR::HXTBYP.val(config.bypass as u32),
            );
            rcc.sysclkcr
                .modify(SYSCLKCR::KEY.val(REGWRITE_KEY) + SYSCLKCR::HXTEN::SET);
        });
        self.wait_ready(SysclkSource::Hxt)
    }

    /// Loads the factory trim for `freq`, starts LIRC and waits for it to settle
    pub fn enable_lirc(&mut self, freq: LircFreq) -> Result<(), Error> {
        let trim = u32::from(freq.trim(&self.lirc_trims));
        unlocked(&self.rcc, |rcc| {
            rcc.lirccr
                .modify(LIRCCR::KEY.val(REGWRITE_KEY) + LIRCCR::LIRCTRIM.val(trim));
            rcc.sysclkcr
                .modify(SYSCLKCR::KEY.val(REGWRITE_KEY) + SYSCLKCR::LIRCEN::SET);
        });
        self.wait_ready(SysclkSource::Lirc)
    }

    /// Starts the external 32.768 kHz crystal and waits for it to settle
    pub fn enable_lxt(&mut self, config: CrystalConfig) -> Result<(), Error> {
        unlocked(&self.rcc, |rcc| {
            rcc.lxtcr.modify(
                LXTCR::KEY.val(REGWRITE_KEY)
                    + LXTCR::LXTDRIVER.val(u32::from(config.drive & 0xF))
                    + LXTCR::LXTSTARTUP.val(u32::from(config.startup & 0x3))
                    + LXTCR::LXTBYP.val(config.bypass as u32),
            );
            rcc.sysclkcr
                .modify(SYSCLKCR::KEY.val(REGWRITE_KEY) + SYSCLKCR::LXTEN::SET);
        });
        self.wait_ready(SysclkSource::Lxt)
    }

    /// Stops an oscillator. The one currently driving SYSCLK is refused.
    pub fn disable(&mut self, osc: SysclkSource) -> Result<(), Error> {
        if SysclkSource::from_register(&self.rcc) == osc {
            return Err(Error::InUse);
        }
        let field = match osc {
            SysclkSource::Hirc => SYSCLKCR::HIRCEN::CLEAR,
            SysclkSource::Hxt => SYSCLKCR::HXTEN::CLEAR,
            SysclkSource::Lirc => SYSCLKCR::LIRCEN::CLEAR,
            SysclkSource::Lxt => SYSCLKCR::LXTEN::CLEAR,
        };
        unlocked(&self.rcc, |rcc| {
            rcc.sysclkcr.modify(SYSCLKCR::KEY.val(REGWRITE_KEY) + field);
        });
        Ok(())
    }

    /// Applies every oscillator setting in `config`, enabling before disabling
    pub fn osc_config(&mut self, config: &OscConfig) -> Result<(), Error> {
        if let Some(freq) = config.hirc {
            self.enable_hirc(freq)?;
        }
        if let Some(hxt) = config.hxt {
            self.enable_hxt(hxt)?;
        }
        if let Some(freq) = config.lirc {
            self.enable_lirc(freq)?;
        }
        if let Some(lxt) = config.lxt {
            self.enable_lxt(lxt)?;
        }
        for (off, osc) in [
            (config.hirc_off, SysclkSource::Hirc),
            (config.hxt_off, SysclkSource::Hxt),
            (config.lirc_off, SysclkSource::Lirc),
            (config.lxt_off, SysclkSource::Lxt),
        ]
        .iter()
        {
            if *off {
                self.disable(*osc)?;
            }
        }
        Ok(())
    }

    /// Switches SYSCLK and programs the bus dividers
    ///
    /// The new source must already be running. `SystemCoreClock` is updated on success.
    pub fn clock_config(&mut self, config: ClockConfig) -> Result<Clocks, Error> {
        let hdiv = divider_field(config.hclk_div)?;
        let pdiv = divider_field(config.pclk_div)?;
        if !config.source.is_ready(&self.rcc) {
            warn!("SYSCLK switch refused, source not ready");
            return Err(Error::NotReady);
        }

        self.rcc.hclkdiv.write(HCLKDIV::AHBCKDIV.val(hdiv));
        self.rcc.pclkdiv.write(PCLKDIV::APBCKDIV.val(pdiv));

        let clksw = match config.source {
            SysclkSource::Hirc => SYSCLKSEL::CLKSW::Hirc,
            SysclkSource::Hxt => SYSCLKSEL::CLKSW::Hxt,
            SysclkSource::Lirc => SYSCLKSEL::CLKSW::Lirc,
            SysclkSource::Lxt => SYSCLKSEL::CLKSW::Lxt,
        };
        unlocked(&self.rcc, |rcc| {
            rcc.sysclksel.write(SYSCLKSEL::KEY.val(REGWRITE_KEY) + clksw);
        });

        let clocks = self.freeze();
        system::set_system_core_clock(clocks.hclk);
        debug!(
            "SYSCLK {} Hz, HCLK {} Hz, PCLK {} Hz",
            clocks.sysclk,
            clocks.hclk,
            clocks.pclk
        );
        Ok(clocks)
    }

    /// Reads back the frequencies the clock tree is currently producing
    pub fn freeze(&self) -> Clocks {
        let sysclk =
            system::sysclk_from_registers(&self.rcc, &self.hirc_trims, &self.lirc_trims);
        let hclk = system::divide(sysclk, self.rcc.hclkdiv.read(HCLKDIV::AHBCKDIV));
        let pclk = system::divide(hclk, self.rcc.pclkdiv.read(PCLKDIV::APBCKDIV));
        Clocks { sysclk, hclk, pclk }
    }

    /// Recomputes `SystemCoreClock` from the registers
    pub fn update_core_clock(&self) -> u32 {
        system::system_core_clock_update(&self.rcc, &self.hirc_trims, &self.lirc_trims)
    }

    /// Turns on the clock of a peripheral
    pub fn enable_clock(&mut self, gate: Gate) {
        let (bus, bit) = gate.bus_bit();
        let reg = match bus {
            Bus::Ahb => &self.rcc.hclken,
            Bus::Apb => &self.rcc.pclken,
        };
        reg.set(reg.get() | 1 << bit);
    }

    /// Turns off the clock of a peripheral
    pub fn disable_clock(&mut self, gate: Gate) {
        let (bus, bit) = gate.bus_bit();
        let reg = match bus {
            Bus::Ahb => &self.rcc.hclken,
            Bus::Apb => &self.rcc.pclken,
        };
        reg.set(reg.get() & !(1 << bit));
    }

    /// Whether the clock of a peripheral is on
    pub fn is_clock_enabled(&self, gate: Gate) -> bool {
        let (bus, bit) = gate.bus_bit();
        let reg = match bus {
            Bus::Ahb => &self.rcc.hclken,
            Bus::Apb => &self.rcc.pclken,
        };
        reg.get() & 1 << bit != 0
    }

    /// Pulses the reset line of a peripheral, returning its registers to their power-on values
    pub fn reset(&mut self, gate: Gate) {
        let (bus, bit) = gate.bus_bit();
        let reg = match bus {
            Bus::Ahb => &self.rcc.hperirst,
            Bus::Apb => &self.rcc.perirst,
        };
        reg.set(reg.get() | 1 << bit);
        reg.set(reg.get() & !(1 << bit));
    }

    /// Resets the RTC domain
    pub fn reset_rtc_domain(&mut self) {
        unlocked(&self.rcc, |rcc| {
            rcc.rtcrst.write(RTCRST::RTCRST::SET);
            rcc.rtcrst.write(RTCRST::RTCRST::CLEAR);
        });
    }

    /// Routes `source`, divided by `div` (1 or even up to 510), to the clock output pin
    pub fn mco_config(&mut self, source: McoSource, div: u16) -> Result<(), Error> {
        let div = divider_field(div)?;
        let sel = match source {
            McoSource::Hirc => MCOCR::MCOSEL::Hirc,
            McoSource::Hxt => MCOCR::MCOSEL::Hxt,
            McoSource::Lirc => MCOCR::MCOSEL::Lirc,
            McoSource::Lxt => MCOCR::MCOSEL::Lxt,
            McoSource::Sysclk => MCOCR::MCOSEL::Sysclk,
            McoSource::Hclk => MCOCR::MCOSEL::Hclk,
        };
        self.rcc
            .mcocr
            .write(sel + MCOCR::MCODIV.val(div) + MCOCR::MCOEN::SET);
        Ok(())
    }

    /// Stops the clock output
    pub fn mco_disable(&mut self) {
        self.rcc.mcocr.modify(MCOCR::MCOEN::CLEAR);
    }

    /// Makes a core lockup reset the chip
    pub fn lockup_reset(&mut self, enable: bool) {
        unlocked(&self.rcc, |rcc| {
            rcc.rstcr.modify(
                RSTCR::KEY.val(REGWRITE_KEY) + RSTCR::LOCKUPRSTEN.val(enable as u32),
            );
        });
    }

    /// Cause of the last reset
    pub fn reset_flags(&self) -> ResetFlags {
        let r = self.rcc.rstsr.extract();
        ResetFlags {
            mcu: r.is_set(RSTSR::MCURST),
            cpu: r.is_set(RSTSR::CPURST),
            wwdg: r.is_set(RSTSR::WWDGRST),
            iwdg: r.is_set(RSTSR::IWDGRST),
            lvd: r.is_set(RSTSR::LVDRST),
            por: r.is_set(RSTSR::PORRST),
            lockup: r.is_set(RSTSR::LOCKUPRST),
            pad: r.is_set(RSTSR::PADRST),
        }
    }

    /// Clears all reset cause flags
    pub fn clear_reset_flags(&mut self) {
        self.rcc.rstsr.set(0);
    }

    fn wait_ready(&self, osc: SysclkSource) -> Result<(), Error> {
        if poll(OSC_TIMEOUT, || osc.is_ready(&self.rcc)) {
            Ok(())
        } else {
            warn!("oscillator ready timeout");
            Err(Error::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divider_encoding() {
        assert_eq!(divider_field(1), Ok(0));
        assert_eq!(divider_field(2), Ok(1));
        assert_eq!(divider_field(510), Ok(255));
        assert_eq!(divider_field(0), Err(Error::InvalidDivider));
        assert_eq!(divider_field(3), Err(Error::InvalidDivider));
        assert_eq!(divider_field(512), Err(Error::InvalidDivider));
    }
}
