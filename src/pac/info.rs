//! Factory information block
//!
//! Calibration trims and the unique device ID are programmed into flash at fixed addresses. Two
//! layouts of the trim area exist; which one a part uses depends on its package, and nothing on
//! the chip reports it. [`TrimRegion`] therefore has to be chosen by the application, with the
//! `package-trim` feature flipping the default.

/// Base of the unique device ID
pub const UID_BASE: usize = 0x1800_00F0;
/// Length of the unique device ID in bytes
pub const UID_LEN: usize = 10;

/// HIRC trim for 24 MHz in the standard region
pub const HIRC24M_FLASHADDR: usize = 0x1800_00A0;
/// HIRC trim for 24 MHz in the package region
pub const PACKAGE_HIRC24M_FLASHADDR: usize = 0x1800_00C0;

/// Location of the factory oscillator trims
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrimRegion {
    /// Trims at `0x1800_00A0`
    Standard,
    /// Trims at `0x1800_00C0`
    Package,
}

impl Default for TrimRegion {
    fn default() -> Self {
        if cfg!(feature = "package-trim") {
            TrimRegion::Package
        } else {
            TrimRegion::Standard
        }
    }
}

impl TrimRegion {
    /// Address of the first (24 MHz) HIRC trim
    pub const fn hirc_base(self) -> usize {
        match self {
            TrimRegion::Standard => HIRC24M_FLASHADDR,
            TrimRegion::Package => PACKAGE_HIRC24M_FLASHADDR,
        }
    }

    /// Address of the first (32.768 kHz) LIRC trim; the LIRC trims follow the HIRC trims
    pub const fn lirc_base(self) -> usize {
        self.hirc_base() + 0x10
    }
}

/// Factory HIRC trims, one per selectable frequency
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HircTrims {
    pub mhz24: u16,
    pub mhz22_12: u16,
    pub mhz16: u16,
    pub mhz8: u16,
    pub mhz4: u16,
}

impl HircTrims {
    /// Reads the trims from the information block
    pub fn read(region: TrimRegion) -> Self {
        let base = region.hirc_base();
        // The information block is always mapped and readable.
        unsafe {
            HircTrims {
                mhz24: read_u16(base),
                mhz22_12: read_u16(base + 2),
                mhz16: read_u16(base + 4),
                mhz8: read_u16(base + 6),
                mhz4: read_u16(base + 8),
            }
        }
    }
}

/// Factory LIRC trims
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LircTrims {
    pub khz32_768: u16,
    pub khz38_4: u16,
}

impl LircTrims {
    /// Reads the trims from the information block
    pub fn read(region: TrimRegion) -> Self {
        let base = region.lirc_base();
        unsafe {
            LircTrims {
                khz32_768: read_u16(base),
                khz38_4: read_u16(base + 2),
            }
        }
    }
}

/// Unique device ID
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uid(pub [u8; UID_LEN]);

impl Uid {
    /// Reads the ID from the information block
    pub fn read() -> Self {
        let mut id = [0u8; UID_LEN];
        for (i, b) in id.iter_mut().enumerate() {
            *b = unsafe { core::ptr::read_volatile((UID_BASE + i) as *const u8) };
        }
        Uid(id)
    }
}

unsafe fn read_u16(addr: usize) -> u16 {
    core::ptr::read_volatile(addr as *const u16)
}
