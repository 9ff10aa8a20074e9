//! Peripheral access layer for the CX32L003
//!
//! Every peripheral is described by a `RegisterBlock` built with `tock-registers`, so field offsets
//! and widths are checked at compile time. Peripherals are handed out as zero-sized tokens that
//! dereference to their register block at the fixed silicon address, the way an svd2rust PAC does.
//!
//! ```no_run
//! use cx32l003_hal::pac;
//!
//! let dp = pac::Peripherals::take().unwrap();
//! let rcc = dp.RCC;
//! ```

use core::marker::PhantomData;
use core::ops::Deref;
use core::sync::atomic::{AtomicBool, Ordering};

pub mod beep;
pub mod crc;
pub mod gpio;
pub mod i2c;
pub mod info;
mod irqn;
pub mod iwdg;
pub mod lptim;
pub mod lpuart;
pub mod owire;
pub mod pca;
pub mod rcc;
pub mod rtc;
pub mod spi;
pub mod syscon;
pub mod tim;
pub mod uart;
pub mod wwdg;

pub use self::irqn::Interrupt;
#[cfg(feature = "rt")]
pub use self::irqn::Interrupt as interrupt;
#[cfg(feature = "rt")]
pub use self::irqn::__INTERRUPTS;
#[cfg(feature = "rt")]
pub use cortex_m_rt::interrupt;

/// Number of priority bits implemented in the NVIC
pub const NVIC_PRIO_BITS: u8 = 2;

/// Base address of the APB peripherals
pub const APB_BASE: usize = 0x4000_0000;
/// Base address of the AHB peripherals
pub const AHB_BASE: usize = 0x4002_0000;

pub const UART0_BASE: usize = APB_BASE + 0x0000;
pub const UART1_BASE: usize = APB_BASE + 0x0400;
pub const LPUART_BASE: usize = APB_BASE + 0x0800;
pub const SPI_BASE: usize = APB_BASE + 0x0C00;
pub const I2C_BASE: usize = APB_BASE + 0x1000;
pub const TIM10_BASE: usize = APB_BASE + 0x1800;
pub const TIM11_BASE: usize = APB_BASE + 0x1820;
pub const LPTIM_BASE: usize = APB_BASE + 0x1840;
pub const PCA_BASE: usize = APB_BASE + 0x1C00;
pub const BEEP_BASE: usize = APB_BASE + 0x2000;
pub const IWDG_BASE: usize = APB_BASE + 0x2400;
pub const WWDG_BASE: usize = APB_BASE + 0x2800;
pub const RTC_BASE: usize = APB_BASE + 0x2C00;
pub const OWIRE_BASE: usize = APB_BASE + 0x3400;
pub const SYSCON_BASE: usize = APB_BASE + 0x3C00;

pub const RCC_BASE: usize = AHB_BASE + 0x0000;
pub const FLASH_BASE: usize = AHB_BASE + 0x0400;
pub const CRC_BASE: usize = AHB_BASE + 0x0800;
pub const GPIOA_BASE: usize = AHB_BASE + 0x1000;
pub const GPIOB_BASE: usize = AHB_BASE + 0x1400;
pub const GPIOC_BASE: usize = AHB_BASE + 0x1800;
pub const GPIOD_BASE: usize = AHB_BASE + 0x1C00;

static TAKEN: AtomicBool = AtomicBool::new(false);

macro_rules! peripherals {
    ($($(#[$attr:meta])* $name:ident: $module:ident @ $base:ident,)+) => {
        $(
            $(#[$attr])*
            pub struct $name {
                _marker: PhantomData<*const ()>,
            }

            unsafe impl Send for $name {}

            impl $name {
                /// Pointer to the register block
                pub const PTR: *const $module::RegisterBlock = $base as *const _;

                /// Return the pointer to the register block
                #[inline(always)]
                pub const fn ptr() -> *const $module::RegisterBlock {
                    Self::PTR
                }
            }

            impl Deref for $name {
                type Target = $module::RegisterBlock;

                #[inline(always)]
                fn deref(&self) -> &Self::Target {
                    // The block lives at a fixed address for the lifetime of the chip.
                    unsafe { &*Self::PTR }
                }
            }

            impl core::fmt::Debug for $name {
                fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                    f.debug_struct(stringify!($name)).finish()
                }
            }
        )+

        /// All the peripherals
        #[allow(non_snake_case)]
        pub struct Peripherals {
            $(pub $name: $name,)+
        }

        impl Peripherals {
            /// Returns all the peripherals *once*
            pub fn take() -> Option<Self> {
                critical_section::with(|_| {
                    if TAKEN.load(Ordering::Relaxed) {
                        None
                    } else {
                        Some(unsafe { Peripherals::steal() })
                    }
                })
            }

            /// Unchecked version of `Peripherals::take`
            ///
            /// # Safety
            ///
            /// Each of the returned peripherals must be used at most once.
            pub unsafe fn steal() -> Self {
                TAKEN.store(true, Ordering::Relaxed);
                Peripherals {
                    $($name: $name { _marker: PhantomData },)+
                }
            }
        }
    };
}

peripherals! {
    /// Reset and clock control
    RCC: rcc @ RCC_BASE,
    /// General purpose I/O port A
    GPIOA: gpio @ GPIOA_BASE,
    /// General purpose I/O port B
    GPIOB: gpio @ GPIOB_BASE,
    /// General purpose I/O port C
    GPIOC: gpio @ GPIOC_BASE,
    /// General purpose I/O port D
    GPIOD: gpio @ GPIOD_BASE,
    /// CRC16 calculation unit
    CRC: crc @ CRC_BASE,
    /// System configuration
    SYSCON: syscon @ SYSCON_BASE,
    /// Independent watchdog
    IWDG: iwdg @ IWDG_BASE,
    /// Window watchdog
    WWDG: wwdg @ WWDG_BASE,
    /// Real time clock
    RTC: rtc @ RTC_BASE,
    /// I2C bus controller
    I2C: i2c @ I2C_BASE,
    /// UART 0
    UART0: uart @ UART0_BASE,
    /// UART 1
    UART1: uart @ UART1_BASE,
    /// Low power UART
    LPUART: lpuart @ LPUART_BASE,
    /// SPI controller
    SPI: spi @ SPI_BASE,
    /// Base timer 10
    TIM10: tim @ TIM10_BASE,
    /// Base timer 11
    TIM11: tim @ TIM11_BASE,
    /// Low power timer
    LPTIM: lptim @ LPTIM_BASE,
    /// Programmable counter array
    PCA: pca @ PCA_BASE,
    /// 1-Wire controller
    OWIRE: owire @ OWIRE_BASE,
    /// Buzzer output
    BEEP: beep @ BEEP_BASE,
}
