//! # HAL for the CX32L003 microcontroller
//!
//! This crate carries the register layer of the CX32L003 (a Cortex-M0+ part with two NVIC priority
//! bits) in [`pac`] and implements the [`embedded-hal`] traits on top of it.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//!
//! # Usage
//!
//! ## Commonly used setup
//!
//! ```no_run
//! use cx32l003_hal::pac;
//! use cx32l003_hal::prelude::*;
//! use cx32l003_hal::rcc::{ClockConfig, HircFreq, SysclkSource};
//!
//! // Get access to the device specific peripherals
//! let dp = pac::Peripherals::take().unwrap();
//!
//! // Load the factory trims and run the core from HIRC at 24 MHz
//! let mut rcc = dp.RCC.constrain();
//! rcc.enable_hirc(HircFreq::Mhz24).unwrap();
//! let clocks = rcc
//!     .clock_config(ClockConfig::new(SysclkSource::Hirc).pclk_div(2))
//!     .unwrap();
//!
//! let gpiod = dp.GPIOD.split();
//! let mut led = gpiod.pd4.into_push_pull_output();
//! led.set_high();
//! ```
//!
//! Every driver is generic over `R: Deref<Target = RegisterBlock>`; the zero sized tokens in
//! [`pac::Peripherals`] are the usual arguments.
//!
//! With the `rt` feature the crate provides the interrupt vector table and a `device.x` linker
//! script for `cortex-m-rt`. The `defmt` feature turns on driver logging.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod beep;
pub mod crc;
pub mod delay;
pub mod gpio;
pub mod i2c;
pub mod interrupts;
pub mod iwdg;
pub mod lptim;
pub mod lpuart;
pub mod owire;
pub mod pac;
pub mod pca;
pub mod rcc;
pub mod rtc;
pub mod serial;
pub mod spi;
pub mod status;
pub mod syscon;
pub mod system;
pub mod timer;
pub mod wwdg;

pub use crate::status::{Error, State};

/// HAL crate prelude
pub mod prelude {
    pub use crate::gpio::GpioExt as _cx32l003_hal_gpio_GpioExt;
    pub use crate::rcc::RccExt as _cx32l003_hal_rcc_RccExt;
    pub use crate::syscon::SysconExt as _cx32l003_hal_syscon_SysconExt;
    pub use embedded_hal::digital::{InputPin as _, OutputPin as _, StatefulOutputPin as _};
    pub use embedded_time::duration::Extensions as _embedded_time_duration_Extensions;
    pub use embedded_time::rate::Extensions;
}
