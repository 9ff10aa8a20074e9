//! Interrupt numbers and vector table

/// Device interrupts, numbered as in the startup vector table
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum Interrupt {
    GPIOA = 0,
    GPIOB = 1,
    GPIOC = 2,
    GPIOD = 3,
    FLASH = 4,
    UART0 = 6,
    UART1 = 7,
    LPUART = 8,
    SPI = 10,
    I2C = 12,
    TIM10 = 14,
    TIM11 = 15,
    LPTIM = 16,
    TIM1 = 18,
    TIM2 = 19,
    PCA = 21,
    WWDG = 22,
    IWDG = 23,
    ADC = 24,
    LVD = 25,
    VC = 26,
    AWK = 28,
    OWIRE = 29,
    RTC = 30,
    CLKTRIM = 31,
}

unsafe impl cortex_m::interrupt::InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(self) -> u16 {
        self as u16
    }
}

impl Interrupt {
    /// Maps a vector number back to the interrupt, `None` for reserved slots
    pub fn try_from_number(n: u16) -> Option<Self> {
        use Interrupt::*;
        Some(match n {
            0 => GPIOA,
            1 => GPIOB,
            2 => GPIOC,
            3 => GPIOD,
            4 => FLASH,
            6 => UART0,
            7 => UART1,
            8 => LPUART,
            10 => SPI,
            12 => I2C,
            14 => TIM10,
            15 => TIM11,
            16 => LPTIM,
            18 => TIM1,
            19 => TIM2,
            21 => PCA,
            22 => WWDG,
            23 => IWDG,
            24 => ADC,
            25 => LVD,
            26 => VC,
            28 => AWK,
            29 => OWIRE,
            30 => RTC,
            31 => CLKTRIM,
            _ => return None,
        })
    }
}

#[cfg(feature = "rt")]
pub use self::vectors::__INTERRUPTS;

#[cfg(feature = "rt")]
mod vectors {
    extern "C" {
        fn GPIOA();
        fn GPIOB();
        fn GPIOC();
        fn GPIOD();
        fn FLASH();
        fn UART0();
        fn UART1();
        fn LPUART();
        fn SPI();
        fn I2C();
        fn TIM10();
        fn TIM11();
        fn LPTIM();
        fn TIM1();
        fn TIM2();
        fn PCA();
        fn WWDG();
        fn IWDG();
        fn ADC();
        fn LVD();
        fn VC();
        fn AWK();
        fn OWIRE();
        fn RTC();
        fn CLKTRIM();
    }

    #[doc(hidden)]
    pub union Vector {
        _handler: unsafe extern "C" fn(),
        _reserved: u32,
    }

    #[doc(hidden)]
    #[link_section = ".vector_table.interrupts"]
    #[no_mangle]
    pub static __INTERRUPTS: [Vector; 32] = [
        Vector { _handler: GPIOA },
        Vector { _handler: GPIOB },
        Vector { _handler: GPIOC },
        Vector { _handler: GPIOD },
        Vector { _handler: FLASH },
        Vector { _reserved: 0 },
        Vector { _handler: UART0 },
        Vector { _handler: UART1 },
        Vector { _handler: LPUART },
        Vector { _reserved: 0 },
        Vector { _handler: SPI },
        Vector { _reserved: 0 },
        Vector { _handler: I2C },
        Vector { _reserved: 0 },
        Vector { _handler: TIM10 },
        Vector { _handler: TIM11 },
        Vector { _handler: LPTIM },
        Vector { _reserved: 0 },
        Vector { _handler: TIM1 },
        Vector { _handler: TIM2 },
        Vector { _reserved: 0 },
        Vector { _handler: PCA },
        Vector { _handler: WWDG },
        Vector { _handler: IWDG },
        Vector { _handler: ADC },
        Vector { _handler: LVD },
        Vector { _handler: VC },
        Vector { _reserved: 0 },
        Vector { _handler: AWK },
        Vector { _handler: OWIRE },
        Vector { _handler: RTC },
        Vector { _handler: CLKTRIM },
    ];
}
