//! General Purpose Input/Output (GPIO)
//!
//! Pins are typestates: `Pin<'A', 1, Input<Floating>>` is PA1 configured as a floating input.
//! Mode changes consume the pin and return it in its new type.
//!
//! ```no_run
//! use cx32l003_hal::{gpio::{Edge, ExtiPin, GpioExt}, pac};
//!
//! let dp = pac::Peripherals::take().unwrap();
//! let gpiod = dp.GPIOD.split();
//! let mut led = gpiod.pd4.into_push_pull_output();
//! led.set_high();
//!
//! let mut button = gpiod.pd2.into_pull_up_input();
//! button.trigger_on(Edge::Falling);
//! button.enable_interrupt();
//! ```

use core::convert::Infallible;
use core::marker::PhantomData;
use core::ops::Deref;

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;

use crate::pac::gpio::{pupd, RegisterBlock, DBCLKCR};

/// Extension trait to split a GPIO peripheral into independent pins
pub trait GpioExt {
    /// The parts to split the GPIO into
    type Parts;

    /// Splits the GPIO block into independent pins
    fn split(self) -> Self::Parts;
}

/// Input mode (type state)
#[derive(Default)]
pub struct Input<MODE = Floating> {
    _mode: PhantomData<MODE>,
}

/// Floating input (type state)
#[derive(Default)]
pub struct Floating;
/// Pulled down input (type state)
#[derive(Default)]
pub struct PullDown;
/// Pulled up input (type state)
#[derive(Default)]
pub struct PullUp;

/// Output mode (type state)
#[derive(Default)]
pub struct Output<MODE = PushPull> {
    _mode: PhantomData<MODE>,
}

/// Push pull output (type state)
#[derive(Default)]
pub struct PushPull;
/// Open drain output (type state)
#[derive(Default)]
pub struct OpenDrain;

/// Alternate function (type state)
#[derive(Default)]
pub struct Alternate<AF> {
    _af: PhantomData<AF>,
}

mod sealed {
    pub trait AltFn: Default {
        const NUM: u32;
    }

    pub trait PinMode: Default {
        fn configure(regs: &crate::pac::gpio::RegisterBlock, n: u8);
    }
}

use sealed::{AltFn, PinMode};

macro_rules! alt_fns {
    ($($AF:ident: $num:literal,)+) => {
        $(
            #[doc = concat!("Alternate function ", stringify!($num), " (type state)")]
            #[derive(Default)]
            pub struct $AF;

            impl AltFn for $AF {
                const NUM: u32 = $num;
            }
        )+
    };
}

alt_fns! {
    AF1: 1,
    AF2: 2,
    AF3: 3,
    AF4: 4,
    AF5: 5,
    AF6: 6,
    AF7: 7,
}

/// Output driver strength
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    Low,
    High,
}

/// Output edge rate
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slew {
    Fast,
    Slow,
}

/// Interrupt trigger
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    RisingFalling,
    HighLevel,
    LowLevel,
}

/// Digital output pin state
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    High,
    Low,
}

/// Interrupt control of a pin
pub trait ExtiPin {
    /// Selects the condition that raises the interrupt
    fn trigger_on(&mut self, edge: Edge);
    fn enable_interrupt(&mut self);
    fn disable_interrupt(&mut self);
    /// Whether the pin has a pending, unmasked interrupt
    fn check_interrupt(&self) -> bool;
    fn clear_interrupt_pending_bit(&mut self);
}

/// Read-modify-write of a per-pin field, done with interrupts masked since every pin of a port
/// shares the register.
fn modify_field(reg: &ReadWrite<u32>, n: u8, width: u8, value: u32) {
    let shift = u32::from(n) * u32::from(width);
    let mask = ((1u32 << width) - 1) << shift;
    critical_section::with(|_| {
        reg.set((reg.get() & !mask) | ((value << shift) & mask));
    });
}

fn modify_bit(reg: &ReadWrite<u32>, n: u8, set: bool) {
    modify_field(reg, n, 1, set as u32);
}

fn configure_input(regs: &RegisterBlock, n: u8, pull: u32) {
    modify_field(&regs.afr, n, 4, 0);
    modify_field(&regs.pupdr, n, 2, pull);
    modify_bit(&regs.dircr, n, false);
}

fn configure_output(regs: &RegisterBlock, n: u8, open_drain: bool) {
    modify_field(&regs.afr, n, 4, 0);
    modify_field(&regs.pupdr, n, 2, pupd::NONE);
    modify_bit(&regs.otyper, n, open_drain);
    modify_bit(&regs.dircr, n, true);
}

impl PinMode for Input<Floating> {
    fn configure(regs: &RegisterBlock, n: u8) {
        configure_input(regs, n, pupd::NONE);
    }
}

impl PinMode for Input<PullUp> {
    fn configure(regs: &RegisterBlock, n: u8) {
        configure_input(regs, n, pupd::PULL_UP);
    }
}

impl PinMode for Input<PullDown> {
    fn configure(regs: &RegisterBlock, n: u8) {
        configure_input(regs, n, pupd::PULL_DOWN);
    }
}

impl PinMode for Output<PushPull> {
    fn configure(regs: &RegisterBlock, n: u8) {
        configure_output(regs, n, false);
    }
}

impl PinMode for Output<OpenDrain> {
    fn configure(regs: &RegisterBlock, n: u8) {
        configure_output(regs, n, true);
    }
}

impl<AF: AltFn> PinMode for Alternate<AF> {
    fn configure(regs: &RegisterBlock, n: u8) {
        modify_field(&regs.afr, n, 4, AF::NUM);
    }
}

fn set_trigger(regs: &RegisterBlock, n: u8, edge: Edge) {
    let (level, high, any) = match edge {
        Edge::Rising => (false, true, false),
        Edge::Falling => (false, false, false),
        Edge::RisingFalling => (false, false, true),
        Edge::HighLevel => (true, true, false),
        Edge::LowLevel => (true, false, false),
    };
    modify_bit(&regs.inttypcr, n, level);
    modify_bit(&regs.intpolcr, n, high);
    modify_bit(&regs.intany, n, any);
}

/// Services a port interrupt: calls `callback` with the number of every pin whose masked
/// interrupt status is set. All of them are cleared by a single `ICLR` write first.
pub fn port_irq_handler<R>(port: &R, mut callback: impl FnMut(u8))
where
    R: Deref<Target = RegisterBlock>,
{
    let pending = port.mis.get() & 0xFF;
    if pending == 0 {
        return;
    }
    port.iclr.set(pending);
    for n in 0..8u8 {
        if pending & (1 << n) != 0 {
            callback(n);
        }
    }
}

/// Debounce clock, HCLK / 2^(`div` + 1); `None` stops it
pub fn set_debounce_clock<R>(port: &R, div: Option<u8>)
where
    R: Deref<Target = RegisterBlock>,
{
    match div {
        Some(div) => port
            .dbclkcr
            .write(DBCLKCR::DBCLKCNT.val(u32::from(div & 0xF)) + DBCLKCR::DBCLKEN::SET),
        None => port.dbclkcr.modify(DBCLKCR::DBCLKEN::CLEAR),
    }
}

/// Port level control, handed out with the pins by `split`
pub struct Port<const P: char> {
    _private: (),
}

impl<const P: char> Port<P> {
    /// Sets the debounce clock of the port, see [`set_debounce_clock`]
    pub fn set_debounce_clock(&mut self, div: Option<u8>) {
        set_debounce_clock(&Gpio::<P>::block(), div);
    }

    /// Interrupt service for the port, see [`port_irq_handler`]
    pub fn irq_handler(&mut self, callback: impl FnMut(u8)) {
        port_irq_handler(&Gpio::<P>::block(), callback);
    }
}

/// Generic pin type
///
/// - `P` is the port name: `A` for GPIOA, `B` for GPIOB, etc.
/// - `N` is the pin number, 0 to 7.
/// - `MODE` is one of the type states above.
pub struct Pin<const P: char, const N: u8, MODE = Input<Floating>> {
    _mode: PhantomData<MODE>,
}

impl<const P: char, const N: u8, MODE> Pin<P, N, MODE> {
    fn new() -> Self {
        Pin { _mode: PhantomData }
    }

    #[inline(always)]
    fn regs(&self) -> Gpio<P> {
        Gpio::<P>::block()
    }

    fn into_mode<M: PinMode>(self) -> Pin<P, N, M> {
        M::configure(&self.regs(), N);
        Pin::new()
    }

    /// Port letter
    pub fn port_id(&self) -> char {
        P
    }

    /// Pin number within the port
    pub fn pin_id(&self) -> u8 {
        N
    }

    /// Configures the pin to operate as a floating input pin
    pub fn into_floating_input(self) -> Pin<P, N, Input<Floating>> {
        self.into_mode()
    }

    /// Configures the pin to operate as a pulled up input pin
    pub fn into_pull_up_input(self) -> Pin<P, N, Input<PullUp>> {
        self.into_mode()
    }

    /// Configures the pin to operate as a pulled down input pin
    pub fn into_pull_down_input(self) -> Pin<P, N, Input<PullDown>> {
        self.into_mode()
    }

    /// Configures the pin to operate as a push-pull output pin, initially low
    pub fn into_push_pull_output(self) -> Pin<P, N, Output<PushPull>> {
        self.into_push_pull_output_with_state(PinState::Low)
    }

    /// Configures the pin to operate as a push-pull output pin
    pub fn into_push_pull_output_with_state(
        mut self,
        initial_state: PinState,
    ) -> Pin<P, N, Output<PushPull>> {
        self._set_state(initial_state);
        self.into_mode()
    }

    /// Configures the pin to operate as an open-drain output pin, initially low
    pub fn into_open_drain_output(self) -> Pin<P, N, Output<OpenDrain>> {
        self.into_open_drain_output_with_state(PinState::Low)
    }

    /// Configures the pin to operate as an open-drain output pin
    pub fn into_open_drain_output_with_state(
        mut self,
        initial_state: PinState,
    ) -> Pin<P, N, Output<OpenDrain>> {
        self._set_state(initial_state);
        self.into_mode()
    }

    /// Hands the pin to a peripheral through alternate function `AF`
    pub fn into_alternate<AF: AltFn>(self) -> Pin<P, N, Alternate<AF>> {
        self.into_mode()
    }

    pub fn set_drive(&mut self, drive: Drive) {
        modify_bit(&self.regs().drvcr, N, drive == Drive::High);
    }

    pub fn set_slew(&mut self, slew: Slew) {
        modify_bit(&self.regs().slewcr, N, slew == Slew::Slow);
    }

    /// Filters the input through the port debounce clock
    pub fn set_debounce(&mut self, enable: bool) {
        modify_bit(&self.regs().indben, N, enable);
    }

    #[inline(always)]
    fn _set_state(&mut self, state: PinState) {
        match state {
            PinState::High => self._set_high(),
            PinState::Low => self._set_low(),
        }
    }

    #[inline(always)]
    fn _set_high(&mut self) {
        self.regs().odset.set(1 << N);
    }

    #[inline(always)]
    fn _set_low(&mut self) {
        self.regs().odclr.set(1 << N);
    }

    #[inline(always)]
    fn _is_set_low(&self) -> bool {
        self.regs().odr.get() & (1 << N) == 0
    }

    #[inline(always)]
    fn _is_low(&self) -> bool {
        self.regs().idr.get() & (1 << N) == 0
    }
}

impl<const P: char, const N: u8, AF> Pin<P, N, Alternate<AF>> {
    /// Enables the internal pull-up while the pin is in use by a peripheral
    pub fn set_pull_up(&mut self) {
        modify_field(&self.regs().pupdr, N, 2, pupd::PULL_UP);
    }

    pub fn set_pull_down(&mut self) {
        modify_field(&self.regs().pupdr, N, 2, pupd::PULL_DOWN);
    }

    pub fn set_floating(&mut self) {
        modify_field(&self.regs().pupdr, N, 2, pupd::NONE);
    }

    /// Open drain output stage, as needed for I2C and 1-Wire
    pub fn set_open_drain(&mut self, open_drain: bool) {
        modify_bit(&self.regs().otyper, N, open_drain);
    }
}

impl<const P: char, const N: u8, MODE> Pin<P, N, Output<MODE>> {
    #[inline]
    pub fn set_high(&mut self) {
        self._set_high()
    }

    #[inline]
    pub fn set_low(&mut self) {
        self._set_low()
    }

    #[inline]
    pub fn set_state(&mut self, state: PinState) {
        self._set_state(state)
    }

    #[inline]
    pub fn get_state(&self) -> PinState {
        if self._is_set_low() {
            PinState::Low
        } else {
            PinState::High
        }
    }

    #[inline]
    pub fn is_set_high(&self) -> bool {
        !self._is_set_low()
    }

    #[inline]
    pub fn is_set_low(&self) -> bool {
        self._is_set_low()
    }

    #[inline]
    pub fn toggle(&mut self) {
        if self._is_set_low() {
            self._set_high()
        } else {
            self._set_low()
        }
    }
}

impl<const P: char, const N: u8, MODE> Pin<P, N, Input<MODE>> {
    #[inline]
    pub fn is_high(&self) -> bool {
        !self._is_low()
    }

    #[inline]
    pub fn is_low(&self) -> bool {
        self._is_low()
    }
}

impl<const P: char, const N: u8> Pin<P, N, Output<OpenDrain>> {
    /// Level on the pad, which may be held low by another driver
    #[inline]
    pub fn is_high(&self) -> bool {
        !self._is_low()
    }

    #[inline]
    pub fn is_low(&self) -> bool {
        self._is_low()
    }
}

impl<const P: char, const N: u8, MODE> ExtiPin for Pin<P, N, Input<MODE>> {
    fn trigger_on(&mut self, edge: Edge) {
        set_trigger(&self.regs(), N, edge);
    }

    fn enable_interrupt(&mut self) {
        modify_bit(&self.regs().inten, N, true);
    }

    fn disable_interrupt(&mut self) {
        modify_bit(&self.regs().inten, N, false);
    }

    fn check_interrupt(&self) -> bool {
        self.regs().mis.get() & (1 << N) != 0
    }

    fn clear_interrupt_pending_bit(&mut self) {
        self.regs().iclr.set(1 << N);
    }
}

impl<const P: char, const N: u8, MODE> embedded_hal::digital::ErrorType
    for Pin<P, N, Output<MODE>>
{
    type Error = Infallible;
}

impl<const P: char, const N: u8, MODE> embedded_hal::digital::OutputPin
    for Pin<P, N, Output<MODE>>
{
    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self._set_high();
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self._set_low();
        Ok(())
    }
}

impl<const P: char, const N: u8, MODE> embedded_hal::digital::StatefulOutputPin
    for Pin<P, N, Output<MODE>>
{
    #[inline]
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self._is_set_low())
    }

    #[inline]
    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self._is_set_low())
    }
}

impl<const P: char, const N: u8> embedded_hal::digital::InputPin for Pin<P, N, Output<OpenDrain>> {
    #[inline]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self._is_low())
    }

    #[inline]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self._is_low())
    }
}

impl<const P: char, const N: u8, MODE> embedded_hal::digital::ErrorType
    for Pin<P, N, Input<MODE>>
{
    type Error = Infallible;
}

impl<const P: char, const N: u8, MODE> embedded_hal::digital::InputPin
    for Pin<P, N, Input<MODE>>
{
    #[inline]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self._is_low())
    }

    #[inline]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self._is_low())
    }
}

impl<const P: char, const N: u8, MODE> embedded_hal_zero::digital::v2::OutputPin
    for Pin<P, N, Output<MODE>>
{
    type Error = Infallible;

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self._set_high();
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self._set_low();
        Ok(())
    }
}

impl<const P: char, const N: u8, MODE> embedded_hal_zero::digital::v2::StatefulOutputPin
    for Pin<P, N, Output<MODE>>
{
    fn is_set_high(&self) -> Result<bool, Self::Error> {
        Ok(!self._is_set_low())
    }

    fn is_set_low(&self) -> Result<bool, Self::Error> {
        Ok(self._is_set_low())
    }
}

impl<const P: char, const N: u8, MODE> embedded_hal_zero::digital::v2::ToggleableOutputPin
    for Pin<P, N, Output<MODE>>
{
    type Error = Infallible;

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.toggle();
        Ok(())
    }
}

impl<const P: char, const N: u8, MODE> embedded_hal_zero::digital::v2::InputPin
    for Pin<P, N, Input<MODE>>
{
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(!self._is_low())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(self._is_low())
    }
}

macro_rules! gpio {
    ($GPIOX:ident, $gpiox:ident, $port_id:expr, [
        $($PXi:ident: ($pxi:ident, $pin_number:expr),)+
    ]) => {
        /// GPIO
        pub mod $gpiox {
            use crate::pac::$GPIOX;
            use super::{Floating, GpioExt, Input, Pin, Port};

            /// GPIO parts
            pub struct Parts {
                /// Port level control
                pub port: Port<$port_id>,
                $(
                    /// Pin
                    pub $pxi: $PXi,
                )+
            }

            $(
                pub type $PXi<MODE = Input<Floating>> = Pin<$port_id, $pin_number, MODE>;
            )+

            impl GpioExt for $GPIOX {
                type Parts = Parts;

                fn split(self) -> Parts {
                    Parts {
                        port: Port { _private: () },
                        $(
                            $pxi: $PXi::new(),
                        )+
                    }
                }
            }
        }

        pub use $gpiox::{ $($PXi,)+ };
    }
}

gpio!(GPIOA, gpioa, 'A', [
    PA1: (pa1, 1),
    PA2: (pa2, 2),
    PA3: (pa3, 3),
]);

gpio!(GPIOB, gpiob, 'B', [
    PB4: (pb4, 4),
    PB5: (pb5, 5),
]);

gpio!(GPIOC, gpioc, 'C', [
    PC3: (pc3, 3),
    PC4: (pc4, 4),
    PC5: (pc5, 5),
    PC6: (pc6, 6),
    PC7: (pc7, 7),
]);

gpio!(GPIOD, gpiod, 'D', [
    PD1: (pd1, 1),
    PD2: (pd2, 2),
    PD3: (pd3, 3),
    PD4: (pd4, 4),
    PD5: (pd5, 5),
    PD6: (pd6, 6),
]);

/// Register block of port `P`
struct Gpio<const P: char>;

impl<const P: char> Gpio<P> {
    const fn ptr() -> *const RegisterBlock {
        match P {
            'A' => crate::pac::GPIOA::ptr(),
            'B' => crate::pac::GPIOB::ptr(),
            'C' => crate::pac::GPIOC::ptr(),
            _ => crate::pac::GPIOD::ptr(),
        }
    }

    #[inline(always)]
    fn block() -> Self {
        Gpio
    }
}

impl<const P: char> Deref for Gpio<P> {
    type Target = RegisterBlock;

    #[inline(always)]
    fn deref(&self) -> &RegisterBlock {
        // Ports live at fixed addresses; pins only touch their own bits.
        unsafe { &*Self::ptr() }
    }
}
