//! Programmable counter array
//!
//! One 16-bit counter shared by five capture/compare modules. Each module can capture the counter
//! on an edge of its input, raise a match when the counter reaches its compare value (optionally
//! toggling its pin), or generate an 8-bit PWM from the low byte of the counter.
//!
//! # Example
//!
//! ```no_run
//! use cx32l003_hal::{pac, pca::{Channel, Config, Pca}};
//!
//! let dp = pac::Peripherals::take().unwrap();
//! let mut pca = Pca::new(dp.PCA, Config::default());
//! pca.pwm(Channel::C1, 64);
//! pca.start();
//! ```

use core::ops::Deref;

use paste::paste;
use tock_registers::fields::Field;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::LocalRegisterCopy;

use crate::pac;
use crate::pac::pca::{RegisterBlock, CCAP, CCAPM, CR, MOD};

/// Counter clock
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSelect {
    PclkDiv32,
    PclkDiv16,
    PclkDiv8,
    PclkDiv4,
    PclkDiv2,
    Tim10Overflow,
    Tim11Overflow,
    /// Rising edges on the ECI pin
    External,
}

/// PCA configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub clock: ClockSelect,
    /// Stop counting while the core sleeps
    pub stop_in_sleep: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clock: ClockSelect::PclkDiv32,
            stop_in_sleep: false,
        }
    }
}

/// Edge a channel captures on
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureEdge {
    Rising,
    Falling,
    Both,
}

/// What [`Pca::irq_handler`] observed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The counter wrapped
    Overflow,
    /// A capture or compare match on a channel
    Channel(Channel),
}

macro_rules! per_channel {
    ( $($channel:literal),* ) => { paste! {
        /// Capture/compare channel
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum Channel {
            $(
                [<C $channel>],
            )+
        }

        impl Channel {
            /// Every channel, in flag order
            pub const ALL: [Channel; pac::pca::CHANNELS] = [$(Channel::[<C $channel>],)+];

            /// Index into the `CCAPM`/`CCAP` arrays
            pub const fn index(self) -> usize {
                match self {$(
                    Channel::[<C $channel>] => $channel,
                )+}
            }

            /// Capture/compare flag in `CR` and `INTCLR`
            fn flag(self) -> Field<u32, CR::Register> {
                match self {$(
                    Channel::[<C $channel>] => CR::[<CCF $channel>],
                )+}
            }
        }
    }}
}

per_channel!(0, 1, 2, 3, 4);

/// Programmable counter array
pub struct Pca<R = pac::PCA> {
    regs: R,
}

impl<R> Pca<R>
where
    R: Deref<Target = RegisterBlock>,
{
    /// Configures the counter clock; the counter stays stopped
    pub fn new(regs: R, config: Config) -> Self {
        let cps = match config.clock {
            ClockSelect::PclkDiv32 => MOD::CPS::PclkDiv32,
            ClockSelect::PclkDiv16 => MOD::CPS::PclkDiv16,
            ClockSelect::PclkDiv8 => MOD::CPS::PclkDiv8,
            ClockSelect::PclkDiv4 => MOD::CPS::PclkDiv4,
            ClockSelect::PclkDiv2 => MOD::CPS::PclkDiv2,
            ClockSelect::Tim10Overflow => MOD::CPS::Tim10Overflow,
            ClockSelect::Tim11Overflow => MOD::CPS::Tim11Overflow,
            ClockSelect::External => MOD::CPS::External,
        };
        regs.cr.set(0);
        regs.mode
            .write(cps + MOD::CIDL.val(config.stop_in_sleep as u32));
        regs.cnt.set(0);
        regs.intclr.set(0xFF);
        Pca { regs }
    }

    pub fn free(self) -> R {
        self.regs.cr.modify(CR::CR::CLEAR);
        self.regs
    }

    pub fn start(&mut self) {
        self.regs.cr.modify(CR::CR::SET);
    }

    pub fn stop(&mut self) {
        self.regs.cr.modify(CR::CR::CLEAR);
    }

    /// Starts the counter with the overflow interrupt enabled
    pub fn start_it(&mut self) {
        self.regs.intclr.write(CR::CF::SET);
        self.regs.mode.modify(MOD::ECF::SET);
        self.start();
    }

    /// Stops the counter and disables the overflow interrupt
    pub fn stop_it(&mut self) {
        self.regs.mode.modify(MOD::ECF::CLEAR);
        self.stop();
    }

    pub fn counter(&self) -> u16 {
        self.regs.cnt.get() as u16
    }

    pub fn set_counter(&mut self, value: u16) {
        self.regs.cnt.set(u32::from(value));
    }

    fn set_output(&mut self, channel: Channel, enable: bool) {
        let bit = 1 << channel.index();
        let ccapo = self.regs.ccapo.get();
        self.regs
            .ccapo
            .set(if enable { ccapo | bit } else { ccapo & !bit });
    }

    /// Latches the counter into `CCAP` on `edge` of the channel input
    pub fn input_capture(&mut self, channel: Channel, edge: CaptureEdge) {
        let mode = match edge {
            CaptureEdge::Rising => CCAPM::CAPP::SET,
            CaptureEdge::Falling => CCAPM::CAPN::SET,
            CaptureEdge::Both => CCAPM::CAPP::SET + CCAPM::CAPN::SET,
        };
        self.regs.ccapm[channel.index()].write(mode);
        self.set_output(channel, false);
    }

    /// Flags a match when the counter reaches `value`, toggling the pin on each match if `toggle`
    pub fn output_compare(&mut self, channel: Channel, value: u16, toggle: bool) {
        let i = channel.index();
        self.regs.ccap[i].write(CCAP::VALUE.val(u32::from(value)));
        self.regs.ccapm[i]
            .write(CCAPM::ECOM::SET + CCAPM::MAT::SET + CCAPM::TOG.val(toggle as u32));
        self.set_output(channel, toggle);
    }

    /// 8-bit PWM, high for `duty`/256 of each 256 counts. A duty of 0 holds the pin low.
    pub fn pwm(&mut self, channel: Channel, duty: u8) {
        let i = channel.index();
        self.regs.ccapm[i].write(CCAPM::ECOM::SET + CCAPM::PWM::SET);
        self.set_duty(channel, duty);
    }

    fn set_duty(&mut self, channel: Channel, duty: u8) {
        let compare = if duty == 0 {
            0xFF
        } else {
            256 - u32::from(duty)
        };
        self.regs.ccap[channel.index()].write(CCAP::LOW.val(compare) + CCAP::HIGH.val(compare));
        self.set_output(channel, duty != 0);
    }

    fn duty(&self, channel: Channel) -> u8 {
        if self.regs.ccapo.get() & (1 << channel.index()) == 0 {
            return 0;
        }
        (256 - self.regs.ccap[channel.index()].read(CCAP::LOW)) as u8
    }

    /// Enables the capture/compare interrupt of `channel`
    pub fn start_channel_it(&mut self, channel: Channel) {
        self.regs.intclr.write(channel.flag().val(1));
        self.regs.ccapm[channel.index()].modify(CCAPM::CCIE::SET);
    }

    pub fn stop_channel_it(&mut self, channel: Channel) {
        self.regs.ccapm[channel.index()].modify(CCAPM::CCIE::CLEAR);
    }

    /// Last captured counter value
    pub fn capture_value(&self, channel: Channel) -> u16 {
        self.regs.ccap[channel.index()].read(CCAP::VALUE) as u16
    }

    /// Reports every raised flag whose interrupt is enabled to `callback`.
    ///
    /// Those flags are cleared together by one `INTCLR` write before the first callback; flags of
    /// sources without their interrupt enabled are left alone.
    pub fn irq_handler(&mut self, mut callback: impl FnMut(Event)) {
        let mut enabled = 0;
        if self.regs.mode.is_set(MOD::ECF) {
            enabled |= CR::CF.mask << CR::CF.shift;
        }
        for channel in Channel::ALL.iter().copied() {
            if self.regs.ccapm[channel.index()].is_set(CCAPM::CCIE) {
                let flag = channel.flag();
                enabled |= flag.mask << flag.shift;
            }
        }
        let pending = self.regs.cr.get() & enabled;
        if pending == 0 {
            return;
        }
        self.regs.intclr.set(pending);

        let pending = LocalRegisterCopy::<u32, CR::Register>::new(pending);
        if pending.is_set(CR::CF) {
            callback(Event::Overflow);
        }
        for channel in Channel::ALL.iter().copied() {
            if pending.is_set(channel.flag()) {
                callback(Event::Channel(channel));
            }
        }
    }

    /// Borrows `channel` as a PWM pin; it has to be configured with [`Pca::pwm`] first
    pub fn pwm_channel(&mut self, channel: Channel) -> PwmChannel<'_, R> {
        PwmChannel { pca: self, channel }
    }
}

/// A PCA channel in PWM mode
pub struct PwmChannel<'a, R> {
    pca: &'a mut Pca<R>,
    channel: Channel,
}

impl<R> embedded_hal_zero::PwmPin for PwmChannel<'_, R>
where
    R: Deref<Target = RegisterBlock>,
{
    type Duty = u8;

    fn disable(&mut self) {
        self.pca.set_output(self.channel, false);
    }

    fn enable(&mut self) {
        self.pca.set_output(self.channel, true);
    }

    fn get_duty(&self) -> u8 {
        self.pca.duty(self.channel)
    }

    fn get_max_duty(&self) -> u8 {
        u8::MAX
    }

    fn set_duty(&mut self, duty: u8) {
        self.pca.set_duty(self.channel, duty);
    }
}
