/*!
  # Real Time Clock
  A BCD calendar with time of day, weekday, date, an alarm and a periodic interrupt.

  All RTC registers are write protected. Each write opens the unlock window, asks the calendar to
  hold still (`CR.WAIT`), waits for the hardware to confirm (`CR.WAITF`), writes, releases the
  calendar and locks again. A calendar that never confirms yields [`Error::Timeout`].

  Values are accepted and returned either in binary or as raw BCD, see [`Format`].

  ## Initialisation example
  ```no_run
    use cx32l003_hal::{pac, rtc::{ClockSource, Config, Date, Format, Rtc, Time}};

    let dp = pac::Peripherals::take().unwrap();
    let mut rtc = Rtc::init(dp.RTC, Config::default().source(ClockSource::Lxt)).unwrap();
    rtc.set_time(&Time::new(13, 37, 0), Format::Bin).unwrap();
    rtc.set_date(&Date::new(1, 24, 6, 30), Format::Bin).unwrap();
    let (time, date) = rtc.get_time_date(Format::Bin);
  ```
*/

use core::ops::Deref;

use embedded_time::Clock;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac;
use crate::pac::rtc::{RegisterBlock, ALARM, CLKCR, CR, DATE, ISR, TIME, UNLOCK, UNLOCK_KEY};
use crate::status::{poll, State, DEFAULT_TIMEOUT};

/// RTC errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The calendar did not stop for an update in time
    Timeout,
    /// A field is out of range, or not valid BCD
    InvalidValue,
}

impl From<Error> for crate::status::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Timeout => crate::status::Error::Timeout,
            Error::InvalidValue => crate::status::Error::Failed,
        }
    }
}

/// Encoding of the values passed to and returned by the calendar functions
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Format {
    /// Plain binary numbers
    Bin,
    /// Packed BCD, as stored in the registers
    Bcd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormat {
    /// 1 to 12 with AM/PM
    H12,
    /// 0 to 23
    H24,
}

/// Calendar clock
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// 32.768 kHz crystal
    Lxt,
    /// Internal low speed oscillator
    Lirc,
    /// HXT divided by `n + 1`
    HxtDiv(u8),
}

/// Periodic interrupt interval
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Period {
    None,
    HalfSecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
}

/// Interrupt sources reported by [`Rtc::irq_handler`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Alarm,
    Periodic,
}

/// Time of day
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    /// PM flag, only meaningful with [`HourFormat::H12`]
    pub pm: bool,
}

impl Time {
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Time {
            hours,
            minutes,
            seconds,
            pm: false,
        }
    }
}

/// Calendar date
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Date {
    /// 0 = Sunday to 6 = Saturday
    pub weekday: u8,
    pub day: u8,
    pub month: u8,
    /// Years since 2000
    pub year: u8,
}

impl Date {
    pub const fn new(weekday: u8, year: u8, month: u8, day: u8) -> Self {
        Date {
            weekday,
            day,
            month,
            year,
        }
    }
}

/// Alarm time and the weekdays it fires on
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
    pub time: Time,
    /// Bit n set: fire on weekday n (bit 0 = Sunday)
    pub weekdays: u8,
}

/// Weekday mask that fires every day
pub const EVERY_DAY: u8 = 0x7F;

/// RTC configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    source: ClockSource,
    hour_format: HourFormat,
    timeout: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: ClockSource::Lxt,
            hour_format: HourFormat::H24,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn source(mut self, source: ClockSource) -> Self {
        self.source = source;
        self
    }

    pub fn hour_format(mut self, hour_format: HourFormat) -> Self {
        self.hour_format = hour_format;
        self
    }

    /// Poll budget for the `WAITF` handshake
    pub fn timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Converts a binary value below 100 to packed BCD
pub const fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Converts packed BCD to binary
pub const fn from_bcd(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

const fn is_bcd(value: u8) -> bool {
    value & 0x0F < 10 && value >> 4 < 10
}

/// Whether `weekday` is 0 (Sunday) to 6 (Saturday)
pub const fn is_valid_weekday(weekday: u8) -> bool {
    weekday <= 6
}

/// Converts one field to binary, rejecting malformed BCD
fn to_bin(value: u8, format: Format) -> Result<u8, Error> {
    match format {
        Format::Bin => Ok(value),
        Format::Bcd if is_bcd(value) => Ok(from_bcd(value)),
        Format::Bcd => Err(Error::InvalidValue),
    }
}

fn from_bin(value: u8, format: Format) -> u8 {
    match format {
        Format::Bin => value,
        Format::Bcd => to_bcd(value),
    }
}

fn in_range(value: u8, min: u8, max: u8) -> Result<u8, Error> {
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(Error::InvalidValue)
    }
}

/// Validates a time and returns the (SEC, MIN, HOUR) register fields
fn encode_time(
    time: &Time,
    format: Format,
    hour_format: HourFormat,
) -> Result<(u32, u32, u32), Error> {
    let s = in_range(to_bin(time.seconds, format)?, 0, 59)?;
    let m = in_range(to_bin(time.minutes, format)?, 0, 59)?;
    let h = to_bin(time.hours, format)?;
    let hour = match hour_format {
        HourFormat::H24 => u32::from(to_bcd(in_range(h, 0, 23)?)),
        HourFormat::H12 => {
            u32::from(to_bcd(in_range(h, 1, 12)?)) | if time.pm { 0x20 } else { 0 }
        }
    };
    Ok((u32::from(to_bcd(s)), u32::from(to_bcd(m)), hour))
}

fn decode_time(sec: u32, min: u32, hour: u32, format: Format, hour_format: HourFormat) -> Time {
    let (hours, pm) = match hour_format {
        HourFormat::H24 => (from_bcd(hour as u8), false),
        HourFormat::H12 => (from_bcd(hour as u8 & 0x1F), hour & 0x20 != 0),
    };
    Time {
        hours: from_bin(hours, format),
        minutes: from_bin(from_bcd(min as u8), format),
        seconds: from_bin(from_bcd(sec as u8), format),
        pm,
    }
}

/// Real time clock
pub struct Rtc<R = pac::RTC> {
    regs: R,
    hour_format: HourFormat,
    timeout: u32,
    state: State,
}

impl<R> Rtc<R>
where
    R: Deref<Target = RegisterBlock>,
{
    /// Selects the clock, sets the hour format and starts the calendar
    ///
    /// The RTC bus clock has to be enabled through [`Rcc`](crate::rcc::Rcc) beforehand.
    pub fn init(regs: R, config: Config) -> Result<Self, Error> {
        let mut rtc = Rtc {
            regs,
            hour_format: config.hour_format,
            timeout: config.timeout,
            state: State::Busy,
        };
        let clkcr = match config.source {
            ClockSource::Lxt => CLKCR::CLKSEL::Lxt + CLKCR::HXTDIV.val(0),
            ClockSource::Lirc => CLKCR::CLKSEL::Lirc + CLKCR::HXTDIV.val(0),
            ClockSource::HxtDiv(n) => CLKCR::CLKSEL::HxtDiv + CLKCR::HXTDIV.val(u32::from(n)),
        };
        let hour24 = (config.hour_format == HourFormat::H24) as u32;
        rtc.unlocked(|r| {
            r.clkcr.write(clkcr + CLKCR::CKEN::SET);
            r.cr.modify(CR::HOUR24.val(hour24) + CR::START::SET);
        });
        rtc.regs
            .intclr
            .write(ISR::ALMF::SET + ISR::PRDF::SET);
        rtc.state = State::Ready;
        debug!("rtc started");
        Ok(rtc)
    }

    /// Stops the calendar, disables its interrupts and releases the registers
    pub fn deinit(mut self) -> R {
        self.unlocked(|r| {
            r.cr.set(0);
            r.clkcr.set(0);
        });
        self.regs
            .intclr
            .write(ISR::ALMF::SET + ISR::PRDF::SET);
        self.state = State::Reset;
        self.regs
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn hour_format(&self) -> HourFormat {
        self.hour_format
    }

    fn unlocked<T>(&mut self, f: impl FnOnce(&RegisterBlock) -> T) -> T {
        let regs = &*self.regs;
        critical_section::with(|_| {
            regs.unlock
                .write(UNLOCK::KEY.val(UNLOCK_KEY) + UNLOCK::UNLOCK::SET);
            let result = f(regs);
            regs.unlock
                .write(UNLOCK::KEY.val(UNLOCK_KEY) + UNLOCK::UNLOCK::CLEAR);
            result
        })
    }

    /// Runs `f` with the calendar frozen
    fn calendar_write(&mut self, f: impl FnOnce(&RegisterBlock)) -> Result<(), Error> {
        let timeout = self.timeout;
        self.state = State::Busy;
        let result = self.unlocked(|r| {
            r.cr.modify(CR::WAIT::SET);
            let frozen = poll(timeout, || r.cr.is_set(CR::WAITF));
            if frozen {
                f(r);
            }
            r.cr.modify(CR::WAIT::CLEAR);
            frozen
        });
        if result {
            self.state = State::Ready;
            Ok(())
        } else {
            warn!("rtc WAITF timeout");
            self.state = State::Error;
            Err(Error::Timeout)
        }
    }

    /// Sets the time of day, keeping the weekday
    pub fn set_time(&mut self, time: &Time, format: Format) -> Result<(), Error> {
        let (sec, min, hour) = encode_time(time, format, self.hour_format)?;
        self.calendar_write(|r| {
            r.time
                .modify(TIME::SEC.val(sec) + TIME::MIN.val(min) + TIME::HOUR.val(hour))
        })
    }

    /// Sets the date and weekday
    pub fn set_date(&mut self, date: &Date, format: Format) -> Result<(), Error> {
        if !is_valid_weekday(date.weekday) {
            return Err(Error::InvalidValue);
        }
        let day = in_range(to_bin(date.day, format)?, 1, 31)?;
        let month = in_range(to_bin(date.month, format)?, 1, 12)?;
        let year = in_range(to_bin(date.year, format)?, 0, 99)?;
        let weekday = u32::from(date.weekday);
        self.calendar_write(|r| {
            r.date.write(
                DATE::DAY.val(u32::from(to_bcd(day)))
                    + DATE::MONTH.val(u32::from(to_bcd(month)))
                    + DATE::YEAR.val(u32::from(to_bcd(year))),
            );
            r.time.modify(TIME::WEEK.val(weekday));
        })
    }

    /// Reads a consistent snapshot of time and date
    pub fn get_time_date(&self, format: Format) -> (Time, Date) {
        let (time, date) = loop {
            let time = self.regs.time.extract();
            let date = self.regs.date.extract();
            if self.regs.time.get() == time.get() {
                break (time, date);
            }
        };
        let t = decode_time(
            time.read(TIME::SEC),
            time.read(TIME::MIN),
            time.read(TIME::HOUR),
            format,
            self.hour_format,
        );
        let d = Date {
            weekday: time.read(TIME::WEEK) as u8,
            day: from_bin(from_bcd(date.read(DATE::DAY) as u8), format),
            month: from_bin(from_bcd(date.read(DATE::MONTH) as u8), format),
            year: from_bin(from_bcd(date.read(DATE::YEAR) as u8), format),
        };
        (t, d)
    }

    /// Seconds since midnight
    pub fn seconds_of_day(&self) -> u32 {
        let (t, _) = self.get_time_date(Format::Bin);
        let hours = match self.hour_format {
            HourFormat::H24 => u32::from(t.hours),
            HourFormat::H12 => u32::from(t.hours % 12) + if t.pm { 12 } else { 0 },
        };
        hours * 3600 + u32::from(t.minutes) * 60 + u32::from(t.seconds)
    }

    /// Programs and enables the alarm without its interrupt
    pub fn set_alarm(&mut self, alarm: &Alarm, format: Format) -> Result<(), Error> {
        self.program_alarm(alarm, format, false)
    }

    /// Programs and enables the alarm with its interrupt
    pub fn set_alarm_it(&mut self, alarm: &Alarm, format: Format) -> Result<(), Error> {
        self.program_alarm(alarm, format, true)
    }

    fn program_alarm(&mut self, alarm: &Alarm, format: Format, it: bool) -> Result<(), Error> {
        let (sec, min, hour) = encode_time(&alarm.time, format, self.hour_format)?;
        let weekdays = u32::from(alarm.weekdays & EVERY_DAY);
        self.regs.intclr.write(ISR::ALMF::SET);
        self.unlocked(|r| {
            r.cr.modify(CR::ALMEN::CLEAR);
            r.alarm.write(
                ALARM::SEC.val(sec)
                    + ALARM::MIN.val(min)
                    + ALARM::HOUR.val(hour)
                    + ALARM::WEEKMASK.val(weekdays),
            );
            r.cr.modify(CR::ALMEN::SET + CR::ALMIE.val(it as u32));
        });
        Ok(())
    }

    pub fn get_alarm(&self, format: Format) -> Alarm {
        let a = self.regs.alarm.extract();
        Alarm {
            time: decode_time(
                a.read(ALARM::SEC),
                a.read(ALARM::MIN),
                a.read(ALARM::HOUR),
                format,
                self.hour_format,
            ),
            weekdays: a.read(ALARM::WEEKMASK) as u8,
        }
    }

    pub fn deactivate_alarm(&mut self) {
        self.unlocked(|r| r.cr.modify(CR::ALMEN::CLEAR + CR::ALMIE::CLEAR));
        self.regs.intclr.write(ISR::ALMF::SET);
    }

    /// Selects the periodic interrupt; [`Period::None`] disables it
    pub fn set_periodic_interrupt(&mut self, period: Period) {
        let prds = match period {
            Period::None => CR::PRDS::None,
            Period::HalfSecond => CR::PRDS::HalfSecond,
            Period::Second => CR::PRDS::Second,
            Period::Minute => CR::PRDS::Minute,
            Period::Hour => CR::PRDS::Hour,
            Period::Day => CR::PRDS::Day,
            Period::Month => CR::PRDS::Month,
        };
        let enable = (period != Period::None) as u32;
        self.regs.intclr.write(ISR::PRDF::SET);
        self.unlocked(|r| r.cr.modify(prds + CR::PRDIE.val(enable)));
    }

    /// Clears every pending flag once and reports it to `callback`
    pub fn irq_handler(&mut self, mut callback: impl FnMut(Event)) {
        let isr = self.regs.isr.extract();
        if isr.is_set(ISR::ALMF) {
            self.regs.intclr.write(ISR::ALMF::SET);
            callback(Event::Alarm);
        }
        if isr.is_set(ISR::PRDF) {
            self.regs.intclr.write(ISR::PRDF::SET);
            callback(Event::Periodic);
        }
    }
}

impl<R> Clock for Rtc<R>
where
    R: Deref<Target = RegisterBlock>,
{
    type T = u32;

    const SCALING_FACTOR: embedded_time::fraction::Fraction =
        <embedded_time::fraction::Fraction>::new(1, 1);

    /// Seconds since midnight; wraps once a day
    fn try_now(&self) -> Result<embedded_time::Instant<Self>, embedded_time::clock::Error> {
        Ok(embedded_time::Instant::new(self.seconds_of_day()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcd_conversions() {
        assert_eq!(to_bcd(59), 0x59);
        assert_eq!(to_bcd(7), 0x07);
        assert_eq!(from_bcd(0x23), 23);
        assert_eq!(from_bcd(to_bcd(42)), 42);
        assert!(!is_bcd(0x5A));
    }

    #[test]
    fn twelve_hour_encoding_sets_pm_bit() {
        let t = Time {
            hours: 11,
            minutes: 5,
            seconds: 9,
            pm: true,
        };
        assert_eq!(
            encode_time(&t, Format::Bin, HourFormat::H12),
            Ok((0x09, 0x05, 0x31))
        );
        assert_eq!(decode_time(0x09, 0x05, 0x31, Format::Bin, HourFormat::H12), t);
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let t = Time::new(24, 0, 0);
        assert_eq!(
            encode_time(&t, Format::Bin, HourFormat::H24),
            Err(Error::InvalidValue)
        );
        let t = Time::new(0, 0, 0);
        assert_eq!(
            encode_time(&t, Format::Bin, HourFormat::H12),
            Err(Error::InvalidValue)
        );
        let t = Time::new(0x12, 0x3A, 0);
        assert_eq!(
            encode_time(&t, Format::Bcd, HourFormat::H24),
            Err(Error::InvalidValue)
        );
    }

    #[test]
    fn weekday_range() {
        assert!(is_valid_weekday(0));
        assert!(is_valid_weekday(6));
        assert!(!is_valid_weekday(7));
    }
}
