mod common;

use cx32l003_hal::pac::rtc::{RegisterBlock, CR, DATE, TIME};
use cx32l003_hal::rtc::{Alarm, Config, Date, Error, Format, Rtc, Time, EVERY_DAY};
use cx32l003_hal::State;
use tock_registers::interfaces::{ReadWriteable, Readable};

use common::block;

type RtcRegs = &'static RegisterBlock;

/// A started calendar whose counters freeze as soon as they're asked to
fn rtc() -> (RtcRegs, Rtc<RtcRegs>) {
    let regs = block::<RegisterBlock>();
    let rtc = Rtc::init(regs, Config::default()).unwrap();
    regs.cr.modify(CR::WAITF::SET);
    (regs, rtc)
}

#[test]
fn init_starts_calendar_in_24_hour_mode() {
    let (regs, rtc) = rtc();
    assert!(regs.cr.is_set(CR::START));
    assert!(regs.cr.is_set(CR::HOUR24));
    assert_eq!(rtc.state(), State::Ready);
}

#[test]
fn time_and_date_are_stored_as_bcd() {
    let (regs, mut rtc) = rtc();

    rtc.set_time(&Time::new(23, 59, 45), Format::Bin).unwrap();
    rtc.set_date(&Date::new(5, 24, 12, 31), Format::Bin).unwrap();

    assert_eq!(regs.time.read(TIME::HOUR), 0x23);
    assert_eq!(regs.time.read(TIME::MIN), 0x59);
    assert_eq!(regs.time.read(TIME::SEC), 0x45);
    assert_eq!(regs.time.read(TIME::WEEK), 5);
    assert_eq!(regs.date.read(DATE::YEAR), 0x24);
    assert!(!regs.cr.is_set(CR::WAIT));

    let (time, date) = rtc.get_time_date(Format::Bin);
    assert_eq!(time, Time::new(23, 59, 45));
    assert_eq!(date, Date::new(5, 24, 12, 31));
    assert_eq!(rtc.get_time_date(Format::Bcd).0, Time::new(0x23, 0x59, 0x45));
    assert_eq!(rtc.seconds_of_day(), 23 * 3600 + 59 * 60 + 45);
}

#[test]
fn invalid_date_leaves_calendar_untouched() {
    let (regs, mut rtc) = rtc();
    assert_eq!(
        rtc.set_date(&Date::new(1, 24, 13, 1), Format::Bin),
        Err(Error::InvalidValue)
    );
    assert_eq!(regs.date.get(), 0);
}

#[test]
fn frozen_flag_never_set_times_out() {
    let regs = block::<RegisterBlock>();
    let mut rtc = Rtc::init(regs, Config::default().timeout(16)).unwrap();

    assert_eq!(rtc.set_time(&Time::new(1, 2, 3), Format::Bin), Err(Error::Timeout));
    assert_eq!(rtc.state(), State::Error);
    assert_eq!(regs.time.get(), 0);
    assert!(!regs.cr.is_set(CR::WAIT));
}

#[test]
fn alarm_reads_back() {
    let (regs, mut rtc) = rtc();
    let alarm = Alarm {
        time: Time::new(6, 30, 0),
        weekdays: EVERY_DAY,
    };

    rtc.set_alarm_it(&alarm, Format::Bin).unwrap();
    assert!(regs.cr.is_set(CR::ALMEN));
    assert!(regs.cr.is_set(CR::ALMIE));
    assert_eq!(rtc.get_alarm(Format::Bin), alarm);

    rtc.deactivate_alarm();
    assert!(!regs.cr.is_set(CR::ALMEN));
}
