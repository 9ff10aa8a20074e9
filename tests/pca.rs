mod common;

use cx32l003_hal::pac::pca::{RegisterBlock, CCAP, CCAPM, CR};
use cx32l003_hal::pca::{CaptureEdge, Channel, Config, Event, Pca};
use embedded_hal_zero::PwmPin;
use tock_registers::interfaces::{ReadWriteable, Readable};

use common::{bits, block, peek};

#[test]
fn pwm_duty_maps_onto_compare_value() {
    let regs = block::<RegisterBlock>();
    let mut pca = Pca::new(regs, Config::default());

    pca.pwm(Channel::C1, 64);
    assert!(regs.ccapm[1].is_set(CCAPM::PWM));
    assert!(regs.ccapm[1].is_set(CCAPM::ECOM));
    assert_eq!(regs.ccap[1].read(CCAP::LOW), 192);
    assert_eq!(regs.ccap[1].read(CCAP::HIGH), 192);

    let mut channel = pca.pwm_channel(Channel::C1);
    assert_eq!(channel.get_duty(), 64);
    channel.set_duty(0);
    assert_eq!(channel.get_duty(), 0);
    assert_eq!(regs.ccapo.get() & 0b10, 0);
    channel.set_duty(255);
    assert_eq!(channel.get_duty(), 255);
}

#[test]
fn start_and_stop_run_the_counter() {
    let regs = block::<RegisterBlock>();
    let mut pca = Pca::new(regs, Config::default());

    pca.start();
    assert!(regs.cr.is_set(CR::CR));
    pca.stop();
    assert!(!regs.cr.is_set(CR::CR));
}

#[test]
fn irq_handler_clears_enabled_flags_in_one_write() {
    let regs = block::<RegisterBlock>();
    let mut pca = Pca::new(regs, Config::default());
    pca.start_it();
    pca.start_channel_it(Channel::C2);
    pca.start_channel_it(Channel::C4);
    regs.cr.modify(CR::CF::SET + CR::CCF2::SET + CR::CCF4::SET);

    let mut seen = Vec::new();
    pca.irq_handler(|event| seen.push(event));
    assert_eq!(
        seen,
        [
            Event::Overflow,
            Event::Channel(Channel::C2),
            Event::Channel(Channel::C4)
        ]
    );
    assert_eq!(peek(&regs.intclr), bits(&[CR::CF, CR::CCF2, CR::CCF4]));
}

#[test]
fn irq_handler_skips_sources_without_interrupt() {
    let regs = block::<RegisterBlock>();
    let mut pca = Pca::new(regs, Config::default());
    pca.start_channel_it(Channel::C3);
    // C1 is only polled and the overflow interrupt is off
    pca.input_capture(Channel::C1, CaptureEdge::Rising);
    regs.cr.modify(CR::CF::SET + CR::CCF1::SET + CR::CCF3::SET);

    let mut seen = Vec::new();
    pca.irq_handler(|event| seen.push(event));
    assert_eq!(seen, [Event::Channel(Channel::C3)]);
    assert_eq!(peek(&regs.intclr), bits(&[CR::CCF3]));
}

#[test]
fn irq_handler_leaves_flags_of_polled_channels() {
    let regs = block::<RegisterBlock>();
    let mut pca = Pca::new(regs, Config::default());
    pca.start_channel_it(Channel::C0);
    regs.cr.modify(CR::CCF1::SET);

    let mut called = false;
    pca.irq_handler(|_| called = true);
    assert!(!called);
    // still the value start_channel_it wrote
    assert_eq!(peek(&regs.intclr), bits(&[CR::CCF0]));
}
