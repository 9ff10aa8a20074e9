/*!
  # Inter-Integrated Circuit (I2C) bus
  To construct the I2C instance use the `I2c::new` function.
  The pin parameter is a tuple containing `(scl, sda)`; both pins have to be switched to their I2C
  alternate function with `into_alternate` and made open drain.

  The controller is byte oriented: after every bus event it raises `CR.SI`, stalls the bus and
  leaves a status code in `SR`. The driver walks that state machine with a bounded poll on `SI`.

  ## Initialisation example
  ```no_run
    use cx32l003_hal::{gpio::{GpioExt, AF4}, i2c::I2c, pac, prelude::*, rcc::Clocks};

    let dp = pac::Peripherals::take().unwrap();
    let gpioc = dp.GPIOC.split();
    let mut scl = gpioc.pc3.into_alternate::<AF4>();
    let mut sda = gpioc.pc4.into_alternate::<AF4>();
    scl.set_open_drain(true);
    sda.set_open_drain(true);

    let mut i2c = I2c::new(dp.I2C, (scl, sda), 100_000u32.Hz(), Clocks::default()).unwrap();
    i2c.master_transmit(0x3C, &[0x00, 0xAF]).unwrap();
  ```
*/

use core::ops::Deref;

use embedded_hal::i2c::{self as i2c_one, ErrorKind, NoAcknowledgeSource, Operation};
use embedded_hal_zero::blocking::i2c::{
    Read as ReadZero, Write as WriteZero, WriteRead as WriteReadZero,
};
use embedded_time::rate::Hertz;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::pac;
use crate::pac::i2c::{RegisterBlock, BAUDCR, CR, DATA, SR, TIMRUN};
use crate::rcc::Clocks;
use crate::status::{poll, DEFAULT_TIMEOUT};

/// Bus state codes reported in `SR`
pub mod status {
    pub const BUS_ERROR: u8 = 0x00;
    pub const START: u8 = 0x08;
    pub const REPEATED_START: u8 = 0x10;
    pub const ADDR_W_ACK: u8 = 0x18;
    pub const ADDR_W_NACK: u8 = 0x20;
    pub const DATA_W_ACK: u8 = 0x28;
    pub const DATA_W_NACK: u8 = 0x30;
    pub const ARBITRATION_LOST: u8 = 0x38;
    pub const ADDR_R_ACK: u8 = 0x40;
    pub const ADDR_R_NACK: u8 = 0x48;
    pub const DATA_R_ACK: u8 = 0x50;
    pub const DATA_R_NACK: u8 = 0x58;
    pub const IDLE: u8 = 0xF8;
}

/// I2C error
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Misplaced START or STOP detected
    Bus,
    /// Another master won the bus
    ArbitrationLoss,
    /// The target did not acknowledge its address or a data byte
    NoAcknowledge(NoAcknowledgeSource),
    /// `SI` was not raised before the poll budget ran out
    Timeout,
    /// A status code that doesn't belong to the current step
    Unexpected(u8),
    /// The bus frequency can't be derived from PCLK
    InvalidFrequency,
}

impl i2c_one::Error for Error {
    fn kind(&self) -> ErrorKind {
        match *self {
            Error::Bus => ErrorKind::Bus,
            Error::ArbitrationLoss => ErrorKind::ArbitrationLoss,
            Error::NoAcknowledge(source) => ErrorKind::NoAcknowledge(source),
            Error::Timeout | Error::Unexpected(_) | Error::InvalidFrequency => ErrorKind::Other,
        }
    }
}

impl From<Error> for crate::status::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Timeout => crate::status::Error::Timeout,
            Error::ArbitrationLoss => crate::status::Error::Busy,
            _ => crate::status::Error::Failed,
        }
    }
}

/// Maps a status code to `Ok` if it is one of `expected`
pub fn check_status(code: u8, expected: &[u8]) -> Result<(), Error> {
    if expected.contains(&code) {
        return Ok(());
    }
    Err(match code {
        status::BUS_ERROR => Error::Bus,
        status::ARBITRATION_LOST => Error::ArbitrationLoss,
        status::ADDR_W_NACK | status::ADDR_R_NACK => {
            Error::NoAcknowledge(NoAcknowledgeSource::Address)
        }
        status::DATA_W_NACK => Error::NoAcknowledge(NoAcknowledgeSource::Data),
        other => Error::Unexpected(other),
    })
}

/// `BAUDCR.TM` for `freq`: SCL = PCLK / (8 · (TM + 1))
pub fn baud_divider(pclk: Hertz, freq: Hertz) -> Result<u8, Error> {
    if freq.0 == 0 {
        return Err(Error::InvalidFrequency);
    }
    let div = pclk.0 / (8 * freq.0);
    if div == 0 || div > 256 {
        return Err(Error::InvalidFrequency);
    }
    Ok((div - 1) as u8)
}

/// The controller seen one bus event at a time.
///
/// Every action hands SI back to the controller and returns the status code it stalls in next.
trait Bus {
    fn start(&mut self) -> Result<u8, Error>;
    /// Puts `byte` on the bus, address or data alike
    fn send(&mut self, byte: u8) -> Result<u8, Error>;
    /// Clocks in one byte, answering it with ACK when `ack` is set
    fn receive(&mut self, ack: bool) -> Result<(u8, u8), Error>;
    fn stop(&mut self);
}

fn send_address<B: Bus>(bus: &mut B, address: u8, read: bool) -> Result<(), Error> {
    let code = bus.send(address << 1 | read as u8)?;
    if read {
        check_status(code, &[status::ADDR_R_ACK])
    } else {
        check_status(code, &[status::ADDR_W_ACK])
    }
}

fn run_inner<B: Bus>(
    bus: &mut B,
    address: u8,
    operations: &mut [Operation<'_>],
) -> Result<(), Error> {
    let mut previous: Option<bool> = None;
    let count = operations.len();
    for i in 0..count {
        let is_read = matches!(operations[i], Operation::Read(_));
        let next_is_read = operations
            .get(i + 1)
            .map(|op| matches!(op, Operation::Read(_)));
        if previous != Some(is_read) {
            let code = bus.start()?;
            check_status(code, &[status::START, status::REPEATED_START])?;
            send_address(bus, address, is_read)?;
        }
        match &mut operations[i] {
            Operation::Write(bytes) => {
                for byte in bytes.iter() {
                    let code = bus.send(*byte)?;
                    check_status(code, &[status::DATA_W_ACK])?;
                }
            }
            Operation::Read(buffer) => {
                // The last byte before a STOP or repeated START is not acknowledged
                let ends_read = next_is_read != Some(true);
                let len = buffer.len();
                for (j, byte) in buffer.iter_mut().enumerate() {
                    let ack = !(ends_read && j + 1 == len);
                    let (code, data) = bus.receive(ack)?;
                    if ack {
                        check_status(code, &[status::DATA_R_ACK])?;
                    } else {
                        check_status(code, &[status::DATA_R_NACK])?;
                    }
                    *byte = data;
                }
            }
        }
        previous = Some(is_read);
    }
    Ok(())
}

fn run<B: Bus>(bus: &mut B, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Error> {
    let result = run_inner(bus, address, operations);
    bus.stop();
    result
}

/// Width of the register address sent by `mem_read` and `mem_write`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemAddrSize {
    Bits8,
    Bits16,
}

impl MemAddrSize {
    /// The bytes of a big endian register address that go on the bus
    fn select(self, reg: &[u8; 2]) -> &[u8] {
        match self {
            MemAddrSize::Bits8 => &reg[1..],
            MemAddrSize::Bits16 => &reg[..],
        }
    }
}

fn mem_read_on<B: Bus>(
    bus: &mut B,
    address: u8,
    mem_address: u16,
    size: MemAddrSize,
    buffer: &mut [u8],
) -> Result<(), Error> {
    let reg = mem_address.to_be_bytes();
    run(
        bus,
        address,
        &mut [Operation::Write(size.select(&reg)), Operation::Read(buffer)],
    )
}

/// SDA pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait SdaPin<I2C> {}

/// SCL pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait SclPin<I2C> {}

/// I2C pins - DO NOT IMPLEMENT THIS TRAIT
pub unsafe trait Pins<I2C> {}

unsafe impl<MODE> SclPin<pac::I2C> for crate::gpio::PC3<MODE> {}
unsafe impl<MODE> SdaPin<pac::I2C> for crate::gpio::PC4<MODE> {}
unsafe impl<MODE> SclPin<pac::I2C> for crate::gpio::PD6<MODE> {}
unsafe impl<MODE> SdaPin<pac::I2C> for crate::gpio::PD5<MODE> {}

unsafe impl<SCL, SDA> Pins<pac::I2C> for (SCL, SDA)
where
    SCL: SclPin<pac::I2C>,
    SDA: SdaPin<pac::I2C>,
{
}

/// I2C peripheral operating in master mode supporting seven bit addressing
pub struct I2c<I2C, PINS> {
    i2c: I2C,
    pins: PINS,
    timeout: u32,
}

impl<I2C, PINS> I2c<I2C, PINS>
where
    I2C: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::I2C>,
{
    /**
      Constructs an I2C instance in master mode.
      The pin parameter tuple (scl, sda) needs to be configured accordingly.

      Fails with [`Error::InvalidFrequency`] when `freq` can't be derived from PCLK.
      Frequencies above 400 kHz select the high speed mode.
    */
    pub fn new(i2c: I2C, pins: PINS, freq: Hertz, clocks: Clocks) -> Result<Self, Error> {
        let tm = baud_divider(clocks.pclk(), freq)?;

        i2c.cr.set(0);
        i2c.baudcr.write(BAUDCR::TM.val(u32::from(tm)));
        i2c.timrun.write(TIMRUN::TME::SET);
        i2c.cr
            .write(CR::ENS::SET + CR::H1M.val((freq.0 > 400_000) as u32));
        debug!("i2c master at {} Hz, TM {}", freq.0, tm);

        Ok(I2c {
            i2c,
            pins,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Disables the controller and releases peripheral and pins
    pub fn release(self) -> (I2C, PINS) {
        self.i2c.cr.set(0);
        self.i2c.timrun.write(TIMRUN::TME::CLEAR);
        (self.i2c, self.pins)
    }

    /// Set the poll budget when waiting for a bus event.
    /// It's not a time unit but the number of status reads.
    pub fn set_timeout(&mut self, timeout: u32) {
        self.timeout = timeout;
    }

    /// Runs `operations` as one transaction: a repeated START separates reads from writes and a
    /// STOP ends it, also when a step fails.
    pub fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Error> {
        run(self, address, operations)
    }

    /// Sends `bytes` to `address`
    pub fn master_transmit(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        self.transaction(address, &mut [Operation::Write(bytes)])
    }

    /// Fills `buffer` from `address`
    pub fn master_receive(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.transaction(address, &mut [Operation::Read(buffer)])
    }

    /// Writes `bytes` to register `mem_address` of a memory-like target
    pub fn mem_write(
        &mut self,
        address: u8,
        mem_address: u16,
        size: MemAddrSize,
        bytes: &[u8],
    ) -> Result<(), Error> {
        let reg = mem_address.to_be_bytes();
        run(self, address, &mut [Operation::Write(size.select(&reg)), Operation::Write(bytes)])
    }

    /// Reads `buffer` from register `mem_address` of a memory-like target
    pub fn mem_read(
        &mut self,
        address: u8,
        mem_address: u16,
        size: MemAddrSize,
        buffer: &mut [u8],
    ) -> Result<(), Error> {
        mem_read_on(self, address, mem_address, size, buffer)
    }
}

impl<I2C, PINS> I2c<I2C, PINS>
where
    I2C: Deref<Target = RegisterBlock>,
{
    /// Releases SI so the controller executes the next step, then waits for it to finish
    fn step(&mut self) -> Result<u8, Error> {
        self.i2c.cr.modify(CR::SI::CLEAR);
        let i2c = &self.i2c;
        if poll(self.timeout, || i2c.cr.is_set(CR::SI)) {
            Ok(i2c.sr.read(SR::STATUS) as u8)
        } else {
            warn!("i2c timeout");
            Err(Error::Timeout)
        }
    }
}

impl<I2C, PINS> Bus for I2c<I2C, PINS>
where
    I2C: Deref<Target = RegisterBlock>,
{
    fn start(&mut self) -> Result<u8, Error> {
        self.i2c.cr.modify(CR::STA::SET);
        let code = self.step();
        self.i2c.cr.modify(CR::STA::CLEAR);
        code
    }

    fn send(&mut self, byte: u8) -> Result<u8, Error> {
        self.i2c.data.write(DATA::DATA.val(u32::from(byte)));
        self.step()
    }

    fn receive(&mut self, ack: bool) -> Result<(u8, u8), Error> {
        self.i2c.cr.modify(CR::AA.val(ack as u32));
        let code = self.step()?;
        Ok((code, self.i2c.data.read(DATA::DATA) as u8))
    }

    fn stop(&mut self) {
        self.i2c.cr.modify(CR::STO::SET + CR::AA::CLEAR + CR::SI::CLEAR);
    }
}

impl<I2C, PINS> i2c_one::ErrorType for I2c<I2C, PINS> {
    type Error = Error;
}

impl<I2C, PINS> i2c_one::I2c for I2c<I2C, PINS>
where
    I2C: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::I2C>,
{
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        I2c::transaction(self, address, operations)
    }
}

impl<I2C, PINS> ReadZero for I2c<I2C, PINS>
where
    I2C: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::I2C>,
{
    type Error = Error;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.master_receive(address, buffer)
    }
}

impl<I2C, PINS> WriteZero for I2c<I2C, PINS>
where
    I2C: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::I2C>,
{
    type Error = Error;

    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.master_transmit(addr, bytes)
    }
}

impl<I2C, PINS> WriteReadZero for I2c<I2C, PINS>
where
    I2C: Deref<Target = RegisterBlock>,
    PINS: Pins<pac::I2C>,
{
    type Error = Error;

    fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.transaction(addr, &mut [Operation::Write(bytes), Operation::Read(buffer)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Action {
        Start,
        Send(u8),
        Receive { ack: bool },
        Stop,
    }

    /// Answers every bus action with the next status code of a script
    struct Scripted {
        codes: std::vec::IntoIter<u8>,
        data: u8,
        log: Vec<Action>,
    }

    impl Scripted {
        fn new(codes: &[u8]) -> Self {
            Scripted {
                codes: codes.to_vec().into_iter(),
                data: 0,
                log: Vec::new(),
            }
        }

        fn next_code(&mut self) -> Result<u8, Error> {
            self.codes.next().ok_or(Error::Timeout)
        }
    }

    impl Bus for Scripted {
        fn start(&mut self) -> Result<u8, Error> {
            self.log.push(Action::Start);
            self.next_code()
        }

        fn send(&mut self, byte: u8) -> Result<u8, Error> {
            self.log.push(Action::Send(byte));
            self.next_code()
        }

        fn receive(&mut self, ack: bool) -> Result<(u8, u8), Error> {
            self.log.push(Action::Receive { ack });
            self.data += 1;
            Ok((self.next_code()?, self.data))
        }

        fn stop(&mut self) {
            self.log.push(Action::Stop);
        }
    }

    #[test]
    fn write_completes_on_acks() {
        let mut bus = Scripted::new(&[
            status::START,
            status::ADDR_W_ACK,
            status::DATA_W_ACK,
            status::DATA_W_ACK,
        ]);
        assert_eq!(run(&mut bus, 0x3C, &mut [Operation::Write(&[0x00, 0xAF])]), Ok(()));
        assert_eq!(
            bus.log,
            [
                Action::Start,
                Action::Send(0x78),
                Action::Send(0x00),
                Action::Send(0xAF),
                Action::Stop
            ]
        );
    }

    #[test]
    fn address_nack_ends_transaction() {
        let mut bus = Scripted::new(&[status::START, status::ADDR_W_NACK]);
        assert_eq!(
            run(&mut bus, 0x50, &mut [Operation::Write(&[1, 2])]),
            Err(Error::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert_eq!(bus.log, [Action::Start, Action::Send(0xA0), Action::Stop]);

        let mut bus = Scripted::new(&[status::START, status::ADDR_R_NACK]);
        let mut buffer = [0; 2];
        assert_eq!(
            run(&mut bus, 0x50, &mut [Operation::Read(&mut buffer)]),
            Err(Error::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert_eq!(bus.log, [Action::Start, Action::Send(0xA1), Action::Stop]);
    }

    #[test]
    fn data_nack_stops_sending() {
        let mut bus = Scripted::new(&[
            status::START,
            status::ADDR_W_ACK,
            status::DATA_W_ACK,
            status::DATA_W_NACK,
        ]);
        assert_eq!(
            run(&mut bus, 0x50, &mut [Operation::Write(&[1, 2, 3])]),
            Err(Error::NoAcknowledge(NoAcknowledgeSource::Data))
        );
        assert_eq!(bus.log.last(), Some(&Action::Stop));
        assert!(!bus.log.contains(&Action::Send(3)));
    }

    #[test]
    fn last_received_byte_is_nacked() {
        let mut bus = Scripted::new(&[
            status::START,
            status::ADDR_R_ACK,
            status::DATA_R_ACK,
            status::DATA_R_ACK,
            status::DATA_R_NACK,
        ]);
        let mut buffer = [0; 3];
        assert_eq!(run(&mut bus, 0x50, &mut [Operation::Read(&mut buffer)]), Ok(()));
        assert_eq!(buffer, [1, 2, 3]);
        assert_eq!(
            bus.log[2..],
            [
                Action::Receive { ack: true },
                Action::Receive { ack: true },
                Action::Receive { ack: false },
                Action::Stop
            ]
        );
    }

    #[test]
    fn write_read_issues_repeated_start() {
        let mut bus = Scripted::new(&[
            status::START,
            status::ADDR_W_ACK,
            status::DATA_W_ACK,
            status::REPEATED_START,
            status::ADDR_R_ACK,
            status::DATA_R_ACK,
            status::DATA_R_NACK,
        ]);
        let mut buffer = [0; 2];
        assert_eq!(
            run(
                &mut bus,
                0x50,
                &mut [Operation::Write(&[0x10]), Operation::Read(&mut buffer)]
            ),
            Ok(())
        );
        assert_eq!(
            bus.log,
            [
                Action::Start,
                Action::Send(0xA0),
                Action::Send(0x10),
                Action::Start,
                Action::Send(0xA1),
                Action::Receive { ack: true },
                Action::Receive { ack: false },
                Action::Stop
            ]
        );
    }

    #[test]
    fn mem_read_sends_wide_address_then_restarts() {
        let mut bus = Scripted::new(&[
            status::START,
            status::ADDR_W_ACK,
            status::DATA_W_ACK,
            status::DATA_W_ACK,
            status::REPEATED_START,
            status::ADDR_R_ACK,
            status::DATA_R_NACK,
        ]);
        let mut buffer = [0; 1];
        assert_eq!(
            mem_read_on(&mut bus, 0x50, 0x1234, MemAddrSize::Bits16, &mut buffer),
            Ok(())
        );
        assert_eq!(buffer, [1]);
        assert_eq!(
            bus.log,
            [
                Action::Start,
                Action::Send(0xA0),
                Action::Send(0x12),
                Action::Send(0x34),
                Action::Start,
                Action::Send(0xA1),
                Action::Receive { ack: false },
                Action::Stop
            ]
        );
    }

    #[test]
    fn consecutive_writes_share_one_start() {
        let mut bus = Scripted::new(&[
            status::START,
            status::ADDR_W_ACK,
            status::DATA_W_ACK,
            status::DATA_W_ACK,
        ]);
        let reg = 0x0020_u16.to_be_bytes();
        assert_eq!(
            run(
                &mut bus,
                0x50,
                &mut [
                    Operation::Write(MemAddrSize::Bits8.select(&reg)),
                    Operation::Write(&[0xAB])
                ]
            ),
            Ok(())
        );
        assert_eq!(bus.log.iter().filter(|a| **a == Action::Start).count(), 1);
        assert!(bus.log.contains(&Action::Send(0x20)));
        assert!(!bus.log.contains(&Action::Send(0x00)));
    }

    #[test]
    fn arbitration_loss_is_reported() {
        let mut bus = Scripted::new(&[status::ARBITRATION_LOST]);
        assert_eq!(
            run(&mut bus, 0x50, &mut [Operation::Write(&[1])]),
            Err(Error::ArbitrationLoss)
        );
        assert_eq!(bus.log, [Action::Start, Action::Stop]);
    }

    #[test]
    fn nacks_are_classified_by_phase() {
        assert_eq!(
            check_status(status::ADDR_W_NACK, &[status::ADDR_W_ACK]),
            Err(Error::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert_eq!(
            check_status(status::ADDR_R_NACK, &[status::ADDR_R_ACK]),
            Err(Error::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert_eq!(
            check_status(status::DATA_W_NACK, &[status::DATA_W_ACK]),
            Err(Error::NoAcknowledge(NoAcknowledgeSource::Data))
        );
    }

    #[test]
    fn bus_faults() {
        assert_eq!(check_status(status::BUS_ERROR, &[status::START]), Err(Error::Bus));
        assert_eq!(
            check_status(status::ARBITRATION_LOST, &[status::DATA_W_ACK]),
            Err(Error::ArbitrationLoss)
        );
        assert_eq!(check_status(0x68, &[status::START]), Err(Error::Unexpected(0x68)));
        assert_eq!(
            check_status(status::REPEATED_START, &[status::START, status::REPEATED_START]),
            Ok(())
        );
    }

    #[test]
    fn baud_divider_matches_scl_formula() {
        // 24 MHz / (8 * 100 kHz) = 30
        assert_eq!(baud_divider(Hertz(24_000_000), Hertz(100_000)), Ok(29));
        assert_eq!(baud_divider(Hertz(24_000_000), Hertz(1_000_000)), Ok(2));
        assert_eq!(
            baud_divider(Hertz(24_000_000), Hertz(10_000_000)),
            Err(Error::InvalidFrequency)
        );
        assert_eq!(baud_divider(Hertz(24_000_000), Hertz(1_000)), Err(Error::InvalidFrequency));
    }
}
