//! Driver status shared by all peripherals

/// Failure classes common to every driver
///
/// Each driver reports its own error type; all of them convert into this one so application code
/// can propagate failures from different peripherals with `?`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The operation failed or was refused
    Failed,
    /// The peripheral is in use by another transfer
    Busy,
    /// A status flag did not change before the poll budget ran out
    Timeout,
}

/// Lifecycle of a peripheral handle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not initialised, or de-initialised
    Reset,
    /// Initialised and idle
    Ready,
    /// A transfer is in progress
    Busy,
    /// The last operation left the peripheral in an error condition
    Error,
}

/// Poll budget used by blocking calls that don't take an explicit timeout
pub const DEFAULT_TIMEOUT: u32 = 0x000F_FFFF;

/// Polls `done` until it returns true, at most `timeout` times.
///
/// Returns `false` if the budget ran out.
#[inline]
pub(crate) fn poll(mut timeout: u32, mut done: impl FnMut() -> bool) -> bool {
    loop {
        if done() {
            return true;
        }
        if timeout == 0 {
            return false;
        }
        timeout -= 1;
    }
}
