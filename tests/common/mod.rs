#![allow(dead_code)]

use core::ptr;

use tock_registers::fields::Field;
use tock_registers::RegisterLongName;

/// A zeroed register block living for the rest of the test
pub fn block<T>() -> &'static T {
    block_with(|_| {})
}

/// A zeroed register block, with `init` run on it before it's shared.
/// Read-only status registers can only be preset here.
pub fn block_with<T>(init: impl FnOnce(*mut T)) -> &'static T {
    let raw = Box::into_raw(Box::new(unsafe { core::mem::zeroed::<T>() }));
    init(raw);
    unsafe { &*raw }
}

/// Raw write to a register of a block under construction
///
/// # Safety
/// `reg` has to point into a block obtained from [`block_with`].
pub unsafe fn preset<R>(reg: *mut R, value: u32) {
    ptr::write_volatile(reg as *mut u32, value);
}

/// Stands in for a pin tuple
pub struct FakePins;

/// Register value with every bit of `fields` set
pub fn bits<R: RegisterLongName>(fields: &[Field<u32, R>]) -> u32 {
    fields.iter().fold(0, |acc, f| acc | (f.mask << f.shift))
}

/// Raw read of a register, write-only ones included, which keep the last value written
pub fn peek<R>(reg: &R) -> u32 {
    unsafe { ptr::read_volatile(reg as *const R as *const u32) }
}
