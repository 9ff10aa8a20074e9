/*!
  # Interrupt Management
  Interrupts can be enabled, disabled, pended and prioritised through the NVIC.
  The CX32L003 implements two priority bits, so four levels are available; 0 is the most urgent.

  ## Example
  ```ignore
    use cx32l003_hal::interrupts;
    use cx32l003_hal::pac::{interrupt, Interrupt};

    let mut cp = cortex_m::Peripherals::take().unwrap();
    interrupts::set_priority(&mut cp.NVIC, Interrupt::TIM10, 1);
    interrupts::enable(Interrupt::TIM10);

    #[interrupt]
    fn TIM10() {
        // ..
    }
  ```
*/

use cortex_m::peripheral::NVIC;

use crate::pac::{Interrupt, NVIC_PRIO_BITS};

/// Number of priority levels
pub const PRIORITY_LEVELS: u8 = 1 << NVIC_PRIO_BITS;

/// Value for the NVIC priority register: the level lives in the top `NVIC_PRIO_BITS` bits.
/// Levels above the lowest priority are clamped to it.
pub const fn priority_bits(level: u8) -> u8 {
    let level = if level >= PRIORITY_LEVELS {
        PRIORITY_LEVELS - 1
    } else {
        level
    };
    level << (8 - NVIC_PRIO_BITS)
}

/// Level encoded in an NVIC priority register value
pub const fn priority_level(bits: u8) -> u8 {
    bits >> (8 - NVIC_PRIO_BITS)
}

/// Unmasks `irq` in the NVIC
pub fn enable(irq: Interrupt) {
    // Handlers share state with the main thread only through critical sections, which don't
    // rely on NVIC masking on this single core part.
    unsafe { NVIC::unmask(irq) };
}

/// Masks `irq` in the NVIC
pub fn disable(irq: Interrupt) {
    NVIC::mask(irq);
}

pub fn is_enabled(irq: Interrupt) -> bool {
    NVIC::is_enabled(irq)
}

/// Forces `irq` into the pending state
pub fn pend(irq: Interrupt) {
    NVIC::pend(irq);
}

/// Clears the pending state of `irq`
pub fn unpend(irq: Interrupt) {
    NVIC::unpend(irq);
}

pub fn is_pending(irq: Interrupt) -> bool {
    NVIC::is_pending(irq)
}

/// Sets the priority level (0 to 3) of `irq`
pub fn set_priority(nvic: &mut NVIC, irq: Interrupt, level: u8) {
    // Priority changes can't break critical sections built on PRIMASK.
    unsafe { nvic.set_priority(irq, priority_bits(level)) };
}

/// Priority level (0 to 3) of `irq`
pub fn get_priority(irq: Interrupt) -> u8 {
    priority_level(NVIC::get_priority(irq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_use_the_top_two_bits() {
        assert_eq!(priority_bits(0), 0x00);
        assert_eq!(priority_bits(1), 0x40);
        assert_eq!(priority_bits(3), 0xC0);
        assert_eq!(priority_bits(9), 0xC0);
        assert_eq!(priority_level(0x80), 2);
    }
}
