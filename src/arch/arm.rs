//! Cortex-M (ARMv7-M / ARMv8-M) CPU ops.
use core::arch::asm;
use core::sync::atomic::{Ordering, compiler_fence};

use crate::hal::CpuOps;

/// Bit 0 of PRIMASK: set while IRQs are masked.
const PRIMASK_PM: usize = 1;
/// Exception number field of IPSR.
const IPSR_EXCEPTION_MASK: usize = 0x1FF;

/// CPU ops for a Cortex-M core running at `cpu_mhz`.
pub struct CortexM {
    cpu_mhz: u32,
}

impl CortexM {
    pub const fn new(cpu_mhz: u32) -> Self {
        Self { cpu_mhz }
    }
}

impl CpuOps for CortexM {
    #[inline]
    fn irq_save_disable(&self) -> usize {
        let primask: usize;
        unsafe {
            asm!(
                "mrs {0}, primask",
                "cpsid i",
                out(reg) primask,
                options(nostack, preserves_flags)
            );
        }
        compiler_fence(Ordering::SeqCst);
        primask & PRIMASK_PM
    }

    #[inline]
    fn irq_restore(&self, flags: usize) {
        compiler_fence(Ordering::SeqCst);
        if flags & PRIMASK_PM == 0 {
            // IRQs were enabled before
            unsafe { asm!("cpsie i", options(nostack, preserves_flags)) };
        }
    }

    #[inline]
    fn in_isr(&self) -> bool {
        let ipsr: usize;
        unsafe { asm!("mrs {0}, ipsr", out(reg) ipsr, options(nomem, nostack, preserves_flags)) };
        ipsr & IPSR_EXCEPTION_MASK != 0
    }

    /// Not accurate: every iteration takes at least one cycle, so at least
    /// `us` microseconds have passed on return.
    fn delay_us(&self, us: u32) {
        let cycles = us.saturating_mul(self.cpu_mhz);
        for _ in 0..cycles {
            unsafe { asm!("nop", options(nomem, nostack, preserves_flags)) };
        }
    }
}
