use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::trace;

use crate::hal::{CpuOps, IpcPeripheral, IrqSaveGuard};

/// The receive event line of the IPC peripheral.
pub struct RxLine<'a, P: IpcPeripheral> {
    pub peripheral: &'a P,
    pub event: u8,
}

impl<P: IpcPeripheral> RxLine<'_, P> {
    fn set(&self, enabled: bool) {
        trace!("rx event {} -> {}", self.event, if enabled { "on" } else { "off" });
        self.peripheral.set_receive_enabled(self.event, enabled);
    }
}

/// Disable and ISR counters shared by every virtqueue on the one receive line.
///
/// Both counters are only touched with the global interrupt mask held, so a
/// counter update and the matching register write look atomic to the ISR.
/// The receive event is unmasked iff the peripheral is live, at least one
/// consumer is registered and nobody holds a disable.
pub struct IrqGate {
    disable_count: AtomicUsize,
    isr_count: AtomicUsize,
    live: AtomicBool,
}

impl IrqGate {
    pub const fn new() -> Self {
        Self {
            disable_count: AtomicUsize::new(0),
            isr_count: AtomicUsize::new(0),
            live: AtomicBool::new(false),
        }
    }

    pub fn disable_count(&self) -> usize {
        self.disable_count.load(Ordering::Acquire)
    }

    pub fn isr_count(&self) -> usize {
        self.isr_count.load(Ordering::Acquire)
    }

    /// Marks whether the peripheral may be touched at all.
    pub fn set_live<C: CpuOps>(&self, cpu: &C, live: bool) {
        let _guard = IrqSaveGuard::new(cpu);
        self.live.store(live, Ordering::Release);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub fn enable<C: CpuOps, P: IpcPeripheral>(&self, cpu: &C, line: &RxLine<'_, P>) {
        let _guard = IrqSaveGuard::new(cpu);
        let count = self.disable_count.load(Ordering::Acquire);
        platform_assert!(count > 0, "interrupt_enable: no matching interrupt_disable");
        let count = count - 1;
        self.disable_count.store(count, Ordering::Release);
        trace!("interrupt gate: disable count {}", count);

        if count == 0 && self.is_live() && self.isr_count() > 0 {
            line.set(true);
        }
    }

    pub fn disable<C: CpuOps, P: IpcPeripheral>(&self, cpu: &C, line: &RxLine<'_, P>) {
        let _guard = IrqSaveGuard::new(cpu);
        let count = self.disable_count.load(Ordering::Acquire);
        // virtqueues share the receive line; a non-zero count means it is already masked
        if count == 0 && self.is_live() {
            line.set(false);
        }
        self.disable_count.store(count + 1, Ordering::Release);
        trace!("interrupt gate: disable count {}", count + 1);
    }

    /// Counts a new consumer, unmasking the line for the first one.
    pub fn register<C: CpuOps, P: IpcPeripheral>(&self, cpu: &C, line: &RxLine<'_, P>) {
        let _guard = IrqSaveGuard::new(cpu);
        let count = self.isr_count.load(Ordering::Acquire);
        self.isr_count.store(count + 1, Ordering::Release);

        if count == 0 && self.is_live() && self.disable_count() == 0 {
            line.set(true);
        }
    }

    /// Drops a consumer, masking the line once the last one is gone.
    pub fn deregister<C: CpuOps, P: IpcPeripheral>(&self, cpu: &C, line: &RxLine<'_, P>) {
        let _guard = IrqSaveGuard::new(cpu);
        let count = self.isr_count.load(Ordering::Acquire);
        platform_assert!(count > 0, "deinit_interrupt: no interrupt registered");
        let count = count - 1;
        self.isr_count.store(count, Ordering::Release);

        if count == 0 && self.is_live() {
            line.set(false);
        }
    }
}

impl Default for IrqGate {
    fn default() -> Self {
        Self::new()
    }
}
