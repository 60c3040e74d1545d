//! Interfaces of the collaborators this layer sits on top of.
//!
//! None of these are implemented for real hardware here except the Cortex-M
//! CPU ops in [`crate::arch`]; a board crate supplies the IPC driver and,
//! optionally, its own environment.

use axerrno::AxResult;
use memory_addr::{PhysAddr, VirtAddr};

/// Opaque context handed back to the messaging stack on dispatch.
///
/// Usually the address of a virtqueue; this layer never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsrData(pub usize);

/// Vendor driver for the inter-processor signalling peripheral.
pub trait IpcPeripheral: Sync {
    /// Brings the peripheral up.
    fn init(&self) -> AxResult;

    fn uninit(&self);

    /// Routes send task `task` to IPC channel `channel`.
    fn assign_send_channel(&self, task: u8, channel: u8);

    /// Routes IPC channel `channel` to receive event `event`.
    fn assign_receive_channel(&self, event: u8, channel: u8);

    /// Triggers send task `task`, signalling the remote core.
    ///
    /// `ResourceBusy` or `WouldBlock` mean the previous signal has not
    /// drained yet and the call may be repeated.
    fn signal(&self, task: u8) -> AxResult;

    /// Masks or unmasks the interrupt of receive event `event`.
    fn set_receive_enabled(&self, event: u8, enabled: bool);
}

/// Mutex supplied by the environment layer.
pub trait PlatformMutex: Send + Sync {
    type Guard<'a>
    where
        Self: 'a;

    fn lock(&self) -> Self::Guard<'_>;
}

impl PlatformMutex for spin::Mutex<()> {
    type Guard<'a> = spin::MutexGuard<'a, ()>;

    fn lock(&self) -> Self::Guard<'_> {
        spin::Mutex::lock(self)
    }
}

/// Environment layer of the messaging stack: locks and the ISR table.
pub trait Environment: Sync {
    type Mutex: PlatformMutex;

    fn create_mutex(&self) -> AxResult<Self::Mutex>;

    /// Installs `data` as the context dispatched for `vector_id`.
    fn register_isr(&self, vector_id: u32, data: IsrData) -> AxResult;

    fn unregister_isr(&self, vector_id: u32) -> AxResult;

    fn is_isr_registered(&self, vector_id: u32) -> bool;

    /// Dispatches `vector_id` to the messaging stack. Called in interrupt
    /// context and must not block.
    fn isr(&self, vector_id: u32);
}

/// CPU-level operations: the global interrupt mask, ISR detection and delay.
pub trait CpuOps: Sync {
    /// Disables interrupts on the local CPU, returning the previous state.
    fn irq_save_disable(&self) -> usize;

    /// Restores the state returned by [`CpuOps::irq_save_disable`].
    fn irq_restore(&self, flags: usize);

    fn in_isr(&self) -> bool;

    /// Spins for at least `us` microseconds.
    fn delay_us(&self, us: u32);
}

/// Address translation and cache maintenance for the shared memory.
///
/// The defaults fit cores that see shared memory at the same address and have
/// no cache in between. Platforms with real coherency requirements override
/// these.
pub trait MemoryOps: Sync {
    fn map_mem_region(&self, _va: VirtAddr, _pa: PhysAddr, _size: usize, _flags: u32) {}

    fn cache_all_flush_invalidate(&self) {}

    fn cache_disable(&self) {}

    fn virtual_to_physical(&self, va: VirtAddr) -> PhysAddr {
        PhysAddr::from(va.as_usize())
    }

    fn physical_to_virtual(&self, pa: PhysAddr) -> VirtAddr {
        VirtAddr::from(pa.as_usize())
    }
}

/// Flat address space, no cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityMemory;

impl MemoryOps for IdentityMemory {}

/// Global interrupt mask held for the guard's lifetime.
pub struct IrqSaveGuard<'a, C: CpuOps + ?Sized> {
    cpu: &'a C,
    flags: usize,
}

impl<'a, C: CpuOps + ?Sized> IrqSaveGuard<'a, C> {
    pub fn new(cpu: &'a C) -> Self {
        let flags = cpu.irq_save_disable();
        Self { cpu, flags }
    }
}

impl<C: CpuOps + ?Sized> Drop for IrqSaveGuard<'_, C> {
    fn drop(&mut self) {
        self.cpu.irq_restore(self.flags);
    }
}
