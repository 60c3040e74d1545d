use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axerrno::{AxResult, ax_err};
use log::{debug, trace};

use crate::consts::MAX_ISR_VECTORS;
use crate::hal::{Environment, IsrData};

/// Messaging-stack entry point reached on dispatch.
pub type IsrHandler = fn(vector_id: u32, data: IsrData);

struct IsrSlot {
    installed: AtomicBool,
    data: AtomicUsize,
}

impl IsrSlot {
    const fn new() -> Self {
        Self {
            installed: AtomicBool::new(false),
            data: AtomicUsize::new(0),
        }
    }
}

/// Vector table mapping vector ids to their registered context.
///
/// Dispatch only reads atomics, so it is safe from interrupt context even
/// while a thread is registering another vector.
pub struct IsrTable<const N: usize = MAX_ISR_VECTORS> {
    handler: IsrHandler,
    slots: [IsrSlot; N],
}

impl<const N: usize> IsrTable<N> {
    pub const fn new(handler: IsrHandler) -> Self {
        Self {
            handler,
            slots: [const { IsrSlot::new() }; N],
        }
    }

    fn slot(&self, vector_id: u32) -> AxResult<&IsrSlot> {
        match self.slots.get(vector_id as usize) {
            Some(slot) => Ok(slot),
            None => ax_err!(InvalidInput, "ISR vector out of range"),
        }
    }

    pub fn register(&self, vector_id: u32, data: IsrData) -> AxResult {
        let slot = self.slot(vector_id)?;
        if slot.installed.load(Ordering::Acquire) {
            return ax_err!(AlreadyExists, "ISR vector already registered");
        }
        slot.data.store(data.0, Ordering::Relaxed);
        slot.installed.store(true, Ordering::Release);
        debug!("isr table: vector {} -> {:#x}", vector_id, data.0);
        Ok(())
    }

    pub fn unregister(&self, vector_id: u32) -> AxResult {
        let slot = self.slot(vector_id)?;
        if !slot.installed.swap(false, Ordering::AcqRel) {
            return ax_err!(NotFound, "ISR vector not registered");
        }
        slot.data.store(0, Ordering::Relaxed);
        debug!("isr table: vector {} removed", vector_id);
        Ok(())
    }

    pub fn is_registered(&self, vector_id: u32) -> bool {
        self.slots
            .get(vector_id as usize)
            .is_some_and(|slot| slot.installed.load(Ordering::Acquire))
    }

    /// Calls the handler if `vector_id` is registered. Returns whether it ran.
    pub fn dispatch(&self, vector_id: u32) -> bool {
        let Some(slot) = self.slots.get(vector_id as usize) else {
            return false;
        };
        if !slot.installed.load(Ordering::Acquire) {
            trace!("isr table: vector {} has no handler", vector_id);
            return false;
        }
        let data = IsrData(slot.data.load(Ordering::Relaxed));
        (self.handler)(vector_id, data);
        true
    }
}

/// Environment backed by an [`IsrTable`] and spin locks.
pub struct StaticEnv<const N: usize = MAX_ISR_VECTORS> {
    table: IsrTable<N>,
}

impl<const N: usize> StaticEnv<N> {
    pub const fn new(handler: IsrHandler) -> Self {
        Self {
            table: IsrTable::new(handler),
        }
    }

    pub fn table(&self) -> &IsrTable<N> {
        &self.table
    }
}

impl<const N: usize> Environment for StaticEnv<N> {
    type Mutex = spin::Mutex<()>;

    fn create_mutex(&self) -> AxResult<Self::Mutex> {
        Ok(spin::Mutex::new(()))
    }

    fn register_isr(&self, vector_id: u32, data: IsrData) -> AxResult {
        self.table.register(vector_id, data)
    }

    fn unregister_isr(&self, vector_id: u32) -> AxResult {
        self.table.unregister(vector_id)
    }

    fn is_isr_registered(&self, vector_id: u32) -> bool {
        self.table.is_registered(vector_id)
    }

    fn isr(&self, vector_id: u32) {
        self.table.dispatch(vector_id);
    }
}
