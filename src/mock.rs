//! Host stand-ins for the IPC driver, environment and CPU.
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::cell::RefCell;
use std::vec::Vec;

use axerrno::{AxError, AxResult};
use spin::Mutex;

use crate::env::StaticEnv;
use crate::hal::{CpuOps, Environment, IpcPeripheral, IsrData};

#[derive(Default)]
pub struct MockIpc {
    pub init_error: Option<AxError>,
    pub signal_error: Option<AxError>,
    pub initialized: AtomicBool,
    pub uninit_calls: AtomicUsize,
    pub send_assign: Mutex<Option<(u8, u8)>>,
    pub receive_assign: Mutex<Option<(u8, u8)>>,
    pub rx_enabled: AtomicBool,
    pub rx_writes: AtomicUsize,
    pub busy_left: AtomicUsize,
    pub attempts: AtomicUsize,
    pub accepted: AtomicUsize,
    pub in_flight: AtomicBool,
    pub interleaved: AtomicBool,
}

impl MockIpc {
    pub fn busy_for(attempts: usize) -> Self {
        let ipc = Self::default();
        ipc.busy_left.store(attempts, Ordering::SeqCst);
        ipc
    }

    pub fn rx_enabled(&self) -> bool {
        self.rx_enabled.load(Ordering::SeqCst)
    }
}

impl IpcPeripheral for MockIpc {
    fn init(&self) -> AxResult {
        if let Some(err) = self.init_error {
            return Err(err);
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn uninit(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        self.uninit_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn assign_send_channel(&self, task: u8, channel: u8) {
        *self.send_assign.lock() = Some((task, channel));
    }

    fn assign_receive_channel(&self, event: u8, channel: u8) {
        *self.receive_assign.lock() = Some((event, channel));
    }

    fn signal(&self, _task: u8) -> AxResult {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.interleaved.store(true, Ordering::SeqCst);
        }
        // widen the window a concurrent writer would hit
        for _ in 0..64 {
            core::hint::spin_loop();
        }

        let result = if let Some(err) = self.signal_error {
            Err(err)
        } else if self
            .busy_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            Err(AxError::ResourceBusy)
        } else {
            self.accepted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    fn set_receive_enabled(&self, _event: u8, enabled: bool) {
        self.rx_writes.fetch_add(1, Ordering::SeqCst);
        self.rx_enabled.store(enabled, Ordering::SeqCst);
    }
}

std::thread_local! {
    static DISPATCHED: RefCell<Vec<(u32, IsrData)>> = const { RefCell::new(Vec::new()) };
}

pub fn record_dispatch(vector_id: u32, data: IsrData) {
    DISPATCHED.with(|d| d.borrow_mut().push((vector_id, data)));
}

/// Dispatches seen on the current test thread since the last call.
pub fn take_dispatched() -> Vec<(u32, IsrData)> {
    DISPATCHED.with(|d| core::mem::take(&mut *d.borrow_mut()))
}

pub struct MockEnv {
    pub inner: StaticEnv,
    pub fail_mutex: bool,
}

impl MockEnv {
    pub fn new() -> Self {
        Self {
            inner: StaticEnv::new(record_dispatch),
            fail_mutex: false,
        }
    }
}

impl Environment for MockEnv {
    type Mutex = Mutex<()>;

    fn create_mutex(&self) -> AxResult<Self::Mutex> {
        if self.fail_mutex {
            return Err(AxError::NoMemory);
        }
        self.inner.create_mutex()
    }

    fn register_isr(&self, vector_id: u32, data: IsrData) -> AxResult {
        self.inner.register_isr(vector_id, data)
    }

    fn unregister_isr(&self, vector_id: u32) -> AxResult {
        self.inner.unregister_isr(vector_id)
    }

    fn is_isr_registered(&self, vector_id: u32) -> bool {
        self.inner.is_isr_registered(vector_id)
    }

    fn isr(&self, vector_id: u32) {
        self.inner.isr(vector_id)
    }
}

#[derive(Default)]
pub struct MockCpu {
    pub masked: AtomicBool,
    pub critical_sections: AtomicUsize,
    pub in_isr: AtomicBool,
    pub delayed_us: AtomicUsize,
    pub delay_calls: AtomicUsize,
}

impl CpuOps for MockCpu {
    fn irq_save_disable(&self) -> usize {
        self.critical_sections.fetch_add(1, Ordering::SeqCst);
        self.masked.swap(true, Ordering::SeqCst) as usize
    }

    fn irq_restore(&self, flags: usize) {
        self.masked.store(flags != 0, Ordering::SeqCst);
    }

    fn in_isr(&self) -> bool {
        self.in_isr.load(Ordering::SeqCst)
    }

    fn delay_us(&self, us: u32) {
        self.delay_calls.fetch_add(1, Ordering::SeqCst);
        self.delayed_us.fetch_add(us as usize, Ordering::SeqCst);
    }
}
