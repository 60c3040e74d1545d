use axerrno::AxResult;
use log::{debug, trace};

use crate::hal::{CpuOps, Environment, IpcPeripheral, IsrData, MemoryOps};
use crate::platform::Platform;

impl<P, E, C, M> Platform<P, E, C, M>
where
    P: IpcPeripheral,
    E: Environment,
    C: CpuOps,
    M: MemoryOps,
{
    /// Registers a consumer of `vector_id` with context `data`.
    ///
    /// The handler is installed before the consumer is counted, so the line
    /// is never unmasked without somebody to dispatch to.
    pub fn init_interrupt(&self, vector_id: u32, data: IsrData) -> AxResult {
        self.env.register_isr(vector_id, data)?;

        let _lock = self.lock();
        self.gate.register(&self.cpu, &self.rx_line());
        debug!("init_interrupt: vector {}, {} consumer(s)", vector_id, self.gate.isr_count());
        Ok(())
    }

    /// Removes a consumer of `vector_id`; the last one out masks the line.
    ///
    /// `vector_id` must have been registered by `init_interrupt`.
    pub fn deinit_interrupt(&self, vector_id: u32) -> AxResult {
        platform_assert!(
            self.env.is_isr_registered(vector_id),
            "deinit_interrupt: no interrupt registered for vector {}",
            vector_id
        );
        {
            let _lock = self.lock();
            self.gate.deregister(&self.cpu, &self.rx_line());
            debug!("deinit_interrupt: vector {}, {} consumer(s)", vector_id, self.gate.isr_count());
        }
        self.env.unregister_isr(vector_id)
    }

    /// Entry point for the IPC peripheral interrupt.
    ///
    /// Runs in interrupt context. Only the bound receive event is forwarded,
    /// always to the vector fixed by this core's role.
    pub fn on_event(&self, event: u8) {
        if event != self.binding.receive_event {
            trace!("ipc event {} ignored", event);
            return;
        }
        self.env.isr(self.config.role.isr_vector());
    }
}
