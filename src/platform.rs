use axerrno::AxResult;
use log::{debug, info, warn};
use memory_addr::{PhysAddr, VirtAddr};

use crate::consts::{
    APP_ISR_VECTOR, APP_TX_CHANNEL, DELAY_STEP_US, RECEIVE_EVENT_INDEX, REMOTE_ISR_VECTOR,
    REMOTE_TX_CHANNEL, SEND_TASK_INDEX,
};
use crate::gate::{IrqGate, RxLine};
use crate::hal::{
    CpuOps, Environment, IdentityMemory, IpcPeripheral, IrqSaveGuard, MemoryOps, PlatformMutex,
};
use crate::notify::{self, NotifyPolicy};

/// Which side of the link this core is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreRole {
    Application,
    /// The companion (network) core.
    Remote,
}

impl CoreRole {
    /// ISR table vector dispatched on a receive event.
    pub const fn isr_vector(self) -> u32 {
        match self {
            Self::Application => APP_ISR_VECTOR,
            Self::Remote => REMOTE_ISR_VECTOR,
        }
    }

    pub const fn binding(self) -> ChannelBinding {
        let (send_channel, receive_channel) = match self {
            Self::Application => (APP_TX_CHANNEL, REMOTE_TX_CHANNEL),
            Self::Remote => (REMOTE_TX_CHANNEL, APP_TX_CHANNEL),
        };
        ChannelBinding {
            send_task: SEND_TASK_INDEX,
            send_channel,
            receive_event: RECEIVE_EVENT_INDEX,
            receive_channel,
        }
    }
}

/// Peripheral task/event indices and the IPC channels they are routed to.
///
/// One core's send channel is the other core's receive channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBinding {
    pub send_task: u8,
    pub send_channel: u8,
    pub receive_event: u8,
    pub receive_channel: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformConfig {
    pub role: CoreRole,
    pub notify_policy: NotifyPolicy,
}

impl PlatformConfig {
    pub const fn new(role: CoreRole) -> Self {
        Self {
            role,
            notify_policy: NotifyPolicy::Unbounded,
        }
    }

    pub const fn with_notify_policy(mut self, policy: NotifyPolicy) -> Self {
        self.notify_policy = policy;
        self
    }
}

/// Per-core platform binding of the messaging transport.
///
/// `init` and `deinit` take `&mut self`; everything in between works on a
/// shared reference, from any thread, and `on_event` from the IPC interrupt.
pub struct Platform<P, E, C, M = IdentityMemory>
where
    P: IpcPeripheral,
    E: Environment,
    C: CpuOps,
    M: MemoryOps,
{
    pub(crate) config: PlatformConfig,
    pub(crate) binding: ChannelBinding,
    pub(crate) peripheral: P,
    pub(crate) env: E,
    pub(crate) cpu: C,
    memory: M,
    lock: Option<E::Mutex>,
    pub(crate) gate: IrqGate,
}

impl<P, E, C> Platform<P, E, C>
where
    P: IpcPeripheral,
    E: Environment,
    C: CpuOps,
{
    pub fn new(config: PlatformConfig, peripheral: P, env: E, cpu: C) -> Self {
        Self::with_memory(config, peripheral, env, cpu, IdentityMemory)
    }
}

impl<P, E, C, M> Platform<P, E, C, M>
where
    P: IpcPeripheral,
    E: Environment,
    C: CpuOps,
    M: MemoryOps,
{
    pub fn with_memory(config: PlatformConfig, peripheral: P, env: E, cpu: C, memory: M) -> Self {
        Self {
            binding: config.role.binding(),
            config,
            peripheral,
            env,
            cpu,
            memory,
            lock: None,
            gate: IrqGate::new(),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn binding(&self) -> ChannelBinding {
        self.binding
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn is_initialized(&self) -> bool {
        self.lock.is_some()
    }

    /// Outstanding `interrupt_disable` calls.
    pub fn disable_count(&self) -> usize {
        self.gate.disable_count()
    }

    /// Consumers registered through `init_interrupt`.
    pub fn isr_count(&self) -> usize {
        self.gate.isr_count()
    }

    pub(crate) fn rx_line(&self) -> RxLine<'_, P> {
        RxLine {
            peripheral: &self.peripheral,
            event: self.binding.receive_event,
        }
    }

    pub(crate) fn lock(&self) -> <E::Mutex as PlatformMutex>::Guard<'_> {
        match &self.lock {
            Some(lock) => lock.lock(),
            None => fatal!("platform used before init or after deinit"),
        }
    }

    /// Brings up the IPC peripheral and routes this core's channels.
    ///
    /// The receive event stays masked until the first `init_interrupt`. On
    /// error the peripheral is left as the driver left it.
    pub fn init(&mut self) -> AxResult {
        platform_assert!(self.lock.is_none(), "platform_init called twice");

        self.peripheral.init()?;

        let b = self.binding;
        self.peripheral.assign_send_channel(b.send_task, b.send_channel);
        self.peripheral.assign_receive_channel(b.receive_event, b.receive_channel);
        self.peripheral.set_receive_enabled(b.receive_event, false);
        info!(
            "platform init: {:?} core, tx channel {}, rx channel {}",
            self.config.role, b.send_channel, b.receive_channel
        );

        self.lock = Some(self.env.create_mutex()?);
        self.gate.set_live(&self.cpu, true);
        Ok(())
    }

    /// Shuts the peripheral down and deletes the platform lock.
    ///
    /// Every `init_interrupt` must have been undone by now.
    pub fn deinit(&mut self) -> AxResult {
        platform_assert!(self.lock.is_some(), "platform_deinit without platform_init");
        if self.gate.isr_count() != 0 {
            warn!("platform deinit with {} interrupt(s) still registered", self.gate.isr_count());
        }

        self.gate.set_live(&self.cpu, false);
        self.peripheral.uninit();
        self.lock = None;
        info!("platform deinit");
        Ok(())
    }

    /// Signals the remote core that new data is available.
    ///
    /// Thread context only. Busy peripherals are retried per the configured
    /// [`NotifyPolicy`].
    pub fn notify(&self, vector_id: u32) -> AxResult {
        let _lock = self.lock();
        let attempts = notify::signal(
            &self.peripheral,
            self.binding.send_task,
            self.config.notify_policy,
        )?;
        debug!("notify vector {} ({} attempt(s))", vector_id, attempts);
        Ok(())
    }

    /// Unmasks the receive event once every disable has been paired.
    ///
    /// Returns `vector_id` unchanged; it carries no status.
    pub fn interrupt_enable(&self, vector_id: u32) -> u32 {
        self.gate.enable(&self.cpu, &self.rx_line());
        vector_id
    }

    /// Masks the receive event. Must be paired with one later
    /// [`Platform::interrupt_enable`].
    pub fn interrupt_disable(&self, vector_id: u32) -> u32 {
        self.gate.disable(&self.cpu, &self.rx_line());
        vector_id
    }

    pub fn in_isr(&self) -> bool {
        self.cpu.in_isr()
    }

    /// Busy-waits for at least `ms` milliseconds.
    pub fn time_delay(&self, ms: u32) {
        for _ in 0..ms {
            self.cpu.delay_us(DELAY_STEP_US);
        }
    }

    /// Masks all interrupts on this core until the guard is dropped.
    pub fn global_isr_guard(&self) -> IrqSaveGuard<'_, C> {
        IrqSaveGuard::new(&self.cpu)
    }

    pub fn map_mem_region(&self, va: VirtAddr, pa: PhysAddr, size: usize, flags: u32) {
        self.memory.map_mem_region(va, pa, size, flags)
    }

    pub fn cache_all_flush_invalidate(&self) {
        self.memory.cache_all_flush_invalidate()
    }

    pub fn cache_disable(&self) {
        self.memory.cache_disable()
    }

    pub fn virtual_to_physical(&self, va: VirtAddr) -> PhysAddr {
        self.memory.virtual_to_physical(va)
    }

    pub fn physical_to_virtual(&self, pa: PhysAddr) -> VirtAddr {
        self.memory.physical_to_virtual(pa)
    }
}
