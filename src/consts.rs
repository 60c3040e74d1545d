/// IPC channel the application core transmits on (and the companion core receives on).
pub const APP_TX_CHANNEL: u8 = 0;
/// IPC channel the companion core transmits on (and the application core receives on).
pub const REMOTE_TX_CHANNEL: u8 = 1;

/// Both cores use task 0 / event 0 of their own IPC peripheral.
pub const SEND_TASK_INDEX: u8 = 0;
pub const RECEIVE_EVENT_INDEX: u8 = 0;

/// ISR table slot dispatched when the application core gets a receive event.
pub const APP_ISR_VECTOR: u32 = 0;
/// ISR table slot dispatched when the companion core gets a receive event.
pub const REMOTE_ISR_VECTOR: u32 = 1;

/// Slots in the default environment ISR table.
pub const MAX_ISR_VECTORS: usize = 8;

/// One `time_delay` step, in microseconds.
pub const DELAY_STEP_US: u32 = 1000;

pub const LINK_ID: u32 = 0;
pub const HIGHEST_CORE_ID: u32 = 0;

/// Linux requires 4K alignment for the vrings.
pub const VRING_ALIGN: usize = 0x1000;
/// Descriptor pool plus both rings.
pub const VRING_SIZE: usize = 0x8000;
pub const VRING_OVERHEAD: usize = 2 * VRING_SIZE;

/// Builds a virtqueue vector id from a core id and a queue index.
pub const fn vq_id(core_id: u32, queue_id: u32) -> u32 {
    (queue_id & 0x1) | ((core_id << 2) & 0xFFFF_FFFE)
}

pub const fn core_id(vq_id: u32) -> u32 {
    (vq_id & 0xFFFF_FFFE) >> 2
}

pub const fn queue_id(vq_id: u32) -> u32 {
    vq_id & 0x1
}
