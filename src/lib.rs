#![no_std]

#[cfg(test)]
extern crate std;

/// Reports a broken caller contract and stops.
macro_rules! fatal {
    ($($arg:tt)+) => {{
        log::error!($($arg)+);
        panic!($($arg)+)
    }};
}

macro_rules! platform_assert {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            fatal!($($arg)+);
        }
    };
}

pub mod arch;
pub mod consts;
pub mod env;
mod gate;
pub mod hal;
mod isr;
mod notify;
pub mod platform;

#[cfg(test)]
mod mock;

pub use env::{IsrHandler, IsrTable, StaticEnv};
pub use hal::{
    CpuOps, Environment, IdentityMemory, IpcPeripheral, IrqSaveGuard, IsrData, MemoryOps,
    PlatformMutex,
};
pub use notify::NotifyPolicy;
pub use platform::{ChannelBinding, CoreRole, Platform, PlatformConfig};
