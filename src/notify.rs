use axerrno::{AxError, AxResult};
use log::{trace, warn};

use crate::hal::IpcPeripheral;

/// How long `notify` keeps retrying a busy peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyPolicy {
    /// Spin until the peripheral accepts the signal.
    #[default]
    Unbounded,
    /// Give up with `ResourceBusy` after this many busy attempts.
    ///
    /// At least one attempt is always made, so `Bounded(0)` acts as `Bounded(1)`.
    Bounded(usize),
}

fn is_transient(err: AxError) -> bool {
    matches!(err, AxError::ResourceBusy | AxError::WouldBlock)
}

/// Triggers `task` until the peripheral takes it, returning the number of
/// attempts made.
///
/// The caller holds the platform lock, so signals from different threads
/// never interleave.
pub(crate) fn signal<P: IpcPeripheral>(
    peripheral: &P,
    task: u8,
    policy: NotifyPolicy,
) -> AxResult<usize> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match peripheral.signal(task) {
            Ok(()) => {
                trace!("notify: task {} accepted after {} attempt(s)", task, attempts);
                return Ok(attempts);
            }
            Err(err) if is_transient(err) => {
                if let NotifyPolicy::Bounded(limit) = policy {
                    if attempts >= limit.max(1) {
                        warn!("notify: task {} still busy after {} attempts", task, attempts);
                        return Err(AxError::ResourceBusy);
                    }
                }
                core::hint::spin_loop();
            }
            Err(err) => return Err(err),
        }
    }
}
