use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Lifecycle of a channel.
///
/// `Disconnected -> Connecting -> Connected -> Halting -> Disconnected`.
/// A failed connect goes straight back to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
    Halting,
}

impl ChannelState {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelState::Disconnected => "disconnected",
            ChannelState::Connecting => "connecting",
            ChannelState::Connected => "connected",
            ChannelState::Halting => "halting",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cooperative stop flag that also wakes threads sleeping on it.
#[derive(Debug, Default)]
pub(crate) struct HaltSignal {
    halted: Mutex<bool>,
    wake: Condvar,
}

impl HaltSignal {
    pub(crate) fn set(&self) {
        *lock(&self.halted) = true;
        self.wake.notify_all();
    }

    pub(crate) fn clear(&self) {
        *lock(&self.halted) = false;
    }

    pub(crate) fn is_set(&self) -> bool {
        *lock(&self.halted)
    }

    /// Sleep for `timeout` unless halted first. Returns true if halted.
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        let guard = lock(&self.halted);
        let (guard, _) = self
            .wake
            .wait_timeout_while(guard, timeout, |halted| !*halted)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Lock a mutex, recovering the data if a handler panicked while holding it.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
