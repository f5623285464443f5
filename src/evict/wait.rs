//! Sleeping and operator interruption during the takeover wait
//!
//! The wait is a plain blocking sleep. Interruption is cooperative: while
//! a snippet is held disabled, SIGINT/SIGTERM only set a flag that the
//! wait loop checks around every sleep. Outside that window the default
//! signal action applies and terminates the process.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::SigId;

/// Blocking sleep
pub trait Sleeper: fmt::Debug {
    fn sleep(&self, duration: Duration);
}

/// `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Source of operator interruption
pub trait Interrupt: fmt::Debug {
    /// Whether an interruption arrived since the last `clear`
    fn is_interrupted(&self) -> bool;

    /// Forget any earlier interruption
    fn clear(&self);

    /// Catch operator interruption until the returned registration drops
    fn catch(&self) -> io::Result<SignalRegistration>;
}

/// Interrupt flag, optionally fed by process signals
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag by hand
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Route SIGINT and SIGTERM into this flag until the guard is dropped
    pub fn install_signals(&self) -> io::Result<SignalRegistration> {
        let mut ids = Vec::with_capacity(2);
        for signal in [SIGINT, SIGTERM] {
            ids.push(signal_hook::flag::register(signal, Arc::clone(&self.0))?);
        }
        Ok(SignalRegistration { ids })
    }
}

impl Interrupt for InterruptFlag {
    fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    fn catch(&self) -> io::Result<SignalRegistration> {
        self.install_signals()
    }
}

/// Restores default signal handling on drop
#[derive(Debug)]
pub struct SignalRegistration {
    ids: Vec<SigId>,
}

impl Drop for SignalRegistration {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_raise_and_clear() {
        let flag = InterruptFlag::new();
        assert!(!flag.is_interrupted());
        flag.raise();
        assert!(flag.is_interrupted());
        flag.clear();
        assert!(!flag.is_interrupted());
    }

    #[test]
    fn test_catch_keeps_pending_interrupt() {
        let flag = InterruptFlag::new();
        flag.raise();
        let registration = flag.catch().unwrap();
        assert!(flag.is_interrupted());
        drop(registration);
        assert!(flag.is_interrupted());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = InterruptFlag::new();
        let other = flag.clone();
        other.raise();
        assert!(flag.is_interrupted());
    }
}
