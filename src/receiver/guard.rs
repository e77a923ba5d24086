use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{ReceiverError, Result};

/// Per-receiver exclusive flag held for the duration of a settlement.
///
/// The hook's balance-delta accounting assumes no other settlement mutates
/// custody between its before and after snapshots, so a nested entry (for
/// example a swap venue calling back into the receiver) is refused.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the flag, returning a token that releases it on drop.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::Reentrancy`] if the flag is already held.
    pub fn enter(&self) -> Result<Entered<'_>> {
        self.entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| ReceiverError::Reentrancy)?;
        Ok(Entered { guard: self })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

/// Proof that the guard is held
#[derive(Debug)]
#[must_use = "the guard is released as soon as this is dropped"]
pub struct Entered<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}
