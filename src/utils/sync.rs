//! Lock helper shared by the cache and the source pool

use std::sync::{Mutex, MutexGuard};

/// Locks `mutex`, recovering the data if a holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
