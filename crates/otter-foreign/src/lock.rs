//! The interpreter lock
//!
//! Foreign objects may only be touched while the current thread holds the
//! interpreter lock. The lock is reentrant: a trap that converts a nested
//! mapping may take it again on the same thread.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

static INTERPRETER: ReentrantMutex<()> = parking_lot::const_reentrant_mutex(());

/// Proof that the current thread holds the interpreter lock
pub type InterpreterGuard = ReentrantMutexGuard<'static, ()>;

/// Acquire the interpreter lock, blocking while another thread holds it
pub fn lock() -> InterpreterGuard {
    INTERPRETER.lock()
}

/// Whether any thread holds the interpreter lock
pub fn is_locked() -> bool {
    INTERPRETER.is_locked()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_reentrant() {
        let outer = lock();
        let inner = lock();
        assert!(is_locked());
        drop(inner);
        assert!(is_locked());
        drop(outer);
    }
}
