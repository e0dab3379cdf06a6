use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// Mutual exclusion for writers of one connection string.
///
/// Unlike a `MutexGuard`, the token returned by [`WriterLock::acquire`]
/// owns its lock and can be held across calls into the provider.
#[derive(Debug, Default)]
pub struct WriterLock {
    locked: Mutex<bool>,
    released: Condvar,
}

/// Held while writing; releases the lock when dropped.
#[derive(Debug)]
#[must_use]
pub struct LockToken {
    lock: Option<Arc<WriterLock>>,
}

impl WriterLock {
    pub fn new() -> WriterLock {
        WriterLock::default()
    }

    /// Blocks until the lock is free, then takes it.
    pub fn acquire(self: &Arc<Self>) -> LockToken {
        let mut locked = self.locked.lock().unwrap_or_else(PoisonError::into_inner);

        while *locked {
            locked = self
                .released
                .wait(locked)
                .unwrap_or_else(PoisonError::into_inner);
        }

        *locked = true;

        LockToken {
            lock: Some(self.clone()),
        }
    }

    pub fn is_locked(&self) -> bool {
        *self.locked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        *self.locked.lock().unwrap_or_else(PoisonError::into_inner) = false;
        self.released.notify_one();
    }
}

impl LockToken {
    /// A token for backends that allow concurrent writers.
    pub fn none() -> LockToken {
        LockToken { lock: None }
    }

    pub fn is_held(&self) -> bool {
        self.lock.is_some()
    }
}

impl Drop for LockToken {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            lock.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::atomic::AtomicUsize, sync::atomic::Ordering, thread};

    #[test]
    fn released_on_drop() {
        let lock = Arc::new(WriterLock::new());

        let token = lock.acquire();
        assert!(token.is_held());
        assert!(lock.is_locked());

        drop(token);
        assert!(!lock.is_locked());
    }

    #[test]
    fn writers_are_serialized() {
        let lock = Arc::new(WriterLock::new());
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = lock.clone();
                let inside = inside.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let _token = lock.acquire();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
