//! One-shot broadcast latch.
//!
//! A [`Latch`] starts closed and is fired at most once. Every thread blocked
//! in [`Latch::wait`] is released when it fires, and later waiters return
//! immediately. Whatever the firing closure writes happens-before the return
//! of every `wait`.
//!
//! ```text
//!   waiter A ──wait()──┐
//!   waiter B ──wait()──┤      fire_with(|| publish)
//!                      ▼             │
//!              ┌───────────────┐     │
//!              │ Mutex<bool>   │◄────┘  publish runs under the lock,
//!              │ Condvar       │        then fired = true, notify_all
//!              └───────────────┘
//! ```
use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
pub struct Latch {
    fired: Mutex<bool>,
    cond: Condvar,
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fired(&self) -> bool {
        *self.fired.lock()
    }

    /// Runs `publish` under the latch lock and fires the latch.
    ///
    /// Returns `None` without running `publish` if the latch already fired.
    pub fn fire_with<R>(&self, publish: impl FnOnce() -> R) -> Option<R> {
        let mut fired = self.fired.lock();
        if *fired {
            return None;
        }
        let result = publish();
        *fired = true;
        drop(fired);
        self.cond.notify_all();
        Some(result)
    }

    /// Blocks until the latch fires.
    pub fn wait(&self) {
        let mut fired = self.fired.lock();
        while !*fired {
            self.cond.wait(&mut fired);
        }
    }

    /// Runs `f` while holding the latch lock, so it cannot interleave with a
    /// concurrent [`fire_with`](Self::fire_with).
    pub fn synchronize<R>(&self, f: impl FnOnce(bool) -> R) -> R {
        let fired = self.fired.lock();
        f(*fired)
    }
}
