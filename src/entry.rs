//! Per-key single-flight state machine.
//!
//! ```text
//!              CAS (winner)            publish Ok + store Active
//!   Invalid ─────────────────► Loading ──────────────────────────► Active
//!                                 │
//!                                 │ discard, then publish Err
//!                                 ▼
//!                             (removed)
//! ```
//!
//! Exactly one caller wins the `Invalid → Loading` transition and runs the
//! loader. Everyone else blocks on the entry's [`Latch`] and reads the
//! published outcome. The outcome is written once, under the latch lock,
//! before the latch fires; a successful outcome is also followed by a release
//! store of `Active` so the lock-free fast path sees a fully published value.
//!
//! A failed entry keeps its `Loading` status forever. The façade removes it
//! from the container before the error is published, so no new caller can
//! reach it; callers already holding it read the error.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::ds::Latch;
use crate::error::LoadError;

/// Published result of a load.
pub(crate) type Outcome<V, E> = Result<Arc<V>, LoadError<E>>;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Invalid = 0,
    Loading = 1,
    Active = 2,
}

impl Status {
    #[inline]
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Invalid,
            1 => Self::Loading,
            _ => Self::Active,
        }
    }
}

pub(crate) struct Entry<V, E> {
    status: AtomicU8,
    outcome: OnceLock<Outcome<V, E>>,
    latch: Latch,
}

impl<V, E> Entry<V, E> {
    pub(crate) fn new() -> Self {
        Self {
            status: AtomicU8::new(Status::Invalid as u8),
            outcome: OnceLock::new(),
            latch: Latch::new(),
        }
    }

    #[inline]
    pub(crate) fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Returns the entry's value, running `load` first if nobody has.
    ///
    /// `discard` is called by the loading caller on failure, before the error
    /// becomes visible to waiters. It must unlink this entry from whatever
    /// container holds it.
    pub(crate) fn get_or_load<K, L, D>(&self, key: &K, load: L, discard: D) -> Outcome<V, E>
    where
        K: Debug,
        L: FnOnce(&K) -> Result<Option<V>, E>,
        D: FnOnce(),
    {
        if self.status() == Status::Invalid && self.claim() {
            return self.load(key, load, discard);
        }
        self.settled()
    }

    /// Value of an `Active` entry, read under the latch lock so it cannot
    /// interleave with publication.
    pub(crate) fn active_value(&self) -> Option<Arc<V>> {
        self.latch.synchronize(|_| self.value())
    }

    /// Value of an `Active` entry; `None` while loading or after a failure.
    pub(crate) fn value(&self) -> Option<Arc<V>> {
        if self.status() != Status::Active {
            return None;
        }
        match self.outcome.get() {
            Some(Ok(value)) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    fn claim(&self) -> bool {
        self.status
            .compare_exchange(
                Status::Invalid as u8,
                Status::Loading as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn settled(&self) -> Outcome<V, E> {
        loop {
            if let Some(outcome) = self.outcome.get() {
                return outcome.clone();
            }
            self.latch.wait();
        }
    }

    fn load<K, L, D>(&self, key: &K, load: L, discard: D) -> Outcome<V, E>
    where
        K: Debug,
        L: FnOnce(&K) -> Result<Option<V>, E>,
        D: FnOnce(),
    {
        debug!(?key, "loading value");
        let mut guard = UnwindGuard {
            entry: self,
            key,
            discard: Some(discard),
        };

        let loaded = load(key);

        let discard = guard.discard.take();

        match loaded {
            Ok(Some(value)) => {
                let value = Arc::new(value);
                self.publish(Ok(Arc::clone(&value)));
                debug!(?key, "value loaded");
                Ok(value)
            },
            Ok(None) => {
                warn!(?key, "loader returned no value");
                self.fail(
                    LoadError::Absent {
                        key: format!("{key:?}"),
                    },
                    discard,
                )
            },
            Err(source) => {
                warn!(?key, "loader failed");
                self.fail(
                    LoadError::Loader {
                        key: format!("{key:?}"),
                        source: Arc::new(source),
                    },
                    discard,
                )
            },
        }
    }

    fn fail(&self, err: LoadError<E>, discard: Option<impl FnOnce()>) -> Outcome<V, E> {
        if let Some(discard) = discard {
            discard();
        }
        self.publish(Err(err.clone()));
        Err(err)
    }

    fn publish(&self, outcome: Outcome<V, E>) {
        let active = outcome.is_ok();
        self.latch.fire_with(|| {
            if self.outcome.set(outcome).is_ok() && active {
                self.status.store(Status::Active as u8, Ordering::Release);
            }
        });
    }
}

impl<V, E> Debug for Entry<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("status", &self.status())
            .field("settled", &self.latch.is_fired())
            .finish()
    }
}

/// Releases waiters if the loader unwinds.
struct UnwindGuard<'a, K: Debug, V, E, D: FnOnce()> {
    entry: &'a Entry<V, E>,
    key: &'a K,
    discard: Option<D>,
}

impl<K: Debug, V, E, D: FnOnce()> Drop for UnwindGuard<'_, K, V, E, D> {
    fn drop(&mut self) {
        if let Some(discard) = self.discard.take() {
            warn!(key = ?self.key, "loader panicked");
            discard();
            self.entry.publish(Err(LoadError::Panicked {
                key: format!("{:?}", self.key),
            }));
        }
    }
}
