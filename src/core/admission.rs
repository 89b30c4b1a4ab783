//! # Admission controller: a replaceable counting permit pool.
//!
//! Every command execution holds one [`Permit`] while it talks to the
//! collaborators. The pool size is the current concurrency ceiling.
//!
//! ## Reconfiguration
//! ```text
//! reconfigure(n):
//!   n < 1  → Err(InvalidCeiling), pool and ceiling untouched
//!   n >= 1 → write-lock ─► pool := Pool::new(n) ─► ceiling := n
//!
//! acquire():
//!   read-lock ─► clone Arc<Semaphore> ─► unlock ─► acquire_owned().await
//! ```
//!
//! ## Rules
//! - The pool is **replaced**, never resized. A permit keeps an `Arc` to the
//!   semaphore that issued it, so release always goes back to that pool.
//! - Retired pools are dropped once their last permit is released.
//! - Any `acquire()` that starts after `reconfigure()` returns sees the new pool.
//!   Acquires already waiting on a retired pool keep waiting on it.
//! - The ceiling is a target for new admissions, not an instantaneous global
//!   cap: after a downsize, holders from the old pool may briefly exceed it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore};

use crate::error::ShellError;

/// Largest ceiling a pool can be built with.
pub const MAX_CEILING: usize = Semaphore::MAX_PERMITS;

/// One generation of the permit pool.
struct Pool {
    sem: Arc<Semaphore>,
    size: usize,
}

impl Pool {
    fn new(size: usize) -> Self {
        Self {
            sem: Arc::new(Semaphore::new(size)),
            size,
        }
    }
}

/// Admission capacity held by one executing command.
///
/// Released on drop, on every exit path.
#[derive(Debug)]
pub struct Permit {
    _inner: OwnedSemaphorePermit,
    pool_size: usize,
}

impl Permit {
    /// Size of the pool this permit was issued from.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }
}

/// Counting permit pool with a runtime-replaceable capacity.
pub struct Admission {
    pool: RwLock<Pool>,
    ceiling: AtomicUsize,
}

impl Admission {
    /// Creates a controller with `ceiling` permits, clamped to `1..=MAX_CEILING`.
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.clamp(1, MAX_CEILING);
        Self {
            pool: RwLock::new(Pool::new(ceiling)),
            ceiling: AtomicUsize::new(ceiling),
        }
    }

    /// Returns the published concurrency ceiling.
    pub fn ceiling(&self) -> usize {
        self.ceiling.load(Ordering::Acquire)
    }

    /// Free permits in the current pool.
    pub async fn available(&self) -> usize {
        self.pool.read().await.sem.available_permits()
    }

    /// Waits for a permit from the current pool.
    ///
    /// The read lock is released before waiting, so a saturated pool never
    /// blocks `reconfigure`.
    pub async fn acquire(&self) -> Result<Permit, ShellError> {
        let (sem, pool_size) = {
            let pool = self.pool.read().await;
            (Arc::clone(&pool.sem), pool.size)
        };
        let inner = sem
            .acquire_owned()
            .await
            .map_err(|_closed| ShellError::AdmissionClosed)?;
        Ok(Permit {
            _inner: inner,
            pool_size,
        })
    }

    /// Replaces the pool with a fresh one of `ceiling` permits.
    ///
    /// Returns the previous ceiling. Fails with [`ShellError::InvalidCeiling`]
    /// when `ceiling` is outside `1..=MAX_CEILING`, leaving the pool untouched.
    pub async fn reconfigure(&self, ceiling: usize) -> Result<usize, ShellError> {
        if !(1..=MAX_CEILING).contains(&ceiling) {
            return Err(ShellError::InvalidCeiling {
                value: ceiling.to_string(),
            });
        }
        let mut pool = self.pool.write().await;
        *pool = Pool::new(ceiling);
        Ok(self.ceiling.swap(ceiling, Ordering::AcqRel))
    }
}

/// Parses the raw `-n` value of the reconfiguration command.
///
/// Anything that is not an integer in `1..=MAX_CEILING` is an
/// [`ShellError::InvalidCeiling`].
pub fn parse_ceiling(raw: &str) -> Result<usize, ShellError> {
    let invalid = || ShellError::InvalidCeiling {
        value: raw.to_string(),
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => usize::try_from(n)
            .ok()
            .filter(|n| *n <= MAX_CEILING)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}
