//! Shared in-memory stores.
//!
//! Three independent stores are shared between the background tasks and the
//! HTTP handlers:
//! - `AppendLog<BenchRecord>` written by the ingest task
//! - `AppendLog<CacheRecord>` written by the cache sampler
//! - `LatestValue<Vec<f64>>` replaced by the CPU sampler
//!
//! Every store has its own lock and no operation ever holds two of them, so
//! the stores cannot deadlock against each other. Locks are only held to copy
//! data in or out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::record::{BenchRecord, CacheRecord};

/// Growable log that only ever appends.
///
/// Because elements are never removed or modified, a length observed once is
/// a valid cursor forever: `since(n)` returns exactly the elements appended
/// after the caller saw `n`.
#[derive(Debug)]
pub struct AppendLog<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Default for AppendLog<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> AppendLog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        // A panicking writer can only poison the lock between pushes, so the
        // vector itself is still consistent.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Appends one element.
    pub fn append(&self, item: T) {
        self.lock().push(item);
    }

    /// Number of elements appended so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full point-in-time copy.
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().clone()
    }

    /// Copies every element at or after `cursor` and returns them together
    /// with the new cursor (the log length at the time of the copy).
    pub fn since(&self, cursor: usize) -> (Vec<T>, usize) {
        let items = self.lock();
        let len = items.len();
        if cursor >= len {
            return (Vec::new(), cursor.max(len));
        }
        (items[cursor..].to_vec(), len)
    }
}

/// Single value that is replaced wholesale, never appended to.
#[derive(Debug, Default)]
pub struct LatestValue<T> {
    value: RwLock<T>,
}

impl<T: Clone + Default> LatestValue<T> {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(T::default()),
        }
    }

    /// Replaces the current value.
    pub fn replace(&self, value: T) {
        let mut guard = self.value.write().unwrap_or_else(|e| e.into_inner());
        *guard = value;
    }

    /// Copy of the current value.
    pub fn get(&self) -> T {
        self.value.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// One-shot boolean that flips from unset to set exactly once.
///
/// Setting uses release ordering and reading uses acquire ordering, so any
/// store write made before `set()` is visible to a reader that observes
/// `is_set() == true`.
#[derive(Debug, Default)]
pub struct Latch {
    flag: AtomicBool,
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the latch. Returns `true` if this call performed the transition.
    pub fn set(&self) -> bool {
        !self.flag.swap(true, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Every store shared by the tasks and handlers.
#[derive(Debug, Default)]
pub struct Stores {
    pub bench: AppendLog<BenchRecord>,
    pub cache: AppendLog<CacheRecord>,
    pub cpu: LatestValue<Vec<f64>>,
    /// Set by the ingest task once the input feed has ended.
    pub feed_ended: Latch,
    /// Set by the cache sampler after its final post-feed sample.
    pub cache_final: Latch,
}

/// Type alias for shared stores.
pub type SharedStores = Arc<Stores>;

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStores {
        Arc::new(Self::new())
    }

    /// True once no store will receive further log appends.
    pub fn is_finished(&self) -> bool {
        self.feed_ended.is_set() && self.cache_final.is_set()
    }
}
