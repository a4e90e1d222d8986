// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Persistent fixtures that host the caches.
//!
//! A persistent fixture is built once per test case and dropped after every
//! nested section of that test case has run. Caches stored in it therefore
//! survive from one pass over the test body to the next, which is what makes
//! re-entering a section cheap.
//!
//! Two hosts are provided:
//! - [`CachedFunctionFixture`]: one [`CachedFunction`], created on first
//!   request
//! - [`ObjectCacheFixture`]: one [`ObjectCaches`] registry, for any number of
//!   functions
//!
//! # Memory Model
//!
//! ```text
//! TestCase {
//!     fixture: Fx,             // built once, dropped when run() returns
//!     tracker: SectionTracker, // completed section paths
//! }
//! ```

use std::fmt;

use crate::memo::{CacheableFn, CachedFunction};
use crate::registry::ObjectCaches;

/// A fixture that lives for a whole test case.
///
/// [`TestCase::with_default`](crate::scenario::TestCase::with_default)
/// builds the fixture through `Default`.
pub trait PersistentFixture: Default {}

impl PersistentFixture for () {}

/// Hosts a single [`CachedFunction`], created lazily.
pub struct CachedFunctionFixture<F, Args, R> {
    cached: Option<CachedFunction<F, Args, R>>,
}

impl<F, Args, R> CachedFunctionFixture<F, Args, R>
where
    F: CacheableFn<Args, Output = R> + Copy + 'static,
    Args: Clone + PartialEq,
    R: Clone,
{
    /// Get the cache for `function`, creating it on the first request.
    ///
    /// The fixture holds at most one cache: later requests return the cache
    /// created first.
    pub fn get(&mut self, function: F) -> &mut CachedFunction<F, Args, R> {
        self.cached.get_or_insert_with(|| CachedFunction::new(function))
    }

    /// An empty fixture for `function`'s signature.
    ///
    /// Nothing is created until the first [`get`](Self::get); this only fixes
    /// the fixture's type, since function item types cannot be written out.
    pub fn for_function(_function: F) -> Self {
        Self::new()
    }
}

impl<F, Args, R> CachedFunctionFixture<F, Args, R> {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// The cache, if it has been requested.
    pub fn cached(&self) -> Option<&CachedFunction<F, Args, R>> {
        self.cached.as_ref()
    }
}

impl<F, Args, R> Default for CachedFunctionFixture<F, Args, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, Args, R> PersistentFixture for CachedFunctionFixture<F, Args, R> {}

impl<F, Args, R> fmt::Debug for CachedFunctionFixture<F, Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFunctionFixture")
            .field("cached", &self.cached)
            .finish()
    }
}

/// Hosts one [`ObjectCaches`] registry.
#[derive(Debug, Default)]
pub struct ObjectCacheFixture {
    caches: ObjectCaches,
}

impl ObjectCacheFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caches(&mut self) -> &mut ObjectCaches {
        &mut self.caches
    }
}

impl PersistentFixture for ObjectCacheFixture {}
