// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Memoize expensive object construction across the sections of a test case.
//!
//! A test case with nested sections re-runs its body once per leaf section,
//! so any object built outside the leaves is built again and again for the
//! same inputs. This crate caches those constructions in a fixture that
//! lives for the whole test case.
//!
//! # Architecture
//!
//! ## Single-signature caches
//!
//! [`CachedFunction`] wraps one stateless function and stores an
//! `(arguments, result)` record per distinct argument tuple, found again by a
//! linear equality scan.
//!
//! ## Heterogeneous registry
//!
//! [`ObjectCaches`] holds one cache per function, for functions of any
//! signature. Entries are keyed by the function's own type and reached
//! through a type-erased invoker that moves arguments and results through
//! owned [`ErasedSlot`]s.
//!
//! ## Hosting
//!
//! A [`TestCase`] owns a persistent fixture (see [`fixture`]) for all of its
//! passes; caches stored in the fixture survive from pass to pass and are
//! dropped with it.
//!
//! # Example
//!
//! ```
//! use section_cache::{ObjectCacheFixture, Scope, TestCase};
//!
//! fn build(value: i32) -> Vec<i32> {
//!     (0..value).collect()
//! }
//!
//! TestCase::with_default("lists")
//!     .run(|scope: &mut Scope<'_, ObjectCacheFixture>| {
//!         for i in 0..3 {
//!             scope.section(format!("length {}", i), |scope| {
//!                 let list = scope.fixture_mut().caches().invoke(build, (i,));
//!                 scope.section("has length", |_| assert_eq!(list.len() as i32, i));
//!                 scope.section("is sorted", |_| assert!(list.windows(2).all(|w| w[0] < w[1])));
//!             });
//!         }
//!     })
//!     .unwrap();
//! ```
//!
//! # Threading
//!
//! Everything runs on the calling thread. Caches are plain mutable state with
//! no locking; sections of one test case are executed sequentially.

pub mod fixture;
pub mod memo;
pub mod registry;
pub mod scenario;

// Re-export commonly used types
pub use fixture::{CachedFunctionFixture, ObjectCacheFixture, PersistentFixture};
pub use memo::{CacheStatistics, CacheableFn, CachedFunction, Counters};
pub use registry::{CacheError, CacheHandle, ErasedSlot, FallibleCacheHandle, ObjectCaches};
pub use scenario::{RunSummary, ScenarioError, Scope, TestCase};
