// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Heterogeneous cache registry.
//!
//! [`ObjectCaches`] lets any number of differently typed functions share one
//! container. Each entry owns a [`CachedFunction`] specialised to its
//! function's true signature, hidden behind an [`Invoker`] with a uniform
//! calling convention: arguments go in through one [`ErasedSlot`] and the
//! result comes back through another.
//!
//! # Identity
//!
//! Entries are keyed by the `TypeId` of the callable itself. Every function
//! item and every closure expression has its own type, so two functions can
//! never share an entry by accident, and a closure written inside a loop maps
//! to the same entry on every iteration.
//!
//! # Example
//!
//! ```
//! use section_cache::registry::ObjectCaches;
//!
//! fn label(value: u32) -> String {
//!     format!("item {}", value)
//! }
//!
//! let mut caches = ObjectCaches::new();
//! assert_eq!(caches.invoke(label, (3,)), "item 3");
//! assert_eq!(caches.invoke(|value: u32| value * 10, (3,)), 30);
//! assert_eq!(caches.invoke(label, (3,)), "item 3");
//! assert_eq!(caches.len(), 2);
//! ```

pub mod erased;
pub mod errors;

pub use erased::ErasedSlot;
pub use errors::CacheError;

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::memo::{CacheStatistics, CacheableFn, CachedFunction};

/// Uniform calling convention shared by every registry entry.
///
/// Implementations take their argument tuple out of `input` and put their
/// result into `output`.
pub(crate) trait Invoker {
    fn invoke(&mut self, input: &mut ErasedSlot, output: &mut ErasedSlot) -> Result<(), CacheError>;

    fn statistics(&self) -> CacheStatistics;

    /// Number of results stored.
    fn len(&self) -> usize;
}

/// Stores every result, as [`CachedFunction::call`] does.
struct Memoized<F, Args, R>(CachedFunction<F, Args, R>);

impl<F, Args, R> Invoker for Memoized<F, Args, R>
where
    F: CacheableFn<Args, Output = R> + Copy + 'static,
    Args: Clone + PartialEq + 'static,
    R: Clone + 'static,
{
    fn invoke(&mut self, input: &mut ErasedSlot, output: &mut ErasedSlot) -> Result<(), CacheError> {
        let args = input.take::<Args>()?;
        output.put(self.0.call(args))
    }

    fn statistics(&self) -> CacheStatistics {
        self.0.statistics()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Stores only `Ok` results, as [`CachedFunction::try_call`] does.
struct MemoizedFallible<F, Args, T, E> {
    cached: CachedFunction<F, Args, T>,
    _error: PhantomData<fn() -> E>,
}

impl<F, Args, T, E> Invoker for MemoizedFallible<F, Args, T, E>
where
    F: CacheableFn<Args, Output = Result<T, E>> + Copy + 'static,
    Args: Clone + PartialEq + 'static,
    T: Clone + 'static,
    E: 'static,
{
    fn invoke(&mut self, input: &mut ErasedSlot, output: &mut ErasedSlot) -> Result<(), CacheError> {
        let args = input.take::<Args>()?;
        output.put(self.cached.try_call(args))
    }

    fn statistics(&self) -> CacheStatistics {
        self.cached.statistics()
    }

    fn len(&self) -> usize {
        self.cached.len()
    }
}

/// Whether an entry stores every result or only successful ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Flavour {
    Infallible,
    Fallible,
}

/// A callable type may implement [`CacheableFn`] for several argument
/// tuples, so the tuple type is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    function: TypeId,
    args: TypeId,
    flavour: Flavour,
}

impl CacheKey {
    fn of<F: 'static, Args: 'static>(flavour: Flavour) -> Self {
        Self {
            function: TypeId::of::<F>(),
            args: TypeId::of::<Args>(),
            flavour,
        }
    }
}

struct CacheEntry {
    /// Name of the callable's type, for logs and panics.
    name: &'static str,
    invoker: Box<dyn Invoker>,
}

/// Token for a function registered with [`ObjectCaches::register`].
///
/// The handle carries the (zero-sized) function, so it stays valid for any
/// registry: a registry that has not seen the function yet creates its entry
/// on first use.
pub struct CacheHandle<F, Args> {
    function: F,
    _args: PhantomData<fn(Args)>,
}

/// Token for a function registered with [`ObjectCaches::register_fallible`].
pub struct FallibleCacheHandle<F, Args> {
    function: F,
    _args: PhantomData<fn(Args)>,
}

macro_rules! impl_handle_traits {
    ($handle:ident) => {
        impl<F: Copy, Args> Clone for $handle<F, Args> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<F: Copy, Args> Copy for $handle<F, Args> {}

        impl<F, Args> fmt::Debug for $handle<F, Args> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($handle))
                    .field("function", &type_name::<F>())
                    .finish()
            }
        }
    };
}

impl_handle_traits!(CacheHandle);
impl_handle_traits!(FallibleCacheHandle);

/// A registry of memoized functions of arbitrary signatures.
///
/// Entries are created on first use and never removed or replaced; they live
/// as long as the registry.
#[derive(Default)]
pub struct ObjectCaches {
    caches: HashMap<CacheKey, CacheEntry>,
}

impl ObjectCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` and return a handle for [`call`](Self::call).
    ///
    /// Registering the same function again returns a handle to the existing
    /// entry.
    pub fn register<F, Args>(&mut self, function: F) -> CacheHandle<F, Args>
    where
        F: CacheableFn<Args> + Copy + 'static,
        F::Output: Clone + 'static,
        Args: Clone + PartialEq + 'static,
    {
        self.memoized_entry::<F, Args>(function);
        CacheHandle {
            function,
            _args: PhantomData,
        }
    }

    /// Register a function returning `Result`; only `Ok` values are stored.
    ///
    /// This entry is separate from the one [`register`](Self::register)
    /// would create for the same function.
    pub fn register_fallible<F, Args, T, E>(&mut self, function: F) -> FallibleCacheHandle<F, Args>
    where
        F: CacheableFn<Args, Output = Result<T, E>> + Copy + 'static,
        Args: Clone + PartialEq + 'static,
        T: Clone + 'static,
        E: 'static,
    {
        self.fallible_entry::<F, Args, T, E>(function);
        FallibleCacheHandle {
            function,
            _args: PhantomData,
        }
    }

    /// Call a registered function through its cache.
    pub fn call<F, Args>(&mut self, handle: &CacheHandle<F, Args>, args: Args) -> F::Output
    where
        F: CacheableFn<Args> + Copy + 'static,
        F::Output: Clone + 'static,
        Args: Clone + PartialEq + 'static,
    {
        let entry = self.memoized_entry::<F, Args>(handle.function);
        dispatch(entry, args)
    }

    /// Call a registered fallible function through its cache.
    ///
    /// Errors are returned unchanged and not stored.
    pub fn try_call<F, Args, T, E>(&mut self, handle: &FallibleCacheHandle<F, Args>, args: Args) -> Result<T, E>
    where
        F: CacheableFn<Args, Output = Result<T, E>> + Copy + 'static,
        Args: Clone + PartialEq + 'static,
        T: Clone + 'static,
        E: 'static,
    {
        let entry = self.fallible_entry::<F, Args, T, E>(handle.function);
        dispatch(entry, args)
    }

    /// Memoized call of `function`, creating its cache on first use.
    ///
    /// The result type is the function's own return type.
    pub fn invoke<F, Args>(&mut self, function: F, args: Args) -> F::Output
    where
        F: CacheableFn<Args> + Copy + 'static,
        F::Output: Clone + 'static,
        Args: Clone + PartialEq + 'static,
    {
        let entry = self.memoized_entry::<F, Args>(function);
        dispatch(entry, args)
    }

    /// Memoized call of a function returning `Result`; only `Ok` is stored.
    pub fn try_invoke<F, Args, T, E>(&mut self, function: F, args: Args) -> Result<T, E>
    where
        F: CacheableFn<Args, Output = Result<T, E>> + Copy + 'static,
        Args: Clone + PartialEq + 'static,
        T: Clone + 'static,
        E: 'static,
    {
        let entry = self.fallible_entry::<F, Args, T, E>(function);
        dispatch(entry, args)
    }

    /// Statistics of the cache behind `handle`, if it exists in this registry.
    pub fn statistics<F: 'static, Args: 'static>(&self, _handle: &CacheHandle<F, Args>) -> Option<CacheStatistics> {
        self.caches
            .get(&CacheKey::of::<F, Args>(Flavour::Infallible))
            .map(|entry| entry.invoker.statistics())
    }

    /// Statistics of the cache behind a fallible handle, if it exists in this registry.
    pub fn fallible_statistics<F: 'static, Args: 'static>(
        &self,
        _handle: &FallibleCacheHandle<F, Args>,
    ) -> Option<CacheStatistics> {
        self.caches
            .get(&CacheKey::of::<F, Args>(Flavour::Fallible))
            .map(|entry| entry.invoker.statistics())
    }

    /// True if `function` has an entry, of either flavour and for any
    /// argument tuple.
    pub fn contains<F: 'static>(&self, _function: F) -> bool {
        let function = TypeId::of::<F>();
        self.caches.keys().any(|key| key.function == function)
    }

    /// Number of entries. A function called with two argument tuple types
    /// has two entries.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// True if no function has been registered.
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// Total number of results stored across all entries.
    pub fn stored_results(&self) -> usize {
        self.caches.values().map(|entry| entry.invoker.len()).sum()
    }

    fn memoized_entry<F, Args>(&mut self, function: F) -> &mut CacheEntry
    where
        F: CacheableFn<Args> + Copy + 'static,
        F::Output: Clone + 'static,
        Args: Clone + PartialEq + 'static,
    {
        self.caches
            .entry(CacheKey::of::<F, Args>(Flavour::Infallible))
            .or_insert_with(|| {
                debug!(function = type_name::<F>(), "registering object cache");
                CacheEntry {
                    name: type_name::<F>(),
                    invoker: Box::new(Memoized::<F, Args, F::Output>(CachedFunction::new(function))),
                }
            })
    }

    fn fallible_entry<F, Args, T, E>(&mut self, function: F) -> &mut CacheEntry
    where
        F: CacheableFn<Args, Output = Result<T, E>> + Copy + 'static,
        Args: Clone + PartialEq + 'static,
        T: Clone + 'static,
        E: 'static,
    {
        self.caches
            .entry(CacheKey::of::<F, Args>(Flavour::Fallible))
            .or_insert_with(|| {
                debug!(function = type_name::<F>(), "registering fallible object cache");
                CacheEntry {
                    name: type_name::<F>(),
                    invoker: Box::new(MemoizedFallible::<F, Args, T, E> {
                        cached: CachedFunction::fallible(function),
                        _error: PhantomData,
                    }),
                }
            })
    }
}

/// Run `entry` through the erased calling convention.
///
/// Both slots are owned locals, so arguments and results are dropped exactly
/// once on every path, including a panic in the wrapped function.
///
/// # Panics
///
/// Panics if the entry's signature disagrees with the request. Keys are
/// derived from the callable's type and its argument tuple type, which
/// together fix the result type, so this indicates a bug in the registry
/// itself.
fn dispatch<Args: 'static, O: 'static>(entry: &mut CacheEntry, args: Args) -> O {
    let mut input = ErasedSlot::holding(args);
    let mut output = ErasedSlot::empty();
    let outcome = entry
        .invoker
        .invoke(&mut input, &mut output)
        .and_then(|()| output.take::<O>());

    match outcome {
        Ok(value) => value,
        Err(err) => panic!(
            "object cache for `{}` does not match the requested signature: {}",
            entry.name, err
        ),
    }
}

impl fmt::Debug for ObjectCaches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.caches.values().map(|entry| entry.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memo::Counters;
    use std::cell::Cell;

    thread_local! {
        static SQUARES: Cell<usize> = const { Cell::new(0) };
        static NEGATIONS: Cell<usize> = const { Cell::new(0) };
    }

    fn square(value: i64) -> i64 {
        SQUARES.with(|count| count.set(count.get() + 1));
        value * value
    }

    fn negate(value: i64) -> i64 {
        NEGATIONS.with(|count| count.set(count.get() + 1));
        -value
    }

    fn checked_half(value: i64) -> Result<i64, String> {
        if value % 2 == 0 {
            Ok(value / 2)
        } else {
            Err(format!("cannot halve {}", value))
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let caches = ObjectCaches::new();
        assert!(caches.is_empty());
        assert_eq!(caches.len(), 0);
        assert_eq!(caches.stored_results(), 0);
    }

    #[test]
    fn test_invoke_memoizes_per_function() {
        let mut caches = ObjectCaches::new();

        assert_eq!(caches.invoke(square, (3,)), 9);
        assert_eq!(caches.invoke(negate, (3,)), -3);
        assert_eq!(caches.invoke(square, (3,)), 9);
        assert_eq!(caches.invoke(negate, (3,)), -3);

        assert_eq!(SQUARES.with(Cell::get), 1);
        assert_eq!(NEGATIONS.with(Cell::get), 1);
        assert_eq!(caches.len(), 2);
        assert_eq!(caches.stored_results(), 2);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut caches = ObjectCaches::new();
        let first = caches.register(square);
        let second = caches.register(square);

        assert_eq!(caches.call(&first, (4,)), 16);
        assert_eq!(caches.call(&second, (4,)), 16);
        assert_eq!(caches.len(), 1);

        let stats = caches.statistics(&first).unwrap();
        assert_eq!(stats.get(Counters::Misses), 1);
        assert_eq!(stats.get(Counters::Hits), 1);
    }

    #[test]
    fn test_handle_registers_lazily_in_other_registry() {
        let mut issuer = ObjectCaches::new();
        let handle = issuer.register(negate);

        let mut other = ObjectCaches::new();
        assert!(other.statistics(&handle).is_none());
        assert_eq!(other.call(&handle, (8,)), -8);
        assert!(other.contains(negate));
        assert_eq!(other.statistics(&handle).unwrap().get(Counters::Misses), 1);
    }

    #[test]
    fn test_fallible_entry_stores_only_success() {
        let mut caches = ObjectCaches::new();

        assert_eq!(caches.try_invoke(checked_half, (3,)), Err(String::from("cannot halve 3")));
        assert_eq!(caches.try_invoke(checked_half, (3,)), Err(String::from("cannot halve 3")));
        assert_eq!(caches.try_invoke(checked_half, (10,)), Ok(5));
        assert_eq!(caches.try_invoke(checked_half, (10,)), Ok(5));

        let handle = caches.register_fallible(checked_half);
        let stats = caches.fallible_statistics(&handle).unwrap();
        assert_eq!(stats.get(Counters::Failures), 2);
        assert_eq!(stats.get(Counters::Misses), 1);
        assert_eq!(stats.get(Counters::Hits), 1);
        assert_eq!(caches.stored_results(), 1);
    }

    #[test]
    fn test_fallible_and_infallible_entries_are_separate() {
        let mut caches = ObjectCaches::new();

        // Infallible entries store errors as ordinary values.
        assert!(caches.invoke(checked_half, (1,)).is_err());
        assert!(caches.try_invoke(checked_half, (1,)).is_err());

        assert_eq!(caches.len(), 2);
        assert_eq!(caches.stored_results(), 1);
    }

    #[test]
    fn test_contains() {
        let mut caches = ObjectCaches::new();
        assert!(!caches.contains(square));
        caches.invoke(square, (1,));
        assert!(caches.contains(square));
        assert!(!caches.contains(negate));
    }

    #[test]
    fn test_debug_lists_function_names() {
        let mut caches = ObjectCaches::new();
        caches.invoke(square, (2,));
        let text = format!("{:?}", caches);
        assert!(text.contains("square"));

        let handle = caches.register(square);
        assert!(format!("{:?}", handle).starts_with("CacheHandle"));
    }
}
