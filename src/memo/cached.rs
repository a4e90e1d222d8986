// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Argument-keyed cache for one function signature.

use std::any::type_name;
use std::fmt;

use tracing::{debug, trace, warn};

use super::statistics::{CacheStatistics, Counters};
use super::{CacheableFn, Stateless};

/// One remembered call: the arguments and the result they produced.
///
/// Records are created on a cache miss and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord<Args, R> {
    args: Args,
    result: R,
}

impl<Args, R> CallRecord<Args, R> {
    /// The argument tuple this record was computed for.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// The stored result.
    pub fn result(&self) -> &R {
        &self.result
    }
}

/// A memoizing wrapper around one stateless function.
///
/// Records are kept in the order their arguments were first seen, and no two
/// records have equal arguments. The cache grows for as long as it lives;
/// it is meant to be owned by a fixture that is dropped at the end of a test
/// case.
///
/// # Example
///
/// ```
/// use section_cache::memo::CachedFunction;
///
/// fn square(value: u64) -> u64 {
///     value * value
/// }
///
/// let mut cached = CachedFunction::new(square);
/// assert_eq!(cached.call((4,)), 16);
/// assert_eq!(cached.call((4,)), 16);
/// assert_eq!(cached.len(), 1);
/// ```
pub struct CachedFunction<F, Args, R> {
    /// The wrapped function (zero-sized).
    function: F,

    /// Calls seen so far, in first-seen order.
    records: Vec<CallRecord<Args, R>>,

    statistics: CacheStatistics,
}

impl<F, Args, R> CachedFunction<F, Args, R>
where
    F: CacheableFn<Args, Output = R> + Copy + 'static,
    Args: Clone + PartialEq,
    R: Clone,
{
    /// Wrap `function`, which must be a free function or a closure without
    /// captures. Anything else fails to compile.
    pub fn new(function: F) -> Self {
        let () = Stateless::<F>::CHECK;
        debug!(function = type_name::<F>(), "creating cached function");
        Self::with_function(function)
    }

    /// Return the result for `args`, computing and storing it on first use.
    ///
    /// If the wrapped function panics, nothing is recorded and the panic
    /// propagates; a later call with the same arguments runs it again.
    pub fn call(&mut self, args: Args) -> R {
        if let Some(result) = self.lookup(&args) {
            return result;
        }

        // Key first: the original value is handed over to the function.
        let key = args.clone();
        let result = self.function.call_with(args);
        self.statistics.increment_counter(Counters::Misses);
        self.store(key, result)
    }
}

impl<F, Args, T, E> CachedFunction<F, Args, T>
where
    F: CacheableFn<Args, Output = Result<T, E>> + Copy + 'static,
    Args: Clone + PartialEq,
    T: Clone,
{
    /// Wrap a function returning `Result`, for use with [`try_call`](Self::try_call).
    ///
    /// Only successful results are stored.
    ///
    /// ```
    /// use section_cache::memo::CachedFunction;
    ///
    /// fn parse(text: &'static str) -> Result<u32, std::num::ParseIntError> {
    ///     text.parse()
    /// }
    ///
    /// let mut cached = CachedFunction::fallible(parse);
    /// assert_eq!(cached.try_call(("42",)), Ok(42));
    /// assert!(cached.try_call(("x",)).is_err());
    /// assert_eq!(cached.len(), 1);
    /// ```
    pub fn fallible(function: F) -> Self {
        let () = Stateless::<F>::CHECK;
        debug!(function = type_name::<F>(), "creating fallible cached function");
        Self::with_function(function)
    }

    /// Return the stored value for `args`, or run the function.
    ///
    /// An `Ok` value is stored and returned. An `Err` is returned unchanged
    /// and leaves the cache exactly as it was, so the next call with the same
    /// arguments tries again.
    pub fn try_call(&mut self, args: Args) -> Result<T, E> {
        if let Some(value) = self.lookup(&args) {
            return Ok(value);
        }

        let key = args.clone();
        match self.function.call_with(args) {
            Ok(value) => {
                self.statistics.increment_counter(Counters::Misses);
                Ok(self.store(key, value))
            }
            Err(err) => {
                self.statistics.increment_counter(Counters::Failures);
                warn!(
                    function = type_name::<F>(),
                    "cached function failed, nothing recorded"
                );
                Err(err)
            }
        }
    }
}

impl<F, Args, R> CachedFunction<F, Args, R> {
    fn with_function(function: F) -> Self {
        Self {
            function,
            records: Vec::new(),
            statistics: CacheStatistics::new(),
        }
    }

    /// Linear scan for a record with equal arguments.
    fn lookup(&mut self, args: &Args) -> Option<R>
    where
        Args: PartialEq,
        R: Clone,
    {
        let result = self
            .records
            .iter()
            .find(|record| record.args == *args)
            .map(|record| record.result.clone())?;
        self.statistics.increment_counter(Counters::Hits);
        trace!(function = type_name::<F>(), "cache hit");
        Some(result)
    }

    fn store(&mut self, args: Args, result: R) -> R
    where
        R: Clone,
    {
        let value = result.clone();
        self.records.push(CallRecord { args, result });
        debug!(
            function = type_name::<F>(),
            records = self.records.len(),
            "cache miss, result recorded"
        );
        value
    }

    /// Number of distinct argument tuples recorded.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Recorded calls, in the order their arguments were first seen.
    pub fn records(&self) -> &[CallRecord<Args, R>] {
        &self.records
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.statistics
    }
}

impl<F, Args, R> fmt::Debug for CachedFunction<F, Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFunction")
            .field("function", &type_name::<F>())
            .field("records", &self.records.len())
            .field("statistics", &self.statistics)
            .finish()
    }
}
