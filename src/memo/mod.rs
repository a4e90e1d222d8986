// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Single-signature memoization.
//!
//! A [`CachedFunction`] wraps one stateless function and remembers every
//! distinct argument tuple it has seen, together with the result computed for
//! it. Lookups are a linear scan by value equality: the number of distinct
//! arguments is bounded by the number of sections in one test case, so no
//! hashing or eviction is involved.
//!
//! # Stateless callables
//!
//! Only free function items and closures without captures can be cached.
//! Both are zero-sized types, and this is checked when the cache is
//! constructed. Anything carrying state is rejected when the crate using it
//! is built (the check runs during monomorphization, so `cargo check` alone
//! does not report it):
//!
//! ```ignore
//! use section_cache::memo::CachedFunction;
//!
//! let offset = 10;
//! let mut cached = CachedFunction::new(move |value: i32| value + offset);
//! cached.call((1,));
//! // error[E0080]: evaluation of `Stateless::<{closure}>::CHECK` failed
//! ```
//!
//! Function pointers carry no identity of their own and are rejected too:
//!
//! ```ignore
//! use section_cache::memo::CachedFunction;
//!
//! fn double(value: i32) -> i32 {
//!     value * 2
//! }
//!
//! let mut cached = CachedFunction::new(double as fn(i32) -> i32);
//! cached.call((1,));
//! // error[E0080]: evaluation of `Stateless::<fn(i32) -> i32>::CHECK` failed
//! ```

pub mod cached;
pub mod statistics;

pub use cached::{CachedFunction, CallRecord};
pub use statistics::{CacheStatistics, Counters};

use std::marker::PhantomData;

/// A function that can be driven by a single argument tuple.
///
/// Implemented for every `Fn(A0, .., An) -> R` with up to six parameters, so a
/// cache keyed by `(A0, .., An)` can call a function of positional parameters.
pub trait CacheableFn<Args> {
    /// The function's return type.
    type Output;

    /// Call the function, spreading `args` over its parameters.
    fn call_with(&self, args: Args) -> Self::Output;
}

macro_rules! impl_cacheable_fn {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg),*> CacheableFn<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn call_with(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

impl_cacheable_fn!();
impl_cacheable_fn!(A0);
impl_cacheable_fn!(A0, A1);
impl_cacheable_fn!(A0, A1, A2);
impl_cacheable_fn!(A0, A1, A2, A3);
impl_cacheable_fn!(A0, A1, A2, A3, A4);
impl_cacheable_fn!(A0, A1, A2, A3, A4, A5);

/// Compile-time proof that `F` carries no state.
///
/// Referencing [`Stateless::CHECK`] from a generic function forces the
/// assertion when that function is instantiated for a concrete `F`.
pub(crate) struct Stateless<F>(PhantomData<F>);

impl<F> Stateless<F> {
    pub(crate) const CHECK: () = assert!(
        std::mem::size_of::<F>() == 0,
        "The function to be cached must be either a free function, or a closure without captures"
    );
}
