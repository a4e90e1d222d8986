// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Every cache counts its hits, misses and failed computations, so tests can
//! check how often the wrapped function really ran.

use strum::EnumCount;
use strum_macros::EnumCount as EnumCountMacro;

#[derive(EnumCountMacro, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Counters {
    /// The arguments were found; the stored result was returned.
    Hits,
    /// The arguments were new; the wrapped function ran and its result was stored.
    Misses,
    /// The wrapped function ran and returned an error; nothing was stored.
    Failures,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CacheStatistics {
    stats: [u64; Counters::COUNT],
}

impl CacheStatistics {
    /// Create statistics with every counter at zero.
    pub fn new() -> Self {
        CacheStatistics::default()
    }

    /// Increment the specified counter by 1.
    pub(crate) fn increment_counter(&mut self, counter: Counters) {
        self.stats[counter as usize] += 1;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    /// Number of calls made through the cache, whatever their outcome.
    pub fn total_calls(&self) -> u64 {
        self.stats.iter().sum()
    }

    /// Number of times the wrapped function actually ran.
    pub fn invocations(&self) -> u64 {
        self.get(Counters::Misses) + self.get(Counters::Failures)
    }
}
