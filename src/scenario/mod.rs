// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Nested-section test runner.
//!
//! A test case is a body containing arbitrarily nested, dynamically named
//! sections. The runner executes the body repeatedly; each pass enters at
//! most one unfinished section per nesting level, so every leaf section runs
//! exactly once and the code around it runs again for every leaf. The
//! fixture is built once, before the first pass, and dropped after the last.
//!
//! # Execution Model
//!
//! 1. Begin a pass: open a frame for the body
//! 2. `section(name)` enters the section if it is unfinished and no sibling
//!    has been entered during this pass; otherwise it is skipped
//! 3. Leaving a section marks it complete unless one of its children is
//!    still pending
//! 4. Repeat while the body itself has pending sections
//!
//! # Example
//!
//! ```
//! use section_cache::scenario::TestCase;
//!
//! let summary = TestCase::with_default("example")
//!     .run(|scope: &mut section_cache::scenario::Scope<'_, ()>| {
//!         for i in 0..2 {
//!             scope.section(format!("value = {}", i), |scope| {
//!                 scope.section("positive", |_| {});
//!                 scope.section("small", |_| {});
//!             });
//!         }
//!     })
//!     .unwrap();
//!
//! assert_eq!(summary.passes, 4);
//! assert_eq!(summary.leaves.len(), 4);
//! ```

pub mod errors;
pub mod tracker;

pub use errors::ScenarioError;
pub use tracker::{SectionPath, SectionTracker};

use tracing::{debug, info};

use crate::fixture::PersistentFixture;

/// Maximum nesting depth of sections.
pub const MAX_SECTION_DEPTH: usize = 64;

/// Maximum number of passes over one test body.
pub const MAX_PASSES: usize = 100_000;

/// Outcome of a completed test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of times the body was executed.
    pub passes: usize,

    /// Leaf sections in the order they ran.
    pub leaves: Vec<SectionPath>,
}

/// The view of a test case given to its body during one pass.
pub struct Scope<'a, Fx> {
    fixture: &'a mut Fx,
    tracker: &'a mut SectionTracker,
    pass: usize,
}

impl<'a, Fx> Scope<'a, Fx> {
    /// Run `body` as the section `name` if this pass should enter it.
    ///
    /// Returns true if the section was entered.
    pub fn section(&mut self, name: impl Into<String>, body: impl FnOnce(&mut Self)) -> bool {
        let name = name.into();
        if !self.tracker.try_enter(&name) {
            return false;
        }

        debug!(pass = self.pass, path = ?self.tracker.current_path(), "entering section");
        body(self);
        self.tracker.leave();
        true
    }

    pub fn fixture(&self) -> &Fx {
        self.fixture
    }

    pub fn fixture_mut(&mut self) -> &mut Fx {
        self.fixture
    }

    /// Names of the sections currently entered, outermost first.
    pub fn path(&self) -> SectionPath {
        self.tracker.current_path()
    }

    /// Number of the current pass, starting at 1.
    pub fn pass(&self) -> usize {
        self.pass
    }
}

/// A named test case owning its persistent fixture.
#[derive(Debug)]
pub struct TestCase<Fx> {
    name: String,
    fixture: Fx,
    tracker: SectionTracker,
}

impl<Fx: PersistentFixture> TestCase<Fx> {
    /// Create a test case whose fixture is built with `Default`.
    pub fn with_default(name: &str) -> Self {
        Self::new(name, Fx::default())
    }
}

impl<Fx> TestCase<Fx> {
    pub fn new(name: &str, fixture: Fx) -> Self {
        Self {
            name: name.to_string(),
            fixture,
            tracker: SectionTracker::new(MAX_SECTION_DEPTH),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `body` until every section has been executed.
    ///
    /// Consumes the test case: the fixture, and every cache it owns, is
    /// dropped when this returns. A panic in the body propagates unchanged.
    pub fn run<B>(mut self, mut body: B) -> Result<RunSummary, ScenarioError>
    where
        B: FnMut(&mut Scope<'_, Fx>),
    {
        let mut passes = 0;
        loop {
            passes += 1;
            debug!(test_case = %self.name, pass = passes, "starting pass");

            self.tracker.begin_pass();
            let mut scope = Scope {
                fixture: &mut self.fixture,
                tracker: &mut self.tracker,
                pass: passes,
            };
            body(&mut scope);
            let more = self.tracker.end_pass();

            if let Some(err) = self.tracker.take_fault() {
                return Err(err);
            }
            if !more {
                break;
            }
            if passes >= MAX_PASSES {
                return Err(ScenarioError::PassLimitExceeded {
                    test_case: self.name,
                    passes,
                });
            }
        }

        let leaves = self.tracker.take_leaves();
        info!(test_case = %self.name, passes, leaves = leaves.len(), "test case finished");
        Ok(RunSummary { passes, leaves })
    }
}
