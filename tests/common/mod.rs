// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::cell::Cell;

thread_local! {
    static OBJECTS_CREATED: Cell<usize> = const { Cell::new(0) };
}

/// Number of `ExpensiveObject`s constructed on this thread.
pub fn objects_created() -> usize {
    OBJECTS_CREATED.with(Cell::get)
}

pub fn reset_objects_created() {
    OBJECTS_CREATED.with(|count| count.set(0));
}

/// An object whose construction we want to avoid repeating.
///
/// Every construction through [`ExpensiveObject::new`] is counted; clones are
/// not, so the counter reflects how often the constructing function ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpensiveObject {
    value: i32,
}

impl ExpensiveObject {
    pub fn new(value: i32) -> Self {
        OBJECTS_CREATED.with(|count| count.set(count.get() + 1));
        Self { value }
    }

    pub fn value(&self) -> i32 {
        self.value
    }
}

/// Constructor used as the cached function in most tests.
pub fn create_object(value: i32) -> ExpensiveObject {
    ExpensiveObject::new(value)
}

/// Route `tracing` output to the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
