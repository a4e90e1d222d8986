// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! A test case re-entering its sections, with and without a single-signature
//! cache held by the persistent fixture.
//!
//! Each value section has three leaves, so building the object inside the
//! value section builds it three times per value. Going through the cache
//! builds it once per value.

mod common;

use common::{create_object, init_tracing, objects_created, reset_objects_created, ExpensiveObject};
use section_cache::{CachedFunctionFixture, Scope, TestCase};

fn check_object<Fx>(scope: &mut Scope<'_, Fx>, object: &ExpensiveObject, i: i32) {
    scope.section("Not less than zero", |_| assert!(object.value() >= 0));
    scope.section("is i", |_| assert_eq!(object.value(), i));
    scope.section("Less than 5", |_| assert!(object.value() < 5));
}

#[test]
fn test_object_cache_in_sections() {
    init_tracing();
    reset_objects_created();

    let fixture = CachedFunctionFixture::for_function(create_object);
    let summary = TestCase::new("ObjectCache", fixture)
        .run(|scope| {
            scope.section("Without ObjectCache", |scope| {
                for i in 0..5 {
                    scope.section(format!("With value = {}", i), |scope| {
                        let object = ExpensiveObject::new(i);
                        check_object(scope, &object, i);
                    });
                }
            });

            scope.section("Check num creation", |_| assert_eq!(objects_created(), 15));

            scope.section("Reset counter", |_| reset_objects_created());

            scope.section("With Object Cache", |scope| {
                for i in 0..5 {
                    scope.section(format!("With value = {}", i), |scope| {
                        let object: ExpensiveObject = scope.fixture_mut().get(create_object).call((i,));
                        check_object(scope, &object, i);
                    });
                }
            });

            scope.section("Check num creation again", |_| assert_eq!(objects_created(), 5));
        })
        .unwrap();

    // 15 leaves in each half, plus the three single sections.
    assert_eq!(summary.passes, 33);
    assert_eq!(summary.leaves.len(), 33);
    assert_eq!(objects_created(), 5);
}

#[test]
fn test_cache_records_one_entry_per_value() {
    reset_objects_created();

    let mut records = 0;
    let mut hits = 0;
    TestCase::new("records", CachedFunctionFixture::for_function(create_object))
        .run(|scope| {
            for i in 0..5 {
                scope.section(format!("With value = {}", i), |scope| {
                    let object: ExpensiveObject = scope.fixture_mut().get(create_object).call((i,));
                    check_object(scope, &object, i);
                });
            }
            if let Some(cached) = scope.fixture().cached() {
                records = cached.len();
                hits = cached.statistics().get(section_cache::Counters::Hits);
            }
        })
        .unwrap();

    assert_eq!(records, 5);
    assert_eq!(hits, 10);
    assert_eq!(objects_created(), 5);
}

#[test]
fn test_fixture_holds_free_function_cache() {
    reset_objects_created();

    let mut fixture = CachedFunctionFixture::for_function(create_object);
    for i in [0, 1, 2, 3, 4, 0, 1, 2, 3, 4] {
        let object = fixture.get(create_object).call((i,));
        assert_eq!(object.value(), i);
    }
    assert_eq!(objects_created(), 5);
}
