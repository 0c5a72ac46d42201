//! End-to-end override flows: bind, invoke, substitute, restore.
//!
//! Exercises the public surface the way a consuming test suite would: real
//! registry instances, closures as dependencies, guards dropped on every
//! exit path.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use patchbay_registry::{Handle, OverrideGuard, Registry, RegistryError, bind};

// ── Bind and invoke ─────────────────────────────────────────────────────

#[test]
fn bound_handle_forwards_to_registered_callable() {
    let registry = Registry::new();
    let add = Handle::bind(&registry, "math.add", |(a, b): (i32, i32)| a + b).unwrap();

    assert_eq!(add.invoke((2, 3)).unwrap(), 5);
    assert_eq!(add.invoke((10, -4)).unwrap(), 6);
}

#[test]
fn binding_the_same_label_twice_fails_and_first_stays_active() {
    let registry = Registry::new();
    let first = Handle::bind(&registry, "greet", |_: ()| "original").unwrap();

    let second = Handle::bind(&registry, "greet", |_: ()| "usurper");
    assert!(matches!(second, Err(RegistryError::DuplicateKey(_))));
    assert_eq!(first.invoke(()).unwrap(), "original");
}

// ── Scoped overrides ────────────────────────────────────────────────────

#[test]
fn scoped_override_applies_and_releases() {
    let registry = Registry::new();
    let add = Handle::bind(&registry, "math.add", |(a, b): (i32, i32)| a + b).unwrap();
    assert_eq!(add.invoke((2, 3)).unwrap(), 5);

    {
        let _guard = add.scoped_override(|(a, b)| a * b).unwrap();
        assert_eq!(add.invoke((2, 3)).unwrap(), 6);
    }

    assert_eq!(add.invoke((2, 3)).unwrap(), 5);
}

#[test]
fn scoped_override_releases_when_the_block_panics() {
    let registry = Registry::new();
    let add = Handle::bind(&registry, "math.add", |(a, b): (i32, i32)| a + b).unwrap();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _guard = add.scoped_override(|(a, b)| a * b).unwrap();
        assert_eq!(add.invoke((2, 3)).unwrap(), 6);
        panic!("boom");
    }));

    assert!(outcome.is_err());
    assert_eq!(add.invoke((2, 3)).unwrap(), 5);
}

#[test]
fn nested_overrides_release_in_reverse_order() {
    let registry = Registry::new();
    let answer = Handle::bind(&registry, "answer", |_: ()| 1).unwrap();

    let outer = answer.scoped_override(|_| 2).unwrap();
    assert_eq!(answer.invoke(()).unwrap(), 2);

    let inner = answer.scoped_override(|_| 3).unwrap();
    assert_eq!(answer.invoke(()).unwrap(), 3);

    drop(inner);
    assert_eq!(answer.invoke(()).unwrap(), 2);

    drop(outer);
    assert_eq!(answer.invoke(()).unwrap(), 1);
}

#[test]
fn with_override_restores_even_when_nested() {
    let registry = Registry::new();
    let add = Handle::bind(&registry, "math.add", |(a, b): (i32, i32)| a + b).unwrap();

    let observed = add
        .with_override(
            |(a, b)| a * b,
            || add.with_override(|(a, b)| a - b, || add.invoke((2, 3))),
        )
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(observed, -1);
    assert_eq!(add.invoke((2, 3)).unwrap(), 5);
}

// ── Permanent override and restore ──────────────────────────────────────

#[test]
fn permanent_override_holds_until_restore() {
    let registry = Registry::new();
    let greet = Handle::bind(&registry, "greet", |_: ()| "hello").unwrap();

    greet.permanent_override(|_| "patched");
    assert_eq!(greet.invoke(()).unwrap(), "patched");
    assert_eq!(greet.invoke(()).unwrap(), "patched");

    greet.restore();
    assert_eq!(greet.invoke(()).unwrap(), "hello");
}

#[test]
fn restore_resets_through_a_chain_of_overrides() {
    let registry = Registry::new();
    let inc = Handle::bind(&registry, "inc", |x: i32| x + 1).unwrap();

    inc.permanent_override(|x| x + 100);
    inc.permanent_override(|x| x + 1000);
    assert_eq!(inc.invoke(1).unwrap(), 1001);

    inc.restore();
    assert_eq!(inc.invoke(1).unwrap(), 2);
}

// ── Isolation ───────────────────────────────────────────────────────────

#[test]
fn handles_on_distinct_keys_do_not_interfere() {
    let registry = Registry::new();
    let add = Handle::bind(&registry, "math.add", |(a, b): (i32, i32)| a + b).unwrap();
    let mul = Handle::bind(&registry, "math.mul", |(a, b): (i32, i32)| a * b).unwrap();
    assert_eq!(registry.len(), 2);

    let _guard = add.scoped_override(|(a, b)| a - b).unwrap();
    assert_eq!(add.invoke((2, 3)).unwrap(), -1);
    assert_eq!(mul.invoke((2, 3)).unwrap(), 6);
}

#[test]
fn separate_registries_are_fully_isolated() {
    let first = Registry::new();
    let second = Registry::new();

    // The same label can live in both registries.
    let in_first = Handle::bind(&first, "greet", |_: ()| "first").unwrap();
    let in_second = Handle::bind(&second, "greet", |_: ()| "second").unwrap();

    let _guard = in_first.scoped_override(|_| "patched").unwrap();
    assert_eq!(in_first.invoke(()).unwrap(), "patched");
    assert_eq!(in_second.invoke(()).unwrap(), "second");
}

// ── Call-site identity ──────────────────────────────────────────────────

#[test]
fn bind_macro_registers_under_call_site_identity() {
    let registry = Registry::new();
    let add = bind!(&registry, |(a, b): (i32, i32)| a + b).unwrap();
    assert_eq!(add.invoke((2, 3)).unwrap(), 5);

    // Same callable text on a different line registers separately.
    let add_again = bind!(&registry, |(a, b): (i32, i32)| a + b).unwrap();
    assert_eq!(add_again.invoke((4, 4)).unwrap(), 8);
    assert_ne!(add.key(), add_again.key());
}

#[test]
fn rebinding_from_one_source_position_collides() {
    let registry = Registry::new();
    let mut bound = Vec::new();
    let mut duplicates = 0;

    // Both iterations expand bind! on the same line, so they share a key.
    for _ in 0..2 {
        match bind!(&registry, |x: i32| x) {
            Ok(handle) => bound.push(handle),
            Err(RegistryError::DuplicateKey(_)) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(bound.len(), 1);
    assert_eq!(duplicates, 1);
}

// ── Concurrency ─────────────────────────────────────────────────────────

#[test]
fn concurrent_invokes_observe_only_whole_callables() {
    let registry = Registry::new();
    let add = Arc::new(Handle::bind(&registry, "math.add", |(a, b): (i32, i32)| a + b).unwrap());

    let calls = Arc::new(AtomicUsize::new(0));
    let mut workers = Vec::new();
    for _ in 0..4 {
        let add = Arc::clone(&add);
        let calls = Arc::clone(&calls);
        workers.push(thread::spawn(move || {
            for _ in 0..500 {
                let got = add.invoke((2, 3)).unwrap();
                assert!(got == 5 || got == 6, "torn read: {got}");
                calls.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for _ in 0..50 {
        let _guard = add.scoped_override(|(a, b)| a * b).unwrap();
        thread::yield_now();
    }

    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(calls.load(Ordering::Relaxed), 2000);
    assert_eq!(add.invoke((2, 3)).unwrap(), 5);
}

#[test]
fn handles_and_guards_move_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    fn assert_send<T: Send>() {}

    assert_send_sync::<Registry>();
    assert_send_sync::<Handle<(i32, i32), i32>>();
    assert_send::<OverrideGuard>();

    let registry = Registry::new();
    let inc = Handle::bind(&registry, "inc", |x: i32| x + 1).unwrap();
    let guard = inc.scoped_override(|x| x + 10).unwrap();

    // Release from another thread; the restore applies process-wide.
    thread::spawn(move || drop(guard)).join().unwrap();
    assert_eq!(inc.invoke(1).unwrap(), 2);
}
