//! Readers and writers sharing one `HashRing`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use corelib::ring::HashRing;
use corelib::{Error, NodeId};

#[test]
fn test_concurrent_writers_are_serialized() {
    let ring = HashRing::new();

    crossbeam::scope(|s| {
        for writer in 0..8 {
            let ring = &ring;
            s.spawn(move |_| {
                for i in 0..10 {
                    ring.add_node(format!("w{writer}-n{i}"), 8).unwrap();
                }
            });
        }
    })
    .unwrap();

    let snapshot = ring.snapshot();
    snapshot.verify();
    assert_eq!(snapshot.node_count(), 80);
    assert_eq!(snapshot.token_count(), 640);
    assert_eq!(snapshot.epoch(), 80);
}

#[test]
fn test_concurrent_duplicate_adds_register_once() {
    let ring = HashRing::new();
    let accepted = AtomicUsize::new(0);
    let rejected = AtomicUsize::new(0);

    crossbeam::scope(|s| {
        for _ in 0..8 {
            s.spawn(|_| match ring.add_node("A", 3) {
                Ok(()) => {
                    accepted.fetch_add(1, Ordering::SeqCst);
                }
                Err(Error::DuplicateNode(_)) => {
                    rejected.fetch_add(1, Ordering::SeqCst);
                }
                Err(other) => panic!("unexpected error {other}"),
            });
        }
    })
    .unwrap();

    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert_eq!(rejected.load(Ordering::SeqCst), 7);
    assert_eq!(ring.token_count(), 3);
}

#[test]
fn test_readers_never_see_partial_ring() {
    let ring = HashRing::new();
    ring.add_node("stable", 16).unwrap();
    let done = AtomicBool::new(false);

    crossbeam::scope(|s| {
        for reader in 0..4 {
            let ring = &ring;
            let done = &done;
            s.spawn(move |_| {
                let mut i = 0u64;
                while !done.load(Ordering::Acquire) {
                    let snapshot = ring.snapshot();
                    snapshot.verify();
                    let key = format!("r{reader}-{i}");
                    let owner = snapshot.lookup(&key).unwrap();
                    assert!(snapshot.contains_node(owner.as_str()));
                    assert_eq!(snapshot.token_count(), snapshot.node_count() * 16);
                    i += 1;
                }
            });
        }

        s.spawn(|_| {
            for round in 0..50 {
                let node = format!("churn-{}", round % 5);
                ring.add_node(node.as_str(), 16).unwrap();
                ring.remove_node(&node).unwrap();
            }
            done.store(true, Ordering::Release);
        });
    })
    .unwrap();

    assert_eq!(ring.list_nodes(), vec![NodeId::from("stable")]);
}

#[test]
fn test_mutation_visible_to_later_lookups_on_other_threads() {
    let ring = HashRing::new();
    ring.add_node("A", 64).unwrap();

    crossbeam::scope(|s| {
        s.spawn(|_| ring.add_node("B", 64).unwrap()).join().unwrap();

        s.spawn(|_| {
            assert!(ring.contains_node("B"));
            let owners: std::collections::HashSet<_> =
                (0..1_000).map(|i| ring.lookup(format!("k{i}")).unwrap()).collect();
            assert_eq!(owners.len(), 2);
        });
    })
    .unwrap();
}
