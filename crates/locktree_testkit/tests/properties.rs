//! Property tests: random operation sequences checked against the oracle.

use locktree_core::{
    deep_copy_locks_tree_path, get_node, is_lock_available, LockConfig, LockEngine,
    SchedulingPolicy, Segment,
};
use locktree_testkit::prelude::*;
use proptest::prelude::*;
use std::sync::Arc;

fn run(policy: SchedulingPolicy, ops: &[LockOp]) {
    init_tracing();
    let mut harness = OpHarness::new(LockEngine::with_config(LockConfig::new().policy(policy)));
    for op in ops {
        harness.apply(op);
        harness.assert_consistent();
    }
    harness.drain();
    harness.assert_consistent();

    let state = harness.engine.snapshot();
    assert!(state.tree().is_empty(), "tree not empty after draining");
    assert!(harness.pending.is_empty());
}

proptest! {
    #![proptest_config(CaseBudget::from_env().config())]

    #[test]
    fn most_recent_first_keeps_exclusion(ops in op_sequence_strategy(1, 60)) {
        run(SchedulingPolicy::MostRecentFirst, &ops);
    }

    #[test]
    fn fifo_keeps_exclusion(ops in op_sequence_strategy(1, 60)) {
        run(SchedulingPolicy::Fifo, &ops);
    }

    #[test]
    fn checker_matches_oracle(
        holds in prop::collection::vec((store_strategy(), path_strategy(3), any::<bool>()), 0..8),
        store in store_strategy(),
        path in path_strategy(3),
        exclusive in any::<bool>(),
    ) {
        // grant only what the engine grants, so the held set stays legal
        let engine = LockEngine::new();
        let mut held = Vec::new();
        let mut waiting = Vec::new();
        for (s, p, x) in holds {
            match engine.acquire(store_key(s), LockOp::segments(&p), x).try_take() {
                Ok(result) => held.push(result.unwrap()),
                Err(future) => waiting.push(future),
            }
        }

        let segments = LockOp::segments(&path);
        let state = engine.snapshot();
        prop_assert_eq!(
            is_lock_available(state.tree(), &store_key(store), &segments, exclusive),
            expected_available(&held, &store_key(store), &segments, exclusive)
        );
    }

    #[test]
    fn path_copy_shares_everything_off_path(
        holds in prop::collection::vec((store_strategy(), path_strategy(3)), 1..10),
        store in store_strategy(),
        path in path_strategy(3),
    ) {
        let engine = LockEngine::new();
        let mut kept = Vec::new();
        for (s, p) in holds {
            if let Ok(result) = engine.acquire(store_key(s), LockOp::segments(&p), false).try_take() {
                kept.push(result.unwrap());
            }
        }

        let state = engine.snapshot();
        let copy_path: Vec<Segment> = std::iter::once(Segment::from(store_key(store)))
            .chain(LockOp::segments(&path))
            .collect();
        let copy = deep_copy_locks_tree_path(state.tree(), &copy_path);

        // walk both trees along the copied path
        let mut original = Some(state.tree().as_ref());
        let mut copied = copy.as_ref();
        for segment in &copy_path {
            if let Some(node) = original {
                for (name, child) in node.children() {
                    if name != segment {
                        prop_assert!(Arc::ptr_eq(child, &copied.children()[name]));
                    }
                }
            }
            original = original.and_then(|node| node.child(segment.as_str())).map(Arc::as_ref);
            copied = copied.child(segment.as_str()).unwrap().as_ref();
        }
        prop_assert!(get_node(&copy, copy_path.iter()).is_some());
        prop_assert_eq!(state.held_locks().len(), kept.len());
    }
}

#[test]
fn release_then_reacquire_round_trip() {
    let engine = LockEngine::new();
    let holder = expect_granted(engine.acquire("s", ["a"], true));
    let blocked = expect_pending(engine.acquire("s", ["a", "b"], false));

    engine.release(&holder);
    let granted = expect_granted(blocked);
    assert!(engine.snapshot().holds(&granted));
}
