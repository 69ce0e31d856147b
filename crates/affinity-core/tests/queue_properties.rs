//! Property tests for the decrease-key priority queue.
//!
//! These check invariants that should hold for any sequence of operations:
//! - pops come out in non-decreasing priority order
//! - a re-prioritized key pops with its latest priority
//! - membership matches inserted-minus-removed

use affinity_core::PriorityQueue;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, u16),
    Change(u8, u16),
    Remove(u8),
    Pop,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), any::<u16>()).prop_map(|(k, p)| Op::Insert(k, p)),
        (any::<u8>(), any::<u16>()).prop_map(|(k, p)| Op::Change(k, p)),
        any::<u8>().prop_map(Op::Remove),
        Just(Op::Pop),
    ]
}

proptest! {
    #[test]
    fn pops_are_non_decreasing(priorities in prop::collection::vec(0u32..1000, 0..200)) {
        let mut queue = PriorityQueue::new();
        for (key, priority) in priorities.iter().enumerate() {
            queue.insert(key, *priority).unwrap();
        }

        let mut last = 0;
        let mut popped = 0;
        while let Ok((_, priority)) = queue.pop() {
            prop_assert!(priority >= last);
            last = priority;
            popped += 1;
        }
        prop_assert_eq!(popped, priorities.len());
    }

    #[test]
    fn change_priority_then_pop_reflects_new_value(
        priorities in prop::collection::vec(1u32..1000, 1..100),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut queue = PriorityQueue::new();
        for (key, priority) in priorities.iter().enumerate() {
            queue.insert(key, *priority).unwrap();
        }

        let target = pick.index(priorities.len());
        queue.change_priority(&target, 0).unwrap();
        prop_assert_eq!(queue.pop().unwrap(), (target, 0));
    }

    #[test]
    fn matches_reference_model(ops in prop::collection::vec(arb_op(), 0..300)) {
        let mut queue = PriorityQueue::new();
        let mut model: HashMap<u8, u16> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(k, p) => {
                    let inserted = queue.insert(k, p).is_ok();
                    prop_assert_eq!(inserted, !model.contains_key(&k));
                    model.entry(k).or_insert(p);
                }
                Op::Change(k, p) => {
                    let changed = queue.change_priority(&k, p).is_ok();
                    prop_assert_eq!(changed, model.contains_key(&k));
                    if let Some(slot) = model.get_mut(&k) {
                        *slot = p;
                    }
                }
                Op::Remove(k) => {
                    prop_assert_eq!(queue.remove(&k), model.remove(&k));
                }
                Op::Pop => match queue.pop() {
                    Ok((k, p)) => {
                        let min = model.values().copied().min();
                        prop_assert_eq!(Some(p), min);
                        prop_assert_eq!(model.remove(&k), Some(p));
                    }
                    Err(_) => prop_assert!(model.is_empty()),
                },
            }

            prop_assert_eq!(queue.len(), model.len());
            for key in model.keys() {
                prop_assert!(queue.contains(key));
            }
        }
    }

    #[test]
    fn ordered_view_matches_drain(priorities in prop::collection::vec(0u32..50, 0..100)) {
        let mut queue = PriorityQueue::new();
        for (key, priority) in priorities.iter().enumerate() {
            queue.insert(key, *priority).unwrap();
        }

        let view: Vec<u32> = queue.ordered_view().into_iter().map(|(_, p)| p).collect();
        let mut drained = Vec::new();
        while let Ok((_, p)) = queue.pop() {
            drained.push(p);
        }
        prop_assert_eq!(view, drained);
    }
}
