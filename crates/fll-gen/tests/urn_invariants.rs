use fll_core::{FllError, NodeId, RngHandle};
use fll_gen::UrnRegistry;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert,
    Promote(usize),
    Deactivate(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Insert),
        5 => (0usize..64).prop_map(Op::Promote),
        1 => (0usize..64).prop_map(Op::Deactivate),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn buckets_partition_active_set_after_every_transition(ops in prop::collection::vec(op(), 1..200)) {
        let mut urn = UrnRegistry::new();
        let mut next = 0u64;
        let mut active: Vec<NodeId> = Vec::new();
        for op in ops {
            match op {
                Op::Insert => {
                    let node = NodeId::from_raw(next);
                    next += 1;
                    urn.insert(node).unwrap();
                    active.push(node);
                }
                Op::Promote(pick) if !active.is_empty() => {
                    let node = active[pick % active.len()];
                    let before = urn.class_of(node).unwrap();
                    urn.promote(node).unwrap();
                    prop_assert_eq!(urn.class_of(node), Some(before + 1));
                }
                Op::Deactivate(pick) if !active.is_empty() => {
                    let node = active.swap_remove(pick % active.len());
                    let class = urn.class_of(node).unwrap();
                    prop_assert_eq!(urn.deactivate(node).unwrap(), class);
                    prop_assert_eq!(urn.class_of(node), None);
                    prop_assert_eq!(urn.inactive_class_of(node), Some(class));
                }
                _ => {}
            }
            prop_assert!(urn.check_invariants().is_ok());
            prop_assert_eq!(urn.len(), active.len());
            let expected: u64 = active.iter().map(|n| urn.class_of(*n).unwrap() as u64).sum();
            prop_assert_eq!(urn.weight(), expected);
        }
    }

    #[test]
    fn weighted_draws_never_return_class_zero(seed in any::<u64>(), zeros in 1usize..10, ones in 1usize..10) {
        let mut urn = UrnRegistry::new();
        for raw in 0..zeros {
            urn.insert(NodeId::from_index(raw)).unwrap();
        }
        for raw in zeros..zeros + ones {
            urn.insert_at(NodeId::from_index(raw), 1).unwrap();
        }
        let mut rng = RngHandle::from_seed(seed);
        for _ in 0..50 {
            let node = urn.sample_weighted(&mut rng).unwrap();
            prop_assert_eq!(urn.class_of(node), Some(1));
        }
        prop_assert_eq!(urn.weighted_len(), ones);
    }
}

#[test]
fn weighted_draws_follow_class_weights() {
    let mut urn = UrnRegistry::new();
    urn.insert_at(NodeId::from_raw(0), 1).unwrap();
    urn.insert_at(NodeId::from_raw(1), 3).unwrap();
    let mut rng = RngHandle::from_seed(7);
    let draws = 40_000;
    let heavy = (0..draws)
        .filter(|_| urn.sample_weighted(&mut rng).unwrap() == NodeId::from_raw(1))
        .count();
    let share = heavy as f64 / draws as f64;
    assert!((share - 0.75).abs() < 0.02, "share = {share}");
}

#[test]
fn classes_far_beyond_initial_capacity_are_sampled() {
    let mut urn = UrnRegistry::new();
    let hub = NodeId::from_raw(0);
    urn.insert_at(hub, 1).unwrap();
    for _ in 0..500 {
        urn.promote(hub).unwrap();
    }
    urn.insert_at(NodeId::from_raw(1), 1).unwrap();
    urn.check_invariants().unwrap();
    assert_eq!(urn.weight(), 502);
    assert_eq!(urn.bucket_len(501), 1);

    let mut rng = RngHandle::from_seed(3);
    let hub_draws = (0..1_000)
        .filter(|_| urn.sample_weighted(&mut rng).unwrap() == hub)
        .count();
    assert!(hub_draws > 980);
}

#[test]
fn empty_aggregates_are_invariant_violations() {
    let mut urn = UrnRegistry::new();
    let mut rng = RngHandle::from_seed(1);
    let err = urn.sample_uniform(&mut rng).unwrap_err();
    assert!(matches!(err, FllError::Invariant(ref info) if info.code == "urn-empty"));

    urn.insert(NodeId::from_raw(0)).unwrap();
    let err = urn.sample_weighted(&mut rng).unwrap_err();
    assert_eq!(err.info().context.get("active").map(String::as_str), Some("1"));
    assert_eq!(err.info().context.get("weight").map(String::as_str), Some("0"));

    let err = urn
        .sample_uniform_excluding(NodeId::from_raw(0), &mut rng)
        .unwrap_err();
    assert_eq!(err.info().code, "urn-empty");
}

#[test]
fn uniform_excluding_skips_the_excluded_node() {
    let mut urn = UrnRegistry::new();
    for raw in 0..3 {
        urn.insert_at(NodeId::from_raw(raw), raw as usize).unwrap();
    }
    let mut rng = RngHandle::from_seed(11);
    for _ in 0..200 {
        assert_ne!(
            urn.sample_uniform_excluding(NodeId::from_raw(1), &mut rng).unwrap(),
            NodeId::from_raw(1)
        );
    }
}

#[test]
fn tracked_nodes_cannot_be_inserted_twice() {
    let mut urn = UrnRegistry::new();
    let node = NodeId::from_raw(4);
    urn.insert(node).unwrap();
    assert_eq!(urn.insert(node).unwrap_err().info().code, "urn-duplicate");
    urn.promote(node).unwrap();
    urn.deactivate(node).unwrap();
    assert_eq!(urn.insert_at(node, 2).unwrap_err().info().code, "urn-duplicate");
    assert_eq!(urn.promote(node).unwrap_err().info().code, "urn-promote");
    assert_eq!(urn.inactive_len(), 1);
    assert!(urn.is_empty());
}

#[test]
fn inactive_nodes_are_disjoint_from_active_ones() {
    let mut urn = UrnRegistry::new();
    for raw in 0..4 {
        urn.insert_at(NodeId::from_raw(raw), 1).unwrap();
    }
    urn.deactivate(NodeId::from_raw(2)).unwrap();
    urn.deactivate(NodeId::from_raw(0)).unwrap();
    urn.check_invariants().unwrap();
    assert_eq!(urn.len(), 2);
    assert_eq!(urn.inactive_len(), 2);
    assert_eq!(urn.weight(), 2);
}
