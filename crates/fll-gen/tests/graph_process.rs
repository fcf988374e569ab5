use fll_core::{ConfigReason, ParameterSpec, RngHandle, SeedingPolicy, Termination};
use fll_gen::{
    run, run_to_completion, GraphGenerator, NoopProgress, Process, Transition, PROGRESS_INTERVAL,
};
use proptest::prelude::*;

#[test]
fn scenario_a_reaches_target_without_self_loops() {
    let params = ParameterSpec::graph(0.3, 0.8, 5, SeedingPolicy::Isolated)
        .with_target_nodes(10_000)
        .validate()
        .unwrap();
    let realization = run(&params, 20_240_301, &mut NoopProgress).unwrap();
    let graph = realization.output.as_graph().unwrap();

    assert_eq!(graph.node_count(), 10_000);
    assert_eq!(realization.summary.termination, Termination::TargetNodes);
    assert!(graph.weighted_edges().all(|(a, b, weight)| a != b && weight >= 1));
    let degree_sum: u64 = graph.degrees().iter().sum();
    assert_eq!(degree_sum, 2 * graph.total_weight());
    assert_eq!(
        realization.summary.insertions as usize,
        10_000 - params.initial_nodes()
    );
    graph.check_invariants().unwrap();
}

#[test]
fn scenario_a_reaches_target_for_every_seed() {
    for seeding in [SeedingPolicy::Isolated, SeedingPolicy::Attach] {
        let params = ParameterSpec::graph(0.3, 0.8, 5, seeding)
            .with_target_nodes(10_000)
            .validate()
            .unwrap();
        for seed in 0..64 {
            let realization = run(&params, seed, &mut NoopProgress)
                .unwrap_or_else(|err| panic!("{seeding:?} seed {seed}: {err}"));
            assert_eq!(realization.summary.nodes, 10_000);
            assert_eq!(realization.summary.termination, Termination::TargetNodes);
            realization.output.as_graph().unwrap().check_invariants().unwrap();
        }
    }
}

#[test]
fn drained_urn_records_idle_steps_and_still_reaches_target() {
    let params = ParameterSpec::graph(0.5, 0.3, 2, SeedingPolicy::Isolated)
        .with_target_nodes(2_000)
        .validate()
        .unwrap();
    let mut idle_runs = 0;
    for seed in 0..32 {
        let mut generator = GraphGenerator::new(&params).unwrap();
        let mut rng = RngHandle::from_seed(seed);
        run_to_completion(&mut generator, &mut rng, &mut NoopProgress).unwrap();
        generator.check_invariants().unwrap();
        assert_eq!(generator.node_count(), 2_000);
        let counts = generator.counts();
        assert_eq!(counts.total(), generator.steps());
        assert_eq!(counts.insertions, 2_000 - 2);
        if counts.idle > 0 {
            idle_runs += 1;
        }
    }
    assert!(idle_runs > 0);
}

#[test]
fn idle_step_leaves_the_state_unchanged() {
    let params = ParameterSpec::graph(0.5, 0.3, 2, SeedingPolicy::Attach)
        .with_max_steps(5_000)
        .validate()
        .unwrap();
    let mut generator = GraphGenerator::new(&params).unwrap();
    let mut rng = RngHandle::from_seed(17);
    while generator.termination().is_none() {
        let nodes = generator.node_count();
        let weight = generator.graph().total_weight();
        let active = generator.urn().len();
        if generator.step(&mut rng).unwrap() == Transition::Idle {
            assert_eq!(generator.node_count(), nodes);
            assert_eq!(generator.graph().total_weight(), weight);
            assert_eq!(generator.urn().len(), active);
        }
    }
    generator.check_invariants().unwrap();
}

#[test]
fn attach_seeding_connects_every_inserted_node() {
    let params = ParameterSpec::graph(0.4, 0.9, 4, SeedingPolicy::Attach)
        .with_target_nodes(2_000)
        .validate()
        .unwrap();
    let mut generator = GraphGenerator::new(&params).unwrap();
    let mut rng = RngHandle::from_seed(5);
    run_to_completion(&mut generator, &mut rng, &mut NoopProgress).unwrap();
    generator.check_invariants().unwrap();
    assert!(generator.graph().degrees().iter().all(|degree| *degree >= 1));
}

#[test]
fn isolated_seeding_inserts_at_degree_zero() {
    let params = ParameterSpec::graph(0.5, 0.9, 3, SeedingPolicy::Isolated)
        .with_max_steps(1_000)
        .validate()
        .unwrap();
    let mut generator = GraphGenerator::new(&params).unwrap();
    let mut rng = RngHandle::from_seed(9);
    loop {
        let before = generator.graph().total_weight();
        if generator.step(&mut rng).unwrap() == Transition::Insert {
            let node = fll_core::NodeId::from_index(generator.node_count() - 1);
            assert_eq!(generator.urn().class_of(node), Some(0));
            assert_eq!(generator.graph().total_weight(), before);
            break;
        }
    }
}

#[test]
fn initial_state_is_a_path() {
    let params = ParameterSpec::graph(0.3, 0.8, 5, SeedingPolicy::Isolated)
        .with_target_nodes(5)
        .validate()
        .unwrap();
    let generator = GraphGenerator::new(&params).unwrap();
    assert_eq!(generator.graph().degrees(), &[1, 2, 2, 2, 1]);
    assert_eq!(generator.urn().weight(), 8);
    assert_eq!(generator.termination(), Some(Termination::TargetNodes));

    let realization = run(&params, 1, &mut NoopProgress).unwrap();
    assert_eq!(realization.summary.steps, 0);
}

#[test]
fn step_cap_is_hit_exactly() {
    let params = ParameterSpec::graph(0.3, 0.9, 5, SeedingPolicy::Attach)
        .with_max_steps(4_321)
        .validate()
        .unwrap();
    let realization = run(&params, 77, &mut NoopProgress).unwrap();
    assert_eq!(realization.summary.steps, 4_321);
    assert_eq!(realization.summary.termination, Termination::StepCap);
    let counts = realization.summary.insertions
        + realization.summary.formations
        + realization.summary.deactivations
        + realization.summary.idle;
    assert_eq!(counts, 4_321);
}

#[test]
fn node_target_takes_precedence_over_step_cap() {
    let params = ParameterSpec::graph(0.5, 0.9, 5, SeedingPolicy::Attach)
        .with_target_nodes(60)
        .with_max_steps(1_000_000)
        .validate()
        .unwrap();
    let realization = run(&params, 3, &mut NoopProgress).unwrap();
    assert_eq!(realization.summary.termination, Termination::TargetNodes);
    assert_eq!(realization.summary.nodes, 60);

    let capped = ParameterSpec::graph(0.5, 0.9, 5, SeedingPolicy::Attach)
        .with_target_nodes(1_000_000)
        .with_max_steps(200)
        .validate()
        .unwrap();
    let realization = run(&capped, 3, &mut NoopProgress).unwrap();
    assert_eq!(realization.summary.termination, Termination::StepCap);
    assert_eq!(realization.summary.steps, 200);
}

#[test]
fn progress_sink_sees_every_thousandth_step() {
    let params = ParameterSpec::graph(0.3, 0.9, 5, SeedingPolicy::Isolated)
        .with_max_steps(3_500)
        .validate()
        .unwrap();
    let mut calls: Vec<(u64, usize, usize)> = Vec::new();
    let mut sink = |steps: u64, nodes: usize, edges: usize| calls.push((steps, nodes, edges));
    let realization = run(&params, 42, &mut sink).unwrap();

    let steps: Vec<u64> = calls.iter().map(|call| call.0).collect();
    assert_eq!(steps, vec![1_000, 2_000, 3_000]);
    assert!(steps.iter().all(|s| s % PROGRESS_INTERVAL == 0));
    assert!(calls.windows(2).all(|w| w[0].1 <= w[1].1 && w[0].2 <= w[1].2));
    let last = calls[calls.len() - 1];
    assert!(last.1 <= realization.summary.nodes);
    assert!(last.2 <= realization.summary.edges);

    let silent = run(&params, 42, &mut NoopProgress).unwrap();
    assert_eq!(silent.output, realization.output);
}

#[test]
fn non_graph_parameters_are_rejected() {
    let params = ParameterSpec::hypergraph(0.3, 0.9, 5, fll_core::HypergraphMode::Regular)
        .with_max_steps(10)
        .validate()
        .unwrap();
    let err = GraphGenerator::new(&params).unwrap_err();
    assert_eq!(err.config_reason(), Some(ConfigReason::KindMismatch));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn invariants_hold_after_every_step(seed in any::<u64>(), attach in any::<bool>()) {
        let seeding = if attach { SeedingPolicy::Attach } else { SeedingPolicy::Isolated };
        let params = ParameterSpec::graph(0.4, 0.95, 8, seeding)
            .with_max_steps(300)
            .validate()
            .unwrap();
        let mut generator = GraphGenerator::new(&params).unwrap();
        let mut rng = RngHandle::from_seed(seed);
        while generator.termination().is_none() {
            generator.step(&mut rng).unwrap();
            prop_assert!(generator.check_invariants().is_ok());
        }
        prop_assert_eq!(generator.steps(), 300);
    }
}
