use fll_core::rng::{derive_substream_seed, RngHandle};
use rand::RngCore;

#[test]
fn rng_emits_reproducible_sequence() {
    let mut rng_a = RngHandle::from_seed(1234);
    let mut rng_b = RngHandle::from_seed(1234);

    let seq_a: Vec<u64> = (0..100).map(|_| rng_a.next_u64()).collect();
    let seq_b: Vec<u64> = (0..100).map(|_| rng_b.next_u64()).collect();

    assert_eq!(seq_a, seq_b);
}

#[test]
fn unit_draws_stay_in_half_open_interval() {
    let mut rng = RngHandle::from_seed(7);
    for _ in 0..10_000 {
        let value = rng.unit();
        assert!((0.0..1.0).contains(&value));
    }
}

#[test]
fn substreams_are_stable_and_distinct() {
    assert_eq!(derive_substream_seed(42, 0), derive_substream_seed(42, 0));
    assert_ne!(derive_substream_seed(42, 0), derive_substream_seed(42, 1));

    let mut a = RngHandle::substream(42, 3);
    let mut b = RngHandle::from_seed(derive_substream_seed(42, 3));
    assert_eq!(a.next_u64(), b.next_u64());
}
