use fll_core::derive_substream_seed;

/// Seed of realization `index` in a batch driven by `master_seed`.
pub fn realization_seed(master_seed: u64, index: usize) -> u64 {
    derive_substream_seed(master_seed, index as u64)
}

/// Directory name used for realization `index` inside a batch output root.
pub fn realization_dir_name(index: usize) -> String {
    format!("realization-{index:03}")
}
