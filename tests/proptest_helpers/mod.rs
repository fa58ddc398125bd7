#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Train/val/test ratios that sum to 1.0 (up to float error).
pub fn arb_unit_ratios() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.0f64..=1.0)
        .prop_flat_map(|train| (Just(train), 0.0f64..=(1.0 - train)))
        .prop_map(|(train, val)| (train, val, 1.0 - train - val))
}

/// Arbitrary, possibly nonsensical ratios.
pub fn arb_any_ratios() -> impl Strategy<Value = (f64, f64, f64)> {
    (-1.0f64..3.0, -1.0f64..3.0, -1.0f64..3.0)
}
