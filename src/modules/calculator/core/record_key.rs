// Keys for operation records: "<prefix>_<NN>" with NN drawn from [0, 1000).
//
// The suffix is zero-padded to two digits only, so keys are short but not
// unique. A repeated suffix overwrites the earlier record.

use rand::Rng;

pub const SUFFIX_BOUND: u32 = 1000;

pub trait SuffixSource: Send + Sync {
    fn next_suffix(&self) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&self) -> u32 {
        rand::thread_rng().gen_range(0..SUFFIX_BOUND)
    }
}

pub fn record_key(prefix: &str, suffix: u32) -> String {
    format!("{prefix}_{suffix:02}")
}

/// Prefix handed to the store when listing records, so unrelated keys that
/// merely start with the same word are left alone.
pub fn record_prefix(prefix: &str) -> String {
    format!("{prefix}_")
}
