use std::hash::Hasher;

use rustc_hash::FxHasher;

/// Hash used wherever a value must not change between runs of the compiler:
/// class dispatch keys, subdirectory buckets, output content hashes.
pub fn stable_hash(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    hasher.write_usize(bytes.len());
    hasher.finish()
}
