use super::features::ColorSignature;
use super::taxonomy::{self, CLASS_TAXONOMY};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Green must beat both other channel means by this factor to read as healthy.
pub const GREEN_DOMINANCE: f64 = 1.2;

/// One in `HEALTHY_ODDS` filenames lands in the healthy subset.
pub const HEALTHY_ODDS: u64 = 4;

/// 64-bit FNV-1a over the UTF-8 bytes of `input`.
///
/// Stored predictions depend on this exact function; std's `Hash` is seeded
/// per process and cannot be used here.
pub fn fnv1a_64(input: &str) -> u64 {
    input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

fn triple_key(values: &[f64; 3]) -> String {
    format!("{:.6},{:.6},{:.6}", values[0], values[1], values[2])
}

fn pick(subset: &[&'static str], hash: u64) -> &'static str {
    if subset.is_empty() {
        return CLASS_TAXONOMY[0];
    }
    subset[(hash % subset.len() as u64) as usize]
}

pub fn looks_healthy(signature: &ColorSignature) -> bool {
    signature.green() > signature.red() * GREEN_DOMINANCE
        && signature.green() > signature.blue() * GREEN_DOMINANCE
}

/// Picks a label from decoded colour statistics.
pub fn select_by_signature(signature: &ColorSignature) -> &'static str {
    let mean_key = triple_key(&signature.mean);
    if looks_healthy(signature) {
        return pick(taxonomy::healthy_classes(), fnv1a_64(&mean_key));
    }
    let key = format!("{}|{}", mean_key, triple_key(&signature.std_dev));
    pick(taxonomy::diseased_classes(), fnv1a_64(&key))
}

/// Picks a label from the upload's filename alone.
pub fn select_by_name(filename: &str) -> &'static str {
    let hash = fnv1a_64(filename);
    if hash % HEALTHY_ODDS == 0 {
        pick(taxonomy::healthy_classes(), hash)
    } else {
        pick(taxonomy::diseased_classes(), hash)
    }
}
