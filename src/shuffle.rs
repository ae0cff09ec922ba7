//! Deterministic stimulus ordering
//!
//! Gives every participant their own stable presentation order: the same
//! participant and group always shuffle the same way, two participants almost
//! never share an order. Seeding is a 32-bit FNV-1a accumulation over the
//! UTF-16 code units of a seed label, feeding a mulberry32 generator that
//! drives one Fisher-Yates pass. All arithmetic wraps at 32 bits so the
//! permutation matches the survey front-ends that shipped this scheme.

/// FNV-1a (32-bit) over the UTF-16 code units of `label`.
pub fn fnv1a_utf16(label: &str) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for unit in label.encode_utf16() {
        hash ^= u32::from(unit);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}

/// mulberry32: a tiny 32-bit mix-based PRNG. One state word, one additive
/// constant, two avalanche rounds per draw.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next draw mapped onto the unit interval `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

/// Seed label for one participant's pass over one group.
pub fn seed_label(participant_id: &str, group: u8) -> String {
    format!("{participant_id}::g{group}")
}

/// Fisher-Yates permutation of `items`, fully determined by `seed`.
pub fn stable_shuffle<T: Clone>(items: &[T], seed: &str) -> Vec<T> {
    let mut rng = Mulberry32::new(fnv1a_utf16(seed));
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = (rng.next_f64() * (i as f64 + 1.0)).floor() as usize;
        shuffled.swap(i, j);
    }
    shuffled
}
