//! Stimulus catalog
//!
//! The fixed five-group image pool. Each group carries exactly six stimuli;
//! ids encode the group in their hundreds digit. The catalog is baked in
//! because the study design is fixed per deployment and the ids must stay in
//! lockstep with the sheet that aggregates submissions.

use std::fmt;

use crate::assignment::GroupId;

pub const GROUP_COUNT: usize = 5;
pub const STIMULI_PER_GROUP: usize = 6;

/// Display aspect of a stimulus image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    /// Portrait 2:3 frame.
    Tall,
    /// Square 1:1 frame.
    Square,
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aspect::Tall => write!(f, "2:3"),
            Aspect::Square => write!(f, "1:1"),
        }
    }
}

/// One image in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stimulus {
    /// Stable numeric id, unique across every group.
    pub id: u32,
    /// Asset path relative to the media root.
    pub locator: &'static str,
    pub aspect: Aspect,
}

const GROUP_1: [Stimulus; STIMULI_PER_GROUP] = [
    Stimulus { id: 101, locator: "/groups/g1/Consciousness-1.png", aspect: Aspect::Tall },
    Stimulus { id: 102, locator: "/groups/g1/Conversations-3.png", aspect: Aspect::Tall },
    Stimulus { id: 103, locator: "/groups/g1/Identity-2.png", aspect: Aspect::Tall },
    Stimulus { id: 104, locator: "/groups/g1/Integrity-1.png", aspect: Aspect::Tall },
    Stimulus { id: 105, locator: "/groups/g1/Materiality-3.png", aspect: Aspect::Tall },
    Stimulus { id: 106, locator: "/groups/g1/Relationship-2.png", aspect: Aspect::Tall },
];

const GROUP_2: [Stimulus; STIMULI_PER_GROUP] = [
    Stimulus { id: 201, locator: "/groups/g2/Consciousness-2.png", aspect: Aspect::Tall },
    Stimulus { id: 202, locator: "/groups/g2/Evolvability-1.png", aspect: Aspect::Tall },
    Stimulus { id: 203, locator: "/groups/g2/Identity-3.png", aspect: Aspect::Tall },
    Stimulus { id: 204, locator: "/groups/g2/Integrity-2.png", aspect: Aspect::Tall },
    Stimulus { id: 205, locator: "/groups/g2/Narratives-1.png", aspect: Aspect::Tall },
    Stimulus { id: 206, locator: "/groups/g2/Relationship-3.png", aspect: Aspect::Tall },
];

const GROUP_3: [Stimulus; STIMULI_PER_GROUP] = [
    Stimulus { id: 301, locator: "/groups/g3/Consciousness-3.png", aspect: Aspect::Tall },
    Stimulus { id: 302, locator: "/groups/g3/Evolvability-2.png", aspect: Aspect::Tall },
    Stimulus { id: 303, locator: "/groups/g3/Imagination-1.png", aspect: Aspect::Tall },
    Stimulus { id: 304, locator: "/groups/g3/Integrity-3.png", aspect: Aspect::Tall },
    Stimulus { id: 305, locator: "/groups/g3/Narratives-2.png", aspect: Aspect::Tall },
    Stimulus { id: 306, locator: "/groups/g3/Tumbler-Reference-1.png", aspect: Aspect::Square },
];

const GROUP_4: [Stimulus; STIMULI_PER_GROUP] = [
    Stimulus { id: 401, locator: "/groups/g4/Conversations-1.png", aspect: Aspect::Tall },
    Stimulus { id: 402, locator: "/groups/g4/Evolvability-3.png", aspect: Aspect::Tall },
    Stimulus { id: 403, locator: "/groups/g4/Imagination-2.png", aspect: Aspect::Tall },
    Stimulus { id: 404, locator: "/groups/g4/Materiality-1.png", aspect: Aspect::Tall },
    Stimulus { id: 405, locator: "/groups/g4/Narratives-3.png", aspect: Aspect::Tall },
    Stimulus { id: 406, locator: "/groups/g4/Tumbler-Reference-2.png", aspect: Aspect::Square },
];

const GROUP_5: [Stimulus; STIMULI_PER_GROUP] = [
    Stimulus { id: 501, locator: "/groups/g5/Conversations-2.png", aspect: Aspect::Tall },
    Stimulus { id: 502, locator: "/groups/g5/Identity-1.png", aspect: Aspect::Tall },
    Stimulus { id: 503, locator: "/groups/g5/Imagination-3.png", aspect: Aspect::Tall },
    Stimulus { id: 504, locator: "/groups/g5/Materiality-2.png", aspect: Aspect::Tall },
    Stimulus { id: 505, locator: "/groups/g5/Relationship-1.png", aspect: Aspect::Tall },
    Stimulus { id: 506, locator: "/groups/g5/Tumbler-Reference-3.png", aspect: Aspect::Square },
];

/// Stimuli of one group, in catalog (pre-shuffle) order.
pub fn group_catalog(group: GroupId) -> &'static [Stimulus] {
    match group.get() {
        1 => &GROUP_1,
        2 => &GROUP_2,
        3 => &GROUP_3,
        4 => &GROUP_4,
        _ => &GROUP_5,
    }
}

/// Look a stimulus up by id across every group.
pub fn find_stimulus(id: u32) -> Option<Stimulus> {
    GroupId::all()
        .into_iter()
        .flat_map(|g| group_catalog(g).iter())
        .find(|s| s.id == id)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_group_has_six_stimuli() {
        for group in GroupId::all() {
            assert_eq!(group_catalog(group).len(), STIMULI_PER_GROUP);
        }
    }

    #[test]
    fn ids_are_unique_and_encode_their_group() {
        let mut seen = HashSet::new();
        for group in GroupId::all() {
            for stimulus in group_catalog(group) {
                assert!(seen.insert(stimulus.id), "duplicate id {}", stimulus.id);
                assert_eq!(stimulus.id / 100, u32::from(group.get()));
            }
        }
        assert_eq!(seen.len(), GROUP_COUNT * STIMULI_PER_GROUP);
    }

    #[test]
    fn find_stimulus_hits_and_misses() {
        let found = find_stimulus(305).expect("305 exists");
        assert_eq!(found.locator, "/groups/g3/Narratives-2.png");
        assert!(find_stimulus(999).is_none());
        assert!(find_stimulus(0).is_none());
    }

    #[test]
    fn reference_tumblers_are_square() {
        for id in [306, 406, 506] {
            let stimulus = find_stimulus(id).expect("tumbler exists");
            assert_eq!(stimulus.aspect, Aspect::Square);
        }
    }
}
