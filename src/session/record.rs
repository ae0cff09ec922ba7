//! Submission rows
//!
//! The flat JSON row the collecting sheet ingests, one per completed trial.
//! Field names are part of the wire contract: the sheet matches columns by
//! name and deduplicates rows by `key`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rating::{AgeBucket, Demographics, Gender, RatingSnapshot};
use crate::assignment::GroupId;

/// One submitted trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub timestamp: DateTime<Utc>,
    pub participant_id: String,
    pub group_id: GroupId,
    #[serde(rename = "image_id")]
    pub stimulus_id: u32,
    /// Demographics ride only on the first row of a session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_bucket: Option<AgeBucket>,
    #[serde(flatten)]
    pub ratings: RatingSnapshot,
    /// 1-based position in the participant's shuffled order.
    pub trial_no: u32,
    pub key: String,
}

impl SubmissionRecord {
    /// The demographic snapshot, when this row carries one.
    pub fn demographics(&self) -> Option<Demographics> {
        match (self.gender, self.age_bucket) {
            (Some(gender), Some(age_bucket)) => Some(Demographics { gender, age_bucket }),
            _ => None,
        }
    }
}

/// Deduplication key for one trial. Built only from identity, group and
/// stimulus, so resubmitting the same trial always produces the same key and
/// the sheet can drop the duplicate.
pub fn submission_key(participant_id: &str, group: GroupId, stimulus_id: u32) -> String {
    format!("{participant_id}__g{}__imgid:{stimulus_id}", group.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::rating::Rating;

    fn all_threes() -> RatingSnapshot {
        let three = Rating::new(3).expect("in range");
        RatingSnapshot {
            modest_luxury: three,
            colorful_monochrome: three,
            feminine_masculine: three,
            complex_simple: three,
            classic_modern: three,
            soft_hard: three,
            heavy_light: three,
        }
    }

    #[test]
    fn key_is_stable_and_content_addressed() {
        let group = GroupId::new(3).expect("valid");
        let a = submission_key("P", group, 301);
        let b = submission_key("P", group, 301);
        assert_eq!(a, "P__g3__imgid:301");
        assert_eq!(a, b);
        assert_ne!(a, submission_key("P", group, 302));
        assert_ne!(a, submission_key("Q", group, 301));
    }

    #[test]
    fn demographics_require_both_fields() {
        let group = GroupId::new(1).expect("valid");
        let mut record = SubmissionRecord {
            timestamp: Utc::now(),
            participant_id: "P".to_string(),
            group_id: group,
            stimulus_id: 101,
            gender: Some(Gender::Unspecified),
            age_bucket: Some(AgeBucket::Forties),
            ratings: all_threes(),
            trial_no: 1,
            key: submission_key("P", group, 101),
        };
        assert!(record.demographics().is_some());
        record.age_bucket = None;
        assert!(record.demographics().is_none());
    }
}
