//! Wire shapes: submission rows out, summary payloads in.

use chrono::Utc;
use serde_json::{json, Value};

use kansei_survey::assignment::GroupId;
use kansei_survey::gateway::{ImageSummary, SummaryList};
use kansei_survey::session::rating::{
    AgeBucket, Dimension, Gender, Rating, RatingSnapshot,
};
use kansei_survey::session::{submission_key, SubmissionRecord};

fn rating(value: u8) -> Rating {
    Rating::new(value).expect("in range")
}

fn snapshot() -> RatingSnapshot {
    RatingSnapshot {
        modest_luxury: rating(1),
        colorful_monochrome: rating(2),
        feminine_masculine: rating(3),
        complex_simple: rating(4),
        classic_modern: rating(5),
        soft_hard: rating(1),
        heavy_light: rating(2),
    }
}

fn first_trial_record() -> SubmissionRecord {
    let group = GroupId::new(3).expect("valid group");
    SubmissionRecord {
        timestamp: Utc::now(),
        participant_id: "P".to_string(),
        group_id: group,
        stimulus_id: 301,
        gender: Some(Gender::Male),
        age_bucket: Some(AgeBucket::Twenties),
        ratings: snapshot(),
        trial_no: 1,
        key: submission_key("P", group, 301),
    }
}

#[test]
fn first_trial_row_carries_every_column() {
    let value = serde_json::to_value(first_trial_record()).expect("serialize");
    let object = value.as_object().expect("object");

    assert!(object["timestamp"].is_string());
    assert_eq!(object["participant_id"], json!("P"));
    assert_eq!(object["group_id"], json!(3));
    assert_eq!(object["image_id"], json!(301));
    assert!(object.get("stimulus_id").is_none(), "wire name is image_id");
    assert_eq!(object["gender"], json!(1));
    assert_eq!(object["age_bucket"], json!(3));
    assert_eq!(object["modest_luxury"], json!(1));
    assert_eq!(object["colorful_monochrome"], json!(2));
    assert_eq!(object["feminine_masculine"], json!(3));
    assert_eq!(object["complex_simple"], json!(4));
    assert_eq!(object["classic_modern"], json!(5));
    assert_eq!(object["soft_hard"], json!(1));
    assert_eq!(object["heavy_light"], json!(2));
    assert_eq!(object["trial_no"], json!(1));
    assert_eq!(object["key"], json!("P__g3__imgid:301"));
}

#[test]
fn later_rows_omit_the_demographic_columns() {
    let mut record = first_trial_record();
    record.gender = None;
    record.age_bucket = None;
    record.trial_no = 4;

    let value = serde_json::to_value(&record).expect("serialize");
    let object = value.as_object().expect("object");
    assert!(object.get("gender").is_none());
    assert!(object.get("age_bucket").is_none());
}

#[test]
fn rows_round_trip_through_json() {
    let record = first_trial_record();
    let text = serde_json::to_string(&record).expect("serialize");
    let back: SubmissionRecord = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, record);
}

#[test]
fn out_of_range_row_values_fail_to_parse() {
    let mut value = serde_json::to_value(first_trial_record()).expect("serialize");
    value["soft_hard"] = json!(9);
    assert!(serde_json::from_value::<SubmissionRecord>(value.clone()).is_err());

    value["soft_hard"] = json!(2);
    value["group_id"] = json!(0);
    assert!(serde_json::from_value::<SubmissionRecord>(value).is_err());
}

#[test]
fn summary_list_parses_the_full_shape() {
    let body = json!({
        "images": [
            { "image_id": 301, "n": 4 },
            { "image_id": 305, "n": 1 },
        ],
        "total": 5,
    });
    let list: SummaryList = serde_json::from_value(body).expect("parse");
    assert_eq!(list.total, 5);
    assert_eq!(list.images.len(), 2);
    assert_eq!(list.images[0].image_id, 301);
    assert_eq!(list.images[0].n, 4);
}

#[test]
fn summary_list_tolerates_sparse_payloads() {
    let empty: SummaryList = serde_json::from_value(json!({})).expect("parse");
    assert_eq!(empty.total, 0);
    assert!(empty.images.is_empty());

    let partial: SummaryList =
        serde_json::from_value(json!({ "images": [{ "image_id": 101 }] })).expect("parse");
    assert_eq!(partial.images[0].n, 0, "missing count reads as zero");
}

#[test]
fn image_summary_reads_cells_and_defaults_to_zero() {
    let body = json!({
        "counts": {
            "modest_luxury": { "1": 2, "3": 1 },
            "soft_hard": { "5": 7 },
        }
    });
    let summary: ImageSummary = serde_json::from_value(body).expect("parse");

    assert_eq!(summary.count(Dimension::ModestLuxury, 1), 2);
    assert_eq!(summary.count(Dimension::ModestLuxury, 2), 0);
    assert_eq!(summary.count(Dimension::ModestLuxury, 3), 1);
    assert_eq!(summary.count(Dimension::SoftHard, 5), 7);
    // A dimension absent from the payload reads as all-zero.
    assert_eq!(summary.count(Dimension::HeavyLight, 1), 0);

    assert_eq!(summary.dimension_total(Dimension::ModestLuxury), 3);
    assert_eq!(summary.dimension_total(Dimension::HeavyLight), 0);
}

#[test]
fn empty_image_summary_parses() {
    let summary: ImageSummary = serde_json::from_value(json!({})).expect("parse");
    for dimension in Dimension::ALL {
        for value in 1u8..=5 {
            assert_eq!(summary.count(dimension, value), 0);
        }
    }
}

#[test]
fn unexpected_extra_fields_are_ignored() {
    let body = json!({
        "status": "ok",
        "images": [{ "image_id": 205, "n": 2, "label": "spare" }],
        "total": 2,
    });
    let list: SummaryList = serde_json::from_value(body).expect("parse");
    assert_eq!(list.images[0].image_id, 205);
}

#[test]
fn row_json_is_flat() {
    // The sheet matches columns by name at the top level; nothing nests.
    let value = serde_json::to_value(first_trial_record()).expect("serialize");
    let object = value.as_object().expect("object");
    assert!(object.values().all(|v| !matches!(v, Value::Object(_) | Value::Array(_))));
}
