//! Shape validation for one imported item.
//!
//! Malformed user data never raises; each candidate is classified as
//! `Valid` or `Invalid` and the caller decides what to do with it.

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use ulid::Ulid;

use crate::domain::{Preset, Tag, TagId, TagType, normalize_tags};

#[derive(Debug)]
pub enum Candidate<T> {
    Valid(Preset<T>),
    Invalid(InvalidReason),
}

impl<T> Candidate<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Candidate::Valid(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("not an object")]
    NotAnObject,

    #[error("missing or empty id")]
    MissingId,

    #[error("missing or empty name")]
    MissingName,

    #[error("missing input")]
    MissingInput,

    #[error("malformed preset: {0}")]
    Malformed(String),
}

/// Check one candidate and turn it into a `Preset<T>`.
///
/// Requires a non-empty string `id`, a string `name` that is non-empty after
/// trimming, and a present, non-null `input` that decodes as `T`. Everything
/// else is repaired rather than rejected: timestamps that are not epoch
/// milliseconds become `now_ms`, a non-string description is dropped, and
/// tags go through [`repair_tags`].
pub fn validate_candidate<T: DeserializeOwned>(item: Value, now_ms: i64) -> Candidate<T> {
    let Value::Object(mut fields) = item else {
        return Candidate::Invalid(InvalidReason::NotAnObject);
    };

    if !matches!(fields.get("id"), Some(Value::String(id)) if !id.is_empty()) {
        return Candidate::Invalid(InvalidReason::MissingId);
    }
    if !matches!(fields.get("name"), Some(Value::String(name)) if !name.trim().is_empty()) {
        return Candidate::Invalid(InvalidReason::MissingName);
    }
    if matches!(fields.get("input"), None | Some(Value::Null)) {
        return Candidate::Invalid(InvalidReason::MissingInput);
    }

    backfill(&mut fields, "createdAt", now_ms);
    backfill(&mut fields, "updatedAt", now_ms);
    if fields.get("description").is_some_and(|d| !d.is_string()) {
        fields.remove("description");
    }
    let tags = repair_tags(fields.remove("tags"), now_ms);
    fields.insert("tags".to_string(), Value::Array(tags));

    match serde_json::from_value::<Preset<T>>(Value::Object(fields)) {
        Ok(mut preset) => {
            preset.tags = normalize_tags(preset.tags);
            Candidate::Valid(preset)
        }
        Err(e) => Candidate::Invalid(InvalidReason::Malformed(e.to_string())),
    }
}

/// Anything other than an integer (missing, null, an ISO string, a float) is replaced.
fn backfill(fields: &mut Map<String, Value>, field: &str, now_ms: i64) {
    if !fields.get(field).is_some_and(Value::is_i64) {
        fields.insert(field.to_string(), Value::from(now_ms));
    }
}

/// Keep the tags that name a known type; fill in whatever else is missing.
///
/// - `type` が未知・欠落 → そのタグだけ捨てる
/// - `label` / `color` が欠落・空 → TagType のデフォルト
/// - `id` が欠落・空 → `tag-<ULID>` を採番
fn repair_tags(raw: Option<Value>, now_ms: i64) -> Vec<Value> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| {
            let Value::Object(tag) = item else {
                debug!("dropping non-object tag");
                return None;
            };
            let tag_type = match tag.get("type").and_then(Value::as_str).map(TagType::from_str) {
                Some(Ok(tag_type)) => tag_type,
                _ => {
                    debug!(tag_type = ?tag.get("type"), "dropping tag with unknown type");
                    return None;
                }
            };

            let text = |key: &str| {
                tag.get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            let id = text("id").map(TagId::new).unwrap_or_else(|| {
                TagId::from_ulid(Ulid::from_parts(now_ms.max(0) as u64, rand::random()))
            });

            let repaired = Tag {
                id,
                tag_type,
                label: text("label").unwrap_or_else(|| tag_type.default_label().to_string()),
                color: text("color").unwrap_or_else(|| tag_type.default_color().to_string()),
            };
            serde_json::to_value(repaired).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TagType;
    use rstest::rstest;
    use serde_json::json;

    const NOW: i64 = 1_710_000_000_000;

    fn check(item: Value) -> Candidate<Value> {
        validate_candidate(item, NOW)
    }

    fn reason(candidate: Candidate<Value>) -> InvalidReason {
        match candidate {
            Candidate::Invalid(reason) => reason,
            Candidate::Valid(p) => panic!("expected invalid, got {p:?}"),
        }
    }

    #[rstest]
    #[case::array(json!([1, 2]), InvalidReason::NotAnObject)]
    #[case::string(json!("preset"), InvalidReason::NotAnObject)]
    #[case::no_id(json!({ "name": "n", "input": 1 }), InvalidReason::MissingId)]
    #[case::empty_id(json!({ "id": "", "name": "n", "input": 1 }), InvalidReason::MissingId)]
    #[case::numeric_id(json!({ "id": 5, "name": "n", "input": 1 }), InvalidReason::MissingId)]
    #[case::no_name(json!({ "id": "a", "input": 1 }), InvalidReason::MissingName)]
    #[case::blank_name(json!({ "id": "a", "name": "  ", "input": 1 }), InvalidReason::MissingName)]
    #[case::no_input(json!({ "id": "a", "name": "n" }), InvalidReason::MissingInput)]
    #[case::null_input(json!({ "id": "a", "name": "n", "input": null }), InvalidReason::MissingInput)]
    fn rejects_bad_shapes(#[case] item: Value, #[case] expected: InvalidReason) {
        assert_eq!(reason(check(item)), expected);
    }

    fn valid(item: Value) -> Preset<Value> {
        match check(item) {
            Candidate::Valid(preset) => preset,
            Candidate::Invalid(reason) => panic!("expected valid, got {reason}"),
        }
    }

    #[rstest]
    #[case::iso_string(json!("2024-01-01T00:00:00Z"))]
    #[case::float(json!(1.5))]
    #[case::boolean(json!(true))]
    #[case::object(json!({ "ms": 5 }))]
    fn non_integer_timestamps_are_backfilled(#[case] stamp: Value) {
        let preset = valid(json!({
            "id": "a", "name": "A", "input": 1,
            "createdAt": stamp.clone(), "updatedAt": stamp
        }));
        assert_eq!(preset.created_at, NOW);
        assert_eq!(preset.updated_at, Some(NOW));
    }

    #[test]
    fn tag_with_only_a_type_is_filled_from_defaults() {
        let preset = valid(json!({
            "id": "b", "name": "B", "input": 2,
            "tags": [{ "type": "draft" }]
        }));
        assert_eq!(preset.tags.len(), 1);
        let tag = &preset.tags[0];
        assert_eq!(tag.tag_type, TagType::Draft);
        assert_eq!(tag.label, TagType::Draft.default_label());
        assert_eq!(tag.color, TagType::Draft.default_color());
        assert!(tag.id.as_str().starts_with("tag-"));
    }

    #[test]
    fn unknown_or_malformed_tags_are_dropped_not_the_preset() {
        let preset = valid(json!({
            "id": "a", "name": "n", "input": 1,
            "tags": [
                { "id": "t", "type": "reckless", "label": "x", "color": "#000" },
                { "id": "u", "label": "no type" },
                "favorite",
                { "id": "v", "type": "favorite", "label": "  ", "color": "#123456" }
            ]
        }));
        assert_eq!(preset.tags.len(), 1);
        assert_eq!(preset.tags[0].id, TagId::new("v"));
        assert_eq!(preset.tags[0].label, "Favorite");
        assert_eq!(preset.tags[0].color, "#123456");
    }

    #[rstest]
    #[case::not_array(json!({ "type": "draft" }))]
    #[case::string(json!("draft"))]
    fn non_array_tags_become_empty(#[case] tags: Value) {
        let preset = valid(json!({ "id": "a", "name": "n", "input": 1, "tags": tags }));
        assert!(preset.tags.is_empty());
    }

    #[test]
    fn non_string_description_is_dropped() {
        let preset = valid(json!({ "id": "a", "name": "n", "input": 1, "description": 42 }));
        assert_eq!(preset.description, None);
    }

    #[test]
    fn input_must_decode_as_payload_type() {
        #[derive(Debug, serde::Deserialize)]
        struct Loan {
            #[allow(dead_code)]
            principal: u64,
        }

        let ok = validate_candidate::<Loan>(json!({ "id": "a", "name": "n", "input": { "principal": 5 } }), NOW);
        assert!(ok.is_valid());

        let bad = validate_candidate::<Loan>(json!({ "id": "a", "name": "n", "input": { "rate": 5 } }), NOW);
        assert!(!bad.is_valid());
    }

    #[test]
    fn backfills_missing_timestamps() {
        let Candidate::Valid(preset) = check(json!({ "id": "a", "name": "n", "input": 0 })) else {
            panic!("expected valid");
        };
        assert_eq!(preset.created_at, NOW);
        assert_eq!(preset.updated_at, Some(NOW));
        assert!(preset.tags.is_empty());
    }

    #[test]
    fn keeps_existing_timestamps_and_normalizes_tags() {
        let item = json!({
            "id": "a", "name": "n", "input": false,
            "createdAt": 5, "updatedAt": 6,
            "tags": [
                { "id": "t1", "type": "draft", "label": "Draft", "color": "#94a3b8" },
                { "id": "t2", "type": "draft", "label": "Again", "color": "#94a3b8" }
            ]
        });
        let Candidate::Valid(preset) = check(item) else {
            panic!("expected valid");
        };
        assert_eq!(preset.created_at, 5);
        assert_eq!(preset.updated_at, Some(6));
        assert_eq!(preset.tags.len(), 1);
        assert_eq!(preset.tags[0].tag_type, TagType::Draft);
    }

    #[test]
    fn null_tags_are_treated_as_empty() {
        let candidate = check(json!({ "id": "a", "name": "n", "input": 1, "tags": null }));
        assert!(candidate.is_valid());
    }
}
