//! Tag model: a closed set of tag types, at most one of each per preset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::TagId;

/// The closed enumeration of tag types.
///
/// The type drives the default label and color. It also acts as the
/// uniqueness key inside one preset's tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    Conservative,
    Moderate,
    Aggressive,
    Baseline,
    Optimistic,
    Pessimistic,
    Favorite,
    Draft,
}

impl TagType {
    pub const ALL: [TagType; 8] = [
        TagType::Conservative,
        TagType::Moderate,
        TagType::Aggressive,
        TagType::Baseline,
        TagType::Optimistic,
        TagType::Pessimistic,
        TagType::Favorite,
        TagType::Draft,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagType::Conservative => "conservative",
            TagType::Moderate => "moderate",
            TagType::Aggressive => "aggressive",
            TagType::Baseline => "baseline",
            TagType::Optimistic => "optimistic",
            TagType::Pessimistic => "pessimistic",
            TagType::Favorite => "favorite",
            TagType::Draft => "draft",
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            TagType::Conservative => "Conservative",
            TagType::Moderate => "Moderate",
            TagType::Aggressive => "Aggressive",
            TagType::Baseline => "Baseline",
            TagType::Optimistic => "Optimistic",
            TagType::Pessimistic => "Pessimistic",
            TagType::Favorite => "Favorite",
            TagType::Draft => "Draft",
        }
    }

    pub fn default_color(self) -> &'static str {
        match self {
            TagType::Conservative => "#2563eb",
            TagType::Moderate => "#16a34a",
            TagType::Aggressive => "#dc2626",
            TagType::Baseline => "#6b7280",
            TagType::Optimistic => "#0d9488",
            TagType::Pessimistic => "#9333ea",
            TagType::Favorite => "#f59e0b",
            TagType::Draft => "#94a3b8",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag type {0:?}")]
pub struct UnknownTagType(pub String);

impl FromStr for TagType {
    type Err = UnknownTagType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TagType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownTagType(s.to_string()))
    }
}

/// A tag attached to a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    #[serde(rename = "type")]
    pub tag_type: TagType,
    pub label: String,
    pub color: String,
}

impl Tag {
    /// A custom label overrides the default text; blank labels fall back to it.
    pub fn new(id: TagId, tag_type: TagType, label: Option<&str>) -> Self {
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(tag_type.default_label());
        Self {
            id,
            tag_type,
            label: label.to_string(),
            color: tag_type.default_color().to_string(),
        }
    }
}

/// Keep the first tag of each type, preserving order.
pub fn normalize_tags(tags: Vec<Tag>) -> Vec<Tag> {
    let mut out: Vec<Tag> = Vec::with_capacity(tags.len());
    for tag in tags {
        if out.iter().all(|t| t.tag_type != tag.tag_type) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("conservative", TagType::Conservative)]
    #[case::upper("AGGRESSIVE", TagType::Aggressive)]
    #[case::padded("  draft ", TagType::Draft)]
    fn parses_tag_types(#[case] input: &str, #[case] expected: TagType) {
        assert_eq!(input.parse::<TagType>().unwrap(), expected);
    }

    #[test]
    fn unknown_tag_type_is_rejected() {
        let err = "reckless".parse::<TagType>().unwrap_err();
        assert_eq!(err, UnknownTagType("reckless".to_string()));
    }

    #[rstest]
    #[case::default_label(None, "Moderate")]
    #[case::blank_label(Some("   "), "Moderate")]
    #[case::custom_label(Some(" Balanced "), "Balanced")]
    fn label_falls_back_to_default(#[case] label: Option<&str>, #[case] expected: &str) {
        let tag = Tag::new(TagId::new("t1"), TagType::Moderate, label);
        assert_eq!(tag.label, expected);
        assert_eq!(tag.tag_type, TagType::Moderate);
        assert_eq!(tag.color, TagType::Moderate.default_color());
    }

    #[test]
    fn tag_type_serializes_under_type_key() {
        let tag = Tag::new(TagId::new("t1"), TagType::Conservative, None);
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["type"], "conservative");
        assert_eq!(json["id"], "t1");
    }

    #[test]
    fn normalize_keeps_first_of_each_type() {
        let tags = vec![
            Tag::new(TagId::new("a"), TagType::Draft, Some("first")),
            Tag::new(TagId::new("b"), TagType::Favorite, None),
            Tag::new(TagId::new("c"), TagType::Draft, Some("second")),
        ];
        let normalized = normalize_tags(tags);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].label, "first");
        assert_eq!(normalized[1].tag_type, TagType::Favorite);
    }
}
