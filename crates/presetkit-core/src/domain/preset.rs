//! Preset record: a named, timestamped, tagged snapshot of one tool's input.
//!
//! The payload type `T` is opaque to this crate. It only has to round-trip
//! through serde.

use serde::{Deserialize, Serialize};

use super::ids::{PresetId, TagId};
use super::tag::{Tag, TagType};

/// Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset<T> {
    pub id: PresetId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created_at: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,

    pub input: T,

    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl<T> Preset<T> {
    pub fn tag(&self, tag_type: TagType) -> Option<&Tag> {
        self.tags.iter().find(|t| t.tag_type == tag_type)
    }

    pub fn has_tag_type(&self, tag_type: TagType) -> bool {
        self.tag(tag_type).is_some()
    }

    pub fn has_tag(&self, tag_id: &TagId) -> bool {
        self.tags.iter().any(|t| &t.id == tag_id)
    }

    pub(crate) fn touch(&mut self, now_ms: i64) {
        self.updated_at = Some(now_ms);
    }
}

/// Partial update for [`crate::store::PresetStore::edit`].
///
/// `description` is doubly optional: `None` leaves it alone, `Some(None)`
/// clears it.
#[derive(Debug, Clone)]
pub struct PresetPatch<T> {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub input: Option<T>,
    pub tags: Option<Vec<Tag>>,
}

impl<T> Default for PresetPatch<T> {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            input: None,
            tags: None,
        }
    }
}

impl<T> PresetPatch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn input(mut self, input: T) -> Self {
        self.input = Some(input);
        self
    }

    pub fn tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.input.is_none()
            && self.tags.is_none()
    }
}
