//! Preset store: the in-memory collection plus its mutation operations.
//!
//! Every mutation runs to completion synchronously and then writes the whole
//! collection (a JSON array) to the persistence port under the store's key.
//! Reads never write.
//!
//! Order is significant: new presets are prepended, so index 0 is the most
//! recently added one unless `reorder` moved things around.

mod builder;

pub use builder::{BuildError, DEFAULT_COPY_SUFFIX, PresetStoreBuilder};

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::{Preset, PresetError, PresetId, PresetPatch, Tag, TagId, TagType, normalize_tags};
use crate::ports::{Clock, IdGenerator, PersistencePort};

/// Bounds every payload type has to satisfy.
pub trait PresetInput: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> PresetInput for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

pub struct PresetStore<T> {
    key: String,
    persistence: Arc<dyn PersistencePort>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    copy_suffix: String,
    presets: Vec<Preset<T>>,
}

impl<T: PresetInput> PresetStore<T> {
    pub(crate) fn open(
        key: String,
        persistence: Arc<dyn PersistencePort>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        copy_suffix: String,
    ) -> Self {
        let presets = hydrate(persistence.as_ref(), &key);
        Self {
            key,
            persistence,
            clock,
            ids,
            copy_suffix,
            presets,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn presets(&self) -> &[Preset<T>] {
        &self.presets
    }

    pub fn get(&self, id: &PresetId) -> Option<&Preset<T>> {
        self.presets.iter().find(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn ids(&self) -> HashSet<PresetId> {
        self.presets.iter().map(|p| p.id.clone()).collect()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Create a preset and prepend it.
    pub fn add(
        &mut self,
        name: &str,
        input: T,
        description: Option<String>,
        tags: Vec<Tag>,
    ) -> Result<Preset<T>, PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::invalid_input("preset name must not be empty"));
        }

        let now = self.clock.now_millis();
        let preset = Preset {
            id: self.fresh_preset_id(),
            name: name.to_string(),
            description: clean_description(description),
            created_at: now,
            updated_at: Some(now),
            input,
            tags: normalize_tags(tags),
        };
        debug!(key = %self.key, id = %preset.id, "adding preset");

        self.presets.insert(0, preset.clone());
        self.persist()?;
        Ok(preset)
    }

    /// Apply a partial update. Unknown ids are ignored.
    pub fn edit(&mut self, id: &PresetId, patch: PresetPatch<T>) -> Result<(), PresetError> {
        if let Some(name) = &patch.name
            && name.trim().is_empty()
        {
            return Err(PresetError::invalid_input("preset name must not be empty"));
        }

        let now = self.clock.now_millis();
        let Some(preset) = self.presets.iter_mut().find(|p| &p.id == id) else {
            debug!(key = %self.key, %id, "edit ignored: no such preset");
            return Ok(());
        };

        if let Some(name) = patch.name {
            preset.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            preset.description = clean_description(description);
        }
        if let Some(input) = patch.input {
            preset.input = input;
        }
        if let Some(tags) = patch.tags {
            preset.tags = normalize_tags(tags);
        }
        preset.touch(now);

        self.persist()
    }

    /// Remove a preset. Persists even when nothing matched.
    pub fn remove(&mut self, id: &PresetId) -> Result<(), PresetError> {
        let before = self.presets.len();
        self.presets.retain(|p| &p.id != id);
        if self.presets.len() == before {
            debug!(key = %self.key, %id, "remove: no such preset");
        }
        self.persist()
    }

    /// Copy a preset under a new id with the copy suffix appended to its name.
    pub fn duplicate(&mut self, id: &PresetId) -> Result<Option<Preset<T>>, PresetError> {
        let Some(source) = self.get(id) else {
            return Ok(None);
        };
        let name = format!("{}{}", source.name, self.copy_suffix);
        let description = source.description.clone();
        let input = source.input.clone();
        let tags: Vec<Tag> = source
            .tags
            .iter()
            .map(|t| Tag {
                id: self.ids.generate_tag_id(),
                ..t.clone()
            })
            .collect();

        let now = self.clock.now_millis();
        let copy = Preset {
            id: self.fresh_preset_id(),
            name,
            description,
            created_at: now,
            updated_at: Some(now),
            input,
            tags,
        };
        debug!(key = %self.key, from = %id, to = %copy.id, "duplicating preset");

        self.presets.insert(0, copy.clone());
        self.persist()?;
        Ok(Some(copy))
    }

    /// Move the element at `from` to `to`. Out-of-range indices are rejected.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), PresetError> {
        let len = self.presets.len();
        if from >= len || to >= len {
            return Err(PresetError::IndexOutOfRange { from, to, len });
        }
        if from == to {
            return Ok(());
        }

        let moved = self.presets.remove(from);
        self.presets.insert(to, moved);
        self.persist()
    }

    pub fn clear(&mut self) -> Result<(), PresetError> {
        self.presets.clear();
        self.persist()
    }

    /// Attach a tag unless the preset already carries one of that type.
    pub fn add_tag(
        &mut self,
        preset_id: &PresetId,
        tag_type: TagType,
        label: Option<&str>,
    ) -> Result<(), PresetError> {
        let now = self.clock.now_millis();
        let tag_id = self.ids.generate_tag_id();
        let Some(preset) = self.presets.iter_mut().find(|p| &p.id == preset_id) else {
            return Ok(());
        };
        if preset.has_tag_type(tag_type) {
            debug!(key = %self.key, id = %preset_id, %tag_type, "tag type already present");
            return Ok(());
        }

        preset.tags.push(Tag::new(tag_id, tag_type, label));
        preset.touch(now);
        self.persist()
    }

    pub fn remove_tag(&mut self, preset_id: &PresetId, tag_id: &TagId) -> Result<(), PresetError> {
        let now = self.clock.now_millis();
        let Some(preset) = self.presets.iter_mut().find(|p| &p.id == preset_id) else {
            return Ok(());
        };
        if !preset.has_tag(tag_id) {
            return Ok(());
        }

        preset.tags.retain(|t| &t.id != tag_id);
        preset.touch(now);
        self.persist()
    }

    /// Prepend imported presets, keeping their relative order.
    ///
    /// Presets whose id is already in the collection (or repeated within
    /// `incoming`) are skipped. Returns the number actually added.
    pub fn merge_imported(&mut self, incoming: Vec<Preset<T>>) -> Result<usize, PresetError> {
        let mut seen = self.ids();
        let fresh: Vec<Preset<T>> = incoming
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        let added = fresh.len();
        self.presets.splice(0..0, fresh);
        info!(key = %self.key, added, total = self.presets.len(), "merged imported presets");
        self.persist()?;
        Ok(added)
    }

    /// Drop the in-memory collection and read it again from the port.
    pub fn reload(&mut self) -> usize {
        self.presets = hydrate(self.persistence.as_ref(), &self.key);
        self.presets.len()
    }

    fn fresh_preset_id(&self) -> PresetId {
        // imported ids are arbitrary strings, so a generated one can collide
        let id = self.ids.generate_preset_id();
        if self.get(&id).is_none() {
            return id;
        }
        let mut n = 1;
        loop {
            let candidate = PresetId::new(format!("{id}-{n}"));
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    fn persist(&self) -> Result<(), PresetError> {
        let bytes = serde_json::to_vec(&self.presets)?;
        if let Err(e) = self.persistence.set(&self.key, &bytes) {
            warn!(key = %self.key, error = %e, "failed to persist presets");
            return Err(e.into());
        }
        debug!(key = %self.key, count = self.presets.len(), "persisted presets");
        Ok(())
    }
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Read the stored collection. Anything unreadable yields an empty store.
fn hydrate<T: PresetInput>(persistence: &dyn PersistencePort, key: &str) -> Vec<Preset<T>> {
    let bytes = match persistence.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(key, "no stored presets");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = %e, "failed to read stored presets; starting empty");
            return Vec::new();
        }
    };

    let items: Vec<serde_json::Value> = match serde_json::from_slice(&bytes) {
        Ok(items) => items,
        Err(e) => {
            warn!(key, error = %e, "stored presets are not an array; starting empty");
            return Vec::new();
        }
    };

    let total = items.len();
    let mut seen = HashSet::new();
    let presets: Vec<Preset<T>> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Preset<T>>(item) {
            Ok(mut preset) => {
                preset.tags = normalize_tags(preset.tags);
                Some(preset)
            }
            Err(e) => {
                warn!(key, error = %e, "dropping unreadable stored preset");
                None
            }
        })
        .filter(|p| seen.insert(p.id.clone()))
        .collect();

    info!(key, loaded = presets.len(), stored = total, "hydrated presets");
    presets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryPersistence;
    use crate::ports::FixedClock;
    use chrono::Duration;
    use rstest::rstest;
    use serde_json::{Value, json};

    struct Fixture {
        storage: Arc<InMemoryPersistence>,
        clock: Arc<FixedClock>,
        store: PresetStore<Value>,
    }

    const KEY: &str = "retirement";

    fn fixture() -> Fixture {
        fixture_with(InMemoryPersistence::new())
    }

    fn fixture_with(storage: InMemoryPersistence) -> Fixture {
        let storage = Arc::new(storage);
        let clock = Arc::new(FixedClock::at_millis(1_700_000_000_000));
        let store = PresetStoreBuilder::new(KEY)
            .persistence(storage.clone())
            .clock(clock.clone())
            .open::<Value>()
            .unwrap();
        Fixture {
            storage,
            clock,
            store,
        }
    }

    fn stored(storage: &InMemoryPersistence) -> Vec<Value> {
        serde_json::from_slice(&storage.raw(KEY).unwrap()).unwrap()
    }

    fn names(store: &PresetStore<Value>) -> Vec<&str> {
        store.presets().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn add_prepends_and_persists() {
        let mut f = fixture();
        f.store.add("A", json!({ "age": 30 }), None, vec![]).unwrap();
        f.store.add("B", json!({ "age": 40 }), None, vec![]).unwrap();

        assert_eq!(names(&f.store), vec!["B", "A"]);

        let persisted = stored(&f.storage);
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0]["name"], "B");
        assert_eq!(persisted[1]["input"]["age"], 30);
    }

    #[rstest]
    #[case::empty("")]
    #[case::spaces("   ")]
    #[case::tabs("\t\n")]
    fn add_rejects_blank_names(#[case] name: &str) {
        let mut f = fixture();
        let err = f.store.add(name, json!(1), None, vec![]).unwrap_err();
        assert!(matches!(err, PresetError::InvalidInput(_)));
        assert!(f.store.is_empty());
        assert_eq!(f.storage.raw(KEY), None);
    }

    #[test]
    fn add_trims_name_and_sets_timestamps() {
        let mut f = fixture();
        let preset = f
            .store
            .add("  Baseline  ", json!({}), Some("  ".to_string()), vec![])
            .unwrap();

        assert_eq!(preset.name, "Baseline");
        assert_eq!(preset.description, None);
        assert_eq!(preset.created_at, 1_700_000_000_000);
        assert_eq!(preset.updated_at, Some(preset.created_at));
        assert!(preset.id.as_str().starts_with("preset-"));
    }

    #[test]
    fn add_keeps_one_tag_per_type() {
        let mut f = fixture();
        let tags = vec![
            Tag::new(TagId::new("t1"), TagType::Draft, None),
            Tag::new(TagId::new("t2"), TagType::Draft, Some("again")),
        ];
        let preset = f.store.add("Tagged", json!({}), None, tags).unwrap();
        assert_eq!(preset.tags.len(), 1);
        assert_eq!(preset.tags[0].id, TagId::new("t1"));
    }

    #[test]
    fn edit_applies_fields_and_bumps_updated_at() {
        let mut f = fixture();
        let preset = f
            .store
            .add("Old", json!({ "rate": 1 }), Some("desc".to_string()), vec![])
            .unwrap();
        f.clock.advance(Duration::seconds(5));

        let patch = PresetPatch::new()
            .name("New")
            .input(json!({ "rate": 2 }))
            .clear_description();
        f.store.edit(&preset.id, patch).unwrap();

        let edited = f.store.get(&preset.id).unwrap();
        assert_eq!(edited.name, "New");
        assert_eq!(edited.input, json!({ "rate": 2 }));
        assert_eq!(edited.description, None);
        assert_eq!(edited.created_at, preset.created_at);
        assert_eq!(edited.updated_at, Some(preset.created_at + 5_000));
        assert_eq!(stored(&f.storage)[0]["name"], "New");
    }

    #[test]
    fn edit_unknown_id_is_a_noop() {
        let mut f = fixture();
        f.store.add("Only", json!(1), None, vec![]).unwrap();
        let before = f.storage.raw(KEY);

        f.store
            .edit(&PresetId::new("missing"), PresetPatch::new().name("x"))
            .unwrap();

        assert_eq!(names(&f.store), vec!["Only"]);
        assert_eq!(f.storage.raw(KEY), before);
    }

    #[test]
    fn edit_rejects_blank_name() {
        let mut f = fixture();
        let preset = f.store.add("Keep", json!(1), None, vec![]).unwrap();
        let err = f
            .store
            .edit(&preset.id, PresetPatch::new().name(" "))
            .unwrap_err();
        assert!(matches!(err, PresetError::InvalidInput(_)));
        assert_eq!(f.store.get(&preset.id).unwrap().name, "Keep");
    }

    #[test]
    fn remove_persists_even_when_absent() {
        let storage = InMemoryPersistence::new().with_entry(KEY, "not json");
        let mut f = fixture_with(storage);

        f.store.remove(&PresetId::new("ghost")).unwrap();

        assert_eq!(f.storage.raw(KEY), Some(b"[]".to_vec()));
    }

    #[test]
    fn remove_drops_matching_preset() {
        let mut f = fixture();
        let a = f.store.add("A", json!(1), None, vec![]).unwrap();
        f.store.add("B", json!(2), None, vec![]).unwrap();

        f.store.remove(&a.id).unwrap();

        assert_eq!(names(&f.store), vec!["B"]);
        assert_eq!(stored(&f.storage).len(), 1);
    }

    #[test]
    fn duplicate_copies_payload_under_new_id() {
        let mut f = fixture();
        let original = f
            .store
            .add("Plan", json!({ "years": 25 }), Some("note".to_string()), vec![])
            .unwrap();
        f.store
            .add_tag(&original.id, TagType::Conservative, Some("Safe"))
            .unwrap();

        let copy = f.store.duplicate(&original.id).unwrap().unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Plan (copy)");
        assert_eq!(copy.input, original.input);
        assert_eq!(copy.description.as_deref(), Some("note"));
        assert_eq!(copy.tags.len(), 1);
        assert_eq!(copy.tags[0].label, "Safe");
        assert_eq!(copy.tags[0].tag_type, TagType::Conservative);
        assert_ne!(copy.tags[0].id, f.store.get(&original.id).unwrap().tags[0].id);
        assert_eq!(f.store.presets()[0].id, copy.id);
        assert_eq!(stored(&f.storage).len(), 2);
    }

    #[test]
    fn duplicate_unknown_id_returns_none() {
        let mut f = fixture();
        assert!(f.store.duplicate(&PresetId::new("nope")).unwrap().is_none());
        assert!(f.store.is_empty());
    }

    #[test]
    fn reorder_moves_element() {
        let mut f = fixture();
        for name in ["C", "B", "A"] {
            f.store.add(name, json!(name), None, vec![]).unwrap();
        }
        assert_eq!(names(&f.store), vec!["A", "B", "C"]);

        f.store.reorder(0, 2).unwrap();
        assert_eq!(names(&f.store), vec!["B", "C", "A"]);

        f.store.reorder(2, 0).unwrap();
        assert_eq!(names(&f.store), vec!["A", "B", "C"]);
        assert_eq!(stored(&f.storage)[0]["name"], "A");
    }

    #[rstest]
    #[case::from_past_end(3, 0)]
    #[case::to_past_end(0, 3)]
    #[case::both(7, 9)]
    fn reorder_rejects_out_of_range(#[case] from: usize, #[case] to: usize) {
        let mut f = fixture();
        for name in ["C", "B", "A"] {
            f.store.add(name, json!(name), None, vec![]).unwrap();
        }

        let err = f.store.reorder(from, to).unwrap_err();

        assert!(matches!(err, PresetError::IndexOutOfRange { len: 3, .. }));
        assert_eq!(names(&f.store), vec!["A", "B", "C"]);
    }

    #[test]
    fn clear_persists_empty_array() {
        let mut f = fixture();
        f.store.add("A", json!(1), None, vec![]).unwrap();

        f.store.clear().unwrap();

        assert!(f.store.is_empty());
        assert_eq!(f.storage.raw(KEY), Some(b"[]".to_vec()));
    }

    #[test]
    fn add_tag_twice_keeps_single_tag() {
        let mut f = fixture();
        let preset = f.store.add("A", json!(1), None, vec![]).unwrap();

        f.store.add_tag(&preset.id, TagType::Conservative, None).unwrap();
        f.store
            .add_tag(&preset.id, TagType::Conservative, Some("Other"))
            .unwrap();

        let tags = &f.store.get(&preset.id).unwrap().tags;
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].label, "Conservative");
    }

    #[test]
    fn add_tag_bumps_updated_at_and_persists() {
        let mut f = fixture();
        let preset = f.store.add("A", json!(1), None, vec![]).unwrap();
        f.clock.advance(Duration::milliseconds(10));

        f.store.add_tag(&preset.id, TagType::Favorite, None).unwrap();

        let tagged = f.store.get(&preset.id).unwrap();
        assert_eq!(tagged.updated_at, Some(preset.created_at + 10));
        assert_eq!(stored(&f.storage)[0]["tags"][0]["type"], "favorite");
    }

    #[test]
    fn remove_tag_by_id() {
        let mut f = fixture();
        let preset = f.store.add("A", json!(1), None, vec![]).unwrap();
        f.store.add_tag(&preset.id, TagType::Draft, None).unwrap();
        f.store.add_tag(&preset.id, TagType::Baseline, None).unwrap();
        let draft_id = f.store.get(&preset.id).unwrap().tag(TagType::Draft).unwrap().id.clone();

        f.store.remove_tag(&preset.id, &draft_id).unwrap();
        f.store.remove_tag(&preset.id, &TagId::new("missing")).unwrap();

        let tags = &f.store.get(&preset.id).unwrap().tags;
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag_type, TagType::Baseline);
    }

    #[rstest]
    #[case::garbage("{{{")]
    #[case::object("{\"presets\": []}")]
    #[case::number("42")]
    fn hydration_ignores_unusable_content(#[case] raw: &str) {
        let f = fixture_with(InMemoryPersistence::new().with_entry(KEY, raw));
        assert!(f.store.is_empty());
    }

    #[test]
    fn hydration_restores_order_and_drops_bad_or_duplicate_entries() {
        let raw = json!([
            { "id": "b", "name": "B", "createdAt": 2, "input": 2 },
            { "id": "a", "name": "A", "createdAt": 1, "input": 1 },
            { "name": "no id", "createdAt": 1, "input": 1 },
            { "id": "b", "name": "B again", "createdAt": 3, "input": 3 }
        ]);
        let storage = InMemoryPersistence::new().with_entry(KEY, raw.to_string());
        let f = fixture_with(storage);

        assert_eq!(names(&f.store), vec!["B", "A"]);
    }

    #[test]
    fn hydration_keeps_one_tag_per_type() {
        let raw = json!([{
            "id": "a", "name": "A", "createdAt": 1, "input": 1,
            "tags": [
                { "id": "t1", "type": "favorite", "label": "Fav", "color": "#f59e0b" },
                { "id": "t2", "type": "favorite", "label": "Again", "color": "#f59e0b" },
                { "id": "t3", "type": "draft", "label": "Draft", "color": "#94a3b8" }
            ]
        }]);
        let f = fixture_with(InMemoryPersistence::new().with_entry(KEY, raw.to_string()));

        let tags = &f.store.presets()[0].tags;
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].id, TagId::new("t1"));
        assert_eq!(tags[1].tag_type, TagType::Draft);
    }

    #[test]
    fn stores_with_different_keys_are_independent() {
        let storage = Arc::new(InMemoryPersistence::new());
        let mut a = PresetStoreBuilder::new("a")
            .persistence(storage.clone())
            .open::<Value>()
            .unwrap();
        let b = PresetStoreBuilder::new("b")
            .persistence(storage.clone())
            .open::<Value>()
            .unwrap();

        a.add("only in a", json!(1), None, vec![]).unwrap();

        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert_eq!(storage.raw("b"), None);
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let mut f = fixture();
        f.store.add("A", json!(1), None, vec![]).unwrap();

        f.storage.set(KEY, b"[]").unwrap();

        assert_eq!(f.store.reload(), 0);
        assert!(f.store.is_empty());
    }

    #[test]
    fn merge_imported_prepends_and_skips_existing() {
        let mut f = fixture();
        let existing = f.store.add("Existing", json!(0), None, vec![]).unwrap();

        let incoming = vec![
            Preset {
                id: PresetId::new("x"),
                name: "X".to_string(),
                description: None,
                created_at: 1,
                updated_at: None,
                input: json!(1),
                tags: vec![],
            },
            Preset {
                id: existing.id.clone(),
                name: "clash".to_string(),
                description: None,
                created_at: 1,
                updated_at: None,
                input: json!(2),
                tags: vec![],
            },
            Preset {
                id: PresetId::new("y"),
                name: "Y".to_string(),
                description: None,
                created_at: 1,
                updated_at: None,
                input: json!(3),
                tags: vec![],
            },
        ];

        let added = f.store.merge_imported(incoming).unwrap();

        assert_eq!(added, 2);
        assert_eq!(names(&f.store), vec!["X", "Y", "Existing"]);
        assert_eq!(stored(&f.storage).len(), 3);
    }
}
