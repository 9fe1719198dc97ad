use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::PresetCodec;
use super::validate::{Candidate, validate_candidate};
use crate::domain::envelope::PRESETS_FIELD;
use crate::domain::{Preset, PresetId};

/// Why an import produced nothing. The `Display` text is user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("parse error")]
    Parse,

    #[error("invalid format")]
    InvalidFormat,

    #[error("all already exist")]
    AllAlreadyExist,

    #[error("no valid presets found")]
    NoValidPresets,
}

#[derive(Debug, Clone)]
pub struct ImportResult<T> {
    pub success: bool,
    pub presets: Vec<Preset<T>>,
    pub error: Option<ImportError>,
    pub duplicates_skipped: usize,
}

impl<T> ImportResult<T> {
    fn succeeded(presets: Vec<Preset<T>>, duplicates_skipped: usize) -> Self {
        Self {
            success: true,
            presets,
            error: None,
            duplicates_skipped,
        }
    }

    fn failed(error: ImportError, duplicates_skipped: usize) -> Self {
        Self {
            success: false,
            presets: Vec::new(),
            error: Some(error),
            duplicates_skipped,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.map(|e| e.to_string())
    }
}

impl PresetCodec {
    /// Parse, validate and deduplicate an import blob against `existing_ids`.
    ///
    /// Never overwrites: an item whose id is already known (or was already
    /// accepted earlier in the same blob) only bumps `duplicates_skipped`.
    pub fn import<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        existing_ids: &HashSet<PresetId>,
    ) -> ImportResult<T> {
        let root: Value = match serde_json::from_slice(bytes) {
            Ok(root) => root,
            Err(e) => {
                debug!(error = %e, "import blob is not valid JSON");
                return ImportResult::failed(ImportError::Parse, 0);
            }
        };

        let Some(candidates) = extract_candidates(root) else {
            return ImportResult::failed(ImportError::InvalidFormat, 0);
        };

        let total = candidates.len();
        let now = self.clock.now_millis();
        let mut accepted: HashSet<PresetId> = HashSet::new();
        let mut duplicates_skipped = 0;
        let mut presets = Vec::new();

        for (index, item) in candidates.into_iter().enumerate() {
            match validate_candidate::<T>(item, now) {
                Candidate::Invalid(reason) => {
                    debug!(index, %reason, "discarding invalid import item");
                }
                Candidate::Valid(preset) => {
                    if existing_ids.contains(&preset.id) || !accepted.insert(preset.id.clone()) {
                        duplicates_skipped += 1;
                        continue;
                    }
                    presets.push(preset);
                }
            }
        }

        if presets.is_empty() && total > 0 {
            // compared against the pre-filter candidate count on purpose
            let error = if duplicates_skipped == total {
                ImportError::AllAlreadyExist
            } else {
                ImportError::NoValidPresets
            };
            info!(total, duplicates_skipped, %error, "import produced no presets");
            return ImportResult::failed(error, duplicates_skipped);
        }

        info!(total, imported = presets.len(), duplicates_skipped, "import validated");
        ImportResult::succeeded(presets, duplicates_skipped)
    }
}

/// Bare array (legacy) or `{ "presets": [...] }` envelope.
fn extract_candidates(root: Value) -> Option<Vec<Value>> {
    match root {
        Value::Array(items) => Some(items),
        Value::Object(mut fields) => match fields.remove(PRESETS_FIELD) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}
