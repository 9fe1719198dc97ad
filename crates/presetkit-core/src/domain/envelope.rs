//! Export envelope - 一括 export/import 用のバージョン付きラッパー
//!
//! ```json
//! { "version": 1, "exportedAt": 1700000000000, "presets": [ ... ] }
//! ```
//!
//! import 側は envelope と旧形式（素の配列）の両方を受け付けます
//! （`codec::import` を参照）。

use serde::Serialize;

use super::preset::Preset;

/// Current export format version.
pub const EXPORT_VERSION: u32 = 1;

/// Name of the array field inside the envelope object.
pub const PRESETS_FIELD: &str = "presets";

/// Borrowing view used on the export path; the store is never cloned.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope<'a, T> {
    pub version: u32,
    pub exported_at: i64,
    pub presets: &'a [Preset<T>],
}

impl<'a, T> ExportEnvelope<'a, T> {
    pub fn new(exported_at: i64, presets: &'a [Preset<T>]) -> Self {
        Self {
            version: EXPORT_VERSION,
            exported_at,
            presets,
        }
    }
}
