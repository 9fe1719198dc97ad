//! Domain identifiers (strongly-typed IDs).
//!
//! # 文字列ベースの ID + Phantom Type
//! Preset / Tag の ID は永続化データ上では単なる文字列です。
//! import されたファイルには任意の文字列 ID が含まれうるため、
//! 内部表現も `String` のまま保持し、`IdMarker` で型だけを区別します。
//!
//! 新規に採番される ID は `preset-<ULID>` / `tag-<ULID>` の形式になります
//! （`IdGenerator` を参照）。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// 採番時に使うプレフィックス（"preset-", "tag-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// JSON 上は素の文字列として (de)serialize されます。
///
/// ```ignore
/// let preset_id = PresetId::new("imported-42");
/// let tag_id: TagId = TagId::from_ulid(Ulid::new());
/// // preset_id と tag_id は異なる型なので、混同できない
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// Wrap an opaque id string (e.g. one read from an import file).
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// ULID から `<prefix><ULID>` 形式の Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self::new(format!("{}{}", T::prefix(), ulid))
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// 採番された ID であれば ULID 部分を取り出す。import された任意文字列なら None。
    pub fn ulid(&self) -> Option<Ulid> {
        self.value
            .strip_prefix(T::prefix())
            .and_then(|rest| Ulid::from_string(rest).ok())
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Preset のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PresetMarker {}

impl IdMarker for PresetMarker {
    fn prefix() -> &'static str {
        "preset-"
    }
}

/// Tag のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagMarker {}

impl IdMarker for TagMarker {
    fn prefix() -> &'static str {
        "tag-"
    }
}

/// Identifier of a Preset (unique within one store).
pub type PresetId = Id<PresetMarker>;

/// Identifier of a Tag (unique within one preset's tag set).
pub type TagId = Id<TagMarker>;
