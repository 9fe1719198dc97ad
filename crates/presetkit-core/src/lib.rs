//! presetkit-core
//!
//! Named, tagged input snapshots ("presets") shared by every calculator tool,
//! plus a guard for overlapping async calls.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, tag, preset, envelope, errors）
//! - **ports**: 抽象化レイヤー（PersistencePort, Clock, IdGenerator）
//! - **impls**: 実装（InMemoryPersistence, FilePersistence）
//! - **store**: PresetStore と PresetStoreBuilder
//! - **codec**: export envelope / import の検証と重複排除
//! - **facade**: PresetLibrary（Store + Codec）
//! - **guard**: AsyncCallGuard（最後に発行した呼び出しだけを反映）
//! - **config**: TOML 設定

pub mod codec;
pub mod config;
pub mod domain;
pub mod facade;
pub mod guard;
pub mod impls;
pub mod ports;
pub mod store;

pub use codec::{ExportFile, ImportError, ImportResult, PresetCodec};
pub use config::{ConfigError, PresetConfig};
pub use domain::{Preset, PresetError, PresetId, PresetPatch, Tag, TagId, TagType};
pub use facade::PresetLibrary;
pub use guard::{AsyncCallGuard, CallPhase, CallState, FnOperation, Operation};
pub use store::{BuildError, PresetInput, PresetStore, PresetStoreBuilder};
