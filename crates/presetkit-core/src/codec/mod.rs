//! PresetCodec - export envelope の生成と import ファイルの検証
//!
//! Codec は Store に触れません。import の結果をどう取り込むかは呼び出し側
//! （`facade::PresetLibrary` など）が決めます。
//!
//! # import の流れ
//! 1. JSON として parse（失敗 → `parse error`）
//! 2. 素の配列 or `presets` 配列を持つ envelope を受け付ける（それ以外 → `invalid format`）
//! 3. 各候補を `validate_candidate` で検証（不正なものは黙って捨てる）
//! 4. 既存 ID と重複するものは `duplicates_skipped` に数えて除外
//! 5. 生き残ったものの `createdAt` / `updatedAt` を補完

mod export;
mod import;
mod validate;

pub use export::ExportFile;
pub use import::{ImportError, ImportResult};
pub use validate::{Candidate, InvalidReason, validate_candidate};

use std::sync::Arc;

use crate::ports::{Clock, SystemClock};

pub struct PresetCodec {
    clock: Arc<dyn Clock>,
}

impl PresetCodec {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for PresetCodec {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
