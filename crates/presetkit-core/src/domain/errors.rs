//! Errors - プリセット操作のエラー型
//!
//! データ形状の問題（壊れた import ファイルなど）はここには含めません。
//! それらは `ImportResult` として値で返します。

use thiserror::Error;

use crate::ports::PersistenceError;

#[derive(Debug, Error)]
pub enum PresetError {
    /// Caller-side precondition violation (e.g. a blank name).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("index out of range: from={from} to={to} len={len}")]
    IndexOutOfRange { from: usize, to: usize, len: usize },

    #[error("failed to persist presets: {0}")]
    Storage(#[from] PersistenceError),

    #[error("failed to serialize presets: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PresetError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
