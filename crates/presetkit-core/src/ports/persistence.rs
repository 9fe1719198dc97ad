//! PersistencePort - key → byte blob のストレージ
//!
//! ホスト環境（ブラウザの localStorage 相当、ディレクトリ、テスト用メモリ）が
//! 提供する外部コラボレータです。Store はキーごとに 1 つのエントリを持ち、
//! 変更のたびにコレクション全体を書き込みます。
//!
//! # 設計原則
//! - シングルトンにしない（Store ごとに注入する）
//! - 同じキーへの複数 writer は調停しない（最後の書き込みが勝つ）

use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("storage i/o failed for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait PersistencePort: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError>;
}

impl<P: PersistencePort + ?Sized> PersistencePort for Arc<P> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        (**self).set(key, bytes)
    }
}
