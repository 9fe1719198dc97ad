//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryPersistence**: テスト・埋め込み用
//! - **FilePersistence**: CLI 用（ディレクトリにキーごとのファイル）

pub mod file;
pub mod memory;

pub use self::file::FilePersistence;
pub use self::memory::InMemoryPersistence;
