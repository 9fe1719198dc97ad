//! Ports - 抽象化レイヤー
//!
//! ホスト環境に依存するもの（ストレージ・時刻・ID 採番）を trait として
//! 切り出します。Store / Codec はこれらの trait だけに依存します。

pub mod clock;
pub mod id_generator;
pub mod persistence;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::persistence::{PersistenceError, PersistencePort};
