//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::{PresetId, TagId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は Preset / Tag の ID を生成
///
/// # ULID の特性
/// - 時刻でソート可能
/// - 調整なしで生成可能（複数タブから書き込まれても衝突しない）
///
/// # Thread Safety
/// - `Send + Sync` を要求
pub trait IdGenerator: Send + Sync {
    fn generate_preset_id(&self) -> PresetId;

    fn generate_tag_id(&self) -> TagId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// テストでは FixedClock を渡すと timestamp 部分が固定されます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_preset_id(&self) -> PresetId {
        PresetId::from_ulid(self.next_ulid())
    }

    fn generate_tag_id(&self) -> TagId {
        TagId::from_ulid(self.next_ulid())
    }
}
