//! IdGenerator port - ID 生成の抽象化
//!
//! job_id / task_id が呼び出し側から与えられなかったときに使います。
//! テスト容易性のために、trait として抽象化しています。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）
//! - **SequentialIdGenerator**: 連番（テスト用、決定的）

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::ids::{JobId, TaskId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は job_id / task_id を生成
///
/// # 保証
/// - プロセス内での一意性 + 十分に大きいランダム部分
/// - グローバルな調整は不要
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_job_id(&self) -> JobId;

    fn generate_task_id(&self) -> TaskId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// 48-bit の時刻 + 80-bit のランダム値。Clock を差し替えれば
/// 時刻部分を固定できます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_job_id(&self) -> JobId {
        JobId::from(self.next_ulid())
    }

    fn generate_task_id(&self) -> TaskId {
        TaskId::from(self.next_ulid())
    }
}

/// SequentialIdGenerator は `<prefix>-job-<n>` / `<prefix>-task-<n>` を順に返す
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    fn token(&self, label: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{label}-{n}", self.prefix)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_job_id(&self) -> JobId {
        JobId::from_generated(self.token(JobId::label()))
    }

    fn generate_task_id(&self) -> TaskId {
        TaskId::from_generated(self.token(TaskId::label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_job_id();
        let id2 = id_gen.generate_job_id();
        let id3 = id_gen.generate_job_id();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn million_ids_under_a_frozen_clock_stay_distinct() {
        // 時刻が同じでもランダム部分で区別される
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        let id_gen = UlidGenerator::new(clock);

        let ids: HashSet<Ulid> = (0..1_000_000).map(|_| id_gen.next_ulid()).collect();
        assert_eq!(ids.len(), 1_000_000);
    }

    #[test]
    fn ulid_generator_with_fixed_clock_embeds_timestamp() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id = id_gen.generate_job_id();
        let ulid: Ulid = id.as_str().parse().unwrap();
        assert_eq!(ulid.timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }

    #[test]
    fn sequential_generator_is_deterministic() {
        let id_gen = SequentialIdGenerator::new("t");
        assert_eq!(id_gen.generate_job_id().as_str(), "t-job-1");
        assert_eq!(id_gen.generate_task_id().as_str(), "t-task-2");
    }
}
