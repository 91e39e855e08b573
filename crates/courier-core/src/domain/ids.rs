//! Domain identifiers (strongly-typed IDs).
//!
//! # Opaque token + Phantom type
//! job_id / task_id は worker 側から見ると不透明なトークンです。
//! 呼び出し側が指定した値はそのまま運び、指定がなければ `IdGenerator`
//! が ULID から生成します。
//!
//! `Id<T>` の `T` は実行時には使わないマーカー型で、
//! JobId と TaskId をコンパイル時に区別するためだけに存在します。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// ログやエラーメッセージで使う名前（例: "job", "task"）
    fn label() -> &'static str;
}

/// ジェネリック ID 型
///
/// wire 上では素の文字列として表現されます。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    token: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// ULID から Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            token: ulid.to_string(),
            _marker: PhantomData,
        }
    }

    /// 呼び出し側が指定したトークンから Id を作成
    ///
    /// 空文字列は「未指定」とみなして `None` を返します。
    pub fn from_token(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            return None;
        }
        Some(Self {
            token,
            _marker: PhantomData,
        })
    }

    /// Generator-produced token, known to be non-empty.
    pub(crate) fn from_generated(token: String) -> Self {
        debug_assert!(!token.is_empty());
        Self {
            token,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn label() -> &'static str {
        T::label()
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Job のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Job {}

impl IdMarker for Job {
    fn label() -> &'static str {
        "job"
    }
}

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn label() -> &'static str {
        "task"
    }
}

/// Identifier of a submitted job (the unit the worker echoes back).
pub type JobId = Id<Job>;

/// Identifier of a task inside a job. Stable across resubmissions.
pub type TaskId = Id<Task>;

/// Routing token of the worker a submission is intended for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
    /// Sentinel meaning "routing not resolved yet".
    pub const UNASSIGNED: &'static str = "1";

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn unassigned() -> Self {
        Self(Self::UNASSIGNED.to_string())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0 == Self::UNASSIGNED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self::unassigned()
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the submitting client, stable for the client's session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let ulid1 = Ulid::new();
        let ulid2 = Ulid::new();

        let job = JobId::from_ulid(ulid1);
        let task = TaskId::from_ulid(ulid2);

        assert_eq!(job.as_str(), ulid1.to_string());
        assert_eq!(task.as_str(), ulid2.to_string());
        assert_eq!(JobId::label(), "job");
        assert_eq!(TaskId::label(), "task");

        // let _: JobId = task; // <- does not compile
    }

    #[test]
    fn empty_token_is_treated_as_unset() {
        assert!(JobId::from_token("").is_none());
        let id = TaskId::from_token("abc123").unwrap();
        assert_eq!(id.to_string(), "abc123");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let job_id = JobId::from_token("6f1c2a").unwrap();

        let serialized = serde_json::to_string(&job_id).unwrap();
        assert_eq!(serialized, "\"6f1c2a\"");

        let deserialized: JobId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(job_id, deserialized);
    }

    #[test]
    fn worker_id_defaults_to_unassigned_sentinel() {
        let w = WorkerId::default();
        assert!(w.is_unassigned());
        assert_eq!(w.as_str(), "1");
        assert!(!WorkerId::new("node-7").is_unassigned());
    }
}
