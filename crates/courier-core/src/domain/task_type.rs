//! TaskType - job kind の登録簿
//!
//! task_type は wire 上では整数コードです。認識できるコードは
//! `TaskTypeRegistry` に登録されたものだけで、それ以外は
//! `InvalidTaskType` として拒否します。
//!
//! # 組み込み
//! - 0: federated learning
//! - 1: node (generic)
//! - 2: PIR（keyword PIR のスキーマ付き）
//! - 3: PSI（PSI のスキーマ付き）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::codec::ParamSchema;
use crate::domain::errors::SubmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(i32);

impl TaskType {
    pub const FEDERATED_LEARNING: TaskType = TaskType(0);
    pub const NODE: TaskType = TaskType(1);
    pub const PIR: TaskType = TaskType(2);
    pub const PSI: TaskType = TaskType(3);

    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone)]
pub struct TaskTypeEntry {
    pub name: String,
    pub schema: Option<ParamSchema>,
}

/// RegistryError は TaskTypeRegistry の操作エラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("task type {code} is already registered as '{name}'")]
    AlreadyRegistered { code: i32, name: String },
}

/// TaskTypeRegistry は task_type コードと名前・既定スキーマの対応表
///
/// # 使用例
/// ```ignore
/// let mut registry = TaskTypeRegistry::builtin();
/// registry.register(7, "vertical-lr", None)?;
/// let task_type = registry.resolve(7)?;
/// ```
#[derive(Debug, Clone)]
pub struct TaskTypeRegistry {
    entries: BTreeMap<i32, TaskTypeEntry>,
}

impl TaskTypeRegistry {
    /// A registry that recognizes nothing.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The built-in job kinds.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            TaskType::FEDERATED_LEARNING.code(),
            TaskTypeEntry {
                name: "federated-learning".to_string(),
                schema: None,
            },
        );
        entries.insert(
            TaskType::NODE.code(),
            TaskTypeEntry {
                name: "node".to_string(),
                schema: None,
            },
        );
        entries.insert(
            TaskType::PIR.code(),
            TaskTypeEntry {
                name: "pir".to_string(),
                schema: Some(ParamSchema::keyword_pir()),
            },
        );
        entries.insert(
            TaskType::PSI.code(),
            TaskTypeEntry {
                name: "psi".to_string(),
                schema: Some(ParamSchema::psi()),
            },
        );
        Self { entries }
    }

    pub fn register(
        &mut self,
        code: i32,
        name: impl Into<String>,
        schema: Option<ParamSchema>,
    ) -> Result<TaskType, RegistryError> {
        if let Some(existing) = self.entries.get(&code) {
            return Err(RegistryError::AlreadyRegistered {
                code,
                name: existing.name.clone(),
            });
        }
        self.entries.insert(
            code,
            TaskTypeEntry {
                name: name.into(),
                schema,
            },
        );
        Ok(TaskType(code))
    }

    /// Resolve a raw code into a recognized `TaskType`.
    pub fn resolve(&self, code: i32) -> Result<TaskType, SubmitError> {
        if self.entries.contains_key(&code) {
            Ok(TaskType(code))
        } else {
            Err(SubmitError::InvalidTaskType(code))
        }
    }

    /// Resolve a registered name (`"pir"`, `"psi"`, ...).
    pub fn resolve_name(&self, name: &str) -> Option<TaskType> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.name == name)
            .map(|(code, _)| TaskType(*code))
    }

    pub fn get(&self, task_type: TaskType) -> Option<&TaskTypeEntry> {
        self.entries.get(&task_type.code())
    }

    pub fn name_of(&self, task_type: TaskType) -> Option<&str> {
        self.get(task_type).map(|e| e.name.as_str())
    }

    pub fn schema_for(&self, task_type: TaskType) -> Option<&ParamSchema> {
        self.get(task_type).and_then(|e| e.schema.as_ref())
    }

    pub fn registered_codes(&self) -> Vec<i32> {
        self.entries.keys().copied().collect()
    }
}

impl Default for TaskTypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
