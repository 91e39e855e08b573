//! TaskBuilder - TaskDescriptor の組み立て
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 構築時検証（Fail-fast 設計）: task_type / language は build() で検証
//! - ID 生成は IdGenerator に委譲（テストで決定的な ID を注入できる）
//!
//! I/O は行いません。

use std::collections::BTreeMap;

use crate::domain::errors::SubmitError;
use crate::domain::ids::{JobId, TaskId};
use crate::domain::param::ParamSet;
use crate::domain::task::{Language, TaskDescriptor, TaskParts};
use crate::domain::task_type::TaskTypeRegistry;
use crate::ports::IdGenerator;

/// TaskBuilder は TaskDescriptor を構築
///
/// # 使用例
/// ```ignore
/// let task = TaskBuilder::new(2, "keyword pir task")
///     .language(3)
///     .params(params)
///     .input_datasets(["serverData"])
///     .build(&registry, &id_gen)?;
/// ```
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    task_type: i32,
    name: String,
    language: i32,
    params: ParamSet,
    code: Option<Vec<u8>>,
    node_map: BTreeMap<String, String>,
    input_datasets: Vec<String>,
    job_id: Option<JobId>,
    task_id: Option<TaskId>,
}

impl TaskBuilder {
    pub fn new(task_type: i32, name: impl Into<String>) -> Self {
        Self {
            task_type,
            name: name.into(),
            language: Language::Unspecified.code(),
            params: ParamSet::new(),
            code: None,
            node_map: BTreeMap::new(),
            input_datasets: Vec::new(),
            job_id: None,
            task_id: None,
        }
    }

    /// Raw language tag; validated by `build()`.
    pub fn language(mut self, code: i32) -> Self {
        self.language = code;
        self
    }

    pub fn params(mut self, params: ParamSet) -> Self {
        self.params = params;
        self
    }

    pub fn code(mut self, code: impl Into<Vec<u8>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn node_map<I, K, V>(mut self, node_map: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.node_map = node_map
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn input_datasets<I, S>(mut self, datasets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_datasets = datasets.into_iter().map(Into::into).collect();
        self
    }

    /// Caller-supplied job id. An empty token counts as "not supplied".
    pub fn job_id(mut self, token: impl Into<String>) -> Self {
        self.job_id = JobId::from_token(token);
        self
    }

    /// Caller-supplied task id. An empty token counts as "not supplied".
    pub fn task_id(mut self, token: impl Into<String>) -> Self {
        self.task_id = TaskId::from_token(token);
        self
    }

    /// Validate and assemble the descriptor.
    ///
    /// # 検証
    /// - task_type が registry に登録されていなければ `InvalidTaskType`
    /// - language が未知のタグなら `InvalidLanguage`
    pub fn build(
        self,
        registry: &TaskTypeRegistry,
        ids: &dyn IdGenerator,
    ) -> Result<TaskDescriptor, SubmitError> {
        let task_type = registry.resolve(self.task_type)?;
        let language = Language::try_from(self.language)?;

        let job_id = self.job_id.unwrap_or_else(|| ids.generate_job_id());
        let task_id = self.task_id.unwrap_or_else(|| ids.generate_task_id());

        tracing::debug!(
            %task_type,
            %job_id,
            %task_id,
            params = self.params.len(),
            "task descriptor built"
        );

        Ok(TaskDescriptor::from_parts(TaskParts {
            task_type,
            name: self.name,
            language,
            params: self.params,
            code: self.code,
            node_map: self.node_map,
            input_datasets: self.input_datasets,
            job_id,
            task_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::param::ParamValue;
    use crate::domain::task_type::TaskType;
    use crate::ports::{SequentialIdGenerator, SystemClock, UlidGenerator};

    fn pir_params() -> ParamSet {
        let mut params = ParamSet::new();
        params.insert("pirType", ParamValue::int32(1));
        params
    }

    #[test]
    fn builds_a_full_descriptor() {
        let registry = TaskTypeRegistry::builtin();
        let ids = SequentialIdGenerator::new("t");

        let task = TaskBuilder::new(2, "keyword pir task")
            .language(3)
            .params(pir_params())
            .code(b"print(1)".to_vec())
            .node_map([("server", "10.0.0.1:50050")])
            .input_datasets(["serverData"])
            .build(&registry, &ids)
            .unwrap();

        assert_eq!(task.task_type(), TaskType::PIR);
        assert_eq!(task.name(), "keyword pir task");
        assert_eq!(task.language(), Language::Declarative);
        assert_eq!(task.params(), &pir_params());
        assert_eq!(task.code(), Some(&b"print(1)"[..]));
        assert_eq!(task.node_map().get("server").map(String::as_str), Some("10.0.0.1:50050"));
        assert_eq!(task.input_datasets(), ["serverData".to_string()]);
        assert_eq!(task.job_id().as_str(), "t-job-1");
        assert_eq!(task.task_id().as_str(), "t-task-2");
    }

    #[test]
    fn caller_supplied_ids_are_kept() {
        let task = TaskBuilder::new(3, "psi task")
            .job_id("job-abc")
            .task_id("task-abc")
            .build(&TaskTypeRegistry::builtin(), &SequentialIdGenerator::new("t"))
            .unwrap();
        assert_eq!(task.job_id().as_str(), "job-abc");
        assert_eq!(task.task_id().as_str(), "task-abc");
    }

    #[test]
    fn empty_ids_are_generated() {
        let task = TaskBuilder::new(3, "psi task")
            .job_id("")
            .build(&TaskTypeRegistry::builtin(), &SequentialIdGenerator::new("g"))
            .unwrap();
        assert_eq!(task.job_id().as_str(), "g-job-1");
    }

    #[test]
    fn generated_ids_differ_between_builds() {
        let registry = TaskTypeRegistry::builtin();
        let ids = UlidGenerator::new(SystemClock);

        let a = TaskBuilder::new(2, "a").build(&registry, &ids).unwrap();
        let b = TaskBuilder::new(2, "a").build(&registry, &ids).unwrap();

        assert_ne!(a.job_id(), b.job_id());
        assert_ne!(a.task_id(), b.task_id());
    }

    #[test]
    fn unknown_task_type_is_rejected() {
        let err = TaskBuilder::new(99, "x")
            .build(&TaskTypeRegistry::builtin(), &SequentialIdGenerator::new("t"))
            .unwrap_err();
        assert!(matches!(err, SubmitError::InvalidTaskType(99)));
    }

    #[test]
    fn unknown_language_is_rejected() {
        let err = TaskBuilder::new(2, "x")
            .language(8)
            .build(&TaskTypeRegistry::builtin(), &SequentialIdGenerator::new("t"))
            .unwrap_err();
        assert!(matches!(err, SubmitError::InvalidLanguage(8)));
    }

    #[test]
    fn defaults_are_parameter_only_friendly() {
        let task = TaskBuilder::new(0, "fl")
            .build(&TaskTypeRegistry::builtin(), &SequentialIdGenerator::new("t"))
            .unwrap();
        assert_eq!(task.language(), Language::Unspecified);
        assert!(task.code().is_none());
        assert!(task.node_map().is_empty());
        assert!(task.input_datasets().is_empty());
    }
}
