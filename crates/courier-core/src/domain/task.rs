use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::errors::SubmitError;
use super::ids::{JobId, TaskId};
use super::param::ParamSet;
use super::task_type::TaskType;

/// Source language of the submitted code artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Language {
    #[default]
    Unspecified,
    Python,
    Cpp,
    /// Parameter-only task, no code payload.
    Declarative,
}

impl Language {
    pub fn code(self) -> i32 {
        match self {
            Language::Unspecified => 0,
            Language::Python => 1,
            Language::Cpp => 2,
            Language::Declarative => 3,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Language::Unspecified => "unspecified",
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::Declarative => "declarative",
        };
        f.write_str(s)
    }
}

impl From<Language> for i32 {
    fn from(language: Language) -> Self {
        language.code()
    }
}

impl TryFrom<i32> for Language {
    type Error = SubmitError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Language::Unspecified),
            1 => Ok(Language::Python),
            2 => Ok(Language::Cpp),
            3 => Ok(Language::Declarative),
            other => Err(SubmitError::InvalidLanguage(other)),
        }
    }
}

/// Description of one distributed computation job.
///
/// Built by `TaskBuilder`; immutable afterwards (fields are only readable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    #[serde(rename = "type")]
    task_type: TaskType,
    name: String,
    language: Language,
    params: ParamSet,
    #[serde(default, with = "hex_code", skip_serializing_if = "Option::is_none")]
    code: Option<Vec<u8>>,
    #[serde(default)]
    node_map: BTreeMap<String, String>,
    #[serde(default)]
    input_datasets: Vec<String>,
    job_id: JobId,
    task_id: TaskId,
}

/// Everything a descriptor is made of, once ids are settled.
pub(crate) struct TaskParts {
    pub task_type: TaskType,
    pub name: String,
    pub language: Language,
    pub params: ParamSet,
    pub code: Option<Vec<u8>>,
    pub node_map: BTreeMap<String, String>,
    pub input_datasets: Vec<String>,
    pub job_id: JobId,
    pub task_id: TaskId,
}

impl TaskDescriptor {
    pub(crate) fn from_parts(parts: TaskParts) -> Self {
        Self {
            task_type: parts.task_type,
            name: parts.name,
            language: parts.language,
            params: parts.params,
            code: parts.code,
            node_map: parts.node_map,
            input_datasets: parts.input_datasets,
            job_id: parts.job_id,
            task_id: parts.task_id,
        }
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn code(&self) -> Option<&[u8]> {
        self.code.as_deref()
    }

    pub fn node_map(&self) -> &BTreeMap<String, String> {
        &self.node_map
    }

    pub fn input_datasets(&self) -> &[String] {
        &self.input_datasets
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }
}

/// `code` travels as a hex string.
mod hex_code {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(code: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match code {
            Some(bytes) => s.serialize_some(&hex::encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let text: Option<String> = Option::deserialize(d)?;
        text.map(|t| hex::decode(t).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::param::ParamValue;

    fn sample() -> TaskDescriptor {
        let mut params = ParamSet::new();
        params.insert("pirType", ParamValue::int32(1));
        let mut node_map = BTreeMap::new();
        node_map.insert("server".to_string(), "192.168.99.26:50050".to_string());

        TaskDescriptor::from_parts(TaskParts {
            task_type: TaskType::PIR,
            name: "keyword pir task".to_string(),
            language: Language::Declarative,
            params,
            code: Some(b"print(1)".to_vec()),
            node_map,
            input_datasets: vec!["serverData".to_string()],
            job_id: JobId::from_token("job-1").unwrap(),
            task_id: TaskId::from_token("task-1").unwrap(),
        })
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::try_from(3).unwrap(), Language::Declarative);
        assert_eq!(Language::Declarative.code(), 3);
        assert!(matches!(
            Language::try_from(9),
            Err(SubmitError::InvalidLanguage(9))
        ));
    }

    #[test]
    fn wire_uses_expected_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        for field in [
            "type",
            "name",
            "language",
            "params",
            "code",
            "node_map",
            "input_datasets",
            "job_id",
            "task_id",
        ] {
            assert!(obj.contains_key(field), "missing {field}");
        }
        assert_eq!(json["type"], 2);
        assert_eq!(json["language"], 3);
        assert_eq!(json["code"], hex::encode(b"print(1)"));
        assert_eq!(json["job_id"], "job-1");
    }

    #[test]
    fn descriptor_survives_the_wire() {
        let task = sample();
        let text = serde_json::to_string(&task).unwrap();
        let back: TaskDescriptor = serde_json::from_str(&text).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn absent_code_is_omitted() {
        let mut parts_task = sample();
        parts_task.code = None;
        let json = serde_json::to_value(&parts_task).unwrap();
        assert!(json.get("code").is_none());

        let back: TaskDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back.code(), None);
    }
}
