//! ParamSchema - 名前から型への宣言的なマッピング
//!
//! 名前ごとの if/else で型を決めるのではなく、スキーマに
//! `(kind, is_array)` を宣言し、1 つの汎用ルーチンでエンコードします。
//! スキーマにない名前は `UnknownParameter` になり、黙って捨てられることはありません。

use std::collections::BTreeMap;

use serde_json::Value;

use super::grammar;
use crate::domain::errors::SubmitError;
use crate::domain::param::{Array, ParamKind, ParamSet, ParamValue, Scalar};

/// Declared shape of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamShape {
    pub kind: ParamKind,
    pub is_array: bool,
}

impl ParamShape {
    pub const fn scalar(kind: ParamKind) -> Self {
        Self {
            kind,
            is_array: false,
        }
    }

    pub const fn array(kind: ParamKind) -> Self {
        Self {
            kind,
            is_array: true,
        }
    }
}

/// ParamSchema は parameter 名 → `ParamShape` の登録簿
///
/// # 使用例
/// ```ignore
/// let schema = ParamSchema::new()
///     .with("pirType", ParamShape::scalar(ParamKind::Int32))
///     .with("clientData", ParamShape::array(ParamKind::String));
/// let params = schema.encode(&json_map)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSchema {
    fields: BTreeMap<String, ParamShape>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration. A later declaration of the same name wins.
    pub fn with(mut self, name: impl Into<String>, shape: ParamShape) -> Self {
        self.declare(name, shape);
        self
    }

    pub fn declare(&mut self, name: impl Into<String>, shape: ParamShape) -> Option<ParamShape> {
        self.fields.insert(name.into(), shape)
    }

    pub fn shape_of(&self, name: &str) -> Option<ParamShape> {
        self.fields.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keyword PIR: `clientData` is a list of query keys.
    pub fn keyword_pir() -> Self {
        Self::new()
            .with("clientData", ParamShape::array(ParamKind::String))
            .with("serverData", ParamShape::scalar(ParamKind::String))
            .with("pirType", ParamShape::scalar(ParamKind::Int32))
            .with("outputFullFilename", ParamShape::scalar(ParamKind::String))
    }

    /// PSI: `clientData` names a single dataset.
    pub fn psi() -> Self {
        Self::new()
            .with("clientData", ParamShape::scalar(ParamKind::String))
            .with("serverData", ParamShape::scalar(ParamKind::String))
            .with("clientIndex", ParamShape::scalar(ParamKind::Int32))
            .with("serverIndex", ParamShape::scalar(ParamKind::Int32))
            .with("psiType", ParamShape::scalar(ParamKind::Int32))
            .with("psiTag", ParamShape::scalar(ParamKind::Int32))
            .with("outputFullFilename", ParamShape::scalar(ParamKind::String))
    }

    /// Encode a generic name → JSON value mapping.
    ///
    /// Every entry goes through the same shape-directed routine. Nothing is
    /// returned unless every entry encodes.
    pub fn encode<'a, I, K>(&self, values: I) -> Result<ParamSet, SubmitError>
    where
        I: IntoIterator<Item = (K, &'a Value)>,
        K: AsRef<str>,
    {
        let mut params = ParamSet::new();
        for (name, value) in values {
            let name = name.as_ref();
            let encoded = self.encode_value(name, value)?;
            params.insert_new(name, encoded)?;
        }
        Ok(params)
    }

    pub fn encode_value(&self, name: &str, value: &Value) -> Result<ParamValue, SubmitError> {
        let shape = self
            .shape_of(name)
            .ok_or_else(|| SubmitError::unknown(name))?;
        let malformed = |reason: String| SubmitError::malformed(format!("{name}={value}"), reason);

        if !shape.is_array {
            return scalar_from_json(shape.kind, value)
                .map(ParamValue::Scalar)
                .map_err(malformed);
        }

        let array = match value {
            Value::Array(items) => {
                let scalars = items
                    .iter()
                    .map(|item| scalar_from_json(shape.kind, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(malformed)?;
                Array::collect(shape.kind, scalars)
                    .ok_or_else(|| malformed(format!("array elements are not all {}", shape.kind)))?
            }
            // `a;b;c` のような文字列表現も受け付ける
            Value::String(text) => grammar::parse_array(shape.kind, text).map_err(malformed)?,
            other => {
                return Err(malformed(format!(
                    "expected an array of {}, got {}",
                    shape.kind,
                    json_type(other)
                )));
            }
        };
        Ok(ParamValue::Array(array))
    }

    /// Check that an already-decoded set only uses declared names and shapes.
    pub fn validate(&self, params: &ParamSet) -> Result<(), SubmitError> {
        for (name, value) in params.iter() {
            let shape = self
                .shape_of(name)
                .ok_or_else(|| SubmitError::unknown(name))?;
            if shape.kind != value.kind() || shape.is_array != value.is_array() {
                return Err(SubmitError::malformed(
                    name,
                    format!(
                        "declared as {}{}, got {}{}",
                        shape.kind,
                        if shape.is_array { "[]" } else { "" },
                        value.kind(),
                        if value.is_array() { "[]" } else { "" },
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn scalar_from_json(kind: ParamKind, value: &Value) -> Result<Scalar, String> {
    let mismatch = || format!("expected {kind}, got {}", json_type(value));
    match kind {
        ParamKind::Int32 => value
            .as_i64()
            .ok_or_else(mismatch)
            .and_then(|v| i32::try_from(v).map_err(|_| format!("{v} is out of range for {kind}")))
            .map(Scalar::Int32),
        ParamKind::Int64 => value.as_i64().ok_or_else(mismatch).map(Scalar::Int64),
        ParamKind::Float => value.as_f64().ok_or_else(mismatch).and_then(|v| {
            let narrowed = v as f32;
            if narrowed.is_finite() {
                Ok(Scalar::Float(narrowed))
            } else {
                Err(format!("{v} is out of range for {kind}"))
            }
        }),
        ParamKind::Double => value.as_f64().ok_or_else(mismatch).and_then(|v| {
            if v.is_finite() {
                Ok(Scalar::Double(v))
            } else {
                Err(format!("{v} is not finite"))
            }
        }),
        ParamKind::String => value
            .as_str()
            .ok_or_else(mismatch)
            .map(|s| Scalar::String(s.to_string())),
        ParamKind::Bool => value.as_bool().ok_or_else(mismatch).map(Scalar::Bool),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
