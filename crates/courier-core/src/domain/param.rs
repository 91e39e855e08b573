//! Typed parameter values attached to a task.
//!
//! `ParamValue` is either a single scalar or an ordered array of one scalar
//! kind. The scalar/array split lives in the type, so a value can never carry
//! both payloads (or neither).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::codec::wire::WireParamValue;
use crate::domain::errors::SubmitError;

/// Scalar kind of a parameter.
///
/// On the wire this is the numeric `var_type` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum ParamKind {
    Int32,
    Int64,
    String,
    Float,
    Double,
    Bool,
}

impl ParamKind {
    pub const ALL: [ParamKind; 6] = [
        ParamKind::Int32,
        ParamKind::Int64,
        ParamKind::String,
        ParamKind::Float,
        ParamKind::Double,
        ParamKind::Bool,
    ];

    /// `var_type` code used on the wire.
    pub fn code(self) -> i32 {
        match self {
            ParamKind::Int32 => 0,
            ParamKind::Int64 => 1,
            ParamKind::String => 2,
            ParamKind::Float => 3,
            ParamKind::Double => 4,
            ParamKind::Bool => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Tag used by the textual grammar (`INT32`, `STRING`, ...).
    pub fn tag(self) -> &'static str {
        match self {
            ParamKind::Int32 => "INT32",
            ParamKind::Int64 => "INT64",
            ParamKind::String => "STRING",
            ParamKind::Float => "FLOAT",
            ParamKind::Double => "DOUBLE",
            ParamKind::Bool => "BOOL",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl From<ParamKind> for i32 {
    fn from(kind: ParamKind) -> Self {
        kind.code()
    }
}

impl TryFrom<i32> for ParamKind {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        ParamKind::from_code(code).ok_or_else(|| format!("unknown var_type code {code}"))
    }
}

/// A single decoded literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int32(i32),
    Int64(i64),
    String(String),
    Float(f32),
    Double(f64),
    Bool(bool),
}

impl Scalar {
    pub fn kind(&self) -> ParamKind {
        match self {
            Scalar::Int32(_) => ParamKind::Int32,
            Scalar::Int64(_) => ParamKind::Int64,
            Scalar::String(_) => ParamKind::String,
            Scalar::Float(_) => ParamKind::Float,
            Scalar::Double(_) => ParamKind::Double,
            Scalar::Bool(_) => ParamKind::Bool,
        }
    }
}

/// An ordered sequence of literals of one kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    String(Vec<String>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
}

impl Array {
    pub fn kind(&self) -> ParamKind {
        match self {
            Array::Int32(_) => ParamKind::Int32,
            Array::Int64(_) => ParamKind::Int64,
            Array::String(_) => ParamKind::String,
            Array::Float(_) => ParamKind::Float,
            Array::Double(_) => ParamKind::Double,
            Array::Bool(_) => ParamKind::Bool,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Array::Int32(v) => v.len(),
            Array::Int64(v) => v.len(),
            Array::String(v) => v.len(),
            Array::Float(v) => v.len(),
            Array::Double(v) => v.len(),
            Array::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect scalars into an array. All scalars must be of `kind`.
    pub(crate) fn collect(kind: ParamKind, items: Vec<Scalar>) -> Option<Array> {
        macro_rules! gather {
            ($variant:ident) => {
                items
                    .into_iter()
                    .map(|s| match s {
                        Scalar::$variant(v) => Some(v),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()
                    .map(Array::$variant)
            };
        }
        match kind {
            ParamKind::Int32 => gather!(Int32),
            ParamKind::Int64 => gather!(Int64),
            ParamKind::String => gather!(String),
            ParamKind::Float => gather!(Float),
            ParamKind::Double => gather!(Double),
            ParamKind::Bool => gather!(Bool),
        }
    }

    /// Element-wise view as scalars (used by the grammar formatter).
    pub(crate) fn scalars(&self) -> Vec<Scalar> {
        match self {
            Array::Int32(v) => v.iter().copied().map(Scalar::Int32).collect(),
            Array::Int64(v) => v.iter().copied().map(Scalar::Int64).collect(),
            Array::String(v) => v.iter().cloned().map(Scalar::String).collect(),
            Array::Float(v) => v.iter().copied().map(Scalar::Float).collect(),
            Array::Double(v) => v.iter().copied().map(Scalar::Double).collect(),
            Array::Bool(v) => v.iter().copied().map(Scalar::Bool).collect(),
        }
    }
}

/// One named parameter's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireParamValue", try_from = "WireParamValue")]
pub enum ParamValue {
    Scalar(Scalar),
    Array(Array),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Scalar(s) => s.kind(),
            ParamValue::Array(a) => a.kind(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ParamValue::Array(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ParamValue::Scalar(s) => Some(s),
            ParamValue::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            ParamValue::Array(a) => Some(a),
            ParamValue::Scalar(_) => None,
        }
    }

    pub fn int32(v: i32) -> Self {
        ParamValue::Scalar(Scalar::Int32(v))
    }

    pub fn int64(v: i64) -> Self {
        ParamValue::Scalar(Scalar::Int64(v))
    }

    pub fn float(v: f32) -> Self {
        ParamValue::Scalar(Scalar::Float(v))
    }

    pub fn double(v: f64) -> Self {
        ParamValue::Scalar(Scalar::Double(v))
    }

    pub fn string(v: impl Into<String>) -> Self {
        ParamValue::Scalar(Scalar::String(v.into()))
    }

    pub fn bool(v: bool) -> Self {
        ParamValue::Scalar(Scalar::Bool(v))
    }

    pub fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::Array(Array::String(items.into_iter().map(Into::into).collect()))
    }
}

/// Parameters of one task, keyed by unique name.
///
/// Iteration order is by name, so encodings are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    #[serde(default)]
    param_map: BTreeMap<String, ParamValue>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.param_map.insert(name.into(), value)
    }

    /// Insert a value whose name must not be present yet.
    pub fn insert_new(
        &mut self,
        name: impl Into<String>,
        value: ParamValue,
    ) -> Result<(), SubmitError> {
        let name = name.into();
        if self.param_map.contains_key(&name) {
            return Err(SubmitError::malformed(&name, "duplicate parameter name"));
        }
        self.param_map.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.param_map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.param_map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.param_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.param_map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.param_map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.param_map.keys().map(String::as_str)
    }
}

impl FromIterator<(String, ParamValue)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            param_map: iter.into_iter().collect(),
        }
    }
}
