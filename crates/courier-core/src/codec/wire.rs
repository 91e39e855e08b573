//! Wire record of a `ParamValue`.
//!
//! `{var_type, is_array, value_<kind>}` with exactly one `value_*` field
//! present. The field holds a single literal when `is_array` is false and a
//! list otherwise.

use serde::{Deserialize, Serialize};

use crate::domain::param::{Array, ParamKind, ParamValue, Scalar};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    #[error("param value of kind {kind} must carry exactly one payload field, found {found}")]
    PayloadCount { kind: ParamKind, found: usize },

    #[error("param value of kind {kind} has no value_{field} payload")]
    MissingPayload { kind: ParamKind, field: &'static str },

    #[error("param value of kind {kind} has is_array={is_array} but a {shape} payload")]
    ShapeMismatch {
        kind: ParamKind,
        is_array: bool,
        shape: &'static str,
    },
}

/// A payload field: a lone literal or a list of literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireParamValue {
    pub var_type: ParamKind,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_int32: Option<OneOrMany<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_int64: Option<OneOrMany<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_float: Option<OneOrMany<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_double: Option<OneOrMany<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_bool: Option<OneOrMany<bool>>,
}

impl WireParamValue {
    fn empty(var_type: ParamKind, is_array: bool) -> Self {
        Self {
            var_type,
            is_array,
            value_int32: None,
            value_int64: None,
            value_string: None,
            value_float: None,
            value_double: None,
            value_bool: None,
        }
    }

    fn populated(&self) -> usize {
        [
            self.value_int32.is_some(),
            self.value_int64.is_some(),
            self.value_string.is_some(),
            self.value_float.is_some(),
            self.value_double.is_some(),
            self.value_bool.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

impl From<ParamValue> for WireParamValue {
    fn from(value: ParamValue) -> Self {
        let mut wire = WireParamValue::empty(value.kind(), value.is_array());
        match value {
            ParamValue::Scalar(Scalar::Int32(v)) => wire.value_int32 = Some(OneOrMany::One(v)),
            ParamValue::Scalar(Scalar::Int64(v)) => wire.value_int64 = Some(OneOrMany::One(v)),
            ParamValue::Scalar(Scalar::String(v)) => wire.value_string = Some(OneOrMany::One(v)),
            ParamValue::Scalar(Scalar::Float(v)) => wire.value_float = Some(OneOrMany::One(v)),
            ParamValue::Scalar(Scalar::Double(v)) => wire.value_double = Some(OneOrMany::One(v)),
            ParamValue::Scalar(Scalar::Bool(v)) => wire.value_bool = Some(OneOrMany::One(v)),
            ParamValue::Array(Array::Int32(v)) => wire.value_int32 = Some(OneOrMany::Many(v)),
            ParamValue::Array(Array::Int64(v)) => wire.value_int64 = Some(OneOrMany::Many(v)),
            ParamValue::Array(Array::String(v)) => wire.value_string = Some(OneOrMany::Many(v)),
            ParamValue::Array(Array::Float(v)) => wire.value_float = Some(OneOrMany::Many(v)),
            ParamValue::Array(Array::Double(v)) => wire.value_double = Some(OneOrMany::Many(v)),
            ParamValue::Array(Array::Bool(v)) => wire.value_bool = Some(OneOrMany::Many(v)),
        }
        wire
    }
}

impl TryFrom<WireParamValue> for ParamValue {
    type Error = WireError;

    fn try_from(wire: WireParamValue) -> Result<Self, Self::Error> {
        let kind = wire.var_type;
        let found = wire.populated();
        if found != 1 {
            return Err(WireError::PayloadCount { kind, found });
        }
        let is_array = wire.is_array;
        match kind {
            ParamKind::Int32 => shape(wire.value_int32, kind, is_array, "int32", Scalar::Int32, Array::Int32),
            ParamKind::Int64 => shape(wire.value_int64, kind, is_array, "int64", Scalar::Int64, Array::Int64),
            ParamKind::String => shape(wire.value_string, kind, is_array, "string", Scalar::String, Array::String),
            ParamKind::Float => shape(wire.value_float, kind, is_array, "float", Scalar::Float, Array::Float),
            ParamKind::Double => shape(wire.value_double, kind, is_array, "double", Scalar::Double, Array::Double),
            ParamKind::Bool => shape(wire.value_bool, kind, is_array, "bool", Scalar::Bool, Array::Bool),
        }
    }
}

fn shape<T>(
    field: Option<OneOrMany<T>>,
    kind: ParamKind,
    is_array: bool,
    field_name: &'static str,
    scalar: fn(T) -> Scalar,
    array: fn(Vec<T>) -> Array,
) -> Result<ParamValue, WireError> {
    match (field, is_array) {
        (Some(OneOrMany::One(v)), false) => Ok(ParamValue::Scalar(scalar(v))),
        (Some(OneOrMany::Many(v)), true) => Ok(ParamValue::Array(array(v))),
        (Some(OneOrMany::One(_)), true) => Err(WireError::ShapeMismatch {
            kind,
            is_array,
            shape: "scalar",
        }),
        (Some(OneOrMany::Many(_)), false) => Err(WireError::ShapeMismatch {
            kind,
            is_array,
            shape: "list",
        }),
        (None, _) => Err(WireError::MissingPayload {
            kind,
            field: field_name,
        }),
    }
}
