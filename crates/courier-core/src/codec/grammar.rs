//! Textual parameter grammar.
//!
//! ```text
//! params = entry ("," entry)*
//! entry  = name ":" TYPE ":" ("0" | "1") ":" value
//! value  = scalar | scalar (";" scalar)*      // array form when the flag is 1
//! ```
//!
//! Whitespace is significant everywhere: nothing is trimmed, so payloads such
//! as encoded tokens survive unchanged.

use crate::domain::errors::SubmitError;
use crate::domain::param::{Array, ParamKind, ParamSet, ParamValue, Scalar};

pub const ENTRY_SEPARATOR: char = ',';
pub const FIELD_SEPARATOR: char = ':';
pub const ARRAY_SEPARATOR: char = ';';

/// Parse a full parameter string. The empty string is an empty set.
pub fn parse_params(input: &str) -> Result<ParamSet, SubmitError> {
    let mut params = ParamSet::new();
    if input.is_empty() {
        return Ok(params);
    }
    for entry in input.split(ENTRY_SEPARATOR) {
        let (name, value) = parse_entry(entry)?;
        params
            .insert_new(name, value)
            .map_err(|_| SubmitError::malformed(entry, "duplicate parameter name"))?;
    }
    Ok(params)
}

/// Parse one `name:TYPE:flag:value` entry.
pub fn parse_entry(entry: &str) -> Result<(String, ParamValue), SubmitError> {
    let fields: Vec<&str> = entry.split(FIELD_SEPARATOR).collect();
    let &[name, tag, flag, literal] = &fields[..] else {
        return Err(SubmitError::malformed(
            entry,
            format!("expected 4 ':'-separated fields, found {}", fields.len()),
        ));
    };

    if name.is_empty() {
        return Err(SubmitError::malformed(entry, "empty parameter name"));
    }
    let kind = ParamKind::from_tag(tag)
        .ok_or_else(|| SubmitError::malformed(entry, format!("unknown type tag {tag:?}")))?;
    let is_array = match flag {
        "0" => false,
        "1" => true,
        other => {
            return Err(SubmitError::malformed(
                entry,
                format!("array flag must be 0 or 1, got {other:?}"),
            ));
        }
    };

    let value = if is_array {
        ParamValue::Array(parse_array(kind, literal).map_err(|r| SubmitError::malformed(entry, r))?)
    } else {
        ParamValue::Scalar(parse_scalar(kind, literal).map_err(|r| SubmitError::malformed(entry, r))?)
    };
    Ok((name.to_string(), value))
}

/// Parse a single literal as `kind`. The error is a human-readable reason.
pub(crate) fn parse_scalar(kind: ParamKind, literal: &str) -> Result<Scalar, String> {
    let bad = |e: &dyn std::fmt::Display| format!("{literal:?} is not a valid {kind}: {e}");
    match kind {
        ParamKind::Int32 => literal.parse().map(Scalar::Int32).map_err(|e| bad(&e)),
        ParamKind::Int64 => literal.parse().map(Scalar::Int64).map_err(|e| bad(&e)),
        // `inf` / `NaN` も parse できてしまうが、JSON では表現できない
        ParamKind::Float => match literal.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(Scalar::Float(v)),
            Ok(_) => Err(bad(&"value is not finite")),
            Err(e) => Err(bad(&e)),
        },
        ParamKind::Double => match literal.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Scalar::Double(v)),
            Ok(_) => Err(bad(&"value is not finite")),
            Err(e) => Err(bad(&e)),
        },
        ParamKind::String => Ok(Scalar::String(literal.to_string())),
        ParamKind::Bool => match literal {
            "true" | "1" => Ok(Scalar::Bool(true)),
            "false" | "0" => Ok(Scalar::Bool(false)),
            _ => Err(bad(&"expected true, false, 1 or 0")),
        },
    }
}

/// Parse a `;`-separated list of literals as an array of `kind`.
pub(crate) fn parse_array(kind: ParamKind, literal: &str) -> Result<Array, String> {
    let items = literal
        .split(ARRAY_SEPARATOR)
        .map(|item| parse_scalar(kind, item))
        .collect::<Result<Vec<_>, _>>()?;
    Array::collect(kind, items).ok_or_else(|| format!("array elements are not all {kind}"))
}

/// Render a parameter set back into the grammar.
///
/// Fails when a value has no textual form: names or strings containing a
/// separator, or an empty array.
pub fn format_params(params: &ParamSet) -> Result<String, SubmitError> {
    let mut entries = Vec::with_capacity(params.len());
    for (name, value) in params.iter() {
        entries.push(format_entry(name, value)?);
    }
    Ok(entries.join(&ENTRY_SEPARATOR.to_string()))
}

pub fn format_entry(name: &str, value: &ParamValue) -> Result<String, SubmitError> {
    if name.is_empty() {
        return Err(SubmitError::malformed(name, "empty parameter name"));
    }
    if name.contains([ENTRY_SEPARATOR, FIELD_SEPARATOR]) {
        return Err(SubmitError::malformed(
            name,
            "parameter name contains ',' or ':'",
        ));
    }

    let literal = match value {
        ParamValue::Scalar(scalar) => {
            format_scalar(scalar, false).map_err(|r| SubmitError::malformed(name, r))?
        }
        ParamValue::Array(array) => {
            if array.is_empty() {
                return Err(SubmitError::malformed(name, "empty arrays have no textual form"));
            }
            let items = array
                .scalars()
                .iter()
                .map(|s| format_scalar(s, true))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|r| SubmitError::malformed(name, r))?;
            items.join(&ARRAY_SEPARATOR.to_string())
        }
    };

    let flag = if value.is_array() { "1" } else { "0" };
    Ok(format!("{name}:{}:{flag}:{literal}", value.kind().tag()))
}

fn format_scalar(scalar: &Scalar, in_array: bool) -> Result<String, String> {
    Ok(match scalar {
        Scalar::Int32(v) => v.to_string(),
        Scalar::Int64(v) => v.to_string(),
        Scalar::Float(v) => v.to_string(),
        Scalar::Double(v) => v.to_string(),
        Scalar::Bool(v) => v.to_string(),
        Scalar::String(s) => {
            let reserved = s.contains([ENTRY_SEPARATOR, FIELD_SEPARATOR])
                || (in_array && s.contains(ARRAY_SEPARATOR));
            if reserved {
                return Err(format!("string {s:?} contains a reserved separator"));
            }
            s.clone()
        }
    })
}
