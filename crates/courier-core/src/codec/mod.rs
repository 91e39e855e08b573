//! Parameter Codec
//!
//! - **grammar**: `name:TYPE:is_array:value` 形式の文字列 ⇔ ParamSet
//! - **schema**: 名前 → 型の宣言に基づく JSON マッピングのエンコード
//! - **wire**: ParamValue の wire レコード（`var_type` + payload 1 つ）

pub mod grammar;
pub mod schema;
pub mod wire;

pub use self::grammar::{format_entry, format_params, parse_entry, parse_params};
pub use self::schema::{ParamSchema, ParamShape};
pub use self::wire::{OneOrMany, WireError, WireParamValue};
