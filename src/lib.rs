//! Ordered JSON value model with a strict/permissive parser and an indented
//! serializer.
//!
//! ```
//! use openjson::{parse, Value};
//!
//! let mut doc = parse(r#"{"name": "demo", "tags": ["a", "b"]}"#).unwrap();
//! doc["limits"]["retries"] = 3.into();
//! assert_eq!(doc["tags"][1], Value::from("b"));
//! assert_eq!(doc.key_at(2).unwrap(), "limits");
//! ```

pub mod constants;
pub mod decode;
pub mod document;
pub mod encode;
pub mod error;
pub mod options;
pub mod serde;
pub mod types;

use std::io::{Read, Write};

use ::serde::de::DeserializeOwned;
use ::serde::Serialize;

pub use crate::document::{literal, load_file, load_file_with_options, save, save_with_options};
pub use crate::error::{Error, ErrorKind, Location};
pub use crate::options::{
    default_mode, set_default_mode, Indent, ParseMode, ParseOptions, SerializeOptions,
    UnicodeEscapes,
};
pub use crate::serde::{from_value, to_value};
pub use crate::types::{Array, Object, Value};

pub type Result<T> = std::result::Result<T, Error>;

/// Parse with the process-wide default mode.
pub fn parse(input: &str) -> Result<Value> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Value> {
    decode::parse(input, options)
}

/// Out-parameter form of [`parse_with_options`]: on failure `out` becomes an
/// empty object.
pub fn parse_into(input: &str, out: &mut Value, options: &ParseOptions) -> Result<()> {
    decode::parse_into(input, out, options)
}

pub fn parse_slice(input: &[u8], options: &ParseOptions) -> Result<Value> {
    decode::from_slice(input, options)
}

pub fn parse_reader<R: Read>(reader: R, options: &ParseOptions) -> Result<Value> {
    decode::from_reader(reader, options)
}

pub fn validate_str(input: &str, options: &ParseOptions) -> Result<()> {
    decode::validate_str(input, options)
}

pub fn serialize(value: &Value) -> String {
    serialize_with_options(value, &SerializeOptions::default())
}

pub fn serialize_with_options(value: &Value, options: &SerializeOptions) -> String {
    encode::to_string(value, options)
}

pub fn to_writer<W: Write>(writer: W, value: &Value) -> Result<()> {
    to_writer_with_options(writer, value, &SerializeOptions::default())
}

pub fn to_writer_with_options<W: Write>(
    writer: W,
    value: &Value,
    options: &SerializeOptions,
) -> Result<()> {
    encode::to_writer(writer, value, options)
}

/// Parse `input` and deserialize the tree into `T`.
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    from_str_with_options(input, &ParseOptions::default())
}

pub fn from_str_with_options<T: DeserializeOwned>(input: &str, options: &ParseOptions) -> Result<T> {
    decode::from_str(input, options)
}

/// Serialize `value` into the value model and render it. Escaping is on so
/// the output always parses back.
pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    let tree = to_value(value)?;
    Ok(encode::to_string(
        &tree,
        &SerializeOptions::new().with_escape_strings(true),
    ))
}
