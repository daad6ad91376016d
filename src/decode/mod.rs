pub mod lexer;
pub mod parser;

use std::io::Read;

use serde::de::DeserializeOwned;

use crate::types::{Object, Value};
use crate::{Error, ParseOptions, Result};

pub fn parse(input: &str, options: &ParseOptions) -> Result<Value> {
    let tokens = lexer::tokenize(input, options).inspect_err(|err| {
        tracing::debug!(mode = ?options.mode, "lexical error(s): {err}");
    })?;
    parser::parse_tokens(&tokens, options).inspect_err(|err| {
        tracing::debug!(tokens = tokens.len(), "syntax error(s): {err}");
    })
}

/// Parse into an existing value. On failure `out` is reset to an empty
/// object, never left holding a partial tree.
pub fn parse_into(input: &str, out: &mut Value, options: &ParseOptions) -> Result<()> {
    match parse(input, options) {
        Ok(value) => {
            *out = value;
            Ok(())
        }
        Err(err) => {
            *out = Value::Object(Object::new());
            Err(err)
        }
    }
}

pub fn validate_str(input: &str, options: &ParseOptions) -> Result<()> {
    parse(input, options).map(|_| ())
}

pub fn from_slice(input: &[u8], options: &ParseOptions) -> Result<Value> {
    let text = std::str::from_utf8(input)
        .map_err(|err| Error::syntax(format!("invalid utf-8: {err}")))?;
    parse(text, options)
}

pub fn from_reader<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Value> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse(&buf, options)
}

/// Parse then hand the tree to serde.
pub fn from_str<T: DeserializeOwned>(input: &str, options: &ParseOptions) -> Result<T> {
    let value = parse(input, options)?;
    crate::serde::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[rstest::rstest]
    fn parse_into_resets_on_failure() {
        let mut out = Value::from(vec![1, 2, 3]);
        let err = parse_into(r#"{"a":}"#, &mut out, &ParseOptions::strict()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(out, Value::Object(Object::new()));
    }

    #[rstest::rstest]
    fn parse_into_resets_on_lexical_failure() {
        let mut out = Value::from("keep?");
        assert!(parse_into("{\"a\": @}", &mut out, &ParseOptions::strict()).is_err());
        assert_eq!(out, Value::Object(Object::new()));
    }

    #[rstest::rstest]
    fn parse_into_replaces_on_success() {
        let mut out = Value::from(true);
        parse_into("[1]", &mut out, &ParseOptions::strict()).unwrap();
        assert_eq!(out, Value::from(vec![1]));
    }

    #[rstest::rstest]
    fn from_slice_rejects_invalid_utf8() {
        let err = from_slice(&[b'"', 0xff, b'"'], &ParseOptions::strict()).unwrap_err();
        assert!(err.to_string().contains("invalid utf-8"));
    }

    #[rstest::rstest]
    fn from_reader_reads_everything() {
        let value = from_reader(&b"{\"k\": [true]}"[..], &ParseOptions::strict()).unwrap();
        assert_eq!(value["k"][0], Value::Boolean(true));
    }
}
