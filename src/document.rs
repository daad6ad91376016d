use std::fs;
use std::path::Path;

use crate::types::{Object, Value};
use crate::{decode, encode, ParseOptions, Result, SerializeOptions};

/// Read the whole file at `path` and parse it with the default options.
pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
    load_file_with_options(path, &ParseOptions::default())
}

pub fn load_file_with_options(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Value> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).inspect_err(|err| {
        tracing::warn!(path = %path.display(), "cannot open file: {err}");
    })?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "loaded file");
    decode::parse(&content, options)
}

/// Serialize `value` and write it to `path`, creating or truncating the file.
pub fn save(value: &Value, path: impl AsRef<Path>) -> Result<()> {
    save_with_options(value, path, &SerializeOptions::default())
}

pub fn save_with_options(
    value: &Value,
    path: impl AsRef<Path>,
    options: &SerializeOptions,
) -> Result<()> {
    let path = path.as_ref();
    let text = encode::to_string(value, options);
    fs::write(path, text.as_bytes()).inspect_err(|err| {
        tracing::warn!(path = %path.display(), "cannot open file: {err}");
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "saved file");
    Ok(())
}

/// Inline-document convenience: parses `text` in strict mode and turns any
/// failure into an empty object.
pub fn literal(text: &str) -> Value {
    match decode::parse(text, &ParseOptions::strict()) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("discarding invalid literal: {err}");
            Value::Object(Object::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[rstest::rstest]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        let mut value = Value::new();
        value["name"] = "openjson".into();
        value["nested"]["list"] = vec![1, 2].into();

        save(&value, &path).unwrap();
        let loaded = load_file_with_options(&path, &ParseOptions::strict()).unwrap();
        assert_eq!(loaded, value);
    }

    #[rstest::rstest]
    fn save_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "x".repeat(1024)).unwrap();

        save(&Value::from(vec![true]), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[ true ]");
    }

    #[rstest::rstest]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[rstest::rstest]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = save(&Value::Null, dir.path().join("no/such/dir/x.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[rstest::rstest]
    fn literal_swallows_failures() {
        assert_eq!(literal(r#"{"a": 1}"#)["a"], Value::Number(1.0));
        assert_eq!(literal(r#"{"a": }"#), Value::Object(Object::new()));
        // Comments are a permissive-mode feature.
        assert_eq!(literal("{ /* c */ \"a\": 1 }"), Value::Object(Object::new()));
    }
}
