pub(crate) mod writer;

use std::io::Write;

use crate::types::{Array, Object, Value};
use crate::{Result, SerializeOptions};

use self::writer::Writer;

/// Render `value` as indented text. Objects put one entry per line; arrays
/// stay on a single line.
pub fn to_string(value: &Value, options: &SerializeOptions) -> String {
    let mut writer = Writer::new(options.clone());
    write_value(&mut writer, value, 0);
    writer.finish()
}

pub fn to_vec(value: &Value, options: &SerializeOptions) -> Vec<u8> {
    to_string(value, options).into_bytes()
}

pub fn to_writer<W: Write>(mut writer: W, value: &Value, options: &SerializeOptions) -> Result<()> {
    let text = to_string(value, options);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn write_value(writer: &mut Writer, value: &Value, depth: usize) {
    match value {
        Value::Null => writer.write_str("null"),
        Value::Boolean(b) => writer.write_str(if *b { "true" } else { "false" }),
        Value::Number(n) => writer.write_number(*n),
        Value::String(s) => writer.write_quoted(s),
        Value::Array(arr) => write_array(writer, arr, depth),
        Value::Object(obj) => write_object(writer, obj, depth),
    }
}

fn write_array(writer: &mut Writer, arr: &Array, depth: usize) {
    if arr.is_empty() {
        writer.write_str("[]");
        return;
    }
    writer.write_str("[ ");
    for (i, item) in arr.iter().enumerate() {
        if i > 0 {
            writer.write_str(", ");
        }
        write_value(writer, item, depth);
    }
    writer.write_str(" ]");
}

fn write_object(writer: &mut Writer, obj: &Object, depth: usize) {
    if obj.is_empty() {
        writer.write_str("{}");
        return;
    }
    writer.write_char('{');
    writer.write_newline();
    for (i, (key, value)) in obj.iter().enumerate() {
        if i > 0 {
            writer.write_char(',');
            writer.write_newline();
        }
        writer.write_indent(depth + 1);
        writer.write_quoted(key);
        writer.write_str(" :");
        match value {
            // Non-empty objects open their brace block on its own line.
            Value::Object(inner) if !inner.is_empty() => {
                writer.write_newline();
                writer.write_indent(depth + 1);
                write_object(writer, inner, depth + 1);
            }
            _ => {
                writer.write_char(' ');
                write_value(writer, value, depth + 1);
            }
        }
    }
    writer.write_newline();
    writer.write_indent(depth);
    writer.write_char('}');
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::Indent;

    fn render(value: &Value) -> String {
        to_string(value, &SerializeOptions::default())
    }

    #[rstest]
    fn scalars() {
        assert_eq!(render(&Value::Null), "null");
        assert_eq!(render(&Value::Boolean(false)), "false");
        assert_eq!(render(&Value::Number(2.5)), "2.5");
        assert_eq!(render(&Value::from("raw \\u0041")), "\"raw \\u0041\"");
    }

    #[rstest]
    fn empty_containers() {
        assert_eq!(render(&Value::Array(Array::new())), "[]");
        assert_eq!(render(&Value::Object(Object::new())), "{}");
    }

    #[rstest]
    fn arrays_render_inline() {
        let value = Value::from(vec![Value::from("Red"), Value::from(1), Value::Null]);
        assert_eq!(render(&value), "[ \"Red\", 1, null ]");
    }

    #[rstest]
    fn objects_render_one_entry_per_line() {
        let mut value = Value::new();
        value["language"] = "C++".into();
        value["pi"] = 3.14159f32.into();
        value["colours"] = vec!["Red", "Green"].into();
        value["vector3"]["x"] = 0.into();
        value["vector3"]["y"] = 1.into();
        value["empty"] = Object::new().into();

        let expected = "{\n\
            \t\"language\" : \"C++\",\n\
            \t\"pi\" : 3.14159,\n\
            \t\"colours\" : [ \"Red\", \"Green\" ],\n\
            \t\"vector3\" :\n\
            \t{\n\
            \t\t\"x\" : 0,\n\
            \t\t\"y\" : 1\n\
            \t},\n\
            \t\"empty\" : {}\n\
            }";
        assert_eq!(render(&value), expected);
    }

    #[rstest]
    fn spaces_indent() {
        let mut value = Value::new();
        value["a"]["b"] = true.into();
        let options = SerializeOptions::new().with_indent(Indent::Spaces(2));
        assert_eq!(
            to_string(&value, &options),
            "{\n  \"a\" :\n  {\n    \"b\" : true\n  }\n}"
        );
    }

    #[rstest]
    fn to_writer_writes_all_bytes() {
        let mut out = Vec::new();
        to_writer(&mut out, &Value::from(vec![true]), &SerializeOptions::default()).unwrap();
        assert_eq!(out, b"[ true ]");
        assert_eq!(to_vec(&Value::Null, &SerializeOptions::default()), b"null");
    }
}
