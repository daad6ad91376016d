use crate::constants::F32_EXACT_INT;
use crate::SerializeOptions;

pub(crate) struct Writer {
    buffer: String,
    pub(crate) options: SerializeOptions,
    indent_unit: String,
    indent_cache: Vec<String>,
}

impl Writer {
    pub fn new(options: SerializeOptions) -> Self {
        let indent_unit = options.indent.unit();
        Self {
            buffer: String::new(),
            options,
            indent_unit,
            indent_cache: vec![String::new()],
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn write_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    pub fn write_char(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    pub fn write_newline(&mut self) {
        self.buffer.push('\n');
    }

    pub fn write_indent(&mut self, depth: usize) {
        if depth == 0 || self.indent_unit.is_empty() {
            return;
        }
        if depth >= self.indent_cache.len() {
            self.extend_indent_cache(depth);
        }
        self.buffer.push_str(&self.indent_cache[depth]);
    }

    fn extend_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let next = format!(
                "{}{}",
                self.indent_cache[self.indent_cache.len() - 1],
                self.indent_unit
            );
            self.indent_cache.push(next);
        }
    }

    /// Integral values print without a fraction, everything else uses the
    /// shortest text that parses back to the same `f32`.
    pub fn write_number(&mut self, n: f32) {
        if !n.is_finite() {
            self.write_str("null");
            return;
        }
        if n.fract() == 0.0 && n.abs() < F32_EXACT_INT {
            let mut buf = itoa::Buffer::new();
            self.buffer.push_str(buf.format(n as i64));
            return;
        }
        let mut buf = ryu::Buffer::new();
        self.buffer.push_str(buf.format_finite(n));
    }

    pub fn write_quoted(&mut self, s: &str) {
        self.write_char('"');
        if self.options.escape_strings {
            escape_string_into(&mut self.buffer, s);
        } else {
            self.write_str(s);
        }
        self.write_char('"');
    }
}

pub(crate) fn escape_string_into(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if crate::constants::is_control(c) => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::Indent;

    #[rstest]
    #[case(0.0, "0")]
    #[case(5.0, "5")]
    #[case(-42.0, "-42")]
    #[case(3.14159, "3.14159")]
    #[case(0.1, "0.1")]
    #[case(1e-7, "1e-7")]
    #[case(f32::NAN, "null")]
    #[case(f32::INFINITY, "null")]
    fn numbers(#[case] n: f32, #[case] expected: &str) {
        let mut writer = Writer::new(SerializeOptions::default());
        writer.write_number(n);
        assert_eq!(writer.finish(), expected);
    }

    #[rstest]
    fn large_integral_numbers_stay_parseable() {
        let mut writer = Writer::new(SerializeOptions::default());
        writer.write_number(3.0e10);
        let text = writer.finish();
        assert_eq!(text.parse::<f32>().unwrap(), 3.0e10);
    }

    #[rstest]
    fn indentation_is_cached_per_depth() {
        let mut writer = Writer::new(SerializeOptions::new().with_indent(Indent::Spaces(2)));
        writer.write_indent(3);
        writer.write_char('x');
        writer.write_indent(1);
        assert_eq!(writer.finish(), "      x  ");
    }

    #[rstest]
    fn quoted_strings_are_raw_unless_escaping() {
        let mut writer = Writer::new(SerializeOptions::default());
        writer.write_quoted("a\"b\n");
        assert_eq!(writer.finish(), "\"a\"b\n\"");

        let mut writer = Writer::new(SerializeOptions::new().with_escape_strings(true));
        writer.write_quoted("a\"b\n\\\u{01}");
        assert_eq!(writer.finish(), r#""a\"b\n\\\u0001""#);
    }
}
