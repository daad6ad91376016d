use memchr::{memchr, memchr2};

use crate::constants::{is_control, is_whitespace};
use crate::options::{ParseMode, ParseOptions, UnicodeEscapes};
use crate::{Error, Location, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Comma,
    Colon,
    True,
    False,
    Null,
    Number,
    String,
    /// Error marker; `content` holds the diagnostic.
    Unknown,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::ObjectStart => "'{'",
            TokenKind::ObjectEnd => "'}'",
            TokenKind::ArrayStart => "'['",
            TokenKind::ArrayEnd => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Unknown => "invalid token",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text for numbers, unescaped text for strings, empty otherwise.
    pub content: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
}

impl Quote {
    fn as_char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Default,
    String(Quote),
    Escape(Quote),
    /// `digits` hex digits of a `\u` escape consumed so far (0..=3).
    Unicode { quote: Quote, digits: u8 },
    Integer,
    Fraction,
    ExponentStart,
    ExponentSign,
    ExponentDigits,
    Bareword,
    CommentStart,
    LineComment,
    BlockComment,
    BlockCommentStar,
}

enum Step {
    Consume,
    /// Leave the character in place so it is dispatched again from `Default`.
    Reprocess,
}

/// Split `input` into tokens. Any lexical error fails the whole pass; the
/// partial token list is never returned.
pub fn tokenize(input: &str, options: &ParseOptions) -> Result<Vec<Token>> {
    Lexer::new(input, options).run()
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    mode: ParseMode,
    unicode_escapes: UnicodeEscapes,
    state: State,
    content: String,
    token_start: Location,
    code_unit: u32,
    pending_high: Option<u32>,
    tokens: Vec<Token>,
    errors: Vec<Error>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, options: &ParseOptions) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            mode: options.mode,
            unicode_escapes: options.unicode_escapes,
            state: State::Default,
            content: String::new(),
            token_start: Location {
                offset: 0,
                line: 1,
                column: 1,
            },
            code_unit: 0,
            pending_high: None,
            tokens: Vec::with_capacity(input.len() / 4),
            errors: Vec::new(),
        }
    }

    fn location(&self) -> Location {
        Location {
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while self.pos < self.input.len() {
            match self.state {
                State::LineComment => {
                    self.skip_line_comment();
                    continue;
                }
                State::BlockComment => {
                    self.skip_block_comment();
                    continue;
                }
                _ => {}
            }

            let Some(ch) = self.input[self.pos..].chars().next() else {
                break;
            };
            match self.step(ch)? {
                Step::Consume => self.advance(ch),
                Step::Reprocess => {}
            }
        }
        self.finish()
    }

    fn advance(&mut self, ch: char) {
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn advance_to(&mut self, target: usize) {
        while self.pos < target {
            match self.input[self.pos..].chars().next() {
                Some(ch) => self.advance(ch),
                None => break,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        let rest = &self.input.as_bytes()[self.pos..];
        match memchr2(b'\n', b'\r', rest) {
            Some(idx) => {
                self.advance_to(self.pos + idx + 1);
                self.state = State::Default;
            }
            None => self.advance_to(self.input.len()),
        }
    }

    fn skip_block_comment(&mut self) {
        let rest = &self.input.as_bytes()[self.pos..];
        match memchr(b'*', rest) {
            Some(idx) => {
                self.advance_to(self.pos + idx + 1);
                self.state = State::BlockCommentStar;
            }
            None => self.advance_to(self.input.len()),
        }
    }

    fn emit(&mut self, kind: TokenKind) {
        self.tokens.push(Token {
            kind,
            content: String::new(),
            location: self.location(),
        });
    }

    fn emit_content(&mut self, kind: TokenKind) {
        let content = std::mem::take(&mut self.content);
        self.tokens.push(Token {
            kind,
            content,
            location: self.token_start,
        });
    }

    fn start_token(&mut self) {
        self.content.clear();
        self.token_start = self.location();
    }

    /// Records a recoverable diagnostic. Lexing goes on so later problems are
    /// reported too, but the pass will fail.
    fn flag(&mut self, message: impl Into<String>, location: Location) {
        let message = message.into();
        tracing::debug!(
            line = location.line,
            column = location.column,
            "lexical error: {message}"
        );
        self.tokens.push(Token {
            kind: TokenKind::Unknown,
            content: message.clone(),
            location,
        });
        self.errors.push(Error::lexical(message, location));
    }

    fn fatal(&self, message: impl Into<String>) -> Error {
        let location = self.location();
        let message = message.into();
        tracing::debug!(
            line = location.line,
            column = location.column,
            "lexical error: {message}"
        );
        Error::lexical(message, location)
    }

    fn step(&mut self, ch: char) -> Result<Step> {
        match self.state {
            State::Default => self.step_default(ch),
            State::String(quote) => self.step_string(quote, ch),
            State::Escape(quote) => Ok(self.step_escape(quote, ch)),
            State::Unicode { quote, digits } => Ok(self.step_unicode(quote, digits, ch)),
            State::Integer => Ok(self.step_number(ch, true)),
            State::Fraction => Ok(self.step_number(ch, false)),
            State::ExponentStart => Ok(self.step_exponent_start(ch)),
            State::ExponentSign => Ok(self.step_exponent_sign(ch)),
            State::ExponentDigits => {
                if ch.is_ascii_digit() {
                    self.content.push(ch);
                    Ok(Step::Consume)
                } else {
                    self.emit_content(TokenKind::Number);
                    self.state = State::Default;
                    Ok(Step::Reprocess)
                }
            }
            State::Bareword => Ok(self.step_bareword(ch)),
            State::CommentStart => match ch {
                '/' => {
                    self.state = State::LineComment;
                    Ok(Step::Consume)
                }
                '*' => {
                    self.state = State::BlockComment;
                    Ok(Step::Consume)
                }
                _ => Err(self.fatal(format!("expected '/' or '*' after '/', found {ch:?}"))),
            },
            State::LineComment => {
                if ch == '\n' || ch == '\r' {
                    self.state = State::Default;
                }
                Ok(Step::Consume)
            }
            State::BlockComment => {
                if ch == '*' {
                    self.state = State::BlockCommentStar;
                }
                Ok(Step::Consume)
            }
            State::BlockCommentStar => {
                self.state = match ch {
                    '/' => State::Default,
                    '*' => State::BlockCommentStar,
                    _ => State::BlockComment,
                };
                Ok(Step::Consume)
            }
        }
    }

    fn step_default(&mut self, ch: char) -> Result<Step> {
        let permissive = self.mode.is_permissive();
        match ch {
            '{' => self.emit(TokenKind::ObjectStart),
            '}' => self.emit(TokenKind::ObjectEnd),
            '[' => self.emit(TokenKind::ArrayStart),
            ']' => self.emit(TokenKind::ArrayEnd),
            ',' => self.emit(TokenKind::Comma),
            ':' => self.emit(TokenKind::Colon),
            '"' => {
                self.start_token();
                self.state = State::String(Quote::Double);
            }
            '\'' if permissive => {
                self.start_token();
                self.state = State::String(Quote::Single);
            }
            '-' | '0'..='9' => {
                self.start_token();
                self.content.push(ch);
                self.state = State::Integer;
            }
            c if c.is_ascii_alphabetic() => {
                self.start_token();
                self.content.push(ch);
                self.state = State::Bareword;
            }
            '/' if permissive => self.state = State::CommentStart,
            c if is_whitespace(c) => {}
            _ => return Err(self.fatal(format!("unexpected character {ch:?}"))),
        }
        Ok(Step::Consume)
    }

    fn step_string(&mut self, quote: Quote, ch: char) -> Result<Step> {
        if ch == quote.as_char() {
            self.check_unpaired_surrogate();
            self.emit_content(TokenKind::String);
            self.state = State::Default;
        } else if ch == '\\' {
            self.state = State::Escape(quote);
        } else if is_control(ch) {
            return Err(self.fatal("control character in string value"));
        } else {
            self.check_unpaired_surrogate();
            self.content.push(ch);
        }
        Ok(Step::Consume)
    }

    fn step_escape(&mut self, quote: Quote, ch: char) -> Step {
        if ch == 'u' {
            self.code_unit = 0;
            self.state = State::Unicode { quote, digits: 0 };
            return Step::Consume;
        }

        self.check_unpaired_surrogate();
        let unescaped = match ch {
            '"' => Some('"'),
            '\\' => Some('\\'),
            '/' => Some('/'),
            '\'' if quote == Quote::Single => Some('\''),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0c}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            _ => None,
        };
        match unescaped {
            Some(c) => self.content.push(c),
            None => self.flag(format!("invalid escape sequence '\\{ch}'"), self.location()),
        }
        self.state = State::String(quote);
        Step::Consume
    }

    fn step_unicode(&mut self, quote: Quote, digits: u8, ch: char) -> Step {
        let Some(digit) = ch.to_digit(16) else {
            self.flag(
                format!("invalid hex digit {ch:?} in unicode escape"),
                self.location(),
            );
            self.state = State::String(quote);
            return Step::Consume;
        };

        self.code_unit = self.code_unit * 16 + digit;
        if digits < 3 {
            self.state = State::Unicode {
                quote,
                digits: digits + 1,
            };
            return Step::Consume;
        }

        self.finish_unicode_escape();
        self.state = State::String(quote);
        Step::Consume
    }

    /// Called on the fourth hex digit, while `pos` still points at it.
    fn finish_unicode_escape(&mut self) {
        match self.unicode_escapes {
            UnicodeEscapes::Passthrough => {
                // The four digits are ASCII, so these byte offsets are char
                // boundaries.
                let digits = &self.input[self.pos - 3..self.pos + 1];
                self.content.push_str("\\u");
                self.content.push_str(digits);
            }
            UnicodeEscapes::Decode => {
                let unit = self.code_unit;
                match unit {
                    0xD800..=0xDBFF => {
                        self.check_unpaired_surrogate();
                        self.pending_high = Some(unit);
                    }
                    0xDC00..=0xDFFF => match self.pending_high.take() {
                        Some(high) => {
                            let code = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                            match char::from_u32(code) {
                                Some(c) => self.content.push(c),
                                None => self.flag("invalid surrogate pair", self.location()),
                            }
                        }
                        None => self.flag("unpaired low surrogate", self.location()),
                    },
                    _ => {
                        self.check_unpaired_surrogate();
                        match char::from_u32(unit) {
                            Some(c) => self.content.push(c),
                            None => self.flag("invalid unicode escape", self.location()),
                        }
                    }
                }
            }
        }
    }

    fn check_unpaired_surrogate(&mut self) {
        if self.pending_high.take().is_some() {
            self.flag("unpaired high surrogate", self.location());
        }
    }

    fn step_number(&mut self, ch: char, integer: bool) -> Step {
        match ch {
            '0'..='9' => self.content.push(ch),
            '.' if integer => {
                self.content.push(ch);
                self.state = State::Fraction;
            }
            'e' | 'E' => {
                self.content.push(ch);
                self.state = State::ExponentStart;
            }
            _ => {
                self.emit_content(TokenKind::Number);
                self.state = State::Default;
                return Step::Reprocess;
            }
        }
        Step::Consume
    }

    fn step_exponent_start(&mut self, ch: char) -> Step {
        match ch {
            '0'..='9' => self.state = State::ExponentDigits,
            '+' | '-' => self.state = State::ExponentSign,
            _ => {
                self.flag(
                    format!("expected exponent digits, found {ch:?}"),
                    self.location(),
                );
                self.content.clear();
                self.state = State::Default;
                return Step::Reprocess;
            }
        }
        self.content.push(ch);
        Step::Consume
    }

    fn step_exponent_sign(&mut self, ch: char) -> Step {
        if ch.is_ascii_digit() {
            self.content.push(ch);
            self.state = State::ExponentDigits;
            return Step::Consume;
        }
        self.flag(
            format!("expected exponent digits, found {ch:?}"),
            self.location(),
        );
        self.content.clear();
        self.state = State::Default;
        Step::Reprocess
    }

    fn step_bareword(&mut self, ch: char) -> Step {
        if ch.is_ascii_alphabetic() {
            self.content.push(ch);
            return Step::Consume;
        }
        self.end_bareword();
        Step::Reprocess
    }

    fn end_bareword(&mut self) {
        let kind = match self.content.as_str() {
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "null" => Some(TokenKind::Null),
            _ => None,
        };
        match kind {
            Some(kind) => {
                self.content.clear();
                self.tokens.push(Token {
                    kind,
                    content: String::new(),
                    location: self.token_start,
                });
            }
            None => {
                let word = std::mem::take(&mut self.content);
                self.flag(format!("unknown literal '{word}'"), self.token_start);
            }
        }
        self.state = State::Default;
    }

    fn finish(mut self) -> Result<Vec<Token>> {
        // End of input terminates a number or literal like any delimiter.
        match self.state {
            State::Integer | State::Fraction | State::ExponentDigits => {
                self.emit_content(TokenKind::Number);
                self.state = State::Default;
            }
            State::Bareword => self.end_bareword(),
            _ => {}
        }

        let unterminated = match self.state {
            State::Default | State::LineComment => None,
            State::String(_) | State::Escape(_) | State::Unicode { .. } => {
                Some("unterminated string")
            }
            State::ExponentStart | State::ExponentSign => Some("input ends inside a number"),
            State::Integer | State::Fraction | State::ExponentDigits | State::Bareword => None,
            State::CommentStart => Some("input ends after '/'"),
            State::BlockComment | State::BlockCommentStar => Some("unterminated block comment"),
        };
        if let Some(message) = unterminated {
            let location = self.location();
            self.flag(message, location);
        }

        if !self.errors.is_empty() {
            let count = self.errors.len();
            let first = self.errors.swap_remove(0);
            tracing::debug!(errors = count, "lexical analysis failed");
            return Err(first);
        }

        tracing::trace!(tokens = self.tokens.len(), "lexical analysis complete");
        Ok(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::ErrorKind;

    fn kinds(input: &str, options: &ParseOptions) -> Vec<TokenKind> {
        tokenize(input, options)
            .unwrap_or_else(|err| panic!("tokenize {input:?} failed: {err}"))
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn contents(input: &str, options: &ParseOptions) -> Vec<String> {
        tokenize(input, options)
            .unwrap_or_else(|err| panic!("tokenize {input:?} failed: {err}"))
            .into_iter()
            .map(|token| token.content)
            .collect()
    }

    fn lex_error(input: &str, options: &ParseOptions) -> Error {
        match tokenize(input, options) {
            Ok(tokens) => panic!("expected {input:?} to fail, got {tokens:?}"),
            Err(err) => err,
        }
    }

    #[rstest]
    fn structural_characters() {
        use TokenKind::*;
        assert_eq!(
            kinds("{ } [ ] , :", &ParseOptions::strict()),
            vec![ObjectStart, ObjectEnd, ArrayStart, ArrayEnd, Comma, Colon]
        );
    }

    #[rstest]
    fn literals_and_pushback() {
        use TokenKind::*;
        assert_eq!(
            kinds("[true,false,null]", &ParseOptions::strict()),
            vec![ArrayStart, True, Comma, False, Comma, Null, ArrayEnd]
        );
    }

    #[rstest]
    #[case("0 ", "0")]
    #[case("-12,", "-12")]
    #[case("3.25]", "3.25")]
    #[case("1e5 ", "1e5")]
    #[case("6.02E+23}", "6.02E+23")]
    #[case("-2.5e-3\n", "-2.5e-3")]
    fn number_raw_text(#[case] input: &str, #[case] raw: &str) {
        let tokens = tokenize(input, &ParseOptions::strict()).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].content, raw);
    }

    #[rstest]
    #[case("0", TokenKind::Number, "0")]
    #[case("-2.5e3", TokenKind::Number, "-2.5e3")]
    #[case("7.5", TokenKind::Number, "7.5")]
    #[case("false", TokenKind::False, "")]
    #[case("null", TokenKind::Null, "")]
    fn token_may_end_input(#[case] input: &str, #[case] kind: TokenKind, #[case] raw: &str) {
        let tokens = tokenize(input, &ParseOptions::strict()).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, kind);
        assert_eq!(tokens[0].content, raw);
    }

    #[rstest]
    fn string_escapes_are_unescaped() {
        let got = contents(r#""a\"b\\c\/d\b\f\n\r\t""#, &ParseOptions::strict());
        assert_eq!(got, vec!["a\"b\\c/d\u{08}\u{0c}\n\r\t".to_string()]);
    }

    #[rstest]
    fn unicode_escape_passes_through_by_default() {
        let got = contents(r#""x\u00e9y""#, &ParseOptions::strict());
        assert_eq!(got, vec![r"x\u00e9y".to_string()]);
    }

    #[rstest]
    fn unicode_escape_decodes_when_asked() {
        let options = ParseOptions::strict().with_unicode_escapes(UnicodeEscapes::Decode);
        let got = contents(r#""\u00e9 \ud83d\ude00""#, &options);
        assert_eq!(got, vec!["é 😀".to_string()]);
    }

    #[rstest]
    #[case(r#""\ud83d""#)]
    #[case(r#""\ude00""#)]
    #[case(r#""\ud83dx""#)]
    fn unpaired_surrogates_fail_when_decoding(#[case] input: &str) {
        let options = ParseOptions::strict().with_unicode_escapes(UnicodeEscapes::Decode);
        assert_eq!(lex_error(input, &options).kind(), ErrorKind::Lexical);
    }

    #[rstest]
    #[case(r#""\u12g4""#)]
    #[case(r#""\q""#)]
    fn malformed_escapes_fail(#[case] input: &str) {
        assert_eq!(
            lex_error(input, &ParseOptions::strict()).kind(),
            ErrorKind::Lexical
        );
    }

    #[rstest]
    fn control_character_in_string_is_fatal() {
        let err = lex_error("{\"a\nb\": 1}", &ParseOptions::strict());
        assert_eq!(err.location().map(|l| l.column), Some(4));
    }

    #[rstest]
    fn unknown_bareword_fails() {
        let err = lex_error("[nul]", &ParseOptions::strict());
        assert!(err.to_string().contains("unknown literal 'nul'"));
    }

    #[rstest]
    #[case("\"open")]
    #[case("[tru")]
    #[case("1e")]
    #[case("-1e-")]
    #[case("1e+,")]
    fn unterminated_tokens_fail(#[case] input: &str) {
        assert_eq!(
            lex_error(input, &ParseOptions::strict()).kind(),
            ErrorKind::Lexical
        );
    }

    #[rstest]
    fn comments_only_in_permissive_mode() {
        let input = "{ // note\n \"a\" /* inline ** */ : 1 }";
        assert!(tokenize(input, &ParseOptions::strict()).is_err());

        use TokenKind::*;
        assert_eq!(
            kinds(input, &ParseOptions::permissive()),
            vec![ObjectStart, String, Colon, Number, ObjectEnd]
        );
    }

    #[rstest]
    fn line_comment_may_end_input() {
        let tokens = tokenize("[] // trailing", &ParseOptions::permissive()).unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[rstest]
    #[case("[] /* open")]
    #[case("[] /")]
    #[case("[] /x")]
    fn broken_comments_fail(#[case] input: &str) {
        assert!(tokenize(input, &ParseOptions::permissive()).is_err());
    }

    #[rstest]
    fn single_quoted_strings_in_permissive_mode() {
        assert!(tokenize("['a']", &ParseOptions::strict()).is_err());
        let got = contents(r#"['it\'s "fine"']"#, &ParseOptions::permissive());
        assert_eq!(got[1], "it's \"fine\"");
    }

    #[rstest]
    fn unexpected_character_location() {
        let err = lex_error("{\n  @", &ParseOptions::strict());
        let location = err.location().unwrap();
        assert_eq!((location.line, location.column, location.offset), (2, 3, 4));
    }

    #[rstest]
    fn non_ascii_string_content() {
        let got = contents("\"héllo wörld\"", &ParseOptions::strict());
        assert_eq!(got, vec!["héllo wörld".to_string()]);
    }
}
