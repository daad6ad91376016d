use std::sync::atomic::{AtomicU8, Ordering};

use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_SPACES};

/// Grammar variant accepted by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Strict,
    /// Additionally accepts `//` and `/* */` comments and single-quoted strings.
    Permissive,
}

impl ParseMode {
    pub fn is_permissive(self) -> bool {
        matches!(self, ParseMode::Permissive)
    }

    const fn to_u8(self) -> u8 {
        match self {
            ParseMode::Strict => 0,
            ParseMode::Permissive => 1,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ParseMode::Permissive,
            _ => ParseMode::Strict,
        }
    }
}

static DEFAULT_MODE: AtomicU8 = AtomicU8::new(ParseMode::Strict.to_u8());

/// Change the mode used by [`crate::parse`] and [`ParseOptions::default`].
pub fn set_default_mode(mode: ParseMode) {
    DEFAULT_MODE.store(mode.to_u8(), Ordering::Relaxed);
}

pub fn default_mode() -> ParseMode {
    ParseMode::from_u8(DEFAULT_MODE.load(Ordering::Relaxed))
}

/// What the lexer does with `\uXXXX` escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnicodeEscapes {
    /// Keep the escape as the six characters `\uXXXX` in the string value.
    #[default]
    Passthrough,
    /// Decode to the code point, combining surrogate pairs.
    Decode,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub mode: ParseMode,
    pub unicode_escapes: UnicodeEscapes,
    pub max_depth: usize,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self::default().with_mode(ParseMode::Strict)
    }

    pub fn permissive() -> Self {
        Self::default().with_mode(ParseMode::Permissive)
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_unicode_escapes(mut self, unicode_escapes: UnicodeEscapes) -> Self {
        self.unicode_escapes = unicode_escapes;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            unicode_escapes: UnicodeEscapes::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    #[default]
    Tab,
    Spaces(usize),
}

impl Indent {
    pub fn spaces(count: usize) -> Self {
        Indent::Spaces(count)
    }

    pub fn unit(self) -> String {
        match self {
            Indent::Tab => "\t".to_string(),
            Indent::Spaces(count) => " ".repeat(count),
        }
    }
}

impl std::str::FromStr for Indent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tab" | "\\t" | "\t" => Ok(Indent::Tab),
            "" => Ok(Indent::Spaces(DEFAULT_SPACES)),
            other => other
                .parse::<usize>()
                .map(Indent::Spaces)
                .map_err(|_| format!("invalid indent '{other}', expected 'tab' or a number")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    pub indent: Indent,
    /// Re-apply JSON escapes to string content. Off by default: content is
    /// written between quotes exactly as stored.
    pub escape_strings: bool,
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_escape_strings(mut self, escape_strings: bool) -> Self {
        self.escape_strings = escape_strings;
        self
    }
}
