use std::fmt;

use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    TypeMismatch,
    IndexOutOfRange,
    Io,
    Serde,
}

/// Position of a diagnostic in the source text. `line` and `column` are
/// 1-based, `column` counts characters rather than bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("lexical error{}: {message}", at(.location))]
    Lexical {
        message: String,
        location: Option<Location>,
    },

    #[error("syntax error{}: {message}", at(.location))]
    Syntax {
        message: String,
        location: Option<Location>,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("index {index} out of range for {container} of length {len}")]
    IndexOutOfRange {
        index: usize,
        len: usize,
        container: &'static str,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde error: {0}")]
    Serde(String),
}

fn at(location: &Option<Location>) -> String {
    match location {
        Some(location) => format!(" at {location}"),
        None => String::new(),
    }
}

impl Error {
    pub fn lexical(message: impl Into<String>, location: Location) -> Self {
        Self::Lexical {
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            location: None,
        }
    }

    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    pub fn index_out_of_range(index: usize, len: usize, container: &'static str) -> Self {
        Self::IndexOutOfRange {
            index,
            len,
            container,
        }
    }

    pub fn serde(message: impl fmt::Display) -> Self {
        Self::Serde(message.to_string())
    }

    pub fn with_location(mut self, at: Location) -> Self {
        match &mut self {
            Self::Lexical { location, .. } | Self::Syntax { location, .. } => {
                *location = Some(at);
            }
            _ => {}
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Lexical { .. } => ErrorKind::Lexical,
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::Io(_) => ErrorKind::Io,
            Self::Serde(_) => ErrorKind::Serde,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Lexical { location, .. } | Self::Syntax { location, .. } => *location,
            _ => None,
        }
    }

    /// True for failures caused by misusing a value (wrong variant, bad index)
    /// rather than by malformed input.
    pub fn is_invalid_access(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TypeMismatch | ErrorKind::IndexOutOfRange
        )
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::serde(msg)
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::serde(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn lexical_error_display_includes_location() {
        let err = Error::lexical(
            "unexpected character '@'",
            Location {
                offset: 4,
                line: 2,
                column: 3,
            },
        );
        assert_eq!(
            err.to_string(),
            "lexical error at line 2, column 3: unexpected character '@'"
        );
        assert_eq!(err.kind(), ErrorKind::Lexical);
    }

    #[rstest::rstest]
    fn syntax_error_without_location() {
        let err = Error::syntax("expected ':' after object key");
        assert_eq!(err.to_string(), "syntax error: expected ':' after object key");
        assert!(err.location().is_none());
        assert!(!err.is_invalid_access());
    }

    #[rstest::rstest]
    fn with_location_only_touches_input_errors() {
        let location = Location {
            offset: 0,
            line: 1,
            column: 1,
        };
        let err = Error::syntax("x").with_location(location);
        assert_eq!(err.location(), Some(location));

        let err = Error::type_mismatch("object", "number").with_location(location);
        assert_eq!(err.location(), None);
        assert!(err.is_invalid_access());
    }

    #[rstest::rstest]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
