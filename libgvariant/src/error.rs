//! Error types and parse configuration for GVariant text parsing.

use thiserror::Error;

/// Result type for GVariant parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Resource bounds applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum input length in bytes.
    pub max_input_size: usize,
    /// Maximum number of containers open at once.
    pub max_nesting_depth: usize,
}

impl Limits {
    /// Tight limits for untrusted input.
    pub const fn strict() -> Self {
        Self {
            max_input_size: 1024 * 1024, // 1 MiB
            max_nesting_depth: 64,
        }
    }

    /// Generous limits for interactive and tooling use.
    pub const fn lenient() -> Self {
        Self {
            max_input_size: 16 * 1024 * 1024, // 16 MiB
            max_nesting_depth: 256,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::lenient()
    }
}

/// Read-only state shared by every sub-parser of one parse call.
#[derive(Clone, Debug)]
pub struct ParseContext {
    pub limits: Limits,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }
}

/// A 1-based line and column; columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Error type for GVariant text parsing.
///
/// Offsets are byte offsets into the parsed input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// No value shape matched.
    #[error("No value matched at offset {0}")]
    NoAlternativeMatched(usize),

    /// Unknown or malformed escape sequence.
    #[error("Invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    /// Input ended inside a string.
    #[error("Unterminated string at offset {0}")]
    UnterminatedString(usize),

    /// The closing delimiter was expected but not found.
    #[error("Unterminated container, expected \"{0}\" at offset {1}")]
    UnterminatedContainer(char, usize),

    /// Missing `:` in a mapping or `,` in a dictionary entry.
    #[error("Expected \"{0}\" at offset {1}")]
    ExpectedSeparator(char, usize),

    /// A numeric literal matched the grammar but did not convert.
    #[error("Invalid number \"{0}\" at offset {1}")]
    InvalidNumber(String, usize),

    /// Characters remain after a complete value.
    #[error("Unexpected trailing input at offset {0}")]
    TrailingInput(usize),

    /// Containers nested deeper than the configured limit.
    #[error("Nesting too deep at offset {0}")]
    NestingTooDeep(usize),

    /// Input longer than the configured limit.
    #[error("Input too large ({0} bytes)")]
    InputTooLarge(usize),
}

impl ParseError {
    /// Byte offset at which the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::NoAlternativeMatched(offset)
            | ParseError::InvalidEscape(offset)
            | ParseError::UnterminatedString(offset)
            | ParseError::UnterminatedContainer(_, offset)
            | ParseError::ExpectedSeparator(_, offset)
            | ParseError::InvalidNumber(_, offset)
            | ParseError::TrailingInput(offset)
            | ParseError::NestingTooDeep(offset) => *offset,
            ParseError::InputTooLarge(_) => 0,
        }
    }

    /// Fatal errors end the parse instead of letting the next alternative run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ParseError::NestingTooDeep(_) | ParseError::InputTooLarge(_)
        )
    }

    /// Of two failures, keep the one that got further into the input.
    /// On a tie a specific error beats `NoAlternativeMatched`; otherwise
    /// `self`, which came from the earlier alternative, is kept.
    pub(crate) fn furthest(self, other: ParseError) -> ParseError {
        let more_specific = other.offset() == self.offset()
            && matches!(self, ParseError::NoAlternativeMatched(_));
        if other.offset() > self.offset() || more_specific {
            other
        } else {
            self
        }
    }

    /// Translate the error offset into a line and column of `input`.
    pub fn location(&self, input: &str) -> Location {
        let offset = self.offset().min(input.len());
        let mut line = 1;
        let mut column = 1;
        for (i, ch) in input.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Location { line, column }
    }

    /// Render the error with a line and column suffix, for tools.
    pub fn describe(&self, input: &str, filename: Option<&str>) -> String {
        let loc = self.location(input);
        match filename {
            Some(name) => format!("{} ({}:{} of <{}>)", self, loc.line, loc.column, name),
            None => format!("{} ({}:{})", self, loc.line, loc.column),
        }
    }
}
