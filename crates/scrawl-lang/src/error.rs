use thiserror::Error;

use crate::syntax::ast::Span;

/// Error codes prefixed by phase: L = lexer, P = parser, R = runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // number literal out of range

    // Parser
    P001, // unexpected token
    P002, // unknown function
    P003, // wrong argument count
    P004, // invalid argument

    // Runtime
    R001, // invalid geometry
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::P003 => "P003",
            Self::P004 => "P004",
            Self::R001 => "R001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Lexer ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedCharacter(char),
    NumberOutOfRange(String),
}

impl LexErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnexpectedCharacter(_) => ErrorCode::L001,
            Self::NumberOutOfRange(_)    => ErrorCode::L002,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::UnexpectedCharacter(c) => format!("unexpected character `{c}`"),
            Self::NumberOutOfRange(text) => format!("number `{text}` is out of range"),
        }
    }
}

/// Unrecognised input. Fatal for the whole script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{}] {span} — {}", .kind.code(), .kind.describe())]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }
}

// ─── Parser ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Statement head is not one of the built-in functions.
    UnknownFunction(String),
    ArityMismatch { function: String, expected: usize, found: usize },
    /// `index` is zero-based.
    InvalidArgument { function: String, index: usize, found: String },
    UnexpectedToken { expected: &'static str, found: String },
}

impl ParseErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnexpectedToken { .. } => ErrorCode::P001,
            Self::UnknownFunction(_)     => ErrorCode::P002,
            Self::ArityMismatch { .. }   => ErrorCode::P003,
            Self::InvalidArgument { .. } => ErrorCode::P004,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::UnknownFunction(name) => format!("unknown function `{name}`"),
            Self::ArityMismatch { function, expected, found } =>
                format!("`{function}` expects {expected} args, got {found}"),
            Self::InvalidArgument { function, index, found } =>
                format!("invalid argument {} to `{function}`: `{found}`", index + 1),
            Self::UnexpectedToken { expected, found } =>
                format!("expected {expected}, found {found}"),
        }
    }
}

/// Script rejected before any drawing happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{}] {span} — {}", .kind.code(), .kind.describe())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }
}

/// Anything that stops a source text from becoming a `Script`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CompileError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Lex(e)   => e.code(),
            Self::Parse(e) => e.code(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Self::Lex(e)   => &e.span,
            Self::Parse(e) => &e.span,
        }
    }
}

// ─── Runtime ──────────────────────────────────────────────────────────────────

/// Per-command failure. The offending command is skipped; the pass goes on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("[R001] {span} — invalid geometry for `{shape}`: {detail}")]
    InvalidGeometry { shape: &'static str, detail: String, span: Span },
}

impl RuntimeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidGeometry { .. } => ErrorCode::R001,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Self::InvalidGeometry { span, .. } => span,
        }
    }
}
