use crate::syntax::ast::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(i32),
    Ident(String),

    // Punctuation
    LParen,     // (
    RParen,     // )
    Comma,      // ,
    Semicolon,  // ;

    Eof,
}

impl TokenKind {
    /// Short human description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Number(n)   => format!("number `{n}`"),
            Self::Ident(s)    => format!("identifier `{s}`"),
            Self::LParen      => "`(`".into(),
            Self::RParen      => "`)`".into(),
            Self::Comma       => "`,`".into(),
            Self::Semicolon   => "`;`".into(),
            Self::Eof         => "end of input".into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source slice the token was read from (empty for `Eof`).
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self { kind, text: text.into(), span }
    }
}
