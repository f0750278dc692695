pub mod syntax;
pub mod types;
pub mod runtime;
pub mod symbols;
pub mod error;

pub use types::color::Color;
pub use error::{CompileError, ErrorCode, LexError, LexErrorKind, ParseError, ParseErrorKind, RuntimeError};
pub use syntax::ast::{Command, Operand, Script, Span};
pub use syntax::token::{Token, TokenKind};
pub use syntax::lexer::tokenize;
pub use runtime::canvas::{Canvas, CanvasCall, RecordingCanvas};
pub use runtime::context::DrawContext;
pub use runtime::interpreter::{ExecReport, Interpreter};
pub use symbols::SymbolTable;

// ─── Public API ───────────────────────────────────────────────────────────────

/// Lex and parse source text into an immutable command sequence.
pub fn compile(source: &str) -> Result<Script, CompileError> {
    let tokens = syntax::lexer::Lexer::new(source).tokenize()?;
    let script = syntax::parser::Parser::new(tokens).parse()?;
    Ok(script)
}

/// Replay `script` once into `canvas` with a fresh context for a
/// `width`×`height` surface.
pub fn execute<C: Canvas + ?Sized>(script: &Script, width: i32, height: i32, canvas: &mut C) -> ExecReport {
    let mut ctx = DrawContext::new(width, height);
    Interpreter::new(script).execute(&mut ctx, canvas)
}
