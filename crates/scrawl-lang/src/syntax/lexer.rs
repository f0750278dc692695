use crate::error::{LexError, LexErrorKind};
use crate::syntax::ast::Span;
use crate::syntax::token::{Token, TokenKind};

/// Start a lazy token stream over `source`. Each call starts from scratch.
pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}

/// Lazy lexer. Yields tokens in source order, ends with `Eof` or with the
/// first error, then returns `None` forever.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0, line: 1, column: 1, done: false }
    }

    /// Drain the whole stream, stopping at the first error.
    pub fn tokenize(self) -> Result<Vec<Token>, LexError> {
        self.collect()
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let span = Span::new(self.line, self.column);
        let start = self.pos;

        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, "", span));
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,

            '-' if self.peek().is_ascii_digit() => self.read_number(start, span)?,
            '0'..='9' => self.read_number(start, span)?,
            'a'..='z' | 'A'..='Z' | '_' => {
                self.read_ident();
                TokenKind::Ident(self.source[start..self.pos].to_string())
            }

            other => {
                return Err(LexError::new(LexErrorKind::UnexpectedCharacter(other), span));
            }
        };

        Ok(Token::new(kind, &self.source[start..self.pos], span))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> Option<char> {
        let ch = self.source[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' { self.line += 1; self.column = 1; }
        else { self.column += 1; }
        Some(ch)
    }

    fn peek(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source[self.pos..].chars().nth(1).unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) {
        while !self.is_at_end() {
            match (self.peek(), self.peek_next()) {
                (' ' | '\t' | '\r' | '\n', _) => { self.advance(); }
                ('/', '/') => self.skip_line(),
                ('/', '*') => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    fn skip_line(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' { self.advance(); }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // /
        self.advance(); // *
        while !self.is_at_end() {
            if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_number(&mut self, start: usize, span: Span) -> Result<TokenKind, LexError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        text.parse::<i32>()
            .map(TokenKind::Number)
            .map_err(|_| LexError::new(LexErrorKind::NumberOutOfRange(text.to_string()), span))
    }

    fn read_ident(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.next_token();
        if matches!(&result, Err(_) | Ok(Token { kind: TokenKind::Eof, .. })) {
            self.done = true;
        }
        Some(result)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
