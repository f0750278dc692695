use crate::error::{ParseError, ParseErrorKind};
use crate::symbols::{Builtin, SymbolKind, SymbolTable};
use crate::syntax::ast::{Command, Operand, Script, Span};
use crate::syntax::token::{Token, TokenKind};

/// Single-pass, one-token-lookahead parser. Stops at the first error.
///
/// ```text
/// program   := statement* EOF
/// statement := IDENT '(' args ')' ';'
/// args      := (arg (',' arg)*)?
/// arg       := NUMBER | IDENT
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    symbols: SymbolTable,
    eof: Token,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = tokens.last().map(|t| t.span).unwrap_or_default();
        Self {
            tokens,
            pos: 0,
            symbols: SymbolTable::standard(),
            eof: Token::new(TokenKind::Eof, "", end),
        }
    }

    pub fn parse(mut self) -> Result<Script, ParseError> {
        let mut commands = Vec::new();
        while !self.is_at_end() {
            commands.push(self.parse_statement()?);
        }
        Ok(Script::new(commands))
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_statement(&mut self) -> Result<Command, ParseError> {
        let head = self.peek().clone();
        let TokenKind::Ident(name) = &head.kind else {
            return Err(unexpected("a function name", &head));
        };
        let Some(builtin) = self.symbols.function(name) else {
            return Err(ParseError::new(ParseErrorKind::UnknownFunction(name.clone()), head.span));
        };
        self.advance();

        self.expect(TokenKind::LParen, "`(`")?;
        let args = self.parse_args()?;
        self.expect(TokenKind::RParen, "`)` or `,`")?;

        if args.len() != builtin.arity() {
            return Err(ParseError::new(
                ParseErrorKind::ArityMismatch {
                    function: builtin.name().into(),
                    expected: builtin.arity(),
                    found: args.len(),
                },
                head.span,
            ));
        }

        let command = self.build_command(builtin, &args, head.span)?;
        self.expect(TokenKind::Semicolon, "`;`")?;
        Ok(command)
    }

    fn parse_args(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            let tok = self.peek().clone();
            match tok.kind {
                TokenKind::Number(_) | TokenKind::Ident(_) => {
                    self.advance();
                    args.push(tok);
                }
                _ => return Err(unexpected("a number or identifier", &tok)),
            }
            if !self.matches(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    // ─── Argument validation ─────────────────────────────────────────────────

    fn build_command(&self, builtin: Builtin, args: &[Token], span: Span) -> Result<Command, ParseError> {
        let command = match builtin {
            Builtin::SetColor => Command::SetColor { color: self.color_arg(builtin, args, 0)?, span },
            Builtin::DrawRect => Command::DrawRect {
                x: self.operand_arg(builtin, args, 0)?,
                y: self.operand_arg(builtin, args, 1)?,
                w: self.operand_arg(builtin, args, 2)?,
                h: self.operand_arg(builtin, args, 3)?,
                span,
            },
            Builtin::DrawCircle => Command::DrawCircle {
                cx: self.operand_arg(builtin, args, 0)?,
                cy: self.operand_arg(builtin, args, 1)?,
                r:  self.operand_arg(builtin, args, 2)?,
                span,
            },
        };
        Ok(command)
    }

    fn color_arg(&self, builtin: Builtin, args: &[Token], index: usize) -> Result<crate::Color, ParseError> {
        let tok = &args[index];
        if let TokenKind::Ident(name) = &tok.kind {
            if let Some(SymbolKind::Color(c)) = self.symbols.lookup(name).map(|s| s.kind) {
                return Ok(c);
            }
        }
        Err(invalid_argument(builtin, index, tok))
    }

    fn operand_arg(&self, builtin: Builtin, args: &[Token], index: usize) -> Result<Operand, ParseError> {
        let tok = &args[index];
        match &tok.kind {
            TokenKind::Number(n) => Ok(Operand::Literal(*n)),
            TokenKind::Ident(name) => match self.symbols.lookup(name).map(|s| s.kind) {
                Some(SymbolKind::Dimension(op)) => Ok(op),
                _ => Err(invalid_argument(builtin, index, tok)),
            },
            _ => Err(invalid_argument(builtin, index, tok)),
        }
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if self.matches(&kind) {
            Ok(())
        } else {
            Err(unexpected(expected, self.peek()))
        }
    }
}

fn unexpected(expected: &'static str, found: &Token) -> ParseError {
    ParseError::new(
        ParseErrorKind::UnexpectedToken { expected, found: found.kind.describe() },
        found.span,
    )
}

fn invalid_argument(builtin: Builtin, index: usize, tok: &Token) -> ParseError {
    ParseError::new(
        ParseErrorKind::InvalidArgument {
            function: builtin.name().into(),
            index,
            found: tok.text.clone(),
        },
        tok.span,
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────
