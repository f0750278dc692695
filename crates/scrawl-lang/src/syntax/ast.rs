use crate::types::color::Color;

/// Source location attached to every token, command and error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ─── Operands ────────────────────────────────────────────────────────────────

/// A numeric argument. The screen placeholders are validated by the parser
/// but only resolved when a draw pass knows the surface size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Literal(i32),
    ScreenWidth,
    ScreenHeight,
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(n)   => write!(f, "{n}"),
            Self::ScreenWidth  => f.write_str("SCREEN_WIDTH"),
            Self::ScreenHeight => f.write_str("SCREEN_HEIGHT"),
        }
    }
}

// ─── Commands ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `setColor(RED);`
    SetColor { color: Color, span: Span },
    /// `drawRect(x, y, w, h);`
    DrawRect { x: Operand, y: Operand, w: Operand, h: Operand, span: Span },
    /// `drawCircle(cx, cy, r);`
    DrawCircle { cx: Operand, cy: Operand, r: Operand, span: Span },
}

impl Command {
    pub fn span(&self) -> &Span {
        match self {
            Command::SetColor { span, .. }   => span,
            Command::DrawRect { span, .. }   => span,
            Command::DrawCircle { span, .. } => span,
        }
    }

    /// The script-level function this command was parsed from.
    pub fn function_name(&self) -> &'static str {
        match self {
            Command::SetColor { .. }   => "setColor",
            Command::DrawRect { .. }   => "drawRect",
            Command::DrawCircle { .. } => "drawCircle",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SetColor { color, .. } => write!(f, "setColor({color});"),
            Command::DrawRect { x, y, w, h, .. } => write!(f, "drawRect({x}, {y}, {w}, {h});"),
            Command::DrawCircle { cx, cy, r, .. } => write!(f, "drawCircle({cx}, {cy}, {r});"),
        }
    }
}

// ─── Script ──────────────────────────────────────────────────────────────────

/// A parsed program: commands in source order. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
