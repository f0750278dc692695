//! The fixed table of names a script may use. Nothing is ever declared by a
//! script; the parser only checks identifiers against this table.

use crate::syntax::ast::Operand;
use crate::types::color::Color;

// ─── Builtins ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    SetColor,
    DrawRect,
    DrawCircle,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Self::SetColor   => "setColor",
            Self::DrawRect   => "drawRect",
            Self::DrawCircle => "drawCircle",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Self::SetColor   => 1,
            Self::DrawRect   => 4,
            Self::DrawCircle => 3,
        }
    }

    /// Parameter names, used for listings.
    pub fn params(self) -> &'static [&'static str] {
        match self {
            Self::SetColor   => &["color"],
            Self::DrawRect   => &["x", "y", "w", "h"],
            Self::DrawCircle => &["cx", "cy", "r"],
        }
    }
}

// ─── Symbol ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function(Builtin),
    Color(Color),
    /// `SCREEN_WIDTH` / `SCREEN_HEIGHT`, bound per draw pass.
    Dimension(Operand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub name: &'static str,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function(_))
    }
}

// ─── Table ────────────────────────────────────────────────────────────────────

pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn standard() -> Self {
        let mut symbols = Vec::new();
        for b in [Builtin::SetColor, Builtin::DrawRect, Builtin::DrawCircle] {
            symbols.push(Symbol { name: b.name(), kind: SymbolKind::Function(b) });
        }
        for c in Color::ALL {
            symbols.push(Symbol { name: c.name(), kind: SymbolKind::Color(c) });
        }
        symbols.push(Symbol { name: "SCREEN_WIDTH",  kind: SymbolKind::Dimension(Operand::ScreenWidth) });
        symbols.push(Symbol { name: "SCREEN_HEIGHT", kind: SymbolKind::Dimension(Operand::ScreenHeight) });
        Self { symbols }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn function(&self, name: &str) -> Option<Builtin> {
        match self.lookup(name)?.kind {
            SymbolKind::Function(b) => Some(b),
            _ => None,
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_function())
    }

    pub fn constants(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| !s.is_function())
    }
}

impl Default for SymbolTable {
    fn default() -> Self { Self::standard() }
}
