use crate::syntax::ast::Operand;
use crate::types::color::Color;

/// Mutable state of one draw pass. Built fresh for every pass and dropped
/// after it, so nothing leaks from one pass into the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawContext {
    pub current_color: Color,
    pub width: i32,
    pub height: i32,
}

impl DrawContext {
    pub fn new(width: i32, height: i32) -> Self {
        Self { current_color: Color::White, width, height }
    }

    /// Bind a numeric operand against this pass's surface size.
    pub fn resolve(&self, operand: Operand) -> i32 {
        match operand {
            Operand::Literal(n)   => n,
            Operand::ScreenWidth  => self.width,
            Operand::ScreenHeight => self.height,
        }
    }
}
