use crate::types::color::Color;

/// Rasterization capability the interpreter draws through. Implemented by
/// pixel buffers and by `RecordingCanvas`.
pub trait Canvas {
    /// Fill the whole target. Scripts cannot call this directly.
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color);
    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color);
}

impl<C: Canvas + ?Sized> Canvas for &mut C {
    fn clear(&mut self, color: Color) { (**self).clear(color) }
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) { (**self).fill_rect(x, y, w, h, color) }
    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) { (**self).fill_circle(cx, cy, r, color) }
}

// ─── Recording ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasCall {
    Clear { color: Color },
    FillRect { x: i32, y: i32, w: i32, h: i32, color: Color },
    FillCircle { cx: i32, cy: i32, r: i32, color: Color },
}

impl std::fmt::Display for CanvasCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clear { color } => write!(f, "clear({color})"),
            Self::FillRect { x, y, w, h, color } => write!(f, "fillRect({x}, {y}, {w}, {h}, {color})"),
            Self::FillCircle { cx, cy, r, color } => write!(f, "fillCircle({cx}, {cy}, {r}, {color})"),
        }
    }
}

/// Canvas that remembers every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    calls: Vec<CanvasCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self { Self::default() }

    pub fn calls(&self) -> &[CanvasCall] { &self.calls }

    pub fn into_calls(self) -> Vec<CanvasCall> { self.calls }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Color) {
        self.calls.push(CanvasCall::Clear { color });
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.calls.push(CanvasCall::FillRect { x, y, w, h, color });
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) {
        self.calls.push(CanvasCall::FillCircle { cx, cy, r, color });
    }
}
