//! Straight-line command interpreter. Replays a `Script` into a `Canvas`.
//! The only state it carries between commands is the `DrawContext`.

use crate::error::RuntimeError;
use crate::runtime::canvas::Canvas;
use crate::runtime::context::DrawContext;
use crate::syntax::ast::{Command, Script, Span};

/// What one replay did. Geometry errors are collected here, not returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecReport {
    pub commands_run: usize,
    pub shapes_drawn: usize,
    pub errors: Vec<RuntimeError>,
}

impl ExecReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Interpreter<'a> {
    script: &'a Script,
}

impl<'a> Interpreter<'a> {
    pub fn new(script: &'a Script) -> Self {
        Self { script }
    }

    pub fn execute<C: Canvas + ?Sized>(&self, ctx: &mut DrawContext, canvas: &mut C) -> ExecReport {
        let mut report = ExecReport::default();
        for command in self.script.commands() {
            report.commands_run += 1;
            match exec_command(command, ctx, canvas) {
                Ok(true) => report.shapes_drawn += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "skipping command");
                    report.errors.push(e);
                }
            }
        }
        report
    }
}

/// Returns `Ok(true)` when a shape reached the canvas.
fn exec_command<C: Canvas + ?Sized>(
    command: &Command,
    ctx: &mut DrawContext,
    canvas: &mut C,
) -> Result<bool, RuntimeError> {
    match *command {
        Command::SetColor { color, .. } => {
            ctx.current_color = color;
            Ok(false)
        }

        Command::DrawRect { x, y, w, h, span } => {
            let (x, y, w, h) = (ctx.resolve(x), ctx.resolve(y), ctx.resolve(w), ctx.resolve(h));
            if w <= 0 || h <= 0 {
                return Err(geometry("drawRect", format!("size {w}×{h} must be positive"), span));
            }
            canvas.fill_rect(x, y, w, h, ctx.current_color);
            Ok(true)
        }

        Command::DrawCircle { cx, cy, r, span } => {
            let (cx, cy, r) = (ctx.resolve(cx), ctx.resolve(cy), ctx.resolve(r));
            if r <= 0 {
                return Err(geometry("drawCircle", format!("radius {r} must be positive"), span));
            }
            canvas.fill_circle(cx, cy, r, ctx.current_color);
            Ok(true)
        }
    }
}

fn geometry(shape: &'static str, detail: String, span: Span) -> RuntimeError {
    RuntimeError::InvalidGeometry { shape, detail, span }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
