//! Surface lifecycle as an explicit state machine.
//!
//! ```text
//! Created ──created──▶ Valid ──pass begins──▶ Drawing
//!                        ▲                       │
//!                        └─────pass ends─────────┘
//!     any ──destroyed──▶ Destroyed (absorbing)
//! ```
//!
//! All state lives behind one mutex. A draw pass claims `Drawing` under the
//! lock, runs with the lock released, then re-locks to finish. Requests that
//! arrive meanwhile (from another thread, or nested inside the pass) are
//! queued and picked up when the pass ends, so at most one pass per session
//! writes to a buffer at any time.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use scrawl_lang::{compile, execute, Canvas, CanvasCall, Color, ExecReport, RecordingCanvas, Script};

use crate::buffer::PixelFormat;
use crate::error::{SessionError, SourceError, SurfaceUnavailable};
use crate::source::ScriptSource;
use crate::surface::Surface;

// ─── Lifecycle ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Surface object exists, no usable buffer yet.
    Created,
    /// Ready for a pass.
    Valid,
    /// A pass owns the buffer.
    Drawing,
    Destroyed,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Created   => "created",
            Self::Valid     => "valid",
            Self::Drawing   => "drawing",
            Self::Destroyed => "destroyed",
        })
    }
}

// ─── Pass report ──────────────────────────────────────────────────────────────

/// Outcome of the last completed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub width: i32,
    pub height: i32,
    pub exec: ExecReport,
    /// `false` when the surface refused the finished buffer.
    pub presented: bool,
    /// Canvas calls the pass made, in order.
    pub calls: Vec<CanvasCall>,
}

// ─── Internal state ───────────────────────────────────────────────────────────

#[derive(Clone)]
struct LoadedScript {
    text: String,
    script: Arc<Script>,
}

struct PassJob {
    script: Arc<Script>,
    width: i32,
    height: i32,
    format: PixelFormat,
}

struct Inner {
    lifecycle: Lifecycle,
    width: i32,
    height: i32,
    format: PixelFormat,
    script: Option<LoadedScript>,
    queued_script: Option<LoadedScript>,
    /// Latest resize seen while drawing; earlier ones are overwritten.
    queued_size: Option<(i32, i32, PixelFormat)>,
    redraw_requested: bool,
    last_report: Option<PassReport>,
    passes: u64,
}

impl Inner {
    fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Created,
            width: 0,
            height: 0,
            format: PixelFormat::default(),
            script: None,
            queued_script: None,
            queued_size: None,
            redraw_requested: false,
            last_report: None,
            passes: 0,
        }
    }

    fn reject(&self, operation: &'static str) -> SessionError {
        tracing::warn!(operation, state = %self.lifecycle, "surface operation rejected");
        SessionError::InvalidSurfaceState { operation, state: self.lifecycle }
    }

    /// Parse already done for this exact text, newest first.
    fn parsed(&self, text: &str) -> Option<Arc<Script>> {
        [&self.queued_script, &self.script]
            .into_iter()
            .flatten()
            .find(|loaded| loaded.text == text)
            .map(|loaded| loaded.script.clone())
    }

    /// Claim the buffer if a pass can run now.
    fn begin_pass(&mut self) -> Option<PassJob> {
        if self.lifecycle != Lifecycle::Valid {
            return None;
        }
        let script = self.script.as_ref()?.script.clone();
        if self.width <= 0 || self.height <= 0 {
            tracing::debug!(width = self.width, height = self.height, "no usable size yet, pass skipped");
            return None;
        }
        self.lifecycle = Lifecycle::Drawing;
        Some(PassJob { script, width: self.width, height: self.height, format: self.format })
    }

    /// Release the buffer and fold in queued work. Returns `true` when that
    /// work needs another pass.
    fn finish_pass(&mut self) -> bool {
        if self.lifecycle == Lifecycle::Destroyed {
            self.queued_script = None;
            self.queued_size = None;
            self.redraw_requested = false;
            return false;
        }
        self.lifecycle = Lifecycle::Valid;

        let mut again = std::mem::take(&mut self.redraw_requested);
        if let Some(loaded) = self.queued_script.take() {
            self.script = Some(loaded);
            again = true;
        }
        if let Some((width, height, format)) = self.queued_size.take() {
            self.width = width;
            self.height = height;
            self.format = format;
            again = true;
        }
        again
    }
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// Binds one script to one platform surface and redraws it whenever the
/// surface or the script changes.
pub struct SurfaceSession<S: Surface> {
    surface: Weak<S>,
    source: Option<Box<dyn ScriptSource>>,
    inner: Mutex<Inner>,
}

impl<S: Surface> SurfaceSession<S> {
    pub fn new(surface: &Arc<S>) -> Self {
        Self { surface: Arc::downgrade(surface), source: None, inner: Mutex::new(Inner::new()) }
    }

    /// Where `set_script_file` looks scripts up.
    pub fn with_source(mut self, source: impl ScriptSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ─── Surface callbacks ────────────────────────────────────────────────────

    pub fn on_surface_created(&self) -> Result<(), SessionError> {
        let (width, height) = self.surface.upgrade().map(|s| s.dimensions()).unwrap_or((0, 0));
        {
            let mut inner = self.inner.lock();
            if inner.lifecycle != Lifecycle::Created {
                return Err(inner.reject("on_surface_created"));
            }
            inner.lifecycle = Lifecycle::Valid;
            inner.width = width;
            inner.height = height;
            tracing::info!(width, height, "surface created");
        }
        self.run_passes();
        Ok(())
    }

    pub fn on_surface_changed(&self, width: i32, height: i32, format: PixelFormat) -> Result<(), SessionError> {
        {
            let mut inner = self.inner.lock();
            if matches!(inner.lifecycle, Lifecycle::Created | Lifecycle::Destroyed) {
                return Err(inner.reject("on_surface_changed"));
            }
            if width <= 0 || height <= 0 {
                tracing::warn!(width, height, "invalid surface dimensions");
                return Err(SessionError::InvalidDimensions { width, height });
            }
            if inner.lifecycle == Lifecycle::Drawing {
                tracing::debug!(width, height, "resize during pass, redraw deferred");
                inner.queued_size = Some((width, height, format));
                return Err(SessionError::InvalidSurfaceState {
                    operation: "on_surface_changed",
                    state: Lifecycle::Drawing,
                });
            }
            inner.width = width;
            inner.height = height;
            inner.format = format;
            tracing::info!(width, height, ?format, "surface changed");
        }
        self.run_passes();
        Ok(())
    }

    pub fn on_surface_destroyed(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if inner.lifecycle == Lifecycle::Destroyed {
            return Err(inner.reject("on_surface_destroyed"));
        }
        let in_flight = inner.lifecycle == Lifecycle::Drawing;
        inner.lifecycle = Lifecycle::Destroyed;
        inner.queued_script = None;
        inner.queued_size = None;
        inner.redraw_requested = false;
        tracing::info!(in_flight, "surface destroyed");
        Ok(())
    }

    // ─── Script ingestion ─────────────────────────────────────────────────────

    /// Parse `text` and make it the active script. Parse errors come back to
    /// the caller and leave the session (and the last frame) untouched.
    pub fn set_script(&self, text: impl Into<String>) -> Result<(), SessionError> {
        let text = text.into();

        let cached = {
            let inner = self.inner.lock();
            if inner.lifecycle == Lifecycle::Destroyed {
                return Err(inner.reject("set_script"));
            }
            inner.parsed(&text)
        };

        let script = match cached {
            Some(script) => script,
            None => {
                let script = compile(&text).inspect_err(|e| tracing::warn!(error = %e, "script rejected"))?;
                Arc::new(script)
            }
        };
        let loaded = LoadedScript { text, script };

        {
            let mut inner = self.inner.lock();
            match inner.lifecycle {
                Lifecycle::Destroyed => return Err(inner.reject("set_script")),
                Lifecycle::Drawing => {
                    tracing::debug!(commands = loaded.script.len(), "script queued behind running pass");
                    inner.queued_script = Some(loaded);
                    return Ok(());
                }
                Lifecycle::Created => {
                    inner.script = Some(loaded);
                    return Ok(());
                }
                Lifecycle::Valid => {
                    tracing::info!(commands = loaded.script.len(), "script replaced");
                    inner.script = Some(loaded);
                }
            }
        }
        self.run_passes();
        Ok(())
    }

    /// Load a script by name from the configured source, then `set_script`.
    pub fn set_script_file(&self, name: &str) -> Result<(), SessionError> {
        let text = match &self.source {
            Some(source) => source.read(name)?,
            None => return Err(SourceError::NotFound { name: name.into() }.into()),
        };
        tracing::debug!(name, "script file loaded");
        self.set_script(text)
    }

    /// Ask for a fresh pass with the current script and size.
    pub fn redraw(&self) -> Result<(), SessionError> {
        {
            let mut inner = self.inner.lock();
            match inner.lifecycle {
                Lifecycle::Created | Lifecycle::Destroyed => return Err(inner.reject("redraw")),
                Lifecycle::Drawing => {
                    inner.redraw_requested = true;
                    return Ok(());
                }
                Lifecycle::Valid => {}
            }
        }
        self.run_passes();
        Ok(())
    }

    // ─── Observers ────────────────────────────────────────────────────────────

    pub fn lifecycle(&self) -> Lifecycle { self.inner.lock().lifecycle }

    pub fn dimensions(&self) -> (i32, i32) {
        let inner = self.inner.lock();
        (inner.width, inner.height)
    }

    pub fn pixel_format(&self) -> PixelFormat { self.inner.lock().format }

    /// Active script (queued replacements are not visible until swapped in).
    pub fn script(&self) -> Option<Arc<Script>> {
        self.inner.lock().script.as_ref().map(|loaded| loaded.script.clone())
    }

    pub fn last_report(&self) -> Option<PassReport> { self.inner.lock().last_report.clone() }

    pub fn passes_completed(&self) -> u64 { self.inner.lock().passes }

    // ─── Draw passes ──────────────────────────────────────────────────────────

    /// Run passes until no queued work is left.
    fn run_passes(&self) {
        loop {
            let Some(job) = self.inner.lock().begin_pass() else { return };

            let mut guard = PassGuard { inner: &self.inner, armed: true };
            let outcome = self.draw_pass(&job);
            guard.armed = false;

            let again = {
                let mut inner = self.inner.lock();
                match outcome {
                    Ok(report) => {
                        inner.passes += 1;
                        inner.last_report = Some(report);
                    }
                    Err(e) => tracing::warn!(error = %e, "draw pass abandoned"),
                }
                inner.finish_pass()
            };
            if !again {
                return;
            }
        }
    }

    /// One complete pass into one acquired buffer. Runs without the lock.
    fn draw_pass(&self, job: &PassJob) -> Result<PassReport, SurfaceUnavailable> {
        let surface = self.surface.upgrade().ok_or(SurfaceUnavailable)?;
        let mut buffer = surface.acquire_buffer(job.width, job.height, job.format)?;

        let mut traced = Traced { target: &mut buffer, log: RecordingCanvas::new() };
        let exec = execute(&job.script, job.width, job.height, &mut traced);
        let calls = traced.log.into_calls();

        let presented = match surface.present(buffer) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "finished buffer not presented");
                false
            }
        };
        tracing::debug!(
            width = job.width,
            height = job.height,
            shapes = exec.shapes_drawn,
            skipped = exec.errors.len(),
            presented,
            "draw pass complete"
        );
        Ok(PassReport { width: job.width, height: job.height, exec, presented, calls })
    }
}

/// Releases `Drawing` if a pass unwinds before it reaches `finish_pass`.
struct PassGuard<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::error!("draw pass panicked, surface released");
            self.inner.lock().finish_pass();
        }
    }
}

/// Draws into the pass buffer and keeps a copy of every call.
struct Traced<'a, C: Canvas> {
    target: &'a mut C,
    log: RecordingCanvas,
}

impl<C: Canvas> Canvas for Traced<'_, C> {
    fn clear(&mut self, color: Color) {
        self.log.clear(color);
        self.target.clear(color);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.log.fill_rect(x, y, w, h, color);
        self.target.fill_rect(x, y, w, h, color);
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) {
        self.log.fill_circle(cx, cy, r, color);
        self.target.fill_circle(cx, cy, r, color);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
