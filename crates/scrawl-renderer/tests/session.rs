//! Session scenarios through the public API.
//!
//! `MemorySurface` covers the ordinary host flow. `HookSurface` runs a
//! callback from inside `present`, i.e. while the session is `Drawing`,
//! to exercise nested requests. `GateSurface` counts concurrent writers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use scrawl_lang::{CompileError, LexErrorKind, ParseErrorKind, RecordingCanvas};
use scrawl_renderer::{
    DirSource, Lifecycle, MemorySurface, PixelBuffer, PixelFormat, SessionError, SourceError,
    Surface, SurfaceSession, SurfaceUnavailable,
};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

const FULL_RED: &str = "setColor(RED); drawRect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT);";

fn front_pixel(surface: &MemorySurface, x: u32, y: u32) -> [u8; 4] {
    surface.front().and_then(|f| f.pixel(x, y)).unwrap_or_else(|| panic!("no pixel at {x},{y}"))
}

// ─── Memory surface ──────────────────────────────────────────────────────────

#[test]
fn clear_then_circle_on_500_square() {
    let surface = Arc::new(MemorySurface::new(500, 500));
    let session = SurfaceSession::new(&surface);
    session
        .set_script("setColor(WHITE); drawRect(0,0,SCREEN_WIDTH,SCREEN_HEIGHT); setColor(BLUE); drawCircle(250,250,100);")
        .unwrap();
    session.on_surface_created().unwrap();

    assert_eq!(session.lifecycle(), Lifecycle::Valid);
    assert_eq!(surface.frames_presented(), 1);
    assert_eq!(front_pixel(&surface, 0, 0), WHITE);
    assert_eq!(front_pixel(&surface, 499, 499), WHITE);
    assert_eq!(front_pixel(&surface, 250, 250), BLUE);
    assert_eq!(front_pixel(&surface, 250, 151), BLUE);
    assert_eq!(front_pixel(&surface, 250, 149), WHITE);
    assert_eq!(front_pixel(&surface, 350, 250), BLUE);
    assert_eq!(front_pixel(&surface, 351, 250), WHITE);
}

#[test]
fn demo_script_layers_in_order() {
    let surface = Arc::new(MemorySurface::new(1080, 1920));
    let session = SurfaceSession::new(&surface);
    session.on_surface_created().unwrap();
    session
        .set_script(
            "setColor(WHITE); drawRect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT);
             setColor(BLUE);  drawCircle(250, 250, 100);
             setColor(RED);   drawRect(100, 100, 150, 150);
             setColor(GREEN); drawCircle(400, 400, 80);",
        )
        .unwrap();

    assert_eq!(front_pixel(&surface, 120, 120), RED);
    assert_eq!(front_pixel(&surface, 249, 249), RED);
    assert_eq!(front_pixel(&surface, 300, 300), BLUE);
    assert_eq!(front_pixel(&surface, 400, 400), GREEN);
    assert_eq!(front_pixel(&surface, 1000, 1800), WHITE);
}

#[test]
fn unknown_function_leaves_previous_frame() {
    let surface = Arc::new(MemorySurface::new(20, 20));
    let session = SurfaceSession::new(&surface);
    session.on_surface_created().unwrap();
    session.set_script(FULL_RED).unwrap();
    let before = surface.front();

    let err = session.set_script("setColor(BLUE); drawTriangle(1, 2, 3);").unwrap_err();
    match err {
        SessionError::Script(CompileError::Parse(e)) => {
            assert_eq!(e.kind, ParseErrorKind::UnknownFunction("drawTriangle".into()));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    assert_eq!(surface.frames_presented(), 1);
    assert_eq!(surface.front(), before);
    assert_eq!(session.passes_completed(), 1);
}

#[test]
fn lex_error_leaves_previous_frame() {
    let surface = Arc::new(MemorySurface::new(20, 20));
    let session = SurfaceSession::new(&surface);
    session.on_surface_created().unwrap();
    session.set_script(FULL_RED).unwrap();
    let before = surface.front();
    let script = session.script().unwrap();

    let err = session.set_script("setColor(BLUE); drawRect(0, 0, 5, 5) @").unwrap_err();
    match &err {
        SessionError::Script(CompileError::Lex(e)) => {
            assert_eq!(e.kind, LexErrorKind::UnexpectedCharacter('@'));
        }
        other => panic!("expected lex error, got {other:?}"),
    }
    assert!(err.to_string().starts_with("[L001] 1:38"));
    assert_eq!(surface.frames_presented(), 1);
    assert_eq!(surface.front(), before);
    assert!(Arc::ptr_eq(&script, &session.script().unwrap()));
    assert_eq!(session.lifecycle(), Lifecycle::Valid);
}

#[test]
fn unallocatable_size_keeps_session_drawable() {
    let surface = Arc::new(MemorySurface::new(10, 10));
    let session = SurfaceSession::new(&surface);
    session.set_script(FULL_RED).unwrap();
    session.on_surface_created().unwrap();

    session.on_surface_changed(i32::MAX, i32::MAX, PixelFormat::Rgba8888).unwrap();
    assert_eq!(session.lifecycle(), Lifecycle::Valid);
    assert_eq!(session.passes_completed(), 1);

    session.on_surface_changed(20, 20, PixelFormat::Rgba8888).unwrap();
    assert_eq!(session.passes_completed(), 2);
    assert_eq!(front_pixel(&surface, 19, 19), RED);
}

#[test]
fn changed_before_created_is_rejected() {
    let surface = Arc::new(MemorySurface::new(20, 20));
    let session = SurfaceSession::new(&surface);
    session.set_script(FULL_RED).unwrap();

    let err = session.on_surface_changed(100, 100, PixelFormat::Rgba8888).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidSurfaceState { operation: "on_surface_changed", state: Lifecycle::Created }
    ));
    assert_eq!(session.dimensions(), (0, 0));
    assert_eq!(surface.frames_presented(), 0);
    assert_eq!(err.to_string(), "`on_surface_changed` rejected while surface is created");
}

#[test]
fn resize_redraws_at_new_size_and_format() {
    let surface = Arc::new(MemorySurface::new(10, 10));
    let session = SurfaceSession::new(&surface);
    session.set_script(FULL_RED).unwrap();
    session.on_surface_created().unwrap();

    surface.resize(32, 16);
    session.on_surface_changed(32, 16, PixelFormat::Rgb565).unwrap();

    let front = surface.front().unwrap();
    assert_eq!((front.width(), front.height()), (32, 16));
    assert_eq!(front.format(), PixelFormat::Rgb565);
    assert_eq!(front.pixel(31, 15), Some(RED));
    assert_eq!(session.pixel_format(), PixelFormat::Rgb565);
    assert_eq!(session.passes_completed(), 2);
}

#[test]
fn zero_size_is_invalid_dimensions() {
    let surface = Arc::new(MemorySurface::new(10, 10));
    let session = SurfaceSession::new(&surface);
    session.on_surface_created().unwrap();
    let err = session.on_surface_changed(0, 0, PixelFormat::Rgba8888).unwrap_err();
    assert_eq!(err.to_string(), "invalid surface dimensions 0×0");
    assert_eq!(session.dimensions(), (10, 10));
}

#[test]
fn invalidated_surface_skips_pass_and_recovers() {
    let surface = Arc::new(MemorySurface::new(10, 10));
    let session = SurfaceSession::new(&surface);
    session.on_surface_created().unwrap();
    surface.invalidate();

    session.set_script(FULL_RED).unwrap();
    assert_eq!(session.lifecycle(), Lifecycle::Valid);
    assert_eq!(session.passes_completed(), 0);
    assert!(surface.front().is_none());

    session.on_surface_changed(12, 12, PixelFormat::Rgba8888).unwrap();
    assert_eq!(session.lifecycle(), Lifecycle::Valid);
}

#[test]
fn surface_created_with_zero_size_waits_for_change() {
    let surface = Arc::new(MemorySurface::new(0, 0));
    let session = SurfaceSession::new(&surface);
    session.set_script(FULL_RED).unwrap();
    session.on_surface_created().unwrap();
    assert_eq!(session.passes_completed(), 0);

    session.on_surface_changed(4, 4, PixelFormat::Rgba8888).unwrap();
    assert_eq!(front_pixel(&surface, 3, 3), RED);
}

#[test]
fn script_file_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.js"), "setColor(GREEN);\ndrawRect(0, 0, 2, 2);\n").unwrap();

    let surface = Arc::new(MemorySurface::new(4, 4));
    let session = SurfaceSession::new(&surface).with_source(DirSource::new(dir.path()));
    session.on_surface_created().unwrap();
    session.set_script_file("app.js").unwrap();
    assert_eq!(front_pixel(&surface, 1, 1), GREEN);
    assert_eq!(front_pixel(&surface, 2, 2), [0, 0, 0, 0]);

    assert!(matches!(
        session.set_script_file("../app.js"),
        Err(SessionError::Source(SourceError::NotFound { .. }))
    ));
}

#[test]
fn destroy_then_everything_is_rejected() {
    let surface = Arc::new(MemorySurface::new(4, 4));
    let session = SurfaceSession::new(&surface);
    session.set_script(FULL_RED).unwrap();
    session.on_surface_created().unwrap();
    session.on_surface_destroyed().unwrap();

    assert!(session.on_surface_changed(8, 8, PixelFormat::Rgba8888).is_err());
    assert!(session.redraw().is_err());
    assert!(session.set_script("setColor(BLUE);").is_err());
    assert_eq!(surface.frames_presented(), 1);
}

// ─── Nested requests ─────────────────────────────────────────────────────────

type Hook = Box<dyn FnOnce(&SurfaceSession<HookSurface>) + Send>;

/// Memory surface that runs a one-shot hook at the start of `present`.
struct HookSurface {
    inner: MemorySurface,
    session: OnceLock<Weak<SurfaceSession<HookSurface>>>,
    hook: Mutex<Option<Hook>>,
}

impl HookSurface {
    fn bind(width: i32, height: i32) -> (Arc<Self>, Arc<SurfaceSession<Self>>) {
        let surface = Arc::new(Self {
            inner: MemorySurface::new(width, height),
            session: OnceLock::new(),
            hook: Mutex::new(None),
        });
        let session = Arc::new(SurfaceSession::new(&surface));
        let _ = surface.session.set(Arc::downgrade(&session));
        (surface, session)
    }

    fn on_present(&self, hook: impl FnOnce(&SurfaceSession<HookSurface>) + Send + 'static) {
        *self.hook.lock() = Some(Box::new(hook));
    }
}

impl Surface for HookSurface {
    type Buffer = PixelBuffer;

    fn dimensions(&self) -> (i32, i32) { self.inner.dimensions() }

    fn acquire_buffer(&self, width: i32, height: i32, format: PixelFormat) -> Result<PixelBuffer, SurfaceUnavailable> {
        self.inner.acquire_buffer(width, height, format)
    }

    fn present(&self, buffer: PixelBuffer) -> Result<(), SurfaceUnavailable> {
        let hook = self.hook.lock().take();
        if let (Some(hook), Some(session)) = (hook, self.session.get().and_then(Weak::upgrade)) {
            hook(session.as_ref());
        }
        self.inner.present(buffer)
    }
}

#[test]
fn resize_during_pass_is_deferred_and_coalesced() {
    let (surface, session) = HookSurface::bind(100, 100);
    session.set_script(FULL_RED).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    surface.on_present(move |s| {
        log.lock().push((s.lifecycle(), s.on_surface_changed(200, 150, PixelFormat::Rgba8888).map_err(|e| e.to_string())));
        log.lock().push((s.lifecycle(), s.on_surface_changed(300, 240, PixelFormat::Rgba8888).map_err(|e| e.to_string())));
    });
    session.on_surface_created().unwrap();

    let rejected = Err("`on_surface_changed` rejected while surface is drawing".to_string());
    assert_eq!(*seen.lock(), vec![(Lifecycle::Drawing, rejected.clone()), (Lifecycle::Drawing, rejected)]);

    // one follow-up pass at the latest size
    assert_eq!(session.passes_completed(), 2);
    assert_eq!(session.dimensions(), (300, 240));
    let report = session.last_report().unwrap();
    assert_eq!((report.width, report.height), (300, 240));
    let front = surface.inner.front().unwrap();
    assert_eq!((front.width(), front.height()), (300, 240));
    assert_eq!(front.pixel(299, 239), Some(RED));
    assert_eq!(session.lifecycle(), Lifecycle::Valid);
}

#[test]
fn script_replaced_during_pass_swaps_afterwards() {
    let (surface, session) = HookSurface::bind(8, 8);
    session.set_script("setColor(BLUE); drawRect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT);").unwrap();

    let active_during = Arc::new(Mutex::new(None));
    let slot = active_during.clone();
    surface.on_present(move |s| {
        s.set_script(FULL_RED).unwrap();
        *slot.lock() = s.script().map(|script| script.len());
    });
    session.on_surface_created().unwrap();

    // queued script is not visible while the first pass runs
    assert_eq!(*active_during.lock(), Some(2));
    assert_eq!(session.passes_completed(), 2);
    assert_eq!(surface.inner.front().unwrap().pixel(4, 4), Some(RED));
    assert_eq!(surface.inner.frames_presented(), 2);
}

#[test]
fn redraw_during_pass_runs_once_more() {
    let (surface, session) = HookSurface::bind(4, 4);
    session.set_script(FULL_RED).unwrap();
    surface.on_present(|s| {
        s.redraw().unwrap();
        s.redraw().unwrap();
    });
    session.on_surface_created().unwrap();
    assert_eq!(session.passes_completed(), 2);
}

#[test]
fn destroy_during_pass_presents_and_stops() {
    let (surface, session) = HookSurface::bind(6, 6);
    session.set_script(FULL_RED).unwrap();

    let results = Arc::new(Mutex::new(Vec::new()));
    let log = results.clone();
    surface.on_present(move |s| {
        let mut log = log.lock();
        log.push(s.on_surface_changed(12, 12, PixelFormat::Rgba8888).is_err());
        log.push(s.on_surface_destroyed().is_ok());
        log.push(matches!(
            s.redraw(),
            Err(SessionError::InvalidSurfaceState { state: Lifecycle::Destroyed, .. })
        ));
    });
    session.on_surface_created().unwrap();

    assert_eq!(*results.lock(), vec![true, true, true]);
    assert_eq!(session.lifecycle(), Lifecycle::Destroyed);
    assert_eq!(session.passes_completed(), 1);
    assert_eq!(surface.inner.frames_presented(), 1);
    assert!(session.last_report().unwrap().presented);
    // the queued resize was dropped
    assert_eq!(session.dimensions(), (6, 6));
}

#[test]
fn surface_lost_during_pass_is_not_presented() {
    let (surface, session) = HookSurface::bind(6, 6);
    session.set_script(FULL_RED).unwrap();

    let inner = Arc::clone(&surface);
    surface.on_present(move |s| {
        inner.inner.invalidate();
        s.on_surface_destroyed().unwrap();
    });
    session.on_surface_created().unwrap();

    let report = session.last_report().unwrap();
    assert!(!report.presented);
    assert_eq!(report.exec.shapes_drawn, 1);
    assert_eq!(surface.inner.frames_presented(), 0);
    assert_eq!(session.lifecycle(), Lifecycle::Destroyed);
}

// ─── Threads ─────────────────────────────────────────────────────────────────

/// Records how many passes hold a buffer at once.
#[derive(Default)]
struct GateSurface {
    active: AtomicUsize,
    max_active: AtomicUsize,
    presented: AtomicUsize,
}

impl Surface for GateSurface {
    type Buffer = RecordingCanvas;

    fn dimensions(&self) -> (i32, i32) { (64, 64) }

    fn acquire_buffer(&self, _w: i32, _h: i32, _f: PixelFormat) -> Result<RecordingCanvas, SurfaceUnavailable> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_micros(200));
        Ok(RecordingCanvas::new())
    }

    fn present(&self, _buffer: RecordingCanvas) -> Result<(), SurfaceUnavailable> {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.presented.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn at_most_one_pass_at_a_time() {
    let surface = Arc::new(GateSurface::default());
    let session = SurfaceSession::new(&surface);
    session.set_script(FULL_RED).unwrap();
    session.on_surface_created().unwrap();

    std::thread::scope(|scope| {
        for t in 0..4 {
            let session = &session;
            scope.spawn(move || {
                for i in 0..40 {
                    match (t + i) % 3 {
                        0 => { let _ = session.on_surface_changed(10 + i, 20 + t, PixelFormat::Rgba8888); }
                        1 => { let _ = session.set_script(if i % 2 == 0 { FULL_RED } else { "drawCircle(5, 5, 5);" }); }
                        _ => { let _ = session.redraw(); }
                    }
                }
            });
        }
    });

    assert_eq!(surface.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(surface.active.load(Ordering::SeqCst), 0);
    assert_eq!(session.lifecycle(), Lifecycle::Valid);
    assert_eq!(session.passes_completed(), surface.presented.load(Ordering::SeqCst) as u64);
}
