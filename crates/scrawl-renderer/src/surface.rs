use parking_lot::Mutex;
use scrawl_lang::Canvas;

use crate::buffer::{PixelBuffer, PixelFormat};
use crate::error::SurfaceUnavailable;

/// A platform-owned drawing target. The host owns it (usually behind an
/// `Arc`); a session only ever holds a weak handle.
pub trait Surface: Send + Sync {
    type Buffer: Canvas;

    /// Current size as reported by the platform.
    fn dimensions(&self) -> (i32, i32);

    /// Lock a writable buffer of the given geometry for one draw pass.
    fn acquire_buffer(&self, width: i32, height: i32, format: PixelFormat) -> Result<Self::Buffer, SurfaceUnavailable>;

    /// Hand a finished buffer back for display.
    fn present(&self, buffer: Self::Buffer) -> Result<(), SurfaceUnavailable>;
}

// ─── In-memory surface ────────────────────────────────────────────────────────

struct MemoryState {
    valid: bool,
    width: i32,
    height: i32,
    front: Option<PixelBuffer>,
    frames: u64,
}

/// Software surface backed by a `PixelBuffer` front buffer. Used by the
/// desktop host and by tests.
pub struct MemorySurface {
    state: Mutex<MemoryState>,
}

impl MemorySurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            state: Mutex::new(MemoryState { valid: true, width, height, front: None, frames: 0 }),
        }
    }

    /// Platform-side resize. The session still has to be told through
    /// `on_surface_changed`.
    pub fn resize(&self, width: i32, height: i32) {
        let mut s = self.state.lock();
        s.width = width;
        s.height = height;
    }

    /// Platform-side teardown: later acquisitions and presents fail.
    pub fn invalidate(&self) {
        self.state.lock().valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.state.lock().valid
    }

    /// Copy of the last presented frame.
    pub fn front(&self) -> Option<PixelBuffer> {
        self.state.lock().front.clone()
    }

    pub fn frames_presented(&self) -> u64 {
        self.state.lock().frames
    }
}

impl Surface for MemorySurface {
    type Buffer = PixelBuffer;

    fn dimensions(&self) -> (i32, i32) {
        let s = self.state.lock();
        (s.width, s.height)
    }

    /// Starts from the previous frame when the geometry matches, so a pass
    /// only changes what it draws over.
    fn acquire_buffer(&self, width: i32, height: i32, format: PixelFormat) -> Result<PixelBuffer, SurfaceUnavailable> {
        let s = self.state.lock();
        if !s.valid {
            return Err(SurfaceUnavailable);
        }
        match &s.front {
            Some(front)
                if i64::from(front.width()) == i64::from(width)
                    && i64::from(front.height()) == i64::from(height)
                    && front.format() == format =>
            {
                Ok(front.clone())
            }
            _ => PixelBuffer::new(width, height, format),
        }
    }

    fn present(&self, buffer: PixelBuffer) -> Result<(), SurfaceUnavailable> {
        let mut s = self.state.lock();
        if !s.valid {
            return Err(SurfaceUnavailable);
        }
        s.front = Some(buffer);
        s.frames += 1;
        Ok(())
    }
}
