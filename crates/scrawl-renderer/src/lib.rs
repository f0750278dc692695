//! Surface binding for scrawl scripts: a software pixel buffer, the
//! `Surface` abstraction a host implements, script sources, and the
//! `SurfaceSession` state machine that drives draw passes.

pub mod buffer;
pub mod error;
pub mod session;
pub mod source;
pub mod surface;

pub use buffer::{PixelBuffer, PixelFormat};
pub use error::{SessionError, SourceError, SurfaceUnavailable};
pub use session::{Lifecycle, PassReport, SurfaceSession};
pub use source::{DirSource, MemorySource, ScriptSource};
pub use surface::{MemorySurface, Surface};
