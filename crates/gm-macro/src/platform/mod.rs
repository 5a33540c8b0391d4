//! Platform input backends

use crate::backend::InputBackend;
use std::sync::Arc;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(target_os = "windows"))]
pub mod unsupported;

#[cfg(target_os = "windows")]
pub use windows as current;

#[cfg(not(target_os = "windows"))]
pub use unsupported as current;

/// The backend for the build target. On non-Windows builds every factory
/// reports NotImplemented; the control surface still runs.
pub fn native_backend() -> Arc<dyn InputBackend> {
    Arc::new(current::NativeBackend::new())
}
