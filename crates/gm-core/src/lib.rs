//! gm-core - Shared types for the GameManager automation daemon
//!
//! Value types (events, keys, errors) and the small synchronization
//! primitives the macro engine builds on. Nothing in this crate touches
//! the operating system.

pub mod cancel;
pub mod error;
pub mod event;
pub mod keys;
pub mod session;

pub use cancel::CancelToken;
pub use error::{Error, ErrorCode, Result};
pub use event::{MacroEvent, MacroLog};
pub use keys::{Key, MouseButton};
pub use session::{Activity, ActivityGuard, SessionState};
