//! Daemon wiring: shared state, the HTTP router and the global hotkey.
//! Split from the binary so the router is testable without sockets.

pub mod hotkey;
pub mod http;
pub mod state;

pub use state::AppState;
