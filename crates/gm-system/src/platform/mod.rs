//! OS facilities behind one flat facade
//!
//! Everything gm-system needs from the OS: process enumeration, IO
//! counters, priorities, memory stats, window listing, cursor/pixel
//! queries and the remap keyboard hook. Non-Windows builds get stubs so
//! the policy layers stay buildable and testable anywhere.

use crate::boost::SystemStats;
use crate::monitor::IoSampler;
use gm_core::{Key, Result};
use serde::Serialize;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(not(target_os = "windows"))]
mod unsupported;

#[cfg(target_os = "windows")]
use windows as current;

#[cfg(not(target_os = "windows"))]
use unsupported as current;

#[derive(Debug, Clone, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub exe: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowInfo {
    pub hwnd: isize,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CursorInfo {
    pub x: i32,
    pub y: i32,
    /// Pixel under the cursor as `#rrggbb`.
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityClass {
    High,
    Normal,
    Idle,
}

/// Snapshot of the running processes. Empty off Windows.
pub fn process_list() -> Vec<ProcessInfo> {
    current::process_list()
}

/// Sampler over per-process cumulative IO counters.
pub fn io_sampler() -> Box<dyn IoSampler> {
    current::io_sampler()
}

pub fn set_priority(pid: u32, class: PriorityClass) -> Result<()> {
    current::set_priority(pid, class)
}

pub fn terminate(pid: u32) -> Result<()> {
    current::terminate(pid)
}

/// Resident set size of a process, in bytes.
pub fn process_memory(pid: u32) -> Result<u64> {
    current::process_memory(pid)
}

pub fn system_stats() -> Result<SystemStats> {
    current::system_stats()
}

/// Visible top-level windows with a non-empty title.
pub fn list_windows() -> Vec<WindowInfo> {
    current::list_windows()
}

pub fn cursor_info() -> Result<CursorInfo> {
    current::cursor_info()
}

/// Screen pixel color at the given coordinates, `#rrggbb`.
pub fn pixel_at(x: i32, y: i32) -> Result<String> {
    current::pixel_at(x, y)
}

pub fn install_remap_hook(mappings: &[(Key, Key)]) -> Result<()> {
    current::install_remap_hook(mappings)
}

pub fn remove_remap_hook() -> Result<()> {
    current::remove_remap_hook()
}
