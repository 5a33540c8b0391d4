//! Stubs for platforms without system integration

use super::{CursorInfo, PriorityClass, ProcessInfo, WindowInfo};
use crate::boost::SystemStats;
use crate::monitor::{IoSample, IoSampler};
use gm_core::{Error, Key, Result};

pub fn process_list() -> Vec<ProcessInfo> {
    Vec::new()
}

struct EmptySampler;

impl IoSampler for EmptySampler {
    fn sample(&self) -> Vec<IoSample> {
        Vec::new()
    }
}

pub fn io_sampler() -> Box<dyn IoSampler> {
    Box::new(EmptySampler)
}

pub fn set_priority(_pid: u32, _class: PriorityClass) -> Result<()> {
    Err(Error::not_implemented("process priorities"))
}

pub fn terminate(_pid: u32) -> Result<()> {
    Err(Error::not_implemented("process termination"))
}

pub fn process_memory(_pid: u32) -> Result<u64> {
    Err(Error::not_implemented("process memory stats"))
}

pub fn system_stats() -> Result<SystemStats> {
    Err(Error::not_implemented("system stats"))
}

pub fn list_windows() -> Vec<WindowInfo> {
    Vec::new()
}

pub fn cursor_info() -> Result<CursorInfo> {
    Err(Error::not_implemented("cursor queries"))
}

pub fn pixel_at(_x: i32, _y: i32) -> Result<String> {
    Err(Error::not_implemented("pixel queries"))
}

pub fn install_remap_hook(_mappings: &[(Key, Key)]) -> Result<()> {
    Err(Error::not_implemented("key remapping"))
}

pub fn remove_remap_hook() -> Result<()> {
    Err(Error::not_implemented("key remapping"))
}
