//! Windows system integration
//!
//! Toolhelp snapshots for process enumeration, per-process IO counters
//! for the network monitor, priority/termination/memory calls for the
//! boosters, EnumWindows for the clicker target list, GDI for pixel
//! queries and one low-level keyboard hook for remapping.

use super::{CursorInfo, PriorityClass, ProcessInfo, WindowInfo};
use crate::boost::SystemStats;
use crate::monitor::{IoSample, IoSampler};
use gm_core::{Error, ErrorCode, Key, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::error;

use windows::Win32::Foundation::{CloseHandle, FILETIME, HANDLE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetDC, GetPixel, ReleaseDC};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::ProcessStatus::{
    K32GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS,
};
use windows::Win32::System::SystemInformation::{GlobalMemoryStatusEx, MEMORYSTATUSEX};
use windows::Win32::System::Threading::{
    GetProcessIoCounters, GetSystemTimes, OpenProcess, QueryFullProcessImageNameW,
    SetPriorityClass, TerminateProcess, HIGH_PRIORITY_CLASS, IDLE_PRIORITY_CLASS, IO_COUNTERS,
    NORMAL_PRIORITY_CLASS, PROCESS_NAME_WIN32, PROCESS_QUERY_INFORMATION,
    PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_SET_INFORMATION, PROCESS_TERMINATE,
    PROCESS_VM_READ,
};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
    VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, EnumWindows, GetCursorPos, GetWindowTextLengthW,
    GetWindowTextW, IsWindowVisible, PeekMessageW, SetWindowsHookExW, TranslateMessage,
    UnhookWindowsHookEx, KBDLLHOOKSTRUCT, LLKHF_INJECTED, MSG, PM_REMOVE, WH_KEYBOARD_LL,
    WM_KEYDOWN, WM_KEYUP, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

fn os_err(context: &str, e: windows::core::Error) -> Error {
    Error::new(ErrorCode::Unknown, format!("{}: {:?}", context, e))
}

/// Closes the process handle when the scope ends.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn open(pid: u32, access: windows::Win32::System::Threading::PROCESS_ACCESS_RIGHTS) -> Result<OwnedHandle> {
    let handle = unsafe { OpenProcess(access, false, pid) }
        .map_err(|e| os_err("OpenProcess", e))?;
    Ok(OwnedHandle(handle))
}

fn exe_path(pid: u32) -> Option<String> {
    let handle = open(pid, PROCESS_QUERY_LIMITED_INFORMATION).ok()?;
    let mut buf = [0u16; 1024];
    let mut len = buf.len() as u32;
    unsafe {
        QueryFullProcessImageNameW(
            handle.0,
            PROCESS_NAME_WIN32,
            windows::core::PWSTR(buf.as_mut_ptr()),
            &mut len,
        )
        .ok()?;
    }
    Some(String::from_utf16_lossy(&buf[..len as usize]))
}

pub fn process_list() -> Vec<ProcessInfo> {
    let snapshot = match unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) } {
        Ok(h) => OwnedHandle(h),
        Err(e) => {
            error!("process snapshot failed: {:?}", e);
            return Vec::new();
        }
    };

    let mut list = Vec::new();
    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    if unsafe { Process32FirstW(snapshot.0, &mut entry) }.is_err() {
        return list;
    }
    loop {
        let name_len = entry
            .szExeFile
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(entry.szExeFile.len());
        let name = String::from_utf16_lossy(&entry.szExeFile[..name_len]);
        let pid = entry.th32ProcessID;
        list.push(ProcessInfo {
            pid,
            name,
            exe: exe_path(pid),
        });

        if unsafe { Process32NextW(snapshot.0, &mut entry) }.is_err() {
            break;
        }
    }
    list
}

struct SystemIoSampler;

impl IoSampler for SystemIoSampler {
    fn sample(&self) -> Vec<IoSample> {
        process_list()
            .into_iter()
            .filter_map(|proc| {
                let handle = open(proc.pid, PROCESS_QUERY_INFORMATION).ok()?;
                let mut io = IO_COUNTERS::default();
                unsafe { GetProcessIoCounters(handle.0, &mut io) }.ok()?;
                Some(IoSample {
                    pid: proc.pid,
                    name: proc.name,
                    exe: proc.exe,
                    bytes: io.ReadTransferCount + io.WriteTransferCount,
                })
            })
            .collect()
    }
}

pub fn io_sampler() -> Box<dyn IoSampler> {
    Box::new(SystemIoSampler)
}

pub fn set_priority(pid: u32, class: PriorityClass) -> Result<()> {
    let class = match class {
        PriorityClass::High => HIGH_PRIORITY_CLASS,
        PriorityClass::Normal => NORMAL_PRIORITY_CLASS,
        PriorityClass::Idle => IDLE_PRIORITY_CLASS,
    };
    let handle = open(pid, PROCESS_SET_INFORMATION | PROCESS_QUERY_INFORMATION)?;
    unsafe { SetPriorityClass(handle.0, class) }.map_err(|e| os_err("SetPriorityClass", e))
}

pub fn terminate(pid: u32) -> Result<()> {
    let handle = open(pid, PROCESS_TERMINATE)?;
    unsafe { TerminateProcess(handle.0, 1) }.map_err(|e| os_err("TerminateProcess", e))
}

pub fn process_memory(pid: u32) -> Result<u64> {
    let handle = open(pid, PROCESS_QUERY_INFORMATION | PROCESS_VM_READ)?;
    let mut counters = PROCESS_MEMORY_COUNTERS {
        cb: std::mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32,
        ..Default::default()
    };
    let ok = unsafe {
        K32GetProcessMemoryInfo(handle.0, &mut counters, counters.cb)
    };
    if !ok.as_bool() {
        return Err(Error::new(ErrorCode::Unknown, "GetProcessMemoryInfo failed"));
    }
    Ok(counters.WorkingSetSize as u64)
}

fn filetime_u64(ft: FILETIME) -> u64 {
    ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64
}

fn system_times() -> Result<(u64, u64, u64)> {
    let mut idle = FILETIME::default();
    let mut kernel = FILETIME::default();
    let mut user = FILETIME::default();
    unsafe { GetSystemTimes(Some(&mut idle), Some(&mut kernel), Some(&mut user)) }
        .map_err(|e| os_err("GetSystemTimes", e))?;
    Ok((
        filetime_u64(idle),
        filetime_u64(kernel),
        filetime_u64(user),
    ))
}

pub fn system_stats() -> Result<SystemStats> {
    let mut mem = MEMORYSTATUSEX {
        dwLength: std::mem::size_of::<MEMORYSTATUSEX>() as u32,
        ..Default::default()
    };
    unsafe { GlobalMemoryStatusEx(&mut mem) }.map_err(|e| os_err("GlobalMemoryStatusEx", e))?;

    // Kernel time includes idle time; busy = (kernel - idle) + user.
    let (idle_a, kernel_a, user_a) = system_times()?;
    thread::sleep(Duration::from_millis(100));
    let (idle_b, kernel_b, user_b) = system_times()?;

    let idle = idle_b.saturating_sub(idle_a);
    let total = kernel_b.saturating_sub(kernel_a) + user_b.saturating_sub(user_a);
    let cpu_percent = if total == 0 {
        0.0
    } else {
        (total.saturating_sub(idle)) as f32 / total as f32 * 100.0
    };

    Ok(SystemStats {
        ram_total: mem.ullTotalPhys,
        ram_available: mem.ullAvailPhys,
        ram_percent: mem.dwMemoryLoad as f32,
        cpu_percent,
    })
}

unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> windows::Win32::Foundation::BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<WindowInfo>);
    if IsWindowVisible(hwnd).as_bool() {
        let len = GetWindowTextLengthW(hwnd);
        if len > 0 {
            let mut buf = vec![0u16; len as usize + 1];
            let copied = GetWindowTextW(hwnd, &mut buf);
            if copied > 0 {
                windows.push(WindowInfo {
                    hwnd: hwnd.0 as isize,
                    title: String::from_utf16_lossy(&buf[..copied as usize]),
                });
            }
        }
    }
    true.into()
}

pub fn list_windows() -> Vec<WindowInfo> {
    let mut windows: Vec<WindowInfo> = Vec::new();
    unsafe {
        let _ = EnumWindows(
            Some(enum_proc),
            LPARAM(&mut windows as *mut Vec<WindowInfo> as isize),
        );
    }
    windows
}

pub fn cursor_info() -> Result<CursorInfo> {
    let mut point = windows::Win32::Foundation::POINT::default();
    unsafe { GetCursorPos(&mut point) }.map_err(|e| os_err("GetCursorPos", e))?;
    let color = pixel_at(point.x, point.y)?;
    Ok(CursorInfo {
        x: point.x,
        y: point.y,
        color,
    })
}

pub fn pixel_at(x: i32, y: i32) -> Result<String> {
    unsafe {
        let hdc = GetDC(None);
        let color = GetPixel(hdc, x, y);
        ReleaseDC(None, hdc);
        // COLORREF is 0x00bbggrr
        let c = color.0;
        Ok(format!(
            "#{:02x}{:02x}{:02x}",
            c & 0xFF,
            (c >> 8) & 0xFF,
            (c >> 16) & 0xFF
        ))
    }
}

// Remap hook. One keyboard hook at a time; the vk map is swapped under
// the mutex and the hook thread pumps until stopped.

static REMAP_MAP: Mutex<Option<HashMap<u16, u16>>> = Mutex::new(None);
static REMAP_HOOK: Mutex<Option<RemapHook>> = Mutex::new(None);

struct RemapHook {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

pub fn install_remap_hook(mappings: &[(Key, Key)]) -> Result<()> {
    remove_remap_hook()?;

    let map: HashMap<u16, u16> = mappings
        .iter()
        .map(|(src, dst)| (src.vk(), dst.vk()))
        .collect();
    *REMAP_MAP.lock() = Some(map);

    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = stop.clone();
    let thread = thread::spawn(move || {
        let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(remap_proc), None, 0) } {
            Ok(h) => h,
            Err(e) => {
                error!("remap hook install failed: {:?}", e);
                *REMAP_MAP.lock() = None;
                return;
            }
        };
        while !thread_stop.load(Ordering::SeqCst) {
            unsafe {
                let mut msg = MSG::default();
                while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
            thread::sleep(Duration::from_millis(10));
        }
        unsafe {
            let _ = UnhookWindowsHookEx(hook);
        }
    });

    *REMAP_HOOK.lock() = Some(RemapHook {
        stop,
        thread: Some(thread),
    });
    Ok(())
}

pub fn remove_remap_hook() -> Result<()> {
    if let Some(mut hook) = REMAP_HOOK.lock().take() {
        hook.stop.store(true, Ordering::SeqCst);
        if let Some(t) = hook.thread.take() {
            let _ = t.join();
        }
    }
    *REMAP_MAP.lock() = None;
    Ok(())
}

unsafe extern "system" fn remap_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 {
        let info = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
        // Our own synthetic keys carry the injected flag; passing them
        // through prevents remap loops.
        let injected = info.flags.0 & LLKHF_INJECTED.0 != 0;
        if !injected {
            let replacement = REMAP_MAP
                .lock()
                .as_ref()
                .and_then(|m| m.get(&(info.vkCode as u16)).copied());
            if let Some(vk) = replacement {
                let msg = wparam.0 as u32;
                let key_up = matches!(msg, WM_KEYUP | WM_SYSKEYUP);
                if key_up || matches!(msg, WM_KEYDOWN | WM_SYSKEYDOWN) {
                    send_key(vk, key_up);
                    // Swallow the source key.
                    return LRESULT(1);
                }
            }
        }
    }
    CallNextHookEx(None, code, wparam, lparam)
}

fn send_key(vk: u16, key_up: bool) {
    let flags = if key_up {
        KEYEVENTF_KEYUP
    } else {
        KEYBD_EVENT_FLAGS(0)
    };
    let input = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    unsafe {
        SendInput(&[input], std::mem::size_of::<INPUT>() as i32);
    }
}
