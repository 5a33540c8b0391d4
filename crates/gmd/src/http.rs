//! HTTP control surface
//!
//! The router is a pure function over the shared state: method, path and
//! body in, status and JSON body out. The tiny_http loop below is only
//! transport. Errors cross the wire as the serialized structured
//! [`gm_core::Error`] with its mapped status code.

use crate::state::AppState;
use gm_core::{Error, MacroLog, Result};
use gm_system::{games, platform, LaunchEntry, RemapProfile};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Read;
use std::time::Duration;
use tracing::{debug, info};

pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

fn ok(body: Value) -> HttpResponse {
    HttpResponse { status: 200, body }
}

fn fail(error: Error) -> HttpResponse {
    HttpResponse {
        status: error.http_status(),
        body: serde_json::to_value(&error).unwrap_or_else(|_| json!({"message": "error"})),
    }
}

fn not_found(path: &str) -> HttpResponse {
    HttpResponse {
        status: 404,
        body: serde_json::to_value(Error::bad_request(format!("no route for {}", path)))
            .unwrap_or(Value::Null),
    }
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let raw = if body.is_empty() { b"{}" as &[u8] } else { body };
    Ok(serde_json::from_slice(raw)?)
}

#[derive(Deserialize)]
struct PlayMacroRequest {
    #[serde(rename = "macro")]
    log: MacroLog,
    #[serde(rename = "loop", default)]
    loop_playback: bool,
    /// Pause between repetitions, milliseconds.
    #[serde(default)]
    interval: u64,
}

#[derive(Deserialize)]
struct ClickerRequest {
    hwnd: i64,
    #[serde(default = "default_clicker_interval")]
    interval: u64,
}

fn default_clicker_interval() -> u64 {
    1000
}

#[derive(Deserialize)]
struct ExeRequest {
    exe: String,
}

#[derive(Deserialize)]
struct PidRequest {
    pid: u32,
}

#[derive(Deserialize)]
struct IpRequest {
    ip: String,
}

#[derive(Deserialize)]
struct RemapRequest {
    #[serde(default = "default_profile")]
    profile: RemapProfile,
}

fn default_profile() -> RemapProfile {
    RemapProfile::Classic
}

#[derive(Deserialize)]
struct PathRequest {
    path: String,
}

#[derive(Deserialize, Default)]
struct CheckColorRequest {
    x: Option<i32>,
    y: Option<i32>,
    color: Option<String>,
}

#[derive(Serialize)]
struct UsageRow {
    pid: u32,
    name: String,
    exe: Option<String>,
    speed: u64,
    blocked: bool,
}

/// Dispatch one request against the shared state.
pub fn route(state: &AppState, method: &str, path: &str, body: &[u8]) -> HttpResponse {
    match handle(state, method, path, body) {
        Ok(Some(resp)) => resp,
        Ok(None) => not_found(path),
        Err(e) => fail(e),
    }
}

fn handle(
    state: &AppState,
    method: &str,
    path: &str,
    body: &[u8],
) -> Result<Option<HttpResponse>> {
    let resp = match (method, path) {
        ("GET", "/status") => ok(serde_json::to_value(state.controller.status())?),

        ("POST", "/start-recording") => {
            state.controller.start_recording()?;
            ok(json!({"status": "started"}))
        }
        ("POST", "/stop-recording") => {
            let log = state.controller.stop_recording()?;
            ok(json!({"status": "stopped", "macro": log}))
        }
        ("POST", "/play-macro") => {
            let req: PlayMacroRequest = parse(body)?;
            state.controller.play(
                req.log,
                req.loop_playback,
                Duration::from_millis(req.interval),
            )?;
            ok(json!({"status": "playing"}))
        }
        ("POST", "/stop-playback") => {
            state.controller.stop_playback();
            ok(json!({"status": "stopped"}))
        }
        ("POST", "/start-background-clicker") => {
            let req: ClickerRequest = parse(body)?;
            state
                .controller
                .start_clicker(req.hwnd as isize, Duration::from_millis(req.interval))?;
            ok(json!({"status": "started"}))
        }

        ("GET", "/windows") => ok(serde_json::to_value(platform::list_windows())?),
        ("GET", "/scan-games") => ok(serde_json::to_value(games::scan())?),
        ("POST", "/launch-game") => {
            let req: PathRequest = parse(body)?;
            games::launch(&req.path)?;
            ok(json!({"status": "launched", "path": req.path}))
        }

        ("GET", "/boost/stats") => ok(serde_json::to_value(state.booster.stats()?)?),
        ("POST", "/boost/clean-ram") => ok(serde_json::to_value(state.booster.clean_ram())?),

        ("GET", "/network/usage") => {
            let rows: Vec<UsageRow> = state
                .monitor
                .top_consumers(10)
                .into_iter()
                .map(|u| UsageRow {
                    blocked: u
                        .exe
                        .as_deref()
                        .map(|exe| state.firewall.is_blocked(exe))
                        .unwrap_or(false),
                    pid: u.pid,
                    name: u.name,
                    exe: u.exe,
                    speed: u.speed,
                })
                .collect();
            ok(serde_json::to_value(rows)?)
        }
        ("POST", "/network/block") => {
            let req: ExeRequest = parse(body)?;
            state.firewall.block(&req.exe)?;
            ok(json!({"status": "blocked", "exe": req.exe}))
        }
        ("POST", "/network/unblock") => {
            let req: ExeRequest = parse(body)?;
            state.firewall.unblock(&req.exe)?;
            ok(json!({"status": "unblocked", "exe": req.exe}))
        }
        ("POST", "/network/clear") => {
            state.firewall.clear_all();
            ok(json!({"status": "cleared"}))
        }

        ("POST", "/ultra/enable") => {
            let req: PidRequest = parse(body)?;
            state.ultra.enable(req.pid)?;
            ok(json!({"status": "enabled"}))
        }
        ("POST", "/ultra/disable") => {
            state.ultra.disable()?;
            ok(json!({"status": "disabled"}))
        }

        ("GET", "/dns/benchmark") => ok(serde_json::to_value(state.dns.benchmark())?),
        ("POST", "/dns/set") => {
            let req: IpRequest = parse(body)?;
            state.dns.set_dns(&req.ip)?;
            ok(json!({"status": "set", "ip": req.ip}))
        }

        ("POST", "/remap/start") => {
            let req: RemapRequest = parse(body)?;
            state.remap.start(req.profile)?;
            ok(json!({"status": "started", "profile": req.profile}))
        }
        ("POST", "/remap/stop") => {
            state.remap.stop()?;
            ok(json!({"status": "stopped"}))
        }

        ("GET", "/autolaunch/config") => ok(serde_json::to_value(state.config.load()?)?),
        ("POST", "/autolaunch/save") => {
            let entries: Vec<LaunchEntry> = parse(body)?;
            state.config.save(&entries)?;
            ok(json!({"status": "saved"}))
        }

        ("GET", "/get-cursor-info") => ok(serde_json::to_value(platform::cursor_info()?)?),
        ("POST", "/check-color") => {
            let req: CheckColorRequest = parse(body)?;
            let (x, y) = match (req.x, req.y) {
                (Some(x), Some(y)) => (x, y),
                _ => {
                    let cursor = platform::cursor_info()?;
                    (cursor.x, cursor.y)
                }
            };
            let current = platform::pixel_at(x, y)?;
            let matched = req
                .color
                .as_deref()
                .map(|want| want.eq_ignore_ascii_case(&current))
                .unwrap_or(false);
            ok(json!({"x": x, "y": y, "color": current, "match": matched}))
        }

        _ => return Ok(None),
    };
    Ok(Some(resp))
}

/// Serve requests until the server is unblocked.
pub fn serve(server: &tiny_http::Server, state: &AppState) {
    for mut request in server.incoming_requests() {
        let mut body = Vec::new();
        if request.as_reader().read_to_end(&mut body).is_err() {
            body.clear();
        }

        let method = request.method().as_str().to_string();
        let path = request.url().to_string();
        let resp = route(state, &method, &path, &body);
        debug!(%method, %path, status = resp.status, "request");

        let mut reply = tiny_http::Response::from_string(resp.body.to_string())
            .with_status_code(resp.status);
        if let Ok(header) =
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        {
            reply = reply.with_header(header);
        }
        if let Err(e) = request.respond(reply) {
            info!(error = %e, "client hung up");
        }
    }
}
