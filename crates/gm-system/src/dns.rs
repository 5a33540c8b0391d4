//! DNS benchmark and selection
//!
//! A fixed table of public resolvers, a one-packet ping per resolver, and
//! a netsh apply. Unreachable resolvers score a sentinel latency so they
//! sort last instead of vanishing from the result.

use gm_core::{Error, Result};
use serde::Serialize;
use tracing::info;

/// Latency reported for a resolver that did not answer in time.
pub const UNREACHABLE_MS: u32 = 999;

#[derive(Debug, Clone, Copy)]
pub struct DnsProvider {
    pub name: &'static str,
    pub ip: &'static str,
}

pub const PROVIDERS: [DnsProvider; 4] = [
    DnsProvider { name: "Google", ip: "8.8.8.8" },
    DnsProvider { name: "Cloudflare", ip: "1.1.1.1" },
    DnsProvider { name: "OpenDNS", ip: "208.67.222.222" },
    DnsProvider { name: "Quad9", ip: "9.9.9.9" },
];

#[derive(Debug, Clone, Serialize)]
pub struct DnsBenchmark {
    pub name: &'static str,
    pub ip: &'static str,
    pub latency: u32,
}

#[derive(Default)]
pub struct DnsManager;

impl DnsManager {
    pub fn new() -> Self {
        Self
    }

    /// IP for a provider name, used by auto-launch `set_dns` actions.
    pub fn provider_ip(&self, name: &str) -> Option<&'static str> {
        PROVIDERS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.ip)
    }

    /// Ping every provider once and return them fastest-first.
    pub fn benchmark(&self) -> Vec<DnsBenchmark> {
        let mut results: Vec<DnsBenchmark> = PROVIDERS
            .iter()
            .map(|p| DnsBenchmark {
                name: p.name,
                ip: p.ip,
                latency: ping_ms(p.ip).unwrap_or(UNREACHABLE_MS),
            })
            .collect();
        results.sort_by_key(|r| r.latency);
        results
    }

    /// Point the Wi-Fi and Ethernet interfaces at `ip`.
    pub fn set_dns(&self, ip: &str) -> Result<()> {
        if ip.is_empty() {
            return Err(Error::bad_request("no DNS ip given"));
        }
        for interface in ["Wi-Fi", "Ethernet"] {
            // One of the two usually does not exist; apply best effort.
            let _ = run_netsh_set(interface, ip);
        }
        info!(ip, "dns set");
        Ok(())
    }
}

/// Extract the round-trip time from one line of ping output
/// (`time=14ms`, `time<1ms`, `time=14.2 ms`).
pub fn parse_latency(output: &str) -> Option<u32> {
    let idx = output.find("time=").or_else(|| output.find("time<"))?;
    let rest = &output[idx + 5..];
    let number: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse::<f64>().ok().map(|ms| ms.round() as u32)
}

fn ping_ms(ip: &str) -> Option<u32> {
    #[cfg(target_os = "windows")]
    let args = ["-n", "1", "-w", "1000", ip];
    #[cfg(not(target_os = "windows"))]
    let args = ["-c", "1", "-W", "1", ip];

    let output = std::process::Command::new("ping").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_latency(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(target_os = "windows")]
fn run_netsh_set(interface: &str, ip: &str) -> Result<()> {
    let status = std::process::Command::new("netsh")
        .args([
            "interface",
            "ip",
            "set",
            "dns",
            interface,
            "static",
            ip,
        ])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()?;
    if !status.success() {
        return Err(Error::bad_request(format!(
            "netsh exited with {}",
            status
        )));
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run_netsh_set(_interface: &str, _ip: &str) -> Result<()> {
    Err(Error::not_implemented("dns configuration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_windows_ping_output() {
        let out = "Reply from 8.8.8.8: bytes=32 time=14ms TTL=118";
        assert_eq!(parse_latency(out), Some(14));
    }

    #[test]
    fn parses_sub_millisecond_replies() {
        let out = "Reply from 1.1.1.1: bytes=32 time<1ms TTL=57";
        assert_eq!(parse_latency(out), Some(1));
    }

    #[test]
    fn parses_fractional_times() {
        let out = "64 bytes from 9.9.9.9: icmp_seq=1 ttl=58 time=23.6 ms";
        assert_eq!(parse_latency(out), Some(24));
    }

    #[test]
    fn missing_time_is_none() {
        assert_eq!(parse_latency("Request timed out."), None);
    }

    #[test]
    fn provider_lookup_is_case_insensitive() {
        let dns = DnsManager::new();
        assert_eq!(dns.provider_ip("cloudflare"), Some("1.1.1.1"));
        assert_eq!(dns.provider_ip("Quad9"), Some("9.9.9.9"));
        assert_eq!(dns.provider_ip("nope"), None);
    }
}
