//! Process-level default metrics.
//!
//! Everywhere: start time and uptime. On Linux additionally CPU time (user,
//! system, total), resident and virtual memory, and open/max file
//! descriptors, all read from `/proc/self` on each scrape.

use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::metrics::encode;
use crate::metrics::registry::Collector;

const CPU_USER: &str = "process_cpu_user_seconds_total";
const CPU_SYSTEM: &str = "process_cpu_system_seconds_total";
const CPU_TOTAL: &str = "process_cpu_seconds_total";
const START_TIME: &str = "process_start_time_seconds";
const UPTIME: &str = "process_uptime_seconds";
const RESIDENT_MEMORY: &str = "process_resident_memory_bytes";
const VIRTUAL_MEMORY: &str = "process_virtual_memory_bytes";
const OPEN_FDS: &str = "process_open_fds";
const MAX_FDS: &str = "process_max_fds";

/// `/proc` reports CPU times in USER_HZ, fixed at 100 by the kernel ABI.
const CLOCK_TICKS_PER_SEC: f64 = 100.0;

pub struct ProcessCollector {
    start_unix: f64,
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector {
    /// Reads the kernel's process start time; falls back to "now" when
    /// `/proc` is unavailable.
    pub fn new() -> Self {
        let start_unix = linux::start_time_unix().unwrap_or_else(unix_now);
        Self { start_unix }
    }

    /// Process start, in seconds since the unix epoch.
    pub fn start_time(&self) -> f64 {
        self.start_unix
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

fn write_sample(out: &mut String, name: &str, help: &str, kind: &str, v: f64) {
    encode::write_header(out, name, help, kind);
    let _ = writeln!(out, "{} {}", name, encode::fmt_float(v));
}

/// CPU times in clock ticks, from `/proc/self/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatTimes {
    pub utime: u64,
    pub stime: u64,
    pub starttime: u64,
}

/// Parse `/proc/<pid>/stat`. The command name (field 2) is parenthesised and
/// may contain spaces, so fields are counted from the last `)`.
pub fn parse_stat(stat: &str) -> Option<StatTimes> {
    let rest = &stat[stat.rfind(')')? + 1..];
    // rest starts at field 3 (state)
    let fields: Vec<&str> = rest.split_whitespace().collect();
    let field = |n: usize| fields.get(n - 3)?.parse::<u64>().ok();
    Some(StatTimes {
        utime: field(14)?,
        stime: field(15)?,
        starttime: field(22)?,
    })
}

/// Value of a `Key:   1234 kB` line from `/proc/<pid>/status`, in bytes.
pub fn parse_status_bytes(status: &str, key: &str) -> Option<f64> {
    let line = status
        .lines()
        .find(|l| l.split(':').next() == Some(key))?;
    let kb: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024.0)
}

/// Soft limit from the `Max open files` line of `/proc/<pid>/limits`.
/// `None` when unlimited or missing.
pub fn parse_max_fds(limits: &str) -> Option<f64> {
    let line = limits.lines().find(|l| l.starts_with("Max open files"))?;
    line["Max open files".len()..]
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

/// Boot time (`btime`) from `/proc/stat`, unix seconds.
pub fn parse_btime(stat: &str) -> Option<u64> {
    stat.lines()
        .find_map(|l| l.strip_prefix("btime "))?
        .trim()
        .parse()
        .ok()
}

#[cfg(target_os = "linux")]
mod linux {
    use std::fs;

    use super::*;

    pub(super) fn start_time_unix() -> Option<f64> {
        let times = parse_stat(&fs::read_to_string("/proc/self/stat").ok()?)?;
        let btime = parse_btime(&fs::read_to_string("/proc/stat").ok()?)?;
        Some(btime as f64 + times.starttime as f64 / CLOCK_TICKS_PER_SEC)
    }

    pub(super) fn stat_times() -> Option<StatTimes> {
        parse_stat(&fs::read_to_string("/proc/self/stat").ok()?)
    }

    pub(super) fn status() -> Option<String> {
        fs::read_to_string("/proc/self/status").ok()
    }

    pub(super) fn open_fds() -> Option<f64> {
        fs::read_dir("/proc/self/fd").ok().map(|d| d.count() as f64)
    }

    pub(super) fn max_fds() -> Option<f64> {
        parse_max_fds(&fs::read_to_string("/proc/self/limits").ok()?)
    }
}

#[cfg(not(target_os = "linux"))]
mod linux {
    use super::StatTimes;

    pub(super) fn start_time_unix() -> Option<f64> {
        None
    }
    pub(super) fn stat_times() -> Option<StatTimes> {
        None
    }
    pub(super) fn status() -> Option<String> {
        None
    }
    pub(super) fn open_fds() -> Option<f64> {
        None
    }
    pub(super) fn max_fds() -> Option<f64> {
        None
    }
}

impl Collector for ProcessCollector {
    fn names(&self) -> Vec<&str> {
        vec![
            CPU_USER,
            CPU_SYSTEM,
            CPU_TOTAL,
            START_TIME,
            UPTIME,
            RESIDENT_MEMORY,
            VIRTUAL_MEMORY,
            OPEN_FDS,
            MAX_FDS,
        ]
    }

    fn encode(&self, out: &mut String) {
        // Unreadable sources are skipped for this scrape.
        if let Some(t) = linux::stat_times() {
            let user = t.utime as f64 / CLOCK_TICKS_PER_SEC;
            let system = t.stime as f64 / CLOCK_TICKS_PER_SEC;
            write_sample(out, CPU_USER, "Total user CPU time spent in seconds.", "counter", user);
            write_sample(out, CPU_SYSTEM, "Total system CPU time spent in seconds.", "counter", system);
            write_sample(
                out,
                CPU_TOTAL,
                "Total user and system CPU time spent in seconds.",
                "counter",
                user + system,
            );
        }

        write_sample(
            out,
            START_TIME,
            "Start time of the process since unix epoch in seconds.",
            "gauge",
            self.start_unix,
        );
        write_sample(
            out,
            UPTIME,
            "Seconds since the process started.",
            "gauge",
            (unix_now() - self.start_unix).max(0.0),
        );

        if let Some(status) = linux::status() {
            if let Some(rss) = parse_status_bytes(&status, "VmRSS") {
                write_sample(out, RESIDENT_MEMORY, "Resident memory size in bytes.", "gauge", rss);
            }
            if let Some(vsz) = parse_status_bytes(&status, "VmSize") {
                write_sample(out, VIRTUAL_MEMORY, "Virtual memory size in bytes.", "gauge", vsz);
            }
        }
        if let Some(fds) = linux::open_fds() {
            write_sample(out, OPEN_FDS, "Number of open file descriptors.", "gauge", fds);
        }
        if let Some(max) = linux::max_fds() {
            write_sample(out, MAX_FDS, "Maximum number of open file descriptors.", "gauge", max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_fields_are_counted_after_comm() {
        // comm with spaces and a ')' inside
        let stat = "4242 (my (odd) proc) S 1 4242 4242 0 -1 4194560 900 0 0 0 \
                    250 75 0 0 20 0 4 0 123456 98765432 1500 18446744073709551615";
        assert_eq!(
            parse_stat(stat),
            Some(StatTimes {
                utime: 250,
                stime: 75,
                starttime: 123456
            })
        );
        assert_eq!(parse_stat("garbage"), None);
        assert_eq!(parse_stat("1 (x) S 1 2"), None);
    }

    #[test]
    fn status_lines_convert_kb_to_bytes() {
        let status = "Name:\tpulsewatch\nVmSize:\t  204800 kB\nVmRSS:\t    1024 kB\n";
        assert_eq!(parse_status_bytes(status, "VmRSS"), Some(1024.0 * 1024.0));
        assert_eq!(parse_status_bytes(status, "VmSize"), Some(204800.0 * 1024.0));
        assert_eq!(parse_status_bytes(status, "VmSwap"), None);
    }

    #[test]
    fn max_fds_reads_soft_limit() {
        let limits = "Limit                     Soft Limit           Hard Limit           Units     \n\
                      Max cpu time              unlimited            unlimited            seconds   \n\
                      Max open files            1024                 524288               files     \n";
        assert_eq!(parse_max_fds(limits), Some(1024.0));

        let unlimited = "Max open files            unlimited            unlimited            files\n";
        assert_eq!(parse_max_fds(unlimited), None);
    }

    #[test]
    fn btime_is_parsed() {
        let stat = "cpu  1 2 3 4\nintr 5\nbtime 1700000000\nprocesses 99\n";
        assert_eq!(parse_btime(stat), Some(1_700_000_000));
        assert_eq!(parse_btime("cpu 1\n"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn start_time_is_before_now() {
        let c = ProcessCollector::new();
        let now = unix_now();
        assert!(c.start_time() <= now + 1.0);
        assert!(c.start_time() > now - 86_400.0 * 365.0);
    }
}
