//! System counter readers backed by the /proc filesystem.
//!
//! This module provides stateless readers for per-core CPU tick counters
//! (`/proc/stat`) and page-cache occupancy (`/proc/meminfo`). The proc root
//! is a parameter so the readers can be pointed at a fake tree.

use ahash::AHashMap as HashMap;
use std::fs;
use std::path::Path;

const KB_PER_GB: f64 = 1024.0 * 1024.0;

/// Cumulative tick counters for one CPU core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoreTicks {
    /// Sum of every time column on the core's line.
    pub total: u64,
    /// Non-active time (idle + iowait).
    pub idle: u64,
}

/// Page-cache occupancy derived from /proc/meminfo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCacheReading {
    /// Cached + SReclaimable + Buffers as a percentage of MemTotal.
    pub cache_pct: f64,
    pub cache_gb: f64,
    pub total_gb: f64,
}

/// Reads per-core tick counters from `<proc_root>/stat`.
///
/// Cores are returned in file order, so index `i` refers to the same core
/// across calls.
pub fn read_cpu_ticks(proc_root: &Path) -> Result<Vec<CoreTicks>, String> {
    let path = proc_root.join("stat");
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_cpu_ticks(&content)
}

/// Parses the per-core `cpuN` lines of /proc/stat content.
///
/// The aggregate `cpu ` line is skipped.
/// Format: "cpu0 4705 150 1120 16250 520 0 30 0 0 0"
pub fn parse_cpu_ticks(content: &str) -> Result<Vec<CoreTicks>, String> {
    let mut cores = Vec::new();

    for line in content.lines() {
        if !line.starts_with("cpu") || line.starts_with("cpu ") {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            return Err(format!(
                "Invalid /proc/stat line for {}: expected at least 5 counters, got {}",
                parts[0],
                parts.len() - 1
            ));
        }

        let values = parts[1..]
            .iter()
            .map(|v| v.parse::<u64>())
            .collect::<Result<Vec<u64>, _>>()
            .map_err(|e| format!("Failed to parse counters for {}: {}", parts[0], e))?;

        cores.push(CoreTicks {
            total: values.iter().sum(),
            idle: values[3] + values[4],
        });
    }

    if cores.is_empty() {
        return Err("No per-core CPU statistics found in /proc/stat".to_string());
    }

    Ok(cores)
}

/// Reads page-cache occupancy from `<proc_root>/meminfo`.
pub fn read_page_cache(proc_root: &Path) -> Result<PageCacheReading, String> {
    let path = proc_root.join("meminfo");
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(parse_page_cache(&content))
}

/// Computes page-cache occupancy from /proc/meminfo content.
///
/// Missing keys default to 0 (MemTotal to 1 kB so the ratio stays finite).
/// Format: "Cached:          4194304 kB"
pub fn parse_page_cache(content: &str) -> PageCacheReading {
    let mut info: HashMap<&str, u64> = HashMap::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 {
            if let Ok(kb) = parts[1].parse::<u64>() {
                info.insert(parts[0].trim_end_matches(':'), kb);
            }
        }
    }

    let total_kb = info.get("MemTotal").copied().filter(|v| *v > 0).unwrap_or(1);
    let cached_kb = ["Cached", "SReclaimable", "Buffers"]
        .iter()
        .map(|key| info.get(key).copied().unwrap_or(0))
        .sum::<u64>();

    PageCacheReading {
        cache_pct: cached_kb as f64 / total_kb as f64 * 100.0,
        cache_gb: cached_kb as f64 / KB_PER_GB,
        total_gb: total_kb as f64 / KB_PER_GB,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  200 0 100 700 100 0 0 0 0 0\n\
                        cpu0 100 0 50 300 50 0 0 0 0 0\n\
                        cpu1 100 0 50 400 50 0 0 0 0 0\n\
                        intr 12345\n\
                        ctxt 67890\n";

    #[test]
    fn test_parse_cpu_ticks() {
        let cores = parse_cpu_ticks(STAT).unwrap();
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[0], CoreTicks { total: 500, idle: 350 });
        assert_eq!(cores[1], CoreTicks { total: 600, idle: 450 });
    }

    #[test]
    fn test_parse_cpu_ticks_without_cores() {
        assert!(parse_cpu_ticks("cpu  1 2 3 4 5\nintr 1\n").is_err());
        assert!(parse_cpu_ticks("").is_err());
    }

    #[test]
    fn test_parse_cpu_ticks_invalid() {
        assert!(parse_cpu_ticks("cpu0 1 2 x 4 5 6\n").is_err());
        assert!(parse_cpu_ticks("cpu0 1 2 3\n").is_err());
    }

    #[test]
    fn test_parse_page_cache() {
        let meminfo = "MemTotal:       16777216 kB\n\
                       MemFree:         8388608 kB\n\
                       Buffers:          524288 kB\n\
                       Cached:          3145728 kB\n\
                       SReclaimable:     524288 kB\n";
        let reading = parse_page_cache(meminfo);
        assert!((reading.cache_pct - 25.0).abs() < 1e-9);
        assert!((reading.cache_gb - 4.0).abs() < 1e-9);
        assert!((reading.total_gb - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_page_cache_missing_fields() {
        let reading = parse_page_cache("MemFree: 100 kB\n");
        assert_eq!(reading.cache_pct, 0.0);
        assert_eq!(reading.cache_gb, 0.0);
    }

    #[test]
    fn test_readers_use_proc_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stat"), STAT).unwrap();
        fs::write(dir.path().join("meminfo"), "MemTotal: 1048576 kB\nCached: 524288 kB\n").unwrap();

        assert_eq!(read_cpu_ticks(dir.path()).unwrap().len(), 2);
        let reading = read_page_cache(dir.path()).unwrap();
        assert!((reading.cache_pct - 50.0).abs() < 1e-9);

        let missing = dir.path().join("nope");
        assert!(read_cpu_ticks(&missing).is_err());
        assert!(read_page_cache(&missing).is_err());
    }
}
