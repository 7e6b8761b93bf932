//! Benchmark and page-cache record types.
//!
//! `BenchRecord` is one line of mmapbench CSV output. `CacheRecord` is one
//! page-cache sample taken by the cache sampler. Both serialize with the
//! column names the dashboard expects.

use serde::{Deserialize, Serialize};

/// Column header emitted by mmapbench as the first line of its output.
pub const CSV_HEADER: &str = "dev,seq,hint,threads,time,workGB,tlb,readGB,CPUwork";

/// First column of `CSV_HEADER`; a line starting with it is the header.
pub const HEADER_TOKEN: &str = "dev";

/// Number of columns a bench line must carry.
pub const CSV_FIELDS: usize = 9;

/// One benchmark measurement row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchRecord {
    pub dev: String,
    pub seq: i64,
    pub hint: i64,
    pub threads: i64,
    pub time: f64,
    #[serde(rename = "workGB")]
    pub work_gb: f64,
    pub tlb: i64,
    #[serde(rename = "readGB")]
    pub read_gb: f64,
    #[serde(rename = "CPUwork")]
    pub cpu_work: i64,
}

/// One page-cache sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Seconds since process start.
    pub time: f64,
    #[serde(rename = "cachePct")]
    pub cache_pct: f64,
    #[serde(rename = "cacheGB")]
    pub cache_gb: f64,
    #[serde(rename = "totalGB")]
    pub total_gb: f64,
}

impl CacheRecord {
    /// Builds a record from a raw reading, rounding the way the dashboard
    /// displays it (percent to 0.1, sizes to 0.01 GB).
    pub fn new(time: f64, cache_pct: f64, cache_gb: f64, total_gb: f64) -> Self {
        Self {
            time,
            cache_pct: round_to(cache_pct, 1),
            cache_gb: round_to(cache_gb, 2),
            total_gb: round_to(total_gb, 2),
        }
    }
}

/// Parses one CSV line into a `BenchRecord`.
///
/// Returns `None` for blank lines, the header line, short lines and lines
/// with a malformed numeric column. Columns past the ninth are ignored.
pub fn parse_bench_line(line: &str) -> Option<BenchRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < CSV_FIELDS {
        return None;
    }

    let dev = parts[0].trim();
    if dev == HEADER_TOKEN {
        return None;
    }

    Some(BenchRecord {
        dev: dev.to_string(),
        seq: parts[1].trim().parse().ok()?,
        hint: parts[2].trim().parse().ok()?,
        threads: parts[3].trim().parse().ok()?,
        time: parts[4].trim().parse().ok()?,
        work_gb: parts[5].trim().parse().ok()?,
        tlb: parts[6].trim().parse().ok()?,
        read_gb: parts[7].trim().parse().ok()?,
        cpu_work: parts[8].trim().parse().ok()?,
    })
}

/// Rounds `value` to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_line() {
        let rec = parse_bench_line("nvme0,1,2,4,1.5,10.2,33,9.8,500").unwrap();
        assert_eq!(rec.dev, "nvme0");
        assert_eq!(rec.seq, 1);
        assert_eq!(rec.hint, 2);
        assert_eq!(rec.threads, 4);
        assert!((rec.time - 1.5).abs() < 1e-9);
        assert!((rec.work_gb - 10.2).abs() < 1e-9);
        assert_eq!(rec.tlb, 33);
        assert!((rec.read_gb - 9.8).abs() < 1e-9);
        assert_eq!(rec.cpu_work, 500);
    }

    #[test]
    fn test_parse_skips_header_and_blank() {
        assert!(parse_bench_line(CSV_HEADER).is_none());
        assert!(parse_bench_line(" dev ,1,2,3,4,5,6,7,8").is_none());
        assert!(parse_bench_line("").is_none());
        assert!(parse_bench_line("   \t").is_none());
    }

    #[test]
    fn test_header_token_matches_header() {
        assert_eq!(CSV_HEADER.split(',').next(), Some(HEADER_TOKEN));
        assert_eq!(CSV_HEADER.split(',').count(), CSV_FIELDS);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_bench_line("nvme0,1,2,4,bad,10.2,33,9.8,500").is_none());
        assert!(parse_bench_line("nvme0,1,2,4,1.5,10.2,33,9.8").is_none());
        assert!(parse_bench_line("nvme0,1.5,2,4,1.5,10.2,33,9.8,500").is_none());
    }

    #[test]
    fn test_parse_tolerates_padding_and_extra_columns() {
        let rec = parse_bench_line("  sda , 7, 0, 8, 2.25, 1.0, 0, 0.5, 12,extra\r\n").unwrap();
        assert_eq!(rec.dev, "sda");
        assert_eq!(rec.seq, 7);
        assert_eq!(rec.cpu_work, 12);
    }

    #[test]
    fn test_bench_record_json_field_names() {
        let rec = parse_bench_line("nvme0,1,2,4,1.5,10.2,33,9.8,500").unwrap();
        let json = serde_json::to_value(&rec).unwrap();
        for key in ["dev", "seq", "hint", "threads", "time", "workGB", "tlb", "readGB", "CPUwork"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_cache_record_rounding() {
        let rec = CacheRecord::new(3.0, 42.04999, 1.23456, 15.999);
        assert_eq!(rec.cache_pct, 42.0);
        assert_eq!(rec.cache_gb, 1.23);
        assert_eq!(rec.total_gb, 16.0);

        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("cachePct").is_some());
        assert!(json.get("cacheGB").is_some());
        assert!(json.get("totalGB").is_some());
    }
}
