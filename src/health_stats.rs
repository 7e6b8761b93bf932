//! Internal server statistics rendered by the `/health` endpoint.

use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

#[derive(Clone, Copy, Default)]
struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

#[derive(Default)]
struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// (last, avg, max, min, count)
    fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Request and streaming statistics collected by the HTTP handlers.
pub struct HealthStats {
    started: Instant,
    http_requests: AtomicU64,
    stream_sessions: AtomicU64,
    stream_events: AtomicU64,
    rows_per_event: Stat,
    stream_duration_seconds: Stat,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            http_requests: AtomicU64::new(0),
            stream_sessions: AtomicU64::new(0),
            stream_events: AtomicU64::new(0),
            rows_per_event: Stat::default(),
            stream_duration_seconds: Stat::default(),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_http_request(&self) {
        self.http_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stream_opened(&self) {
        self.stream_sessions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one delta event carrying `rows` bench + cache rows.
    pub fn record_stream_event(&self, rows: usize) {
        self.stream_events.fetch_add(1, Ordering::Relaxed);
        self.rows_per_event.add_sample(rows as f64);
    }

    pub fn record_stream_closed(&self, duration_seconds: f64) {
        self.stream_duration_seconds.add_sample(duration_seconds);
    }

    pub fn http_requests(&self) -> u64 {
        self.http_requests.load(Ordering::Relaxed)
    }

    pub fn stream_sessions(&self) -> u64 {
        self.stream_sessions.load(Ordering::Relaxed)
    }

    /// Streams that have closed, whether by `done` or by the client leaving.
    pub fn stream_sessions_closed(&self) -> u64 {
        self.stream_duration_seconds.snapshot().4
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn render_table(&self) -> String {
        let (re_cur, re_avg, re_max, re_min, _re_count) = self.rows_per_event.snapshot();
        let (sd_cur, sd_avg, sd_max, sd_min, sd_count) = self.stream_duration_seconds.snapshot();

        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "metric",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out, "{}", "-".repeat(left_col + 3 + (col_w + 3) * 4)).ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "rows per stream event",
            format!("{:.0}", re_cur),
            format!("{:.1}", re_avg),
            format!("{:.0}", re_max),
            format!("{:.0}", re_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "stream duration (s)",
            format!("{:.1}", sd_cur),
            format!("{:.1}", sd_avg),
            format!("{:.1}", sd_max),
            format!("{:.1}", sd_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "uptime (s): {}", self.uptime_seconds()).ok();
        writeln!(out, "http requests: {}", self.http_requests()).ok();
        writeln!(
            out,
            "stream sessions: {} opened, {} closed",
            self.stream_sessions(),
            sd_count
        )
        .ok();
        writeln!(
            out,
            "stream events sent: {}",
            self.stream_events.load(Ordering::Relaxed)
        )
        .ok();

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stat() {
        let mut stat = RunningStat::default();
        assert_eq!(stat.avg(), 0.0);
        stat.add(4.0);
        stat.add(2.0);
        stat.add(6.0);
        assert_eq!(stat.count, 3);
        assert_eq!(stat.min, 2.0);
        assert_eq!(stat.max, 6.0);
        assert_eq!(stat.last, 6.0);
        assert!((stat.avg() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_table_counts() {
        let stats = HealthStats::new();
        stats.record_http_request();
        stats.record_http_request();
        stats.record_stream_opened();
        stats.record_stream_event(5);
        assert_eq!(stats.stream_sessions_closed(), 0);
        stats.record_stream_closed(1.5);
        assert_eq!(stats.stream_sessions_closed(), 1);

        let table = stats.render_table();
        assert!(table.contains("rows per stream event"));
        assert!(table.contains("http requests: 2"));
        assert!(table.contains("stream sessions: 1 opened, 1 closed"));
        assert!(table.contains("stream events sent: 1"));
    }
}
