//! Ingest task: reads the benchmark CSV feed into the bench store.
//!
//! The task runs until the input reaches EOF or fails to read, then sets the
//! `feed_ended` latch exactly once. Unparseable lines are dropped without
//! being reported; only a read failure is logged as an error.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, trace};

use crate::record::parse_bench_line;
use crate::state::SharedState;

/// Boxed line source: a file or stdin.
pub type FeedReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Opens the input feed: the given file, or stdin when `path` is `None`.
pub async fn open_feed(path: Option<&Path>) -> Result<FeedReader> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input file {}", path.display()))?;
            info!("Reading benchmark rows from {}", path.display());
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            info!("Reading benchmark rows from stdin");
            Ok(Box::new(BufReader::new(tokio::io::stdin())))
        }
    }
}

/// Reads `reader` line by line into the bench store until it ends.
///
/// Always sets the `feed_ended` latch before returning, whether the input
/// ended normally or with an I/O error.
pub async fn run_ingest<R>(reader: R, state: SharedState)
where
    R: AsyncBufRead + Unpin,
{
    let stores = &state.stores;
    let metrics = &state.metrics;
    let mut lines = reader.lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_bench_line(&line) {
                Some(record) => {
                    stores.bench.append(record);
                    metrics.bench_rows.inc();
                }
                None => {
                    trace!("Discarding input line: {:?}", line);
                    metrics.lines_discarded.inc();
                }
            },
            Ok(None) => {
                debug!("Input reached EOF");
                break;
            }
            Err(e) => {
                error!("reader error: {}", e);
                break;
            }
        }
    }

    if stores.feed_ended.set() {
        metrics.feed_ended.set(1.0);
    }
    info!(
        "reader: input ended after {} rows, server still running",
        stores.bench.len()
    );
}
