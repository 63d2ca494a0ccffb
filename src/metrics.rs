//! Run metrics for the normalizer
//!
//! Counters are labelled by venue. Runs are short-lived, so no HTTP listener is
//! started; the snapshot is rendered in-process and optionally written to a file.

use std::fs;
use std::path::Path;
use std::sync::{Once, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

use crate::error::{NormalizeError, Result};
use crate::pipeline::record::BatchStats;

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("metrics handle already set");
            }
            info!("prometheus recorder installed");
        }
        Err(e) => warn!("failed to install prometheus recorder: {}", e),
    });
}

/// Current snapshot in Prometheus text format, if the recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

/// Write the current snapshot to `path`. No-op when metrics were never initialized.
pub fn write_snapshot(path: &Path) -> Result<()> {
    let Some(text) = render() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    info!(path = %path.display(), "metrics snapshot written");
    Ok(())
}

/// Record the counts of one successfully normalized file
pub fn record_file(venue: &str, stats: &BatchStats) {
    let venue = venue.to_string();
    let counters = [
        ("booking_rows_read_total", stats.input_rows),
        ("booking_rows_normalized_total", stats.output_rows),
        ("booking_duplicate_rows_total", stats.duplicate_rows_dropped),
        ("booking_disallowed_room_rows_total", stats.disallowed_room_rows),
        ("booking_floored_anchors_total", stats.floored_anchors),
        ("booking_default_prices_total", stats.default_prices),
        ("booking_voucher_rows_total", stats.voucher_rows),
        ("booking_unparseable_times_total", stats.unparseable_times),
        ("booking_unparseable_durations_total", stats.unparseable_durations),
        ("booking_room_passthroughs_total", stats.room_passthroughs),
    ];
    for (name, value) in counters {
        ::metrics::counter!(name, "venue" => venue.clone()).increment(value as u64);
    }
    ::metrics::counter!("booking_files_processed_total", "venue" => venue).increment(1);
}

pub fn record_file_failure(venue: &str, error: &NormalizeError) {
    let kind = match error {
        NormalizeError::MissingYear { .. } => "missing_year",
        NormalizeError::UnresolvedRoom { .. } => "unresolved_room",
        NormalizeError::MissingColumn { .. } => "missing_column",
        NormalizeError::Csv(_) => "csv",
        NormalizeError::Io(_) => "io",
        _ => "other",
    };
    ::metrics::counter!("booking_files_failed_total", "venue" => venue.to_string(), "kind" => kind).increment(1);
}

/// A worker task died before it could report on its file
pub fn record_task_failure(venue: &str) {
    ::metrics::counter!("booking_files_failed_total", "venue" => venue.to_string(), "kind" => "task").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_snapshot_without_recorder_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.prom");
        if render().is_none() {
            write_snapshot(&path).unwrap();
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_recording_without_recorder_does_not_panic() {
        record_file("kaunas", &BatchStats::default());
        record_file_failure("kaunas", &NormalizeError::MissingYear { file: "x.csv".into() });
    }
}
