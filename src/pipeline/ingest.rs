use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::constants::CLEANED_PREFIX;
use crate::error::{NormalizeError, Result};
use crate::metrics;
use crate::pipeline::record::{BatchStats, RecordPipeline};
use crate::pipeline::table::Table;
use crate::types::CanonicalBookingRecord;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").expect("static regex"));

/// Year encoded in a file name, e.g. `data_2023.csv`
pub fn detect_year(path: &Path) -> Result<i32> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    YEAR_RE
        .captures(&name)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or(NormalizeError::MissingYear { file: name })
}

/// Files in `dir` whose names start with `prefix` and end with `suffix`, sorted by name
pub fn discover(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .is_some_and(|n| n.starts_with(prefix) && n.ends_with(suffix));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Where the canonical file for `input` is written
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    output_dir.join(format!("{CLEANED_PREFIX}{name}"))
}

/// Outcome of normalizing one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: String,
    pub output: Option<String>,
    pub year: Option<i32>,
    pub stats: Option<BatchStats>,
    pub error: Option<String>,
}

/// Outcome of a whole normalize run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub venue: String,
    pub started_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

impl RunReport {
    fn new(venue: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            venue: venue.to_string(),
            started_at: Utc::now(),
            files: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }

    pub fn output_files(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter_map(|f| f.output.as_ref().map(PathBuf::from))
            .collect()
    }
}

/// Write canonical records with the fixed column order
pub fn write_records(path: &Path, records: &[CanonicalBookingRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(CanonicalBookingRecord::HEADERS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Normalize one file into `output_dir`. Nothing is written if the file fails.
pub fn process_file(input: &Path, output_dir: &Path, pipeline: &RecordPipeline) -> Result<(PathBuf, i32, BatchStats)> {
    let year = detect_year(input)?;
    let file = input.display().to_string();
    let span = info_span!("file", path = %file, venue = %pipeline.name(), year);
    let _enter = span.enter();

    let table = Table::read_csv(input)?;
    let batch = pipeline.normalize_table(&table, year, &file)?;

    let output = output_path(input, output_dir);
    write_records(&output, &batch.records)?;
    info!(
        rows_in = batch.stats.input_rows,
        rows_out = batch.stats.output_rows,
        output = %output.display(),
        "file normalized"
    );
    Ok((output, year, batch.stats))
}

fn report_for(input: &Path, venue: &str, result: Result<(PathBuf, i32, BatchStats)>) -> FileReport {
    match result {
        Ok((output, year, stats)) => {
            metrics::record_file(venue, &stats);
            FileReport {
                input: input.display().to_string(),
                output: Some(output.display().to_string()),
                year: Some(year),
                stats: Some(stats),
                error: None,
            }
        }
        Err(e) => {
            error!(file = %input.display(), error = %e, "file failed, continuing with remaining files");
            metrics::record_file_failure(venue, &e);
            FileReport {
                input: input.display().to_string(),
                output: None,
                year: detect_year(input).ok(),
                stats: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Report for a file whose worker task died before producing a result
fn task_failure_report(input: &Path, venue: &str, error: &tokio::task::JoinError) -> FileReport {
    metrics::record_task_failure(venue);
    FileReport {
        input: input.display().to_string(),
        output: None,
        year: detect_year(input).ok(),
        stats: None,
        error: Some(format!("file task failed: {}", error)),
    }
}

/// Normalize every file in order; a failing file does not stop the others
pub fn process_all(inputs: &[PathBuf], output_dir: &Path, pipeline: &RecordPipeline) -> RunReport {
    let mut report = RunReport::new(pipeline.name());
    info!(run_id = %report.run_id, files = inputs.len(), "starting normalize run");
    for input in inputs {
        let result = process_file(input, output_dir, pipeline);
        report.files.push(report_for(input, pipeline.name(), result));
    }
    report
}

/// Same as `process_all`, with files spread over tokio's blocking pool.
/// Each file is still decoded sequentially, so outputs match the serial run.
pub async fn process_all_parallel(inputs: Vec<PathBuf>, output_dir: PathBuf, pipeline: Arc<RecordPipeline>) -> RunReport {
    let mut report = RunReport::new(pipeline.name());
    info!(run_id = %report.run_id, files = inputs.len(), "starting parallel normalize run");

    let mut handles = Vec::with_capacity(inputs.len());
    for input in inputs {
        let pipeline = pipeline.clone();
        let output_dir = output_dir.clone();
        let task_input = input.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let result = process_file(&task_input, &output_dir, &pipeline);
            report_for(&task_input, pipeline.name(), result)
        });
        handles.push((input, handle));
    }

    // Join in submission order so the report matches the serial run
    for (input, handle) in handles {
        let file_report = match handle.await {
            Ok(file_report) => file_report,
            Err(e) => {
                error!(file = %input.display(), "file task failed: {}", e);
                task_failure_report(&input, pipeline.name(), &e)
            }
        };
        report.files.push(file_report);
    }
    report
}
