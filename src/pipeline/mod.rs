// Booking pipeline: read raw sheets, normalize per venue, write, merge and anonymize

pub mod anonymize;
pub mod ingest;
pub mod merge;
pub mod normalize;
pub mod record;
pub mod table;

pub use ingest::{process_all, process_all_parallel, process_file, FileReport, RunReport};
pub use merge::{merge_files, merge_tables};
pub use record::{BatchStats, NormalizedBatch, RecordPipeline};
pub use table::Table;
