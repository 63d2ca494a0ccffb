use std::fs;
use std::path::Path;
use std::sync::Arc;

use booking_normalizer::pipeline::anonymize::{AnonymizeConfig, Anonymizer};
use booking_normalizer::pipeline::ingest::{process_all, process_all_parallel, discover};
use booking_normalizer::pipeline::normalize::VenueRegistry;
use booking_normalizer::pipeline::{merge_files, Table};
use booking_normalizer::types::CanonicalBookingRecord;
use tempfile::tempdir;

const KAUNAS_HEADER: &str = "Date,Time,Room,PriceOrVoucher,EscapeTime,Age,SourceInfo,Status,Celebration";

fn write_raw(dir: &Path, name: &str, rows: &[&str]) {
    let mut text = format!("{}\n", KAUNAS_HEADER);
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    fs::write(dir.join(name), text).unwrap();
}

fn seed_inputs(dir: &Path) {
    write_raw(
        dir,
        "data_2023.csv",
        &[
            "2023-05-06,15:30,Alias1,150,00:55:00,9,Google,Family,Birthday",
            "2023-05-06,15:30,Room2,,00:58:30,35,,Friends,",
        ],
    );
    // Unknown room under a strict venue fails the whole file
    write_raw(dir, "data_2024.csv", &["2024-01-02,18:00,Mafija,100,00:50:00,30,,,"]);
    // No year in the name
    write_raw(dir, "data_latest.csv", &["2024-01-02,18:00,Room1,100,00:50:00,30,,,"]);
}

#[test]
fn test_failing_files_do_not_stop_the_run() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    seed_inputs(input.path());

    let pipeline = VenueRegistry::new().unwrap().get("kaunas").unwrap();
    let files = discover(input.path(), "data_", ".csv").unwrap();
    let report = process_all(&files, output.path(), &pipeline);

    assert_eq!(report.files.len(), 3);
    assert_eq!(report.failed(), 2);
    assert!(report.files[1].error.as_deref().unwrap().contains("Mafija"));
    assert_eq!(report.files[2].year, None);

    assert!(output.path().join("cleaned_data_2023.csv").exists());
    assert!(!output.path().join("cleaned_data_2024.csv").exists());

    let cleaned = Table::read_csv(output.path().join("cleaned_data_2023.csv")).unwrap();
    assert_eq!(cleaned.headers, CanonicalBookingRecord::HEADERS.to_vec());
    let price = cleaned.column_index("price").unwrap();
    let room = cleaned.column_index("room").unwrap();
    let time = cleaned.column_index("time").unwrap();
    assert_eq!(cleaned.column(price), vec!["100", "50"]);
    assert_eq!(cleaned.column(room), vec!["Room1", "Room2"]);
    assert_eq!(cleaned.column(time), vec!["14:00", "14:00"]);
}

#[test]
fn test_merge_and_anonymize_cleaned_output() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    seed_inputs(input.path());
    write_raw(
        input.path(),
        "data_2022.csv",
        &["2022-03-04,20:00,Room5,GIFT,01:02:00,41,Instagram,Colleagues,"],
    );

    let pipeline = VenueRegistry::new().unwrap().get("kaunas").unwrap();
    let files = discover(input.path(), "data_", ".csv").unwrap();
    let report = process_all(&files, output.path(), &pipeline);
    assert_eq!(report.output_files().len(), 2);

    let merged_path = output.path().join("merged.csv");
    let rows = merge_files(&report.output_files(), &merged_path).unwrap();
    assert_eq!(rows, 3);

    let merged = Table::read_csv(&merged_path).unwrap();
    let year = merged.column_index("year").unwrap();
    // Files are merged in discovery order
    assert_eq!(merged.column(year), vec!["2022", "2023", "2023"]);

    let anonymized = Anonymizer::with_seed(AnonymizeConfig::default(), 1).apply(merged).unwrap();
    let city = anonymized.column_index("City").unwrap();
    assert!(anonymized.column(city).iter().all(|c| c == "City1"));
    assert!(anonymized.column_index("price_note").is_none());
    let revenue = anonymized.column_index("Revenue").unwrap();
    assert_eq!(anonymized.column(revenue), vec!["70", "120", "70"]);
}

#[tokio::test]
async fn test_parallel_run_matches_serial_run() {
    let input = tempdir().unwrap();
    let serial_out = tempdir().unwrap();
    let parallel_out = tempdir().unwrap();
    seed_inputs(input.path());
    write_raw(
        input.path(),
        "data_2021.csv",
        &[
            "2021-08-01,12:10,Room3,200,00:45:00,11,,,",
            "2021-08-01,12:10,Room4,,00:47:00,12,,,",
            "2021-08-02,21:00,Room6,COUPON,,,,,",
        ],
    );

    let pipeline = VenueRegistry::new().unwrap().get("kaunas").unwrap();
    let files = discover(input.path(), "data_", ".csv").unwrap();

    let serial = process_all(&files, serial_out.path(), &pipeline);
    let parallel = process_all_parallel(files.clone(), parallel_out.path().to_path_buf(), Arc::clone(&pipeline)).await;

    assert_eq!(serial.files.len(), parallel.files.len());
    for (s, p) in serial.files.iter().zip(&parallel.files) {
        assert_eq!(s.input, p.input);
        assert_eq!(s.stats, p.stats);
        assert_eq!(s.error, p.error);
    }
    for name in ["cleaned_data_2021.csv", "cleaned_data_2023.csv"] {
        let a = fs::read_to_string(serial_out.path().join(name)).unwrap();
        let b = fs::read_to_string(parallel_out.path().join(name)).unwrap();
        assert_eq!(a, b);
    }
}
