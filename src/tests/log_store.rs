use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::check_record::{CheckRecord, LOG_FILE_NOT_FOUND};
use crate::classifier::Verdict;
use crate::log_store::{read_recent, LogWriter};

fn write_raw(path: &std::path::Path, contents: &str) {
    let mut f = std::fs::File::create(path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
}

#[test]
fn missing_file_yields_single_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let records = read_recent(&dir.path().join("missing.log"), 100);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, "ERROR");
    assert_eq!(records[0].result, LOG_FILE_NOT_FOUND);
}

#[test]
fn result_with_commas_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    let writer = LogWriter::new(&path);

    let original = CheckRecord::failure(
        Utc::now(),
        "http://example.com",
        "API error: request failed: a, b, and c",
    );
    writer.append_record(&original).unwrap();

    let back = read_recent(&path, 100);
    assert_eq!(back.len(), 1);
    assert_eq!(back[0], original);
}

#[test]
fn result_whitespace_survives_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    let writer = LogWriter::new(&path);

    let original = CheckRecord::failure(Utc::now(), "http://example.com", "  padded, with comma ");
    writer.append_record(&original).unwrap();

    let back = read_recent(&path, 100);
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].result, "  padded, with comma ");
    assert_eq!(back[0], original);
}

#[test]
fn success_record_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    let writer = LogWriter::new(&path);

    let original = CheckRecord::success(
        Utc::now(),
        "https://example.com",
        200,
        Duration::from_millis(1250),
        Verdict::Threat,
    );
    writer.append_record(&original).unwrap();

    let back = read_recent(&path, 100);
    assert_eq!(back[0], original);
    assert_eq!(back[0].result, "1.250,Phishing");
}

#[test]
fn malformed_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    write_raw(
        &path,
        "t1,INFO,http://a,200,0.1,Safe\n\
         just some noise\n\
         \n\
         t2,INFO,http://b\n\
         t3,ERROR,http://c,ERROR\n",
    );

    let records = read_recent(&path, 100);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].timestamp, "t3");
    assert_eq!(records[0].result, "-");
    assert_eq!(records[1].timestamp, "t1");
    assert_eq!(records[1].result, "0.1,Safe");
}

#[test]
fn invalid_utf8_line_does_not_poison_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    let mut bytes = b"t1,INFO,http://a,200,0.1,Safe\n".to_vec();
    bytes.extend_from_slice(b"t2,ERROR,http://b,ERROR,bad \xff byte\n");
    std::fs::write(&path, bytes).unwrap();

    let records = read_recent(&path, 100);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].timestamp, "t2");
}

#[test]
fn one_hundred_fifty_checks_keep_latest_hundred() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    let writer = LogWriter::new(&path);
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    for i in 1..=150 {
        let rec = CheckRecord::success(
            start + ChronoDuration::seconds(i),
            &format!("http://site{i}.example"),
            200,
            Duration::from_millis(10),
            Verdict::Safe,
        );
        writer.append_record(&rec).unwrap();
    }

    let records = read_recent(&path, 100);
    assert_eq!(records.len(), 100);
    assert_eq!(records[0].sanitized_url, "http://site150.example");
    assert_eq!(records[99].sanitized_url, "http://site51.example");

    let times: Vec<_> = records.iter().map(|r| r.parsed_timestamp().unwrap()).collect();
    assert!(times.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn limit_smaller_than_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    write_raw(&path, "a,INFO,u,1,r\nb,INFO,u,2,r\nc,INFO,u,3,r\n");

    let records = read_recent(&path, 2);
    let statuses: Vec<_> = records.iter().map(|r| r.status.as_str()).collect();
    assert_eq!(statuses, ["3", "2"]);
    assert!(read_recent(&path, 0).is_empty());
}

#[test]
fn malformed_tail_does_not_shrink_the_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    let mut contents: String = (1..=1000)
        .map(|i| format!("t{i},INFO,u,{i},r\n"))
        .collect();
    contents.push_str("junk\nmore,junk\n\n");
    write_raw(&path, &contents);

    let records = read_recent(&path, 3);
    let statuses: Vec<_> = records.iter().map(|r| r.status.as_str()).collect();
    assert_eq!(statuses, ["1000", "999", "998"]);
}

#[test]
fn reading_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    write_raw(&path, "a,INFO,u,1,r\nb,INFO,u,2,r\n");

    let first = read_recent(&path, 100);
    let second = read_recent(&path, 100);
    assert_eq!(first, second);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "a,INFO,u,1,r\nb,INFO,u,2,r\n"
    );
}

#[test]
fn append_failure_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let writer = LogWriter::new(dir.path());
    let rec = CheckRecord::placeholder("x");

    assert!(writer.append_record(&rec).is_err());
    writer.append_or_report(&rec);
}

#[test]
fn concurrent_appends_produce_whole_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checks.log");
    let writer = Arc::new(LogWriter::new(&path));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let writer = writer.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    let msg = format!("thread {t}, item {i}, {}", "x".repeat(200));
                    writer
                        .append_record(&CheckRecord::failure(Utc::now(), "http://a", &msg))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let records = read_recent(&path, 1000);
    assert_eq!(records.len(), 200);
    assert!(records.iter().all(|r| r.level == "ERROR" && r.result.starts_with("thread ")));
}
