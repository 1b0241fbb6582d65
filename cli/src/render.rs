use std::io::Write as _;

use client::workflows::UploadRecord;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Render the stored-file table: index, display name, date, key.
pub fn print_table(records: &[UploadRecord]) {
    if records.is_empty() {
        println!("No files stored.");
        return;
    }
    println!("{:>4}  {:<32}  {:<24}  {}", "No.", "File Name", "Date", "Key");
    for (index, record) in records.iter().enumerate() {
        println!(
            "{:>4}  {:<32}  {:<24}  {}",
            index + 1,
            record.filename,
            format_date(record.timestamp_ms),
            record.key
        );
    }
}

/// Progress callback rendering a single overwritten percentage line.
pub fn progress_line() -> impl FnMut(f64) {
    let mut last = -1.0f64;
    move |percent: f64| {
        let rounded = percent.round();
        if rounded != last {
            eprint!("\rUploading... {rounded:>3.0}%");
            let _ = std::io::stderr().flush();
            last = rounded;
        }
    }
}

fn format_date(timestamp_ms: u64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(timestamp_ms as i128 * 1_000_000)
        .ok()
        .and_then(|date| date.format(&Rfc3339).ok())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_format_embedded_timestamps_as_rfc3339() {
        assert_eq!(format_date(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_date(1_700_000_000_000), "2023-11-14T22:13:20Z");
    }
}
