// LogInspector - core/export.rs
//
// Text, JSON, and CSV rendering of search results.
// Core layer: writes to any Write trait object.

use crate::core::model::LogRecord;
use crate::util::error::OutputError;
use chrono::SecondsFormat;
use serde::Serialize;
use std::io::Write;

/// How search results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per record: `<RFC3339> <source>/<stream> <message>`.
    #[default]
    Text,
    /// JSON array of records.
    Json,
    /// CSV with a header row.
    Csv,
}

impl OutputFormat {
    /// Parse a user-supplied format name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Write records in the requested format. Returns the number written.
pub fn write_records<W: Write>(
    records: &[LogRecord],
    format: OutputFormat,
    pretty: bool,
    writer: W,
) -> Result<usize, OutputError> {
    match format {
        OutputFormat::Text => write_text(records, writer),
        OutputFormat::Json => write_json(records, pretty, writer),
        OutputFormat::Csv => write_csv(records, writer),
    }
}

/// Plain-text lines, timestamps in RFC3339 UTC at second precision.
pub fn write_text<W: Write>(records: &[LogRecord], writer: W) -> Result<usize, OutputError> {
    let mut out = std::io::BufWriter::new(writer);
    for record in records {
        writeln!(
            out,
            "{} {}/{} {}",
            record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            record.source,
            record.stream,
            record.message
        )
        .map_err(OutputError::Io)?;
    }
    out.flush().map_err(OutputError::Io)?;
    Ok(records.len())
}

/// JSON array followed by a newline.
pub fn write_json<W: Write>(
    records: &[LogRecord],
    pretty: bool,
    writer: W,
) -> Result<usize, OutputError> {
    write_json_value(records, pretty, writer)?;
    Ok(records.len())
}

/// CSV: timestamp, source, stream, message.
pub fn write_csv<W: Write>(records: &[LogRecord], writer: W) -> Result<usize, OutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["timestamp", "source", "stream", "message"])
        .map_err(OutputError::Csv)?;

    for record in records {
        let ts = record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        csv_writer
            .write_record([
                ts.as_str(),
                record.source.as_str(),
                record.stream.as_str(),
                record.message.as_str(),
            ])
            .map_err(OutputError::Csv)?;
    }

    csv_writer.flush().map_err(OutputError::Io)?;
    Ok(records.len())
}

/// The `{"value": "..."}` object printed when only --extract is given.
pub fn write_extracted<W: Write>(value: &str, writer: W) -> Result<(), OutputError> {
    #[derive(Serialize)]
    struct Extracted<'a> {
        value: &'a str,
    }
    write_json_value(&Extracted { value }, false, writer)
}

fn write_json_value<T: Serialize + ?Sized, W: Write>(
    value: &T,
    pretty: bool,
    mut writer: W,
) -> Result<(), OutputError> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value).map_err(OutputError::Json)?;
    } else {
        serde_json::to_writer(&mut writer, value).map_err(OutputError::Json)?;
    }
    writeln!(writer).map_err(OutputError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::millis_to_utc;

    fn make_record(ms: i64, message: &str) -> LogRecord {
        LogRecord {
            timestamp: millis_to_utc(ms),
            source: "/aws/app".to_string(),
            stream: "web-1".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_text_output() {
        let records = vec![make_record(1_700_000_000_000, "ERROR boom")];
        let mut buf = Vec::new();
        let count = write_text(&records, &mut buf).unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "2023-11-14T22:13:20Z /aws/app/web-1 ERROR boom\n"
        );
    }

    #[test]
    fn test_json_output() {
        let records = vec![make_record(0, "Test message")];
        let mut buf = Vec::new();
        write_json(&records, false, &mut buf).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["source"], "/aws/app");
        assert_eq!(parsed[0]["stream"], "web-1");
        assert_eq!(parsed[0]["message"], "Test message");
        assert!(parsed[0]["timestamp"].as_str().unwrap().starts_with("1970-01-01T00:00:00"));
    }

    #[test]
    fn test_pretty_json_is_indented() {
        let mut buf = Vec::new();
        write_json(&[make_record(0, "m")], true, &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("\n  {"));
    }

    #[test]
    fn test_empty_json_is_array() {
        let mut buf = Vec::new();
        write_json(&[], false, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[]\n");
    }

    #[test]
    fn test_csv_output() {
        let records = vec![make_record(0, "one, two"), make_record(1, "three")];
        let mut buf = Vec::new();
        let count = write_csv(&records, &mut buf).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("timestamp,source,stream,message\n"));
        assert!(output.contains("\"one, two\""));
        assert!(output.contains("1970-01-01T00:00:00.001Z"));
    }

    #[test]
    fn test_extracted_object() {
        let mut buf = Vec::new();
        write_extracted("a\"b", &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\"value\":\"a\\\"b\"}\n");
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(OutputFormat::from_name("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("csv"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_name("xml"), None);
    }
}
