//! Output formatting for tag records: JSON, JSON Lines, CSV, and caption sidecars.

use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::pipeline::source::{is_url, ImageSource};
use crate::types::OutputRecord;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
    /// `name,tags` rows with a header
    Csv,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// A writer that serializes tag records in the chosen format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    records_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects [`OutputFormat::Json`].
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            records_written: 0,
        }
    }

    /// Write one record: a JSON object, a JSON line, or a CSV header plus row.
    pub fn write_record(&mut self, record: &OutputRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.write_json(record)?,
            OutputFormat::JsonLines => self.write_line(record)?,
            OutputFormat::Csv => {
                self.writer
                    .write_all(format_csv(std::slice::from_ref(record)).as_bytes())?;
            }
        }
        self.records_written += 1;
        Ok(())
    }

    /// Write a batch: a JSON array, one JSON line per record, or one CSV table.
    pub fn write_records(&mut self, records: &[OutputRecord]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.write_json(&records)?,
            OutputFormat::JsonLines => {
                for record in records {
                    self.write_line(record)?;
                }
            }
            OutputFormat::Csv => self.writer.write_all(format_csv(records).as_bytes())?,
        }
        self.records_written += records.len();
        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    fn write_line<T: Serialize + ?Sized>(&mut self, item: &T) -> io::Result<()> {
        // JSONL is never pretty-printed (one object per line)
        serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        writeln!(self.writer)
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Serialize an item to a JSON string.
pub fn to_json<T: Serialize>(item: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    }
}

/// Render records as CSV.
///
/// The first column is the file name when every input is a local file
/// (`filename,tags`), the URL when every input is a URL (`url,tags`), and the
/// full input otherwise (`source,tags`). Failed inputs carry `ERROR: <message>`
/// in the tags column.
pub fn format_csv(records: &[OutputRecord]) -> String {
    let all_urls = !records.is_empty() && records.iter().all(|r| is_url(r.input()));
    let all_files = !records.is_empty() && records.iter().all(|r| !is_url(r.input()));

    let header = if all_files {
        "filename"
    } else if all_urls {
        "url"
    } else {
        "source"
    };

    let mut out = format!("{header},tags\n");
    for record in records {
        let name = if all_files {
            ImageSource::parse(record.input()).file_name()
        } else {
            record.input().to_string()
        };
        let tags = match record {
            OutputRecord::Tagged(image) => image.report.tag_string.clone(),
            OutputRecord::Failed(failed) => format!("ERROR: {}", failed.error),
        };
        out.push_str(&csv_field(&name));
        out.push(',');
        out.push_str(&csv_field(&tags));
        out.push('\n');
    }
    out
}

/// Quote a CSV field if it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write `<dir>/<stem>.txt` holding the tag string. Returns the written path.
pub fn write_caption(dir: &Path, stem: &str, tag_string: &str) -> io::Result<PathBuf> {
    let path = dir.join(format!("{stem}.txt"));
    std::fs::write(&path, tag_string)?;
    Ok(path)
}
