// Output formatting for CLI

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::cli::config::OutputFormat;
use oggbridge::ogg::PageHeader;
use oggbridge::{pack, ScanReport};

/// Tag scan result for one file
#[derive(Debug, Serialize)]
pub struct FileReport<'a> {
    pub file: &'a str,
    #[serde(flatten)]
    pub report: &'a ScanReport,
}

/// One row of the page listing
#[derive(Debug, Serialize)]
pub struct PageRow {
    pub offset: usize,
    pub serial: u32,
    pub sequence: u32,
    pub granule_position: u64,
    pub flags: String,
    pub packets: usize,
    pub length: usize,
}

impl PageRow {
    pub fn new(offset: usize, header: &PageHeader) -> Self {
        let mut flags = Vec::new();
        if header.is_bos() {
            flags.push("bos");
        }
        if header.is_continuation() {
            flags.push("cont");
        }
        if header.is_eos() {
            flags.push("eos");
        }
        PageRow {
            offset,
            serial: header.serial,
            sequence: header.sequence,
            granule_position: header.granule_position,
            flags: flags.join(","),
            packets: header.packets_completed(),
            length: header.page_len(),
        }
    }
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output the tags and stream facts of one file
    pub fn output_report(&self, report: &FileReport<'_>, writer: &mut impl Write) -> Result<()> {
        match self.format {
            OutputFormat::Pretty => writeln!(writer, "{}", serde_json::to_string_pretty(report)?)?,
            OutputFormat::Json => writeln!(writer, "{}", serde_json::to_string(report)?)?,
            OutputFormat::Packed => writeln!(writer, "{}", pack(&report.report.tags))?,
            OutputFormat::KeyValue => {
                for (key, value) in report_rows(report) {
                    writeln!(writer, "{}: {}", key, value)?;
                }
            }
            OutputFormat::Table => self.output_table(&report_rows(report), writer)?,
        }
        Ok(())
    }

    /// Output a page listing; `summary` rows describe the file itself
    pub fn output_pages(
        &self,
        summary: &[(String, String)],
        pages: &[PageRow],
        writer: &mut impl Write,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Pretty | OutputFormat::Json => {
                let file: serde_json::Map<String, serde_json::Value> = summary
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v.as_str())))
                    .collect();
                let value = serde_json::json!({
                    "file": file,
                    "pages": pages,
                });
                if self.format == OutputFormat::Pretty {
                    writeln!(writer, "{}", serde_json::to_string_pretty(&value)?)?;
                } else {
                    writeln!(writer, "{}", serde_json::to_string(&value)?)?;
                }
            }
            OutputFormat::KeyValue | OutputFormat::Packed => {
                for (key, value) in summary {
                    writeln!(writer, "{}: {}", key, value)?;
                }
                for page in pages {
                    writeln!(
                        writer,
                        "page {}: offset={} serial={:#010x} granule={} flags={} packets={} length={}",
                        page.sequence,
                        page.offset,
                        page.serial,
                        page.granule_position,
                        page.flags,
                        page.packets,
                        page.length
                    )?;
                }
            }
            OutputFormat::Table => {
                self.output_table(summary, writer)?;
                writeln!(
                    writer,
                    "{:>10} {:>10} {:>6} {:>14} {:<12} {:>7} {:>7}",
                    "offset", "serial", "seq", "granule", "flags", "packets", "length"
                )?;
                for page in pages {
                    writeln!(
                        writer,
                        "{:>10} {:>10x} {:>6} {:>14} {:<12} {:>7} {:>7}",
                        page.offset,
                        page.serial,
                        page.sequence,
                        page.granule_position,
                        page.flags,
                        page.packets,
                        page.length
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Output as table
    fn output_table(&self, rows: &[(String, String)], writer: &mut impl Write) -> Result<()> {
        let max_key_len = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

        writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        for (key, value) in rows {
            writeln!(
                writer,
                "{:<width$} {}",
                format!("{}:", key),
                value,
                width = max_key_len + 2
            )?;
        }
        writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            eprintln!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }
}

/// Flatten a report into display rows; tags keep their stored order
fn report_rows(report: &FileReport<'_>) -> Vec<(String, String)> {
    let stream = report.report;
    let mut rows = vec![
        ("file".to_string(), report.file.to_string()),
        ("serial".to_string(), format!("{:#010x}", stream.serial)),
        ("channels".to_string(), stream.channels.to_string()),
        ("sample_rate".to_string(), stream.sample_rate.to_string()),
    ];
    if let Some(bitrate) = stream.bitrate_nominal {
        rows.push(("bitrate_nominal".to_string(), bitrate.to_string()));
    }
    if let Some(vendor) = &stream.vendor {
        rows.push(("vendor".to_string(), vendor.clone()));
    }
    rows.extend(
        stream
            .tags
            .iter()
            .map(|tag| (tag.name.clone(), tag.value.clone())),
    );
    rows
}
