//! JSON report output

use super::{ReportEntry, Summary};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: String,
    summary: Summary,
    files: &'a [ReportEntry],
}

pub fn write<W: Write>(writer: &mut W, entries: &[ReportEntry]) -> io::Result<()> {
    let report = JsonReport {
        generated: chrono::Local::now().to_rfc3339(),
        summary: Summary::from_entries(entries),
        files: entries,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}
