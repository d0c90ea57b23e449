//! CSV report output
//!
//! One row per input file. Failed files keep their row with empty score
//! columns and the error message in the last column. Reported-status results
//! leave the integrity columns empty.

use super::ReportEntry;
use crate::decision::Basis;
use std::io::{self, Write};

const HEADER: &str = "verdict,basis,integrity_pct,reliability_pct,fake_likelihood_pct,confidence_pct,model,source_filename,file_name,file_path,error";

pub fn write<W: Write>(writer: &mut W, entries: &[ReportEntry]) -> io::Result<()> {
    writeln!(writer, "{}", HEADER)?;

    for e in entries {
        let (verdict, basis, integrity, reliability, fake, confidence) = match &e.assessment {
            Some(a) => (
                a.verdict.to_string(),
                match a.basis {
                    Basis::Scored => "scored",
                    Basis::Reported => "reported",
                },
                percent(a.integrity_percent),
                percent(a.reliability_percent),
                percent(a.fake_likelihood_percent),
                a.confidence_percent.to_string(),
            ),
            None => ("ERROR".to_string(), "", String::new(), String::new(), String::new(), String::new()),
        };

        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{},{}",
            verdict,
            basis,
            integrity,
            reliability,
            fake,
            confidence,
            escape(e.model.as_deref().unwrap_or("")),
            escape(e.source_filename.as_deref().unwrap_or("")),
            escape(&e.file_name),
            escape(&e.file_path),
            escape(e.error.as_deref().unwrap_or("")),
        )?;
    }

    Ok(())
}

fn percent(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Quote a field if it contains a delimiter, quote or newline
fn escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
