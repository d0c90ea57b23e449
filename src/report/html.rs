//! HTML report generation: summary cards, verdict table and heatmap thumbnails

use super::{ReportEntry, Summary};
use crate::decision::Tone;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, entries: &[ReportEntry]) -> io::Result<()> {
    let summary = Summary::from_entries(entries);

    // Lowest integrity first, then reported-status results, errors last
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by_key(|e| match &e.assessment {
        Some(a) => match a.integrity_percent {
            Some(i) => (0, i),
            None => (1, 0),
        },
        None => (2, 0),
    });

    let rows: String = sorted.iter().map(|e| build_row(e)).collect();

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Verilens Forensics Report</title>
    <style>
        :root {{
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --success: #3fb950;
            --info: #58a6ff;
            --warning: #d29922;
            --error: #f85149;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1600px; margin: 0 auto; padding: 2rem; }}
        .header {{
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border);
        }}
        .logo {{ font-size: 2.5rem; font-weight: 800; }}
        .subtitle {{ color: var(--dim); }}

        /* Stats Row */
        .stats {{
            display: grid;
            grid-template-columns: repeat(6, 1fr);
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.25rem;
            text-align: center;
        }}
        .stat-value {{ font-size: 2.5rem; font-weight: 700; line-height: 1; }}
        .stat-label {{ color: var(--dim); font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.5rem; }}
        .success {{ color: var(--success); }}
        .info {{ color: var(--info); }}
        .warning {{ color: var(--warning); }}
        .error {{ color: var(--error); }}
        .dim {{ color: var(--dim); }}

        /* Results table */
        table {{ width: 100%; border-collapse: collapse; background: var(--card); border-radius: 12px; }}
        th, td {{ padding: 0.75rem 1rem; border-bottom: 1px solid var(--border); text-align: left; vertical-align: top; }}
        th {{ color: var(--dim); font-size: 0.8rem; text-transform: uppercase; }}
        .verdict {{ font-weight: 700; white-space: nowrap; }}
        .note {{ color: var(--dim); font-size: 0.85rem; margin-top: 0.25rem; }}
        .maps img {{ width: 120px; margin-right: 0.5rem; border: 1px solid var(--border); border-radius: 4px; }}
    </style>
</head>
<body>
<div class="container">
    <div class="header">
        <div class="logo">Verilens</div>
        <div class="subtitle">{total} result file(s) assessed</div>
    </div>

    <div class="stats">
        <div class="stat"><div class="stat-value success">{authentic}</div><div class="stat-label">Authentic</div></div>
        <div class="stat"><div class="stat-value info">{likely_authentic}</div><div class="stat-label">Likely authentic</div></div>
        <div class="stat"><div class="stat-value warning">{inconclusive}</div><div class="stat-label">Inconclusive</div></div>
        <div class="stat"><div class="stat-value error">{likely_forged}</div><div class="stat-label">Likely forged</div></div>
        <div class="stat"><div class="stat-value error">{forged}</div><div class="stat-label">Forged</div></div>
        <div class="stat"><div class="stat-value dim">{error}</div><div class="stat-label">Errors</div></div>
    </div>

    <table>
        <thead>
            <tr><th>Verdict</th><th>Integrity</th><th>Reliability</th><th>Fake likelihood</th><th>Confidence</th><th>File</th><th>Maps</th></tr>
        </thead>
        <tbody>
{rows}
        </tbody>
    </table>
</div>
</body>
</html>
"#,
        total = summary.total,
        authentic = summary.authentic,
        likely_authentic = summary.likely_authentic,
        inconclusive = summary.inconclusive,
        likely_forged = summary.likely_forged,
        forged = summary.forged,
        error = summary.error,
        rows = rows
    )?;

    Ok(())
}

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "success",
        Tone::Info => "info",
        Tone::Warning => "warning",
        Tone::Error => "error",
    }
}

fn build_row(entry: &ReportEntry) -> String {
    let file_cell = {
        let mut cell = html_escape(&entry.file_name);
        if let Some(ref src) = entry.source_filename {
            cell.push_str(&format!(r#"<div class="note">{}</div>"#, html_escape(src)));
        }
        if let Some(ref model) = entry.model {
            cell.push_str(&format!(r#"<div class="note">model: {}</div>"#, html_escape(model)));
        }
        if let Some(ref id) = entry.request_id {
            cell.push_str(&format!(r#"<div class="note">request: {}</div>"#, html_escape(id)));
        }
        if let Some(ref note) = entry.portrait_note {
            cell.push_str(&format!(r#"<div class="note">{}</div>"#, html_escape(note)));
        }
        if entry.assessment.is_some() && entry.has_error() {
            let err = entry.error.as_deref().unwrap_or("");
            cell.push_str(&format!(r#"<div class="note error">{}</div>"#, html_escape(err)));
        }
        cell
    };

    let maps: String = entry
        .renderings
        .iter()
        .map(|r| {
            let src = html_escape(&r.path.display().to_string());
            format!(r#"<img src="{}" alt="{}" title="{}">"#, src, r.layer, r.layer)
        })
        .collect();

    match &entry.assessment {
        Some(a) => format!(
            r#"            <tr><td class="verdict {class}">{title}<div class="note">{desc}</div></td><td>{i}</td><td>{r}</td><td>{f}</td><td>{c}%</td><td>{file}</td><td class="maps">{maps}</td></tr>
"#,
            class = tone_class(a.info.tone),
            title = a.info.title,
            desc = a.info.description,
            i = percent_cell(a.integrity_percent),
            r = percent_cell(a.reliability_percent),
            f = percent_cell(a.fake_likelihood_percent),
            c = a.confidence_percent,
            file = file_cell,
            maps = maps
        ),
        None => format!(
            r#"            <tr><td class="verdict dim">ERROR<div class="note">{err}</div></td><td>-</td><td>-</td><td>-</td><td>-</td><td>{file}</td><td></td></tr>
"#,
            err = html_escape(entry.error.as_deref().unwrap_or("")),
            file = file_cell
        ),
    }
}

fn percent_cell(value: Option<u32>) -> String {
    match value {
        Some(v) => format!("{}%", v),
        None => "-".to_string(),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
