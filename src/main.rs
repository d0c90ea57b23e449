use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use verilens::report::{self, ReportEntry, Summary};
use verilens::render::MAX_CANVAS_SIZE;
use verilens::{CanvasPolicy, DetectionResult, Renderer, Verdict};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "verilens")]
#[command(author, version, about = "Turn forensic detector results into verdicts and heatmaps")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Result JSON file or directory of them
    path: Option<PathBuf>,

    /// Output report file (.html, .json, .csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write PNG heatmaps for every result into this directory
    #[arg(long)]
    render_dir: Option<PathBuf>,

    /// Canvas size in pixels (longer side with --preserve-aspect)
    #[arg(long, default_value = "300", value_parser = parse_canvas_size)]
    canvas_size: usize,

    /// Keep the source image's aspect ratio instead of a square canvas
    #[arg(long)]
    preserve_aspect: bool,

    /// Skip the translucent overlay layer
    #[arg(long)]
    no_overlay: bool,

    /// Don't prompt to open report
    #[arg(long)]
    no_open: bool,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Show detailed figures per file
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start interactive web UI
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3002")]
        port: u16,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Some(Command::Serve { port }) = args.command {
        if let Err(e) = verilens::serve::start(port) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let path = if let Some(p) = args.path.clone() {
        p
    } else {
        eprintln!("Usage: verilens <PATH>");
        eprintln!("Run 'verilens --help' for more options.");
        std::process::exit(1);
    };

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files = collect_files(&path);
    if files.is_empty() {
        eprintln!("No result files found (expected .json)");
        std::process::exit(1);
    }

    if !args.quiet {
        eprintln!("\x1b[1mVerilens - Forensic Result Renderer\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} result file(s)\n", files.len());
    }

    // Set up progress bar
    let pb = if !args.quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("=>-"));
        }
        Some(pb)
    } else {
        None
    };

    let policy = if args.preserve_aspect {
        CanvasPolicy::AspectFit { max: args.canvas_size }
    } else {
        CanvasPolicy::Fixed { size: args.canvas_size }
    };
    let renderer = Renderer::new()
        .with_policy(policy)
        .with_overlay(!args.no_overlay);

    // Assess files in parallel
    let entries: Vec<ReportEntry> = files
        .par_iter()
        .map(|path| {
            let entry = process_file(path, &renderer, args.render_dir.as_deref());
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(entry.file_name.clone());
            }
            entry
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    // Print results
    if !args.quiet {
        for e in &entries {
            print_entry(e, args.verbose);
        }
    }

    let summary = Summary::from_entries(&entries);
    if !args.quiet {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  \x1b[32m✓ Authentic:\x1b[0m        {}", summary.authentic);
        eprintln!("  \x1b[36m~ Likely authentic:\x1b[0m {}", summary.likely_authentic);
        eprintln!("  \x1b[33m? Inconclusive:\x1b[0m     {}", summary.inconclusive);
        eprintln!("  \x1b[31m! Likely forged:\x1b[0m    {}", summary.likely_forged);
        eprintln!("  \x1b[31m✗ Forged:\x1b[0m           {}", summary.forged);
        if summary.error > 0 {
            eprintln!("  \x1b[90mErrors:\x1b[0m             {}", summary.error);
        }
    }

    if let Some(ref output_path) = args.output {
        if let Err(e) = report::generate(output_path, &entries) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }
        if !args.no_open && !args.quiet {
            prompt_open(output_path);
        }
    }

    if !args.quiet {
        eprintln!("\n\x1b[90mDone ({}).\x1b[0m", Local::now().format("%Y-%m-%d %H:%M:%S"));
    }

    // Exit with appropriate code
    if summary.forged_leaning() > 0 {
        std::process::exit(2);
    } else if summary.inconclusive > 0 || summary.error > 0 {
        std::process::exit(1);
    }
}

fn parse_canvas_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|e| format!("{}", e))?;
    if size == 0 || size > MAX_CANVAS_SIZE {
        return Err(format!("must be between 1 and {}", MAX_CANVAS_SIZE));
    }
    Ok(size)
}

fn collect_files(path: &Path) -> Vec<PathBuf> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    }
}

fn process_file(path: &Path, renderer: &Renderer, render_dir: Option<&Path>) -> ReportEntry {
    let result = match std::fs::File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|f| DetectionResult::from_reader(io::BufReader::new(f)).map_err(|e| e.to_string()))
    {
        Ok(r) => r,
        Err(e) => return ReportEntry::failed(path, e),
    };

    let mut entry = ReportEntry::from_result(path, &result);

    if let Some(dir) = render_dir {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "result".to_string());
        let written = renderer
            .render(&result)
            .map_err(|e| e.to_string())
            .and_then(|maps| report::png::export(dir, &stem, &maps).map_err(|e| e.to_string()));
        match written {
            Ok(renderings) => entry.renderings = renderings,
            Err(e) => entry.error = Some(format!("render failed: {}", e)),
        }
    }

    entry
}

fn print_entry(e: &ReportEntry, verbose: bool) {
    let reset = "\x1b[0m";

    let Some(ref a) = e.assessment else {
        println!(
            "\x1b[90m{:<18}{} {:<40}  {}",
            "[ERROR]",
            reset,
            truncate(&e.file_name, 40),
            e.error.as_deref().unwrap_or("")
        );
        return;
    };

    let color = match a.verdict {
        Verdict::Authentic => "\x1b[32m",       // Green
        Verdict::LikelyAuthentic => "\x1b[36m", // Cyan
        Verdict::Inconclusive => "\x1b[33m",    // Yellow
        Verdict::LikelyForged | Verdict::Forged => "\x1b[31m", // Red
    };

    let figures = match (a.integrity_percent, a.reliability_percent) {
        (Some(i), Some(r)) => format!("I={:>3}%  R={:>3}%", i, r),
        _ => format!("score={:>3}%    ", a.confidence_percent),
    };

    println!(
        "{}{:<18}{} {}  {:<12}  {}",
        color,
        format!("[{}]", a.verdict),
        reset,
        figures,
        truncate(e.model.as_deref().unwrap_or("-"), 12),
        &e.file_name
    );

    if verbose {
        match (a.integrity, a.evidence_reliability) {
            (Some(integrity), Some(reliability)) => eprintln!(
                "    integrity={:.4} reliability={:.4} fake_likelihood={}% lean={}",
                integrity,
                reliability,
                a.fake_likelihood_percent.unwrap_or(0),
                if a.leans_authentic == Some(true) { "authentic" } else { "fake" }
            ),
            _ => eprintln!("    reported by vendor, confidence={}%", a.confidence_percent),
        }
        if let Some(ref id) = e.request_id {
            eprintln!("    request: {}", id);
        }
        if let Some(ref note) = e.portrait_note {
            eprintln!("    note: {}", note);
        }
        for r in &e.renderings {
            eprintln!("    {:<10} {}", r.layer.as_str(), r.path.display());
        }
    }

    if e.has_error() {
        eprintln!("    \x1b[90m{}\x1b[0m", e.error.as_deref().unwrap_or(""));
    }
}

fn prompt_open(path: &Path) {
    eprint!("\nOpen report? [Y/n] ");
    io::stderr().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        let input = input.trim().to_lowercase();
        if input.is_empty() || input == "y" || input == "yes" {
            if let Err(e) = open::that(path) {
                eprintln!("Failed to open report: {}", e);
            }
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canvas_size() {
        assert_eq!(parse_canvas_size("300"), Ok(300));
        assert_eq!(parse_canvas_size(&MAX_CANVAS_SIZE.to_string()), Ok(MAX_CANVAS_SIZE));
        assert!(parse_canvas_size("0").is_err());
        assert!(parse_canvas_size("8589934592").is_err());
        assert!(parse_canvas_size("big").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a_very_long_filename.json", 10), "a_very_...");
    }
}
