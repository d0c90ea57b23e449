//! Detailed per-map statistics for investigating a detector result

use std::env;
use std::fs::File;
use std::io::BufReader;
use verilens::{Assessment, DetectionResult, ScoreGrid};

const HISTOGRAM_BINS: usize = 10;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: grid_detail <result.json> [result.json...]");
        std::process::exit(1);
    }

    let mut failed = false;
    for path in &args[1..] {
        println!("\n{}", "=".repeat(60));
        println!("FILE: {}", path);
        println!("{}", "=".repeat(60));
        if let Err(e) = inspect_file(path) {
            eprintln!("Failed: {}", e);
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn inspect_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let result = DetectionResult::from_reader(BufReader::new(file))?;

    println!("Model:     {}", result.model.as_deref().unwrap_or("-"));
    println!("Filename:  {}", result.filename.as_deref().unwrap_or("-"));
    if let Some((h, w)) = result.image_size {
        println!("Image:     {}x{}", w, h);
    }
    if let Some(score) = result.detection_score {
        println!("Detection: {:.4}", score);
    }

    let maps = [
        ("prediction", &result.prediction_map),
        ("confidence", &result.confidence_map),
        ("noiseprint", &result.noiseprint_map),
        ("weighted", &result.weighted_prediction_map),
    ];
    for (name, grid) in maps {
        match grid {
            Some(g) => print_grid_stats(name, g),
            None => println!("\n{}: absent", name),
        }
    }

    let a = Assessment::from_result(&result);
    println!("\nDecision:");
    match (a.integrity, a.evidence_reliability) {
        (Some(integrity), Some(reliability)) => {
            println!("  integrity       {:.4} ({}%)", integrity, a.integrity_percent.unwrap_or(0));
            println!("  reliability     {:.4} ({}%)", reliability, a.reliability_percent.unwrap_or(0));
            println!("  fake likelihood {}%", a.fake_likelihood_percent.unwrap_or(0));
        }
        _ => {
            println!("  status          {}", result.status.as_deref().unwrap_or("-"));
            println!("  score           {}%", a.confidence_percent);
        }
    }
    println!("  verdict         {} - {}", a.verdict, a.info.description);

    Ok(())
}

fn print_grid_stats(name: &str, grid: &ScoreGrid) {
    let (lo, hi) = grid.min_max();
    println!("\n{}: {}x{} (cols x rows)", name, grid.cols(), grid.rows());
    println!("  min={:.4} max={:.4} mean={:.4}", lo, hi, grid.mean());

    let out_of_range = grid.values().iter().filter(|v| !(0.0..=1.0).contains(*v)).count();
    if out_of_range > 0 {
        println!("  {} cell(s) outside [0, 1] (clamped when rendered)", out_of_range);
    }

    // Histogram over [0, 1], out-of-range values land in the end bins
    let mut bins = [0usize; HISTOGRAM_BINS];
    for &v in grid.values() {
        let idx = ((v.clamp(0.0, 1.0) * HISTOGRAM_BINS as f64) as usize).min(HISTOGRAM_BINS - 1);
        bins[idx] += 1;
    }
    let peak = bins.iter().copied().max().unwrap_or(0).max(1);
    let total = grid.values().len();
    for (i, &count) in bins.iter().enumerate() {
        let bar = "#".repeat(count * 40 / peak);
        println!(
            "  {:.1}-{:.1} {:>6} {:>5.1}% {}",
            i as f64 / HISTOGRAM_BINS as f64,
            (i + 1) as f64 / HISTOGRAM_BINS as f64,
            count,
            100.0 * count as f64 / total as f64,
            bar
        );
    }
}
