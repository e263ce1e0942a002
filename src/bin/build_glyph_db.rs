//! Build a glyph database from a directory of reference fonts
//!
//! Every TrueType font below the directory is hashed glyph by glyph and
//! written as one row per glyph and codepoint.
//!
//! Usage:
//!   cargo run --release --bin build_glyph_db -- fonts/ --output glyph_db.csv
//!   cargo run --release --bin build_glyph_db -- fonts/ --output glyph_db.csv --otf --repair

use deduff::fonts::{FontForgeRepair, GlyphHasher};
use deduff::identify::IndexBuilder;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

struct BuildConfig {
    font_dir: PathBuf,
    output: PathBuf,
    include_otf: bool,
    repair: bool,
    precision: Option<usize>,
}

impl BuildConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut font_dir = None;
        let mut output = PathBuf::from("glyph_db.csv");
        let mut include_otf = false;
        let mut repair = false;
        let mut precision = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        output = PathBuf::from(&args[i]);
                    }
                },
                "--otf" => include_otf = true,
                "--repair" => repair = true,
                "--precision" => {
                    i += 1;
                    let value = args.get(i).ok_or("--precision needs a value")?;
                    precision = Some(
                        value
                            .parse::<usize>()
                            .map_err(|_| format!("invalid precision '{}'", value))?,
                    );
                },
                other if other.starts_with('-') => return Err(format!("unknown option '{}'", other)),
                other => font_dir = Some(PathBuf::from(other)),
            }
            i += 1;
        }

        Ok(Self {
            font_dir: font_dir.ok_or("missing font directory")?,
            output,
            include_otf,
            repair,
            precision,
        })
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match BuildConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: build_glyph_db <font-dir> [--output FILE] [--otf] [--repair] [--precision N]");
            return ExitCode::from(2);
        },
    };

    let start = Instant::now();
    let hasher = config
        .precision
        .map(GlyphHasher::with_precision)
        .unwrap_or_default();
    let mut builder = IndexBuilder::new().with_hasher(hasher);
    if config.repair {
        match FontForgeRepair::detect() {
            Some(repair) => builder = builder.with_repair(repair),
            None => eprintln!("Warning: fontforge not found on PATH, repair disabled"),
        }
    }

    let extensions: &[&str] = if config.include_otf { &["ttf", "otf"] } else { &["ttf"] };
    if let Err(e) = builder.add_directory(&config.font_dir, extensions) {
        eprintln!("Error reading {}: {}", config.font_dir.display(), e);
        return ExitCode::FAILURE;
    }

    let (coarse, detailed, report) = builder.finish();
    if let Err(e) = detailed.save(&config.output) {
        eprintln!("Error writing {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    println!(
        "Indexed {} fonts ({} skipped) in {:.2}s -> {}",
        coarse.len(),
        report.skipped.len(),
        start.elapsed().as_secs_f64(),
        config.output.display()
    );
    for (label, reason) in &report.skipped {
        println!("  skipped {}: {}", label, reason);
    }
    ExitCode::SUCCESS
}
