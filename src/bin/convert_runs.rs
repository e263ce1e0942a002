//! Convert legacy-encoded text runs to Unicode
//!
//! Reads one run per line as `font<TAB>text` (lines without a tab are copied
//! through), prints the converted text and writes the conversion statistics
//! as JSON to stderr.
//!
//! When every run carries a box as `font<TAB>text<TAB>x<TAB>y<TAB>w<TAB>h`,
//! runs are grouped into lines with the configured line grouping instead of
//! one line per input line.
//!
//! Usage:
//!   cargo run --release --bin convert_runs -- --config recovery.json < runs.tsv
//!   cargo run --release --bin convert_runs -- --primary tables/primary.csv --secondary tables/secondary.csv --input runs.tsv

use deduff::convert::{ConversionStats, TextRun};
use deduff::geometry::Rect;
use deduff::{RecoveryConfig, RecoveryContext};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

struct CliConfig {
    recovery: RecoveryConfig,
    input: Option<PathBuf>,
}

impl CliConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut recovery = RecoveryConfig::new();
        let mut input = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    i += 1;
                    recovery = RecoveryConfig::from_json_file(value_at(&args, i)?).map_err(|e| e.to_string())?;
                },
                "--primary" => {
                    i += 1;
                    recovery = recovery.with_primary_table(value_at(&args, i)?);
                },
                "--secondary" => {
                    i += 1;
                    recovery = recovery.with_secondary_table(value_at(&args, i)?);
                },
                "--glyph-db" => {
                    i += 1;
                    recovery = recovery.with_glyph_db(value_at(&args, i)?);
                },
                "--input" => {
                    i += 1;
                    input = Some(PathBuf::from(value_at(&args, i)?));
                },
                "--font-sizes" => recovery = recovery.with_font_size_tracking(true),
                other => return Err(format!("unknown option '{}'", other)),
            }
            i += 1;
        }

        Ok(Self { recovery, input })
    }
}

fn value_at(args: &[String], i: usize) -> Result<&str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} needs a value", args[i - 1]))
}

fn parse_run(line: &str) -> Option<(TextRun, Option<Rect>)> {
    let mut fields = line.split('\t');
    let font = fields.next()?;
    let text = fields.next()?;
    let numbers: Vec<f32> = fields.filter_map(|f| f.trim().parse().ok()).collect();
    let bbox = match numbers.as_slice() {
        &[x, y, w, h] => Some(Rect::new(x, y, w, h)),
        _ => None,
    };
    Some((TextRun::new(text, font), bbox))
}

fn raw_run(line: String) -> TextRun {
    TextRun {
        font_name: None,
        ..TextRun::new(line, "")
    }
}

fn run(config: CliConfig) -> deduff::Result<()> {
    let context = RecoveryContext::load(&config.recovery)?;
    let reader: Box<dyn BufRead> = match &config.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        entries.push(parse_run(&line).unwrap_or_else(|| (raw_run(line), None)));
    }
    let boxes: Option<Vec<Rect>> = entries.iter().map(|(_, bbox)| *bbox).collect();

    let mut stats = ConversionStats::new();
    let mut runs = context.run_converter(None);
    match boxes.filter(|b| !b.is_empty()) {
        Some(boxes) => {
            for line in context.group_lines(&boxes) {
                for idx in line {
                    runs.push_run(&entries[idx].0, &mut stats);
                }
                runs.end_block();
            }
        },
        None => {
            for (text_run, _) in &entries {
                runs.push_run(text_run, &mut stats);
                runs.end_block();
            }
        },
    }

    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", runs.finish())?;
    stdout.flush()?;

    stats.log_summary();
    eprintln!("{}", stats.to_json()?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match CliConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!(
                "Usage: convert_runs (--config FILE | --primary FILE [--secondary FILE]) [--glyph-db FILE] [--input FILE] [--font-sizes]"
            );
            return ExitCode::from(2);
        },
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
