//! Batch command - extract predictions from many OCR JSON files.

use std::path::PathBuf;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use foodocr_core::config::FoodOcrConfig;
use foodocr_core::ocr::OcrDocument;
use foodocr_core::prediction::Prediction;

use super::extract::run_extractors;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of OCR JSON files (e.g. "ocr/*.json")
    pattern: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    format: BatchFormat,

    /// Comma-separated prediction types (default: all)
    #[arg(short, long, value_delimiter = ',')]
    types: Vec<String>,

    /// Stop at the first file that fails to parse
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum BatchFormat {
    /// One JSON object per line: {"source": ..., "predictions": [...]}
    Jsonl,
    /// CSV with one row per prediction
    Csv,
}

struct FileResult {
    source: String,
    predictions: Vec<Prediction>,
}

fn render_jsonl(results: &[FileResult]) -> anyhow::Result<String> {
    let mut lines = Vec::with_capacity(results.len());
    for result in results {
        lines.push(serde_json::to_string(&serde_json::json!({
            "source": result.source,
            "predictions": result.predictions,
        }))?);
    }
    Ok(lines.join("\n"))
}

fn render_csv(results: &[FileResult]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "source",
        "type",
        "value",
        "value_tag",
        "automatic_processing",
        "predictor",
    ])?;

    for result in results {
        for prediction in &result.predictions {
            writer.write_record([
                result.source.as_str(),
                prediction.prediction_type.as_str(),
                prediction.value.as_deref().unwrap_or(""),
                prediction.value_tag.as_deref().unwrap_or(""),
                if prediction.automatic_processing { "true" } else { "false" },
                prediction.predictor,
            ])?;
        }
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => FoodOcrConfig::from_file(std::path::Path::new(path))?,
        None => FoodOcrConfig::default(),
    };

    let paths: Vec<PathBuf> = glob::glob(&args.pattern)?
        .filter_map(|entry| entry.ok())
        .collect();
    if paths.is_empty() {
        anyhow::bail!("no file matches pattern: {}", args.pattern);
    }

    let progress = ProgressBar::new(paths.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("progress bar template must be valid"),
    );

    let mut results = Vec::new();
    let mut failures = 0usize;

    for path in &paths {
        progress.set_message(path.display().to_string());

        let outcome = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(OcrDocument::from_json_str(&content)?))
            .and_then(|document| run_extractors(&document, &args.types, &config));

        match outcome {
            Ok(predictions) => results.push(FileResult {
                source: path.display().to_string(),
                predictions,
            }),
            Err(error) if args.fail_fast => return Err(error),
            Err(error) => {
                warn!("skipping {}: {error}", path.display());
                failures += 1;
            }
        }

        progress.inc(1);
    }
    progress.finish_and_clear();

    let rendered = match args.format {
        BatchFormat::Jsonl => render_jsonl(&results)?,
        BatchFormat::Csv => render_csv(&results)?,
    };

    match args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }

    let total: usize = results.iter().map(|r| r.predictions.len()).sum();
    eprintln!(
        "{} {} file(s), {} prediction(s), {} failure(s)",
        style("done:").green().bold(),
        results.len(),
        total,
        failures
    );

    Ok(())
}
