//! Extract command - run predictors over a single OCR source.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{debug, info};

use foodocr_core::config::FoodOcrConfig;
use foodocr_core::extract::{
    DEFAULT_PREDICTION_TYPES, extract_predictions, find_expiration_dates_with,
};
use foodocr_core::ocr::OcrDocument;
use foodocr_core::prediction::{Prediction, PredictionType};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input OCR JSON file
    input: Option<PathBuf>,

    /// Fetch the OCR JSON from a URL instead of a file
    #[arg(long, conflicts_with = "input")]
    url: Option<String>,

    /// Extract from raw text instead of OCR JSON
    #[arg(long, conflicts_with_all = ["input", "url"])]
    text: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Comma-separated prediction types (default: all)
    #[arg(short, long, value_delimiter = ',')]
    types: Vec<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn parse_prediction_type(name: &str) -> anyhow::Result<PredictionType> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| anyhow::anyhow!("unknown prediction type: {name}"))
}

pub async fn load_document(
    input: Option<&PathBuf>,
    url: Option<&str>,
    text: Option<&str>,
) -> anyhow::Result<OcrDocument> {
    if let Some(text) = text {
        return Ok(OcrDocument::from_text(text));
    }

    if let Some(url) = url {
        info!("fetching OCR JSON from {url}");
        let body = reqwest::get(url).await?.error_for_status()?.text().await?;
        return Ok(OcrDocument::from_json_str(&body)?);
    }

    let Some(path) = input else {
        anyhow::bail!("one of <INPUT>, --url or --text is required");
    };
    if !path.exists() {
        anyhow::bail!("input file not found: {}", path.display());
    }

    let content = std::fs::read_to_string(path)?;
    Ok(OcrDocument::from_json_str(&content)?)
}

pub fn run_extractors(
    document: &OcrDocument,
    types: &[String],
    config: &FoodOcrConfig,
) -> anyhow::Result<Vec<Prediction>> {
    let selected: Vec<PredictionType> = if types.is_empty() {
        DEFAULT_PREDICTION_TYPES.to_vec()
    } else {
        types
            .iter()
            .map(|name| parse_prediction_type(name))
            .collect::<anyhow::Result<_>>()?
    };

    let mut predictions = Vec::new();
    for prediction_type in selected {
        // Expiration dates honor the configured plausibility window.
        let mut found = if prediction_type == PredictionType::ExpirationDate {
            find_expiration_dates_with(document, &config.expiration)
        } else {
            extract_predictions(document, prediction_type)?
        };
        debug!("{}: {} prediction(s)", prediction_type, found.len());
        predictions.append(&mut found);
    }

    Ok(predictions)
}

fn render_text(predictions: &[Prediction]) -> String {
    let mut lines = Vec::new();
    for prediction in predictions {
        let value = prediction
            .value
            .as_deref()
            .or(prediction.value_tag.as_deref())
            .unwrap_or("-");
        let auto = if prediction.automatic_processing {
            style("auto").green()
        } else {
            style("review").yellow()
        };
        lines.push(format!(
            "{:<18} {:<40} [{}]",
            prediction.prediction_type.as_str(),
            value,
            auto
        ));
    }
    lines.join("\n")
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => FoodOcrConfig::from_file(std::path::Path::new(path))?,
        None => FoodOcrConfig::default(),
    };

    let document = load_document(args.input.as_ref(), args.url.as_deref(), args.text.as_deref())
        .await?;
    let predictions = run_extractors(&document, &args.types, &config)?;

    info!("extracted {} prediction(s)", predictions.len());

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&predictions)?,
        OutputFormat::Text => render_text(&predictions),
    };

    match args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prediction_type() {
        assert!(parse_prediction_type("product_weight").is_ok());
        assert!(parse_prediction_type("not_a_type").is_err());
    }

    #[test]
    fn test_run_extractors_with_selection() {
        let document = OcrDocument::from_text("poids net: 500g - EMB 50155");
        let config = FoodOcrConfig::default();

        let weights = run_extractors(
            &document,
            &["product_weight".to_string()],
            &config,
        )
        .unwrap();
        assert_eq!(weights.len(), 1);

        let all = run_extractors(&document, &[], &config).unwrap();
        assert!(all.len() >= 2);
    }
}
