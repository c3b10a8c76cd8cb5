//! Cost and quantity commands - run a pipeline over a folder of receipts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::{glob_with, MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, info};

use grocer_core::pipeline::{collect_report, process_document};
use grocer_core::{CostPipeline, GrocerError, PdfExtractor, Pipeline, QuantityPipeline};

use super::config::load_config;
use super::report::{format_report, OutputFormat, TextReport};

/// Options shared by both pipelines.
#[derive(Args)]
pub struct RunArgs {
    /// Directory of PDF receipts, or a single PDF
    #[arg(default_value = "pdfs")]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Arguments for the cost command.
#[derive(Args)]
pub struct CostArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Average number of baskets per order
    #[arg(long)]
    baskets_per_order: Option<Decimal>,
}

/// Arguments for the quantity command.
#[derive(Args)]
pub struct QuantityArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Line item to total (e.g. "Not So Pretty Carrots")
    #[arg(short, long)]
    product: Option<String>,

    /// Average weight of one item in grams
    #[arg(long)]
    unit_weight: Option<Decimal>,
}

pub async fn run_cost(args: CostArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(baskets) = args.baskets_per_order {
        config.cost.baskets_per_order = baskets;
    }
    config.validate()?;

    let pipeline = CostPipeline::new(&config)?;
    execute(&pipeline, &args.run)
}

pub async fn run_quantity(args: QuantityArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(product) = args.product {
        config.extraction.product_label = product;
    }
    if let Some(grams) = args.unit_weight {
        config.quantity.avg_unit_weight_grams = grams;
    }
    config.validate()?;

    let pipeline = QuantityPipeline::new(&config)?;
    info!("Tracking line item '{}'", pipeline.product_label());
    execute(&pipeline, &args.run)
}

fn execute<P>(pipeline: &P, args: &RunArgs) -> anyhow::Result<()>
where
    P: Pipeline,
    P::Summary: TextReport,
{
    let start = Instant::now();
    let files = discover_documents(&args.input)?;
    info!("Found {} receipts in {}", files.len(), args.input.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} receipts")?
            .progress_chars("=>-"),
    );

    let source = PdfExtractor::new();
    let mut outcomes = Vec::with_capacity(files.len());
    for path in &files {
        outcomes.push(process_document(pipeline, &source, path));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let report = collect_report(pipeline, outcomes);
    let output = format_report(&report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Report written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

/// A single file is taken as-is; a directory contributes its `*.pdf` files,
/// sorted by name. Subdirectories are not searched.
pub fn discover_documents(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let pattern = format!(
        "{}/*.pdf",
        Pattern::escape(&input.to_string_lossy())
    );
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut files: Vec<PathBuf> = glob_with(&pattern, options)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(GrocerError::NoInputDocuments {
            location: input.to_path_buf(),
        }
        .into());
    }

    Ok(files)
}
