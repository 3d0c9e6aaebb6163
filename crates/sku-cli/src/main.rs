//! SKU Mapper CLI
//!
//! Command-line tool for mapping sales export SKUs to master SKUs and
//! reporting mapping coverage.

use clap::{Parser, Subcommand};
use sku_core::export::{single_output_name, timestamp};
use sku_core::{
    process_files, process_table, read_table, write_batch_outputs, write_json, write_table,
    Catalog, OutputFormat, RunConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Unmapped identifiers listed after a single-file run
const UNMAPPED_PREVIEW: usize = 10;

#[derive(Parser)]
#[command(name = "sku-cli")]
#[command(about = "Warehouse SKU → MSKU mapper", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a single sales export and write the processed table
    Map {
        /// Reference catalog workbook
        #[arg(short, long, default_value = "CSTE.xlsx")]
        catalog: PathBuf,

        /// Sales export (CSV or spreadsheet)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the processed file
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output format (xlsx or csv)
        #[arg(long, default_value = "xlsx")]
        format: OutputFormat,

        /// Also write the statistics as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Map every sales export in a directory
    Batch {
        /// Run configuration (JSON); flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Reference catalog workbook
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Directory scanned for sales exports
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Additional input files
        #[arg(short, long)]
        input: Vec<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Pick up spreadsheets as well as CSV files
        #[arg(long)]
        include_spreadsheets: bool,

        /// Directory for processed files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output format for per-file results (xlsx or csv)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Skip the combined multi-sheet workbook
        #[arg(long)]
        no_combined: bool,

        /// Also write the batch report as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Resolve individual identifiers against the catalog
    Resolve {
        /// Reference catalog workbook
        #[arg(short, long, default_value = "CSTE.xlsx")]
        catalog: PathBuf,

        /// Identifiers to resolve
        #[arg(required = true)]
        skus: Vec<String>,
    },

    /// Show what a reference catalog contains
    Catalog {
        /// Reference catalog workbook
        #[arg(short, long, default_value = "CSTE.xlsx")]
        catalog: PathBuf,

        /// Number of mappings to list
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Create a run configuration template
    CreateConfig {
        /// Output path for the configuration file
        #[arg(short, long)]
        output: PathBuf,

        /// Directory scanned for sales exports
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sku_core=info,warn")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> sku_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Map {
            catalog,
            input,
            output_dir,
            format,
            json,
        } => cmd_map(&catalog, &input, &output_dir, format, json.as_deref()),
        Commands::Batch {
            config,
            catalog,
            dir,
            input,
            recursive,
            include_spreadsheets,
            output_dir,
            format,
            no_combined,
            json,
        } => {
            let mut run_config = match config {
                Some(path) => RunConfig::load(path)?,
                None => RunConfig {
                    input_dir: Some(PathBuf::from(".")),
                    ..RunConfig::default()
                },
            };
            if let Some(catalog) = catalog {
                run_config.catalog = catalog;
            }
            if dir.is_some() {
                run_config.input_dir = dir;
            }
            run_config.inputs.extend(input);
            run_config.recursive |= recursive;
            run_config.include_spreadsheets |= include_spreadsheets;
            if let Some(output_dir) = output_dir {
                run_config.output_dir = output_dir;
            }
            if let Some(format) = format {
                run_config.format = format;
            }
            if no_combined {
                run_config.combined_workbook = false;
            }
            cmd_batch(&run_config, json.as_deref())
        }
        Commands::Resolve { catalog, skus } => cmd_resolve(&catalog, &skus),
        Commands::Catalog { catalog, limit } => cmd_catalog(&catalog, limit),
        Commands::CreateConfig { output, dir } => cmd_create_config(&output, dir),
    }
}

fn cmd_map(
    catalog_path: &Path,
    input: &Path,
    output_dir: &Path,
    format: OutputFormat,
    json: Option<&Path>,
) -> sku_core::Result<()> {
    let catalog = Catalog::load_or_empty(catalog_path);

    println!("Processing sales data: {}", input.display());
    println!();

    let table = read_table(input)?;
    let processed = process_table(&catalog.mapping, &table)?;
    info!(column = processed.sku_source.column(), "identifier column");

    let stats = &processed.stats;
    println!("PROCESSING RESULTS:");
    println!("{}", "=".repeat(50));
    println!("Total SKUs processed: {}", stats.total_records);
    println!("Successfully mapped: {}", stats.mapped_records);
    println!("Unmapped SKUs: {}", stats.unmapped_records);
    println!("Mapping success rate: {:.1}%", stats.mapping_rate);
    println!();

    fs::create_dir_all(output_dir)?;
    let output = output_dir.join(single_output_name(format, &timestamp()));
    write_table(&processed.table, &output)?;
    println!("Processed data saved as: {}", output.display());

    let unmapped = processed.unmapped_identifiers(UNMAPPED_PREVIEW);
    if !unmapped.is_empty() {
        println!();
        println!("UNMAPPED SKUs (first {}):", UNMAPPED_PREVIEW);
        println!("{}", "-".repeat(30));
        for sku in &unmapped {
            println!("  - {}", sku);
        }
    }

    if let Some(json_path) = json {
        write_json(stats, json_path)?;
        println!();
        println!("Statistics written to {}", json_path.display());
    }

    Ok(())
}

fn cmd_batch(config: &RunConfig, json: Option<&Path>) -> sku_core::Result<()> {
    let catalog = Catalog::load_or_empty(&config.catalog);
    let inputs = config.resolve_inputs()?;

    if inputs.is_empty() {
        println!("No input files found.");
        return Ok(());
    }

    println!("BATCH PROCESSING: Found {} files", inputs.len());
    println!("{}", "=".repeat(60));
    println!();

    let mut report = process_files(&catalog.mapping, &inputs);
    let outputs = write_batch_outputs(
        &mut report,
        &config.output_dir,
        config.format,
        config.combined_workbook,
    )?;

    for (i, summary) in report.files.iter().enumerate() {
        println!("[{}] {}", i + 1, summary.file);
        println!(
            "  Success: {}/{} mapped ({:.1}%)",
            summary.mapped, summary.total, summary.rate
        );
        if let Some(output) = &summary.output {
            println!("  Saved as: {}", output.display());
        }
    }

    if !report.failures.is_empty() {
        println!();
        println!("Errors ({}):", report.failures.len());
        for failure in &report.failures {
            println!("  {}: {}", failure.file, failure.error);
        }
    }

    if let Some(combined) = &outputs.combined {
        println!();
        println!("COMBINED FILE CREATED: {}", combined.display());
        println!(
            "Contains {} individual sheets + summary",
            report.overall.files_processed
        );
    }

    if !outputs.errors.is_empty() {
        println!();
        println!("Write errors:");
        for (path, err) in &outputs.errors {
            println!("  {}: {}", path.display(), err);
        }
    }

    let overall = &report.overall;
    println!();
    println!("OVERALL RESULTS:");
    println!("{}", "=".repeat(60));
    println!("  Total Files Processed: {}", overall.files_processed);
    println!("  Total Files Failed: {}", overall.files_failed);
    println!("  Total SKUs Processed: {}", overall.total_records);
    println!("  Total SKUs Mapped: {}", overall.mapped_records);
    println!("  Overall Success Rate: {:.1}%", overall.overall_rate);

    if let Some(json_path) = json {
        write_json(&report, json_path)?;
        println!();
        println!("Report written to {}", json_path.display());
    }

    Ok(())
}

fn cmd_resolve(catalog_path: &Path, skus: &[String]) -> sku_core::Result<()> {
    let catalog = Catalog::load(catalog_path)?;

    for sku in skus {
        println!("{}\t{}", sku, catalog.mapping.resolve(sku));
    }

    Ok(())
}

fn cmd_catalog(catalog_path: &Path, limit: usize) -> sku_core::Result<()> {
    let catalog = Catalog::load(catalog_path)?;
    let summary = catalog.summary();

    println!("Catalog: {}", catalog_path.display());
    println!("  SKU mappings: {}", summary.mappings);
    println!("  Combo products: {}", summary.combos);
    println!("  Inventory items: {}", summary.inventory_items);

    if summary.mappings > 0 {
        println!();
        println!("First mappings:");
        for (sku, msku) in catalog.mapping.iter().take(limit) {
            println!("  {} -> {}", sku, msku);
        }
        if summary.mappings > limit {
            println!("  ... ({} more)", summary.mappings - limit);
        }
    }

    Ok(())
}

fn cmd_create_config(output: &Path, dir: Option<PathBuf>) -> sku_core::Result<()> {
    let config = RunConfig {
        input_dir: Some(dir.unwrap_or_else(|| PathBuf::from("."))),
        output_dir: PathBuf::from("processed"),
        ..RunConfig::default()
    };

    config.save(output)?;
    println!("Created run configuration: {}", output.display());
    println!();
    println!("Edit the file to configure your run, then run:");
    println!("  sku-cli batch --config {}", output.display());

    Ok(())
}
