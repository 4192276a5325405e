use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use equisearch_cli::aggregate::{aggregate, dataset::Dataset, rows_io};
use equisearch_cli::engine::IntegratedEngine;
use equisearch_cli::exit_code;
use equisearch_core::EngineConfig;

#[derive(Parser)]
#[command(author, version, about = "Build-time tooling for the equisearch equipment-search engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate typed supplier rows into a canonical JSON dataset.
    BuildDataset {
        /// Path to a JSON array of source rows (reading the original
        /// `.xlsx` workbook into rows is an external collaborator; only
        /// the resulting typed rows are consumed here).
        xlsx_path: PathBuf,
        /// Path the aggregated dataset JSON is written to.
        out_path: PathBuf,
    },
    /// Build (or rebuild) a persisted search index from a dataset JSON file.
    BuildIndex {
        /// Path to a dataset JSON file produced by `build-dataset`.
        dataset_path: PathBuf,
        /// Path the serialized index is written to.
        index_path: PathBuf,
    },
}

/// A command failure paired with the process exit code it should produce.
type CliResult<T> = Result<T, (i32, anyhow::Error)>;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err((code, err)) => {
            eprintln!("error: {err:?}");
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::BuildDataset { xlsx_path, out_path } => build_dataset(&xlsx_path, &out_path),
        Commands::BuildIndex { dataset_path, index_path } => build_index(&dataset_path, &index_path),
    }
}

fn build_dataset(xlsx_path: &std::path::Path, out_path: &std::path::Path) -> CliResult<()> {
    if !xlsx_path.exists() {
        return Err((
            exit_code::INPUT_MISSING,
            anyhow::anyhow!("rows file not found at {}", xlsx_path.display()),
        ));
    }

    let rows = rows_io::read_rows(xlsx_path)
        .with_context(|| format!("reading {}", xlsx_path.display()))
        .map_err(|e| (exit_code::INPUT_MISSING, e))?;
    let (corpus, report) = aggregate(&rows);

    if corpus.is_empty() {
        return Err((
            exit_code::VALIDATION_FAILED,
            anyhow::anyhow!("aggregation produced zero documents from {} rows", report.original_rows),
        ));
    }
    if report.duplicate_equipment_ids > 0 {
        return Err((
            exit_code::VALIDATION_FAILED,
            anyhow::anyhow!(
                "aggregation produced {} duplicate equipmentId(s), which must be zero",
                report.duplicate_equipment_ids
            ),
        ));
    }

    let original_rows = report.original_rows;
    let dataset = Dataset::new(corpus, original_rows);

    let file = std::fs::File::create(out_path)
        .with_context(|| format!("creating {}", out_path.display()))
        .map_err(|e| (exit_code::WRITE_FAILED, e))?;
    serde_json::to_writer_pretty(file, &dataset)
        .context("writing dataset JSON")
        .map_err(|e| (exit_code::WRITE_FAILED, e))?;

    println!("wrote {} documents to {}", dataset.corpus.len(), out_path.display());
    println!(
        "original_rows={} unique_equipments={} duplicate_equipment_ids={}",
        report.original_rows, report.unique_equipments, report.duplicate_equipment_ids
    );
    println!(
        "coverage: valor_unitario={:.1}% vida_util={:.1}% manutencao={:.1}%",
        report.valor_unitario_coverage_pct, report.vida_util_coverage_pct, report.manutencao_coverage_pct
    );

    Ok(())
}

fn build_index(dataset_path: &std::path::Path, index_path: &std::path::Path) -> CliResult<()> {
    if !dataset_path.exists() {
        return Err((
            exit_code::INPUT_MISSING,
            anyhow::anyhow!("dataset not found at {}", dataset_path.display()),
        ));
    }

    let file = std::fs::File::open(dataset_path)
        .with_context(|| format!("opening {}", dataset_path.display()))
        .map_err(|e| (exit_code::INPUT_MISSING, e))?;
    let dataset: Dataset = serde_json::from_reader(file)
        .context("parsing dataset JSON")
        .map_err(|e| (exit_code::VALIDATION_FAILED, e))?;

    if dataset.corpus.is_empty() {
        return Err((
            exit_code::VALIDATION_FAILED,
            anyhow::anyhow!("dataset at {} has no documents", dataset_path.display()),
        ));
    }

    let doc_count = dataset.corpus.len();
    let engine = IntegratedEngine::build(dataset.corpus, EngineConfig::from_env())
        .map_err(|e| (exit_code::VALIDATION_FAILED, anyhow::Error::from(e)))?;
    engine
        .save_index(index_path)
        .with_context(|| format!("writing index to {}", index_path.display()))
        .map_err(|e| (exit_code::WRITE_FAILED, e))?;

    println!("built index for {doc_count} documents at {}", index_path.display());
    Ok(())
}
