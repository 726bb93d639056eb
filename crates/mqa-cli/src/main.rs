mod registry;
mod workspace;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use mqa_core::{CatalogGraph, CatalogType, RdfFormat, format_from_media_type, format_from_path};
use mqa_eval::{
    CommandOracle, EvalError, EvaluationEngine, HttpProbe, IndicatorTable, ShapeFiles,
    write_artifacts,
};
use mqa_fetch::{
    CatalogFetcher, CkanSearchFetcher, FetchError, FetchOptions, HydraFetcher, load_catalog_file,
};
use mqa_vocab::{CsvVocabularyProvider, RefreshOptions, VocabularyError, refresh_vocabularies};
use registry::{
    RunContext, RunOptions, RunPaths, init_console_logging, init_run_logging, start_run,
};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;
use workspace::{DEFAULT_SETTINGS_FILE, Settings, load_settings, save_settings, write_bytes_atomic};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("settings error: {0}")]
    Settings(#[from] workspace::WorkspaceError),
    #[error("graph error: {0}")]
    Graph(#[from] mqa_core::Error),
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "mqa", version, about = "DCAT-AP metadata quality assessment")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a catalog and write the report into a new run directory.
    Evaluate(EvaluateArgs),
    /// Download a catalog (following Hydra paging) into a file.
    Fetch(FetchArgs),
    /// Controlled vocabulary maintenance.
    Vocabs {
        #[command(subcommand)]
        command: VocabsCommand,
    },
    /// Settings file maintenance.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum VocabsCommand {
    /// Download the EU and IANA vocabularies and rewrite the CSV files.
    Refresh(RefreshArgs),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a settings file with the default values.
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
struct CatalogSource {
    /// Media type of the catalog (`application/rdf+xml`, `turtle`, ...).
    #[arg(long, value_name = "MEDIA_TYPE")]
    format: Option<String>,
    /// Query a CKAN site's DCAT search endpoint for this keyword instead of
    /// reading the catalog URL directly.
    #[arg(long, value_name = "KEYWORD")]
    search: Option<String>,
    /// Stop after this many catalog pages.
    #[arg(long)]
    max_pages: Option<u32>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Catalog file path or URL.
    #[arg(long, value_name = "PATH_OR_URL")]
    catalog: String,
    #[command(flatten)]
    source: CatalogSource,
    /// Exporter flavour: ckan, ckan_uris, edp or nti.
    #[arg(long)]
    catalog_type: Option<CatalogType>,
    /// Base name of the report files (default `catalog_<date>`).
    #[arg(long)]
    name: Option<String>,
    /// Settings file (default `settings.toml` when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for runs.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Vocabulary CSV directory.
    #[arg(long)]
    vocabularies: Option<PathBuf>,
    /// SHACL shapes, vocabulary shapes and deprecated URI shapes.
    #[arg(long, num_args = 3, value_names = ["SHAPES", "VOCABULARIES", "DEPRECATED"])]
    shapes: Option<Vec<PathBuf>>,
    /// Skip DCAT-AP SHACL validation.
    #[arg(long, default_value_t = false)]
    no_shacl: bool,
    /// Replacement indicator table (TOML).
    #[arg(long)]
    indicators: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Catalog URL.
    #[arg(long)]
    url: String,
    #[command(flatten)]
    source: CatalogSource,
    /// Output file; its extension selects the RDF syntax (default RDF/XML).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RefreshArgs {
    /// Vocabulary CSV directory.
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Settings file (default `settings.toml` when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ConfigInitArgs {
    /// Where to write the settings.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    path: PathBuf,
    /// Overwrite an existing file.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Evaluate(args) => run_evaluate(args).await,
        Command::Fetch(args) => run_fetch(args).await,
        Command::Vocabs {
            command: VocabsCommand::Refresh(args),
        } => run_refresh(args).await,
        Command::Config {
            command: ConfigCommand::Init(args),
        } => run_config_init(args),
    }
}

async fn run_evaluate(args: EvaluateArgs) -> Result<(), CliError> {
    let EvaluateArgs {
        catalog,
        source,
        catalog_type,
        name,
        config,
        run_dir,
        vocabularies,
        shapes,
        no_shacl,
        indicators,
    } = args;

    let mut settings = load_settings(config.as_deref())?;
    if let Some(catalog_type) = catalog_type {
        settings.evaluation.catalog_type = catalog_type;
    }
    if let Some(run_dir) = run_dir {
        settings.paths.run_dir = run_dir;
    }
    if let Some(vocabularies) = vocabularies {
        settings.paths.vocabularies = vocabularies;
    }
    if indicators.is_some() {
        settings.evaluation.indicators = indicators;
    }
    if no_shacl {
        settings.evaluation.shacl = false;
    }
    let shapes = match shapes {
        Some(paths) => match paths.as_slice() {
            [shapes, vocabularies, deprecated] => {
                ShapeFiles::new(shapes.clone(), vocabularies.clone(), deprecated.clone())
            }
            _ => {
                return Err(CliError::InvalidConfig(
                    "--shapes takes exactly three files".to_string(),
                ));
            }
        },
        None => settings.shape_files(),
    };

    let started_at = chrono::Utc::now();
    let name = name.unwrap_or_else(|| format!("catalog_{}", started_at.format("%Y-%m-%d")));
    let run_ctx = RunContext {
        run_id: Uuid::new_v4().to_string(),
        started_at,
        catalog: catalog.clone(),
        catalog_type: settings.evaluation.catalog_type,
        name: name.clone(),
        run_dir: settings.paths.run_dir.clone(),
        options: RunOptions {
            probe_timeout_secs: settings.probe.timeout_secs,
            pool_size: settings.probe.pool_size,
            shacl: settings.evaluation.shacl,
            vocabularies: settings.paths.vocabularies.clone(),
            indicators: settings.evaluation.indicators.clone(),
        },
    };

    let run_paths = start_run(&run_ctx)?;
    let span = init_run_logging(&run_paths.logs_path, &run_ctx)?;

    evaluate_in_run(catalog, source, settings, shapes, name, run_paths)
        .instrument(span)
        .await
}

async fn evaluate_in_run(
    catalog: String,
    source: CatalogSource,
    settings: Settings,
    shapes: ShapeFiles,
    name: String,
    run_paths: RunPaths,
) -> Result<(), CliError> {
    tracing::info!(
        event = "run_started",
        catalog = %catalog,
        config = %run_paths.config_path.display()
    );

    let timer = Instant::now();

    let graph = if is_url(&catalog) {
        let graph = fetch_catalog(&catalog, &source).await?;
        write_bytes_atomic(&run_paths.catalog_path, &graph.write(RdfFormat::RdfXml, Vec::new())?)?;
        tracing::info!(event = "catalog_archived", path = %run_paths.catalog_path.display());
        graph
    } else {
        load_catalog_file(Path::new(&catalog), source.format.as_deref())?
    };
    tracing::info!(event = "catalog_loaded", triples = graph.len()?);

    let table = match &settings.evaluation.indicators {
        Some(path) => IndicatorTable::from_path(path)?,
        None => IndicatorTable::default_mqa(),
    };
    let options = settings.evaluate_options();
    let probe = HttpProbe::new(options.probe_timeout(), &options.user_agent).map_err(EvalError::from)?;
    let mut engine = EvaluationEngine::new(
        options,
        table,
        Arc::new(CsvVocabularyProvider::new(settings.paths.vocabularies.clone())),
        Arc::new(probe),
    )?;
    if settings.evaluation.shacl {
        engine = engine.with_oracle(Arc::new(CommandOracle::new(
            settings.paths.shacl_command.clone(),
        )));
    }

    let report = engine
        .evaluate(&graph, settings.evaluation.shacl.then_some(&shapes))
        .await?;
    let artifacts = write_artifacts(&report, &run_paths.root, &name)?;

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        status = "success",
        rating = %report.summary.rating,
        total_points = report.summary.total_points,
        duration_ms = duration_ms
    );

    println!("{}", artifacts.results_path.display());
    println!(
        "Rating: {} ({} of {} points)",
        report.summary.rating, report.summary.total_points, report.summary.weight_total
    );
    Ok(())
}

async fn run_fetch(args: FetchArgs) -> Result<(), CliError> {
    init_console_logging()?;

    let graph = fetch_catalog(&args.url, &args.source).await?;
    let format = format_from_path(&args.out).unwrap_or(RdfFormat::RdfXml);
    write_bytes_atomic(&args.out, &graph.write(format, Vec::new())?)?;

    tracing::info!(
        event = "catalog_written",
        path = %args.out.display(),
        triples = graph.len()?
    );
    Ok(())
}

async fn run_refresh(args: RefreshArgs) -> Result<(), CliError> {
    init_console_logging()?;

    let settings = load_settings(args.config.as_deref())?;
    let dir = args.dir.unwrap_or(settings.paths.vocabularies);
    let summary = refresh_vocabularies(&RefreshOptions::new(dir)).await?;

    for path in &summary.written {
        println!("{}", path.display());
    }
    for (name, error) in &summary.failed {
        eprintln!("{name}: {error}");
    }
    Ok(())
}

fn run_config_init(args: ConfigInitArgs) -> Result<(), CliError> {
    if args.path.exists() && !args.force {
        return Err(CliError::InvalidConfig(format!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        )));
    }
    save_settings(&args.path, &Settings::default())?;
    println!("{}", args.path.display());
    Ok(())
}

async fn fetch_catalog(url: &str, source: &CatalogSource) -> Result<CatalogGraph, CliError> {
    let mut options = FetchOptions::new(url);
    options.max_pages = source.max_pages;
    if let Some(media_type) = &source.format {
        options.format = format_from_media_type(media_type).ok_or_else(|| {
            CliError::InvalidConfig(format!("unsupported catalog format: {media_type}"))
        })?;
    }
    let graph = match &source.search {
        Some(keyword) => CkanSearchFetcher::new(keyword.clone()).fetch(&options).await?,
        None => HydraFetcher.fetch(&options).await?,
    };
    Ok(graph)
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
