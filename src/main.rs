use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use tracing::info;

use callrouter::config::Config;
use callrouter::ingest::{load_routes_from_path, read_numbers_from_path};
use callrouter::output::{CostWriter, OutputFormat};
use callrouter::router::{Backend, MatchBoundary, PrefixCostTable, RouteTable, RoutingResolver};
use callrouter::telemetry::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(name = "callrouter")]
#[command(author, version, about = "Least-cost call routing by longest dialing prefix")]
struct Args {
    /// Route costs file (`prefix,price` per line)
    #[arg(short, long, value_name = "FILE")]
    routes: PathBuf,

    /// Phone numbers file (one per line)
    #[arg(short, long, value_name = "FILE", required_unless_present = "validate")]
    numbers: Option<PathBuf>,

    /// Path to config file (YAML, JSON or TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write results here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Prefix table backend
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Concurrent resolution tasks
    #[arg(long)]
    workers: Option<usize>,

    /// Allow a number to match a prefix equal to the whole number
    #[arg(long)]
    inclusive: bool,

    /// Validate config and routes, then exit
    #[arg(long)]
    validate: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Trie,
    Hash,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl Args {
    /// Apply command line overrides on top of file configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(backend) = self.backend {
            config.routing.backend = match backend {
                BackendArg::Trie => Backend::Trie,
                BackendArg::Hash => Backend::Hash,
            };
        }
        if let Some(format) = self.format {
            config.output.format = match format {
                FormatArg::Csv => OutputFormat::Csv,
                FormatArg::Json => OutputFormat::Json,
            };
        }
        if let Some(workers) = self.workers {
            config.routing.workers = workers;
        }
        if self.inclusive {
            config.routing.boundary = MatchBoundary::Inclusive;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (to get log settings)
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    init_tracing(&TracingConfig::from(&config.telemetry))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        routes = %args.routes.display(),
        backend = ?config.routing.backend,
        boundary = ?config.routing.boundary,
        "starting callrouter"
    );

    let routes_path = args.routes.clone();
    let backend = config.routing.backend;
    let policy = config.ingest.on_invalid;
    let (table, stats) = tokio::task::spawn_blocking(move || {
        let mut table = RouteTable::new(backend);
        load_routes_from_path(&routes_path, &mut table, policy).map(|stats| (table, stats))
    })
    .await
    .context("route ingestion task failed")?
    .with_context(|| format!("failed to load routes from {}", args.routes.display()))?;

    info!(
        prefixes = table.len(),
        records = stats.records,
        skipped = stats.skipped,
        "route table built"
    );

    // Validate only mode
    if args.validate {
        info!("configuration and routes are valid");
        return Ok(());
    }

    let numbers_path = args
        .numbers
        .as_ref()
        .context("--numbers is required unless --validate is set")?;
    let numbers = read_numbers_from_path(numbers_path)
        .with_context(|| format!("failed to read numbers from {}", numbers_path.display()))?;

    let resolver = RoutingResolver::new(table).with_boundary(config.routing.boundary);
    let results = resolver
        .resolve_parallel(numbers, config.routing.workers, config.routing.chunk_size)
        .await?;

    match &args.output {
        Some(path) => {
            let mut writer = CostWriter::create(path, &config.output)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            writer.write_all(&results)?;
            writer.finish()?;
        }
        None => {
            let mut writer = CostWriter::new(io::stdout().lock(), &config.output)?;
            writer.write_all(&results)?;
            writer.finish()?;
        }
    }

    Ok(())
}
