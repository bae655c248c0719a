use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use proxy_master::{
    export,
    proxy::sources::{self, SourceDescriptor},
    CheckSummary, CheckerConfig, EndpointCandidate, EndpointSet, LogSink, Protocol,
    ProxyChecker, ProxyParser, ResultStore, ScrapeConfig, Scraper,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Scrape free proxy lists and check which proxies are alive
#[derive(Parser)]
#[command(name = "proxy-master")]
#[command(about = "Scrape free proxy lists and check which proxies are alive")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape proxies from remote lists
    Scrape {
        #[command(flatten)]
        scrape: ScrapeArgs,
    },
    /// Check proxies loaded from a file
    Check {
        /// Input file containing host:port lines
        input: PathBuf,
        #[command(flatten)]
        check: CheckArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Scrape, then check everything that was scraped
    Run {
        #[command(flatten)]
        scrape: ScrapeArgs,
        #[command(flatten)]
        check: CheckArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
}

#[derive(Args)]
struct ScrapeArgs {
    /// URLs to scrape proxies from (can specify multiple)
    #[arg(short, long)]
    url: Vec<String>,
    /// File containing list of URLs to scrape (one URL per line)
    #[arg(short = 'f', long)]
    sources_file: Option<PathBuf>,
    /// Also use the built-in sources when URLs are given
    #[arg(long)]
    common_sources: bool,
    /// Output file for scraped proxies
    #[arg(short, long, default_value = "proxy.txt")]
    output: PathBuf,
    /// Number of sources fetched concurrently
    #[arg(long, default_value = "50")]
    scrape_threads: usize,
    /// Timeout in seconds for each source request
    #[arg(long, default_value = "10")]
    scrape_timeout: u64,
}

#[derive(Args)]
struct CheckArgs {
    /// Proxy transport used for probing (http, https, socks5)
    #[arg(short = 't', long, default_value = "http")]
    protocol: Protocol,
    /// Number of concurrent checks
    #[arg(short = 'n', long, default_value = "150")]
    threads: usize,
    /// Timeout in seconds for each check
    #[arg(long, default_value = "10")]
    timeout: u64,
    /// Geolocation URL fetched through each proxy
    #[arg(long, default_value = proxy_master::proxy::prober::DEFAULT_REFLECTOR_URL)]
    reflector_url: String,
    /// MaxMind City database used to fill unknown locations
    #[arg(long)]
    mmdb: Option<String>,
}

#[derive(Args)]
struct ExportArgs {
    /// Directory for live_*.txt result files
    #[arg(short = 'd', long, default_value = ".")]
    output_dir: PathBuf,
    /// Also write a JSON export
    #[arg(long)]
    json: bool,
    /// Also write a CSV export
    #[arg(long)]
    csv: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape { scrape } => {
            scrape_stage(&scrape).await?;
        }
        Commands::Check {
            input,
            check,
            export,
        } => {
            let loaded = ProxyParser::load_candidates(&input)?;
            let loaded_count = loaded.len();
            let candidates: EndpointSet = loaded.into_iter().collect();
            let candidates = candidates.into_sorted_vec();
            info!(
                "Loaded {} proxies from {:?} ({} unique)",
                loaded_count,
                input,
                candidates.len()
            );

            let summary = check_stage(&check, candidates).await?;
            report(&summary, &export)?;
        }
        Commands::Run {
            scrape,
            check,
            export,
        } => {
            let candidates = scrape_stage(&scrape).await?;
            if candidates.is_empty() {
                warn!("No proxies scraped, nothing to check");
                return Ok(());
            }

            let summary = check_stage(&check, candidates).await?;
            report(&summary, &export)?;
        }
    }

    Ok(())
}

fn collect_sources(args: &ScrapeArgs) -> Result<Vec<SourceDescriptor>> {
    sources::resolve_sources(&args.url, args.sources_file.as_deref(), args.common_sources)
}

async fn scrape_stage(args: &ScrapeArgs) -> Result<Vec<EndpointCandidate>> {
    let sources = collect_sources(args)?;
    let config = ScrapeConfig::new()
        .with_concurrency(args.scrape_threads)
        .with_timeout(Duration::from_secs(args.scrape_timeout));

    info!(
        "Scraping {} sources with {} workers",
        sources.len(),
        config.concurrency
    );

    let scraper = Scraper::with_config(config)?;
    let summary = scraper.run(&sources, &LogSink).await?;

    ProxyParser::save_to_file(&summary.endpoints, &args.output)?;
    println!(
        "Saved {} unique proxies to {:?} ({:.2}s)",
        summary.endpoints.len(),
        args.output,
        summary.elapsed.as_secs_f64()
    );

    Ok(summary.endpoints)
}

async fn check_stage(args: &CheckArgs, candidates: Vec<EndpointCandidate>) -> Result<CheckSummary> {
    let mut config = CheckerConfig::new()
        .with_concurrency(args.threads)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_protocol_hint(args.protocol)
        .with_reflector_url(args.reflector_url.clone());
    if let Some(path) = &args.mmdb {
        config = config.with_mmdb_path(path.clone());
    }

    info!(
        "Checking {} proxies with {} workers, timeout: {}s, via {}",
        candidates.len(),
        config.concurrency,
        args.timeout,
        config.protocol_hint
    );

    let checker = ProxyChecker::with_config(config)?;
    checker.run(candidates, &LogSink).await
}

fn report(summary: &CheckSummary, args: &ExportArgs) -> Result<()> {
    let stats = &summary.stats;
    println!();
    println!("Total Checked: {}", stats.checked);
    println!("Live: {}", stats.live);
    println!("Dead: {}", stats.dead);
    println!("Success Rate: {}%", stats.success_rate());

    let store = ResultStore::from_live(summary.live.clone());
    if store.is_empty() {
        return Ok(());
    }

    let written = export::write_grouped(&args.output_dir, &store)?;
    println!("\nSaved {} result files to {:?}", written.len(), args.output_dir);

    let listing = args.output_dir.join(export::timestamped_name("live_proxies", "txt"));
    export::write_summary(&listing, store.all())?;
    println!("Saved summary to {:?}", listing);

    if args.json {
        let path = args.output_dir.join(export::timestamped_name("live_proxies", "json"));
        export::write_json(&path, store.all())?;
        println!("Saved JSON to {:?}", path);
    }

    if args.csv {
        let path = args.output_dir.join(export::timestamped_name("live_proxies", "csv"));
        export::write_csv(&path, store.all())?;
        println!("Saved CSV to {:?}", path);
    }

    println!("\nFastest proxies:");
    for result in store.all().iter().take(20) {
        println!("  {}", result.summary_line());
    }

    Ok(())
}
