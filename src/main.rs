use anyhow::Context;
use clap::Parser;
use proxy_harvester::{
    error::{spawn_error_logger, ErrorSink},
    logging,
    proxy::{CheckerConfig, ProxyChecker, ProxyCrawler, ProxySource, RoundLoop},
    Config, Result,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Harvests public proxy lists and keeps the proxies that actually work
#[derive(Parser)]
#[command(name = "proxy-harvester")]
#[command(about = "Harvests public proxy lists and keeps the proxies that actually work")]
struct Cli {
    /// File confirmed proxies are appended to
    #[arg(short, long, default_value = "active.txt")]
    active_file: PathBuf,

    /// Seconds to sleep between rounds
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// Per-attempt probe timeout in seconds
    #[arg(long, default_value = "2")]
    timeout: u64,

    /// Maximum number of probes in flight
    #[arg(short = 'n', long, default_value = "64")]
    concurrency: usize,

    /// Proxy list URL (can specify multiple); replaces the built-in sources
    #[arg(short, long)]
    source: Vec<String>,

    /// File containing proxy list URLs (one URL per line)
    #[arg(short = 'f', long)]
    source_file: Option<PathBuf>,

    /// Liveness URL probed first through each proxy
    #[arg(long)]
    test_url: Option<String>,

    /// Plaintext liveness URL used when the first probe cannot connect
    #[arg(long)]
    fallback_url: Option<String>,

    /// Body the liveness URL must return
    #[arg(long)]
    sentinel: Option<String>,

    /// Run a single round and exit
    #[arg(long)]
    once: bool,

    /// Log level for this crate (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut checker = CheckerConfig::new()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_concurrency(self.concurrency);
        if let Some(url) = self.test_url {
            checker = checker.with_secure_url(url);
        }
        if let Some(url) = self.fallback_url {
            checker = checker.with_plain_url(url);
        }
        if let Some(sentinel) = self.sentinel {
            checker = checker.with_sentinel(sentinel);
        }

        let mut sources: Vec<ProxySource> =
            self.source.iter().map(|url| ProxySource::from_url(url)).collect();
        if let Some(path) = &self.source_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading source file {:?}", path))?;
            sources.extend(ProxyCrawler::parse_source_list(&content));
        }

        let mut config = Config::new()
            .with_active_file(self.active_file)
            .with_round_interval(Duration::from_secs(self.interval))
            .with_checker(checker);
        if !sources.is_empty() {
            config = config.with_sources(sources);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref())?;

    let once = cli.once;
    let config = cli.into_config()?;

    let (errors, rx) = ErrorSink::channel();
    let error_logger = spawn_error_logger(rx);

    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            cancel_ctrlc.cancel();
        }
    });

    let validator = Arc::new(ProxyChecker::with_config(config.checker.clone()));
    let mut round_loop = RoundLoop::bootstrap(&config, validator, errors, cancel)
        .context("cannot start without the active file")?;

    tracing::info!(
        sources = config.sources.len(),
        concurrency = config.checker.concurrency,
        interval_secs = config.round_interval.as_secs(),
        "starting proxy harvester"
    );

    if once {
        round_loop.run_round().await;
        drop(round_loop);
    } else {
        round_loop.run().await;
    }

    // Dropping the loop closes the error channel so the logger can finish.
    let _ = error_logger.await;
    Ok(())
}
