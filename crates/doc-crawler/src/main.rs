use std::io::{self, Write};
use std::path::PathBuf;
use std::pin::pin;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use doc_crawler::PageResult;
use doc_crawler::config::{CrawlerConfig, init_tracing};
use doc_crawler::crawler::Crawler;
use doc_crawler::error::CrawlError;
use doc_crawler::output::{self, ProgressFile};
use doc_crawler::processor::{ContentProcessor, join_pages};
use doc_crawler::stats::StatsRecorder;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn parse_seconds(value: &str) -> Result<Duration, String> {
    value
        .parse::<f64>()
        .map_err(|e| e.to_string())
        .and_then(|secs| Duration::try_from_secs_f64(secs).map_err(|e| e.to_string()))
}

/// Crawls a documentation site and writes its pages as a single Markdown file.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CliArgs {
    /// The initial URL to start crawling from.
    #[clap(required = true)]
    url: String,
    /// Maximum link depth from the start URL (0 fetches only the start page).
    #[clap(short = 'd', long)]
    max_depth: Option<usize>,
    /// Delay (in seconds) between page requests.
    #[clap(long, value_name = "SECS", value_parser = parse_seconds)]
    delay: Option<Duration>,
    /// Crawl pages even when robots.txt disallows them.
    #[clap(long)]
    ignore_robots: bool,
    /// Maximum number of requests in flight.
    #[clap(short = 'c', long)]
    concurrency: Option<usize>,
    /// User-Agent header sent with every request.
    #[clap(long)]
    user_agent: Option<String>,
    /// Per-request timeout in seconds.
    #[clap(long, value_name = "SECS", value_parser = parse_seconds)]
    timeout: Option<Duration>,
    /// Output file or directory. If not provided, Markdown is printed to stdout
    /// and statistics to stderr.
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Omit the title and source header above each page.
    #[clap(long)]
    no_metadata: bool,
    /// Also write crawl statistics as JSON to this path.
    #[clap(long, value_name = "PATH")]
    stats_json: Option<PathBuf>,
}

impl CliArgs {
    fn apply(&self, config: &mut CrawlerConfig) {
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(delay) = self.delay {
            config.delay = delay;
        }
        if self.ignore_robots {
            config.respect_robots = false;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency_limit = concurrency.max(1);
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.timeout.filter(|timeout| !timeout.is_zero()) {
            config.request_timeout = timeout;
        }
        if self.no_metadata {
            config.include_metadata = false;
        }
    }
}

fn stream_error(name: &str, source: io::Error) -> CrawlError {
    CrawlError::Output {
        path: PathBuf::from(name),
        source,
    }
}

async fn run(args: &CliArgs, config: &CrawlerConfig) -> Result<(), CrawlError> {
    let mut crawler = Crawler::new(config)?;
    let processor = ContentProcessor::default();
    let cancel = CancellationToken::new();

    let content_path = args
        .output
        .as_deref()
        .map(|path| output::resolve_content_path(path, &args.url, Local::now()));
    let mut progress = content_path
        .as_deref()
        .map(ProgressFile::create)
        .transpose()?;

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping after the current page");
                cancel.cancel();
            }
        }
    });

    let (tx, mut rx) = mpsc::channel::<PageResult>(32);
    let worker = tokio::spawn({
        let cancel = cancel.clone();
        let start_url = args.url.clone();
        let (max_depth, delay) = (config.max_depth, config.delay);
        async move {
            let mut results = pin!(crawler.crawl(&start_url, max_depth, delay, cancel));
            while let Some(result) = results.next().await {
                if tx.send(result).await.is_err() {
                    break;
                }
            }
        }
    });

    let mut recorder = StatsRecorder::new(
        &args.url,
        config.max_depth,
        config.delay,
        config.respect_robots,
    );
    let mut pages = Vec::new();

    while let Some(result) = rx.recv().await {
        let markdown = processor.process_result(&result, config.include_metadata);
        recorder.record(&result, &markdown);
        match &result.error {
            Some(error) => tracing::warn!("[{}] {} failed: {}", pages.len() + 1, result.url, error),
            None => tracing::info!(
                "[{}] {} ({}, {} links)",
                pages.len() + 1,
                result.url,
                result.status_code,
                result.links.len()
            ),
        }
        if let Some(progress) = progress.as_mut() {
            progress.append(&markdown)?;
        }
        pages.push(markdown);
    }

    worker
        .await
        .map_err(|e| CrawlError::Worker(e.to_string()))?;

    if cancel.is_cancelled() {
        recorder.mark_cancelled();
        tracing::info!("Crawl cancelled by user");
    } else {
        tracing::info!("Crawl completed");
    }

    let stats = recorder.finish();
    let combined = join_pages(&pages);
    let stats_markdown = stats.to_markdown();

    match (content_path, progress) {
        (Some(content_path), Some(progress)) => {
            progress.finish(&content_path, &combined)?;
            let stats_path = output::stats_path(&content_path);
            output::write_atomic(&stats_path, &stats_markdown)?;
            tracing::info!(
                "Saved content to {} and stats to {}",
                content_path.display(),
                stats_path.display()
            );
        }
        _ => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", combined)
                .and_then(|()| stdout.flush())
                .map_err(|e| stream_error("<stdout>", e))?;
            writeln!(io::stderr(), "\n{}", stats_markdown)
                .map_err(|e| stream_error("<stderr>", e))?;
        }
    }

    if let Some(json_path) = &args.stats_json {
        let json = stats.to_json().map_err(|e| CrawlError::Output {
            path: json_path.clone(),
            source: io::Error::other(e),
        })?;
        output::write_atomic(json_path, &json)?;
    }

    tracing::info!(
        "{} pages succeeded, {} failed in {:.2}s",
        stats.successful_urls.len(),
        stats.failed_urls.len(),
        stats.duration_seconds
    );
    Ok(())
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = CliArgs::parse();
    let mut config = CrawlerConfig::from_env();
    args.apply(&mut config);
    init_tracing(&config);

    tracing::info!("Initializing crawler for URL: {}", args.url);

    if let Err(e) = run(&args, &config).await {
        tracing::error!("Crawler run failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
