use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::page::PageResult;

/// Summary of one finished crawl.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlStats {
    pub start_url: String,
    pub max_depth: usize,
    pub delay_ms: f64,
    pub respect_robots: bool,
    pub successful_urls: Vec<String>,
    pub failed_urls: Vec<String>,
    pub total_size_bytes: usize,
    pub estimated_tokens: usize,
    pub duration_seconds: f64,
    pub crawl_date: DateTime<Local>,
    pub cancelled: bool,
}

/// Builds [`CrawlStats`] while results stream in.
#[derive(Debug)]
pub struct StatsRecorder {
    start_url: String,
    max_depth: usize,
    delay: Duration,
    respect_robots: bool,
    successful_urls: Vec<String>,
    failed_urls: Vec<String>,
    total_size_bytes: usize,
    estimated_tokens: usize,
    started_at: Instant,
    crawl_date: DateTime<Local>,
    cancelled: bool,
}

/// Whitespace-separated word count.
pub fn estimate_tokens(markdown: &str) -> usize {
    markdown.split_whitespace().count()
}

impl StatsRecorder {
    pub fn new(start_url: &str, max_depth: usize, delay: Duration, respect_robots: bool) -> Self {
        Self {
            start_url: start_url.to_string(),
            max_depth,
            delay,
            respect_robots,
            successful_urls: Vec::new(),
            failed_urls: Vec::new(),
            total_size_bytes: 0,
            estimated_tokens: 0,
            started_at: Instant::now(),
            crawl_date: Local::now(),
            cancelled: false,
        }
    }

    /// Records a result together with the Markdown rendered for it.
    pub fn record(&mut self, result: &PageResult, markdown: &str) {
        match &result.error {
            Some(error) => self.failed_urls.push(format!(
                "{} (Status: {}, Error: {})",
                result.url, result.status_code, error
            )),
            None => {
                self.successful_urls.push(result.url.clone());
                self.total_size_bytes += result.content.as_ref().map_or(0, String::len);
            }
        }
        self.estimated_tokens += estimate_tokens(markdown);
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn finish(self) -> CrawlStats {
        CrawlStats {
            start_url: self.start_url,
            max_depth: self.max_depth,
            delay_ms: self.delay.as_secs_f64() * 1000.0,
            respect_robots: self.respect_robots,
            successful_urls: self.successful_urls,
            failed_urls: self.failed_urls,
            total_size_bytes: self.total_size_bytes,
            estimated_tokens: self.estimated_tokens,
            duration_seconds: self.started_at.elapsed().as_secs_f64(),
            crawl_date: self.crawl_date,
            cancelled: self.cancelled,
        }
    }
}

fn format_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(c);
    }
    formatted
}

impl CrawlStats {
    pub fn total_urls(&self) -> usize {
        self.successful_urls.len() + self.failed_urls.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_markdown(&self) -> String {
        let success_count = self.successful_urls.len();
        let fail_count = self.failed_urls.len();

        let mut lines = vec![
            format!("# Crawl Statistics for `{}`", self.start_url),
            format!(
                "**Crawl Date:** `{}`",
                self.crawl_date.format("%Y-%m-%d %H:%M:%S")
            ),
            String::new(),
            "---".to_string(),
            String::new(),
            "## Summary".to_string(),
            format!("- **Total URLs Processed:** `{}`", self.total_urls()),
            format!("- **Successful Pages:** `{}`", success_count),
            format!("- **Failed Pages:** `{}`", fail_count),
            format!("- **Total Duration:** `{:.2} seconds`", self.duration_seconds),
            format!(
                "- **Total Content Size:** `{:.2} KB`",
                self.total_size_bytes as f64 / 1024.0
            ),
            format!(
                "- **Estimated Tokens:** `{}`",
                format_thousands(self.estimated_tokens)
            ),
        ];
        if self.cancelled {
            lines.push("- **Status:** `Cancelled`".to_string());
        }

        lines.extend([
            String::new(),
            "---".to_string(),
            String::new(),
            "## Configuration".to_string(),
            format!("- **Start URL:** `{}`", self.start_url),
            format!("- **Max Depth:** `{}`", self.max_depth),
            format!("- **Delay Between Requests:** `{:.0} ms`", self.delay_ms),
            format!("- **Respect robots.txt:** `{}`", self.respect_robots),
            String::new(),
            "---".to_string(),
            String::new(),
            format!("## Successful URLs ({})", success_count),
        ]);
        lines.extend(self.successful_urls.iter().map(|url| format!("- `{}`", url)));

        lines.extend([
            String::new(),
            "---".to_string(),
            String::new(),
            format!("## Failed URLs ({})", fail_count),
        ]);
        if self.failed_urls.is_empty() {
            lines.push("None.".to_string());
        } else {
            lines.extend(self.failed_urls.iter().map(|url| format!("- `{}`", url)));
        }

        lines.join("\n")
    }
}
