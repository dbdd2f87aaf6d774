use indicatif::{ProgressBar, ProgressStyle};
use reflekt_scanner::crawler::{Crawler, DEFAULT_CRAWL_WORKERS};
use reflekt_scanner::error::{Result, ScanError};
use reflekt_scanner::fetch::FetchPolicy;
use reflekt_scanner::mutation::MutationConfig;
use reflekt_scanner::result::{CrawlOutcome, CrawlSummary};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub seeds: Vec<String>,
    pub threads: usize,
    pub timeout: Duration,
    pub mutation: MutationConfig,
    pub show_progress_bars: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            threads: DEFAULT_CRAWL_WORKERS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mutation: MutationConfig::default(),
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress lines
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Seed URLs from file content: trimmed, blank and `#` lines dropped,
/// deduplicated and sorted.
pub fn parse_seed_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Load seed URLs from a file. Invalid UTF-8 is replaced, not rejected.
pub fn read_seed_urls(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|source| ScanError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    let seeds = parse_seed_lines(&String::from_utf8_lossy(&bytes));
    debug!("Loaded {} seed URLs from {}", seeds.len(), path.display());
    Ok(seeds)
}

/// Write the sorted candidate list, one per line, replacing any prior file.
///
/// Nothing is written for an empty list; the return value says whether the
/// file was written.
pub fn write_crawl_output(path: &Path, urls: &[String]) -> Result<bool> {
    if urls.is_empty() {
        return Ok(false);
    }

    let mut sorted: Vec<&String> = urls.iter().collect();
    sorted.sort();
    sorted.dedup();

    let mut content = String::new();
    for url in sorted {
        content.push_str(url);
        content.push('\n');
    }

    fs::write(path, content).map_err(|source| ScanError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Operator-facing lines for a finished seed: the page summary first, then
/// each URL generated from it.
pub fn describe_crawl_outcome(outcome: &CrawlOutcome) -> Vec<String> {
    match outcome {
        CrawlOutcome::Extracted {
            url,
            fields,
            generated,
        } => {
            let mut lines = vec![format!("[+] {} -> hidden params: {}", url, fields.join(", "))];
            lines.extend(generated.iter().cloned());
            lines
        }
        CrawlOutcome::Duplicate { url } => vec![format!("[~] Skipping duplicate content: {}", url)],
        CrawlOutcome::Failed {
            url,
            reason,
            network: true,
        } => vec![format!("[!] Network error for {}: {}", url, reason)],
        CrawlOutcome::Failed { url, reason, .. } => {
            vec![format!("[!] Unexpected error processing {}: {}", url, reason)]
        }
        CrawlOutcome::EmptyBody { .. } | CrawlOutcome::NoHiddenFields { .. } => Vec::new(),
    }
}

/// Execute a crawl with the given options
/// Returns the crawl summary
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlSummary> {
    let CrawlOptions {
        seeds,
        threads,
        timeout,
        mutation,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new(seeds.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| ScanError::ParseError(e.to_string()))?
                .progress_chars("=>-"),
        );
        pb.set_message("crawling");
        Some(Arc::new(pb))
    } else {
        None
    };

    let pb_clone = progress_bar.clone();
    let result_callback = Arc::new(move |outcome: &CrawlOutcome| {
        let lines = describe_crawl_outcome(outcome);
        if let Some(ref callback) = progress_callback
            && !lines.is_empty()
        {
            let emit = || lines.into_iter().for_each(|line| callback(line));
            match pb_clone {
                Some(ref pb) => pb.suspend(emit),
                None => emit(),
            }
        }
        if let Some(ref pb) = pb_clone {
            pb.inc(1);
        }
    });

    let crawler = Crawler::with_policy(FetchPolicy::crawl(timeout))?
        .with_mutation_config(mutation)
        .with_result_callback(result_callback);

    let summary = crawler.crawl(&seeds, threads).await?;

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    Ok(summary)
}

/// Generate a crawl report from a summary
pub fn generate_crawl_report(summary: &CrawlSummary) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Seeds crawled: {}\n", summary.seeds));
    report.push_str(&format!("  Pages with hidden params: {}\n", summary.extracted));
    report.push_str(&format!("  Duplicate pages skipped: {}\n", summary.duplicates));
    report.push_str(&format!("  Empty responses: {}\n", summary.empty));
    report.push_str(&format!("  Pages without hidden params: {}\n", summary.without_fields));
    report.push_str(&format!("  Errors: {}\n", summary.failed));
    report.push_str(&format!("  Parameterized URLs: {}\n", summary.urls.len()));

    if summary.urls.is_empty() {
        return report;
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Candidate counts per host and path
    let mut by_host: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for url in &summary.urls {
        if let Ok(parsed) = Url::parse(url)
            && let Some(host) = parsed.host_str()
        {
            *by_host
                .entry(host.to_string())
                .or_default()
                .entry(extract_url_path(url))
                .or_default() += 1;
        }
    }

    for (host, paths) in &by_host {
        report.push_str(&format!("## {}\n", host));
        for (path, count) in paths {
            report.push_str(&format!("  {} ({} URLs)\n", path, count));
        }
        report.push('\n');
    }

    report
}
