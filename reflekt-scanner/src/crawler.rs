use crate::dedup::DedupRegistry;
use crate::error::Result;
use crate::fetch::{FetchPolicy, Fetcher};
use crate::hidden::extract_hidden_fields;
use crate::mutation::{MutationConfig, clean_url, generate_urls};
use crate::normalize::digest;
use crate::result::{CrawlOutcome, CrawlSummary};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

pub const DEFAULT_CRAWL_WORKERS: usize = 10;

pub type CrawlResultCallback = Arc<dyn Fn(&CrawlOutcome) + Send + Sync>;

/// Fetches seed pages, skips near-duplicate content, and turns hidden form
/// fields into candidate URLs.
pub struct Crawler {
    fetcher: Fetcher,
    mutation: MutationConfig,
    result_callback: Option<CrawlResultCallback>,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Self::with_policy(FetchPolicy::default())
    }

    pub fn with_policy(policy: FetchPolicy) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(policy)?,
            mutation: MutationConfig::default(),
            result_callback: None,
        })
    }

    pub fn with_mutation_config(mut self, mutation: MutationConfig) -> Self {
        self.mutation = mutation;
        self
    }

    /// Called from the worker task as soon as each seed finishes.
    pub fn with_result_callback(mut self, callback: CrawlResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    /// Crawl every seed with at most `workers` requests in flight.
    ///
    /// The dedup registry lives for this call only. Per-seed failures are
    /// recorded in the summary and never abort the run.
    pub async fn crawl(&self, seeds: &[String], workers: usize) -> Result<CrawlSummary> {
        info!("Starting crawl of {} seeds with {} workers", seeds.len(), workers);

        let registry = DedupRegistry::new();
        let output: Arc<Mutex<BTreeSet<String>>> = Arc::new(Mutex::new(BTreeSet::new()));
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));

        let mut handles = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let seed = seed.clone();
            let fetcher = self.fetcher.clone();
            let registry = registry.clone();
            let output = output.clone();
            let semaphore = semaphore.clone();
            let mutation = self.mutation;
            let result_cb = self.result_callback.clone();

            let handle = tokio::spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        process_seed(&fetcher, &registry, &output, &mutation, seed).await
                    }
                    Err(e) => CrawlOutcome::Failed {
                        url: seed,
                        reason: e.to_string(),
                        network: false,
                    },
                };

                if let Some(ref callback) = result_cb {
                    callback(&outcome);
                }
                outcome
            });
            handles.push(handle);
        }

        let mut summary = CrawlSummary::new(seeds.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    warn!("Crawl task failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary.urls = output.lock().await.iter().cloned().collect();
        info!(
            "Crawl complete. {} pages with hidden fields, {} URLs generated",
            summary.extracted,
            summary.urls.len()
        );
        Ok(summary)
    }
}

async fn process_seed(
    fetcher: &Fetcher,
    registry: &DedupRegistry,
    output: &Mutex<BTreeSet<String>>,
    mutation: &MutationConfig,
    url: String,
) -> CrawlOutcome {
    let page = match fetcher.fetch(&url).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Crawl error for {}: {}", url, e);
            return CrawlOutcome::Failed {
                url,
                reason: e.to_string(),
                network: e.is_network(),
            };
        }
    };

    if page.is_blank() {
        debug!("Empty body for {}", url);
        return CrawlOutcome::EmptyBody { url };
    }

    if !registry.check_and_insert(digest(&page.body)) {
        debug!("Duplicate content for {}", url);
        return CrawlOutcome::Duplicate { url };
    }

    let fields = extract_hidden_fields(&page.body);
    if fields.is_empty() {
        return CrawlOutcome::NoHiddenFields { url };
    }

    let base = match clean_url(&url) {
        Ok(base) => base,
        Err(e) => {
            return CrawlOutcome::Failed {
                url,
                reason: e.to_string(),
                network: false,
            };
        }
    };

    let generated = generate_urls(&base, &fields, mutation);
    debug!("{} -> {} candidate URLs", url, generated.len());

    output.lock().await.extend(generated.iter().cloned());

    CrawlOutcome::Extracted {
        url,
        fields: fields.into_keys().collect(),
        generated,
    }
}
