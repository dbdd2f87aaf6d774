use crate::error::Result;
use crate::fetch::{FetchPolicy, Fetcher};
use crate::params::{ParameterMap, filter_parameters};
use crate::reflection::probe_parameter;
use crate::result::{ProbeOutcome, ProbeSummary};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_PROBE_WORKERS: usize = 15;

pub type ProbeResultCallback = Arc<dyn Fn(&ProbeOutcome) + Send + Sync>;

/// Remove repeated entries, keeping the first occurrence of each.
pub fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

/// Runs a reflection probe for every filtered query parameter of every URL.
pub struct Prober {
    fetcher: Fetcher,
    workers: usize,
    result_callback: Option<ProbeResultCallback>,
}

impl Prober {
    pub fn new() -> Result<Self> {
        Self::with_policy(FetchPolicy::probe())
    }

    pub fn with_policy(policy: FetchPolicy) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(policy)?,
            workers: DEFAULT_PROBE_WORKERS,
            result_callback: None,
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Called from the worker task as soon as each probe finishes.
    pub fn with_result_callback(mut self, callback: ProbeResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    /// Probe every (URL, parameter) pair and collect reflected URLs.
    ///
    /// URLs without query parameters are skipped. The reflected list is
    /// deduplicated in first-seen order once every task has finished.
    pub async fn probe(&self, urls: &[String]) -> Result<ProbeSummary> {
        let mut summary = ProbeSummary::new(urls.len());
        let reflected: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let semaphore = Arc::new(Semaphore::new(self.workers));

        let mut tasks = Vec::new();
        for url in urls {
            let parsed = match Url::parse(url) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Skipping invalid URL {}: {}", url, e);
                    summary.invalid += 1;
                    continue;
                }
            };

            let params = ParameterMap::from_url(&parsed);
            if params.is_empty() {
                debug!("[info] no params in: {}", url);
                summary.without_params += 1;
                continue;
            }

            let filtered = filter_parameters(&params);
            debug!("[*] Testing {} with params: {:?}", url, filtered);

            for parameter in filtered {
                let url = url.clone();
                let fetcher = self.fetcher.clone();
                let semaphore = semaphore.clone();
                let reflected = reflected.clone();
                let result_cb = self.result_callback.clone();

                tasks.push(tokio::spawn(async move {
                    let outcome = match semaphore.acquire_owned().await {
                        Ok(_permit) => probe_parameter(&fetcher, &url, &parameter).await,
                        Err(e) => ProbeOutcome::Failed(e.to_string()),
                    };

                    if let ProbeOutcome::Reflected { url: ref hit, .. } = outcome {
                        reflected.lock().await.push(hit.clone());
                    }

                    if let Some(ref callback) = result_cb {
                        callback(&outcome);
                    }
                    outcome
                }));
            }
        }

        info!("Probing {} parameters with {} workers", tasks.len(), self.workers);

        for joined in join_all(tasks).await {
            match joined {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    warn!("Probe task failed: {}", e);
                    summary.probes += 1;
                    summary.failed += 1;
                }
            }
        }

        let collected = std::mem::take(&mut *reflected.lock().await);
        summary.reflected = dedup_preserving_order(collected);
        Ok(summary)
    }
}
