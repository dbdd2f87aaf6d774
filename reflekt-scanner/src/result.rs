use serde::{Deserialize, Serialize};

/// What happened to a single seed URL during a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrawlOutcome {
    /// Hidden fields were found and mutations were merged into the output set.
    Extracted {
        url: String,
        fields: Vec<String>,
        /// URLs generated from this page, before merging with other pages.
        generated: Vec<String>,
    },
    /// The normalized content was already seen under another URL.
    Duplicate { url: String },
    /// The response body was empty or whitespace only.
    EmptyBody { url: String },
    NoHiddenFields { url: String },
    /// `network` is set when the transport failed (connect, TLS, timeout).
    Failed {
        url: String,
        reason: String,
        network: bool,
    },
}

/// Why a probe finished without a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The URL path points at a static asset, so no request was sent.
    StaticAsset,
    /// The response content type can't render markup.
    ContentType(String),
}

/// Verdict of one (URL, parameter) reflection probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    Reflected { url: String, parameter: String },
    NotReflected,
    Skipped(SkipReason),
    Failed(String),
}

/// Aggregate of a full crawl run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub seeds: usize,
    pub extracted: usize,
    pub duplicates: usize,
    pub empty: usize,
    pub without_fields: usize,
    pub failed: usize,
    /// Sorted, deduplicated mutated URLs.
    pub urls: Vec<String>,
}

impl CrawlSummary {
    pub fn new(seeds: usize) -> Self {
        Self {
            seeds,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &CrawlOutcome) {
        match outcome {
            CrawlOutcome::Extracted { .. } => self.extracted += 1,
            CrawlOutcome::Duplicate { .. } => self.duplicates += 1,
            CrawlOutcome::EmptyBody { .. } => self.empty += 1,
            CrawlOutcome::NoHiddenFields { .. } => self.without_fields += 1,
            CrawlOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Aggregate of a full probe run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeSummary {
    pub urls: usize,
    pub invalid: usize,
    pub without_params: usize,
    pub probes: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Reflected URLs, deduplicated in first-seen order.
    pub reflected: Vec<String>,
}

impl ProbeSummary {
    pub fn new(urls: usize) -> Self {
        Self {
            urls,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &ProbeOutcome) {
        self.probes += 1;
        match outcome {
            ProbeOutcome::Skipped(_) => self.skipped += 1,
            ProbeOutcome::Failed(_) => self.failed += 1,
            ProbeOutcome::Reflected { .. } | ProbeOutcome::NotReflected => {}
        }
    }
}
