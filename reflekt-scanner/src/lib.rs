pub mod crawler;
pub mod dedup;
pub mod error;
pub mod fetch;
pub mod hidden;
pub mod mutation;
pub mod normalize;
pub mod params;
pub mod prober;
pub mod reflection;
pub mod result;

pub use crawler::{CrawlResultCallback, Crawler};
pub use error::ScanError;
pub use prober::{ProbeResultCallback, Prober};
pub use result::{CrawlOutcome, CrawlSummary, ProbeOutcome, ProbeSummary, SkipReason};
