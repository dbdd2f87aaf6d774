// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{expand_path, init_tracing, load_seed_urls};

// Re-export stage runners from reflekt-core
pub use reflekt_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, generate_crawl_report};
pub use reflekt_core::probe::{ProbeOptions, ProbeProgressCallback, execute_probe, generate_probe_report};
