// Machine-readable run summaries

use reflekt_scanner::result::{CrawlSummary, ProbeSummary};
use serde_json::Value;

fn metadata(stage: &str) -> Value {
    serde_json::json!({
        "generator": "Reflekt",
        "version": env!("CARGO_PKG_VERSION"),
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "stage": stage,
        "disclaimer": "For authorized security testing only"
    })
}

/// JSON summary of a crawl run, candidate URLs included.
pub fn generate_crawl_json(summary: &CrawlSummary) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": metadata("crawl"),
            "summary": {
                "seeds": summary.seeds,
                "pages_with_hidden_params": summary.extracted,
                "duplicates": summary.duplicates,
                "empty": summary.empty,
                "without_hidden_params": summary.without_fields,
                "errors": summary.failed,
                "generated_urls": summary.urls.len()
            },
            "urls": summary.urls
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// JSON summary of a probe run, reflected URLs included.
pub fn generate_probe_json(summary: &ProbeSummary) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": metadata("probe"),
            "summary": {
                "urls": summary.urls,
                "invalid": summary.invalid,
                "without_params": summary.without_params,
                "probes": summary.probes,
                "skipped": summary.skipped,
                "errors": summary.failed,
                "reflected": summary.reflected.len()
            },
            "reflected": summary.reflected
        }
    });

    serde_json::to_string_pretty(&json_report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_json_shape() {
        let summary = CrawlSummary {
            seeds: 3,
            extracted: 1,
            duplicates: 1,
            failed: 1,
            urls: vec!["http://h/login?token=test".to_string()],
            ..CrawlSummary::default()
        };

        let json = generate_crawl_json(&summary).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["report"]["metadata"]["stage"], "crawl");
        assert_eq!(value["report"]["summary"]["seeds"], 3);
        assert_eq!(value["report"]["summary"]["generated_urls"], 1);
        assert_eq!(value["report"]["urls"][0], "http://h/login?token=test");
        assert!(value["report"]["metadata"]["generated_at"].is_string());
    }

    #[test]
    fn test_probe_json_shape() {
        let mut summary = ProbeSummary::new(2);
        summary.probes = 2;
        summary.reflected = vec!["http://h/s?q=%22%3E%3Cxsslection%3E".to_string()];

        let json = generate_probe_json(&summary).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["report"]["metadata"]["stage"], "probe");
        assert_eq!(value["report"]["summary"]["reflected"], 1);
        assert_eq!(value["report"]["reflected"].as_array().unwrap().len(), 1);
    }
}
