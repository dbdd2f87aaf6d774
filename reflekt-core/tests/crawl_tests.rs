// Tests for crawl functionality

use reflekt_core::crawl::{
    CrawlOptions, execute_crawl, extract_url_path, generate_crawl_report, parse_seed_lines,
    read_seed_urls, write_crawl_output,
};
use reflekt_scanner::ScanError;
use reflekt_scanner::mutation::{DropDepth, MutationConfig};
use std::fs;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path_root() {
    assert_eq!(extract_url_path("http://example.com/"), "/");
    assert_eq!(extract_url_path("http://example.com"), "/");
}

#[test]
fn test_extract_url_path_with_query_and_fragment() {
    assert_eq!(extract_url_path("http://example.com/api?key=value#top"), "/api");
}

#[test]
fn test_extract_url_path_invalid() {
    assert_eq!(extract_url_path("not a url"), "not a url");
}

// ============================================================================
// Seed Input Tests
// ============================================================================

#[test]
fn test_parse_seed_lines_sorted_and_unique() {
    let seeds = parse_seed_lines("http://z.example\nhttp://a.example\r\nhttp://z.example\n");
    assert_eq!(seeds, vec!["http://a.example", "http://z.example"]);
}

#[test]
fn test_read_seed_urls_lossy_utf8() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(b"http://example.com/\xff\xfe\n# skipped\nhttp://example.com/ok\n")?;

    let seeds = read_seed_urls(temp_file.path())?;

    assert_eq!(seeds.len(), 2);
    assert!(seeds.contains(&"http://example.com/ok".to_string()));
    assert!(seeds.iter().any(|s| s.contains('\u{FFFD}')));

    Ok(())
}

#[test]
fn test_read_seed_urls_missing_file() {
    let result = read_seed_urls(std::path::Path::new("/nonexistent/reflekt/seeds.txt"));
    assert!(matches!(result, Err(ScanError::Input { .. })));
}

// ============================================================================
// Output Tests
// ============================================================================

#[test]
fn test_write_crawl_output_sorted_and_overwritten() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let out = dir.path().join("output.txt");
    fs::write(&out, "stale\n")?;

    let urls = vec![
        "http://h/b?x=test".to_string(),
        "http://h/a?x=test".to_string(),
    ];
    assert!(write_crawl_output(&out, &urls)?);

    assert_eq!(fs::read_to_string(&out)?, "http://h/a?x=test\nhttp://h/b?x=test\n");
    Ok(())
}

#[test]
fn test_write_crawl_output_skips_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let out = dir.path().join("output.txt");

    assert!(!write_crawl_output(&out, &[])?);
    assert!(!out.exists());
    Ok(())
}

#[test]
fn test_write_crawl_output_unwritable() {
    let urls = vec!["http://h/a?x=test".to_string()];
    let result = write_crawl_output(std::path::Path::new("/nonexistent/dir/out.txt"), &urls);
    assert!(matches!(result, Err(ScanError::OutputWrite { .. })));
}

// ============================================================================
// Stage Runner Tests
// ============================================================================

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_execute_crawl_reports_progress_lines() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/login",
        r#"<form><input type="hidden" name="token"><input type="hidden" name="csrf" value="abc123"></form>"#,
    )
    .await;
    mount_html(&mock_server, "/copy", r#"<form><input type="hidden" name="token"><input type="hidden" name="csrf" value="abc123"></form>"#).await;

    let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let lines_clone = lines.clone();

    let options = CrawlOptions {
        seeds: vec![
            format!("{}/copy", mock_server.uri()),
            format!("{}/login", mock_server.uri()),
        ],
        threads: 1,
        ..CrawlOptions::default()
    };

    let summary = execute_crawl(
        options,
        Some(Arc::new(move |line: String| {
            lines_clone.lock().unwrap().push(line);
        })),
    )
    .await
    .unwrap();

    assert_eq!(summary.extracted, 1);
    assert_eq!(summary.duplicates, 1);

    let lines = lines.lock().unwrap();
    let status: Vec<&String> = lines.iter().filter(|l| l.starts_with('[')).collect();
    assert_eq!(status.len(), 2);
    assert!(status.iter().any(|l| l.ends_with("-> hidden params: csrf, token")));
    assert!(status.iter().any(|l| l.starts_with("[~] Skipping duplicate content: ")));

    // Every generated URL is echoed after its page line
    let echoed: Vec<&String> = lines.iter().filter(|l| !l.starts_with('[')).collect();
    assert_eq!(echoed.len(), summary.urls.len());
    assert!(echoed.iter().all(|u| summary.urls.contains(u)));
}

#[tokio::test]
async fn test_execute_crawl_respects_mutation_config() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/form",
        r#"<input type="hidden" name="a" value="1">
           <input type="hidden" name="b" value="2">
           <input type="hidden" name="c" value="3">"#,
    )
    .await;

    let seeds = vec![format!("{}/form", mock_server.uri())];

    let single = execute_crawl(
        CrawlOptions {
            seeds: seeds.clone(),
            ..CrawlOptions::default()
        },
        None,
    )
    .await
    .unwrap();

    let pair = execute_crawl(
        CrawlOptions {
            seeds: seeds.clone(),
            mutation: MutationConfig {
                drop_depth: DropDepth::Pair,
                ..MutationConfig::default()
            },
            ..CrawlOptions::default()
        },
        None,
    )
    .await
    .unwrap();

    let capped = execute_crawl(
        CrawlOptions {
            seeds,
            mutation: MutationConfig {
                max_urls: 2,
                ..MutationConfig::default()
            },
            ..CrawlOptions::default()
        },
        None,
    )
    .await
    .unwrap();

    let base = format!("{}/form", mock_server.uri());
    assert!(!single.urls.contains(&format!("{}?a=1", base)));
    assert!(pair.urls.contains(&format!("{}?a=1", base)));
    assert!(pair.urls.len() > single.urls.len());
    assert_eq!(capped.urls.len(), 2);
}

#[tokio::test]
async fn test_crawl_report_groups_by_path() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/search", r#"<input type="hidden" name="q">"#).await;

    let options = CrawlOptions {
        seeds: vec![format!("{}/search", mock_server.uri())],
        ..CrawlOptions::default()
    };
    let summary = execute_crawl(options, None).await.unwrap();
    let report = generate_crawl_report(&summary);

    assert!(report.contains("Pages with hidden params: 1"));
    assert!(report.contains("/search (1 URLs)"));
}

#[tokio::test]
async fn test_execute_crawl_labels_failures_by_kind() {
    let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let lines_clone = lines.clone();

    let options = CrawlOptions {
        seeds: vec![
            "http://127.0.0.1:1/refused".to_string(),
            "not a url".to_string(),
        ],
        ..CrawlOptions::default()
    };

    let summary = execute_crawl(
        options,
        Some(Arc::new(move |line: String| {
            lines_clone.lock().unwrap().push(line);
        })),
    )
    .await
    .unwrap();

    assert_eq!(summary.failed, 2);

    let lines = lines.lock().unwrap();
    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("[!] Network error for http://127.0.0.1:1/refused: "))
    );
    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("[!] Unexpected error processing not a url: "))
    );
}
