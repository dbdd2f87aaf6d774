use indicatif::{ProgressBar, ProgressStyle};
use reflekt_scanner::error::{Result, ScanError};
use reflekt_scanner::prober::{DEFAULT_PROBE_WORKERS, Prober};
use reflekt_scanner::result::{ProbeOutcome, ProbeSummary};
use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const REFLECTED_FILE: &str = "reflected.txt";

/// Options for configuring a probe operation
pub struct ProbeOptions {
    pub urls: Vec<String>,
    pub threads: usize,
    pub show_progress_bars: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            threads: DEFAULT_PROBE_WORKERS,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting reflected URLs as they are found
pub type ProbeProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Read candidate URLs, one per line, skipping blanks.
///
/// Each line is decoded on its own and invalid UTF-8 is replaced, so one bad
/// line never costs the rest of the input.
pub fn read_candidate_urls<R: BufRead>(mut reader: R) -> Result<Vec<String>> {
    let mut urls = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ScanError::ParseError(format!("Failed to read input: {}", e)))?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            urls.push(trimmed.to_string());
        }
    }
    Ok(urls)
}

/// Append reflected URLs to `path`, creating it if needed.
///
/// Returns false without touching the file when there is nothing to write.
pub fn append_reflected(path: &Path, urls: &[String]) -> Result<bool> {
    if urls.is_empty() {
        return Ok(false);
    }

    let to_error = |source| ScanError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)?;

    let mut content = urls.join("\n");
    content.push('\n');
    file.write_all(content.as_bytes()).map_err(to_error)?;
    debug!("Appended {} URLs to {}", urls.len(), path.display());
    Ok(true)
}

/// Execute reflection probing over the given URLs
pub async fn execute_probe(
    options: ProbeOptions,
    progress_callback: Option<ProbeProgressCallback>,
) -> Result<ProbeSummary> {
    let ProbeOptions {
        urls,
        threads,
        show_progress_bars,
    } = options;

    let spinner = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .map_err(|e| ScanError::ParseError(e.to_string()))?,
        );
        pb.set_message(format!("Probing {} URLs...", urls.len()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(Arc::new(pb))
    } else {
        None
    };

    let pb_clone = spinner.clone();
    let result_callback = Arc::new(move |outcome: &ProbeOutcome| {
        if let ProbeOutcome::Reflected { url, parameter } = outcome
            && let Some(ref callback) = progress_callback
        {
            let line = format!("[+] Reflection found in parameter '{}': {}", parameter, url);
            match pb_clone {
                Some(ref pb) => pb.suspend(|| callback(line)),
                None => callback(line),
            }
        }
    });

    let prober = Prober::new()?
        .with_workers(threads)
        .with_result_callback(result_callback);

    let summary = prober.probe(&urls).await?;

    if let Some(ref pb) = spinner {
        pb.finish_and_clear();
    }

    Ok(summary)
}

/// Generate a text report from a probe summary
pub fn generate_probe_report(summary: &ProbeSummary) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  URLs read: {}\n", summary.urls));
    report.push_str(&format!("  Invalid URLs: {}\n", summary.invalid));
    report.push_str(&format!("  URLs without params: {}\n", summary.without_params));
    report.push_str(&format!("  Parameters probed: {}\n", summary.probes));
    report.push_str(&format!("  Skipped: {}\n", summary.skipped));
    report.push_str(&format!("  Errors: {}\n", summary.failed));
    report.push_str(&format!("  Reflected: {}\n", summary.reflected.len()));

    if !summary.reflected.is_empty() {
        report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
        for url in &summary.reflected {
            report.push_str(&format!("  {}\n", url));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_candidate_urls_skips_blanks() {
        let input = Cursor::new("http://a/?x=1\n\n   \n  http://b/?y=2  \n");
        let urls = read_candidate_urls(input).unwrap();
        assert_eq!(urls, vec!["http://a/?x=1".to_string(), "http://b/?y=2".to_string()]);
    }

    #[test]
    fn test_read_candidate_urls_survives_invalid_utf8() {
        let input = Cursor::new(&b"http://a/?q=1\nhttp://b/?x=\xff\nhttp://c/?y=2\n"[..]);
        let urls = read_candidate_urls(input).unwrap();

        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0], "http://a/?q=1");
        assert_eq!(urls[1], "http://b/?x=\u{FFFD}");
        assert_eq!(urls[2], "http://c/?y=2");
    }

    #[test]
    fn test_read_candidate_urls_last_line_without_newline() {
        let urls = read_candidate_urls(Cursor::new("http://a/?q=1\r\nhttp://b/?q=2")).unwrap();
        assert_eq!(urls, vec!["http://a/?q=1".to_string(), "http://b/?q=2".to_string()]);
    }

    #[test]
    fn test_probe_report_lists_reflections() {
        let mut summary = ProbeSummary::new(1);
        summary.probes = 1;
        summary.reflected = vec!["http://h/s?q=%22%3E%3Cxsslection%3E".to_string()];

        let report = generate_probe_report(&summary);
        assert!(report.contains("Reflected: 1"));
        assert!(report.contains("  http://h/s?q=%22%3E%3Cxsslection%3E\n"));
    }
}
