use crate::error::Result;
use crate::fetch::{FetchedPage, Fetcher};
use crate::params::{is_static_asset_url, replace_parameter};
use crate::result::{ProbeOutcome, SkipReason};
use tracing::{debug, info};

/// Literal injected into the parameter under test.
pub const PAYLOAD: &str = "\"><xsslection>";

/// Substring that must come back verbatim for a positive verdict.
pub const MARKER: &str = "<xsslection>";

/// Content types that can't execute injected markup.
pub const SKIP_CONTENT_TYPES: &[&str] = &[
    "image/",
    "video/",
    "audio/",
    "font/",
    "text/plain",
    "text/xml",
    "application/json",
    "application/xml",
    "text/css",
    "text/javascript",
];

/// Build the URL that carries [`PAYLOAD`] in `parameter`.
pub fn build_probe_url(url: &str, parameter: &str) -> Result<String> {
    replace_parameter(url, parameter, PAYLOAD)
}

/// Judge a response to a probe request.
///
/// Returns `None` when the content type is gated out, otherwise whether the
/// marker came back inside an HTML document.
pub fn detect_reflection(page: &FetchedPage) -> Option<bool> {
    let content_type = page.content_type_lower();
    if SKIP_CONTENT_TYPES.iter().any(|t| content_type.contains(t)) {
        return None;
    }
    Some(content_type.starts_with("text/html") && page.body.contains(MARKER))
}

/// Inject the payload into one parameter of `url` and check the response.
pub async fn probe_parameter(fetcher: &Fetcher, url: &str, parameter: &str) -> ProbeOutcome {
    if is_static_asset_url(url) {
        debug!("[skip] by path: {}", url);
        return ProbeOutcome::Skipped(SkipReason::StaticAsset);
    }

    let probe_url = match build_probe_url(url, parameter) {
        Ok(probe_url) => probe_url,
        Err(e) => return ProbeOutcome::Failed(e.to_string()),
    };

    let page = match fetcher.fetch(&probe_url).await {
        Ok(page) => page,
        Err(e) => {
            debug!("[error] {}: {}", probe_url, e);
            return ProbeOutcome::Failed(e.to_string());
        }
    };

    match detect_reflection(&page) {
        None => {
            debug!("[skip] content-type: {}", page.content_type_lower());
            ProbeOutcome::Skipped(SkipReason::ContentType(page.content_type_lower()))
        }
        Some(true) => {
            info!("Reflection found in parameter '{}': {}", parameter, probe_url);
            ProbeOutcome::Reflected {
                url: probe_url,
                parameter: parameter.to_string(),
            }
        }
        Some(false) => ProbeOutcome::NotReflected,
    }
}
