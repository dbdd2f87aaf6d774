// Query parameter parsing, filtering and substitution

use crate::error::{Result, ScanError};
use percent_encoding::percent_decode_str;
use url::{Url, form_urlencoded};

/// Extensions of binary and static assets that never render markup.
pub const STATIC_EXTENSIONS: &[&str] = &[
    ".js", ".css", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".woff", ".woff2",
    ".ttf", ".eot", ".pdf", ".zip", ".rar", ".exe", ".bmp", ".mp4", ".mp3", ".avi", ".mov",
];

/// Name prefixes of tracking and session parameters.
pub const TRACKING_PREFIXES: &[&str] = &[
    "utm_",
    "fbclid",
    "gclid",
    "ref",
    "referrer",
    "session",
    "sid",
    "phpsessid",
    "jsessionid",
    "source",
    "trk",
    "clickid",
];

/// Query parameters grouped by name, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ParameterMap {
    /// Parse a raw query string.
    ///
    /// The whole string is percent-decoded first, then split on `&` and `=`
    /// with form decoding applied to each piece. Blank values are kept.
    pub fn from_query(raw_query: &str) -> Self {
        let mut map = Self::default();
        if raw_query.is_empty() {
            return map;
        }

        let decoded = percent_decode_str(raw_query).decode_utf8_lossy();
        for (name, value) in form_urlencoded::parse(decoded.as_bytes()) {
            map.push(name.into_owned(), value.into_owned());
        }
        map
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or(""))
    }

    fn push(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(n, values)| (n.as_str(), values.as_slice()))
    }

    /// Replace every value of `name` with a single `value`. No-op if absent.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some((_, values)) = self.entries.iter_mut().find(|(n, _)| n == name) {
            *values = vec![value.to_string()];
        }
    }

    /// Form-encode back into a query string, repeated names grouped together.
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, values) in &self.entries {
            for value in values {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }
}

fn ends_with_static_extension(value: &str) -> bool {
    let lower = value.to_lowercase();
    STATIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Whether a parameter value names a file, judged by its last path segment.
pub fn looks_like_file_value(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let last_segment = value.rsplit('/').next().unwrap_or(value);
    ends_with_static_extension(last_segment)
}

pub fn is_tracking_parameter(name: &str) -> bool {
    let lower = name.to_lowercase();
    TRACKING_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

/// Names worth probing: tracking parameters and file-like values are dropped.
pub fn filter_parameters(params: &ParameterMap) -> Vec<String> {
    params
        .iter()
        .filter(|(name, _)| !is_tracking_parameter(name))
        .filter(|(_, values)| !values.iter().any(|v| looks_like_file_value(v)))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Whether the URL path points at a static asset.
pub fn is_static_asset_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => ends_with_static_extension(parsed.path()),
        Err(_) => false,
    }
}

/// Rebuild `url` with `param` set to `value`, other parameters preserved.
pub fn replace_parameter(url: &str, param: &str, value: &str) -> Result<String> {
    let mut parsed =
        Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

    let mut params = ParameterMap::from_url(&parsed);
    params.set(param, value);

    let query = params.to_query();
    if query.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.set_query(Some(&query));
    }
    Ok(parsed.to_string())
}
