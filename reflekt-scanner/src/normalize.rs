// Content fingerprinting for near-duplicate page detection

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static LONG_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]{20,}").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// SHA-256 of normalized page content, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip volatile tokens from a document.
///
/// Digit runs go first, then any alphanumeric run of 20 or more characters
/// (session tokens, nonces, cache busters), then whitespace is collapsed.
pub fn normalize(html: &str) -> String {
    let clean = DIGIT_RUN.replace_all(html, "");
    let clean = LONG_TOKEN.replace_all(&clean, "");
    let clean = WHITESPACE_RUN.replace_all(&clean, " ");
    clean.trim().to_string()
}

pub fn digest(html: &str) -> ContentDigest {
    let normalized = normalize(html);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    ContentDigest(format!("{:x}", hasher.finalize()))
}
