// Candidate URL generation from hidden form fields

use crate::error::{Result, ScanError};
use crate::hidden::{HiddenFieldMap, PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::{Url, form_urlencoded};

pub const DEFAULT_MAX_URLS_PER_PAGE: usize = 500;

/// How many parameters the drop rules remove at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DropDepth {
    /// Remove each parameter on its own.
    #[default]
    Single,
    /// Also remove every pair of parameters when there are more than two.
    Pair,
}

impl DropDepth {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(DropDepth::Single),
            2 => Some(DropDepth::Pair),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationConfig {
    pub drop_depth: DropDepth,
    pub max_urls: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            drop_depth: DropDepth::Single,
            max_urls: DEFAULT_MAX_URLS_PER_PAGE,
        }
    }
}

/// Strip query and fragment, leaving `scheme://host[:port]/path`.
pub fn clean_url(url: &str) -> Result<String> {
    let mut parsed =
        Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed.to_string())
}

/// Build every candidate URL for `fields` against `base`.
///
/// Rules, unioned as a set:
/// - isolation: `base?p=test` for each field
/// - default rotation: all fields present, one keeps its default, the rest are `test`
/// - drop-1: default rotation over the fields left after removing one
/// - drop-2 ([`DropDepth::Pair`] only, more than two fields): same after removing a pair
///
/// Output is sorted and truncated to `config.max_urls`.
pub fn generate_urls(base: &str, fields: &HiddenFieldMap, config: &MutationConfig) -> Vec<String> {
    let names: Vec<&str> = fields.keys().map(String::as_str).collect();
    let mut urls = BTreeSet::new();

    for name in &names {
        urls.insert(build_url(base, &[(*name, PLACEHOLDER)]));
    }

    rotate_defaults(base, fields, &names, &mut urls);

    for removed in 0..names.len() {
        let remaining: Vec<&str> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != removed)
            .map(|(_, n)| *n)
            .collect();
        rotate_defaults(base, fields, &remaining, &mut urls);
    }

    if config.drop_depth == DropDepth::Pair && names.len() > 2 {
        for first in 0..names.len() {
            for second in (first + 1)..names.len() {
                let remaining: Vec<&str> = names
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != first && *i != second)
                    .map(|(_, n)| *n)
                    .collect();
                rotate_defaults(base, fields, &remaining, &mut urls);
            }
        }
    }

    urls.into_iter().take(config.max_urls).collect()
}

fn rotate_defaults(
    base: &str,
    fields: &HiddenFieldMap,
    names: &[&str],
    urls: &mut BTreeSet<String>,
) {
    for keep in names {
        let pairs: Vec<(&str, &str)> = names
            .iter()
            .map(|name| {
                let value = if name == keep {
                    fields
                        .get(*name)
                        .map(String::as_str)
                        .filter(|v| !v.is_empty())
                        .unwrap_or(PLACEHOLDER)
                } else {
                    PLACEHOLDER
                };
                (*name, value)
            })
            .collect();
        urls.insert(build_url(base, &pairs));
    }
}

fn build_url(base: &str, pairs: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish();
    format!("{}?{}", base, query)
}
