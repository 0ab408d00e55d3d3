//! Ordering of collected images: natural filename order or creation time.
//!
//! Both orders are total. Ties on the primary key fall back to the plain
//! file name, then to the full path, so two distinct files never compare
//! equal and repeated runs over the same directory produce the same order.

use crate::config::SortMode;
use crate::pipeline::collect::ImageEntry;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use tracing::debug;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// One run of a tokenised file name.
///
/// Variant order matters: at the same position a number sorts before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum NaturalToken {
    /// Digit run with leading zeros stripped. `len` is compared first so
    /// arbitrarily long runs order by magnitude without overflowing.
    Number { len: usize, digits: String },
    /// Non-digit run, lower-cased.
    Text(String),
}

/// Precomputed natural-order key: alternating text and number runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<NaturalToken>);

impl NaturalKey {
    pub fn new(name: &str) -> Self {
        let mut tokens = Vec::new();
        let mut last = 0;
        for m in DIGIT_RUN.find_iter(name) {
            if m.start() > last {
                tokens.push(NaturalToken::Text(name[last..m.start()].to_lowercase()));
            }
            let trimmed = m.as_str().trim_start_matches('0');
            tokens.push(NaturalToken::Number {
                len: trimmed.len(),
                digits: trimmed.to_string(),
            });
            last = m.end();
        }
        if last < name.len() {
            tokens.push(NaturalToken::Text(name[last..].to_lowercase()));
        }
        Self(tokens)
    }

    pub fn tokens(&self) -> &[NaturalToken] {
        &self.0
    }
}

fn by_natural_name(a: &ImageEntry, b: &ImageEntry) -> Ordering {
    a.natural_key
        .cmp(&b.natural_key)
        .then_with(|| a.file_name.cmp(&b.file_name))
        .then_with(|| a.path.cmp(&b.path))
}

fn by_creation_time(a: &ImageEntry, b: &ImageEntry) -> Ordering {
    a.created
        .cmp(&b.created)
        .then_with(|| a.file_name.cmp(&b.file_name))
        .then_with(|| a.path.cmp(&b.path))
}

/// Sort entries in place according to `mode`.
pub fn sort_entries(entries: &mut [ImageEntry], mode: SortMode) {
    match mode {
        SortMode::NaturalFilename => entries.sort_by(by_natural_name),
        SortMode::CreationTime => entries.sort_by(by_creation_time),
    }
    debug!("Sorted {} images by {:?}", entries.len(), mode);
}
