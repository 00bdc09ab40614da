//! Keyword occurrence counting
//!
//! Two independent strategies count the keyword and the larger result wins,
//! so a page is never under-reported because one strategy missed matches.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// Counts produced by both strategies plus the reconciled value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountResult {
    pub by_split: usize,
    pub by_regex: usize,
    /// Always `max(by_split, by_regex)`
    pub reconciled: usize,
}

impl CountResult {
    pub fn new(by_split: usize, by_regex: usize) -> Self {
        Self {
            by_split,
            by_regex,
            reconciled: by_split.max(by_regex),
        }
    }

    /// Whether the two strategies disagreed
    pub fn diverged(&self) -> bool {
        self.by_split != self.by_regex
    }
}

/// Count non-overlapping occurrences by splitting the lowercased body on the
/// lowercased keyword.
pub fn count_by_split(body: &str, keyword: &str) -> usize {
    if keyword.is_empty() {
        return 0;
    }
    let body = body.to_lowercase();
    let keyword = keyword.to_lowercase();
    body.split(keyword.as_str()).count() - 1
}

/// Count non-overlapping case-insensitive matches of the escaped keyword in
/// the original body.
pub fn count_by_regex(body: &str, keyword: &str) -> usize {
    if keyword.is_empty() {
        return 0;
    }
    match RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.find_iter(body).count(),
        Err(e) => {
            tracing::warn!("Could not build keyword pattern for '{}': {}", keyword, e);
            0
        }
    }
}

/// Count `keyword` in `body` with both strategies and reconcile them
pub fn count_occurrences(body: &str, keyword: &str) -> CountResult {
    let result = CountResult::new(count_by_split(body, keyword), count_by_regex(body, keyword));

    tracing::debug!(
        "Split method: {} occurrences | regex method: {} occurrences",
        result.by_split,
        result.by_regex
    );

    if result.diverged() {
        tracing::warn!(
            "Counting methods disagree for '{}' (split={}, regex={}), using {}",
            keyword,
            result.by_split,
            result.by_regex,
            result.reconciled
        );
    }

    result
}
