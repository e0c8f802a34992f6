//! Filter predicates: exact substring and fuzzy rank (nucleo-matcher).

use nucleo_matcher::pattern::AtomKind;
use nucleo_matcher::pattern::CaseMatching;
use nucleo_matcher::pattern::Normalization;
use nucleo_matcher::pattern::Pattern;
use nucleo_matcher::Config;
use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;

use crate::column::FilterFn;
use crate::value::CellValue;

/// Case-insensitive substring match over the value's string form.
pub fn includes_string(value: &CellValue, query: &str) -> bool {
    value
        .to_string()
        .to_lowercase()
        .contains(&query.to_lowercase())
}

/// Fuzzy score of `haystack` against `query` (higher is better).
///
/// Returns `None` when the characters of `query` cannot be found in order.
/// An empty query scores 0.
pub fn fuzzy_score(haystack: &str, query: &str) -> Option<u32> {
    if query.is_empty() {
        return Some(0);
    }
    let mut scratch = MatchScratch::new();
    let pattern = fuzzy_pattern(query);
    scratch.score(&pattern, haystack)
}

fn fuzzy_pattern(query: &str) -> Pattern {
    Pattern::new(
        query,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
    )
}

/// Reusable matcher state for one pipeline run.
///
/// The nucleo matcher is only allocated once a fuzzy predicate needs it.
pub struct MatchScratch {
    matcher: Option<Matcher>,
    buf: Vec<char>,
}

impl MatchScratch {
    pub fn new() -> Self {
        Self {
            matcher: None,
            buf: Vec::new(),
        }
    }

    fn score(&mut self, pattern: &Pattern, haystack: &str) -> Option<u32> {
        let matcher = self
            .matcher
            .get_or_insert_with(|| Matcher::new(Config::DEFAULT));
        let haystack = Utf32Str::new(haystack, &mut self.buf);
        pattern.score(haystack, matcher)
    }
}

impl Default for MatchScratch {
    fn default() -> Self {
        Self::new()
    }
}

/// A filter query compiled for one strategy.
///
/// Compiled once per column per recompute, then applied to every row.
pub struct Predicate {
    kind: PredicateKind,
}

enum PredicateKind {
    /// Empty query: everything passes.
    Pass,
    /// Lowercased needle.
    Includes(String),
    Fuzzy { pattern: Pattern, min_score: u32 },
}

impl Predicate {
    /// Compiles `query` for the given strategy.
    ///
    /// `min_score` is the fuzzy threshold; it is ignored for substring matching.
    pub fn compile(query: &str, filter_fn: FilterFn, min_score: u32) -> Self {
        let kind = if query.is_empty() {
            PredicateKind::Pass
        } else {
            match filter_fn {
                FilterFn::IncludesString => PredicateKind::Includes(query.to_lowercase()),
                FilterFn::Fuzzy => PredicateKind::Fuzzy {
                    pattern: fuzzy_pattern(query),
                    min_score,
                },
            }
        };
        Self { kind }
    }

    /// Returns `true` if every value passes (empty query).
    pub fn is_pass(&self) -> bool {
        matches!(self.kind, PredicateKind::Pass)
    }

    /// Tests one value.
    pub fn matches(&self, value: &CellValue, scratch: &mut MatchScratch) -> bool {
        match &self.kind {
            PredicateKind::Pass => true,
            PredicateKind::Includes(needle) => value.to_string().to_lowercase().contains(needle),
            PredicateKind::Fuzzy { pattern, min_score } => scratch
                .score(pattern, &value.to_string())
                .is_some_and(|score| score >= *min_score),
        }
    }
}
