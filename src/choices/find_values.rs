//! Token-aligned fuzzy search for candidate values within an utterance
//!
//! This is the bottom layer of the choice recognizer: a pure function that
//! scores an utterance against a list of candidate strings, each tagged with
//! an opaque index so several synonyms can map to one logical choice.

use super::model_result::{FoundValue, ModelResult};
use super::tokenizer::{default_tokenizer, Token, TokenizerFn};

/// Options tweaking the value search
#[derive(Debug, Clone)]
pub struct FindValuesOptions {
    /// Allow partial token matches to score below 1.0; off by default so
    /// only complete matches are returned
    pub allow_partial_matches: bool,
    /// Locale passed through to the tokenizer
    pub locale: Option<String>,
    /// Maximum tokens allowed between two matched tokens (default 2)
    pub max_token_distance: Option<usize>,
    /// Alternate word breaker
    pub tokenizer: Option<TokenizerFn>,
}

impl Default for FindValuesOptions {
    fn default() -> Self {
        Self {
            allow_partial_matches: false,
            locale: None,
            max_token_distance: None,
            tokenizer: None,
        }
    }
}

/// A candidate value tagged with the caller's index
#[derive(Debug, Clone, PartialEq)]
pub struct SortedValue {
    /// Candidate string to search for
    pub value: String,
    /// Opaque index mapping the candidate back to its owner
    pub index: usize,
}

impl SortedValue {
    /// Tag a candidate string with its owner's index
    pub fn new(value: impl Into<String>, index: usize) -> Self {
        Self {
            value: value.into(),
            index,
        }
    }
}

/// Find all non-overlapping candidate matches within an utterance
///
/// Candidates are searched longest-first so "bread pudding" is preferred
/// over "bread" at the same position; any other candidate occurrence that
/// does not overlap a kept span is still reported independently. An exact,
/// case-insensitive full-utterance match for a candidate wins outright, even
/// when the candidates differ only in punctuation the tokenizer would strip.
/// Results are in utterance order. Empty input yields an empty list, never
/// an error.
pub fn find_values(
    utterance: &str,
    values: &[SortedValue],
    options: &FindValuesOptions,
) -> Vec<ModelResult<FoundValue>> {
    let trimmed = utterance.trim();
    if trimmed.is_empty() || values.is_empty() {
        return Vec::new();
    }

    // Exact-match preference: a candidate that literally equals the whole
    // utterance beats any looser match for a different candidate.
    let folded = trimmed.to_lowercase();
    if let Some(exact) = values
        .iter()
        .find(|entry| entry.value.trim().to_lowercase() == folded)
    {
        let start = utterance.chars().take_while(|c| c.is_whitespace()).count();
        let end = start + trimmed.chars().count() - 1;
        return vec![ModelResult {
            start,
            end,
            text: trimmed.to_string(),
            type_name: "value".to_string(),
            resolution: FoundValue {
                value: exact.value.trim().to_string(),
                index: exact.index,
                score: 1.0,
            },
        }];
    }

    let tokenizer = options.tokenizer.unwrap_or(default_tokenizer);
    let locale = options.locale.as_deref();
    let max_distance = options.max_token_distance.unwrap_or(2);
    let tokens = tokenizer(utterance, locale);
    if tokens.is_empty() {
        return Vec::new();
    }

    // Search the longest values first so that a containing phrase wins over
    // the word it contains at the same position.
    let mut list: Vec<&SortedValue> = values.iter().collect();
    list.sort_by(|a, b| b.value.chars().count().cmp(&a.value.chars().count()));

    // Token-space matches; spans are converted to char positions after
    // overlap resolution.
    let mut matches: Vec<(usize, usize, ModelResult<FoundValue>)> = Vec::new();
    for entry in list {
        let v_tokens = tokenizer(entry.value.trim(), locale);
        if v_tokens.is_empty() {
            continue;
        }
        // Re-search from the end of each match so repeated occurrences of
        // the same value are all reported.
        let mut start_pos = 0;
        while start_pos < tokens.len() {
            match match_value(
                &tokens,
                max_distance,
                options.allow_partial_matches,
                entry,
                &v_tokens,
                start_pos,
            ) {
                Some((start, end, result)) => {
                    start_pos = end + 1;
                    matches.push((start, end, result));
                }
                None => break,
            }
        }
    }

    // Keep the best-scoring match per candidate index and per token span.
    matches.sort_by(|a, b| {
        b.2.resolution
            .score
            .partial_cmp(&a.2.resolution.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut found_indexes = std::collections::HashSet::new();
    let mut used_tokens = std::collections::HashSet::new();
    let mut results: Vec<ModelResult<FoundValue>> = Vec::new();
    for (start, end, mut result) in matches {
        let mut add = !found_indexes.contains(&result.resolution.index);
        for pos in start..=end {
            if used_tokens.contains(&pos) {
                add = false;
                break;
            }
        }
        if add {
            found_indexes.insert(result.resolution.index);
            for pos in start..=end {
                used_tokens.insert(pos);
            }
            // Translate token positions to char positions.
            result.start = tokens[start].start;
            result.end = tokens[end].end;
            result.text = substring_by_chars(utterance, result.start, result.end);
            results.push(result);
        }
    }

    results.sort_by_key(|result| result.start);
    results
}

/// Attempt the longest token-aligned match for one candidate at or after
/// `start_pos`, returning the token span and scored result
fn match_value(
    tokens: &[Token],
    max_distance: usize,
    allow_partial: bool,
    entry: &SortedValue,
    v_tokens: &[Token],
    mut start_pos: usize,
) -> Option<(usize, usize, ModelResult<FoundValue>)> {
    // Tokens must match in order, so "second last" matches within "the
    // second from last one" but not "the last from the second one". The
    // deviation counts tokens skipped between matched tokens.
    let mut matched = 0usize;
    let mut total_deviation = 0usize;
    let mut start: Option<usize> = None;
    let mut end = 0usize;
    for v_token in v_tokens {
        if let Some(pos) = index_of_token(tokens, v_token, start_pos) {
            let distance = if matched > 0 { pos - start_pos } else { 0 };
            if distance <= max_distance {
                matched += 1;
                total_deviation += distance;
                start_pos = pos + 1;
                if start.is_none() {
                    start = Some(pos);
                }
                end = pos;
            }
        }
    }

    if matched == 0 || (matched != v_tokens.len() && !allow_partial) {
        return None;
    }

    // Completeness is the share of candidate tokens found; accuracy drops
    // with every token skipped inside the matched span.
    let completeness = matched as f64 / v_tokens.len() as f64;
    let accuracy = matched as f64 / (matched + total_deviation) as f64;
    let score = completeness * accuracy;
    let start = start.unwrap_or(0);
    Some((
        start,
        end,
        ModelResult {
            start,
            end,
            text: String::new(),
            type_name: "value".to_string(),
            resolution: FoundValue {
                value: entry.value.trim().to_string(),
                index: entry.index,
                score,
            },
        },
    ))
}

fn index_of_token(tokens: &[Token], token: &Token, start_pos: usize) -> Option<usize> {
    (start_pos..tokens.len()).find(|&i| tokens[i].normalized == token.normalized)
}

fn substring_by_chars(text: &str, start: usize, end_inclusive: usize) -> String {
    text.chars()
        .skip(start)
        .take(end_inclusive - start + 1)
        .collect()
}
