//! Top-level choice recognition, including positional references
//!
//! Layered above [`find_choices`]: when no lexical match is found, a purely
//! numeric utterance ("1") or an ordinal word ("first") is interpreted as a
//! 1-based position in the choice list. Both interpretations are
//! independently toggleable; with both disabled only lexical matches are
//! returned.

use super::choice::Choice;
use super::find_choices::{find_choices, FindChoicesOptions};
use super::model_result::{FoundChoice, ModelResult};
use super::tokenizer::{default_tokenizer, Token};

/// Options tweaking full choice recognition
#[derive(Debug, Clone)]
pub struct RecognizeChoicesOptions {
    /// Lexical search options
    pub find: FindChoicesOptions,
    /// Interpret numeric utterances as 1-based positions (default true)
    pub recognize_numbers: bool,
    /// Interpret ordinal words as 1-based positions (default true)
    pub recognize_ordinals: bool,
}

impl Default for RecognizeChoicesOptions {
    fn default() -> Self {
        Self {
            find: FindChoicesOptions::default(),
            recognize_numbers: true,
            recognize_ordinals: true,
        }
    }
}

/// Recognize a choice by name, synonym, ordinal or number
///
/// Lexical matches win; positional interpretations are only consulted when
/// nothing matched by name. Ordinals are tried before plain numbers, as a
/// user saying "the first one" is more deliberate than a bare digit.
pub fn recognize_choices(
    utterance: &str,
    choices: &[Choice],
    options: &RecognizeChoicesOptions,
) -> Vec<ModelResult<FoundChoice>> {
    let mut matched = find_choices(utterance, choices, &options.find);
    if !matched.is_empty() {
        return matched;
    }

    let locale = options.find.find_values.locale.as_deref();
    let tokens = default_tokenizer(utterance, locale);

    if options.recognize_ordinals {
        for token in &tokens {
            if let Some(position) = parse_ordinal(&token.normalized) {
                if let Some(result) = choice_at(choices, position, token) {
                    matched.push(result);
                }
            }
        }
    }

    if matched.is_empty() && options.recognize_numbers {
        for token in &tokens {
            if let Ok(position) = token.normalized.parse::<i64>() {
                if let Some(result) = choice_at(choices, position, token) {
                    matched.push(result);
                }
            }
        }
    }

    matched
}

/// Resolve a 1-based position (negative counts from the end) to a choice
fn choice_at(
    choices: &[Choice],
    position: i64,
    token: &Token,
) -> Option<ModelResult<FoundChoice>> {
    let len = choices.len() as i64;
    let index = if position > 0 && position <= len {
        (position - 1) as usize
    } else if position < 0 && -position <= len {
        (len + position) as usize
    } else {
        return None;
    };
    Some(ModelResult {
        start: token.start,
        end: token.end,
        text: token.text.clone(),
        type_name: "choice".to_string(),
        resolution: FoundChoice {
            value: choices[index].value.clone(),
            index,
            score: 1.0,
            synonym: None,
        },
    })
}

/// Parse an English ordinal word or suffixed number ("first", "3rd")
///
/// Deliberately narrow: covers the forms a closed choice list realistically
/// receives rather than pulling in a full number-recognition library.
fn parse_ordinal(token: &str) -> Option<i64> {
    let word = match token {
        "first" => Some(1),
        "second" => Some(2),
        "third" => Some(3),
        "fourth" => Some(4),
        "fifth" => Some(5),
        "sixth" => Some(6),
        "seventh" => Some(7),
        "eighth" => Some(8),
        "ninth" => Some(9),
        "tenth" => Some(10),
        "last" => Some(-1),
        _ => None,
    };
    if word.is_some() {
        return word;
    }
    // Suffixed digits: 1st, 2nd, 3rd, 4th...
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(digits) = token.strip_suffix(suffix) {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return digits.parse().ok();
            }
        }
    }
    None
}
