//! Word breaking for the choice recognizer
//!
//! The default tokenizer is deliberately simple: it breaks on whitespace and
//! punctuation and lowercases each token. Positions are char offsets into
//! the utterance, with `end` pointing at the last char of the token.

/// One token produced by a tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Char offset of the first char of the token
    pub start: usize,
    /// Char offset of the last char of the token (inclusive)
    pub end: usize,
    /// The token text as it appeared
    pub text: String,
    /// Case-folded form used for matching
    pub normalized: String,
}

/// Signature for an alternate word breaker
///
/// The second argument is the locale of the text, when known; the default
/// tokenizer ignores it.
pub type TokenizerFn = fn(&str, Option<&str>) -> Vec<Token>;

/// Break `text` into lowercase tokens on whitespace and punctuation
///
/// Characters outside the Basic Multilingual Plane (emoji and friends) each
/// become their own single-char token.
pub fn default_tokenizer(text: &str, _locale: Option<&str>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<Token> = None;

    for (pos, chr) in text.chars().enumerate() {
        let code_point = chr as u32;
        if is_breaking_char(code_point) {
            if let Some(token) = current.take() {
                tokens.push(token);
            }
        } else if code_point > 0xffff {
            // Supplementary plane chars break out as their own token.
            if let Some(token) = current.take() {
                tokens.push(token);
            }
            tokens.push(Token {
                start: pos,
                end: pos,
                text: chr.to_string(),
                normalized: chr.to_string(),
            });
        } else if let Some(token) = current.as_mut() {
            token.end = pos;
            token.text.push(chr);
            token.normalized.extend(chr.to_lowercase());
        } else {
            current = Some(Token {
                start: pos,
                end: pos,
                text: chr.to_string(),
                normalized: chr.to_lowercase().collect(),
            });
        }
    }
    if let Some(token) = current.take() {
        tokens.push(token);
    }

    tokens
}

fn is_breaking_char(code_point: u32) -> bool {
    is_between(code_point, 0x0000, 0x002f)
        || is_between(code_point, 0x003a, 0x0040)
        || is_between(code_point, 0x005b, 0x0060)
        || is_between(code_point, 0x007b, 0x00bf)
        || is_between(code_point, 0x02b9, 0x036f)
        || is_between(code_point, 0x2000, 0x2bff)
        || is_between(code_point, 0x2e00, 0x2e7f)
}

fn is_between(value: u32, from: u32, to: u32) -> bool {
    (from..=to).contains(&value)
}
