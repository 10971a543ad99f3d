//! Math notation normalization
//!
//! Converts human-readable, OCR'd or transcribed math into the compact
//! syntax the expression parser reads: `2x^2 - 3x + 1 = 0` becomes
//! `2*x**2-3*x+1=0`. Every solving strategy goes through this one function.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Function names the parser recognises (and rejects as unsupported)
pub const FUNCTION_NAMES: &[&str] = &["sqrt", "sin", "cos", "tan", "log", "ln", "exp"];

/// Two-letter words that are prose, not a product of two symbols
const SHORT_PROSE_WORDS: &[&str] = &[
    "an", "as", "at", "be", "by", "do", "if", "in", "is", "it", "me", "my", "no", "of", "on",
    "or", "so", "to", "up", "us", "we",
];

const SYMBOL_FOLDS: &[(&str, &str)] = &[
    ("²", "**2"),
    ("³", "**3"),
    ("–", "-"),
    ("—", "-"),
    ("−", "-"),
    ("^", "**"),
    ("×", "*"),
    ("·", "*"),
    ("÷", "/"),
];

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[A-Za-z]+").unwrap();
    static ref DIGIT_LETTER: Regex = Regex::new(r"(\d)([a-zA-Z])").unwrap();
    static ref ADJACENT_GROUPS: Regex = Regex::new(r"\)\s*\(").unwrap();
}

pub fn normalize_math_text(text: &str) -> String {
    let text = strip_prose(text);

    let mut text = text
        .chars()
        .filter(|c| !matches!(c, '?' | ':' | ';' | '!'))
        .collect::<String>();
    for (from, to) in SYMBOL_FOLDS {
        text = text.replace(from, to);
    }

    let text = DIGIT_LETTER.replace_all(&text, "${1}*${2}");
    let text = ADJACENT_GROUPS.replace_all(&text, ")*(");

    text.trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// A standalone `a` directly followed by another word is the article.
fn is_article(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = &text[end..];
    if before.map_or(false, |c| !c.is_whitespace()) || !after.starts_with(char::is_whitespace) {
        return false;
    }
    after
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count()
        >= 2
}

/// Drop instruction words ("Solve", "find the") and keep symbols.
fn strip_prose(text: &str) -> String {
    WORD.replace_all(text, |caps: &Captures| {
        let word = &caps[0];
        let lowered = word.to_lowercase();
        let keep = match word.len() {
            1 if lowered == "a" => {
                let whole = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
                !is_article(text, whole.0, whole.1)
            }
            1 => true,
            2 => {
                FUNCTION_NAMES.contains(&lowered.as_str())
                    || !SHORT_PROSE_WORDS.contains(&lowered.as_str())
            }
            _ => FUNCTION_NAMES.contains(&lowered.as_str()),
        };
        if keep {
            word.to_string()
        } else {
            " ".to_string()
        }
    })
    .into_owned()
}
