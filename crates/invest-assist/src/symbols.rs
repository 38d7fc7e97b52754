//! Ticker symbol parsing and the chat pronoun heuristic

use crate::error::{AssistError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Uppercase words that look like tickers but almost never are
const NOT_TICKERS: &[&str] = &[
    "A", "I", "AI", "BSE", "CEO", "CFO", "EPS", "ETF", "GDP", "IPO", "NSE", "OK", "PE", "US",
    "USA", "USD", "INR",
];

/// Words after which a lowercase token is read as a symbol ("about nvda")
const LOOKUP_CUES: &[&str] = &[
    "about", "of", "for", "on", "buy", "sell", "hold", "ticker", "symbol", "stock", "shares",
];

/// Lowercase words that follow a cue without being symbols
const COMMON_WORDS: &[&str] = &[
    "a", "all", "an", "any", "it", "its", "me", "more", "my", "now", "our", "some", "that",
    "the", "their", "them", "these", "this", "those", "today", "us", "you", "your",
];

/// Market a symbol trades on, derived from its suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exchange {
    /// National Stock Exchange of India (`.NS`)
    Nse,
    /// Bombay Stock Exchange (`.BO`)
    Bse,
    /// US listing (no suffix)
    Us,
}

impl Exchange {
    /// Classify a symbol by suffix
    pub fn from_symbol(symbol: &str) -> Self {
        let upper = symbol.trim().to_ascii_uppercase();
        if upper.ends_with(".NS") {
            Self::Nse
        } else if upper.ends_with(".BO") {
            Self::Bse
        } else {
            Self::Us
        }
    }

    /// Quote currency of the market
    pub fn currency(&self) -> &'static str {
        match self {
            Self::Nse | Self::Bse => "INR",
            Self::Us => "USD",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nse => "NSE",
            Self::Bse => "BSE",
            Self::Us => "US",
        })
    }
}

/// Parse a comma separated symbol field
///
/// Entries are trimmed and uppercased; empty entries and repeats are
/// dropped, first occurrence order is kept.
///
/// ```
/// use invest_assist::symbols::parse_symbols;
///
/// assert_eq!(parse_symbols("AAPL, , tsla").unwrap(), vec!["AAPL", "TSLA"]);
/// assert!(parse_symbols("  ,  ").is_err());
/// ```
pub fn parse_symbols(input: &str) -> Result<Vec<String>> {
    let mut symbols: Vec<String> = Vec::new();
    for entry in input.split(',') {
        let symbol = entry.trim().to_ascii_uppercase();
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return Err(AssistError::EmptySymbols);
    }
    Ok(symbols)
}

/// Last ticker-looking token of a message
///
/// A token counts when it ends in `.NS`/`.BO` (any case) or is written as a
/// 1-5 letter uppercase word that is not a common abbreviation. Without such
/// a token, see [`detect_ticker_with`].
pub fn detect_ticker(message: &str) -> Option<String> {
    detect_ticker_with(message, &[])
}

/// [`detect_ticker`], falling back to lowercase 1-5 letter words
///
/// The fallback takes a word equal to one of `known` (symbols seen earlier),
/// or a word right after a lookup cue such as "about" or "of". It is
/// returned uppercased.
///
/// ```
/// use invest_assist::symbols::detect_ticker_with;
///
/// assert_eq!(detect_ticker_with("Tell me about nvda", &[]).as_deref(), Some("NVDA"));
/// assert_eq!(detect_ticker_with("is tsla up?", &["TSLA".to_string()]).as_deref(), Some("TSLA"));
/// assert_eq!(detect_ticker_with("what about the news", &[]), None);
/// ```
pub fn detect_ticker_with(message: &str, known: &[String]) -> Option<String> {
    detect_tickers(message, known).pop()
}

/// Every ticker-looking token of a message, in order
///
/// Same rules as [`detect_ticker_with`]; the lowercase fallback only applies
/// when the message has no suffixed or uppercase ticker.
pub fn detect_tickers(message: &str, known: &[String]) -> Vec<String> {
    let words: Vec<&str> = message.split_whitespace().collect();
    let strict: Vec<String> = words.iter().filter_map(|word| ticker_candidate(word)).collect();
    if !strict.is_empty() {
        return strict;
    }

    words
        .iter()
        .enumerate()
        .filter_map(|(i, word)| {
            let token = clean_token(word);
            let plain = (1..=5).contains(&token.len())
                && token.chars().all(|c| c.is_ascii_alphabetic());
            if !plain {
                return None;
            }

            let upper = token.to_ascii_uppercase();
            if known.contains(&upper) {
                return Some(upper);
            }
            let after_cue = i
                .checked_sub(1)
                .map(|prev| clean_token(words[prev]).to_ascii_lowercase())
                .is_some_and(|prev| LOOKUP_CUES.contains(&prev.as_str()));
            let lower = token.to_ascii_lowercase();
            let ordinary = COMMON_WORDS.contains(&lower.as_str())
                || NOT_TICKERS.contains(&upper.as_str());
            (after_cue && !ordinary).then_some(upper)
        })
        .collect()
}

fn clean_token(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '&')
}

fn ticker_candidate(word: &str) -> Option<String> {
    let token = clean_token(word);
    let upper = token.to_ascii_uppercase();

    if let Some(base) = upper
        .strip_suffix(".NS")
        .or_else(|| upper.strip_suffix(".BO"))
    {
        let valid_base = !base.is_empty()
            && base
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '&' || c == '-');
        return valid_base.then_some(upper);
    }

    let plain = (1..=5).contains(&token.len())
        && token.chars().all(|c| c.is_ascii_uppercase())
        && !NOT_TICKERS.contains(&token);
    plain.then(|| token.to_string())
}

/// Replace every standalone "its" (any case) with `ticker`
pub fn substitute_pronoun(message: &str, ticker: &str) -> String {
    let mut out = String::with_capacity(message.len() + ticker.len());
    let mut word_start: Option<usize> = None;

    let flush = |out: &mut String, word: &str| {
        if word.eq_ignore_ascii_case("its") {
            out.push_str(ticker);
        } else {
            out.push_str(word);
        }
    };

    for (i, c) in message.char_indices() {
        let is_word = c.is_alphanumeric() || c == '_';
        match (is_word, word_start) {
            (true, None) => word_start = Some(i),
            (false, Some(start)) => {
                flush(&mut out, &message[start..i]);
                word_start = None;
                out.push(c);
            }
            (false, None) => out.push(c),
            (true, Some(_)) => {}
        }
    }
    if let Some(start) = word_start {
        flush(&mut out, &message[start..]);
    }

    out
}
