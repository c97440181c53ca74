//! Text patterns used by the selector deny list and file exclusion.

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

/// Parse a `/body/flags` regular expression literal.
///
/// Returns `None` when `text` is not slash-delimited or carries unknown
/// flags (so paths like `/src/a.css` stay plain patterns). Supported flags are
/// `i`, `m`, `s` and `x`; `g`, `u` and `y` are accepted and ignored.
pub fn parse_regex_literal(text: &str) -> Option<Result<Regex, regex::Error>> {
    let body = text.strip_prefix('/')?;
    let end = body.rfind('/')?;
    let (pattern, flags) = (&body[..end], &body[end + 1..]);
    if !flags.chars().all(|c| "gimsuxy".contains(c)) {
        return None;
    }

    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            _ => {}
        }
    }
    Some(builder.build())
}

/// An entry of the selector deny list.
#[derive(Debug, Clone)]
pub enum SelectorPattern {
    /// Matches selectors containing this text.
    Substring(String),
    Regex(Regex),
}

impl SelectorPattern {
    /// Parse a configured entry: `/.../flags` is a regular expression,
    /// anything else a substring. A malformed expression is dropped with a
    /// warning, so it never matches.
    pub fn parse(text: &str) -> Option<Self> {
        match parse_regex_literal(text) {
            None => Some(Self::Substring(text.to_string())),
            Some(Ok(regex)) => Some(Self::Regex(regex)),
            Some(Err(err)) => {
                tracing::warn!(pattern = text, %err, "ignoring malformed selector pattern");
                None
            }
        }
    }

    pub fn matches(&self, selector: &str) -> bool {
        match self {
            Self::Substring(text) => selector.contains(text.as_str()),
            Self::Regex(regex) => regex.is_match(selector),
        }
    }
}

impl From<&str> for SelectorPattern {
    fn from(text: &str) -> Self {
        Self::Substring(text.to_string())
    }
}

impl From<Regex> for SelectorPattern {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

/// Selectors whose declarations are never rewritten.
#[derive(Debug, Clone, Default)]
pub struct SelectorBlackList(Vec<SelectorPattern>);

impl SelectorBlackList {
    pub fn new(patterns: Vec<SelectorPattern>) -> Self {
        Self(patterns)
    }

    pub fn is_blacklisted(&self, selector: &str) -> bool {
        self.0.iter().any(|pattern| pattern.matches(selector))
    }
}

/// Predicate over the path a style sheet was read from.
#[derive(Clone)]
pub enum Exclude {
    Pattern(Regex),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Exclude {
    /// Build an exclusion from configuration text, either a bare regular
    /// expression or a `/.../flags` literal. Malformed patterns exclude
    /// nothing.
    pub fn parse(text: &str) -> Option<Self> {
        let compiled = parse_regex_literal(text).unwrap_or_else(|| Regex::new(text));
        match compiled {
            Ok(regex) => Some(Self::Pattern(regex)),
            Err(err) => {
                tracing::warn!(pattern = text, %err, "ignoring malformed exclude pattern");
                None
            }
        }
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn matches(&self, file: &str) -> bool {
        match self {
            Self::Pattern(regex) => regex.is_match(file),
            Self::Predicate(f) => f(file),
        }
    }
}

impl fmt::Debug for Exclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
