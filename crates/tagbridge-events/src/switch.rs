//! Switch value matching.
//!
//! A switch value is compiled once when the declaration is loaded. All
//! comparisons are case-insensitive.
//!
//! - `*` matches anything
//! - `a|b|c` matches any of the options
//! - `chest*`, `*_chest` are wildcards
//! - `regex:<pattern>` is an anchored regular expression
//! - `1..5`, `..10`, `2.5..` are inclusive numeric ranges
//! - anything else is exact text

use regex::{Regex, RegexBuilder};

use crate::DeclarationError;

#[derive(Debug, Clone)]
pub enum SwitchMatcher {
    Any,
    Exact(String),
    Pattern(Regex),
    Range { min: Option<f64>, max: Option<f64> },
    OneOf(Vec<SwitchMatcher>),
}

impl SwitchMatcher {
    pub fn compile(text: &str) -> Result<Self, DeclarationError> {
        let text = text.trim();
        if let Some(pattern) = strip_regex_prefix(text) {
            return anchored(pattern).map(SwitchMatcher::Pattern);
        }
        if text.contains('|') {
            return text
                .split('|')
                .map(Self::compile_single)
                .collect::<Result<Vec<_>, _>>()
                .map(SwitchMatcher::OneOf);
        }
        Self::compile_single(text)
    }

    fn compile_single(text: &str) -> Result<Self, DeclarationError> {
        let text = text.trim().to_lowercase();
        if text == "*" {
            return Ok(SwitchMatcher::Any);
        }
        if text.contains('*') {
            let pattern = text
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            return anchored(&pattern).map(SwitchMatcher::Pattern);
        }
        if let Some(range) = parse_range(&text) {
            return Ok(range);
        }
        Ok(SwitchMatcher::Exact(text))
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            SwitchMatcher::Any => true,
            SwitchMatcher::Exact(expected) => value.trim().eq_ignore_ascii_case(expected),
            SwitchMatcher::Pattern(regex) => regex.is_match(value.trim()),
            SwitchMatcher::Range { min, max } => match value.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => {
                    min.is_none_or(|min| number >= min) && max.is_none_or(|max| number <= max)
                }
                _ => false,
            },
            SwitchMatcher::OneOf(options) => options.iter().any(|option| option.matches(value)),
        }
    }
}

fn strip_regex_prefix(text: &str) -> Option<&str> {
    let head = text.get(..6)?;
    head.eq_ignore_ascii_case("regex:").then(|| &text[6..])
}

fn anchored(pattern: &str) -> Result<Regex, DeclarationError> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .build()
        .map_err(|e| DeclarationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

fn parse_range(text: &str) -> Option<SwitchMatcher> {
    let (low, high) = text.split_once("..")?;
    let bound = |side: &str| -> Option<Option<f64>> {
        let side = side.trim();
        if side.is_empty() {
            Some(None)
        } else {
            side.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
        }
    };
    let (min, max) = (bound(low)?, bound(high)?);
    if min.is_none() && max.is_none() {
        return None;
    }
    Some(SwitchMatcher::Range { min, max })
}
