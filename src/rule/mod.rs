//! Rule line parsing and classification.
//!
//! One rule per line. Blank lines and lines starting with `#` are skipped.
//! A trailing `@name` ties the rule to a named schedule.
//!
//! | Line                | Kind      | Stored text     |
//! |---------------------|-----------|-----------------|
//! | `ads.example.com`   | Suffix    | `ads.example.com` |
//! | `*.example.com`     | Suffix    | `example.com`   |
//! | `example.*`         | Prefix    | `example.`      |
//! | `*tracker*`         | Substring | `tracker`       |
//! | `ad[0-9]*.net`      | Pattern   | `ad[0-9]*.net`  |

mod index;
mod pattern;

pub use index::{NameIndex, NameIndexBuilder};
pub use pattern::GlobRule;

use crate::error::RuleSyntaxError;
use crate::RuleKind;

/// A classified, normalized rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub kind: RuleKind,
    /// Lowercased text with the kind's wildcards stripped
    pub text: String,
    /// Schedule referenced with `@name`, if any
    pub schedule: Option<String>,
}

impl Rule {
    /// Parse a single rule line.
    ///
    /// Returns `Ok(None)` for blank and comment lines.
    pub fn parse(line: &str) -> Result<Option<Self>, RuleSyntaxError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (text, schedule) = split_schedule(line)?;
        let (kind, text) = classify(text)?;
        if text.is_empty() {
            return Err(RuleSyntaxError::TooShort);
        }

        Ok(Some(Self {
            kind,
            text: text.to_lowercase(),
            schedule,
        }))
    }

    /// Human-readable reason reported when this rule blocks a name.
    pub fn reason(&self) -> String {
        self.kind.reason(&self.text)
    }
}

/// Split `text@schedule`. More than one `@` is an error.
fn split_schedule(line: &str) -> Result<(&str, Option<String>), RuleSyntaxError> {
    let mut parts = line.split('@');
    let text = parts.next().unwrap_or_default();
    let schedule = parts.next();
    if parts.next().is_some() {
        return Err(RuleSyntaxError::UnexpectedAt);
    }

    match schedule {
        Some(name) => {
            let name = name.trim();
            let schedule = (!name.is_empty()).then(|| name.to_string());
            Ok((text.trim(), schedule))
        }
        None => Ok((line, None)),
    }
}

/// Pick the rule kind and strip its wildcards.
fn classify(text: &str) -> Result<(RuleKind, &str), RuleSyntaxError> {
    let leading_star = text.starts_with('*');
    let trailing_star = text.ends_with('*');

    if is_glob_candidate(text) {
        if text.len() < 2 {
            return Err(RuleSyntaxError::TooShort);
        }
        GlobRule::validate(text)?;
        Ok((RuleKind::Pattern, text))
    } else if leading_star && trailing_star {
        if text.len() < 3 {
            return Err(RuleSyntaxError::TooShort);
        }
        Ok((RuleKind::Substring, &text[1..text.len() - 1]))
    } else if trailing_star {
        if text.len() < 2 {
            return Err(RuleSyntaxError::TooShort);
        }
        Ok((RuleKind::Prefix, &text[..text.len() - 1]))
    } else {
        let text = text.strip_prefix('*').unwrap_or(text);
        let text = text.strip_prefix('.').unwrap_or(text);
        Ok((RuleKind::Suffix, text))
    }
}

/// A rule is a glob when it has `?`, `[`, or a `*` that is neither first nor last.
pub fn is_glob_candidate(text: &str) -> bool {
    let last = text.len().saturating_sub(1);
    text.char_indices().any(|(i, c)| match c {
        '?' | '[' => true,
        '*' => i != 0 && i != last,
        _ => false,
    })
}
