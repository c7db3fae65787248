//! Rule kind definitions.

use serde::Serialize;
use std::fmt;

/// RuleKind is the class a block rule falls into after classification.
///
/// Kinds are listed in match precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Name ends with the rule text on a label boundary (`example.com`, `*.example.com`)
    Suffix,
    /// Name starts with the rule text (`example.*`)
    Prefix,
    /// Name contains the rule text (`*ads*`)
    Substring,
    /// Name matches a shell-style glob (`ad[0-9].example.com`)
    Pattern,
}

impl RuleKind {
    /// All kinds, in match precedence order.
    pub const ALL: [RuleKind; 4] = [
        RuleKind::Suffix,
        RuleKind::Prefix,
        RuleKind::Substring,
        RuleKind::Pattern,
    ];

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Suffix => "suffix",
            RuleKind::Prefix => "prefix",
            RuleKind::Substring => "substring",
            RuleKind::Pattern => "pattern",
        }
    }

    /// Render the human-readable reason for a match on normalized rule text.
    pub fn reason(&self, text: &str) -> String {
        match self {
            RuleKind::Suffix => format!("*.{}", text),
            RuleKind::Prefix => format!("{}*", text),
            RuleKind::Substring => format!("*{}*", text),
            RuleKind::Pattern => text.to_string(),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
