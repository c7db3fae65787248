//! Plugin action types.

use std::fmt;

/// Action tells the resolver what to do with a query after plugin evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Action {
    /// Keep resolving
    #[default]
    Continue = 0,
    /// Refuse the query
    Reject = 1,
}

impl Action {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Continue => "CONTINUE",
            Action::Reject => "REJECT",
        }
    }

    /// Check whether the query was refused.
    pub fn is_reject(&self) -> bool {
        matches!(self, Action::Reject)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
