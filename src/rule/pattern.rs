//! Glob pattern rules.

use glob::Pattern;

use crate::error::RuleSyntaxError;
use crate::schedule::WindowId;

/// A compiled shell-style pattern matched against the whole name.
///
/// `*` matches any run of characters, `?` one character and `[...]` a
/// character class (`[!...]` negates). Runs of `*` act as a single `*`.
/// Matching is case-sensitive; names are lowercased before they get here.
#[derive(Debug, Clone)]
pub struct GlobRule {
    text: String,
    pattern: Pattern,
    window: Option<WindowId>,
}

impl GlobRule {
    pub fn new(text: &str, window: Option<WindowId>) -> Result<Self, RuleSyntaxError> {
        let pattern = Pattern::new(&collapse_stars(text))
            .map_err(|e| RuleSyntaxError::InvalidPattern(format!("{}: {}", text, e.msg)))?;
        Ok(Self {
            text: text.to_string(),
            pattern,
            window,
        })
    }

    /// Check that `text` compiles as a glob.
    pub fn validate(text: &str) -> Result<(), RuleSyntaxError> {
        Self::new(text, None).map(|_| ())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn window(&self) -> Option<WindowId> {
        self.window
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches(name)
    }
}

/// `glob` only accepts `**` as a whole path component.
fn collapse_stars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_mark() {
        let rule = GlobRule::new("a?c.com", None).unwrap();
        assert!(rule.matches("abc.com"));
        assert!(rule.matches("axc.com"));
        assert!(!rule.matches("ac.com"));
        assert!(!rule.matches("abbc.com"));
    }

    #[test]
    fn test_star_and_class() {
        let rule = GlobRule::new("ad[0-9]*.example.com", Some(3)).unwrap();
        assert!(rule.matches("ad1.example.com"));
        assert!(rule.matches("ad42-cdn.example.com"));
        assert!(!rule.matches("adx.example.com"));
        assert!(!rule.matches("ad1.example.com.evil"));
        assert_eq!(rule.window(), Some(3));
        assert_eq!(rule.text(), "ad[0-9]*.example.com");
    }

    #[test]
    fn test_negated_class() {
        let rule = GlobRule::new("[!w]*.example.com", None).unwrap();
        assert!(rule.matches("ads.example.com"));
        assert!(!rule.matches("www.example.com"));
    }

    #[test]
    fn test_case_sensitive() {
        let rule = GlobRule::new("a?c.com", None).unwrap();
        assert!(!rule.matches("ABC.COM"));
    }

    #[test]
    fn test_double_star() {
        let rule = GlobRule::new("ads**.com", None).unwrap();
        assert!(rule.matches("adsxyz.com"));
        assert!(rule.matches("ads.com"));
        assert!(!rule.matches("adsxyz.net"));
        assert_eq!(rule.text(), "ads**.com");

        assert_eq!(collapse_stars("a***b?*c**"), "a*b?*c*");
    }

    #[test]
    fn test_invalid() {
        assert!(GlobRule::validate("ad[0-9.com").is_err());
        assert!(GlobRule::validate("a?c.com").is_ok());
    }
}
