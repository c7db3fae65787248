//! Compiled block rules and the match engine.

mod config;

pub use config::BlockNameConfig;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::io::{BufRead, BufReader, Read};

use crate::rule::{GlobRule, NameIndex, NameIndexBuilder, Rule};
use crate::schedule::{Schedules, WindowId};
use crate::{Result, RuleKind};

/// A rule that blocked a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockMatch {
    pub kind: RuleKind,
    /// `*.suffix`, `prefix*`, `*substring*` or the glob itself
    pub reason: String,
}

/// Outcome of evaluating one name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Decision {
    pub blocked: bool,
    pub reason: String,
}

impl From<Option<BlockMatch>> for Decision {
    fn from(m: Option<BlockMatch>) -> Self {
        match m {
            Some(m) => Decision {
                blocked: true,
                reason: m.reason,
            },
            None => Decision::default(),
        }
    }
}

/// Rule counts after compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuleStats {
    /// Distinct prefix keys
    pub prefixes: usize,
    /// Distinct suffix keys
    pub suffixes: usize,
    pub substrings: usize,
    pub patterns: usize,
    /// Lines dropped for syntax errors
    pub skipped: usize,
}

impl RuleStats {
    /// Total number of stored rules.
    pub fn total(&self) -> usize {
        self.prefixes + self.suffixes + self.substrings + self.patterns
    }

    /// Stored rules of one kind.
    pub fn count(&self, kind: RuleKind) -> usize {
        match kind {
            RuleKind::Suffix => self.suffixes,
            RuleKind::Prefix => self.prefixes,
            RuleKind::Substring => self.substrings,
            RuleKind::Pattern => self.patterns,
        }
    }
}

/// BlockRules holds the compiled rule classes.
///
/// Built once from a rule file, then read-only. Names are checked against
/// the classes in this order, and the first hit wins:
/// 1. Suffix rules (on a label boundary, with one parent-domain retry)
/// 2. Prefix rules (longest match)
/// 3. Substring rules (file order)
/// 4. Glob patterns (file order)
pub struct BlockRules {
    prefixes: NameIndex,
    /// Keyed by reversed rule text
    suffixes: NameIndex,
    substrings: Vec<(String, Option<WindowId>)>,
    patterns: Vec<GlobRule>,
    schedules: Schedules,
    enforce_schedules: bool,
    stats: RuleStats,
}

impl BlockRules {
    /// Compile rules without any schedules.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::compile(reader, Schedules::new())
    }

    /// Compile rules from a reader.
    ///
    /// Lines with syntax errors are logged and skipped. `@name` references to
    /// unknown schedules are logged and the rule is kept without one.
    pub fn compile<R: Read>(reader: R, schedules: Schedules) -> Result<Self> {
        let buf_reader = BufReader::new(reader);

        let mut prefixes = NameIndexBuilder::new();
        let mut suffixes = NameIndexBuilder::new();
        let mut substrings = Vec::new();
        let mut patterns = Vec::new();
        let mut skipped = 0;

        for (line_no, line) in buf_reader.lines().enumerate() {
            let line = line?;
            let line_no = line_no + 1;

            let rule = match Rule::parse(&line) {
                Ok(Some(rule)) => rule,
                Ok(None) => continue,
                Err(e) => {
                    log::error!("Syntax error in block rules at line {}: {}", line_no, e);
                    skipped += 1;
                    continue;
                }
            };

            let window = rule.schedule.as_deref().and_then(|name| {
                let id = schedules.lookup(name);
                if id.is_none() {
                    log::error!("Time range [{}] not found at line {}", name, line_no);
                }
                id
            });

            match rule.kind {
                RuleKind::Substring => substrings.push((rule.text, window)),
                RuleKind::Pattern => match GlobRule::new(&rule.text, window) {
                    Ok(glob) => patterns.push(glob),
                    Err(e) => {
                        log::error!("Syntax error in block rules at line {}: {}", line_no, e);
                        skipped += 1;
                    }
                },
                RuleKind::Prefix => prefixes.insert(&rule.text, window),
                RuleKind::Suffix => suffixes.insert(&reverse(&rule.text), window),
            }
        }

        let stats = RuleStats {
            prefixes: prefixes.len(),
            suffixes: suffixes.len(),
            substrings: substrings.len(),
            patterns: patterns.len(),
            skipped,
        };

        Ok(Self {
            prefixes: prefixes.build()?,
            suffixes: suffixes.build()?,
            substrings,
            patterns,
            schedules,
            enforce_schedules: false,
            stats,
        })
    }

    /// Make schedules gate their rules at match time.
    ///
    /// Off by default: every rule is active regardless of its `@name`.
    pub fn with_schedule_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_schedules = enforce;
        self
    }

    pub fn enforces_schedules(&self) -> bool {
        self.enforce_schedules
    }

    pub fn stats(&self) -> RuleStats {
        self.stats
    }

    pub fn schedules(&self) -> &Schedules {
        &self.schedules
    }

    /// Check a name against the rules at the current local time.
    pub fn match_name(&self, name: &str) -> Option<BlockMatch> {
        if self.enforce_schedules {
            self.match_name_at(name, Some(&Local::now().naive_local()))
        } else {
            self.match_name_at(name, None)
        }
    }

    /// Check a name against the rules.
    ///
    /// With `at` set, rules whose schedule is inactive at that time are
    /// skipped. With `None`, schedules are ignored.
    pub fn match_name_at(&self, name: &str, at: Option<&NaiveDateTime>) -> Option<BlockMatch> {
        let name = name.strip_suffix('.').unwrap_or(name).to_lowercase();
        if name.len() < 2 {
            return None;
        }

        let active = |window: Option<WindowId>| match (window, at) {
            (Some(id), Some(at)) => self
                .schedules
                .get(id)
                .map(|ranges| ranges.is_active_at(at))
                .unwrap_or(true),
            _ => true,
        };

        let rev_name = reverse(&name);
        if let Some(len) = self.match_suffix(&rev_name, &active) {
            return Some(BlockMatch {
                kind: RuleKind::Suffix,
                reason: RuleKind::Suffix.reason(&reverse(&rev_name[..len])),
            });
        }

        if let Some((len, _)) = self.prefixes.longest_prefix(name.as_bytes(), &active) {
            return Some(BlockMatch {
                kind: RuleKind::Prefix,
                reason: RuleKind::Prefix.reason(&name[..len]),
            });
        }

        if let Some((substring, _)) = self
            .substrings
            .iter()
            .find(|(substring, window)| name.contains(substring.as_str()) && active(*window))
        {
            return Some(BlockMatch {
                kind: RuleKind::Substring,
                reason: RuleKind::Substring.reason(substring),
            });
        }

        if let Some(pattern) = self
            .patterns
            .iter()
            .find(|pattern| pattern.matches(&name) && active(pattern.window()))
        {
            return Some(BlockMatch {
                kind: RuleKind::Pattern,
                reason: RuleKind::Pattern.reason(pattern.text()),
            });
        }

        None
    }

    /// Evaluate a name into a [`Decision`].
    pub fn decide(&self, name: &str) -> Decision {
        self.match_name(name).into()
    }

    /// Longest active suffix key on a label boundary of the reversed name.
    ///
    /// When the longest active key stops mid-label, the lookup is retried
    /// once on the parent domain (the reversed name cut at its last `.`).
    fn match_suffix<F>(&self, rev_name: &str, active: F) -> Option<usize>
    where
        F: Fn(Option<WindowId>) -> bool + Copy,
    {
        let (len, _) = self.suffixes.longest_prefix(rev_name.as_bytes(), active)?;
        if on_label_boundary(rev_name, len) {
            return Some(len);
        }

        if len < rev_name.len() {
            if let Some(dot) = rev_name.rfind('.').filter(|&dot| dot > 0) {
                let parent = &rev_name[..dot];
                let (len, _) = self.suffixes.longest_prefix(parent.as_bytes(), active)?;
                if on_label_boundary(parent, len) {
                    return Some(len);
                }
            }
        }

        None
    }
}

fn on_label_boundary(rev_name: &str, len: usize) -> bool {
    len == rev_name.len() || rev_name.as_bytes()[len] == b'.'
}

fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}
