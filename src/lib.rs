//! blockname - name-blocking rules for DNS resolvers.
//!
//! This crate decides whether a query name is blocked by a flat rule file,
//! and why. It is meant to run once per query inside a resolver.
//!
//! # Rule Kinds
//!
//! - **Suffix**: `example.com`, `*.example.com` - the name or any subdomain
//! - **Prefix**: `example.*` - names starting with `example.`
//! - **Substring**: `*ads*` - names containing `ads`
//! - **Pattern**: `ad[0-9]?.example.com` - shell-style globs over the whole name
//!
//! Any rule may end with `@schedule` to tie it to a named weekly schedule.
//!
//! # Quick Start
//!
//! ```ignore
//! use blockname::BlockRules;
//!
//! let rules = BlockRules::from_reader("ads.example.com\n*tracker*\n".as_bytes())?;
//!
//! let m = rules.match_name("cdn.ads.example.com").unwrap();
//! assert_eq!(m.reason, "*.ads.example.com");
//! assert!(rules.match_name("example.com").is_none());
//! ```
//!
//! # Resolver Plugin
//!
//! [`BlockNamePlugin`] loads the rule file named by a [`BlockNameConfig`],
//! evaluates decoded DNS messages, sets [`Action::Reject`] on a match and
//! appends a line to the audit log:
//!
//! ```ignore
//! use blockname::{BlockNameConfig, BlockNamePlugin, ClientProto, QueryContext};
//!
//! let plugin = BlockNamePlugin::init(BlockNameConfig::load("blockname.yaml")?)?;
//! let mut ctx = QueryContext::new(ClientProto::Udp, client_addr);
//! plugin.eval(&mut ctx, &message)?;
//! ```
//!
//! # Matching Priority
//!
//! 1. Suffix rules, on a label boundary (`vil.com` never blocks `evil.com`)
//! 2. Prefix rules, longest first
//! 3. Substring rules, in file order
//! 4. Patterns, in file order

mod action;
mod error;
mod rule_kind;

pub mod audit;
pub mod plugin;
pub mod rule;
pub mod ruleset;
pub mod schedule;

// Re-export core types
pub use action::Action;
pub use error::{Error, Result, RuleSyntaxError};
pub use rule_kind::RuleKind;

// Re-export ruleset types
pub use ruleset::{BlockMatch, BlockNameConfig, BlockRules, Decision, RuleStats};

// Re-export plugin types
pub use plugin::{BlockNamePlugin, ClientProto, QueryContext};

// Re-export audit and schedule types
pub use audit::{AuditRecord, AuditSink, LogFormat};
pub use schedule::{Schedules, TimeRange, TimeRangeStr, WeeklyRanges};
