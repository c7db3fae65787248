//! Resolver plugin wiring: rules, schedules and the audit log behind one handle.

use arc_swap::ArcSwap;
use hickory_proto::op::Message;
use std::fs::File;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::audit::{AuditRecord, AuditSink};
use crate::ruleset::{BlockMatch, BlockNameConfig, BlockRules};
use crate::schedule::Schedules;
use crate::{Action, Result};

/// Transport the query arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientProto {
    Udp,
    Tcp,
}

impl ClientProto {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientProto::Udp => "udp",
            ClientProto::Tcp => "tcp",
        }
    }
}

/// Per-query state shared with the resolver.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub client_proto: ClientProto,
    pub client_addr: SocketAddr,
    /// Set to [`Action::Reject`] when the query name is blocked
    pub action: Action,
}

impl QueryContext {
    pub fn new(client_proto: ClientProto, client_addr: SocketAddr) -> Self {
        Self {
            client_proto,
            client_addr,
            action: Action::Continue,
        }
    }
}

/// BlockNamePlugin blocks queries whose name matches the rule file.
///
/// # Examples
/// ```ignore
/// use blockname::{BlockNameConfig, BlockNamePlugin, ClientProto, QueryContext};
///
/// let plugin = BlockNamePlugin::init(BlockNameConfig::load("blockname.yaml")?)?;
/// let mut ctx = QueryContext::new(ClientProto::Udp, client_addr);
/// plugin.eval(&mut ctx, &message)?;
/// if ctx.action.is_reject() {
///     // answer with REFUSED
/// }
/// ```
pub struct BlockNamePlugin {
    config: BlockNameConfig,
    schedules: Schedules,
    rules: ArcSwap<BlockRules>,
    sink: Option<AuditSink>,
}

impl BlockNamePlugin {
    pub const NAME: &'static str = "block_name";
    pub const DESCRIPTION: &'static str = "Block DNS queries matching name patterns";

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    /// Load rules and open the audit log.
    ///
    /// Fails on an unreadable rule file, a bad schedule, an unknown log
    /// format or an audit log that cannot be opened.
    pub fn init(config: BlockNameConfig) -> Result<Self> {
        let schedules = config.schedules()?;
        let rules = load_rules(&config, &schedules)?;

        let sink = match &config.log_file {
            Some(path) => Some(AuditSink::open(path, config.log_format()?)?),
            None => None,
        };

        Ok(Self {
            config,
            schedules,
            rules: ArcSwap::from_pointee(rules),
            sink,
        })
    }

    /// Build a plugin around already compiled rules.
    ///
    /// Schedule enforcement follows `config`, as it does on reload.
    pub fn with_rules(config: BlockNameConfig, rules: BlockRules, sink: Option<AuditSink>) -> Self {
        let rules = rules.with_schedule_enforcement(config.enforce_schedules);
        Self {
            schedules: rules.schedules().clone(),
            config,
            rules: ArcSwap::from_pointee(rules),
            sink,
        }
    }

    /// Snapshot of the current rules.
    pub fn rules(&self) -> Arc<BlockRules> {
        self.rules.load_full()
    }

    pub fn config(&self) -> &BlockNameConfig {
        &self.config
    }

    /// Evaluate a query.
    ///
    /// Only messages with exactly one question are considered. On a match the
    /// context's action becomes [`Action::Reject`] and the audit log, if any,
    /// gets one line.
    pub fn eval(&self, ctx: &mut QueryContext, msg: &Message) -> Result<()> {
        let [query] = msg.queries() else {
            return Ok(());
        };
        let qname = query.name().to_ascii();
        let qname = qname.strip_suffix('.').unwrap_or(&qname).to_lowercase();

        match self.rules.load().match_name(&qname) {
            Some(m) => self.reject(ctx, &qname, &m),
            None => Ok(()),
        }
    }

    fn reject(&self, ctx: &mut QueryContext, qname: &str, m: &BlockMatch) -> Result<()> {
        log::debug!(
            "Blocked [{}] from {} over {} ({})",
            qname,
            ctx.client_addr.ip(),
            ctx.client_proto.as_str(),
            m.reason
        );
        ctx.action = Action::Reject;

        match &self.sink {
            Some(sink) => sink.record(&AuditRecord {
                client_ip: ctx.client_addr.ip(),
                qname,
                reason: &m.reason,
            }),
            None => Ok(()),
        }
    }

    /// Recompile the rule file and swap it in.
    ///
    /// On error the previous rules stay active.
    pub fn reload(&self) -> Result<()> {
        let rules = load_rules(&self.config, &self.schedules)?;
        self.rules.store(Arc::new(rules));
        log::debug!("Reloaded block rules from [{}]", self.config.blocked_names_file.display());
        Ok(())
    }

    /// Flush the audit log before shutdown.
    pub fn drop_plugin(&self) -> Result<()> {
        match &self.sink {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

fn load_rules(config: &BlockNameConfig, schedules: &Schedules) -> Result<BlockRules> {
    log::info!(
        "Loading the set of blocking rules from [{}]",
        config.blocked_names_file.display()
    );
    let file = File::open(&config.blocked_names_file)?;
    let rules = BlockRules::compile(file, schedules.clone())?
        .with_schedule_enforcement(config.enforce_schedules);

    let stats = rules.stats();
    log::info!(
        "Loaded {} blocking rules ({} suffix, {} prefix, {} substring, {} pattern, {} skipped)",
        stats.total(),
        stats.suffixes,
        stats.prefixes,
        stats.substrings,
        stats.patterns,
        stats.skipped
    );
    Ok(rules)
}
