//! Audit log for blocked queries.
//!
//! One line per blocked query, in one of two layouts:
//!
//! ```text
//! tsv:  [2024-01-01 10:00:00]<TAB>1.2.3.4<TAB>"ads.example.com"<TAB>"*.example.com"
//! ltsv: time:1704103200<TAB>host:1.2.3.4<TAB>qname:"ads.example.com"<TAB>message:"*.example.com"
//! ```

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;

use crate::{Error, Result};

/// Audit line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Tab-separated with a bracketed local timestamp
    Tsv,
    /// Labeled tab-separated with a Unix timestamp
    Ltsv,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Tsv => "tsv",
            LogFormat::Ltsv => "ltsv",
        }
    }

    /// Render one record, newline included.
    pub fn format(&self, record: &AuditRecord<'_>, now: &DateTime<Local>) -> String {
        match self {
            LogFormat::Tsv => format!(
                "{}\t{}\t{}\t{}\n",
                now.format("[%Y-%m-%d %H:%M:%S]"),
                record.client_ip,
                quote(record.qname),
                quote(record.reason)
            ),
            LogFormat::Ltsv => format!(
                "time:{}\thost:{}\tqname:{}\tmessage:{}\n",
                now.timestamp(),
                record.client_ip,
                quote(record.qname),
                quote(record.reason)
            ),
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tsv" => Ok(LogFormat::Tsv),
            "ltsv" => Ok(LogFormat::Ltsv),
            _ => Err(Error::UnknownLogFormat(s.to_string())),
        }
    }
}

/// A blocked query, ready to be logged.
#[derive(Debug, Clone, Copy)]
pub struct AuditRecord<'a> {
    pub client_ip: IpAddr,
    pub qname: &'a str,
    pub reason: &'a str,
}

/// Serialized writer for audit lines.
///
/// The lock covers the open-handle check and the write, so lines from
/// concurrent queries never interleave.
pub struct AuditSink {
    format: LogFormat,
    out: Mutex<Option<Box<dyn Write + Send>>>,
}

impl AuditSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>, format: LogFormat) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        log::info!("Logging blocked queries to [{}] ({})", path.display(), format.as_str());
        Ok(Self::from_writer(file, format))
    }

    /// Wrap an arbitrary writer.
    pub fn from_writer(writer: impl Write + Send + 'static, format: LogFormat) -> Self {
        Self {
            format,
            out: Mutex::new(Some(Box::new(writer))),
        }
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Append a record stamped with the current local time.
    pub fn record(&self, record: &AuditRecord<'_>) -> Result<()> {
        self.record_at(record, &Local::now())
    }

    /// Append a record with an explicit timestamp.
    pub fn record_at(&self, record: &AuditRecord<'_>, now: &DateTime<Local>) -> Result<()> {
        let line = self.format.format(record, now);

        let mut out = self.out.lock();
        let writer = out.as_mut().ok_or(Error::LogNotInitialized)?;
        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        if let Some(writer) = self.out.lock().as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flush and release the handle. Later records fail with `LogNotInitialized`.
    pub fn close(&self) -> Result<()> {
        if let Some(mut writer) = self.out.lock().take() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Wrap a string in double quotes, escaping `"`, `\` and control characters.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0b}' => out.push_str("\\v"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x80 && c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
