//! Stats line collector.
//!
//! Collaborators record named integer values into a [`StatsCollector`]; each
//! record becomes one text line appended to the caller's buffer:
//!
//! ```text
//! tsd.http.queries 1700000000 42 host=tsd01
//! ```
//!
//! Tags are written in insertion order: the per-record tag first, then the
//! collector-wide tags. The timestamp is captured once when the collector is
//! built, so every line of one collection shares it.

use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct StatsCollector<'a> {
    prefix: String,
    host: String,
    timestamp: u64,
    extratags: Vec<(String, String)>,
    out: &'a mut String,
}

impl<'a> StatsCollector<'a> {
    /// Collector writing `<prefix>.<name> ...` lines into `out`, stamped with
    /// the current time.
    pub fn new(prefix: impl Into<String>, host: impl Into<String>, out: &'a mut String) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::at(prefix, host, timestamp, out)
    }

    /// Like [`StatsCollector::new`] with a fixed timestamp (seconds since the
    /// epoch).
    pub fn at(
        prefix: impl Into<String>,
        host: impl Into<String>,
        timestamp: u64,
        out: &'a mut String,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            host: host.into(),
            timestamp,
            extratags: Vec::new(),
            out,
        }
    }

    /// Tag every subsequent line with `host=<host>`.
    pub fn add_host_tag(&mut self) {
        let host = self.host.clone();
        self.add_extra_tag("host", host);
    }

    /// Tag every subsequent line with `name=value`. Re-adding a name replaces
    /// its value.
    pub fn add_extra_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.extratags.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.extratags.push((name, value)),
        }
    }

    pub fn record(&mut self, name: &str, value: u64) {
        self.write_line(name, value, None);
    }

    /// Record with one additional tag on this line only, e.g. `("type", "all")`.
    pub fn record_tagged(&mut self, name: &str, value: u64, tag: (&str, &str)) {
        self.write_line(name, value, Some(tag));
    }

    /// Append a preformatted line to the output.
    pub fn emit(&mut self, line: &str) {
        self.out.push_str(line);
    }

    fn write_line(&mut self, name: &str, value: u64, tag: Option<(&str, &str)>) {
        let mut line = String::with_capacity(64);
        let _ = write!(line, "{}.{} {} {}", self.prefix, name, self.timestamp, value);
        if let Some((k, v)) = tag {
            let _ = write!(line, " {k}={v}");
        }
        for (k, v) in &self.extratags {
            let _ = write!(line, " {k}={v}");
        }
        line.push('\n');
        self.emit(&line);
    }
}
