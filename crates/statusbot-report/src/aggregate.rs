//! Aggregation pipeline: filters, classifies and summarizes records.
//!
//! Pure over its input. Summary maps keep first-seen-in-input order so the
//! rendered output is stable across runs.

use statusbot_core::config::ReportConfig;
use statusbot_core::types::{ConnectionState, Record};

pub const NO_NAME: &str = "No name";
pub const NO_PHASE: &str = "No phase";
pub const NO_MARKING: &str = "No marking";

/// Category rules for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Records tagged with any of these never reach the report.
    pub excluded_categories: Vec<String>,
    /// Tag counted in the "standard" summary line.
    pub standard_category: String,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for AggregateOptions {
    fn from(cfg: &ReportConfig) -> Self {
        Self {
            excluded_categories: cfg.excluded_categories.clone(),
            standard_category: cfg.standard_category.clone(),
        }
    }
}

impl AggregateOptions {
    fn is_excluded(&self, record: &Record) -> bool {
        record
            .category
            .as_deref()
            .map(str::trim)
            .is_some_and(|c| self.excluded_categories.iter().any(|x| x == c))
    }
}

/// Counter bucket for a record's connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionBucket {
    Linked(ConnectionState),
    /// The record has no connection sub-record at all.
    NoConnection,
}

impl ConnectionBucket {
    pub fn of(record: &Record) -> Self {
        match &record.connection {
            Some(conn) => Self::Linked(conn.state.clone()),
            None => Self::NoConnection,
        }
    }

    /// Display label, with the raw value for unrecognized states.
    pub fn label(&self) -> String {
        match self {
            Self::Linked(ConnectionState::Connected) => "✅ Connected".into(),
            Self::Linked(ConnectionState::Connecting) => "🔄 Connecting".into(),
            Self::Linked(ConnectionState::Disconnected) => "❌ Disconnected".into(),
            Self::Linked(ConnectionState::Error) => "⚠️ Error".into(),
            Self::Linked(ConnectionState::Other(raw)) => format!("❓ {raw}"),
            Self::NoConnection => "📵 No connection".into(),
        }
    }
}

/// Insertion-ordered counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<K> {
    entries: Vec<(K, usize)>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq> Tally<K> {
    pub fn increment(&mut self, key: K) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((key, 1)),
        }
    }

    pub fn get(&self, key: &K) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(k, c)| (k, *c))
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summary of one fetch. Built fresh on every invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Records received from the source, excluded ones included.
    pub total_received: usize,
    pub excluded_count: usize,
    pub visible_count: usize,
    pub standard_count: usize,
    pub active_count: usize,
    pub inactive_count: usize,
    pub connections: Tally<ConnectionBucket>,
    pub phases: Tally<String>,
    pub markings: Tally<String>,
    /// One formatted block per visible record, in source order.
    pub lines: Vec<String>,
}

impl Report {
    /// True when no visible record survived filtering.
    pub fn is_empty(&self) -> bool {
        self.visible_count == 0
    }
}

/// Build a [`Report`] from records in source order.
pub fn aggregate(records: &[Record], options: &AggregateOptions) -> Report {
    let (visible, excluded): (Vec<&Record>, Vec<&Record>) =
        records.iter().partition(|r| !options.is_excluded(r));

    let mut report = Report {
        total_received: records.len(),
        excluded_count: excluded.len(),
        visible_count: visible.len(),
        ..Report::default()
    };

    if visible.is_empty() {
        return report;
    }

    for record in visible {
        let bucket = ConnectionBucket::of(record);
        let category = non_blank(&record.category);

        if category == Some(options.standard_category.as_str()) {
            report.standard_count += 1;
        }

        let active = record.active == Some(true);
        if active {
            report.active_count += 1;
        } else {
            report.inactive_count += 1;
        }

        report
            .phases
            .increment(non_blank(&record.phase).unwrap_or(NO_PHASE).to_string());
        report
            .markings
            .increment(non_blank(&record.marking).unwrap_or(NO_MARKING).to_string());

        report.lines.push(format_line(
            record,
            category.unwrap_or(&options.standard_category),
            active,
            &bucket,
        ));
        report.connections.increment(bucket);
    }

    report
}

fn format_line(record: &Record, category: &str, active: bool, bucket: &ConnectionBucket) -> String {
    format!(
        "### **{}**\n└ Phase: `{}`\n└ Category: `{}`\n└ {}\n└ Connection: {}",
        non_blank(&record.name).unwrap_or(NO_NAME),
        non_blank(&record.phase).unwrap_or(NO_PHASE),
        category,
        if active { "✅ Active" } else { "❌ Inactive" },
        bucket.label(),
    )
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
