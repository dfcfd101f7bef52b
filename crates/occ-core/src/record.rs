//! Clock record extraction: the flattening pass over one document.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::ancestry::Ancestry;
use crate::node::{Clock, ClockStatus, Document, Node, TimestampKind};

/// One exported work interval, enriched with its headline's resolved
/// ancestry and inherited metadata. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockRecord {
    /// Title of the directly enclosing headline.
    pub task: String,
    /// Ancestor titles, farthest first; never includes `task` itself.
    pub parents: Vec<String>,
    /// Resolved category; empty when nothing in the chain defines one.
    pub category: String,
    /// Interval start.
    pub start: NaiveDateTime,
    /// Interval end.
    pub end: NaiveDateTime,
    /// Effort estimate of the enclosing headline, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
    /// Habit marker of the enclosing headline.
    pub is_habit: bool,
    /// Inherited tag set, ancestor tags first.
    pub tags: Vec<String>,
    /// Inherited property drawer entries, available to custom row formats.
    pub properties: BTreeMap<String, String>,
}

impl ClockRecord {
    /// Looks up an inherited property, yielding `""` when absent.
    #[must_use]
    pub fn property(&self, name: &str) -> &str {
        self.property_or(name, "")
    }

    /// Looks up an inherited property with a caller-chosen default.
    #[must_use]
    pub fn property_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.properties
            .get(name)
            .map_or(default, String::as_str)
    }
}

/// Only closed clocks over inactive ranges are exported. Running clocks and
/// active/scheduling timestamps are dropped silently: that is policy, not a
/// failure.
fn qualifies(clock: &Clock) -> bool {
    clock.status == ClockStatus::Closed && clock.kind == TimestampKind::InactiveRange
}

/// Flattens one document into its clock records.
///
/// A single pre-order pass: headlines feed the ancestry tracker, qualifying
/// clocks combine the current frame's resolved attributes with their own
/// interval data. Emission order is visitation order, never re-sorted.
#[must_use]
pub fn extract_records(document: &Document) -> Vec<ClockRecord> {
    let mut ancestry = Ancestry::new(document.default_category.clone());
    let mut records = Vec::new();

    for node in &document.nodes {
        match node {
            Node::Headline(headline) => {
                ancestry.enter(headline);
            }
            Node::Clock(clock) => {
                if !qualifies(clock) {
                    tracing::debug!(
                        status = %clock.status,
                        kind = %clock.kind,
                        "skipping non-exportable clock"
                    );
                    continue;
                }
                let Some(end) = clock.end else {
                    tracing::debug!("skipping closed clock without end stamp");
                    continue;
                };

                let id = ancestry.current();
                let frame = ancestry.frame(id);
                records.push(ClockRecord {
                    task: frame.title.clone(),
                    parents: ancestry.parent_titles(id),
                    category: frame.category.clone().unwrap_or_default(),
                    start: clock.start,
                    end,
                    effort: frame.effort.clone(),
                    is_habit: frame.is_habit,
                    tags: frame.inherited_tags.clone(),
                    properties: frame.properties.clone(),
                });
            }
        }
    }

    tracing::debug!(
        nodes = document.nodes.len(),
        records = records.len(),
        "document flattened"
    );
    records
}
