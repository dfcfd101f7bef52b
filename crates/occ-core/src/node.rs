//! The typed node sequence consumed by the traversal.
//!
//! A node source (such as the `occ-org` parser) produces one [`Document`]
//! per input: a pre-order sequence of headline and clock nodes. Everything
//! downstream works on these types alone and never sees raw document text.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for node construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Headline levels start at 1; level 0 is reserved for the document root.
    #[error("headline level must be at least 1, got {value}")]
    LevelOutOfRange { value: u32 },
}

/// A validated headline nesting level (≥ 1).
///
/// Level 0 is the document root and never appears on a headline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Level(u32);

impl Level {
    /// Creates a new level after validation.
    pub const fn new(value: u32) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::LevelOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Returns the level as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Level {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a clock entry has been closed out or is still accumulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockStatus {
    /// The clock has an end stamp and a recorded duration.
    Closed,
    /// The clock is currently running.
    Running,
}

impl ClockStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Running => "running",
        }
    }
}

impl fmt::Display for ClockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of timestamp a clock entry carries.
///
/// Only inactive ranges are exported; active timestamps belong to the
/// scheduling side of a document and single stamps belong to running clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    /// `<start>--<end>`
    ActiveRange,
    /// `[start]--[end]`
    InactiveRange,
    /// A single stamp, no end.
    Point,
}

impl TimestampKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ActiveRange => "active_range",
            Self::InactiveRange => "inactive_range",
            Self::Point => "point",
        }
    }
}

impl fmt::Display for TimestampKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A headline node: one titled entry in the outline hierarchy.
///
/// Carries only the headline's *own* attributes. Inherited tags, resolved
/// category, and the ancestor chain are computed during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    /// Nesting level (1 = top level).
    pub level: Level,
    /// Title text as written, before hidden regions are stripped.
    pub raw_title: String,
    /// Tags attached directly to this headline, in written order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category defined by this headline's own property drawer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Effort estimate (e.g. `1:00`), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
    /// Whether the headline carries the habit style marker.
    #[serde(default)]
    pub is_habit: bool,
    /// Full property drawer contents, keys upcased.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Headline {
    /// Creates a headline with no tags, properties, or markers.
    pub fn new(level: Level, raw_title: impl Into<String>) -> Self {
        Self {
            level,
            raw_title: raw_title.into(),
            tags: Vec::new(),
            category: None,
            effort: None,
            is_habit: false,
            properties: BTreeMap::new(),
        }
    }
}

/// A clock node: one logged work interval under a headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    /// Closed or still running.
    pub status: ClockStatus,
    /// Active/inactive range, or a single stamp.
    pub kind: TimestampKind,
    /// Start of the interval. Naive: documents carry no timezone.
    pub start: NaiveDateTime,
    /// End of the interval; absent for running clocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    /// Recorded duration text (e.g. `1:30`), if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// One node of the pre-order document sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Headline(Headline),
    Clock(Clock),
}

/// A fully parsed document: document-level defaults plus the node sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Fallback category when no headline in a clock's ancestry defines one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_category: Option<String>,
    /// Pre-order sequence of headline and clock nodes.
    pub nodes: Vec<Node>,
}
