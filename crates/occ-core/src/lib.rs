//! Core logic for the org clock exporter.
//!
//! This crate contains the fundamental types and logic for:
//! - Node model: the typed pre-order sequence a node source produces
//! - Ancestry: parent-chain reconstruction from indentation levels alone
//! - Records: associating each clock interval with its resolved headline
//! - Rows: CSV escaping and the pluggable row format
//!
//! Everything here is pure and synchronous; I/O lives with the callers.

pub mod ancestry;
pub mod csv;
pub mod node;
pub mod pipeline;
pub mod record;

pub use ancestry::{Ancestry, FrameId, HeadlineFrame};
pub use csv::{DEFAULT_HEADER, DEFAULT_SEPARATOR, DefaultRowFormat, RowFormat, escape};
pub use node::{
    Clock, ClockStatus, Document, Headline, Level, Node, TimestampKind, ValidationError,
};
pub use pipeline::{extract_all, render, render_to_string};
pub use record::{ClockRecord, extract_records};
