//! Multi-document pipeline: documents in, rendered table out.
//!
//! These are pure functions — the caller decides where the output goes
//! (stdout, a file, an in-memory buffer).

use std::io::{self, Write};

use crate::csv::RowFormat;
use crate::node::Document;
use crate::record::{ClockRecord, extract_records};

/// Flattens a batch of documents, concatenating record sequences in
/// document order. Per-document order is preserved.
#[must_use]
pub fn extract_all(documents: &[Document]) -> Vec<ClockRecord> {
    let mut records = Vec::new();
    for document in documents {
        records.extend(extract_records(document));
    }
    records
}

/// Writes the header line followed by one formatted row per record, each
/// `\n`-terminated.
pub fn render<W: Write>(
    records: &[ClockRecord],
    format: &dyn RowFormat,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "{}", format.header())?;
    for record in records {
        writeln!(out, "{}", format.format(record))?;
    }
    Ok(())
}

/// [`render`] into an owned string.
#[must_use]
pub fn render_to_string(records: &[ClockRecord], format: &dyn RowFormat) -> String {
    let mut out = String::new();
    out.push_str(format.header());
    out.push('\n');
    for record in records {
        out.push_str(&format.format(record));
        out.push('\n');
    }
    out
}
