//! Row formatting: one record to one escaped, delimited text line.

use std::borrow::Cow;

use crate::record::ClockRecord;

/// Field names of the default row format, in emission order.
///
/// The header must stay in sync with the active row format's field order;
/// that is a configuration invariant, not something enforced here.
pub const DEFAULT_HEADER: &str = "task,parents,category,start,end,effort,ishabit,tags";

/// Default delimiter for the `parents` path.
pub const DEFAULT_SEPARATOR: &str = "/";

/// Timestamp rendering: zero-padded month/day/hour/minute, unpadded year.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Escapes one field for a comma-delimited row.
///
/// A field containing a double quote is wrapped in double quotes with every
/// internal quote doubled; a field containing a comma is just wrapped.
/// Anything else passes through unchanged (inputs are newline-free).
#[must_use]
pub fn escape(field: &str) -> Cow<'_, str> {
    if field.contains('"') {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else if field.contains(',') {
        Cow::Owned(format!("\"{field}\""))
    } else {
        Cow::Borrowed(field)
    }
}

/// Strategy for mapping records to rows.
///
/// The default implementation covers the standard export; callers with
/// extra property-drawer columns supply their own and read what they need
/// via [`ClockRecord::property`].
pub trait RowFormat {
    /// Header line naming the fields `format` emits, in the same order.
    fn header(&self) -> &str;

    /// Renders one record as one delimited line (without the newline).
    fn format(&self, record: &ClockRecord) -> String;
}

/// The standard eight-column row.
#[derive(Debug, Clone)]
pub struct DefaultRowFormat {
    /// Joins the `parents` path, farthest ancestor first.
    pub separator: String,
    /// Emitted header line.
    pub header: String,
}

impl Default for DefaultRowFormat {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

impl RowFormat for DefaultRowFormat {
    fn header(&self) -> &str {
        &self.header
    }

    fn format(&self, record: &ClockRecord) -> String {
        let parents = record.parents.join(&self.separator);
        let start = record.start.format(TIME_FORMAT).to_string();
        let end = record.end.format(TIME_FORMAT).to_string();
        let tags = record.tags.join(":");
        let ishabit = if record.is_habit { "t" } else { "" };

        [
            record.task.as_str(),
            parents.as_str(),
            record.category.as_str(),
            start.as_str(),
            end.as_str(),
            record.effort.as_deref().unwrap_or(""),
            ishabit,
            tags.as_str(),
        ]
        .iter()
        .map(|field| escape(field))
        .collect::<Vec<_>>()
        .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn record() -> ClockRecord {
        let day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        ClockRecord {
            task: "Task".into(),
            parents: vec!["Project".into()],
            category: String::new(),
            start: day.and_hms_opt(9, 0, 0).unwrap(),
            end: day.and_hms_opt(10, 30, 0).unwrap(),
            effort: Some("1:00".into()),
            is_habit: false,
            tags: vec!["work".into(), "urgent".into()],
            properties: BTreeMap::new(),
        }
    }

    #[test]
    fn escape_covers_both_special_characters() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("a\"b"), "\"a\"\"b\"");
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape(""), "");
        // Quote handling wins when both are present.
        assert_eq!(escape("a,\"b"), "\"a,\"\"b\"");
    }

    #[test]
    fn escape_borrows_when_nothing_to_do() {
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
        assert!(matches!(escape("a,b"), Cow::Owned(_)));
    }

    /// A comma/quote-aware field parser: unescaping an escaped field must
    /// recover the original exactly.
    fn parse_field(escaped: &str) -> String {
        if let Some(inner) = escaped
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
        {
            inner.replace("\"\"", "\"")
        } else {
            escaped.to_string()
        }
    }

    #[test]
    fn escape_then_parse_is_identity() {
        let inputs = [
            "plain",
            "a,b",
            "a\"b",
            "\"",
            "\"\"",
            ",",
            ",,\"",
            "mixed, \"quoted\" text",
            "trailing,",
            "",
        ];
        for input in inputs {
            assert_eq!(parse_field(&escape(input)), input, "input: {input:?}");
        }
    }

    #[test]
    fn default_row_renders_all_fields_in_header_order() {
        let row = DefaultRowFormat::default().format(&record());
        insta::assert_snapshot!(row, @"Task,Project,,2023-01-01 09:00,2023-01-01 10:30,1:00,,work:urgent");
    }

    #[test]
    fn habit_flag_renders_as_t() {
        let mut r = record();
        r.is_habit = true;
        let row = DefaultRowFormat::default().format(&r);
        assert_eq!(row.split(',').nth(6), Some("t"));
    }

    #[test]
    fn parents_join_uses_the_configured_separator() {
        let mut r = record();
        r.parents = vec!["a".into(), "b".into()];
        let format = DefaultRowFormat {
            separator: " > ".into(),
            ..DefaultRowFormat::default()
        };
        assert!(format.format(&r).starts_with("Task,a > b,"));
    }

    #[test]
    fn fields_with_commas_are_quoted_in_rows() {
        let mut r = record();
        r.task = "Review, then merge".into();
        let row = DefaultRowFormat::default().format(&r);
        assert!(row.starts_with("\"Review, then merge\","));
    }

    #[test]
    fn custom_row_formats_can_read_properties() {
        struct WithOwner;

        impl RowFormat for WithOwner {
            fn header(&self) -> &str {
                "task,owner"
            }

            fn format(&self, record: &ClockRecord) -> String {
                format!("{},{}", escape(&record.task), escape(record.property("OWNER")))
            }
        }

        let mut r = record();
        r.properties.insert("OWNER".into(), "alice".into());
        assert_eq!(WithOwner.format(&r), "Task,alice");

        r.properties.clear();
        assert_eq!(WithOwner.format(&r), "Task,");
    }
}
