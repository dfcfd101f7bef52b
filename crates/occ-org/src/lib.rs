//! Org document parsing into the typed node sequence.
//!
//! Line-oriented: headlines, property drawers, `CLOCK:` lines, and the
//! handful of document keywords the exporter cares about. Everything else
//! is body text and ignored. Org files are freeform, so parsing never
//! fails — lines that look like clocks but don't scan are skipped with a
//! debug log.

use std::io;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use occ_core::{Clock, ClockStatus, Document, Headline, Level, Node, TimestampKind};

static HEADLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*+)\s+(.*)$").unwrap());

static TAG_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s):(?:[[:alnum:]_@#%]+:)+\s*$").unwrap());

static PROPERTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*:([[:alnum:]_@-]+):(?:\s+(.*?))?\s*$").unwrap());

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*CLOCK:\s*(.*)$").unwrap());

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\[<])(\d{4})-(\d{2})-(\d{2})(?:\s+\p{L}[^\s\]>]*)?\s+(\d{1,2}):(\d{2})\s*[\]>]")
        .unwrap()
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=>\s*(\d+:\d{2})").unwrap());

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\+([[:alpha:]_]+):\s*(.*?)\s*$").unwrap());

/// Document keywords that shape parsing: the default category and the TODO
/// keyword set used to strip state keywords off raw titles.
#[derive(Debug)]
struct DocumentKeywords {
    default_category: Option<String>,
    todo_keywords: Vec<String>,
}

/// Parses org text into a document.
///
/// Infallible: unrecognized lines are body text, malformed clock lines are
/// dropped at debug level (the exporter treats them as policy exclusions,
/// not errors).
#[must_use]
pub fn parse_document(source: &str) -> Document {
    let keywords = scan_keywords(source);
    let mut nodes: Vec<Node> = Vec::new();
    let mut last_headline: Option<usize> = None;
    let mut in_properties = false;

    for (lineno, line) in source.lines().enumerate() {
        if let Some(caps) = HEADLINE_RE.captures(line) {
            in_properties = false;
            last_headline = Some(nodes.len());
            nodes.push(Node::Headline(parse_headline(
                &caps[1],
                &caps[2],
                &keywords.todo_keywords,
            )));
            continue;
        }

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case(":PROPERTIES:") {
            // A drawer before the first headline would be file-level
            // configuration, which the keyword scan already covers.
            in_properties = last_headline.is_some();
            continue;
        }
        if trimmed.eq_ignore_ascii_case(":END:") {
            in_properties = false;
            continue;
        }
        if in_properties {
            if let Some((key, value)) = parse_property_line(line) {
                if let Some(ix) = last_headline {
                    if let Some(Node::Headline(headline)) = nodes.get_mut(ix) {
                        apply_property(headline, &key, value);
                    }
                }
            }
            continue;
        }

        if let Some(caps) = CLOCK_RE.captures(line) {
            match parse_clock(&caps[1]) {
                Some(clock) => nodes.push(Node::Clock(clock)),
                None => {
                    tracing::debug!(line = lineno + 1, "skipping malformed clock line");
                }
            }
        }
    }

    Document {
        default_category: keywords.default_category,
        nodes,
    }
}

/// Reads and parses one document from disk.
pub fn read_document(path: &Path) -> io::Result<Document> {
    let source = std::fs::read_to_string(path)?;
    let document = parse_document(&source);
    tracing::debug!(
        path = %path.display(),
        nodes = document.nodes.len(),
        "parsed document"
    );
    Ok(document)
}

fn scan_keywords(source: &str) -> DocumentKeywords {
    let mut default_category = None;
    let mut todo_keywords = Vec::new();

    for line in source.lines() {
        let Some(caps) = KEYWORD_RE.captures(line) else {
            continue;
        };
        let name = caps[1].to_ascii_uppercase();
        let value = caps[2].trim();
        match name.as_str() {
            "CATEGORY" => {
                if default_category.is_none() && !value.is_empty() {
                    default_category = Some(value.to_string());
                }
            }
            // `#+TODO: TODO NEXT(n) | DONE CANCELLED(c)` — keep the words,
            // drop the done/active separator and the fast-access suffixes.
            "TODO" | "SEQ_TODO" | "TYP_TODO" => {
                todo_keywords.extend(
                    value
                        .split_whitespace()
                        .filter(|word| *word != "|")
                        .map(|word| word.split_once('(').map_or(word, |(kw, _)| kw).to_string()),
                );
            }
            _ => {}
        }
    }

    if todo_keywords.is_empty() {
        todo_keywords = vec!["TODO".to_string(), "DONE".to_string()];
    }

    DocumentKeywords {
        default_category,
        todo_keywords,
    }
}

/// Builds a headline from the star run and the text after it: trailing tag
/// run split off, then the TODO state keyword and priority cookie stripped
/// so `raw_title` matches the headline's raw value.
fn parse_headline(stars: &str, text: &str, todo_keywords: &[String]) -> Headline {
    let level =
        Level::new(stars.len() as u32).expect("the headline pattern requires at least one star");
    let mut rest = text.trim_end();

    let mut tags = Vec::new();
    if let Some(run) = TAG_RUN_RE.find(rest) {
        tags = run
            .as_str()
            .trim()
            .trim_matches(':')
            .split(':')
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        rest = rest[..run.start()].trim_end();
    }

    if let Some((first, remainder)) = rest.split_once(char::is_whitespace) {
        if todo_keywords.iter().any(|keyword| keyword == first) {
            rest = remainder.trim_start();
        }
    } else if todo_keywords.iter().any(|keyword| keyword == rest) {
        rest = "";
    }

    if let Some(stripped) = strip_priority(rest) {
        rest = stripped;
    }

    let mut headline = Headline::new(level, rest);
    headline.tags = tags;
    headline
}

/// Strips a leading `[#X]` priority cookie.
fn strip_priority(rest: &str) -> Option<&str> {
    let inner = rest.strip_prefix("[#")?;
    let mut chars = inner.chars();
    chars.next()?;
    let after = chars.as_str().strip_prefix(']')?;
    Some(after.trim_start())
}

fn parse_property_line(line: &str) -> Option<(String, String)> {
    let caps = PROPERTY_RE.captures(line)?;
    let key = caps[1].to_ascii_uppercase();
    if key == "END" || key == "PROPERTIES" {
        return None;
    }
    let value = caps.get(2).map_or("", |m| m.as_str()).to_string();
    Some((key, value))
}

fn apply_property(headline: &mut Headline, key: &str, value: String) {
    match key {
        "CATEGORY" => headline.category = Some(value.clone()),
        "EFFORT" => headline.effort = Some(value.clone()),
        "STYLE" => headline.is_habit = value == "habit",
        _ => {}
    }
    headline.properties.insert(key.to_string(), value);
}

/// Parses the text after `CLOCK:`.
///
/// Status follows org's rule: a clock is closed exactly when a `=> H:MM`
/// duration is present. Kind comes from the opening bracket of the first
/// stamp for ranges; a single stamp is a point.
fn parse_clock(rest: &str) -> Option<Clock> {
    let mut stamps = Vec::new();
    for caps in TIMESTAMP_RE.captures_iter(rest).take(2) {
        let active = &caps[1] == "<";
        let year = caps[2].parse().ok()?;
        let month = caps[3].parse().ok()?;
        let day = caps[4].parse().ok()?;
        let hour = caps[5].parse().ok()?;
        let minute = caps[6].parse().ok()?;
        let stamp = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
        stamps.push((active, stamp));
    }

    let &(first_active, start) = stamps.first()?;
    let end = stamps.get(1).map(|&(_, stamp)| stamp);
    let duration = DURATION_RE.captures(rest).map(|caps| caps[1].to_string());

    let kind = match (end.is_some(), first_active) {
        (true, true) => TimestampKind::ActiveRange,
        (true, false) => TimestampKind::InactiveRange,
        (false, _) => TimestampKind::Point,
    };
    let status = if duration.is_some() {
        ClockStatus::Closed
    } else {
        ClockStatus::Running
    };

    Some(Clock {
        status,
        kind,
        start,
        end,
        duration,
    })
}
