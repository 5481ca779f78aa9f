//! Line-based reply formatter
//!
//! Each line is matched against an ordered list of rules; the first rule
//! whose transform produces a block wins. The order is what makes the
//! output deterministic for ambiguous input: any line containing a pipe is
//! tried as a table row before anything else, even in prose.

use crate::formatter::images::{autolink_images, contains_image_markup, split_image_runs};
use crate::formatter::{DisplayBlock, Run};
use regex::Regex;
use std::sync::OnceLock;

/// A formatting rule: returns a block if it applies to the line
type LineRule = fn(&str) -> Option<DisplayBlock>;

/// Rules in precedence order
const RULES: [(&str, LineRule); 5] = [
    ("table", table_rule),
    ("bold", bold_rule),
    ("italic", italic_rule),
    ("blank", blank_rule),
    ("image", image_rule),
];

fn bold_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"))
}

/// Formats `text` line by line
///
/// # Examples
///
/// ```
/// use chatwidget::formatter::{format_lines, DisplayBlock, Run};
///
/// let blocks = format_lines("Hello **world**!\n---|---|---");
/// assert_eq!(
///     blocks,
///     vec![
///         DisplayBlock::Runs(vec![
///             Run::Plain("Hello ".into()),
///             Run::Emphasized("world".into()),
///             Run::Plain("!".into()),
///         ]),
///         DisplayBlock::Divider,
///     ]
/// );
/// ```
pub fn format_lines(text: &str) -> Vec<DisplayBlock> {
    let linked = autolink_images(text);
    // Table cells are literal text, so rows are cut from the line as typed.
    text.lines()
        .zip(linked.lines())
        .map(|(raw, linked)| table_rule(raw).unwrap_or_else(|| format_line(linked)))
        .collect()
}

/// Formats a single line, falling back to a verbatim text block
pub fn format_line(line: &str) -> DisplayBlock {
    for (name, rule) in RULES.iter() {
        if let Some(block) = rule(line) {
            tracing::trace!(rule = *name, "Formatted line");
            return block;
        }
    }
    DisplayBlock::Text(line.to_string())
}

fn table_rule(line: &str) -> Option<DisplayBlock> {
    if !line.contains('|') {
        return None;
    }

    if line.contains("---") {
        return Some(DisplayBlock::Divider);
    }

    let cells: Vec<String> = line
        .split('|')
        .map(|cell| cell.trim().replace("**", ""))
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect();

    // A single cell is not a row; let the remaining rules have the line.
    if cells.len() < 2 {
        return None;
    }

    Some(DisplayBlock::TableRow { cells })
}

fn bold_rule(line: &str) -> Option<DisplayBlock> {
    if !line.contains("**") {
        return None;
    }

    let mut runs = Vec::new();
    let mut last = 0;
    for caps in bold_pattern().captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            runs.extend(split_image_runs(&line[last..whole.start()]));
        }
        runs.extend(styled_runs(inner.as_str(), Run::Emphasized));
        last = whole.end();
    }
    if last < line.len() {
        runs.extend(split_image_runs(&line[last..]));
    }

    Some(DisplayBlock::Runs(runs))
}

fn italic_rule(line: &str) -> Option<DisplayBlock> {
    let trimmed = line.trim();
    if trimmed.len() < 2
        || !trimmed.starts_with('*')
        || !trimmed.ends_with('*')
        || trimmed.starts_with("**")
    {
        return None;
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    if contains_image_markup(inner) {
        return Some(DisplayBlock::Runs(styled_runs(inner, Run::Italic)));
    }
    Some(DisplayBlock::Italic(inner.to_string()))
}

/// Splits `text` around image markup, applying `style` to the text between
fn styled_runs(text: &str, style: fn(String) -> Run) -> Vec<Run> {
    split_image_runs(text)
        .into_iter()
        .map(|run| match run {
            Run::Plain(text) => style(text),
            other => other,
        })
        .collect()
}

fn blank_rule(line: &str) -> Option<DisplayBlock> {
    if line.trim().is_empty() {
        Some(DisplayBlock::Spacer)
    } else {
        None
    }
}

/// Lines carrying image markup become runs so the images materialize
fn image_rule(line: &str) -> Option<DisplayBlock> {
    if !contains_image_markup(line) {
        return None;
    }
    Some(DisplayBlock::Runs(split_image_runs(line)))
}
