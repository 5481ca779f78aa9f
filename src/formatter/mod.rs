//! Reply formatting
//!
//! Turns one message's raw text into an ordered sequence of typed
//! [`DisplayBlock`]s for the display layer. Formatting is pure: no state,
//! no I/O. Two variants exist:
//!
//! - [`format_lines`]: a line-based rule list that lets the endpoint emit
//!   lightweight semi-structured text (simple pipe tables, `**bold**`,
//!   `*italic*` lines) without full markup parsing. Every line maps to
//!   exactly one block.
//! - [`format_markdown`]: a CommonMark parser (pulldown-cmark) that also
//!   understands fenced code blocks, inline code, links and images.
//!
//! Both start with the same image auto-linking pre-pass, see
//! [`images::autolink_images`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod images;
pub mod lines;
pub mod markdown;

pub use images::autolink_images;
pub use lines::format_lines;
pub use markdown::format_markdown;

/// Reference to an image to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Alternative text
    pub alt: String,
    /// Full-resolution source
    pub url: String,
}

/// An inline span inside a [`DisplayBlock::Runs`] block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    /// Unstyled text
    Plain(String),
    /// Bold/emphasized text
    Emphasized(String),
    /// Italic/secondary text
    Italic(String),
    /// Inline code, rendered monospace without highlighting
    Code(String),
    /// Hyperlink
    Link {
        /// Visible text
        text: String,
        /// Target
        url: String,
    },
    /// Inline image reference
    Image(ImageRef),
}

/// One unit of formatter output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayBlock {
    /// A verbatim line of text
    Text(String),
    /// A line made of styled runs
    Runs(Vec<Run>),
    /// A whole-line italic/secondary block
    Italic(String),
    /// Horizontal rule
    Divider,
    /// A table row; `cells[0]` is the label column
    TableRow {
        /// Cell texts, label first
        cells: Vec<String>,
    },
    /// Empty vertical spacer
    Spacer,
    /// Fenced or indented code
    CodeBlock {
        /// Language tag of a fenced block, if any
        language: Option<String>,
        /// Code body without the trailing newline
        code: String,
    },
    /// A stand-alone image
    Image(ImageRef),
}

/// Which formatter variant to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterMode {
    /// Line-based rule list
    Lines,
    /// CommonMark with code blocks and images
    #[default]
    Markdown,
}

impl FromStr for FormatterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lines" | "line" => Ok(FormatterMode::Lines),
            "markdown" | "md" => Ok(FormatterMode::Markdown),
            other => Err(format!(
                "Invalid formatter: {}. Must be one of: lines, markdown",
                other
            )),
        }
    }
}

impl fmt::Display for FormatterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatterMode::Lines => write!(f, "lines"),
            FormatterMode::Markdown => write!(f, "markdown"),
        }
    }
}

/// Formats `text` with the selected variant
///
/// # Examples
///
/// ```
/// use chatwidget::formatter::{format, DisplayBlock, FormatterMode};
///
/// let blocks = format("Name | Alice | 30", FormatterMode::Lines);
/// assert_eq!(
///     blocks,
///     vec![DisplayBlock::TableRow {
///         cells: vec!["Name".into(), "Alice".into(), "30".into()]
///     }]
/// );
/// ```
pub fn format(text: &str, mode: FormatterMode) -> Vec<DisplayBlock> {
    match mode {
        FormatterMode::Lines => format_lines(text),
        FormatterMode::Markdown => format_markdown(text),
    }
}
