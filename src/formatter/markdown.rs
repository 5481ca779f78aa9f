//! Markdown reply formatter
//!
//! Walks the pulldown-cmark event stream and folds it into display blocks.
//! Fenced code blocks keep their language tag so the display layer can pick
//! a highlighter; inline code stays a plain monospace run.

use crate::formatter::images::autolink_images;
use crate::formatter::{DisplayBlock, ImageRef, Run};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Formats `text` as CommonMark (with tables, strikethrough and task lists)
///
/// # Examples
///
/// ```
/// use chatwidget::formatter::{format_markdown, DisplayBlock};
///
/// let blocks = format_markdown("```python\nprint('hi')\n```");
/// assert_eq!(
///     blocks,
///     vec![DisplayBlock::CodeBlock {
///         language: Some("python".into()),
///         code: "print('hi')".into(),
///     }]
/// );
/// ```
pub fn format_markdown(text: &str) -> Vec<DisplayBlock> {
    let linked = autolink_images(text);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(&linked, options) {
        builder.handle(event);
    }
    builder.finish()
}

#[derive(Default)]
struct TableState {
    row: Vec<String>,
    cell: String,
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<DisplayBlock>,
    runs: Vec<Run>,
    strong: usize,
    emphasis: usize,
    heading: bool,
    quote_depth: usize,
    /// Next number for ordered lists, `None` for bullet lists
    lists: Vec<Option<u64>>,
    item_prefix: Option<String>,
    code: Option<(Option<String>, String)>,
    link: Option<(String, String)>,
    image: Option<(String, String)>,
    table: Option<TableState>,
}

impl BlockBuilder {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush_runs(),
            Event::Rule => {
                self.flush_runs();
                self.blocks.push(DisplayBlock::Divider);
                self.top_level_spacer();
            }
            Event::TaskListMarker(checked) => {
                self.push_run(Run::Plain(if checked { "[x] " } else { "[ ] " }.to_string()));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush_runs();
                self.heading = true;
            }
            Tag::BlockQuote(_) => {
                self.flush_runs();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush_runs();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|lang| !lang.is_empty())
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::List(start) => {
                self.flush_runs();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_runs();
                let depth = self.lists.len().saturating_sub(1);
                let indent = "  ".repeat(depth);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.item_prefix = Some(format!("{}{}", indent, marker));
            }
            Tag::Table(_) => {
                self.flush_runs();
                self.table = Some(TableState::default());
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.clear();
                }
            }
            Tag::Strong => self.strong += 1,
            Tag::Emphasis => self.emphasis += 1,
            Tag::Link { dest_url, .. } => {
                self.link = Some((dest_url.to_string(), String::new()));
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_runs();
                if self.lists.is_empty() {
                    self.top_level_spacer();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_runs();
                self.heading = false;
                self.top_level_spacer();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_runs();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.top_level_spacer();
            }
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    self.blocks.push(DisplayBlock::CodeBlock {
                        language,
                        code: code.trim_end_matches('\n').to_string(),
                    });
                }
                self.top_level_spacer();
            }
            TagEnd::Item => {
                self.flush_runs();
                self.item_prefix = None;
            }
            TagEnd::List(_) => {
                self.flush_runs();
                self.lists.pop();
                self.top_level_spacer();
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    let cells = std::mem::take(&mut table.row);
                    self.blocks.push(DisplayBlock::TableRow { cells });
                    self.blocks.push(DisplayBlock::Divider);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let cells = std::mem::take(&mut table.row);
                    self.blocks.push(DisplayBlock::TableRow { cells });
                }
            }
            TagEnd::Table => {
                self.table = None;
                self.top_level_spacer();
            }
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Link => {
                // Inside a table the link text already went into the cell
                if let Some((url, text)) = self.link.take().filter(|_| self.table.is_none()) {
                    let text = if text.is_empty() { url.clone() } else { text };
                    self.push_run(Run::Link { text, url });
                }
            }
            TagEnd::Image => {
                if let Some((url, alt)) = self.image.take() {
                    match self.table.as_mut() {
                        Some(table) => table.cell.push_str(&url),
                        None => self.push_run(Run::Image(ImageRef { alt, url })),
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, code)) = self.code.as_mut() {
            code.push_str(text);
        } else if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(text);
        } else if let Some(table) = self.table.as_mut() {
            table.cell.push_str(text);
        } else if let Some((_, link_text)) = self.link.as_mut() {
            link_text.push_str(text);
        } else {
            let run = if self.strong > 0 || self.heading {
                Run::Emphasized(text.to_string())
            } else if self.emphasis > 0 || self.quote_depth > 0 {
                Run::Italic(text.to_string())
            } else {
                Run::Plain(text.to_string())
            };
            self.push_run(run);
        }
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(table) = self.table.as_mut() {
            table.cell.push_str(code);
        } else if let Some((_, link_text)) = self.link.as_mut() {
            link_text.push_str(code);
        } else {
            self.push_run(Run::Code(code.to_string()));
        }
    }

    /// Appends a run, merging adjacent runs of the same style
    fn push_run(&mut self, run: Run) {
        if let Some(prefix) = self.item_prefix.take() {
            self.runs.push(Run::Plain(prefix));
        }
        let merged = match (self.runs.last_mut(), &run) {
            (Some(Run::Plain(prev)), Run::Plain(next))
            | (Some(Run::Emphasized(prev)), Run::Emphasized(next))
            | (Some(Run::Italic(prev)), Run::Italic(next)) => {
                prev.push_str(next);
                true
            }
            _ => false,
        };
        if !merged {
            self.runs.push(run);
        }
    }

    fn flush_runs(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        let runs = std::mem::take(&mut self.runs);

        let block = if self.quote_depth > 0 {
            DisplayBlock::Italic(plain_text(&runs))
        } else {
            match runs.as_slice() {
                [Run::Image(image)] => DisplayBlock::Image(image.clone()),
                [Run::Plain(text)] => DisplayBlock::Text(text.clone()),
                _ => DisplayBlock::Runs(runs),
            }
        };
        self.blocks.push(block);
    }

    fn top_level_spacer(&mut self) {
        let nested = !self.lists.is_empty() || self.quote_depth > 0 || self.table.is_some();
        if !nested && !matches!(self.blocks.last(), None | Some(DisplayBlock::Spacer)) {
            self.blocks.push(DisplayBlock::Spacer);
        }
    }

    fn finish(mut self) -> Vec<DisplayBlock> {
        self.flush_runs();
        while matches!(self.blocks.last(), Some(DisplayBlock::Spacer)) {
            self.blocks.pop();
        }
        self.blocks
    }
}

fn plain_text(runs: &[Run]) -> String {
    runs.iter()
        .map(|run| match run {
            Run::Plain(t) | Run::Emphasized(t) | Run::Italic(t) | Run::Code(t) => t.as_str(),
            Run::Link { text, .. } => text.as_str(),
            Run::Image(image) => image.url.as_str(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paragraph_is_text() {
        assert_eq!(
            format_markdown("Just a sentence."),
            vec![DisplayBlock::Text("Just a sentence.".to_string())]
        );
    }

    #[test]
    fn test_paragraphs_separated_by_spacer() {
        assert_eq!(
            format_markdown("one\n\ntwo"),
            vec![
                DisplayBlock::Text("one".to_string()),
                DisplayBlock::Spacer,
                DisplayBlock::Text("two".to_string()),
            ]
        );
    }

    #[test]
    fn test_strong_and_emphasis_runs() {
        assert_eq!(
            format_markdown("Hello **world** and *you*"),
            vec![DisplayBlock::Runs(vec![
                Run::Plain("Hello ".to_string()),
                Run::Emphasized("world".to_string()),
                Run::Plain(" and ".to_string()),
                Run::Italic("you".to_string()),
            ])]
        );
    }

    #[test]
    fn test_fenced_code_keeps_language() {
        let blocks = format_markdown("Try:\n\n```rust\nfn main() {}\n```\n");
        assert_eq!(
            blocks,
            vec![
                DisplayBlock::Text("Try:".to_string()),
                DisplayBlock::Spacer,
                DisplayBlock::CodeBlock {
                    language: Some("rust".to_string()),
                    code: "fn main() {}".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_untagged_fence_has_no_language() {
        assert_eq!(
            format_markdown("```\nls -la\n```"),
            vec![DisplayBlock::CodeBlock {
                language: None,
                code: "ls -la".to_string(),
            }]
        );
    }

    #[test]
    fn test_fence_info_string_uses_first_word() {
        let blocks = format_markdown("```js title=app.js\nlet x = 1;\n```");
        assert!(matches!(
            &blocks[0],
            DisplayBlock::CodeBlock { language: Some(lang), .. } if lang == "js"
        ));
    }

    #[test]
    fn test_inline_code_is_code_run() {
        assert_eq!(
            format_markdown("Run `cargo build` now"),
            vec![DisplayBlock::Runs(vec![
                Run::Plain("Run ".to_string()),
                Run::Code("cargo build".to_string()),
                Run::Plain(" now".to_string()),
            ])]
        );
    }

    #[test]
    fn test_standalone_bare_image_url_is_image_block() {
        assert_eq!(
            format_markdown("https://x.io/diagram.jpeg"),
            vec![DisplayBlock::Image(ImageRef {
                alt: "image".to_string(),
                url: "https://x.io/diagram.jpeg".to_string(),
            })]
        );
    }

    #[test]
    fn test_inline_image_with_text_is_run() {
        let blocks = format_markdown("Look ![cat](https://x.io/cat.gif) here");
        assert_eq!(
            blocks,
            vec![DisplayBlock::Runs(vec![
                Run::Plain("Look ".to_string()),
                Run::Image(ImageRef {
                    alt: "cat".to_string(),
                    url: "https://x.io/cat.gif".to_string(),
                }),
                Run::Plain(" here".to_string()),
            ])]
        );
    }

    #[test]
    fn test_link_run() {
        assert_eq!(
            format_markdown("[docs](https://x.io/docs)"),
            vec![DisplayBlock::Runs(vec![Run::Link {
                text: "docs".to_string(),
                url: "https://x.io/docs".to_string(),
            }])]
        );
    }

    #[test]
    fn test_table_rows_with_header_divider() {
        let blocks = format_markdown("| Plan | Price |\n|---|---|\n| Pro | $10 |\n");
        assert_eq!(
            blocks,
            vec![
                DisplayBlock::TableRow {
                    cells: vec!["Plan".to_string(), "Price".to_string()]
                },
                DisplayBlock::Divider,
                DisplayBlock::TableRow {
                    cells: vec!["Pro".to_string(), "$10".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_table_cells_flatten_inline_markup() {
        let blocks = format_markdown("| Item | Link |\n|---|---|\n| **Pro** | [buy](https://x.io/buy) |\n");
        assert_eq!(
            blocks[2],
            DisplayBlock::TableRow {
                cells: vec!["Pro".to_string(), "buy".to_string()]
            }
        );
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn test_image_url_in_table_cell_is_literal() {
        let blocks = format_markdown("| Item | Logo |\n|---|---|\n| Pro | https://x.io/logo.png |\n");
        assert_eq!(
            blocks[2],
            DisplayBlock::TableRow {
                cells: vec!["Pro".to_string(), "https://x.io/logo.png".to_string()]
            }
        );
    }

    #[test]
    fn test_bold_wrapped_image_url_is_image() {
        assert_eq!(
            format_markdown("**https://x.io/a.png**"),
            vec![DisplayBlock::Image(ImageRef {
                alt: "image".to_string(),
                url: "https://x.io/a.png".to_string(),
            })]
        );
    }

    #[test]
    fn test_bullet_and_ordered_lists() {
        let blocks = format_markdown("- apples\n- pears\n\n1. first\n2. second\n");
        assert_eq!(
            blocks,
            vec![
                DisplayBlock::Text("• apples".to_string()),
                DisplayBlock::Text("• pears".to_string()),
                DisplayBlock::Spacer,
                DisplayBlock::Text("1. first".to_string()),
                DisplayBlock::Text("2. second".to_string()),
            ]
        );
    }

    #[test]
    fn test_heading_is_emphasized() {
        assert_eq!(
            format_markdown("# Summary"),
            vec![DisplayBlock::Runs(vec![Run::Emphasized(
                "Summary".to_string()
            )])]
        );
    }

    #[test]
    fn test_blockquote_is_italic() {
        assert_eq!(
            format_markdown("> quoted **words**"),
            vec![DisplayBlock::Italic("quoted words".to_string())]
        );
    }

    #[test]
    fn test_thematic_break_is_divider() {
        assert_eq!(
            format_markdown("above\n\n---\n\nbelow"),
            vec![
                DisplayBlock::Text("above".to_string()),
                DisplayBlock::Spacer,
                DisplayBlock::Divider,
                DisplayBlock::Spacer,
                DisplayBlock::Text("below".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(format_markdown("").is_empty());
    }
}
