//! Terminal rendering of display blocks

use crate::config::DisplayConfig;
use crate::display::highlight::HighlighterRegistry;
use crate::formatter::{self, DisplayBlock, FormatterMode, ImageRef, Run};
use crate::message::{Message, Sender};
use colored::Colorize;

const RULE_WIDTH: usize = 40;

/// Wraps `label` in an OSC-8 hyperlink to `url`
///
/// Terminals that support it open `url` when the label is activated; others
/// print the label only.
pub fn hyperlink(url: &str, label: &str) -> String {
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, label)
}

/// Renders messages and blocks as styled terminal text
pub struct TerminalRenderer {
    mode: FormatterMode,
    highlight: bool,
    registry: HighlighterRegistry,
}

impl TerminalRenderer {
    /// Creates a renderer with an explicit highlighter registry
    pub fn new(mode: FormatterMode, registry: HighlighterRegistry) -> Self {
        Self {
            mode,
            highlight: true,
            registry,
        }
    }

    /// Creates a renderer from display settings
    pub fn from_config(config: &DisplayConfig) -> Self {
        let registry = if config.syntax_highlighting {
            HighlighterRegistry::with_syntect(&config.theme)
        } else {
            HighlighterRegistry::empty()
        };
        Self {
            mode: config.formatter,
            highlight: config.syntax_highlighting,
            registry,
        }
    }

    /// Formatter variant used for message bodies
    pub fn mode(&self) -> FormatterMode {
        self.mode
    }

    /// Renders a message with its sender header
    pub fn render_message(&self, message: &Message) -> String {
        self.render_formatted(message, &formatter::format(&message.text, self.mode))
    }

    /// Renders already formatted `blocks` under the sender header of `message`
    pub fn render_formatted(&self, message: &Message, blocks: &[DisplayBlock]) -> String {
        let header = match message.sender {
            Sender::User => "You".green().bold(),
            Sender::Bot => "Bot".cyan().bold(),
        };
        let time = message
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string();

        format!(
            "{} {}\n{}",
            header,
            time.dimmed(),
            self.render_blocks(blocks)
        )
    }

    /// Renders blocks, one or more lines each
    pub fn render_blocks(&self, blocks: &[DisplayBlock]) -> String {
        blocks
            .iter()
            .map(|block| self.render_block(block))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_block(&self, block: &DisplayBlock) -> String {
        match block {
            DisplayBlock::Text(text) => text.clone(),
            DisplayBlock::Runs(runs) => runs.iter().map(render_run).collect(),
            DisplayBlock::Italic(text) => text.italic().dimmed().to_string(),
            DisplayBlock::Divider => "─".repeat(RULE_WIDTH).dimmed().to_string(),
            DisplayBlock::TableRow { cells } => render_table_row(cells),
            DisplayBlock::Spacer => String::new(),
            DisplayBlock::CodeBlock { language, code } => {
                self.render_code_block(language.as_deref(), code)
            }
            DisplayBlock::Image(image) => render_image(image),
        }
    }

    fn render_code_block(&self, language: Option<&str>, code: &str) -> String {
        let fence = format!("```{}", language.unwrap_or_default());
        let body = language
            .filter(|_| self.highlight)
            .and_then(|lang| self.registry.highlight(lang, code))
            .map(|highlighted| highlighted.trim_end_matches('\n').to_string())
            .unwrap_or_else(|| code.to_string());

        format!("{}\n{}\n{}", fence.dimmed(), body, "```".dimmed())
    }
}

fn render_run(run: &Run) -> String {
    match run {
        Run::Plain(text) => text.clone(),
        Run::Emphasized(text) => text.bold().to_string(),
        Run::Italic(text) => text.italic().to_string(),
        Run::Code(code) => code.yellow().to_string(),
        Run::Link { text, url } => hyperlink(url, &text.blue().underline().to_string()),
        Run::Image(image) => render_image(image),
    }
}

fn render_table_row(cells: &[String]) -> String {
    let Some((label, rest)) = cells.split_first() else {
        return String::new();
    };
    let mut line = label.bold().cyan().to_string();
    for cell in rest {
        line.push_str(&format!(" {} {}", "│".dimmed(), cell));
    }
    line
}

fn render_image(image: &ImageRef) -> String {
    let alt = if image.alt.is_empty() {
        "image"
    } else {
        image.alt.as_str()
    };
    let label = format!("[image: {}]", alt).magenta().to_string();
    hyperlink(&image.url, &label)
}
