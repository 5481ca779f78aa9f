//! Syntax highlighting for fenced code blocks
//!
//! Highlighters are looked up by the language tag of a fenced block. The
//! registry is an extension table: specific tags can be bound to a custom
//! [`Highlighter`], and everything else goes to the fallback (syntect by
//! default), which resolves the tag against its bundled syntax definitions.

use colored::Colorize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Theme used when the configured one is unknown
pub const DEFAULT_THEME: &str = "base16-eighties.dark";

/// Turns source code into terminal-styled text
pub trait Highlighter: Send + Sync {
    /// Highlights `code` written in `language`
    ///
    /// Returns `None` when the language is not supported, so callers can
    /// fall back to plain rendering.
    fn highlight(&self, language: &str, code: &str) -> Option<String>;
}

struct SyntectAssets {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

/// Bundled syntaxes and themes, loaded once
fn syntect_assets() -> &'static SyntectAssets {
    static ASSETS: OnceLock<SyntectAssets> = OnceLock::new();
    ASSETS.get_or_init(|| SyntectAssets {
        syntax_set: SyntaxSet::load_defaults_newlines(),
        theme_set: ThemeSet::load_defaults(),
    })
}

/// Highlighter backed by syntect's bundled definitions
pub struct SyntectHighlighter {
    theme: Option<Theme>,
}

impl SyntectHighlighter {
    /// Creates a highlighter using `theme_name`
    ///
    /// Unknown theme names fall back to [`DEFAULT_THEME`].
    pub fn new(theme_name: &str) -> Self {
        let themes = &syntect_assets().theme_set.themes;
        let theme = themes.get(theme_name).cloned().or_else(|| {
            tracing::warn!("Unknown theme {}, using {}", theme_name, DEFAULT_THEME);
            themes
                .get(DEFAULT_THEME)
                .or_else(|| themes.values().next())
                .cloned()
        });
        Self { theme }
    }

    /// True if syntect has a definition for `language`
    pub fn supports(language: &str) -> bool {
        let syntax_set = &syntect_assets().syntax_set;
        syntax_set.find_syntax_by_token(language).is_some()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let theme = self.theme.as_ref()?;
        let syntax_set = &syntect_assets().syntax_set;
        let syntax = syntax_set
            .find_syntax_by_token(language)
            .or_else(|| syntax_set.find_syntax_by_extension(language))?;

        let mut lines = HighlightLines::new(syntax, theme);
        let mut out = String::with_capacity(code.len() * 2);
        for line in LinesWithEndings::from(code) {
            let ranges = lines.highlight_line(line, syntax_set).ok()?;
            for (style, text) in ranges {
                let fg = style.foreground;
                let mut piece = text.truecolor(fg.r, fg.g, fg.b);
                if style.font_style.contains(FontStyle::BOLD) {
                    piece = piece.bold();
                }
                if style.font_style.contains(FontStyle::ITALIC) {
                    piece = piece.italic();
                }
                out.push_str(&piece.to_string());
            }
        }
        Some(out)
    }
}

/// Language tag to highlighter table
#[derive(Default)]
pub struct HighlighterRegistry {
    by_language: HashMap<String, Arc<dyn Highlighter>>,
    fallback: Option<Arc<dyn Highlighter>>,
}

impl HighlighterRegistry {
    /// Registry with no highlighters; every block renders plain
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry that highlights every language syntect knows
    pub fn with_syntect(theme_name: &str) -> Self {
        Self {
            by_language: HashMap::new(),
            fallback: Some(Arc::new(SyntectHighlighter::new(theme_name))),
        }
    }

    /// Binds `language` (case-insensitive) to `highlighter`
    pub fn register(&mut self, language: &str, highlighter: Arc<dyn Highlighter>) {
        self.by_language
            .insert(language.to_ascii_lowercase(), highlighter);
    }

    /// Highlights `code`, or returns `None` if no highlighter handles it
    pub fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let key = language.to_ascii_lowercase();
        match self.by_language.get(&key) {
            Some(highlighter) => highlighter.highlight(&key, code),
            None => self.fallback.as_ref()?.highlight(&key, code),
        }
    }
}
