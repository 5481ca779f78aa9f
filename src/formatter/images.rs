//! Image auto-linking and image markup parsing
//!
//! Bare URLs that point at an image are rewritten into `![image](url)` so
//! downstream formatting materializes them as image references instead of
//! plain text.

use crate::formatter::{ImageRef, Run};
use regex::Regex;
use std::sync::OnceLock;

const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".gif"];

/// Characters that commonly trail a URL in prose without being part of it
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// Matches existing markdown links/images (group 1) or bare URLs (group 2)
///
/// Emphasis markers and pipes end a bare URL so `**url**` and `url|cell`
/// still see the image extension.
fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(!?\[[^\]]*\]\([^)]*\))|(https?://[^\s<>()\[\]|*]+)")
            .expect("url pattern is valid")
    })
}

fn image_markup_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)").expect("image markup pattern is valid")
    })
}

/// Returns true if `url` ends with a known image extension (case-insensitive)
pub fn is_image_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Rewrites bare image URLs in `text` into image markup
///
/// URLs already inside markdown link or image syntax, and anything inside
/// fenced code blocks, are left untouched.
///
/// # Examples
///
/// ```
/// use chatwidget::formatter::autolink_images;
///
/// assert_eq!(
///     autolink_images("See https://example.com/cat.PNG."),
///     "See ![image](https://example.com/cat.PNG)."
/// );
/// assert_eq!(
///     autolink_images("Docs at https://example.com/guide"),
///     "Docs at https://example.com/guide"
/// );
/// ```
pub fn autolink_images(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_fence = false;

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            out.push_str(line);
            continue;
        }
        if in_fence {
            out.push_str(line);
            continue;
        }

        out.push_str(&autolink_line(line));
    }

    out
}

fn autolink_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for caps in url_pattern().captures_iter(line) {
        let Some(bare) = caps.get(2) else {
            continue;
        };

        let url = bare.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if !is_image_url(url) {
            continue;
        }

        out.push_str(&line[last..bare.start()]);
        out.push_str("![image](");
        out.push_str(url);
        out.push(')');
        last = bare.start() + url.len();
    }

    out.push_str(&line[last..]);
    out
}

/// Returns true if `line` contains image markup
pub fn contains_image_markup(line: &str) -> bool {
    image_markup_pattern().is_match(line)
}

/// Splits `text` into plain runs and image runs
///
/// Empty plain runs between adjacent images are dropped.
pub fn split_image_runs(text: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in image_markup_pattern().captures_iter(text) {
        let (Some(whole), Some(alt), Some(url)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if whole.start() > last {
            runs.push(Run::Plain(text[last..whole.start()].to_string()));
        }
        runs.push(Run::Image(ImageRef {
            alt: alt.as_str().to_string(),
            url: url.as_str().to_string(),
        }));
        last = whole.end();
    }

    if last < text.len() {
        runs.push(Run::Plain(text[last..].to_string()));
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_url_extensions() {
        assert!(is_image_url("https://x.io/a.png"));
        assert!(is_image_url("https://x.io/a.JPG"));
        assert!(is_image_url("https://x.io/a.jpeg"));
        assert!(is_image_url("https://x.io/a.Gif"));
        assert!(!is_image_url("https://x.io/a.webp"));
        assert!(!is_image_url("https://x.io/a.png?size=2"));
    }

    #[test]
    fn test_autolink_rewrites_bare_image_url() {
        assert_eq!(
            autolink_images("https://cdn.example.com/chart.jpg"),
            "![image](https://cdn.example.com/chart.jpg)"
        );
    }

    #[test]
    fn test_autolink_leaves_existing_markup_alone() {
        let text = "![chart](https://x.io/c.png) and [logo](https://x.io/l.gif)";
        assert_eq!(autolink_images(text), text);
    }

    #[test]
    fn test_autolink_handles_multiple_urls_per_line() {
        assert_eq!(
            autolink_images("a https://x.io/1.png b https://x.io/page c https://x.io/2.gif"),
            "a ![image](https://x.io/1.png) b https://x.io/page c ![image](https://x.io/2.gif)"
        );
    }

    #[test]
    fn test_autolink_inside_emphasis() {
        assert_eq!(
            autolink_images("**https://x.io/a.png**"),
            "**![image](https://x.io/a.png)**"
        );
        assert_eq!(
            autolink_images("*https://x.io/a.JPEG*"),
            "*![image](https://x.io/a.JPEG)*"
        );
    }

    #[test]
    fn test_autolink_stops_at_pipe() {
        assert_eq!(
            autolink_images("see https://x.io/a.png|next"),
            "see ![image](https://x.io/a.png)|next"
        );
    }

    #[test]
    fn test_autolink_skips_fenced_code() {
        let text = "```\nhttps://x.io/a.png\n```\nhttps://x.io/b.png";
        assert_eq!(
            autolink_images(text),
            "```\nhttps://x.io/a.png\n```\n![image](https://x.io/b.png)"
        );
    }

    #[test]
    fn test_autolink_preserves_line_structure() {
        let text = "first\n\nthird\n";
        assert_eq!(autolink_images(text), text);
    }

    #[test]
    fn test_split_image_runs_interleaves_plain_text() {
        let runs = split_image_runs("before ![a](https://x.io/a.png) after");
        assert_eq!(
            runs,
            vec![
                Run::Plain("before ".to_string()),
                Run::Image(ImageRef {
                    alt: "a".to_string(),
                    url: "https://x.io/a.png".to_string()
                }),
                Run::Plain(" after".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_image_runs_without_images_is_single_plain_run() {
        assert_eq!(
            split_image_runs("just text"),
            vec![Run::Plain("just text".to_string())]
        );
        assert!(!contains_image_markup("just text"));
    }
}
