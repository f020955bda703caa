//! Text sanitization for extracted entry fields
//!
//! Entry bodies arrive as markup with `<br>` line breaks, inline links and
//! stray indentation from the page template. These helpers turn an element
//! into clean plain text while keeping the author's line structure.

use regex::Regex;
use scraper::{ElementRef, Node};
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

static MULTI_NEWLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Plain text of an element, with `<br>` rendered as a newline
///
/// Newlines that only come from the markup's indentation are folded into
/// spaces; `<br>` is the only line break that survives.
///
/// # Examples
///
/// ```
/// use eksi_scraper::parser::sanitize::text_with_breaks;
/// use scraper::{Html, Selector};
///
/// let html = Html::parse_fragment(r#"<div class="content">one<br>two <a href="/?q=three">three</a></div>"#);
/// let selector = Selector::parse("div.content").unwrap();
/// let div = html.select(&selector).next().unwrap();
/// assert_eq!(text_with_breaks(div), "one\ntwo three");
/// ```
pub fn text_with_breaks(element: ElementRef<'_>) -> String {
    let mut raw = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(&text.replace(['\n', '\r'], " ")),
            Node::Element(el) if el.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }

    sanitize_text(&raw)
}

/// Sanitize extracted text content
///
/// 1. Remove zero-width characters
/// 2. Remove control characters (except newline/tab)
/// 3. Normalize runs of spaces and tabs
/// 4. Trim each line
/// 5. Collapse 3+ newlines to a blank line
///
/// # Examples
///
/// ```
/// use eksi_scraper::parser::sanitize::sanitize_text;
///
/// let dirty = "  merhaba\u{200B}   dünya  \n\n\n\n  ikinci";
/// assert_eq!(sanitize_text(dirty), "merhaba dünya\n\nikinci");
/// ```
pub fn sanitize_text(text: &str) -> String {
    let mut result = remove_zero_width(text);
    result = remove_control_chars(&result);
    result = WHITESPACE_REGEX.replace_all(&result, " ").to_string();
    result = trim_lines(&result);
    result = MULTI_NEWLINE_REGEX.replace_all(&result, "\n\n").to_string();

    result.trim().to_string()
}

/// Remove zero-width spaces, direction marks, bidi embeddings and the BOM
///
/// Joiners (U+200C, U+200D) are kept; emoji sequences and some scripts
/// depend on them.
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}' |
                '\u{200E}' | '\u{200F}' |
                '\u{202A}'..='\u{202E}' |
                '\u{FEFF}'
            )
        })
        .collect()
}

/// Remove control characters except newline and tab
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

fn trim_lines(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n")
}
