use once_cell::sync::Lazy;
use regex::Regex;

pub const NBSP: char = '\u{00A0}';
/// Keeps an empty paragraph's height without ever being blank-worthy.
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

static NBSP_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)&nbsp;|&#160;|&#x0*a0;").unwrap());
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());
static BLOCK_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\s*(</?(?:p|div|br|li|ul|ol|h[1-6]|blockquote|pre|table|thead|tbody|tr|td|th)\b(?:"[^"]*"|'[^']*'|[^'">])*>)\s*"#,
    )
    .unwrap()
});
static EMPTY_PARAGRAPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<p\b((?:"[^"]*"|'[^']*'|[^'">])*)></p>"#).unwrap());

/// Prepares exercise text for scanning.
///
/// Line endings become `\n`, every non-breaking space becomes a plain space,
/// runs of spaces collapse to one, whitespace hugging block-level tags is
/// dropped and empty paragraphs receive a zero-width space.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = NBSP_ENTITY_RE.replace_all(&text, " ");
    let text = text.replace(NBSP, " ");
    let text = SPACE_RUN_RE.replace_all(&text, " ");
    let text = BLOCK_TAG_RE.replace_all(&text, "$1");
    let replacement = format!("<p${{1}}>{ZERO_WIDTH_SPACE}</p>");
    let text = EMPTY_PARAGRAPH_RE.replace_all(&text, replacement.as_str());
    text.into_owned()
}
