use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::normalize::normalize_text;
use super::symbols::SymbolAlphabet;
use super::template::Template;

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap()
});

const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "br",
    "li",
    "ul",
    "ol",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "table",
    "thead",
    "tbody",
    "tr",
    "td",
    "th",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeconstructError {
    #[error("text is empty, there is nothing to turn into blanks")]
    EmptyText,
    #[error("symbol alphabet is empty, no blank could ever be filled")]
    EmptyAlphabet,
    #[error("template holds {placeholders} placeholders but {solutions} solutions were collected")]
    PlaceholderMismatch { placeholders: usize, solutions: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeconstructOptions {
    /// Wrap each word and the blank group following it in a word group.
    pub word_groups: bool,
}

impl Default for DeconstructOptions {
    fn default() -> Self {
        Self { word_groups: true }
    }
}

/// Template plus one expected solution string per placeholder, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deconstruction {
    pub template: Template,
    pub solutions: Vec<String>,
}

impl Deconstruction {
    pub fn placeholder_template(&self) -> Template {
        self.template.placeholder_template()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}

pub fn deconstruct(
    text: &str,
    alphabet: &SymbolAlphabet,
) -> Result<Deconstruction, DeconstructError> {
    deconstruct_with(text, alphabet, DeconstructOptions::default())
}

/// Splits `text` into literal segments and blank runs.
///
/// A blank run is a maximal stretch of spaces and alphabet symbols. Runs never
/// cross block-level tags or line breaks, inline tags met inside a run are
/// moved behind its placeholder and every run, trailing ones included, yields
/// exactly one placeholder.
pub fn deconstruct_with(
    text: &str,
    alphabet: &SymbolAlphabet,
    options: DeconstructOptions,
) -> Result<Deconstruction, DeconstructError> {
    if text.is_empty() {
        return Err(DeconstructError::EmptyText);
    }
    if alphabet.is_empty() {
        return Err(DeconstructError::EmptyAlphabet);
    }

    let normalized = normalize_text(text);
    let mut scanner = Scanner::new(alphabet, options);
    scanner.scan(&normalized);
    let deconstruction = scanner.finish();

    let placeholders = deconstruction.template.placeholder_count();
    if placeholders != deconstruction.solutions.len() {
        return Err(DeconstructError::PlaceholderMismatch {
            placeholders,
            solutions: deconstruction.solutions.len(),
        });
    }

    debug!(
        placeholders,
        symbols = %alphabet,
        text_len = normalized.len(),
        "deconstructed text"
    );
    Ok(deconstruction)
}

#[derive(Default)]
struct Run {
    solution: String,
    deferred_markup: Vec<String>,
}

struct Scanner<'a> {
    alphabet: &'a SymbolAlphabet,
    options: DeconstructOptions,
    template: Template,
    solutions: Vec<String>,
    run: Option<Run>,
    word: String,
}

impl<'a> Scanner<'a> {
    fn new(alphabet: &'a SymbolAlphabet, options: DeconstructOptions) -> Self {
        Self {
            alphabet,
            options,
            template: Template::default(),
            solutions: Vec::new(),
            run: None,
            word: String::new(),
        }
    }

    fn scan(&mut self, text: &str) {
        let mut pos = 0;
        while let Some(ch) = text[pos..].chars().next() {
            let rest = &text[pos..];

            if ch == '<'
                && let Some(tag) = read_tag(rest)
            {
                self.on_tag(tag);
                pos += tag.len();
                continue;
            }

            if ch == '&'
                && let Some(entity) = ENTITY_RE.find(rest)
            {
                let entity = entity.as_str();
                match single_char(&decode_html_entities(entity)) {
                    Some(decoded) if self.alphabet.is_blank_worthy(decoded) => {
                        self.on_blank(decoded)
                    }
                    _ => self.on_literal(entity),
                }
                pos += entity.len();
                continue;
            }

            if ch == '\n' {
                self.end_paragraph();
                self.template.push_text("\n");
            } else if self.alphabet.is_blank_worthy(ch) {
                self.on_blank(ch);
            } else {
                let mut buf = [0u8; 4];
                self.on_literal(ch.encode_utf8(&mut buf));
            }
            pos += ch.len_utf8();
        }
        self.end_paragraph();
    }

    fn finish(self) -> Deconstruction {
        Deconstruction {
            template: self.template,
            solutions: self.solutions,
        }
    }

    fn on_blank(&mut self, ch: char) {
        self.run.get_or_insert_with(Run::default).solution.push(ch);
    }

    fn on_literal(&mut self, literal: &str) {
        self.close_run();
        self.word.push_str(literal);
    }

    fn on_tag(&mut self, tag: &str) {
        if is_block_tag(tag) {
            self.end_paragraph();
            self.template.push_markup(tag.to_string());
        } else if let Some(run) = self.run.as_mut() {
            run.deferred_markup.push(tag.to_string());
        } else {
            self.flush_word();
            self.template.push_markup(tag.to_string());
        }
    }

    fn end_paragraph(&mut self) {
        self.close_run();
        self.flush_word();
    }

    fn close_run(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };

        let placeholder = self.solutions.len();
        self.solutions.push(run.solution);

        if self.options.word_groups && !self.word.is_empty() {
            let word = std::mem::take(&mut self.word);
            self.template.push_word_group(word, placeholder);
        } else {
            self.flush_word();
            self.template.push_placeholder(placeholder);
        }

        for markup in run.deferred_markup {
            self.template.push_markup(markup);
        }
    }

    fn flush_word(&mut self) {
        if !self.word.is_empty() {
            let word = std::mem::take(&mut self.word);
            self.template.push_text(&word);
        }
    }
}

/// Returns the tag or comment starting at `rest`, if `rest` opens one.
fn read_tag(rest: &str) -> Option<&str> {
    if rest.starts_with("<!--") {
        return rest.find("-->").map(|end| &rest[..end + 3]);
    }

    let next = rest[1..].chars().next()?;
    if !(next.is_ascii_alphabetic() || next == '/' || next == '!') {
        return None;
    }

    // A `>` inside a quoted attribute value does not close the tag.
    let mut quote: Option<char> = None;
    let mut prev = '<';
    for (offset, ch) in rest.char_indices().skip(1) {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if (ch == '"' || ch == '\'') && prev == '=' => quote = Some(ch),
            None if ch == '>' => return Some(&rest[..=offset]),
            None => {}
        }
        if !ch.is_whitespace() {
            prev = ch;
        }
    }
    None
}

fn is_block_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCK_TAGS.contains(&name.as_str())
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}
