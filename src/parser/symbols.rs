use std::fmt;

use html_escape::decode_html_entities;

use super::normalize::NBSP;

/// Characters a blank may be filled with.
///
/// Entities are decoded, whitespace is dropped and every character is kept
/// once, in the order it was first seen. The space character is never part of
/// the alphabet even though it is always blank-worthy while scanning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolAlphabet {
    symbols: Vec<char>,
}

impl SymbolAlphabet {
    pub fn new(raw: &str) -> Self {
        let decoded = decode_html_entities(raw);
        let mut symbols: Vec<char> = Vec::new();

        for ch in decoded.chars() {
            if ch.is_whitespace() || ch == NBSP || symbols.contains(&ch) {
                continue;
            }
            symbols.push(ch);
        }

        Self { symbols }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.symbols.contains(&ch)
    }

    /// Space or alphabet member.
    pub fn is_blank_worthy(&self, ch: char) -> bool {
        ch == ' ' || self.contains(ch)
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    pub fn as_slice(&self) -> &[char] {
        &self.symbols
    }
}

impl fmt::Display for SymbolAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.symbols {
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}
