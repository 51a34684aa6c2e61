use blake3::Hasher;

use super::normalize::normalize_text;
use super::symbols::SymbolAlphabet;

// things that shouldn't change the fingerprint
// Line ending style
// Non-breaking vs plain spaces
// Repeated spaces
// Whitespace around paragraph tags
// Order or duplicates in the symbol alphabet

// things that should change the fingerprint
// Any word, symbol or markup change
// Case differences
// Adding or removing a symbol from the alphabet

/// Stable key for the saved answers of an exercise.
///
/// Two inputs share a fingerprint exactly when they deconstruct into the same
/// placeholders and solutions.
pub fn exercise_fingerprint(text: &str, alphabet: &SymbolAlphabet) -> Option<String> {
    if text.is_empty() || alphabet.is_empty() {
        return None;
    }
    let normalized = normalize_text(text);

    let mut symbols: Vec<char> = alphabet.iter().collect();
    symbols.sort_unstable();
    let symbols: String = symbols.into_iter().collect();

    let mut hasher = Hasher::new();
    hasher.update(symbols.as_bytes());
    hasher.update(&[0x1f]);
    hasher.update(normalized.as_bytes());

    Some(hasher.finalize().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fingerprint(text: &str, symbols: &str) -> Option<String> {
        exercise_fingerprint(text, &SymbolAlphabet::new(symbols))
    }

    proptest! {
        #[test]
        fn never_panics(text in "\\PC*", symbols in "\\PC*") {
            fingerprint(&text, &symbols);
        }
    }

    #[test]
    fn formatting_noise_keeps_the_fingerprint() {
        let a = fingerprint("<p>Hello, world.</p>\r\n<p>Bye.</p>", ",.");
        let b = fingerprint("<p>Hello,&nbsp; world.</p>\n\n<p>Bye.</p>", ".,,");
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn content_changes_alter_the_fingerprint() {
        let base = fingerprint("Hello, world.", ",.");
        assert_ne!(base, fingerprint("Hello world.", ",."));
        assert_ne!(base, fingerprint("hello, world.", ",."));
        assert_ne!(base, fingerprint("Hello, world.", ",.!"));
        assert_ne!(base, fingerprint("Hello, <em>world</em>.", ",."));
    }

    #[test]
    fn nothing_to_fingerprint() {
        assert!(fingerprint("", ",").is_none());
        assert!(fingerprint("Hello, world.", "").is_none());
    }

    #[test]
    fn blank_only_text_still_has_a_fingerprint() {
        let spaces = fingerprint("   ", ",");
        assert!(spaces.is_some());
        assert_ne!(spaces, fingerprint(",", ","));
    }
}
