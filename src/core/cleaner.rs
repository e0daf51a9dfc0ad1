// File: src/core/cleaner.rs
use std::iter::Peekable;
use std::str::Chars;

const APOSTROPHE: char = '\'';
const FULLWIDTH_COMMA: char = '，';

/// True for the fixed set of characters removed before tokenization:
/// ASCII punctuation and symbols, ASCII digits and the fullwidth comma.
#[inline]
fn is_removed(c: char) -> bool {
    c.is_ascii_punctuation() || c.is_ascii_digit() || c == FULLWIDTH_COMMA
}

/// Removes punctuation, digits and symbols. Letters of any script and
/// whitespace pass through unchanged; nothing here can fail.
pub fn clean_text(raw: &str) -> String {
    raw.chars().filter(|&c| !is_removed(c)).collect()
}

/// Splits text into lowercase word tokens. See [`Tokens`].
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        chars: text.chars().peekable(),
    }
}

/// Single-pass iterator over the tokens of a text.
///
/// A token is a maximal run of alphabetic characters which may contain one
/// apostrophe between two letters ("don't"). Everything else separates tokens.
pub struct Tokens<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Tokens<'a> {
    fn push_letters(&mut self, token: &mut String) {
        while let Some(&c) = self.chars.peek() {
            if !c.is_alphabetic() {
                break;
            }
            token.extend(c.to_lowercase());
            self.chars.next();
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        // Skip to the first letter.
        while let Some(&c) = self.chars.peek() {
            if c.is_alphabetic() {
                break;
            }
            self.chars.next();
        }
        self.chars.peek()?;

        let mut token = String::new();
        self.push_letters(&mut token);

        if self.chars.peek() == Some(&APOSTROPHE) {
            // a trailing apostrophe is a separator and is simply consumed
            self.chars.next();
            if self.chars.peek().map_or(false, |c| c.is_alphabetic()) {
                token.push(APOSTROPHE);
                self.push_letters(&mut token);
            }
        }

        Some(token)
    }
}
