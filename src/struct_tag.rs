//! Tokenizer for Go struct field tags.
//!
//! A tag is a sequence of `key:"value"` tokens separated by whitespace, e.g.
//! `` `json:"name,omitempty" binding:"required"` ``. Values are quoted strings
//! and may contain spaces or escaped quotes. Malformed tokens are skipped up
//! to the next whitespace; the rest of the tag is still read.

use log::trace;

/// Ordered key/raw-value pairs of one struct tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructTag {
    pairs: Vec<(String, String)>,
}

impl StructTag {
    /// Tokenizes a tag literal. Surrounding backticks are tolerated.
    pub fn parse(literal: &str) -> Self {
        let tag = literal.trim().trim_matches('`');
        let chars: Vec<char> = tag.chars().collect();
        let mut pairs = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i >= chars.len() {
                break;
            }

            let key_start = i;
            while i < chars.len() && chars[i] != ':' && !chars[i].is_whitespace() && chars[i] != '"'
            {
                i += 1;
            }
            let key: String = chars[key_start..i].iter().collect();

            if key.is_empty() || i + 1 >= chars.len() || chars[i] != ':' || chars[i + 1] != '"' {
                trace!("Skipping malformed tag token in {:?}", tag);
                i = skip_token(&chars, i);
                continue;
            }

            i += 2;
            let mut value = String::new();
            let mut closed = false;
            while i < chars.len() {
                match chars[i] {
                    '\\' if i + 1 < chars.len() => {
                        value.push(chars[i + 1]);
                        i += 2;
                    }
                    '"' => {
                        closed = true;
                        i += 1;
                        break;
                    }
                    c => {
                        value.push(c);
                        i += 1;
                    }
                }
            }

            if !closed {
                trace!("Unterminated value for tag key {:?}", key);
                break;
            }
            pairs.push((key, value));
        }

        Self { pairs }
    }

    /// Raw value of the first token with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// First comma-delimited segment of a key's value (`name` in
    /// `json:"name,omitempty"`).
    pub fn name(&self, key: &str) -> Option<&str> {
        self.get(key).map(|v| v.split(',').next().unwrap_or(v))
    }

    /// Whether the key's value lists `option` as one of its comma-delimited
    /// segments.
    pub fn has_option(&self, key: &str, option: &str) -> bool {
        self.get(key)
            .is_some_and(|v| v.split(',').any(|segment| segment.trim() == option))
    }

    /// Pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn skip_token(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && !chars[i].is_whitespace() {
        i += 1;
    }
    i
}
