//! Keyword table and reserved words.
//!
//! Keywords map symbolic tags used by block definitions (`"NUMBER"`,
//! `"HIGH"`, ...) to the literal word of the active target system.

use serde::{Deserialize, Serialize};

/// Ordered `(tag, word)` table. Unknown tags resolve to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keywords {
    entries: Vec<(String, String)>,
}

impl Keywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, T, W>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, W)>,
        T: Into<String>,
        W: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(t, w)| (t.into(), w.into()))
                .collect(),
        }
    }

    /// Parse a JSON array of `[tag, word]` pairs.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Word for `tag`: the first matching entry, or `tag` itself.
    pub fn keyword<'a>(&'a self, tag: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, w)| w.as_str())
            .unwrap_or(tag)
    }

    /// Overwrite the word of every entry tagged `tag`. Unknown tags are ignored.
    pub fn set_keyword(&mut self, tag: &str, word: &str) {
        for (_, w) in self.entries.iter_mut().filter(|(t, _)| t == tag) {
            *w = word.to_string();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Words the target language reserves, matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservedWords {
    words: Vec<String>,
}

impl ReservedWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a comma separated list such as `"int,void,while"`.
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim).filter(|w| !w.is_empty()))
    }

    pub fn check(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }
}
