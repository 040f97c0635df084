// This file is part of Mnemogen.
//
// Copyright (c) 2025  René Coignard <contact@renecoignard.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

pub const WORDLIST_LEN: usize = 2048;

pub const DEFAULT_LANGUAGE: &str = "english";

const IDEOGRAPHIC_SPACE: &str = "\u{3000}";

const BUILTIN: &[(&str, bip39::Language)] = &[
    ("english", bip39::Language::English),
    ("chinese_simplified", bip39::Language::SimplifiedChinese),
    ("chinese_traditional", bip39::Language::TraditionalChinese),
    ("czech", bip39::Language::Czech),
    ("french", bip39::Language::French),
    ("italian", bip39::Language::Italian),
    ("japanese", bip39::Language::Japanese),
    ("korean", bip39::Language::Korean),
    ("portuguese", bip39::Language::Portuguese),
    ("spanish", bip39::Language::Spanish),
];

pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace('-', "_")
}

#[derive(Debug)]
pub struct Wordlist {
    language: String,
    separator: &'static str,
    words: Vec<Cow<'static, str>>,
    index: HashMap<String, u16>,
}

impl Wordlist {
    pub fn new(language: &str, words: Vec<Cow<'static, str>>) -> Result<Self> {
        let language = normalize_tag(language);
        let invalid = |reason: String| Error::InvalidWordlist {
            language: language.clone(),
            reason,
        };

        if words.len() != WORDLIST_LEN {
            return Err(invalid(format!(
                "expected {} words, found {}",
                WORDLIST_LEN,
                words.len()
            )));
        }

        let mut index = HashMap::with_capacity(WORDLIST_LEN);
        for (i, word) in words.iter().enumerate() {
            if word.trim().is_empty() {
                return Err(invalid(format!("word {} is empty", i + 1)));
            }
            let key: String = word.nfkd().collect();
            if index.insert(key, i as u16).is_some() {
                return Err(invalid(format!("word {} (\"{}\") is a duplicate", i + 1, word)));
            }
        }

        let separator = if language == "japanese" {
            IDEOGRAPHIC_SPACE
        } else {
            " "
        };

        Ok(Self {
            language,
            separator,
            words,
            index,
        })
    }

    pub fn from_text(language: &str, text: &str) -> Result<Self> {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Cow::Owned(line.to_string()))
            .collect();
        Self::new(language, words)
    }

    pub fn from_file(language: &str, path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::InvalidWordlist {
            language: normalize_tag(language),
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_text(language, &text)
    }

    fn builtin(tag: &str, language: bip39::Language) -> Result<Self> {
        let words = language
            .word_list()
            .iter()
            .map(|&w| Cow::Borrowed(w))
            .collect();
        Self::new(tag, words)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn separator(&self) -> &'static str {
        self.separator
    }

    // Panics if `index >= 2048`.
    pub fn word(&self, index: u16) -> &str {
        &self.words[index as usize]
    }

    pub fn index_of(&self, word: &str) -> Option<u16> {
        let key: String = word.nfkd().collect();
        self.index.get(&key).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index_of(word).is_some()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|w| w.as_ref())
    }
}

#[derive(Debug, Default)]
pub struct Wordlists {
    lists: HashMap<String, Wordlist>,
}

impl Wordlists {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::empty();
        for (tag, language) in BUILTIN {
            registry.register(Wordlist::builtin(tag, *language)?);
        }
        Ok(registry)
    }

    pub fn register(&mut self, wordlist: Wordlist) {
        log::debug!("Registered wordlist \"{}\"", wordlist.language());
        self.lists.insert(wordlist.language().to_string(), wordlist);
    }

    pub fn load_file(&mut self, language: &str, path: &Path) -> Result<()> {
        self.register(Wordlist::from_file(language, path)?);
        Ok(())
    }

    pub fn get(&self, language: &str) -> Result<&Wordlist> {
        let tag = normalize_tag(language);
        self.lists
            .get(&tag)
            .ok_or(Error::UnsupportedLanguage(tag))
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.lists.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

#[cfg(test)]
pub(crate) fn fake_wordlist(language: &str) -> Wordlist {
    let words = (0..WORDLIST_LEN)
        .map(|i| Cow::Owned(format!("w{:04}", i)))
        .collect();
    Wordlist::new(language, words).unwrap()
}
