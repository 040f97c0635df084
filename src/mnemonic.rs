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

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::entropy::{Entropy, Strength};
use crate::error::{Error, Result};
use crate::wordlist::Wordlist;

const BITS_PER_WORD: usize = 11;

pub struct Mnemonic {
    language: String,
    indices: Zeroizing<Vec<u16>>,
    phrase: Zeroizing<String>,
}

pub fn checksum(entropy: &[u8]) -> Result<u8> {
    let strength = Strength::from_byte_len(entropy.len())?;
    let digest = Sha256::digest(entropy);
    Ok(digest[0] >> (8 - strength.checksum_bits()))
}

fn read_bits(stream: &[u8], offset: usize, width: usize) -> u16 {
    (offset..offset + width).fold(0u16, |acc, bit| {
        let set = (stream[bit / 8] >> (7 - bit % 8)) & 1;
        (acc << 1) | u16::from(set)
    })
}

fn write_bits(stream: &mut [u8], offset: usize, width: usize, value: u16) {
    for i in 0..width {
        let bit = offset + i;
        if (value >> (width - 1 - i)) & 1 == 1 {
            stream[bit / 8] |= 0x80 >> (bit % 8);
        }
    }
}

pub fn encode(entropy: &Entropy, wordlist: &Wordlist) -> Result<Mnemonic> {
    let strength = Strength::from_byte_len(entropy.len())?;
    let bytes = entropy.as_bytes();

    // The checksum is at most 8 bits, so one extra byte holds it.
    let mut stream = Zeroizing::new(Vec::with_capacity(bytes.len() + 1));
    stream.extend_from_slice(bytes);
    stream.push(checksum(bytes)? << (8 - strength.checksum_bits()));

    let indices: Zeroizing<Vec<u16>> = Zeroizing::new(
        (0..strength.word_count())
            .map(|i| read_bits(&stream, i * BITS_PER_WORD, BITS_PER_WORD))
            .collect(),
    );

    log::debug!(
        "Encoded {} entropy as {} {} words",
        strength,
        indices.len(),
        wordlist.language()
    );

    Ok(Mnemonic::from_indices(indices, wordlist))
}

impl Mnemonic {
    fn from_indices(indices: Zeroizing<Vec<u16>>, wordlist: &Wordlist) -> Self {
        let mut phrase = Zeroizing::new(String::new());
        for (i, &index) in indices.iter().enumerate() {
            if i > 0 {
                phrase.push_str(wordlist.separator());
            }
            phrase.push_str(wordlist.word(index));
        }

        Self {
            language: wordlist.language().to_string(),
            indices,
            phrase,
        }
    }

    pub fn parse(phrase: &str, wordlist: &Wordlist) -> Result<Self> {
        let normalized: Zeroizing<String> = Zeroizing::new(phrase.nfkd().collect());
        let words: Vec<&str> = normalized.split_whitespace().collect();

        let strength = match words.len() {
            12 => Strength::Bits128,
            24 => Strength::Bits256,
            n => return Err(Error::InvalidWordCount(n)),
        };

        let mut indices = Zeroizing::new(Vec::with_capacity(words.len()));
        for (i, word) in words.iter().enumerate() {
            let index = wordlist.index_of(word).ok_or_else(|| Error::UnknownWord {
                position: i + 1,
                word: word.to_string(),
            })?;
            indices.push(index);
        }

        let mut stream = Zeroizing::new(vec![0u8; strength.bytes() + 1]);
        for (i, &index) in indices.iter().enumerate() {
            write_bits(&mut stream, i * BITS_PER_WORD, BITS_PER_WORD, index);
        }

        let entropy = &stream[..strength.bytes()];
        let found = stream[strength.bytes()] >> (8 - strength.checksum_bits());
        let expected = checksum(entropy)?;
        if !bool::from(found.ct_eq(&expected)) {
            return Err(Error::ChecksumMismatch);
        }

        Ok(Self::from_indices(indices, wordlist))
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn word_count(&self) -> usize {
        self.indices.len()
    }

    pub fn strength(&self) -> Strength {
        if self.indices.len() == Strength::Bits256.word_count() {
            Strength::Bits256
        } else {
            Strength::Bits128
        }
    }

    pub fn entropy(&self) -> Result<Entropy> {
        let strength = self.strength();
        let mut stream = Zeroizing::new(vec![0u8; strength.bytes() + 1]);
        for (i, &index) in self.indices.iter().enumerate() {
            write_bits(&mut stream, i * BITS_PER_WORD, BITS_PER_WORD, index);
        }
        Entropy::from_slice(&stream[..strength.bytes()])
    }

    pub fn checksum(&self) -> u8 {
        let strength = self.strength();
        let last = self.indices[self.indices.len() - 1];
        (last & ((1 << strength.checksum_bits()) - 1)) as u8
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("language", &self.language)
            .field("words", &self.indices.len())
            .finish_non_exhaustive()
    }
}
