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

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "no randomness device readable (tried {} and {})",
        .primary.display(),
        .fallback.display()
    )]
    EntropyUnavailable {
        primary: PathBuf,
        fallback: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no entropy sources to mix")]
    NoEntropySources,

    #[error("entropy length mismatch: expected {expected} bytes, got {got}")]
    EntropyLengthMismatch { expected: usize, got: usize },

    #[error("unsupported language \"{0}\"")]
    UnsupportedLanguage(String),

    #[error("invalid entropy length: {0} (must be 16 or 32 bytes, i.e. 128 or 256 bits)")]
    InvalidEntropyLength(usize),

    #[error("invalid wordlist for \"{language}\": {reason}")]
    InvalidWordlist { language: String, reason: String },

    #[error("invalid mnemonic word count {0} (expected 12 or 24)")]
    InvalidWordCount(usize),

    #[error("word {position} (\"{word}\") is not in the wordlist")]
    UnknownWord { position: usize, word: String },

    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,

    #[error("terminal I/O failed")]
    Terminal(#[source] io::Error),

    #[error("keystroke collection interrupted")]
    Interrupted,
}
