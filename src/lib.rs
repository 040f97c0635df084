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

pub mod entropy;
pub mod error;
pub mod mnemonic;
pub mod pipeline;
pub mod seed;
pub mod source;
pub mod terminal;
pub mod wordlist;

pub use entropy::{Entropy, EntropyContribution, Origin, Strength, combine};
pub use error::{Error, Result};
pub use mnemonic::{Mnemonic, encode};
pub use pipeline::{Generated, Generator, GeneratorConfig, recover};
pub use seed::{Seed, derive};
pub use source::{DevicePaths, EntropySource, HardwareSource, KeystrokeSource, SecretSource};
pub use wordlist::{Wordlist, Wordlists};
