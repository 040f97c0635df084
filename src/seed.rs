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

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::mnemonic::Mnemonic;

pub const PBKDF2_ROUNDS: u32 = 2048;
pub const SEED_LEN: usize = 64;

const SALT_PREFIX: &str = "mnemonic";

pub struct Seed(Zeroizing<[u8; SEED_LEN]>);

impl Seed {
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.0[..]))
    }
}

impl PartialEq for Seed {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        bool::from(self.0[..].ct_eq(&other.0[..]))
    }
}

impl Eq for Seed {}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(redacted)")
    }
}

pub fn derive(mnemonic: &Mnemonic, passphrase: &str) -> Seed {
    derive_from_phrase(mnemonic.phrase(), passphrase)
}

// Runs of whitespace in the phrase collapse to one space after NFKD. Only
// reachable through `derive`, whose phrases are already canonical.
pub(crate) fn derive_from_phrase(phrase: &str, passphrase: &str) -> Seed {
    let normalized: Zeroizing<String> = Zeroizing::new(phrase.nfkd().collect());
    let password: Zeroizing<String> = Zeroizing::new(
        normalized
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
    );

    let mut salt = Zeroizing::new(String::from(SALT_PREFIX));
    salt.extend(passphrase.nfkd());

    let mut output = Zeroizing::new([0u8; SEED_LEN]);
    pbkdf2_hmac::<Sha512>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ROUNDS,
        &mut output[..],
    );

    Seed(output)
}
