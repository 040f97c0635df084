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

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strength {
    #[default]
    Bits128,
    Bits256,
}

impl Strength {
    pub const fn bits(self) -> usize {
        match self {
            Self::Bits128 => 128,
            Self::Bits256 => 256,
        }
    }

    pub const fn bytes(self) -> usize {
        self.bits() / 8
    }

    pub const fn checksum_bits(self) -> usize {
        self.bits() / 32
    }

    pub const fn word_count(self) -> usize {
        (self.bits() + self.checksum_bits()) / 11
    }

    pub fn from_bits(bits: usize) -> Result<Self> {
        match bits {
            128 => Ok(Self::Bits128),
            256 => Ok(Self::Bits256),
            other => Err(Error::InvalidEntropyLength(other / 8)),
        }
    }

    pub fn from_byte_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Self::Bits128),
            32 => Ok(Self::Bits256),
            other => Err(Error::InvalidEntropyLength(other)),
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Hardware,
    UserSecret,
    Keyboard,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardware => write!(f, "hwrng"),
            Self::UserSecret => write!(f, "user"),
            Self::Keyboard => write!(f, "keyboard"),
        }
    }
}

#[derive(Clone)]
pub struct Entropy(Zeroizing<Vec<u8>>);

impl Entropy {
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        let bytes = Zeroizing::new(bytes);
        Strength::from_byte_len(bytes.len())?;
        Ok(Self(bytes))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::new(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn strength(&self) -> Strength {
        match self.0.len() {
            32 => Strength::Bits256,
            _ => Strength::Bits128,
        }
    }
}

impl PartialEq for Entropy {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && bool::from(self.as_bytes().ct_eq(other.as_bytes()))
    }
}

impl Eq for Entropy {}

impl fmt::Debug for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entropy({} bytes, redacted)", self.0.len())
    }
}

#[derive(Debug, Clone)]
pub struct EntropyContribution {
    pub origin: Origin,
    pub entropy: Entropy,
}

impl EntropyContribution {
    pub fn new(origin: Origin, entropy: Entropy) -> Self {
        Self { origin, entropy }
    }
}

// An all-zero or known operand adds nothing, and `x ^ x` cancels out.
pub fn combine(parts: &[Entropy]) -> Result<Entropy> {
    let (first, rest) = parts.split_first().ok_or(Error::NoEntropySources)?;

    let mut mixed = Zeroizing::new(first.as_bytes().to_vec());
    for part in rest {
        if part.len() != mixed.len() {
            return Err(Error::EntropyLengthMismatch {
                expected: mixed.len(),
                got: part.len(),
            });
        }
        mixed
            .iter_mut()
            .zip(part.as_bytes())
            .for_each(|(acc, byte)| *acc ^= byte);
    }

    Ok(Entropy(mixed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entropy(bytes: &[u8]) -> Entropy {
        Entropy::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_strength_dimensions() {
        assert_eq!(Strength::Bits128.bytes(), 16);
        assert_eq!(Strength::Bits128.checksum_bits(), 4);
        assert_eq!(Strength::Bits128.word_count(), 12);

        assert_eq!(Strength::Bits256.bytes(), 32);
        assert_eq!(Strength::Bits256.checksum_bits(), 8);
        assert_eq!(Strength::Bits256.word_count(), 24);

        assert_eq!(Strength::default(), Strength::Bits128);
    }

    #[test]
    fn test_strength_from_bits() {
        assert_eq!(Strength::from_bits(128).unwrap(), Strength::Bits128);
        assert_eq!(Strength::from_bits(256).unwrap(), Strength::Bits256);
        assert!(matches!(
            Strength::from_bits(192),
            Err(Error::InvalidEntropyLength(24))
        ));
    }

    #[test]
    fn test_entropy_rejects_bad_lengths() {
        for len in [0usize, 1, 15, 17, 20, 24, 31, 33, 64] {
            let result = Entropy::new(vec![0u8; len]);
            assert!(
                matches!(result, Err(Error::InvalidEntropyLength(l)) if l == len),
                "length {} should be rejected",
                len
            );
        }
        assert_eq!(entropy(&[1u8; 16]).strength(), Strength::Bits128);
        assert_eq!(entropy(&[1u8; 32]).strength(), Strength::Bits256);
    }

    #[test]
    fn test_debug_does_not_leak_bytes() {
        let e = entropy(&[0xab; 16]);
        let rendered = format!("{:?}", e);
        assert!(!rendered.contains("171"));
        assert!(!rendered.to_lowercase().contains("ab, "));
        assert!(rendered.contains("16 bytes"));
    }

    #[test]
    fn test_combine_single_operand_is_identity() {
        let x = entropy(&(0u8..16).collect::<Vec<_>>());
        assert_eq!(combine(std::slice::from_ref(&x)).unwrap(), x);
    }

    #[test]
    fn test_combine_self_cancels() {
        let x = entropy(&[0x5a; 32]);
        let mixed = combine(&[x.clone(), x]).unwrap();
        assert_eq!(mixed.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_combine_with_zero_changes_nothing() {
        let x = entropy(&[0xc3; 16]);
        let zero = entropy(&[0u8; 16]);
        assert_eq!(combine(&[x.clone(), zero]).unwrap(), x);
    }

    #[test]
    fn test_combine_xors_in_order() {
        let a = entropy(&[0b1010_1010; 16]);
        let b = entropy(&[0b1100_1100; 16]);
        let c = entropy(&[0b1111_0000; 16]);
        let mixed = combine(&[a, b, c]).unwrap();
        assert_eq!(mixed.as_bytes(), &[0b1001_0110; 16]);
    }

    #[test]
    fn test_combine_length_mismatch() {
        let a = entropy(&[1u8; 16]);
        let b = entropy(&[2u8; 32]);
        let err = combine(&[a, b]).unwrap_err();
        assert!(matches!(
            err,
            Error::EntropyLengthMismatch {
                expected: 16,
                got: 32
            }
        ));
    }

    #[test]
    fn test_combine_empty() {
        assert!(matches!(combine(&[]), Err(Error::NoEntropySources)));
    }
}
