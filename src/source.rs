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

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::Rng;
use rand::rngs::ThreadRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::entropy::{Entropy, EntropyContribution, Origin, Strength};
use crate::error::{Error, Result};
use crate::terminal::{Key, RawModeGuard, Terminal};

pub const DEFAULT_HWRNG: &str = "/dev/hwrng";
pub const DEFAULT_RANDOM: &str = "/dev/random";

pub trait EntropySource {
    fn origin(&self) -> Origin;

    fn acquire(&mut self, strength: Strength) -> Result<EntropyContribution>;
}

fn truncated_digest(data: &[u8], len: usize) -> Result<Entropy> {
    let digest: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(data).into());
    Entropy::from_slice(&digest[..len])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePaths {
    pub hwrng: PathBuf,
    pub fallback: PathBuf,
}

impl Default for DevicePaths {
    fn default() -> Self {
        Self {
            hwrng: PathBuf::from(DEFAULT_HWRNG),
            fallback: PathBuf::from(DEFAULT_RANDOM),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HardwareSource {
    paths: DevicePaths,
}

impl HardwareSource {
    pub fn new(paths: DevicePaths) -> Self {
        Self { paths }
    }

    fn read_device(path: &Path, len: usize) -> io::Result<Zeroizing<Vec<u8>>> {
        let mut device = File::open(path)?;
        let mut buffer = Zeroizing::new(vec![0u8; len]);
        device.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

impl EntropySource for HardwareSource {
    fn origin(&self) -> Origin {
        Origin::Hardware
    }

    fn acquire(&mut self, strength: Strength) -> Result<EntropyContribution> {
        let len = strength.bytes();

        let bytes = match Self::read_device(&self.paths.hwrng, len) {
            Ok(bytes) => {
                log::debug!("Read {} bytes from {}", len, self.paths.hwrng.display());
                bytes
            }
            Err(e) => {
                log::warn!(
                    "{} unavailable ({}), falling back to {}",
                    self.paths.hwrng.display(),
                    e,
                    self.paths.fallback.display()
                );
                let bytes = Self::read_device(&self.paths.fallback, len).map_err(|source| {
                    Error::EntropyUnavailable {
                        primary: self.paths.hwrng.clone(),
                        fallback: self.paths.fallback.clone(),
                        source,
                    }
                })?;
                log::debug!("Read {} bytes from {}", len, self.paths.fallback.display());
                bytes
            }
        };

        Ok(EntropyContribution::new(
            Origin::Hardware,
            Entropy::from_slice(&bytes)?,
        ))
    }
}

pub struct SecretSource {
    secret: Zeroizing<String>,
}

impl SecretSource {
    pub fn new(secret: Zeroizing<String>) -> Self {
        Self { secret }
    }
}

impl EntropySource for SecretSource {
    fn origin(&self) -> Origin {
        Origin::UserSecret
    }

    fn acquire(&mut self, strength: Strength) -> Result<EntropyContribution> {
        let entropy = truncated_digest(self.secret.as_bytes(), strength.bytes())?;
        log::debug!("Digested {}-byte user secret", self.secret.len());
        Ok(EntropyContribution::new(Origin::UserSecret, entropy))
    }
}

pub trait Coin {
    fn discard(&mut self) -> bool;
}

#[derive(Debug, Clone)]
pub struct FairCoin<R = ThreadRng> {
    rng: R,
}

impl FairCoin<ThreadRng> {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for FairCoin<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> FairCoin<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Coin for FairCoin<R> {
    fn discard(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}

pub fn keystroke_digest(chars: &str, timings: &[Duration], len: usize) -> Result<Entropy> {
    let mut combined = Zeroizing::new(chars.as_bytes().to_vec());
    for timing in timings {
        combined.extend_from_slice(timing.as_secs_f64().to_string().as_bytes());
    }
    truncated_digest(&combined, len)
}

// Collecting `n` keys takes about `2n` keystrokes with a fair coin.
pub struct KeystrokeSource<'a, C: Coin> {
    terminal: &'a mut dyn Terminal,
    coin: C,
    progress: Option<Box<dyn FnMut(usize, usize) + 'a>>,
}

impl<'a, C: Coin> KeystrokeSource<'a, C> {
    pub fn new(terminal: &'a mut dyn Terminal, coin: C) -> Self {
        Self {
            terminal,
            coin,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: impl FnMut(usize, usize) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    fn collect(&mut self, count: usize) -> Result<(Zeroizing<String>, Vec<Duration>)> {
        let mut chars = Zeroizing::new(String::with_capacity(count * 4));
        let mut timings = Vec::with_capacity(count);
        let mut discarded = 0usize;

        let mut guard = RawModeGuard::acquire(&mut *self.terminal).map_err(Error::Terminal)?;
        let mut last = Instant::now();

        while timings.len() < count {
            let c = match guard.read_one_char().map_err(Error::Terminal)? {
                Key::Interrupt => return Err(Error::Interrupted),
                Key::Char(c) => c,
            };
            if self.coin.discard() {
                discarded += 1;
                continue;
            }

            let now = Instant::now();
            timings.push(now.duration_since(last));
            last = now;
            chars.push(c);

            if let Some(progress) = self.progress.as_mut() {
                progress(timings.len(), count);
            }
        }

        drop(guard);
        log::debug!(
            "Accepted {} keystrokes, discarded {}",
            timings.len(),
            discarded
        );
        Ok((chars, timings))
    }
}

impl<C: Coin> EntropySource for KeystrokeSource<'_, C> {
    fn origin(&self) -> Origin {
        Origin::Keyboard
    }

    fn acquire(&mut self, strength: Strength) -> Result<EntropyContribution> {
        let (chars, timings) = self.collect(strength.bytes())?;
        let entropy = keystroke_digest(&chars, &timings, strength.bytes())?;
        Ok(EntropyContribution::new(Origin::Keyboard, entropy))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Coin;
    use std::collections::VecDeque;

    pub struct KeepAll;

    impl Coin for KeepAll {
        fn discard(&mut self) -> bool {
            false
        }
    }

    pub struct ScriptedCoin(pub VecDeque<bool>);

    impl ScriptedCoin {
        pub fn alternating(n: usize) -> Self {
            Self((0..n).map(|i| i % 2 == 0).collect())
        }
    }

    impl Coin for ScriptedCoin {
        fn discard(&mut self) -> bool {
            self.0.pop_front().unwrap_or(false)
        }
    }
}
