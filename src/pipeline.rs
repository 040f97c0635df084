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
use std::io;
use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use crate::entropy::{self, Entropy, Origin, Strength};
use crate::error::{Error, Result};
use crate::mnemonic::{self, Mnemonic};
use crate::seed::{self, Seed};
use crate::source::{DevicePaths, EntropySource, HardwareSource, SecretSource};
use crate::wordlist::{DEFAULT_LANGUAGE, Wordlists};

#[derive(Clone)]
pub struct GeneratorConfig {
    pub strength: Strength,
    pub language: String,
    pub user_entropy: Option<Zeroizing<String>>,
    pub keyboard_entropy: bool,
    pub passphrase: Zeroizing<String>,
    pub devices: DevicePaths,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strength: Strength::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            user_entropy: None,
            keyboard_entropy: false,
            passphrase: Zeroizing::new(String::new()),
            devices: DevicePaths::default(),
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("strength", &self.strength)
            .field("language", &self.language)
            .field("user_entropy", &self.user_entropy.is_some())
            .field("keyboard_entropy", &self.keyboard_entropy)
            .field("passphrase", &!self.passphrase.is_empty())
            .field("devices", &self.devices)
            .finish()
    }
}

#[derive(Debug)]
pub struct Generated {
    pub mnemonic: Mnemonic,
    pub seed: Seed,
    pub origins: Vec<Origin>,
    // Mixing, encoding and derivation only.
    pub elapsed: Duration,
}

pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    wordlists: &'a Wordlists,
    keyboard: Option<Box<dyn EntropySource + 'a>>,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a GeneratorConfig, wordlists: &'a Wordlists) -> Self {
        Self {
            config,
            wordlists,
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, source: impl EntropySource + 'a) -> Self {
        self.keyboard = Some(Box::new(source));
        self
    }

    pub fn generate(self) -> Result<Generated> {
        let config = self.config;
        let wordlists = self.wordlists;

        // Resolved first so a bad tag fails before any device is opened.
        let wordlist = wordlists.get(&config.language)?;

        let mut sources: Vec<Box<dyn EntropySource + 'a>> =
            vec![Box::new(HardwareSource::new(config.devices.clone()))];

        if let Some(secret) = config.user_entropy.as_ref().filter(|s| !s.is_empty()) {
            sources.push(Box::new(SecretSource::new(secret.clone())));
        }

        if config.keyboard_entropy {
            let keyboard = self.keyboard.ok_or_else(|| {
                Error::Terminal(io::Error::new(
                    io::ErrorKind::NotFound,
                    "keyboard entropy requested but no terminal is attached",
                ))
            })?;
            sources.push(keyboard);
        }

        let mut origins = Vec::with_capacity(sources.len());
        let mut parts: Vec<Entropy> = Vec::with_capacity(sources.len());
        for source in sources.iter_mut() {
            let contribution = source.acquire(config.strength)?;
            log::debug!(
                "Acquired {} bytes from {}",
                contribution.entropy.len(),
                contribution.origin
            );
            origins.push(contribution.origin);
            parts.push(contribution.entropy);
        }

        let start = Instant::now();
        let mixed = entropy::combine(&parts)?;
        drop(parts);
        log::debug!("Mixed {} source(s)", origins.len());

        let mnemonic = mnemonic::encode(&mixed, wordlist)?;
        let seed = seed::derive(&mnemonic, &config.passphrase);

        Ok(Generated {
            mnemonic,
            seed,
            origins,
            elapsed: start.elapsed(),
        })
    }
}

pub fn recover(
    phrase: &str,
    language: &str,
    passphrase: &str,
    wordlists: &Wordlists,
) -> Result<(Mnemonic, Seed)> {
    let wordlist = wordlists.get(language)?;
    let mnemonic = Mnemonic::parse(phrase, wordlist)?;
    let seed = seed::derive(&mnemonic, passphrase);
    Ok((mnemonic, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::EntropyContribution;
    use crate::source::KeystrokeSource;
    use crate::source::testing::KeepAll;
    use crate::terminal::testing::ScriptedTerminal;
    use crate::wordlist::fake_wordlist;
    use std::io::Write;
    use std::path::PathBuf;

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn device_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn config_for(device: &tempfile::NamedTempFile) -> GeneratorConfig {
        GeneratorConfig {
            devices: DevicePaths {
                hwrng: device.path().to_path_buf(),
                fallback: PathBuf::from("/nonexistent/mnemogen/random"),
            },
            ..GeneratorConfig::default()
        }
    }

    fn builtin() -> Wordlists {
        Wordlists::with_builtin().unwrap()
    }

    #[test]
    fn test_zero_device_yields_reference_vector() {
        let device = device_with(&[0u8; 32]);
        let config = config_for(&device);
        let wordlists = builtin();

        let generated = Generator::new(&config, &wordlists).generate().unwrap();
        assert_eq!(generated.mnemonic.phrase(), ABANDON_ABOUT);
        assert_eq!(
            &*generated.seed.to_hex(),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
        assert_eq!(generated.origins, vec![Origin::Hardware]);
    }

    #[test]
    fn test_passphrase_is_applied() {
        let device = device_with(&[0u8; 16]);
        let config = GeneratorConfig {
            passphrase: Zeroizing::new("TREZOR".to_string()),
            ..config_for(&device)
        };
        let wordlists = builtin();

        let generated = Generator::new(&config, &wordlists).generate().unwrap();
        assert_eq!(
            &*generated.seed.to_hex(),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn test_strength_sets_word_count() {
        let device = device_with(&[0x42; 32]);
        let wordlists = builtin();

        let config = config_for(&device);
        let short = Generator::new(&config, &wordlists).generate().unwrap();
        assert_eq!(short.mnemonic.word_count(), 12);

        let config = GeneratorConfig {
            strength: Strength::Bits256,
            ..config_for(&device)
        };
        let long = Generator::new(&config, &wordlists).generate().unwrap();
        assert_eq!(long.mnemonic.word_count(), 24);
        assert_eq!(long.mnemonic.entropy().unwrap().as_bytes(), &[0x42; 32]);
    }

    #[test]
    fn test_user_secret_is_mixed() {
        let device = device_with(&[0u8; 16]);
        let config = GeneratorConfig {
            user_entropy: Some(Zeroizing::new("abc".to_string())),
            ..config_for(&device)
        };
        let wordlists = builtin();

        let generated = Generator::new(&config, &wordlists).generate().unwrap();
        assert_eq!(generated.origins, vec![Origin::Hardware, Origin::UserSecret]);

        // XOR with zeros leaves the truncated SHA-256("abc").
        let expected = hex::decode("ba7816bf8f01cfea414140de5dae2223").unwrap();
        assert_eq!(generated.mnemonic.entropy().unwrap().as_bytes(), &expected[..]);
    }

    #[test]
    fn test_empty_user_secret_is_ignored() {
        let device = device_with(&[0u8; 16]);
        let config = GeneratorConfig {
            user_entropy: Some(Zeroizing::new(String::new())),
            ..config_for(&device)
        };
        let wordlists = builtin();

        let generated = Generator::new(&config, &wordlists).generate().unwrap();
        assert_eq!(generated.origins, vec![Origin::Hardware]);
        assert_eq!(generated.mnemonic.phrase(), ABANDON_ABOUT);
    }

    #[test]
    fn test_keyboard_source_is_mixed_last() {
        let device = device_with(&[0u8; 16]);
        let config = GeneratorConfig {
            user_entropy: Some(Zeroizing::new("abc".to_string())),
            keyboard_entropy: true,
            ..config_for(&device)
        };
        let wordlists = builtin();
        let mut terminal = ScriptedTerminal::typing("the quick brown fox");

        let generated = Generator::new(&config, &wordlists)
            .with_keyboard(KeystrokeSource::new(&mut terminal, KeepAll))
            .generate()
            .unwrap();

        assert_eq!(
            generated.origins,
            vec![Origin::Hardware, Origin::UserSecret, Origin::Keyboard]
        );
        assert_eq!(generated.mnemonic.word_count(), 12);
        assert_eq!(terminal.reads, 16);
        assert!(!terminal.raw);
    }

    struct SlowKeyboard(Duration);

    impl EntropySource for SlowKeyboard {
        fn origin(&self) -> Origin {
            Origin::Keyboard
        }

        fn acquire(&mut self, strength: Strength) -> Result<EntropyContribution> {
            std::thread::sleep(self.0);
            Ok(EntropyContribution::new(
                Origin::Keyboard,
                Entropy::new(vec![0u8; strength.bytes()])?,
            ))
        }
    }

    #[test]
    fn test_elapsed_excludes_source_acquisition() {
        let device = device_with(&[0u8; 16]);
        let config = GeneratorConfig {
            keyboard_entropy: true,
            ..config_for(&device)
        };
        let wordlists = builtin();
        let typing = Duration::from_secs(2);

        let generated = Generator::new(&config, &wordlists)
            .with_keyboard(SlowKeyboard(typing))
            .generate()
            .unwrap();

        assert_eq!(generated.mnemonic.phrase(), ABANDON_ABOUT);
        assert!(generated.elapsed < typing, "{:?}", generated.elapsed);
    }

    #[test]
    fn test_keyboard_without_terminal_fails() {
        let device = device_with(&[0u8; 16]);
        let config = GeneratorConfig {
            keyboard_entropy: true,
            ..config_for(&device)
        };
        let wordlists = builtin();

        assert!(matches!(
            Generator::new(&config, &wordlists).generate(),
            Err(Error::Terminal(_))
        ));
    }

    #[test]
    fn test_unsupported_language_fails_before_devices() {
        let config = GeneratorConfig {
            language: "klingon".to_string(),
            keyboard_entropy: true,
            devices: DevicePaths {
                hwrng: PathBuf::from("/nonexistent/mnemogen/hwrng"),
                fallback: PathBuf::from("/nonexistent/mnemogen/random"),
            },
            ..GeneratorConfig::default()
        };
        let wordlists = builtin();
        let mut terminal = ScriptedTerminal::typing("abcdefghijklmnop");

        let result = Generator::new(&config, &wordlists)
            .with_keyboard(KeystrokeSource::new(&mut terminal, KeepAll))
            .generate();

        assert!(matches!(result, Err(Error::UnsupportedLanguage(ref tag)) if tag == "klingon"));
        assert_eq!(terminal.entered, 0);
        assert_eq!(terminal.reads, 0);
    }

    #[test]
    fn test_missing_devices_abort() {
        let config = GeneratorConfig {
            devices: DevicePaths {
                hwrng: PathBuf::from("/nonexistent/mnemogen/hwrng"),
                fallback: PathBuf::from("/nonexistent/mnemogen/random"),
            },
            ..GeneratorConfig::default()
        };
        let wordlists = builtin();

        assert!(matches!(
            Generator::new(&config, &wordlists).generate(),
            Err(Error::EntropyUnavailable { .. })
        ));
    }

    #[test]
    fn test_injected_dictionary() {
        let device = device_with(&[0u8; 16]);
        let config = GeneratorConfig {
            language: "fake".to_string(),
            ..config_for(&device)
        };
        let mut wordlists = Wordlists::empty();
        wordlists.register(fake_wordlist("fake"));

        let generated = Generator::new(&config, &wordlists).generate().unwrap();
        assert!(generated.mnemonic.phrase().starts_with("w0000 w0000"));
        assert!(generated.mnemonic.phrase().ends_with("w0003"));
    }

    #[test]
    fn test_recover_round_trips_generated_phrase() {
        let device = device_with(&[0x9a; 32]);
        let config = GeneratorConfig {
            strength: Strength::Bits256,
            language: "french".to_string(),
            passphrase: Zeroizing::new("pass".to_string()),
            ..config_for(&device)
        };
        let wordlists = builtin();
        let generated = Generator::new(&config, &wordlists).generate().unwrap();

        let (mnemonic, seed) =
            recover(generated.mnemonic.phrase(), "french", "pass", &wordlists).unwrap();
        assert_eq!(mnemonic.indices(), generated.mnemonic.indices());
        assert_eq!(seed, generated.seed);
    }

    #[test]
    fn test_recover_rejects_bad_checksum() {
        let wordlists = builtin();
        let phrase = ABANDON_ABOUT.replace("about", "above");
        assert!(matches!(
            recover(&phrase, "english", "", &wordlists),
            Err(Error::ChecksumMismatch)
        ));
    }
}
