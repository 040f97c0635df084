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

mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;
use mnemogen::entropy::Strength;
use mnemogen::pipeline::{self, Generator, GeneratorConfig};
use mnemogen::source::{DEFAULT_HWRNG, DEFAULT_RANDOM, DevicePaths, FairCoin, KeystrokeSource};
use mnemogen::terminal::CrosstermTerminal;
use mnemogen::wordlist::{DEFAULT_LANGUAGE, Wordlists};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(
    name = "mnemogen",
    version,
    author,
    about = "BIP-39 mnemonic and seed generator with mixed hardware, secret and keystroke entropy"
)]
struct Cli {
    #[arg(short, long, value_enum, default_value = "generate")]
    mode: Mode,

    /// Number of entropy bits
    #[arg(short, long, value_enum, default_value = "128")]
    entropy_size: EntropySize,

    /// Wordlist language (english, chinese_simplified, chinese_traditional,
    /// czech, french, italian, japanese, korean, portuguese, spanish, or any
    /// language supplied with --wordlist)
    #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Extra secret text mixed into the hardware entropy
    #[arg(short, long)]
    user_entropy: Option<String>,

    /// Mix in keystrokes and their timing
    #[arg(short, long)]
    keyboard_entropy: bool,

    /// Optional BIP-39 passphrase
    #[arg(short, long, conflicts_with = "ask_passphrase")]
    passphrase: Option<String>,

    /// Read the passphrase from the terminal without echo
    #[arg(short = 'P', long)]
    ask_passphrase: bool,

    /// File with 2048 newline-separated words registered under --language
    #[arg(short, long)]
    wordlist: Option<PathBuf>,

    /// Hardware RNG device
    #[arg(long, default_value = DEFAULT_HWRNG)]
    hwrng: PathBuf,

    /// OS randomness device used when the hardware RNG is unavailable
    #[arg(long, default_value = DEFAULT_RANDOM)]
    random_device: PathBuf,

    /// Print only the mnemonic and the seed, one per line
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
enum Mode {
    Generate,
    Recover,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EntropySize {
    #[value(name = "128")]
    Bits128,
    #[value(name = "256")]
    Bits256,
}

impl From<EntropySize> for Strength {
    fn from(size: EntropySize) -> Self {
        match size {
            EntropySize::Bits128 => Strength::Bits128,
            EntropySize::Bits256 => Strength::Bits256,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut wordlists = Wordlists::with_builtin().context("Failed to load built-in wordlists")?;
    if let Some(path) = &cli.wordlist {
        wordlists
            .load_file(&cli.language, path)
            .with_context(|| format!("Failed to load wordlist {}", path.display()))?;
    }

    let options = ui::DisplayOptions {
        unicode_support: ui::detect_unicode_support(),
        color_support: ui::detect_color_support(),
        quiet: cli.quiet,
    };

    let passphrase = match (&cli.passphrase, cli.ask_passphrase) {
        (_, true) => ui::prompt_passphrase()?,
        (Some(p), false) => Zeroizing::new(p.clone()),
        (None, false) => Zeroizing::new(String::new()),
    };

    match cli.mode {
        Mode::Generate => generate(&cli, &wordlists, passphrase, &options),
        Mode::Recover => recover(&cli, &wordlists, passphrase, &options),
    }
}

fn generate(
    cli: &Cli,
    wordlists: &Wordlists,
    passphrase: Zeroizing<String>,
    options: &ui::DisplayOptions,
) -> Result<()> {
    let strength = Strength::from(cli.entropy_size);

    let config = GeneratorConfig {
        strength,
        language: cli.language.clone(),
        user_entropy: cli.user_entropy.clone().map(Zeroizing::new),
        keyboard_entropy: cli.keyboard_entropy,
        passphrase,
        devices: DevicePaths {
            hwrng: cli.hwrng.clone(),
            fallback: cli.random_device.clone(),
        },
    };
    log::debug!("{:?}", config);

    // Checked up front so the keystroke prompt never appears for a bad tag.
    wordlists.get(&config.language)?;

    let generated = if config.keyboard_entropy {
        ui::announce_keyboard_entropy(strength.bytes())?;

        let mut terminal = CrosstermTerminal;
        let bar = ui::keystroke_progress(strength.bytes());
        let tick = bar.clone();
        let keyboard = KeystrokeSource::new(&mut terminal, FairCoin::new())
            .with_progress(move |done, _| tick.set_position(done as u64));

        let result = Generator::new(&config, wordlists)
            .with_keyboard(keyboard)
            .generate();
        bar.finish_and_clear();

        result.context("Failed to generate mnemonic")?
    } else {
        let (generated, _) = ui::show_progress(options.unicode_support, || {
            Generator::new(&config, wordlists)
                .generate()
                .context("Failed to generate mnemonic")
        })?;
        generated
    };

    let info = ui::OutputInfo {
        strength,
        language: generated.mnemonic.language().to_string(),
        word_count: generated.mnemonic.word_count(),
        origins: generated.origins.clone(),
        passphrase_chars: config.passphrase.chars().count(),
        recovered: false,
    };

    ui::display_output(
        generated.mnemonic.phrase(),
        &generated.seed.to_hex(),
        &info,
        generated.elapsed,
        options,
    );

    Ok(())
}

fn recover(
    cli: &Cli,
    wordlists: &Wordlists,
    passphrase: Zeroizing<String>,
    options: &ui::DisplayOptions,
) -> Result<()> {
    wordlists.get(&cli.language)?;
    let phrase = ui::prompt_mnemonic()?;

    let ((mnemonic, seed), elapsed) = ui::show_progress(options.unicode_support, || {
        pipeline::recover(&phrase, &cli.language, &passphrase, wordlists)
            .context("Failed to recover seed")
    })?;

    let info = ui::OutputInfo {
        strength: mnemonic.strength(),
        language: mnemonic.language().to_string(),
        word_count: mnemonic.word_count(),
        origins: Vec::new(),
        passphrase_chars: passphrase.chars().count(),
        recovered: true,
    };

    ui::display_output(mnemonic.phrase(), &seed.to_hex(), &info, elapsed, options);

    Ok(())
}
