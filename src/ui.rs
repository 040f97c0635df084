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

use anyhow::{Context, Result};
use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use mnemogen::entropy::{Origin, Strength};
use mnemogen::seed::PBKDF2_ROUNDS;
use rpassword::read_password;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use zeroize::Zeroizing;

pub const MIN_PASSPHRASE_CHARS: usize = 8;

pub struct OutputInfo {
    pub strength: Strength,
    pub language: String,
    pub word_count: usize,
    pub origins: Vec<Origin>,
    pub passphrase_chars: usize,
    pub recovered: bool,
}

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

fn tree_glyphs(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("├─", "└─")
    } else {
        ("|-", "`-")
    }
}

fn plural(n: usize, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 { one } else { many }
}

fn status_style(ok: bool, options: &DisplayOptions) -> Style {
    match (options.color_support, ok) {
        (false, _) => Style::new(),
        (true, true) => Style::new().green(),
        (true, false) => Style::new().yellow(),
    }
}

pub fn prompt_passphrase() -> Result<Zeroizing<String>> {
    eprint!("Passphrase: ");
    io::stderr().flush()?;
    let first = Zeroizing::new(read_password().context("Failed to read passphrase")?);

    eprint!("Repeat passphrase: ");
    io::stderr().flush()?;
    let second = Zeroizing::new(read_password().context("Failed to read passphrase")?);

    if *first != *second {
        anyhow::bail!("Passphrases do not match");
    }

    Ok(first)
}

pub fn prompt_mnemonic() -> Result<Zeroizing<String>> {
    eprint!("Mnemonic: ");
    io::stderr().flush()?;

    let phrase = Zeroizing::new(read_password().context("Failed to read mnemonic")?);
    if phrase.trim().is_empty() {
        anyhow::bail!("Mnemonic cannot be empty");
    }

    Ok(phrase)
}

pub fn announce_keyboard_entropy(count: usize) -> Result<()> {
    let term = Term::stderr();
    term.write_line(&format!(
        "Type random keys ({} will be kept, about half of all keystrokes are discarded)",
        count
    ))?;
    Ok(())
}

pub fn keystroke_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:32} {pos}/{len} keys")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

pub fn show_progress<F, T>(unicode_support: bool, f: F) -> Result<(T, Duration)>
where
    F: FnOnce() -> Result<T>,
{
    let term = Term::stderr();
    term.hide_cursor().ok();

    let pb = ProgressBar::new_spinner();

    if unicode_support {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠋"]),
        );
    } else {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("-\\|/-"),
        );
    }

    pb.set_message("Deriving seed...");
    pb.enable_steady_tick(Duration::from_millis(80));

    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    pb.finish_and_clear();
    term.show_cursor().ok();

    result.map(|r| (r, elapsed))
}

pub fn display_output(
    mnemonic: &str,
    seed_hex: &str,
    info: &OutputInfo,
    elapsed: Duration,
    options: &DisplayOptions,
) {
    if options.quiet {
        println!("{}", mnemonic);
        println!("{}", seed_hex);
        return;
    }

    println!("Out[0]:\n{}\n", mnemonic);
    println!("Out[1]:\n{}\n", seed_hex);

    display_settings(info, options);
    display_stats(info, elapsed, options);
}

fn display_settings(info: &OutputInfo, options: &DisplayOptions) {
    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let (branch, last) = tree_glyphs(options.unicode_support);

    println!("Settings:");

    if !info.recovered {
        let sources_ok = info.origins.first() == Some(&Origin::Hardware);
        let sources_style = status_style(sources_ok, options);
        let names: Vec<String> = info.origins.iter().map(Origin::to_string).collect();

        println!(
            "  {} Sources    {} {}",
            branch,
            sources_style.apply_to(format!(
                "[{}]",
                if sources_ok { check_ok } else { check_warn }
            )),
            sources_style.apply_to(names.join(" ^ "))
        );
        println!("  {} Mixing     XOR", branch);
    }

    println!("  {} Language   {}", branch, info.language);

    let passphrase_ok = info.passphrase_chars == 0 || info.passphrase_chars >= MIN_PASSPHRASE_CHARS;
    let passphrase_style = status_style(passphrase_ok, options);
    if info.passphrase_chars == 0 {
        println!("  {} Passphrase none", branch);
    } else {
        println!(
            "  {} Passphrase {} {} {}",
            branch,
            passphrase_style.apply_to(format!(
                "[{}]",
                if passphrase_ok { check_ok } else { check_warn }
            )),
            passphrase_style.apply_to(info.passphrase_chars),
            plural(info.passphrase_chars, "char", "chars")
        );
    }

    println!(
        "  {} KDF        PBKDF2-HMAC-SHA512 ({} rounds)",
        last, PBKDF2_ROUNDS
    );

    println!();
}

fn display_stats(info: &OutputInfo, elapsed: Duration, options: &DisplayOptions) {
    let (check_ok, _) = get_status_symbols(options.unicode_support);
    let (branch, last) = tree_glyphs(options.unicode_support);

    let (status_text, entropy_style) = match info.strength {
        Strength::Bits256 => ("Paranoid", status_style(true, options)),
        Strength::Bits128 => ("Strong", status_style(true, options)),
    };

    println!("Stats:");
    println!(
        "  {} Entropy    {} {} bits ({})",
        branch,
        entropy_style.apply_to(format!("[{}]", check_ok)),
        entropy_style.apply_to(info.strength.bits()),
        entropy_style.apply_to(status_text)
    );
    println!(
        "  {} Checksum   {} bits",
        branch,
        info.strength.checksum_bits()
    );
    println!(
        "  {} Words      {} {}",
        branch,
        info.word_count,
        plural(info.word_count, "word", "words")
    );
    println!("  {} Time       {:.1}s", last, elapsed.as_secs_f64());

    println!(
        "\n{} Security: {}",
        entropy_style.apply_to(format!("[{}]", check_ok)),
        entropy_style.apply_to(status_text)
    );
}
