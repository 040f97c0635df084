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

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    // Ctrl-C or Ctrl-D; raw mode delivers the signal as a key.
    Interrupt,
}

pub trait Terminal {
    fn enter_raw_no_echo_mode(&mut self) -> io::Result<()>;
    fn restore_mode(&mut self) -> io::Result<()>;
    fn read_one_char(&mut self) -> io::Result<Key>;
}

// Restores the terminal mode on drop, including during unwinding.
pub struct RawModeGuard<'a, T: Terminal + ?Sized> {
    terminal: &'a mut T,
}

impl<'a, T: Terminal + ?Sized> RawModeGuard<'a, T> {
    pub fn acquire(terminal: &'a mut T) -> io::Result<Self> {
        terminal.enter_raw_no_echo_mode()?;
        Ok(Self { terminal })
    }

    pub fn read_one_char(&mut self) -> io::Result<Key> {
        self.terminal.read_one_char()
    }
}

impl<T: Terminal + ?Sized> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.terminal.restore_mode() {
            log::error!("Failed to restore terminal mode: {}", e);
        }
    }
}

#[derive(Debug, Default)]
pub struct CrosstermTerminal;

impl Terminal for CrosstermTerminal {
    fn enter_raw_no_echo_mode(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()
    }

    fn read_one_char(&mut self) -> io::Result<Key> {
        loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            else {
                continue;
            };

            let key = match code {
                KeyCode::Char('c' | 'd') if modifiers.contains(KeyModifiers::CONTROL) => {
                    Key::Interrupt
                }
                KeyCode::Char(c) => Key::Char(c),
                KeyCode::Enter => Key::Char('\r'),
                KeyCode::Tab => Key::Char('\t'),
                KeyCode::Backspace => Key::Char('\u{7f}'),
                KeyCode::Esc => Key::Char('\u{1b}'),
                _ => continue,
            };
            return Ok(key);
        }
    }
}
