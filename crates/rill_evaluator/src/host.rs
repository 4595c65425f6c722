//! The host side of the built-in functions.

use rand::Rng;
use std::io::{self, BufRead, Write};

/// Implements `print`, `input` and `rand` for the evaluator.
pub trait Host {
    fn print(&mut self, text: &str);

    /// One line of input without its line terminator; empty at end of input.
    fn input(&mut self) -> String;

    /// A uniformly distributed value in `0..max`, or 0 if `max <= 0`.
    fn random(&mut self, max: i32) -> i32;
}

/// Standard input and output, and the thread-local random generator.
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl Host for ConsoleHost {
    fn print(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", text);
    }

    fn input(&mut self) -> String {
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return String::new();
        }
        let trimmed = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(trimmed);
        line
    }

    fn random(&mut self, max: i32) -> i32 {
        if max <= 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..max)
    }
}
