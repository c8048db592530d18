//! Name sniping module - enumerate every short name and check availability
//!
//! Candidates are walked in a fixed order (letters, then digits, then
//! underscore), grouped into bulk lookups of ten and classified as they come
//! back.

mod generator;
mod progress;
mod scanner;
mod state;

pub use generator::NameGenerator;
pub use progress::{format_eta, ProgressReport};
pub use scanner::{ActiveScan, NameSniper, ScanController, ScanEvent, ScanSummary};
pub use state::ScanState;

use crate::error::{Result, SniperError};

const LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const UNDERSCORE: char = '_';

/// Character set for name generation, always ordered letters, digits, underscore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from the three selection flags.
    ///
    /// Fails when every flag is off, since no candidate could be generated.
    pub fn from_flags(letters: bool, numbers: bool, underscore: bool) -> Result<Self> {
        let mut chars = Vec::with_capacity(alphabet_size(letters, numbers, underscore));
        if letters {
            chars.extend(LETTERS.chars());
        }
        if numbers {
            chars.extend(DIGITS.chars());
        }
        if underscore {
            chars.push(UNDERSCORE);
        }

        if chars.is_empty() {
            return Err(SniperError::config(
                "You must include at least one of letters, numbers, or underscores",
            ));
        }

        Ok(Self { chars })
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn total_combinations(&self, length: usize) -> u128 {
        saturating_pow(self.chars.len() as u128, length)
    }
}

/// Size of the candidate space for a length and alphabet selection.
///
/// `|alphabet|^length` with `|alphabet| = 26·letters + 10·numbers + underscore`.
/// An empty selection yields 0; the result saturates instead of wrapping.
pub fn estimate_total(length: usize, letters: bool, numbers: bool, underscore: bool) -> u128 {
    let base = alphabet_size(letters, numbers, underscore) as u128;
    if base == 0 {
        return 0;
    }
    saturating_pow(base, length)
}

fn alphabet_size(letters: bool, numbers: bool, underscore: bool) -> usize {
    26 * usize::from(letters) + 10 * usize::from(numbers) + usize::from(underscore)
}

fn saturating_pow(base: u128, exp: usize) -> u128 {
    u32::try_from(exp)
        .map(|e| base.saturating_pow(e))
        .unwrap_or(u128::MAX)
}
