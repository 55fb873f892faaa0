//! Phone-number canonicalization to the `+60` national form
//!
//! The rewrite is positional: after stripping punctuation and trunk zeros
//! the number must read `+60...`. Each positional step checks the length
//! first and reports a [`CleanError::MalformedPhone`] when the number is too
//! short to rewrite.

use crate::error::CleanError;

/// Characters dropped before any positional edit
const STRIPPED: [char; 4] = ['(', ')', ' ', '-'];

/// Separators between several numbers packed into one value
const SEPARATORS: [char; 3] = [';', '/', ','];

#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneCleaner;

impl PhoneCleaner {
    pub fn clean(&self, raw: &str) -> Result<String, CleanError> {
        let malformed = |reason| CleanError::MalformedPhone {
            raw: raw.to_string(),
            reason,
        };

        let mut number: Vec<char> = raw.chars().filter(|c| !STRIPPED.contains(c)).collect();

        let zeros = number.iter().take_while(|c| **c == '0').count();
        number.drain(..zeros);
        if number.is_empty() {
            return Err(malformed("no digits after trunk zeros"));
        }

        if number[0] != '+' {
            number.insert(0, '+');
        }

        match number.get(1) {
            Some('6') => {}
            Some(_) => number.insert(1, '6'),
            None => return Err(malformed("too short for country code")),
        }

        match number.get(2) {
            Some('0') => {}
            Some(_) => number.insert(2, '0'),
            None => return Err(malformed("too short for country code")),
        }

        match number.get(3) {
            Some('0') => {
                number.remove(3);
            }
            Some(_) => {}
            None => return Err(malformed("no subscriber number")),
        }

        let number: String = number.into_iter().collect();

        // Several numbers in one value: keep the first
        let first = number.split(|c: char| SEPARATORS.contains(&c)).next().unwrap_or_default();
        Ok(first.to_string())
    }
}
