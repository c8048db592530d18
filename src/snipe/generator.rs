//! Name generator for sniping

use super::Alphabet;

/// Generator for every name of a fixed length over an alphabet
pub struct NameGenerator {
    alphabet: Alphabet,
    length: usize,
    current_index: u128,
    total: u128,
}

impl NameGenerator {
    /// Create a new generator for names of given length
    pub fn new(length: usize, alphabet: Alphabet) -> Self {
        let total = alphabet.total_combinations(length);
        Self {
            alphabet,
            length,
            current_index: 0,
            total,
        }
    }

    /// Get total number of combinations
    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Get current progress index
    pub fn current_index(&self) -> u128 {
        self.current_index
    }

    /// Set current index (for resume)
    pub fn set_index(&mut self, index: u128) {
        self.current_index = index.min(self.total);
    }

    /// Generate name at specific index
    pub fn name_at(&self, index: u128) -> Option<String> {
        if index >= self.total {
            return None;
        }

        let chars = self.alphabet.chars();
        let base = chars.len() as u128;
        let mut result = vec![' '; self.length];
        let mut n = index;

        for slot in result.iter_mut().rev() {
            *slot = chars[(n % base) as usize];
            n /= base;
        }

        Some(result.into_iter().collect())
    }

    /// Generate next batch of names
    pub fn next_batch(&mut self, count: usize) -> Vec<String> {
        self.by_ref().take(count).collect()
    }

    /// Check if generator is exhausted
    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.total
    }

    /// Remaining count
    pub fn remaining(&self) -> u128 {
        self.total.saturating_sub(self.current_index)
    }
}

impl Iterator for NameGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.name_at(self.current_index)?;
        self.current_index += 1;
        Some(name)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn letters() -> Alphabet {
        Alphabet::from_flags(true, false, false).unwrap()
    }

    #[test]
    fn test_generator_total() {
        let gen = NameGenerator::new(4, letters());
        assert_eq!(gen.total(), 26_u128.pow(4));
    }

    #[test]
    fn test_name_at() {
        let gen = NameGenerator::new(4, letters());
        assert_eq!(gen.name_at(0), Some("aaaa".to_string()));
        assert_eq!(gen.name_at(1), Some("aaab".to_string()));
        assert_eq!(gen.name_at(25), Some("aaaz".to_string()));
        assert_eq!(gen.name_at(26), Some("aaba".to_string()));
        assert_eq!(gen.name_at(26_u128.pow(4)), None);
    }

    #[test]
    fn test_full_alphabet_boundaries() {
        let alphabet = Alphabet::from_flags(true, true, true).unwrap();
        let gen = NameGenerator::new(2, alphabet);
        assert_eq!(gen.name_at(26), Some("a0".to_string()));
        assert_eq!(gen.name_at(36), Some("a_".to_string()));
        assert_eq!(gen.name_at(37), Some("ba".to_string()));
        assert_eq!(gen.name_at(37 * 37 - 1), Some("__".to_string()));
    }

    #[test]
    fn test_long_names_index() {
        let alphabet = Alphabet::from_flags(true, true, true).unwrap();
        let gen = NameGenerator::new(16, alphabet);
        assert_eq!(gen.name_at(gen.total() - 1), Some("_".repeat(16)));
        assert_eq!(gen.name_at(0), Some("a".repeat(16)));
    }

    #[test]
    fn test_generator_iterator() {
        let mut gen = NameGenerator::new(2, letters());
        assert_eq!(gen.next(), Some("aa".to_string()));
        assert_eq!(gen.next(), Some("ab".to_string()));
    }

    #[test]
    fn test_exhausts_without_repeats() {
        let cases = [
            (1, (false, true, false)),
            (2, (true, false, false)),
            (2, (false, true, true)),
            (3, (false, true, true)),
        ];

        for (length, (l, n, u)) in cases {
            let alphabet = Alphabet::from_flags(l, n, u).unwrap();
            let gen = NameGenerator::new(length, alphabet.clone());
            let total = gen.total();
            let names: Vec<String> = gen.collect();

            assert_eq!(names.len() as u128, total);
            assert_eq!(total, crate::snipe::estimate_total(length, l, n, u));

            let unique: HashSet<&String> = names.iter().collect();
            assert_eq!(unique.len(), names.len());
            assert!(names
                .iter()
                .all(|name| name.chars().count() == length && name.chars().all(|c| alphabet.contains(c))));
        }
    }

    #[test]
    fn test_lexicographic_in_alphabet_order() {
        let alphabet = Alphabet::from_flags(true, true, true).unwrap();
        let rank = |c: char| alphabet.chars().iter().position(|&a| a == c).unwrap();
        let names: Vec<Vec<usize>> = NameGenerator::new(2, alphabet.clone())
            .map(|n| n.chars().map(rank).collect())
            .collect();
        assert!(names.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_next_batch() {
        let mut gen = NameGenerator::new(4, letters());
        let batch = gen.next_batch(3);
        assert_eq!(batch, vec!["aaaa", "aaab", "aaac"]);
        assert_eq!(gen.current_index(), 3);
    }

    #[test]
    fn test_final_partial_batch() {
        let digits = Alphabet::from_flags(false, true, false).unwrap();
        let mut gen = NameGenerator::new(1, digits);
        assert_eq!(gen.next_batch(8).len(), 8);
        assert_eq!(gen.next_batch(8), vec!["8", "9"]);
        assert!(gen.is_exhausted());
        assert!(gen.next_batch(8).is_empty());
    }

    #[test]
    fn test_resume() {
        let mut gen = NameGenerator::new(4, letters());
        gen.set_index(100);
        assert_eq!(gen.current_index(), 100);
        assert_eq!(gen.next(), Some("aadw".to_string()));

        gen.set_index(u128::MAX);
        assert!(gen.is_exhausted());
        assert_eq!(gen.remaining(), 0);
    }
}
