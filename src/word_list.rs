use std::collections::HashSet;
use std::ops::Index;

use smallvec::SmallVec;

use crate::{WordId, MAX_SLOT_LENGTH};

/// A struct representing a word that can be chosen for a given slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,

    /// The word's characters, indexed by cell.
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    pub fn new(string: impl Into<String>) -> Word {
        let string = string.into();
        let chars = string.chars().collect();

        Word { string, chars }
    }

    /// Length in characters, which is what gets compared against slot lengths.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, cell_idx: usize) -> Option<char> {
        self.chars.get(cell_idx).copied()
    }
}

/// The vocabulary a grid is filled from. Words keep the order they were supplied in, minus any
/// duplicates and empty strings, and are addressed by their `WordId` index.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<Word>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut result: Vec<Word> = vec![];

        for word in words {
            let word: String = word.into();
            if word.is_empty() || seen.contains(&word) {
                continue;
            }
            seen.insert(word.clone());
            result.push(Word::new(word));
        }

        WordList { words: result }
    }

    /// Parse a newline-separated word list. Entries are trimmed and upper-cased.
    pub fn from_text(text: &str) -> WordList {
        WordList::new(text.lines().map(|line| line.trim().to_uppercase()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word_id: WordId) -> Option<&Word> {
        self.words.get(word_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, &Word)> + '_ {
        self.words.iter().enumerate()
    }

    /// Look up the id of a word by its exact string.
    pub fn position(&self, string: &str) -> Option<WordId> {
        self.words.iter().position(|word| word.string == string)
    }
}

impl Index<WordId> for WordList {
    type Output = Word;

    fn index(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }
}

#[cfg(test)]
mod tests {
    use super::{Word, WordList};

    #[test]
    fn word_length_counts_chars_not_bytes() {
        let word = Word::new("ÉTÉ");

        assert_eq!(word.len(), 3);
        assert_eq!(word.char_at(0), Some('É'));
        assert_eq!(word.char_at(3), None);
    }

    #[test]
    fn duplicates_and_empty_entries_are_dropped() {
        let words = WordList::new(["cat", "dog", "", "cat", "emu"]);

        assert_eq!(words.len(), 3);
        assert_eq!(words[0].string, "cat");
        assert_eq!(words[1].string, "dog");
        assert_eq!(words[2].string, "emu");
        assert_eq!(words.position("emu"), Some(2));
        assert_eq!(words.position("yak"), None);
    }

    #[test]
    fn from_text_trims_and_uppercases() {
        let words = WordList::from_text("  cat\nDog\n\n  \ncat\r\nbird  \n");

        let strings: Vec<&str> = words.iter().map(|(_, word)| word.string.as_str()).collect();
        assert_eq!(strings, vec!["CAT", "DOG", "BIRD"]);
    }
}
