use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};

/// Read-only access to a word corpus.
pub trait WordIndex {
    /// Is `word` in the corpus? Implementations apply their own case policy.
    fn contains(&self, word: &str) -> bool;

    /// Every word in the corpus, in the form `normalize` produces.
    fn words(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    fn len(&self) -> usize {
        self.words().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Put a string into the form the corpus stores words in.
    fn normalize(&self, word: &str) -> String {
        word.to_string()
    }
}

/// An in-memory word list, case-insensitive unless asked otherwise.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
    case_sensitive: bool,
}

impl WordList {
    pub fn new(case_sensitive: bool) -> WordList {
        WordList { words: HashSet::new(), case_sensitive }
    }

    pub fn from_words<I, S>(words: I, case_sensitive: bool) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = WordList::new(case_sensitive);
        for word in words {
            list.insert(word.as_ref());
        }
        list
    }

    /// Parse whitespace-separated words, any number per line.
    pub fn parse(contents: &str, case_sensitive: bool) -> WordList {
        WordList::from_words(contents.split_whitespace(), case_sensitive)
    }

    pub fn load<P: AsRef<Path>>(path: P, case_sensitive: bool) -> Result<WordList> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::ReadWordList {
            path: path.to_path_buf(),
            source,
        })?;

        let list = WordList::parse(&contents, case_sensitive);
        debug!("loaded {} words from {}", list.words.len(), path.display());
        Ok(list)
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn insert(&mut self, word: &str) -> bool {
        let word = self.normalize(word);
        self.words.insert(word)
    }

    pub fn remove(&mut self, word: &str) -> bool {
        let word = self.normalize(word);
        self.words.remove(&word)
    }

    /// Does any word start with `prefix`?
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        let prefix = self.normalize(prefix);
        self.words.iter().any(|word| word.starts_with(&prefix))
    }
}

impl WordIndex for WordList {
    fn contains(&self, word: &str) -> bool {
        if self.case_sensitive {
            self.words.contains(word)
        } else {
            self.words.contains(&word.to_lowercase())
        }
    }

    fn words(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.words.iter().map(|word| word.as_str()))
    }

    fn len(&self) -> usize {
        self.words.len()
    }

    fn normalize(&self, word: &str) -> String {
        if self.case_sensitive {
            word.to_string()
        } else {
            word.to_lowercase()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::error::Error;
    use crate::words::{WordIndex, WordList};

    #[test]
    fn test_case_insensitive_by_default() {
        let list = WordList::from_words(["Plan", "plan", "CAT"], false);

        assert_eq!(list.len(), 2);
        assert!(list.contains("PLAN"));
        assert!(list.contains("cat"));
        assert!(list.contains_prefix("Ca"));
        assert!(!list.contains_prefix("dog"));
    }

    #[test]
    fn test_case_sensitive() {
        let mut list = WordList::from_words(["Plan", "plan"], true);

        assert_eq!(list.len(), 2);
        assert!(!list.contains("PLAN"));
        assert!(list.remove("Plan"));
        assert!(!list.contains("Plan"));
        assert!(list.contains("plan"));
    }

    #[test]
    fn test_load_word_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "plan  cat\nDog\n\n  emu").unwrap();

        let list = WordList::load(file.path(), false).unwrap();
        let mut words: Vec<&str> = list.words().collect();
        words.sort();

        assert_eq!(words, vec!["cat", "dog", "emu", "plan"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        match WordList::load(&path, false) {
            Err(Error::ReadWordList { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected a read error, got {:?}", other),
        }
    }
}
