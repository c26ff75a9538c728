use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::ops::RangeInclusive;

use log::debug;

use crate::error::{Error, Result};
use crate::words::WordIndex;
use crate::MIN_LEN;

/// Words that may be placed in a grid, bucketed by length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordPool {
    words: BTreeMap<usize, BTreeSet<String>>,
}

impl WordPool {
    pub fn new() -> WordPool {
        WordPool::default()
    }

    pub fn insert<S: Into<String>>(&mut self, word: S) -> bool {
        let word = word.into();
        self.words.entry(word.chars().count()).or_default().insert(word)
    }

    /// The words of the given length, in sorted order.
    pub fn words(&self, length: usize) -> impl Iterator<Item = &str> {
        self.words.get(&length).into_iter().flatten().map(|word| word.as_str())
    }

    /// How many words of the given length there are.
    pub fn count(&self, length: usize) -> usize {
        self.words.get(&length).map_or(0, |words| words.len())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words
            .get(&word.chars().count())
            .map_or(false, |words| words.contains(word))
    }

    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.keys().copied()
    }

    /// Every word, shortest first.
    pub fn all_words(&self) -> impl Iterator<Item = &str> {
        self.words.values().flatten().map(|word| word.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<String>)> {
        self.words.iter().map(|(&length, words)| (length, words))
    }

    pub fn len(&self) -> usize {
        self.words.values().map(|words| words.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Into<String>> FromIterator<S> for WordPool {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut pool = WordPool::new();
        for word in iter {
            pool.insert(word);
        }
        pool
    }
}

/// Inclusive bounds on the length of generated words. `max = None` means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthRange {
    min: usize,
    max: Option<usize>,
}

impl Default for LengthRange {
    fn default() -> Self {
        LengthRange { min: MIN_LEN, max: None }
    }
}

impl LengthRange {
    /// A `min` below 1 is raised to `MIN_LEN`.
    pub fn new(min: usize, max: Option<usize>) -> Result<LengthRange> {
        let min = if min < 1 { MIN_LEN } else { min };

        match max {
            Some(max) if max < min => Err(Error::InvalidLengthRange { min, max }),
            _ => Ok(LengthRange { min, max }),
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn contains(&self, length: usize) -> bool {
        length >= self.min && self.max.map_or(true, |max| length <= max)
    }

    /// The lengths that `letter_count` letters can actually spell.
    fn spellable(&self, letter_count: usize) -> RangeInclusive<usize> {
        let max = self.max.map_or(letter_count, |max| max.min(letter_count));
        self.min..=max
    }
}

/// How candidate words are found when a letter multiset is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Pick whichever of the other two is estimated to be cheaper.
    #[default]
    Auto,
    /// Try every arrangement of the letters against the index.
    Permutations,
    /// Check every word in the index against the letters.
    DictionaryScan,
}

/// n! / (n - r)!, saturating rather than overflowing.
fn falling_factorial(n: usize, r: usize) -> u128 {
    (0..r).fold(1u128, |acc, i| acc.saturating_mul(n.saturating_sub(i) as u128))
}

/// Estimate whether enumerating permutations or scanning the dictionary does less work.
pub(crate) fn choose_strategy(
    letter_count: usize,
    lengths: RangeInclusive<usize>,
    dictionary_size: usize,
) -> Strategy {
    let permutations = lengths
        .map(|length| falling_factorial(letter_count, length))
        .fold(0u128, |acc, count| acc.saturating_add(count));

    if permutations > dictionary_size as u128 {
        Strategy::DictionaryScan
    } else {
        Strategy::Permutations
    }
}

/// Build the pool of words that can go in a grid: every word from `index` with a length in
/// `lengths` or, if `letters` is given, only the words that can be spelled from that multiset of
/// letters.
pub fn generate_candidates<I: WordIndex + ?Sized>(
    index: &I,
    letters: Option<&str>,
    lengths: LengthRange,
) -> WordPool {
    generate_candidates_with(index, letters, lengths, Strategy::Auto)
}

/// Like `generate_candidates`, but with the search strategy fixed by the caller. Every strategy
/// produces the same pool.
pub fn generate_candidates_with<I: WordIndex + ?Sized>(
    index: &I,
    letters: Option<&str>,
    lengths: LengthRange,
    strategy: Strategy,
) -> WordPool {
    let letters: Vec<char> = match letters.filter(|letters| !letters.is_empty()) {
        Some(letters) => index.normalize(letters).chars().collect(),
        None => {
            let pool: WordPool =
                index.words().filter(|word| lengths.contains(word.chars().count())).collect();
            debug!("took {} of {} words by length alone", pool.len(), index.len());
            return pool;
        }
    };

    let spellable = lengths.spellable(letters.len());
    let strategy = match strategy {
        Strategy::Auto => choose_strategy(letters.len(), spellable.clone(), index.len()),
        strategy => strategy,
    };

    let pool = match strategy {
        Strategy::DictionaryScan => scan_dictionary(index, &letters, spellable),
        _ => enumerate_permutations(index, &letters, spellable),
    };

    debug!(
        "found {} words from {} letters using {:?}",
        pool.len(),
        letters.len(),
        strategy
    );
    pool
}

fn letter_counts(letters: &[char]) -> HashMap<char, usize> {
    let mut counts = HashMap::new();
    for &letter in letters {
        *counts.entry(letter).or_insert(0) += 1;
    }
    counts
}

fn scan_dictionary<I: WordIndex + ?Sized>(
    index: &I,
    letters: &[char],
    lengths: RangeInclusive<usize>,
) -> WordPool {
    let available = letter_counts(letters);

    index
        .words()
        .filter(|word| lengths.contains(&word.chars().count()))
        .filter(|word| {
            let mut needed: HashMap<char, usize> = HashMap::new();
            word.chars().all(|letter| {
                let count = needed.entry(letter).or_insert(0);
                *count += 1;
                *count <= available.get(&letter).copied().unwrap_or(0)
            })
        })
        .collect()
}

fn enumerate_permutations<I: WordIndex + ?Sized>(
    index: &I,
    letters: &[char],
    lengths: RangeInclusive<usize>,
) -> WordPool {
    let mut pool = WordPool::new();
    let mut used = vec![false; letters.len()];
    let mut current = String::with_capacity(letters.len());

    for length in lengths {
        permute(index, letters, length, &mut used, &mut current, &mut pool);
    }

    pool
}

fn permute<I: WordIndex + ?Sized>(
    index: &I,
    letters: &[char],
    length: usize,
    used: &mut [bool],
    current: &mut String,
    pool: &mut WordPool,
) {
    if current.chars().count() == length {
        if index.contains(current) {
            pool.insert(current.clone());
        }
        return;
    }

    // Repeated letters would only produce the same strings again.
    let mut tried: HashSet<char> = HashSet::new();

    for position in 0..letters.len() {
        if used[position] || !tried.insert(letters[position]) {
            continue;
        }

        used[position] = true;
        current.push(letters[position]);
        permute(index, letters, length, used, current, pool);
        current.pop();
        used[position] = false;
    }
}
