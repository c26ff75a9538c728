use std::fmt;

use crate::layout::Layout;
use crate::slot::SlotKey;

/// A snapshot of one complete fill of a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    rows: Vec<String>,
    columns: Vec<String>,
    choices: Vec<(SlotKey, String)>,
    bonus_words: Vec<String>,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        if !self.bonus_words.is_empty() {
            writeln!(f, "Bonus words: {}", self.bonus_words.join(", "))?;
        }
        Ok(())
    }
}

/// Sort shortest first, then alphabetically.
fn sort_bonus_words(words: &mut [String]) {
    words.sort_by(|a, b| {
        a.chars()
            .count()
            .cmp(&b.chars().count())
            .then_with(|| a.cmp(b))
    });
}

impl Solution {
    /// Record the letters currently in `layout`, along with the words left over.
    pub(crate) fn capture<I>(layout: &Layout, bonus_words: I) -> Solution
    where
        I: IntoIterator<Item = String>,
    {
        let rows = layout.render_rows();

        let columns = (0..layout.width())
            .map(|col| {
                rows.iter()
                    .map(|row| row.chars().nth(col).unwrap_or(' '))
                    .collect()
            })
            .collect();

        let choices = layout
            .slots()
            .iter()
            .filter_map(|slot| slot.word().map(|word| (slot.key(), word)))
            .collect();

        let mut bonus_words: Vec<String> = bonus_words.into_iter().collect();
        sort_bonus_words(&mut bonus_words);
        bonus_words.dedup();

        Solution { rows, columns, choices, bonus_words }
    }

    /// The filled grid, one string per row, with spaces for cells that hold no letter.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// The filled grid read top to bottom, one string per column.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The word placed in each slot.
    pub fn choices(&self) -> &[(SlotKey, String)] {
        &self.choices
    }

    pub fn word_at(&self, key: SlotKey) -> Option<&str> {
        self.choices
            .iter()
            .find(|(slot_key, _)| *slot_key == key)
            .map(|(_, word)| word.as_str())
    }

    /// Candidate words this fill didn't use.
    pub fn bonus_words(&self) -> &[String] {
        &self.bonus_words
    }
}
