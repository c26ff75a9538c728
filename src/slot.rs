use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::{Direction, GridCoord, SlotId, MAX_SLOT_LENGTH};

/// The identity of a slot: two slots are the same slot if they have the same length, start cell
/// and direction, even when they belong to different layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub length: usize,
    pub start_cell: GridCoord,
    pub direction: Direction,
}

/// A struct representing a crossing between one slot and another, referencing the cell within this
/// slot, the other slot's id, and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub cell: usize,
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// Where a slot is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Partial,
    Complete,
}

/// A struct tracking a single run of open cells and whatever letters currently sit in it.
///
/// Letters reach a slot in two ways: pinned one at a time with `set_letter`, or as a whole word
/// with `set_word`. A placed word sits on top of the pins, so removing it brings back exactly the
/// letters that were pinned before.
#[derive(Clone)]
pub struct Slot {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    pinned: SmallVec<[Option<char>; MAX_SLOT_LENGTH]>,
    word: Option<SmallVec<[char; MAX_SLOT_LENGTH]>>,

    /// Number of cells without a pinned letter.
    empty: usize,
    has_word: bool,
    crossings: SmallVec<[Crossing; MAX_SLOT_LENGTH]>,
}

impl Debug for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let letters: String = self.letters().iter().map(|l| l.unwrap_or('.')).collect();

        f.debug_struct("Slot")
            .field("id", &self.id)
            .field("start_cell", &self.start_cell)
            .field("direction", &self.direction)
            .field("length", &self.length)
            .field("letters", &letters)
            .field("has_word", &self.has_word)
            .field("crossings", &self.crossings)
            .finish()
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Slot {}

impl Hash for Slot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Slot {
    pub fn new(id: SlotId, length: usize, start_cell: GridCoord, direction: Direction) -> Slot {
        Slot {
            id,
            start_cell,
            direction,
            length,
            pinned: (0..length).map(|_| None).collect(),
            word: None,
            empty: length,
            has_word: false,
            crossings: SmallVec::new(),
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey {
            length: self.length,
            start_cell: self.start_cell,
            direction: self.direction,
        }
    }

    /// The grid coords of each cell of this slot, in order.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        let (row, col) = self.start_cell;
        (0..self.length).map(move |cell_idx| match self.direction {
            Direction::Right => (row, col + cell_idx),
            Direction::Down => (row + cell_idx, col),
        })
    }

    /// The letter currently showing at `index`, whether it came from a placed word or a pin.
    pub fn letter(&self, index: usize) -> Option<char> {
        match &self.word {
            Some(word) => word.get(index).copied(),
            None => self.pinned.get(index).copied().flatten(),
        }
    }

    pub fn letters(&self) -> Vec<Option<char>> {
        (0..self.length).map(|index| self.letter(index)).collect()
    }

    /// The letter pinned at `index`, ignoring any placed word.
    pub fn pinned(&self, index: usize) -> Option<char> {
        self.pinned.get(index).copied().flatten()
    }

    pub fn has_word(&self) -> bool {
        self.has_word
    }

    pub fn state(&self) -> SlotState {
        if self.has_word {
            SlotState::Complete
        } else if self.empty == self.length {
            SlotState::Empty
        } else {
            SlotState::Partial
        }
    }

    /// The complete word in this slot, if every cell has a letter.
    pub fn word(&self) -> Option<String> {
        if !self.has_word {
            return None;
        }

        self.letters().into_iter().collect()
    }

    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    pub fn crossing_with(&self, other_slot_id: SlotId) -> Option<&Crossing> {
        self.crossings.iter().find(|crossing| crossing.other_slot_id == other_slot_id)
    }

    pub(crate) fn add_crossing(&mut self, crossing: Crossing) {
        self.crossings.push(crossing);
    }

    /// Check the parts of `check_word` that only depend on this slot: the length matches, the slot
    /// isn't already complete, and no pinned letter disagrees with the word.
    pub fn fits(&self, word: &[char]) -> bool {
        if word.len() != self.length || self.has_word {
            return false;
        }

        self.pinned
            .iter()
            .zip(word)
            .all(|(pinned, &letter)| pinned.map_or(true, |pinned| pinned == letter))
    }

    /// Store a whole word in this slot without looking at its crossings. Use
    /// `Layout::check_word` first to make sure the word agrees with its neighbors.
    pub fn set_word(&mut self, word: &str) -> Result<()> {
        let letters: SmallVec<[char; MAX_SLOT_LENGTH]> = word.chars().collect();

        if letters.len() != self.length {
            return Err(Error::WordLengthMismatch {
                expected: self.length,
                found: letters.len(),
            });
        }
        if self.has_word {
            return Err(Error::SlotAlreadyFilled { slot: self.id });
        }

        self.word = Some(letters);
        self.has_word = true;
        Ok(())
    }

    /// Remove the placed word, falling back to whatever letters were pinned.
    pub fn rem_word(&mut self) {
        self.word = None;
        self.has_word = self.empty == 0;
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.length {
            return Err(Error::IndexOutOfRange { index, length: self.length });
        }
        Ok(())
    }

    /// Fail if pinning `letter` at `index` would contradict a letter already showing there.
    pub fn check_letter(&self, index: usize, letter: char) -> Result<()> {
        self.check_index(index)?;
        match self.letter(index) {
            Some(existing) if existing != letter => Err(Error::LetterConflict {
                index,
                existing,
                requested: letter,
            }),
            _ => Ok(()),
        }
    }

    /// Pin `letter` at `index`. Nothing changes if that letter is already showing there, even when
    /// it only shows because of a placed word.
    pub fn set_letter(&mut self, index: usize, letter: char) -> Result<()> {
        self.check_letter(index, letter)?;

        if self.letter(index).is_some() {
            return Ok(());
        }

        self.pinned[index] = Some(letter);
        self.empty -= 1;
        if self.empty == 0 {
            self.has_word = true;
        }
        Ok(())
    }

    /// Clear the pin at `index`. A placed word can't survive losing one of its cells, so it goes
    /// too.
    pub fn rem_letter(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;

        if self.pinned[index].take().is_some() {
            self.empty += 1;
        }
        self.word = None;
        self.has_word = false;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pinned.iter_mut().for_each(|pinned| *pinned = None);
        self.word = None;
        self.empty = self.length;
        self.has_word = false;
    }
}
