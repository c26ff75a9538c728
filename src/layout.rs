use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::slot::{Crossing, Slot, SlotKey};
use crate::{Direction, GridCoord, SlotId, MAX_SLOT_LENGTH, MIN_LEN};

/// The slots occupying a single grid cell, each with the index of the cell within that slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellSlots {
    pub right: Option<(SlotId, usize)>,
    pub down: Option<(SlotId, usize)>,
}

impl CellSlots {
    pub fn is_empty(&self) -> bool {
        self.right.is_none() && self.down.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, usize)> {
        self.right.into_iter().chain(self.down)
    }
}

/// A grid of open and blocked cells compiled into slots and the crossings between them.
///
/// The shape is fixed once built. Letters and words change through the mutation methods here,
/// which address slots by cell, or directly on a `Slot` by id.
#[derive(Debug, Clone)]
pub struct Layout {
    cells: Vec<Vec<bool>>,
    pub(crate) slots: Vec<Slot>,
    cell_slots: Vec<Vec<CellSlots>>,
    pub(crate) extras: BTreeSet<String>,

    // Bumped by every mutation made through the layout, so callers can tell when a previous
    // search result is out of date.
    revision: u64,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, line) in self.cells.iter().enumerate() {
            for (col, &open) in line.iter().enumerate() {
                let glyph = if open {
                    self.cell_letter(row, col).unwrap_or('.')
                } else {
                    '#'
                };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Pad ragged rows out with blocked cells, then drop any fully blocked rows and columns around the
/// edges. Returns the normalized grid along with how many rows and columns were cut from the top
/// and left.
fn normalize_cells(mut cells: Vec<Vec<bool>>) -> (Vec<Vec<bool>>, GridCoord) {
    let width = cells.iter().map(|row| row.len()).max().unwrap_or(0);
    for row in cells.iter_mut() {
        row.resize(width, false);
    }

    let open_rows: Vec<usize> =
        (0..cells.len()).filter(|&row| cells[row].contains(&true)).collect();
    let open_cols: Vec<usize> =
        (0..width).filter(|&col| cells.iter().any(|row| row[col])).collect();

    match (open_rows.first(), open_rows.last(), open_cols.first(), open_cols.last()) {
        (Some(&top), Some(&bottom), Some(&left), Some(&right)) => {
            let trimmed = cells[top..=bottom]
                .iter()
                .map(|row| row[left..=right].to_vec())
                .collect();
            (trimmed, (top, left))
        }
        _ => (vec![], (0, 0)),
    }
}

/// Find each run of open cells in a line, as (start index, length).
fn open_runs<I: IntoIterator<Item = bool>>(line: I) -> Vec<(usize, usize)> {
    let mut runs = vec![];
    let mut current: Option<(usize, usize)> = None;

    for (idx, open) in line.into_iter().enumerate() {
        current = match (current, open) {
            (Some((start, len)), true) => Some((start, len + 1)),
            (None, true) => Some((idx, 1)),
            (Some(run), false) => {
                runs.push(run);
                None
            }
            (None, false) => None,
        };
    }
    runs.extend(current);

    runs
}

impl Layout {
    /// Compile a grid where each cell is open if it's anything other than the default value (so
    /// `0`/`false` is blocked and `1`/`true` is open).
    pub fn new<R, T>(rows: &[R]) -> Result<Layout>
    where
        R: AsRef<[T]>,
        T: Copy + Default + PartialEq,
    {
        if rows.is_empty() {
            return Err(Error::EmptyGrid);
        }

        let cells = rows
            .iter()
            .map(|row| row.as_ref().iter().map(|&cell| cell != T::default()).collect())
            .collect();

        Ok(Layout::from_cells(cells).0)
    }

    /// Compile a grid from a string template, with `#` representing blocks, `.` representing empty
    /// cells, and letters representing open cells pinned to themselves.
    ///
    /// A letter has to land in some slot: one on an open cell that no slot covers fails with
    /// `Error::NoSlotAt`.
    pub fn from_template(template: &str) -> Result<Layout> {
        let template: Vec<Vec<char>> = template
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.chars().collect())
                }
            })
            .collect();

        if template.is_empty() {
            return Err(Error::EmptyGrid);
        }

        let mut cells: Vec<Vec<bool>> = Vec::with_capacity(template.len());
        let mut pins: Vec<(char, GridCoord)> = vec![];

        for (row, line) in template.iter().enumerate() {
            let mut row_cells = Vec::with_capacity(line.len());

            for (col, &ch) in line.iter().enumerate() {
                match ch {
                    '#' => row_cells.push(false),
                    '.' => row_cells.push(true),
                    ch if ch.is_alphabetic() => {
                        row_cells.push(true);
                        pins.push((ch, (row, col)));
                    }
                    ch => return Err(Error::UnknownTemplateCell { ch, row, col }),
                }
            }

            cells.push(row_cells);
        }

        let (mut layout, (row_offset, col_offset)) = Layout::from_cells(cells);
        for (letter, (row, col)) in pins {
            layout.set_letter(letter, row - row_offset, col - col_offset)?;
        }

        Ok(layout)
    }

    fn from_cells(cells: Vec<Vec<bool>>) -> (Layout, GridCoord) {
        let (cells, offset) = normalize_cells(cells);
        let height = cells.len();
        let width = cells.first().map_or(0, |row| row.len());

        let mut slots: Vec<Slot> = vec![];
        let mut cell_slots: Vec<Vec<CellSlots>> = vec![vec![CellSlots::default(); width]; height];

        for (row, line) in cells.iter().enumerate() {
            for (start, len) in open_runs(line.iter().copied()) {
                if len < MIN_LEN {
                    continue;
                }

                let slot_id = slots.len();
                slots.push(Slot::new(slot_id, len, (row, start), Direction::Right));
                for cell_idx in 0..len {
                    cell_slots[row][start + cell_idx].right = Some((slot_id, cell_idx));
                }
            }
        }

        for col in 0..width {
            for (start, len) in open_runs((0..height).map(|row| cells[row][col])) {
                if len < MIN_LEN {
                    continue;
                }

                let slot_id = slots.len();
                let mut slot = Slot::new(slot_id, len, (start, col), Direction::Down);

                for cell_idx in 0..len {
                    let cell = &mut cell_slots[start + cell_idx][col];

                    if let Some((right_slot_id, right_cell_idx)) = cell.right {
                        slots[right_slot_id].add_crossing(Crossing {
                            cell: right_cell_idx,
                            other_slot_id: slot_id,
                            other_slot_cell: cell_idx,
                        });
                        slot.add_crossing(Crossing {
                            cell: cell_idx,
                            other_slot_id: right_slot_id,
                            other_slot_cell: right_cell_idx,
                        });
                    }
                    cell.down = Some((slot_id, cell_idx));
                }

                slots.push(slot);
            }
        }

        debug!(
            "compiled {}x{} grid into {} slots ({} crossings)",
            height,
            width,
            slots.len(),
            slots.iter().map(|slot| slot.crossings().len()).sum::<usize>() / 2,
        );

        let layout = Layout {
            cells,
            slots,
            cell_slots,
            extras: BTreeSet::new(),
            revision: 0,
        };

        (layout, offset)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, |row| row.len())
    }

    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.cells.get(row).and_then(|line| line.get(col)).copied().unwrap_or(false)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: SlotId) -> Option<&Slot> {
        self.slots.get(slot_id)
    }

    pub fn slot_mut(&mut self, slot_id: SlotId) -> Option<&mut Slot> {
        self.revision += 1;
        self.slots.get_mut(slot_id)
    }

    pub fn find_slot(&self, key: SlotKey) -> Option<SlotId> {
        self.slots.iter().find(|slot| slot.key() == key).map(|slot| slot.id)
    }

    /// Slot ids grouped by slot length.
    pub fn slots_by_length(&self) -> BTreeMap<usize, Vec<SlotId>> {
        let mut result: BTreeMap<usize, Vec<SlotId>> = BTreeMap::new();
        for slot in &self.slots {
            result.entry(slot.length).or_default().push(slot.id);
        }
        result
    }

    /// The slots covering the given cell.
    pub fn slots_at(&self, row: usize, col: usize) -> Result<CellSlots> {
        self.cell_slots
            .get(row)
            .and_then(|line| line.get(col))
            .copied()
            .ok_or(Error::OutOfBounds { row, col })
    }

    /// The letter showing in a cell, preferring the across slot over the down slot.
    pub fn cell_letter(&self, row: usize, col: usize) -> Option<char> {
        let cell = self.cell_slots.get(row)?.get(col)?;

        cell.right
            .and_then(|(slot_id, idx)| self.slots[slot_id].letter(idx))
            .or_else(|| cell.down.and_then(|(slot_id, idx)| self.slots[slot_id].letter(idx)))
    }

    /// The grid as lines of text, with a space for every cell that has no letter.
    pub fn render_rows(&self) -> Vec<String> {
        (0..self.height())
            .map(|row| {
                (0..self.width())
                    .map(|col| self.cell_letter(row, col).unwrap_or(' '))
                    .collect()
            })
            .collect()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn covering_slots(&self, row: usize, col: usize) -> Result<SmallVec<[(SlotId, usize); 2]>> {
        let cell = self.slots_at(row, col)?;
        if cell.is_empty() {
            return Err(Error::NoSlotAt { row, col });
        }
        Ok(cell.iter().collect())
    }

    /// Pin a letter into every slot covering the given cell. Nothing changes unless every covering
    /// slot accepts the letter.
    pub fn set_letter(&mut self, letter: char, row: usize, col: usize) -> Result<()> {
        let covering = self.covering_slots(row, col)?;

        for &(slot_id, idx) in &covering {
            self.slots[slot_id].check_letter(idx, letter)?;
        }
        for &(slot_id, idx) in &covering {
            self.slots[slot_id].set_letter(idx, letter)?;
        }

        self.revision += 1;
        Ok(())
    }

    /// Remove the letter from the given cell, along with any word in a slot covering it.
    pub fn rem_letter(&mut self, row: usize, col: usize) -> Result<()> {
        for (slot_id, idx) in self.covering_slots(row, col)? {
            self.slots[slot_id].rem_letter(idx)?;
        }

        self.revision += 1;
        Ok(())
    }

    /// Would placing `word` in the slot leave every crossing consistent? Never modifies anything.
    pub fn check_word(&self, slot_id: SlotId, word: &str) -> bool {
        let Some(slot) = self.slots.get(slot_id) else {
            return false;
        };
        let letters: SmallVec<[char; MAX_SLOT_LENGTH]> = word.chars().collect();

        slot.fits(&letters)
            && slot.crossings().iter().all(|crossing| {
                self.slots[crossing.other_slot_id]
                    .letter(crossing.other_slot_cell)
                    .map_or(true, |letter| letter == letters[crossing.cell])
            })
    }

    /// Place a whole word, refusing it if it doesn't agree with the letters already in the grid.
    pub fn set_word(&mut self, slot_id: SlotId, word: &str) -> Result<()> {
        let slot = self.slots.get(slot_id).ok_or(Error::UnknownSlot(slot_id))?;

        let length = word.chars().count();
        if length != slot.length {
            return Err(Error::WordLengthMismatch { expected: slot.length, found: length });
        }
        if slot.has_word() {
            return Err(Error::SlotAlreadyFilled { slot: slot_id });
        }
        if let Some((index, existing, requested)) = self.first_conflict(slot_id, word) {
            return Err(Error::LetterConflict { index, existing, requested });
        }

        self.slots[slot_id].set_word(word)?;
        self.revision += 1;
        Ok(())
    }

    fn first_conflict(&self, slot_id: SlotId, word: &str) -> Option<(usize, char, char)> {
        word.chars().enumerate().find_map(|(index, requested)| {
            let existing = self
                .cell_slots_for(slot_id, index)
                .filter_map(|(other_id, other_idx)| self.slots[other_id].letter(other_idx))
                .find(|&existing| existing != requested)?;
            Some((index, existing, requested))
        })
    }

    fn cell_slots_for(
        &self,
        slot_id: SlotId,
        index: usize,
    ) -> impl Iterator<Item = (SlotId, usize)> {
        let slot = &self.slots[slot_id];
        let (row, col) = match slot.direction {
            Direction::Right => (slot.start_cell.0, slot.start_cell.1 + index),
            Direction::Down => (slot.start_cell.0 + index, slot.start_cell.1),
        };
        self.cell_slots[row][col].iter()
    }

    pub fn rem_word(&mut self, slot_id: SlotId) {
        if let Some(slot) = self.slots.get_mut(slot_id) {
            slot.rem_word();
            self.revision += 1;
        }
    }

    /// Remove every word and letter.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.clear();
        }
        self.revision += 1;
    }

    /// Reserve a word so that no slot may use it. Extras always show up among a solution's bonus
    /// words.
    pub fn set_extra(&mut self, word: &str) {
        if self.extras.insert(word.to_string()) {
            self.revision += 1;
        }
    }

    pub fn rem_extra(&mut self, word: &str) {
        if self.extras.remove(word) {
            self.revision += 1;
        }
    }

    pub fn extras(&self) -> impl Iterator<Item = &str> {
        self.extras.iter().map(|word| word.as_str())
    }
}
