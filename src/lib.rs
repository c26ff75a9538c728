//! Fit words from a candidate pool into the open cells of a blocked grid.
//!
//! A [`Layout`] compiles a grid of open/blocked cells into word slots linked by their crossings,
//! [`generate_candidates`] builds a [`WordPool`] from a [`WordIndex`] (optionally restricted to a
//! multiset of letters), and [`Layout::solve`] enumerates every consistent way of filling the
//! slots from that pool.

pub mod candidates;
pub mod config;
pub mod error;
pub mod layout;
pub mod search;
pub mod slot;
pub mod solution;
pub mod solver;
pub mod words;

pub use candidates::{
    generate_candidates, generate_candidates_with, LengthRange, Strategy, WordPool,
};
pub use error::{Error, Result};
pub use layout::{CellSlots, Layout};
pub use search::{Fill, SolveOptions, Statistics};
pub use slot::{Crossing, Slot, SlotKey, SlotState};
pub use solution::Solution;
pub use solver::Solver;
pub use words::{WordIndex, WordList};

/// The shortest run of open cells that counts as a slot.
pub const MIN_LEN: usize = 3;

/// The expected maximum length for a single slot. Longer slots still work, they just spill the
/// per-slot buffers onto the heap.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the Layout's `slots` field.
pub type SlotId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Right,
    Down,
}
