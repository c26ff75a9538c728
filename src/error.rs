use std::{io, path::PathBuf};
use thiserror::Error;

use crate::SlotId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not enough {length} letter words ({words}) to fill {slots} slots")]
    InsufficientCandidates {
        length: usize,
        slots: usize,
        words: usize,
    },

    #[error("duplicate word \"{0}\" detected")]
    DuplicateWord(String),

    #[error("word has length {found}, slot has length {expected}")]
    WordLengthMismatch { expected: usize, found: usize },

    #[error("no slot with id {0}")]
    UnknownSlot(SlotId),

    #[error("index {index} is outside a slot of length {length}")]
    IndexOutOfRange { index: usize, length: usize },

    #[error("slot {slot} already holds a word")]
    SlotAlreadyFilled { slot: SlotId },

    #[error("index {index} already holds '{existing}', cannot set '{requested}'")]
    LetterConflict {
        index: usize,
        existing: char,
        requested: char,
    },

    #[error("no slot at row {row}, column {col}")]
    NoSlotAt { row: usize, col: usize },

    #[error("row {row}, column {col} is outside the grid")]
    OutOfBounds { row: usize, col: usize },

    #[error("maximum length {max} is less than minimum length {min}")]
    InvalidLengthRange { min: usize, max: usize },

    #[error("grid has no rows")]
    EmptyGrid,

    #[error("unexpected template character '{ch}' at row {row}, column {col}")]
    UnknownTemplateCell { ch: char, row: usize, col: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to read word list {path}")]
    ReadWordList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
