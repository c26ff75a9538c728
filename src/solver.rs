use log::debug;

use crate::candidates::{generate_candidates, LengthRange, WordPool};
use crate::error::Result;
use crate::layout::Layout;
use crate::search::{SolveOptions, Statistics};
use crate::solution::Solution;
use crate::words::WordIndex;

/// Ties a word index, an optional set of letters and an optional layout together: the index and
/// letters produce the word pool, and the pool fills the layout.
///
/// Nothing is re-solved behind the caller's back. After changing the layout, the letters or the
/// index, check `is_stale` and call `solve` again.
pub struct Solver<I: WordIndex> {
    index: I,
    letters: Option<String>,
    lengths: LengthRange,
    layout: Option<Layout>,

    pool: WordPool,
    /// Bumped every time the pool is rebuilt.
    pool_generation: u64,

    solutions: Vec<Solution>,
    statistics: Option<Statistics>,
    /// The (layout revision, pool generation) the current solutions were found with.
    solved_at: Option<(u64, u64)>,
}

impl<I: WordIndex> Solver<I> {
    pub fn new(
        index: I,
        letters: Option<&str>,
        layout: Option<Layout>,
        lengths: LengthRange,
    ) -> Solver<I> {
        let mut solver = Solver {
            index,
            letters: letters.map(str::to_string),
            lengths,
            layout,
            pool: WordPool::new(),
            pool_generation: 0,
            solutions: vec![],
            statistics: None,
            solved_at: None,
        };
        solver.refresh();
        solver
    }

    /// Rebuild the word pool from the index, letters and length bounds.
    pub fn refresh(&mut self) {
        self.pool = generate_candidates(&self.index, self.letters.as_deref(), self.lengths);
        self.pool_generation += 1;
        debug!("word pool rebuilt with {} words", self.pool.len());
    }

    /// Fill the layout from the current pool, keeping the solutions for later. Without a layout
    /// there's nothing to fill and no solutions.
    pub fn solve(&mut self, options: &SolveOptions) -> Result<&[Solution]> {
        let Some(layout) = self.layout.as_mut() else {
            debug!("no layout to solve");
            self.solutions.clear();
            self.statistics = None;
            return Ok(&self.solutions);
        };

        let fill = layout.solve(&self.pool, options)?;
        self.solved_at = Some((layout.revision(), self.pool_generation));
        self.solutions = fill.solutions;
        self.statistics = Some(fill.statistics);

        Ok(&self.solutions)
    }

    /// Have the layout or the pool changed since the last `solve`?
    pub fn is_stale(&self) -> bool {
        match (&self.layout, self.solved_at) {
            (Some(layout), Some((revision, generation))) => {
                layout.revision() != revision || self.pool_generation != generation
            }
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn letters(&self) -> Option<&str> {
        self.letters.as_deref()
    }

    pub fn set_letters(&mut self, letters: Option<&str>) {
        let letters = letters.map(str::to_string);
        if letters != self.letters {
            self.letters = letters;
            self.refresh();
        }
    }

    pub fn lengths(&self) -> LengthRange {
        self.lengths
    }

    pub fn set_min_len(&mut self, min: usize) -> Result<()> {
        let lengths = LengthRange::new(min, self.lengths.max())?;
        self.set_lengths(lengths);
        Ok(())
    }

    pub fn set_max_len(&mut self, max: Option<usize>) -> Result<()> {
        let lengths = LengthRange::new(self.lengths.min(), max)?;
        self.set_lengths(lengths);
        Ok(())
    }

    fn set_lengths(&mut self, lengths: LengthRange) {
        if lengths != self.lengths {
            self.lengths = lengths;
            self.refresh();
        }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Change the word index, then rebuild the pool from it.
    pub fn update_index<F: FnOnce(&mut I)>(&mut self, update: F) {
        update(&mut self.index);
        self.refresh();
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn layout_mut(&mut self) -> Option<&mut Layout> {
        self.layout.as_mut()
    }

    pub fn set_layout(&mut self, layout: Option<Layout>) {
        self.layout = layout;
        self.solutions.clear();
        self.statistics = None;
        self.solved_at = None;
    }

    pub fn pool(&self) -> &WordPool {
        &self.pool
    }

    /// The pool's words grouped by length, each group sorted.
    pub fn words_by_length(&self) -> Vec<(usize, Vec<&str>)> {
        self.pool
            .iter()
            .map(|(length, words)| (length, words.iter().map(|word| word.as_str()).collect()))
            .collect()
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }
}
