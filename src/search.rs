use std::collections::HashSet;

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{info, trace, warn};
use smallvec::SmallVec;

use crate::candidates::WordPool;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::solution::Solution;
use crate::SlotId;

/// Bounds on a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    /// Stop once this many solutions have been found.
    pub limit: Option<usize>,
    /// Give up on any branch that would need more than this many nested word placements.
    pub max_depth: Option<usize>,
}

impl SolveOptions {
    pub fn with_limit(limit: usize) -> SolveOptions {
        SolveOptions { limit: Some(limit), max_depth: None }
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub states: u64,
    /// Placements undone without the branch under them producing a solution.
    pub backtracks: u64,
    /// Whether `max_depth` cut off any branch, meaning the solutions may not be exhaustive.
    pub truncated: bool,
    pub duration: Duration,
}

/// The result of a successful search: every solution found, up to the limit.
#[derive(Debug, Clone)]
pub struct Fill {
    pub statistics: Statistics,
    pub solutions: Vec<Solution>,
}

/// What to do at a node of the search.
enum NextSlot {
    Fill(SlotId),
    /// Every slot holds a word.
    Complete,
    /// Some open slot has no words left to try.
    DeadEnd,
}

/// State for one `solve` call. Everything here is pushed and popped in matching pairs, so once
/// the outermost `descend` returns the layout is exactly as it was before the search.
struct Search<'a> {
    layout: &'a mut Layout,
    pool: &'a WordPool,
    options: SolveOptions,

    /// Slots that hold a word, either from before the search or placed by it.
    checked: BitSet,
    /// Words that can't be placed again: extras, pre-filled words, and words placed so far.
    used_words: HashSet<String>,
    /// Slots crossing the most recently placed words, tried before anything else.
    frontier: Vec<SlotId>,

    solutions: Vec<Solution>,
    statistics: Statistics,
}

impl<'a> Search<'a> {
    fn limit_reached(&self) -> bool {
        self.options.limit.map_or(false, |limit| self.solutions.len() >= limit)
    }

    fn remaining_count(&self, slot_id: SlotId) -> usize {
        self.pool
            .words(self.layout.slots[slot_id].length)
            .filter(|word| !self.used_words.contains(*word))
            .count()
    }

    /// Of the slots without a word, pick the one with the fewest words left to try.
    fn fewest_remaining(&self) -> NextSlot {
        let mut best: Option<(usize, SlotId)> = None;

        for slot in self.layout.slots.iter().filter(|slot| !self.checked.contains(slot.id)) {
            let remaining = self.remaining_count(slot.id);
            if remaining == 0 {
                return NextSlot::DeadEnd;
            }
            if best.map_or(true, |(fewest, _)| remaining < fewest) {
                best = Some((remaining, slot.id));
            }
        }

        match best {
            Some((_, slot_id)) => NextSlot::Fill(slot_id),
            None => NextSlot::Complete,
        }
    }

    /// Choose the next slot, preferring the frontier. Entries popped off the frontier are
    /// appended to `consumed` so the caller can put them back.
    fn next_slot(&mut self, consumed: &mut SmallVec<[SlotId; 8]>) -> NextSlot {
        while let Some(slot_id) = self.frontier.pop() {
            consumed.push(slot_id);
            if !self.checked.contains(slot_id) {
                return NextSlot::Fill(slot_id);
            }
        }

        self.fewest_remaining()
    }

    fn record_solution(&mut self) {
        let bonus_words = self
            .pool
            .all_words()
            .filter(|word| !self.used_words.contains(*word))
            .map(|word| word.to_string())
            .chain(self.layout.extras.iter().cloned());

        let solution = Solution::capture(self.layout, bonus_words);
        trace!("solution {}:\n{}", self.solutions.len() + 1, solution);
        self.solutions.push(solution);
    }

    fn descend(&mut self, depth: usize) {
        if self.limit_reached() {
            return;
        }
        if let Some(max_depth) = self.options.max_depth {
            if depth > max_depth {
                if !self.statistics.truncated {
                    warn!(
                        "search reached the depth limit of {}; results may be incomplete",
                        max_depth
                    );
                }
                self.statistics.truncated = true;
                return;
            }
        }

        self.statistics.states += 1;

        let mut consumed: SmallVec<[SlotId; 8]> = SmallVec::new();
        match self.next_slot(&mut consumed) {
            NextSlot::Fill(slot_id) => self.try_words(slot_id, depth),
            NextSlot::Complete => self.record_solution(),
            NextSlot::DeadEnd => trace!("dead end at depth {}", depth),
        }

        // Put back whatever we took off the frontier, in the order it was.
        self.frontier.extend(consumed.into_iter().rev());
    }

    fn try_words(&mut self, slot_id: SlotId, depth: usize) {
        let pool = self.pool;
        let length = self.layout.slots[slot_id].length;
        let candidates: Vec<&str> =
            pool.words(length).filter(|word| !self.used_words.contains(*word)).collect();

        trace!("slot {} at depth {}: {} candidates", slot_id, depth, candidates.len());

        for word in candidates {
            if self.limit_reached() {
                break;
            }
            if !self.layout.check_word(slot_id, word) {
                continue;
            }

            // `check_word` already proved the length matches and the slot is open.
            if self.layout.slots[slot_id].set_word(word).is_err() {
                continue;
            }
            self.used_words.insert(word.to_string());
            self.checked.insert(slot_id);

            let frontier_len = self.frontier.len();
            for crossing in self.layout.slots[slot_id].crossings() {
                if !self.checked.contains(crossing.other_slot_id) {
                    self.frontier.push(crossing.other_slot_id);
                }
            }

            let found = self.solutions.len();
            self.descend(depth + 1);

            self.frontier.truncate(frontier_len);
            self.checked.remove(slot_id);
            self.used_words.remove(word);
            self.layout.slots[slot_id].rem_word();
            if self.solutions.len() == found {
                self.statistics.backtracks += 1;
            }
        }
    }
}

impl Layout {
    /// Enumerate the ways of filling every open slot with words from `pool`, so that crossing
    /// slots agree, no word appears twice, and every pinned letter and pre-placed word is kept.
    ///
    /// The layout is left exactly as it was found.
    pub fn solve(&mut self, pool: &WordPool, options: &SolveOptions) -> Result<Fill> {
        let start = Instant::now();

        for (length, slot_ids) in self.slots_by_length() {
            let words = pool.count(length);
            if slot_ids.len() > words {
                return Err(Error::InsufficientCandidates {
                    length,
                    slots: slot_ids.len(),
                    words,
                });
            }
        }

        let mut used_words: HashSet<String> = self.extras.iter().cloned().collect();
        let mut checked = BitSet::with_capacity(self.slots.len());

        for slot in &self.slots {
            if let Some(word) = slot.word() {
                if !used_words.insert(word.clone()) {
                    return Err(Error::DuplicateWord(word));
                }
                checked.insert(slot.id);
            }
        }

        let mut search = Search {
            layout: self,
            pool,
            options: *options,
            checked,
            used_words,
            frontier: vec![],
            solutions: vec![],
            statistics: Statistics {
                states: 0,
                backtracks: 0,
                truncated: false,
                duration: Duration::from_millis(0),
            },
        };

        search.descend(0);

        let Search { mut statistics, solutions, .. } = search;
        statistics.duration = start.elapsed();

        info!(
            "found {} solutions in {:?} ({} states, {} backtracks)",
            solutions.len(),
            statistics.duration,
            statistics.states,
            statistics.backtracks
        );

        Ok(Fill { statistics, solutions })
    }
}

#[cfg(test)]
mod tests {
    use crate::candidates::WordPool;
    use crate::error::Error;
    use crate::layout::Layout;
    use crate::search::SolveOptions;
    use crate::slot::SlotKey;
    use crate::Direction::{Down, Right};

    fn pool(words: &[&str]) -> WordPool {
        words.iter().copied().collect()
    }

    /// ...
    /// .##
    /// .##
    fn corner() -> Layout {
        Layout::new(&[[1, 1, 1], [1, 0, 0], [1, 0, 0]]).unwrap()
    }

    fn snapshot(layout: &Layout) -> Vec<(Vec<Option<char>>, Vec<Option<char>>, bool)> {
        layout
            .slots()
            .iter()
            .map(|slot| {
                let pins = (0..slot.length).map(|idx| slot.pinned(idx)).collect();
                (slot.letters(), pins, slot.has_word())
            })
            .collect()
    }

    #[test]
    fn test_single_slot_single_word() {
        let mut layout = Layout::new(&[[1, 1, 1, 1]]).unwrap();
        let fill = layout.solve(&pool(&["plan"]), &SolveOptions::default()).unwrap();

        assert_eq!(fill.solutions.len(), 1);
        let solution = &fill.solutions[0];
        assert_eq!(solution.rows(), ["plan"]);
        assert_eq!(solution.columns(), ["p", "l", "a", "n"]);
        assert!(solution.bonus_words().is_empty());
    }

    #[test]
    fn test_one_word_per_length_gives_one_solution() {
        let mut layout = Layout::new(&[
            vec![1, 1, 1, 1, 1],
            vec![1, 0, 0, 0, 0],
            vec![1, 0, 0, 0, 0],
            vec![1, 0, 0, 0, 0],
        ])
        .unwrap();
        let fill = layout.solve(&pool(&["plans", "pint"]), &SolveOptions::default()).unwrap();

        assert_eq!(fill.solutions.len(), 1);
        assert_eq!(fill.solutions[0].rows(), ["plans", "i    ", "n    ", "t    "]);
        assert!(!fill.statistics.truncated);
    }

    #[test]
    fn test_not_enough_words_for_slots() {
        let mut layout = Layout::new(&[[1, 1, 1, 1], [0, 0, 0, 0], [1, 1, 1, 1]]).unwrap();

        assert!(matches!(
            layout.solve(&pool(&["plan", "cat"]), &SolveOptions::default()),
            Err(Error::InsufficientCandidates { length: 4, slots: 2, words: 1 })
        ));
    }

    #[test]
    fn test_duplicate_prefilled_words() {
        let mut layout = Layout::new(&[[1, 1, 1, 1], [0, 0, 0, 0], [1, 1, 1, 1]]).unwrap();
        layout.set_word(0, "plan").unwrap();
        layout.set_word(1, "plan").unwrap();

        assert!(matches!(
            layout.solve(&pool(&["plan", "plot"]), &SolveOptions::default()),
            Err(Error::DuplicateWord(word)) if word == "plan"
        ));
    }

    #[test]
    fn test_enumerates_every_fill() {
        let mut layout = corner();
        let words = pool(&["cat", "cod", "cow", "cub"]);

        let fill = layout.solve(&words, &SolveOptions::default()).unwrap();
        assert_eq!(fill.solutions.len(), 12);

        let limited = layout.solve(&words, &SolveOptions::with_limit(5)).unwrap();
        assert_eq!(limited.solutions.len(), 5);
    }

    #[test]
    fn test_pins_constrain_the_fill() {
        let mut layout = corner();
        layout.set_letter('d', 0, 2).unwrap();

        let fill = layout
            .solve(&pool(&["cat", "cod", "cow", "dog"]), &SolveOptions::default())
            .unwrap();
        let right = SlotKey { length: 3, start_cell: (0, 0), direction: Right };
        let down = SlotKey { length: 3, start_cell: (0, 0), direction: Down };

        assert_eq!(fill.solutions.len(), 2);
        for solution in &fill.solutions {
            assert_eq!(solution.word_at(right), Some("cod"));
        }
        assert_eq!(fill.solutions[0].word_at(down), Some("cat"));
        assert_eq!(fill.solutions[0].rows(), ["cod", "a  ", "t  "]);
        assert_eq!(fill.solutions[0].bonus_words(), ["cow", "dog"]);
        assert_eq!(fill.solutions[1].word_at(down), Some("cow"));
    }

    #[test]
    fn test_search_restores_layout() {
        let mut layout = corner();
        layout.set_letter('d', 0, 2).unwrap();
        layout.set_letter('o', 1, 0).unwrap();
        let before = snapshot(&layout);
        let revision = layout.revision();

        let fill = layout
            .solve(&pool(&["cat", "cod", "cow", "dog", "god", "got"]), &SolveOptions::default())
            .unwrap();
        assert_eq!(fill.solutions.len(), 2);
        assert_eq!(snapshot(&layout), before);

        let none = layout.solve(&pool(&["aaa", "bbb"]), &SolveOptions::default()).unwrap();
        assert!(none.solutions.is_empty());
        assert_eq!(snapshot(&layout), before);
        assert_eq!(layout.revision(), revision);
    }

    #[test]
    fn test_pinned_complete_slot_counts_as_used() {
        let mut layout = corner();
        for (col, letter) in "cat".chars().enumerate() {
            layout.set_letter(letter, 0, col).unwrap();
        }

        let fill = layout.solve(&pool(&["cat", "cow"]), &SolveOptions::default()).unwrap();

        assert_eq!(fill.solutions.len(), 1);
        assert_eq!(fill.solutions[0].rows(), ["cat", "o  ", "w  "]);
        assert!(fill.solutions[0].bonus_words().is_empty());
    }

    #[test]
    fn test_extras_are_reserved_and_reported() {
        let mut layout = corner();
        layout.set_extra("cod");

        let fill = layout
            .solve(&pool(&["cat", "cod", "cow"]), &SolveOptions::default())
            .unwrap();

        assert_eq!(fill.solutions.len(), 2);
        for solution in &fill.solutions {
            assert_eq!(solution.bonus_words(), ["cod"]);
            assert!(solution.choices().iter().all(|(_, word)| word != "cod"));
        }

        layout.set_word(0, "cod").unwrap();
        assert!(matches!(
            layout.solve(&pool(&["cat", "cod", "cow"]), &SolveOptions::default()),
            Err(Error::DuplicateWord(_))
        ));
    }

    #[test]
    fn test_depth_limit_truncates() {
        let mut layout = corner();
        let words = pool(&["cat", "cod", "cow", "cub"]);

        let shallow = SolveOptions { limit: None, max_depth: Some(1) };
        let fill = layout.solve(&words, &shallow).unwrap();
        assert!(fill.solutions.is_empty());
        assert!(fill.statistics.truncated);

        let deep = SolveOptions { limit: None, max_depth: Some(2) };
        let fill = layout.solve(&words, &deep).unwrap();
        assert_eq!(fill.solutions.len(), 12);
        assert!(!fill.statistics.truncated);
    }

    #[test]
    fn test_fewest_candidates_filled_first() {
        // Two separate slots; the long one has fewer words.
        let mut layout = Layout::new(&[[1, 1, 1, 0, 1, 1, 1, 1]]).unwrap();
        let words = pool(&["cat", "cow", "dog", "plan", "plot"]);
        let long = SlotKey { length: 4, start_cell: (0, 4), direction: Right };
        let short = SlotKey { length: 3, start_cell: (0, 0), direction: Right };

        let fill = layout.solve(&words, &SolveOptions::default()).unwrap();

        let long_words: Vec<_> = fill.solutions.iter().map(|s| s.word_at(long)).collect();
        assert_eq!(
            long_words,
            [Some("plan"), Some("plan"), Some("plan"), Some("plot"), Some("plot"), Some("plot")]
        );
        assert_eq!(fill.solutions[1].word_at(short), Some("cow"));
        assert_eq!(fill.statistics.backtracks, 0);
    }

    #[test]
    fn test_crossing_slots_filled_before_the_rest() {
        // plan####
        // i#######
        // t####...
        //
        // The down slot crossing "plan" is filled before the detached slot, even though both
        // have the same number of words left.
        let mut layout = Layout::new(&[
            [1, 1, 1, 1, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 0, 0, 0],
            [1, 0, 0, 0, 0, 1, 1, 1],
        ])
        .unwrap();
        let down = SlotKey { length: 3, start_cell: (0, 0), direction: Down };
        let detached = SlotKey { length: 3, start_cell: (2, 5), direction: Right };

        let fill = layout
            .solve(&pool(&["plan", "cab", "pit", "pot"]), &SolveOptions::default())
            .unwrap();

        let down_words: Vec<_> = fill.solutions.iter().map(|s| s.word_at(down)).collect();
        assert_eq!(down_words, [Some("pit"), Some("pit"), Some("pot"), Some("pot")]);
        let detached_words: Vec<_> = fill.solutions.iter().map(|s| s.word_at(detached)).collect();
        assert_eq!(detached_words, [Some("cab"), Some("pot"), Some("cab"), Some("pit")]);
    }

    #[test]
    fn test_exhausted_slot_is_a_dead_end() {
        let mut layout = Layout::new(&[[1, 1, 1, 0, 1, 1, 1]]).unwrap();
        layout.set_extra("cow");

        let fill = layout.solve(&pool(&["cat", "cow"]), &SolveOptions::default()).unwrap();

        // The root places "cat", after which the other slot has nothing left.
        assert!(fill.solutions.is_empty());
        assert_eq!(fill.statistics.states, 2);
        assert_eq!(fill.statistics.backtracks, 1);
    }

    #[test]
    fn test_crossing_conflicts_leave_no_solution() {
        let mut layout = corner();
        let fill = layout.solve(&pool(&["cat", "dog"]), &SolveOptions::default()).unwrap();

        assert!(fill.solutions.is_empty());
        assert!(fill.statistics.backtracks > 0);
    }
}
