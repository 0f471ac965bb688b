//! The Viterbi trellis, stored as a flat arena of cells.
//!
//! Cell `(t, s)` lives at `t * n_states + s`. Each cell stores the score of
//! the best path ending in state `s` at time `t` and the *index* of the
//! state at `t - 1` that achieved it.

use std::fmt;
use std::marker::PhantomData;

use crate::traits::{Linear, PathScore};

/// One `(time, state)` entry of the trellis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Best path score ending here, in the scoring domain of the trellis.
    pub score: f64,
    /// Predecessor state index at `t - 1`; `None` in column 0.
    pub predecessor: Option<usize>,
}

/// Column-major arena of [`Cell`]s for one decoding run.
#[derive(Clone)]
pub struct Trellis<P: PathScore = Linear> {
    n_states: usize,
    cells: Vec<Cell>,
    _score: PhantomData<P>,
}

impl<P: PathScore> Trellis<P> {
    pub(crate) fn with_capacity(n_states: usize, columns: usize) -> Self {
        Self {
            n_states,
            cells: Vec::with_capacity(n_states * columns),
            _score: PhantomData,
        }
    }

    /// Append a finalized column. Earlier columns are never touched again.
    pub(crate) fn push_column(&mut self, column: impl IntoIterator<Item = Cell>) {
        let before = self.cells.len();
        self.cells.extend(column);
        debug_assert_eq!(self.cells.len() - before, self.n_states);
    }

    /// Number of time steps (columns).
    #[inline]
    pub fn len(&self) -> usize {
        if self.n_states == 0 {
            0
        } else {
            self.cells.len() / self.n_states
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// All cells of column `t`, in state order.
    #[inline]
    pub fn column(&self, t: usize) -> &[Cell] {
        let start = t * self.n_states;
        &self.cells[start..start + self.n_states]
    }

    /// The final column, if any.
    pub fn last_column(&self) -> Option<&[Cell]> {
        self.len().checked_sub(1).map(|t| self.column(t))
    }

    #[inline]
    pub fn cell(&self, t: usize, state: usize) -> &Cell {
        &self.cells[t * self.n_states + state]
    }

    #[inline]
    pub fn score(&self, t: usize, state: usize) -> f64 {
        self.cell(t, state).score
    }

    /// Score at `(t, state)` mapped back to a probability.
    #[inline]
    pub fn probability(&self, t: usize, state: usize) -> f64 {
        P::to_probability(self.score(t, state))
    }

    #[inline]
    pub fn predecessor(&self, t: usize, state: usize) -> Option<usize> {
        self.cell(t, state).predecessor
    }

    /// Follow predecessors from `(t, state)` back to column 0.
    ///
    /// Returns exactly `t + 1` state indices in chronological order.
    pub fn chain(&self, t: usize, state: usize) -> Vec<usize> {
        let mut path = Vec::with_capacity(t + 1);
        let mut s = state;
        path.push(s);
        for step in (1..=t).rev() {
            // column t > 0 always carries a predecessor
            s = self.predecessor(step, s).unwrap_or(s);
            path.push(s);
        }
        path.reverse();
        path
    }
}

impl<P: PathScore> fmt::Debug for Trellis<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trellis")
            .field("scoring", &P::NAME)
            .field("len", &self.len())
            .field("n_states", &self.n_states)
            .finish()
    }
}
