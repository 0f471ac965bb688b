//! Human-readable dump of a trellis.
//!
//! [`TableLines`] yields a header of right-justified time indices followed
//! by one line per state listing its probability at every step. It only
//! reads the trellis; callers decide whether to print, log or drop it.

use std::fmt::Display;
use std::iter::FusedIterator;

use crate::traits::PathScore;
use crate::trellis::Trellis;

/// Column widths and precision for [`TableLines`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableFormat {
    /// Width each time index is right-justified to in the header.
    pub index_width: usize,
    /// State labels are cut to this many characters.
    pub label_width: usize,
    /// Each formatted probability is cut to this many characters.
    pub cell_width: usize,
    /// Decimal places printed before cutting.
    pub decimals: usize,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            index_width: 8,
            label_width: 7,
            cell_width: 12,
            decimals: 6,
        }
    }
}

/// Lazy, single-pass iterator over the lines of a trellis table.
pub struct TableLines<'a, S, P: PathScore> {
    trellis: &'a Trellis<P>,
    labels: &'a [S],
    format: TableFormat,
    next_line: usize,
}

impl<'a, S: Display, P: PathScore> TableLines<'a, S, P> {
    /// `labels` list the trellis states in index order. Only states that have
    /// both a label and a trellis row are printed.
    pub fn new(trellis: &'a Trellis<P>, labels: &'a [S], format: TableFormat) -> Self {
        Self {
            trellis,
            labels,
            format,
            next_line: 0,
        }
    }

    fn header(&self) -> String {
        let width = self.format.index_width;
        (0..self.trellis.len())
            .map(|t| format!("{t:>width$}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn row(&self, state: usize) -> String {
        let label = self.labels[state].to_string();
        let cells = (0..self.trellis.len())
            .map(|t| {
                let text = format!(
                    "{:.*}",
                    self.format.decimals,
                    self.trellis.probability(t, state)
                );
                truncate(&text, self.format.cell_width).to_owned()
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}: {}", truncate(&label, self.format.label_width), cells)
    }

    fn total_lines(&self) -> usize {
        1 + self.labels.len().min(self.trellis.n_states())
    }
}

impl<S: Display, P: PathScore> Iterator for TableLines<'_, S, P> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let line = match self.next_line {
            0 => self.header(),
            i if i < self.total_lines() => self.row(i - 1),
            _ => return None,
        };
        self.next_line += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.total_lines().saturating_sub(self.next_line);
        (rest, Some(rest))
    }
}

impl<S: Display, P: PathScore> ExactSizeIterator for TableLines<'_, S, P> {}
impl<S: Display, P: PathScore> FusedIterator for TableLines<'_, S, P> {}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
