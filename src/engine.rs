//! Viterbi decoding engine.
//!
//! Decoding runs in two phases:
//! 1. A forward pass that fills the [`Trellis`] column by column. Each cell
//!    keeps the best score of any path ending there and the predecessor
//!    state that achieved it.
//! 2. A traceback that picks the best final state and follows predecessors
//!    back to `t = 0`.
//!
//! The decoder is generic over the scoring domain ([`PathScore`]); the
//! default [`Linear`] scoring multiplies raw probabilities.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::io::Write;
use std::marker::PhantomData;

use crate::builder::{DecoderBuilder, DecoderConfig, ZeroPathPolicy};
use crate::decode::Decoding;
use crate::error::{DecodeError, ProbabilityTable, Result};
use crate::model::Hmm;
use crate::table::TableLines;
use crate::traits::{Linear, PathScore};
use crate::trellis::{Cell, Trellis};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Optimal state path as indices, with its score.
#[derive(Clone, Debug, PartialEq)]
pub struct Traceback {
    /// State index at each time step, chronological.
    pub path: Vec<usize>,
    /// Score of the path in the decoder's scoring domain.
    pub score: f64,
}

/// Viterbi decoder bound to one model.
///
/// Typical usage:
/// ```
/// use viterbi_dp::{Decoder, Hmm};
///
/// let hmm = Hmm::from_dense(
///     vec!["fair", "loaded"],
///     vec!['H', 'T'],
///     vec![0.5, 0.5],
///     vec![0.9, 0.1, 0.2, 0.8],
///     vec![0.5, 0.5, 0.8, 0.2],
/// )
/// .unwrap();
/// let decoding = Decoder::new(&hmm).decode(&['H', 'H', 'H', 'T']).unwrap();
/// assert_eq!(decoding.states.len(), 4);
/// ```
pub struct Decoder<'m, S, O, P: PathScore = Linear> {
    model: &'m Hmm<S, O>,
    config: DecoderConfig,
    /// start scores [s]
    start: Vec<f64>,
    /// transition scores by destination [s_to * n + s_from]
    into: Vec<f64>,
    /// emission scores by symbol [symbol * n + s]
    emission: Vec<f64>,
    /// first state without an emission entry, per symbol
    missing: Vec<Option<usize>>,
    _score: PhantomData<P>,
}

impl<'m, S, O> Decoder<'m, S, O, Linear> {
    /// Decoder with linear scoring and the default configuration.
    pub fn new(model: &'m Hmm<S, O>) -> Self {
        Self::with_config(model, DecoderConfig::default())
    }

    pub fn builder(model: &'m Hmm<S, O>) -> DecoderBuilder<'m, S, O, Linear> {
        DecoderBuilder::new(model)
    }
}

impl<'m, S, O, P: PathScore> Decoder<'m, S, O, P> {
    pub fn with_config(model: &'m Hmm<S, O>, config: DecoderConfig) -> Self {
        let n = model.n_states();
        let v = model.n_symbols();

        let start = (0..n).map(|s| P::lift(model.start(s))).collect();

        let mut into = Vec::with_capacity(n * n);
        for s_to in 0..n {
            into.extend((0..n).map(|s_from| P::lift(model.transition(s_from, s_to))));
        }

        let mut emission = Vec::with_capacity(v * n);
        let mut missing = Vec::with_capacity(v);
        for sym in 0..v {
            missing.push((0..n).find(|&s| model.emission(s, sym).is_none()));
            emission.extend((0..n).map(|s| model.emission(s, sym).map_or(P::zero(), P::lift)));
        }

        Self {
            model,
            config,
            start,
            into,
            emission,
            missing,
            _score: PhantomData,
        }
    }

    pub fn model(&self) -> &'m Hmm<S, O> {
        self.model
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Name of the scoring domain (`"linear"` or `"log"`).
    pub fn scoring(&self) -> &'static str {
        P::NAME
    }

    /// Phase II: select the best final state and follow predecessors back.
    ///
    /// The final-column scan starts from the scoring baseline and only moves
    /// on a strictly greater score, so the first best state wins ties and a
    /// column of impossible paths selects nothing; see [`ZeroPathPolicy`].
    pub fn traceback(&self, trellis: &Trellis<P>) -> Result<Traceback> {
        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("traceback", len = trellis.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let last = trellis
            .last_column()
            .ok_or_else(|| DecodeError::InvalidInput("trellis is empty".into()))?;

        let mut best_score = P::zero();
        let mut best_state = None;
        for (s, cell) in last.iter().enumerate() {
            if cell.score > best_score {
                best_score = cell.score;
                best_state = Some(s);
            }
        }

        let state = match (best_state, self.config.zero_path) {
            (Some(s), _) => s,
            (None, ZeroPathPolicy::FirstState) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(len = trellis.len(), "no viable path; tracing back from first state");
                0
            }
            (None, ZeroPathPolicy::Error) => {
                return Err(DecodeError::NoViablePath { len: trellis.len() })
            }
        };

        Ok(Traceback {
            path: trellis.chain(trellis.len() - 1, state),
            score: best_score,
        })
    }

    /// Lazy diagnostic table of `trellis`, formatted per the decoder config.
    pub fn table<'a>(&'a self, trellis: &'a Trellis<P>) -> TableLines<'a, S, P>
    where
        S: Display,
    {
        TableLines::new(trellis, self.model.states(), self.config.table)
    }

    fn emissions_for(&self, symbol: usize) -> Option<&[f64]> {
        let n = self.model.n_states();
        let start = symbol.checked_mul(n)?;
        let end = start.checked_add(n)?;
        self.emission.get(start..end)
    }
}

impl<'m, S, O, P> Decoder<'m, S, O, P>
where
    S: Clone + Eq + Hash + Debug,
    O: Clone + Eq + Hash + Debug,
    P: PathScore,
{
    /// Phase I over labelled observations.
    pub fn forward(&self, observations: &[O]) -> Result<Trellis<P>> {
        if observations.is_empty() {
            return Err(DecodeError::InvalidInput(
                "observation sequence is empty".into(),
            ));
        }
        let encoded = self.model.encode(observations)?;
        self.forward_indices(&encoded)
    }

    /// Phase I over symbol indices: build the full trellis.
    ///
    /// Column 0 is `start[s] (x) emit[s][o_0]`. Every later cell takes the
    /// best `prev[s'] (x) trans[s'][s]`, seeded with the first state and
    /// replaced only on a strictly greater score, then applies the emission.
    pub fn forward_indices(&self, observations: &[usize]) -> Result<Trellis<P>> {
        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!(
            "forward",
            len = observations.len(),
            states = self.model.n_states(),
            scoring = P::NAME
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let (&first, rest) = observations.split_first().ok_or_else(|| {
            DecodeError::InvalidInput("observation sequence is empty".into())
        })?;
        let n = self.model.n_states();
        let mut trellis = Trellis::with_capacity(n, observations.len());

        let emit = self.emission_column(first)?;
        trellis.push_column(self.start.iter().zip(emit).map(|(&pi, &e)| Cell {
            score: P::combine(pi, e),
            predecessor: None,
        }));

        let mut scratch = Vec::with_capacity(n);
        for (t, &symbol) in rest.iter().enumerate() {
            let emit = self.emission_column(symbol)?;
            fill_column::<P>(trellis.column(t), &self.into, emit, &mut scratch);
            trellis.push_column(scratch.drain(..));
        }

        Ok(trellis)
    }

    /// Forward pass followed by traceback.
    pub fn decode(&self, observations: &[O]) -> Result<Decoding<S>> {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("decode", len = observations.len(), scoring = P::NAME);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let trellis = self.forward(observations)?;
        let traceback = self.traceback(&trellis)?;
        Ok(Decoding::from_traceback::<P>(self.model.states(), traceback))
    }

    /// Like [`decode`](Self::decode), writing the trellis table to `out`
    /// before the traceback runs. The returned decoding is unaffected.
    pub fn decode_with_table<W: Write>(
        &self,
        observations: &[O],
        out: &mut W,
    ) -> Result<Decoding<S>>
    where
        S: Display,
    {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("decode", len = observations.len(), scoring = P::NAME);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let trellis = self.forward(observations)?;
        for line in self.table(&trellis) {
            writeln!(out, "{line}")?;
        }
        let traceback = self.traceback(&trellis)?;
        Ok(Decoding::from_traceback::<P>(self.model.states(), traceback))
    }

    /// Decode many independent sequences; one result per input.
    #[cfg(feature = "parallel")]
    pub fn decode_batch<Q>(&self, batch: &[Q]) -> Vec<Result<Decoding<S>>>
    where
        Q: AsRef<[O]> + Sync,
        S: Send + Sync,
        O: Sync,
    {
        batch
            .par_iter()
            .map(|observations| self.decode(observations.as_ref()))
            .collect()
    }

    /// Decode many independent sequences; one result per input.
    #[cfg(not(feature = "parallel"))]
    pub fn decode_batch<Q>(&self, batch: &[Q]) -> Vec<Result<Decoding<S>>>
    where
        Q: AsRef<[O]>,
    {
        batch
            .iter()
            .map(|observations| self.decode(observations.as_ref()))
            .collect()
    }

    fn emission_column(&self, symbol: usize) -> Result<&[f64]> {
        let column = self
            .emissions_for(symbol)
            .ok_or_else(|| DecodeError::lookup(ProbabilityTable::Symbol, symbol))?;
        if let Some(state) = self.missing[symbol] {
            return Err(DecodeError::lookup(
                ProbabilityTable::Emission,
                (&self.model.states()[state], &self.model.symbols()[symbol]),
            ));
        }
        Ok(column)
    }
}

#[inline]
fn best_cell<P: PathScore>(prev: &[Cell], into: &[f64], emit: f64) -> Cell {
    let mut best = P::combine(prev[0].score, into[0]);
    let mut arg = 0;
    for (s_from, (cell, &tr)) in prev.iter().zip(into).enumerate().skip(1) {
        let cand = P::combine(cell.score, tr);
        if cand > best {
            best = cand;
            arg = s_from;
        }
    }
    Cell {
        score: P::combine(best, emit),
        predecessor: Some(arg),
    }
}

#[cfg(not(feature = "parallel"))]
fn fill_column<P: PathScore>(prev: &[Cell], into: &[f64], emit: &[f64], out: &mut Vec<Cell>) {
    let n = prev.len();
    out.extend(
        into.chunks_exact(n)
            .zip(emit)
            .map(|(row, &e)| best_cell::<P>(prev, row, e)),
    );
}

#[cfg(feature = "parallel")]
fn fill_column<P: PathScore>(prev: &[Cell], into: &[f64], emit: &[f64], out: &mut Vec<Cell>) {
    let n = prev.len();
    out.par_extend(
        into.par_chunks_exact(n)
            .zip(emit.par_iter())
            .map(|(row, &e)| best_cell::<P>(prev, row, e)),
    );
}
