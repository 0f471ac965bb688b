//! Discrete hidden Markov models with labelled states and symbols.
//!
//! Labels are assigned stable integer indices once, at construction, and all
//! probabilities are stored in dense row-major tables so decoding never does
//! associative lookups in its inner loop.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{DecodeError, ProbabilityTable, Result};

/// Hidden Markov Model with discrete states `S` and emission symbols `O`.
#[derive(Clone, Debug)]
pub struct Hmm<S, O> {
    states: Vec<S>,
    state_index: HashMap<S, usize>,
    symbols: Vec<O>,
    symbol_index: HashMap<O, usize>,
    /// initial probabilities [s]
    start: Vec<f64>,
    /// transition probabilities [s_from * n + s_to]
    transition: Vec<f64>,
    /// emission probabilities [s * v + symbol]; `None` where the mapping had no entry
    emission: Vec<Option<f64>>,
}

impl<S, O> Hmm<S, O>
where
    S: Clone + Eq + Hash + Debug,
    O: Clone + Eq + Hash + Debug,
{
    /// Build a model from nested mappings keyed by state label.
    ///
    /// `states` fixes the state order (and with it the tie-break order used
    /// by the decoder). Every state must have a start entry and a complete
    /// transition row. Emission rows may be partial; a missing
    /// `(state, symbol)` entry is reported only when decoding needs it.
    pub fn from_maps(
        states: &[S],
        start_p: &HashMap<S, f64>,
        trans_p: &HashMap<S, HashMap<S, f64>>,
        emit_p: &HashMap<S, HashMap<O, f64>>,
    ) -> Result<Self> {
        let state_index = index_states(states)?;
        let n = states.len();

        let mut start = Vec::with_capacity(n);
        for s in states {
            let p = start_p
                .get(s)
                .copied()
                .ok_or_else(|| DecodeError::lookup(ProbabilityTable::Start, s))?;
            start.push(check_probability(p, ProbabilityTable::Start, s)?);
        }

        let mut transition = Vec::with_capacity(n * n);
        for from in states {
            let row = trans_p
                .get(from)
                .ok_or_else(|| DecodeError::lookup(ProbabilityTable::Transition, from))?;
            for to in states {
                let p = row
                    .get(to)
                    .copied()
                    .ok_or_else(|| DecodeError::lookup(ProbabilityTable::Transition, (from, to)))?;
                transition.push(check_probability(p, ProbabilityTable::Transition, (from, to))?);
            }
        }

        let mut symbols = Vec::new();
        let mut symbol_index: HashMap<O, usize> = HashMap::new();
        for s in states {
            if let Some(row) = emit_p.get(s) {
                for (sym, &p) in row {
                    check_probability(p, ProbabilityTable::Emission, (s, sym))?;
                    if !symbol_index.contains_key(sym) {
                        symbol_index.insert(sym.clone(), symbols.len());
                        symbols.push(sym.clone());
                    }
                }
            }
        }

        let v = symbols.len();
        let mut emission = vec![None; n * v];
        for (si, s) in states.iter().enumerate() {
            if let Some(row) = emit_p.get(s) {
                for (sym, &p) in row {
                    emission[si * v + symbol_index[sym]] = Some(p);
                }
            }
        }

        Ok(Self {
            states: states.to_vec(),
            state_index,
            symbols,
            symbol_index,
            start,
            transition,
            emission,
        })
    }

    /// Build a model from dense row-major tables.
    ///
    /// Shapes: `start` is N, `transition` is N×N (`[from][to]`), `emission`
    /// is N×V (`[state][symbol]`).
    pub fn from_dense(
        states: Vec<S>,
        symbols: Vec<O>,
        start: Vec<f64>,
        transition: Vec<f64>,
        emission: Vec<f64>,
    ) -> Result<Self> {
        let state_index = index_states(&states)?;
        let n = states.len();
        let v = symbols.len();

        let mut symbol_index = HashMap::with_capacity(v);
        for (i, sym) in symbols.iter().enumerate() {
            if symbol_index.insert(sym.clone(), i).is_some() {
                return Err(DecodeError::InvalidInput(format!(
                    "duplicate symbol {sym:?}"
                )));
            }
        }
        if start.len() != n {
            return Err(DecodeError::InvalidInput(format!(
                "start length {} != n_states {}",
                start.len(),
                n
            )));
        }
        if transition.len() != n * n {
            return Err(DecodeError::InvalidInput(format!(
                "transition length {} != n_states*n_states {}",
                transition.len(),
                n * n
            )));
        }
        if emission.len() != n * v {
            return Err(DecodeError::InvalidInput(format!(
                "emission length {} != n_states*n_symbols {}",
                emission.len(),
                n * v
            )));
        }

        for (s, &p) in start.iter().enumerate() {
            check_probability(p, ProbabilityTable::Start, &states[s])?;
        }
        for (k, &p) in transition.iter().enumerate() {
            check_probability(p, ProbabilityTable::Transition, (&states[k / n], &states[k % n]))?;
        }
        for (k, &p) in emission.iter().enumerate() {
            check_probability(p, ProbabilityTable::Emission, (&states[k / v], &symbols[k % v]))?;
        }

        Ok(Self {
            states,
            state_index,
            symbols,
            symbol_index,
            start,
            transition,
            emission: emission.into_iter().map(Some).collect(),
        })
    }

    /// Translate labelled observations into symbol indices.
    pub fn encode(&self, observations: &[O]) -> Result<Vec<usize>> {
        observations
            .iter()
            .map(|o| {
                self.symbol_index(o)
                    .ok_or_else(|| DecodeError::lookup(ProbabilityTable::Symbol, o))
            })
            .collect()
    }

    /// Index of `state`, or `None` if it is not part of the model.
    pub fn state_index(&self, state: &S) -> Option<usize> {
        self.state_index.get(state).copied()
    }

    /// Index of `symbol`, or `None` if no emission mapping mentions it.
    pub fn symbol_index(&self, symbol: &O) -> Option<usize> {
        self.symbol_index.get(symbol).copied()
    }
}

impl<S, O> Hmm<S, O> {
    /// State labels in index order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Symbol labels in index order.
    pub fn symbols(&self) -> &[O] {
        &self.symbols
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn start(&self, state: usize) -> f64 {
        self.start[state]
    }

    #[inline]
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transition[from * self.n_states() + to]
    }

    /// Emission probability, or `None` if the model has no entry for it.
    #[inline]
    pub fn emission(&self, state: usize, symbol: usize) -> Option<f64> {
        self.emission[state * self.n_symbols() + symbol]
    }
}

fn index_states<S: Clone + Eq + Hash + Debug>(states: &[S]) -> Result<HashMap<S, usize>> {
    if states.is_empty() {
        return Err(DecodeError::InvalidInput("state set is empty".into()));
    }
    let mut index = HashMap::with_capacity(states.len());
    for (i, s) in states.iter().enumerate() {
        if index.insert(s.clone(), i).is_some() {
            return Err(DecodeError::InvalidInput(format!("duplicate state {s:?}")));
        }
    }
    Ok(index)
}

fn check_probability(p: f64, table: ProbabilityTable, key: impl Debug) -> Result<f64> {
    if p.is_finite() && p >= 0.0 {
        Ok(p)
    } else {
        Err(DecodeError::InvalidInput(format!(
            "{table} probability for {key:?} must be finite and non-negative, got {p}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps() -> (
        Vec<&'static str>,
        HashMap<&'static str, f64>,
        HashMap<&'static str, HashMap<&'static str, f64>>,
        HashMap<&'static str, HashMap<&'static str, f64>>,
    ) {
        let states = vec!["Rainy", "Sunny"];
        let start = HashMap::from([("Rainy", 0.6), ("Sunny", 0.4)]);
        let trans = HashMap::from([
            ("Rainy", HashMap::from([("Rainy", 0.7), ("Sunny", 0.3)])),
            ("Sunny", HashMap::from([("Rainy", 0.4), ("Sunny", 0.6)])),
        ]);
        let emit = HashMap::from([
            ("Rainy", HashMap::from([("walk", 0.1), ("shop", 0.4), ("clean", 0.5)])),
            ("Sunny", HashMap::from([("walk", 0.6), ("shop", 0.3)])),
        ]);
        (states, start, trans, emit)
    }

    #[test]
    fn from_maps_indexes_in_given_order() {
        let (states, start, trans, emit) = maps();
        let hmm = Hmm::from_maps(&states, &start, &trans, &emit).unwrap();
        assert_eq!(hmm.states(), &["Rainy", "Sunny"]);
        assert_eq!(hmm.n_symbols(), 3);
        assert_eq!(hmm.start(1), 0.4);
        assert_eq!(hmm.transition(1, 0), 0.4);
        let clean = hmm.symbol_index(&"clean").unwrap();
        let walk = hmm.symbol_index(&"walk").unwrap();
        assert_eq!(hmm.emission(0, clean), Some(0.5));
        assert_eq!(hmm.emission(1, clean), None);
        assert_eq!(hmm.emission(1, walk), Some(0.6));
    }

    #[test]
    fn missing_start_entry_is_lookup() {
        let (states, mut start, trans, emit) = maps();
        start.remove("Sunny");
        let err = Hmm::from_maps(&states, &start, &trans, &emit).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Lookup {
                table: ProbabilityTable::Start,
                ..
            }
        ));
    }

    #[test]
    fn missing_transition_entry_is_lookup() {
        let (states, start, mut trans, emit) = maps();
        trans.get_mut("Sunny").unwrap().remove("Rainy");
        let err = Hmm::from_maps(&states, &start, &trans, &emit).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Lookup {
                table: ProbabilityTable::Transition,
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_and_duplicate_states() {
        let (_, start, trans, emit) = maps();
        let empty: Vec<&str> = Vec::new();
        assert!(Hmm::from_maps(&empty, &start, &trans, &emit)
            .unwrap_err()
            .is_invalid_input());
        let dup = vec!["Rainy", "Rainy"];
        assert!(Hmm::from_maps(&dup, &start, &trans, &emit)
            .unwrap_err()
            .is_invalid_input());
    }

    #[test]
    fn rejects_negative_and_nan_probabilities() {
        let (states, mut start, trans, emit) = maps();
        start.insert("Rainy", -0.1);
        assert!(Hmm::from_maps(&states, &start, &trans, &emit)
            .unwrap_err()
            .is_invalid_input());
        let err = Hmm::from_dense(vec![0u8], vec!['a'], vec![f64::NAN], vec![1.0], vec![1.0])
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn from_dense_checks_dimensions() {
        let err = Hmm::from_dense(
            vec![0u8, 1],
            vec!['a', 'b'],
            vec![0.5, 0.5],
            vec![1.0, 0.0, 0.0],
            vec![0.5; 4],
        )
        .unwrap_err();
        assert!(err.to_string().contains("transition length 3"));
    }

    #[test]
    fn encode_reports_unknown_symbol() {
        let (states, start, trans, emit) = maps();
        let hmm = Hmm::from_maps(&states, &start, &trans, &emit).unwrap();
        let enc = hmm.encode(&["walk", "shop"]).unwrap();
        assert_eq!(enc.len(), 2);
        let err = hmm.encode(&["walk", "swim"]).unwrap_err();
        assert_eq!(err.to_string(), "missing symbol probability for \"swim\"");
    }
}
