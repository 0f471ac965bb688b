//! One-call decoding over labelled probability mappings.

use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::io;

use crate::builder::ZeroPathPolicy;
use crate::engine::{Decoder, Traceback};
use crate::error::{DecodeError, Result};
use crate::model::Hmm;
use crate::traits::PathScore;

/// Most likely hidden state sequence and its probability.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoding<S> {
    /// One state per observation, chronological.
    pub states: Vec<S>,
    /// Joint probability of the path and the observations; `0.0` if no path
    /// was viable. May underflow to `0.0` on long sequences under linear
    /// scoring.
    pub probability: f64,
    /// Natural log of `probability`, exact under log-space scoring.
    pub log_probability: f64,
}

impl<S: Clone> Decoding<S> {
    pub(crate) fn from_traceback<P: PathScore>(labels: &[S], traceback: Traceback) -> Self {
        Self {
            states: traceback.path.iter().map(|&s| labels[s].clone()).collect(),
            probability: P::to_probability(traceback.score),
            log_probability: P::to_log_probability(traceback.score),
        }
    }
}

impl<S> Decoding<S> {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<S: Display> Display for Decoding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.states.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{s}")?;
        }
        write!(f, " (probability {})", self.probability)
    }
}

/// Decode `observations` against a model given as nested mappings.
///
/// Uses linear scoring with [`ZeroPathPolicy::FirstState`]: when no final
/// state has positive probability (including linear underflow on long
/// sequences) the path is traced back from the first state and the returned
/// probability is `0.0`. Use [`Decoder`] directly for log-space scoring or a
/// strict policy. With `emit_table` set, the trellis table is written to
/// stdout before the result is returned; the result itself is the same
/// either way.
///
/// ```
/// use std::collections::HashMap;
/// use viterbi_dp::decode;
///
/// let states = ["Healthy", "Fever"];
/// let start = HashMap::from([("Healthy", 0.6), ("Fever", 0.4)]);
/// let trans = HashMap::from([
///     ("Healthy", HashMap::from([("Healthy", 0.7), ("Fever", 0.3)])),
///     ("Fever", HashMap::from([("Healthy", 0.4), ("Fever", 0.6)])),
/// ]);
/// let emit = HashMap::from([
///     ("Healthy", HashMap::from([("normal", 0.5), ("cold", 0.4), ("dizzy", 0.1)])),
///     ("Fever", HashMap::from([("normal", 0.1), ("cold", 0.3), ("dizzy", 0.6)])),
/// ]);
///
/// let best = decode(&["normal", "cold", "dizzy"], &states, &start, &trans, &emit, false).unwrap();
/// assert_eq!(best.states, ["Healthy", "Healthy", "Fever"]);
/// assert!((best.probability - 0.01512).abs() < 1e-12);
/// ```
pub fn decode<S, O>(
    observations: &[O],
    states: &[S],
    start_p: &HashMap<S, f64>,
    trans_p: &HashMap<S, HashMap<S, f64>>,
    emit_p: &HashMap<S, HashMap<O, f64>>,
    emit_table: bool,
) -> Result<Decoding<S>>
where
    S: Clone + Eq + Hash + Debug + Display,
    O: Clone + Eq + Hash + Debug,
{
    if observations.is_empty() {
        return Err(DecodeError::InvalidInput(
            "observation sequence is empty".into(),
        ));
    }
    if states.is_empty() {
        return Err(DecodeError::InvalidInput("state set is empty".into()));
    }

    let model = Hmm::from_maps(states, start_p, trans_p, emit_p)?;
    let decoder = Decoder::builder(&model)
        .with_zero_path(ZeroPathPolicy::FirstState)
        .build();
    if emit_table {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        decoder.decode_with_table(observations, &mut out)
    } else {
        decoder.decode(observations)
    }
}
