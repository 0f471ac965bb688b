//! Viterbi decoding for discrete Hidden Markov Models.
//!
//! Given initial, transition and emission probabilities, this crate finds the
//! single most likely sequence of hidden states behind a sequence of
//! observations, together with its probability.
//!
//! ## Core idea
//! 1. Describe the model once as an [`Hmm`]. Labels are mapped to dense
//!    indices so decoding never hashes in its inner loop.
//! 2. Run a [`Decoder`]: a forward pass fills a [`Trellis`] arena of best
//!    scores and predecessor indices in O(T·N²) time, then a traceback
//!    follows predecessors from the best final state.
//! 3. Optionally render the trellis with [`TableLines`] for inspection.
//!
//! ## Quick start
//! ```
//! use viterbi_dp::{Decoder, Hmm};
//!
//! let hmm = Hmm::from_dense(
//!     vec!["Healthy", "Fever"],
//!     vec!["normal", "cold", "dizzy"],
//!     vec![0.6, 0.4],
//!     vec![0.7, 0.3, 0.4, 0.6],
//!     vec![0.5, 0.4, 0.1, 0.1, 0.3, 0.6],
//! )
//! .unwrap();
//! let best = Decoder::new(&hmm).decode(&["normal", "cold", "dizzy"]).unwrap();
//! assert_eq!(best.states, ["Healthy", "Healthy", "Fever"]);
//! assert!((best.probability - 0.01512).abs() < 1e-12);
//! ```
//!
//! ## Scoring
//! The default [`Linear`] scoring multiplies raw probabilities and will
//! underflow to zero on long sequences. [`LogSpace`] sums log-probabilities
//! instead and selects the same path:
//! ```
//! # use viterbi_dp::{Decoder, Hmm};
//! # let hmm = Hmm::from_dense(vec![0u8], vec!['a'], vec![1.0], vec![1.0], vec![0.5]).unwrap();
//! let decoder = Decoder::builder(&hmm).log_space().build();
//! let best = decoder.decode(&['a'; 2000]).unwrap();
//! assert_eq!(best.probability, 0.0); // underflows
//! assert!((best.log_probability - 2000.0 * 0.5f64.ln()).abs() < 1e-6);
//! ```
//!
//! ## Cargo features
//! - `parallel`: fill each trellis column and batches of sequences with rayon.
//! - `tracing`: emit spans for decode, forward pass and traceback.
//! - `probe`: build the `underflow_probe` diagnostic binary.

pub mod builder;
pub mod decode;
pub mod engine;
pub mod error;
pub mod model;
pub mod table;
pub mod traits;
pub mod trellis;

pub use crate::builder::{DecoderBuilder, DecoderConfig, ZeroPathPolicy};
pub use crate::decode::{decode, Decoding};
pub use crate::engine::{Decoder, Traceback};
pub use crate::error::{DecodeError, ProbabilityTable, Result};
pub use crate::model::Hmm;
pub use crate::table::{TableFormat, TableLines};
pub use crate::traits::{Linear, LogSpace, PathScore};
pub use crate::trellis::{Cell, Trellis};
