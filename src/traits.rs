//! Scoring semirings used by the forward pass.
//!
//! The decoder never multiplies probabilities directly; it goes through a
//! [`PathScore`] implementation. Two are provided:
//! - [`Linear`]: raw probabilities, products, baseline `0.0`.
//! - [`LogSpace`]: natural-log probabilities, sums, baseline `-inf`.
//!
//! Both are monotone in the underlying probability, so the strict `>`
//! comparisons in the forward pass and in traceback select the same cells
//! whichever scoring is used (up to rounding).

/// Score domain for paths through the trellis.
///
/// Requirements:
/// - `combine` is monotone non-decreasing in each argument.
/// - `zero()` is absorbing for `combine` and is the value of an impossible path.
/// - `to_probability(lift(p)) == p` up to rounding.
pub trait PathScore: Copy + Send + Sync + 'static {
    /// Short name for diagnostics.
    const NAME: &'static str;

    /// Score of an impossible path; also the traceback selection baseline.
    fn zero() -> f64;

    /// Map a probability into the score domain.
    fn lift(probability: f64) -> f64;

    /// Extend a path score by one factor.
    fn combine(score: f64, factor: f64) -> f64;

    /// Map a score back to a probability.
    fn to_probability(score: f64) -> f64;

    /// Natural log of the probability a score represents.
    fn to_log_probability(score: f64) -> f64 {
        Self::to_probability(score).ln()
    }
}

/// Products of raw probabilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Linear;

impl PathScore for Linear {
    const NAME: &'static str = "linear";

    #[inline]
    fn zero() -> f64 {
        0.0
    }

    #[inline]
    fn lift(probability: f64) -> f64 {
        probability
    }

    #[inline]
    fn combine(score: f64, factor: f64) -> f64 {
        score * factor
    }

    #[inline]
    fn to_probability(score: f64) -> f64 {
        score
    }
}

/// Sums of natural-log probabilities; does not underflow on long sequences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogSpace;

impl PathScore for LogSpace {
    const NAME: &'static str = "log";

    #[inline]
    fn zero() -> f64 {
        f64::NEG_INFINITY
    }

    #[inline]
    fn lift(probability: f64) -> f64 {
        probability.ln()
    }

    #[inline]
    fn combine(score: f64, factor: f64) -> f64 {
        score + factor
    }

    #[inline]
    fn to_probability(score: f64) -> f64 {
        score.exp()
    }

    #[inline]
    fn to_log_probability(score: f64) -> f64 {
        score
    }
}
