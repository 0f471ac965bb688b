//! Decoder configuration.

use std::marker::PhantomData;

use crate::engine::Decoder;
use crate::model::Hmm;
use crate::table::TableFormat;
use crate::traits::{Linear, LogSpace, PathScore};

/// What traceback does when no final state has positive probability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZeroPathPolicy {
    /// Fail with [`DecodeError::NoViablePath`](crate::DecodeError::NoViablePath).
    #[default]
    Error,
    /// Trace back from the first state and report probability `0.0`.
    FirstState,
}

/// Tunables shared by every decode run of a [`Decoder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    pub zero_path: ZeroPathPolicy,
    pub table: TableFormat,
}

pub struct DecoderBuilder<'m, S, O, P: PathScore = Linear> {
    model: &'m Hmm<S, O>,
    config: DecoderConfig,
    _score: PhantomData<P>,
}

impl<'m, S, O> DecoderBuilder<'m, S, O, Linear> {
    pub fn new(model: &'m Hmm<S, O>) -> Self {
        Self {
            model,
            config: DecoderConfig::default(),
            _score: PhantomData,
        }
    }
}

impl<'m, S, O, P: PathScore> DecoderBuilder<'m, S, O, P> {
    /// Switch to log-probability scoring.
    pub fn log_space(self) -> DecoderBuilder<'m, S, O, LogSpace> {
        self.with_scoring::<LogSpace>()
    }

    pub fn with_scoring<Q: PathScore>(self) -> DecoderBuilder<'m, S, O, Q> {
        DecoderBuilder {
            model: self.model,
            config: self.config,
            _score: PhantomData,
        }
    }

    pub fn with_zero_path(mut self, policy: ZeroPathPolicy) -> Self {
        self.config.zero_path = policy;
        self
    }

    pub fn with_table_format(mut self, format: TableFormat) -> Self {
        self.config.table = format;
        self
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Decoder<'m, S, O, P> {
        Decoder::with_config(self.model, self.config)
    }
}
