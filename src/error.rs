use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Everything a network call can reject.
///
/// All variants describe caller mistakes; a call that returns one of these
/// has not touched the network's values, weights, biases or errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Fewer than two layers, or a layer of width zero.
    #[error("invalid topology: {reason}")]
    InvalidTopology { reason: String },

    /// An input or target vector does not match its layer width.
    #[error("{what} has {got} values, layer expects {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// `backward` was called without a forward pass over the current weights.
    #[error("backward called without a preceding forward pass")]
    NotForwarded,

    #[error("learning rate must be finite and > 0, got {0}")]
    InvalidLearningRate(f64),

    #[error("invalid network config: {0}")]
    Config(#[from] serde_json::Error),
}
