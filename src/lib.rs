//! A minimal fully-connected tanh network with online backpropagation.
//!
//! One engine, written once and instantiated at any float precision:
//!
//! ```
//! use ferrite_mlp::Network64;
//!
//! let mut net = Network64::with_seed(&[2, 3, 1], 0).unwrap();
//! net.set_learning_rate(0.1).unwrap();
//! net.train(&[1.0, -1.0], &[0.5]).unwrap();
//! let y = net.forward(&[1.0, -1.0]).unwrap();
//! assert!(y[0] > -1.0 && y[0] < 1.0);
//! ```

pub mod math;
pub mod activation;
pub mod error;
pub mod network;
pub mod loss;

// Convenience re-exports
pub use math::scalar::Scalar;
pub use activation::tanh::Tanh;
pub use error::{NetworkError, Result};
pub use network::network::{Network, Network32, Network64, Pass, DEFAULT_LEARNING_RATE};
pub use network::spec::NetworkSpec;
pub use network::topology::Topology;
pub use loss::squared::SquaredError;
