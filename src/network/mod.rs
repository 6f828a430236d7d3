pub mod network;
pub mod spec;
pub mod topology;

pub use network::{Network, Network32, Network64, Pass, DEFAULT_LEARNING_RATE};
pub use spec::NetworkSpec;
pub use topology::Topology;
