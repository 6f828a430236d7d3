pub mod scalar;

pub use scalar::Scalar;
