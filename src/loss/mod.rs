pub mod squared;

pub use squared::SquaredError;
