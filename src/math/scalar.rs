use std::fmt::{Debug, Display};

use num_traits::{Float, NumCast};
use rand::distributions::uniform::SampleUniform;

/// Numeric type a network can be instantiated at.
///
/// Anything that behaves like an IEEE float (`tanh`, arithmetic, conversions)
/// and can be sampled uniformly by `rand` qualifies; in practice that is `f32`
/// and `f64`.
pub trait Scalar: Float + SampleUniform + Debug + Display + Send + Sync + 'static {
    /// Converts an `f64` constant into this precision.
    fn lit(value: f64) -> Self {
        // Float conversions from f64 never fail; they round or saturate.
        <Self as NumCast>::from(value).unwrap_or_else(Self::nan)
    }

    /// Widens to `f64` for logging and config round-trips.
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl<T> Scalar for T where T: Float + SampleUniform + Debug + Display + Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lit_round_trips_at_both_precisions() {
        assert_eq!(f64::lit(0.25), 0.25);
        assert_eq!(f32::lit(-0.5), -0.5_f32);
        assert_eq!(f32::lit(0.1).as_f64(), 0.1_f32 as f64);
    }
}
