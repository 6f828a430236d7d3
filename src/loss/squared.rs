use crate::math::scalar::Scalar;

pub struct SquaredError;

impl SquaredError {
    /// Sum of squared residuals: Σ (target - predicted)²
    pub fn loss<T: Scalar>(predicted: &[T], target: &[T]) -> T {
        predicted.iter().zip(target.iter())
            .map(|(&p, &t)| (t - p) * (t - p))
            .fold(T::zero(), |acc, x| acc + x)
    }

    /// Per-output residual: target - predicted.
    /// The delta rule scales this by the activation slope.
    #[inline]
    pub fn residual<T: Scalar>(predicted: T, target: T) -> T {
        target - predicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_sums_squared_residuals() {
        let loss = SquaredError::loss(&[0.5_f64, -0.5], &[1.0, 0.0]);
        assert!((loss - 0.5).abs() < 1e-12);
        assert_eq!(SquaredError::loss::<f32>(&[0.2, 0.3], &[0.2, 0.3]), 0.0);
    }

    #[test]
    fn residual_points_towards_target() {
        assert_eq!(SquaredError::residual(0.25_f64, 1.0), 0.75);
        assert_eq!(SquaredError::residual(0.25_f32, -1.0), -1.25);
    }
}
