use crate::math::scalar::Scalar;

/// Hyperbolic tangent, the only activation the network uses.
///
/// Every non-input layer passes its weighted sum through `function`; the
/// backward pass recovers the slope from the cached activation with
/// `derivative_from_output`, so pre-activation sums never need to be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tanh;

impl Tanh {
    #[inline]
    pub fn function<T: Scalar>(x: T) -> T {
        x.tanh()
    }

    /// tanh'(z) written in terms of y = tanh(z): 1 - y².
    #[inline]
    pub fn derivative_from_output<T: Scalar>(y: T) -> T {
        T::one() - y * y
    }
}
