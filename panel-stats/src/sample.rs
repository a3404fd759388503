//! Missing-value handling for raw observations.
//!
//! Survey answers arrive with gaps. An [`Observation`] is anything that may
//! or may not hold a usable number: a plain `f64` (where NaN marks a missing
//! answer) or an `Option<f64>`. Every statistic in this crate filters through
//! [`valid`] or [`valid_pairs`] before computing anything.

/// A single observation that may be missing.
pub trait Observation: Copy {
    /// The usable value, or `None` if the observation is missing.
    fn value(self) -> Option<f64>;
}

impl Observation for f64 {
    #[inline]
    fn value(self) -> Option<f64> {
        if self.is_nan() {
            None
        } else {
            Some(self)
        }
    }
}

impl Observation for Option<f64> {
    #[inline]
    fn value(self) -> Option<f64> {
        self.and_then(Observation::value)
    }
}

impl<T: Observation> Observation for &T {
    #[inline]
    fn value(self) -> Option<f64> {
        (*self).value()
    }
}

/// Collect the usable values of `data`, preserving order.
pub fn valid<T: Observation>(data: &[T]) -> Vec<f64> {
    data.iter().filter_map(|&x| x.value()).collect()
}

/// Pair up `x` and `y` by index, keeping only positions where both are usable.
///
/// Only the overlapping range `0..min(x.len(), y.len())` is considered.
pub fn valid_pairs<X: Observation, Y: Observation>(x: &[X], y: &[Y]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y.iter())
        .filter_map(|(&a, &b)| Some((a.value()?, b.value()?)))
        .unzip()
}
