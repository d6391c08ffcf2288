//! A grounding strategy.

use super::{Bindings, Groundable};

/// A _grounder_ decides which sets of [`Bindings`] to ground an element
/// under, and does so. It is consumed by grounding; the bindings given
/// here are in force for every rule, as if they were constants.
pub trait Grounder<T: Groundable> {
    fn ground(self, bindings: &Bindings) -> Result<T::Ground, T::Error>;
}
