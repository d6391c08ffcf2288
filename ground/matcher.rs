//! One-sided unification, i.e., matching of terms against ground terms.

use slash_syntax::*;

use super::{Bindings, GroundTerm, Groundable as _, GroundingError, IsGround as _, Substitute as _};

/// Arithmetic terms that a match has paired with ground values, to be
/// checked once their variables are bound.
pub type Deferred = Vec<(Term, GroundTerm)>;

/// Match one element against a ground one, binding variables
/// on the left to elements on the right. Adapted from the
/// `GroundMatch` trait in [mu-gringo](https://github.com/potassco/mu-gringo).
///
/// Arithmetic never binds: it is pushed onto `deferred` instead and
/// compared by [`resolve`]. On failure, `bindings` and `deferred` may
/// hold a partial match and should be discarded.
pub trait Matcher<G> {
    fn matches(&self, other: &G, bindings: &mut Bindings, deferred: &mut Deferred) -> bool;
}

impl Matcher<GroundTerm> for Term {
    fn matches(
        &self,
        other: &GroundTerm,
        bindings: &mut Bindings,
        deferred: &mut Deferred,
    ) -> bool {
        use Term::*;
        match (self, other) {
            (Constant(c), GroundTerm::Constant(d)) => c == d,
            (Constant(_), GroundTerm::Function(_)) => false,
            (Variable(name), _) => match bindings.get(name) {
                Some(value) => value == other,
                None => {
                    bindings.insert(name.clone(), other.clone());
                    true
                }
            },
            (Anonymous, _) => true,
            (Function(f), GroundTerm::Function(g)) => f.matches(g, bindings, deferred),
            (Function(_), GroundTerm::Constant(_)) => false,
            // Arithmetic has an integer value or none at all.
            (Neg(_) | BinaryOperation(..), _) if other.as_integer().is_none() => false,
            (Neg(_) | BinaryOperation(..), _) => {
                deferred.push((self.clone(), other.clone()));
                true
            }
        }
    }
}

impl Matcher<Application<GroundTerm>> for Application<Term> {
    fn matches(
        &self,
        other: &Application<GroundTerm>,
        bindings: &mut Bindings,
        deferred: &mut Deferred,
    ) -> bool {
        self.predicate == other.predicate
            && self.arity() == other.arity()
            && self
                .arguments
                .iter()
                .zip(&other.arguments)
                .all(|(x, y)| x.matches(y, bindings, deferred))
    }
}

impl Matcher<Atom<GroundTerm>> for Atom<Term> {
    fn matches(
        &self,
        other: &Atom<GroundTerm>,
        bindings: &mut Bindings,
        deferred: &mut Deferred,
    ) -> bool {
        self.is_strong() == other.is_strong()
            && self.application().matches(other.application(), bindings, deferred)
    }
}

/// Check every deferred equation whose variables `bindings` now covers.
/// `None` if one fails; otherwise the equations still waiting. A fault
/// in the arithmetic itself is an error.
pub(crate) fn resolve(
    deferred: Deferred,
    bindings: &Bindings,
) -> Result<Option<Deferred>, GroundingError> {
    let mut pending = Vec::new();
    for (term, value) in deferred {
        let term = term.substitute(bindings);
        if !term.is_ground() {
            pending.push((term, value));
        } else if term.ground_with(bindings)? != value {
            return Ok(None);
        }
    }
    Ok(Some(pending))
}

/// Like [`resolve`], for a match that can bind nothing more.
pub(crate) fn finish(deferred: Deferred, bindings: &Bindings) -> Result<bool, GroundingError> {
    match resolve(deferred, bindings)? {
        None => Ok(false),
        Some(pending) => match pending.first() {
            // Grounding reports the unbound variable.
            Some((term, _)) => term.ground_with(bindings).map(|_| false),
            None => Ok(true),
        },
    }
}
