//! Substitutions: finite maps from variable names to ground terms.

use std::collections::BTreeMap;

use slash_syntax::*;

use crate::GroundTerm;

/// Map variable names to ground values. Since the values are ground,
/// every substitution is idempotent and acyclic by construction.
pub type Bindings = BTreeMap<Symbol, GroundTerm>;

/// Combine two substitutions, or `None` if they disagree on
/// some variable.
pub fn compose(a: &Bindings, b: &Bindings) -> Option<Bindings> {
    let mut composed = a.clone();
    for (name, value) in b {
        match composed.get(name) {
            Some(v) if v != value => return None,
            Some(_) => (),
            None => {
                composed.insert(name.clone(), value.clone());
            }
        }
    }
    Some(composed)
}

/// Apply a substitution, replacing bound variables and leaving
/// everything else (including arithmetic) alone.
pub trait Substitute {
    fn substitute(&self, bindings: &Bindings) -> Self;
}

impl Substitute for Term {
    fn substitute(&self, bindings: &Bindings) -> Self {
        use Term::*;
        match self {
            Variable(name) => match bindings.get(name) {
                Some(value) => Term::from(value.clone()),
                None => self.clone(),
            },
            Constant(_) | Anonymous => self.clone(),
            Function(app) => Function(app.substitute(bindings)),
            Neg(x) => Term::neg(x.substitute(bindings)),
            BinaryOperation(x, op, y) => {
                Term::binary_operation(x.substitute(bindings), *op, y.substitute(bindings))
            }
        }
    }
}

impl Substitute for Application<Term> {
    fn substitute(&self, bindings: &Bindings) -> Self {
        Application::new(
            self.predicate.clone(),
            self.arguments.iter().map(|arg| arg.substitute(bindings)),
        )
    }
}

impl Substitute for Atom<Term> {
    fn substitute(&self, bindings: &Bindings) -> Self {
        self.with_arguments(
            self.application()
                .arguments
                .iter()
                .map(|arg| arg.substitute(bindings))
                .collect(),
        )
    }
}
