//! A trait to describe elements that may be grounded.

use slash_syntax::*;

use crate::arithmetic::{apply, negate};
use crate::program::{GroundProgram, SourceProgram};

use super::{Bindings, GroundTerm, Grounder as _, GroundingError, GroundingOptions};
use super::iterative::IterativeGrounder;

/// Syntactic elements that contain variables can be _grounded_, where we
/// replace variables with the values that they are bound to. This trait
/// represents elements for which such replacement is possible: it performs
/// the replacements (and any arithmetic they enable) for a particular set
/// of [`Bindings`]. It does _not_ attempt to describe how to choose the
/// [`Bindings`] sets; that's the job of a [`Grounder`](crate::Grounder).
pub trait Groundable {
    type Ground;
    type Error;

    /// Perform the bindings in [`Bindings`] and return a grounded element.
    /// Every variable must be bound.
    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error>;

    /// Convenience method: ground with an empty set of bindings.
    fn ground(&self) -> Result<Self::Ground, Self::Error> {
        self.ground_with(&Bindings::new())
    }
}

/// Ground each element of a slice.
fn ground_all<T>(items: &[T], bindings: &Bindings) -> Result<Vec<T::Ground>, T::Error>
where
    T: Groundable,
{
    items.iter().map(|item| item.ground_with(bindings)).collect()
}

impl Groundable for Term {
    type Ground = GroundTerm;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        use Term::*;
        match self {
            Constant(c) => Ok(GroundTerm::Constant(c.clone())),
            Variable(name) => bindings
                .get(name)
                .cloned()
                .ok_or_else(|| GroundingError::unsafe_variable(name.clone())),
            Anonymous => Err(GroundingError::unsafe_variable(Symbol::from("_"))),
            Function(f) => Ok(GroundTerm::Function(f.ground_with(bindings)?)),
            Neg(x) => negate(&x.ground_with(bindings)?),
            BinaryOperation(x, op, y) => {
                apply(&x.ground_with(bindings)?, *op, &y.ground_with(bindings)?)
            }
        }
    }
}

impl Groundable for Application<Term> {
    type Ground = Application<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(Self::Ground {
            predicate: self.predicate.clone(),
            arguments: ground_all(&self.arguments, bindings)?,
        })
    }
}

impl Groundable for Atom<Term> {
    type Ground = Atom<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(self.with_arguments(ground_all(&self.application().arguments, bindings)?))
    }
}

impl Groundable for AggregateBounds<Term> {
    type Ground = AggregateBounds<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        let guard = |g: &Option<Guard<Term>>| -> Result<_, GroundingError> {
            match g {
                Some(Guard { op, bound }) => Ok(Some(Guard::new(*op, bound.ground_with(bindings)?))),
                None => Ok(None),
            }
        };
        Ok(AggregateBounds::new(guard(&self.left)?, guard(&self.right)?))
    }
}

impl Groundable for AggregateElement<Term> {
    type Ground = AggregateElement<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(AggregateElement::new(
            ground_all(&self.terms, bindings)?,
            ground_all(&self.condition, bindings)?,
        ))
    }
}

impl Groundable for Aggregate<Term> {
    type Ground = Aggregate<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(Aggregate::new(
            self.function,
            ground_all(&self.elements, bindings)?,
            self.bounds.ground_with(bindings)?,
        ))
    }
}

impl Groundable for ChoiceElement<Term> {
    type Ground = ChoiceElement<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(ChoiceElement::new(
            self.atom.ground_with(bindings)?,
            ground_all(&self.condition, bindings)?,
        ))
    }
}

impl Groundable for Choice<Term> {
    type Ground = Choice<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(Choice::new(
            ground_all(&self.elements, bindings)?,
            self.bounds.ground_with(bindings)?,
        ))
    }
}

impl Groundable for Npp<Term> {
    type Ground = Npp<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(Npp::new(
            self.predicate.clone(),
            ground_all(&self.arguments, bindings)?,
            ground_all(&self.outcomes, bindings)?,
        ))
    }
}

impl Groundable for Literal<Term> {
    type Ground = Literal<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        use Literal::*;
        match self {
            Positive(a) => Ok(Positive(a.ground_with(bindings)?)),
            Negative(a) => Ok(Negative(a.ground_with(bindings)?)),
            Relation(x, rel, y) => Ok(Literal::relation(
                x.ground_with(bindings)?,
                *rel,
                y.ground_with(bindings)?,
            )),
            Aggregate(polarity, a) => Ok(Aggregate(*polarity, a.ground_with(bindings)?)),
        }
    }
}

impl Groundable for Rule<Term> {
    type Ground = Rule<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(Rule::new(
            ground_all(&self.head, bindings)?,
            ground_all(&self.body, bindings)?,
        ))
    }
}

impl Groundable for ChoiceRule<Term> {
    type Ground = ChoiceRule<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(ChoiceRule::new(
            self.head.ground_with(bindings)?,
            ground_all(&self.body, bindings)?,
        ))
    }
}

impl Groundable for NppRule<Term> {
    type Ground = NppRule<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        Ok(NppRule::new(
            self.head.ground_with(bindings)?,
            ground_all(&self.body, bindings)?,
        ))
    }
}

/// Ground a single rule instance whose bindings are complete,
/// elements included.
impl Groundable for BaseRule<Term> {
    type Ground = BaseRule<GroundTerm>;
    type Error = GroundingError;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        let grounded = match self {
            Self::Choice(rule) => rule.ground_with(bindings).map(BaseRule::Choice),
            Self::Disjunctive(rule) => rule.ground_with(bindings).map(BaseRule::Disjunctive),
            Self::Npp(rule) => rule.ground_with(bindings).map(BaseRule::Npp),
        };
        grounded.map_err(|e| e.with_rule(self))
    }
}

impl Groundable for SourceProgram {
    type Ground = GroundProgram;
    type Error = GroundingError;

    /// Ground with the default grounder and options.
    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Self::Error> {
        IterativeGrounder::new(self.clone(), GroundingOptions::default()).ground(bindings)
    }
}
