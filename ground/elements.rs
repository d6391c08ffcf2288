//! Expand aggregates and choices into their ground element instances,
//! and check NPP declarations against their uses.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use slash_syntax::*;

use crate::domain::Domain;
use crate::{Bindings, GroundTerm, Groundable as _, GroundingError};

/// The value an element contributes to its aggregate: 1 for `#count`,
/// the first term for `#min` and `#max`, and for `#sum` the first term
/// if it is an integer. Elements that contribute nothing are dropped.
pub fn contribution(
    function: AggregateFunction,
    element: &AggregateElement<GroundTerm>,
) -> Option<GroundTerm> {
    use AggregateFunction::*;
    match function {
        Count => Some(GroundTerm::number(1)),
        Sum => element.terms.first().filter(|t| t.is_integer()).cloned(),
        Max | Min => element.terms.first().cloned(),
    }
}

/// Ground an aggregate under `bindings`: one element instance per
/// extension of `bindings` that satisfies the element's condition,
/// deduplicated and sorted.
pub(crate) fn ground_aggregate(
    domain: &Domain,
    aggregate: &Aggregate<Term>,
    bindings: &Bindings,
) -> Result<Aggregate<GroundTerm>, GroundingError> {
    let bounds = ground_bounds(
        &aggregate.bounds,
        bindings,
        aggregate.function.is_numeric(),
        aggregate,
    )?;
    let mut elements = BTreeSet::new();
    for element in &aggregate.elements {
        for local in domain.join(&element.condition, bindings)? {
            let instance = AggregateElement::new(
                element
                    .terms
                    .iter()
                    .map(|t| t.ground_with(&local))
                    .collect::<Result<Vec<_>, _>>()?,
                domain.ground_body(&element.condition, &local)?,
            );
            if contribution(aggregate.function, &instance).is_some() {
                elements.insert(instance);
            }
        }
    }
    Ok(Aggregate::new(aggregate.function, elements, bounds))
}

/// Ground a choice under `bindings`, like an aggregate. Choice bounds
/// are cardinalities, so they must be integers.
pub(crate) fn ground_choice(
    domain: &Domain,
    choice: &Choice<Term>,
    bindings: &Bindings,
) -> Result<Choice<GroundTerm>, GroundingError> {
    let bounds = ground_bounds(&choice.bounds, bindings, true, choice)?;
    let mut elements = BTreeSet::new();
    for element in &choice.elements {
        for local in domain.join(&element.condition, bindings)? {
            elements.insert(ChoiceElement::new(
                element.atom.ground_with(&local)?,
                domain.ground_body(&element.condition, &local)?,
            ));
        }
    }
    Ok(Choice::new(elements, bounds))
}

fn ground_bounds(
    bounds: &AggregateBounds<Term>,
    bindings: &Bindings,
    integral: bool,
    construct: &impl fmt::Display,
) -> Result<AggregateBounds<GroundTerm>, GroundingError> {
    let ground = bounds.ground_with(bindings)?;
    if integral {
        if let Some(guard) = ground.guards().find(|g| !g.bound.is_integer()) {
            return Err(GroundingError::AggregateBoundType {
                bound: guard.bound.to_string(),
                aggregate: construct.to_string(),
                rule: String::new(),
            });
        }
    }
    Ok(ground)
}

/// An NPP declaration `#npp(p(t1, ..., tn), [..])` defines `p/n+1`.
/// Every declaration of `p` must agree on `n`, and every atom over
/// `p`, in a rule or in the query, must have arity `n+1`.
pub(crate) fn check_npp_arity(
    rules: &[BaseRule<Term>],
    query: Option<&Atom<Term>>,
) -> Result<(), GroundingError> {
    let mut declared = BTreeMap::<&Symbol, usize>::new();
    for rule in rules {
        if let BaseRule::Npp(NppRule { head, .. }) = rule {
            let found = head.signature().arity;
            match declared.get(&head.predicate) {
                Some(&expected) if expected != found => {
                    return Err(npp_arity_mismatch(&head.predicate, expected, found, rule))
                }
                Some(_) => (),
                None => {
                    declared.insert(&head.predicate, found);
                }
            }
        }
    }
    if declared.is_empty() {
        return Ok(());
    }

    for rule in rules {
        let mut atoms = AtomCollector::default();
        atoms.visit_base_rule(rule);
        for app in atoms.0.iter().map(|a| a.application()) {
            match declared.get(&app.predicate) {
                Some(&expected) if expected != app.arity() => {
                    return Err(npp_arity_mismatch(&app.predicate, expected, app.arity(), rule))
                }
                _ => (),
            }
        }
    }
    if let Some(query) = query {
        let app = query.application();
        match declared.get(&app.predicate) {
            Some(&expected) if expected != app.arity() => {
                return Err(npp_arity_mismatch(
                    &app.predicate,
                    expected,
                    app.arity(),
                    &Statement::Query(query.clone()),
                ))
            }
            _ => (),
        }
    }
    Ok(())
}

fn npp_arity_mismatch(
    predicate: &Symbol,
    expected: usize,
    found: usize,
    rule: &impl fmt::Display,
) -> GroundingError {
    GroundingError::NppArityMismatch {
        predicate: predicate.clone(),
        expected,
        found,
        rule: rule.to_string(),
    }
}

#[derive(Default)]
struct AtomCollector<'a>(Vec<&'a Atom<Term>>);

impl<'a> Visit<'a> for AtomCollector<'a> {
    fn visit_head_atom(&mut self, a: &'a Atom<Term>) {
        self.0.push(a);
    }

    fn visit_body_atom(&mut self, a: &'a Atom<Term>) {
        self.0.push(a);
    }
}
