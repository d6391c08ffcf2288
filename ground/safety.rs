//! Check that all variables in a rule are _safe_, i.e., occur in at
//! least one positive, non-arithmetic body literal (or, for variables
//! local to an aggregate or choice element, in a positive literal of
//! that element's own condition). Builtin relations and arithmetic
//! never make a variable safe.
//!
//! This is totally unrelated to Rust's `unsafe` keyword.

use slash_syntax::*;

use super::{GroundingError, Names, Variables as _};

pub trait Safety {
    /// Check safety, treating the `given` variables as already bound.
    fn check_safety(&self, given: &Names) -> Result<(), GroundingError>;
}

impl Safety for BaseRule<Term> {
    fn check_safety(&self, given: &Names) -> Result<(), GroundingError> {
        check(self, given).map_err(|e| e.with_rule(self))
    }
}

fn check(rule: &BaseRule<Term>, given: &Names) -> Result<(), GroundingError> {
    let body = rule.body();
    let bound = positively_bound(body, given);

    // Global occurrences.
    let mut terms = Vec::new();
    let mut bounds = Vec::new();
    match rule {
        BaseRule::Disjunctive(Rule { head, .. }) => {
            terms.extend(head.iter().flat_map(|a| &a.application().arguments));
        }
        BaseRule::Choice(ChoiceRule { head, .. }) => bounds.push(&head.bounds),
        BaseRule::Npp(NppRule { head, .. }) => {
            terms.extend(head.arguments.iter().chain(&head.outcomes));
        }
    }
    for literal in body {
        match literal {
            Literal::Positive(a) | Literal::Negative(a) => {
                // `_` is allowed here; named variables are checked below.
                for name in a.variables() {
                    require(&name, &bound)?;
                }
            }
            Literal::Relation(l, _, r) => terms.extend([l.as_ref(), r.as_ref()]),
            Literal::Aggregate(_, aggregate) => bounds.push(&aggregate.bounds),
        }
    }
    terms.extend(bounds.iter().flat_map(|b| b.guards().map(|g| &g.bound)));
    for term in terms {
        require_term(term, &bound)?;
    }

    // Element-local occurrences.
    for literal in body {
        if let Literal::Aggregate(_, aggregate) = literal {
            for element in &aggregate.elements {
                let local = positively_bound(&element.condition, &bound);
                for term in &element.terms {
                    require_term(term, &local)?;
                }
                check_condition(&element.condition, &local)?;
            }
        }
    }
    if let BaseRule::Choice(ChoiceRule { head, .. }) = rule {
        for element in &head.elements {
            let local = positively_bound(&element.condition, &bound);
            for term in &element.atom.application().arguments {
                require_term(term, &local)?;
            }
            check_condition(&element.condition, &local)?;
        }
    }
    Ok(())
}

/// The `given` variables plus those occurring outside of arithmetic
/// in the positive classical literals of `literals`.
fn positively_bound(literals: &[Literal<Term>], given: &Names) -> Names {
    let mut bound = given.clone();
    for literal in literals {
        if let Literal::Positive(atom) = literal {
            bound.extend(atom.bindable_variables());
        }
    }
    bound
}

fn check_condition(condition: &[Literal<Term>], bound: &Names) -> Result<(), GroundingError> {
    for literal in condition {
        match literal {
            Literal::Relation(l, _, r) => {
                require_term(l, bound)?;
                require_term(r, bound)?;
            }
            _ => {
                for name in literal.variables() {
                    require(&name, bound)?;
                }
            }
        }
    }
    Ok(())
}

fn require(name: &Symbol, bound: &Names) -> Result<(), GroundingError> {
    if bound.contains(name) {
        Ok(())
    } else {
        Err(GroundingError::unsafe_variable(name.clone()))
    }
}

/// Every variable in `term` must be bound, and it may not contain `_`.
fn require_term(term: &Term, bound: &Names) -> Result<(), GroundingError> {
    let mut finder = AnonymousFinder(false);
    finder.visit_term(term);
    if finder.0 {
        return Err(GroundingError::unsafe_variable(Symbol::from("_")));
    }
    for name in term.variables() {
        require(&name, bound)?;
    }
    Ok(())
}

struct AnonymousFinder(bool);

impl<'a> Visit<'a> for AnonymousFinder {
    fn visit_anonymous(&mut self) {
        self.0 = true;
    }
}
