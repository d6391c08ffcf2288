//! The ground atoms known during one grounding run, and the join of
//! a conjunction of literals against them.
//!
//! Atoms come in two tiers. _Possible_ atoms occur in the head of some
//! emitted instance; positive literals are matched against them.
//! _Certain_ atoms are known to hold in every answer set; a default
//! negated literal whose atom is certain can never be satisfied, so
//! the instance carrying it is dropped.

use slash_syntax::*;

use crate::elements::ground_aggregate;
use crate::matcher::finish;
use crate::{
    AtomTable, Bindings, ContainsVariable as _, Deferred, GroundTerm, Groundable as _,
    GroundingError, Names, Substitute as _, Variables as _,
};

#[derive(Clone, Debug, Default)]
pub(crate) struct Domain {
    pub possible: AtomTable,
    pub certain: AtomTable,
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every extension of `bindings` under which the positive literals
    /// of `literals` match possible atoms, the relations hold, and no
    /// negative literal is certainly false. Aggregates never filter.
    pub fn join(
        &self,
        literals: &[Literal<Term>],
        bindings: &Bindings,
    ) -> Result<Vec<Bindings>, GroundingError> {
        let mut pending = literals
            .iter()
            .filter_map(|l| match l {
                Literal::Positive(atom) => Some(atom),
                _ => None,
            })
            .collect::<Vec<_>>();
        let mut bound = bindings.keys().cloned().collect::<Names>();
        let mut frontier = vec![(bindings.clone(), Deferred::new())];
        while !pending.is_empty() && !frontier.is_empty() {
            // Prefer a literal whose arithmetic can already be evaluated;
            // otherwise its arithmetic waits for the literals after it.
            let next = pending
                .iter()
                .position(|atom| {
                    atom.variables()
                        .difference(&atom.bindable_variables())
                        .all(|v| bound.contains(v))
                })
                .unwrap_or(0);
            let atom = pending.remove(next);
            bound.extend(atom.bindable_variables());
            let mut extended = Vec::new();
            for (b, deferred) in &frontier {
                extended.extend(self.possible.extend(atom, b, deferred)?);
            }
            frontier = extended;
        }

        let mut complete = Vec::with_capacity(frontier.len());
        for (b, deferred) in frontier {
            if finish(deferred, &b)? {
                complete.push(b);
            }
        }
        let frontier = complete;

        let mut admitted = Vec::with_capacity(frontier.len());
        for b in frontier {
            if self.admits(literals, &b)? {
                admitted.push(b);
            }
        }
        Ok(admitted)
    }

    /// Do the relations hold and the negative literals stand a chance?
    pub fn admits(
        &self,
        literals: &[Literal<Term>],
        bindings: &Bindings,
    ) -> Result<bool, GroundingError> {
        for literal in literals {
            match literal {
                Literal::Relation(x, op, y) => {
                    if !op.eval(x.ground_with(bindings)?, y.ground_with(bindings)?) {
                        return Ok(false);
                    }
                }
                Literal::Negative(atom) => {
                    if !self.certain.matches(atom, bindings)?.is_empty() {
                        return Ok(false);
                    }
                }
                Literal::Positive(_) | Literal::Aggregate(..) => (),
            }
        }
        Ok(true)
    }

    /// Ground a conjunction under bindings produced by [`join`](Self::join),
    /// preserving source order. A negative literal with anonymous
    /// variables becomes one negated atom per matching possible atom.
    pub fn ground_body(
        &self,
        literals: &[Literal<Term>],
        bindings: &Bindings,
    ) -> Result<Vec<Literal<GroundTerm>>, GroundingError> {
        let mut body = Vec::with_capacity(literals.len());
        for literal in literals {
            match literal {
                Literal::Negative(atom) => {
                    let pattern = atom.substitute(bindings);
                    if pattern
                        .application()
                        .arguments
                        .iter()
                        .any(|t| t.contains_variable(None))
                    {
                        body.extend(
                            self.possible
                                .matching_atoms(&pattern, bindings)?
                                .into_iter()
                                .filter(|a| !self.certain.contains(a))
                                .map(Literal::Negative),
                        );
                    } else {
                        body.push(Literal::Negative(atom.ground_with(bindings)?));
                    }
                }
                Literal::Aggregate(polarity, aggregate) => body.push(Literal::Aggregate(
                    *polarity,
                    ground_aggregate(self, aggregate, bindings)?,
                )),
                _ => body.push(literal.ground_with(bindings)?),
            }
        }
        Ok(body)
    }
}

/// Give every anonymous variable in a positive literal (element
/// conditions included) a fresh name, so that matching binds it and
/// the ground instance can show what it stood for. Fresh names start
/// with `_#`, which no source variable can.
pub(crate) fn name_anonymous(rule: &BaseRule<Term>) -> BaseRule<Term> {
    let mut namer = Namer(0);
    match rule {
        BaseRule::Disjunctive(r) => {
            BaseRule::Disjunctive(Rule::new(r.head.clone(), namer.literals(&r.body)))
        }
        BaseRule::Choice(r) => {
            let elements = r
                .head
                .elements
                .iter()
                .map(|e| ChoiceElement::new(e.atom.clone(), namer.literals(&e.condition)))
                .collect::<Vec<_>>();
            BaseRule::Choice(ChoiceRule::new(
                Choice::new(elements, r.head.bounds.clone()),
                namer.literals(&r.body),
            ))
        }
        BaseRule::Npp(r) => BaseRule::Npp(NppRule::new(r.head.clone(), namer.literals(&r.body))),
    }
}

struct Namer(usize);

impl Namer {
    fn literals(&mut self, literals: &[Literal<Term>]) -> Vec<Literal<Term>> {
        literals
            .iter()
            .map(|literal| match literal {
                Literal::Positive(atom) => Literal::Positive(self.atom(atom)),
                Literal::Aggregate(polarity, aggregate) => {
                    let elements = aggregate
                        .elements
                        .iter()
                        .map(|e| AggregateElement::new(e.terms.clone(), self.literals(&e.condition)))
                        .collect::<Vec<_>>();
                    Literal::Aggregate(
                        *polarity,
                        Aggregate::new(aggregate.function, elements, aggregate.bounds.clone()),
                    )
                }
                _ => literal.clone(),
            })
            .collect()
    }

    fn atom(&mut self, atom: &Atom<Term>) -> Atom<Term> {
        atom.with_arguments(
            atom.application()
                .arguments
                .iter()
                .map(|t| self.term(t))
                .collect(),
        )
    }

    /// Arithmetic never binds, so `_` under it is left to the safety check.
    fn term(&mut self, term: &Term) -> Term {
        match term {
            Term::Anonymous => {
                self.0 += 1;
                Term::Variable(Symbol::new(format!("_#{}", self.0)))
            }
            Term::Function(f) => Term::Function(Application::new(
                f.predicate.clone(),
                f.arguments.iter().map(|t| self.term(t)).collect::<Vec<_>>(),
            )),
            _ => term.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn domain(possible: &[Atom<GroundTerm>], certain: &[Atom<GroundTerm>]) -> Domain {
        Domain {
            possible: possible.iter().chain(certain).collect(),
            certain: certain.iter().collect(),
        }
    }

    fn p(args: impl IntoIterator<Item = GroundTerm>) -> Atom<GroundTerm> {
        Atom::app(Symbol::from("p"), args)
    }

    fn q(args: impl IntoIterator<Item = GroundTerm>) -> Atom<GroundTerm> {
        Atom::app(Symbol::from("q"), args)
    }

    fn values(found: &[Bindings], name: &str) -> Vec<GroundTerm> {
        found.iter().map(|b| b[&Symbol::from(name)].clone()).collect()
    }

    #[test]
    fn join_positive() {
        let d = domain(
            &[p([1.into(), 2.into()]), p([2.into(), 3.into()])],
            &[q([1.into()]), q([2.into()])],
        );
        let found = d
            .join(&[pos!(q(var!(X))), pos!(p(var!(X), var!(Y)))], &Bindings::new())
            .expect("join");
        assert_eq!(values(&found, "Y"), [GroundTerm::number(2), GroundTerm::number(3)]);
    }

    #[test]
    fn join_orders_by_arithmetic() {
        let d = domain(&[], &[p([1.into(), 2.into()]), q([2.into()])]);
        // `q(X+1)` cannot be matched until `p` binds `X`.
        let found = d
            .join(
                &[pos!(q(binary!(var!(X), Add, 1))), pos!(p(var!(X), var!(Y)))],
                &Bindings::new(),
            )
            .expect("join");
        assert_eq!(values(&found, "X"), [GroundTerm::number(1)]);
    }

    #[test]
    fn join_filters() {
        let d = domain(&[q([2.into()])], &[p([1.into()]), p([2.into()]), p([3.into()]), q([3.into()])]);
        let found = d
            .join(&[pos!(p(var!(X))), rel!(var!(X), Gt, 1), neg!(q(var!(X)))], &Bindings::new())
            .expect("join");
        // `q(2)` is only possible, so its negation may still hold.
        assert_eq!(values(&found, "X"), [GroundTerm::number(2)]);
    }

    #[test]
    fn join_with_initial_bindings() {
        let d = domain(&[], &[p([1.into()]), p([2.into()])]);
        let b = Bindings::from([(Symbol::from("X"), GroundTerm::number(2))]);
        assert_eq!(d.join(&[pos!(p(var!(X)))], &b).expect("join"), [b]);
    }

    #[test]
    fn join_arithmetic_error() {
        let d = domain(&[], &[p([0.into()])]);
        let result = d.join(&[pos!(p(var!(X))), rel!(binary!(1, Div, var!(X)), Eq, 1)], &Bindings::new());
        assert!(matches!(result, Err(GroundingError::UndefinedArithmetic { .. })));
    }

    #[test]
    fn join_arithmetic_bound_later() {
        // `X` is bound by the second argument of the same atom.
        let d = domain(&[], &[p([2.into(), 1.into()]), p([3.into(), 1.into()])]);
        let found = d
            .join(&[pos!(p(binary!(var!(X), Add, 1), var!(X)))], &Bindings::new())
            .expect("join");
        assert_eq!(values(&found, "X"), [GroundTerm::number(1)]);

        // Each literal binds the variable the other one's arithmetic needs.
        let d = domain(&[], &[p([1.into(), 3.into()]), p([1.into(), 4.into()]), q([2.into(), 2.into()])]);
        let body = [
            pos!(p(var!(X), binary!(var!(Y), Add, 1))),
            pos!(q(var!(Y), binary!(var!(X), Add, 1))),
        ];
        let found = d.join(&body, &Bindings::new()).expect("join");
        assert_eq!(values(&found, "X"), [GroundTerm::number(1)]);
        assert_eq!(values(&found, "Y"), [GroundTerm::number(2)]);
    }

    #[test]
    fn join_arithmetic_fault_in_atom() {
        let d = domain(&[], &[p([0.into(), 0.into()])]);
        let result = d.join(&[pos!(p(var!(X), binary!(1, Div, var!(X))))], &Bindings::new());
        assert!(matches!(
            result,
            Err(GroundingError::UndefinedArithmetic { reason: crate::ArithmeticFault::DivisionByZero, .. })
        ));
    }

    #[test]
    fn anonymous_negation() {
        let d = domain(&[q([1.into(), 2.into()]), q([1.into(), 3.into()])], &[p([1.into()]), p([2.into()])]);
        let body = [pos!(p(var!(X))), neg!(q(var!(X), Term::Anonymous))];
        let found = d.join(&body, &Bindings::new()).expect("join");
        assert_eq!(found.len(), 2);
        let ground = |b: &Bindings| {
            d.ground_body(&body, b)
                .expect("ground")
                .iter()
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(ground(&found[0]), ["p(1)", "not q(1,2)", "not q(1,3)"]);
        assert_eq!(ground(&found[1]), ["p(2)"]);

        // A certain match rules the instance out.
        let d = domain(&[], &[p([1.into()]), q([1.into(), 2.into()])]);
        assert!(d.join(&body, &Bindings::new()).expect("join").is_empty());
    }

    #[test]
    fn fresh_names() {
        let r = rule!(
            [atom!(r(var!(X)))],
            [pos!(p(var!(X), Term::Anonymous, func!(f(Term::Anonymous)))), neg!(q(Term::Anonymous))]
        );
        assert_eq!(name_anonymous(&r).to_string(), "r(X) :- p(X,_#1,f(_#2)), not q(_).");
    }
}
