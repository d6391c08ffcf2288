//! Read-only traversal of source syntax.

use super::*;

/// Hooks called on each element of a rule. Leaves do nothing by default;
/// every other hook delegates to the `visit_*` function of the same
/// name, which walks the children. An override that wants the children
/// too should call that function itself.
pub trait Visit<'a> {
    fn visit_constant(&mut self, _c: &'a Constant) {}
    fn visit_variable(&mut self, _s: &'a Symbol) {}
    fn visit_anonymous(&mut self) {}
    fn visit_predicate_name(&mut self, _p: &'a Symbol) {}
    fn visit_function_name(&mut self, _f: &'a Symbol) {}
    fn visit_term(&mut self, t: &'a Term) {
        visit_term(self, t)
    }
    fn visit_function(&mut self, f: &'a Application<Term>) {
        visit_function(self, f)
    }
    fn visit_neg(&mut self, t: &'a Term) {
        visit_neg(self, t)
    }
    fn visit_binary_operation(&mut self, l: &'a Term, op: BinOp, r: &'a Term) {
        visit_binary_operation(self, l, op, r)
    }
    fn visit_relation(&mut self, l: &'a Term, op: RelOp, r: &'a Term) {
        visit_relation(self, l, op, r)
    }
    fn visit_aggregate(&mut self, a: &'a Aggregate<Term>) {
        visit_aggregate(self, a)
    }
    fn visit_aggregate_element(&mut self, e: &'a AggregateElement<Term>) {
        visit_aggregate_element(self, e)
    }
    fn visit_aggregate_bounds(&mut self, b: &'a AggregateBounds<Term>) {
        visit_aggregate_bounds(self, b)
    }
    fn visit_choice(&mut self, c: &'a Choice<Term>) {
        visit_choice(self, c)
    }
    fn visit_choice_element(&mut self, e: &'a ChoiceElement<Term>) {
        visit_choice_element(self, e)
    }
    fn visit_npp(&mut self, n: &'a Npp<Term>) {
        visit_npp(self, n)
    }
    fn visit_head_atom(&mut self, a: &'a Atom<Term>) {
        visit_atom(self, a)
    }
    fn visit_body_atom(&mut self, a: &'a Atom<Term>) {
        visit_atom(self, a)
    }
    fn visit_body_literal(&mut self, l: &'a Literal<Term>) {
        visit_body_literal(self, l)
    }
    fn visit_base_rule(&mut self, r: &'a BaseRule<Term>) {
        visit_base_rule(self, r)
    }
    fn visit_choice_rule(&mut self, c: &'a ChoiceRule<Term>) {
        visit_choice_rule(self, c)
    }
    fn visit_disjunctive_rule(&mut self, r: &'a Rule<Term>) {
        visit_disjunctive_rule(self, r)
    }
    fn visit_npp_rule(&mut self, r: &'a NppRule<Term>) {
        visit_npp_rule(self, r)
    }
}

pub fn visit_term<'a, V: Visit<'a> + ?Sized>(v: &mut V, t: &'a Term) {
    match t {
        Term::Constant(c) => v.visit_constant(c),
        Term::Variable(s) => v.visit_variable(s),
        Term::Anonymous => v.visit_anonymous(),
        Term::Function(f) => v.visit_function(f),
        Term::Neg(t) => v.visit_neg(t),
        Term::BinaryOperation(l, op, r) => v.visit_binary_operation(l, *op, r),
    }
}

pub fn visit_neg<'a, V: Visit<'a> + ?Sized>(v: &mut V, t: &'a Term) {
    v.visit_term(t);
}

pub fn visit_binary_operation<'a, V: Visit<'a> + ?Sized>(
    v: &mut V,
    left: &'a Term,
    _op: BinOp,
    right: &'a Term,
) {
    v.visit_term(left);
    v.visit_term(right);
}

pub fn visit_relation<'a, V: Visit<'a> + ?Sized>(
    v: &mut V,
    left: &'a Term,
    _op: RelOp,
    right: &'a Term,
) {
    v.visit_term(left);
    v.visit_term(right);
}

pub fn visit_function<'a, V: Visit<'a> + ?Sized>(v: &mut V, function: &'a Application<Term>) {
    v.visit_function_name(&function.predicate);
    for arg in &function.arguments {
        v.visit_term(arg);
    }
}

pub fn visit_aggregate<'a, V: Visit<'a> + ?Sized>(v: &mut V, aggregate: &'a Aggregate<Term>) {
    for e in &aggregate.elements {
        v.visit_aggregate_element(e);
    }
    v.visit_aggregate_bounds(&aggregate.bounds);
}

pub fn visit_aggregate_element<'a, V: Visit<'a> + ?Sized>(
    v: &mut V,
    element: &'a AggregateElement<Term>,
) {
    for t in &element.terms {
        v.visit_term(t);
    }
    for l in &element.condition {
        v.visit_body_literal(l);
    }
}

pub fn visit_aggregate_bounds<'a, V: Visit<'a> + ?Sized>(
    v: &mut V,
    bounds: &'a AggregateBounds<Term>,
) {
    for guard in bounds.guards() {
        v.visit_term(&guard.bound);
    }
}

pub fn visit_choice<'a, V: Visit<'a> + ?Sized>(v: &mut V, choice: &'a Choice<Term>) {
    for e in &choice.elements {
        v.visit_choice_element(e);
    }
    v.visit_aggregate_bounds(&choice.bounds);
}

pub fn visit_choice_element<'a, V: Visit<'a> + ?Sized>(
    v: &mut V,
    element: &'a ChoiceElement<Term>,
) {
    v.visit_head_atom(&element.atom);
    for l in &element.condition {
        v.visit_body_literal(l);
    }
}

pub fn visit_npp<'a, V: Visit<'a> + ?Sized>(v: &mut V, npp: &'a Npp<Term>) {
    v.visit_predicate_name(&npp.predicate);
    for t in npp.arguments.iter().chain(&npp.outcomes) {
        v.visit_term(t);
    }
}

pub fn visit_atom<'a, V: Visit<'a> + ?Sized>(v: &mut V, atom: &'a Atom<Term>) {
    let app = atom.application();
    v.visit_predicate_name(&app.predicate);
    for arg in &app.arguments {
        v.visit_term(arg);
    }
}

pub fn visit_body_literal<'a, V: Visit<'a> + ?Sized>(v: &mut V, literal: &'a Literal<Term>) {
    match literal {
        Literal::Positive(a) | Literal::Negative(a) => v.visit_body_atom(a),
        Literal::Relation(l, op, r) => v.visit_relation(l, *op, r),
        Literal::Aggregate(_, a) => v.visit_aggregate(a),
    }
}

pub fn visit_base_rule<'a, V: Visit<'a> + ?Sized>(v: &mut V, rule: &'a BaseRule<Term>) {
    match rule {
        BaseRule::Choice(c) => v.visit_choice_rule(c),
        BaseRule::Disjunctive(r) => v.visit_disjunctive_rule(r),
        BaseRule::Npp(r) => v.visit_npp_rule(r),
    }
}

pub fn visit_choice_rule<'a, V: Visit<'a> + ?Sized>(v: &mut V, rule: &'a ChoiceRule<Term>) {
    v.visit_choice(&rule.head);
    for b in &rule.body {
        v.visit_body_literal(b);
    }
}

pub fn visit_disjunctive_rule<'a, V: Visit<'a> + ?Sized>(v: &mut V, rule: &'a Rule<Term>) {
    for a in &rule.head {
        v.visit_head_atom(a);
    }
    for b in &rule.body {
        v.visit_body_literal(b);
    }
}

pub fn visit_npp_rule<'a, V: Visit<'a> + ?Sized>(v: &mut V, rule: &'a NppRule<Term>) {
    v.visit_npp(&rule.head);
    for b in &rule.body {
        v.visit_body_literal(b);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Names {
        predicates: Vec<String>,
        variables: Vec<String>,
        anonymous: usize,
    }

    impl<'a> Visit<'a> for Names {
        fn visit_predicate_name(&mut self, p: &'a Symbol) {
            self.predicates.push(p.to_string());
        }
        fn visit_variable(&mut self, s: &'a Symbol) {
            self.variables.push(s.to_string());
        }
        fn visit_anonymous(&mut self) {
            self.anonymous += 1;
        }
    }

    #[test]
    fn walk_rules() {
        let program = parse_program(
            "p(X) :- q(X,_), not r(X), #count{Y:s(X,Y)} > 1. \
             #npp(d(I),[a,b]) :- img(I). \
             1 <= {c(Z):t(Z)} :- u.",
        )
        .expect("parse");
        let mut names = Names::default();
        for statement in &program {
            if let Statement::Rule(rule) = statement {
                names.visit_base_rule(rule);
            }
        }
        assert_eq!(names.predicates, ["p", "q", "r", "s", "d", "img", "c", "t", "u"]);
        assert_eq!(names.variables, ["X", "X", "X", "Y", "X", "Y", "I", "I", "Z", "Z"]);
        assert_eq!(names.anonymous, 1);
    }
}
