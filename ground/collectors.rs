//! Collectors of variables and signatures, implemented as
//! [visitors](Visit).

use slash_syntax::*;

use super::Names;

/// Collect all of the variables occuring in an element.
pub trait Variables {
    fn variables(&self) -> Names;

    /// Only those variables that occur outside of arithmetic, i.e.,
    /// in positions where matching can bind them.
    fn bindable_variables(&self) -> Names;
}

macro_rules! variables_via {
    ($ty: ty, $visit: ident) => {
        impl Variables for $ty {
            fn variables(&self) -> Names {
                let mut collector = VariableCollector::new(true);
                collector.$visit(self);
                collector.names
            }

            fn bindable_variables(&self) -> Names {
                let mut collector = VariableCollector::new(false);
                collector.$visit(self);
                collector.names
            }
        }
    };
}

variables_via!(Term, visit_term);
variables_via!(Atom<Term>, visit_body_atom);
variables_via!(Literal<Term>, visit_body_literal);
variables_via!(AggregateElement<Term>, visit_aggregate_element);
variables_via!(ChoiceElement<Term>, visit_choice_element);
variables_via!(BaseRule<Term>, visit_base_rule);

impl Variables for AggregateBounds<Term> {
    fn variables(&self) -> Names {
        let mut collector = VariableCollector::new(true);
        collector.visit_aggregate_bounds(self);
        collector.names
    }

    fn bindable_variables(&self) -> Names {
        Names::new()
    }
}

struct VariableCollector {
    names: Names,
    arithmetic: bool,
}

impl VariableCollector {
    fn new(arithmetic: bool) -> Self {
        Self {
            names: Names::new(),
            arithmetic,
        }
    }
}

impl<'a> Visit<'a> for VariableCollector {
    fn visit_variable(&mut self, s: &'a Symbol) {
        self.names.insert(s.clone());
    }

    fn visit_neg(&mut self, t: &'a Term) {
        if self.arithmetic {
            visit_neg(self, t);
        }
    }

    fn visit_binary_operation(&mut self, l: &'a Term, op: BinOp, r: &'a Term) {
        if self.arithmetic {
            visit_binary_operation(self, l, op, r);
        }
    }
}

/// Search for a (or any) variable. The anonymous variable counts
/// as "any" variable.
pub trait ContainsVariable {
    fn contains_variable(&self, variable: Option<&Symbol>) -> bool;
}

impl ContainsVariable for Literal<Term> {
    fn contains_variable(&self, variable: Option<&Symbol>) -> bool {
        let mut visitor = ContainsVariableVisitor::new(variable);
        visitor.visit_body_literal(self);
        visitor.found
    }
}

impl ContainsVariable for Term {
    fn contains_variable(&self, variable: Option<&Symbol>) -> bool {
        let mut visitor = ContainsVariableVisitor::new(variable);
        visitor.visit_term(self);
        visitor.found
    }
}

struct ContainsVariableVisitor<'v> {
    variable: Option<&'v Symbol>,
    found: bool,
}

impl<'v> ContainsVariableVisitor<'v> {
    fn new(variable: Option<&'v Symbol>) -> Self {
        Self {
            variable,
            found: false,
        }
    }
}

impl<'a, 'v> Visit<'a> for ContainsVariableVisitor<'v> {
    fn visit_variable(&mut self, s: &'a Symbol) {
        if self.variable.map(|v| v == s).unwrap_or(true) {
            self.found = true;
        }
    }

    fn visit_anonymous(&mut self) {
        if self.variable.is_none() {
            self.found = true;
        }
    }
}

/// Determine if an element is variable-free.
pub trait IsGround {
    fn is_ground(&self) -> bool;
}

impl<T: ContainsVariable> IsGround for T {
    fn is_ground(&self) -> bool {
        !self.contains_variable(None)
    }
}

/// Collect the signatures of all classical atoms in an element, each
/// with the default polarity under which it occurs.
pub(crate) trait Signatures {
    fn signatures(&self) -> Vec<(Signature, Polarity)>;
}

impl Signatures for [Literal<Term>] {
    fn signatures(&self) -> Vec<(Signature, Polarity)> {
        let mut collector = SignatureCollector::default();
        for l in self {
            collector.visit_body_literal(l);
        }
        collector.signatures
    }
}

#[derive(Default)]
struct SignatureCollector {
    signatures: Vec<(Signature, Polarity)>,
    negated: bool,
}

impl<'a> Visit<'a> for SignatureCollector {
    fn visit_body_literal(&mut self, l: &'a Literal<Term>) {
        let negated = self.negated;
        match l {
            Literal::Positive(a) => self.signatures.push((a.signature(), Polarity::Positive)),
            Literal::Negative(a) => self.signatures.push((a.signature(), Polarity::Negative)),
            Literal::Relation(..) => (),
            Literal::Aggregate(polarity, a) => {
                self.negated = negated || *polarity == Polarity::Negative;
                self.visit_aggregate(a);
            }
        }
        self.negated = negated;
    }

    fn visit_aggregate_element(&mut self, e: &'a AggregateElement<Term>) {
        for l in &e.condition {
            let before = self.signatures.len();
            self.visit_body_literal(l);
            if self.negated {
                for (_, polarity) in &mut self.signatures[before..] {
                    *polarity = Polarity::Negative;
                }
            }
        }
    }
}
